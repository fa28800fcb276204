//! Engine Host
//!
//! Drives one initialize → execute → shutdown run against an engine.
//! Once initialize succeeds, shutdown is always attempted, and a shutdown
//! failure never changes the result of the run. Fatal errors are returned,
//! not logged; reporting them is up to the caller.

use std::path::Path;
use tracing::{debug, info, warn};

use super::{CoreClr, EngineApi, HOST_DOMAIN_NAME};
use crate::error::{HostError, HostResult, Status};
use crate::platform::Platform;
use crate::properties::PropertyTable;

/// States of a host run. An unloaded engine has no `EngineHost` at all:
/// one only exists once its library is loaded and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Loaded,
    Initialized,
    Executed,
    ShutDown,
    Failed,
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code reported by the managed application
    pub exit_code: i32,
    /// Set when the engine reported a failure while shutting down
    pub shutdown_warning: Option<Status>,
}

/// What the engine needs to launch the managed application
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    pub exe_path: &'a str,
    pub properties: &'a PropertyTable,
    pub app_args: &'a [String],
    pub managed_assembly_path: &'a str,
}

/// Owns an engine for a single run. Dropping the host releases the engine
/// (and with it the shared library) whatever state was reached.
pub struct EngineHost<E> {
    engine: E,
    state: HostState,
}

impl EngineHost<CoreClr> {
    /// Load the engine library from `clr_dir` and bind its entry points.
    pub fn load(clr_dir: &Path, platform: &dyn Platform) -> HostResult<Self> {
        CoreClr::load(clr_dir, platform).map(Self::new)
    }
}

impl<E: EngineApi> EngineHost<E> {
    /// Wrap an engine whose entry points are already bound.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: HostState::Loaded,
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Initialize the engine, execute the managed assembly and shut down.
    ///
    /// Only valid once, from the `Loaded` state.
    pub fn run(&mut self, request: LaunchRequest<'_>) -> HostResult<RunOutcome> {
        if self.state != HostState::Loaded {
            return Err(HostError::InvalidArgument(format!(
                "engine host cannot run from state {:?}",
                self.state
            )));
        }

        let handle = match self.engine.initialize(
            request.exe_path,
            HOST_DOMAIN_NAME,
            request.properties,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                self.state = HostState::Failed;
                return Err(e);
            }
        };
        self.state = HostState::Initialized;
        debug!("CoreCLR initialized, domain {}", handle.domain_id());

        let executed = self.engine.execute_assembly(
            &handle,
            request.app_args,
            request.managed_assembly_path,
        );
        match &executed {
            Ok(code) => {
                self.state = HostState::Executed;
                info!("Managed application exited with {}", code);
            }
            Err(_) => self.state = HostState::Failed,
        }

        let status = self.engine.shutdown(handle);
        let shutdown_warning = if status.succeeded() {
            None
        } else {
            warn!("Failed to shut down CoreCLR, HRESULT: {}", status);
            Some(status)
        };
        if self.state == HostState::Executed {
            self.state = HostState::ShutDown;
        }

        let exit_code = executed?;
        Ok(RunOutcome {
            exit_code: exit_code as i32,
            shutdown_warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineHandle;
    use crate::manifest::Manifest;
    use crate::platform::Linux;
    use std::cell::RefCell;
    use std::ptr;

    const E_FAIL: i32 = 0x8000_4005_u32 as i32;

    #[derive(Default)]
    struct FakeEngine {
        init_status: i32,
        exec_status: i32,
        exit_code: u32,
        shutdown_status: i32,
        calls: RefCell<Vec<String>>,
    }

    impl EngineApi for FakeEngine {
        fn initialize(
            &self,
            exe_path: &str,
            app_domain_friendly_name: &str,
            properties: &PropertyTable,
        ) -> HostResult<EngineHandle> {
            self.calls.borrow_mut().push(format!(
                "initialize {} {} {}",
                exe_path,
                app_domain_friendly_name,
                properties.len()
            ));
            let status = Status(self.init_status);
            if !status.succeeded() {
                return Err(HostError::Initialize(status));
            }
            Ok(EngineHandle::new(ptr::null_mut(), 7))
        }

        fn execute_assembly(
            &self,
            handle: &EngineHandle,
            args: &[String],
            managed_assembly_path: &str,
        ) -> HostResult<u32> {
            self.calls.borrow_mut().push(format!(
                "execute {} {} {}",
                handle.domain_id(),
                args.join(" "),
                managed_assembly_path
            ));
            let status = Status(self.exec_status);
            if !status.succeeded() {
                return Err(HostError::Execute(status));
            }
            Ok(self.exit_code)
        }

        fn shutdown(&self, handle: EngineHandle) -> Status {
            self.calls
                .borrow_mut()
                .push(format!("shutdown {}", handle.domain_id()));
            Status(self.shutdown_status)
        }
    }

    fn run_with(engine: FakeEngine) -> (EngineHost<FakeEngine>, HostResult<RunOutcome>) {
        let properties = PropertyTable::build(&Manifest::new(), "/app", "/app", &Linux);
        let args = vec!["one".to_string(), "two".to_string()];
        let mut host = EngineHost::new(engine);
        let result = host.run(LaunchRequest {
            exe_path: "/app/app.dll",
            properties: &properties,
            app_args: &args,
            managed_assembly_path: "/app/app.dll",
        });
        (host, result)
    }

    fn calls(host: &EngineHost<FakeEngine>) -> Vec<String> {
        host.engine().calls.borrow().clone()
    }

    #[test]
    fn test_successful_run() {
        let (host, result) = run_with(FakeEngine {
            exit_code: 42,
            ..Default::default()
        });

        assert_eq!(
            result.unwrap(),
            RunOutcome {
                exit_code: 42,
                shutdown_warning: None
            }
        );
        assert_eq!(host.state(), HostState::ShutDown);
        assert_eq!(
            calls(&host),
            vec![
                "initialize /app/app.dll clrhost 5",
                "execute 7 one two /app/app.dll",
                "shutdown 7",
            ]
        );
    }

    #[test]
    fn test_initialize_failure_skips_execute() {
        let (host, result) = run_with(FakeEngine {
            init_status: E_FAIL,
            ..Default::default()
        });

        assert!(matches!(result, Err(HostError::Initialize(Status(E_FAIL)))));
        assert_eq!(host.state(), HostState::Failed);
        let calls = calls(&host);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("initialize"));
    }

    #[test]
    fn test_execute_failure_still_shuts_down() {
        let (host, result) = run_with(FakeEngine {
            exec_status: E_FAIL,
            exit_code: 42,
            ..Default::default()
        });

        let err = result.unwrap_err();
        assert!(matches!(err, HostError::Execute(Status(E_FAIL))));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(host.state(), HostState::Failed);
        let calls = calls(&host);
        assert_eq!(calls.iter().filter(|c| c.starts_with("shutdown")).count(), 1);
        assert_eq!(calls.last().map(String::as_str), Some("shutdown 7"));
    }

    #[test]
    fn test_shutdown_failure_is_only_a_warning() {
        let (host, result) = run_with(FakeEngine {
            exit_code: 3,
            shutdown_status: E_FAIL,
            ..Default::default()
        });

        let outcome = result.unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.shutdown_warning, Some(Status(E_FAIL)));
        assert_eq!(host.state(), HostState::ShutDown);
    }

    #[test]
    fn test_host_runs_only_once() {
        let (mut host, first) = run_with(FakeEngine::default());
        assert!(first.is_ok());

        let properties = PropertyTable::build(&Manifest::new(), "/app", "/app", &Linux);
        let second = host.run(LaunchRequest {
            exe_path: "/app/app.dll",
            properties: &properties,
            app_args: &[],
            managed_assembly_path: "/app/app.dll",
        });
        assert!(matches!(second, Err(HostError::InvalidArgument(_))));
        assert_eq!(calls(&host).len(), 3);
    }
}
