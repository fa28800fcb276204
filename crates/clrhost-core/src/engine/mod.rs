//! Execution Engine
//!
//! Binding to the engine shared library and the init/execute/shutdown
//! sequence driven against it.

pub mod binding;
pub mod host;

use std::ffi::c_void;

use crate::error::{HostResult, Status};
use crate::properties::PropertyTable;

pub use binding::CoreClr;
pub use host::{EngineHost, HostState, LaunchRequest, RunOutcome};

/// Friendly name of the app domain the host asks the engine to create
pub const HOST_DOMAIN_NAME: &str = "clrhost";

/// Native state returned by a successful engine initialization.
///
/// Not `Clone`: shutdown consumes it so it cannot be used afterwards.
#[derive(Debug)]
pub struct EngineHandle {
    host_handle: *mut c_void,
    domain_id: u32,
}

impl EngineHandle {
    pub fn new(host_handle: *mut c_void, domain_id: u32) -> Self {
        Self {
            host_handle,
            domain_id,
        }
    }

    pub fn host_handle(&self) -> *mut c_void {
        self.host_handle
    }

    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }
}

/// The three entry points of an execution engine.
///
/// Implementations map a failing status to `HostError::Initialize` or
/// `HostError::Execute`; shutdown reports its raw status.
pub trait EngineApi {
    fn initialize(
        &self,
        exe_path: &str,
        app_domain_friendly_name: &str,
        properties: &PropertyTable,
    ) -> HostResult<EngineHandle>;

    /// Run the managed entry point and return its exit code
    fn execute_assembly(
        &self,
        handle: &EngineHandle,
        args: &[String],
        managed_assembly_path: &str,
    ) -> HostResult<u32>;

    fn shutdown(&self, handle: EngineHandle) -> Status;
}
