//! CoreCLR Binding
//!
//! Loads the engine shared library and resolves its entry points up front.
//! A `CoreClr` value only exists once all three symbols are bound; the
//! library is unloaded when it is dropped.

use std::ffi::{c_char, c_int, c_uint, c_void, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;
use tracing::{debug, info};

use super::{EngineApi, EngineHandle};
use crate::error::{HostError, HostResult, Status};
use crate::platform::Platform;
use crate::properties::PropertyTable;

const INITIALIZE_SYMBOL: &str = "coreclr_initialize";
const EXECUTE_ASSEMBLY_SYMBOL: &str = "coreclr_execute_assembly";
const SHUTDOWN_SYMBOL: &str = "coreclr_shutdown";

type InitializeFn = unsafe extern "C" fn(
    exe_path: *const c_char,
    app_domain_friendly_name: *const c_char,
    property_count: c_int,
    property_keys: *const *const c_char,
    property_values: *const *const c_char,
    host_handle: *mut *mut c_void,
    domain_id: *mut c_uint,
) -> c_int;

type ExecuteAssemblyFn = unsafe extern "C" fn(
    host_handle: *mut c_void,
    domain_id: c_uint,
    argc: c_int,
    argv: *const *const c_char,
    managed_assembly_path: *const c_char,
    exit_code: *mut c_uint,
) -> c_int;

type ShutdownFn = unsafe extern "C" fn(host_handle: *mut c_void, domain_id: c_uint) -> c_int;

pub struct CoreClr {
    initialize: InitializeFn,
    execute_assembly: ExecuteAssemblyFn,
    shutdown: ShutdownFn,
    // Keeps the entry points above valid. Unloaded on drop.
    _library: Library,
}

impl CoreClr {
    /// Path of the engine library inside `clr_dir`
    pub fn library_path(clr_dir: &Path, platform: &dyn Platform) -> PathBuf {
        clr_dir.join(platform.engine_library_name())
    }

    /// Load the engine from `clr_dir` and bind every entry point.
    pub fn load(clr_dir: &Path, platform: &dyn Platform) -> HostResult<Self> {
        let path = Self::library_path(clr_dir, platform);
        info!("Loading CoreCLR from: {}", path.display());

        let library =
            unsafe { Library::new(&path) }.map_err(|source| HostError::LibraryLoad { path, source })?;

        let initialize = unsafe { bind::<InitializeFn>(&library, INITIALIZE_SYMBOL) }?;
        let execute_assembly =
            unsafe { bind::<ExecuteAssemblyFn>(&library, EXECUTE_ASSEMBLY_SYMBOL) }?;
        let shutdown = unsafe { bind::<ShutdownFn>(&library, SHUTDOWN_SYMBOL) }?;
        debug!("Bound CoreCLR entry points");

        Ok(Self {
            initialize,
            execute_assembly,
            shutdown,
            _library: library,
        })
    }
}

/// Resolve `symbol` and copy the function pointer out of the library borrow.
///
/// The caller must keep `library` alive for as long as the pointer is used
/// and `T` must match the symbol's real signature.
unsafe fn bind<T: Copy>(library: &Library, symbol: &'static str) -> HostResult<T> {
    let name = format!("{}\0", symbol);
    let sym = library
        .get::<T>(name.as_bytes())
        .map_err(|source| HostError::SymbolBind { symbol, source })?;
    Ok(*sym)
}

fn to_cstring(value: &str) -> HostResult<CString> {
    CString::new(value)
        .map_err(|_| HostError::InvalidArgument(format!("{:?} contains a NUL byte", value)))
}

fn to_c_int(len: usize) -> HostResult<c_int> {
    c_int::try_from(len)
        .map_err(|_| HostError::InvalidArgument(format!("too many values ({})", len)))
}

impl EngineApi for CoreClr {
    fn initialize(
        &self,
        exe_path: &str,
        app_domain_friendly_name: &str,
        properties: &PropertyTable,
    ) -> HostResult<EngineHandle> {
        let exe_path = to_cstring(exe_path)?;
        let domain_name = to_cstring(app_domain_friendly_name)?;

        let mut keys = Vec::with_capacity(properties.len());
        let mut values = Vec::with_capacity(properties.len());
        for (key, value) in properties.iter() {
            keys.push(to_cstring(key)?);
            values.push(to_cstring(value)?);
        }
        let key_ptrs: Vec<*const c_char> = keys.iter().map(|k| k.as_ptr()).collect();
        let value_ptrs: Vec<*const c_char> = values.iter().map(|v| v.as_ptr()).collect();
        let count = to_c_int(key_ptrs.len())?;

        let mut host_handle: *mut c_void = ptr::null_mut();
        let mut domain_id: c_uint = 0;
        let status = Status(unsafe {
            (self.initialize)(
                exe_path.as_ptr(),
                domain_name.as_ptr(),
                count,
                key_ptrs.as_ptr(),
                value_ptrs.as_ptr(),
                &mut host_handle,
                &mut domain_id,
            )
        });
        if !status.succeeded() {
            return Err(HostError::Initialize(status));
        }

        Ok(EngineHandle::new(host_handle, domain_id))
    }

    fn execute_assembly(
        &self,
        handle: &EngineHandle,
        args: &[String],
        managed_assembly_path: &str,
    ) -> HostResult<u32> {
        let argv = args
            .iter()
            .map(|a| to_cstring(a))
            .collect::<HostResult<Vec<_>>>()?;
        let argv_ptrs: Vec<*const c_char> = argv.iter().map(|a| a.as_ptr()).collect();
        let argc = to_c_int(argv_ptrs.len())?;
        let assembly = to_cstring(managed_assembly_path)?;

        let mut exit_code: c_uint = 1;
        let status = Status(unsafe {
            (self.execute_assembly)(
                handle.host_handle(),
                handle.domain_id(),
                argc,
                argv_ptrs.as_ptr(),
                assembly.as_ptr(),
                &mut exit_code,
            )
        });
        if !status.succeeded() {
            return Err(HostError::Execute(status));
        }

        Ok(exit_code)
    }

    fn shutdown(&self, handle: EngineHandle) -> Status {
        Status(unsafe { (self.shutdown)(handle.host_handle(), handle.domain_id()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Linux;

    #[test]
    fn test_library_path() {
        let path = CoreClr::library_path(Path::new("/opt/clr"), &Linux);
        assert_eq!(path, PathBuf::from("/opt/clr/libcoreclr.so"));
    }

    #[test]
    fn test_missing_library_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        match CoreClr::load(dir.path(), &Linux) {
            Err(HostError::LibraryLoad { path, .. }) => {
                assert!(path.ends_with("libcoreclr.so"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loaded a library from an empty directory"),
        }
    }

    /// Any shared library without the engine exports must fail on the first
    /// entry point rather than load a partial binding.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_library_without_exports_is_bind_error() {
        const CANDIDATES: [&str; 6] = [
            "/lib/x86_64-linux-gnu/libm.so.6",
            "/usr/lib/x86_64-linux-gnu/libm.so.6",
            "/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib/aarch64-linux-gnu/libm.so.6",
            "/lib64/libm.so.6",
            "/usr/lib64/libm.so.6",
        ];
        let Some(libm) = CANDIDATES.iter().map(Path::new).find(|p| p.is_file()) else {
            return;
        };

        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(libm, dir.path().join("libcoreclr.so")).unwrap();

        match CoreClr::load(dir.path(), &Linux) {
            Err(HostError::SymbolBind { symbol, .. }) => {
                assert_eq!(symbol, "coreclr_initialize");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("bound engine entry points in libm"),
        }
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        assert!(matches!(
            to_cstring("bad\0path"),
            Err(HostError::InvalidArgument(_))
        ));
        assert!(to_cstring("fine").is_ok());
    }
}
