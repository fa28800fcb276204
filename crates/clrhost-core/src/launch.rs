//! Launch Orchestration
//!
//! Wires the persisted manifest, directory scans, property table and engine
//! host together for one managed application.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::engine::{EngineHost, LaunchRequest, RunOutcome};
use crate::error::HostResult;
use crate::manifest::{self, Manifest};
use crate::platform::{path_to_string, HostPlatform, Platform};
use crate::properties::PropertyTable;

/// Options for one host run
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    /// Resolved path of the managed application
    pub managed_application: PathBuf,
    /// Directory holding the engine files; the application's directory when unset
    pub clr_path: Option<PathBuf>,
    /// Arguments forwarded to the managed application
    pub app_args: Vec<String>,
}

/// Everything computed before the engine is touched
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub app_path: String,
    pub app_base: PathBuf,
    pub clr_path: PathBuf,
    pub manifest: Manifest,
    pub properties: PropertyTable,
}

impl HostOptions {
    pub fn new(managed_application: impl Into<PathBuf>) -> Self {
        Self {
            managed_application: managed_application.into(),
            ..Default::default()
        }
    }

    pub fn with_clr_path(mut self, clr_path: impl Into<PathBuf>) -> Self {
        self.clr_path = Some(clr_path.into());
        self
    }
}

/// Build the manifest and engine properties for `options`.
pub fn plan(options: &HostOptions, platform: &dyn Platform) -> HostResult<LaunchPlan> {
    let app = &options.managed_application;
    info!("Preparing to launch managed application: {}", app.display());

    let app_base = app
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let app_name = app
        .file_name()
        .map(|n| path_to_string(Path::new(n)))
        .unwrap_or_default();

    let clr_path = options
        .clr_path
        .clone()
        .unwrap_or_else(|| app_base.clone());
    info!("Using CLR files from: {}", clr_path.display());

    let tpa_path = manifest::tpa_path(&app_base, &app_name);
    info!("Checking for TPA file at: {}", tpa_path.display());
    let mut manifest = manifest::load(&tpa_path)?;

    manifest.add_from(&app_base, platform);
    manifest.add_from(&clr_path, platform);

    let app_base_str = path_to_string(&app_base);
    let search_dirs = manifest::write_native_search_dirs(&manifest, platform);
    let properties = PropertyTable::build(&manifest, &app_base_str, &search_dirs, platform);
    if let Some(tpa_list) = properties.get(crate::properties::TRUSTED_PLATFORM_ASSEMBLIES) {
        debug!("Using TPA list:\n{}", tpa_list);
    }

    Ok(LaunchPlan {
        app_path: path_to_string(app),
        app_base,
        clr_path,
        manifest,
        properties,
    })
}

/// Run the managed application described by `options` on this platform.
pub fn run(options: &HostOptions) -> HostResult<RunOutcome> {
    run_with_platform(options, &HostPlatform::default())
}

pub fn run_with_platform(options: &HostOptions, platform: &dyn Platform) -> HostResult<RunOutcome> {
    let plan = plan(options, platform)?;

    let mut host = EngineHost::load(&plan.clr_path, platform)?;
    host.run(LaunchRequest {
        exe_path: &plan.app_path,
        properties: &plan.properties,
        app_args: &options.app_args,
        managed_assembly_path: &plan.app_path,
    })
}

/// Process exit code for a finished run
pub fn exit_code(result: &HostResult<RunOutcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code,
        Err(e) => e.exit_code(),
    }
}
