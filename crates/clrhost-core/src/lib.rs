//! Bootstrapper for managed applications on an external CoreCLR engine.
//!
//! Builds the trusted assembly list from a persisted `.tpa` manifest and
//! directory scans, then loads the engine and runs the application.

pub mod engine;
pub mod error;
pub mod launch;
pub mod manifest;
pub mod platform;
pub mod properties;
pub mod scanner;

pub use engine::{CoreClr, EngineApi, EngineHandle, EngineHost, HostState, RunOutcome};
pub use error::{HostError, HostResult, ParseFailure, Status};
pub use launch::{exit_code, plan, run, HostOptions, LaunchPlan};
pub use manifest::{Manifest, ManifestEntry};
pub use platform::{HostPlatform, Platform};
pub use properties::PropertyTable;
