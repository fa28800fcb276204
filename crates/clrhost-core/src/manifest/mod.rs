//! Assembly Manifest
//!
//! Discovers assemblies on disk, reads persisted `.tpa` manifests and writes
//! the lists the engine consumes.

pub mod builder;
pub mod codec;
pub mod types;

pub use builder::TPA_EXTENSIONS;
pub use codec::{load, tpa_path, write_assembly_list, write_native_search_dirs};
pub use types::{Manifest, ManifestEntry, RUNTIME_ASSET_TYPE};
