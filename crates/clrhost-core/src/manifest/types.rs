//! Manifest Types

/// Asset type recorded for assemblies discovered by directory scanning
pub const RUNTIME_ASSET_TYPE: &str = "runtime";

/// One assembly known to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub asset_type: String,
    pub library_name: String,
    pub library_version: String,
    pub relative_path: String,
}

impl ManifestEntry {
    /// Entry for an assembly found on disk rather than in a persisted manifest
    pub fn runtime(library_name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            asset_type: RUNTIME_ASSET_TYPE.to_string(),
            library_name: library_name.into(),
            library_version: String::new(),
            relative_path: relative_path.into(),
        }
    }
}

/// Ordered set of assemblies handed to the engine as its trusted list.
///
/// Entries are only ever appended. `is_loaded` tells whether the manifest
/// came from a persisted file or is scan-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    loaded: bool,
}

impl Manifest {
    /// Empty, scan-only manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest read from a persisted file
    pub fn from_persisted(entries: Vec<ManifestEntry>) -> Self {
        Self {
            entries,
            loaded: true,
        }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }
}
