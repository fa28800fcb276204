//! Manifest Builder
//!
//! Turns a directory listing into runtime manifest entries.

use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use super::types::{Manifest, ManifestEntry};
use crate::platform::{path_to_string, Platform};
use crate::scanner::list_regular_files;

/// Assembly extensions in order of preference. Native images come first so
/// they win over IL assemblies of the same name in the same directory.
pub const TPA_EXTENSIONS: [&str; 4] = [".ni.dll", ".dll", ".ni.exe", ".exe"];

impl Manifest {
    /// Append an entry for every assembly found in `dir`.
    ///
    /// Within one call each logical name is added once, using the most
    /// preferred extension present, and each file is claimed by at most one
    /// extension (`foo.ni.dll` never reappears as `foo.ni`). Names already
    /// contributed by earlier calls are not checked.
    pub fn add_from(&mut self, dir: &Path, platform: &dyn Platform) {
        let files = list_regular_files(dir);
        let dir_str = path_to_string(dir);
        let mut added: HashSet<&str> = HashSet::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for ext in TPA_EXTENSIONS {
            for file in &files {
                if claimed.contains(file.as_str()) {
                    continue;
                }
                let Some(name) = logical_name(file, ext) else {
                    continue;
                };
                claimed.insert(file.as_str());
                if !added.insert(name) {
                    continue;
                }

                let path = platform.join(&dir_str, file);
                debug!("Adding {} from {}", name, path);
                self.push(ManifestEntry::runtime(name, path));
            }
        }
    }
}

/// Strip `ext` from `file` when it ends with it, ignoring ASCII case.
///
/// A file named exactly like the extension has no logical name.
pub fn logical_name<'a>(file: &'a str, ext: &str) -> Option<&'a str> {
    if file.len() <= ext.len() {
        return None;
    }
    let split = file.len() - ext.len();
    let suffix = file.get(split..)?;
    if suffix.eq_ignore_ascii_case(ext) {
        file.get(..split)
    } else {
        None
    }
}
