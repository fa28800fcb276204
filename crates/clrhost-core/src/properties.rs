//! Engine Property Table
//!
//! Ordered key/value pairs handed to the engine at initialization.

use crate::manifest::{write_assembly_list, Manifest};
use crate::platform::Platform;

pub const TRUSTED_PLATFORM_ASSEMBLIES: &str = "TRUSTED_PLATFORM_ASSEMBLIES";
pub const APP_PATHS: &str = "APP_PATHS";
pub const APP_NI_PATHS: &str = "APP_NI_PATHS";
pub const NATIVE_DLL_SEARCH_DIRECTORIES: &str = "NATIVE_DLL_SEARCH_DIRECTORIES";
pub const APP_DOMAIN_COMPAT_SWITCH: &str = "AppDomainCompatSwitch";

/// Value of the `AppDomainCompatSwitch` property
pub const LATEST_BEHAVIOR: &str = "UseLatestBehaviorWhenTFMNotSpecified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTable {
    pairs: Vec<(&'static str, String)>,
}

impl PropertyTable {
    /// Build the five engine properties in the order the engine expects.
    pub fn build(
        manifest: &Manifest,
        app_base_dir: &str,
        native_search_dirs: &str,
        platform: &dyn Platform,
    ) -> Self {
        let pairs = vec![
            (
                TRUSTED_PLATFORM_ASSEMBLIES,
                write_assembly_list(manifest, platform),
            ),
            (APP_PATHS, app_base_dir.to_string()),
            (APP_NI_PATHS, app_base_dir.to_string()),
            (NATIVE_DLL_SEARCH_DIRECTORIES, native_search_dirs.to_string()),
            (APP_DOMAIN_COMPAT_SWITCH, LATEST_BEHAVIOR.to_string()),
        ];
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use crate::platform::Linux;

    #[test]
    fn test_build_emits_five_keys_in_order() {
        let table = PropertyTable::build(&Manifest::new(), "/app", "/app:/clr", &Linux);
        assert_eq!(table.len(), 5);
        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(
            keys,
            vec![
                "TRUSTED_PLATFORM_ASSEMBLIES",
                "APP_PATHS",
                "APP_NI_PATHS",
                "NATIVE_DLL_SEARCH_DIRECTORIES",
                "AppDomainCompatSwitch",
            ]
        );
    }

    #[test]
    fn test_build_values() {
        let manifest = Manifest::from_persisted(vec![
            ManifestEntry::runtime("a", "/app/a.dll"),
            ManifestEntry::runtime("b", "/clr/b.dll"),
        ]);
        let table = PropertyTable::build(&manifest, "/app", "/native", &Linux);

        assert_eq!(
            table.get(TRUSTED_PLATFORM_ASSEMBLIES),
            Some("/app/a.dll\n/clr/b.dll\n")
        );
        assert_eq!(table.get(APP_PATHS), Some("/app"));
        assert_eq!(table.get(APP_NI_PATHS), Some("/app"));
        assert_eq!(table.get(NATIVE_DLL_SEARCH_DIRECTORIES), Some("/native"));
        assert_eq!(
            table.get(APP_DOMAIN_COMPAT_SWITCH),
            Some("UseLatestBehaviorWhenTFMNotSpecified")
        );
    }

    #[test]
    fn test_fixed_values_ignore_manifest_contents() {
        let empty = PropertyTable::build(&Manifest::new(), "/app", "/native", &Linux);
        let full = PropertyTable::build(
            &Manifest::from_persisted(vec![ManifestEntry::runtime("x", "/x/x.dll")]),
            "/app",
            "/native",
            &Linux,
        );
        for key in [NATIVE_DLL_SEARCH_DIRECTORIES, APP_DOMAIN_COMPAT_SWITCH] {
            assert_eq!(empty.get(key), full.get(key));
        }
    }
}
