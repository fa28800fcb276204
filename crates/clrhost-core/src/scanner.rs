//! Directory Scanner
//!
//! Lists the regular files of a single directory (non-recursive).

use std::fs;
use std::path::Path;
use tracing::debug;

/// List the names of regular files in `dir`.
///
/// Symlinks and entries whose type the filesystem does not report are
/// resolved with a follow-through `stat` and kept only when they point at a
/// regular file. A missing or unreadable directory yields an empty list.
pub fn list_regular_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping directory {:?}: {}", dir, e);
            return files;
        }
    };

    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };

        let is_regular = match entry.file_type() {
            Ok(ft) if ft.is_file() => true,
            Ok(ft) if ft.is_symlink() => resolves_to_file(&entry.path()),
            Ok(_) => false,
            Err(_) => resolves_to_file(&entry.path()),
        };
        if !is_regular {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => debug!("Skipping non UTF-8 file name {:?}", name),
        }
    }

    files
}

fn resolves_to_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_lists_only_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dll"), b"").unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub.dll")).unwrap();

        let files = sorted(list_regular_files(dir.path()));
        assert_eq!(files, vec!["a.dll".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_regular_files(&dir.path().join("does-not-exist"));
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_resolved() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.dll"), b"").unwrap();
        fs::create_dir(dir.path().join("folder")).unwrap();
        symlink(dir.path().join("real.dll"), dir.path().join("link.dll")).unwrap();
        symlink(dir.path().join("folder"), dir.path().join("dirlink.dll")).unwrap();
        symlink(dir.path().join("gone.dll"), dir.path().join("dangling.dll")).unwrap();

        let files = sorted(list_regular_files(dir.path()));
        assert_eq!(files, vec!["link.dll".to_string(), "real.dll".to_string()]);
    }
}
