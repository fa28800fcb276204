//! Platform Services
//!
//! Separators, line terminators and the engine library name for each
//! supported OS. The variant used by a build is `HostPlatform`.

use std::path::Path;
use tracing::warn;

/// Per-OS conventions the host depends on
pub trait Platform {
    /// Separator between a directory and a file name
    fn dir_separator(&self) -> &'static str;

    /// Separator between entries of a directory list
    fn path_list_separator(&self) -> &'static str;

    fn line_terminator(&self) -> &'static str;

    /// File name of the engine shared library
    fn engine_library_name(&self) -> &'static str;

    /// Join a directory and a file name with this platform's separator
    fn join(&self, dir: &str, file: &str) -> String {
        let mut joined = String::with_capacity(dir.len() + file.len() + 1);
        joined.push_str(dir);
        joined.push_str(self.dir_separator());
        joined.push_str(file);
        joined
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Linux;

impl Platform for Linux {
    fn dir_separator(&self) -> &'static str {
        "/"
    }

    fn path_list_separator(&self) -> &'static str {
        ":"
    }

    fn line_terminator(&self) -> &'static str {
        "\n"
    }

    fn engine_library_name(&self) -> &'static str {
        "libcoreclr.so"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacOs;

impl Platform for MacOs {
    fn dir_separator(&self) -> &'static str {
        "/"
    }

    fn path_list_separator(&self) -> &'static str {
        ":"
    }

    fn line_terminator(&self) -> &'static str {
        "\n"
    }

    fn engine_library_name(&self) -> &'static str {
        "libcoreclr.dylib"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Windows;

impl Platform for Windows {
    fn dir_separator(&self) -> &'static str {
        "\\"
    }

    fn path_list_separator(&self) -> &'static str {
        ";"
    }

    fn line_terminator(&self) -> &'static str {
        "\r\n"
    }

    fn engine_library_name(&self) -> &'static str {
        "coreclr.dll"
    }
}

#[cfg(target_os = "windows")]
pub type HostPlatform = Windows;

#[cfg(target_os = "macos")]
pub type HostPlatform = MacOs;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub type HostPlatform = Linux;

/// Path as the UTF-8 string handed to the engine.
///
/// Invalid sequences are replaced, which the engine will not be able to
/// resolve, so a lossy conversion is logged.
pub fn path_to_string(path: &Path) -> String {
    match path.to_str() {
        Some(s) => s.to_string(),
        None => {
            let lossy = path.to_string_lossy().into_owned();
            warn!("Path is not valid UTF-8, passing {:?} as {}", path, lossy);
            lossy
        }
    }
}
