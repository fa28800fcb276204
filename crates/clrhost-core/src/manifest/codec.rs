//! Manifest Codec
//!
//! Reads the persisted `.tpa` manifest and writes the assembly and search
//! directory lists passed to the engine.
//!
//! A persisted line holds four quoted fields separated by commas:
//!
//! ```text
//! "runtime","System.Runtime","4.0.20","/opt/app/System.Runtime.dll"
//! ```
//!
//! Inside a field `\` makes the next character literal. The lists written
//! for the engine are bare, unescaped and newline/separator delimited, so
//! reading and writing are not symmetric.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{Manifest, ManifestEntry};
use crate::error::{HostError, HostResult, ParseFailure};
use crate::platform::Platform;

/// Extension of the persisted manifest that sits next to the application
pub const TPA_FILE_EXTENSION: &str = "tpa";

/// Location of the persisted manifest for an application
pub fn tpa_path(app_base: &Path, app_name: &str) -> PathBuf {
    app_base.join(format!("{}.{}", app_name, TPA_FILE_EXTENSION))
}

/// Load a persisted manifest.
///
/// A missing file is not an error: it yields an empty manifest that is not
/// marked as loaded. Any malformed line fails the whole load. Bytes that are
/// not valid UTF-8 are replaced rather than rejected.
pub fn load(path: &Path) -> HostResult<Manifest> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No TPA file at {:?}", path);
            return Ok(Manifest::new());
        }
        Err(source) => {
            return Err(HostError::ManifestOpen {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        warn!("TPA file {:?} is not valid UTF-8, invalid bytes replaced", path);
    }

    let manifest = parse(&content, path)?;
    info!("Loaded {} entries from {:?}", manifest.len(), path);
    Ok(manifest)
}

/// Parse persisted manifest text. `path` is only used for error reporting.
pub fn parse(content: &str, path: &Path) -> HostResult<Manifest> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let entry = parse_line(line).map_err(|reason| HostError::ManifestParse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        entries.push(entry);
    }

    Ok(Manifest::from_persisted(entries))
}

fn parse_line(line: &str) -> Result<ManifestEntry, ParseFailure> {
    let mut offset = 0;
    let asset_type = next_field(line, &mut offset, false)?;
    let library_name = next_field(line, &mut offset, false)?;
    let library_version = next_field(line, &mut offset, false)?;
    let relative_path = next_field(line, &mut offset, true)?;

    Ok(ManifestEntry {
        asset_type,
        library_name,
        library_version,
        relative_path,
    })
}

fn next_field(line: &str, offset: &mut usize, last: bool) -> Result<String, ParseFailure> {
    let (value, end) = read_field(line, *offset).ok_or(ParseFailure::ExpectedQuote)?;
    *offset = end;
    if !last {
        if !line[end..].starts_with(',') {
            return Err(ParseFailure::MissingSeparator);
        }
        *offset += 1;
    }
    Ok(value)
}

/// Decode the quoted field starting at byte `start`.
///
/// Returns the unescaped value and the offset just past the closing quote.
/// A field left unterminated runs to the end of the line.
fn read_field(line: &str, start: usize) -> Option<(String, usize)> {
    let rest = line.get(start..)?;
    let mut chars = rest.char_indices();
    if !matches!(chars.next(), Some((_, '"'))) {
        return None;
    }

    let mut value = String::new();
    let mut end = rest.len();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            '"' => {
                end = i + 1;
                break;
            }
            _ => value.push(c),
        }
    }

    Some((value, start + end))
}

/// Trusted assembly list: every entry's path followed by the line terminator.
pub fn write_assembly_list(manifest: &Manifest, platform: &dyn Platform) -> String {
    let mut output = String::new();
    for entry in manifest.entries() {
        output.push_str(&entry.relative_path);
        output.push_str(platform.line_terminator());
    }
    output
}

/// Distinct directories holding the manifest's assemblies, in first-seen
/// order, joined with the path list separator.
pub fn write_native_search_dirs(manifest: &Manifest, platform: &dyn Platform) -> String {
    let mut dirs: Vec<&str> = Vec::new();
    for entry in manifest.entries() {
        let Some((dir, _)) = entry.relative_path.rsplit_once(platform.dir_separator()) else {
            continue;
        };
        // Entries directly under the root
        let dir = if dir.is_empty() {
            platform.dir_separator()
        } else {
            dir
        };
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs.join(platform.path_list_separator())
}
