//! ZIP archive extraction.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use basinlink_core::error::{BasinlinkError, Result};

/// What to do when an extraction target already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace pre-existing files
    Overwrite,
    /// Leave pre-existing files untouched
    Skip,
}

/// Extract every entry of a ZIP archive into `output_dir`.
///
/// The output directory is created if absent. Entries whose names would
/// escape the output directory are rejected. Returns the paths of the
/// files actually written, in archive order.
pub fn extract_zip(
    zip_path: &Path,
    output_dir: &Path,
    policy: OverwritePolicy,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let file = fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| BasinlinkError::Archive {
        path: zip_path.to_path_buf(),
        message: format!("Failed to open archive: {}", e),
    })?;

    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| BasinlinkError::Archive {
            path: zip_path.to_path_buf(),
            message: format!("Failed to read entry {}: {}", i, e),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(BasinlinkError::Archive {
                path: zip_path.to_path_buf(),
                message: format!("Entry '{}' escapes the output directory", entry.name()),
            });
        };
        let target = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if target.exists() && policy == OverwritePolicy::Skip {
            tracing::warn!(path = %target.display(), "skipping existing file");
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut output = fs::File::create(&target)?;
        io::copy(&mut entry, &mut output)?;
        extracted.push(target);
    }

    tracing::debug!(
        archive = %zip_path.display(),
        files = extracted.len(),
        "extracted archive"
    );

    Ok(extracted)
}
