//! Filesystem mirror
//!
//! Copies a changed file, or every file under a changed directory, onto its
//! mirrored path. Missing parent directories are created and existing files
//! are overwritten.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use twinsync_core::{Mirror, MirrorError};
use walkdir::WalkDir;

/// [`Mirror`] that copies on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMirror;

impl FsMirror {
    pub fn new() -> Self {
        Self
    }
}

impl Mirror for FsMirror {
    fn copy(&mut self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MirrorError::SourceMissing(source.to_path_buf()));
            }
            Err(e) => return Err(copy_error(source, destination, e)),
        };

        if metadata.is_dir() {
            copy_dir(source, destination)
        } else {
            copy_file(source, destination).map_err(|e| copy_error(source, destination, e))
        }
    }
}

fn copy_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    Ok(())
}

fn copy_dir(source: &Path, destination: &Path) -> Result<(), MirrorError> {
    let mut copied = 0usize;

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| copy_error(source, destination, e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        let file_type = entry.file_type();
        let result = if file_type.is_dir() {
            fs::create_dir_all(&target)
        } else if file_type.is_file() {
            copied += 1;
            copy_file(entry.path(), &target)
        } else {
            // Symlinks are not followed
            continue;
        };
        result.map_err(|e| copy_error(entry.path(), &target, e))?;
    }

    debug!("Copied {} files under {}", copied, source.display());
    Ok(())
}

fn copy_error(source: &Path, destination: &Path, error: io::Error) -> MirrorError {
    MirrorError::Copy {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        error,
    }
}
