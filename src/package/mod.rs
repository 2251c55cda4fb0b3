//! Packaging a finished batch into a zip archive.
//!
//! The whole output root is zipped to `<archive_dir>/<key>.zip` with paths
//! relative to the root, then the working directory is removed.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors that can occur while packaging
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Nothing to package in {0}")]
    Empty(PathBuf),

    #[error("Archive key {0:?} is not a plain file name")]
    InvalidKey(String),

    #[error("IO error while packaging {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to walk {0}")]
    Walk(#[from] walkdir::Error),
}

impl PackageError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Path of the archive for a batch. The key must be a single file name.
pub fn archive_path(archive_dir: &Path, key: &str) -> Result<PathBuf, PackageError> {
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
        return Err(PackageError::InvalidKey(key.to_string()));
    }
    Ok(archive_dir.join(format!("{}.zip", key)))
}

/// Zip `root` into `<archive_dir>/<key>.zip` and remove `root`.
///
/// Returns the archive path. The root is only removed once the archive has
/// been written completely.
pub fn archive_output(root: &Path, archive_dir: &Path, key: &str) -> Result<PathBuf, PackageError> {
    let archive = archive_path(archive_dir, key)?;
    if !root.is_dir() {
        return Err(PackageError::Empty(root.to_path_buf()));
    }

    std::fs::create_dir_all(archive_dir).map_err(|e| PackageError::io(archive_dir, e))?;

    let entries = write_archive(root, &archive)?;
    tracing::info!("Packaged {} file(s) into {}", entries, archive.display());

    std::fs::remove_dir_all(root).map_err(|e| PackageError::io(root, e))?;
    Ok(archive)
}

/// Write every file under `root` into a new archive, returning the file count.
fn write_archive(root: &Path, archive: &Path) -> Result<usize, PackageError> {
    let file = File::create(archive).map_err(|e| PackageError::io(archive, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path == archive {
            continue;
        }

        let Some(name) = entry_name(root, path) else {
            continue;
        };

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut source = File::open(path).map_err(|e| PackageError::io(path, e))?;
            io::copy(&mut source, &mut writer).map_err(|e| PackageError::io(path, e))?;
            files += 1;
        }
    }

    writer.finish()?;
    Ok(files)
}

/// Archive entry name for `path`, with `/` separators. `None` for the root.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
