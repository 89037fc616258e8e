//! Deterministic zip packaging of a staged framework bundle.
//!
//! Archives are used as build-cache entries, so two runs over the same bundle
//! contents must produce identical bytes regardless of when or where they ran.
//! Every mtime in the staged tree is reset to a fixed reference instant, entries
//! are written in sorted order, and each entry carries the same fixed timestamp.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Local;
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// 2000-01-01 00:00:00 UTC.
pub const ARCHIVE_EPOCH_SECS: i64 = 946_684_800;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid staged bundle path: {0}")]
    InvalidBundlePath(PathBuf),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid reference timestamp: {0}")]
    Timestamp(String),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io { path: path.to_path_buf(), source }
}

/// The instant whose local wall-clock reading is the archive epoch.
///
/// Shifting by the local UTC offset keeps local-time readers of the staged tree
/// (and the archive's DOS timestamps) on 2000-01-01 00:00 in every timezone.
pub fn reference_time() -> Result<SystemTime, ArchiveError> {
    let offset = i64::from(Local::now().offset().local_minus_utc());
    let secs = u64::try_from(ARCHIVE_EPOCH_SECS - offset)
        .map_err(|e| ArchiveError::Timestamp(e.to_string()))?;
    Ok(UNIX_EPOCH + Duration::from_secs(secs))
}

fn reference_zip_time() -> Result<DateTime, ArchiveError> {
    DateTime::from_date_and_time(2000, 1, 1, 0, 0, 0)
        .map_err(|e| ArchiveError::Timestamp(e.to_string()))
}

/// Set atime and mtime of everything under `root` (and `root` itself) to `time`.
///
/// Children are stamped before the directory that holds them, since touching a
/// child can bump its parent's mtime. Symlinks are left alone. A missing `root`
/// is not an error.
pub fn normalize_timestamps(root: &Path, time: SystemTime) -> Result<(), ArchiveError> {
    if fs::symlink_metadata(root).is_err() {
        return Ok(());
    }
    let times = FileTimes::new().set_accessed(time).set_modified(time);
    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry =
            entry.map_err(|source| ArchiveError::Walk { path: root.to_path_buf(), source })?;
        if entry.path_is_symlink() && entry.depth() > 0 {
            continue;
        }
        let file = File::open(entry.path()).map_err(io_err(entry.path()))?;
        file.set_times(times).map_err(io_err(entry.path()))?;
    }
    Ok(())
}

/// Archive name for `rel` under the bundle directory `bundle_name`, always `/`-separated.
fn entry_name(bundle_name: &str, rel: &Path) -> String {
    let mut name = bundle_name.to_string();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

#[cfg(unix)]
fn unix_mode(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

/// Zip `staged_bundle` into `output_zip` with the bundle directory as the archive's
/// single top-level entry (e.g. `Foo.framework/Foo`, not `Foo`).
pub fn package(staged_bundle: &Path, output_zip: &Path) -> Result<(), ArchiveError> {
    normalize_timestamps(staged_bundle, reference_time()?)?;

    let bundle_name = staged_bundle
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| ArchiveError::InvalidBundlePath(staged_bundle.to_path_buf()))?;

    if let Some(parent) = output_zip.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
    }
    let file = File::create(output_zip).map_err(io_err(output_zip))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(reference_zip_time()?);

    let walker = WalkDir::new(staged_bundle).follow_links(false).sort_by_file_name();
    for entry in walker {
        let entry = entry
            .map_err(|source| ArchiveError::Walk { path: staged_bundle.to_path_buf(), source })?;
        let path = entry.path();
        let rel = path
            .strip_prefix(staged_bundle)
            .map_err(|_| ArchiveError::InvalidBundlePath(path.to_path_buf()))?;
        let name = entry_name(&bundle_name, rel);
        let metadata = fs::symlink_metadata(path).map_err(io_err(path))?;
        let entry_options = match unix_mode(&metadata) {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        };

        if metadata.file_type().is_symlink() {
            let target = fs::read_link(path).map_err(io_err(path))?;
            zip.add_symlink(name, target.to_string_lossy(), options)?;
        } else if metadata.is_dir() {
            zip.add_directory(format!("{name}/"), entry_options)?;
        } else {
            zip.start_file(name, entry_options)?;
            let mut source = File::open(path).map_err(io_err(path))?;
            io::copy(&mut source, &mut zip).map_err(io_err(path))?;
        }
    }

    zip.finish()?;
    Ok(())
}
