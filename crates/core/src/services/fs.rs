//! Filesystem helpers shared by the copier and packager.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Remove a file, symlink, or directory tree at `path`. Missing paths are not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let result =
        if metadata.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Recursively copy `from` to `to`, recreating symlinks instead of following them.
///
/// Parent directories of `to` are created as needed. `to` itself should not exist.
/// Directory permissions are applied after their contents are copied, deepest first,
/// so a read-only source directory still copies.
pub fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", from.display()),
        ));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel_path = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let dest_path = to.join(rel_path);

        if entry.path_is_symlink() && entry.depth() > 0 {
            let target = fs::read_link(entry.path())?;
            symlink(&target, &dest_path, entry.path().is_dir())?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)?;
        }
    }

    for entry in WalkDir::new(from).follow_links(false).contents_first(true) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let rel_path = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let permissions = entry.metadata().map_err(io::Error::other)?.permissions();
        fs::set_permissions(to.join(rel_path), permissions)?;
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path, _is_dir: bool) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Mark a binary as `rwxr-xr-x`.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
pub fn make_executable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}
