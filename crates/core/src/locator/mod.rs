//! Framework bundle root discovery.
//!
//! Binary members are supplied as absolute paths somewhere inside a
//! `.framework` directory (e.g. `Foo.framework/Versions/A/Foo`). The locator
//! climbs parent directories until it finds the bundle root.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{FrameworkLocation, FRAMEWORK_SUFFIX};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("Binary path must be absolute: {0}")]
    RelativePath(PathBuf),
    #[error("Could not find path in framework: {0}")]
    RootNotFound(PathBuf),
    #[error("Binary at path {binary} does not have expected framework root {expected} (found {found})")]
    RootMismatch { binary: PathBuf, expected: PathBuf, found: PathBuf },
}

fn is_framework_dir(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.as_encoded_bytes().ends_with(FRAMEWORK_SUFFIX.as_bytes()))
        .unwrap_or(false)
}

/// Return the nearest ancestor of `path` whose name ends in `.framework`.
///
/// The path itself is never considered, only its parents.
pub fn find_framework_root(path: &Path) -> Option<&Path> {
    path.ancestors().skip(1).find(|ancestor| is_framework_dir(ancestor))
}

/// Resolve a single binary member to its bundle root and bundle-relative path.
pub fn locate(binary: &Path) -> Result<FrameworkLocation, LocatorError> {
    if !binary.is_absolute() {
        return Err(LocatorError::RelativePath(binary.to_path_buf()));
    }
    let root =
        find_framework_root(binary).ok_or_else(|| LocatorError::RootNotFound(binary.into()))?;
    let relative_path = binary
        .strip_prefix(root)
        .map_err(|_| LocatorError::RootNotFound(binary.to_path_buf()))?
        .to_path_buf();
    Ok(FrameworkLocation { relative_path, root: root.to_path_buf() })
}

/// Resolve every binary member and verify they all share the first member's root.
///
/// Returns the shared root together with each member's location, in input order.
pub fn locate_all<P: AsRef<Path>>(
    binaries: &[P],
) -> Result<(PathBuf, Vec<FrameworkLocation>), LocatorError> {
    let mut locations = Vec::with_capacity(binaries.len());
    let mut expected: Option<PathBuf> = None;

    for binary in binaries {
        let binary = binary.as_ref();
        let location = locate(binary)?;
        let root = expected.get_or_insert_with(|| location.root.clone());
        if *root != location.root {
            return Err(LocatorError::RootMismatch {
                binary: binary.to_path_buf(),
                expected: root.clone(),
                found: location.root,
            });
        }
        locations.push(location);
    }

    let root = expected.ok_or_else(|| LocatorError::RootNotFound(PathBuf::new()))?;
    Ok((root, locations))
}
