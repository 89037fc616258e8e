use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backends::{BinaryProcessor, ToolError};
use crate::locator::{self, LocatorError};
use crate::model::SlicePlan;
use crate::services::fs;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Nothing to copy: no framework binaries or no output path given")]
    EmptyInput,
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to {action} {binary}: {source}")]
    Tool {
        action: &'static str,
        binary: PathBuf,
        #[source]
        source: ToolError,
    },
}

/// Materializes a private, signable copy of a framework bundle.
pub struct BundleCopier<'a> {
    pub processor: &'a dyn BinaryProcessor,
}

impl<'a> BundleCopier<'a> {
    /// Copy the bundle containing `binaries` to `output_path`, then fix up each binary:
    /// mode 0755, optional slice extraction per `plan`, optional bitcode stripping.
    ///
    /// Every binary must resolve to the same bundle root; this is checked before
    /// anything is written. Returns the source bundle root.
    pub fn copy(
        &self,
        binaries: &[PathBuf],
        output_path: &Path,
        plan: &SlicePlan,
        strip_bitcode: bool,
    ) -> Result<PathBuf, CopyError> {
        if binaries.is_empty() || output_path.as_os_str().is_empty() {
            return Err(CopyError::EmptyInput);
        }
        let (framework_root, locations) = locator::locate_all(binaries)?;

        fs::remove_if_exists(output_path).map_err(|source| CopyError::Io {
            action: "remove stale copy",
            path: output_path.to_path_buf(),
            source,
        })?;
        log::info!("Copying {} to {}", framework_root.display(), output_path.display());
        fs::copy_tree(&framework_root, output_path).map_err(|source| CopyError::Io {
            action: "copy framework",
            path: framework_root.clone(),
            source,
        })?;

        for location in &locations {
            let output_binary = output_path.join(&location.relative_path);
            fs::make_executable(&output_binary).map_err(|source| CopyError::Io {
                action: "set permissions on",
                path: output_binary.clone(),
                source,
            })?;

            if let Some(archs) = plan.retained() {
                log::debug!("Extracting {archs} from {}", output_binary.display());
                self.processor.extract(&output_binary, archs, &output_binary).map_err(
                    |source| CopyError::Tool {
                        action: "extract slices from",
                        binary: output_binary.clone(),
                        source,
                    },
                )?;
            }
            if strip_bitcode {
                log::debug!("Stripping bitcode from {}", output_binary.display());
                self.processor.strip_bitcode(&output_binary, &output_binary).map_err(
                    |source| CopyError::Tool {
                        action: "strip bitcode from",
                        binary: output_binary.clone(),
                        source,
                    },
                )?;
            }
        }

        Ok(framework_root)
    }
}
