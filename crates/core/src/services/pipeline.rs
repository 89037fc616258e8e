use std::path::PathBuf;

use thiserror::Error;

use crate::backends::{BinaryProcessor, Signer, SigningRequest, ToolError};
use crate::model::{ArchSet, SlicePlan};
use crate::planner::{self, PlanError};
use crate::services::archive::{self, ArchiveError};
use crate::services::copier::{BundleCopier, CopyError};
use crate::services::fs;

/// Inputs for one framework processing run.
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    /// Absolute paths of the binary members of the imported framework.
    pub framework_binaries: Vec<PathBuf>,
    /// Architectures required by the target, possibly `sim_`-prefixed.
    pub slices: Vec<String>,
    pub strip_bitcode: bool,
    /// Non-binary framework files; they travel with the bundle copy.
    pub framework_files: Vec<PathBuf>,
    /// Staging directory, destroyed and recreated by the run.
    pub temp_path: PathBuf,
    pub output_zip: PathBuf,
    /// Keep the staging directory after a successful run.
    pub keep_temp_path: bool,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub framework_root: PathBuf,
    pub framework_archs: ArchSet,
    pub plan: SlicePlan,
    pub output_zip: PathBuf,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No architectures found in framework binaries: {binaries:?}")]
    NoArchitecturesFound { binaries: Vec<PathBuf> },
    #[error("Failed to read framework architectures: {0}")]
    Inspect(#[source] ToolError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Failed to remove stale output {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error("Signing failed: {0}")]
    Signing(#[source] ToolError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ProcessError {
    /// Process exit status for this failure.
    ///
    /// Signing failures keep the signer's own status; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Signing(err) => err.exit_code().filter(|code| *code != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Runs locate → plan → copy → sign → package for one imported framework.
pub struct FrameworkPipeline<'a> {
    pub processor: &'a dyn BinaryProcessor,
    pub signer: &'a dyn Signer,
}

impl<'a> FrameworkPipeline<'a> {
    /// Process one framework. On any failure the staging directory and output
    /// archive are removed so a later run never mistakes them for fresh output.
    pub fn run(
        &self,
        request: &ProcessRequest,
        signing: &SigningRequest,
    ) -> Result<ProcessOutcome, ProcessError> {
        let result = self.run_steps(request, signing);
        if let Err(err) = &result {
            log::error!("{err}");
            for path in [&request.temp_path, &request.output_zip] {
                if path.as_os_str().is_empty() {
                    continue;
                }
                if let Err(cleanup_err) = fs::remove_if_exists(path) {
                    log::warn!("Failed to clean up {}: {cleanup_err}", path.display());
                }
            }
        }
        result
    }

    fn run_steps(
        &self,
        request: &ProcessRequest,
        signing: &SigningRequest,
    ) -> Result<ProcessOutcome, ProcessError> {
        let required_archs = ArchSet::from_slices(&request.slices);
        let framework_archs = self
            .processor
            .architectures_of(&request.framework_binaries)
            .map_err(ProcessError::Inspect)?;
        if framework_archs.is_empty() {
            return Err(ProcessError::NoArchitecturesFound {
                binaries: request.framework_binaries.clone(),
            });
        }

        let plan = planner::plan_slices(&framework_archs, &required_archs)?;
        match plan.retained() {
            Some(archs) => log::info!("Framework has {framework_archs}; keeping {archs}"),
            None => log::info!("Framework has {framework_archs}; copying binaries as-is"),
        }

        for stale in [&request.temp_path, &request.output_zip] {
            fs::remove_if_exists(stale)
                .map_err(|source| ProcessError::Cleanup { path: stale.clone(), source })?;
        }

        if !request.framework_files.is_empty() {
            log::debug!(
                "{} framework files carried with the bundle",
                request.framework_files.len()
            );
        }
        let copier = BundleCopier { processor: self.processor };
        let framework_root = copier.copy(
            &request.framework_binaries,
            &request.temp_path,
            &plan,
            request.strip_bitcode,
        )?;

        let mut signing = signing.clone();
        if signing.targets_to_sign.is_empty() && signing.directories_to_sign.is_empty() {
            signing.directories_to_sign.push(request.temp_path.clone());
        }
        self.signer.sign(&signing).map_err(ProcessError::Signing)?;

        archive::package(&request.temp_path, &request.output_zip)?;
        log::info!("Wrote {}", request.output_zip.display());

        if !request.keep_temp_path {
            fs::remove_if_exists(&request.temp_path).map_err(|source| ProcessError::Cleanup {
                path: request.temp_path.clone(),
                source,
            })?;
        }

        Ok(ProcessOutcome {
            framework_root,
            framework_archs,
            plan,
            output_zip: request.output_zip.clone(),
        })
    }
}
