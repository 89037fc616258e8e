//! External tool seams.
//!
//! The pipeline never shells out directly. Architecture inspection, slice
//! extraction, bitcode stripping and code signing go through these traits so
//! the core can be exercised with in-process fakes. Process-backed
//! implementations live in `services::backends`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::ArchSet;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool ran and reported failure. `code` is `None` when it was killed by a signal.
    #[error("{tool} exited with status {code:?}: {stderr}")]
    Failed { tool: String, code: Option<i32>, stderr: String },
}

impl ToolError {
    /// Exit code reported by the tool, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolError::Spawn { .. } => None,
            ToolError::Failed { code, .. } => *code,
        }
    }
}

/// Inspects and rewrites fat binaries (the `lipo` / `bitcode_strip` role).
pub trait BinaryProcessor {
    /// Union of architectures found in `binaries`. May be empty.
    fn architectures_of(&self, binaries: &[PathBuf]) -> Result<ArchSet, ToolError>;

    /// Write `binary` to `output` keeping only `archs`. `output` may equal `binary`.
    fn extract(&self, binary: &Path, archs: &ArchSet, output: &Path) -> Result<(), ToolError>;

    /// Write `input` to `output` without embedded bitcode. `output` may equal `input`.
    fn strip_bitcode(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Options for the signing step, mirroring the signing tool's own flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub codesign: PathBuf,
    pub identity: String,
    pub entitlements: Option<PathBuf>,
    pub force: bool,
    pub disable_timestamp: bool,
    pub disable_signing: bool,
    pub targets_to_sign: Vec<PathBuf>,
    pub directories_to_sign: Vec<PathBuf>,
    pub signed_paths: Vec<PathBuf>,
}

impl SigningRequest {
    /// Ad-hoc signing request with no targets.
    pub fn ad_hoc(codesign: impl Into<PathBuf>) -> Self {
        Self {
            codesign: codesign.into(),
            identity: "-".to_string(),
            entitlements: None,
            force: false,
            disable_timestamp: false,
            disable_signing: false,
            targets_to_sign: Vec::new(),
            directories_to_sign: Vec::new(),
            signed_paths: Vec::new(),
        }
    }

    /// Paths to sign, in flag order, skipping anything listed as already signed.
    pub fn paths_to_sign(&self) -> Vec<&Path> {
        self.targets_to_sign
            .iter()
            .chain(self.directories_to_sign.iter())
            .filter(|path| !self.signed_paths.contains(*path))
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Signs the staged bundle in place.
pub trait Signer {
    fn sign(&self, request: &SigningRequest) -> Result<(), ToolError>;
}
