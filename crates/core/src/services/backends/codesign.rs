use std::path::Path;
use std::process::Command;

use crate::backends::{Signer, SigningRequest, ToolError};

/// Signer that runs the `codesign` executable named in the request once per target.
pub struct CodesignSigner;

/// Arguments passed to `codesign` for a single target.
pub fn codesign_args(request: &SigningRequest, target: &Path) -> Vec<String> {
    let mut args = vec!["-v".to_string(), "--sign".to_string(), request.identity.clone()];
    if request.force {
        args.push("--force".to_string());
    }
    if let Some(entitlements) = &request.entitlements {
        args.push("--entitlements".to_string());
        args.push(entitlements.display().to_string());
    }
    if request.disable_timestamp {
        args.push("--timestamp=none".to_string());
    }
    args.push(target.display().to_string());
    args
}

impl Signer for CodesignSigner {
    fn sign(&self, request: &SigningRequest) -> Result<(), ToolError> {
        if request.disable_signing {
            log::info!("Signing disabled; leaving bundle unsigned");
            return Ok(());
        }

        let tool = request.codesign.display().to_string();
        for target in request.paths_to_sign() {
            log::info!("Signing {} with identity {}", target.display(), request.identity);
            let output = Command::new(&request.codesign)
                .args(codesign_args(request, target))
                .output()
                .map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;
            if !output.status.success() {
                return Err(ToolError::Failed {
                    tool: tool.clone(),
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }
        Ok(())
    }
}
