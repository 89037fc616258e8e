use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::backends::{BinaryProcessor, ToolError};
use crate::config::ToolConfig;
use crate::model::ArchSet;

/// `lipo` / `bitcode_strip` backend that shells out through `xcrun`.
pub struct XcrunProcessor {
    xcrun: PathBuf,
}

impl XcrunProcessor {
    pub fn new(config: &ToolConfig) -> Self {
        Self { xcrun: config.xcrun.clone() }
    }

    fn run(&self, tool: &str, args: &[&OsStr]) -> Result<String, ToolError> {
        let output = Command::new(&self.xcrun)
            .arg(tool)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn { tool: format!("xcrun {tool}"), source })?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: format!("xcrun {tool}"),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Parse `lipo -info` output.
///
/// Handles both shapes:
/// - `Architectures in the fat file: /p/Foo are: armv7 arm64`
/// - `Non-fat file: /p/Foo is architecture: arm64`
pub fn parse_lipo_info(stdout: &str) -> ArchSet {
    let mut archs = ArchSet::new();
    for line in stdout.lines() {
        if let Some((_, tail)) = line.rsplit_once(':') {
            for arch in tail.split_whitespace() {
                archs.insert(arch);
            }
        }
    }
    archs
}

impl BinaryProcessor for XcrunProcessor {
    fn architectures_of(&self, binaries: &[PathBuf]) -> Result<ArchSet, ToolError> {
        let mut found = ArchSet::new();
        for binary in binaries {
            let stdout = self.run("lipo", &[OsStr::new("-info"), binary.as_os_str()])?;
            let archs = parse_lipo_info(&stdout);
            log::debug!("{} contains {archs}", binary.display());
            found.extend(archs);
        }
        Ok(found)
    }

    fn extract(&self, binary: &Path, archs: &ArchSet, output: &Path) -> Result<(), ToolError> {
        let mut args: Vec<&OsStr> = vec![binary.as_os_str()];
        if archs.len() == 1 {
            args.push(OsStr::new("-thin"));
            args.extend(archs.iter().map(OsStr::new));
        } else {
            for arch in archs.iter() {
                args.push(OsStr::new("-extract"));
                args.push(OsStr::new(arch));
            }
        }
        args.push(OsStr::new("-output"));
        args.push(output.as_os_str());
        self.run("lipo", &args).map(|_| ())
    }

    fn strip_bitcode(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(
            "bitcode_strip",
            &[input.as_os_str(), OsStr::new("-r"), OsStr::new("-o"), output.as_os_str()],
        )
        .map(|_| ())
    }
}
