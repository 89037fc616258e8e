#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use framework_core::backends::{BinaryProcessor, Signer, SigningRequest, ToolError};
use framework_core::model::ArchSet;

/// Build a versioned framework bundle under `parent`:
///
/// ```text
/// <name>.framework/
///   Versions/A/<name>            (binary, mode 0644)
///   Versions/A/Resources/Info.plist
///   Versions/Current -> A
///   <name> -> Versions/Current/<name>
///   Resources -> Versions/Current/Resources
/// ```
///
/// Returns the absolute path of the binary inside `Versions/A`.
pub fn make_framework(parent: &Path, name: &str) -> PathBuf {
    let root = parent.join(format!("{name}.framework"));
    let version_dir = root.join("Versions").join("A");
    fs::create_dir_all(version_dir.join("Resources")).unwrap();
    let binary = version_dir.join(name);
    fs::write(&binary, format!("MACHO:{name}")).unwrap();
    fs::write(version_dir.join("Resources").join("Info.plist"), "<plist></plist>").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::{symlink, PermissionsExt};
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o644)).unwrap();
        symlink("A", root.join("Versions").join("Current")).unwrap();
        symlink(format!("Versions/Current/{name}"), root.join(name)).unwrap();
        symlink("Versions/Current/Resources", root.join("Resources")).unwrap();
    }

    binary
}

pub fn archs(names: &[&str]) -> ArchSet {
    names.iter().copied().collect()
}

/// In-process stand-in for lipo/bitcode_strip that records every call.
#[derive(Default)]
pub struct FakeProcessor {
    pub archs: ArchSet,
    pub fail_extract: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeProcessor {
    pub fn with_archs(names: &[&str]) -> Self {
        Self { archs: archs(names), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl BinaryProcessor for FakeProcessor {
    fn architectures_of(&self, _binaries: &[PathBuf]) -> Result<ArchSet, ToolError> {
        Ok(self.archs.clone())
    }

    fn extract(&self, binary: &Path, archs: &ArchSet, output: &Path) -> Result<(), ToolError> {
        self.calls.borrow_mut().push(format!(
            "extract {} {} -> {}",
            binary.display(),
            archs,
            output.display()
        ));
        if self.fail_extract {
            return Err(ToolError::Failed {
                tool: "lipo".into(),
                code: Some(1),
                stderr: "fake failure".into(),
            });
        }
        Ok(())
    }

    fn strip_bitcode(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls
            .borrow_mut()
            .push(format!("strip {} -> {}", input.display(), output.display()));
        Ok(())
    }
}

/// Signer that records requests and optionally fails with a fixed status.
#[derive(Default)]
pub struct FakeSigner {
    pub fail_with: Option<i32>,
    pub requests: RefCell<Vec<SigningRequest>>,
}

impl Signer for FakeSigner {
    fn sign(&self, request: &SigningRequest) -> Result<(), ToolError> {
        self.requests.borrow_mut().push(request.clone());
        match self.fail_with {
            Some(code) => Err(ToolError::Failed {
                tool: "codesign".into(),
                code: Some(code),
                stderr: "fake signing failure".into(),
            }),
            None => Ok(()),
        }
    }
}
