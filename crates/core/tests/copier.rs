#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::{archs, make_framework, FakeProcessor};
use framework_core::locator::LocatorError;
use framework_core::model::SlicePlan;
use framework_core::services::archive::package;
use framework_core::services::copier::{BundleCopier, CopyError};
use tempfile::tempdir;
use zip::ZipArchive;

#[test]
fn copy_requires_binaries_and_output_path() {
    let processor = FakeProcessor::default();
    let copier = BundleCopier { processor: &processor };
    let temp = tempdir().unwrap();
    let binary = make_framework(temp.path(), "Foo");

    let err = copier.copy(&[], &temp.path().join("out"), &SlicePlan::NoExtraction, false);
    assert!(matches!(err, Err(CopyError::EmptyInput)));

    let err = copier.copy(&[binary], std::path::Path::new(""), &SlicePlan::NoExtraction, false);
    assert!(matches!(err, Err(CopyError::EmptyInput)));
}

#[test]
fn copy_preserves_symlinks_and_marks_binaries_executable() {
    let temp = tempdir().unwrap();
    let binary = make_framework(&temp.path().join("src"), "Foo");
    let out = temp.path().join("staging").join("Foo.framework");

    let processor = FakeProcessor::default();
    let copier = BundleCopier { processor: &processor };
    let root = copier.copy(&[binary.clone()], &out, &SlicePlan::NoExtraction, false).unwrap();
    assert_eq!(root, temp.path().join("src").join("Foo.framework"));

    let current = out.join("Versions").join("Current");
    assert!(fs::symlink_metadata(&current).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&current).unwrap(), std::path::PathBuf::from("A"));
    let top_binary = out.join("Foo");
    assert!(fs::symlink_metadata(&top_binary).unwrap().file_type().is_symlink());

    let copied = out.join("Versions").join("A").join("Foo");
    assert_eq!(fs::read_to_string(&copied).unwrap(), "MACHO:Foo");
    assert_eq!(fs::metadata(&copied).unwrap().permissions().mode() & 0o777, 0o755);
    assert!(out.join("Versions/A/Resources/Info.plist").is_file());

    // The source bundle is untouched.
    assert_eq!(fs::metadata(&binary).unwrap().permissions().mode() & 0o777, 0o644);
    assert!(processor.calls().is_empty(), "no tool calls expected: {:?}", processor.calls());
}

#[test]
fn copy_extracts_and_strips_each_binary_in_place() {
    let temp = tempdir().unwrap();
    let binary = make_framework(temp.path(), "Foo");
    let out = temp.path().join("Staged.framework");

    let processor = FakeProcessor::default();
    let copier = BundleCopier { processor: &processor };
    copier.copy(&[binary], &out, &SlicePlan::Retain(archs(&["arm64", "x86_64"])), true).unwrap();

    let staged = out.join("Versions/A/Foo");
    assert_eq!(
        processor.calls(),
        vec![
            format!("extract {0} {{arm64, x86_64}} -> {0}", staged.display()),
            format!("strip {0} -> {0}", staged.display()),
        ]
    );
}

#[test]
fn copy_replaces_existing_output() {
    let temp = tempdir().unwrap();
    let binary = make_framework(temp.path(), "Foo");
    let out = temp.path().join("out.framework");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.txt"), "old").unwrap();

    let processor = FakeProcessor::default();
    BundleCopier { processor: &processor }
        .copy(&[binary], &out, &SlicePlan::NoExtraction, false)
        .unwrap();
    assert!(!out.join("stale.txt").exists());
    assert!(out.join("Versions/A/Foo").is_file());
}

#[test]
fn mismatched_roots_abort_before_touching_output() {
    let temp = tempdir().unwrap();
    let foo = make_framework(temp.path(), "Foo");
    let bar = make_framework(temp.path(), "Bar");
    let out = temp.path().join("out.framework");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("marker"), "keep").unwrap();

    let processor = FakeProcessor::default();
    let err = BundleCopier { processor: &processor }
        .copy(&[foo, bar], &out, &SlicePlan::NoExtraction, false)
        .unwrap_err();
    assert!(matches!(err, CopyError::Locator(LocatorError::RootMismatch { .. })));
    assert_eq!(fs::read_to_string(out.join("marker")).unwrap(), "keep");
    assert!(!out.join("Versions").exists());
}

#[test]
fn binary_outside_any_framework_is_rejected() {
    let temp = tempdir().unwrap();
    let loose = temp.path().join("libloose.dylib");
    fs::write(&loose, "bin").unwrap();
    let out = temp.path().join("out.framework");

    let processor = FakeProcessor::default();
    let err = BundleCopier { processor: &processor }
        .copy(&[loose], &out, &SlicePlan::NoExtraction, false)
        .unwrap_err();
    assert!(matches!(err, CopyError::Locator(LocatorError::RootNotFound(_))));
    assert!(!out.exists());
}

#[test]
fn extraction_failure_is_reported_with_binary_path() {
    let temp = tempdir().unwrap();
    let binary = make_framework(temp.path(), "Foo");
    let out = temp.path().join("out.framework");

    let processor = FakeProcessor { fail_extract: true, ..Default::default() };
    let err = BundleCopier { processor: &processor }
        .copy(&[binary], &out, &SlicePlan::Retain(archs(&["arm64"])), false)
        .unwrap_err();
    match err {
        CopyError::Tool { binary, .. } => assert_eq!(binary, out.join("Versions/A/Foo")),
        other => panic!("expected Tool error, got {other:?}"),
    }
}

#[test]
fn copy_keeps_directory_modes_through_packaging() {
    let temp = tempdir().unwrap();
    let binary = make_framework(&temp.path().join("src"), "Foo");
    let headers = temp.path().join("src").join("Foo.framework").join("Headers");
    fs::create_dir(&headers).unwrap();
    fs::write(headers.join("Foo.h"), "// Foo").unwrap();
    fs::set_permissions(&headers, fs::Permissions::from_mode(0o700)).unwrap();
    let out = temp.path().join("staging").join("Foo.framework");

    let processor = FakeProcessor::default();
    let copier = BundleCopier { processor: &processor };
    copier.copy(&[binary], &out, &SlicePlan::NoExtraction, false).unwrap();

    let staged = out.join("Headers");
    assert_eq!(fs::metadata(&staged).unwrap().permissions().mode() & 0o777, 0o700);
    assert_eq!(fs::read_to_string(staged.join("Foo.h")).unwrap(), "// Foo");

    let zip_path = temp.path().join("Foo.zip");
    package(&out, &zip_path).unwrap();
    let mut archive = ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let entry = archive.by_name("Foo.framework/Headers/").unwrap();
    assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o700);
}
