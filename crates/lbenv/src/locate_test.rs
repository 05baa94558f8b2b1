// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, "<env:config/>").expect("Failed to write file");
}

#[rstest]
fn test_absolute_path_is_returned_as_is() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("Some.xml");
    touch(&file);

    let found = locate(&file.to_string_lossy(), None, None, &[], &[]).expect("Should locate");
    assert_eq!(found, file);
}

#[rstest]
fn test_missing_absolute_path_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("Missing.xml");

    match locate(&file.to_string_lossy(), None, None, &[], &[]) {
        Err(crate::Error::IncludeNotFound { path, error }) => {
            assert_eq!(path, file);
            assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected IncludeNotFound, got: {:?}", other),
    }
}

#[rstest]
fn test_absolute_directory_is_not_matched() {
    let tmp = TempDir::new().unwrap();
    let result = locate(&tmp.path().to_string_lossy(), None, None, &[], &[]);
    assert!(matches!(result, Err(crate::Error::IncludeNotFound { .. })));
}

#[rstest]
fn test_caller_directory_wins_over_search_path() {
    let tmp = TempDir::new().unwrap();
    let caller = tmp.path().join("proj").join("Caller.xml");
    touch(&caller);
    touch(&tmp.path().join("proj").join("Inc.xml"));
    touch(&tmp.path().join("search").join("Inc.xml"));

    let found = locate(
        "Inc.xml",
        Some(&caller),
        None,
        &[tmp.path().join("search")],
        &[],
    )
    .expect("Should locate");
    assert_eq!(found, tmp.path().join("proj").join("Inc.xml"));
}

#[rstest]
fn test_caller_hints_win_over_search_path() {
    let tmp = TempDir::new().unwrap();
    let caller = tmp.path().join("proj").join("Caller.xml");
    touch(&caller);
    touch(&tmp.path().join("proj").join("sub2").join("Inc.xml"));
    touch(&tmp.path().join("search").join("Inc.xml"));

    let found = locate(
        "Inc.xml",
        Some(&caller),
        Some("sub1:sub2"),
        &[tmp.path().join("search")],
        &[],
    )
    .expect("Should locate");
    assert_eq!(found, tmp.path().join("proj").join("sub2").join("Inc.xml"));
}

#[rstest]
fn test_search_path_wins_over_default_path() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("search").join("Inc.xml"));
    touch(&tmp.path().join("default").join("Inc.xml"));

    let found = locate(
        "Inc.xml",
        None,
        None,
        &[tmp.path().join("search")],
        &[tmp.path().join("default")],
    )
    .expect("Should locate");
    assert_eq!(found, tmp.path().join("search").join("Inc.xml"));
}

#[rstest]
fn test_hints_as_given_are_searched() {
    let tmp = TempDir::new().unwrap();
    let hint = tmp.path().join("hinted");
    touch(&hint.join("Inc.xml"));

    let hints = format!("{};/does/not/exist", hint.display());
    let found = locate("Inc.xml", None, Some(&hints), &[], &[]).expect("Should locate");
    assert_eq!(found, hint.join("Inc.xml"));
}

#[rstest]
fn test_default_path_is_the_last_resort() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("default").join("Inc.xml"));

    let found = locate(
        "Inc.xml",
        None,
        None,
        &[tmp.path().join("search")],
        &[tmp.path().join("default")],
    )
    .expect("Should locate");
    assert_eq!(found, tmp.path().join("default").join("Inc.xml"));
}

#[rstest]
fn test_directories_are_not_matched() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("search").join("Inc.xml")).unwrap();

    let result = locate("Inc.xml", None, None, &[tmp.path().join("search")], &[]);
    assert!(result.is_err());
}

#[rstest]
fn test_missing_file_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    match locate("Nowhere.xml", None, None, &[tmp.path().to_path_buf()], &[]) {
        Err(crate::Error::IncludeNotFound { path, error }) => {
            assert_eq!(path, Path::new("Nowhere.xml"));
            assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected IncludeNotFound, got: {:?}", other),
    }
}

#[rstest]
fn test_located_paths_are_cleaned() {
    let tmp = TempDir::new().unwrap();
    let caller = tmp.path().join("a").join("Caller.xml");
    touch(&caller);
    touch(&tmp.path().join("b").join("Inc.xml"));

    let found = locate("../b/Inc.xml", Some(&caller), None, &[], &[]).expect("Should locate");
    assert_eq!(found, tmp.path().join("b").join("Inc.xml"));
}
