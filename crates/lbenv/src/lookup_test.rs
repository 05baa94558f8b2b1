// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

const PLATFORM: &str = "x86_64-centos7-gcc9-opt";

fn install_area(root: &Path, project_dir: &str) -> PathBuf {
    let dir = root.join(project_dir).join("InstallArea").join(PLATFORM);
    std::fs::create_dir_all(&dir).expect("Failed to create install area");
    dir
}

fn mkdirs(root: &Path, rel: &str) -> PathBuf {
    let dir = root.join(rel);
    std::fs::create_dir_all(&dir).expect("Failed to create dir");
    dir
}

#[rstest]
fn test_find_project_versioned() {
    let tmp = TempDir::new().unwrap();
    let expected = install_area(tmp.path(), "Gaudi_v33r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    let found = locator
        .find_project("Gaudi", "v33r0", PLATFORM)
        .expect("Should find project");
    assert_eq!(found, expected);
}

#[rstest]
fn test_find_project_upper_case_layout() {
    let tmp = TempDir::new().unwrap();
    let expected = install_area(tmp.path(), "GAUDI/GAUDI_v33r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    let found = locator
        .find_project("Gaudi", "v33r0", PLATFORM)
        .expect("Should find project");
    assert_eq!(found, expected);
}

#[rstest]
fn test_find_project_prefers_plain_versioned_dir() {
    let tmp = TempDir::new().unwrap();
    let expected = install_area(tmp.path(), "Gaudi_v33r0");
    install_area(tmp.path(), "GAUDI/GAUDI_v33r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert_eq!(
        locator.find_project("Gaudi", "v33r0", PLATFORM).unwrap(),
        expected
    );
}

#[rstest]
fn test_find_project_latest_accepts_bare_name() {
    let tmp = TempDir::new().unwrap();
    let expected = install_area(tmp.path(), "Gaudi");
    install_area(tmp.path(), "Gaudi_latest");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert_eq!(
        locator.find_project("Gaudi", LATEST, PLATFORM).unwrap(),
        expected
    );
}

#[rstest]
fn test_find_project_bare_name_needs_latest() {
    let tmp = TempDir::new().unwrap();
    install_area(tmp.path(), "Gaudi");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert!(locator.find_project("Gaudi", "v33r0", PLATFORM).is_err());
}

#[rstest]
fn test_find_project_first_root_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    install_area(second.path(), "Gaudi_v33r0");
    let expected = install_area(first.path(), "GAUDI/GAUDI_v33r0");

    let locator = Locator::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
    assert_eq!(
        locator.find_project("Gaudi", "v33r0", PLATFORM).unwrap(),
        expected
    );
}

#[rstest]
fn test_find_project_wrong_platform() {
    let tmp = TempDir::new().unwrap();
    install_area(tmp.path(), "Gaudi_v33r0");

    let roots = vec![tmp.path().to_path_buf()];
    let locator = Locator::new(roots.clone());
    match locator.find_project("Gaudi", "v33r0", "other-platform") {
        Err(Error::ProjectNotFound {
            name,
            version,
            platform,
            roots: searched,
        }) => {
            assert_eq!(name, "Gaudi");
            assert_eq!(version, "v33r0");
            assert_eq!(platform, "other-platform");
            assert_eq!(searched, roots);
        }
        other => panic!("Expected ProjectNotFound, got: {:?}", other),
    }
}

#[rstest]
#[case("v10r1", "v9r2")]
#[case("v1r2", "v1r1")]
#[case("v1r1p1", "v1r1")]
#[case("v2r0", "v1r99")]
#[case("v1r10", "v1r9")]
fn test_version_ordering(#[case] higher: &str, #[case] lower: &str) {
    assert!(DataPackageVersion::new(higher) > DataPackageVersion::new(lower));
}

#[rstest]
fn test_version_ordering_is_total() {
    let mut versions: Vec<_> = ["v9r2", "v10r1", "v1r1", "v1r2", "v1r1p1"]
        .into_iter()
        .map(DataPackageVersion::new)
        .collect();
    versions.sort();
    let sorted: Vec<_> = versions.iter().map(|v| v.as_str()).collect();
    assert_eq!(sorted, vec!["v1r1", "v1r1p1", "v1r2", "v9r2", "v10r1"]);
}

#[rstest]
fn test_find_data_package_highest_match() {
    let tmp = TempDir::new().unwrap();
    mkdirs(tmp.path(), "DBASE/Det/SQLDDDB/v7r9");
    let expected = mkdirs(tmp.path(), "DBASE/Det/SQLDDDB/v7r10");
    mkdirs(tmp.path(), "DBASE/Det/SQLDDDB/v8r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    let found = locator
        .find_data_package("Det/SQLDDDB", "v7r*")
        .expect("Should find data package");
    assert_eq!(found, expected);
}

#[rstest]
fn test_find_data_package_exact_match_short_circuits() {
    let tmp = TempDir::new().unwrap();
    let expected = mkdirs(tmp.path(), "PARAM/ParamFiles/v8r1");
    mkdirs(tmp.path(), "ParamFiles/v9r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    let found = locator.find_data_package("ParamFiles", "v8r1").unwrap();
    assert_eq!(found, expected);
}

#[rstest]
fn test_find_data_package_across_containers() {
    let tmp = TempDir::new().unwrap();
    mkdirs(tmp.path(), "AppConfig/v3r1");
    let expected = mkdirs(tmp.path(), "EXTRAPACKAGES/AppConfig/v3r10");
    mkdirs(tmp.path(), "DBASE/AppConfig/v3r2");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert_eq!(
        locator.find_data_package("AppConfig", "v3r*").unwrap(),
        expected
    );
}

#[rstest]
fn test_find_data_package_ignores_files() {
    let tmp = TempDir::new().unwrap();
    let dir = mkdirs(tmp.path(), "AppConfig");
    std::fs::write(dir.join("v9r9"), "").unwrap();
    let expected = mkdirs(tmp.path(), "AppConfig/v1r0");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert_eq!(locator.find_data_package("AppConfig", "*").unwrap(), expected);
}

#[rstest]
fn test_find_data_package_not_found() {
    let tmp = TempDir::new().unwrap();
    mkdirs(tmp.path(), "AppConfig/v3r1");

    let locator = Locator::new(vec![tmp.path().to_path_buf()]);
    assert!(matches!(
        locator.find_data_package("AppConfig", "v4r*"),
        Err(Error::DataPackageNotFound { .. })
    ));
    assert!(matches!(
        locator.find_data_package("Missing", "*"),
        Err(Error::DataPackageNotFound { .. })
    ));
}

#[rstest]
fn test_find_data_package_bad_pattern() {
    let locator = Locator::new(vec![]);
    assert!(matches!(
        locator.find_data_package("AppConfig", "v[3"),
        Err(Error::InvalidVersionPattern { .. })
    ));
}
