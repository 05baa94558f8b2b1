// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
#[case("davinci", "DaVinci")]
#[case("LHCB", "LHCb")]
#[case("Gaudi", "Gaudi")]
#[case("MyOwnProject", "MyOwnProject")]
fn test_fix_project_case(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(fix_project_case(name), expected);
}

#[rstest]
#[case("DaVinci", "DaVinci", "latest")]
#[case("davinci:v45r1", "DaVinci", "v45r1")]
#[case("Gaudi:", "Gaudi", "latest")]
#[case(" lhcb : v50r0 ", "LHCb", "v50r0")]
fn test_parse_request(#[case] input: &str, #[case] name: &str, #[case] version: &str) {
    let request: ProjectRequest = input.parse().expect("Should parse request");
    assert_eq!(request, ProjectRequest::new(name, version));
}

#[rstest]
#[case("")]
#[case(":v1r0")]
fn test_parse_request_without_name(#[case] input: &str) {
    assert!(input.parse::<ProjectRequest>().is_err());
}

#[rstest]
fn test_recipe_name() {
    let request: ProjectRequest = "brunel:v60r0".parse().unwrap();
    assert_eq!(request.recipe_name(), "BrunelEnvironment.xml");
    assert_eq!(request.to_string(), "Brunel:v60r0");
}
