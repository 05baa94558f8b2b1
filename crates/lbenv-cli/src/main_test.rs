// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn parse(args: &[&str]) -> Opt {
    Opt::try_parse_from(std::iter::once("lbx").chain(args.iter().copied()))
        .expect("Should parse arguments")
}

#[rstest]
fn test_run_project_order() {
    let opt = parse(&[
        "run",
        "--use-grid",
        "--overriding-projects",
        "phys:v20r1,Analysis",
        "--runtime-projects",
        "bender",
        "davinci:v45r1",
        "--",
        "echo",
        "hello",
    ]);
    let Command::Run(cmd) = opt.cmd else {
        panic!("Expected the run command");
    };

    assert_eq!(cmd.command, vec!["echo", "hello"]);
    let names: Vec<_> = cmd
        .projects
        .selection()
        .projects()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        names,
        vec![
            "LHCbGrid:latest",
            "Phys:v20r1",
            "Analysis:latest",
            "DaVinci:v45r1",
            "Bender:latest",
        ]
    );
}

#[rstest]
fn test_run_defaults_to_shell() {
    let opt = parse(&["run", "Gaudi"]);
    let Command::Run(cmd) = opt.cmd else {
        panic!("Expected the run command");
    };
    assert!(cmd.command.is_empty());
    assert_eq!(cmd.projects.selection().projects().len(), 1);
}

#[rstest]
fn test_missing_project_is_rejected() {
    assert!(Opt::try_parse_from(["lbx", "env"]).is_err());
    assert!(Opt::try_parse_from(["lbx", "env", ":v1"]).is_err());
}

#[rstest]
#[case(&["env", "Gaudi"], 0)]
#[case(&["env", "--strip-empty-dirs", "Gaudi"], 1)]
#[case(&["env", "--python-zip", "--strip-empty-dirs", "Gaudi"], 2)]
fn test_processor_flags(#[case] args: &[&str], #[case] expected: usize) {
    let Command::Env(cmd) = parse(args).cmd else {
        panic!("Expected the env command");
    };
    assert_eq!(cmd.processors.processors().len(), expected);
}

#[rstest]
fn test_search_flags_apply() {
    let flags = SearchFlags {
        dev_dirs: vec![PathBuf::from("/dev/a"), PathBuf::from("/dev/b")],
        platform: Some("x86_64-slc6-gcc49-dbg".to_string()),
    };
    let config = flags.apply(Config {
        project_path: vec![PathBuf::from("/sw/lib")],
        ..Config::default()
    });
    assert_eq!(
        config.project_path,
        vec![
            PathBuf::from("/dev/a"),
            PathBuf::from("/dev/b"),
            PathBuf::from("/sw/lib"),
        ]
    );
    assert_eq!(config.platform, "x86_64-slc6-gcc49-dbg");

    let untouched = SearchFlags::default().apply(Config::default());
    assert_eq!(untouched, Config::default());
}

#[rstest]
fn test_which_default_version() {
    let Command::Which(cmd) = parse(&["which", "-c", "some-platform", "gaudi"]).cmd else {
        panic!("Expected the which command");
    };
    assert_eq!(cmd.project, "gaudi");
    assert_eq!(cmd.version, lbenv::LATEST);
    assert_eq!(cmd.search.platform.as_deref(), Some("some-platform"));
}

#[rstest]
fn test_pkg_subcommands() {
    assert!(matches!(
        parse(&["pkg", "index", "--exclude", "dirac,lhcbint", "--refresh"]).cmd,
        Command::Pkg(_)
    ));
    assert!(matches!(
        parse(&["-v", "pkg", "ls", "--hat", "Phys/"]).cmd,
        Command::Pkg(_)
    ));
}
