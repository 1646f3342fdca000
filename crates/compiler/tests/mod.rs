use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use fixbuf_compiler::{compile_file, compile_scenario, CompilerOptions, Scenario};
use fixbuf_test_utils::{discover_all_fixtures, fixture_path, init_test_tracing, read_fixture};

fn compiler(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fixbuf-compiler"))
        .arg("--input")
        .arg(input)
        .args(args)
        .output()
        .expect("Failed to run the compiler binary")
}

#[test]
fn test_all_fixtures_meet_their_expectations() {
    init_test_tracing();
    let fixtures = discover_all_fixtures();
    assert!(!fixtures.is_empty(), "No fixtures found in test_data");

    let mut failures = Vec::new();
    for path in &fixtures {
        let scenario = Scenario::parse(&read_fixture(path))
            .unwrap_or_else(|e| panic!("Failed to parse fixture '{path}': {e}"));
        let expect = scenario
            .expect
            .as_ref()
            .unwrap_or_else(|| panic!("Fixture '{path}' has no [expect] table"));
        let output = compile_scenario(&scenario, &scenario.options)
            .unwrap_or_else(|e| panic!("Failed to compile fixture '{path}': {e}"));
        failures.extend(
            output
                .check(expect)
                .into_iter()
                .map(|mismatch| format!("{path}: {mismatch}")),
        );
    }
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}

#[test]
fn test_missing_member_option_overrides_the_fixture() {
    let scenario = Scenario::parse(&read_fixture("access/slices.toml")).unwrap();
    let mut options = scenario.options.clone();
    options.add_missing_members(["readonly-span-slice", "span-slice"].map(String::from));

    let output = compile_scenario(&scenario, &options).unwrap();
    assert_eq!(
        output.codes(),
        vec!["missing-required-member", "missing-required-member"]
    );
    assert!(output.lowered().is_empty());
    let run = output.execution.expect("run was requested");
    assert!(run.outcome.is_err());
}

#[test]
fn test_unknown_member_option_is_rejected() {
    let scenario = Scenario::default();
    let options = CompilerOptions {
        missing_members: vec!["span-splice".to_string()],
        ..CompilerOptions::default()
    };
    let error = compile_scenario(&scenario, &options).unwrap_err();
    assert_eq!(error.to_string(), "unknown well-known member 'span-splice'");
}

#[test]
fn test_compile_file_reports_missing_file() {
    let error = compile_file(&PathBuf::from("does/not/exist.toml")).unwrap_err();
    assert!(error.to_string().starts_with("failed to read 'does/not/exist.toml'"));
}

#[test]
fn test_cli_succeeds_on_clean_scenario() {
    let res = compiler(&["--check"], &fixture_path("access/write_read.toml"));
    let stdout = String::from_utf8_lossy(&res.stdout);
    assert!(
        res.status.success(),
        "Compiler failed with error: {}",
        String::from_utf8_lossy(&res.stderr)
    );
    assert!(stdout.contains("Run of 'Main' returned: 111"), "{stdout}");
    assert!(stdout.contains("0 error(s) in 1 method(s), 1 lowered"), "{stdout}");
}

#[test]
fn test_cli_fails_on_diagnostics() {
    let res = compiler(&["--no-color"], &fixture_path("ref_safety/readonly_receiver.toml"));
    let stdout = String::from_utf8_lossy(&res.stdout);
    assert_eq!(res.status.code(), Some(1));
    assert!(stdout.contains("method 'Main':"), "{stdout}");
    assert!(stdout.contains("1 error(s) in 1 method(s), 0 lowered"), "{stdout}");
}

#[test]
fn test_cli_check_accepts_expected_failures() {
    let res = compiler(&["--check"], &fixture_path("ref_safety/readonly_receiver.toml"));
    assert!(
        res.status.success(),
        "Expectations not met: {}",
        String::from_utf8_lossy(&res.stderr)
    );
}

#[test]
fn test_cli_json_report() {
    let res = compiler(
        &["--json", "--missing-member", "span-slice"],
        &fixture_path("access/slices.toml"),
    );
    assert_eq!(res.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&res.stdout).unwrap();
    let method = &report["methods"][0];
    assert_eq!(method["name"], "Main");
    assert_eq!(method["lowered"], false);
    assert_eq!(method["diagnostics"][0]["code"], "missing-required-member");
    assert_eq!(method["diagnostics"][0]["severity"], "error");
    assert_eq!(report["execution"]["error"], "unknown-method");
}

#[test]
fn test_cli_check_reports_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrong.toml");
    let text = read_fixture("access/write_read.toml").replace("result = 111", "result = 112");
    std::fs::write(&path, text).unwrap();

    let res = compiler(&["--check"], &path);
    let stderr = String::from_utf8_lossy(&res.stderr);
    assert_eq!(res.status.code(), Some(1));
    assert!(stderr.contains("expectation not met: result"), "{stderr}");
}

#[test]
fn test_cli_rejects_malformed_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[[methods]]\nname = 1\n").unwrap();

    let res = compiler(&[], &path);
    let stderr = String::from_utf8_lossy(&res.stderr);
    assert!(!res.status.success());
    assert!(stderr.contains("Error loading scenario"), "{stderr}");
}
