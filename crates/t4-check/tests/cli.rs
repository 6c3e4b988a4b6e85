//! End-to-end tests for the `t4-check` binary.
//!
//! Each test lays out a throwaway workspace, runs the binary against it and
//! checks the exit code and the output. Diagnostics are compared through the
//! JSON output where exact locations matter.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use std::process::{Command, Output};

// ============================================================================
// TEST INFRASTRUCTURE
// ============================================================================

const CLEAN: &str = "<#@ template language=\"C#\" #>\nHello <#= DateTime.Now #>\n";
const BAD_ENCODING: &str = "<#@ output extension=\".cs\" encoding=\"uft-8\" #>\n";

/// A diagnostic from the JSON output
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct JsonDiagnostic {
    #[serde(rename = "type")]
    diagnostic_type: String,
    filename: String,
    start: JsonPosition,
    end: JsonPosition,
    message: String,
    code: String,
    source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct JsonPosition {
    line: u32,
    column: u32,
    offset: u32,
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        for (path, content) in files {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Self { _dir: dir, root }
    }

    fn check(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_t4-check"))
            .arg("--workspace")
            .arg(self.root.as_str())
            .args(extra)
            .env_remove("T4_CHECK_LOG")
            .output()
            .unwrap()
    }

    fn check_json(&self, extra: &[&str]) -> (Output, Vec<JsonDiagnostic>) {
        let mut args = vec!["--output", "json"];
        args.extend_from_slice(extra);
        let output = self.check(&args);
        let diagnostics = serde_json::from_slice(&output.stdout).unwrap();
        (output, diagnostics)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn filenames(diagnostics: &[JsonDiagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| d.filename.replace('\\', "/"))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_clean_workspace_succeeds() {
    let workspace = Workspace::new(&[("Model.tt", CLEAN), ("Model.cs", "class Model {}")]);
    let output = workspace.check(&[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).ends_with("t4-check found 0 errors in 0 of 1 file\n"));
}

#[test]
fn test_errors_fail_the_run() {
    let workspace = Workspace::new(&[("Model.tt", CLEAN), ("Bad.tt", BAD_ENCODING)]);
    let output = workspace.check(&[]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.starts_with("Bad.tt:1:38\n"), "{text}");
    assert!(text.contains("(unknown-attribute-value)"));
    assert!(text.ends_with("t4-check found 1 error in 1 of 2 files\n"));
}

#[test]
fn test_json_output() {
    let workspace = Workspace::new(&[
        ("Bad.tt", BAD_ENCODING),
        ("nested/Broken.t4", "text <# unterminated"),
    ]);
    let (output, diagnostics) = workspace.check_json(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(filenames(&diagnostics), vec!["Bad.tt", "nested/Broken.t4"]);

    let encoding = &diagnostics[0];
    assert_eq!(encoding.code, "unknown-attribute-value");
    assert_eq!(encoding.source, "schema");
    assert_eq!((encoding.start.line, encoding.start.column), (1, 38));
    assert_eq!((encoding.end.line, encoding.end.column), (1, 43));

    let unterminated = &diagnostics[1];
    assert_eq!(unterminated.code, "unexpected-eof");
    assert_eq!(unterminated.source, "syntax");
    assert_eq!(unterminated.diagnostic_type, "Error");
}

#[test]
fn test_machine_output() {
    let workspace = Workspace::new(&[("Bad.tt", BAD_ENCODING)]);
    let output = workspace.check(&["--output", "machine"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with(
        "ERROR Bad.tt:1:38:1:43 unknown value \"uft-8\" for the encoding attribute (unknown-attribute-value)\n"
    ));
}

#[test]
fn test_ignore_patterns() {
    let workspace = Workspace::new(&[
        ("Model.tt", CLEAN),
        ("generated/Bad.tt", BAD_ENCODING),
        ("obj/Debug/Bad.tt", BAD_ENCODING),
    ]);

    let output = workspace.check(&["--ignore", "generated/**"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).ends_with("0 errors in 0 of 1 file\n"));

    let (_, diagnostics) = workspace.check_json(&[]);
    assert_eq!(filenames(&diagnostics), vec!["generated/Bad.tt"]);
}

#[test]
fn test_config_file() {
    let workspace = Workspace::new(&[
        (
            "t4check.json",
            r#"{ "extensions": [".tpl"], "exclude": ["vendor/**"] }"#,
        ),
        ("Bad.tt", BAD_ENCODING),
        ("Bad.tpl", BAD_ENCODING),
        ("vendor/Bad.tpl", BAD_ENCODING),
    ]);
    let (output, diagnostics) = workspace.check_json(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(filenames(&diagnostics), vec!["Bad.tpl"]);
}

#[test]
fn test_unreadable_template_fails_the_run() {
    let workspace = Workspace::new(&[("Clean.tt", CLEAN)]);
    fs::write(workspace.root.join("Latin1.tt"), b"caf\xe9").unwrap();
    let output = workspace.check(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).ends_with("0 errors in 0 of 2 files (1 could not be read)\n"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read Latin1.tt"));
}

#[test]
fn test_invalid_workspace() {
    let workspace = Workspace::new(&[("Model.tt", CLEAN)]);
    let output = Command::new(env!("CARGO_BIN_EXE_t4-check"))
        .arg("--workspace")
        .arg(workspace.root.join("missing").as_str())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid workspace"));
}
