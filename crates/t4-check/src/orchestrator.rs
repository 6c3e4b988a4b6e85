//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::CheckConfig;
use crate::output::{CheckSummary, FormattedDiagnostic, Formatter};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use rayon::prelude::*;
use std::fs;
use std::time::Instant;
use t4_syntax::analyze;
use thiserror::Error;
use walkdir::WalkDir;

/// Directories that never contain templates worth checking.
const DEFAULT_IGNORES: &[&str] = &["**/.git/**", "**/bin/**", "**/obj/**", "**/node_modules/**"];

/// Errors that abort a check run.
#[derive(Debug, Error, Diagnostic)]
pub enum CheckError {
    /// The workspace path cannot be used.
    #[error("invalid workspace {path}: {reason}")]
    #[diagnostic(code(t4_check::invalid_workspace))]
    InvalidWorkspace {
        /// The path as given.
        path: Utf8PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(
        code(t4_check::invalid_glob),
        help("patterns are matched against paths relative to the workspace")
    )]
    InvalidGlob(String),

    /// Watch error.
    #[error("watch error: {0}")]
    #[diagnostic(code(t4_check::watch_failed))]
    WatchFailed(String),
}

/// Runs the check on all files.
pub fn run(args: &Args) -> Result<CheckSummary, CheckError> {
    let workspace = resolve_workspace(&args.workspace)?;
    let config = CheckConfig::load(&workspace);
    let ignore_set = build_ignore_set(&args.ignore, &config.exclude)?;

    if args.watch {
        run_watch_mode(args, &workspace, &config, &ignore_set)
    } else {
        let files = find_templates(&workspace, &config, &ignore_set);
        Ok(run_single_check(args, &workspace, &files))
    }
}

/// Makes the workspace absolute and checks that it is a directory.
fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, CheckError> {
    let invalid = |reason: String| CheckError::InvalidWorkspace {
        path: workspace.to_path_buf(),
        reason,
    };

    let absolute = if workspace.is_relative() {
        let current = std::env::current_dir().map_err(|e| invalid(e.to_string()))?;
        Utf8PathBuf::try_from(current)
            .map_err(|e| invalid(e.to_string()))?
            .join(workspace)
    } else {
        workspace.to_path_buf()
    };

    if !absolute.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    Ok(absolute)
}

/// Builds one glob set from the command line ignores, the config excludes and
/// the default ignores.
fn build_ignore_set(ignore: &[String], exclude: &[String]) -> Result<GlobSet, CheckError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignore.iter().chain(exclude) {
        let glob = Glob::new(pattern).map_err(|e| CheckError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }

    for pattern in DEFAULT_IGNORES {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }

    builder
        .build()
        .map_err(|e| CheckError::InvalidGlob(e.to_string()))
}

/// Returns true if `path` has a checked extension and is not ignored
/// relative to `workspace`.
fn is_checked_template(
    path: &Utf8Path,
    workspace: &Utf8Path,
    config: &CheckConfig,
    ignore_set: &GlobSet,
) -> bool {
    let relative = path.strip_prefix(workspace).unwrap_or(path);
    config.matches_extension(path.file_name().unwrap_or(""))
        && !ignore_set.is_match(relative.as_str())
}

/// Finds every template under `workspace`, sorted by path.
fn find_templates(
    workspace: &Utf8Path,
    config: &CheckConfig,
    ignore_set: &GlobSet,
) -> Vec<Utf8PathBuf> {
    let scan_start = Instant::now();
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| is_checked_template(p, workspace, config, ignore_set))
        .collect();
    files.sort();

    tracing::debug!(
        files = files.len(),
        elapsed = ?scan_start.elapsed(),
        "found templates"
    );
    files
}

#[derive(Default)]
struct FileOutput {
    text: Option<String>,
    json: Vec<FormattedDiagnostic>,
    error_count: usize,
    unreadable: bool,
}

/// Analyzes `files` in parallel and prints their diagnostics and a summary.
fn run_single_check(args: &Args, workspace: &Utf8Path, files: &[Utf8PathBuf]) -> CheckSummary {
    let start = Instant::now();
    let formatter = Formatter::new(args.output);
    let output_json = args.output == OutputFormat::Json;

    let outputs: Vec<FileOutput> = files
        .par_iter()
        .filter_map(|file_path| {
            let relative_path = file_path.strip_prefix(workspace).unwrap_or(file_path);
            let source = match fs::read_to_string(file_path) {
                Ok(s) => s,
                Err(error) => {
                    eprintln!("Failed to read {}: {}", relative_path, error);
                    return Some(FileOutput {
                        unreadable: true,
                        ..Default::default()
                    });
                }
            };

            let result = analyze(&source);
            tracing::debug!(
                file = %relative_path,
                blocks = result.template.blocks().len(),
                errors = result.errors.len(),
                "checked template"
            );

            if result.errors.is_empty() {
                return None;
            }

            Some(FileOutput {
                text: (!output_json)
                    .then(|| formatter.format(&result.errors, relative_path, &source)),
                json: if output_json {
                    Formatter::format_json_diagnostics(&result.errors, relative_path, &source)
                } else {
                    Vec::new()
                },
                error_count: result.errors.len(),
                unreadable: false,
            })
        })
        .collect();

    let summary = CheckSummary {
        file_count: files.len(),
        failed_file_count: outputs.iter().filter(|o| o.error_count > 0).count(),
        error_count: outputs.iter().map(|output| output.error_count).sum(),
        unreadable_file_count: outputs.iter().filter(|o| o.unreadable).count(),
    };

    if output_json {
        let json_output: Vec<FormattedDiagnostic> =
            outputs.into_iter().flat_map(|output| output.json).collect();
        let json = serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string());
        println!("{}", json);
    } else {
        for output in outputs {
            if let Some(text) = output.text {
                print!("{}", text);
            }
        }
        println!("{}", summary.format());
    }

    tracing::debug!(elapsed = ?start.elapsed(), "check finished");
    summary
}

/// Runs in watch mode. Every change to a template re-runs the whole check.
fn run_watch_mode(
    args: &Args,
    workspace: &Utf8Path,
    config: &CheckConfig,
    ignore_set: &GlobSet,
) -> Result<CheckSummary, CheckError> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc;
    use std::time::Duration;

    println!("Starting watch mode...\n");

    // Initial check
    let files = find_templates(workspace, config, ignore_set);
    run_single_check(args, workspace, &files);

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(error) => tracing::warn!(%error, "watch event failed"),
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .map_err(|e| CheckError::WatchFailed(e.to_string()))?;

    watcher
        .watch(workspace.as_std_path(), RecursiveMode::Recursive)
        .map_err(|e| CheckError::WatchFailed(e.to_string()))?;

    println!("Watching for changes... (Ctrl+C to stop)\n");

    for event in rx {
        let template_changed = event.paths.iter().any(|path| {
            Utf8Path::from_path(path)
                .is_some_and(|path| is_checked_template(path, workspace, config, ignore_set))
        });
        if !template_changed {
            continue;
        }

        if !args.preserve_watch_output {
            // Clear screen
            print!("\x1B[2J\x1B[1;1H");
        }
        println!("File changed, re-checking...\n");

        let files = find_templates(workspace, config, ignore_set);
        run_single_check(args, workspace, &files);
    }

    Err(CheckError::WatchFailed(
        "watch channel closed unexpectedly".to_string(),
    ))
}
