//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use serde::Serialize;
use source_map::LineIndex;
use t4_syntax::TemplateError;

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type. Template errors are always `Error`.
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
    /// The stage that found it (`syntax` or `schema`).
    pub source: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

impl Position {
    fn new(position: source_map::Position, offset: source_map::ByteOffset) -> Self {
        Self {
            line: position.line + 1,
            column: position.column + 1,
            offset: u32::from(offset),
        }
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the errors of one file.
    pub fn format(&self, errors: &[TemplateError], file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(errors, file_path, false, source),
            OutputFormat::HumanVerbose => self.format_human(errors, file_path, true, source),
            OutputFormat::Json => {
                let formatted = Self::format_json_diagnostics(errors, file_path, source);
                serde_json::to_string_pretty(&formatted).unwrap_or_default()
            }
            OutputFormat::Machine => self.format_machine(errors, file_path, source),
        }
    }

    /// Formats as human-readable output, optionally with a source snippet.
    fn format_human(
        &self,
        errors: &[TemplateError],
        file_path: &Utf8Path,
        snippet: bool,
        source: &str,
    ) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        for error in errors {
            let start = error.position;
            output.push_str(&format!(
                "{}:{}\nError: {} ({})\n",
                file_path,
                start,
                error.message(),
                error.code()
            ));

            if let Some(line) = snippet.then(|| line_index.line_text(start.line)).flatten() {
                let gutter = (start.line + 1).to_string();
                output.push_str(&format!("  {} | {}\n", gutter, line));
                output.push_str(&format!(
                    "  {} | {}^\n",
                    " ".repeat(gutter.len()),
                    " ".repeat(start.column as usize)
                ));
            }

            output.push('\n');
        }

        output
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(
        errors: &[TemplateError],
        file_path: &Utf8Path,
        source: &str,
    ) -> Vec<FormattedDiagnostic> {
        let line_index = LineIndex::new(source);
        errors
            .iter()
            .map(|error| {
                let end = line_index
                    .position(error.span.end)
                    .unwrap_or(error.position);

                FormattedDiagnostic {
                    diagnostic_type: "Error".to_string(),
                    filename: file_path.to_string(),
                    start: Position::new(error.position, error.span.start),
                    end: Position::new(end, error.span.end),
                    message: error.message(),
                    code: error.code().to_string(),
                    source: if error.is_schema() { "schema" } else { "syntax" }.to_string(),
                }
            })
            .collect()
    }

    /// Formats as machine-readable output.
    fn format_machine(&self, errors: &[TemplateError], file_path: &Utf8Path, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        for error in errors {
            let start = error.position;
            let end = line_index.position(error.span.end).unwrap_or(start);

            output.push_str(&format!(
                "ERROR {}:{}:{}:{}:{} {} ({})\n",
                file_path,
                start.line + 1,
                start.column + 1,
                end.line + 1,
                end.column + 1,
                error.message(),
                error.code()
            ));
        }

        output
    }
}

/// Summary of a check run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    /// Number of files checked.
    pub file_count: usize,
    /// Number of files with at least one error.
    pub failed_file_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of files that could not be read as UTF-8 text.
    pub unreadable_file_count: usize,
}

impl CheckSummary {
    /// Returns true if the run should exit with a failure code.
    pub fn failed(&self) -> bool {
        self.error_count > 0 || self.unreadable_file_count > 0
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };

        let mut line = format!(
            "====================================\nt4-check found {} {} in {} of {} {}",
            self.error_count, error_word, self.failed_file_count, self.file_count, file_word
        );
        if self.unreadable_file_count > 0 {
            line.push_str(&format!(
                " ({} could not be read)",
                self.unreadable_file_count
            ));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use t4_syntax::analyze;

    const SOURCE: &str = "Header\n<#@ output extension=\".cs\" encoding=\"uft-8\" #>\n";

    fn errors() -> Vec<TemplateError> {
        analyze(SOURCE).errors
    }

    #[test]
    fn test_format_human() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(&errors(), Utf8Path::new("Model.tt"), SOURCE);
        insta::assert_snapshot!(output, @r###"
        Model.tt:2:38
        Error: unknown value "uft-8" for the encoding attribute (unknown-attribute-value)
        "###);
    }

    #[test]
    fn test_format_human_verbose() {
        let formatter = Formatter::new(OutputFormat::HumanVerbose);
        let output = formatter.format(&errors(), Utf8Path::new("Model.tt"), SOURCE);
        assert!(output.contains("  2 | <#@ output extension=\".cs\" encoding=\"uft-8\" #>\n"));
        assert!(output.contains(&format!("    | {}^\n", " ".repeat(37))));
    }

    #[test]
    fn test_format_json() {
        let diagnostics =
            Formatter::format_json_diagnostics(&errors(), Utf8Path::new("Model.tt"), SOURCE);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.code, "unknown-attribute-value");
        assert_eq!(diagnostic.source, "schema");
        assert_eq!((diagnostic.start.line, diagnostic.start.column), (2, 38));
        assert_eq!((diagnostic.end.line, diagnostic.end.column), (2, 43));
        assert_eq!(diagnostic.end.offset - diagnostic.start.offset, 5);

        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format(&errors(), Utf8Path::new("Model.tt"), SOURCE);
        assert!(output.contains("\"filename\": \"Model.tt\""));
        assert!(output.contains("\"type\": \"Error\""));
    }

    #[test]
    fn test_format_machine() {
        let formatter = Formatter::new(OutputFormat::Machine);
        let output = formatter.format(&errors(), Utf8Path::new("Model.tt"), SOURCE);
        assert_eq!(
            output,
            "ERROR Model.tt:2:38:2:43 unknown value \"uft-8\" for the encoding attribute (unknown-attribute-value)\n"
        );
    }

    #[test]
    fn test_summary() {
        let summary = CheckSummary {
            file_count: 5,
            failed_file_count: 2,
            error_count: 3,
            ..Default::default()
        };
        assert!(summary.failed());
        let output = summary.format();
        assert!(output.contains("3 errors in 2 of 5 files"));

        let clean = CheckSummary {
            file_count: 1,
            ..Default::default()
        };
        assert!(!clean.failed());
        assert!(clean.format().ends_with("0 errors in 0 of 1 file"));

        let unreadable = CheckSummary {
            file_count: 2,
            unreadable_file_count: 1,
            ..Default::default()
        };
        assert!(unreadable.failed());
        assert!(unreadable
            .format()
            .ends_with("0 errors in 0 of 2 files (1 could not be read)"));
    }
}
