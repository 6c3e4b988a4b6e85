//! Text template (T4) syntax analysis.
//!
//! This crate turns template text into an immutable syntax tree and a list
//! of diagnostics:
//! - Scanner using `logos` inside directive blocks
//! - Recursive descent parser with local error recovery
//! - Typed directive views (`template`, `output`, `import`, ...)
//! - Directive metadata and schema validation
//! - A visitor for tree-wide operations and description lookup
//!
//! # Example
//!
//! ```
//! use t4_syntax::{analyze, DirectiveVariant};
//!
//! let source = r#"<#@ template language="C#" #>
//! <#@ output extension=".txt" #>
//! Hello, <#= Name #>!
//! "#;
//!
//! let result = analyze(source);
//! assert!(result.errors.is_empty());
//!
//! for directive in result.template.directives() {
//!     if let DirectiveVariant::Template(template) = directive.variant() {
//!         assert_eq!(template.language(), Some("C#"));
//!     }
//! }
//! ```

mod describe;
mod directive;
mod error;
mod kind;
mod metadata;
mod parser;
mod scanner;
mod syntax;
mod validate;
mod visitor;

pub use describe::Description;
pub use directive::{
    AssemblyDirective, CustomDirective, DirectiveKind, DirectiveVariant, HostSpecific,
    ImportDirective, IncludeDirective, OutputDirective, ParameterDirective, TemplateDirective,
    Visibility,
};
pub use error::{TemplateError, TemplateErrorKind};
pub use kind::SyntaxKind;
pub use metadata::{built_in_directives, AttributeDescriptor, DirectiveDescriptor, ValueDescriptor};
pub use scanner::{Scanner, Token};
pub use source_map::{ByteOffset, Position, Span};
pub use syntax::{
    Attribute, Block, Capture, CodeBlock, CodeBlockKind, Directive, SyntaxNode, Template, Terminal,
};
pub use validate::validate;
pub use visitor::{walk_children, Visitor};

/// Options for analyzing a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Whether to check directives against their schemas after parsing.
    pub validate: bool,
}

/// The result of analyzing a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// The syntax tree. Always present, possibly empty.
    pub template: Template,
    /// Syntax errors, followed by schema errors when validation ran, ordered
    /// by where they start.
    pub errors: Vec<TemplateError>,
}

impl ParseResult {
    /// Returns true if any error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a template, reporting syntax errors only.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, ParseOptions::default())
}

/// Parses a template and validates its directives.
///
/// This is the full analysis: scan, parse and validate. It never fails; the
/// tree is returned alongside every error found.
pub fn analyze(source: &str) -> ParseResult {
    parse_with_options(source, ParseOptions { validate: true })
}

/// Parses a template with custom options.
pub fn parse_with_options(source: &str, options: ParseOptions) -> ParseResult {
    let _span = tracing::debug_span!("analyze", len = source.len(), validate = options.validate)
        .entered();

    let mut result = parser::Parser::new(source).parse();
    if options.validate {
        result.errors.extend(validate(&result.template));
        result.errors.sort_by_key(|error| error.span.start);
    }

    tracing::debug!(
        blocks = result.template.blocks().len(),
        errors = result.errors.len(),
        "analyzed template"
    );
    result
}
