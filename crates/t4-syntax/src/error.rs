//! Template error types.

use source_map::{Position, Span};
use thiserror::Error;

/// A syntax or schema error found while analyzing a template.
///
/// Errors are plain values: the parser and the validator always complete and
/// hand back every error they found alongside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{kind}")]
pub struct TemplateError {
    /// The kind of error.
    pub kind: TemplateErrorKind,
    /// The smallest span that explains the error.
    pub span: Span,
    /// The line/column where `span` starts.
    pub position: Position,
}

impl TemplateError {
    /// Creates a new template error.
    pub fn new(kind: TemplateErrorKind, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Returns a stable identifier for the kind of error.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns true if the scanner or parser produced this error.
    pub fn is_syntax(&self) -> bool {
        !self.is_schema()
    }

    /// Returns true if directive validation produced this error.
    pub fn is_schema(&self) -> bool {
        matches!(
            self.kind,
            TemplateErrorKind::MissingRequiredAttribute { .. }
                | TemplateErrorKind::UnknownAttributeValue { .. }
                | TemplateErrorKind::UnexpectedAttribute { .. }
        )
    }
}

/// The kind of template error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TemplateErrorKind {
    // === Syntax ===
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// The input ended inside a block.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A character that starts no token appeared inside a directive.
    #[error("invalid character {character:?} in directive")]
    InvalidCharacter {
        /// The offending character.
        character: char,
    },

    /// An attribute name was repeated within one directive.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The repeated attribute name as written.
        name: String,
    },

    // === Schema ===
    /// A required attribute is missing from a directive.
    #[error("the {directive} directive requires the {attribute} attribute")]
    MissingRequiredAttribute {
        /// The directive name as written.
        directive: String,
        /// The missing attribute.
        attribute: String,
    },

    /// An attribute value is outside its closed set of known values.
    #[error("unknown value \"{value}\" for the {attribute} attribute")]
    UnknownAttributeValue {
        /// The attribute name as written.
        attribute: String,
        /// The offending value.
        value: String,
    },

    /// An attribute that the directive does not declare.
    #[error("unexpected attribute {attribute} on the {directive} directive")]
    UnexpectedAttribute {
        /// The directive name as written.
        directive: String,
        /// The attribute name as written.
        attribute: String,
    },
}

impl TemplateErrorKind {
    /// Returns the error code as a string.
    pub fn code(&self) -> &'static str {
        match self {
            TemplateErrorKind::UnexpectedToken { .. } => "unexpected-token",
            TemplateErrorKind::UnexpectedEof { .. } => "unexpected-eof",
            TemplateErrorKind::InvalidCharacter { .. } => "invalid-character",
            TemplateErrorKind::DuplicateAttribute { .. } => "duplicate-attribute",
            TemplateErrorKind::MissingRequiredAttribute { .. } => "missing-required-attribute",
            TemplateErrorKind::UnknownAttributeValue { .. } => "unknown-attribute-value",
            TemplateErrorKind::UnexpectedAttribute { .. } => "unexpected-attribute",
        }
    }
}
