//! The closed set of token and node kinds.

/// Identifies every token and node in a template syntax tree.
///
/// Variants up to and including [`SyntaxKind::Eof`] are produced by the
/// scanner; the rest are composite nodes built by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // === Block markers ===
    /// `<#@`
    DirectiveBlockStart,
    /// `<#`
    StatementBlockStart,
    /// `<#=`
    ExpressionBlockStart,
    /// `<#+`
    ClassBlockStart,
    /// `#>`
    BlockEnd,

    // === Directive contents ===
    /// The first identifier of a directive block.
    DirectiveName,
    /// Any later identifier of a directive block.
    AttributeName,
    /// `=`
    Equals,
    /// `"`
    DoubleQuote,
    /// Text between an attribute's quotes, captured verbatim.
    AttributeValue,

    // === Code contents ===
    /// The opaque body of a statement, expression or class feature block.
    Code,

    /// A character inside a directive block that starts no token.
    Unknown,
    /// End of input.
    Eof,

    // === Nodes ===
    /// `name="value"`
    Attribute,
    /// `<#@ name attributes... #>`
    Directive,
    /// A statement, expression or class feature block.
    CodeBlock,
    /// The root of the tree.
    Template,
}

impl SyntaxKind {
    /// Returns true for the three code block start markers.
    pub fn is_code_block_start(self) -> bool {
        matches!(
            self,
            SyntaxKind::StatementBlockStart
                | SyntaxKind::ExpressionBlockStart
                | SyntaxKind::ClassBlockStart
        )
    }

    /// Returns true for any block start marker.
    pub fn is_block_start(self) -> bool {
        self == SyntaxKind::DirectiveBlockStart || self.is_code_block_start()
    }

    /// Returns true for tokens whose text is kept in the tree.
    pub fn is_capture(self) -> bool {
        matches!(
            self,
            SyntaxKind::DirectiveName
                | SyntaxKind::AttributeName
                | SyntaxKind::AttributeValue
                | SyntaxKind::Code
        )
    }

    /// Returns true for kinds produced by the scanner.
    pub fn is_token(self) -> bool {
        self <= SyntaxKind::Eof
    }

    /// Returns a human-readable name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::DirectiveBlockStart => "'<#@'",
            SyntaxKind::StatementBlockStart => "'<#'",
            SyntaxKind::ExpressionBlockStart => "'<#='",
            SyntaxKind::ClassBlockStart => "'<#+'",
            SyntaxKind::BlockEnd => "'#>'",
            SyntaxKind::DirectiveName => "directive name",
            SyntaxKind::AttributeName => "attribute name",
            SyntaxKind::Equals => "'='",
            SyntaxKind::DoubleQuote => "'\"'",
            SyntaxKind::AttributeValue => "attribute value",
            SyntaxKind::Code => "code",
            SyntaxKind::Unknown => "invalid character",
            SyntaxKind::Eof => "end of file",
            SyntaxKind::Attribute => "attribute",
            SyntaxKind::Directive => "directive",
            SyntaxKind::CodeBlock => "code block",
            SyntaxKind::Template => "template",
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_and_node_partition() {
        assert!(SyntaxKind::Eof.is_token());
        assert!(SyntaxKind::Unknown.is_token());
        assert!(!SyntaxKind::Attribute.is_token());
        assert!(!SyntaxKind::Template.is_token());
    }

    #[test]
    fn test_block_starts() {
        assert!(SyntaxKind::DirectiveBlockStart.is_block_start());
        assert!(!SyntaxKind::DirectiveBlockStart.is_code_block_start());
        assert!(SyntaxKind::ClassBlockStart.is_code_block_start());
        assert!(!SyntaxKind::BlockEnd.is_block_start());
    }
}
