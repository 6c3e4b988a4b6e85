//! Template scanner.
//!
//! The scanner makes a single forward pass over the template text and
//! produces a flat token stream ending in exactly one [`SyntaxKind::Eof`].
//! It switches between a few lexical contexts:
//!
//! - literal text, which produces no tokens at all; the consumer recovers it
//!   from the gaps between block spans
//! - directive blocks, tokenized with `logos`
//! - attribute values and code bodies, captured verbatim up to their
//!   terminating marker
//!
//! The scanner never fails. Characters it cannot place inside a directive
//! become [`SyntaxKind::Unknown`] tokens and the parser reports them.

use crate::SyntaxKind;
use logos::Logos;
use source_map::{Position, Span};
use text_size::TextSize;

/// A token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The span of the token in the source.
    pub span: Span,
    /// The line/column of the token's first character.
    pub position: Position,
}

impl Token {
    /// Returns the source text covered by this token.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.to_usize_range()]
    }
}

/// Tokens recognized inside a directive block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
enum DirectiveToken {
    #[token("<#@")]
    DirectiveStart,

    #[token("<#=")]
    ExpressionStart,

    #[token("<#+")]
    ClassStart,

    #[token("<#")]
    StatementStart,

    #[token("#>")]
    BlockEnd,

    #[token("=")]
    Equals,

    #[token("\"")]
    DoubleQuote,

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Identifier,
}

/// The lexical context the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    /// `named` is set once the directive name has been seen.
    Directive { named: bool },
    Value { named: bool },
    ClosingQuote { named: bool },
    Code,
    Done,
}

/// A scanner for template source text.
pub struct Scanner<'src> {
    source: &'src str,
    /// Byte offset of the next unconsumed character.
    offset: usize,
    /// Line/column of `offset`.
    position: Position,
    /// Whether the character before `offset` was a `\r`.
    after_cr: bool,
    mode: Mode,
}

impl<'src> Scanner<'src> {
    /// Creates a new scanner for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::default(),
            after_cr: false,
            mode: Mode::Text,
        }
    }

    /// Returns the source string being scanned.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Scans the whole source.
    pub fn scan(self) -> Vec<Token> {
        let tokens: Vec<Token> = self.collect();
        tracing::trace!(tokens = tokens.len(), "scanned template");
        tokens
    }

    /// Moves the cursor forward to `target`, updating line and column.
    fn advance_to(&mut self, target: usize) {
        if target <= self.offset {
            return;
        }
        let consumed = &self.source[self.offset..target];
        self.position = self.position.advance(consumed, self.after_cr);
        self.after_cr = consumed.ends_with('\r');
        self.offset = target;
    }

    /// Consumes `start..end` and returns it as a token.
    fn token(&mut self, kind: SyntaxKind, start: usize, end: usize) -> Token {
        self.advance_to(start);
        let position = self.position;
        self.advance_to(end);
        Token {
            kind,
            span: Span::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            position,
        }
    }

    fn eof(&mut self) -> Token {
        self.mode = Mode::Done;
        let end = self.source.len();
        self.token(SyntaxKind::Eof, end, end)
    }

    /// Finds the next `<#` that is not escaped by an odd run of backslashes.
    fn find_block_start(&self, from: usize) -> Option<usize> {
        let mut search = from;
        while let Some(found) = self.source[search..].find("<#") {
            let start = search + found;
            let backslashes = self.source[from..start]
                .bytes()
                .rev()
                .take_while(|&b| b == b'\\')
                .count();
            if backslashes % 2 == 0 {
                return Some(start);
            }
            search = start + 2;
        }
        None
    }

    fn scan_text(&mut self) -> Token {
        let Some(start) = self.find_block_start(self.offset) else {
            return self.eof();
        };

        let (kind, len) = match self.source.as_bytes().get(start + 2) {
            Some(b'@') => (SyntaxKind::DirectiveBlockStart, 3),
            Some(b'=') => (SyntaxKind::ExpressionBlockStart, 3),
            Some(b'+') => (SyntaxKind::ClassBlockStart, 3),
            _ => (SyntaxKind::StatementBlockStart, 2),
        };
        self.enter_block(kind);
        self.token(kind, start, start + len)
    }

    fn enter_block(&mut self, kind: SyntaxKind) {
        self.mode = if kind == SyntaxKind::DirectiveBlockStart {
            Mode::Directive { named: false }
        } else {
            Mode::Code
        };
    }

    fn scan_code(&mut self) -> Token {
        let start = self.offset;
        let rest = &self.source[start..];

        if rest.starts_with("#>") {
            self.mode = Mode::Text;
            return self.token(SyntaxKind::BlockEnd, start, start + 2);
        }
        if rest.is_empty() {
            return self.eof();
        }

        let end = rest.find("#>").map_or(self.source.len(), |i| start + i);
        self.token(SyntaxKind::Code, start, end)
    }

    fn scan_directive(&mut self, named: bool) -> Token {
        let base = self.offset;
        let mut lexer = DirectiveToken::lexer(&self.source[base..]);
        let Some(result) = lexer.next() else {
            return self.eof();
        };

        let range = lexer.span();
        let start = base + range.start;
        let mut end = base + range.end;

        let kind = match result {
            Ok(DirectiveToken::Identifier) if named => SyntaxKind::AttributeName,
            Ok(DirectiveToken::Identifier) => {
                self.mode = Mode::Directive { named: true };
                SyntaxKind::DirectiveName
            }
            Ok(DirectiveToken::Equals) => SyntaxKind::Equals,
            Ok(DirectiveToken::DoubleQuote) => {
                self.mode = Mode::Value { named };
                SyntaxKind::DoubleQuote
            }
            Ok(DirectiveToken::BlockEnd) => {
                self.mode = Mode::Text;
                SyntaxKind::BlockEnd
            }
            Ok(start_token) => {
                let kind = match start_token {
                    DirectiveToken::DirectiveStart => SyntaxKind::DirectiveBlockStart,
                    DirectiveToken::ExpressionStart => SyntaxKind::ExpressionBlockStart,
                    DirectiveToken::ClassStart => SyntaxKind::ClassBlockStart,
                    _ => SyntaxKind::StatementBlockStart,
                };
                tracing::trace!(offset = start, "block start inside unterminated directive");
                self.enter_block(kind);
                kind
            }
            Err(()) => {
                end = start
                    + self.source[start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                SyntaxKind::Unknown
            }
        };

        self.token(kind, start, end)
    }

    /// Captures an attribute value up to the next unescaped `"`.
    ///
    /// Only `\"` and `\\` are escapes. An unclosed value stops before `#>`,
    /// before `<#` or at end of input.
    fn scan_value(&mut self, named: bool) -> Token {
        let start = self.offset;
        let bytes = self.source.as_bytes();
        let mut i = start;
        let mut closed = false;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b'"' | b'\\')) => i += 2,
                b'"' => {
                    closed = true;
                    break;
                }
                b'#' if bytes.get(i + 1) == Some(&b'>') => break,
                b'<' if bytes.get(i + 1) == Some(&b'#') => break,
                _ => i += 1,
            }
        }

        let end = i.min(bytes.len());
        self.mode = if closed {
            Mode::ClosingQuote { named }
        } else {
            Mode::Directive { named }
        };
        self.token(SyntaxKind::AttributeValue, start, end)
    }

    fn scan_closing_quote(&mut self, named: bool) -> Token {
        let start = self.offset;
        self.mode = Mode::Directive { named };
        self.token(SyntaxKind::DoubleQuote, start, start + 1)
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = match self.mode {
            Mode::Done => return None,
            Mode::Text => self.scan_text(),
            Mode::Directive { named } => self.scan_directive(named),
            Mode::Value { named } => self.scan_value(named),
            Mode::ClosingQuote { named } => self.scan_closing_quote(named),
            Mode::Code => self.scan_code(),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        Scanner::new(source).map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<&str> {
        Scanner::new(source).map(|t| t.text(source)).collect()
    }

    #[test]
    fn test_template_directive() {
        let source = r#"<#@ template language="C#" #>"#;
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::AttributeName,
                SyntaxKind::Equals,
                SyntaxKind::DoubleQuote,
                SyntaxKind::AttributeValue,
                SyntaxKind::DoubleQuote,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
        assert_eq!(
            texts(source),
            vec!["<#@", "template", "language", "=", "\"", "C#", "\"", "#>", ""]
        );
    }

    #[test]
    fn test_statement_block() {
        let source = "<# int x = 1; #>";
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::StatementBlockStart,
                SyntaxKind::Code,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
        assert_eq!(texts(source)[1], " int x = 1; ");
    }

    #[test]
    fn test_expression_and_class_blocks() {
        assert_eq!(kinds("<#= x #>")[0], SyntaxKind::ExpressionBlockStart);
        assert_eq!(kinds("<#+ void F() {} #>")[0], SyntaxKind::ClassBlockStart);
    }

    #[test]
    fn test_empty_code_block_has_no_code_token() {
        assert_eq!(
            kinds("<##>"),
            vec![
                SyntaxKind::StatementBlockStart,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literal_text_produces_only_eof() {
        let tokens: Vec<Token> = Scanner::new("hello\nworld").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, SyntaxKind::Eof);
        assert_eq!(tokens[0].span, Span::empty(TextSize::from(11)));
        assert_eq!(tokens[0].position, Position::new(1, 5));
    }

    #[test]
    fn test_escaped_block_start_is_text() {
        assert_eq!(kinds(r"\<# not a block #>"), vec![SyntaxKind::Eof]);
        assert_eq!(kinds(r"\\<# x #>")[0], SyntaxKind::StatementBlockStart);
    }

    #[test]
    fn test_code_is_opaque() {
        let source = r#"<# var s = "<#@ x"; #>"#;
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::StatementBlockStart,
                SyntaxKind::Code,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_empty_attribute_value() {
        let source = r#"<#@ output extension="" #>"#;
        let tokens: Vec<Token> = Scanner::new(source).collect();
        let value = tokens
            .iter()
            .find(|t| t.kind == SyntaxKind::AttributeValue)
            .unwrap();
        assert!(value.span.is_empty());
        assert_eq!(tokens[6].kind, SyntaxKind::DoubleQuote);
    }

    #[test]
    fn test_escaped_quote_in_value() {
        let source = r#"<#@ custom text="say \"hi\"" #>"#;
        let tokens = texts(source);
        assert_eq!(tokens[5], r#"say \"hi\""#);
        assert_eq!(tokens[6], "\"");
    }

    #[test]
    fn test_unclosed_value_stops_at_block_end() {
        let source = r#"<#@ import namespace="System #>"#;
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::AttributeName,
                SyntaxKind::Equals,
                SyntaxKind::DoubleQuote,
                SyntaxKind::AttributeValue,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
        assert_eq!(texts(source)[5], "System ");
    }

    #[test]
    fn test_unknown_character_in_directive() {
        let source = "<#@ template $ #>";
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::Unknown,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_multibyte_character() {
        let source = "<#@ template ☃ #>";
        assert_eq!(texts(source)[2], "☃");
        assert_eq!(kinds(source)[2], SyntaxKind::Unknown);
    }

    #[test]
    fn test_unicode_names() {
        let source = "<#@ tëmplate naïve=\"ü\" #>";
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::AttributeName,
                SyntaxKind::Equals,
                SyntaxKind::DoubleQuote,
                SyntaxKind::AttributeValue,
                SyntaxKind::DoubleQuote,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
        assert_eq!(texts(source)[1], "tëmplate");
        assert_eq!(texts(source)[2], "naïve");
    }

    #[test]
    fn test_backslash_before_block_end_ends_unclosed_value() {
        let source = r#"<#@ include file="C:\dir\#> tail"#;
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::AttributeName,
                SyntaxKind::Equals,
                SyntaxKind::DoubleQuote,
                SyntaxKind::AttributeValue,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
        assert_eq!(texts(source)[5], r"C:\dir\");
    }

    #[test]
    fn test_escaped_backslash_before_quote_closes_value() {
        let source = r#"<#@ custom path="a\\" #>"#;
        assert_eq!(texts(source)[5], r"a\\");
        assert_eq!(texts(source)[6], "\"");
    }

    #[test]
    fn test_block_start_inside_unterminated_directive() {
        let source = "<#@ import <# x #>";
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::DirectiveBlockStart,
                SyntaxKind::DirectiveName,
                SyntaxKind::StatementBlockStart,
                SyntaxKind::Code,
                SyntaxKind::BlockEnd,
                SyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_code_block() {
        let source = "<# abc";
        assert_eq!(
            kinds(source),
            vec![
                SyntaxKind::StatementBlockStart,
                SyntaxKind::Code,
                SyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_directive_ends_in_eof() {
        let source = r#"<#@ import namespace="System""#;
        let tokens: Vec<Token> = Scanner::new(source).collect();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, SyntaxKind::Eof);
        assert_eq!(u32::from(eof.span.start) as usize, source.len());
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let source = "Header\r\n<#@ template\n  debug=\"true\" #>";
        let tokens: Vec<Token> = Scanner::new(source).collect();
        assert_eq!(tokens[0].position, Position::new(1, 0));
        assert_eq!(tokens[1].position, Position::new(1, 4));
        assert_eq!(tokens[2].position, Position::new(2, 2));
        assert_eq!(tokens[5].position, Position::new(2, 9));
    }

    #[test]
    fn test_exactly_one_eof() {
        for source in ["", "<#", "<#@", "<#@ a=\"", "text", "<#= x"] {
            let eofs = kinds(source)
                .into_iter()
                .filter(|k| *k == SyntaxKind::Eof)
                .count();
            assert_eq!(eofs, 1, "source {source:?}");
        }
    }
}
