//! Recursive descent parser for text templates.

use crate::error::{TemplateError, TemplateErrorKind};
use crate::scanner::{Scanner, Token};
use crate::syntax::{Attribute, Block, Capture, CodeBlock, Directive, Template, Terminal};
use crate::{ParseResult, SyntaxKind};

/// The template parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The scanned tokens. Always ends with `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Errors collected during parsing.
    errors: Vec<TemplateError>,
    /// Returned when we're past the end.
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        let tokens = Scanner::new(source).scan();
        let eof_token = tokens.last().copied().unwrap_or_else(|| Token {
            kind: SyntaxKind::Eof,
            span: source_map::Span::empty(text_size::TextSize::of(source)),
            position: source_map::Position::default(),
        });
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof_token,
        }
    }

    /// Parses the source into a template.
    pub fn parse(mut self) -> ParseResult {
        let template = self.parse_template();
        ParseResult {
            template,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token as a terminal node.
    fn terminal(&mut self) -> Terminal {
        let token = *self.current();
        self.advance();
        Terminal::new(token.kind, token.span, token.position)
    }

    /// Consumes the current token as a capture node.
    fn capture(&mut self) -> Capture {
        let token = *self.current();
        self.advance();
        Capture::new(
            token.kind,
            token.span.start,
            token.text(self.source),
            token.position,
        )
    }

    /// Consumes a terminal of the given kind, or reports an error.
    fn expect_terminal(&mut self, kind: SyntaxKind) -> Option<Terminal> {
        if self.check(kind) {
            Some(self.terminal())
        } else {
            self.unexpected(kind.name());
            None
        }
    }

    /// Consumes a capture of the given kind, or reports an error.
    fn expect_capture(&mut self, kind: SyntaxKind) -> Option<Capture> {
        if self.check(kind) {
            Some(self.capture())
        } else {
            self.unexpected(kind.name());
            None
        }
    }

    /// Reports an error at the current position.
    fn error(&mut self, kind: TemplateErrorKind) {
        let token = *self.current();
        self.errors
            .push(TemplateError::new(kind, token.span, token.position));
    }

    /// Reports that the current token is not `expected`.
    fn unexpected(&mut self, expected: &str) {
        let kind = match self.current_kind() {
            SyntaxKind::Eof => TemplateErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            },
            SyntaxKind::Unknown => self.invalid_character(),
            found => TemplateErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.name().to_string(),
            },
        };
        self.error(kind);
    }

    fn invalid_character(&self) -> TemplateErrorKind {
        let character = self
            .current()
            .text(self.source)
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        TemplateErrorKind::InvalidCharacter { character }
    }

    /// Skips to the end of the current directive.
    ///
    /// Consumes and returns the next `#>`. Stops without consuming at a
    /// block start, which the scanner only produces once the directive has
    /// ended, or at end of input.
    fn recover(&mut self) -> Option<Terminal> {
        let from = self.current().span.start;
        loop {
            match self.current_kind() {
                SyntaxKind::BlockEnd => {
                    tracing::trace!(from = u32::from(from), "recovered at block end");
                    return Some(self.terminal());
                }
                SyntaxKind::Eof => return None,
                kind if kind.is_block_start() => return None,
                _ => self.advance(),
            }
        }
    }

    // === Productions ===

    fn parse_template(&mut self) -> Template {
        let mut blocks = Vec::new();

        loop {
            match self.current_kind() {
                SyntaxKind::Eof => break,
                SyntaxKind::DirectiveBlockStart => {
                    if let Some(directive) = self.parse_directive() {
                        blocks.push(Block::Directive(directive));
                    }
                }
                kind if kind.is_code_block_start() => {
                    blocks.push(Block::Code(self.parse_code_block()));
                }
                _ => {
                    self.unexpected("block start");
                    self.advance();
                }
            }
        }

        tracing::trace!(
            blocks = blocks.len(),
            errors = self.errors.len(),
            "parsed template"
        );
        Template::new(blocks)
    }

    /// Parses `<#@ name attribute="value"... #>`.
    ///
    /// Returns `None` when the directive has no name.
    fn parse_directive(&mut self) -> Option<Directive> {
        let start = self.terminal();

        while self.check(SyntaxKind::Unknown) {
            let kind = self.invalid_character();
            self.error(kind);
            self.advance();
        }

        let Some(name) = self.expect_capture(SyntaxKind::DirectiveName) else {
            tracing::debug!(
                offset = u32::from(start.span().start),
                "dropping directive without a name"
            );
            self.recover();
            return None;
        };

        let mut attributes: Vec<Attribute> = Vec::new();
        let end = loop {
            match self.current_kind() {
                SyntaxKind::BlockEnd => break Some(self.terminal()),
                SyntaxKind::AttributeName => match self.parse_attribute() {
                    Some(attribute) => self.push_attribute(&mut attributes, attribute),
                    None => break self.recover(),
                },
                SyntaxKind::Unknown => {
                    let kind = self.invalid_character();
                    self.error(kind);
                    self.advance();
                }
                _ => {
                    self.unexpected("attribute name or '#>'");
                    break self.recover();
                }
            }
        };

        Some(Directive::new(start, name, attributes, end))
    }

    /// Adds `attribute` unless a previous attribute has the same name.
    fn push_attribute(&mut self, attributes: &mut Vec<Attribute>, attribute: Attribute) {
        let duplicate = attributes
            .iter()
            .any(|existing| existing.name().eq_ignore_ascii_case(attribute.name()));
        if duplicate {
            self.errors.push(TemplateError::new(
                TemplateErrorKind::DuplicateAttribute {
                    name: attribute.name().to_string(),
                },
                attribute.span(),
                attribute.position(),
            ));
        } else {
            attributes.push(attribute);
        }
    }

    /// Parses `name="value"`.
    fn parse_attribute(&mut self) -> Option<Attribute> {
        let name = self.capture();
        let equals = self.expect_terminal(SyntaxKind::Equals)?;
        let open_quote = self.expect_terminal(SyntaxKind::DoubleQuote)?;
        let value = self.expect_capture(SyntaxKind::AttributeValue)?;
        let close_quote = self.expect_terminal(SyntaxKind::DoubleQuote)?;
        Some(Attribute::new(name, equals, open_quote, value, close_quote))
    }

    /// Parses a statement, expression or class feature block.
    fn parse_code_block(&mut self) -> CodeBlock {
        let start = self.terminal();
        let code = self
            .check(SyntaxKind::Code)
            .then(|| self.capture());
        let end = self.expect_terminal(SyntaxKind::BlockEnd);
        CodeBlock::new(start, code, end)
    }
}
