//! Syntax tree types.
//!
//! The tree is owned strictly top-down: every node owns its children and no
//! node points back at its parent. Nodes are immutable once built; all
//! fields are private and exposed through accessors. Structural equality
//! and hashing are derived, so two trees compare equal exactly when their
//! kinds, spans, positions and children all match.
//!
//! [`SyntaxNode`] is a borrowed view over any node. It provides uniform
//! traversal (`children`, `accept`) and queries (`span`, `position`,
//! `text`, `description_at`).

use crate::{DirectiveKind, SyntaxKind};
use smol_str::SmolStr;
use source_map::{ByteOffset, Position, Span};
use std::borrow::Cow;
use text_size::TextSize;

/// A leaf node that carries no text of its own (markers, `=`, quotes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terminal {
    kind: SyntaxKind,
    span: Span,
    position: Position,
}

impl Terminal {
    /// Creates a new terminal.
    pub fn new(kind: SyntaxKind, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }

    /// Returns the kind of this terminal.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Returns the span of this terminal.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the position of this terminal.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// A leaf node that owns the exact text it captured.
///
/// Its span is always `(start, text.len())`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capture {
    kind: SyntaxKind,
    start: ByteOffset,
    text: SmolStr,
    position: Position,
}

impl Capture {
    /// Creates a new capture.
    pub fn new(
        kind: SyntaxKind,
        start: ByteOffset,
        text: impl Into<SmolStr>,
        position: Position,
    ) -> Self {
        Self {
            kind,
            start,
            text: text.into(),
            position,
        }
    }

    /// Returns the kind of this capture.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Returns the captured text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the span of this capture.
    pub fn span(&self) -> Span {
        Span::from_len(self.start, TextSize::of(self.text.as_str()))
    }

    /// Returns the position of this capture.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// A `name="value"` attribute of a directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: Capture,
    equals: Terminal,
    open_quote: Terminal,
    value: Capture,
    close_quote: Terminal,
}

impl Attribute {
    /// Creates a new attribute from its five tokens.
    pub fn new(
        name: Capture,
        equals: Terminal,
        open_quote: Terminal,
        value: Capture,
        close_quote: Terminal,
    ) -> Self {
        Self {
            name,
            equals,
            open_quote,
            value,
            close_quote,
        }
    }

    /// Returns the attribute name as written.
    pub fn name(&self) -> &str {
        self.name.text()
    }

    /// Returns the raw attribute value, escapes included.
    pub fn value(&self) -> &str {
        self.value.text()
    }

    /// Returns the attribute value with `\"` and `\\` escapes resolved.
    pub fn unescaped_value(&self) -> Cow<'_, str> {
        let raw = self.value();
        if !raw.contains('\\') {
            return Cow::Borrowed(raw);
        }

        let mut unescaped = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some(next @ ('"' | '\\')) => unescaped.push(next),
                    Some(next) => {
                        unescaped.push('\\');
                        unescaped.push(next);
                    }
                    None => unescaped.push('\\'),
                }
            } else {
                unescaped.push(c);
            }
        }
        Cow::Owned(unescaped)
    }

    /// Returns the name token.
    pub fn name_node(&self) -> &Capture {
        &self.name
    }

    /// Returns the value token.
    pub fn value_node(&self) -> &Capture {
        &self.value
    }

    /// Returns the span from the name to the closing quote.
    pub fn span(&self) -> Span {
        self.name.span().cover(self.close_quote.span())
    }

    /// Returns the position of the attribute name.
    pub fn position(&self) -> Position {
        self.name.position()
    }
}

/// A directive block: `<#@ name attribute="value"... #>`.
///
/// The concrete directive type is chosen from the name when the node is
/// built; see [`DirectiveKind::from_name`]. Attribute names are unique
/// within one directive, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    kind: DirectiveKind,
    start: Terminal,
    name: Capture,
    attributes: Vec<Attribute>,
    end: Option<Terminal>,
}

impl Directive {
    /// Creates a directive, dispatching on its name.
    ///
    /// `attributes` must already be free of duplicate names; the parser
    /// guarantees this.
    pub fn new(
        start: Terminal,
        name: Capture,
        attributes: Vec<Attribute>,
        end: Option<Terminal>,
    ) -> Self {
        Self {
            kind: DirectiveKind::from_name(name.text()),
            start,
            name,
            attributes,
            end,
        }
    }

    /// Returns which of the closed set of directives this is.
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// Returns the directive name as written.
    pub fn name(&self) -> &str {
        self.name.text()
    }

    /// Returns the directive name token.
    pub fn name_node(&self) -> &Capture {
        &self.name
    }

    /// Returns the `<#@` token.
    pub fn block_start(&self) -> &Terminal {
        &self.start
    }

    /// Returns the `#>` token, absent when the block is unterminated.
    pub fn block_end(&self) -> Option<&Terminal> {
        self.end.as_ref()
    }

    /// Returns the attributes in source order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name().eq_ignore_ascii_case(name))
    }

    /// Returns the raw value of an attribute, if present.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(Attribute::value)
    }

    /// Returns the span from `<#@` to the last child present.
    pub fn span(&self) -> Span {
        let last = match (&self.end, self.attributes.last()) {
            (Some(end), _) => end.span(),
            (None, Some(attribute)) => attribute.span(),
            (None, None) => self.name.span(),
        };
        self.start.span().cover(last)
    }

    /// Returns the position of `<#@`.
    pub fn position(&self) -> Position {
        self.start.position()
    }
}

/// The flavor of a code block, chosen by its start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeBlockKind {
    /// `<# ... #>`
    Statement,
    /// `<#= ... #>`
    Expression,
    /// `<#+ ... #>`
    ClassFeature,
}

/// A statement, expression or class feature block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeBlock {
    start: Terminal,
    code: Option<Capture>,
    end: Option<Terminal>,
}

impl CodeBlock {
    /// Creates a new code block.
    pub fn new(start: Terminal, code: Option<Capture>, end: Option<Terminal>) -> Self {
        Self { start, code, end }
    }

    /// Returns the flavor of this block.
    pub fn block_kind(&self) -> CodeBlockKind {
        match self.start.kind() {
            SyntaxKind::ExpressionBlockStart => CodeBlockKind::Expression,
            SyntaxKind::ClassBlockStart => CodeBlockKind::ClassFeature,
            _ => CodeBlockKind::Statement,
        }
    }

    /// Returns the start marker token.
    pub fn block_start(&self) -> &Terminal {
        &self.start
    }

    /// Returns the code token, absent for an empty block.
    pub fn code_node(&self) -> Option<&Capture> {
        self.code.as_ref()
    }

    /// Returns the code text, empty for an empty block.
    pub fn code(&self) -> &str {
        self.code.as_ref().map_or("", Capture::text)
    }

    /// Returns the `#>` token, absent when the block is unterminated.
    pub fn block_end(&self) -> Option<&Terminal> {
        self.end.as_ref()
    }

    /// Returns the span from the start marker to the last child present.
    pub fn span(&self) -> Span {
        let last = match (&self.end, &self.code) {
            (Some(end), _) => end.span(),
            (None, Some(code)) => code.span(),
            (None, None) => self.start.span(),
        };
        self.start.span().cover(last)
    }

    /// Returns the position of the start marker.
    pub fn position(&self) -> Position {
        self.start.position()
    }
}

/// A top-level child of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Block {
    /// A directive block.
    Directive(Directive),
    /// A code block.
    Code(CodeBlock),
}

impl Block {
    /// Returns the span of this block.
    pub fn span(&self) -> Span {
        match self {
            Block::Directive(directive) => directive.span(),
            Block::Code(code) => code.span(),
        }
    }

    /// Returns the position of this block.
    pub fn position(&self) -> Position {
        match self {
            Block::Directive(directive) => directive.position(),
            Block::Code(code) => code.position(),
        }
    }

    /// Returns this block as a syntax node.
    pub fn as_node(&self) -> SyntaxNode<'_> {
        match self {
            Block::Directive(directive) => SyntaxNode::Directive(directive),
            Block::Code(code) => SyntaxNode::CodeBlock(code),
        }
    }
}

/// The root of a template syntax tree.
///
/// Literal text is not represented by nodes; it is whatever lies between
/// the blocks (see [`Template::text_runs`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Template {
    blocks: Vec<Block>,
}

impl Template {
    /// Creates a template from its blocks in source order.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Returns the blocks in source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns true if the template contains no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over the directives.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Directive(directive) => Some(directive),
            Block::Code(_) => None,
        })
    }

    /// Iterates over the code blocks.
    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Directive(_) => None,
        })
    }

    /// Returns the bounds of all blocks, or an empty span if there are none.
    pub fn span(&self) -> Span {
        self.blocks
            .iter()
            .map(Block::span)
            .reduce(Span::cover)
            .unwrap_or_default()
    }

    /// Returns the position of the first block.
    pub fn position(&self) -> Position {
        self.blocks
            .first()
            .map(Block::position)
            .unwrap_or_default()
    }

    /// Returns the spans of literal text between, before and after blocks.
    ///
    /// Together with the block spans these tile `source` exactly.
    pub fn text_runs(&self, source: &str) -> Vec<Span> {
        let mut runs = Vec::new();
        let mut cursor = TextSize::from(0);

        for block in &self.blocks {
            let span = block.span();
            if span.start > cursor {
                runs.push(Span::new(cursor, span.start));
            }
            cursor = cursor.max(span.end);
        }

        let end = TextSize::of(source);
        if end > cursor {
            runs.push(Span::new(cursor, end));
        }
        runs
    }

    /// Returns the root as a syntax node.
    pub fn as_node(&self) -> SyntaxNode<'_> {
        SyntaxNode::Template(self)
    }
}

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxNode<'a> {
    /// The root.
    Template(&'a Template),
    /// A directive block.
    Directive(&'a Directive),
    /// A directive attribute.
    Attribute(&'a Attribute),
    /// A code block.
    CodeBlock(&'a CodeBlock),
    /// A text-carrying token.
    Capture(&'a Capture),
    /// A marker or punctuation token.
    Terminal(&'a Terminal),
}

impl<'a> SyntaxNode<'a> {
    /// Returns the kind of this node.
    pub fn kind(self) -> SyntaxKind {
        match self {
            SyntaxNode::Template(_) => SyntaxKind::Template,
            SyntaxNode::Directive(_) => SyntaxKind::Directive,
            SyntaxNode::Attribute(_) => SyntaxKind::Attribute,
            SyntaxNode::CodeBlock(_) => SyntaxKind::CodeBlock,
            SyntaxNode::Capture(capture) => capture.kind(),
            SyntaxNode::Terminal(terminal) => terminal.kind(),
        }
    }

    /// Returns the span of this node.
    pub fn span(self) -> Span {
        match self {
            SyntaxNode::Template(template) => template.span(),
            SyntaxNode::Directive(directive) => directive.span(),
            SyntaxNode::Attribute(attribute) => attribute.span(),
            SyntaxNode::CodeBlock(code) => code.span(),
            SyntaxNode::Capture(capture) => capture.span(),
            SyntaxNode::Terminal(terminal) => terminal.span(),
        }
    }

    /// Returns the position of this node's first character.
    pub fn position(self) -> Position {
        match self {
            SyntaxNode::Template(template) => template.position(),
            SyntaxNode::Directive(directive) => directive.position(),
            SyntaxNode::Attribute(attribute) => attribute.position(),
            SyntaxNode::CodeBlock(code) => code.position(),
            SyntaxNode::Capture(capture) => capture.position(),
            SyntaxNode::Terminal(terminal) => terminal.position(),
        }
    }

    /// Returns true for leaf nodes.
    pub fn is_terminal(self) -> bool {
        matches!(self, SyntaxNode::Capture(_) | SyntaxNode::Terminal(_))
    }

    /// Returns the children in source order. Omitted optional children are
    /// simply absent.
    pub fn children(self) -> Vec<SyntaxNode<'a>> {
        match self {
            SyntaxNode::Template(template) => template.blocks.iter().map(Block::as_node).collect(),
            SyntaxNode::Directive(directive) => {
                let mut children = Vec::with_capacity(directive.attributes.len() + 3);
                children.push(SyntaxNode::Terminal(&directive.start));
                children.push(SyntaxNode::Capture(&directive.name));
                children.extend(directive.attributes.iter().map(SyntaxNode::Attribute));
                children.extend(directive.end.as_ref().map(SyntaxNode::Terminal));
                children
            }
            SyntaxNode::Attribute(attribute) => vec![
                SyntaxNode::Capture(&attribute.name),
                SyntaxNode::Terminal(&attribute.equals),
                SyntaxNode::Terminal(&attribute.open_quote),
                SyntaxNode::Capture(&attribute.value),
                SyntaxNode::Terminal(&attribute.close_quote),
            ],
            SyntaxNode::CodeBlock(code) => {
                let mut children = vec![SyntaxNode::Terminal(&code.start)];
                children.extend(code.code.as_ref().map(SyntaxNode::Capture));
                children.extend(code.end.as_ref().map(SyntaxNode::Terminal));
                children
            }
            SyntaxNode::Capture(_) | SyntaxNode::Terminal(_) => Vec::new(),
        }
    }

    /// Returns the slice of `source` this node was parsed from.
    ///
    /// `source` must be the text the tree was built from.
    pub fn text(self, source: &str) -> &str {
        &source[self.span().to_usize_range()]
    }
}

impl<'a> From<&'a Template> for SyntaxNode<'a> {
    fn from(template: &'a Template) -> Self {
        SyntaxNode::Template(template)
    }
}

impl<'a> From<&'a Directive> for SyntaxNode<'a> {
    fn from(directive: &'a Directive) -> Self {
        SyntaxNode::Directive(directive)
    }
}
