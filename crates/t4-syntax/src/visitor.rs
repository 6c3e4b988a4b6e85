//! Tree visitor.
//!
//! [`SyntaxNode::accept`] dispatches to the most specific `visit_*` method
//! for a node. Every default method delegates to a more general one:
//!
//! - typed directives go to [`Visitor::visit_directive`]
//! - nonterminals go to [`Visitor::visit_nonterminal`], which walks the
//!   children
//! - captures go to [`Visitor::visit_capture`]
//! - markers, captures and punctuation end in [`Visitor::visit_terminal`],
//!   which does nothing
//!
//! A consumer overrides only the methods it cares about.

use crate::directive::{
    AssemblyDirective, CustomDirective, DirectiveVariant, ImportDirective, IncludeDirective,
    OutputDirective, ParameterDirective, TemplateDirective,
};
use crate::syntax::{Attribute, Capture, CodeBlock, Directive, SyntaxNode, Template, Terminal};
use crate::SyntaxKind;

/// A visitor over a borrowed syntax tree.
#[allow(unused_variables)]
pub trait Visitor<'a> {
    /// Visits the root.
    fn visit_template(&mut self, template: &'a Template) {
        self.visit_nonterminal(SyntaxNode::Template(template));
    }

    /// Visits any directive. The typed `visit_*_directive` methods end here.
    fn visit_directive(&mut self, directive: &'a Directive) {
        self.visit_nonterminal(SyntaxNode::Directive(directive));
    }

    /// Visits an `assembly` directive.
    fn visit_assembly_directive(&mut self, directive: AssemblyDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits an `import` directive.
    fn visit_import_directive(&mut self, directive: ImportDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits an `include` directive.
    fn visit_include_directive(&mut self, directive: IncludeDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits an `output` directive.
    fn visit_output_directive(&mut self, directive: OutputDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits a `parameter` directive.
    fn visit_parameter_directive(&mut self, directive: ParameterDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits a `template` directive.
    fn visit_template_directive(&mut self, directive: TemplateDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits a directive with an unrecognized name.
    fn visit_custom_directive(&mut self, directive: CustomDirective<'a>) {
        self.visit_directive(directive.directive());
    }

    /// Visits a `name="value"` attribute.
    fn visit_attribute(&mut self, attribute: &'a Attribute) {
        self.visit_nonterminal(SyntaxNode::Attribute(attribute));
    }

    /// Visits a statement, expression or class feature block.
    fn visit_code_block(&mut self, code_block: &'a CodeBlock) {
        self.visit_nonterminal(SyntaxNode::CodeBlock(code_block));
    }

    /// Visits any composite node. The default walks its children.
    fn visit_nonterminal(&mut self, node: SyntaxNode<'a>) {
        walk_children(self, node);
    }

    /// Visits `<#@`, `<#`, `<#=` or `<#+`.
    fn visit_block_start(&mut self, terminal: &'a Terminal) {
        self.visit_terminal(SyntaxNode::Terminal(terminal));
    }

    /// Visits `#>`.
    fn visit_block_end(&mut self, terminal: &'a Terminal) {
        self.visit_terminal(SyntaxNode::Terminal(terminal));
    }

    /// Visits the `=` of an attribute.
    fn visit_equals(&mut self, terminal: &'a Terminal) {
        self.visit_terminal(SyntaxNode::Terminal(terminal));
    }

    /// Visits an opening or closing `"` of an attribute value.
    fn visit_double_quote(&mut self, terminal: &'a Terminal) {
        self.visit_terminal(SyntaxNode::Terminal(terminal));
    }

    /// Visits the name of a directive.
    fn visit_directive_name(&mut self, capture: &'a Capture) {
        self.visit_capture(capture);
    }

    /// Visits the name of an attribute.
    fn visit_attribute_name(&mut self, capture: &'a Capture) {
        self.visit_capture(capture);
    }

    /// Visits the text between the quotes of an attribute.
    fn visit_attribute_value(&mut self, capture: &'a Capture) {
        self.visit_capture(capture);
    }

    /// Visits the verbatim content of a code block.
    fn visit_code(&mut self, capture: &'a Capture) {
        self.visit_capture(capture);
    }

    /// Visits any text-carrying leaf.
    fn visit_capture(&mut self, capture: &'a Capture) {
        self.visit_terminal(SyntaxNode::Capture(capture));
    }

    /// Visits any leaf. The default does nothing.
    fn visit_terminal(&mut self, node: SyntaxNode<'a>) {}
}

/// Dispatches every child of `node` to `visitor`, in source order.
pub fn walk_children<'a, V>(visitor: &mut V, node: SyntaxNode<'a>)
where
    V: Visitor<'a> + ?Sized,
{
    for child in node.children() {
        child.accept(visitor);
    }
}

impl<'a> SyntaxNode<'a> {
    /// Calls the `visit_*` method of `visitor` that matches this node.
    pub fn accept<V>(self, visitor: &mut V)
    where
        V: Visitor<'a> + ?Sized,
    {
        match self {
            SyntaxNode::Template(template) => visitor.visit_template(template),
            SyntaxNode::Directive(directive) => match directive.variant() {
                DirectiveVariant::Assembly(d) => visitor.visit_assembly_directive(d),
                DirectiveVariant::Import(d) => visitor.visit_import_directive(d),
                DirectiveVariant::Include(d) => visitor.visit_include_directive(d),
                DirectiveVariant::Output(d) => visitor.visit_output_directive(d),
                DirectiveVariant::Parameter(d) => visitor.visit_parameter_directive(d),
                DirectiveVariant::Template(d) => visitor.visit_template_directive(d),
                DirectiveVariant::Custom(d) => visitor.visit_custom_directive(d),
            },
            SyntaxNode::Attribute(attribute) => visitor.visit_attribute(attribute),
            SyntaxNode::CodeBlock(code_block) => visitor.visit_code_block(code_block),
            SyntaxNode::Capture(capture) => match capture.kind() {
                SyntaxKind::DirectiveName => visitor.visit_directive_name(capture),
                SyntaxKind::AttributeName => visitor.visit_attribute_name(capture),
                SyntaxKind::AttributeValue => visitor.visit_attribute_value(capture),
                SyntaxKind::Code => visitor.visit_code(capture),
                _ => visitor.visit_capture(capture),
            },
            SyntaxNode::Terminal(terminal) => match terminal.kind() {
                kind if kind.is_block_start() => visitor.visit_block_start(terminal),
                SyntaxKind::BlockEnd => visitor.visit_block_end(terminal),
                SyntaxKind::Equals => visitor.visit_equals(terminal),
                SyntaxKind::DoubleQuote => visitor.visit_double_quote(terminal),
                _ => visitor.visit_terminal(self),
            },
        }
    }
}

impl Template {
    /// Walks the whole tree with `visitor`.
    pub fn accept<'a, V>(&'a self, visitor: &mut V)
    where
        V: Visitor<'a> + ?Sized,
    {
        SyntaxNode::Template(self).accept(visitor);
    }
}
