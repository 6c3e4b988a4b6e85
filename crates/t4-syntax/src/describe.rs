//! Description lookup for quick-info tooltips.

use crate::syntax::{Directive, SyntaxNode, Template};
use crate::SyntaxKind;
use source_map::{ByteOffset, Span};

/// A description of the syntax under an offset, and the span it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Description {
    /// The description text.
    pub text: &'static str,
    /// The span the description applies to.
    pub span: Span,
}

fn marker_description(kind: SyntaxKind) -> Option<&'static str> {
    let text = match kind {
        SyntaxKind::DirectiveBlockStart => {
            "Directive block. Directives give instructions to the text templating engine."
        }
        SyntaxKind::StatementBlockStart => {
            "Statement block. Code in this block runs each time the template is transformed."
        }
        SyntaxKind::ExpressionBlockStart => {
            "Expression block. The value of the expression is converted to text and written to the output."
        }
        SyntaxKind::ClassBlockStart => {
            "Class feature block. Members in this block are added to the generated template class."
        }
        SyntaxKind::BlockEnd => "Block end.",
        _ => return None,
    };
    Some(text)
}

impl<'a> SyntaxNode<'a> {
    /// Returns the most specific description for the syntax at `offset`.
    ///
    /// Block markers describe themselves. A directive name is described by
    /// its directive and an attribute by its schema entry. Offsets that fall
    /// between children, such as whitespace between attributes, have no
    /// description.
    pub fn description_at(self, offset: ByteOffset) -> Option<Description> {
        describe(self, None, offset)
    }
}

impl Template {
    /// Returns the most specific description for the syntax at `offset`.
    pub fn description_at(&self, offset: ByteOffset) -> Option<Description> {
        self.as_node().description_at(offset)
    }
}

fn describe(
    node: SyntaxNode<'_>,
    parent: Option<&Directive>,
    offset: ByteOffset,
) -> Option<Description> {
    if !node.span().contains(offset) {
        return None;
    }

    match node {
        SyntaxNode::Template(_) | SyntaxNode::CodeBlock(_) => node
            .children()
            .into_iter()
            .find_map(|child| describe(child, parent, offset)),
        SyntaxNode::Directive(directive) => node
            .children()
            .into_iter()
            .find_map(|child| describe(child, Some(directive), offset)),
        SyntaxNode::Attribute(attribute) => {
            let descriptor = parent?.kind().descriptor().attribute(attribute.name())?;
            Some(Description {
                text: descriptor.description(),
                span: attribute.span(),
            })
        }
        SyntaxNode::Capture(capture) if capture.kind() == SyntaxKind::DirectiveName => {
            Some(Description {
                text: parent?.kind().descriptor().description(),
                span: capture.span(),
            })
        }
        SyntaxNode::Capture(_) => None,
        SyntaxNode::Terminal(terminal) => Some(Description {
            text: marker_description(terminal.kind())?,
            span: terminal.span(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, DirectiveKind};
    use text_size::TextSize;

    fn describe_at(source: &str, offset: u32) -> Option<(String, &str)> {
        let result = parse(source);
        result
            .template
            .description_at(TextSize::from(offset))
            .map(|d| (d.text.to_string(), &source[d.span.to_usize_range()]))
    }

    const SOURCE: &str = r#"<#@ template  language="C#" #> <# x #>"#;

    #[test]
    fn test_block_start_describes_itself() {
        let (text, slice) = describe_at(SOURCE, 1).unwrap();
        assert!(text.starts_with("Directive block"));
        assert_eq!(slice, "<#@");

        let (text, slice) = describe_at(SOURCE, 31).unwrap();
        assert!(text.starts_with("Statement block"));
        assert_eq!(slice, "<#");
    }

    #[test]
    fn test_directive_name_uses_directive_description() {
        let (text, slice) = describe_at(SOURCE, 6).unwrap();
        assert_eq!(text, DirectiveKind::Template.descriptor().description());
        assert_eq!(slice, "template");
    }

    #[test]
    fn test_attribute_uses_schema_description() {
        let (text, slice) = describe_at(SOURCE, 24).unwrap();
        let language = DirectiveKind::Template
            .descriptor()
            .attribute("language")
            .unwrap();
        assert_eq!(text, language.description());
        assert_eq!(slice, r#"language="C#""#);
    }

    #[test]
    fn test_block_end_describes_itself() {
        let (text, slice) = describe_at(SOURCE, 28).unwrap();
        assert_eq!(text, "Block end.");
        assert_eq!(slice, "#>");
    }

    #[test]
    fn test_gaps_have_no_description() {
        // Between the name and the attribute.
        assert_eq!(describe_at(SOURCE, 13), None);
        // Literal text between blocks.
        assert_eq!(describe_at(SOURCE, 30), None);
        // Inside the code.
        assert_eq!(describe_at(SOURCE, 34), None);
        // Past the end.
        assert_eq!(describe_at(SOURCE, 100), None);
    }

    #[test]
    fn test_custom_attribute_has_no_description() {
        let source = r#"<#@ bogus attr="1" #>"#;
        assert_eq!(describe_at(source, 11), None);
        let (text, _) = describe_at(source, 5).unwrap();
        assert_eq!(text, DirectiveKind::Custom.descriptor().description());
    }
}
