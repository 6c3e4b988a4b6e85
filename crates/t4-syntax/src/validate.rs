//! Directive validation against the schema table.

use crate::error::{TemplateError, TemplateErrorKind};
use crate::syntax::{Directive, Template};
use crate::visitor::Visitor;
use source_map::{Position, Span};

#[derive(Default)]
struct Validator {
    errors: Vec<TemplateError>,
}

impl Validator {
    fn report(&mut self, kind: TemplateErrorKind, span: Span, position: Position) {
        self.errors.push(TemplateError::new(kind, span, position));
    }
}

impl<'a> Visitor<'a> for Validator {
    fn visit_directive(&mut self, directive: &'a Directive) {
        let descriptor = directive.kind().descriptor();
        if descriptor.is_open() {
            return;
        }

        for required in descriptor.required_attributes() {
            if directive.attribute(required.name()).is_none() {
                self.report(
                    TemplateErrorKind::MissingRequiredAttribute {
                        directive: directive.name().to_string(),
                        attribute: required.name().to_string(),
                    },
                    directive.span(),
                    directive.position(),
                );
            }
        }

        for attribute in directive.attributes() {
            let Some(schema) = descriptor.attribute(attribute.name()) else {
                self.report(
                    TemplateErrorKind::UnexpectedAttribute {
                        directive: directive.name().to_string(),
                        attribute: attribute.name().to_string(),
                    },
                    attribute.span(),
                    attribute.position(),
                );
                continue;
            };

            if schema.is_closed() && schema.value(attribute.value()).is_none() {
                let value = attribute.value_node();
                self.report(
                    TemplateErrorKind::UnknownAttributeValue {
                        attribute: attribute.name().to_string(),
                        value: attribute.value().to_string(),
                    },
                    value.span(),
                    value.position(),
                );
            }
        }
    }
}

/// Checks every directive in `template` against its schema.
///
/// Errors come back in tree order. Custom directives accept any attribute.
pub fn validate(template: &Template) -> Vec<TemplateError> {
    let mut validator = Validator::default();
    template.accept(&mut validator);
    tracing::debug!(
        directives = template.directives().count(),
        errors = validator.errors.len(),
        "validated directives"
    );
    validator.errors
}

impl Template {
    /// Checks every directive against its schema. See [`validate`].
    pub fn validate(&self) -> Vec<TemplateError> {
        validate(self)
    }
}
