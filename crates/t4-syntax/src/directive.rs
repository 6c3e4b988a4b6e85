//! Directive dispatch and typed directive views.
//!
//! Every parsed directive is a [`Directive`] node; its [`DirectiveKind`] is
//! fixed at construction from the directive name. The typed views below
//! borrow a directive and expose its attributes with their schema types.

use crate::syntax::{Directive, SyntaxNode};

/// The closed set of directive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveKind {
    /// `<#@ assembly name="..." #>`
    Assembly,
    /// `<#@ import namespace="..." #>`
    Import,
    /// `<#@ include file="..." #>`
    Include,
    /// `<#@ output extension="..." #>`
    Output,
    /// `<#@ parameter name="..." type="..." #>`
    Parameter,
    /// `<#@ template ... #>`
    Template,
    /// Any other name; handled by a custom directive processor.
    Custom,
}

impl DirectiveKind {
    /// Every directive kind with a fixed schema.
    pub const BUILT_IN: [DirectiveKind; 6] = [
        DirectiveKind::Assembly,
        DirectiveKind::Import,
        DirectiveKind::Include,
        DirectiveKind::Output,
        DirectiveKind::Parameter,
        DirectiveKind::Template,
    ];

    /// Maps a directive name to its kind, ignoring ASCII case.
    ///
    /// Unrecognized names map to [`DirectiveKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        Self::BUILT_IN
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .unwrap_or(DirectiveKind::Custom)
    }

    /// Returns the canonical directive name. `Custom` has no fixed name and
    /// returns `"custom"`.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Assembly => "assembly",
            DirectiveKind::Import => "import",
            DirectiveKind::Include => "include",
            DirectiveKind::Output => "output",
            DirectiveKind::Parameter => "parameter",
            DirectiveKind::Template => "template",
            DirectiveKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a `true`/`false` attribute value, ignoring ASCII case.
fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

macro_rules! directive_view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'a>(&'a Directive);

        impl<'a> $name<'a> {
            /// Returns the underlying directive node.
            pub fn directive(self) -> &'a Directive {
                self.0
            }
        }
    };
}

directive_view!(
    /// `<#@ assembly #>`: references an assembly from the generated code.
    AssemblyDirective
);
directive_view!(
    /// `<#@ import #>`: imports a namespace into the generated code.
    ImportDirective
);
directive_view!(
    /// `<#@ include #>`: includes the text of another template file.
    IncludeDirective
);
directive_view!(
    /// `<#@ output #>`: sets the extension and encoding of the output.
    OutputDirective
);
directive_view!(
    /// `<#@ parameter #>`: declares a template parameter.
    ParameterDirective
);
directive_view!(
    /// `<#@ template #>`: configures how the template is compiled.
    TemplateDirective
);
directive_view!(
    /// Any other directive. Its attributes are unconstrained.
    CustomDirective
);

impl<'a> AssemblyDirective<'a> {
    /// The assembly name or path.
    pub fn name(self) -> Option<&'a str> {
        self.0.attribute_value("name")
    }
}

impl<'a> ImportDirective<'a> {
    /// The imported namespace.
    pub fn namespace(self) -> Option<&'a str> {
        self.0.attribute_value("namespace")
    }
}

impl<'a> IncludeDirective<'a> {
    /// The path of the included file.
    pub fn file(self) -> Option<&'a str> {
        self.0.attribute_value("file")
    }

    /// Whether the file is included at most once.
    pub fn once(self) -> Option<bool> {
        self.0.attribute_value("once").and_then(parse_bool)
    }
}

impl<'a> OutputDirective<'a> {
    /// The output file extension.
    pub fn extension(self) -> Option<&'a str> {
        self.0.attribute_value("extension")
    }

    /// The output encoding name.
    pub fn encoding(self) -> Option<&'a str> {
        self.0.attribute_value("encoding")
    }
}

impl<'a> ParameterDirective<'a> {
    /// The parameter name.
    pub fn name(self) -> Option<&'a str> {
        self.0.attribute_value("name")
    }

    /// The parameter's type name.
    pub fn parameter_type(self) -> Option<&'a str> {
        self.0.attribute_value("type")
    }
}

/// Values of the template directive's `hostspecific` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSpecific {
    /// `true`
    True,
    /// `false`
    False,
    /// `trueFromBase`
    TrueFromBase,
}

/// Values of the template directive's `visibility` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `public`
    Public,
    /// `internal`
    Internal,
}

impl<'a> TemplateDirective<'a> {
    /// The language of the template's code blocks, e.g. `C#` or `VB`.
    pub fn language(self) -> Option<&'a str> {
        self.0.attribute_value("language")
    }

    /// Extra options passed to the compiler.
    pub fn compiler_options(self) -> Option<&'a str> {
        self.0.attribute_value("compilerOptions")
    }

    /// The culture used to convert expression values to text.
    pub fn culture(self) -> Option<&'a str> {
        self.0.attribute_value("culture")
    }

    /// Whether debugging is enabled.
    pub fn debug(self) -> Option<bool> {
        self.0.attribute_value("debug").and_then(parse_bool)
    }

    /// Whether the template can access its host.
    pub fn host_specific(self) -> Option<HostSpecific> {
        let value = self.0.attribute_value("hostspecific")?;
        if value.eq_ignore_ascii_case("trueFromBase") {
            return Some(HostSpecific::TrueFromBase);
        }
        parse_bool(value).map(|flag| {
            if flag {
                HostSpecific::True
            } else {
                HostSpecific::False
            }
        })
    }

    /// The base class of the generated template class.
    pub fn inherits(self) -> Option<&'a str> {
        self.0.attribute_value("inherits")
    }

    /// Whether line pragmas are emitted.
    pub fn line_pragmas(self) -> Option<bool> {
        self.0.attribute_value("linePragmas").and_then(parse_bool)
    }

    /// The visibility of the generated template class.
    pub fn visibility(self) -> Option<Visibility> {
        let value = self.0.attribute_value("visibility")?;
        if value.eq_ignore_ascii_case("public") {
            Some(Visibility::Public)
        } else if value.eq_ignore_ascii_case("internal") {
            Some(Visibility::Internal)
        } else {
            None
        }
    }
}

impl<'a> CustomDirective<'a> {
    /// The directive name as written.
    pub fn name(self) -> &'a str {
        self.0.name()
    }

    /// The directive processor that handles this directive.
    pub fn processor(self) -> Option<&'a str> {
        self.0.attribute_value("processor")
    }

    /// Any attribute value by name.
    pub fn attribute_value(self, name: &str) -> Option<&'a str> {
        self.0.attribute_value(name)
    }
}

/// A directive viewed as its concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveVariant<'a> {
    /// `assembly`
    Assembly(AssemblyDirective<'a>),
    /// `import`
    Import(ImportDirective<'a>),
    /// `include`
    Include(IncludeDirective<'a>),
    /// `output`
    Output(OutputDirective<'a>),
    /// `parameter`
    Parameter(ParameterDirective<'a>),
    /// `template`
    Template(TemplateDirective<'a>),
    /// anything else
    Custom(CustomDirective<'a>),
}

impl Directive {
    /// Returns the typed view matching this directive's kind.
    pub fn variant(&self) -> DirectiveVariant<'_> {
        match self.kind() {
            DirectiveKind::Assembly => DirectiveVariant::Assembly(AssemblyDirective(self)),
            DirectiveKind::Import => DirectiveVariant::Import(ImportDirective(self)),
            DirectiveKind::Include => DirectiveVariant::Include(IncludeDirective(self)),
            DirectiveKind::Output => DirectiveVariant::Output(OutputDirective(self)),
            DirectiveKind::Parameter => DirectiveVariant::Parameter(ParameterDirective(self)),
            DirectiveKind::Template => DirectiveVariant::Template(TemplateDirective(self)),
            DirectiveKind::Custom => DirectiveVariant::Custom(CustomDirective(self)),
        }
    }
}

impl<'a> DirectiveVariant<'a> {
    /// Returns the underlying directive node.
    pub fn directive(self) -> &'a Directive {
        match self {
            DirectiveVariant::Assembly(d) => d.directive(),
            DirectiveVariant::Import(d) => d.directive(),
            DirectiveVariant::Include(d) => d.directive(),
            DirectiveVariant::Output(d) => d.directive(),
            DirectiveVariant::Parameter(d) => d.directive(),
            DirectiveVariant::Template(d) => d.directive(),
            DirectiveVariant::Custom(d) => d.directive(),
        }
    }

    /// Returns the directive as a syntax node.
    pub fn as_node(self) -> SyntaxNode<'a> {
        SyntaxNode::Directive(self.directive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn first_directive(source: &str) -> Directive {
        parse(source)
            .template
            .directives()
            .next()
            .cloned()
            .expect("expected a directive")
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(DirectiveKind::from_name("template"), DirectiveKind::Template);
        assert_eq!(DirectiveKind::from_name("TEMPLATE"), DirectiveKind::Template);
        assert_eq!(DirectiveKind::from_name("Import"), DirectiveKind::Import);
        assert_eq!(DirectiveKind::from_name("bogus"), DirectiveKind::Custom);
        assert_eq!(DirectiveKind::from_name("custom"), DirectiveKind::Custom);
        assert_eq!(DirectiveKind::from_name(""), DirectiveKind::Custom);
    }

    #[test]
    fn test_template_accessors() {
        let directive = first_directive(
            r#"<#@ template language="C#" debug="True" hostspecific="trueFromBase" visibility="internal" linePragmas="no" #>"#,
        );
        let DirectiveVariant::Template(template) = directive.variant() else {
            panic!("Expected TemplateDirective");
        };
        assert_eq!(template.language(), Some("C#"));
        assert_eq!(template.debug(), Some(true));
        assert_eq!(template.host_specific(), Some(HostSpecific::TrueFromBase));
        assert_eq!(template.visibility(), Some(Visibility::Internal));
        assert_eq!(template.line_pragmas(), None);
        assert_eq!(template.inherits(), None);
    }

    #[test]
    fn test_other_accessors() {
        let directive = first_directive(r#"<#@ parameter name="Count" type="System.Int32" #>"#);
        let DirectiveVariant::Parameter(parameter) = directive.variant() else {
            panic!("Expected ParameterDirective");
        };
        assert_eq!(parameter.name(), Some("Count"));
        assert_eq!(parameter.parameter_type(), Some("System.Int32"));

        let directive = first_directive(r#"<#@ include file="Common.ttinclude" once="true" #>"#);
        let DirectiveVariant::Include(include) = directive.variant() else {
            panic!("Expected IncludeDirective");
        };
        assert_eq!(include.file(), Some("Common.ttinclude"));
        assert_eq!(include.once(), Some(true));

        let directive = first_directive(r#"<#@ output extension=".cs" encoding="utf-8" #>"#);
        let DirectiveVariant::Output(output) = directive.variant() else {
            panic!("Expected OutputDirective");
        };
        assert_eq!(output.extension(), Some(".cs"));
        assert_eq!(output.encoding(), Some("utf-8"));
    }

    #[test]
    fn test_custom_directive() {
        let directive = first_directive(r#"<#@ bogus attr="1" processor="Proc" #>"#);
        let DirectiveVariant::Custom(custom) = directive.variant() else {
            panic!("Expected CustomDirective");
        };
        assert_eq!(custom.name(), "bogus");
        assert_eq!(custom.processor(), Some("Proc"));
        assert_eq!(custom.attribute_value("ATTR"), Some("1"));
        assert_eq!(custom.directive().kind(), DirectiveKind::Custom);
    }
}
