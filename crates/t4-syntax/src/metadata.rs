//! Directive metadata.
//!
//! Each directive kind has a statically declared schema: its attributes,
//! which of them are required, and the closed set of values an attribute
//! accepts, if any. The schema is turned into descriptors once, on first
//! use, and shared read-only for the rest of the process.

use crate::DirectiveKind;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

struct DirectiveSchema {
    kind: DirectiveKind,
    display_name: &'static str,
    description: &'static str,
    attributes: &'static [AttributeSchema],
}

struct AttributeSchema {
    name: &'static str,
    required: bool,
    description: &'static str,
    values: &'static [(&'static str, &'static str)],
}

const BOOLEAN_VALUES: &[(&str, &str)] = &[
    ("true", "Enables the option."),
    ("false", "Disables the option."),
];

const ENCODING_VALUES: &[(&str, &str)] = &[
    ("Default", "The system's default ANSI code page."),
    ("ASCII", "7-bit ASCII."),
    ("BigEndianUnicode", "UTF-16 with big endian byte order."),
    ("Unicode", "UTF-16 with little endian byte order."),
    ("UTF32", "UTF-32 with little endian byte order."),
    ("UTF7", "UTF-7."),
    ("UTF8", "UTF-8."),
    ("utf-8", "UTF-8."),
    ("utf-16", "UTF-16 with little endian byte order."),
    ("utf-16BE", "UTF-16 with big endian byte order."),
    ("utf-32", "UTF-32 with little endian byte order."),
    ("utf-32BE", "UTF-32 with big endian byte order."),
    ("us-ascii", "7-bit ASCII."),
    ("iso-8859-1", "Western European (ISO)."),
    ("windows-1252", "Western European (Windows)."),
];

/// Indexed by `DirectiveKind as usize`.
const SCHEMA: &[DirectiveSchema] = &[
    DirectiveSchema {
        kind: DirectiveKind::Assembly,
        display_name: "assembly",
        description: "Loads an assembly so that the template code can use its types.",
        attributes: &[AttributeSchema {
            name: "name",
            required: true,
            description: "The name of an assembly in the GAC, or the absolute path of an assembly file.",
            values: &[],
        }],
    },
    DirectiveSchema {
        kind: DirectiveKind::Import,
        display_name: "import",
        description: "Allows the template code to refer to types of a namespace without qualification.",
        attributes: &[AttributeSchema {
            name: "namespace",
            required: true,
            description: "The fully qualified name of the imported namespace.",
            values: &[],
        }],
    },
    DirectiveSchema {
        kind: DirectiveKind::Include,
        display_name: "include",
        description: "Includes text from another file in the current template.",
        attributes: &[
            AttributeSchema {
                name: "file",
                required: true,
                description: "The absolute path, or a path relative to the including template, of the included file.",
                values: &[],
            },
            AttributeSchema {
                name: "once",
                required: false,
                description: "Includes the file only once, even if it is included from several templates.",
                values: BOOLEAN_VALUES,
            },
        ],
    },
    DirectiveSchema {
        kind: DirectiveKind::Output,
        display_name: "output",
        description: "Defines the file name extension and encoding of the generated output.",
        attributes: &[
            AttributeSchema {
                name: "extension",
                required: true,
                description: "The file name extension of the output file, for example \".cs\".",
                values: &[],
            },
            AttributeSchema {
                name: "encoding",
                required: false,
                description: "The text encoding of the output file.",
                values: ENCODING_VALUES,
            },
        ],
    },
    DirectiveSchema {
        kind: DirectiveKind::Parameter,
        display_name: "parameter",
        description: "Declares a property of the template whose value is supplied by the host.",
        attributes: &[
            AttributeSchema {
                name: "name",
                required: true,
                description: "The name of the parameter property.",
                values: &[],
            },
            AttributeSchema {
                name: "type",
                required: true,
                description: "The fully qualified type name of the parameter property.",
                values: &[],
            },
        ],
    },
    DirectiveSchema {
        kind: DirectiveKind::Template,
        display_name: "template",
        description: "Specifies how the template should be compiled.",
        attributes: &[
            AttributeSchema {
                name: "language",
                required: false,
                description: "The language of the code in statement, expression and class feature blocks.",
                values: &[
                    ("C#", "Visual C#."),
                    ("VB", "Visual Basic."),
                ],
            },
            AttributeSchema {
                name: "compilerOptions",
                required: false,
                description: "Additional options passed to the compiler.",
                values: &[],
            },
            AttributeSchema {
                name: "culture",
                required: false,
                description: "The culture used to convert expression block values to text.",
                values: &[],
            },
            AttributeSchema {
                name: "debug",
                required: false,
                description: "Keeps the generated source and debug symbols so the template can be debugged.",
                values: BOOLEAN_VALUES,
            },
            AttributeSchema {
                name: "hostspecific",
                required: false,
                description: "Exposes the templating host to the template code through the Host property.",
                values: &[
                    ("true", "The template has a Host property."),
                    ("false", "The template has no Host property."),
                    ("trueFromBase", "The Host property is inherited from the base class."),
                ],
            },
            AttributeSchema {
                name: "inherits",
                required: false,
                description: "The base class of the generated template class.",
                values: &[],
            },
            AttributeSchema {
                name: "linePragmas",
                required: false,
                description: "Emits line pragmas that map generated code back to the template.",
                values: BOOLEAN_VALUES,
            },
            AttributeSchema {
                name: "visibility",
                required: false,
                description: "The visibility of the generated template class.",
                values: &[
                    ("public", "The class is visible outside its assembly."),
                    ("internal", "The class is visible only inside its assembly."),
                ],
            },
        ],
    },
    DirectiveSchema {
        kind: DirectiveKind::Custom,
        display_name: "custom",
        description: "A custom directive, handled by the directive processor named in its processor attribute.",
        attributes: &[],
    },
];

/// Describes one known value of an attribute.
#[derive(Debug)]
pub struct ValueDescriptor {
    name: &'static str,
    description: &'static str,
}

impl ValueDescriptor {
    /// The value as written in a template.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name shown in completion lists.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// A one-line description of the value.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Describes one attribute of a directive.
#[derive(Debug)]
pub struct AttributeDescriptor {
    name: &'static str,
    required: bool,
    description: &'static str,
    values: Vec<ValueDescriptor>,
    value_index: FxHashMap<String, usize>,
}

impl AttributeDescriptor {
    fn from_schema(schema: &AttributeSchema) -> Self {
        let values: Vec<ValueDescriptor> = schema
            .values
            .iter()
            .map(|&(name, description)| ValueDescriptor { name, description })
            .collect();
        let value_index = values
            .iter()
            .enumerate()
            .map(|(i, value)| (value.name.to_ascii_lowercase(), i))
            .collect();
        Self {
            name: schema.name,
            required: schema.required,
            description: schema.description,
            values,
            value_index,
        }
    }

    /// The canonical attribute name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name shown in completion lists.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// A one-line description of the attribute.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Whether a directive must specify this attribute.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the attribute only accepts its known values.
    pub fn is_closed(&self) -> bool {
        !self.values.is_empty()
    }

    /// The known values, in declaration order. Empty for free-form attributes.
    pub fn values(&self) -> &[ValueDescriptor] {
        &self.values
    }

    /// Looks up a known value, ignoring ASCII case.
    pub fn value(&self, name: &str) -> Option<&ValueDescriptor> {
        self.value_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.values[i])
    }
}

/// Describes a directive and its attribute schema.
#[derive(Debug)]
pub struct DirectiveDescriptor {
    kind: DirectiveKind,
    display_name: &'static str,
    description: &'static str,
    attributes: Vec<AttributeDescriptor>,
    attribute_index: FxHashMap<String, usize>,
}

impl DirectiveDescriptor {
    fn from_schema(schema: &DirectiveSchema) -> Self {
        let attributes: Vec<AttributeDescriptor> = schema
            .attributes
            .iter()
            .map(AttributeDescriptor::from_schema)
            .collect();
        let attribute_index = attributes
            .iter()
            .enumerate()
            .map(|(i, attribute)| (attribute.name.to_ascii_lowercase(), i))
            .collect();
        Self {
            kind: schema.kind,
            display_name: schema.display_name,
            description: schema.description,
            attributes,
            attribute_index,
        }
    }

    /// The directive kind this descriptor belongs to.
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    /// The name shown in completion lists.
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// A one-line description of the directive.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Whether the directive accepts arbitrary attributes.
    pub fn is_open(&self) -> bool {
        self.kind == DirectiveKind::Custom
    }

    /// The declared attributes, in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Looks up a declared attribute, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attribute_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.attributes[i])
    }

    /// The attributes a directive must specify.
    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|attribute| attribute.required)
    }
}

fn descriptors() -> &'static [DirectiveDescriptor] {
    static DESCRIPTORS: OnceLock<Vec<DirectiveDescriptor>> = OnceLock::new();
    DESCRIPTORS.get_or_init(|| {
        tracing::trace!("building directive descriptors");
        SCHEMA.iter().map(DirectiveDescriptor::from_schema).collect()
    })
}

/// Returns the descriptors of every directive with a fixed schema, in
/// declaration order. The custom directive is not included.
pub fn built_in_directives() -> &'static [DirectiveDescriptor] {
    &descriptors()[..DirectiveKind::BUILT_IN.len()]
}

impl DirectiveKind {
    /// Returns the metadata for this directive kind.
    pub fn descriptor(self) -> &'static DirectiveDescriptor {
        &descriptors()[self as usize]
    }
}
