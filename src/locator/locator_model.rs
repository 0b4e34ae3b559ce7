use std::fmt;

use serde::{Deserialize, Serialize};

/// Attributes consulted for a locator, highest priority first.
/// The first stable value that yields a unique expression wins.
pub const ATTRIBUTE_PRIORITY: [&str; 9] = [
    "id",
    "name",
    "placeholder",
    "value",
    "title",
    "type",
    "class",
    "aria-label",
    "data-testid",
];

/// Sentinel stored in `LocatorDescriptor::attribute` for text-based locators.
pub const TEXT_ATTRIBUTE: &str = "text";

/// Element categories worth locating in UI automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessableTag {
    Input,
    Button,
    Select,
    Textarea,
    A,
    Label,
    Img,
    Div,
}

impl GuessableTag {
    pub const ALL: [GuessableTag; 8] = [
        GuessableTag::Input,
        GuessableTag::Button,
        GuessableTag::Select,
        GuessableTag::Textarea,
        GuessableTag::A,
        GuessableTag::Label,
        GuessableTag::Img,
        GuessableTag::Div,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuessableTag::Input => "input",
            GuessableTag::Button => "button",
            GuessableTag::Select => "select",
            GuessableTag::Textarea => "textarea",
            GuessableTag::A => "a",
            GuessableTag::Label => "label",
            GuessableTag::Img => "img",
            GuessableTag::Div => "div",
        }
    }

    /// Case-insensitive lookup. Returns `None` for tags outside the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for GuessableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query addressing elements in a DOM snapshot.
///
/// Kept structured so static snapshots can evaluate it without an XPath
/// engine; `Display` renders the XPath handed to browsers and to the
/// code generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorExpression {
    /// `//tag[@attribute='value']`
    Attribute {
        tag: GuessableTag,
        attribute: String,
        value: String,
    },
    /// `//tag[text()='text']`
    Text { tag: GuessableTag, text: String },
}

impl LocatorExpression {
    pub fn attribute(tag: GuessableTag, attribute: &str, value: &str) -> Self {
        LocatorExpression::Attribute {
            tag,
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    pub fn text(tag: GuessableTag, text: &str) -> Self {
        LocatorExpression::Text {
            tag,
            text: text.to_string(),
        }
    }

    pub fn tag(&self) -> GuessableTag {
        match self {
            LocatorExpression::Attribute { tag, .. } | LocatorExpression::Text { tag, .. } => *tag,
        }
    }

    pub fn to_xpath(&self) -> String {
        match self {
            LocatorExpression::Attribute {
                tag,
                attribute,
                value,
            } => format!("//{}[@{}={}]", tag, attribute, xpath_literal(value)),
            LocatorExpression::Text { tag, text } => {
                format!("//{}[text()={}]", tag, xpath_literal(text))
            }
        }
    }
}

impl fmt::Display for LocatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Quote a string as an XPath 1.0 literal. XPath has no escape sequences,
/// so a value holding both quote kinds must be split with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|segment| format!("'{}'", segment))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// One located element: how to find it and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    pub tag: GuessableTag,

    /// Attribute the locator was built from, or `"text"`.
    pub attribute: String,

    /// Raw attribute value or trimmed visible text.
    pub value: String,

    pub locator_expression: String,

    pub variable_name: String,
}

impl LocatorDescriptor {
    /// `variable_name: locator_expression`, the line format handed to the code generator.
    pub fn as_prompt_line(&self) -> String {
        format!("{}: {}", self.variable_name, self.locator_expression)
    }
}

/// Descriptors in DOM traversal order.
///
/// Expressions are unique against the snapshot they were built from;
/// variable names may collide and are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorCollection {
    descriptors: Vec<LocatorDescriptor>,
}

impl LocatorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: LocatorDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocatorDescriptor> {
        self.descriptors.iter()
    }

    pub fn as_slice(&self) -> &[LocatorDescriptor] {
        &self.descriptors
    }

    pub fn find_by_variable(&self, name: &str) -> Option<&LocatorDescriptor> {
        self.descriptors.iter().find(|d| d.variable_name == name)
    }

    /// Newline-joined `variable_name: locator_expression` lines.
    pub fn available_elements(&self) -> String {
        self.descriptors
            .iter()
            .map(LocatorDescriptor::as_prompt_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<LocatorDescriptor>> for LocatorCollection {
    fn from(descriptors: Vec<LocatorDescriptor>) -> Self {
        Self { descriptors }
    }
}

impl<'a> IntoIterator for &'a LocatorCollection {
    type Item = &'a LocatorDescriptor;
    type IntoIter = std::slice::Iter<'a, LocatorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl IntoIterator for LocatorCollection {
    type Item = LocatorDescriptor;
    type IntoIter = std::vec::IntoIter<LocatorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}
