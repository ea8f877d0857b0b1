//! Matchable entities: tags, attributes, and the elements that carry them.
//!
//! An [`Element`] is one template tag occurrence annotated with everything
//! statically knowable about it. Entities are immutable once constructed and
//! serialize to the `{namespaceURL?, name?, value}` interchange form.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::value::{Value, parse_single_value, parse_whitespace_delimited};

/// A line/column pair, 1-based, as reported by template parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Where an element occurrence sits in its source template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
}

/// A tag name with what is known about its runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(
        rename = "namespaceURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace_url: Option<String>,
    pub value: Value,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            namespace_url: None,
            value: Value::Constant(name.into()),
        }
    }

    pub fn with_value(value: Value) -> Self {
        Tag {
            namespace_url: None,
            value,
        }
    }
}

/// An attribute with what is known about its runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(
        rename = "namespaceURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace_url: Option<String>,
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Attribute {
            namespace_url: None,
            name: name.into(),
            value,
        }
    }

    /// Build an attribute from raw template text, applying the caller policy
    /// that gates the value grammar:
    ///
    /// * event handlers (`on*`) and `javascript:` values are non-stylistic
    ///   and become `Absent`;
    /// * configured text attributes are opaque constants;
    /// * configured whitespace attributes parse in whitespace-delimited mode;
    /// * everything else parses in single-value mode, or is taken verbatim
    ///   as a constant when `plain_html` is set.
    pub fn from_template(config: &Config, name: impl Into<String>, raw: &str) -> Result<Attribute> {
        let name = name.into();
        let value = if name.starts_with("on") || raw.trim_start().starts_with("javascript:") {
            Value::Absent
        } else if config.is_text_attribute(&name) {
            Value::Constant(raw.to_string())
        } else if config.is_whitespace_attribute(&name) {
            parse_whitespace_delimited(raw).map_err(|e| e.in_attribute(&name))?
        } else if config.plain_html {
            Value::Constant(raw.to_string())
        } else {
            parse_single_value(raw).map_err(|e| e.in_attribute(&name))?
        };
        Ok(Attribute {
            namespace_url: None,
            name,
            value,
        })
    }
}

/// One analyzed tag occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: Tag,
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

impl Element {
    pub fn new(tag: Tag, attributes: Vec<Attribute>) -> Self {
        Element {
            tag,
            attributes,
            location: None,
        }
    }

    pub fn at(mut self, start: Position, end: Option<Position>) -> Self {
        self.location = Some(SourceSpan { start, end });
        self
    }

    /// Build an element from a template parser's raw view: tag name plus
    /// `(name, rawValue)` attribute pairs.
    pub fn from_template<'a>(
        config: &Config,
        tag_name: &str,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Element> {
        let attributes = attributes
            .into_iter()
            .map(|(name, raw)| Attribute::from_template(config, name, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Element::new(Tag::new(tag_name), attributes))
    }

    /// The first attribute with the given name and no namespace.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace_url.is_none())
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Element> {
        Ok(serde_json::from_value(json.clone())?)
    }
}
