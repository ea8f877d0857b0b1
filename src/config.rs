//! Analysis and rewrite configuration.
//!
//! The configuration surface mirrors what template integrations hand to the
//! optimizer: which attributes are opaque text, which are whitespace
//! delimited, which ident kinds may be rewritten, and which attributes are
//! analyzed for rewrite inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which ident kinds the optimizer is allowed to rewrite, and any literal
/// values that must be left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteIdents {
    pub id: bool,
    pub class: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_idents: Option<OmitIdents>,
}

/// Idents excluded from rewriting, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmitIdents {
    #[serde(default)]
    pub id: Vec<String>,
    #[serde(default)]
    pub class: Vec<String>,
}

impl Default for RewriteIdents {
    fn default() -> Self {
        Self {
            id: true,
            class: true,
            omit_idents: None,
        }
    }
}

/// Configuration consumed by the analysis core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// When set, non-whitespace-delimited attributes are taken verbatim as
    /// constants instead of being parsed for value expressions.
    pub plain_html: bool,
    /// Attributes always treated as opaque plain text.
    pub text_attributes: BTreeMap<String, bool>,
    /// Attributes whose values are whitespace-delimited token lists.
    pub whitespace_attributes: BTreeMap<String, bool>,
    pub rewrite_idents: RewriteIdents,
    /// Attributes whose constant values become rewrite-mapping inputs.
    pub analyzed_attributes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let flag_map = |names: &[&str]| {
            names
                .iter()
                .map(|n| (n.to_string(), true))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            plain_html: false,
            text_attributes: flag_map(&["title", "media", "content", "style"]),
            whitespace_attributes: flag_map(&["class"]),
            rewrite_idents: RewriteIdents::default(),
            analyzed_attributes: vec!["class".to_string(), "id".to_string()],
        }
    }
}

impl Config {
    pub fn is_text_attribute(&self, name: &str) -> bool {
        self.text_attributes.get(name).copied().unwrap_or(false)
    }

    pub fn is_whitespace_attribute(&self, name: &str) -> bool {
        self.whitespace_attributes
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    pub fn is_analyzed_attribute(&self, name: &str) -> bool {
        self.analyzed_attributes.iter().any(|a| a == name)
    }

    /// Whether the given ident value may be rewritten for the given kind.
    pub fn can_rewrite(&self, kind: crate::mapping::IdentKind, value: &str) -> bool {
        let enabled = match kind {
            crate::mapping::IdentKind::Id => self.rewrite_idents.id,
            crate::mapping::IdentKind::Class => self.rewrite_idents.class,
        };
        if !enabled {
            return false;
        }
        match &self.rewrite_idents.omit_idents {
            Some(omit) => {
                let omitted = match kind {
                    crate::mapping::IdentKind::Id => &omit.id,
                    crate::mapping::IdentKind::Class => &omit.class,
                };
                !omitted.iter().any(|v| v == value)
            }
            None => true,
        }
    }
}
