//! The attribute-value lattice.
//!
//! A [`Value`] describes everything statically knowable about one attribute
//! or tag-name value in a template: a constant, a known prefix/suffix with an
//! unknown middle, a choice between alternatives, a whitespace-delimited set
//! of tokens, or nothing at all. Optimization passes never see concrete
//! runtime strings; they reason over these shapes instead.

mod grammar;

pub use grammar::{parse_single_value, parse_whitespace_delimited};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What is statically known about a dynamic value.
///
/// `Choice` and `Set` nest arbitrarily deep (a choice alternative may itself
/// be a set, and set members may be choices); every algorithm over this type
/// recurses structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// Any value at all, including whitespace.
    Unknown,
    /// Any single token: no whitespace.
    UnknownIdentifier,
    /// The attribute or value does not exist.
    Absent,
    Constant(String),
    #[serde(rename_all = "camelCase")]
    StartsWith {
        prefix: String,
        /// Whether the unconstrained tail may contain whitespace.
        #[serde(rename = "whitespaceAllowedInTail")]
        whitespace: bool,
    },
    #[serde(rename_all = "camelCase")]
    EndsWith {
        suffix: String,
        #[serde(rename = "whitespaceAllowedInHead")]
        whitespace: bool,
    },
    #[serde(rename_all = "camelCase")]
    StartsAndEndsWith {
        prefix: String,
        suffix: String,
        #[serde(rename = "whitespaceAllowedInMiddle")]
        whitespace: bool,
    },
    /// Exactly one of the alternatives holds.
    #[serde(rename = "oneOf")]
    Choice(Vec<Value>),
    /// A whitespace-delimited collection; each member independently holds for
    /// some disjoint token of the value.
    #[serde(rename = "allOf")]
    Set(Vec<SetItem>),
}

/// A member of a [`Value::Set`].
///
/// Excludes `Set` (no directly nested sets) and `Unknown` (no inline unknown
/// inside a set item); `Choice` members carry full [`Value`] alternatives, so
/// deeper nesting goes through choices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetItem {
    UnknownIdentifier,
    Absent,
    Constant(String),
    #[serde(rename_all = "camelCase")]
    StartsWith {
        prefix: String,
        #[serde(rename = "whitespaceAllowedInTail")]
        whitespace: bool,
    },
    #[serde(rename_all = "camelCase")]
    EndsWith {
        suffix: String,
        #[serde(rename = "whitespaceAllowedInHead")]
        whitespace: bool,
    },
    #[serde(rename_all = "camelCase")]
    StartsAndEndsWith {
        prefix: String,
        suffix: String,
        #[serde(rename = "whitespaceAllowedInMiddle")]
        whitespace: bool,
    },
    #[serde(rename = "oneOf")]
    Choice(Vec<Value>),
}

impl SetItem {
    /// View this member as a standalone [`Value`].
    pub fn to_value(&self) -> Value {
        match self {
            SetItem::UnknownIdentifier => Value::UnknownIdentifier,
            SetItem::Absent => Value::Absent,
            SetItem::Constant(s) => Value::Constant(s.clone()),
            SetItem::StartsWith { prefix, whitespace } => Value::StartsWith {
                prefix: prefix.clone(),
                whitespace: *whitespace,
            },
            SetItem::EndsWith { suffix, whitespace } => Value::EndsWith {
                suffix: suffix.clone(),
                whitespace: *whitespace,
            },
            SetItem::StartsAndEndsWith {
                prefix,
                suffix,
                whitespace,
            } => Value::StartsAndEndsWith {
                prefix: prefix.clone(),
                suffix: suffix.clone(),
                whitespace: *whitespace,
            },
            SetItem::Choice(opts) => Value::Choice(opts.clone()),
        }
    }
}

impl TryFrom<Value> for SetItem {
    type Error = Value;

    /// Fails for `Set` and `Unknown`, returning the rejected value.
    fn try_from(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::UnknownIdentifier => Ok(SetItem::UnknownIdentifier),
            Value::Absent => Ok(SetItem::Absent),
            Value::Constant(s) => Ok(SetItem::Constant(s)),
            Value::StartsWith { prefix, whitespace } => {
                Ok(SetItem::StartsWith { prefix, whitespace })
            }
            Value::EndsWith { suffix, whitespace } => Ok(SetItem::EndsWith { suffix, whitespace }),
            Value::StartsAndEndsWith {
                prefix,
                suffix,
                whitespace,
            } => Ok(SetItem::StartsAndEndsWith {
                prefix,
                suffix,
                whitespace,
            }),
            Value::Choice(opts) => Ok(SetItem::Choice(opts)),
            rejected @ (Value::Unknown | Value::Set(_)) => Err(rejected),
        }
    }
}

fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

impl Value {
    /// Whether the concrete string `s` is a value this shape could take.
    ///
    /// For `Set`, every member must be legal against some whitespace token of
    /// `s` (or be satisfiable by the empty string, which covers optional
    /// members). This deliberately does not enforce a one-to-one pairing
    /// between members and tokens; it may allow some tokens to satisfy more
    /// than one member. Conservative by design.
    pub fn is_legal(&self, s: &str) -> bool {
        match self {
            Value::Unknown => true,
            Value::UnknownIdentifier => !has_whitespace(s),
            Value::Absent => s.is_empty(),
            Value::Constant(c) => c == s,
            Value::StartsWith { prefix, whitespace } => {
                s.starts_with(prefix.as_str())
                    && (*whitespace || !has_whitespace(&s[prefix.len()..]))
            }
            Value::EndsWith { suffix, whitespace } => {
                s.ends_with(suffix.as_str())
                    && (*whitespace || !has_whitespace(&s[..s.len() - suffix.len()]))
            }
            Value::StartsAndEndsWith {
                prefix,
                suffix,
                whitespace,
            } => {
                s.len() >= prefix.len() + suffix.len()
                    && s.starts_with(prefix.as_str())
                    && s.ends_with(suffix.as_str())
                    && (*whitespace || !has_whitespace(&s[prefix.len()..s.len() - suffix.len()]))
            }
            Value::Choice(opts) => opts.iter().any(|o| o.is_legal(s)),
            Value::Set(items) => {
                let tokens: Vec<&str> = s.split_whitespace().collect();
                items.iter().all(|item| {
                    let v = item.to_value();
                    v.is_legal("") || tokens.iter().any(|t| v.is_legal(t))
                })
            }
        }
    }

    /// Expand nested choice/set structure into every concrete alternative
    /// this value can realize.
    ///
    /// Choices inside a set expand to the cross product of concrete sets;
    /// sets inside a choice splice into a flat alternative list. Order is
    /// deterministic: outer-to-inner, left-to-right. With `n` choice points
    /// of `k_i` options this produces `∏ k_i` entries — combinatorial, and no
    /// pruning is performed.
    pub fn flatten(&self) -> Vec<Value> {
        match self {
            Value::Choice(opts) => opts.iter().flat_map(|o| o.flatten()).collect(),
            Value::Set(items) => {
                let mut combos: Vec<Vec<SetItem>> = vec![Vec::new()];
                for item in items {
                    let expansions = item.flatten_members();
                    let mut next = Vec::with_capacity(combos.len() * expansions.len());
                    for combo in &combos {
                        for expansion in &expansions {
                            let mut extended = combo.clone();
                            extended.extend(expansion.iter().cloned());
                            next.push(extended);
                        }
                    }
                    combos = next;
                }
                combos.into_iter().map(Value::Set).collect()
            }
            other => vec![other.clone()],
        }
    }

    /// Ordered, deduplicated constant leaves with a per-leaf static flag.
    ///
    /// A leaf is static unless it sits under a `Choice`: its presence then
    /// depends on which alternative is realized at runtime.
    pub fn constants(&self) -> Vec<(String, bool)> {
        let mut out: Vec<(String, bool)> = Vec::new();
        self.collect_constants(true, &mut out);
        out
    }

    fn collect_constants(&self, is_static: bool, out: &mut Vec<(String, bool)>) {
        match self {
            Value::Constant(s) => {
                if !out.iter().any(|(v, _)| v == s) {
                    out.push((s.clone(), is_static));
                }
            }
            Value::Choice(opts) => {
                for opt in opts {
                    opt.collect_constants(false, out);
                }
            }
            Value::Set(items) => {
                for item in items {
                    item.to_value().collect_constants(is_static, out);
                }
            }
            Value::Unknown
            | Value::UnknownIdentifier
            | Value::Absent
            | Value::StartsWith { .. }
            | Value::EndsWith { .. }
            | Value::StartsAndEndsWith { .. } => {}
        }
    }

    /// The concrete string this value renders to, if it has no remaining
    /// ambiguity. `Absent` renders as the empty string; a concrete set joins
    /// its tokens with single spaces.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Constant(s) => Some(s.clone()),
            Value::Absent => Some(String::new()),
            Value::Set(items) => {
                let mut tokens = Vec::with_capacity(items.len());
                for item in items {
                    match item.to_value().render()? {
                        t if t.is_empty() => {}
                        t => tokens.push(t),
                    }
                }
                Some(tokens.join(" "))
            }
            Value::Unknown
            | Value::UnknownIdentifier
            | Value::StartsWith { .. }
            | Value::EndsWith { .. }
            | Value::StartsAndEndsWith { .. }
            | Value::Choice(_) => None,
        }
    }

    /// Whether different runtime instantiations of this value can differ.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Value::Constant(_) | Value::Absent => false,
            Value::Unknown
            | Value::UnknownIdentifier
            | Value::StartsWith { .. }
            | Value::EndsWith { .. }
            | Value::StartsAndEndsWith { .. }
            | Value::Choice(_) => true,
            Value::Set(items) => items.iter().any(|i| i.to_value().is_ambiguous()),
        }
    }

    /// Structural JSON encoding (the interchange form for analyses).
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        Ok(serde_json::from_value(json.clone())?)
    }
}

impl SetItem {
    /// Concrete member lists this item can contribute to an enclosing set.
    ///
    /// A choice alternative that is itself a set splices its members into the
    /// enclosing set; an absent alternative contributes nothing.
    fn flatten_members(&self) -> Vec<Vec<SetItem>> {
        match self {
            SetItem::Choice(opts) => {
                let mut expansions = Vec::new();
                for opt in opts {
                    for alternative in opt.flatten() {
                        match alternative {
                            Value::Set(members) => expansions.push(members),
                            Value::Absent => expansions.push(Vec::new()),
                            concrete => match SetItem::try_from(concrete) {
                                Ok(member) => expansions.push(vec![member]),
                                // Unknown cannot appear inside a set; the
                                // grammar rejects it at parse time.
                                Err(_) => debug_assert!(false, "unknown inside set choice"),
                            },
                        }
                    }
                }
                expansions
            }
            SetItem::Absent => vec![Vec::new()],
            other => vec![vec![other.clone()]],
        }
    }
}
