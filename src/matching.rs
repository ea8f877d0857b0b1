//! Tri-state selector matching against partially-known elements.
//!
//! Every comparison answers one of four ways: the selector node definitely
//! matches (`Yes`), definitely does not (`No`), matches for some but not all
//! concrete instantiations (`Maybe`), or says nothing about this entity at
//! all (`Pass`). `No` answers are what let the optimizer delete rules; the
//! whole analysis is only sound if `No` is never returned for a selector
//! that could match some instantiation.

use crate::css::{Compound, ParsedSelector, SimpleSelector};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::value::Value;

/// The result of comparing a selector fragment to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    Yes,
    No,
    Maybe,
    /// The node carries no information about this entity.
    Pass,
}

impl Match {
    pub fn negate(self) -> Match {
        match self {
            Match::Yes => Match::No,
            Match::No => Match::Yes,
            Match::Maybe => Match::Maybe,
            Match::Pass => Match::Pass,
        }
    }

    /// Whether this result permits a match (anything but `No`).
    pub fn possible(self) -> bool {
        self != Match::No
    }
}

/// Combine per-alternative results for a value that is exactly one of its
/// alternatives: none possible is `No`, all certain is `Yes`, anything in
/// between is `Maybe`.
fn union<I: IntoIterator<Item = Match>>(results: I) -> Match {
    let mut any_possible = false;
    let mut all_yes = true;
    let mut empty = true;
    for result in results {
        empty = false;
        match result {
            Match::No => all_yes = false,
            Match::Yes => any_possible = true,
            Match::Maybe | Match::Pass => {
                any_possible = true;
                all_yes = false;
            }
        }
    }
    if empty || !any_possible {
        Match::No
    } else if all_yes {
        Match::Yes
    } else {
        Match::Maybe
    }
}

/// Combine node results within one compound: any `No` wins, then any
/// `Maybe`; nodes that say nothing are ignored, and a compound of only
/// `Pass` nodes is itself `Pass`.
fn conjunction<I: IntoIterator<Item = Match>>(results: I) -> Match {
    let mut outcome = Match::Pass;
    for result in results {
        match result {
            Match::No => return Match::No,
            Match::Maybe => outcome = Match::Maybe,
            Match::Yes => {
                if outcome == Match::Pass {
                    outcome = Match::Yes;
                }
            }
            Match::Pass => {}
        }
    }
    outcome
}

fn anchors_hold(value: &Value, s: &str) -> bool {
    match value {
        Value::StartsWith { prefix, .. } => s.starts_with(prefix.as_str()),
        Value::EndsWith { suffix, .. } => s.ends_with(suffix.as_str()),
        Value::StartsAndEndsWith { prefix, suffix, .. } => {
            s.len() >= prefix.len() + suffix.len()
                && s.starts_with(prefix.as_str())
                && s.ends_with(suffix.as_str())
        }
        _ => false,
    }
}

/// Identifier semantics: the whole value must be the single ident `ident`.
fn match_ident(value: &Value, ident: &str) -> Match {
    match value {
        Value::Absent => Match::No,
        Value::Unknown | Value::UnknownIdentifier => Match::Maybe,
        Value::Constant(c) => {
            if c == ident {
                Match::Yes
            } else {
                Match::No
            }
        }
        // The anchors alone decide: the selector token is a single ident, so
        // a whitespace allowance in the unconstrained segment is irrelevant.
        Value::StartsWith { .. } | Value::EndsWith { .. } | Value::StartsAndEndsWith { .. } => {
            if anchors_hold(value, ident) {
                Match::Yes
            } else {
                Match::No
            }
        }
        Value::Choice(opts) => union(opts.iter().map(|o| match_ident(o, ident))),
        // A whitespace-delimited set can never be a single id.
        Value::Set(_) => Match::No,
    }
}

/// Containment semantics: does some whitespace-delimited token of the value
/// match `token`?
fn match_class(value: &Value, token: &str) -> Match {
    match value {
        Value::Absent => Match::No,
        // The value could contain the token, but need not.
        Value::Unknown | Value::UnknownIdentifier => Match::Maybe,
        Value::Constant(c) => {
            if c == token {
                Match::Yes
            } else {
                Match::No
            }
        }
        Value::StartsWith { whitespace, .. }
        | Value::EndsWith { whitespace, .. }
        | Value::StartsAndEndsWith { whitespace, .. } => {
            // A whitespace allowance means the unknown segment could hide
            // any token at all; otherwise the anchors must at least permit
            // this one.
            if *whitespace || anchors_hold(value, token) {
                Match::Maybe
            } else {
                Match::No
            }
        }
        Value::Choice(opts) => union(opts.iter().map(|o| match_class(o, token))),
        // Every set member is realized by some token, so one certain member
        // makes the whole containment certain.
        Value::Set(items) => {
            let mut outcome = Match::No;
            for item in items {
                match match_class(&item.to_value(), token) {
                    Match::Yes => return Match::Yes,
                    Match::Maybe => outcome = Match::Maybe,
                    Match::No | Match::Pass => {}
                }
            }
            outcome
        }
    }
}

/// Presence semantics for `[name]` with no operator.
fn match_presence(value: &Value) -> Match {
    match value {
        Value::Absent => Match::No,
        Value::Unknown => Match::Maybe,
        Value::Choice(opts) => union(opts.iter().map(match_presence)),
        Value::UnknownIdentifier
        | Value::Constant(_)
        | Value::StartsWith { .. }
        | Value::EndsWith { .. }
        | Value::StartsAndEndsWith { .. }
        | Value::Set(_) => Match::Yes,
    }
}

fn match_tag(value: &Value, name: &str) -> Match {
    match value {
        Value::Constant(c) => {
            if c.eq_ignore_ascii_case(name) {
                Match::Yes
            } else {
                Match::No
            }
        }
        Value::Choice(opts) => {
            if opts.iter().any(|o| match_tag(o, name) == Match::Yes) {
                Match::Yes
            } else {
                Match::No
            }
        }
        Value::Unknown | Value::UnknownIdentifier => Match::Maybe,
        Value::StartsWith { .. } | Value::EndsWith { .. } | Value::StartsAndEndsWith { .. } => {
            if anchors_hold(value, name) {
                Match::Maybe
            } else {
                Match::No
            }
        }
        Value::Absent | Value::Set(_) => Match::No,
    }
}

impl Element {
    /// Evaluate one simple-selector node against this element.
    pub fn match_simple(&self, node: &SimpleSelector) -> Result<Match> {
        match node {
            SimpleSelector::Universal => Ok(Match::Yes),
            SimpleSelector::Tag { namespace, name } => {
                if namespace.as_deref() != self.tag.namespace_url.as_deref()
                    && namespace.is_some()
                {
                    return Ok(Match::No);
                }
                Ok(match_tag(&self.tag.value, name))
            }
            SimpleSelector::Id(ident) => Ok(match self.attribute("id") {
                None => Match::No,
                Some(attr) => match_ident(&attr.value, ident),
            }),
            SimpleSelector::Class(name) => Ok(match self.attribute("class") {
                None => Match::No,
                Some(attr) => match_class(&attr.value, name),
            }),
            SimpleSelector::Attribute {
                namespace,
                name,
                operator,
                value,
            } => {
                if let Some(op) = operator {
                    let rendered = value.as_deref().unwrap_or_default();
                    return Err(Error::UnsupportedSelector(format!(
                        "attribute operator in [{name}{}\"{rendered}\"]",
                        op.as_str()
                    )));
                }
                let found = self.attributes.iter().find(|a| {
                    a.name == *name && a.namespace_url.as_deref() == namespace.as_deref()
                });
                Ok(match found {
                    None => Match::No,
                    Some(attr) => match_presence(&attr.value),
                })
            }
            SimpleSelector::Not(inner) => {
                let mut results = Vec::with_capacity(inner.len());
                for compound in inner {
                    results.push(self.match_compound(compound)?.negate());
                }
                Ok(conjunction(results))
            }
            SimpleSelector::Pseudo(_) => Ok(Match::Pass),
        }
    }

    /// Evaluate a compound (all nodes conjoined) against this element.
    pub fn match_compound(&self, compound: &Compound) -> Result<Match> {
        let mut results = Vec::with_capacity(compound.parts.len());
        for part in &compound.parts {
            results.push(self.match_simple(part)?);
        }
        Ok(conjunction(results))
    }

    /// Evaluate a full selector. With `key_only`, only the rightmost
    /// compound is tested (the ancestor context is unknowable per element);
    /// otherwise every compound must be individually possible.
    pub fn match_selector(&self, selector: &ParsedSelector, key_only: bool) -> Result<Match> {
        if key_only {
            return self.match_compound(selector.key());
        }
        let mut results = Vec::with_capacity(selector.compounds.len());
        for compound in &selector.compounds {
            let result = self.match_compound(compound)?;
            if result == Match::No {
                return Ok(Match::No);
            }
            results.push(result);
        }
        Ok(conjunction(results))
    }
}

/// Whether any selector of a rule could apply to the element, keyed on the
/// subject compound.
pub fn rule_matches(selectors: &[ParsedSelector], element: &Element) -> Result<Match> {
    let mut best = Match::No;
    for selector in selectors {
        match element.match_selector(selector, true)? {
            Match::Yes => return Ok(Match::Yes),
            Match::Maybe | Match::Pass => best = Match::Maybe,
            Match::No => {}
        }
    }
    Ok(best)
}
