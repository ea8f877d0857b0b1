//! Selector model and parser.
//!
//! Selectors are parsed from cssparser tokens into a small owned model: a
//! chain of [`Compound`]s joined by [`Combinator`]s. The matcher only needs
//! node type, value, namespace, and the ability to recurse into `:not(…)`,
//! so no external selector engine is involved.

use std::cmp::Ordering;
use std::fmt;

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::error::{Error, Result};

/// How two adjacent compounds relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

impl Combinator {
    fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
        }
    }
}

/// An attribute selector's value test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl AttrOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AttrOperator::Equals => "=",
            AttrOperator::Includes => "~=",
            AttrOperator::DashMatch => "|=",
            AttrOperator::Prefix => "^=",
            AttrOperator::Suffix => "$=",
            AttrOperator::Substring => "*=",
        }
    }
}

/// One simple selector node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag {
        namespace: Option<String>,
        name: String,
    },
    Id(String),
    Class(String),
    Attribute {
        namespace: Option<String>,
        name: String,
        operator: Option<AttrOperator>,
        value: Option<String>,
    },
    /// Each inner entry is one negated compound; `:not(a, b)` carries two.
    Not(Vec<Compound>),
    /// Any other pseudo-class or pseudo-element, by name (with a leading
    /// `:` or `::`).
    Pseudo(String),
}

/// A maximal run of simple selectors with no combinator, e.g. `div.foo#bar`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

/// A full selector: compounds joined by combinators.
///
/// `combinators.len()` is always `compounds.len() - 1`; `combinators[i]`
/// sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

impl ParsedSelector {
    /// The rightmost compound: the one that must match the subject element.
    pub fn key(&self) -> &Compound {
        self.compounds
            .last()
            .unwrap_or_else(|| unreachable!("selectors have at least one compound"))
    }

    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for compound in &self.compounds {
            spec = spec + compound.specificity();
        }
        spec
    }
}

impl Compound {
    fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for part in &self.parts {
            match part {
                SimpleSelector::Universal => {}
                SimpleSelector::Tag { .. } => spec.elements += 1,
                SimpleSelector::Id(_) => spec.ids += 1,
                SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => spec.classes += 1,
                SimpleSelector::Pseudo(name) => {
                    if name.starts_with("::") {
                        spec.elements += 1;
                    } else {
                        spec.classes += 1;
                    }
                }
                // :not() contributes its most specific argument.
                SimpleSelector::Not(inner) => {
                    if let Some(max) = inner.iter().map(Compound::specificity).max() {
                        spec = spec + max;
                    }
                }
            }
        }
        spec
    }
}

/// CSS specificity for cascade ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity {
            ids: self.ids + other.ids,
            classes: self.classes + other.classes,
            elements: self.elements + other.elements,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Universal => write!(f, "*"),
            SimpleSelector::Tag { namespace, name } => match namespace {
                Some(ns) => write!(f, "{ns}|{name}"),
                None => write!(f, "{name}"),
            },
            SimpleSelector::Id(id) => write!(f, "#{id}"),
            SimpleSelector::Class(class) => write!(f, ".{class}"),
            SimpleSelector::Attribute {
                namespace,
                name,
                operator,
                value,
            } => {
                write!(f, "[")?;
                if let Some(ns) = namespace {
                    write!(f, "{ns}|")?;
                }
                write!(f, "{name}")?;
                if let (Some(op), Some(v)) = (operator, value) {
                    write!(f, "{}\"{v}\"", op.as_str())?;
                }
                write!(f, "]")
            }
            SimpleSelector::Not(inner) => {
                write!(f, ":not(")?;
                for (i, compound) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{compound}")?;
                }
                write!(f, ")")
            }
            SimpleSelector::Pseudo(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ParsedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.combinators[i - 1].as_str())?;
            }
            write!(f, "{compound}")?;
        }
        Ok(())
    }
}

/// Internal parse failure, carried through cssparser's error plumbing.
#[derive(Debug, Clone)]
enum SelectorError {
    Invalid(String),
    Unsupported(String),
}

type SelectorParseError<'i> = ParseError<'i, SelectorError>;

/// Parse a comma-separated selector list.
pub fn parse_selector_list(text: &str) -> Result<Vec<ParsedSelector>> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut selectors = Vec::new();
    loop {
        let (selector, more) = parse_one(&mut parser).map_err(|e| match e.kind {
            cssparser::ParseErrorKind::Custom(SelectorError::Unsupported(what)) => {
                Error::UnsupportedSelector(what)
            }
            _ => Error::InvalidSelector(text.to_string()),
        })?;
        selectors.push(selector);
        if !more {
            break;
        }
    }
    Ok(selectors)
}

/// Parse one selector up to a comma or end of input. Returns the selector
/// and whether a comma (hence another selector) follows.
fn parse_one<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<(ParsedSelector, bool), SelectorParseError<'i>> {
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut current = Compound::default();
    let mut pending: Option<Combinator> = None;
    let mut more = false;

    loop {
        let token = match input.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => {
                if !current.parts.is_empty() && pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
            }
            Token::Comma => {
                more = true;
                break;
            }
            Token::Delim('>') => set_combinator(input, &mut pending, Combinator::Child, &current)?,
            Token::Delim('+') => {
                set_combinator(input, &mut pending, Combinator::NextSibling, &current)?
            }
            Token::Delim('~') => {
                set_combinator(input, &mut pending, Combinator::SubsequentSibling, &current)?
            }
            other => {
                let part = parse_simple(input, other)?;
                if let Some(combinator) = pending.take() {
                    if current.parts.is_empty() {
                        return Err(input
                            .new_custom_error(SelectorError::Invalid("leading combinator".into())));
                    }
                    compounds.push(std::mem::take(&mut current));
                    combinators.push(combinator);
                }
                current.parts.push(part);
            }
        }
    }

    if current.parts.is_empty() {
        return Err(input.new_custom_error(SelectorError::Invalid("empty selector".into())));
    }
    if matches!(pending, Some(c) if c != Combinator::Descendant) {
        return Err(input.new_custom_error(SelectorError::Invalid("dangling combinator".into())));
    }
    compounds.push(current);
    Ok((
        ParsedSelector {
            compounds,
            combinators,
        },
        more,
    ))
}

fn set_combinator<'i>(
    input: &mut Parser<'i, '_>,
    pending: &mut Option<Combinator>,
    combinator: Combinator,
    current: &Compound,
) -> std::result::Result<(), SelectorParseError<'i>> {
    if current.parts.is_empty() {
        return Err(input.new_custom_error(SelectorError::Invalid("leading combinator".into())));
    }
    // Overrides the descendant combinator implied by preceding whitespace.
    *pending = Some(combinator);
    Ok(())
}

fn parse_simple<'i>(
    input: &mut Parser<'i, '_>,
    token: Token<'i>,
) -> std::result::Result<SimpleSelector, SelectorParseError<'i>> {
    match token {
        Token::Delim('*') => Ok(SimpleSelector::Universal),
        Token::Ident(name) => Ok(SimpleSelector::Tag {
            namespace: None,
            name: name.to_string(),
        }),
        Token::IDHash(id) => Ok(SimpleSelector::Id(id.to_string())),
        Token::Delim('.') => {
            let token = input.next_including_whitespace()?.clone();
            match token {
                Token::Ident(name) => Ok(SimpleSelector::Class(name.to_string())),
                _ => Err(
                    input.new_custom_error(SelectorError::Invalid("expected class name".into()))
                ),
            }
        }
        Token::Colon => parse_pseudo(input, false),
        Token::SquareBracketBlock => {
            input.parse_nested_block(|input| parse_attribute(input))
        }
        other => Err(input.new_custom_error(SelectorError::Invalid(format!(
            "unexpected token {other:?}"
        )))),
    }
}

fn parse_pseudo<'i>(
    input: &mut Parser<'i, '_>,
    is_element: bool,
) -> std::result::Result<SimpleSelector, SelectorParseError<'i>> {
    let token = input.next_including_whitespace()?.clone();
    match token {
        Token::Colon if !is_element => parse_pseudo(input, true),
        Token::Ident(name) => {
            let prefix = if is_element { "::" } else { ":" };
            Ok(SimpleSelector::Pseudo(format!("{prefix}{name}")))
        }
        Token::Function(name) if !is_element && name.eq_ignore_ascii_case("not") => {
            let inner = input.parse_nested_block(|input| {
                let mut compounds = Vec::new();
                loop {
                    let (selector, more) = parse_one(input)?;
                    if selector.compounds.len() != 1 {
                        return Err(input.new_custom_error(SelectorError::Unsupported(
                            "combinators inside :not()".into(),
                        )));
                    }
                    compounds.extend(selector.compounds);
                    if !more {
                        break;
                    }
                }
                Ok(compounds)
            })?;
            Ok(SimpleSelector::Not(inner))
        }
        Token::Function(name) => {
            // Unrecognized functional pseudo: keep the name, skip the args.
            input.parse_nested_block(|input| {
                while input.next().is_ok() {}
                Ok(())
            })?;
            let prefix = if is_element { "::" } else { ":" };
            Ok(SimpleSelector::Pseudo(format!("{prefix}{name}()")))
        }
        _ => Err(input.new_custom_error(SelectorError::Invalid("expected pseudo name".into()))),
    }
}

fn parse_attribute<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<SimpleSelector, SelectorParseError<'i>> {
    let mut namespace = None;
    let mut name = match input.next()?.clone() {
        Token::Ident(name) => name.to_string(),
        _ => {
            return Err(
                input.new_custom_error(SelectorError::Invalid("expected attribute name".into()))
            );
        }
    };

    let mut operator = None;
    let mut value = None;
    match input.next().map(|t| t.clone()) {
        Err(_) => {}
        Ok(token) => {
            let op = match token {
                // `ns|name` qualified attribute
                Token::Delim('|') => {
                    namespace = Some(std::mem::take(&mut name));
                    name = match input.next()?.clone() {
                        Token::Ident(n) => n.to_string(),
                        _ => {
                            return Err(input.new_custom_error(SelectorError::Invalid(
                                "expected attribute name after namespace".into(),
                            )));
                        }
                    };
                    match input.next().map(|t| t.clone()) {
                        Err(_) => {
                            return Ok(SimpleSelector::Attribute {
                                namespace,
                                name,
                                operator,
                                value,
                            });
                        }
                        Ok(token) => attr_operator(input, token)?,
                    }
                }
                other => attr_operator(input, other)?,
            };
            operator = Some(op);
            value = Some(match input.next()?.clone() {
                Token::Ident(s) => s.to_string(),
                Token::QuotedString(s) => s.to_string(),
                _ => {
                    return Err(input
                        .new_custom_error(SelectorError::Invalid("expected attribute value".into())));
                }
            });
        }
    }

    Ok(SimpleSelector::Attribute {
        namespace,
        name,
        operator,
        value,
    })
}

fn attr_operator<'i>(
    input: &mut Parser<'i, '_>,
    token: Token<'i>,
) -> std::result::Result<AttrOperator, SelectorParseError<'i>> {
    match token {
        Token::Delim('=') => Ok(AttrOperator::Equals),
        Token::IncludeMatch => Ok(AttrOperator::Includes),
        Token::DashMatch => Ok(AttrOperator::DashMatch),
        Token::PrefixMatch => Ok(AttrOperator::Prefix),
        Token::SuffixMatch => Ok(AttrOperator::Suffix),
        Token::SubstringMatch => Ok(AttrOperator::Substring),
        _ => Err(input.new_custom_error(SelectorError::Invalid(
            "expected attribute operator".into(),
        ))),
    }
}
