//! The attribute-value description language.
//!
//! Template integrations annotate dynamic attributes with a small textual
//! DSL: `(a | b)` for choices, `prefix*`, `*suffix` and `prefix*suffix` for
//! anchored values, `?` for an unknown identifier, `???` for a fully unknown
//! value, `---` for an absent/optional value, and plain text for constants.
//! Whitespace-delimited attributes (`class`) additionally split space
//! separated tokens into a [`Set`](Value::Set).
//!
//! Malformed text is a hard error carrying a byte offset into the original
//! input; there is no recovery or partial result.

use crate::error::{Error, Result};
use crate::value::{SetItem, Value};

/// Parse an attribute value in whitespace-delimited mode.
///
/// The input is trimmed first. Empty input is `Absent`; a single token is
/// returned unwrapped; two or more tokens form a `Set`. Anchored values
/// produced in this mode never allow whitespace in their unknown segment,
/// since each token is one whitespace-delimited identifier.
pub fn parse_whitespace_delimited(input: &str) -> Result<Value> {
    let start = input.len() - input.trim_start().len();
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Absent);
    }

    let tokens = tokenize(trimmed, start)?;
    let mut values = Vec::with_capacity(tokens.len());
    for (i, &(offset, text)) in tokens.iter().enumerate() {
        if text.starts_with("???") {
            // The unknown marker consumes the rest of the input. A set may
            // not contain an unknown member, so it only stands alone.
            if i == 0 {
                return Ok(Value::Unknown);
            }
            return Err(Error::value_syntax(
                "`???` cannot follow other tokens",
                offset,
            ));
        }
        values.push(parse_token(text, offset, Mode::Whitespace)?);
    }

    if values.len() == 1 {
        return Ok(values.pop().unwrap_or(Value::Absent));
    }

    let mut members = Vec::with_capacity(values.len());
    for (value, &(offset, _)) in values.into_iter().zip(tokens.iter()) {
        match SetItem::try_from(value) {
            Ok(member) => members.push(member),
            Err(_) => {
                return Err(Error::value_syntax(
                    "this value cannot be a member of a token list",
                    offset,
                ));
            }
        }
    }
    Ok(Value::Set(members))
}

/// Parse an attribute value in single-value mode.
///
/// The string, trimmed at the ends, is one value; whitespace inside a plain
/// constant is preserved. Anchored values allow whitespace in their unknown
/// segment.
pub fn parse_single_value(input: &str) -> Result<Value> {
    let start = input.len() - input.trim_start().len();
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Value::Absent);
    }
    if trimmed.starts_with("???") {
        return Ok(Value::Unknown);
    }
    parse_token(trimmed, start, Mode::Single)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Whitespace,
    Single,
}

impl Mode {
    /// Whether anchored values parsed in this mode allow whitespace in
    /// their unknown segment.
    fn whitespace_in_anchors(self) -> bool {
        matches!(self, Mode::Single)
    }
}

/// Split trimmed input into top-level whitespace-separated tokens, keeping
/// choice parentheses intact.
fn tokenize(input: &str, base: usize) -> Result<Vec<(usize, &str)>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut token_start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        match c {
            '(' => {
                depth += 1;
                token_start.get_or_insert(i);
            }
            ')' => {
                if depth == 0 {
                    return Err(Error::value_syntax("unbalanced `)`", base + i));
                }
                depth -= 1;
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = token_start.take() {
                    tokens.push((base + s, &input[s..i]));
                }
            }
            _ => {
                token_start.get_or_insert(i);
            }
        }
    }
    if depth > 0 {
        return Err(Error::value_syntax("unbalanced `(`", base + input.len()));
    }
    if let Some(s) = token_start {
        tokens.push((base + s, &input[s..]));
    }
    Ok(tokens)
}

fn parse_token(text: &str, offset: usize, mode: Mode) -> Result<Value> {
    match text {
        "---" => return Ok(Value::Absent),
        "?" => return Ok(Value::UnknownIdentifier),
        _ => {}
    }

    if let Some(rest) = text.strip_prefix('(') {
        return parse_choice(rest, offset + 1, mode, text, offset);
    }
    if text.contains('(') || text.contains(')') {
        return Err(Error::value_syntax(
            "`(` may only open a choice at the start of a token",
            offset,
        ));
    }
    if text.contains('|') {
        return Err(Error::value_syntax("`|` is only valid inside `( )`", offset));
    }
    if text.contains('?') {
        return Err(Error::value_syntax(
            "`?` is a reserved marker and cannot appear inside a token",
            offset,
        ));
    }

    let stars = text.matches('*').count();
    match stars {
        0 => Ok(Value::Constant(text.to_string())),
        1 => {
            let at = text.find('*').unwrap_or(0);
            let prefix = &text[..at];
            let suffix = &text[at + 1..];
            let whitespace = mode.whitespace_in_anchors();
            Ok(match (prefix.is_empty(), suffix.is_empty()) {
                (true, true) => {
                    if whitespace {
                        Value::Unknown
                    } else {
                        Value::UnknownIdentifier
                    }
                }
                (false, true) => Value::StartsWith {
                    prefix: prefix.to_string(),
                    whitespace,
                },
                (true, false) => Value::EndsWith {
                    suffix: suffix.to_string(),
                    whitespace,
                },
                (false, false) => Value::StartsAndEndsWith {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                    whitespace,
                },
            })
        }
        _ => Err(Error::value_syntax(
            "at most one `*` wildcard per value",
            offset,
        )),
    }
}

/// Parse the body of a `( … )` choice. `rest` starts just past the opening
/// paren; the closing paren must end the token.
fn parse_choice(
    rest: &str,
    body_offset: usize,
    mode: Mode,
    token: &str,
    token_offset: usize,
) -> Result<Value> {
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                close = Some(i);
                break;
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    let close = close
        .ok_or_else(|| Error::value_syntax("unbalanced `(`", token_offset + token.len()))?;
    if close + 1 != rest.len() {
        return Err(Error::value_syntax(
            "unexpected text after closing `)`",
            body_offset + close + 1,
        ));
    }

    let body = &rest[..close];
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut alt_start = 0usize;
    let mut boundaries: Vec<(usize, &str)> = Vec::new();
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                boundaries.push((alt_start, &body[alt_start..i]));
                alt_start = i + 1;
            }
            _ => {}
        }
    }
    boundaries.push((alt_start, &body[alt_start..]));

    for (start, raw) in boundaries {
        let lead = raw.len() - raw.trim_start().len();
        let alt = raw.trim();
        if alt.is_empty() {
            return Err(Error::value_syntax(
                "empty choice alternative",
                body_offset + start,
            ));
        }
        let alt_offset = body_offset + start + lead;
        // Alternatives re-enter the surrounding mode, so a whitespace-mode
        // alternative like `a b` becomes a nested token list.
        let value = match mode {
            Mode::Whitespace => {
                let tokens = tokenize(alt, alt_offset)?;
                if tokens.len() == 1 {
                    let (off, text) = tokens[0];
                    parse_token(text, off, mode)?
                } else {
                    let mut members = Vec::with_capacity(tokens.len());
                    for (off, text) in tokens {
                        match SetItem::try_from(parse_token(text, off, mode)?) {
                            Ok(member) => members.push(member),
                            Err(_) => {
                                return Err(Error::value_syntax(
                                    "this value cannot be a member of a token list",
                                    off,
                                ));
                            }
                        }
                    }
                    Value::Set(members)
                }
            }
            Mode::Single => parse_token(alt, alt_offset, mode)?,
        };
        alternatives.push(value);
    }

    Ok(Value::Choice(alternatives))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(s: &str) -> Value {
        Value::Constant(s.to_string())
    }

    #[test]
    fn test_single_mode_choice() {
        assert_eq!(
            parse_single_value("(foo | bar)").unwrap(),
            Value::Choice(vec![constant("foo"), constant("bar")])
        );
    }

    #[test]
    fn test_single_mode_markers() {
        assert_eq!(parse_single_value("").unwrap(), Value::Absent);
        assert_eq!(parse_single_value("---").unwrap(), Value::Absent);
        assert_eq!(parse_single_value("?").unwrap(), Value::UnknownIdentifier);
        assert_eq!(parse_single_value("???").unwrap(), Value::Unknown);
        assert_eq!(
            parse_single_value("??? ignored tail").unwrap(),
            Value::Unknown
        );
    }

    #[test]
    fn test_single_mode_constant_preserves_whitespace() {
        assert_eq!(
            parse_single_value("color: red; font: bold").unwrap(),
            constant("color: red; font: bold")
        );
        assert_eq!(parse_single_value("  padded  ").unwrap(), constant("padded"));
    }

    #[test]
    fn test_single_mode_anchors_allow_whitespace() {
        assert_eq!(
            parse_single_value("icon-*").unwrap(),
            Value::StartsWith {
                prefix: "icon-".to_string(),
                whitespace: true,
            }
        );
        assert_eq!(
            parse_single_value("*-large").unwrap(),
            Value::EndsWith {
                suffix: "-large".to_string(),
                whitespace: true,
            }
        );
        assert_eq!(
            parse_single_value("a*z").unwrap(),
            Value::StartsAndEndsWith {
                prefix: "a".to_string(),
                suffix: "z".to_string(),
                whitespace: true,
            }
        );
    }

    #[test]
    fn test_whitespace_mode_basics() {
        assert_eq!(parse_whitespace_delimited("").unwrap(), Value::Absent);
        assert_eq!(parse_whitespace_delimited("   ").unwrap(), Value::Absent);
        assert_eq!(parse_whitespace_delimited("foo").unwrap(), constant("foo"));
        assert_eq!(
            parse_whitespace_delimited("  foo  ").unwrap(),
            constant("foo")
        );
        assert_eq!(
            parse_whitespace_delimited("foo bar").unwrap(),
            Value::Set(vec![
                SetItem::Constant("foo".to_string()),
                SetItem::Constant("bar".to_string()),
            ])
        );
    }

    #[test]
    fn test_whitespace_mode_anchors_disallow_whitespace() {
        assert_eq!(
            parse_whitespace_delimited("btn-*").unwrap(),
            Value::StartsWith {
                prefix: "btn-".to_string(),
                whitespace: false,
            }
        );
    }

    #[test]
    fn test_whitespace_mode_choice_token() {
        assert_eq!(
            parse_whitespace_delimited("base (foo | bar)").unwrap(),
            Value::Set(vec![
                SetItem::Constant("base".to_string()),
                SetItem::Choice(vec![constant("foo"), constant("bar")]),
            ])
        );
    }

    #[test]
    fn test_whitespace_mode_choice_with_multi_token_alternative() {
        assert_eq!(
            parse_whitespace_delimited("(a b | c)").unwrap(),
            Value::Choice(vec![
                Value::Set(vec![
                    SetItem::Constant("a".to_string()),
                    SetItem::Constant("b".to_string()),
                ]),
                constant("c"),
            ])
        );
    }

    #[test]
    fn test_whitespace_mode_optional_alternative() {
        let parsed = parse_whitespace_delimited("(foo | ---)").unwrap();
        assert_eq!(
            parsed,
            Value::Choice(vec![constant("foo"), Value::Absent])
        );
        let flat = parsed.flatten();
        assert_eq!(flat.len(), 2);
        let rendered: Vec<String> = flat.iter().filter_map(|v| v.render()).collect();
        assert!(rendered.contains(&"foo".to_string()));
        assert!(rendered.contains(&String::new()));
    }

    #[test]
    fn test_whitespace_mode_unknown_marker() {
        assert_eq!(parse_whitespace_delimited("???").unwrap(), Value::Unknown);
        // Leading marker consumes everything after it.
        assert_eq!(
            parse_whitespace_delimited("??? foo bar").unwrap(),
            Value::Unknown
        );
        assert!(matches!(
            parse_whitespace_delimited("foo ???"),
            Err(Error::ValueSyntax { .. })
        ));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(matches!(
            parse_whitespace_delimited("(foo | bar"),
            Err(Error::ValueSyntax { .. })
        ));
        assert!(matches!(
            parse_whitespace_delimited("foo)"),
            Err(Error::ValueSyntax { .. })
        ));
        assert!(matches!(
            parse_single_value("(foo | bar) tail"),
            Err(Error::ValueSyntax { .. })
        ));
    }

    #[test]
    fn test_empty_alternative_is_an_error() {
        assert!(matches!(
            parse_whitespace_delimited("(foo | )"),
            Err(Error::ValueSyntax { .. })
        ));
        assert!(matches!(
            parse_single_value("(|)"),
            Err(Error::ValueSyntax { .. })
        ));
    }

    #[test]
    fn test_stray_reserved_characters() {
        assert!(matches!(
            parse_whitespace_delimited("a|b"),
            Err(Error::ValueSyntax { .. })
        ));
        assert!(matches!(
            parse_whitespace_delimited("wh?t"),
            Err(Error::ValueSyntax { .. })
        ));
        assert!(matches!(
            parse_whitespace_delimited("a*b*c"),
            Err(Error::ValueSyntax { .. })
        ));
    }

    #[test]
    fn test_error_offsets_point_into_input() {
        match parse_whitespace_delimited("foo ???") {
            Err(Error::ValueSyntax { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("expected syntax error, got {other:?}"),
        }
        match parse_whitespace_delimited("  foo)") {
            Err(Error::ValueSyntax { offset, .. }) => assert_eq!(offset, 5),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_choices() {
        assert_eq!(
            parse_whitespace_delimited("((a | b) | c)").unwrap(),
            Value::Choice(vec![
                Value::Choice(vec![constant("a"), constant("b")]),
                constant("c"),
            ])
        );
    }
}
