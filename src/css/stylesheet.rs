//! Lenient stylesheet parsing.
//!
//! Rules with selectors we cannot parse are skipped rather than failing the
//! whole sheet, matching how browsers recover. Declarations are kept as raw
//! property/value text; the optimizer reasons about selectors, not property
//! grammars.

use cssparser::{
    AtRuleParser, DeclarationParser, ParseError, Parser, ParserInput, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};

use super::selector::{ParsedSelector, Specificity, parse_selector_list};

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// A style rule: selectors, declarations, and cascade ordering data.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<ParsedSelector>,
    pub declarations: Vec<Declaration>,
    /// Highest specificity among the rule's selectors.
    pub specificity: Specificity,
}

/// A raw `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Stylesheet {
    /// Parse a stylesheet from a string, skipping unparseable rules.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        let stylesheet_parser = StyleSheetParser::new(&mut parser, &mut rule_parser);

        for result in stylesheet_parser {
            // Ignore errors - lenient parsing
            let _ = result;
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // At-rules are outside the analyzed surface; skip them.
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<ParsedSelector>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // Capture the raw prelude text, then compile it.
        let start = input.position();
        while input.next().is_ok() {}
        let text = input.slice_from(start);
        parse_selector_list(text).map_err(|_| input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let specificity = prelude
            .iter()
            .map(ParsedSelector::specificity)
            .max()
            .unwrap_or_default();

        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };

        for result in RuleBodyParser::new(input, &mut decl_parser) {
            // Ignore errors - lenient parsing
            let _ = result;
        }

        self.rules.push(CssRule {
            selectors: prelude,
            declarations,
            specificity,
        });

        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_string();
        let start = input.position();
        while input.next().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important(raw);

        self.declarations.push(Declaration {
            property,
            value: value.to_string(),
            important,
        });

        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Split a trailing `!important` off a raw declaration value.
fn split_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim();
    let lower_suffix = "important";
    if trimmed.len() > lower_suffix.len() {
        let (head, tail) = trimmed.split_at(trimmed.len() - lower_suffix.len());
        if tail.eq_ignore_ascii_case(lower_suffix)
            && let Some(head) = head.trim_end().strip_suffix('!')
        {
            return (head.trim_end(), true);
        }
    }
    (trimmed, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_rule() {
        let sheet = Stylesheet::parse(".foo { color: red; margin: 0 auto }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selectors.len(), 1);
        assert_eq!(rule.selectors[0].to_string(), ".foo");
        assert_eq!(
            rule.declarations,
            vec![
                Declaration {
                    property: "color".to_string(),
                    value: "red".to_string(),
                    important: false,
                },
                Declaration {
                    property: "margin".to_string(),
                    value: "0 auto".to_string(),
                    important: false,
                },
            ]
        );
    }

    #[test]
    fn test_important_flag() {
        let sheet = Stylesheet::parse("a { color: red !important; }");
        assert_eq!(
            sheet.rules[0].declarations[0],
            Declaration {
                property: "color".to_string(),
                value: "red".to_string(),
                important: true,
            }
        );
    }

    #[test]
    fn test_lenient_recovery() {
        let sheet = Stylesheet::parse("@media screen { .x { color: red } } .ok { color: blue } %%bad%% { } .also-ok { }");
        let selectors: Vec<String> = sheet
            .rules
            .iter()
            .flat_map(|r| r.selectors.iter().map(|s| s.to_string()))
            .collect();
        assert_eq!(selectors, vec![".ok".to_string(), ".also-ok".to_string()]);
    }

    #[test]
    fn test_rule_specificity_uses_most_specific_selector() {
        let sheet = Stylesheet::parse(".a, #b { color: red }");
        assert_eq!(
            sheet.rules[0].specificity,
            Specificity {
                ids: 1,
                classes: 0,
                elements: 0
            }
        );
    }

    #[test]
    fn test_empty_stylesheet() {
        assert!(Stylesheet::parse("").is_empty());
        assert!(Stylesheet::parse("/* only comments */").is_empty());
    }
}
