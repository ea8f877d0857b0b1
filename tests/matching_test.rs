//! End-to-end matching tests.
//!
//! Parse a stylesheet and template elements the way an integration would,
//! then check which rules can still apply.

use stylecull::css::Stylesheet;
use stylecull::{Config, Element, Match, rule_matches};

// ============================================================================
// Stylesheet-vs-template scenarios
// ============================================================================

fn element(tag: &str, attrs: &[(&str, &str)]) -> Element {
    let config = Config::default();
    Element::from_template(&config, tag, attrs.iter().copied()).unwrap()
}

fn matches(css: &str, element: &Element) -> Vec<Match> {
    Stylesheet::parse(css)
        .rules
        .iter()
        .map(|rule| rule_matches(&rule.selectors, element).unwrap())
        .collect()
}

#[test]
fn test_static_template() {
    let e = element("div", &[("class", "nav main"), ("id", "header")]);
    let results = matches(
        ".nav { color: red }\n\
         .sidebar { color: blue }\n\
         #header { margin: 0 }\n\
         #footer { margin: 0 }\n\
         div.nav#header { padding: 0 }",
        &e,
    );
    assert_eq!(
        results,
        vec![Match::Yes, Match::No, Match::Yes, Match::No, Match::Yes]
    );
}

#[test]
fn test_dynamic_class_choice() {
    let e = element("div", &[("class", "(foo | bar)")]);
    let results = matches(
        ".foo { color: red }\n\
         .bar { color: blue }\n\
         .baz { color: green }",
        &e,
    );
    assert_eq!(results, vec![Match::Maybe, Match::Maybe, Match::No]);
}

#[test]
fn test_anchored_class_values() {
    let e = element("button", &[("class", "btn btn-*")]);
    let results = matches(
        ".btn { border: 0 }\n\
         .btn-primary { background: blue }\n\
         .link { text-decoration: underline }",
        &e,
    );
    assert_eq!(results, vec![Match::Yes, Match::Maybe, Match::No]);
}

#[test]
fn test_unknown_class_defeats_removal() {
    let e = element("div", &[("class", "???")]);
    let results = matches(".anything-at-all { color: red }", &e);
    assert_eq!(results, vec![Match::Maybe]);
}

#[test]
fn test_rule_with_multiple_selectors() {
    let e = element("div", &[("class", "a")]);
    let results = matches(".zzz, .a { color: red }", &e);
    assert_eq!(results, vec![Match::Yes]);
}

#[test]
fn test_descendant_selectors_key_on_subject() {
    let e = element("a", &[("class", "link")]);
    // Only the key compound is tested per element; the ancestor part is
    // another element's business.
    let results = matches("nav .link { color: red }\nnav .other { color: blue }", &e);
    assert_eq!(results, vec![Match::Yes, Match::No]);
}

#[test]
fn test_not_and_pseudo_classes() {
    let e = element("div", &[("class", "a")]);
    let results = matches(
        "div:not(.b) { color: red }\n\
         div:not(.a) { color: blue }\n\
         .a:hover { color: green }",
        &e,
    );
    assert_eq!(results, vec![Match::Yes, Match::No, Match::Yes]);
}

#[test]
fn test_attribute_presence() {
    let e = element("input", &[("data-validate", "strict"), ("class", "field")]);
    let results = matches(
        "[data-validate] { outline: 1px }\n\
         [data-other] { outline: 2px }",
        &e,
    );
    assert_eq!(results, vec![Match::Yes, Match::No]);
}

#[test]
fn test_attribute_operator_is_rejected() {
    let e = element("input", &[("data-x", "y")]);
    let sheet = Stylesheet::parse("[data-x=y] { color: red }");
    // The selector parses; deciding it against incomplete knowledge is what
    // is unsupported.
    assert_eq!(sheet.rules.len(), 1);
    let err = rule_matches(&sheet.rules[0].selectors, &e).unwrap_err();
    assert!(matches!(err, stylecull::Error::UnsupportedSelector(_)));
}

#[test]
fn test_analysis_round_trips_through_json() {
    let e = element("div", &[("class", "nav (open | closed)"), ("id", "menu")]);
    let json = e.to_json().unwrap();
    let restored = Element::from_json(&json).unwrap();
    assert_eq!(e, restored);

    let results = matches(".open { display: block }", &restored);
    assert_eq!(results, vec![Match::Maybe]);
}

#[test]
fn test_cascade_order_preserved_under_specificity() {
    use stylecull::css::Specificity;

    let sheet = Stylesheet::parse(".a { color: red } #b { color: blue } div { color: green }");
    let mut specs: Vec<Specificity> = sheet.rules.iter().map(|r| r.specificity).collect();
    specs.sort();
    assert_eq!(
        specs,
        vec![
            Specificity {
                ids: 0,
                classes: 0,
                elements: 1
            },
            Specificity {
                ids: 0,
                classes: 1,
                elements: 0
            },
            Specificity {
                ids: 1,
                classes: 0,
                elements: 0
            },
        ]
    );
}
