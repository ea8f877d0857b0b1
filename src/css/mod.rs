//! CSS parsing: stylesheets, rules, and the selector model the matcher
//! consumes.

pub mod selector;
pub mod stylesheet;

pub use selector::{
    AttrOperator, Combinator, Compound, ParsedSelector, SimpleSelector, Specificity,
    parse_selector_list,
};
pub use stylesheet::{CssRule, Declaration, Stylesheet};
