//! # stylecull
//!
//! A template-aware CSS optimizer core: cascade-preserving selector analysis
//! and rewriting for build-time tooling.
//!
//! ## Features
//!
//! - A [`Value`] lexicon describing everything statically knowable about a
//!   dynamic attribute value, with a small textual DSL for template authors
//! - Tri-state selector matching ([`Match`]): definitely matches, definitely
//!   excluded, or only for some concrete instantiations
//! - A rewrite-mapping engine ([`StyleMapping`]) that compiles ident renames
//!   and declaration-merge links into per-element plans
//! - A collision-free short-ident allocator ([`IdentGenerator`])
//!
//! ## Quick Start
//!
//! ```
//! use stylecull::{Config, Element, Match};
//! use stylecull::css::parse_selector_list;
//!
//! let config = Config::default();
//!
//! // One template occurrence: <div class="(foo | bar)">
//! let element = Element::from_template(&config, "div", [("class", "(foo | bar)")]).unwrap();
//!
//! // `.bar` applies only when the `bar` alternative is realized.
//! let selectors = parse_selector_list(".bar").unwrap();
//! assert_eq!(element.match_selector(&selectors[0], true).unwrap(), Match::Maybe);
//! ```
//!
//! ## Rewrite plans
//!
//! Optimization passes record decisions in a [`StyleMapping`], then compile a
//! plan per element:
//!
//! ```
//! use stylecull::{AttrTrait, Config, Element, StyleMapping};
//!
//! let config = Config::default();
//! let mut mapping = StyleMapping::new(config.clone());
//! mapping.rewrite_attribute(AttrTrait::new("class", "foo"), AttrTrait::new("class", "a"));
//!
//! let element = Element::from_template(&config, "div", [("class", "foo")]).unwrap();
//! let plan = mapping.rewrite_mapping(&element);
//! // The source value is unambiguous, so the rename needs no runtime test.
//! assert_eq!(plan.static_attributes.class, vec!["a".to_string()]);
//! ```

pub mod config;
pub mod css;
pub mod element;
pub mod error;
pub mod ident;
pub mod mapping;
pub mod matching;
pub mod value;

pub use config::{Config, OmitIdents, RewriteIdents};
pub use element::{Attribute, Element, Position, SourceSpan, Tag};
pub use error::{Error, Result};
pub use ident::{IdentGenerator, IdentGenerators};
pub use mapping::{
    AttrTrait, BoolExpr, ElementTrait, IdentKind, RewriteMapping, StyleMapping, TagTrait,
};
pub use matching::{Match, rule_matches};
pub use value::{SetItem, Value, parse_single_value, parse_whitespace_delimited};
