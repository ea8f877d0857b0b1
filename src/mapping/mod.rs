//! The rewrite-mapping engine.
//!
//! Optimization passes record two kinds of decisions here: direct ident
//! rewrites (`.long-name` becomes `.a`) and links (a generated class must be
//! emitted whenever some combination of original classes is present). The
//! engine then compiles, per analyzed element, a [`RewriteMapping`]: which
//! output id/class values are unconditionally present and which depend on a
//! boolean condition over the element's possible input traits.

mod expression;

pub use expression::BoolExpr;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::element::Element;

/// The two attribute kinds whose values are rewritable idents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentKind {
    Id,
    Class,
}

impl IdentKind {
    pub fn attribute_name(self) -> &'static str {
        match self {
            IdentKind::Id => "id",
            IdentKind::Class => "class",
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<IdentKind> {
        match name {
            "id" => Some(IdentKind::Id),
            "class" => Some(IdentKind::Class),
            _ => None,
        }
    }
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// A concrete tag-name trait an element can exhibit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagTrait {
    pub tag: String,
}

/// A concrete `name="value"` trait an element can exhibit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttrTrait {
    #[serde(
        rename = "namespaceURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl AttrTrait {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        AttrTrait {
            namespace: None,
            name: name.into(),
            value: value.into(),
        }
    }

    fn kind(&self) -> Option<IdentKind> {
        if self.namespace.is_some() {
            return None;
        }
        IdentKind::from_attribute_name(&self.name)
    }

    /// The kind of a trait that must be rewritable; non-id/class traits are
    /// a caller bug.
    fn rewritable_kind(&self) -> IdentKind {
        self.kind().unwrap_or_else(|| {
            panic!(
                "only id and class attributes can be rewritten, got `{}`",
                self.name
            )
        })
    }
}

impl fmt::Display for AttrTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// One input trait of a rewrite mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementTrait {
    Tag(TagTrait),
    Attr(AttrTrait),
}

/// A declaration-merge rule: emit `to` whenever every `from` trait is
/// present and no `unless` trait is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrLink {
    pub to: AttrTrait,
    pub from: Vec<AttrTrait>,
    pub unless: Vec<AttrTrait>,
}

/// Per-kind value holder for rewrite plans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteValues<T> {
    pub id: T,
    pub class: T,
}

impl<T> RewriteValues<T> {
    pub fn get(&self, kind: IdentKind) -> &T {
        match kind {
            IdentKind::Id => &self.id,
            IdentKind::Class => &self.class,
        }
    }

    fn get_mut(&mut self, kind: IdentKind) -> &mut T {
        match kind {
            IdentKind::Id => &mut self.id,
            IdentKind::Class => &mut self.class,
        }
    }
}

/// The compiled per-element rewrite plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteMapping {
    /// Deduplicated traits this element can exhibit; boolean expressions
    /// index into this list.
    pub inputs: Vec<ElementTrait>,
    /// Output values that are unconditionally present.
    pub static_attributes: RewriteValues<Vec<String>>,
    /// Output values whose presence depends on which input traits the
    /// runtime instance actually exhibits.
    pub dynamic_attributes: RewriteValues<BTreeMap<String, BoolExpr<usize>>>,
}

/// Accumulated rewrite decisions for one optimization run.
///
/// Not safe for unsynchronized concurrent mutation; at most one pass mutates
/// at a time, and plans observe a frozen snapshot once mutation stops.
#[derive(Debug, Clone)]
pub struct StyleMapping {
    config: Config,
    replacements: BTreeMap<AttrTrait, AttrTrait>,
    links: Vec<AttrLink>,
    /// Source trait to the ids of links requiring it.
    link_index: BTreeMap<AttrTrait, BTreeSet<usize>>,
    obsolete: BTreeSet<AttrTrait>,
}

impl StyleMapping {
    pub fn new(config: Config) -> Self {
        StyleMapping {
            config,
            replacements: BTreeMap::new(),
            links: Vec::new(),
            link_index: BTreeMap::new(),
            obsolete: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record that `from` is renamed to `to`. Re-rewriting the same source
    /// trait updates the replacement in place.
    ///
    /// Panics if either trait is not an `id`/`class` attribute.
    pub fn rewrite_attribute(&mut self, from: AttrTrait, to: AttrTrait) {
        from.rewritable_kind();
        to.rewritable_kind();
        self.replacements.insert(from, to);
    }

    /// Record that `to` must be emitted whenever all `from` traits are
    /// present and no `unless` trait is.
    ///
    /// Panics if any involved trait is not an `id`/`class` attribute.
    pub fn link_attributes(&mut self, to: AttrTrait, from: Vec<AttrTrait>, unless: Vec<AttrTrait>) {
        to.rewritable_kind();
        for trait_ in from.iter().chain(unless.iter()) {
            trait_.rewritable_kind();
        }
        let id = self.links.len();
        for source in &from {
            self.link_index.entry(source.clone()).or_default().insert(id);
        }
        self.links.push(AttrLink { to, from, unless });
    }

    /// Mark a source trait as no longer emitted even when present.
    pub fn mark_obsolete(&mut self, trait_: AttrTrait) {
        self.obsolete.insert(trait_);
    }

    pub fn is_obsolete(&self, trait_: &AttrTrait) -> bool {
        self.obsolete.contains(trait_)
    }

    pub fn replacement_for(&self, trait_: &AttrTrait) -> Option<&AttrTrait> {
        self.replacements.get(trait_)
    }

    /// Compile the rewrite plan for one element against the current state.
    ///
    /// Pure with respect to the element; repeatable as more rewrites and
    /// links accumulate.
    pub fn rewrite_mapping(&self, element: &Element) -> RewriteMapping {
        // Step 1: collect deduplicated input traits with their static flag.
        let mut inputs: Vec<(ElementTrait, bool)> = Vec::new();
        let mut push_input = |trait_: ElementTrait, is_static: bool| {
            if !inputs.iter().any(|(t, _)| *t == trait_) {
                inputs.push((trait_, is_static));
            }
        };

        for (tag_name, is_static) in element.tag.value.constants() {
            push_input(ElementTrait::Tag(TagTrait { tag: tag_name }), is_static);
        }
        for attr in &element.attributes {
            if !self.config.is_analyzed_attribute(&attr.name) {
                continue;
            }
            let constants = attr.value.constants();
            if constants.is_empty() {
                // Placeholder so links keyed on this attribute still have an
                // index to refer to.
                push_input(
                    ElementTrait::Attr(AttrTrait {
                        namespace: attr.namespace_url.clone(),
                        name: attr.name.clone(),
                        value: String::new(),
                    }),
                    false,
                );
                continue;
            }
            for (value, is_static) in constants {
                push_input(
                    ElementTrait::Attr(AttrTrait {
                        namespace: attr.namespace_url.clone(),
                        name: attr.name.clone(),
                        value,
                    }),
                    is_static,
                );
            }
        }

        let mut mapping = RewriteMapping::default();
        let mut dynamic: RewriteValues<BTreeMap<String, BoolExpr<usize>>> =
            RewriteValues::default();

        // Step 2: direct rewrites, then identity mappings for untouched
        // rewritable idents.
        for (i, (trait_, _)) in inputs.iter().enumerate() {
            let ElementTrait::Attr(attr) = trait_ else {
                continue;
            };
            if let Some(replacement) = self.replacements.get(attr) {
                let kind = replacement.rewritable_kind();
                dynamic
                    .get_mut(kind)
                    .insert(replacement.value.clone(), BoolExpr::and(vec![BoolExpr::Term(i)]));
                continue;
            }
            let Some(kind) = attr.kind() else { continue };
            if attr.value.is_empty()
                || !self.config.can_rewrite(kind, &attr.value)
                || self.obsolete.contains(attr)
            {
                continue;
            }
            dynamic
                .get_mut(kind)
                .insert(attr.value.clone(), BoolExpr::and(vec![BoolExpr::Term(i)]));
        }

        // Step 3: links whose requirements are all satisfiable here.
        let mut candidates: BTreeSet<usize> = BTreeSet::new();
        for (trait_, _) in &inputs {
            if let ElementTrait::Attr(attr) = trait_
                && let Some(ids) = self.link_index.get(attr)
            {
                candidates.extend(ids);
            }
        }
        for id in candidates {
            let link = &self.links[id];
            let index_of = |needle: &AttrTrait| {
                inputs
                    .iter()
                    .position(|(t, _)| matches!(t, ElementTrait::Attr(a) if a == needle))
            };
            let Some(from_indices) = link
                .from
                .iter()
                .map(|t| index_of(t))
                .collect::<Option<Vec<usize>>>()
            else {
                // A required trait this element can never exhibit; the link
                // cannot fire.
                continue;
            };
            let mut conjuncts: Vec<BoolExpr<usize>> =
                from_indices.into_iter().map(BoolExpr::Term).collect();
            for unless in &link.unless {
                if let Some(i) = index_of(unless) {
                    conjuncts.push(BoolExpr::not(BoolExpr::Term(i)));
                }
            }
            let expr = BoolExpr::and(conjuncts);
            let kind = link.to.rewritable_kind();
            let slot = dynamic.get_mut(kind);
            match slot.remove(&link.to.value) {
                None => {
                    slot.insert(link.to.value.clone(), expr);
                }
                Some(BoolExpr::Or(mut alternatives)) => {
                    alternatives.push(expr);
                    slot.insert(link.to.value.clone(), BoolExpr::Or(alternatives));
                }
                Some(existing) => {
                    slot.insert(link.to.value.clone(), BoolExpr::or(vec![existing, expr]));
                }
            }
        }

        // Step 4: hoist statically-true expressions out of the dynamic plan;
        // statically-false ones can never fire and are dropped.
        for kind in [IdentKind::Id, IdentKind::Class] {
            let slot = dynamic.get_mut(kind);
            let mut kept = BTreeMap::new();
            for (value, expr) in std::mem::take(slot) {
                let is_static = expr.terms().iter().all(|&&i| inputs[i].1);
                if !is_static {
                    kept.insert(value, expr);
                } else if expr.eval(&|_| true) {
                    mapping.static_attributes.get_mut(kind).push(value);
                }
            }
            *slot = kept;
        }

        mapping.inputs = inputs.into_iter().map(|(t, _)| t).collect();
        mapping.dynamic_attributes = dynamic;
        mapping
    }
}
