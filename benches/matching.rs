//! Benchmarks for the hot analysis paths: grammar parsing, flattening,
//! selector matching, and plan compilation.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stylecull::css::{Stylesheet, parse_selector_list};
use stylecull::{
    AttrTrait, Config, Element, StyleMapping, parse_whitespace_delimited, rule_matches,
};

fn bench_grammar(c: &mut Criterion) {
    let input = "base (open | closed) btn-* (a b | c d | e) icon";
    c.bench_function("parse_whitespace_delimited", |b| {
        b.iter(|| parse_whitespace_delimited(black_box(input)).unwrap())
    });
}

fn bench_flatten(c: &mut Criterion) {
    let value =
        parse_whitespace_delimited("(a | b) (c | d) (e | f) (g | h)").unwrap();
    c.bench_function("flatten_four_choices", |b| {
        b.iter(|| black_box(&value).flatten())
    });
}

fn bench_matching(c: &mut Criterion) {
    let config = Config::default();
    let element = Element::from_template(
        &config,
        "div",
        [("class", "nav (open | closed) btn-*"), ("id", "main")],
    )
    .unwrap();
    let css: String = (0..100)
        .map(|i| format!(".class-{i} {{ color: red }}\n.open {{ display: block }}\n"))
        .collect();
    let stylesheet = Stylesheet::parse(&css);

    c.bench_function("match_100_rules", |b| {
        b.iter(|| {
            for rule in &stylesheet.rules {
                rule_matches(black_box(&rule.selectors), black_box(&element)).unwrap();
            }
        })
    });

    let selectors = parse_selector_list("div.nav#main:not(.closed)").unwrap();
    c.bench_function("match_compound_selector", |b| {
        b.iter(|| rule_matches(black_box(&selectors), black_box(&element)).unwrap())
    });
}

fn bench_rewrite_mapping(c: &mut Criterion) {
    let config = Config::default();
    let mut mapping = StyleMapping::new(config.clone());
    for i in 0..50 {
        mapping.rewrite_attribute(
            AttrTrait::new("class", format!("class-{i}")),
            AttrTrait::new("class", format!("c{i}")),
        );
    }
    mapping.link_attributes(
        AttrTrait::new("class", "merged"),
        vec![
            AttrTrait::new("class", "class-1"),
            AttrTrait::new("class", "class-2"),
        ],
        vec![AttrTrait::new("class", "class-3")],
    );
    let element = Element::from_template(
        &config,
        "div",
        [("class", "class-1 class-2 (class-3 | class-4)")],
    )
    .unwrap();

    c.bench_function("rewrite_mapping", |b| {
        b.iter(|| mapping.rewrite_mapping(black_box(&element)))
    });
}

criterion_group!(
    benches,
    bench_grammar,
    bench_flatten,
    bench_matching,
    bench_rewrite_mapping
);
criterion_main!(benches);
