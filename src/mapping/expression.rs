//! Boolean expressions over rewrite-mapping input indices.

use serde::{Deserialize, Serialize};

/// A boolean condition over terms of type `V`.
///
/// Used with `V = usize` (an index into a rewrite mapping's input list) so
/// plans stay serializable and comparable. A bare term serializes as the
/// value itself; the connectives serialize as `{"and": […]}`, `{"or": […]}`
/// and `{"not": …}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoolExpr<V> {
    And(Vec<BoolExpr<V>>),
    Or(Vec<BoolExpr<V>>),
    Not(Box<BoolExpr<V>>),
    #[serde(untagged)]
    Term(V),
}

impl<V> BoolExpr<V> {
    pub fn and(items: Vec<BoolExpr<V>>) -> Self {
        BoolExpr::And(items)
    }

    pub fn or(items: Vec<BoolExpr<V>>) -> Self {
        BoolExpr::Or(items)
    }

    pub fn not(item: BoolExpr<V>) -> Self {
        BoolExpr::Not(Box::new(item))
    }

    /// Evaluate with a truth assignment for every term.
    pub fn eval(&self, lookup: &impl Fn(&V) -> bool) -> bool {
        match self {
            BoolExpr::Term(v) => lookup(v),
            BoolExpr::And(items) => items.iter().all(|i| i.eval(lookup)),
            BoolExpr::Or(items) => items.iter().any(|i| i.eval(lookup)),
            BoolExpr::Not(item) => !item.eval(lookup),
        }
    }

    /// Visit every term, depth-first.
    pub fn for_each_term<'a>(&'a self, f: &mut impl FnMut(&'a V)) {
        match self {
            BoolExpr::Term(v) => f(v),
            BoolExpr::And(items) | BoolExpr::Or(items) => {
                for item in items {
                    item.for_each_term(f);
                }
            }
            BoolExpr::Not(item) => item.for_each_term(f),
        }
    }

    /// All terms, in depth-first order.
    pub fn terms(&self) -> Vec<&V> {
        let mut out = Vec::new();
        self.for_each_term(&mut |v| out.push(v));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval() {
        let expr: BoolExpr<usize> = BoolExpr::and(vec![
            BoolExpr::Term(0),
            BoolExpr::or(vec![BoolExpr::Term(1), BoolExpr::Term(2)]),
            BoolExpr::not(BoolExpr::Term(3)),
        ]);
        let truthy = [0usize, 2];
        assert!(expr.eval(&|v| truthy.contains(v)));
        assert!(!expr.eval(&|v| *v == 0));
        assert!(!expr.eval(&|v| [0usize, 1, 3].contains(v)));
    }

    #[test]
    fn test_terms() {
        let expr: BoolExpr<usize> = BoolExpr::or(vec![
            BoolExpr::and(vec![BoolExpr::Term(0), BoolExpr::Term(1)]),
            BoolExpr::not(BoolExpr::Term(2)),
        ]);
        assert_eq!(expr.terms(), vec![&0, &1, &2]);
    }

    #[test]
    fn test_serde_shape() {
        let expr: BoolExpr<usize> =
            BoolExpr::and(vec![BoolExpr::Term(0), BoolExpr::not(BoolExpr::Term(1))]);
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json, serde_json::json!({"and": [0, {"not": 1}]}));
        let back: BoolExpr<usize> = serde_json::from_value(json).unwrap();
        assert_eq!(expr, back);
    }
}
