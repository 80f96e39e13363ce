//! Query evaluation
//!
//! Matching runs in two phases over one shared tally per document:
//!
//! 1. **Index phase**: clauses on indexed fields whose condition is an
//!    equality or a regex are resolved by walking the index buckets. Those
//!    clauses are then dropped from the residual set.
//! 2. **Residual phase**: every document is scanned and the remaining
//!    clauses are evaluated against it.
//!
//! Each satisfied clause adds one to the document's match count. `$fulltext`
//! adds its fractional score instead of an integer. A document is a candidate
//! once it has any match or any fractional relevance, and it is included when
//! `require_all_keys == (matches == clause count)`.

use super::fulltext;
use super::{Clause, Condition, Operator, Query};
use crate::config::FullTextConfig;
use crate::index::{IndexSet, Position};
use shelfdb_core::{Document, Value};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of evaluating one clause against one document
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    /// The clause holds for the document
    pub satisfied: bool,
    /// Fractional `$fulltext` relevance contributed by the clause
    pub fraction: f64,
}

#[derive(Debug)]
struct Tally {
    pos: Position,
    matches: usize,
    fraction: f64,
}

/// Per-document accumulator preserving discovery order
#[derive(Debug, Default)]
struct Tallies {
    order: Vec<Tally>,
    slots: HashMap<Position, usize>,
}

impl Tallies {
    fn record(&mut self, pos: Position, matches: usize, fraction: f64) {
        match self.slots.get(&pos) {
            Some(&slot) => {
                let tally = &mut self.order[slot];
                tally.matches += matches;
                tally.fraction += fraction;
            }
            None => {
                self.slots.insert(pos, self.order.len());
                self.order.push(Tally {
                    pos,
                    matches,
                    fraction,
                });
            }
        }
    }
}

/// Run `query` against the document sequence
///
/// Returns annotated copies in discovery order: index-phase hits first, then
/// scan hits in document order. The result is not sorted by relevance.
pub fn find(
    docs: &[Document],
    indexes: &IndexSet,
    query: &Query,
    require_all_keys: bool,
    config: &FullTextConfig,
) -> Vec<Document> {
    if query.is_empty() {
        return docs.iter().map(|doc| annotate(doc, 0.0)).collect();
    }

    let mut tallies = Tallies::default();
    let mut residual: Vec<&Clause> = Vec::with_capacity(query.len());

    for clause in query.clauses() {
        match indexes.get(clause.field()) {
            Some(index) if clause.condition().is_index_resolvable() => {
                for entry in index.entries() {
                    if condition_holds(clause.condition(), entry.value()) {
                        for &pos in entry.positions() {
                            tallies.record(pos, 1, 0.0);
                        }
                    }
                }
            }
            _ => residual.push(clause),
        }
    }

    let index_hits = tallies.order.len();

    if !residual.is_empty() {
        for (pos, doc) in docs.iter().enumerate() {
            for clause in &residual {
                let eval = evaluate(doc, clause, config);
                if eval.satisfied || eval.fraction > 0.0 {
                    tallies.record(pos, usize::from(eval.satisfied), eval.fraction);
                }
            }
        }
    }

    debug!(
        target: "shelfdb::query",
        clauses = query.len(),
        indexed = query.len() - residual.len(),
        index_hits,
        candidates = tallies.order.len(),
        require_all_keys,
        "Evaluated query"
    );

    let total = query.len();
    tallies
        .order
        .into_iter()
        .filter(|t| t.matches > 0 || t.fraction > 0.0)
        .filter(|t| require_all_keys == (t.matches == total))
        .filter_map(|t| {
            docs.get(t.pos)
                .map(|doc| annotate(doc, t.matches as f64 + t.fraction))
        })
        .collect()
}

/// Evaluate one clause against one document
///
/// An absent field satisfies an operator object only when every operator is
/// `$undef`; equality and regex never match an absent field.
pub fn evaluate(doc: &Document, clause: &Clause, config: &FullTextConfig) -> Evaluation {
    let value = doc.get(clause.field());
    match (clause.condition(), value) {
        (Condition::Operators(ops), None) => Evaluation {
            satisfied: !ops.is_empty() && ops.iter().all(|op| matches!(op, Operator::Undef)),
            fraction: 0.0,
        },
        (Condition::Operators(ops), Some(value)) => {
            let mut satisfied = true;
            let mut fraction = 0.0;
            for op in ops {
                match op {
                    Operator::FullText(text) => {
                        let score = fulltext::score(text, value, config);
                        fraction += score;
                        satisfied &= score > 0.0;
                    }
                    other => satisfied &= operator_holds(other, value),
                }
            }
            Evaluation {
                satisfied,
                fraction,
            }
        }
        (condition, Some(value)) => Evaluation {
            satisfied: condition_holds(condition, value),
            fraction: 0.0,
        },
        (_, None) => Evaluation::default(),
    }
}

/// True if every clause of `query` holds for `doc`
///
/// Used by update and remove, which always require every field.
pub fn matches_all(doc: &Document, query: &Query, config: &FullTextConfig) -> bool {
    query
        .clauses()
        .iter()
        .all(|clause| evaluate(doc, clause, config).satisfied)
}

/// Equality or regex test of a present value
fn condition_holds(condition: &Condition, value: &Value) -> bool {
    match condition {
        Condition::Equals(literal) => value.loose_eq(literal),
        Condition::Regex(pattern) => pattern.is_match(value),
        Condition::Operators(_) => false,
    }
}

fn operator_holds(op: &Operator, value: &Value) -> bool {
    match op {
        Operator::Gt(operand) => value.to_number() > operand.to_number(),
        Operator::Gte(operand) => value.to_number() >= operand.to_number(),
        Operator::Lt(operand) => value.to_number() < operand.to_number(),
        Operator::Lte(operand) => value.to_number() <= operand.to_number(),
        Operator::Ne(operand) => !value.loose_eq(operand),
        Operator::Mod(operand) => {
            let divisor = operand.to_number();
            if divisor == 0.0 || !divisor.is_finite() {
                return false;
            }
            let x = value.to_number();
            x.is_finite() && x % divisor == 0.0
        }
        // The field is present here
        Operator::Undef => false,
        Operator::FullText(_) => false,
    }
}

fn annotate(doc: &Document, relevance: f64) -> Document {
    let mut copy = doc.clone();
    copy.set_relevance(Some(relevance));
    copy
}
