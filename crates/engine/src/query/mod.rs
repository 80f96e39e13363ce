//! Query model
//!
//! A [`Query`] is an ordered list of clauses, one per field. Each clause is
//! either a literal (equality), a regex, or an operator object:
//!
//! ```text
//! { "name": "alice" }                          equality
//! { "name": { "$regex": "/^al/i" } }           regex
//! { "age":  { "$gte": 18, "$lt": 65 } }        operators, all must hold
//! { "body": { "$fulltext": "rust store" } }    fractional relevance
//! { "gone": { "$undef": true } }               field absent
//! ```
//!
//! An empty query matches every document.

pub mod fulltext;
pub mod matcher;
pub mod pattern;

pub use pattern::Pattern;

use shelfdb_core::{DocumentId, Error, Result, Value, ID_FIELD};

/// Operator key that turns an operator object into a regex condition
pub const REGEX_OPERATOR: &str = "$regex";

// ============================================================================
// Operator / Condition / Clause
// ============================================================================

/// A single predicate inside an operator object
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `$gt`: numeric greater-than
    Gt(Value),
    /// `$gte`: numeric greater-or-equal
    Gte(Value),
    /// `$lt`: numeric less-than
    Lt(Value),
    /// `$lte`: numeric less-or-equal
    Lte(Value),
    /// `$ne`: not loosely equal
    Ne(Value),
    /// `$mod`: field value modulo operand is zero
    Mod(Value),
    /// `$undef`: field is absent (operand ignored)
    Undef,
    /// `$fulltext`: token-overlap relevance
    FullText(String),
}

impl Operator {
    /// Parse one `$op: operand` pair
    pub fn parse(name: &str, operand: Value) -> Result<Self> {
        match name {
            "$gt" => Ok(Operator::Gt(operand)),
            "$gte" => Ok(Operator::Gte(operand)),
            "$lt" => Ok(Operator::Lt(operand)),
            "$lte" => Ok(Operator::Lte(operand)),
            "$ne" => Ok(Operator::Ne(operand)),
            "$mod" => Ok(Operator::Mod(operand)),
            "$undef" => Ok(Operator::Undef),
            "$fulltext" => match operand {
                Value::String(text) => Ok(Operator::FullText(text)),
                other => Err(Error::InvalidQuery(format!(
                    "$fulltext expects a string, got {}",
                    other.type_name()
                ))),
            },
            other => Err(Error::InvalidQuery(format!("unknown operator {}", other))),
        }
    }
}

/// What a clause requires of its field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field loosely equals the literal
    Equals(Value),
    /// Field is a string matching the pattern
    Regex(Pattern),
    /// Every operator holds for the field
    Operators(Vec<Operator>),
}

impl Condition {
    /// Interpret a query value
    ///
    /// An object whose keys all start with `$` is an operator object; one
    /// holding `$regex` becomes a regex condition. Anything else is a literal.
    pub fn parse(value: Value) -> Result<Self> {
        let obj = match value {
            Value::Object(obj) if !obj.is_empty() && obj.keys().any(|k| k.starts_with('$')) => obj,
            literal => return Ok(Condition::Equals(literal)),
        };

        if let Some(field) = obj.keys().find(|k| !k.starts_with('$')) {
            return Err(Error::InvalidQuery(format!(
                "operator object mixes operators with field \"{}\"",
                field
            )));
        }

        if let Some(literal) = obj.get(REGEX_OPERATOR) {
            if obj.len() > 1 {
                return Err(Error::InvalidQuery(
                    "$regex cannot be combined with other operators".to_string(),
                ));
            }
            let literal = literal.as_str().ok_or_else(|| {
                Error::InvalidQuery("$regex expects a /pattern/flags string".to_string())
            })?;
            return Ok(Condition::Regex(Pattern::parse(literal)?));
        }

        let ops = obj
            .into_iter()
            .map(|(name, operand)| Operator::parse(&name, operand))
            .collect::<Result<Vec<_>>>()?;
        Ok(Condition::Operators(ops))
    }

    /// True if the index phase can resolve this condition
    pub fn is_index_resolvable(&self) -> bool {
        matches!(self, Condition::Equals(_) | Condition::Regex(_))
    }
}

/// One field's requirement
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    field: String,
    condition: Condition,
}

impl Clause {
    /// Create a clause
    pub fn new(field: impl Into<String>, condition: Condition) -> Self {
        Self {
            field: field.into(),
            condition,
        }
    }

    /// Field the clause constrains
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The requirement
    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

// ============================================================================
// Query
// ============================================================================

/// An ordered set of field clauses
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    clauses: Vec<Clause>,
}

impl Query {
    /// The empty query, matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query object
    ///
    /// # Errors
    ///
    /// - `InvalidQuery` if `value` is not an object or uses unknown operators
    /// - `InvalidRegex` for a malformed `$regex` literal
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(Error::InvalidQuery(format!(
                    "a query must be an object, got {}",
                    other.type_name()
                )))
            }
        };
        let clauses = obj
            .into_iter()
            .map(|(field, v)| Ok(Clause::new(field, Condition::parse(v)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Parse a query from JSON
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::from_value(Value::from(json))
    }

    /// Match a single document by identifier
    pub fn by_id(id: &DocumentId) -> Self {
        Self::new().eq(ID_FIELD, id.as_str())
    }

    /// Clauses in order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Number of fields constrained
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True for the match-everything query
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Replace (or add) the clause for `field`
    pub fn with_condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        let field = field.into();
        match self.clauses.iter_mut().find(|c| c.field == field) {
            Some(clause) => clause.condition = condition,
            None => self.clauses.push(Clause::new(field, condition)),
        }
        self
    }

    /// Require `field` to loosely equal `value`
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_condition(field, Condition::Equals(value.into()))
    }

    /// Require `field` to match a `/pattern/flags` literal
    pub fn regex(self, field: impl Into<String>, literal: &str) -> Result<Self> {
        Ok(self.with_condition(field, Condition::Regex(Pattern::parse(literal)?)))
    }

    /// Add an operator to `field`'s operator object
    ///
    /// A literal or regex clause already on the field is replaced.
    pub fn op(mut self, field: impl Into<String>, op: Operator) -> Self {
        let field = field.into();
        match self.clauses.iter_mut().find(|c| c.field == field) {
            Some(Clause {
                condition: Condition::Operators(ops),
                ..
            }) => ops.push(op),
            Some(clause) => clause.condition = Condition::Operators(vec![op]),
            None => self
                .clauses
                .push(Clause::new(field, Condition::Operators(vec![op]))),
        }
        self
    }

    /// `$gt`
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Gt(value.into()))
    }

    /// `$gte`
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Gte(value.into()))
    }

    /// `$lt`
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Lt(value.into()))
    }

    /// `$lte`
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Lte(value.into()))
    }

    /// `$ne`
    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.op(field, Operator::Ne(value.into()))
    }

    /// `$mod`
    pub fn modulo(self, field: impl Into<String>, divisor: impl Into<Value>) -> Self {
        self.op(field, Operator::Mod(divisor.into()))
    }

    /// `$undef`
    pub fn undef(self, field: impl Into<String>) -> Self {
        self.op(field, Operator::Undef)
    }

    /// `$fulltext`
    pub fn fulltext(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.op(field, Operator::FullText(text.into()))
    }
}

impl TryFrom<serde_json::Value> for Query {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::from_json(json)
    }
}
