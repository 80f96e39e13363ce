//! Update documents and the modifier engine
//!
//! An update is either a whole-document replacement or a set of field
//! modifiers:
//!
//! ```text
//! { "name": "bob", "age": 3 }                      replace
//! { "$set": { "name": "bob" }, "$add": { "n": 1 } } modify
//! ```
//!
//! Modifiers are applied in a fixed precedence: `$set`, `$add`, `$subtract`,
//! `$multiply`, `$divide`, then `$remove`. Arithmetic always reads the value
//! the field had before the update, so when one field is targeted twice the
//! later modifier in that order wins.

use shelfdb_core::{is_reserved, Document, Error, Result, Value};
use std::collections::BTreeMap;

/// A field modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierKind {
    /// `$set`: overwrite the field
    Set,
    /// `$add`: numeric addition
    Add,
    /// `$subtract`: numeric subtraction
    Subtract,
    /// `$multiply`: numeric multiplication
    Multiply,
    /// `$divide`: numeric division
    Divide,
    /// `$remove`: delete the field
    Remove,
}

impl ModifierKind {
    /// Application order
    pub const PRECEDENCE: [ModifierKind; 6] = [
        ModifierKind::Set,
        ModifierKind::Add,
        ModifierKind::Subtract,
        ModifierKind::Multiply,
        ModifierKind::Divide,
        ModifierKind::Remove,
    ];

    /// Parse an update key such as `"$add"`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "$set" => Some(ModifierKind::Set),
            "$add" => Some(ModifierKind::Add),
            "$subtract" => Some(ModifierKind::Subtract),
            "$multiply" => Some(ModifierKind::Multiply),
            "$divide" => Some(ModifierKind::Divide),
            "$remove" => Some(ModifierKind::Remove),
            _ => None,
        }
    }

    /// The update key for this modifier
    pub fn as_key(&self) -> &'static str {
        match self {
            ModifierKind::Set => "$set",
            ModifierKind::Add => "$add",
            ModifierKind::Subtract => "$subtract",
            ModifierKind::Multiply => "$multiply",
            ModifierKind::Divide => "$divide",
            ModifierKind::Remove => "$remove",
        }
    }
}

/// One modifier applied to one field
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierOp {
    kind: ModifierKind,
    field: String,
    operand: Value,
}

impl ModifierOp {
    /// Create a modifier
    pub fn new(kind: ModifierKind, field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self {
            kind,
            field: field.into(),
            operand: operand.into(),
        }
    }

    /// The modifier
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// Target field
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Operand (ignored by `$remove`)
    pub fn operand(&self) -> &Value {
        &self.operand
    }
}

/// What an update does to each matched document
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace every user field; the identifier is kept
    Replace(Document),
    /// Apply field modifiers to the existing document
    Modify(Vec<ModifierOp>),
}

impl Update {
    /// Start an empty modifier update
    pub fn modify() -> Self {
        Update::Modify(Vec::new())
    }

    /// Replace the matched document with `doc`
    pub fn replace(doc: Document) -> Self {
        Update::Replace(doc)
    }

    /// Parse an update object
    ///
    /// # Errors
    ///
    /// - `InvalidUpdate` for non-objects, unknown `$` keys, modifier keys mixed
    ///   with plain fields, or modifier operands that are not objects
    /// - `ReservedField` for reserved field names in either form
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(Error::InvalidUpdate(format!(
                    "an update must be an object, got {}",
                    other.type_name()
                )))
            }
        };

        let is_modifier = obj.keys().any(|k| ModifierKind::from_key(k).is_some());
        if !is_modifier {
            if let Some(key) = obj.keys().find(|k| k.starts_with('$')) {
                return Err(Error::InvalidUpdate(format!("unknown modifier {}", key)));
            }
            let update = Update::Replace(Document::from_fields(obj));
            update.validate()?;
            return Ok(update);
        }

        let mut ops = Vec::new();
        for (key, operand) in obj {
            let kind = ModifierKind::from_key(&key).ok_or_else(|| {
                if key.starts_with('$') {
                    Error::InvalidUpdate(format!("unknown modifier {}", key))
                } else {
                    Error::InvalidUpdate(format!(
                        "field \"{}\" mixed with modifiers in one update",
                        key
                    ))
                }
            })?;
            let fields: BTreeMap<String, Value> = match operand {
                Value::Object(fields) => fields,
                other => {
                    return Err(Error::InvalidUpdate(format!(
                        "{} expects an object, got {}",
                        key,
                        other.type_name()
                    )))
                }
            };
            ops.extend(
                fields
                    .into_iter()
                    .map(|(field, operand)| ModifierOp::new(kind, field, operand)),
            );
        }
        let update = Update::Modify(ops);
        update.validate()?;
        Ok(update)
    }

    /// Parse an update from JSON
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::from_value(Value::from(json))
    }

    /// True for modifier updates
    pub fn is_modifier(&self) -> bool {
        matches!(self, Update::Modify(_))
    }

    /// Reject reserved field names
    pub fn validate(&self) -> Result<()> {
        match self {
            Update::Replace(doc) => doc.validate_user_fields(),
            Update::Modify(ops) => match ops.iter().find(|op| is_reserved(&op.field)) {
                Some(op) => Err(Error::ReservedField(op.field.clone())),
                None => Ok(()),
            },
        }
    }

    /// Add a modifier, builder style
    ///
    /// Turns a replacement into an empty modifier update first.
    pub fn with_op(self, op: ModifierOp) -> Self {
        let mut ops = match self {
            Update::Modify(ops) => ops,
            Update::Replace(_) => Vec::new(),
        };
        ops.push(op);
        Update::Modify(ops)
    }

    /// `$set`
    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Set, field, value))
    }

    /// `$add`
    pub fn add(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Add, field, value))
    }

    /// `$subtract`
    pub fn subtract(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Subtract, field, value))
    }

    /// `$multiply`
    pub fn multiply(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Multiply, field, value))
    }

    /// `$divide`
    pub fn divide(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Divide, field, value))
    }

    /// `$remove`
    pub fn remove(self, field: impl Into<String>) -> Self {
        self.with_op(ModifierOp::new(ModifierKind::Remove, field, Value::Null))
    }

    /// Compute the updated document
    ///
    /// The identifier is not touched here; callers re-pin it. Upserts pass an
    /// empty document.
    pub fn apply(&self, existing: &Document) -> Document {
        let mut updated = match self {
            Update::Replace(doc) => doc.clone(),
            Update::Modify(ops) => {
                let mut updated = existing.clone();
                for kind in ModifierKind::PRECEDENCE {
                    for op in ops.iter().filter(|op| op.kind == kind) {
                        let before = existing.get(&op.field);
                        match kind {
                            ModifierKind::Set => {
                                updated.set(op.field.clone(), op.operand.clone());
                            }
                            ModifierKind::Remove => {
                                updated.remove(&op.field);
                            }
                            arithmetic => {
                                let value = compute(arithmetic, before, &op.operand);
                                updated.set(op.field.clone(), value);
                            }
                        }
                    }
                }
                updated
            }
        };
        updated.set_relevance(None);
        updated
    }
}

impl TryFrom<serde_json::Value> for Update {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::from_json(json)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Apply an arithmetic modifier to the pre-update value
///
/// A missing field yields `operand` for `$add`, `-operand` for `$subtract`
/// and `0` for `$multiply`/`$divide`.
fn compute(kind: ModifierKind, current: Option<&Value>, operand: &Value) -> Value {
    let Some(current) = current else {
        return match kind {
            ModifierKind::Add => numeric(operand),
            ModifierKind::Subtract => match operand.to_integer().and_then(i64::checked_neg) {
                Some(n) => Value::Int(n),
                None => from_float(-operand.to_number()),
            },
            _ => Value::Int(0),
        };
    };

    if let (Some(a), Some(b)) = (current.to_integer(), operand.to_integer()) {
        let exact = match kind {
            ModifierKind::Add => a.checked_add(b),
            ModifierKind::Subtract => a.checked_sub(b),
            ModifierKind::Multiply => a.checked_mul(b),
            ModifierKind::Divide if b != 0 && a.checked_rem(b) == Some(0) => a.checked_div(b),
            _ => None,
        };
        if let Some(n) = exact {
            return Value::Int(n);
        }
    }

    let (a, b) = (current.to_number(), operand.to_number());
    from_float(match kind {
        ModifierKind::Add => a + b,
        ModifierKind::Subtract => a - b,
        ModifierKind::Multiply => a * b,
        ModifierKind::Divide => a / b,
        ModifierKind::Set | ModifierKind::Remove => f64::NAN,
    })
}

fn numeric(value: &Value) -> Value {
    match value.to_integer() {
        Some(n) => Value::Int(n),
        None => from_float(value.to_number()),
    }
}

/// Non-finite results are stored as null
fn from_float(f: f64) -> Value {
    if f.is_finite() {
        Value::Float(f)
    } else {
        Value::Null
    }
}
