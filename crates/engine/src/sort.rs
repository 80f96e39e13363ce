//! Natural ordering and paging over result lists
//!
//! Values are compared through their string form, split into numeric and
//! text chunks so that `"file2"` sorts before `"file10"`. Whole values that
//! read as hex literals or dates are compared by their parsed value first.
//!
//! Sorting, `limit` and `skip` work on materialized lists and never touch the
//! live store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shelfdb_core::{Document, Error, Result, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SortSpec
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending (`"lowest_first"`)
    LowestFirst,
    /// Descending (`"highest_first"`)
    HighestFirst,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lowest_first" => Ok(SortOrder::LowestFirst),
            "highest_first" => Ok(SortOrder::HighestFirst),
            other => Err(Error::InvalidSort(format!(
                "unknown order \"{}\", expected lowest_first or highest_first",
                other
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::LowestFirst => write!(f, "lowest_first"),
            SortOrder::HighestFirst => write!(f, "highest_first"),
        }
    }
}

/// Which field to sort by, and in which direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field compared
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl SortSpec {
    /// Create a sort spec
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Ascending on `field`
    pub fn lowest_first(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::LowestFirst)
    }

    /// Descending on `field`
    pub fn highest_first(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::HighestFirst)
    }

    /// Parse `{ "<field>": "lowest_first" | "highest_first" }`
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .filter(|obj| obj.len() == 1)
            .ok_or_else(|| {
                Error::InvalidSort("a sort spec is an object with exactly one field".to_string())
            })?;
        let (field, order) = obj
            .iter()
            .next()
            .ok_or_else(|| Error::InvalidSort("empty sort spec".to_string()))?;
        let order = order.as_str().ok_or_else(|| {
            Error::InvalidSort(format!("order for \"{}\" must be a string", field))
        })?;
        Ok(Self::new(field.clone(), order.parse()?))
    }

    /// Parse a sort spec from JSON
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::from_value(&Value::from(json))
    }
}

// ============================================================================
// Sort / limit / skip
// ============================================================================

/// Sort copies of `docs` by `spec`
///
/// Documents holding the field come first in natural order; documents without
/// it follow in their original relative order. Ties keep their input order in
/// both directions.
pub fn sort(spec: &SortSpec, docs: &[Document]) -> Vec<Document> {
    let (mut keyed, missing): (Vec<_>, Vec<_>) = docs
        .iter()
        .map(|doc| (doc.get(&spec.field).map(Value::sort_key_string), doc))
        .partition(|(key, _)| key.is_some());

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = natural_cmp(a.as_deref().unwrap_or(""), b.as_deref().unwrap_or(""));
        match spec.order {
            SortOrder::LowestFirst => ord,
            SortOrder::HighestFirst => ord.reverse(),
        }
    });

    keyed
        .into_iter()
        .chain(missing)
        .map(|(_, doc)| doc.clone())
        .collect()
}

/// First `n` documents
pub fn limit(n: usize, docs: &[Document]) -> Vec<Document> {
    docs.iter().take(n).cloned().collect()
}

/// Everything after the first `n` documents
pub fn skip(n: usize, docs: &[Document]) -> Vec<Document> {
    docs.iter().skip(n).cloned().collect()
}

// ============================================================================
// Natural comparator
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Chunk {
    Number(f64),
    Text(String),
}

static CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\-]?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?|\d+").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Split into alternating numeric and text pieces, dropping empty ends
fn split_chunks(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in CHUNK_RE.find_iter(s) {
        if m.start() > last {
            pieces.push(&s[last..m.start()]);
        }
        pieces.push(m.as_str());
        last = m.end();
    }
    if last < s.len() {
        pieces.push(&s[last..]);
    }
    pieces
}

/// Numeric pieces compare as numbers unless zero-padded inside a longer value
fn classify(piece: &str, single: bool) -> Chunk {
    if !piece.starts_with('0') || single || piece == "0" {
        if let Ok(n) = piece.parse::<f64>() {
            return Chunk::Number(n);
        }
    }
    Chunk::Text(WHITESPACE_RE.replace_all(piece.trim(), " ").into_owned())
}

fn hex_value(s: &str) -> Option<f64> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok().map(|n| n as f64)
}

fn date_value(s: &str) -> Option<f64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis() as f64);
        }
    }
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis() as f64);
        }
    }
    None
}

fn has_non_ascii(s: &str) -> bool {
    !s.is_ascii()
}

fn compare_chunks(a: &Chunk, b: &Chunk) -> Ordering {
    match (a, b) {
        (Chunk::Number(x), Chunk::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        // Numbers sort before text
        (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        (Chunk::Text(x), Chunk::Text(y)) => {
            if has_non_ascii(x) || has_non_ascii(y) {
                x.to_lowercase().cmp(&y.to_lowercase())
            } else {
                x.cmp(y)
            }
        }
    }
}

/// Natural comparison of two sort keys
///
/// 1. If both read as a hex literal or a date, compare the parsed values.
/// 2. Otherwise walk the numeric/text chunks pairwise. Numbers compare
///    numerically and sort before text; text compares with whitespace
///    collapsed, case-folded when either side is non-ASCII.
/// 3. A value that runs out of chunks first sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (x, y) = (a.trim(), b.trim());
    let (xs, ys) = (split_chunks(x), split_chunks(y));

    let xd = hex_value(x).or_else(|| (xs.len() > 1).then(|| date_value(x)).flatten());
    let yd = hex_value(y).or_else(|| (ys.len() > 1).then(|| date_value(y)).flatten());
    if let (Some(xd), Some(yd)) = (xd, yd) {
        match xd.partial_cmp(&yd) {
            Some(Ordering::Equal) | None => {}
            Some(ord) => return ord,
        }
    }

    let (x_single, y_single) = (xs.len() == 1, ys.len() == 1);
    for i in 0..xs.len().max(ys.len()) {
        let ord = match (xs.get(i), ys.get(i)) {
            (Some(p), Some(q)) => compare_chunks(&classify(p, x_single), &classify(q, y_single)),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
