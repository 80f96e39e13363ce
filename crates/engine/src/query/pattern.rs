//! Regex literals in `/pattern/flags` form
//!
//! Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
//! matches newline), `x` (ignore whitespace), `u` (unicode, on by default).
//! `g` and `y` are accepted and ignored since matching is a yes/no test.

use regex::{Regex, RegexBuilder};
use shelfdb_core::{Error, Result, Value};
use std::fmt;

/// A compiled regex literal
#[derive(Clone)]
pub struct Pattern {
    literal: String,
    regex: Regex,
}

impl Pattern {
    /// Parse and compile a `/pattern/flags` literal
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRegex` if the literal is not delimited by
    /// slashes, carries an unknown flag, or does not compile.
    pub fn parse(literal: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRegex {
            literal: literal.to_string(),
            reason,
        };

        let body = literal
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'".to_string()))?;
        let last_slash = body
            .rfind('/')
            .ok_or_else(|| invalid("missing closing '/'".to_string()))?;
        let (source, flags) = (&body[..last_slash], &body[last_slash + 1..]);

        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'u' | 'g' | 'y' => {}
                other => return Err(invalid(format!("unknown flag '{}'", other))),
            }
        }

        let regex = builder.build().map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            literal: literal.to_string(),
            regex,
        })
    }

    /// The literal as written
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// True if `value` is a string containing a match
    pub fn is_match(&self, value: &Value) -> bool {
        value.as_str().map_or(false, |s| self.regex.is_match(s))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.literal).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}
