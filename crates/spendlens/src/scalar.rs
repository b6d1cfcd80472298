//! Atomic values and their SQL literal rendering.
//!
//! Every value that ends up in generated SQL goes through [`Scalar::write_literal`]:
//!
//! - strings are wrapped in double quotes, unless they consist only of ASCII digits;
//! - integers, floats and booleans are emitted as-is.
//!
//! # Example
//! ```
//! use spendlens::Scalar;
//!
//! assert_eq!(Scalar::from("Alice").to_literal(), r#""Alice""#);
//! assert_eq!(Scalar::from("5").to_literal(), "5");
//! assert_eq!(Scalar::from(12.34).to_literal(), "12.34");
//! ```

use crate::error::{SpendError, SpendResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An atomic value eligible for literal rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Returns `true` if `s` is non-empty and made only of ASCII digits.
pub fn is_numeric_string(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl Scalar {
    /// Render the value as a SQL literal.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    pub(crate) fn write_literal(&self, out: &mut String) {
        match self {
            Scalar::Str(s) if is_numeric_string(s) => out.push_str(s),
            Scalar::Str(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            other => other.write_raw(out),
        }
    }

    /// Render the value's natural text without any quoting.
    pub fn to_raw(&self) -> String {
        let mut out = String::new();
        self.write_raw(&mut out);
        out
    }

    pub(crate) fn write_raw(&self, out: &mut String) {
        use std::fmt::Write;

        // Writing into a String cannot fail.
        let _ = match self {
            Scalar::Str(s) => {
                out.push_str(s);
                Ok(())
            }
            Scalar::Int(i) => write!(out, "{i}"),
            // `{:?}` keeps the fractional part on whole numbers (1.0, not 1).
            Scalar::Float(f) => write!(out, "{f:?}"),
            Scalar::Bool(b) => write!(out, "{b}"),
        };
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Str(value.clone())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Bool(b) => b.into(),
            Scalar::Int(i) => i.into(),
            Scalar::Float(f) => f.into(),
            Scalar::Str(s) => s.into(),
        }
    }
}

impl TryFrom<serde_json::Value> for Scalar {
    type Error = SpendError;

    fn try_from(value: serde_json::Value) -> SpendResult<Self> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::String(s) => Ok(Scalar::Str(s)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => n
                    .as_f64()
                    .map(Scalar::Float)
                    .ok_or_else(|| SpendError::validation(format!("unrepresentable number {n}"))),
            },
            other => Err(SpendError::validation(format!(
                "expected a string, number or boolean, got {other}"
            ))),
        }
    }
}
