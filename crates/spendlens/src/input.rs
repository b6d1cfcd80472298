//! Structured clause inputs.
//!
//! Every clause accepts either a single item or an ordered list of items, which is
//! modelled by [`OneOrMany`]. Both shapes decode from JSON:
//!
//! ```
//! use spendlens::{Condition, OneOrMany};
//!
//! let one: OneOrMany<Condition> =
//!     serde_json::from_str(r#"{"field": "id", "operator": "=", "value": "a1"}"#).unwrap();
//! let many: OneOrMany<Condition> =
//!     serde_json::from_str(r#"[{"field": "id", "operator": "=", "value": "a1"}]"#).unwrap();
//! assert_eq!(one.as_slice(), many.as_slice());
//! ```

use crate::error::SpendError;
use crate::scalar::Scalar;
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// A single item or an ordered list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    // `Many` comes first: derived structs also accept sequences, so trying `One`
    // first would swallow JSON arrays.
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// View both shapes as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` only for an empty list; a single item is never empty.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_one(&self) -> bool {
        matches!(self, OneOrMany::One(_))
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        OneOrMany::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A WHERE condition: `field OPERATOR value`.
///
/// The operator is matched case-insensitively and rendered in upper case.
/// `IN` expects a list value, `BETWEEN` a list of exactly two bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: OneOrMany<Scalar>,
}

#[derive(Deserialize)]
struct ConditionObject {
    field: String,
    operator: String,
    value: OneOrMany<Scalar>,
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ConditionObject {
            field,
            operator,
            value,
        } = deserialize_object(deserializer, "a condition object")?;
        Ok(Self {
            field,
            operator,
            value,
        })
    }
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<OneOrMany<Scalar>>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Create a comparison with a single value: `field op value`.
    pub fn cmp(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, operator, OneOrMany::One(value.into()))
    }

    /// Create an equality condition: `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::cmp(field, "=", value)
    }

    /// Create a LIKE condition: `field LIKE pattern`.
    pub fn like(field: impl Into<String>, pattern: impl Into<Scalar>) -> Self {
        Self::cmp(field, "LIKE", pattern)
    }

    /// Create an IN condition: `field IN (v1, v2, ...)`.
    pub fn in_list<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        Self::new(field, "IN", values)
    }

    /// Create a BETWEEN condition: `field BETWEEN lower AND upper`.
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<Scalar>,
        upper: impl Into<Scalar>,
    ) -> Self {
        Self::new(field, "BETWEEN", vec![lower.into(), upper.into()])
    }

    /// The operator as it is rendered.
    pub fn normalized_operator(&self) -> String {
        self.operator.to_uppercase()
    }
}

/// A SET assignment: `field = value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub field: String,
    pub value: Scalar,
}

#[derive(Deserialize)]
struct AssignmentObject {
    field: String,
    value: Scalar,
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let AssignmentObject { field, value } =
            deserialize_object(deserializer, "an assignment object")?;
        Ok(Self { field, value })
    }
}

impl Assignment {
    pub fn new(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Sort direction of an ORDER BY term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = SpendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(SpendError::validation(format!(
                "sort must be ASC or DESC, got '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = SpendError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.as_str().to_string()
    }
}

/// An ORDER BY term; `sort` defaults to ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTerm {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

#[derive(Deserialize)]
struct OrderTermObject {
    field: String,
    #[serde(default)]
    sort: Option<SortOrder>,
}

impl<'de> Deserialize<'de> for OrderTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let OrderTermObject { field, sort } =
            deserialize_object(deserializer, "an order term object")?;
        Ok(Self { field, sort })
    }
}

impl OrderTerm {
    /// Order by `field` with the default direction.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: Some(SortOrder::Asc),
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: Some(SortOrder::Desc),
        }
    }

    pub fn sort_or_default(&self) -> SortOrder {
        self.sort.unwrap_or_default()
    }
}

/// Decode `T` from a map only; derived structs would also take a positional array.
fn deserialize_object<'de, D, T>(deserializer: D, expecting: &'static str) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct ObjectVisitor<T> {
        expecting: &'static str,
        marker: PhantomData<T>,
    }

    impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectVisitor<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.expecting)
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
            T::deserialize(MapAccessDeserializer::new(map))
        }
    }

    deserializer.deserialize_map(ObjectVisitor {
        expecting,
        marker: PhantomData,
    })
}
