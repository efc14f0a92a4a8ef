use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::record::{Record, CREATED_DATE};

/// Ordering `list` applies when the caller gives none: newest first.
pub const DEFAULT_LIST_ORDER: &str = "-created_date";

/// A sort on one field, `-field` meaning descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    /// Parse `field` or `-field`. Returns None for an empty field name.
    pub fn parse(order: &str) -> Option<Self> {
        let order = order.trim();
        let (field, descending) = match order.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (order, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Newest first by `created_date`.
    pub fn newest_first() -> Self {
        Self::descending(CREATED_DATE)
    }

    /// Sort `records` in place.
    ///
    /// Ties between present values follow the direction of the sort:
    /// insertion order ascending, reverse insertion order descending, so a
    /// descending sort is the mirror of the ascending one. Records missing
    /// the field stay last, in insertion order.
    pub fn sort(&self, records: &mut Vec<Record>) {
        let mut keyed: Vec<(usize, Record)> = records.drain(..).enumerate().collect();
        keyed.sort_by(|(ia, a), (ib, b)| {
            let a = a.get(&self.field);
            let b = b.get(&self.field);
            let present = a.as_deref().is_some_and(|v| !v.is_null());
            compare_values(a.as_deref(), b.as_deref(), self.descending).then_with(|| {
                if self.descending && present {
                    ib.cmp(ia)
                } else {
                    ia.cmp(ib)
                }
            })
        });
        records.extend(keyed.into_iter().map(|(_, record)| record));
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Compare two optional field values.
///
/// Values of the same kind compare naturally: numbers numerically, strings
/// lexicographically (which is chronological for ISO-8601 timestamps),
/// booleans `false < true`. Arrays and objects are all equal to their own
/// kind; different kinds order as bool < number < string < array < object.
/// Missing and `null` values always sort last, whatever the direction.
/// The result is a total order.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_present(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&b.as_f64().unwrap_or_default()),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
