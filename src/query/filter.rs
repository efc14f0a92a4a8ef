use serde_json::{Map, Value};

use crate::record::Record;

/// Key suffix that turns a filter into a membership test, e.g. `id__in`.
pub const IN_SUFFIX: &str = "__in";

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value.
    Eq(Value),
    /// Field equals one of the values.
    In(Vec<Value>),
    /// An `__in` filter given something other than an array. Matches nothing.
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub predicate: Predicate,
}

impl Filter {
    /// Build a filter from one `key: value` pair using the `__in` convention.
    pub fn from_pair(key: &str, value: Value) -> Self {
        match key.strip_suffix(IN_SUFFIX) {
            Some(field) => Self {
                field: field.to_string(),
                predicate: match value {
                    Value::Array(values) => Predicate::In(values),
                    _ => Predicate::Never,
                },
            },
            None => Self {
                field: key.to_string(),
                predicate: Predicate::Eq(value),
            },
        }
    }

    /// A missing field never matches, not even against `null`.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };
        match &self.predicate {
            Predicate::Eq(expected) => json_eq(&actual, expected),
            Predicate::In(candidates) => candidates.iter().any(|c| json_eq(&actual, c)),
            Predicate::Never => false,
        }
    }

    fn key(&self) -> String {
        match self.predicate {
            Predicate::Eq(_) => self.field.clone(),
            Predicate::In(_) | Predicate::Never => format!("{}{}", self.field, IN_SUFFIX),
        }
    }

    fn value(&self) -> Value {
        match &self.predicate {
            Predicate::Eq(value) => value.clone(),
            Predicate::In(values) => Value::Array(values.clone()),
            Predicate::Never => Value::Null,
        }
    }
}

/// Strict equality. Numbers compare by value, so `1` equals `1.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

/// A conjunction of predicates. Empty filters match every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    filters: Vec<Filter>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            predicate: Predicate::Eq(value.into()),
        });
        self
    }

    /// Require `field` to equal one of `values`.
    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filters.push(Filter {
            field: field.into(),
            predicate: Predicate::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Build filters from a JSON object. Returns None for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(Self::from_map)
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            filters: map
                .iter()
                .map(|(key, value)| Filter::from_pair(key, value.clone()))
                .collect(),
        }
    }

    /// True when every predicate matches.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// The filters as a JSON object in `field` / `field__in` form.
    pub fn to_value(&self) -> Value {
        Value::Object(self.filters.iter().map(|f| (f.key(), f.value())).collect())
    }
}
