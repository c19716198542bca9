//! Tuples and projections
//!
//! A [`Tuple`] is one row of a select list, keyed by [`SelectField::key`].
//! A [`Projection`] is a type that knows its select list and can be built
//! from such a row.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::StoreError;
use crate::query_builder::aggregation::SelectField;

/// An ordered row of selected values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    entries: Vec<(String, Value)>,
}

impl Tuple {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Order the values of `object` by the select list; keys missing from
    /// the object come out as NULL.
    pub fn from_selection(selection: &[SelectField], mut object: Map<String, Value>) -> Self {
        if selection.is_empty() {
            return Self::from_object(object);
        }

        let entries = selection
            .iter()
            .map(|field| {
                let key = field.key();
                let value = object.remove(&key).unwrap_or(Value::Null);
                (key, value)
            })
            .collect();

        Self { entries }
    }

    pub fn from_object(object: Map<String, Value>) -> Self {
        Self {
            entries: object.into_iter().collect(),
        }
    }

    /// Value under `key`; `None` when that key was not selected
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Value of a select expression, e.g. `tuple.field(&item::STOCK.sum())`
    pub fn field(&self, field: &SelectField) -> Option<&Value> {
        self.get(&field.key())
    }

    /// Typed value under `key`. `None` when not selected, NULL or of another type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn field_as<T: DeserializeOwned>(&self, field: &SelectField) -> Option<T> {
        self.get_as(&field.key())
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_object(self) -> Map<String, Value> {
        self.entries.into_iter().collect()
    }

    /// Deserialize the tuple as a JSON object
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.into_object()))?)
    }
}

/// A result shape other than the entity itself
pub trait Projection: DeserializeOwned + Send + 'static {
    /// Expressions to select, aliased to the field names of `Self`
    fn selection() -> Vec<SelectField>;

    fn from_tuple(tuple: Tuple) -> Result<Self, StoreError> {
        tuple.deserialize()
    }
}
