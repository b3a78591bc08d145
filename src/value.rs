//! Dynamic value model traversed by the path resolver
//!
//! Introspected state arrives from collaborators in whatever shape their
//! API clients produce: string-keyed maps, ordered lists, typed response
//! structs, plain scalars. Rather than inspecting unknown shapes at run
//! time, the engine models them as a closed variant - [`Value`] - and the
//! resolver dispatches with an exhaustive match.
//!
//! The engine only ever *traverses* values. Construction happens at the
//! boundary: [`Value::from`] converts a deserialized JSON tree, and
//! [`Record`] offers a small builder for typed aggregates that keep their
//! declared field order (the analogue of an API response struct).
//!
//! All variants serialize transparently with serde, so any `Value` can be
//! handed to the template engine as a render context, and records come out
//! as plain JSON objects of their fields.
//!
//! # Examples
//!
//! ```rust
//! use refract::{Record, Value};
//!
//! let subnet = Record::new()
//!     .with_field("SubnetId", "subnet-0a1b")
//!     .with_field("AvailabilityZone", "us-east-1a");
//! let state = Value::from(serde_json::json!({ "Subnets": [] }));
//!
//! assert!(state.get("/Subnets").is_some());
//! assert_eq!(
//!     Value::Record(subnet).get("SubnetId"),
//!     Some(&Value::from("subnet-0a1b")),
//! );
//! ```

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Leaf value: text, number, boolean or null
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent / JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or float, kept in JSON number representation
    Number(serde_json::Number),
    /// Text
    Text(String),
}

/// Named-field aggregate with stable field order
///
/// Models a typed API response struct: fields keep their declared order and
/// names are unique ([`Record::set`] replaces an existing field of the same
/// name). Lookup is by field name, matching how the resolver addresses
/// records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::set`]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any existing field of the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    /// Iterate fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A dynamic value: the closed variant the resolver traverses
///
/// Exactly four shapes exist, mirroring what introspection collaborators
/// actually hand over:
///
/// - [`Value::Mapping`] - string-keyed, unique keys
/// - [`Value::Sequence`] - ordered list
/// - [`Value::Record`] - named-field aggregate ([`Record`])
/// - [`Value::Scalar`] - leaf ([`Scalar`])
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Leaf value
    Scalar(Scalar),
    /// Ordered list of values
    Sequence(Vec<Value>),
    /// String-keyed map with unique keys
    Mapping(BTreeMap<String, Value>),
    /// Named-field aggregate
    Record(Record),
}

impl Value {
    /// The null scalar
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    /// Resolve a path expression against this value
    ///
    /// Convenience for [`tokenize`](crate::path::tokenize) followed by
    /// [`resolve`](crate::path::resolve). Total: any miss or shape mismatch
    /// yields `None`, never a panic or error.
    ///
    /// ```rust
    /// use refract::Value;
    ///
    /// let state = Value::from(serde_json::json!({
    ///     "Parameters": { "Size": { "ParameterValue": "3" } }
    /// }));
    /// assert_eq!(
    ///     state.get("/Parameters/Size/ParameterValue"),
    ///     Some(&Value::from("3")),
    /// );
    /// assert_eq!(state.get("/Parameters/Flavor"), None);
    /// ```
    pub fn get(&self, path: &str) -> Option<&Value> {
        crate::path::resolve(self, &crate::path::tokenize(path))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Scalar(Scalar::Null),
            serde_json::Value::Bool(flag) => Value::Scalar(Scalar::Bool(flag)),
            serde_json::Value::Number(number) => Value::Scalar(Scalar::Number(number)),
            serde_json::Value::String(text) => Value::Scalar(Scalar::Text(text)),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Value::Mapping(entries.into_iter().map(|(key, value)| (key, value.into())).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(Scalar::Text(text.to_string()))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(Scalar::Text(text))
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Scalar(Scalar::Bool(flag))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Scalar(Scalar::Number(number.into()))
    }
}

impl From<u64> for Value {
    fn from(number: u64) -> Self {
        Value::Scalar(Scalar::Number(number.into()))
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(scalar) => scalar.serialize(serializer),
            Value::Sequence(items) => items.serialize(serializer),
            Value::Mapping(entries) => entries.serialize(serializer),
            Value::Record(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(flag) => serializer.serialize_bool(*flag),
            Scalar::Number(number) => number.serialize(serializer),
            Scalar::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
