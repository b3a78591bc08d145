//! Conventional context shape produced by stack introspection
//!
//! The engine imposes no shape on render contexts - any serializable value
//! works. Introspection collaborators do follow a convention, though: a
//! mapping with `"Resources"` indexed by resource type then logical name,
//! and `"Parameters"` indexed by parameter name. [`StackModel`] captures
//! that convention so collaborators and tests build well-formed contexts
//! without hand-assembling nested maps.
//!
//! ```rust
//! use refract::{StackModel, Value};
//!
//! let mut model = StackModel::new();
//! model.add_resource(
//!     "AWS::EC2::Subnet",
//!     "managerSubnet",
//!     Value::from(serde_json::json!({ "PhysicalResourceId": "subnet-0a1b" })),
//! );
//! let state = model.into_value();
//! assert_eq!(
//!     state.get("/Resources/'AWS::EC2::Subnet'/managerSubnet/PhysicalResourceId"),
//!     Some(&Value::from("subnet-0a1b")),
//! );
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;

/// Introspected stack state in the conventional shape
///
/// Serializes to the same tree [`StackModel::into_value`] produces, so a
/// model can be handed directly to [`Template::render`](crate::Template::render)
/// as the context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StackModel {
    /// Resource descriptions indexed by type name, then logical name
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, BTreeMap<String, Value>>,
    /// Parameter descriptions indexed by parameter name
    #[serde(rename = "Parameters")]
    pub parameters: BTreeMap<String, Value>,
}

impl StackModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a resource description under its type and logical name
    pub fn add_resource(
        &mut self,
        resource_type: impl Into<String>,
        logical_name: impl Into<String>,
        description: impl Into<Value>,
    ) {
        self.resources
            .entry(resource_type.into())
            .or_default()
            .insert(logical_name.into(), description.into());
    }

    /// Index a parameter description under its name
    pub fn add_parameter(&mut self, name: impl Into<String>, description: impl Into<Value>) {
        self.parameters.insert(name.into(), description.into());
    }

    /// Convert into the conventional `Value` tree for path resolution
    pub fn into_value(self) -> Value {
        let resources = Value::Mapping(
            self.resources
                .into_iter()
                .map(|(resource_type, by_name)| (resource_type, Value::Mapping(by_name)))
                .collect(),
        );
        Value::Mapping(BTreeMap::from([
            ("Resources".to_string(), resources),
            ("Parameters".to_string(), Value::Mapping(self.parameters)),
        ]))
    }
}
