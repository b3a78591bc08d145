//! refract - path queries and template rendering over introspected state
//!
//! A schema-less engine for addressing arbitrary nested data by string path
//! and rendering templates against it. Introspection tooling (cloud-stack
//! describers and the like) produces a dynamic value tree; templates
//! address into that tree with `/`-delimited path expressions and compose
//! recursively through relative `include` references.
//!
//! # Architecture Overview
//!
//! The engine is four layers, leaves first:
//!
//! - [`path`] - quote-aware tokenization of path expressions and total,
//!   never-failing resolution against a [`Value`] tree, including signed
//!   and equality-filtered sequence indexing
//! - [`value`] - the closed dynamic value variant the resolver traverses:
//!   mappings, sequences, records and scalars
//! - [`locator`] - scheme-qualified template references ([`Locator`]),
//!   relative joining, and byte fetching over `file`/`http`/`https`/`unix`
//!   plus the inline `str://` literal form
//! - [`template`] - the build-once/render-many [`Template`] lifecycle with
//!   an extensible function table and the builtin function surface
//!   (`ref`, `to_json`, `from_json`, `lines`, `alias`/`var`, `include`)
//!
//! [`model`] rounds the crate out with the conventional context shape
//! produced by stack introspection collaborators.
//!
//! # Path Expressions
//!
//! ```text
//! /Resources/'AWS::EC2::Subnet'/managerSubnet/PhysicalResourceId
//! /Subnets[0]/AvailabilityZone        numeric indexing
//! /Subnets[-1]                        negative indexes count from the end
//! /Instances[Name=manager]/PrivateIp  first element matching the filter
//! ```
//!
//! Single quotes protect keys containing `/` (cloud resource type names);
//! resolution degrades to "no value" on any miss instead of failing.
//!
//! # Example
//!
//! ```rust
//! use refract::{FetchOptions, Template};
//!
//! # fn main() -> refract::Result<()> {
//! let template = Template::load(
//!     r#"str://vpc is {{ ref(path="/Resources/'AWS::EC2::VPC'/vpc/PhysicalResourceId", value=this) }}"#,
//!     FetchOptions { socket_dir: None },
//! )?;
//! let output = template.render(&serde_json::json!({
//!     "Resources": { "AWS::EC2::VPC": { "vpc": { "PhysicalResourceId": "vpc-123" } } }
//! }))?;
//! assert_eq!(output, "vpc is vpc-123");
//! # Ok(())
//! # }
//! ```
//!
//! Rendering is synchronous end to end; fetches block the calling thread
//! and deadlines are a caller concern.

pub mod error;
pub mod locator;
pub mod model;
pub mod path;
pub mod template;
pub mod value;

pub use error::{RefractError, Result};
pub use locator::{ENV_SOCKET_DIR, FetchOptions, LITERAL_PREFIX, Locator};
pub use model::StackModel;
pub use path::{resolve, tokenize};
pub use template::{FnError, FnResult, Template, TemplateFn};
pub use value::{Record, Scalar, Value};
