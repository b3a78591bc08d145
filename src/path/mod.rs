//! Path expressions: tokenization and resolution
//!
//! A path expression addresses a location inside a [`Value`](crate::Value)
//! tree. The syntax is `/`-delimited with single-quote escaping for keys
//! that themselves contain `/` (common for cloud resource type names such
//! as `Microsoft.Network/virtualNetworks` or `AWS::EC2::VPC` siblings):
//!
//! ```text
//! /Resources/'AWS::EC2::Subnet'/managerSubnet/PhysicalResourceId
//! /Subnets[0]/AvailabilityZone
//! /Subnets[-1]
//! /Instances[Name=manager]/PrivateIpAddress
//! ```
//!
//! [`tokenize`] splits the expression into ordered segments; [`resolve`]
//! walks a value with them. Resolution is total - any miss, malformed
//! token or shape mismatch yields `None` rather than an error.

mod resolver;
mod tokenizer;

pub use resolver::resolve;
pub use tokenizer::tokenize;
