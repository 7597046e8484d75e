//! Data model nodes and schema-typed node assembly on top of [`ipld_schema`].
//!
//! [`Node`] is read access to any value of the data model. [`NodeAssembler`] is the write side:
//! values are built by assigning scalars or by walking through map and list assemblers, and a
//! [`NodeBuilder`] turns the result into a [`TypedNode`].

pub mod basic;
pub mod error;
pub mod link;
pub mod maybe;
pub mod node;
pub mod typed;

pub use ipld_schema::Kind;

pub use error::NodeError;
pub use link::Link;
pub use maybe::Maybe;
pub use node::{AbsentNode, ListIter, MapIter, Node, NullNode, ABSENT, NULL};
pub use typed::{
    ListAssembler, MapAssembler, NodeAssembler, NodeBuilder, NodePrototype, TypedNode, View,
};
