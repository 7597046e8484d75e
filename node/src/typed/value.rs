use std::sync::Arc;

use indexmap::IndexMap;

use ipld_schema::ImplicitValue;

use crate::{link::Link, maybe::Maybe};

/// Storage for a typed value. The shape always matches the type the value was assembled for.
#[derive(Debug, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Link(Link),
    /// One entry per field, in declaration order.
    Struct(Box<[Maybe<Arc<Value>>]>),
    /// Entries in insertion order; values are never absent.
    Map(IndexMap<String, Maybe<Arc<Value>>>),
    List(Box<[Maybe<Arc<Value>>]>),
    /// `member` indexes the union's member list.
    Union { member: usize, value: Arc<Value> },
}

impl Value {
    pub(crate) fn from_implicit(implicit: &ImplicitValue) -> Self {
        match implicit {
            ImplicitValue::Bool(b) => Self::Bool(*b),
            ImplicitValue::Int(i) => Self::Int(*i),
            ImplicitValue::String(s) => Self::String(s.clone()),
        }
    }

    pub(crate) fn equals_implicit(&self, implicit: &ImplicitValue) -> bool {
        match (self, implicit) {
            (Self::Bool(a), ImplicitValue::Bool(b)) => a == b,
            (Self::Int(a), ImplicitValue::Int(b)) => a == b,
            (Self::String(a), ImplicitValue::String(b)) => a == b,
            _ => false,
        }
    }
}
