use std::borrow::Cow;
use std::fmt;

use ipld_schema::Kind;

use super::{error::NodeError, link::Link, typed::TypedNode};

pub type MapIter<'a> = Box<dyn Iterator<Item = (String, Box<dyn Node + 'a>)> + 'a>;
pub type ListIter<'a> = Box<dyn Iterator<Item = Box<dyn Node + 'a>> + 'a>;

/// Read access to a value of the data model.
///
/// Every node answers [`kind`](Node::kind); the remaining accessors only succeed for the kinds
/// they make sense on and return [`NodeError::WrongKind`] otherwise.
pub trait Node: fmt::Debug {
    fn kind(&self) -> Kind;

    /// Name used when reporting errors about this node.
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.kind().name())
    }

    /// Number of entries or elements; `None` for anything that is not a map or a list.
    fn length(&self) -> Option<usize> {
        None
    }

    fn is_absent(&self) -> bool {
        false
    }

    fn is_null(&self) -> bool {
        false
    }

    fn as_bool(&self) -> Result<bool, NodeError> {
        Err(wrong_kind(self, "as_bool", Kind::Bool))
    }

    fn as_int(&self) -> Result<i64, NodeError> {
        Err(wrong_kind(self, "as_int", Kind::Int))
    }

    fn as_float(&self) -> Result<f64, NodeError> {
        Err(wrong_kind(self, "as_float", Kind::Float))
    }

    fn as_string(&self) -> Result<Cow<'_, str>, NodeError> {
        Err(wrong_kind(self, "as_string", Kind::String))
    }

    fn as_bytes(&self) -> Result<Cow<'_, [u8]>, NodeError> {
        Err(wrong_kind(self, "as_bytes", Kind::Bytes))
    }

    fn as_link(&self) -> Result<Link, NodeError> {
        Err(wrong_kind(self, "as_link", Kind::Link))
    }

    fn lookup_string(&self, _key: &str) -> Result<Box<dyn Node + '_>, NodeError> {
        Err(wrong_kind(self, "lookup_string", Kind::Map))
    }

    fn lookup_index(&self, _index: usize) -> Result<Box<dyn Node + '_>, NodeError> {
        Err(wrong_kind(self, "lookup_index", Kind::List))
    }

    fn map_iter(&self) -> Result<MapIter<'_>, NodeError> {
        Err(wrong_kind(self, "map_iter", Kind::Map))
    }

    fn list_iter(&self) -> Result<ListIter<'_>, NodeError> {
        Err(wrong_kind(self, "list_iter", Kind::List))
    }

    /// The schema-aware node behind this one, if any.
    fn as_typed(&self) -> Option<&TypedNode> {
        None
    }
}

pub(crate) fn wrong_kind<N: Node + ?Sized>(
    node: &N,
    method: &'static str,
    expected: Kind,
) -> NodeError {
    NodeError::WrongKind {
        type_name: node.type_name().into_owned(),
        method,
        expected: vec![expected],
        actual: node.kind(),
    }
}

/// The null value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NullNode;

impl Node for NullNode {
    fn kind(&self) -> Kind {
        Kind::Null
    }

    fn is_null(&self) -> bool {
        true
    }
}

/// Stands in for an optional struct field that is not present.
///
/// Reports kind null like [`NullNode`], but is distinguishable through [`Node::is_absent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AbsentNode;

impl Node for AbsentNode {
    fn kind(&self) -> Kind {
        Kind::Null
    }

    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("absent")
    }

    fn is_absent(&self) -> bool {
        true
    }
}

pub static NULL: NullNode = NullNode;
pub static ABSENT: AbsentNode = AbsentNode;
