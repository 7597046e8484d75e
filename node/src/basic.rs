//! Untyped scalar nodes.
//!
//! These carry plain values into a [`NodeAssembler`](crate::NodeAssembler) via
//! [`assign_node`](crate::NodeAssembler::assign_node), and are handy wherever a node is needed
//! without a type system.

use std::borrow::Cow;

use ipld_schema::Kind;

use super::{error::NodeError, link::Link, node::Node};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BasicBool(pub bool);

impl Node for BasicBool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn as_bool(&self) -> Result<bool, NodeError> {
        Ok(self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BasicInt(pub i64);

impl Node for BasicInt {
    fn kind(&self) -> Kind {
        Kind::Int
    }

    fn as_int(&self) -> Result<i64, NodeError> {
        Ok(self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BasicFloat(pub f64);

impl Node for BasicFloat {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn as_float(&self) -> Result<f64, NodeError> {
        Ok(self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicString(pub String);

impl Node for BasicString {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn as_string(&self) -> Result<Cow<'_, str>, NodeError> {
        Ok(Cow::Borrowed(&self.0))
    }
}

impl From<&str> for BasicString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicBytes(pub Vec<u8>);

impl Node for BasicBytes {
    fn kind(&self) -> Kind {
        Kind::Bytes
    }

    fn as_bytes(&self) -> Result<Cow<'_, [u8]>, NodeError> {
        Ok(Cow::Borrowed(&self.0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicLink(pub Link);

impl Node for BasicLink {
    fn kind(&self) -> Kind {
        Kind::Link
    }

    fn as_link(&self) -> Result<Link, NodeError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_answer_only_their_kind() {
        let s = BasicString::from("hi");
        assert_eq!(s.as_string().unwrap(), "hi");
        assert!(matches!(
            s.as_int(),
            Err(NodeError::WrongKind { actual: Kind::String, .. })
        ));
        assert_eq!(BasicBool(true).as_bool(), Ok(true));
        assert_eq!(BasicFloat(0.5).as_float(), Ok(0.5));
        assert_eq!(BasicBytes(vec![1, 2]).as_bytes().unwrap().as_ref(), &[1, 2]);
        assert_eq!(
            BasicLink(Link::new("bafy")).as_link().unwrap().as_str(),
            "bafy"
        );
    }
}
