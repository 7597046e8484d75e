use super::node::{Node, ABSENT, NULL};

/// The three states of a struct field or a nullable element: absent, null, or holding a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Maybe<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Maybe<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether a value is present.
    pub fn exists(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The present value. Panics when absent or null.
    pub fn must(&self) -> &T {
        match self {
            Self::Value(v) => v,
            _ => panic!("unbox of a maybe rejected"),
        }
    }

    pub fn into_must(self) -> T {
        match self {
            Self::Value(v) => v,
            _ => panic!("unbox of a maybe rejected"),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Absent => Maybe::Absent,
            Self::Null => Maybe::Null,
            Self::Value(v) => Maybe::Value(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        match self {
            Self::Absent => Maybe::Absent,
            Self::Null => Maybe::Null,
            Self::Value(v) => Maybe::Value(f(v)),
        }
    }
}

impl<T: Node> Maybe<T> {
    /// The value as a node, with absent and null mapped to [`ABSENT`] and [`NULL`].
    pub fn as_node(&self) -> &dyn Node {
        match self {
            Self::Absent => &ABSENT,
            Self::Null => &NULL,
            Self::Value(v) => v,
        }
    }
}
