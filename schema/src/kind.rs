use std::fmt;

/// The kinds of the data model, i.e. the shapes a value can have once its schema type is
/// forgotten. Every representation view of a typed value has one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Link,
    Map,
    List,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Link => "link",
            Self::Map => "map",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kinds a schema type may declare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    String,
    Bytes,
    Int,
    Float,
    Link,
    Struct,
    Map,
    List,
    Union,
}

impl TypeKind {
    /// The data model kind of values of this type in their native (type-level) view.
    ///
    /// Structs and unions behave like maps keyed by field or member name.
    pub const fn native_kind(self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::String => Kind::String,
            Self::Bytes => Kind::Bytes,
            Self::Int => Kind::Int,
            Self::Float => Kind::Float,
            Self::Link => Kind::Link,
            Self::Struct | Self::Map | Self::Union => Kind::Map,
            Self::List => Kind::List,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Int => "int",
            Self::Float => "float",
            Self::Link => "link",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::List => "list",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
