//! Schema-typed nodes.
//!
//! A single engine serves every type of every [`TypeSystem`]: nodes and assemblers carry the type
//! system, the [`TypeId`] of their type and the [`View`] they present, and dispatch on the type's
//! descriptor at run time. Values are shared immutable trees, so handing out a child or copying
//! a node between assemblers of the same type never clones data.

mod assembler;
mod builder;
mod prototype;
mod typed_node;
mod value;

pub use assembler::{ListAssembler, MapAssembler, NodeAssembler};
pub use builder::NodeBuilder;
pub use prototype::NodePrototype;
pub use typed_node::TypedNode;

use ipld_schema::{StructRepresentation, Type, TypeId, TypeSystem, UnionRepresentation};

/// Which face of a typed value a node or assembler presents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum View {
    /// The type-level shape: structs and unions look like maps keyed by field or member name.
    Type,
    /// The serialized shape, as chosen by the type's representation strategy.
    Representation,
}

/// How a type looks from a given view; what node and assembler operations dispatch on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Face {
    Scalar,
    StructNative,
    StructMap,
    StructTuple,
    StructStringjoin,
    Map,
    List,
    UnionNative,
    UnionKeyed,
    UnionKinded,
}

pub(crate) fn face(ty: &Type, view: View) -> Face {
    match (ty, view) {
        (Type::Struct(_), View::Type) => Face::StructNative,
        (Type::Struct(t), View::Representation) => match t.representation() {
            StructRepresentation::Map(_) => Face::StructMap,
            StructRepresentation::Tuple => Face::StructTuple,
            StructRepresentation::Stringjoin(_) => Face::StructStringjoin,
        },
        (Type::Union(_), View::Type) => Face::UnionNative,
        (Type::Union(t), View::Representation) => match t.representation() {
            UnionRepresentation::Keyed(_) => Face::UnionKeyed,
            UnionRepresentation::Kinded(_) => Face::UnionKinded,
        },
        (Type::Map(_), _) => Face::Map,
        (Type::List(_), _) => Face::List,
        _ => Face::Scalar,
    }
}

/// Name of a type as seen from `view`, for error messages.
pub(crate) fn type_label(ty: &Type, view: View) -> String {
    match view {
        View::Type => ty.name().to_string(),
        View::Representation => format!("{}.Repr", ty.name()),
    }
}

/// Resolves a type reference or member name found inside a compiled type system.
pub(crate) fn resolve(ts: &TypeSystem, reference: &str) -> TypeId {
    ts.lookup_id(reference)
        .expect("compiled type systems have no dangling references")
}
