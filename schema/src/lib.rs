//! Schema type systems: type descriptors, representation strategies, and the [`Compiler`] that
//! validates a group of declarations into an immutable [`TypeSystem`].

pub mod compiler;
pub mod error;
pub mod kind;
pub mod names;
pub mod prelude;
pub mod representation;
pub mod type_system;
pub mod types;

mod validation;

pub use compiler::Compiler;
pub use error::{CompileErrors, ReferenceSite, ValidationError};
pub use kind::{Kind, TypeKind};
pub use names::{FieldName, TypeName, TypeReference};
pub use representation::{
    FieldDetails, ImplicitValue, ListRepresentation, MapRepresentation, StructRepresentation,
    StructRepresentationMap, StructRepresentationStringjoin, UnionDiscriminantStringTable,
    UnionKindedTable, UnionRepresentation,
};
pub use type_system::{TypeId, TypeSystem};
pub use types::{
    StructField, StructFieldList, Type, TypeBool, TypeBytes, TypeFloat, TypeInt, TypeLink,
    TypeList, TypeMap, TypeString, TypeStruct, TypeUnion, UnionMemberList,
};

/// Whether [`Compiler::new`] pre-declares the prelude types (see [`prelude`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterPrelude {
    Yes,
    No,
}

/// What happens when a declaration reuses the name of a prelude type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PreludeOverwriteAction {
    /// Panic, like any other duplicate type name.
    Deny,
    /// Replace the prelude type and log a warning.
    Warn,
    /// Replace the prelude type.
    Allow,
}
