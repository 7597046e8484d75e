use std::fmt;

use thiserror::Error;

use super::{
    kind::{Kind, TypeKind},
    names::{FieldName, TypeName, TypeReference},
};

/// Where in a type declaration a [`TypeReference`] was used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceSite {
    StructField(FieldName),
    MapKey,
    MapValue,
    ListValue,
    LinkTarget,
    UnionMember,
}

impl fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructField(field) => write!(f, "field {field:?}"),
            Self::MapKey => f.write_str("map key"),
            Self::MapValue => f.write_str("map value"),
            Self::ListValue => f.write_str("list value"),
            Self::LinkTarget => f.write_str("link target"),
            Self::UnionMember => f.write_str("union member"),
        }
    }
}

/// A problem found while validating a type system as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("type {in_type} refers to undeclared type {target} ({site})")]
    DanglingReference {
        in_type: TypeName,
        site: ReferenceSite,
        target: TypeReference,
    },
    #[error("union {union} lists member {member} more than once")]
    DuplicateUnionMember { union: TypeName, member: TypeName },
    #[error(
        "representation table of union {union} does not match its members \
         (missing from table: {missing:?}, not a member: {extraneous:?})"
    )]
    DiscriminantTableMismatch {
        union: TypeName,
        missing: Vec<TypeName>,
        extraneous: Vec<TypeName>,
    },
    #[error(
        "representation table of union {union} maps {keys:?} to the same member {member}"
    )]
    DuplicateDiscriminantTarget {
        union: TypeName,
        member: TypeName,
        keys: Vec<String>,
    },
    #[error("map {map} has key type {key} of kind {kind}, which is not representable as a string")]
    MapKeyNotStringRepresentable {
        map: TypeName,
        key: TypeName,
        kind: TypeKind,
    },
    #[error("representation of struct {struct_name} has details for unknown field {field:?}")]
    UnknownRepresentationField {
        struct_name: TypeName,
        field: FieldName,
    },
    #[error("representation of struct {struct_name} uses key {key:?} for more than one field")]
    DuplicateSerialKey { struct_name: TypeName, key: String },
    #[error("field {field:?} of struct {struct_name} is optional and cannot have an implicit value")]
    ImplicitOnOptionalField {
        struct_name: TypeName,
        field: FieldName,
    },
    #[error(
        "implicit value of field {field:?} of struct {struct_name} is a {implicit}, \
         but the field's type is {actual}"
    )]
    ImplicitKindMismatch {
        struct_name: TypeName,
        field: FieldName,
        implicit: Kind,
        actual: TypeKind,
    },
    #[error(
        "field {field:?} of tuple-represented struct {struct_name} is optional but followed by a \
         required field"
    )]
    TupleOptionalFieldNotTrailing {
        struct_name: TypeName,
        field: FieldName,
    },
    #[error("stringjoin representation of struct {struct_name} has an empty delimiter")]
    EmptyJoinDelimiter { struct_name: TypeName },
    #[error(
        "field {field:?} of stringjoin-represented struct {struct_name} must be required, \
         non-nullable and represented as a string"
    )]
    StringjoinFieldNotString {
        struct_name: TypeName,
        field: FieldName,
    },
    #[error(
        "kinded union {union} expects member {member} to be represented as {declared}, \
         but it is represented as {}", .actual.map(Kind::name).unwrap_or("varying kinds")
    )]
    KindedMemberKindMismatch {
        union: TypeName,
        member: TypeName,
        declared: Kind,
        actual: Option<Kind>,
    },
}

/// Every [`ValidationError`] found by one [`Compiler::compile`](crate::Compiler::compile) call.
/// Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileErrors(Vec<ValidationError>);

impl CompileErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type system is invalid ({} errors)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl IntoIterator for CompileErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
