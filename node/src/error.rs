use thiserror::Error;

use ipld_schema::Kind;

/// Errors from reading or assembling nodes.
///
/// These describe bad *data*; misuse of the protocol itself (assigning twice, building before
/// finishing, unboxing an empty [`Maybe`](crate::Maybe)) panics instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NodeError {
    /// `expected` lists the kinds the node or assembler accepts, `actual` the kind it was given
    /// or holds.
    #[error("{method} on {type_name}: got kind {actual}, expected {}", list_kinds(.expected))]
    WrongKind {
        type_name: String,
        method: &'static str,
        expected: Vec<Kind>,
        actual: Kind,
    },
    #[error("{type_name} cannot be null here")]
    NotNullable { type_name: String },
    #[error("type {type_name} has no field {field:?}")]
    NoSuchField { type_name: String, field: String },
    #[error("union {type_name} has no member {member:?}")]
    NoSuchMember { type_name: String, member: String },
    #[error("key {key:?} repeated in {type_name}")]
    RepeatedKey { type_name: String, key: String },
    #[error("{type_name} is missing required fields {fields:?}")]
    MissingRequiredFields {
        type_name: String,
        fields: Vec<String>,
    },
    #[error("union {type_name} already has a member")]
    UnionAlreadySet { type_name: String },
    #[error("union {type_name} needs exactly one member")]
    UnionEmpty { type_name: String },
    #[error("{type_name} takes at most {max} elements")]
    TooManyElements { type_name: String, max: usize },
    #[error("{type_name} joins {expected} fields, but {value:?} has {actual}")]
    StringjoinArity {
        type_name: String,
        expected: usize,
        actual: usize,
        value: String,
    },
    #[error("field {field:?} of {type_name} is {value:?}, which contains the delimiter {join:?}")]
    StringjoinDelimiterInField {
        type_name: String,
        field: String,
        value: String,
        join: String,
    },
    #[error("cannot assign an absent value to {type_name}")]
    AbsentValue { type_name: String },
    #[error("key {key:?} not found in {type_name}")]
    KeyNotFound { type_name: String, key: String },
    #[error("index {index} out of range for {type_name} of length {length}")]
    IndexOutOfRange {
        type_name: String,
        index: usize,
        length: usize,
    },
}

fn list_kinds(kinds: &[Kind]) -> String {
    let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
    names.join(" or ")
}
