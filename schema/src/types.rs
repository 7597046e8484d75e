//! Type descriptors, one per schema kind.
//!
//! Descriptors have no mutating methods. Shape data that arrives as a collection is handed over
//! through carrier types ([`StructFieldList`], [`UnionMemberList`]) whose storage is moved into
//! the descriptor and never handed out mutably again.

use std::collections::HashMap;

use super::{
    kind::{Kind, TypeKind},
    names::{FieldName, TypeName, TypeReference},
    representation::{
        ListRepresentation, MapRepresentation, StructRepresentation, UnionRepresentation,
    },
    type_system::TypeId,
};

/// A type of a [`TypeSystem`](crate::TypeSystem).
#[derive(Clone, Debug)]
pub enum Type {
    Bool(TypeBool),
    String(TypeString),
    Bytes(TypeBytes),
    Int(TypeInt),
    Float(TypeFloat),
    Link(TypeLink),
    Struct(TypeStruct),
    Map(TypeMap),
    List(TypeList),
    Union(TypeUnion),
}

impl Type {
    pub fn name(&self) -> &TypeName {
        match self {
            Self::Bool(t) => &t.name,
            Self::String(t) => &t.name,
            Self::Bytes(t) => &t.name,
            Self::Int(t) => &t.name,
            Self::Float(t) => &t.name,
            Self::Link(t) => &t.name,
            Self::Struct(t) => &t.name,
            Self::Map(t) => &t.name,
            Self::List(t) => &t.name,
            Self::Union(t) => &t.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Bool(_) => TypeKind::Bool,
            Self::String(_) => TypeKind::String,
            Self::Bytes(_) => TypeKind::Bytes,
            Self::Int(_) => TypeKind::Int,
            Self::Float(_) => TypeKind::Float,
            Self::Link(_) => TypeKind::Link,
            Self::Struct(_) => TypeKind::Struct,
            Self::Map(_) => TypeKind::Map,
            Self::List(_) => TypeKind::List,
            Self::Union(_) => TypeKind::Union,
        }
    }

    /// The data model kind of the representation view of values of this type.
    ///
    /// `None` for kinded unions, whose representation kind is that of whichever member is present.
    pub fn representation_kind(&self) -> Option<Kind> {
        match self {
            Self::Struct(t) => Some(t.representation.kind()),
            Self::Union(t) => match t.representation {
                UnionRepresentation::Keyed(_) => Some(Kind::Map),
                UnionRepresentation::Kinded(_) => None,
            },
            _ => Some(self.kind().native_kind()),
        }
    }

    pub fn as_link(&self) -> Option<&TypeLink> {
        match self {
            Self::Link(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&TypeStruct> {
        match self {
            Self::Struct(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&TypeMap> {
        match self {
            Self::Map(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TypeList> {
        match self {
            Self::List(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&TypeUnion> {
        match self {
            Self::Union(t) => Some(t),
            _ => None,
        }
    }
}

macro_rules! scalar_type {
    ($(#[$meta:meta])* $type_name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $type_name {
            pub(crate) name: TypeName,
        }

        impl $type_name {
            pub fn name(&self) -> &TypeName {
                &self.name
            }
        }
    };
}

scalar_type!(TypeBool);
scalar_type!(TypeString);
scalar_type!(TypeBytes);
scalar_type!(
    /// Integers are held as `i64`.
    TypeInt
);
scalar_type!(TypeFloat);

#[derive(Clone, Debug)]
pub struct TypeLink {
    pub(crate) name: TypeName,
    pub(crate) expected_type: Option<TypeName>,
}

impl TypeLink {
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// The type links of this type are expected to point to, if constrained.
    pub fn expected_type(&self) -> Option<&TypeName> {
        self.expected_type.as_ref()
    }
}

#[derive(Clone, Debug)]
pub struct StructField {
    name: FieldName,
    type_ref: TypeReference,
    optional: bool,
    nullable: bool,
    parent: Option<TypeId>,
}

impl StructField {
    pub fn new(
        name: impl Into<FieldName>,
        type_ref: impl Into<TypeReference>,
        optional: bool,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            optional,
            nullable,
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &TypeReference {
        &self.type_ref
    }

    /// Whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the field may hold null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The struct this field belongs to; `None` until the field list has been declared.
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }
}

/// Carrier for the fields of a struct declaration.
#[derive(Debug)]
pub struct StructFieldList(Vec<StructField>);

impl StructFieldList {
    pub fn new(fields: impl IntoIterator<Item = StructField>) -> Self {
        Self(fields.into_iter().collect())
    }
}

#[derive(Clone, Debug)]
pub struct TypeStruct {
    pub(crate) name: TypeName,
    fields: Box<[StructField]>,
    fields_by_name: HashMap<FieldName, usize>,
    pub(crate) representation: StructRepresentation,
}

impl TypeStruct {
    /// Panics on a duplicate field name: field lists are produced from keyed data upstream, so
    /// names are already unique when the input is well formed.
    pub(crate) fn new(
        id: TypeId,
        name: TypeName,
        fields: StructFieldList,
        representation: StructRepresentation,
    ) -> Self {
        let mut fields = fields.0;
        let mut fields_by_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter_mut().enumerate() {
            if fields_by_name.contains_key(&field.name) {
                panic!("type \"{name}\" already has field named {:?}", field.name);
            }
            fields_by_name.insert(field.name.clone(), index);
            field.parent = Some(id);
        }
        Self {
            name,
            fields: fields.into_boxed_slice(),
            fields_by_name,
            representation,
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields_by_name.get(name).copied()
    }

    /// Index of the field whose map representation key is `key`; for other strategies the key
    /// is the field name.
    pub fn field_for_serial_key(&self, key: &str) -> Option<usize> {
        match &self.representation {
            StructRepresentation::Map(repr) => self
                .fields
                .iter()
                .position(|f| repr.serial_key(&f.name) == key),
            _ => self.field_index(key),
        }
    }

    pub fn representation(&self) -> &StructRepresentation {
        &self.representation
    }
}

#[derive(Clone, Debug)]
pub struct TypeMap {
    pub(crate) name: TypeName,
    pub(crate) key_type: TypeName,
    pub(crate) value_type: TypeReference,
    pub(crate) value_nullable: bool,
    pub(crate) representation: MapRepresentation,
}

impl TypeMap {
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn key_type(&self) -> &TypeName {
        &self.key_type
    }

    pub fn value_type(&self) -> &TypeReference {
        &self.value_type
    }

    pub fn is_value_nullable(&self) -> bool {
        self.value_nullable
    }

    pub fn representation(&self) -> &MapRepresentation {
        &self.representation
    }
}

#[derive(Clone, Debug)]
pub struct TypeList {
    pub(crate) name: TypeName,
    pub(crate) value_type: TypeReference,
    pub(crate) value_nullable: bool,
    pub(crate) representation: ListRepresentation,
}

impl TypeList {
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn value_type(&self) -> &TypeReference {
        &self.value_type
    }

    pub fn is_value_nullable(&self) -> bool {
        self.value_nullable
    }

    pub fn representation(&self) -> &ListRepresentation {
        &self.representation
    }
}

/// Carrier for the members of a union declaration.
///
/// Unlike [`StructFieldList`], repeated members are accepted here and reported when the type
/// system is compiled: member lists are lists upstream too, so repeats are a schema error rather
/// than a producer bug.
#[derive(Debug)]
pub struct UnionMemberList(Vec<TypeName>);

impl UnionMemberList {
    pub fn new<M: Into<TypeName>>(members: impl IntoIterator<Item = M>) -> Self {
        Self(members.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug)]
pub struct TypeUnion {
    pub(crate) name: TypeName,
    members: Box<[TypeName]>,
    pub(crate) representation: UnionRepresentation,
}

impl TypeUnion {
    pub(crate) fn new(
        name: TypeName,
        members: UnionMemberList,
        representation: UnionRepresentation,
    ) -> Self {
        Self {
            name,
            members: members.0.into_boxed_slice(),
            representation,
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn members(&self) -> &[TypeName] {
        &self.members
    }

    /// Position of the first occurrence of `member` in the member list.
    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m.as_str() == member)
    }

    pub fn representation(&self) -> &UnionRepresentation {
        &self.representation
    }
}
