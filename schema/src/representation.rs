//! Representation strategies: how the native shape of a type maps onto the data model shape it is
//! serialized as.
//!
//! Scalar kinds always represent as themselves and carry no strategy value. The constructors in
//! this module reject duplicate keys with a panic; the inputs they consume come from keyed
//! structures upstream, so a duplicate means the producer is broken, not the schema.

use std::collections::{HashMap, HashSet};

use super::{
    kind::Kind,
    names::{FieldName, TypeName},
};

#[derive(Clone, Debug)]
pub enum StructRepresentation {
    /// Fields become map entries, keyed by field name unless renamed.
    Map(StructRepresentationMap),
    /// Fields become list elements in declaration order.
    Tuple,
    /// Fields are string-represented and joined with a delimiter.
    Stringjoin(StructRepresentationStringjoin),
}

impl StructRepresentation {
    /// Map representation without any renames or implicit values.
    pub fn map() -> Self {
        Self::Map(StructRepresentationMap::default())
    }

    pub fn stringjoin(join: impl Into<String>) -> Self {
        Self::Stringjoin(StructRepresentationStringjoin { join: join.into() })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Map(_) => Kind::Map,
            Self::Tuple => Kind::List,
            Self::Stringjoin(_) => Kind::String,
        }
    }
}

/// Per-field details for the map representation of a struct.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldDetails {
    /// The key used in the representation instead of the field name.
    pub rename: Option<String>,
    /// The value assumed when the key is missing from the representation, and omitted from the
    /// representation when the field holds it.
    pub implicit: Option<ImplicitValue>,
}

impl FieldDetails {
    pub fn renamed(rename: impl Into<String>) -> Self {
        Self {
            rename: Some(rename.into()),
            implicit: None,
        }
    }

    pub fn implicit(value: ImplicitValue) -> Self {
        Self {
            rename: None,
            implicit: Some(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImplicitValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl ImplicitValue {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::String(_) => Kind::String,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StructRepresentationMap {
    field_details: HashMap<FieldName, FieldDetails>,
}

impl StructRepresentationMap {
    /// Panics if a field name appears twice.
    pub fn new(entries: impl IntoIterator<Item = (FieldName, FieldDetails)>) -> Self {
        let mut field_details = HashMap::new();
        for (field_name, details) in entries {
            if field_details.contains_key(&field_name) {
                panic!("field name {field_name:?} duplicated");
            }
            field_details.insert(field_name, details);
        }
        Self { field_details }
    }

    pub fn details(&self, field: &str) -> Option<&FieldDetails> {
        self.field_details.get(field)
    }

    /// The representation key of `field`.
    pub fn serial_key<'a>(&'a self, field: &'a str) -> &'a str {
        self.details(field)
            .and_then(|d| d.rename.as_deref())
            .unwrap_or(field)
    }

    pub fn implicit(&self, field: &str) -> Option<&ImplicitValue> {
        self.details(field).and_then(|d| d.implicit.as_ref())
    }

    pub(crate) fn detailed_fields(&self) -> impl Iterator<Item = &str> {
        self.field_details.keys().map(String::as_str)
    }
}

#[derive(Clone, Debug)]
pub struct StructRepresentationStringjoin {
    join: String,
}

impl StructRepresentationStringjoin {
    pub fn join(&self) -> &str {
        &self.join
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapRepresentation {
    Map,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListRepresentation {
    List,
}

#[derive(Clone, Debug)]
pub enum UnionRepresentation {
    /// A single-entry map whose key is the discriminant of the present member.
    Keyed(UnionDiscriminantStringTable),
    /// The member's own representation, told apart by its data model kind.
    Kinded(UnionKindedTable),
}

impl UnionRepresentation {
    /// The member names the representation table refers to.
    pub(crate) fn table_members(&self) -> HashSet<&TypeName> {
        match self {
            Self::Keyed(table) => table.entries.values().collect(),
            Self::Kinded(table) => table.entries.values().collect(),
        }
    }

    /// Members named by more than one table entry, with those entries' keys, both sorted.
    pub(crate) fn repeated_targets(&self) -> Vec<(&TypeName, Vec<String>)> {
        let mut by_member: HashMap<&TypeName, Vec<String>> = HashMap::new();
        match self {
            Self::Keyed(table) => {
                for (discriminant, member) in &table.entries {
                    by_member.entry(member).or_default().push(discriminant.clone());
                }
            }
            Self::Kinded(table) => {
                for (kind, member) in &table.entries {
                    by_member.entry(member).or_default().push(kind.to_string());
                }
            }
        }
        let mut repeated: Vec<_> = by_member
            .into_iter()
            .filter(|(_, keys)| keys.len() > 1)
            .map(|(member, mut keys)| {
                keys.sort_unstable();
                (member, keys)
            })
            .collect();
        repeated.sort_unstable();
        repeated
    }
}

/// Carrier for the discriminant table of a keyed union.
#[derive(Clone, Debug)]
pub struct UnionDiscriminantStringTable {
    entries: HashMap<String, TypeName>,
}

impl UnionDiscriminantStringTable {
    /// Panics if a discriminant appears twice.
    pub fn new<D, M>(entries: impl IntoIterator<Item = (D, M)>) -> Self
    where
        D: Into<String>,
        M: Into<TypeName>,
    {
        let mut map = HashMap::new();
        for (discriminant, member) in entries {
            let discriminant = discriminant.into();
            if map.contains_key(&discriminant) {
                panic!("discriminant string {discriminant:?} duplicated");
            }
            map.insert(discriminant, member.into());
        }
        Self { entries: map }
    }

    pub fn member_for(&self, discriminant: &str) -> Option<&TypeName> {
        self.entries.get(discriminant)
    }

    pub fn discriminant_for(&self, member: &TypeName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, m)| *m == member)
            .map(|(d, _)| d.as_str())
    }
}

/// Carrier for the kind table of a kinded union.
#[derive(Clone, Debug)]
pub struct UnionKindedTable {
    entries: HashMap<Kind, TypeName>,
}

impl UnionKindedTable {
    /// Panics if a kind appears twice.
    pub fn new<M: Into<TypeName>>(entries: impl IntoIterator<Item = (Kind, M)>) -> Self {
        let mut map = HashMap::new();
        for (kind, member) in entries {
            if map.contains_key(&kind) {
                panic!("kind {kind} duplicated");
            }
            map.insert(kind, member.into());
        }
        Self { entries: map }
    }

    pub fn member_for(&self, kind: Kind) -> Option<&TypeName> {
        self.entries.get(&kind)
    }

    pub fn kind_for(&self, member: &TypeName) -> Option<Kind> {
        self.entries
            .iter()
            .find(|(_, m)| *m == member)
            .map(|(k, _)| *k)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Kind, &TypeName)> {
        self.entries.iter().map(|(k, m)| (*k, m))
    }
}
