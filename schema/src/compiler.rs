use std::collections::HashSet;

use tracing::{debug, trace, warn};

use super::{
    error::CompileErrors,
    names::{TypeName, TypeReference},
    prelude,
    representation::{
        ListRepresentation, MapRepresentation, StructRepresentation, UnionRepresentation,
    },
    type_system::{ConstructionTypeTable, TypeId, TypeSystem},
    types::{
        StructFieldList, Type, TypeBool, TypeBytes, TypeFloat, TypeInt, TypeLink, TypeList,
        TypeMap, TypeString, TypeStruct, TypeUnion, UnionMemberList,
    },
    validation, PreludeOverwriteAction, RegisterPrelude,
};

/// Builds a [`TypeSystem`] from type declarations.
///
/// Most problems can only be detected once every type has been declared (a reference may point
/// at a type declared later), so the `declare_*` methods do not return errors; everything is
/// reported at once by [`compile`](Self::compile).
///
/// A few problems panic immediately instead: reusing a type name, and repeating a struct field
/// name. These cannot occur when the declarations are produced from a keyed description of the
/// schema (where type names and field names are map keys), so hitting them means the producer is
/// broken. Repeated union members *can* occur in well-formed input (member lists are lists), and
/// are therefore reported as validation errors.
pub struct Compiler {
    table: ConstructionTypeTable,
    prelude_overwrite: PreludeOverwriteAction,
    /// Types that are still the prelude's own and may be overwritten per `prelude_overwrite`
    prelude_ids: HashSet<TypeId>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(RegisterPrelude::No, PreludeOverwriteAction::Deny)
    }
}

impl Compiler {
    pub fn new(register_prelude: RegisterPrelude, prelude_overwrite: PreludeOverwriteAction) -> Self {
        let mut compiler = Self {
            table: ConstructionTypeTable::default(),
            prelude_overwrite,
            prelude_ids: HashSet::new(),
        };
        if register_prelude == RegisterPrelude::Yes {
            prelude::register_prelude(&mut compiler);
            compiler.prelude_ids = prelude::prelude_names()
                .iter()
                .filter_map(|name| compiler.table.lookup_id(name.as_str()))
                .collect();
        }
        compiler
    }

    /// Finds the slot a type named `name` goes into. Panics if the name is taken, unless it is
    /// held by a prelude type that may be overwritten.
    fn claim_name(&mut self, name: &TypeName) -> TypeId {
        assert!(!name.as_str().is_empty(), "type name must not be empty");
        assert!(
            !name.is_reserved(),
            "type name {name:?} uses the syntax of anonymous type references"
        );

        let Some(existing) = self.table.lookup_id(name.as_str()) else {
            let id = self.table.reserve();
            self.table.register(name.into(), id);
            return id;
        };

        if !self.prelude_ids.remove(&existing) {
            panic!("type name {name:?} already used");
        }
        match self.prelude_overwrite {
            PreludeOverwriteAction::Deny => {
                panic!("Tried to overwrite prelude type: {name}");
            }
            PreludeOverwriteAction::Warn => {
                warn!(type_name = %name, "overwriting prelude type");
            }
            PreludeOverwriteAction::Allow => {}
        }
        existing
    }

    fn add_type(&mut self, name: TypeName, make: impl FnOnce(TypeId, TypeName) -> Type) {
        let id = self.claim_name(&name);
        let ty = make(id, name);
        trace!(type_name = %ty.name(), kind = %ty.kind(), "declared type");
        self.table.insert(id, ty);
    }

    pub fn declare_bool(&mut self, name: impl Into<TypeName>) {
        self.add_type(name.into(), |_, name| Type::Bool(TypeBool { name }));
    }

    pub fn declare_string(&mut self, name: impl Into<TypeName>) {
        self.add_type(name.into(), |_, name| Type::String(TypeString { name }));
    }

    pub fn declare_bytes(&mut self, name: impl Into<TypeName>) {
        self.add_type(name.into(), |_, name| Type::Bytes(TypeBytes { name }));
    }

    pub fn declare_int(&mut self, name: impl Into<TypeName>) {
        self.add_type(name.into(), |_, name| Type::Int(TypeInt { name }));
    }

    pub fn declare_float(&mut self, name: impl Into<TypeName>) {
        self.add_type(name.into(), |_, name| Type::Float(TypeFloat { name }));
    }

    /// Declares a link type; `expected_type` constrains what the links should point to.
    pub fn declare_link(&mut self, name: impl Into<TypeName>, expected_type: Option<TypeName>) {
        self.add_type(name.into(), |_, name| {
            Type::Link(TypeLink {
                name,
                expected_type,
            })
        });
    }

    /// Panics if two fields share a name.
    pub fn declare_struct(
        &mut self,
        name: impl Into<TypeName>,
        fields: StructFieldList,
        representation: StructRepresentation,
    ) {
        self.add_type(name.into(), |id, name| {
            Type::Struct(TypeStruct::new(id, name, fields, representation))
        });
    }

    pub fn declare_map(
        &mut self,
        name: impl Into<TypeName>,
        key_type: impl Into<TypeName>,
        value_type: impl Into<TypeReference>,
        value_nullable: bool,
        representation: MapRepresentation,
    ) {
        let key_type = key_type.into();
        let value_type = value_type.into();
        self.add_type(name.into(), |_, name| {
            Type::Map(TypeMap {
                name,
                key_type,
                value_type,
                value_nullable,
                representation,
            })
        });
    }

    pub fn declare_list(
        &mut self,
        name: impl Into<TypeName>,
        value_type: impl Into<TypeReference>,
        value_nullable: bool,
        representation: ListRepresentation,
    ) {
        let value_type = value_type.into();
        self.add_type(name.into(), |_, name| {
            Type::List(TypeList {
                name,
                value_type,
                value_nullable,
                representation,
            })
        });
    }

    /// Repeated members are accepted here and reported by [`compile`](Self::compile).
    pub fn declare_union(
        &mut self,
        name: impl Into<TypeName>,
        members: UnionMemberList,
        representation: UnionRepresentation,
    ) {
        self.add_type(name.into(), |_, name| {
            Type::Union(TypeUnion::new(name, members, representation))
        });
    }

    /// Declares the anonymous map type with the given shape and returns the reference naming it.
    /// Anonymous types can be looked up but are not enumerated. Declaring the same shape again
    /// returns the same reference.
    pub fn declare_anonymous_map(
        &mut self,
        key_type: impl Into<TypeName>,
        value_type: impl Into<TypeReference>,
        value_nullable: bool,
    ) -> TypeReference {
        let key_type = key_type.into();
        let value_type = value_type.into();
        let reference = TypeReference::anonymous_map(&key_type, &value_type, value_nullable);
        if self.table.lookup_id(reference.as_str()).is_none() {
            let ty = Type::Map(TypeMap {
                name: TypeName::new(reference.as_str()),
                key_type,
                value_type,
                value_nullable,
                representation: MapRepresentation::Map,
            });
            self.add_anonymous_type(reference.clone(), ty);
        }
        reference
    }

    /// List counterpart of [`declare_anonymous_map`](Self::declare_anonymous_map).
    pub fn declare_anonymous_list(
        &mut self,
        value_type: impl Into<TypeReference>,
        value_nullable: bool,
    ) -> TypeReference {
        let value_type = value_type.into();
        let reference = TypeReference::anonymous_list(&value_type, value_nullable);
        if self.table.lookup_id(reference.as_str()).is_none() {
            let ty = Type::List(TypeList {
                name: TypeName::new(reference.as_str()),
                value_type,
                value_nullable,
                representation: ListRepresentation::List,
            });
            self.add_anonymous_type(reference.clone(), ty);
        }
        reference
    }

    fn add_anonymous_type(&mut self, reference: TypeReference, ty: Type) {
        trace!(type_ref = %reference, "declared anonymous type");
        let id = self.table.reserve();
        self.table.insert(id, ty);
        self.table.register(reference, id);
    }

    /// Validates the declared types as a whole.
    ///
    /// On success the returned [`TypeSystem`] is immutable. On failure every problem found is
    /// returned and the declared types are dropped. Either way the compiler is consumed.
    pub fn compile(self) -> Result<TypeSystem, CompileErrors> {
        debug!(types = self.table.len(), "validating type system");
        let errors = validation::validate(&self.table);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "type system failed validation");
            return Err(CompileErrors::new(errors));
        }

        let ts = self
            .table
            .into_type_system()
            .expect("every reserved type slot is filled by its declaration");
        debug!(types = ts.len(), "compiled type system");
        Ok(ts)
    }
}
