use std::collections::HashMap;
use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};

use super::{
    names::{TypeName, TypeReference},
    types::Type,
};

/// Index of a [`Type`] within its [`TypeSystem`].
///
/// This is how types and values point back at the type system they belong to without owning
/// it: the id is only meaningful together with the system that issued it.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypeId(NonZeroU32);

impl TypeId {
    fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("Could not convert type id to usize index");
        usize::from(size) - 1
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Type #{}>", self.0)
    }
}

/// The table the [`Compiler`](crate::Compiler) fills in while types are being declared.
///
/// Slots are `Option`s because a struct needs its own [`TypeId`] (for its fields' parent
/// reference) before its descriptor exists.
#[derive(Default)]
pub(crate) struct ConstructionTypeTable {
    types: Vec<Option<Type>>,
    by_reference: HashMap<TypeReference, TypeId>,
    named: Vec<TypeId>,
}

impl ConstructionTypeTable {
    pub(crate) fn lookup_id(&self, reference: &str) -> Option<TypeId> {
        self.by_reference.get(reference).copied()
    }

    pub(crate) fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn lookup(&self, reference: &str) -> Option<&Type> {
        self.lookup_id(reference).and_then(|id| self.get(id))
    }

    /// All present types, anonymous ones included, in the order their slots were reserved.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter().flatten()
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    /// Creates a [`TypeId`] which points to an absent, reserved slot in the table.
    pub(crate) fn reserve(&mut self) -> TypeId {
        self.types.push(None);

        // We use the size for the id, which is non-zero after the push
        let size = NonZeroUsize::new(self.types.len()).expect("table is non-empty after push");
        let id: NonZeroU32 = size.try_into().expect("ID did not fit into 32-bit integer");

        TypeId(id)
    }

    /// Puts `ty` into the slot of `id`, which may already be occupied.
    pub(crate) fn insert(&mut self, id: TypeId, ty: Type) {
        let slot = self
            .types
            .get_mut(id.index())
            .expect("Invalid type id (out-of-bounds)");
        *slot = Some(ty);
    }

    /// Makes `id` findable under `reference`; named references are also enumerated, in
    /// registration order.
    pub(crate) fn register(&mut self, reference: TypeReference, id: TypeId) {
        if !reference.is_anonymous() {
            self.named.push(id);
        }
        self.by_reference.insert(reference, id);
    }

    /// Tries to convert this table to a frozen [`TypeSystem`].
    /// If a reserved slot was never filled, `None` is returned instead.
    pub(crate) fn into_type_system(self) -> Option<TypeSystem> {
        let mut types = Vec::with_capacity(self.types.len());
        for ty in self.types {
            types.push(ty?);
        }
        Some(TypeSystem {
            types: types.into_boxed_slice(),
            by_reference: self.by_reference,
            named: self.named.into_boxed_slice(),
        })
    }
}

/// An immutable, validated set of types.
///
/// Only a successful [`Compiler::compile`](crate::Compiler::compile) produces one, and nothing can
/// be added or changed afterwards, so it can be shared freely between readers.
pub struct TypeSystem {
    types: Box<[Type]>,
    by_reference: HashMap<TypeReference, TypeId>,
    named: Box<[TypeId]>,
}

impl TypeSystem {
    /// Looks up a type by name or anonymous type reference.
    pub fn lookup(&self, reference: &str) -> Option<&Type> {
        self.lookup_id(reference).map(|id| self.get(id))
    }

    pub fn lookup_id(&self, reference: &str) -> Option<TypeId> {
        self.by_reference.get(reference).copied()
    }

    /// Retrieves a type by id. Panics if the id was issued by a different type system.
    pub fn get(&self, id: TypeId) -> &Type {
        self.types
            .get(id.index())
            .expect("Invalid type id (out-of-bounds)")
    }

    /// The named types, in declaration order. Anonymous types are not included.
    pub fn types(&self) -> impl Iterator<Item = (&TypeName, &Type)> + '_ {
        self.named.iter().map(|id| {
            let ty = self.get(*id);
            (ty.name(), ty)
        })
    }

    /// Number of named types.
    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

impl fmt::Debug for TypeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.types()).finish()
    }
}
