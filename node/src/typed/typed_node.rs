use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use ipld_schema::{
    ImplicitValue, Kind, StructRepresentation, Type, TypeId, TypeList, TypeMap, TypeName,
    TypeReference, TypeStruct, TypeSystem, TypeUnion, UnionRepresentation,
};

use super::{face, resolve, type_label, value::Value, Face, View};
use crate::{
    error::NodeError,
    link::Link,
    maybe::Maybe,
    node::{wrong_kind, AbsentNode, ListIter, MapIter, Node, NullNode},
};

type Slots = [Maybe<Arc<Value>>];

/// A value of a schema type, read through one of its [`View`]s.
///
/// Cloning is cheap: the type system and the value are shared.
#[derive(Clone)]
pub struct TypedNode {
    pub(crate) ts: Arc<TypeSystem>,
    pub(crate) id: TypeId,
    pub(crate) view: View,
    pub(crate) value: Arc<Value>,
}

impl TypedNode {
    pub fn type_(&self) -> &Type {
        self.ts.get(self.id)
    }

    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// The same value, read in its serialized shape.
    pub fn representation(&self) -> TypedNode {
        Self {
            view: View::Representation,
            ..self.clone()
        }
    }

    /// A struct field, by field name, in the tri-state form.
    pub fn field(&self, name: &str) -> Result<Maybe<TypedNode>, NodeError> {
        let Some((t, values)) = self.struct_parts() else {
            return Err(wrong_kind(self, "field", Kind::Map));
        };
        let index = t.field_index(name).ok_or_else(|| NodeError::NoSuchField {
            type_name: self.label(),
            field: name.to_string(),
        })?;
        Ok(self.child_maybe(t.fields()[index].type_ref(), &values[index]))
    }

    /// The present member of a union and its type name.
    pub fn member(&self) -> Result<(&TypeName, TypedNode), NodeError> {
        let Some((t, member, value)) = self.union_parts() else {
            return Err(wrong_kind(self, "member", Kind::Map));
        };
        let name = &t.members()[member];
        Ok((name, self.child(resolve(&self.ts, name.as_str()), value)))
    }

    fn label(&self) -> String {
        type_label(self.type_(), self.view)
    }

    fn face(&self) -> Face {
        face(self.type_(), self.view)
    }

    fn child(&self, id: TypeId, value: &Arc<Value>) -> TypedNode {
        TypedNode {
            ts: Arc::clone(&self.ts),
            id,
            view: self.view,
            value: Arc::clone(value),
        }
    }

    fn child_maybe(
        &self,
        reference: &TypeReference,
        value: &Maybe<Arc<Value>>,
    ) -> Maybe<TypedNode> {
        value
            .as_ref()
            .map(|v| self.child(resolve(&self.ts, reference.as_str()), v))
    }

    fn boxed(node: Maybe<TypedNode>) -> Box<dyn Node> {
        match node {
            Maybe::Absent => Box::new(AbsentNode),
            Maybe::Null => Box::new(NullNode),
            Maybe::Value(n) => Box::new(n),
        }
    }

    fn struct_parts(&self) -> Option<(&TypeStruct, &Slots)> {
        match (self.type_(), &*self.value) {
            (Type::Struct(t), Value::Struct(values)) => Some((t, &**values)),
            _ => None,
        }
    }

    fn map_parts(&self) -> Option<(&TypeMap, &IndexMap<String, Maybe<Arc<Value>>>)> {
        match (self.type_(), &*self.value) {
            (Type::Map(t), Value::Map(entries)) => Some((t, entries)),
            _ => None,
        }
    }

    fn list_parts(&self) -> Option<(&TypeList, &Slots)> {
        match (self.type_(), &*self.value) {
            (Type::List(t), Value::List(values)) => Some((t, &**values)),
            _ => None,
        }
    }

    fn union_parts(&self) -> Option<(&TypeUnion, usize, &Arc<Value>)> {
        match (self.type_(), &*self.value) {
            (Type::Union(t), Value::Union { member, value }) => Some((t, *member, value)),
            _ => None,
        }
    }

    fn kinded_member(&self) -> Result<TypedNode, NodeError> {
        self.member().map(|(_, node)| node)
    }

    fn is_implicit(implicit: Option<&ImplicitValue>, value: &Maybe<Arc<Value>>) -> bool {
        match (implicit, value) {
            (Some(implicit), Maybe::Value(v)) => v.equals_implicit(implicit),
            _ => false,
        }
    }

    /// Entry `index` of a struct read as a map. In the map representation, absent fields and
    /// fields holding their implicit value are skipped, and keys are renamed.
    fn struct_entry(&self, index: usize) -> Option<(String, Box<dyn Node>)> {
        let (t, values) = self.struct_parts()?;
        let field = t.fields().get(index)?;
        let value = &values[index];
        let key = match (self.view, t.representation()) {
            (View::Representation, StructRepresentation::Map(repr)) => {
                if value.is_absent() || Self::is_implicit(repr.implicit(field.name()), value) {
                    return None;
                }
                repr.serial_key(field.name()).to_string()
            }
            _ => field.name().to_string(),
        };
        Some((key, Self::boxed(self.child_maybe(field.type_ref(), value))))
    }

    fn map_entry(&self, index: usize) -> Option<(String, Box<dyn Node>)> {
        let (t, entries) = self.map_parts()?;
        let (key, value) = entries.get_index(index)?;
        Some((
            key.clone(),
            Self::boxed(self.child_maybe(t.value_type(), value)),
        ))
    }

    fn union_entry(&self) -> Option<(String, Box<dyn Node>)> {
        let (t, _, _) = self.union_parts()?;
        let (name, node) = self.member().ok()?;
        let key = match (self.view, t.representation()) {
            (View::Representation, UnionRepresentation::Keyed(table)) => {
                table.discriminant_for(name)?.to_string()
            }
            _ => name.to_string(),
        };
        Some((key, Box::new(node) as Box<dyn Node>))
    }

    fn list_element(&self, index: usize) -> Option<Box<dyn Node>> {
        let (t, values) = self.list_parts()?;
        let value = values.get(index)?;
        Some(Self::boxed(self.child_maybe(t.value_type(), value)))
    }

    /// Element `index` of a tuple; trailing absent fields are not elements.
    fn tuple_element(&self, index: usize) -> Option<Box<dyn Node>> {
        let (t, values) = self.struct_parts()?;
        let field = t.fields().get(index)?;
        let value = &values[index];
        if value.is_absent() {
            return None;
        }
        Some(Self::boxed(self.child_maybe(field.type_ref(), value)))
    }

    fn stringjoin(&self) -> Option<String> {
        let (t, values) = self.struct_parts()?;
        let StructRepresentation::Stringjoin(repr) = t.representation() else {
            return None;
        };
        let mut parts = Vec::with_capacity(values.len());
        for (field, value) in t.fields().iter().zip(values.iter()) {
            let child = self.child_maybe(field.type_ref(), value).into_value()?;
            parts.push(child.as_string().ok()?.into_owned());
        }
        Some(parts.join(repr.join()))
    }

    fn entries(self) -> Result<MapIter<'static>, NodeError> {
        match self.face() {
            Face::StructNative | Face::StructMap => {
                let len = self.struct_parts().map_or(0, |(t, _)| t.fields().len());
                Ok(Box::new((0..len).filter_map(move |i| self.struct_entry(i))))
            }
            Face::Map => {
                let len = self.map_parts().map_or(0, |(_, entries)| entries.len());
                Ok(Box::new((0..len).filter_map(move |i| self.map_entry(i))))
            }
            Face::UnionNative | Face::UnionKeyed => Ok(Box::new(self.union_entry().into_iter())),
            Face::UnionKinded => self.kinded_member()?.entries(),
            _ => Err(wrong_kind(&self, "map_iter", Kind::Map)),
        }
    }

    fn elements(self) -> Result<ListIter<'static>, NodeError> {
        match self.face() {
            Face::List => {
                let len = self.list_parts().map_or(0, |(_, values)| values.len());
                Ok(Box::new((0..len).filter_map(move |i| self.list_element(i))))
            }
            Face::StructTuple => {
                let len = self.struct_parts().map_or(0, |(_, values)| values.len());
                Ok(Box::new((0..len).map_while(move |i| self.tuple_element(i))))
            }
            Face::UnionKinded => self.kinded_member()?.elements(),
            _ => Err(wrong_kind(&self, "list_iter", Kind::List)),
        }
    }

    fn lookup_key(&self, key: &str) -> Result<Box<dyn Node>, NodeError> {
        let not_found = || NodeError::KeyNotFound {
            type_name: self.label(),
            key: key.to_string(),
        };
        match self.face() {
            Face::StructNative => {
                let (t, values) = self.struct_parts().ok_or_else(not_found)?;
                let index = t.field_index(key).ok_or_else(|| NodeError::NoSuchField {
                    type_name: self.label(),
                    field: key.to_string(),
                })?;
                Ok(Self::boxed(
                    self.child_maybe(t.fields()[index].type_ref(), &values[index]),
                ))
            }
            Face::StructMap => {
                let len = self.struct_parts().map_or(0, |(t, _)| t.fields().len());
                (0..len)
                    .filter_map(|i| self.struct_entry(i))
                    .find(|(k, _)| k == key)
                    .map(|(_, node)| node)
                    .ok_or_else(not_found)
            }
            Face::Map => {
                let (t, entries) = self.map_parts().ok_or_else(not_found)?;
                let value = entries.get(key).ok_or_else(not_found)?;
                Ok(Self::boxed(self.child_maybe(t.value_type(), value)))
            }
            Face::UnionNative | Face::UnionKeyed => self
                .union_entry()
                .filter(|(k, _)| k == key)
                .map(|(_, node)| node)
                .ok_or_else(not_found),
            Face::UnionKinded => self.kinded_member()?.lookup_key(key),
            _ => Err(wrong_kind(self, "lookup_string", Kind::Map)),
        }
    }

    fn lookup_position(&self, index: usize) -> Result<Box<dyn Node>, NodeError> {
        let out_of_range = || NodeError::IndexOutOfRange {
            type_name: self.label(),
            index,
            length: self.length().unwrap_or(0),
        };
        match self.face() {
            Face::List => self.list_element(index).ok_or_else(out_of_range),
            Face::StructTuple => self.tuple_element(index).ok_or_else(out_of_range),
            Face::UnionKinded => self.kinded_member()?.lookup_position(index),
            _ => Err(wrong_kind(self, "lookup_index", Kind::List)),
        }
    }
}

impl Node for TypedNode {
    fn kind(&self) -> Kind {
        match self.face() {
            Face::StructMap | Face::UnionKeyed => Kind::Map,
            Face::StructTuple => Kind::List,
            Face::StructStringjoin => Kind::String,
            Face::UnionKinded => self.kinded_member().map_or(Kind::Null, |m| m.kind()),
            _ => self.type_().kind().native_kind(),
        }
    }

    fn type_name(&self) -> Cow<'_, str> {
        match self.view {
            View::Type => Cow::Borrowed(self.type_().name().as_str()),
            View::Representation => Cow::Owned(self.label()),
        }
    }

    fn length(&self) -> Option<usize> {
        match self.face() {
            Face::Scalar | Face::StructStringjoin => None,
            Face::StructNative => self.struct_parts().map(|(t, _)| t.fields().len()),
            Face::StructMap => {
                let (t, _) = self.struct_parts()?;
                Some(
                    (0..t.fields().len())
                        .filter(|i| self.struct_entry(*i).is_some())
                        .count(),
                )
            }
            Face::StructTuple => self
                .struct_parts()
                .map(|(_, values)| values.iter().take_while(|v| !v.is_absent()).count()),
            Face::Map => self.map_parts().map(|(_, entries)| entries.len()),
            Face::List => self.list_parts().map(|(_, values)| values.len()),
            Face::UnionNative | Face::UnionKeyed => Some(1),
            Face::UnionKinded => self.kinded_member().ok()?.length(),
        }
    }

    fn as_bool(&self) -> Result<bool, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::Bool(b)) => Ok(*b),
            (Face::UnionKinded, _) => self.kinded_member()?.as_bool(),
            _ => Err(wrong_kind(self, "as_bool", Kind::Bool)),
        }
    }

    fn as_int(&self) -> Result<i64, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::Int(i)) => Ok(*i),
            (Face::UnionKinded, _) => self.kinded_member()?.as_int(),
            _ => Err(wrong_kind(self, "as_int", Kind::Int)),
        }
    }

    fn as_float(&self) -> Result<f64, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::Float(f)) => Ok(*f),
            (Face::UnionKinded, _) => self.kinded_member()?.as_float(),
            _ => Err(wrong_kind(self, "as_float", Kind::Float)),
        }
    }

    fn as_string(&self) -> Result<Cow<'_, str>, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::String(s)) => Ok(Cow::Borrowed(s)),
            (Face::StructStringjoin, _) => self
                .stringjoin()
                .map(Cow::Owned)
                .ok_or_else(|| wrong_kind(self, "as_string", Kind::String)),
            (Face::UnionKinded, _) => Ok(Cow::Owned(
                self.kinded_member()?.as_string()?.into_owned(),
            )),
            _ => Err(wrong_kind(self, "as_string", Kind::String)),
        }
    }

    fn as_bytes(&self) -> Result<Cow<'_, [u8]>, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::Bytes(b)) => Ok(Cow::Borrowed(b)),
            (Face::UnionKinded, _) => Ok(Cow::Owned(
                self.kinded_member()?.as_bytes()?.into_owned(),
            )),
            _ => Err(wrong_kind(self, "as_bytes", Kind::Bytes)),
        }
    }

    fn as_link(&self) -> Result<Link, NodeError> {
        match (self.face(), &*self.value) {
            (Face::Scalar, Value::Link(l)) => Ok(l.clone()),
            (Face::UnionKinded, _) => self.kinded_member()?.as_link(),
            _ => Err(wrong_kind(self, "as_link", Kind::Link)),
        }
    }

    fn lookup_string(&self, key: &str) -> Result<Box<dyn Node + '_>, NodeError> {
        self.lookup_key(key)
    }

    fn lookup_index(&self, index: usize) -> Result<Box<dyn Node + '_>, NodeError> {
        self.lookup_position(index)
    }

    fn map_iter(&self) -> Result<MapIter<'_>, NodeError> {
        let entries = self.clone().entries()?;
        Ok(Box::new(entries.map(|(key, node)| (key, shorten(node)))))
    }

    fn list_iter(&self) -> Result<ListIter<'_>, NodeError> {
        let elements = self.clone().elements()?;
        Ok(Box::new(elements.map(shorten)))
    }

    fn as_typed(&self) -> Option<&TypedNode> {
        Some(self)
    }
}

/// Iterator item types are invariant, so owned children are narrowed one by one.
fn shorten<'a>(node: Box<dyn Node>) -> Box<dyn Node + 'a> {
    node
}

/// Nodes are equal when they read the same value as the same type of the same type system.
impl PartialEq for TypedNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ts, &other.ts)
            && self.id == other.id
            && self.view == other.view
            && self.value == other.value
    }
}

impl fmt::Debug for TypedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedNode")
            .field("type", &self.label())
            .field("value", &self.value)
            .finish()
    }
}
