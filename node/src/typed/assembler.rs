use std::iter;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use ipld_schema::{
    Kind, StructRepresentation, Type, TypeId, TypeStruct, TypeSystem, UnionRepresentation,
};

use super::{face, resolve, type_label, typed_node::TypedNode, value::Value, Face, View};
use crate::{error::NodeError, link::Link, maybe::Maybe, node::Node};

const ALREADY_FINISHED: &str =
    "invalid state: cannot assign into assembler that's already finished";

/// Destination of an assembler.
#[derive(Debug, Default)]
pub(crate) enum Slot {
    #[default]
    Empty,
    /// A map or list assembler is filling it.
    Assigning,
    Null,
    Value(Arc<Value>),
    Rejected,
}

impl Slot {
    fn is_finished(&self) -> bool {
        matches!(self, Self::Null | Self::Value(_))
    }

    fn into_maybe(self) -> Maybe<Arc<Value>> {
        match self {
            Self::Empty => Maybe::Absent,
            Self::Null => Maybe::Null,
            Self::Value(value) => Maybe::Value(value),
            Self::Assigning | Self::Rejected => panic!("invalid state: entry was not finished"),
        }
    }
}

/// Takes exactly one value for its destination, either directly or by handing out a
/// [`MapAssembler`] or [`ListAssembler`].
///
/// Every operation consumes the assembler. Assigning into a destination that already holds a
/// value panics. A rejected assignment returns an error and leaves the destination unusable.
pub struct NodeAssembler<'a> {
    ts: &'a Arc<TypeSystem>,
    id: TypeId,
    view: View,
    nullable: bool,
    slot: &'a mut Slot,
}

impl<'a> NodeAssembler<'a> {
    pub(crate) fn new(
        ts: &'a Arc<TypeSystem>,
        id: TypeId,
        view: View,
        nullable: bool,
        slot: &'a mut Slot,
    ) -> Self {
        Self {
            ts,
            id,
            view,
            nullable,
            slot,
        }
    }

    fn type_(&self) -> &'a Type {
        let ts: &'a TypeSystem = self.ts;
        ts.get(self.id)
    }

    fn label(&self) -> String {
        type_label(self.type_(), self.view)
    }

    fn start(&self) {
        if !matches!(self.slot, Slot::Empty) {
            panic!("{ALREADY_FINISHED}");
        }
    }

    fn store(self, value: Value) -> Result<(), NodeError> {
        *self.slot = Slot::Value(Arc::new(value));
        Ok(())
    }

    fn reject(self, err: NodeError) -> NodeError {
        trace!(type_name = %self.label(), %err, "assignment rejected");
        *self.slot = Slot::Rejected;
        err
    }

    /// The kinds this assembler takes.
    fn accepted_kinds(&self) -> Vec<Kind> {
        let ty = self.type_();
        match face(ty, self.view) {
            Face::Scalar => vec![ty.kind().native_kind()],
            Face::StructTuple | Face::List => vec![Kind::List],
            Face::StructStringjoin => vec![Kind::String],
            Face::UnionKinded => match ty {
                Type::Union(t) => match t.representation() {
                    UnionRepresentation::Kinded(table) => {
                        let mut kinds: Vec<_> = table.entries().map(|(k, _)| k).collect();
                        kinds.sort();
                        kinds
                    }
                    UnionRepresentation::Keyed(_) => vec![Kind::Map],
                },
                _ => vec![Kind::Map],
            },
            _ => vec![Kind::Map],
        }
    }

    fn wrong_kind(self, method: &'static str, actual: Kind) -> NodeError {
        let err = NodeError::WrongKind {
            type_name: self.label(),
            method,
            expected: self.accepted_kinds(),
            actual,
        };
        self.reject(err)
    }

    /// The member of a kinded union represented as `kind`: its index and type.
    fn kinded_member(&self, kind: Kind) -> Option<(usize, TypeId)> {
        let Type::Union(t) = self.type_() else {
            return None;
        };
        let UnionRepresentation::Kinded(table) = t.representation() else {
            return None;
        };
        let name = table.member_for(kind)?;
        Some((t.member_index(name.as_str())?, resolve(self.ts, name.as_str())))
    }

    fn assign_scalar(
        self,
        method: &'static str,
        kind: Kind,
        value: Value,
        into_member: impl FnOnce(NodeAssembler<'_>) -> Result<(), NodeError>,
    ) -> Result<(), NodeError> {
        self.start();
        let ty = self.type_();
        match face(ty, self.view) {
            Face::Scalar if ty.kind().native_kind() == kind => self.store(value),
            Face::UnionKinded => self.assign_member(method, kind, into_member),
            _ => Err(self.wrong_kind(method, kind)),
        }
    }

    /// Assigns a kinded union by assigning its member for `kind`.
    fn assign_member(
        self,
        method: &'static str,
        kind: Kind,
        assign: impl FnOnce(NodeAssembler<'_>) -> Result<(), NodeError>,
    ) -> Result<(), NodeError> {
        let Some((member, member_id)) = self.kinded_member(kind) else {
            return Err(self.wrong_kind(method, kind));
        };
        let mut inner = Slot::Empty;
        let assembler =
            NodeAssembler::new(self.ts, member_id, View::Representation, false, &mut inner);
        if let Err(err) = assign(assembler) {
            return Err(self.reject(err));
        }
        let Slot::Value(value) = inner else {
            unreachable!("member assignment succeeded without a value");
        };
        self.store(Value::Union { member, value })
    }

    pub fn assign_null(self) -> Result<(), NodeError> {
        self.start();
        if self.nullable {
            *self.slot = Slot::Null;
            Ok(())
        } else {
            let type_name = self.label();
            Err(self.reject(NodeError::NotNullable { type_name }))
        }
    }

    pub fn assign_bool(self, value: bool) -> Result<(), NodeError> {
        self.assign_scalar("assign_bool", Kind::Bool, Value::Bool(value), |na| {
            na.assign_bool(value)
        })
    }

    pub fn assign_int(self, value: i64) -> Result<(), NodeError> {
        self.assign_scalar("assign_int", Kind::Int, Value::Int(value), |na| {
            na.assign_int(value)
        })
    }

    pub fn assign_float(self, value: f64) -> Result<(), NodeError> {
        self.assign_scalar("assign_float", Kind::Float, Value::Float(value), |na| {
            na.assign_float(value)
        })
    }

    /// Also parses the string form of a stringjoin struct.
    pub fn assign_string(self, value: &str) -> Result<(), NodeError> {
        let ty = self.type_();
        if let (Face::StructStringjoin, Type::Struct(t)) = (face(ty, self.view), ty) {
            self.start();
            return match parse_stringjoin(self.ts, t, value) {
                Ok(parsed) => self.store(parsed),
                Err(err) => Err(self.reject(err)),
            };
        }
        self.assign_scalar(
            "assign_string",
            Kind::String,
            Value::String(value.to_string()),
            |na| na.assign_string(value),
        )
    }

    pub fn assign_bytes(self, value: &[u8]) -> Result<(), NodeError> {
        self.assign_scalar("assign_bytes", Kind::Bytes, Value::Bytes(value.to_vec()), |na| {
            na.assign_bytes(value)
        })
    }

    pub fn assign_link(self, value: Link) -> Result<(), NodeError> {
        self.assign_scalar("assign_link", Kind::Link, Value::Link(value.clone()), |na| {
            na.assign_link(value)
        })
    }

    /// Starts a map-shaped value. `size_hint` is only used to preallocate.
    pub fn begin_map(self, size_hint: usize) -> Result<MapAssembler<'a>, NodeError> {
        self.start();
        match face(self.type_(), self.view) {
            Face::StructNative
            | Face::StructMap
            | Face::Map
            | Face::UnionNative
            | Face::UnionKeyed => Ok(MapAssembler::new(
                self.ts, self.id, self.view, self.slot, None, size_hint,
            )),
            Face::UnionKinded => match self.kinded_member(Kind::Map) {
                Some((member, member_id)) => Ok(MapAssembler::new(
                    self.ts,
                    member_id,
                    View::Representation,
                    self.slot,
                    Some(member),
                    size_hint,
                )),
                None => Err(self.wrong_kind("begin_map", Kind::Map)),
            },
            _ => Err(self.wrong_kind("begin_map", Kind::Map)),
        }
    }

    /// Starts a list-shaped value. `size_hint` is only used to preallocate.
    pub fn begin_list(self, size_hint: usize) -> Result<ListAssembler<'a>, NodeError> {
        self.start();
        match face(self.type_(), self.view) {
            Face::List | Face::StructTuple => Ok(ListAssembler::new(
                self.ts, self.id, self.view, self.slot, None, size_hint,
            )),
            Face::UnionKinded => match self.kinded_member(Kind::List) {
                Some((member, member_id)) => Ok(ListAssembler::new(
                    self.ts,
                    member_id,
                    View::Representation,
                    self.slot,
                    Some(member),
                    size_hint,
                )),
                None => Err(self.wrong_kind("begin_list", Kind::List)),
            },
            _ => Err(self.wrong_kind("begin_list", Kind::List)),
        }
    }

    /// Copies `node` in.
    ///
    /// A node of the same type and view from the same type system is taken over without copying;
    /// anything else is walked and assigned piece by piece according to its kind.
    pub fn assign_node(self, node: &dyn Node) -> Result<(), NodeError> {
        if let Some(typed) = node.as_typed() {
            if Arc::ptr_eq(&typed.ts, self.ts) && typed.id == self.id && typed.view == self.view {
                self.start();
                *self.slot = Slot::Value(Arc::clone(&typed.value));
                return Ok(());
            }
        }
        if node.is_absent() {
            self.start();
            let type_name = self.label();
            return Err(self.reject(NodeError::AbsentValue { type_name }));
        }
        match node.kind() {
            Kind::Null => self.assign_null(),
            Kind::Bool => self.assign_bool(node.as_bool()?),
            Kind::Int => self.assign_int(node.as_int()?),
            Kind::Float => self.assign_float(node.as_float()?),
            Kind::String => self.assign_string(&node.as_string()?),
            Kind::Bytes => self.assign_bytes(&node.as_bytes()?),
            Kind::Link => self.assign_link(node.as_link()?),
            Kind::Map => {
                let mut map = self.begin_map(node.length().unwrap_or(0))?;
                for (key, value) in node.map_iter()? {
                    if value.is_absent() {
                        continue;
                    }
                    map.assemble_entry(&key)?.assign_node(&*value)?;
                }
                map.finish()
            }
            Kind::List => {
                let mut list = self.begin_list(node.length().unwrap_or(0))?;
                for value in node.list_iter()? {
                    list.assemble_value()?.assign_node(&*value)?;
                }
                list.finish()
            }
        }
    }
}

/// Parses the string form of a stringjoin struct into a struct value.
fn parse_stringjoin(
    ts: &Arc<TypeSystem>,
    t: &TypeStruct,
    value: &str,
) -> Result<Value, NodeError> {
    let StructRepresentation::Stringjoin(repr) = t.representation() else {
        unreachable!("parse_stringjoin called on a struct not represented as stringjoin");
    };
    let parts: Vec<&str> = value.split(repr.join()).collect();
    if parts.len() != t.fields().len() {
        return Err(NodeError::StringjoinArity {
            type_name: format!("{}.Repr", t.name()),
            expected: t.fields().len(),
            actual: parts.len(),
            value: value.to_string(),
        });
    }
    let mut values = Vec::with_capacity(parts.len());
    for (field, part) in t.fields().iter().zip(parts) {
        let mut slot = Slot::Empty;
        let id = resolve(ts, field.type_ref().as_str());
        NodeAssembler::new(ts, id, View::Representation, false, &mut slot).assign_string(part)?;
        values.push(slot.into_maybe());
    }
    Ok(Value::Struct(values.into_boxed_slice()))
}

/// Turns the collected field slots of a struct into its value, filling in absent optional
/// fields and implicit values.
fn finish_struct(
    ts: &Arc<TypeSystem>,
    t: &TypeStruct,
    view: View,
    slots: Vec<Slot>,
    type_name: String,
) -> Result<Value, NodeError> {
    let repr = match (view, t.representation()) {
        (View::Representation, StructRepresentation::Map(repr)) => Some(repr),
        _ => None,
    };
    let mut missing = Vec::new();
    let mut values = Vec::with_capacity(slots.len());
    for (field, slot) in t.fields().iter().zip(slots) {
        let value = match slot {
            Slot::Empty if field.is_optional() => Maybe::Absent,
            Slot::Empty => match repr.and_then(|r| r.implicit(field.name())) {
                Some(implicit) => Maybe::Value(Arc::new(Value::from_implicit(implicit))),
                None => {
                    missing.push(field.name().to_string());
                    continue;
                }
            },
            slot => slot.into_maybe(),
        };
        values.push(value);
    }
    if !missing.is_empty() {
        return Err(NodeError::MissingRequiredFields {
            type_name,
            fields: missing,
        });
    }
    if let StructRepresentation::Stringjoin(repr) = t.representation() {
        check_stringjoin_fields(ts, t, repr.join(), &values)?;
    }
    Ok(Value::Struct(values.into_boxed_slice()))
}

/// A field whose string form contains the delimiter would not survive a round trip through the
/// joined string.
fn check_stringjoin_fields(
    ts: &Arc<TypeSystem>,
    t: &TypeStruct,
    join: &str,
    values: &[Maybe<Arc<Value>>],
) -> Result<(), NodeError> {
    for (field, value) in t.fields().iter().zip(values) {
        let Maybe::Value(value) = value else {
            continue;
        };
        let part = TypedNode {
            ts: Arc::clone(ts),
            id: resolve(ts, field.type_ref().as_str()),
            view: View::Representation,
            value: Arc::clone(value),
        };
        let part = part.as_string()?;
        if part.contains(join) {
            return Err(NodeError::StringjoinDelimiterInField {
                type_name: t.name().to_string(),
                field: field.name().to_string(),
                value: part.into_owned(),
                join: join.to_string(),
            });
        }
    }
    Ok(())
}

fn complete(
    slot: &mut Slot,
    wrap: Option<usize>,
    result: Result<Value, NodeError>,
) -> Result<(), NodeError> {
    match result {
        Ok(value) => {
            let value = match wrap {
                Some(member) => Value::Union {
                    member,
                    value: Arc::new(value),
                },
                None => value,
            };
            *slot = Slot::Value(Arc::new(value));
            Ok(())
        }
        Err(err) => {
            trace!(%err, "assembly rejected");
            *slot = Slot::Rejected;
            Err(err)
        }
    }
}

enum Entries {
    /// One slot per struct field.
    Fields(Vec<Slot>),
    Map(IndexMap<String, Slot>),
    /// The chosen union member, by index into the member list.
    Member(Option<(usize, Slot)>),
}

/// Assembles a map-shaped value entry by entry.
///
/// Each entry's assembler must be finished before the next entry is started or the map is
/// finished; otherwise the map assembler panics.
pub struct MapAssembler<'a> {
    ts: &'a Arc<TypeSystem>,
    id: TypeId,
    view: View,
    slot: &'a mut Slot,
    wrap: Option<usize>,
    entries: Entries,
    pending: Option<usize>,
}

impl<'a> MapAssembler<'a> {
    fn new(
        ts: &'a Arc<TypeSystem>,
        id: TypeId,
        view: View,
        slot: &'a mut Slot,
        wrap: Option<usize>,
        size_hint: usize,
    ) -> Self {
        *slot = Slot::Assigning;
        let entries = match ts.get(id) {
            Type::Struct(t) => Entries::Fields(
                iter::repeat_with(Slot::default)
                    .take(t.fields().len())
                    .collect(),
            ),
            Type::Union(_) => Entries::Member(None),
            _ => Entries::Map(IndexMap::with_capacity(size_hint)),
        };
        Self {
            ts,
            id,
            view,
            slot,
            wrap,
            entries,
            pending: None,
        }
    }

    fn label(&self) -> String {
        type_label(self.ts.get(self.id), self.view)
    }

    fn settle(&mut self) {
        let Some(index) = self.pending.take() else {
            return;
        };
        let slot = match &self.entries {
            Entries::Fields(fields) => fields.get(index),
            Entries::Map(entries) => entries.get_index(index).map(|(_, slot)| slot),
            Entries::Member(member) => member.as_ref().map(|(_, slot)| slot),
        };
        if !slot.is_some_and(Slot::is_finished) {
            panic!(
                "invalid state: previous entry of {} was not finished",
                self.label()
            );
        }
    }

    /// The assembler for the value under `key`.
    ///
    /// Struct keys are field names, or their renames in the map representation; union keys are
    /// member names, or discriminants in the keyed representation.
    pub fn assemble_entry(&mut self, key: &str) -> Result<NodeAssembler<'_>, NodeError> {
        self.settle();
        let ts: &'a Arc<TypeSystem> = self.ts;
        let view = self.view;
        let ty = ts.get(self.id);
        let label = || type_label(ty, view);
        match (ty, &mut self.entries) {
            (Type::Struct(t), Entries::Fields(fields)) => {
                let index = match view {
                    View::Representation => t.field_for_serial_key(key),
                    View::Type => t.field_index(key),
                }
                .ok_or_else(|| NodeError::NoSuchField {
                    type_name: label(),
                    field: key.to_string(),
                })?;
                if !matches!(fields[index], Slot::Empty) {
                    return Err(NodeError::RepeatedKey {
                        type_name: label(),
                        key: key.to_string(),
                    });
                }
                let field = &t.fields()[index];
                self.pending = Some(index);
                Ok(NodeAssembler::new(
                    ts,
                    resolve(ts, field.type_ref().as_str()),
                    view,
                    field.is_nullable(),
                    &mut fields[index],
                ))
            }
            (Type::Map(t), Entries::Map(entries)) => {
                if let Some(Type::Struct(key_type)) = ts.lookup(t.key_type().as_str()) {
                    if let StructRepresentation::Stringjoin(_) = key_type.representation() {
                        parse_stringjoin(ts, key_type, key)?;
                    }
                }
                if entries.contains_key(key) {
                    return Err(NodeError::RepeatedKey {
                        type_name: label(),
                        key: key.to_string(),
                    });
                }
                let (index, _) = entries.insert_full(key.to_string(), Slot::Empty);
                self.pending = Some(index);
                Ok(NodeAssembler::new(
                    ts,
                    resolve(ts, t.value_type().as_str()),
                    view,
                    t.is_value_nullable(),
                    &mut entries[index],
                ))
            }
            (Type::Union(t), Entries::Member(member)) => {
                if member.is_some() {
                    return Err(NodeError::UnionAlreadySet { type_name: label() });
                }
                let no_such_member = || NodeError::NoSuchMember {
                    type_name: label(),
                    member: key.to_string(),
                };
                let name = match (view, t.representation()) {
                    (View::Representation, UnionRepresentation::Keyed(table)) => {
                        table.member_for(key)
                    }
                    _ => t.members().iter().find(|m| m.as_str() == key),
                }
                .ok_or_else(no_such_member)?;
                let index = t.member_index(name.as_str()).ok_or_else(no_such_member)?;
                self.pending = Some(index);
                let (_, slot) = member.insert((index, Slot::Empty));
                Ok(NodeAssembler::new(
                    ts,
                    resolve(ts, name.as_str()),
                    view,
                    false,
                    slot,
                ))
            }
            _ => unreachable!("map assembler entries always match the type they were made for"),
        }
    }

    /// Completes the value. Struct fields never assigned are absent if optional and take their
    /// implicit value if they have one; any other missing field rejects the value.
    pub fn finish(mut self) -> Result<(), NodeError> {
        self.settle();
        let system = self.ts;
        let ts: &TypeSystem = system;
        let ty = ts.get(self.id);
        let type_name = type_label(ty, self.view);
        let result = match (ty, self.entries) {
            (Type::Struct(t), Entries::Fields(fields)) => {
                finish_struct(system, t, self.view, fields, type_name)
            }
            (Type::Map(_), Entries::Map(entries)) => Ok(Value::Map(
                entries
                    .into_iter()
                    .map(|(key, slot)| (key, slot.into_maybe()))
                    .collect(),
            )),
            (Type::Union(_), Entries::Member(Some((member, slot)))) => Ok(Value::Union {
                member,
                value: slot.into_maybe().into_must(),
            }),
            (Type::Union(_), Entries::Member(None)) => Err(NodeError::UnionEmpty { type_name }),
            _ => unreachable!("map assembler entries always match the type they were made for"),
        };
        complete(self.slot, self.wrap, result)
    }
}

/// Assembles a list-shaped value element by element, with the same finishing rules as
/// [`MapAssembler`].
pub struct ListAssembler<'a> {
    ts: &'a Arc<TypeSystem>,
    id: TypeId,
    view: View,
    slot: &'a mut Slot,
    wrap: Option<usize>,
    items: Vec<Slot>,
    pending: bool,
}

impl<'a> ListAssembler<'a> {
    fn new(
        ts: &'a Arc<TypeSystem>,
        id: TypeId,
        view: View,
        slot: &'a mut Slot,
        wrap: Option<usize>,
        size_hint: usize,
    ) -> Self {
        *slot = Slot::Assigning;
        Self {
            ts,
            id,
            view,
            slot,
            wrap,
            items: Vec::with_capacity(size_hint),
            pending: false,
        }
    }

    fn settle(&mut self) {
        if std::mem::take(&mut self.pending) && !self.items.last().is_some_and(Slot::is_finished)
        {
            panic!(
                "invalid state: previous element of {} was not finished",
                type_label(self.ts.get(self.id), self.view)
            );
        }
    }

    /// The assembler for the next element. Tuples take their fields in declaration order.
    pub fn assemble_value(&mut self) -> Result<NodeAssembler<'_>, NodeError> {
        self.settle();
        let ts: &'a Arc<TypeSystem> = self.ts;
        let ty = ts.get(self.id);
        let (reference, nullable) = match ty {
            Type::List(t) => (t.value_type(), t.is_value_nullable()),
            Type::Struct(t) => {
                let Some(field) = t.fields().get(self.items.len()) else {
                    return Err(NodeError::TooManyElements {
                        type_name: type_label(ty, self.view),
                        max: t.fields().len(),
                    });
                };
                (field.type_ref(), field.is_nullable())
            }
            _ => unreachable!("list assembler made for a type that is not list-shaped"),
        };
        let index = self.items.len();
        self.items.push(Slot::Empty);
        self.pending = true;
        Ok(NodeAssembler::new(
            ts,
            resolve(ts, reference.as_str()),
            self.view,
            nullable,
            &mut self.items[index],
        ))
    }

    pub fn finish(mut self) -> Result<(), NodeError> {
        self.settle();
        let system = self.ts;
        let ts: &TypeSystem = system;
        let ty = ts.get(self.id);
        let result = match ty {
            Type::List(_) => Ok(Value::List(
                self.items.into_iter().map(Slot::into_maybe).collect(),
            )),
            Type::Struct(t) => {
                let mut items = self.items;
                items.resize_with(t.fields().len(), Slot::default);
                finish_struct(system, t, self.view, items, type_label(ty, self.view))
            }
            _ => unreachable!("list assembler made for a type that is not list-shaped"),
        };
        complete(self.slot, self.wrap, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{basic::BasicInt, typed::NodePrototype};
    use ipld_schema::{
        Compiler, MapRepresentation, PreludeOverwriteAction, RegisterPrelude, StructField,
        StructFieldList, UnionKindedTable, UnionMemberList,
    };

    fn type_system() -> Arc<TypeSystem> {
        let mut compiler = Compiler::new(RegisterPrelude::Yes, PreludeOverwriteAction::Deny);
        compiler.declare_struct(
            "Point",
            StructFieldList::new([
                StructField::new("x", "Int", false, false),
                StructField::new("y", "Int", false, false),
            ]),
            StructRepresentation::map(),
        );
        compiler.declare_struct(
            "Pair",
            StructFieldList::new([
                StructField::new("a", "String", false, false),
                StructField::new("b", "String", false, false),
            ]),
            StructRepresentation::stringjoin(":"),
        );
        compiler.declare_map("Index", "String", "Int", true, MapRepresentation::Map);
        compiler.declare_union(
            "IntOrPoint",
            UnionMemberList::new(["Int", "Point"]),
            UnionRepresentation::Kinded(UnionKindedTable::new([
                (Kind::Int, "Int"),
                (Kind::Map, "Point"),
            ])),
        );
        Arc::new(compiler.compile().unwrap())
    }

    fn prototype(name: &str) -> NodePrototype {
        NodePrototype::new(&type_system(), name).unwrap()
    }

    #[test]
    #[should_panic(expected = "invalid state: cannot assign into assembler that's already finished")]
    fn assigning_twice_panics() {
        let mut builder = prototype("Int").new_builder();
        builder.assembler().assign_int(1).unwrap();
        let _ = builder.assembler().assign_int(2);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut builder = prototype("Point").new_builder();
        let err = builder.assembler().assign_int(1).unwrap_err();
        assert_eq!(
            err,
            NodeError::WrongKind {
                type_name: "Point".into(),
                method: "assign_int",
                expected: vec![Kind::Map],
                actual: Kind::Int,
            }
        );
    }

    #[test]
    fn struct_entries_are_checked() {
        let mut builder = prototype("Point").new_builder();
        let mut map = builder.assembler().begin_map(2).unwrap();
        map.assemble_entry("x").unwrap().assign_int(1).unwrap();
        assert!(matches!(
            map.assemble_entry("x"),
            Err(NodeError::RepeatedKey { .. })
        ));
        assert!(matches!(
            map.assemble_entry("z"),
            Err(NodeError::NoSuchField { .. })
        ));
        assert_eq!(
            map.finish(),
            Err(NodeError::MissingRequiredFields {
                type_name: "Point".into(),
                fields: vec!["y".into()],
            })
        );
    }

    #[test]
    #[should_panic(expected = "invalid state: previous entry of Point was not finished")]
    fn unfinished_entry_panics() {
        let mut builder = prototype("Point").new_builder();
        let mut map = builder.assembler().begin_map(2).unwrap();
        drop(map.assemble_entry("x").unwrap());
        let _ = map.assemble_entry("y");
    }

    #[test]
    fn map_values_may_be_null() {
        let mut builder = prototype("Index").new_builder();
        let mut map = builder.assembler().begin_map(2).unwrap();
        map.assemble_entry("b").unwrap().assign_null().unwrap();
        map.assemble_entry("a").unwrap().assign_int(7).unwrap();
        map.finish().unwrap();

        let node = builder.build();
        let keys: Vec<_> = node.map_iter().unwrap().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(node.lookup_string("b").unwrap().is_null());
        assert_eq!(node.lookup_string("a").unwrap().as_int(), Ok(7));
        assert!(matches!(
            node.lookup_string("c"),
            Err(NodeError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn stringjoin_round_trips_through_its_string_form() {
        let mut builder = prototype("Pair").representation().new_builder();
        builder.assembler().assign_string("left:right").unwrap();
        let node = builder.build();
        assert_eq!(node.kind(), Kind::String);
        assert_eq!(node.as_string().unwrap(), "left:right");
        let native = node.field("a").unwrap().into_must();
        assert_eq!(native.as_string().unwrap(), "left");

        builder.reset();
        assert_eq!(
            builder.assembler().assign_string("nocolon"),
            Err(NodeError::StringjoinArity {
                type_name: "Pair.Repr".into(),
                expected: 2,
                actual: 1,
                value: "nocolon".into(),
            })
        );
    }

    #[test]
    fn absent_sources_are_not_turned_into_null() {
        let mut builder = prototype("Int").new_builder();
        assert_eq!(
            builder.assembler().assign_node(&crate::node::ABSENT),
            Err(NodeError::AbsentValue {
                type_name: "Int".into()
            })
        );

        let mut builder = prototype("Index").new_builder();
        let mut map = builder.assembler().begin_map(1).unwrap();
        let err = map
            .assemble_entry("k")
            .unwrap()
            .assign_node(&crate::node::ABSENT)
            .unwrap_err();
        assert!(matches!(err, NodeError::AbsentValue { .. }));
    }

    #[test]
    fn stringjoin_fields_cannot_contain_the_delimiter() {
        let mut builder = prototype("Pair").new_builder();
        let mut map = builder.assembler().begin_map(2).unwrap();
        map.assemble_entry("a").unwrap().assign_string("x:y").unwrap();
        map.assemble_entry("b").unwrap().assign_string("z").unwrap();
        assert_eq!(
            map.finish(),
            Err(NodeError::StringjoinDelimiterInField {
                type_name: "Pair".into(),
                field: "a".into(),
                value: "x:y".into(),
                join: ":".into(),
            })
        );

        builder.reset();
        let mut map = builder.assembler().begin_map(2).unwrap();
        map.assemble_entry("a").unwrap().assign_string("x").unwrap();
        map.assemble_entry("b").unwrap().assign_string("z").unwrap();
        map.finish().unwrap();
        let pair = builder.build();
        assert_eq!(pair.representation().as_string().unwrap(), "x:z");
    }

    #[test]
    fn kinded_union_picks_member_by_kind() {
        let prototype = prototype("IntOrPoint").representation();

        let node = prototype.from_node(&BasicInt(5)).unwrap();
        assert_eq!(node.kind(), Kind::Int);
        assert_eq!(node.as_int(), Ok(5));
        let (member, _) = node.member().unwrap();
        assert_eq!(member.as_str(), "Int");

        let mut builder = prototype.new_builder();
        let mut map = builder.assembler().begin_map(2).unwrap();
        map.assemble_entry("x").unwrap().assign_int(1).unwrap();
        map.assemble_entry("y").unwrap().assign_int(2).unwrap();
        map.finish().unwrap();
        let node = builder.build();
        assert_eq!(node.kind(), Kind::Map);
        assert_eq!(node.lookup_string("y").unwrap().as_int(), Ok(2));

        builder.reset();
        let err = builder.assembler().assign_bool(true).unwrap_err();
        assert!(matches!(
            err,
            NodeError::WrongKind { ref expected, actual: Kind::Bool, .. }
                if expected == &[Kind::Int, Kind::Map]
        ));
    }
}
