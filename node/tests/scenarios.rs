use std::sync::Arc;

use ipld_node::{Kind, Maybe, Node, NodeError, NodePrototype, TypedNode, View};
use ipld_schema::{
    Compiler, FieldDetails, ImplicitValue, ListRepresentation, MapRepresentation,
    PreludeOverwriteAction, RegisterPrelude, StructField,
    StructFieldList, StructRepresentation, StructRepresentationMap, TypeSystem,
    UnionDiscriminantStringTable, UnionMemberList, UnionRepresentation,
};

fn compiler() -> Compiler {
    Compiler::new(RegisterPrelude::Yes, PreludeOverwriteAction::Deny)
}

fn declare_point(compiler: &mut Compiler) {
    compiler.declare_struct(
        "Point",
        StructFieldList::new([
            StructField::new("x", "Int", false, false),
            StructField::new("y", "Int", false, false),
        ]),
        StructRepresentation::map(),
    );
}

fn point_system() -> Arc<TypeSystem> {
    let mut compiler = compiler();
    declare_point(&mut compiler);
    Arc::new(compiler.compile().unwrap())
}

fn build_point(ts: &Arc<TypeSystem>, x: i64, y: i64) -> TypedNode {
    let mut builder = NodePrototype::new(ts, "Point").unwrap().new_builder();
    let mut map = builder.assembler().begin_map(2).unwrap();
    map.assemble_entry("x").unwrap().assign_int(x).unwrap();
    map.assemble_entry("y").unwrap().assign_int(y).unwrap();
    map.finish().unwrap();
    builder.build()
}

#[test]
fn point_is_built_and_read_back() {
    let ts = point_system();
    let point = build_point(&ts, 3, 4);

    assert_eq!(point.kind(), Kind::Map);
    assert_eq!(point.length(), Some(2));
    assert_eq!(point.type_name(), "Point");
    assert_eq!(point.field("x").unwrap().must().as_int(), Ok(3));
    assert_eq!(point.lookup_string("y").unwrap().as_int(), Ok(4));

    let entries: Vec<_> = point
        .representation()
        .map_iter()
        .unwrap()
        .map(|(k, v)| (k, v.as_int().unwrap()))
        .collect();
    assert_eq!(entries, [("x".to_string(), 3), ("y".to_string(), 4)]);
}

#[test]
fn same_type_copy_shares_the_value() {
    let ts = point_system();
    let point = build_point(&ts, 1, 2);

    let copy = NodePrototype::new(&ts, "Point")
        .unwrap()
        .from_node(&point)
        .unwrap();
    assert_eq!(copy, point);
}

#[test]
fn copy_between_type_systems_walks_the_node() {
    let point = build_point(&point_system(), 5, 6);
    let other = point_system();

    let copy = NodePrototype::new(&other, "Point")
        .unwrap()
        .from_node(&point)
        .unwrap();
    assert!(Arc::ptr_eq(copy.type_system(), &other));
    assert_eq!(copy.field("y").unwrap().must().as_int(), Ok(6));
}

fn profile_system() -> Arc<TypeSystem> {
    let mut compiler = compiler();
    compiler.declare_struct(
        "Profile",
        StructFieldList::new([
            StructField::new("name", "String", false, false),
            StructField::new("count", "Int", false, false),
            StructField::new("note", "String", true, false),
            StructField::new("parent", "String", false, true),
        ]),
        StructRepresentation::Map(StructRepresentationMap::new([
            ("name".to_string(), FieldDetails::renamed("n")),
            (
                "count".to_string(),
                FieldDetails::implicit(ImplicitValue::Int(0)),
            ),
        ])),
    );
    Arc::new(compiler.compile().unwrap())
}

#[test]
fn representation_applies_renames_and_implicits() {
    let ts = profile_system();
    let mut builder = NodePrototype::new(&ts, "Profile")
        .unwrap()
        .representation()
        .new_builder();
    let mut map = builder.assembler().begin_map(2).unwrap();
    map.assemble_entry("n").unwrap().assign_string("ada").unwrap();
    map.assemble_entry("parent").unwrap().assign_null().unwrap();
    assert!(matches!(
        map.assemble_entry("name"),
        Err(NodeError::NoSuchField { .. })
    ));
    map.finish().unwrap();
    let repr = builder.build();
    assert_eq!(repr.view(), View::Representation);

    let keys: Vec<_> = repr.map_iter().unwrap().map(|(k, _)| k).collect();
    assert_eq!(keys, ["n", "parent"]);

    assert_eq!(repr.field("count").unwrap().must().as_int(), Ok(0));
    assert!(repr.field("note").unwrap().is_absent());
    assert!(repr.field("parent").unwrap().is_null());

    assert_eq!(
        repr.field("name").unwrap().must().as_string().unwrap(),
        "ada"
    );
    assert_eq!(repr.lookup_string("n").unwrap().as_string().unwrap(), "ada");
}

#[test]
fn null_and_absent_are_distinguished() {
    let ts = profile_system();
    let prototype = NodePrototype::new(&ts, "Profile").unwrap();
    let mut builder = prototype.new_builder();
    let mut map = builder.assembler().begin_map(3).unwrap();
    map.assemble_entry("name").unwrap().assign_string("b").unwrap();
    map.assemble_entry("count").unwrap().assign_int(2).unwrap();
    map.assemble_entry("parent").unwrap().assign_null().unwrap();
    map.finish().unwrap();
    let profile = builder.build();

    let parent = profile.field("parent").unwrap();
    assert!(parent.is_null() && !parent.exists());
    assert!(parent.as_node().is_null());
    let note = profile.field("note").unwrap();
    assert!(note.is_absent());
    assert!(profile.lookup_string("note").unwrap().is_absent());
    assert_eq!(profile.length(), Some(4));

    builder.reset();
    let mut map = builder.assembler().begin_map(1).unwrap();
    let err = map.assemble_entry("name").unwrap().assign_null().unwrap_err();
    assert_eq!(
        err,
        NodeError::NotNullable {
            type_name: "String".into()
        }
    );
}

#[test]
fn keyed_union_uses_discriminants_in_representation() {
    let mut compiler = compiler();
    compiler.declare_union(
        "IntOrString",
        UnionMemberList::new(["Int", "String"]),
        UnionRepresentation::Keyed(UnionDiscriminantStringTable::new([
            ("i", "Int"),
            ("s", "String"),
        ])),
    );
    let ts = Arc::new(compiler.compile().unwrap());
    let mut builder = NodePrototype::new(&ts, "IntOrString")
        .unwrap()
        .representation()
        .new_builder();
    let mut map = builder.assembler().begin_map(1).unwrap();
    map.assemble_entry("s").unwrap().assign_string("hi").unwrap();
    assert!(matches!(
        map.assemble_entry("i"),
        Err(NodeError::UnionAlreadySet { .. })
    ));
    map.finish().unwrap();
    let repr = builder.build();

    let (member, value) = repr.member().unwrap();
    assert_eq!(member.as_str(), "String");
    assert_eq!(value.as_string().unwrap(), "hi");
    let repr_keys: Vec<_> = repr.map_iter().unwrap().map(|(k, _)| k).collect();
    assert_eq!(repr_keys, ["s"]);

    let native = NodePrototype::new(&ts, "IntOrString")
        .unwrap()
        .from_node(&repr)
        .unwrap_err();
    assert!(matches!(native, NodeError::NoSuchMember { .. }));
}

#[test]
fn tuple_takes_fields_in_order() {
    let mut compiler = compiler();
    compiler.declare_struct(
        "Range",
        StructFieldList::new([
            StructField::new("start", "Int", false, false),
            StructField::new("end", "Int", true, false),
        ]),
        StructRepresentation::Tuple,
    );
    let ts = Arc::new(compiler.compile().unwrap());
    let mut builder = NodePrototype::new(&ts, "Range")
        .unwrap()
        .representation()
        .new_builder();
    let mut list = builder.assembler().begin_list(1).unwrap();
    list.assemble_value().unwrap().assign_int(10).unwrap();
    list.finish().unwrap();
    let range = builder.build();

    assert_eq!(range.kind(), Kind::List);
    assert_eq!(range.length(), Some(1));
    assert_eq!(range.lookup_index(0).unwrap().as_int(), Ok(10));
    assert!(matches!(
        range.lookup_index(1),
        Err(NodeError::IndexOutOfRange { index: 1, .. })
    ));
    assert!(matches!(range.field("end").unwrap(), Maybe::Absent));

    builder.reset();
    let mut list = builder.assembler().begin_list(3).unwrap();
    list.assemble_value().unwrap().assign_int(1).unwrap();
    list.assemble_value().unwrap().assign_int(2).unwrap();
    assert!(matches!(
        list.assemble_value(),
        Err(NodeError::TooManyElements { max: 2, .. })
    ));
}

#[test]
fn anonymous_list_fields() {
    let mut compiler = compiler();
    let ints = compiler.declare_anonymous_list("Int", true);
    compiler.declare_struct(
        "Bag",
        StructFieldList::new([StructField::new("items", ints.clone(), false, false)]),
        StructRepresentation::map(),
    );
    let ts = Arc::new(compiler.compile().unwrap());
    let mut builder = NodePrototype::new(&ts, "Bag").unwrap().new_builder();
    let mut map = builder.assembler().begin_map(1).unwrap();
    {
        let mut items = map.assemble_entry("items").unwrap().begin_list(2).unwrap();
        items.assemble_value().unwrap().assign_int(1).unwrap();
        items.assemble_value().unwrap().assign_null().unwrap();
        items.finish().unwrap();
    }
    map.finish().unwrap();
    let bag = builder.build();

    let items = bag.field("items").unwrap().into_must();
    assert_eq!(items.type_name(), ints.as_str());
    let values: Vec<_> = items
        .list_iter()
        .unwrap()
        .map(|n| n.as_int().ok())
        .collect();
    assert_eq!(values, [Some(1), None]);
    assert!(matches!(
        items.as_string(),
        Err(NodeError::WrongKind { actual: Kind::List, .. })
    ));
}

#[test]
fn length_is_only_defined_for_containers() {
    let mut compiler = compiler();
    compiler.declare_map("Counts", "String", "Int", false, MapRepresentation::Map);
    compiler.declare_list("Ints", "Int", false, ListRepresentation::List);
    compiler.declare_struct(
        "Pair",
        StructFieldList::new([
            StructField::new("a", "String", false, false),
            StructField::new("b", "String", false, false),
        ]),
        StructRepresentation::stringjoin(":"),
    );
    let ts = Arc::new(compiler.compile().unwrap());

    let mut builder = NodePrototype::new(&ts, "Int").unwrap().new_builder();
    builder.assembler().assign_int(7).unwrap();
    let int = builder.build();
    assert_eq!(int.length(), None);
    assert!(matches!(
        int.map_iter().err(),
        Some(NodeError::WrongKind { actual: Kind::Int, .. })
    ));
    assert!(matches!(
        int.list_iter().err(),
        Some(NodeError::WrongKind { actual: Kind::Int, .. })
    ));
    assert!(matches!(
        int.lookup_string("a"),
        Err(NodeError::WrongKind { .. })
    ));

    let mut builder = NodePrototype::new(&ts, "Counts").unwrap().new_builder();
    builder.assembler().begin_map(0).unwrap().finish().unwrap();
    let counts = builder.build();
    assert_eq!(counts.length(), Some(0));
    assert_eq!(counts.map_iter().unwrap().count(), 0);

    let mut builder = NodePrototype::new(&ts, "Ints").unwrap().new_builder();
    builder.assembler().begin_list(0).unwrap().finish().unwrap();
    let ints = builder.build();
    assert_eq!(ints.length(), Some(0));
    assert_eq!(ints.list_iter().unwrap().count(), 0);

    let mut builder = NodePrototype::new(&ts, "Pair")
        .unwrap()
        .representation()
        .new_builder();
    builder.assembler().assign_string("x:y").unwrap();
    let pair = builder.build();
    assert_eq!(pair.kind(), Kind::String);
    assert_eq!(pair.length(), None);
    assert!(matches!(
        pair.map_iter().err(),
        Some(NodeError::WrongKind { actual: Kind::String, .. })
    ));
}
