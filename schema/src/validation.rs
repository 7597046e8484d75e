//! Whole-system checks run by [`Compiler::compile`](crate::Compiler::compile).
//!
//! Every check appends to a shared error list instead of returning early, so one pass reports
//! every problem. Types are visited in declaration order, which keeps the error order stable.

use std::collections::HashSet;

use super::{
    error::{ReferenceSite, ValidationError},
    kind::Kind,
    names::TypeName,
    representation::{StructRepresentation, UnionRepresentation},
    type_system::ConstructionTypeTable,
    types::{Type, TypeLink, TypeList, TypeMap, TypeStruct, TypeUnion},
};

pub(crate) fn validate(table: &ConstructionTypeTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for ty in table.iter() {
        match ty {
            Type::Link(t) => validate_link(table, t, &mut errors),
            Type::Struct(t) => validate_struct(table, t, &mut errors),
            Type::Map(t) => validate_map(table, t, &mut errors),
            Type::List(t) => validate_list(table, t, &mut errors),
            Type::Union(t) => validate_union(table, t, &mut errors),
            Type::Bool(_) | Type::String(_) | Type::Bytes(_) | Type::Int(_) | Type::Float(_) => {}
        }
    }
    errors
}

/// Resolves `target`, recording a dangling reference if it does not exist.
fn resolve<'t>(
    table: &'t ConstructionTypeTable,
    in_type: &TypeName,
    site: ReferenceSite,
    target: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'t Type> {
    let resolved = table.lookup(target);
    if resolved.is_none() {
        errors.push(ValidationError::DanglingReference {
            in_type: in_type.clone(),
            site,
            target: target.into(),
        });
    }
    resolved
}

fn validate_link(table: &ConstructionTypeTable, t: &TypeLink, errors: &mut Vec<ValidationError>) {
    if let Some(expected) = &t.expected_type {
        resolve(
            table,
            &t.name,
            ReferenceSite::LinkTarget,
            expected.as_str(),
            errors,
        );
    }
}

fn validate_map(table: &ConstructionTypeTable, t: &TypeMap, errors: &mut Vec<ValidationError>) {
    let key = resolve(
        table,
        &t.name,
        ReferenceSite::MapKey,
        t.key_type.as_str(),
        errors,
    );
    if let Some(key) = key {
        if key.representation_kind() != Some(Kind::String) {
            errors.push(ValidationError::MapKeyNotStringRepresentable {
                map: t.name.clone(),
                key: t.key_type.clone(),
                kind: key.kind(),
            });
        }
    }
    resolve(
        table,
        &t.name,
        ReferenceSite::MapValue,
        t.value_type.as_str(),
        errors,
    );
}

fn validate_list(table: &ConstructionTypeTable, t: &TypeList, errors: &mut Vec<ValidationError>) {
    resolve(
        table,
        &t.name,
        ReferenceSite::ListValue,
        t.value_type.as_str(),
        errors,
    );
}

fn validate_struct(
    table: &ConstructionTypeTable,
    t: &TypeStruct,
    errors: &mut Vec<ValidationError>,
) {
    let field_types: Vec<Option<&Type>> = t
        .fields()
        .iter()
        .map(|f| {
            resolve(
                table,
                &t.name,
                ReferenceSite::StructField(f.name().to_string()),
                f.type_ref().as_str(),
                errors,
            )
        })
        .collect();

    match &t.representation {
        StructRepresentation::Map(repr) => {
            let mut unknown: Vec<&str> = repr
                .detailed_fields()
                .filter(|f| t.field(f).is_none())
                .collect();
            unknown.sort_unstable();
            for field in unknown {
                errors.push(ValidationError::UnknownRepresentationField {
                    struct_name: t.name.clone(),
                    field: field.to_string(),
                });
            }

            let mut keys = HashSet::new();
            for (field, field_type) in t.fields().iter().zip(&field_types) {
                let key = repr.serial_key(field.name());
                if !keys.insert(key) {
                    errors.push(ValidationError::DuplicateSerialKey {
                        struct_name: t.name.clone(),
                        key: key.to_string(),
                    });
                }

                let Some(implicit) = repr.implicit(field.name()) else {
                    continue;
                };
                if field.is_optional() {
                    errors.push(ValidationError::ImplicitOnOptionalField {
                        struct_name: t.name.clone(),
                        field: field.name().to_string(),
                    });
                } else if let Some(field_type) = field_type {
                    if field_type.kind().native_kind() != implicit.kind() {
                        errors.push(ValidationError::ImplicitKindMismatch {
                            struct_name: t.name.clone(),
                            field: field.name().to_string(),
                            implicit: implicit.kind(),
                            actual: field_type.kind(),
                        });
                    }
                }
            }
        }
        StructRepresentation::Tuple => {
            let last_required = t.fields().iter().rposition(|f| !f.is_optional());
            if let Some(last_required) = last_required {
                for field in t.fields()[..last_required]
                    .iter()
                    .filter(|f| f.is_optional())
                {
                    errors.push(ValidationError::TupleOptionalFieldNotTrailing {
                        struct_name: t.name.clone(),
                        field: field.name().to_string(),
                    });
                }
            }
        }
        StructRepresentation::Stringjoin(repr) => {
            if repr.join().is_empty() {
                errors.push(ValidationError::EmptyJoinDelimiter {
                    struct_name: t.name.clone(),
                });
            }
            for (field, field_type) in t.fields().iter().zip(&field_types) {
                let string_represented = match field_type {
                    Some(ty) => ty.representation_kind() == Some(Kind::String),
                    // already reported as dangling
                    None => true,
                };
                if field.is_optional() || field.is_nullable() || !string_represented {
                    errors.push(ValidationError::StringjoinFieldNotString {
                        struct_name: t.name.clone(),
                        field: field.name().to_string(),
                    });
                }
            }
        }
    }
}

fn validate_union(table: &ConstructionTypeTable, t: &TypeUnion, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for member in t.members() {
        if !seen.insert(member) {
            errors.push(ValidationError::DuplicateUnionMember {
                union: t.name.clone(),
                member: member.clone(),
            });
        }
    }

    for member in t.members() {
        resolve(
            table,
            &t.name,
            ReferenceSite::UnionMember,
            member.as_str(),
            errors,
        );
    }

    let table_members = t.representation.table_members();
    let mut missing: Vec<TypeName> = seen
        .iter()
        .filter(|m| !table_members.contains(*m))
        .map(|m| (*m).clone())
        .collect();
    let mut extraneous: Vec<TypeName> = table_members
        .iter()
        .filter(|m| !seen.contains(*m))
        .map(|m| (*m).clone())
        .collect();
    if !missing.is_empty() || !extraneous.is_empty() {
        missing.sort_unstable();
        extraneous.sort_unstable();
        errors.push(ValidationError::DiscriminantTableMismatch {
            union: t.name.clone(),
            missing,
            extraneous,
        });
    }

    for (member, keys) in t.representation.repeated_targets() {
        errors.push(ValidationError::DuplicateDiscriminantTarget {
            union: t.name.clone(),
            member: member.clone(),
            keys,
        });
    }

    if let UnionRepresentation::Kinded(kinded) = &t.representation {
        let mut entries: Vec<_> = kinded.entries().collect();
        entries.sort_unstable_by_key(|(kind, _)| *kind);
        for (kind, member) in entries {
            // unresolvable members were reported above
            let Some(member_type) = table.lookup(member.as_str()) else {
                continue;
            };
            let actual = member_type.representation_kind();
            if actual != Some(kind) {
                errors.push(ValidationError::KindedMemberKindMismatch {
                    union: t.name.clone(),
                    member: member.clone(),
                    declared: kind,
                    actual,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Compiler, FieldDetails, ImplicitValue, Kind, MapRepresentation, PreludeOverwriteAction,
        RegisterPrelude, StructField, StructFieldList, StructRepresentation,
        StructRepresentationMap, TypeKind, UnionDiscriminantStringTable, UnionKindedTable,
        UnionMemberList,
        UnionRepresentation, ValidationError,
    };

    fn compiler() -> Compiler {
        Compiler::new(RegisterPrelude::Yes, PreludeOverwriteAction::Deny)
    }

    fn field(name: &str, ty: &str, optional: bool, nullable: bool) -> StructField {
        StructField::new(name, ty, optional, nullable)
    }

    fn details(entries: &[(&str, FieldDetails)]) -> StructRepresentation {
        StructRepresentation::Map(StructRepresentationMap::new(
            entries.iter().map(|(f, d)| (f.to_string(), d.clone())),
        ))
    }

    #[test]
    fn stringjoin_struct_is_a_valid_map_key() {
        let mut c = compiler();
        c.declare_struct(
            "Coord",
            StructFieldList::new([field("a", "String", false, false)]),
            StructRepresentation::stringjoin(","),
        );
        c.declare_map("Grid", "Coord", "Int", false, MapRepresentation::Map);
        c.declare_map("Bad", "Grid", "Int", false, MapRepresentation::Map);

        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [ValidationError::MapKeyNotStringRepresentable {
                map: "Bad".into(),
                key: "Grid".into(),
                kind: TypeKind::Map,
            }]
        );
    }

    #[test]
    fn dangling_map_key_is_only_reported_as_dangling() {
        let mut c = compiler();
        c.declare_map("M", "Key", "Int", false, MapRepresentation::Map);
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::DanglingReference { .. }
        ));
    }

    #[test]
    fn representation_details_must_name_real_fields() {
        let mut c = compiler();
        c.declare_struct(
            "S",
            StructFieldList::new([field("a", "Int", false, false)]),
            details(&[("z", FieldDetails::renamed("zz"))]),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [ValidationError::UnknownRepresentationField {
                struct_name: "S".into(),
                field: "z".into(),
            }]
        );
    }

    #[test]
    fn renames_must_not_collide() {
        let mut c = compiler();
        c.declare_struct(
            "S",
            StructFieldList::new([field("a", "Int", false, false), field("b", "Int", false, false)]),
            details(&[("b", FieldDetails::renamed("a"))]),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [ValidationError::DuplicateSerialKey {
                struct_name: "S".into(),
                key: "a".into(),
            }]
        );
    }

    #[test]
    fn implicit_values_are_checked() {
        let mut c = compiler();
        c.declare_struct(
            "S",
            StructFieldList::new([
                field("a", "Int", true, false),
                field("b", "Int", false, false),
                field("c", "Bool", false, false),
            ]),
            details(&[
                ("a", FieldDetails::implicit(ImplicitValue::Int(0))),
                ("b", FieldDetails::implicit(ImplicitValue::String("0".into()))),
                ("c", FieldDetails::implicit(ImplicitValue::Bool(false))),
            ]),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [
                ValidationError::ImplicitOnOptionalField {
                    struct_name: "S".into(),
                    field: "a".into(),
                },
                ValidationError::ImplicitKindMismatch {
                    struct_name: "S".into(),
                    field: "b".into(),
                    implicit: Kind::String,
                    actual: TypeKind::Int,
                },
            ]
        );
    }

    #[test]
    fn tuple_optionals_must_trail() {
        let mut c = compiler();
        c.declare_struct(
            "Ok",
            StructFieldList::new([field("a", "Int", false, false), field("b", "Int", true, false)]),
            StructRepresentation::Tuple,
        );
        c.declare_struct(
            "NotOk",
            StructFieldList::new([field("a", "Int", true, false), field("b", "Int", false, false)]),
            StructRepresentation::Tuple,
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [ValidationError::TupleOptionalFieldNotTrailing {
                struct_name: "NotOk".into(),
                field: "a".into(),
            }]
        );
    }

    #[test]
    fn stringjoin_fields_must_be_plain_strings() {
        let mut c = compiler();
        c.declare_struct(
            "S",
            StructFieldList::new([
                field("a", "String", false, false),
                field("b", "String", true, false),
                field("c", "Int", false, false),
            ]),
            StructRepresentation::stringjoin(""),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [
                ValidationError::EmptyJoinDelimiter {
                    struct_name: "S".into()
                },
                ValidationError::StringjoinFieldNotString {
                    struct_name: "S".into(),
                    field: "b".into(),
                },
                ValidationError::StringjoinFieldNotString {
                    struct_name: "S".into(),
                    field: "c".into(),
                },
            ]
        );
    }

    #[test]
    fn kinded_members_must_match_their_kind() {
        let mut c = compiler();
        c.declare_union(
            "U",
            UnionMemberList::new(["Int", "String"]),
            UnionRepresentation::Kinded(UnionKindedTable::new([
                (Kind::Int, "Int"),
                (Kind::Bytes, "String"),
            ])),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [ValidationError::KindedMemberKindMismatch {
                union: "U".into(),
                member: "String".into(),
                declared: Kind::Bytes,
                actual: Some(Kind::String),
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "kinded union U expects member String to be represented as bytes, \
             but it is represented as string"
        );
    }
    #[test]
    fn each_member_has_one_table_entry() {
        let mut c = compiler();
        c.declare_union(
            "Keyed",
            UnionMemberList::new(["Int"]),
            UnionRepresentation::Keyed(UnionDiscriminantStringTable::new([
                ("b", "Int"),
                ("a", "Int"),
            ])),
        );
        c.declare_union(
            "Kinded",
            UnionMemberList::new(["String"]),
            UnionRepresentation::Kinded(UnionKindedTable::new([
                (Kind::String, "String"),
                (Kind::Bytes, "String"),
            ])),
        );
        let errors = c.compile().unwrap_err().into_vec();
        assert_eq!(
            errors,
            [
                ValidationError::DuplicateDiscriminantTarget {
                    union: "Keyed".into(),
                    member: "Int".into(),
                    keys: vec!["a".into(), "b".into()],
                },
                ValidationError::DuplicateDiscriminantTarget {
                    union: "Kinded".into(),
                    member: "String".into(),
                    keys: vec!["bytes".into(), "string".into()],
                },
                ValidationError::KindedMemberKindMismatch {
                    union: "Kinded".into(),
                    member: "String".into(),
                    declared: Kind::Bytes,
                    actual: Some(Kind::String),
                },
            ]
        );
    }
}
