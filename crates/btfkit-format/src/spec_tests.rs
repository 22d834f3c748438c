use std::io::Write as _;

use btfkit_core::{
    FuncLinkage, FuncParam, FuncProto, Int, IntEncoding, Member, Pointer, Type, TypeId, TypeRef,
    Typedef,
};

use crate::test_utils::{
    STRINGS, blob, decl_tag, func_proto, int, pointer, sample, structure, typedef,
};
use crate::{ByteOrder, DecodeError, Kind, RawMember, RawParam, RawType, Spec};

#[test]
fn parse_sample() {
    let spec = Spec::parse(&sample(ByteOrder::Little)).unwrap();

    assert_eq!(spec.byte_order(), ByteOrder::Little);
    assert_eq!(spec.len(), 3);
    assert_eq!(spec.kind(TypeId::VOID), Some(Kind::Unknown));
    assert_eq!(spec.kind(TypeId(2)), Some(Kind::Pointer));
    assert_eq!(spec.kind(TypeId(4)), None);

    assert_eq!(
        spec.type_by_id(TypeId(1)).unwrap(),
        Type::Int(Int::new("foo", 2, IntEncoding::SIGNED | IntEncoding::CHAR))
    );
    assert_eq!(
        spec.type_by_id(TypeId(2)).unwrap(),
        Type::Pointer(Pointer {
            target: TypeRef::from_raw(1)
        })
    );
    assert_eq!(
        spec.type_by_id(TypeId(3)).unwrap(),
        Type::Typedef(Typedef {
            name: "baz".into(),
            target: TypeRef::from_raw(1),
            tags: Vec::new(),
        })
    );
}

#[test]
fn big_endian_decodes_the_same() {
    let little = Spec::parse(&sample(ByteOrder::Little)).unwrap();
    let big = Spec::parse(&sample(ByteOrder::Big)).unwrap();

    assert_eq!(big.byte_order(), ByteOrder::Big);
    let little: Vec<_> = little.types().collect::<Result<_, _>>().unwrap();
    let big: Vec<_> = big.types().collect::<Result<_, _>>().unwrap();
    assert_eq!(little, big);
}

#[test]
fn types_starts_with_void_and_restarts() {
    let spec = Spec::parse(&sample(ByteOrder::Little)).unwrap();

    let ids: Vec<_> = spec.types().map(|r| r.unwrap().0).collect();
    assert_eq!(ids, [TypeId(0), TypeId(1), TypeId(2), TypeId(3)]);

    let (id, ty) = spec.types().next().unwrap().unwrap();
    assert_eq!(id, TypeId::VOID);
    assert_eq!(ty, Type::Void);
}

#[test]
fn type_by_name() {
    let spec = Spec::parse(&sample(ByteOrder::Little)).unwrap();

    assert_eq!(spec.type_by_name("foo").unwrap(), TypeId(1));
    assert_eq!(spec.type_by_name("baz").unwrap(), TypeId(3));
    assert!(matches!(
        spec.type_by_name("bar"),
        Err(DecodeError::NotFound(name)) if name == "bar"
    ));
    // Anonymous types are not indexed.
    assert!(matches!(spec.type_by_name(""), Err(DecodeError::NotFound(_))));
}

#[test]
fn type_by_name_ambiguous() {
    let bytes = blob(
        ByteOrder::Little,
        &[int(1, 4, IntEncoding::NONE), typedef(1, 1)],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();

    let err = spec.type_by_name("foo").unwrap_err();
    assert!(matches!(
        &err,
        DecodeError::Ambiguous { name, ids } if name == "foo" && ids == &[TypeId(1), TypeId(2)]
    ));

    assert_eq!(spec.type_by_name_kind("foo", Kind::Typedef).unwrap(), TypeId(2));
    assert_eq!(spec.type_by_name_kind("foo", Kind::Int).unwrap(), TypeId(1));
    assert!(matches!(
        spec.type_by_name_kind("foo", Kind::Struct),
        Err(DecodeError::NotFound(_))
    ));
}

#[test]
fn decl_tags_fold_onto_targets() {
    let members = vec![
        RawMember {
            name_off: 5,
            ty: 1,
            offset: 0,
        },
        RawMember {
            name_off: 9,
            ty: 1,
            offset: 32,
        },
    ];
    let bytes = blob(
        ByteOrder::Little,
        &[
            int(1, 4, IntEncoding::SIGNED),
            structure(1, 8, members),
            decl_tag(5, 2, -1),
            decl_tag(9, 2, 1),
        ],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();

    let Type::Struct(s) = spec.type_by_id(TypeId(2)).unwrap() else {
        panic!("expected struct");
    };
    assert_eq!(s.tags, ["bar"]);
    assert!(s.members[0].tags.is_empty());
    assert_eq!(s.members[1].tags, ["baz"]);

    // Decl tags are neither yielded nor looked up by name.
    let ids: Vec<_> = spec.types().map(|r| r.unwrap().0).collect();
    assert_eq!(ids, [TypeId(0), TypeId(1), TypeId(2)]);
    assert!(matches!(spec.type_by_name("baz"), Err(DecodeError::NotFound(_))));
    assert!(matches!(
        spec.type_by_id(TypeId(3)),
        Err(DecodeError::NotAType(TypeId(3)))
    ));
}

#[test]
fn decl_tag_on_func_parameter() {
    let bytes = blob(
        ByteOrder::Little,
        &[
            int(1, 4, IntEncoding::SIGNED),
            func_proto(
                1,
                vec![
                    RawParam { name_off: 5, ty: 1 },
                    RawParam { name_off: 9, ty: 1 },
                ],
            ),
            RawType {
                vlen: FuncLinkage::Global as u16,
                ..RawType::new(Kind::Func, 1, 2)
            },
            decl_tag(5, 3, 1),
        ],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();

    let Type::Func(f) = spec.type_by_id(TypeId(3)).unwrap() else {
        panic!("expected func");
    };
    assert_eq!(f.linkage, FuncLinkage::Global);
    assert_eq!(f.proto, TypeRef::from_raw(2));
    assert_eq!(f.param_tags, vec![vec![], vec!["bar".to_owned()]]);

    assert_eq!(
        spec.type_by_id(TypeId(2)).unwrap(),
        Type::FuncProto(FuncProto {
            ret: TypeRef::from_raw(1),
            params: vec![
                FuncParam::new("bar", TypeRef::from_raw(1)),
                FuncParam::new("baz", TypeRef::from_raw(1)),
            ],
        })
    );
}

#[test]
fn decl_tag_past_last_parameter() {
    for component_idx in [1, 1_000_000, i32::MAX] {
        let bytes = blob(
            ByteOrder::Little,
            &[
                int(1, 4, IntEncoding::SIGNED),
                func_proto(1, vec![RawParam { name_off: 5, ty: 1 }]),
                RawType::new(Kind::Func, 1, 2),
                decl_tag(5, 3, component_idx),
            ],
            STRINGS,
        );
        let spec = Spec::parse(&bytes).unwrap();
        assert!(matches!(
            spec.type_by_id(TypeId(3)),
            Err(DecodeError::InvalidDeclTag { id: TypeId(4) })
        ));
    }
}

#[test]
fn decl_tag_on_untaggable_kind() {
    let bytes = blob(
        ByteOrder::Little,
        &[int(1, 4, IntEncoding::NONE), decl_tag(5, 1, -1)],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();
    assert!(matches!(
        spec.type_by_id(TypeId(1)),
        Err(DecodeError::InvalidDeclTag { id: TypeId(2) })
    ));
}

#[test]
fn decl_tag_on_void() {
    let bytes = blob(ByteOrder::Little, &[decl_tag(5, 0, -1)], STRINGS);
    assert!(matches!(
        Spec::parse(&bytes),
        Err(DecodeError::InvalidDeclTag { id: TypeId(1) })
    ));
}

#[test]
fn to_graph_places_ids_in_slots() {
    let members = vec![RawMember {
        name_off: 5,
        ty: 1,
        offset: 0,
    }];
    let bytes = blob(
        ByteOrder::Little,
        &[
            int(1, 4, IntEncoding::SIGNED),
            structure(9, 4, members),
            decl_tag(5, 2, -1),
            pointer(2),
        ],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();
    let graph = spec.to_graph().unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.get(TypeRef::from_raw(1)).unwrap().name(), "foo");
    assert!(graph.get(TypeRef::from_raw(3)).is_none());
    assert_eq!(
        graph.get(TypeRef::from_raw(4)),
        Some(&Type::Pointer(Pointer {
            target: TypeRef::from_raw(2)
        }))
    );
    let Some(Type::Struct(s)) = graph.get(TypeRef::from_raw(2)) else {
        panic!("expected struct");
    };
    assert_eq!(s.members, [Member::new("bar", TypeRef::from_raw(1), 0)]);
    assert_eq!(s.tags, ["bar"]);
}

#[test]
fn from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&sample(ByteOrder::Big)).unwrap();

    let spec = Spec::from_path(file.path()).unwrap();
    assert_eq!(spec.type_by_name("baz").unwrap(), TypeId(3));
}

#[test]
fn from_path_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Spec::from_path(dir.path().join("missing.btf")).unwrap_err();
    assert!(matches!(err, DecodeError::Io(_)));
}

#[test]
fn dangling_reference() {
    let bytes = blob(ByteOrder::Little, &[pointer(2)], STRINGS);
    let err = Spec::parse(&bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::DanglingType {
            id: TypeId(1),
            target: 2
        }
    ));
}

#[test]
fn invalid_string_table() {
    let bytes = blob(ByteOrder::Little, &[], b"foo\0");
    assert!(matches!(
        Spec::parse(&bytes),
        Err(DecodeError::InvalidStringTable)
    ));

    let bytes = blob(ByteOrder::Little, &[], b"");
    assert!(matches!(
        Spec::parse(&bytes),
        Err(DecodeError::InvalidStringTable)
    ));
}

#[test]
fn invalid_name_offset() {
    let bytes = blob(ByteOrder::Little, &[typedef(40, 0)], STRINGS);
    assert!(matches!(
        Spec::parse(&bytes),
        Err(DecodeError::InvalidStringOffset(40))
    ));
}

#[test]
fn truncated_type_section() {
    let mut bytes = sample(ByteOrder::Little);
    // Shrink type_len by two bytes, cutting the typedef short.
    bytes[12] -= 2;
    let err = Spec::parse(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

#[test]
fn section_out_of_bounds() {
    let mut bytes = sample(ByteOrder::Little);
    bytes.truncate(bytes.len() - 1);
    assert!(matches!(
        Spec::parse(&bytes),
        Err(DecodeError::SectionOutOfBounds {
            section: "string",
            ..
        })
    ));
}

#[test]
fn invalid_func_linkage() {
    let bytes = blob(
        ByteOrder::Little,
        &[
            func_proto(0, Vec::new()),
            RawType {
                vlen: 7,
                ..RawType::new(Kind::Func, 1, 1)
            },
        ],
        STRINGS,
    );
    let spec = Spec::parse(&bytes).unwrap();
    assert!(matches!(
        spec.type_by_id(TypeId(2)),
        Err(DecodeError::InvalidLinkage {
            id: TypeId(2),
            linkage: 7
        })
    ));
}

#[test]
fn unknown_type_id() {
    let spec = Spec::parse(&sample(ByteOrder::Little)).unwrap();
    assert!(matches!(
        spec.type_by_id(TypeId(9)),
        Err(DecodeError::UnknownType(TypeId(9)))
    ));
}
