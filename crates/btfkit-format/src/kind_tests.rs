use crate::Kind;

#[test]
fn from_u8_covers_every_kind() {
    for v in 0..=19u8 {
        let kind = Kind::from_u8(v).expect("known kind");
        assert_eq!(kind as u8, v);
    }
    assert_eq!(Kind::from_u8(20), None);
    assert_eq!(Kind::from_u8(0x1f), None);
}

#[test]
fn payload_sizes() {
    assert_eq!(Kind::Int.payload_size(0), 4);
    assert_eq!(Kind::Pointer.payload_size(0), 0);
    assert_eq!(Kind::Array.payload_size(0), 12);
    assert_eq!(Kind::Struct.payload_size(3), 36);
    assert_eq!(Kind::Enum.payload_size(3), 24);
    assert_eq!(Kind::Enum64.payload_size(3), 36);
    assert_eq!(Kind::FuncProto.payload_size(2), 16);
    // Func keeps its linkage in vlen, which does not size a payload.
    assert_eq!(Kind::Func.payload_size(1), 0);
    assert_eq!(Kind::DeclTag.payload_size(0), 4);
}

#[test]
fn type_references() {
    assert!(Kind::Pointer.refers_to_type());
    assert!(Kind::FuncProto.refers_to_type());
    assert!(Kind::DeclTag.refers_to_type());
    assert!(!Kind::Int.refers_to_type());
    assert!(!Kind::Struct.refers_to_type());
    assert!(!Kind::Array.refers_to_type());
    assert!(!Kind::Float.refers_to_type());
}

#[test]
fn names() {
    assert_eq!(Kind::FuncProto.name(), "FUNC_PROTO");
    assert_eq!(Kind::Pointer.name(), "PTR");
    assert_eq!(Kind::Enum64.name(), "ENUM64");
}
