//! Hand-assembled blobs for decoder tests.

use crate::{ByteOrder, Header, Kind, RawData, RawMember, RawParam, RawType, int_data};
use btfkit_core::IntEncoding;

/// Concatenate a header, `types` and `strings` into a blob.
pub fn blob(order: ByteOrder, types: &[RawType], strings: &[u8]) -> Vec<u8> {
    let mut type_section = Vec::new();
    for ty in types {
        ty.write(&mut type_section, order);
    }

    let header = Header::new(type_section.len() as u32, strings.len() as u32);
    let mut bytes = header.to_bytes(order).to_vec();
    bytes.extend_from_slice(&type_section);
    bytes.extend_from_slice(strings);
    bytes
}

pub fn int(name_off: u32, size: u32, encoding: IntEncoding) -> RawType {
    RawType {
        data: RawData::Int(int_data(encoding, (size * 8) as u8)),
        ..RawType::new(Kind::Int, name_off, size)
    }
}

pub fn pointer(target: u32) -> RawType {
    RawType::new(Kind::Pointer, 0, target)
}

pub fn typedef(name_off: u32, target: u32) -> RawType {
    RawType::new(Kind::Typedef, name_off, target)
}

pub fn structure(name_off: u32, size: u32, members: Vec<RawMember>) -> RawType {
    RawType {
        vlen: members.len() as u16,
        data: RawData::Members(members),
        ..RawType::new(Kind::Struct, name_off, size)
    }
}

pub fn func_proto(ret: u32, params: Vec<RawParam>) -> RawType {
    RawType {
        vlen: params.len() as u16,
        data: RawData::Params(params),
        ..RawType::new(Kind::FuncProto, 0, ret)
    }
}

pub fn decl_tag(name_off: u32, target: u32, component_idx: i32) -> RawType {
    RawType {
        data: RawData::DeclTag { component_idx },
        ..RawType::new(Kind::DeclTag, name_off, target)
    }
}

/// String section `"\0foo\0bar\0baz\0"`: foo at 1, bar at 5, baz at 9.
pub const STRINGS: &[u8] = b"\0foo\0bar\0baz\0";

/// `[1] INT foo`, `[2] PTR -> 1`, `[3] TYPEDEF baz -> 1`.
pub fn sample(order: ByteOrder) -> Vec<u8> {
    blob(
        order,
        &[
            int(1, 2, IntEncoding::SIGNED | IntEncoding::CHAR),
            pointer(1),
            typedef(9, 1),
        ],
        STRINGS,
    )
}
