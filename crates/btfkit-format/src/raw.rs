//! Raw record layouts.
//!
//! Every record starts with a 12-byte common part:
//! - `name_off`: string section offset of the name
//! - `info`: vlen in bits 0-15, kind in bits 24-28, kind_flag in bit 31
//! - `size_or_type`: byte size or referenced type ID, depending on kind
//!
//! followed by a kind-specific payload. IDs here are plain `u32`; resolving
//! them to graph nodes is the decoder's job.

use btfkit_core::IntEncoding;

use super::order::Reader;
use super::{ByteOrder, DecodeError, Kind};

const KIND_SHIFT: u32 = 24;
const KIND_MASK: u32 = 0x1f;
const VLEN_MASK: u32 = 0xffff;
const KIND_FLAG: u32 = 1 << 31;

/// One encoded type record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawType {
    pub name_off: u32,
    pub kind: Kind,
    /// Member count, or linkage for [`Kind::Func`].
    pub vlen: u16,
    pub kind_flag: bool,
    pub size_or_type: u32,
    pub data: RawData,
}

/// Kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawData {
    None,
    /// Packed encoding, bit offset and bit width, see [`int_data`].
    Int(u32),
    Array {
        element: u32,
        index: u32,
        nelems: u32,
    },
    Members(Vec<RawMember>),
    Enum(Vec<RawEnum>),
    Enum64(Vec<RawEnum64>),
    Params(Vec<RawParam>),
    Var {
        linkage: u32,
    },
    Datasec(Vec<RawSecinfo>),
    DeclTag {
        /// -1 tags the target itself.
        component_idx: i32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMember {
    pub name_off: u32,
    pub ty: u32,
    /// Bit offset, packed with the bitfield width when `kind_flag` is set.
    pub offset: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEnum {
    pub name_off: u32,
    pub value: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEnum64 {
    pub name_off: u32,
    pub lo: u32,
    pub hi: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawParam {
    pub name_off: u32,
    pub ty: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSecinfo {
    pub ty: u32,
    pub offset: u32,
    pub size: u32,
}

/// Pack an integer's encoding and width.
pub fn int_data(encoding: IntEncoding, bits: u8) -> u32 {
    (encoding.bits() as u32 & 0x0f) << 24 | bits as u32
}

pub fn int_data_encoding(data: u32) -> IntEncoding {
    IntEncoding::from_bits(((data >> 24) & 0x0f) as u8)
}

pub fn int_data_bits(data: u32) -> u8 {
    (data & 0xff) as u8
}

/// Pack a member offset. Bitfields keep their width in the top byte.
pub fn member_offset(bit_offset: u32, bitfield_size: u32, kind_flag: bool) -> u32 {
    if kind_flag {
        bitfield_size << 24 | (bit_offset & 0x00ff_ffff)
    } else {
        bit_offset
    }
}

impl RawType {
    /// Record with no payload.
    pub fn new(kind: Kind, name_off: u32, size_or_type: u32) -> Self {
        Self {
            name_off,
            kind,
            vlen: 0,
            kind_flag: false,
            size_or_type,
            data: RawData::None,
        }
    }

    pub fn info(&self) -> u32 {
        let mut info = (self.kind as u32) << KIND_SHIFT | self.vlen as u32;
        if self.kind_flag {
            info |= KIND_FLAG;
        }
        info
    }

    /// Encoded length in bytes.
    pub fn size(&self) -> usize {
        12 + self.kind.payload_size(self.vlen)
    }

    /// Append the record to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>, order: ByteOrder) {
        order.put_u32(buf, self.name_off);
        order.put_u32(buf, self.info());
        order.put_u32(buf, self.size_or_type);

        match &self.data {
            RawData::None => {}
            RawData::Int(data) => order.put_u32(buf, *data),
            RawData::Array {
                element,
                index,
                nelems,
            } => {
                order.put_u32(buf, *element);
                order.put_u32(buf, *index);
                order.put_u32(buf, *nelems);
            }
            RawData::Members(members) => {
                for m in members {
                    order.put_u32(buf, m.name_off);
                    order.put_u32(buf, m.ty);
                    order.put_u32(buf, m.offset);
                }
            }
            RawData::Enum(values) => {
                for v in values {
                    order.put_u32(buf, v.name_off);
                    order.put_u32(buf, v.value);
                }
            }
            RawData::Enum64(values) => {
                for v in values {
                    order.put_u32(buf, v.name_off);
                    order.put_u32(buf, v.lo);
                    order.put_u32(buf, v.hi);
                }
            }
            RawData::Params(params) => {
                for p in params {
                    order.put_u32(buf, p.name_off);
                    order.put_u32(buf, p.ty);
                }
            }
            RawData::Var { linkage } => order.put_u32(buf, *linkage),
            RawData::Datasec(vars) => {
                for v in vars {
                    order.put_u32(buf, v.ty);
                    order.put_u32(buf, v.offset);
                    order.put_u32(buf, v.size);
                }
            }
            RawData::DeclTag { component_idx } => order.put_i32(buf, *component_idx),
        }
    }

    /// Read one record, advancing the reader past it.
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let start = reader.offset();
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size_or_type = reader.read_u32()?;

        let raw_kind = ((info >> KIND_SHIFT) & KIND_MASK) as u8;
        let kind = match Kind::from_u8(raw_kind) {
            Some(Kind::Unknown) | None => {
                return Err(DecodeError::UnknownKind {
                    kind: raw_kind,
                    offset: start,
                });
            }
            Some(kind) => kind,
        };
        let vlen = (info & VLEN_MASK) as u16;
        reader.require(kind.payload_size(vlen))?;

        let count = vlen as usize;
        let data = match kind {
            Kind::Int => RawData::Int(reader.read_u32()?),
            Kind::Array => RawData::Array {
                element: reader.read_u32()?,
                index: reader.read_u32()?,
                nelems: reader.read_u32()?,
            },
            Kind::Struct | Kind::Union => {
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    members.push(RawMember {
                        name_off: reader.read_u32()?,
                        ty: reader.read_u32()?,
                        offset: reader.read_u32()?,
                    });
                }
                RawData::Members(members)
            }
            Kind::Enum => {
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(RawEnum {
                        name_off: reader.read_u32()?,
                        value: reader.read_u32()?,
                    });
                }
                RawData::Enum(values)
            }
            Kind::Enum64 => {
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(RawEnum64 {
                        name_off: reader.read_u32()?,
                        lo: reader.read_u32()?,
                        hi: reader.read_u32()?,
                    });
                }
                RawData::Enum64(values)
            }
            Kind::FuncProto => {
                let mut params = Vec::with_capacity(count);
                for _ in 0..count {
                    params.push(RawParam {
                        name_off: reader.read_u32()?,
                        ty: reader.read_u32()?,
                    });
                }
                RawData::Params(params)
            }
            Kind::Var => RawData::Var {
                linkage: reader.read_u32()?,
            },
            Kind::Datasec => {
                let mut vars = Vec::with_capacity(count);
                for _ in 0..count {
                    vars.push(RawSecinfo {
                        ty: reader.read_u32()?,
                        offset: reader.read_u32()?,
                        size: reader.read_u32()?,
                    });
                }
                RawData::Datasec(vars)
            }
            Kind::DeclTag => RawData::DeclTag {
                component_idx: reader.read_i32()?,
            },
            _ => RawData::None,
        };

        Ok(Self {
            name_off,
            kind,
            vlen,
            kind_flag: info & KIND_FLAG != 0,
            size_or_type,
            data,
        })
    }

    /// Every type ID this record refers to, in field order.
    pub fn referenced_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        if self.kind.refers_to_type() {
            ids.push(self.size_or_type);
        }
        match &self.data {
            RawData::Array { element, index, .. } => ids.extend([*element, *index]),
            RawData::Members(members) => ids.extend(members.iter().map(|m| m.ty)),
            RawData::Params(params) => ids.extend(params.iter().map(|p| p.ty)),
            RawData::Datasec(vars) => ids.extend(vars.iter().map(|v| v.ty)),
            _ => {}
        }
        ids
    }
}
