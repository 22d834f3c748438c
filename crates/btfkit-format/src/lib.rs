//! BTF wire format.
//!
//! This crate contains:
//! - Format constants and the 24-byte [`Header`]
//! - Raw record layouts ([`RawType`]) shared by encoder and decoder
//! - The decoder ([`Spec`]) turning a blob back into [`btfkit_core::Type`]s
//! - A human-readable [`dump`] for debugging and snapshot tests
//!
//! Only byte order varies between blobs. The record layout of every kind is
//! fixed.

mod dump;
mod error;
mod header;
mod kind;
mod order;
mod raw;
mod spec;

#[cfg(test)]
mod kind_tests;
#[cfg(test)]
mod spec_tests;
#[cfg(test)]
mod test_utils;

pub use dump::dump;
pub use error::DecodeError;
pub use header::{HEADER_LEN, Header};
pub use kind::Kind;
pub use order::ByteOrder;
pub use raw::{
    RawData, RawEnum, RawEnum64, RawMember, RawParam, RawSecinfo, RawType, int_data,
    int_data_bits, int_data_encoding, member_offset,
};
pub use spec::{Spec, Types};

/// Magic number at the start of every blob, in the blob's byte order.
pub const MAGIC: u16 = 0xeB9F;

/// Format version.
pub const VERSION: u8 = 1;

/// Largest type ID the kernel accepts.
pub const MAX_TYPE_ID: u32 = 0x000f_ffff;

/// Largest member, parameter or enumerator count of one record.
pub const MAX_VLEN: u32 = 0xffff;

/// Largest string offset the kernel accepts in a name field.
pub const MAX_NAME_OFFSET: u32 = 0x00ff_ffff;

/// Largest bit offset of a bitfield member.
pub const MAX_BITFIELD_OFFSET: u32 = 0x00ff_ffff;

/// Largest width of a bitfield member.
pub const MAX_BITFIELD_SIZE: u32 = 0xff;
