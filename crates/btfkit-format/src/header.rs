//! Blob header (24 bytes).
//!
//! Layout, all fields in the blob's byte order:
//! - 0-1: magic `0xeB9F`
//! - 2: version, 3: flags
//! - 4-7: header length
//! - 8-23: type and string section offsets and lengths, relative to the end
//!   of the header

use std::ops::Range;

use super::{ByteOrder, DecodeError, MAGIC, VERSION};

/// Length of the header this crate writes.
pub const HEADER_LEN: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: u16,
    pub version: u8,
    pub flags: u8,
    pub hdr_len: u32,
    pub type_off: u32,
    pub type_len: u32,
    pub str_off: u32,
    pub str_len: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            hdr_len: HEADER_LEN as u32,
            type_off: 0,
            type_len: 0,
            str_off: 0,
            str_len: 0,
        }
    }
}

impl Header {
    /// Header for a type section immediately followed by a string section.
    pub fn new(type_len: u32, str_len: u32) -> Self {
        Self {
            type_len,
            str_off: type_len,
            str_len,
            ..Default::default()
        }
    }

    /// Encode to 24 bytes.
    pub fn to_bytes(&self, order: ByteOrder) -> [u8; HEADER_LEN] {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        order.put_u16(&mut buf, self.magic);
        buf.push(self.version);
        buf.push(self.flags);
        order.put_u32(&mut buf, self.hdr_len);
        order.put_u32(&mut buf, self.type_off);
        order.put_u32(&mut buf, self.type_len);
        order.put_u32(&mut buf, self.str_off);
        order.put_u32(&mut buf, self.str_len);

        let mut bytes = [0u8; HEADER_LEN];
        bytes.copy_from_slice(&buf);
        bytes
    }

    /// Decode from the start of a blob, detecting its byte order from the magic.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, ByteOrder), DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::FileTooSmall(bytes.len()));
        }

        let magic = [bytes[0], bytes[1]];
        let order = if ByteOrder::Little.u16_from(magic) == MAGIC {
            ByteOrder::Little
        } else if ByteOrder::Big.u16_from(magic) == MAGIC {
            ByteOrder::Big
        } else {
            return Err(DecodeError::InvalidMagic);
        };

        let u32_at = |at: usize| order.u32_from([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let header = Self {
            magic: MAGIC,
            version: bytes[2],
            flags: bytes[3],
            hdr_len: u32_at(4),
            type_off: u32_at(8),
            type_len: u32_at(12),
            str_off: u32_at(16),
            str_len: u32_at(20),
        };

        if header.version != VERSION {
            return Err(DecodeError::UnsupportedVersion(header.version));
        }
        if (header.hdr_len as usize) < HEADER_LEN || header.hdr_len as usize > bytes.len() {
            return Err(DecodeError::InvalidHeaderLength(header.hdr_len));
        }

        Ok((header, order))
    }

    /// Absolute byte range of the type section, checked against `total`.
    pub fn type_section(&self, total: usize) -> Result<Range<usize>, DecodeError> {
        self.section("type", self.type_off, self.type_len, total)
    }

    /// Absolute byte range of the string section, checked against `total`.
    pub fn string_section(&self, total: usize) -> Result<Range<usize>, DecodeError> {
        self.section("string", self.str_off, self.str_len, total)
    }

    fn section(
        &self,
        section: &'static str,
        off: u32,
        len: u32,
        total: usize,
    ) -> Result<Range<usize>, DecodeError> {
        let start = self.hdr_len as usize + off as usize;
        let end = start + len as usize;
        if end > total {
            return Err(DecodeError::SectionOutOfBounds {
                section,
                start,
                end,
                total,
            });
        }
        Ok(start..end)
    }
}
