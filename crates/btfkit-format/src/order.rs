//! Byte order handling.

use crate::DecodeError;

/// Byte order of the multi-byte fields of a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the machine this code runs on.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    pub fn native() -> Self {
        Self::NATIVE
    }

    pub fn put_u16(self, buf: &mut Vec<u8>, v: u16) {
        match self {
            Self::Little => buf.extend_from_slice(&v.to_le_bytes()),
            Self::Big => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn put_u32(self, buf: &mut Vec<u8>, v: u32) {
        match self {
            Self::Little => buf.extend_from_slice(&v.to_le_bytes()),
            Self::Big => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn put_i32(self, buf: &mut Vec<u8>, v: i32) {
        self.put_u32(buf, v as u32);
    }

    pub fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Bounds-checked cursor over a section.
///
/// `base` is the section's position in the whole blob, so errors report
/// absolute offsets.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8], base: usize, order: ByteOrder) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            order,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Absolute offset of the cursor in the blob.
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let end = self.pos + 4;
        let bytes = self
            .bytes
            .get(self.pos..end)
            .ok_or(DecodeError::Truncated {
                offset: self.offset(),
            })?;
        self.pos = end;
        Ok(self.order.u32_from([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_u32().map(|v| v as i32)
    }

    /// Check that `len` more bytes are available without consuming them.
    pub(crate) fn require(&self, len: usize) -> Result<(), DecodeError> {
        if self.pos + len > self.bytes.len() {
            return Err(DecodeError::Truncated {
                offset: self.offset(),
            });
        }
        Ok(())
    }
}
