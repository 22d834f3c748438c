//! String section builder.

use std::collections::HashMap;

use btfkit_format::MAX_NAME_OFFSET;

use crate::MarshalError;

/// Deduplicated, NUL-terminated string section.
///
/// Offset 0 always holds the empty string, so anonymous names cost nothing.
#[derive(Debug)]
pub struct StringTable {
    offsets: HashMap<String, u32>,
    bytes: Vec<u8>,
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            offsets: HashMap::from([(String::new(), 0)]),
            bytes: vec![0],
        }
    }

    /// Offset of `s`, appending it on first use.
    pub fn add(&mut self, s: &str) -> Result<u32, MarshalError> {
        if let Some(&offset) = self.offsets.get(s) {
            return Ok(offset);
        }
        if s.contains('\0') {
            return Err(MarshalError::StringContainsNul(s.to_owned()));
        }

        // Bound the section end, not only the start offset.
        let end = self.bytes.len() + s.len() + 1;
        if end > MAX_NAME_OFFSET as usize {
            return Err(MarshalError::NameOffsetOverflow);
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(s.to_owned(), offset);
        Ok(offset)
    }

    /// Section length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false, the section holds at least the empty string.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
