//! Encoding options.

use btfkit_format::ByteOrder;

/// Controls byte order and compatibility downgrades of [`Builder::marshal`].
///
/// [`Builder::marshal`]: crate::Builder::marshal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarshalOptions {
    /// Byte order of every multi-byte field.
    pub order: ByteOrder,
    /// Encode 64-bit enums as unions of placeholder integers, and 32-bit
    /// enums as unsigned.
    pub replace_enum64: bool,
    /// Emit a placeholder integer instead of each decl tag record.
    pub replace_decl_tags: bool,
    /// Encode type tags as `const`.
    pub replace_type_tags: bool,
    /// Encode every function with static linkage.
    pub strip_func_linkage: bool,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            order: ByteOrder::NATIVE,
            replace_enum64: false,
            replace_decl_tags: false,
            replace_type_tags: false,
            strip_func_linkage: false,
        }
    }
}

impl MarshalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for blobs handed straight to the running kernel, which may
    /// predate enum64, decl tags and type tags.
    pub fn kernel() -> Self {
        Self {
            replace_enum64: true,
            replace_decl_tags: true,
            replace_type_tags: true,
            ..Self::default()
        }
    }

    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn replace_enum64(mut self, value: bool) -> Self {
        self.replace_enum64 = value;
        self
    }

    pub fn replace_decl_tags(mut self, value: bool) -> Self {
        self.replace_decl_tags = value;
        self
    }

    pub fn replace_type_tags(mut self, value: bool) -> Self {
        self.replace_type_tags = value;
        self
    }

    pub fn strip_func_linkage(mut self, value: bool) -> Self {
        self.strip_func_linkage = value;
        self
    }
}
