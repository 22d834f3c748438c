//! Compatibility downgrades.
//!
//! Older kernels reject kinds they do not know. Each downgrade swaps such a
//! node for one built from kinds every loader understands, keeping size and
//! layout intact. The graph is never touched: replacements are fresh values
//! that live only for one encoding pass.

use btfkit_core::{Enum, Func, FuncLinkage, Int, IntEncoding, Qualifier, Type};

use crate::MarshalOptions;

/// Name of the integer typing every member of a downgraded 64-bit enum.
pub const ENUM64_PLACEHOLDER: &str = "enum64_placeholder";

/// Name of the integer emitted in place of a decl tag record.
pub const DECL_TAG_PLACEHOLDER: &str = "decl_tag_placeholder";

/// How a node is encoded under a set of options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rewrite<'a> {
    /// Encode as is.
    Keep(&'a Type),
    /// Encode this node instead.
    Replace(Type),
    /// Encode as a union of the same name and size with one member per
    /// enumerator, all typed by the shared [`enum64_placeholder`].
    Enum64Union(&'a Enum),
    /// Encode the enum with its signed flag cleared.
    UnsignedEnum(&'a Enum),
}

/// Decide how `ty` is encoded. Decl tags are handled by the encoder since
/// they are separate records.
pub fn rewrite<'a>(ty: &'a Type, options: &MarshalOptions) -> Rewrite<'a> {
    match ty {
        Type::Enum(e) if options.replace_enum64 && e.is_64bit() => Rewrite::Enum64Union(e),
        // Kernels without enum64 support also reject the signed flag.
        Type::Enum(e) if options.replace_enum64 && e.signed => Rewrite::UnsignedEnum(e),
        Type::TypeTag(tag) if options.replace_type_tags => {
            Rewrite::Replace(Type::Const(Qualifier { target: tag.target }))
        }
        Type::Func(func) if options.strip_func_linkage && func.linkage != FuncLinkage::Static => {
            Rewrite::Replace(Type::Func(Func {
                linkage: FuncLinkage::Static,
                ..func.clone()
            }))
        }
        _ => Rewrite::Keep(ty),
    }
}

/// Storage integer of a downgraded 64-bit enum.
pub fn enum64_placeholder(signed: bool) -> Int {
    let encoding = if signed {
        IntEncoding::SIGNED
    } else {
        IntEncoding::NONE
    };
    Int::new(ENUM64_PLACEHOLDER, 8, encoding)
}

/// Inert integer taking the ID a decl tag record would have had.
pub fn decl_tag_placeholder() -> Int {
    Int::new(DECL_TAG_PLACEHOLDER, 1, IntEncoding::NONE)
}
