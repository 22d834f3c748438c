//! The BTF type model.
//!
//! [`Type`] is a closed sum type with one payload per kind. Payloads refer to
//! other nodes through [`TypeRef`], never by ownership.

use std::ops::BitOr;

use crate::TypeRef;

/// A node in the type graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// The implicit "no type". Only ever lives in slot 0.
    Void,
    Int(Int),
    Pointer(Pointer),
    Array(Array),
    Struct(Composite),
    Union(Composite),
    /// 32-bit or 64-bit enumeration, selected by `size`.
    Enum(Enum),
    Fwd(Fwd),
    Typedef(Typedef),
    Volatile(Qualifier),
    Const(Qualifier),
    Restrict(Qualifier),
    Func(Func),
    FuncProto(FuncProto),
    Var(Var),
    Datasec(Datasec),
    Float(Float),
    TypeTag(TypeTag),
}

/// Encoding bits of an integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct IntEncoding(u8);

impl IntEncoding {
    pub const NONE: Self = Self(0);
    pub const SIGNED: Self = Self(1 << 0);
    pub const CHAR: Self = Self(1 << 1);
    pub const BOOL: Self = Self(1 << 2);

    /// Create from raw bits. Unknown bits are kept.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        self.contains(Self::SIGNED)
    }
}

impl BitOr for IntEncoding {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Int {
    pub name: String,
    /// Size in bytes.
    pub size: u32,
    pub encoding: IntEncoding,
}

impl Int {
    pub fn new(name: impl Into<String>, size: u32, encoding: IntEncoding) -> Self {
        Self {
            name: name.into(),
            size,
            encoding,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pointer {
    pub target: TypeRef,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Array {
    pub element: TypeRef,
    /// Type of the index, usually an integer.
    pub index: TypeRef,
    pub nelems: u32,
}

/// Shared payload of structs and unions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composite {
    pub name: String,
    /// Size in bytes.
    pub size: u32,
    pub members: Vec<Member>,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
    /// Offset from the start of the composite, in bits.
    pub offset: u32,
    /// Width in bits for bitfields, 0 otherwise.
    pub bitfield_size: u32,
    pub tags: Vec<String>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeRef, offset: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            offset,
            bitfield_size: 0,
            tags: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    /// Size in bytes. 8 selects the 64-bit wire encoding.
    pub size: u32,
    pub signed: bool,
    pub values: Vec<EnumValue>,
}

impl Enum {
    /// Whether the enum needs the 64-bit wire encoding.
    #[inline]
    pub fn is_64bit(&self) -> bool {
        self.size == 8
    }
}

/// An enumerator. Signed values are stored two's complement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: u64,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum FwdKind {
    #[default]
    Struct,
    Union,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fwd {
    pub name: String,
    pub kind: FwdKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Typedef {
    pub name: String,
    pub target: TypeRef,
    pub tags: Vec<String>,
}

/// Payload of `volatile`, `const` and `restrict`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Qualifier {
    pub target: TypeRef,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum FuncLinkage {
    #[default]
    Static = 0,
    Global = 1,
    Extern = 2,
}

impl FuncLinkage {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Static),
            1 => Some(Self::Global),
            2 => Some(Self::Extern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Global => "global",
            Self::Extern => "extern",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Func {
    pub name: String,
    /// Must refer to a [`FuncProto`].
    pub proto: TypeRef,
    pub linkage: FuncLinkage,
    pub tags: Vec<String>,
    /// Decl tags per parameter, indexed like the prototype's parameters.
    pub param_tags: Vec<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuncProto {
    /// Return type, void for none.
    pub ret: TypeRef,
    pub params: Vec<FuncParam>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuncParam {
    pub name: String,
    pub ty: TypeRef,
}

impl FuncParam {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum VarLinkage {
    #[default]
    Static = 0,
    GlobalAllocated = 1,
    Extern = 2,
}

impl VarLinkage {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Static),
            1 => Some(Self::GlobalAllocated),
            2 => Some(Self::Extern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::GlobalAllocated => "global",
            Self::Extern => "extern",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    pub ty: TypeRef,
    pub linkage: VarLinkage,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Datasec {
    pub name: String,
    pub size: u32,
    pub vars: Vec<VarSecinfo>,
}

/// Placement of a variable inside a data section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VarSecinfo {
    /// Must refer to a [`Var`].
    pub var: TypeRef,
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Float {
    pub name: String,
    pub size: u32,
}

/// Attaches a free-form tag to the type it wraps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeTag {
    pub value: String,
    pub target: TypeRef,
}

impl Type {
    /// Name of the node, empty for anonymous kinds.
    ///
    /// For a [`TypeTag`] this is the tag value, which is what the wire
    /// format stores in the name slot.
    pub fn name(&self) -> &str {
        match self {
            Self::Int(t) => &t.name,
            Self::Struct(t) | Self::Union(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Fwd(t) => &t.name,
            Self::Typedef(t) => &t.name,
            Self::Func(t) => &t.name,
            Self::Var(t) => &t.name,
            Self::Datasec(t) => &t.name,
            Self::Float(t) => &t.name,
            Self::TypeTag(t) => &t.value,
            Self::Void
            | Self::Pointer(_)
            | Self::Array(_)
            | Self::Volatile(_)
            | Self::Const(_)
            | Self::Restrict(_)
            | Self::FuncProto(_) => "",
        }
    }

    /// Short lowercase name of the kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int(_) => "int",
            Self::Pointer(_) => "pointer",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Union(_) => "union",
            Self::Enum(e) if e.is_64bit() => "enum64",
            Self::Enum(_) => "enum",
            Self::Fwd(_) => "fwd",
            Self::Typedef(_) => "typedef",
            Self::Volatile(_) => "volatile",
            Self::Const(_) => "const",
            Self::Restrict(_) => "restrict",
            Self::Func(_) => "func",
            Self::FuncProto(_) => "func_proto",
            Self::Var(_) => "var",
            Self::Datasec(_) => "datasec",
            Self::Float(_) => "float",
            Self::TypeTag(_) => "type_tag",
        }
    }

    /// Referenced nodes, in field order.
    ///
    /// Void references are included; callers that walk the graph skip them.
    pub fn references(&self) -> Vec<TypeRef> {
        match self {
            Self::Void | Self::Int(_) | Self::Enum(_) | Self::Fwd(_) | Self::Float(_) => Vec::new(),
            Self::Pointer(p) => vec![p.target],
            Self::Array(a) => vec![a.element, a.index],
            Self::Struct(c) | Self::Union(c) => c.members.iter().map(|m| m.ty).collect(),
            Self::Typedef(t) => vec![t.target],
            Self::Volatile(q) | Self::Const(q) | Self::Restrict(q) => vec![q.target],
            Self::Func(f) => vec![f.proto],
            Self::FuncProto(p) => std::iter::once(p.ret)
                .chain(p.params.iter().map(|param| param.ty))
                .collect(),
            Self::Var(v) => vec![v.ty],
            Self::Datasec(d) => d.vars.iter().map(|v| v.var).collect(),
            Self::TypeTag(t) => vec![t.target],
        }
    }

    /// Declaration tags carried by this node.
    ///
    /// Yields `(component, tag)`: component `None` tags the node itself,
    /// `Some(i)` tags member or parameter `i`.
    pub fn decl_tags(&self) -> Vec<(Option<u32>, &str)> {
        let mut tags = Vec::new();
        match self {
            Self::Typedef(t) => push_tags(&mut tags, None, &t.tags),
            Self::Var(v) => push_tags(&mut tags, None, &v.tags),
            Self::Struct(c) | Self::Union(c) => {
                push_tags(&mut tags, None, &c.tags);
                for (i, member) in c.members.iter().enumerate() {
                    push_tags(&mut tags, Some(i as u32), &member.tags);
                }
            }
            Self::Func(f) => {
                push_tags(&mut tags, None, &f.tags);
                for (i, param) in f.param_tags.iter().enumerate() {
                    push_tags(&mut tags, Some(i as u32), param);
                }
            }
            _ => {}
        }
        tags
    }

    /// Attach a decoded decl tag. Returns `false` if this kind cannot carry
    /// one or the component is out of range.
    pub fn attach_decl_tag(&mut self, component: Option<u32>, tag: String) -> bool {
        match (self, component) {
            (Self::Typedef(t), None) => t.tags.push(tag),
            (Self::Var(v), None) => v.tags.push(tag),
            (Self::Struct(c) | Self::Union(c), None) => c.tags.push(tag),
            (Self::Struct(c) | Self::Union(c), Some(i)) => match c.members.get_mut(i as usize) {
                Some(member) => member.tags.push(tag),
                None => return false,
            },
            (Self::Func(f), None) => f.tags.push(tag),
            (Self::Func(f), Some(i)) => {
                let i = i as usize;
                if f.param_tags.len() <= i {
                    f.param_tags.resize(i + 1, Vec::new());
                }
                f.param_tags[i].push(tag);
            }
            _ => return false,
        }
        true
    }
}

fn push_tags<'a>(out: &mut Vec<(Option<u32>, &'a str)>, component: Option<u32>, tags: &'a [String]) {
    out.extend(tags.iter().map(|tag| (component, tag.as_str())));
}
