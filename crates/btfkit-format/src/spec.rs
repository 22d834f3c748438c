//! Decoder for encoded blobs.
//!
//! [`Spec::parse`] validates the header and every record up front, then
//! inflates [`Type`]s on demand. Decoded references are slot indices equal to
//! type IDs (see [`TypeId::as_type_ref`]), so decoded nodes compare equal to a
//! [`TypeGraph`] built in ID order.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use btfkit_core::{
    Array, Composite, Datasec, Enum, EnumValue, Float, Func, FuncLinkage, FuncParam, FuncProto,
    Fwd, FwdKind, Int, Member, Pointer, Qualifier, Type, TypeGraph, TypeId, TypeTag, Typedef, Var,
    VarLinkage, VarSecinfo,
};
use indexmap::IndexMap;

use super::order::Reader;
use super::raw::{RawData, RawType, int_data_encoding};
use super::{ByteOrder, DecodeError, Header, Kind};

/// Decl tag waiting to be folded onto its target.
#[derive(Clone, Copy, Debug)]
struct PendingTag {
    component: Option<u32>,
    /// Name offset of the tag string.
    name_off: u32,
    id: TypeId,
}

/// A decoded blob.
#[derive(Debug)]
pub struct Spec {
    header: Header,
    order: ByteOrder,
    strings: Vec<u8>,
    /// Record of type ID `n` at index `n - 1`.
    records: Vec<RawType>,
    /// Decl tags by target ID.
    decl_tags: HashMap<u32, Vec<PendingTag>>,
    /// Named types, excluding decl tags and type tags.
    names: IndexMap<String, Vec<TypeId>>,
}

impl Spec {
    /// Decode a blob in either byte order.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (header, order) = Header::from_bytes(bytes)?;
        let type_range = header.type_section(bytes.len())?;
        let string_range = header.string_section(bytes.len())?;

        let strings = bytes[string_range].to_vec();
        if strings.first() != Some(&0) || strings.last() != Some(&0) {
            return Err(DecodeError::InvalidStringTable);
        }

        let records = read_records(bytes, type_range, order)?;
        log::trace!("decoded {} records ({:?} endian)", records.len(), order);

        let mut spec = Self {
            header,
            order,
            strings,
            records,
            decl_tags: HashMap::new(),
            names: IndexMap::new(),
        };
        spec.index()?;
        Ok(spec)
    }

    /// Decode a blob stored in a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Check references and build the name and decl tag indexes.
    fn index(&mut self) -> Result<(), DecodeError> {
        let count = self.records.len() as u32;

        for (i, raw) in self.records.iter().enumerate() {
            let id = TypeId(i as u32 + 1);

            if let Some(&target) = raw.referenced_ids().iter().find(|&&t| t > count) {
                return Err(DecodeError::DanglingType { id, target });
            }

            let name = string_at(&self.strings, raw.name_off)?;

            match raw.data {
                RawData::DeclTag { component_idx } => {
                    let target = raw.size_or_type;
                    let target_is_tag = self
                        .records
                        .get(target.wrapping_sub(1) as usize)
                        .is_some_and(|t| t.kind == Kind::DeclTag);
                    if target == 0 || target_is_tag || component_idx < -1 {
                        return Err(DecodeError::InvalidDeclTag { id });
                    }
                    let component = u32::try_from(component_idx).ok();
                    self.decl_tags.entry(target).or_default().push(PendingTag {
                        component,
                        name_off: raw.name_off,
                        id,
                    });
                }
                _ if raw.kind == Kind::TypeTag || name.is_empty() => {}
                _ => self.names.entry(name.to_owned()).or_default().push(id),
            }
        }

        Ok(())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Number of records, decl tags included. Valid IDs are `0..=len()`.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wire kind of a type ID. Void is [`Kind::Unknown`].
    pub fn kind(&self, id: TypeId) -> Option<Kind> {
        if id.is_void() {
            return Some(Kind::Unknown);
        }
        self.raw_type(id).map(|raw| raw.kind)
    }

    /// The undecoded record of a type ID.
    pub fn raw_type(&self, id: TypeId) -> Option<&RawType> {
        let index = (id.get() as usize).checked_sub(1)?;
        self.records.get(index)
    }

    /// NUL-terminated string starting at `offset` in the string section.
    pub fn string_at(&self, offset: u32) -> Result<&str, DecodeError> {
        string_at(&self.strings, offset)
    }

    /// Decode the type with the given ID.
    pub fn type_by_id(&self, id: TypeId) -> Result<Type, DecodeError> {
        if id.is_void() {
            return Ok(Type::Void);
        }
        let raw = self.raw_type(id).ok_or(DecodeError::UnknownType(id))?;
        let mut ty = self.inflate(id, raw)?;
        let params = self.param_count(raw);

        for tag in self.decl_tags.get(&id.get()).into_iter().flatten() {
            let out_of_range = match (params, tag.component) {
                (Some(params), Some(component)) => component as usize >= params,
                _ => false,
            };
            if out_of_range {
                return Err(DecodeError::InvalidDeclTag { id: tag.id });
            }
            let value = self.string_at(tag.name_off)?.to_owned();
            if !ty.attach_decl_tag(tag.component, value) {
                return Err(DecodeError::InvalidDeclTag { id: tag.id });
            }
        }

        Ok(ty)
    }

    /// Parameter count of a FUNC's prototype, the bound for its decl tag
    /// components. A prototype of the wrong kind has no parameters.
    fn param_count(&self, raw: &RawType) -> Option<usize> {
        if raw.kind != Kind::Func {
            return None;
        }
        let proto = self.raw_type(TypeId(raw.size_or_type));
        Some(match proto {
            Some(proto) if proto.kind == Kind::FuncProto => proto.vlen as usize,
            _ => 0,
        })
    }

    /// Find the only type called `name`.
    ///
    /// Decl tags and type tags are never matched.
    pub fn type_by_name(&self, name: &str) -> Result<TypeId, DecodeError> {
        let ids = self.names.get(name).map(Vec::as_slice).unwrap_or_default();
        unique(name, ids.to_vec())
    }

    /// Find the only type called `name` with wire kind `kind`.
    pub fn type_by_name_kind(&self, name: &str, kind: Kind) -> Result<TypeId, DecodeError> {
        let ids = self
            .names
            .get(name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&id| self.kind(id) == Some(kind))
            .collect();
        unique(name, ids)
    }

    /// Iterate over all types in ID order, starting with void.
    ///
    /// Decl tag records are skipped; their tags show up on their targets.
    pub fn types(&self) -> Types<'_> {
        Types { spec: self, next: 0 }
    }

    /// Rebuild an arena where slot `n` holds the type with ID `n`.
    ///
    /// Slots of decl tag records are reserved and left undefined.
    pub fn to_graph(&self) -> Result<TypeGraph, DecodeError> {
        let mut graph = TypeGraph::new();
        for i in 1..=self.records.len() as u32 {
            let id = TypeId(i);
            let slot = if self.kind(id) == Some(Kind::DeclTag) {
                graph.reserve()
            } else {
                graph.add(self.type_by_id(id)?)
            };
            debug_assert_eq!(slot, id.as_type_ref());
        }
        Ok(graph)
    }

    fn inflate(&self, id: TypeId, raw: &RawType) -> Result<Type, DecodeError> {
        let name = self.string_at(raw.name_off)?.to_owned();
        let target = TypeId(raw.size_or_type).as_type_ref();

        let ty = match (&raw.kind, &raw.data) {
            (Kind::Int, RawData::Int(data)) => Type::Int(Int {
                name,
                size: raw.size_or_type,
                encoding: int_data_encoding(*data),
            }),
            (Kind::Pointer, _) => Type::Pointer(Pointer { target }),
            (
                Kind::Array,
                RawData::Array {
                    element,
                    index,
                    nelems,
                },
            ) => Type::Array(Array {
                element: TypeId(*element).as_type_ref(),
                index: TypeId(*index).as_type_ref(),
                nelems: *nelems,
            }),
            (Kind::Struct | Kind::Union, RawData::Members(members)) => {
                let mut out = Vec::with_capacity(members.len());
                for m in members {
                    let (offset, bitfield_size) = if raw.kind_flag {
                        (m.offset & 0x00ff_ffff, m.offset >> 24)
                    } else {
                        (m.offset, 0)
                    };
                    out.push(Member {
                        name: self.string_at(m.name_off)?.to_owned(),
                        ty: TypeId(m.ty).as_type_ref(),
                        offset,
                        bitfield_size,
                        tags: Vec::new(),
                    });
                }
                let composite = Composite {
                    name,
                    size: raw.size_or_type,
                    members: out,
                    tags: Vec::new(),
                };
                if raw.kind == Kind::Struct {
                    Type::Struct(composite)
                } else {
                    Type::Union(composite)
                }
            }
            (Kind::Enum, RawData::Enum(values)) => {
                let mut out = Vec::with_capacity(values.len());
                for v in values {
                    let value = if raw.kind_flag {
                        v.value as i32 as i64 as u64
                    } else {
                        v.value as u64
                    };
                    out.push(EnumValue::new(self.string_at(v.name_off)?, value));
                }
                Type::Enum(Enum {
                    name,
                    size: raw.size_or_type,
                    signed: raw.kind_flag,
                    values: out,
                })
            }
            (Kind::Enum64, RawData::Enum64(values)) => {
                let mut out = Vec::with_capacity(values.len());
                for v in values {
                    let value = (v.hi as u64) << 32 | v.lo as u64;
                    out.push(EnumValue::new(self.string_at(v.name_off)?, value));
                }
                Type::Enum(Enum {
                    name,
                    size: raw.size_or_type,
                    signed: raw.kind_flag,
                    values: out,
                })
            }
            (Kind::Fwd, _) => Type::Fwd(Fwd {
                name,
                kind: if raw.kind_flag {
                    FwdKind::Union
                } else {
                    FwdKind::Struct
                },
            }),
            (Kind::Typedef, _) => Type::Typedef(Typedef {
                name,
                target,
                tags: Vec::new(),
            }),
            (Kind::Volatile, _) => Type::Volatile(Qualifier { target }),
            (Kind::Const, _) => Type::Const(Qualifier { target }),
            (Kind::Restrict, _) => Type::Restrict(Qualifier { target }),
            (Kind::Func, _) => {
                let linkage = FuncLinkage::from_u32(raw.vlen as u32).ok_or(
                    DecodeError::InvalidLinkage {
                        id,
                        linkage: raw.vlen as u32,
                    },
                )?;
                Type::Func(Func {
                    name,
                    proto: target,
                    linkage,
                    tags: Vec::new(),
                    param_tags: Vec::new(),
                })
            }
            (Kind::FuncProto, RawData::Params(params)) => {
                let mut out = Vec::with_capacity(params.len());
                for p in params {
                    out.push(FuncParam::new(
                        self.string_at(p.name_off)?,
                        TypeId(p.ty).as_type_ref(),
                    ));
                }
                Type::FuncProto(FuncProto {
                    ret: target,
                    params: out,
                })
            }
            (Kind::Var, RawData::Var { linkage }) => Type::Var(Var {
                name,
                ty: target,
                linkage: VarLinkage::from_u32(*linkage).ok_or(DecodeError::InvalidLinkage {
                    id,
                    linkage: *linkage,
                })?,
                tags: Vec::new(),
            }),
            (Kind::Datasec, RawData::Datasec(vars)) => Type::Datasec(Datasec {
                name,
                size: raw.size_or_type,
                vars: vars
                    .iter()
                    .map(|v| VarSecinfo {
                        var: TypeId(v.ty).as_type_ref(),
                        offset: v.offset,
                        size: v.size,
                    })
                    .collect(),
            }),
            (Kind::Float, _) => Type::Float(Float {
                name,
                size: raw.size_or_type,
            }),
            (Kind::TypeTag, _) => Type::TypeTag(TypeTag {
                value: name,
                target,
            }),
            (Kind::DeclTag, _) => return Err(DecodeError::NotAType(id)),
            // `RawType::read` pairs every kind with its payload, and never
            // yields `Kind::Unknown`.
            _ => return Err(DecodeError::UnknownType(id)),
        };

        Ok(ty)
    }
}

/// Lazy iterator over the types of a [`Spec`], see [`Spec::types`].
#[derive(Debug, Clone)]
pub struct Types<'a> {
    spec: &'a Spec,
    next: u32,
}

impl Iterator for Types<'_> {
    type Item = Result<(TypeId, Type), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next as usize <= self.spec.len() {
            let id = TypeId(self.next);
            self.next += 1;
            if self.spec.kind(id) == Some(Kind::DeclTag) {
                continue;
            }
            return Some(self.spec.type_by_id(id).map(|ty| (id, ty)));
        }
        None
    }
}

fn read_records(
    bytes: &[u8],
    range: Range<usize>,
    order: ByteOrder,
) -> Result<Vec<RawType>, DecodeError> {
    let base = range.start;
    let mut reader = Reader::new(&bytes[range], base, order);
    let mut records = Vec::new();
    while !reader.is_empty() {
        records.push(RawType::read(&mut reader)?);
    }
    Ok(records)
}

fn string_at(strings: &[u8], offset: u32) -> Result<&str, DecodeError> {
    let tail = strings
        .get(offset as usize..)
        .filter(|tail| !tail.is_empty())
        .ok_or(DecodeError::InvalidStringOffset(offset))?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::InvalidStringOffset(offset))?;
    std::str::from_utf8(&tail[..end]).map_err(|_| DecodeError::InvalidString(offset))
}

fn unique(name: &str, ids: Vec<TypeId>) -> Result<TypeId, DecodeError> {
    match ids.as_slice() {
        [] => Err(DecodeError::NotFound(name.to_owned())),
        [id] => Ok(*id),
        _ => Err(DecodeError::Ambiguous {
            name: name.to_owned(),
            ids,
        }),
    }
}
