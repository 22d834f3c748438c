//! Single-pass blob encoder.
//!
//! One [`Encoder`] lives for one [`Builder::marshal`] call. It works on a
//! copy of the builder's registry, so IDs handed out for discovered nodes,
//! decl tags and placeholders never leak back into the builder.
//!
//! Records must appear in ID order. Every ID allocation is paired with a push
//! onto the pending queue, so popping the queue yields IDs 1, 2, 3, ...
//!
//! [`Builder::marshal`]: crate::Builder::marshal

use std::collections::{HashSet, VecDeque};

use btfkit_core::{Enum, Func, FwdKind, Int, Type, TypeGraph, TypeId, TypeRef, walk};
use btfkit_format::{
    HEADER_LEN, Header, Kind, MAX_BITFIELD_OFFSET, MAX_BITFIELD_SIZE, RawData, RawEnum, RawEnum64,
    RawMember, RawParam, RawSecinfo, RawType, int_data, member_offset,
};

use crate::rewrite::{Rewrite, decl_tag_placeholder, enum64_placeholder, rewrite};
use crate::{MarshalError, MarshalOptions, Registry, StringTable};

/// A record waiting for its turn, in ID order.
#[derive(Debug)]
enum Pending {
    Node(TypeRef),
    /// Synthetic integer inserted by a downgrade.
    Placeholder(Int),
    DeclTag {
        target: TypeId,
        component: Option<u32>,
        value: String,
    },
}

pub(crate) struct Encoder<'a> {
    graph: &'a TypeGraph,
    options: &'a MarshalOptions,
    ids: Registry,
    visited: HashSet<TypeRef>,
    pending: VecDeque<Pending>,
    strings: StringTable,
    types: Vec<u8>,
    /// Shared enum64 storage integers, unsigned at 0 and signed at 1.
    enum64_placeholders: [Option<TypeId>; 2],
    /// ID of the last record written.
    emitted: u32,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(graph: &'a TypeGraph, registry: &Registry, options: &'a MarshalOptions) -> Self {
        Self {
            graph,
            options,
            ids: registry.clone(),
            visited: HashSet::new(),
            pending: registry.refs().map(Pending::Node).collect(),
            strings: StringTable::new(),
            types: Vec::new(),
            enum64_placeholders: [None; 2],
            emitted: 0,
        }
    }

    /// Encode everything reachable from the roots and append the blob to `buf`.
    pub(crate) fn encode(mut self, mut buf: Vec<u8>) -> Result<Vec<u8>, MarshalError> {
        while let Some(item) = self.pending.pop_front() {
            self.emitted += 1;
            let id = TypeId(self.emitted);

            match item {
                Pending::Node(r) => {
                    self.discover(r)?;
                    debug_assert_eq!(self.ids.get(r), Some(id));
                    self.deflate_node(id, r)?;
                }
                Pending::Placeholder(int) => {
                    let raw = self.deflate_int(id, &int)?;
                    self.write(&raw);
                }
                Pending::DeclTag {
                    target,
                    component,
                    value,
                } => {
                    let raw = RawType {
                        data: RawData::DeclTag {
                            component_idx: component.map_or(-1, |c| c as i32),
                        },
                        ..RawType::new(Kind::DeclTag, self.strings.add(&value)?, target.get())
                    };
                    self.write(&raw);
                }
            }
        }
        debug_assert_eq!(self.emitted, self.ids.last_id().get());

        let order = self.options.order;
        let type_len = section_len(self.types.len(), MarshalError::TypeSectionOverflow)?;
        let str_len = section_len(self.strings.len(), MarshalError::NameOffsetOverflow)?;
        let header = Header::new(type_len, str_len);
        buf.reserve(HEADER_LEN + self.types.len() + self.strings.len());
        buf.extend_from_slice(&header.to_bytes(order));
        buf.extend_from_slice(&self.types);
        buf.extend_from_slice(self.strings.as_bytes());

        log::debug!(
            "marshaled {} types, {} bytes of strings",
            self.emitted,
            self.strings.len()
        );
        Ok(buf)
    }

    /// Give IDs to every node reachable from `r`, in walk order.
    fn discover(&mut self, r: TypeRef) -> Result<(), MarshalError> {
        for item in walk(self.graph, [r], &mut self.visited) {
            let found = item?;
            if !self.ids.contains(found) {
                self.ids.register(found)?;
                self.pending.push_back(Pending::Node(found));
            }
        }
        Ok(())
    }

    fn deflate_node(&mut self, id: TypeId, r: TypeRef) -> Result<(), MarshalError> {
        let graph = self.graph;
        let ty = graph.resolve(r)?;
        if let Type::Func(f) = ty {
            check_param_tags(graph, id, f)?;
        }

        let raw = match rewrite(ty, self.options) {
            Rewrite::Keep(ty) => self.deflate(id, r, ty)?,
            Rewrite::Replace(replacement) => {
                log::debug!(
                    "{id}: encoding {} as {}",
                    ty.kind_name(),
                    replacement.kind_name()
                );
                self.deflate(id, r, &replacement)?
            }
            Rewrite::Enum64Union(e) => {
                log::debug!("{id}: encoding enum64 {:?} as union", e.name);
                self.enum64_union(id, e)?
            }
            Rewrite::UnsignedEnum(e) => {
                log::debug!("{id}: clearing signed flag of enum {:?}", e.name);
                self.enum32(id, e, false)?
            }
        };
        self.write(&raw);

        for (component, tag) in ty.decl_tags() {
            self.queue_decl_tag(id, component, tag)?;
        }
        Ok(())
    }

    fn queue_decl_tag(
        &mut self,
        target: TypeId,
        component: Option<u32>,
        value: &str,
    ) -> Result<(), MarshalError> {
        let id = self.ids.reserve()?;
        if self.options.replace_decl_tags {
            log::debug!("{id}: decl tag {value:?} on {target} replaced by placeholder");
            self.pending
                .push_back(Pending::Placeholder(decl_tag_placeholder()));
        } else {
            self.pending.push_back(Pending::DeclTag {
                target,
                component,
                value: value.to_owned(),
            });
        }
        Ok(())
    }

    fn deflate(&mut self, id: TypeId, r: TypeRef, ty: &Type) -> Result<RawType, MarshalError> {
        let name_off = self.strings.add(ty.name())?;

        let raw = match ty {
            Type::Void => return Err(MarshalError::MisplacedVoid(r)),
            Type::Int(int) => self.deflate_int(id, int)?,
            Type::Pointer(p) => RawType::new(Kind::Pointer, name_off, self.id_of(p.target)?),
            Type::Array(a) => RawType {
                data: RawData::Array {
                    element: self.id_of(a.element)?,
                    index: self.id_of(a.index)?,
                    nelems: a.nelems,
                },
                ..RawType::new(Kind::Array, name_off, 0)
            },
            Type::Struct(c) | Type::Union(c) => {
                let kind = if matches!(ty, Type::Struct(_)) {
                    Kind::Struct
                } else {
                    Kind::Union
                };
                let kind_flag = c.members.iter().any(|m| m.bitfield_size != 0);

                let mut members = Vec::with_capacity(c.members.len());
                for (i, m) in c.members.iter().enumerate() {
                    if kind_flag
                        && (m.bitfield_size > MAX_BITFIELD_SIZE || m.offset > MAX_BITFIELD_OFFSET)
                    {
                        return Err(MarshalError::BitfieldOverflow { id, member: i });
                    }
                    members.push(RawMember {
                        name_off: self.strings.add(&m.name)?,
                        ty: self.id_of(m.ty)?,
                        offset: member_offset(m.offset, m.bitfield_size, kind_flag),
                    });
                }

                RawType {
                    vlen: vlen(id, members.len())?,
                    kind_flag,
                    data: RawData::Members(members),
                    ..RawType::new(kind, name_off, c.size)
                }
            }
            Type::Enum(e) if e.is_64bit() => {
                let mut values = Vec::with_capacity(e.values.len());
                for v in &e.values {
                    values.push(RawEnum64 {
                        name_off: self.strings.add(&v.name)?,
                        lo: v.value as u32,
                        hi: (v.value >> 32) as u32,
                    });
                }
                RawType {
                    vlen: vlen(id, values.len())?,
                    kind_flag: e.signed,
                    data: RawData::Enum64(values),
                    ..RawType::new(Kind::Enum64, name_off, e.size)
                }
            }
            Type::Enum(e) => self.enum32(id, e, e.signed)?,
            Type::Fwd(f) => RawType {
                kind_flag: f.kind == FwdKind::Union,
                ..RawType::new(Kind::Fwd, name_off, 0)
            },
            Type::Typedef(t) => RawType::new(Kind::Typedef, name_off, self.id_of(t.target)?),
            Type::Volatile(q) => RawType::new(Kind::Volatile, name_off, self.id_of(q.target)?),
            Type::Const(q) => RawType::new(Kind::Const, name_off, self.id_of(q.target)?),
            Type::Restrict(q) => RawType::new(Kind::Restrict, name_off, self.id_of(q.target)?),
            Type::Func(f) => RawType {
                vlen: f.linkage as u16,
                ..RawType::new(Kind::Func, name_off, self.id_of(f.proto)?)
            },
            Type::FuncProto(p) => {
                let mut params = Vec::with_capacity(p.params.len());
                for param in &p.params {
                    params.push(RawParam {
                        name_off: self.strings.add(&param.name)?,
                        ty: self.id_of(param.ty)?,
                    });
                }
                RawType {
                    vlen: vlen(id, params.len())?,
                    data: RawData::Params(params),
                    ..RawType::new(Kind::FuncProto, name_off, self.id_of(p.ret)?)
                }
            }
            Type::Var(v) => RawType {
                data: RawData::Var {
                    linkage: v.linkage as u32,
                },
                ..RawType::new(Kind::Var, name_off, self.id_of(v.ty)?)
            },
            Type::Datasec(d) => {
                let mut vars = Vec::with_capacity(d.vars.len());
                for v in &d.vars {
                    vars.push(RawSecinfo {
                        ty: self.id_of(v.var)?,
                        offset: v.offset,
                        size: v.size,
                    });
                }
                RawType {
                    vlen: vlen(id, vars.len())?,
                    data: RawData::Datasec(vars),
                    ..RawType::new(Kind::Datasec, name_off, d.size)
                }
            }
            Type::Float(f) => RawType::new(Kind::Float, name_off, f.size),
            Type::TypeTag(t) => RawType::new(Kind::TypeTag, name_off, self.id_of(t.target)?),
        };

        Ok(raw)
    }

    fn deflate_int(&mut self, id: TypeId, int: &Int) -> Result<RawType, MarshalError> {
        let bits = int
            .size
            .checked_mul(8)
            .and_then(|bits| u8::try_from(bits).ok())
            .ok_or(MarshalError::IntTooWide {
                id,
                size: int.size,
            })?;
        Ok(RawType {
            data: RawData::Int(int_data(int.encoding, bits)),
            ..RawType::new(Kind::Int, self.strings.add(&int.name)?, int.size)
        })
    }

    /// 32-bit enum. Values are range-checked against the enum's own
    /// signedness even when the flag is cleared.
    fn enum32(&mut self, id: TypeId, e: &Enum, signed_flag: bool) -> Result<RawType, MarshalError> {
        let name_off = self.strings.add(&e.name)?;
        let mut values = Vec::with_capacity(e.values.len());
        for v in &e.values {
            let fits = if e.signed {
                i32::try_from(v.value as i64).is_ok()
            } else {
                u32::try_from(v.value).is_ok()
            };
            if !fits {
                return Err(MarshalError::EnumValueOverflow {
                    id,
                    name: v.name.clone(),
                    value: v.value,
                });
            }
            values.push(RawEnum {
                name_off: self.strings.add(&v.name)?,
                value: v.value as u32,
            });
        }

        Ok(RawType {
            vlen: vlen(id, values.len())?,
            kind_flag: signed_flag,
            data: RawData::Enum(values),
            ..RawType::new(Kind::Enum, name_off, e.size)
        })
    }

    fn enum64_union(&mut self, id: TypeId, e: &Enum) -> Result<RawType, MarshalError> {
        let name_off = self.strings.add(&e.name)?;
        let placeholder = self.enum64_placeholder(e.signed)?;

        let mut members = Vec::with_capacity(e.values.len());
        for v in &e.values {
            members.push(RawMember {
                name_off: self.strings.add(&v.name)?,
                ty: placeholder.get(),
                offset: 0,
            });
        }

        Ok(RawType {
            vlen: vlen(id, members.len())?,
            data: RawData::Members(members),
            ..RawType::new(Kind::Union, name_off, e.size)
        })
    }

    /// The storage integer shared by every downgraded enum64 of one
    /// signedness, allocated on first use.
    fn enum64_placeholder(&mut self, signed: bool) -> Result<TypeId, MarshalError> {
        let slot = usize::from(signed);
        if let Some(id) = self.enum64_placeholders[slot] {
            return Ok(id);
        }
        let id = self.ids.reserve()?;
        self.enum64_placeholders[slot] = Some(id);
        self.pending
            .push_back(Pending::Placeholder(enum64_placeholder(signed)));
        Ok(id)
    }

    fn id_of(&self, r: TypeRef) -> Result<u32, MarshalError> {
        self.ids
            .get(r)
            .map(TypeId::get)
            .ok_or(MarshalError::UnresolvedId(r))
    }

    fn write(&mut self, raw: &RawType) {
        log::trace!("{} {:?} ({} bytes)", TypeId(self.emitted), raw.kind, raw.size());
        raw.write(&mut self.types, self.options.order);
    }
}

/// Every tagged parameter index must exist in the prototype.
fn check_param_tags(graph: &TypeGraph, id: TypeId, f: &Func) -> Result<(), MarshalError> {
    let Some(index) = f.param_tags.iter().rposition(|tags| !tags.is_empty()) else {
        return Ok(());
    };
    let params = match graph.resolve(f.proto)? {
        Type::FuncProto(proto) => proto.params.len(),
        _ => 0,
    };
    if index >= params {
        return Err(MarshalError::ParamTagOutOfRange { id, index, params });
    }
    Ok(())
}

fn vlen(id: TypeId, count: usize) -> Result<u16, MarshalError> {
    u16::try_from(count).map_err(|_| MarshalError::TooManyMembers { id, count })
}

pub(crate) fn section_len(len: usize, overflow: MarshalError) -> Result<u32, MarshalError> {
    u32::try_from(len).map_err(|_| overflow)
}
