//! Human-readable dump of a decoded blob, one line per record.
//!
//! The format follows `bpftool btf dump`: records are listed in ID order,
//! anonymous names print as `'(anon)'`, and members, enumerators,
//! parameters and section entries follow their record indented by two
//! spaces. Decl tags are listed as the records they are on the wire.

use btfkit_core::{FuncLinkage, TypeId, VarLinkage};

use super::raw::{RawData, RawType, int_data_bits, int_data_encoding};
use super::{DecodeError, Kind, Spec};

/// Render every record of `spec`.
pub fn dump(spec: &Spec) -> Result<String, DecodeError> {
    let mut out = String::new();
    for i in 1..=spec.len() as u32 {
        let id = TypeId(i);
        let Some(raw) = spec.raw_type(id) else {
            break;
        };
        dump_record(&mut out, spec, id, raw)?;
    }
    Ok(out)
}

fn dump_record(out: &mut String, spec: &Spec, id: TypeId, raw: &RawType) -> Result<(), DecodeError> {
    let name = quoted(spec.string_at(raw.name_off)?);
    out.push_str(&format!("{id} {} {name}", raw.kind.name()));

    match (raw.kind, &raw.data) {
        (Kind::Int, RawData::Int(data)) => {
            out.push_str(&format!(
                " size={} bits_offset={} nr_bits={} encoding={}",
                raw.size_or_type,
                (data >> 16) & 0xff,
                int_data_bits(*data),
                encoding_name(int_data_encoding(*data).bits()),
            ));
        }
        (Kind::Array, RawData::Array { element, index, nelems }) => {
            out.push_str(&format!(
                " type_id={element} index_type_id={index} nr_elems={nelems}"
            ));
        }
        (Kind::Struct | Kind::Union, RawData::Members(members)) => {
            out.push_str(&format!(" size={} vlen={}", raw.size_or_type, raw.vlen));
            for m in members {
                let (offset, bitfield_size) = if raw.kind_flag {
                    (m.offset & 0x00ff_ffff, m.offset >> 24)
                } else {
                    (m.offset, 0)
                };
                out.push_str(&format!(
                    "\n  {} type_id={} bits_offset={offset}",
                    quoted(spec.string_at(m.name_off)?),
                    m.ty,
                ));
                if bitfield_size != 0 {
                    out.push_str(&format!(" bitfield_size={bitfield_size}"));
                }
            }
        }
        (Kind::Enum, RawData::Enum(values)) => {
            enum_header(out, raw);
            for v in values {
                let name = quoted(spec.string_at(v.name_off)?);
                if raw.kind_flag {
                    out.push_str(&format!("\n  {name} val={}", v.value as i32));
                } else {
                    out.push_str(&format!("\n  {name} val={}", v.value));
                }
            }
        }
        (Kind::Enum64, RawData::Enum64(values)) => {
            enum_header(out, raw);
            for v in values {
                let name = quoted(spec.string_at(v.name_off)?);
                let value = (v.hi as u64) << 32 | v.lo as u64;
                if raw.kind_flag {
                    out.push_str(&format!("\n  {name} val={}", value as i64));
                } else {
                    out.push_str(&format!("\n  {name} val={value}"));
                }
            }
        }
        (Kind::Fwd, _) => {
            let kind = if raw.kind_flag { "union" } else { "struct" };
            out.push_str(&format!(" fwd_kind={kind}"));
        }
        (Kind::Func, _) => {
            let linkage = FuncLinkage::from_u32(raw.vlen as u32)
                .map(|l| l.as_str().to_owned())
                .unwrap_or_else(|| raw.vlen.to_string());
            out.push_str(&format!(" type_id={} linkage={linkage}", raw.size_or_type));
        }
        (Kind::FuncProto, RawData::Params(params)) => {
            out.push_str(&format!(" ret_type_id={} vlen={}", raw.size_or_type, raw.vlen));
            for p in params {
                out.push_str(&format!(
                    "\n  {} type_id={}",
                    quoted(spec.string_at(p.name_off)?),
                    p.ty
                ));
            }
        }
        (Kind::Var, RawData::Var { linkage }) => {
            let linkage = VarLinkage::from_u32(*linkage)
                .map(|l| l.as_str().to_owned())
                .unwrap_or_else(|| linkage.to_string());
            out.push_str(&format!(" type_id={} linkage={linkage}", raw.size_or_type));
        }
        (Kind::Datasec, RawData::Datasec(vars)) => {
            out.push_str(&format!(" size={} vlen={}", raw.size_or_type, raw.vlen));
            for v in vars {
                out.push_str(&format!(
                    "\n  type_id={} offset={} size={}",
                    v.ty, v.offset, v.size
                ));
            }
        }
        (Kind::Float, _) => out.push_str(&format!(" size={}", raw.size_or_type)),
        (Kind::DeclTag, RawData::DeclTag { component_idx }) => {
            out.push_str(&format!(
                " type_id={} component_idx={component_idx}",
                raw.size_or_type
            ));
        }
        (kind, _) if kind.refers_to_type() => {
            out.push_str(&format!(" type_id={}", raw.size_or_type));
        }
        _ => {}
    }

    out.push('\n');
    Ok(())
}

fn enum_header(out: &mut String, raw: &RawType) {
    let encoding = if raw.kind_flag { "SIGNED" } else { "UNSIGNED" };
    out.push_str(&format!(
        " encoding={encoding} size={} vlen={}",
        raw.size_or_type, raw.vlen
    ));
}

fn quoted(name: &str) -> String {
    if name.is_empty() {
        "'(anon)'".to_owned()
    } else {
        format!("'{name}'")
    }
}

fn encoding_name(bits: u8) -> String {
    let names: Vec<&str> = [(1, "SIGNED"), (2, "CHAR"), (4, "BOOL")]
        .into_iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, name)| name)
        .collect();
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join("|")
    }
}
