//! Builds runtime metadata tables from a parsed unit.
//!
//! This is where the schema-level obligations that the grammar cannot
//! express are enforced: unique record and field names, no DJB32 hash
//! aliasing among them, and define-before-use for record references (the
//! emitted C declares records in order, so a forward reference could never
//! compile downstream anyway).

use record::{FieldMeta, RecordMeta, ResolveRecord, FLAG_ARRAY, FLAG_POINTER};
use schema::{Attribute, Record, TypeKind, Unit};

use crate::layout::{self, FieldInfo};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("duplicate record '{0}'")]
    DuplicateRecord(String),

    #[error("record name hash collision between '{0}' and '{1}'")]
    RecordHashCollision(String, String),

    #[error("duplicate field '{field}' in record '{record}'")]
    DuplicateField { record: String, field: String },

    #[error("field name hash collision between '{first}' and '{second}' in record '{record}'")]
    FieldHashCollision {
        record: String,
        first: String,
        second: String,
    },

    #[error("unknown type '{ty}' in record '{record}'")]
    UnknownType { record: String, ty: String },

    #[error("record '{0}' has more than 255 fields")]
    TooManyFields(String),
}

/// One compiled record: its metadata (fields in declaration order) plus the
/// packed order the header emitter declares fields in.
#[derive(Debug, Clone)]
pub struct CompiledRecord {
    pub name: String,
    pub meta: RecordMeta,
    pub packed_order: Vec<usize>,
}

/// A compiled unit, in declaration order, with a hash index for record
/// resolution.
#[derive(Debug, Clone, Default)]
pub struct CompiledUnit {
    records: Vec<CompiledRecord>,
    // (name_hash, records index), sorted by hash.
    index: Vec<(u32, usize)>,
}

impl CompiledUnit {
    pub fn records(&self) -> &[CompiledRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

impl ResolveRecord for CompiledUnit {
    fn resolve_record(&self, name_hash: u32) -> Option<&RecordMeta> {
        let at = self
            .index
            .binary_search_by_key(&name_hash, |&(hash, _)| hash)
            .ok()?;
        Some(&self.records[self.index[at].1].meta)
    }
}

/// Compiles a unit's records into metadata tables.
pub fn compile(unit: &Unit) -> Result<CompiledUnit, BuildError> {
    let mut compiled = CompiledUnit::default();

    for record in &unit.records {
        let entry = compile_record(record, &compiled)?;
        tracing::debug!(
            record = %entry.name,
            size = entry.meta.size,
            alignment = entry.meta.alignment,
            "laid out record"
        );
        compiled.index.push((entry.meta.name_hash, compiled.records.len()));
        compiled.records.push(entry);
    }

    compiled.index.sort_by_key(|&(hash, _)| hash);
    Ok(compiled)
}

fn compile_record(record: &Record, seen: &CompiledUnit) -> Result<CompiledRecord, BuildError> {
    let name_hash = record::hash(record.name.as_bytes());
    for prior in &seen.records {
        if prior.name == record.name {
            return Err(BuildError::DuplicateRecord(record.name.clone()));
        }
        if prior.meta.name_hash == name_hash {
            return Err(BuildError::RecordHashCollision(
                prior.name.clone(),
                record.name.clone(),
            ));
        }
    }
    if record.fields.len() > 255 {
        return Err(BuildError::TooManyFields(record.name.clone()));
    }

    let mut infos = Vec::with_capacity(record.fields.len());
    let mut fields: Vec<FieldMeta> = Vec::with_capacity(record.fields.len());

    for (at, field) in record.fields.iter().enumerate() {
        let field_hash = record::hash(field.name.as_bytes());
        for prior in &record.fields[..at] {
            if prior.name == field.name {
                return Err(BuildError::DuplicateField {
                    record: record.name.clone(),
                    field: field.name.clone(),
                });
            }
            if record::hash(prior.name.as_bytes()) == field_hash {
                return Err(BuildError::FieldHashCollision {
                    record: record.name.clone(),
                    first: prior.name.clone(),
                    second: field.name.clone(),
                });
            }
        }

        // Record references must already be compiled; their metadata sizes
        // by-value and array storage.
        let referent = match &field.ty.kind {
            TypeKind::Named(name) => Some(seen.get(name).ok_or_else(|| {
                BuildError::UnknownType {
                    record: record.name.clone(),
                    ty: name.clone(),
                }
            })?),
            _ => None,
        };

        infos.push(match field.ty.attr {
            Attribute::Pointer => FieldInfo::pointer(),
            Attribute::Array => FieldInfo::array_holder(),
            Attribute::Scalar => match referent {
                Some(referent) => FieldInfo {
                    size: referent.meta.size,
                    align: referent.meta.alignment,
                },
                None => {
                    let (size, align) = layout::type_tag(&field.ty)
                        .layout()
                        .unwrap_or((0, 1));
                    FieldInfo { size, align }
                }
            },
        });

        fields.push(FieldMeta {
            name_hash: field_hash,
            type_hash: referent.map(|r| r.meta.name_hash).unwrap_or(0),
            offset: 0, // patched below once the layout is known
            ty: layout::type_tag(&field.ty),
            flags: match field.ty.attr {
                Attribute::Scalar => 0,
                Attribute::Array => FLAG_ARRAY,
                Attribute::Pointer => FLAG_POINTER,
            },
        });
    }

    let packed_order = layout::packed_order(record);
    let layout = layout::record_layout(&infos, &packed_order);
    for (field, offset) in fields.iter_mut().zip(&layout.offsets) {
        field.offset = *offset;
    }

    Ok(CompiledRecord {
        name: record.name.clone(),
        meta: RecordMeta {
            name_hash,
            size: layout.size,
            alignment: layout.alignment,
            fields: fields.into_boxed_slice(),
        },
        packed_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use record::TypeTag;

    fn compiled(source: &str) -> Result<CompiledUnit, BuildError> {
        compile(&schema::parse(source.as_bytes()).unwrap())
    }

    #[test]
    fn computes_offsets_in_declaration_order() {
        let unit = compiled(
            "struct Blob { bool ok; string name; double* weight; uint16_t id; };",
        )
        .unwrap();
        let blob = unit.get("Blob").unwrap();
        // Packed: weight(8) name(8) id(2) ok(1); metadata stays declared.
        let offsets: Vec<u32> = blob.meta.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![18, 8, 0, 16]);
        assert_eq!(blob.meta.size, 24);
        assert_eq!(blob.meta.alignment, 8);
        assert_eq!(blob.packed_order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn nested_records_use_the_referent_layout() {
        let unit = compiled(
            "struct Inner { int a; char b; };\nstruct Outer { Inner one; Inner two; char c; };",
        )
        .unwrap();
        let inner = unit.get("Inner").unwrap();
        assert_eq!(inner.meta.size, 8);
        assert_eq!(inner.meta.alignment, 4);

        let outer = unit.get("Outer").unwrap();
        assert_eq!(outer.meta.size, 20);
        let one = &outer.meta.fields[0];
        assert_eq!(one.ty, TypeTag::Record);
        assert_eq!(one.type_hash, inner.meta.name_hash);
    }

    #[test]
    fn resolves_by_hash() {
        let unit = compiled("struct A { int x; };\nstruct B { int y; };").unwrap();
        let hash = record::hash(b"B");
        assert_eq!(unit.resolve_record(hash).unwrap().name_hash, hash);
        assert!(unit.resolve_record(record::hash(b"C")).is_none());
    }

    #[test]
    fn rejects_duplicates_and_unknowns() {
        assert_eq!(
            compiled("struct A { int x; };\nstruct A { int y; };").unwrap_err(),
            BuildError::DuplicateRecord("A".into())
        );
        assert_eq!(
            compiled("struct A { int x; int x; };").unwrap_err(),
            BuildError::DuplicateField {
                record: "A".into(),
                field: "x".into()
            }
        );
        assert_eq!(
            compiled("struct A { Missing m; };").unwrap_err(),
            BuildError::UnknownType {
                record: "A".into(),
                ty: "Missing".into()
            }
        );
        // Forward references are use-before-declaration.
        assert_eq!(
            compiled("struct A { B* b; };\nstruct B { int x; };").unwrap_err(),
            BuildError::UnknownType {
                record: "A".into(),
                ty: "B".into()
            }
        );
    }

    #[test]
    fn rejects_hash_collisions() {
        // "Ab" and "BA" alias under DJB32: the leading bytes differ by one
        // and the trailing bytes by the 33 multiplier.
        assert_eq!(record::hash(b"Ab"), record::hash(b"BA"));

        assert_eq!(
            compiled("struct Ab { int x; };\nstruct BA { int y; };").unwrap_err(),
            BuildError::RecordHashCollision("Ab".into(), "BA".into())
        );
        assert_eq!(
            compiled("struct S { int Ab; int BA; };").unwrap_err(),
            BuildError::FieldHashCollision {
                record: "S".into(),
                first: "Ab".into(),
                second: "BA".into()
            }
        );
    }
}
