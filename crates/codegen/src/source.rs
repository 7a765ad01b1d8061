//! Emits the metadata source file: a private field table and a public
//! record descriptor per record, plus the hash-switch resolver.
//!
//! Offsets, sizes, and alignments are emitted as offsetof/alignof
//! expressions over the generated declarations, so the tables cannot
//! drift from whatever layout the downstream compiler actually produces.

use record::{TypeTag, FLAG_ARRAY, FLAG_POINTER};
use schema::{TypeKind, Unit};

use crate::metadata::CompiledUnit;

fn tag_name(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Char => "PACKJSON_TYPE_CHAR",
        TypeTag::UChar => "PACKJSON_TYPE_UCHAR",
        TypeTag::Short => "PACKJSON_TYPE_SHORT",
        TypeTag::UShort => "PACKJSON_TYPE_USHORT",
        TypeTag::Int => "PACKJSON_TYPE_INT",
        TypeTag::UInt => "PACKJSON_TYPE_UINT",
        TypeTag::Long => "PACKJSON_TYPE_LONG",
        TypeTag::ULong => "PACKJSON_TYPE_ULONG",
        TypeTag::Int8 => "PACKJSON_TYPE_INT8",
        TypeTag::Int16 => "PACKJSON_TYPE_INT16",
        TypeTag::Int32 => "PACKJSON_TYPE_INT32",
        TypeTag::Int64 => "PACKJSON_TYPE_INT64",
        TypeTag::UInt8 => "PACKJSON_TYPE_UINT8",
        TypeTag::UInt16 => "PACKJSON_TYPE_UINT16",
        TypeTag::UInt32 => "PACKJSON_TYPE_UINT32",
        TypeTag::UInt64 => "PACKJSON_TYPE_UINT64",
        TypeTag::Float => "PACKJSON_TYPE_FLOAT",
        TypeTag::Double => "PACKJSON_TYPE_DOUBLE",
        TypeTag::Bool => "PACKJSON_TYPE_BOOL",
        TypeTag::String => "PACKJSON_TYPE_STRING",
        TypeTag::Record => "PACKJSON_TYPE_RECORD",
    }
}

/// Renders the metadata source for a compiled unit. `header_name` is the
/// file name of the companion header.
pub fn emit(unit: &Unit, compiled: &CompiledUnit, header_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("#include \"{header_name}\"\n\n"));

    for (record, entry) in unit.records.iter().zip(compiled.records()) {
        out.push_str(&format!(
            "static const packjson_record_field_meta_t s_fieldMeta{}[] =\n{{\n",
            record.name
        ));

        let count = record.fields.len();
        for (at, field) in record.fields.iter().enumerate() {
            let meta = &entry.meta.fields[at];
            out.push_str("  {\n");
            out.push_str(&format!(
                "    /* name_hash */ 0x{:08x}U, /* {} */\n",
                meta.name_hash, field.name
            ));
            match &field.ty.kind {
                TypeKind::Named(name) => out.push_str(&format!(
                    "    /* type_hash */ 0x{:08x}U, /* {} */\n",
                    meta.type_hash, name
                )),
                _ => out.push_str("    /* type_hash */ 0x00000000U,\n"),
            }
            out.push_str(&format!(
                "    /* offset    */ PACKJSON_OFFSETOF({}, {}),\n",
                record.name, field.name
            ));
            out.push_str(&format!("    /* type      */ {},\n", tag_name(meta.ty)));
            let flags = if meta.flags & FLAG_ARRAY != 0 {
                "PACKJSON_FLAG_ARRAY"
            } else if meta.flags & FLAG_POINTER != 0 {
                "PACKJSON_FLAG_POINTER"
            } else {
                "0"
            };
            out.push_str(&format!("    /* flags     */ {flags}\n"));
            out.push_str(if at + 1 == count { "  }\n" } else { "  },\n" });
        }
        out.push_str("};\n\n");

        out.push_str(&format!(
            "const packjson_record_meta_t g_Meta{} =\n{{\n",
            record.name
        ));
        out.push_str(&format!("  /* fields     */ s_fieldMeta{},\n", record.name));
        out.push_str(&format!(
            "  /* name_hash  */ 0x{:08x}U, /* {} */\n",
            entry.meta.name_hash, record.name
        ));
        out.push_str(&format!("  /* size       */ sizeof({}),\n", record.name));
        out.push_str(&format!(
            "  /* alignment  */ PACKJSON_ALIGNOF({}),\n",
            record.name
        ));
        out.push_str(&format!("  /* num_fields */ {}\n", count));
        out.push_str("};\n\n");
    }

    out.push_str("const packjson_record_meta_t* packjson_resolve_record(uint32_t hash)\n{\n");
    out.push_str("  switch (hash)\n  {\n");
    for entry in compiled.records() {
        out.push_str(&format!(
            "    case 0x{:08x}U: return &g_Meta{};\n",
            entry.meta.name_hash, entry.name
        ));
    }
    out.push_str("    default: return NULL;\n");
    out.push_str("  }\n}\n");
    out
}
