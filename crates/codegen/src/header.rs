//! Emits the native header: one structure per record in packed field
//! order, an extern metadata declaration per record, and the resolver
//! prototype.

use schema::{Attribute, Field, Signedness, TypeKind, Unit};

use crate::metadata::CompiledUnit;

/// The include guard derived from a header file name: alphanumerics
/// uppercased, anything else replaced by an underscore, wrapped in
/// `__...__`.
pub fn include_guard(file_name: &str) -> String {
    let mut guard = String::with_capacity(file_name.len() + 4);
    guard.push_str("__");
    for c in file_name.chars() {
        if c.is_ascii_alphanumeric() {
            guard.push(c.to_ascii_uppercase());
        } else {
            guard.push('_');
        }
    }
    guard.push_str("__");
    guard
}

// The C spelling of a field's element type. Booleans lower to one-byte
// integers and strings to the runtime's string holder.
fn base_type(field: &Field) -> &str {
    match &field.ty.kind {
        TypeKind::Char => "char",
        TypeKind::Short => "short",
        TypeKind::Int => "int",
        TypeKind::Long => "long",
        TypeKind::Int8 => "int8_t",
        TypeKind::Int16 => "int16_t",
        TypeKind::Int32 => "int32_t",
        TypeKind::Int64 => "int64_t",
        TypeKind::UInt8 => "uint8_t",
        TypeKind::UInt16 => "uint16_t",
        TypeKind::UInt32 => "uint32_t",
        TypeKind::UInt64 => "uint64_t",
        TypeKind::Float => "float",
        TypeKind::Double => "double",
        TypeKind::Bool => "char",
        TypeKind::String => "packjson_string_t",
        TypeKind::Named(name) => name,
    }
}

fn sign_prefix(field: &Field) -> &'static str {
    match field.ty.sign {
        Signedness::Signed => "signed ",
        Signedness::Unsigned => "unsigned ",
        Signedness::Unspecified => "",
    }
}

/// Renders the header for a compiled unit.
pub fn emit(unit: &Unit, compiled: &CompiledUnit, guard: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("#ifndef {guard}\n"));
    out.push_str(&format!("#define {guard}\n\n"));
    out.push_str("#include <packjson.h>\n");
    out.push_str("#include <stdint.h>\n\n");

    for (record, entry) in unit.records.iter().zip(compiled.records()) {
        out.push_str("typedef struct\n{\n");
        for &at in &entry.packed_order {
            let field = &record.fields[at];
            match field.ty.attr {
                Attribute::Array => out.push_str(&format!(
                    "  packjson_array_t {}; /* {} */\n",
                    field.name,
                    base_type(field)
                )),
                Attribute::Pointer => out.push_str(&format!(
                    "  {}{}* {};\n",
                    sign_prefix(field),
                    base_type(field),
                    field.name
                )),
                Attribute::Scalar => out.push_str(&format!(
                    "  {}{} {};\n",
                    sign_prefix(field),
                    base_type(field),
                    field.name
                )),
            }
        }
        out.push_str(&format!("}}\n{};\n\n", record.name));
        out.push_str(&format!(
            "extern const packjson_record_meta_t g_Meta{};\n\n",
            record.name
        ));
    }

    out.push_str("const packjson_record_meta_t* packjson_resolve_record(uint32_t hash);\n\n");
    out.push_str(&format!("#endif /* {guard} */\n"));
    out
}
