//! End-to-end scenarios: compile a schema, size the document, deserialize
//! into a buffer of exactly that size, and read the result back.

use pretty_assertions::assert_eq;
use record::{Error, RecordView};

/// Pointer-aligned backing storage for materialization buffers.
struct Buffer {
    storage: Vec<u64>,
    len: usize,
}

impl Buffer {
    fn new(len: usize) -> Self {
        Self {
            storage: vec![0u64; ((len + 7) / 8).max(1)],
            len,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_mut_ptr() as *mut u8, self.len) }
    }

    fn bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr() as *const u8, self.len) }
    }
}

fn compile(schema_source: &str) -> codegen::CompiledUnit {
    codegen::compile(&schema::parse(schema_source.as_bytes()).unwrap()).unwrap()
}

// Sizes, deserializes into exactly the reported size, and returns the
// buffer for inspection.
fn materialize(
    compiled: &codegen::CompiledUnit,
    root: &str,
    json: &str,
) -> Result<(Buffer, usize), Error> {
    let root_hash = record::hash(root.as_bytes());
    let n = record::size(compiled, root_hash, json.as_bytes())?;
    let mut buf = Buffer::new(n);
    record::deserialize(compiled, buf.bytes_mut(), root_hash, json.as_bytes())?;
    Ok((buf, n))
}

#[test]
fn minimal_scalar() {
    let compiled = compile("struct R { int x; };");
    let (buf, n) = materialize(&compiled, "R", r#"{"x":42}"#).unwrap();
    assert!(n >= 4);
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"R")).unwrap();
    assert_eq!(view.int("x"), Some(42));
}

#[test]
fn range_rejection() {
    let compiled = compile("struct R { int x; };");
    assert_eq!(
        materialize(&compiled, "R", r#"{"x":2147483648}"#).err(),
        Some(Error::InvalidValue)
    );
}

#[test]
fn unknown_field_is_skipped() {
    let compiled = compile("struct R { int x; };");
    let (buf, _) = materialize(&compiled, "R", r#"{"y":1,"x":3}"#).unwrap();
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"R")).unwrap();
    assert_eq!(view.int("x"), Some(3));
}

#[test]
fn array_of_scalars() {
    let compiled = compile("struct R { int xs[]; };");
    let (buf, _) = materialize(&compiled, "R", r#"{"xs":[1,2,3]}"#).unwrap();
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"R")).unwrap();
    let xs = view.array("xs").unwrap();
    assert_eq!(xs.len(), 3);
    assert_eq!(xs.stride(), 4);
    assert_eq!(
        (xs.int(0), xs.int(1), xs.int(2)),
        (Some(1), Some(2), Some(3))
    );
}

#[test]
fn nested_record_via_pointer() {
    let compiled = compile("struct Inner { int a; };\nstruct Outer { Inner* i; };");
    let (buf, _) = materialize(&compiled, "Outer", r#"{"i":{"a":7}}"#).unwrap();
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"Outer")).unwrap();
    assert_eq!(view.is_null("i"), Some(false));
    assert_eq!(view.deref_record("i").unwrap().int("a"), Some(7));
}

#[test]
fn null_pointer_and_utf8_escape() {
    let compiled = compile("struct R { string s; int* p; };");
    let (buf, n) = materialize(&compiled, "R", r#"{"s":"A\u00e9","p":null}"#).unwrap();
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"R")).unwrap();
    assert_eq!(view.string("s"), Some("Aé"));
    assert_eq!(view.is_null("p"), Some(true));
    // Three payload bytes and the terminator, right after the record.
    let root_size = compiled.get("R").unwrap().meta.size as usize;
    assert_eq!(n, root_size + 4);
    assert_eq!(&buf.bytes()[root_size..], b"A\xc3\xa9\0");
}

#[test]
fn a_document_with_everything() {
    let compiled = compile(
        "struct Achievement { uint32_t ID; string Title; uint32_t Points; };\n\
         struct Patch { bool Success; string Title; Achievement Achievements[]; double* Rating; };",
    );
    let doc = serde_json::json!({
        "Success": true,
        "Title": "Galaga",
        "Rating": 4.5,
        "Achievements": [
            {"ID": 1, "Title": "First", "Points": 10, "Ignored": [1, 2, 3]},
            {"ID": 2, "Title": "Second", "Points": 25},
        ],
    })
    .to_string();

    let (buf, _) = materialize(&compiled, "Patch", &doc).unwrap();
    let view = RecordView::root(buf.bytes(), &compiled, record::hash(b"Patch")).unwrap();
    assert_eq!(view.boolean("Success"), Some(true));
    assert_eq!(view.string("Title"), Some("Galaga"));
    assert_eq!(view.is_null("Rating"), Some(false));

    let achievements = view.array("Achievements").unwrap();
    assert_eq!(achievements.len(), 2);
    let first = achievements.record(0).unwrap();
    assert_eq!(first.uint("ID"), Some(1));
    assert_eq!(first.string("Title"), Some("First"));
    assert_eq!(first.uint("Points"), Some(10));
    let second = achievements.record(1).unwrap();
    assert_eq!(second.uint("ID"), Some(2));
    assert_eq!(second.string("Title"), Some("Second"));
}

#[test]
fn sizing_matches_materialization_exactly() {
    // Every successful sizing pass must be exactly sufficient: one byte
    // less fails, the exact size succeeds.
    let compiled = compile(
        "struct Inner { string name; };\nstruct R { Inner items[]; string tail; };",
    );
    let json = r#"{"items":[{"name":"ab"},{"name":"cdef"}],"tail":"!"}"#;
    let root_hash = record::hash(b"R");
    let n = record::size(&compiled, root_hash, json.as_bytes()).unwrap();

    let mut short = Buffer::new(n - 1);
    assert_eq!(
        record::deserialize(&compiled, short.bytes_mut(), root_hash, json.as_bytes()),
        Err(Error::ShortBuffer)
    );

    let mut exact = Buffer::new(n);
    record::deserialize(&compiled, exact.bytes_mut(), root_hash, json.as_bytes()).unwrap();
    let view = RecordView::root(exact.bytes(), &compiled, root_hash).unwrap();
    assert_eq!(view.string("tail"), Some("!"));
    let items = view.array("items").unwrap();
    assert_eq!(items.record(0).unwrap().string("name"), Some("ab"));
    assert_eq!(items.record(1).unwrap().string("name"), Some("cdef"));
}
