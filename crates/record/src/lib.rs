//! Metadata-driven deserialization of JSON documents into packed native
//! records.
//!
//! The schema compiler (see the `codegen` crate) turns record definitions
//! into `RecordMeta` tables. Given those tables, this crate parses a JSON
//! document directly into a caller-provided contiguous buffer, laying out
//! records exactly as the generated native declarations do: nested records
//! in place, strings as NUL-terminated bytes behind a pointer, arrays as
//! {pointer, count, stride} holders, pointers as arena addresses or a null
//! sentinel.
//!
//! Use is two-pass: `size` walks the document once to compute the required
//! buffer size, then `deserialize` repeats the walk into a buffer of (at
//! least) that size:
//!
//! ```ignore
//! let n = record::size(&metas, root_hash, json)?;
//! let mut buf = alloc_aligned(n);
//! record::deserialize(&metas, &mut buf, root_hash, json)?;
//! ```
//!
//! Everything a document materializes shares the buffer's lifetime; freeing
//! the buffer frees the records.

// The metadata contract: type tags, field/record descriptors, the resolver
// trait, and the DJB32 name hash.
mod meta;
pub use meta::{
    hash, FieldMeta, RecordMeta, ResolveRecord, TypeTag, ARRAY_ALIGN, ARRAY_COUNT_OFFSET,
    ARRAY_ELEMENTS_OFFSET, ARRAY_SIZE, ARRAY_STRIDE_OFFSET, FLAG_ARRAY, FLAG_POINTER,
    POINTER_ALIGN, POINTER_SIZE, STRING_ALIGN, STRING_SIZE,
};

// Status codes are ABI, shared with embedders of the generated metadata.
mod error;
pub use error::{Error, Result};

// The bump arena carries the only difference between the two passes.
mod arena;

// Low-level JSON machinery: cursor, skipper, scalar parsers, string decoder.
mod cursor;
mod scalar;
mod skip;
mod string;

// The object/array/pointer driver and the public entry points.
mod driver;
pub use driver::{deserialize, size};

// Read-back views over materialized buffers.
pub mod view;
pub use view::{ArrayView, RecordView};
