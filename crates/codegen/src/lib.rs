//! Back end of the schema compiler: native record layout, runtime metadata
//! construction, and the C artifact emitters.

// Packing order and offset/size/alignment computation.
pub mod layout;

// Metadata tables and the schema-level checks the grammar can't express.
pub mod metadata;
pub use metadata::{compile, BuildError, CompiledRecord, CompiledUnit};

// The generated header: record declarations in packed order.
pub mod header;
pub use header::include_guard;

// The generated metadata source: field tables and the hash resolver.
pub mod source;
