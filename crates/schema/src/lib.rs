//! Front end of the record-definition language: a hand-written lexer and a
//! recursive-descent parser producing the schema IR consumed by `codegen`.

pub mod ast;
pub use ast::{Attribute, Field, Record, Signedness, Type, TypeKind, Unit};

mod error;
pub use error::{Error, ErrorKind};

mod lexer;
pub use lexer::Lexer;

mod parser;
pub use parser::parse;

pub mod token;
pub use token::{Lookahead, Token};
