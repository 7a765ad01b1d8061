//! Recursive-descent parser for the record-definition language.
//!
//! ```text
//! unit    := struct*
//! struct  := 'struct' IDENT '{' field+ '}' ';'
//! field   := type IDENT ('[' ']')? ';'
//! type    := (signed|unsigned)? kind '*'?
//! kind    := integer keyword | float | double | bool | string | IDENT
//! ```
//!
//! The first error aborts the parse; diagnostics carry the source line.

use crate::ast::{Attribute, Field, Record, Signedness, Type, TypeKind, Unit};
use crate::error::{Error, ErrorKind};
use crate::lexer::Lexer;
use crate::token::{Lookahead, Token};

/// Parses schema source into its IR.
pub fn parse(source: &[u8]) -> Result<Unit, Error> {
    let mut lexer = Lexer::new(source);
    let la = lexer.next()?;
    Parser { lexer, la }.parse_unit()
}

struct Parser<'s> {
    lexer: Lexer<'s>,
    la: Lookahead<'s>,
}

impl<'s> Parser<'s> {
    fn advance(&mut self) -> Result<(), Error> {
        self.la = self.lexer.next()?;
        Ok(())
    }

    fn expect(&mut self, token: Token) -> Result<(), Error> {
        if self.la.token != token {
            return Err(self.error(ErrorKind::Expected(token.describe())));
        }
        self.advance()
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.la.line, kind)
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(self.la.lexeme).into_owned()
    }

    fn parse_unit(mut self) -> Result<Unit, Error> {
        let mut unit = Unit::default();
        while self.la.token == Token::Struct {
            unit.records.push(self.parse_struct()?);
        }
        // Anything left over is not a record definition.
        self.expect(Token::Eof)?;
        Ok(unit)
    }

    fn parse_struct(&mut self) -> Result<Record, Error> {
        self.expect(Token::Struct)?;

        let name = self.lexeme();
        self.expect(Token::Identifier)?;
        self.expect(Token::LBrace)?;

        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field()?);
            if self.la.token == Token::RBrace {
                break;
            }
        }

        self.expect(Token::RBrace)?;
        self.expect(Token::Semicolon)?;

        Ok(Record { name, fields })
    }

    fn parse_field(&mut self) -> Result<Field, Error> {
        let mut ty = self.parse_type()?;

        let name = self.lexeme();
        self.expect(Token::Identifier)?;

        if self.la.token == Token::LBracket {
            if ty.attr != Attribute::Scalar {
                return Err(self.error(ErrorKind::ArrayOfPointers));
            }
            self.advance()?;
            self.expect(Token::RBracket)?;
            ty.attr = Attribute::Array;
        }

        self.expect(Token::Semicolon)?;
        Ok(Field { name, ty })
    }

    fn parse_type(&mut self) -> Result<Type, Error> {
        let mut sign = Signedness::Unspecified;
        if self.la.token == Token::Signed {
            sign = Signedness::Signed;
            self.advance()?;
        } else if self.la.token == Token::Unsigned {
            sign = Signedness::Unsigned;
            self.advance()?;
        }

        // A second sign specifier is either a repeat or a conflict.
        if matches!(self.la.token, Token::Signed | Token::Unsigned) {
            let repeat = (self.la.token == Token::Signed) == (sign == Signedness::Signed);
            return Err(self.error(if repeat {
                ErrorKind::DuplicateSign(if sign == Signedness::Signed {
                    "signed"
                } else {
                    "unsigned"
                })
            } else {
                ErrorKind::ConflictingSign
            }));
        }

        let signed = sign != Signedness::Unspecified;
        let kind = match self.la.token {
            // The C-integer kinds take sign qualifiers.
            Token::Char | Token::Short | Token::Int | Token::Long => {
                let kind = match self.la.token {
                    Token::Char => TypeKind::Char,
                    Token::Short => TypeKind::Short,
                    Token::Int => TypeKind::Int,
                    _ => TypeKind::Long,
                };
                self.advance()?;
                kind
            }

            Token::Int8
            | Token::Int16
            | Token::Int32
            | Token::Int64
            | Token::UInt8
            | Token::UInt16
            | Token::UInt32
            | Token::UInt64
            | Token::Float
            | Token::Double
            | Token::Bool
            | Token::String => {
                if signed {
                    return Err(self.error(ErrorKind::SignWithNonInteger(self.lexeme())));
                }
                let kind = match self.la.token {
                    Token::Int8 => TypeKind::Int8,
                    Token::Int16 => TypeKind::Int16,
                    Token::Int32 => TypeKind::Int32,
                    Token::Int64 => TypeKind::Int64,
                    Token::UInt8 => TypeKind::UInt8,
                    Token::UInt16 => TypeKind::UInt16,
                    Token::UInt32 => TypeKind::UInt32,
                    Token::UInt64 => TypeKind::UInt64,
                    Token::Float => TypeKind::Float,
                    Token::Double => TypeKind::Double,
                    Token::Bool => TypeKind::Bool,
                    _ => TypeKind::String,
                };
                self.advance()?;
                kind
            }

            // `signed x;` reads the identifier as the field name with an
            // implied int; a bare identifier is a record reference.
            Token::Identifier if signed => TypeKind::Int,
            Token::Identifier => {
                let name = self.lexeme();
                self.advance()?;
                TypeKind::Named(name)
            }

            // A lone signed/unsigned with no type token also implies int.
            _ if signed => TypeKind::Int,
            _ => return Err(self.error(ErrorKind::TypeExpected)),
        };

        let attr = if self.la.token == Token::Star {
            self.advance()?;
            Attribute::Pointer
        } else {
            Attribute::Scalar
        };
        Ok(Type { kind, sign, attr })
    }
}
