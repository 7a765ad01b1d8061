//! Hand-written lexer for the record-definition language.
//!
//! Produces one token of lookahead at a time; the sequence is finite and
//! not restartable. Lexemes borrow from the source buffer. The lexer
//! carries the full C-flavored lexical grammar (numeric literal forms with
//! suffixes, string escapes, both comment styles) even though the type
//! grammar only consumes a subset of it.

use crate::error::{Error, ErrorKind};
use crate::token::{Lookahead, Token};

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn format_char(b: u8) -> String {
    if b.is_ascii_graphic() || b == b' ' {
        format!("'{}'", b as char)
    } else {
        format!("'\\{:03o}'", b)
    }
}

pub struct Lexer<'s> {
    bytes: &'s [u8],
    pos: usize,
    line: u32,
}

impl<'s> Lexer<'s> {
    pub fn new(bytes: &'s [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            line: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.line, kind)
    }

    fn span(&self, start: usize) -> &'s [u8] {
        &self.bytes[start..self.pos]
    }

    fn token(&self, token: Token, start: usize, line: u32) -> Lookahead<'s> {
        Lookahead {
            token,
            lexeme: self.span(start),
            line,
        }
    }

    pub fn next(&mut self) -> Result<Lookahead<'s>, Error> {
        loop {
            while !self.at_end() && is_space(self.peek()) {
                self.bump();
            }
            if self.at_end() {
                return Ok(Lookahead {
                    token: Token::Eof,
                    lexeme: b"<eof>",
                    line: self.line,
                });
            }

            let start = self.pos;
            let line = self.line;
            let b = self.peek();

            if b.is_ascii_digit() {
                return self.number(start, line);
            }
            if is_ident_start(b) {
                while is_ident(self.peek()) {
                    self.bump();
                }
                let lexeme = self.span(start);
                let token = Token::keyword(lexeme).unwrap_or(Token::Identifier);
                return Ok(Lookahead { token, lexeme, line });
            }
            if b == b'"' {
                return self.string_literal(line);
            }

            let punct = match b {
                b'{' => Some(Token::LBrace),
                b'}' => Some(Token::RBrace),
                b'[' => Some(Token::LBracket),
                b']' => Some(Token::RBracket),
                b';' => Some(Token::Semicolon),
                b'<' => Some(Token::Less),
                b'>' => Some(Token::Greater),
                b'*' => Some(Token::Star),
                _ => None,
            };
            if let Some(token) = punct {
                self.bump();
                return Ok(self.token(token, start, line));
            }

            if b == b'/' {
                self.comment()?;
                continue;
            }

            return Err(self.error(ErrorKind::InvalidCharacter(format_char(b))));
        }
    }

    // Hexadecimal, octal, decimal, fractional, and exponent forms, followed
    // by an optional suffix.
    fn number(&mut self, start: usize, line: u32) -> Result<Lookahead<'s>, Error> {
        let mut is_int = true;

        if self.peek() == b'0' {
            self.bump();
            if matches!(self.peek(), b'x' | b'X') {
                self.bump();
                let digits = self.pos;
                while self.peek().is_ascii_hexdigit() {
                    self.bump();
                }
                if self.pos == digits {
                    return Err(self.error(ErrorKind::EmptyHexConstant));
                }
                return self.suffix(start, line, true);
            }
            if matches!(self.peek(), b'0'..=b'7') {
                while matches!(self.peek(), b'0'..=b'7') {
                    self.bump();
                }
                return self.suffix(start, line, true);
            }
            // A lone zero continues as a decimal number.
        }

        while self.peek().is_ascii_digit() {
            self.bump();
        }
        if self.peek() == b'.' {
            is_int = false;
            self.bump();
            while self.peek().is_ascii_digit() {
                self.bump();
            }
        }
        if matches!(self.peek(), b'e' | b'E') {
            is_int = false;
            self.bump();
            if matches!(self.peek(), b'+' | b'-') {
                self.bump();
            }
            if !self.peek().is_ascii_digit() {
                return Err(self.error(ErrorKind::EmptyExponent));
            }
            while self.peek().is_ascii_digit() {
                self.bump();
            }
        }

        self.suffix(start, line, is_int)
    }

    fn suffix(&mut self, start: usize, line: u32, is_int: bool) -> Result<Lookahead<'s>, Error> {
        let suffix_start = self.pos;
        while is_ident_start(self.peek()) {
            self.bump();
        }
        let suffix: Vec<u8> = self.bytes[suffix_start..self.pos]
            .iter()
            .map(u8::to_ascii_lowercase)
            .collect();
        let valid = if is_int {
            matches!(
                suffix.as_slice(),
                b"" | b"u" | b"ul" | b"ull" | b"l" | b"lu" | b"ll" | b"llu"
            )
        } else {
            matches!(suffix.as_slice(), b"" | b"f" | b"l")
        };
        if !valid {
            let kind = if is_int {
                ErrorKind::InvalidIntegerSuffix
            } else {
                ErrorKind::InvalidFloatSuffix
            };
            return Err(self.error(kind));
        }
        Ok(self.token(Token::Number, start, line))
    }

    // The lexeme of a string literal is its raw content, quotes excluded.
    fn string_literal(&mut self, line: u32) -> Result<Lookahead<'s>, Error> {
        self.bump();
        let content = self.pos;
        loop {
            if self.at_end() {
                return Err(self.error(ErrorKind::UnterminatedString));
            }
            match self.peek() {
                b'"' => {
                    let lexeme = &self.bytes[content..self.pos];
                    self.bump();
                    return Ok(Lookahead {
                        token: Token::StringLiteral,
                        lexeme,
                        line,
                    });
                }
                b'\\' => self.escape()?,
                _ => self.bump(),
            }
        }
    }

    fn escape(&mut self) -> Result<(), Error> {
        self.bump();
        if self.at_end() {
            return Err(self.error(ErrorKind::UnterminatedString));
        }
        let k = self.peek();
        self.bump();
        match k {
            b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' | b'\'' | b'"' | b'?' => Ok(()),
            b'x' => {
                if !self.peek().is_ascii_hexdigit() {
                    return Err(self.error(ErrorKind::EmptyHexEscape));
                }
                while self.peek().is_ascii_hexdigit() {
                    self.bump();
                }
                Ok(())
            }
            b'u' | b'U' => {
                let need = if k == b'U' { 8 } else { 4 };
                for _ in 0..need {
                    if !self.peek().is_ascii_hexdigit() {
                        return Err(self.error(ErrorKind::ShortUnicodeEscape(k as char, need)));
                    }
                    self.bump();
                }
                Ok(())
            }
            b'0'..=b'7' => {
                while matches!(self.peek(), b'0'..=b'7') {
                    self.bump();
                }
                Ok(())
            }
            _ => Err(self.error(ErrorKind::UnknownEscape(format_char(k)))),
        }
    }

    // Both // and non-nesting /* */ comments.
    fn comment(&mut self) -> Result<(), Error> {
        self.bump();
        match self.peek() {
            b'/' => {
                while !self.at_end() && self.peek() != b'\n' {
                    self.bump();
                }
                Ok(())
            }
            b'*' => {
                self.bump();
                loop {
                    if self.at_end() {
                        return Err(self.error(ErrorKind::UnterminatedComment));
                    }
                    if self.peek() == b'*' {
                        self.bump();
                        if self.peek() == b'/' {
                            self.bump();
                            return Ok(());
                        }
                    } else {
                        self.bump();
                    }
                }
            }
            _ => Err(self.error(ErrorKind::InvalidCharacter(format_char(b'/')))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<(Token, String, u32)> {
        let mut lexer = Lexer::new(source.as_bytes());
        let mut out = Vec::new();
        loop {
            let la = lexer.next().unwrap();
            let done = la.token == Token::Eof;
            out.push((
                la.token,
                String::from_utf8_lossy(la.lexeme).into_owned(),
                la.line,
            ));
            if done {
                return out;
            }
        }
    }

    fn lex_error(source: &str) -> Error {
        let mut lexer = Lexer::new(source.as_bytes());
        loop {
            match lexer.next() {
                Ok(la) if la.token == Token::Eof => panic!("no error in {source:?}"),
                Ok(_) => continue,
                Err(err) => return err,
            }
        }
    }

    #[test]
    fn lexes_a_struct_skeleton() {
        let got = tokens("struct Point {\n  int x;\n  int y;\n};\n");
        let kinds: Vec<Token> = got.iter().map(|(t, _, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Struct,
                Token::Identifier,
                Token::LBrace,
                Token::Int,
                Token::Identifier,
                Token::Semicolon,
                Token::Int,
                Token::Identifier,
                Token::Semicolon,
                Token::RBrace,
                Token::Semicolon,
                Token::Eof,
            ]
        );
        assert_eq!(got[1].1, "Point");
        // Line numbers advance with the newlines.
        assert_eq!(got[3].2, 2);
        assert_eq!(got[6].2, 3);
        assert_eq!(got[9].2, 4);
    }

    #[test]
    fn keywords_and_identifiers() {
        let got = tokens("uint32_t uint32 _x int64_t");
        assert_eq!(got[0].0, Token::UInt32);
        assert_eq!(got[1].0, Token::Identifier);
        assert_eq!(got[2].0, Token::Identifier);
        assert_eq!(got[3].0, Token::Int64);
    }

    #[test]
    fn numeric_literal_forms() {
        for ok in [
            "0", "7", "42", "0x1F", "0755", "08", "1.5", "0.25", "2e10", "1.5e-3", "3E+4",
            "42u", "42UL", "42ull", "42l", "42lu", "42LL", "42llu", "1.5f", "1.5L",
        ] {
            let got = tokens(ok);
            assert_eq!(got[0].0, Token::Number, "lexing {ok:?}");
        }
    }

    #[test]
    fn numeric_suffix_errors() {
        assert_eq!(lex_error("42q").kind, ErrorKind::InvalidIntegerSuffix);
        assert_eq!(lex_error("42ulll").kind, ErrorKind::InvalidIntegerSuffix);
        assert_eq!(lex_error("1.5q").kind, ErrorKind::InvalidFloatSuffix);
        assert_eq!(lex_error("1.5ff").kind, ErrorKind::InvalidFloatSuffix);
        assert_eq!(lex_error("0x").kind, ErrorKind::EmptyHexConstant);
        assert_eq!(lex_error("1e").kind, ErrorKind::EmptyExponent);
        assert_eq!(lex_error("1e+").kind, ErrorKind::EmptyExponent);
    }

    #[test]
    fn string_literals_and_escapes() {
        let got = tokens(r#""plain" "es\tc" "\x41A\U00000041\101""#);
        assert_eq!(got[0].0, Token::StringLiteral);
        assert_eq!(got[0].1, "plain");
        assert_eq!(got[1].1, r"es\tc");
        assert_eq!(got[2].0, Token::StringLiteral);
    }

    #[test]
    fn string_errors() {
        assert_eq!(lex_error(r#""open"#).kind, ErrorKind::UnterminatedString);
        assert_eq!(
            lex_error(r#""\q""#).kind,
            ErrorKind::UnknownEscape("'q'".into())
        );
        assert_eq!(lex_error(r#""\x""#).kind, ErrorKind::EmptyHexEscape);
        assert_eq!(
            lex_error(r#""\u12""#).kind,
            ErrorKind::ShortUnicodeEscape('u', 4)
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_tracked() {
        let got = tokens("// line one\n/* two\nthree */ int");
        assert_eq!(got[0].0, Token::Int);
        assert_eq!(got[0].2, 3);
        assert_eq!(lex_error("/* open").kind, ErrorKind::UnterminatedComment);
        assert_eq!(
            lex_error("/ x").kind,
            ErrorKind::InvalidCharacter("'/'".into())
        );
    }

    #[test]
    fn rejects_stray_characters() {
        assert_eq!(
            lex_error("struct S @").kind,
            ErrorKind::InvalidCharacter("'@'".into())
        );
        // Errors carry the line they occur on.
        assert_eq!(lex_error("\n\n@").line, 3);
    }

    #[test]
    fn punctuation() {
        let kinds: Vec<Token> = tokens("{}[];<>*").iter().map(|(t, _, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::Semicolon,
                Token::Less,
                Token::Greater,
                Token::Star,
                Token::Eof,
            ]
        );
    }
}
