//! Range-checked scalar decoders, one per storable type tag.

use crate::arena::Arena;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::meta::TypeTag;

// Scans a decimal integer token, -?[0-9]+, and returns its text.
fn int_token<'j>(cur: &mut Cursor<'j>) -> Result<&'j str> {
    let start = cur.pos();
    if cur.peek() == b'-' {
        cur.bump();
    }
    while cur.peek().is_ascii_digit() {
        cur.bump();
    }
    std::str::from_utf8(cur.span(start)).map_err(|_| Error::InvalidValue)
}

// Scans a full JSON number token, fraction and exponent included.
fn number_token<'j>(cur: &mut Cursor<'j>) -> Result<&'j str> {
    let start = cur.pos();
    if cur.peek() == b'-' {
        cur.bump();
    }
    while cur.peek().is_ascii_digit() {
        cur.bump();
    }
    if cur.peek() == b'.' {
        cur.bump();
        while cur.peek().is_ascii_digit() {
            cur.bump();
        }
    }
    if matches!(cur.peek(), b'e' | b'E') {
        cur.bump();
        if matches!(cur.peek(), b'+' | b'-') {
            cur.bump();
        }
        while cur.peek().is_ascii_digit() {
            cur.bump();
        }
    }
    std::str::from_utf8(cur.span(start)).map_err(|_| Error::InvalidValue)
}

fn get_i64(cur: &mut Cursor, min: i64, max: i64) -> Result<i64> {
    let v: i64 = int_token(cur)?.parse().map_err(|_| Error::InvalidValue)?;
    if v < min || v > max {
        return Err(Error::InvalidValue);
    }
    Ok(v)
}

fn get_u64(cur: &mut Cursor, max: u64) -> Result<u64> {
    let v: u64 = int_token(cur)?.parse().map_err(|_| Error::InvalidValue)?;
    if v > max {
        return Err(Error::InvalidValue);
    }
    Ok(v)
}

fn get_f64(cur: &mut Cursor, min: f64, max: f64) -> Result<f64> {
    let v: f64 = number_token(cur)?.parse().map_err(|_| Error::InvalidValue)?;
    if !v.is_finite() || v < min || v > max {
        return Err(Error::InvalidValue);
    }
    Ok(v)
}

/// Parses the scalar value at the cursor and stores it at arena offset
/// `out`. The token is scanned and range-checked in both passes; only the
/// store differs, and it is a no-op while counting.
pub(crate) fn parse(cur: &mut Cursor, arena: &mut Arena, out: usize, ty: TypeTag) -> Result<()> {
    use TypeTag::*;
    match ty {
        Char | Int8 => {
            let v = get_i64(cur, i8::MIN as i64, i8::MAX as i64)? as i8;
            arena.put(out, &v.to_ne_bytes());
        }
        UChar | UInt8 => {
            let v = get_u64(cur, u8::MAX as u64)? as u8;
            arena.put(out, &v.to_ne_bytes());
        }
        Short | Int16 => {
            let v = get_i64(cur, i16::MIN as i64, i16::MAX as i64)? as i16;
            arena.put(out, &v.to_ne_bytes());
        }
        UShort | UInt16 => {
            let v = get_u64(cur, u16::MAX as u64)? as u16;
            arena.put(out, &v.to_ne_bytes());
        }
        Int | Int32 => {
            let v = get_i64(cur, i32::MIN as i64, i32::MAX as i64)? as i32;
            arena.put(out, &v.to_ne_bytes());
        }
        UInt | UInt32 => {
            let v = get_u64(cur, u32::MAX as u64)? as u32;
            arena.put(out, &v.to_ne_bytes());
        }
        Long | Int64 => {
            let v = get_i64(cur, i64::MIN, i64::MAX)?;
            arena.put(out, &v.to_ne_bytes());
        }
        ULong | UInt64 => {
            let v = get_u64(cur, u64::MAX)?;
            arena.put(out, &v.to_ne_bytes());
        }
        Float => {
            let v = get_f64(cur, -f32::MAX as f64, f32::MAX as f64)? as f32;
            arena.put(out, &v.to_ne_bytes());
        }
        Double => {
            let v = get_f64(cur, f64::MIN, f64::MAX)?;
            arena.put(out, &v.to_ne_bytes());
        }
        Bool => {
            let v: u8 = if cur.eat_keyword(b"true") {
                1
            } else if cur.eat_keyword(b"false") {
                0
            } else {
                return Err(Error::InvalidValue);
            };
            arena.put(out, &[v]);
        }
        // Strings and records have their own drivers.
        String | Record => return Err(Error::InvalidValue),
    }
    Ok(())
}
