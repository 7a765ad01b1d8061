//! A recursive JSON validator that consumes a value without producing
//! output. The driver uses it for keys that have no matching field, and the
//! array driver uses its element count to size allocations before a second,
//! materializing walk.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::string;

pub(crate) fn skip_value(cur: &mut Cursor) -> Result<()> {
    match cur.peek() {
        b'{' => skip_object(cur),
        b'[' => skip_array(cur).map(|_| ()),
        b'0'..=b'9' | b'-' => skip_number(cur),
        b't' | b'f' => skip_boolean(cur),
        b'"' => string::measure(cur).map(|_| ()),
        b'n' => skip_null(cur),
        _ => Err(Error::InvalidValue),
    }
}

pub(crate) fn skip_object(cur: &mut Cursor) -> Result<()> {
    cur.bump();
    cur.skip_spaces();
    while cur.peek() != b'}' {
        if cur.at_end() {
            return Err(Error::UnterminatedObject);
        }
        if cur.peek() != b'"' {
            return Err(Error::MissingKey);
        }
        string::measure(cur)?;
        cur.skip_spaces();
        if !cur.eat(b':') {
            return Err(Error::MissingValue);
        }
        cur.skip_spaces();
        skip_value(cur)?;
        cur.skip_spaces();
        if !cur.eat(b',') {
            break;
        }
        cur.skip_spaces();
    }
    if !cur.eat(b'}') {
        return Err(Error::UnterminatedObject);
    }
    Ok(())
}

/// Also reports how many elements the array holds.
pub(crate) fn skip_array(cur: &mut Cursor) -> Result<usize> {
    cur.bump();
    cur.skip_spaces();
    let mut count = 0usize;
    while cur.peek() != b']' {
        if cur.at_end() {
            return Err(Error::UnterminatedArray);
        }
        skip_value(cur)?;
        cur.skip_spaces();
        count += 1;
        if !cur.eat(b',') {
            break;
        }
        cur.skip_spaces();
    }
    if !cur.eat(b']') {
        return Err(Error::UnterminatedArray);
    }
    Ok(count)
}

/// Numbers are validated by handing the scanned token to the standard f64
/// parser; the value itself is discarded.
pub(crate) fn skip_number(cur: &mut Cursor) -> Result<()> {
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
    let token = std::str::from_utf8(cur.span(start)).map_err(|_| Error::InvalidValue)?;
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(Error::InvalidValue),
    }
}

pub(crate) fn skip_boolean(cur: &mut Cursor) -> Result<()> {
    if cur.eat_keyword(b"true") || cur.eat_keyword(b"false") {
        Ok(())
    } else {
        Err(Error::InvalidValue)
    }
}

pub(crate) fn skip_null(cur: &mut Cursor) -> Result<()> {
    if cur.eat_keyword(b"null") {
        Ok(())
    } else {
        Err(Error::InvalidValue)
    }
}
