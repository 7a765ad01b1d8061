//! The metadata-driven object/array/pointer driver and the two public
//! operations built on it.
//!
//! Both operations run the identical traversal; `size` carries a counting
//! arena and `deserialize` a writing one. Identical control flow and
//! identical alignment decisions are what make the size computed by the
//! first pass exactly sufficient for the second.

use crate::arena::Arena;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::meta::{
    hash, FieldMeta, RecordMeta, ResolveRecord, TypeTag, ARRAY_COUNT_OFFSET,
    ARRAY_ELEMENTS_OFFSET, ARRAY_STRIDE_OFFSET, FLAG_ARRAY, FLAG_POINTER,
};
use crate::{scalar, skip, string};

/// Computes the buffer size required to deserialize `json` as the record
/// named by `record_hash`, without writing anything.
pub fn size<R: ResolveRecord + ?Sized>(
    resolver: &R,
    record_hash: u32,
    json: &[u8],
) -> Result<usize> {
    Driver {
        cur: Cursor::new(json),
        arena: Arena::counting(),
        resolver,
    }
    .execute(record_hash)
}

/// Deserializes `json` as the record named by `record_hash` into `buffer`.
/// The buffer must be at least as large as `size` reported for the same
/// document and aligned for the root record; short buffers fail with
/// ShortBuffer. On failure the buffer may hold partially-written bytes and
/// must not be read.
pub fn deserialize<R: ResolveRecord + ?Sized>(
    resolver: &R,
    buffer: &mut [u8],
    record_hash: u32,
    json: &[u8],
) -> Result<()> {
    Driver {
        cur: Cursor::new(json),
        arena: Arena::writing(buffer),
        resolver,
    }
    .execute(record_hash)
    .map(|_| ())
}

struct Driver<'j, 'buf, 'r, R: ?Sized> {
    cur: Cursor<'j>,
    arena: Arena<'buf>,
    resolver: &'r R,
}

impl<'j, 'buf, 'r, R: ResolveRecord + ?Sized> Driver<'j, 'buf, 'r, R> {
    fn execute(mut self, record_hash: u32) -> Result<usize> {
        let resolver = self.resolver;
        let meta = resolver
            .resolve_record(record_hash)
            .ok_or(Error::UnknownRecord)?;
        let root = self
            .arena
            .reserve(meta.size as usize, meta.alignment as usize)?;

        self.cur.skip_spaces();
        if self.cur.peek() != b'{' {
            return Err(Error::ObjectExpected);
        }
        self.parse_record(root, meta)?;
        self.cur.skip_spaces();
        if !self.cur.at_end() {
            return Err(Error::EofExpected);
        }
        Ok(self.arena.cursor())
    }

    // One record object: { "key": value, ... }. The record footprint is
    // zeroed up front so absent fields read as zero/null.
    fn parse_record(&mut self, out: usize, meta: &RecordMeta) -> Result<()> {
        if self.cur.peek() != b'{' {
            return Err(Error::InvalidValue);
        }
        self.arena.fill_zero(out, meta.size as usize);
        self.cur.bump();
        self.cur.skip_spaces();

        while self.cur.peek() != b'}' {
            if self.cur.at_end() {
                return Err(Error::UnterminatedObject);
            }
            if self.cur.peek() != b'"' {
                return Err(Error::MissingKey);
            }
            let key_hash = self.read_key_hash()?;
            self.cur.skip_spaces();
            if !self.cur.eat(b':') {
                return Err(Error::MissingValue);
            }
            self.cur.skip_spaces();

            match meta.find_field(key_hash) {
                Some(field) => self.parse_field(out + field.offset as usize, field)?,
                None => skip::skip_value(&mut self.cur)?,
            }

            self.cur.skip_spaces();
            if !self.cur.eat(b',') {
                break;
            }
            self.cur.skip_spaces();
        }

        if !self.cur.eat(b'}') {
            return Err(Error::UnterminatedObject);
        }
        Ok(())
    }

    // Reads a quoted key and hashes its raw bytes. A quote preceded by a
    // backslash does not terminate the key.
    fn read_key_hash(&mut self) -> Result<u32> {
        self.cur.bump();
        let bytes = self.cur.input();
        let start = self.cur.pos();
        let mut i = start;
        while i < bytes.len() {
            if bytes[i] == b'"' && bytes[i - 1] != b'\\' {
                self.cur.set_pos(i + 1);
                return Ok(hash(&bytes[start..i]));
            }
            i += 1;
        }
        Err(Error::UnterminatedKey)
    }

    // Dispatches one field value on (flags, type).
    fn parse_field(&mut self, out: usize, field: &FieldMeta) -> Result<()> {
        if field.flags & (FLAG_ARRAY | FLAG_POINTER) == 0 {
            return match field.ty {
                TypeTag::Record => {
                    let resolver = self.resolver;
                    let meta = resolver
                        .resolve_record(field.type_hash)
                        .ok_or(Error::UnknownRecord)?;
                    self.parse_record(out, meta)
                }
                TypeTag::String => string::parse(&mut self.cur, &mut self.arena, out),
                _ => scalar::parse(&mut self.cur, &mut self.arena, out, field.ty),
            };
        }

        // Arrays and pointers need their element footprint up front.
        let (size, align) = match field.ty.layout() {
            Some((size, align)) => (size as usize, align as usize),
            None => {
                let meta = self
                    .resolver
                    .resolve_record(field.type_hash)
                    .ok_or(Error::UnknownRecord)?;
                (meta.size as usize, meta.alignment as usize)
            }
        };

        if field.flags & FLAG_ARRAY != 0 {
            return self.parse_array(out, size, align, field);
        }

        // Pointer: null stores the sentinel, anything else points at one
        // freshly allocated element.
        if self.cur.eat_keyword(b"null") {
            self.arena.put_addr(out, 0);
            return Ok(());
        }
        let elem = self.arena.reserve(size, align)?;
        self.arena.put_addr(out, self.arena.address(elem));
        let pointee = FieldMeta {
            flags: field.flags & !FLAG_POINTER,
            ..field.clone()
        };
        self.parse_field(elem, &pointee)
    }

    // Arrays are measured with a skipper pass to learn the element count,
    // then the cursor rewinds to just past the '[' and each element is
    // parsed into its slot.
    fn parse_array(
        &mut self,
        out: usize,
        elem_size: usize,
        elem_align: usize,
        field: &FieldMeta,
    ) -> Result<()> {
        if self.cur.peek() != b'[' {
            return Err(Error::InvalidValue);
        }
        let save = self.cur.pos();
        let count = skip::skip_array(&mut self.cur)?;
        self.cur.set_pos(save + 1);

        let total = elem_size.checked_mul(count).ok_or(Error::ShortBuffer)?;
        let elems = self.arena.reserve(total, elem_align)?;
        self.arena
            .put_addr(out + ARRAY_ELEMENTS_OFFSET as usize, self.arena.address(elems));
        self.arena
            .put_u32(out + ARRAY_COUNT_OFFSET as usize, count as u32);
        self.arena
            .put_u32(out + ARRAY_STRIDE_OFFSET as usize, elem_size as u32);

        let element = FieldMeta {
            flags: field.flags & !FLAG_ARRAY,
            ..field.clone()
        };

        self.cur.skip_spaces();
        let mut slot = elems;
        while self.cur.peek() != b']' {
            self.parse_field(slot, &element)?;
            self.cur.skip_spaces();
            slot += elem_size;
            if !self.cur.eat(b',') {
                break;
            }
            self.cur.skip_spaces();
        }
        if !self.cur.eat(b']') {
            return Err(Error::UnterminatedArray);
        }
        Ok(())
    }
}
