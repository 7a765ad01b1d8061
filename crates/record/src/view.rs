//! Read-back access to a materialized buffer.
//!
//! Materialized records store real addresses for strings, arrays, and
//! pointer fields. `RecordView` resolves those addresses back into offsets
//! of the buffer it was given, so embedders (and this repository's tests)
//! can walk the result without pointer arithmetic. Every accessor returns
//! `None` rather than panicking when asked for a field that does not exist,
//! has a different shape, or holds an address outside the buffer.

use crate::meta::{
    hash, FieldMeta, RecordMeta, ResolveRecord, TypeTag, ARRAY_COUNT_OFFSET,
    ARRAY_ELEMENTS_OFFSET, ARRAY_STRIDE_OFFSET, FLAG_ARRAY, FLAG_POINTER,
};

/// A view of one record inside a materialized buffer.
pub struct RecordView<'a, R: ResolveRecord + ?Sized> {
    buf: &'a [u8],
    resolver: &'a R,
    meta: &'a RecordMeta,
    offset: usize,
}

// Manual impl: derive(Clone) would demand R: Clone.
impl<'a, R: ResolveRecord + ?Sized> Clone for RecordView<'a, R> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf,
            resolver: self.resolver,
            meta: self.meta,
            offset: self.offset,
        }
    }
}

fn read_bytes<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    buf.get(offset..offset + N)?.try_into().ok()
}

fn read_addr(buf: &[u8], offset: usize) -> Option<usize> {
    read_bytes::<8>(buf, offset).map(|b| u64::from_ne_bytes(b) as usize)
}

// Maps a stored absolute address back to a buffer offset.
fn addr_to_offset(buf: &[u8], addr: usize) -> Option<usize> {
    let base = buf.as_ptr() as usize;
    if addr < base || addr > base + buf.len() {
        return None;
    }
    Some(addr - base)
}

fn read_signed(buf: &[u8], offset: usize, ty: TypeTag) -> Option<i64> {
    use TypeTag::*;
    Some(match ty {
        Char | Int8 => i8::from_ne_bytes(read_bytes(buf, offset)?) as i64,
        Short | Int16 => i16::from_ne_bytes(read_bytes(buf, offset)?) as i64,
        Int | Int32 => i32::from_ne_bytes(read_bytes(buf, offset)?) as i64,
        Long | Int64 => i64::from_ne_bytes(read_bytes(buf, offset)?),
        _ => return None,
    })
}

fn read_unsigned(buf: &[u8], offset: usize, ty: TypeTag) -> Option<u64> {
    use TypeTag::*;
    Some(match ty {
        UChar | UInt8 => u8::from_ne_bytes(read_bytes(buf, offset)?) as u64,
        UShort | UInt16 => u16::from_ne_bytes(read_bytes(buf, offset)?) as u64,
        UInt | UInt32 => u32::from_ne_bytes(read_bytes(buf, offset)?) as u64,
        ULong | UInt64 => u64::from_ne_bytes(read_bytes(buf, offset)?),
        _ => return None,
    })
}

fn read_float(buf: &[u8], offset: usize, ty: TypeTag) -> Option<f64> {
    match ty {
        TypeTag::Float => Some(f32::from_ne_bytes(read_bytes(buf, offset)?) as f64),
        TypeTag::Double => Some(f64::from_ne_bytes(read_bytes(buf, offset)?)),
        _ => None,
    }
}

// Follows a string holder: the pointed-to bytes run to the NUL terminator.
fn read_str<'a>(buf: &'a [u8], holder: usize) -> Option<&'a str> {
    let offset = addr_to_offset(buf, read_addr(buf, holder)?)?;
    let len = buf[offset..].iter().position(|&b| b == 0)?;
    std::str::from_utf8(&buf[offset..offset + len]).ok()
}

impl<'a, R: ResolveRecord + ?Sized> RecordView<'a, R> {
    /// A view of the root record materialized at the start of `buf`.
    pub fn root(buf: &'a [u8], resolver: &'a R, record_hash: u32) -> Option<Self> {
        let meta = resolver.resolve_record(record_hash)?;
        Some(Self {
            buf,
            resolver,
            meta,
            offset: 0,
        })
    }

    pub fn meta(&self) -> &'a RecordMeta {
        self.meta
    }

    fn field(&self, name: &str, flags: u8) -> Option<(&'a FieldMeta, usize)> {
        let field = self.meta.find_field(hash(name.as_bytes()))?;
        if field.flags != flags {
            return None;
        }
        Some((field, self.offset + field.offset as usize))
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        let (field, offset) = self.field(name, 0)?;
        read_signed(self.buf, offset, field.ty)
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        let (field, offset) = self.field(name, 0)?;
        read_unsigned(self.buf, offset, field.ty)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        let (field, offset) = self.field(name, 0)?;
        read_float(self.buf, offset, field.ty)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        let (field, offset) = self.field(name, 0)?;
        (field.ty == TypeTag::Bool).then(|| self.buf[offset] != 0)
    }

    pub fn string(&self, name: &str) -> Option<&'a str> {
        let (field, offset) = self.field(name, 0)?;
        (field.ty == TypeTag::String).then(|| read_str(self.buf, offset))?
    }

    /// A nested by-value record.
    pub fn record(&self, name: &str) -> Option<RecordView<'a, R>> {
        let (field, offset) = self.field(name, 0)?;
        if field.ty != TypeTag::Record {
            return None;
        }
        Some(RecordView {
            buf: self.buf,
            resolver: self.resolver,
            meta: self.resolver.resolve_record(field.type_hash)?,
            offset,
        })
    }

    /// Whether a pointer field holds the null sentinel.
    pub fn is_null(&self, name: &str) -> Option<bool> {
        let (_, offset) = self.field(name, FLAG_POINTER)?;
        Some(read_addr(self.buf, offset)? == 0)
    }

    /// Dereferences a pointer-to-record field; None when null.
    pub fn deref_record(&self, name: &str) -> Option<RecordView<'a, R>> {
        let (field, offset) = self.field(name, FLAG_POINTER)?;
        if field.ty != TypeTag::Record {
            return None;
        }
        let target = addr_to_offset(self.buf, read_addr(self.buf, offset)?)?;
        Some(RecordView {
            buf: self.buf,
            resolver: self.resolver,
            meta: self.resolver.resolve_record(field.type_hash)?,
            offset: target,
        })
    }

    pub fn array(&self, name: &str) -> Option<ArrayView<'a, R>> {
        let (field, offset) = self.field(name, FLAG_ARRAY)?;
        let elements = read_addr(self.buf, offset + ARRAY_ELEMENTS_OFFSET as usize)?;
        let count = u32::from_ne_bytes(read_bytes(
            self.buf,
            offset + ARRAY_COUNT_OFFSET as usize,
        )?);
        let stride = u32::from_ne_bytes(read_bytes(
            self.buf,
            offset + ARRAY_STRIDE_OFFSET as usize,
        )?);
        let base = if count == 0 {
            0
        } else {
            addr_to_offset(self.buf, elements)?
        };
        Some(ArrayView {
            buf: self.buf,
            resolver: self.resolver,
            field,
            base,
            count,
            stride,
        })
    }
}

/// A view of an array holder's elements.
pub struct ArrayView<'a, R: ResolveRecord + ?Sized> {
    buf: &'a [u8],
    resolver: &'a R,
    field: &'a FieldMeta,
    base: usize,
    count: u32,
    stride: u32,
}

impl<'a, R: ResolveRecord + ?Sized> ArrayView<'a, R> {
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    fn slot(&self, index: usize) -> Option<usize> {
        (index < self.count as usize).then(|| self.base + index * self.stride as usize)
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        read_signed(self.buf, self.slot(index)?, self.field.ty)
    }

    pub fn uint(&self, index: usize) -> Option<u64> {
        read_unsigned(self.buf, self.slot(index)?, self.field.ty)
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        read_float(self.buf, self.slot(index)?, self.field.ty)
    }

    pub fn string(&self, index: usize) -> Option<&'a str> {
        if self.field.ty != TypeTag::String {
            return None;
        }
        read_str(self.buf, self.slot(index)?)
    }

    pub fn record(&self, index: usize) -> Option<RecordView<'a, R>> {
        if self.field.ty != TypeTag::Record {
            return None;
        }
        Some(RecordView {
            buf: self.buf,
            resolver: self.resolver,
            meta: self.resolver.resolve_record(self.field.type_hash)?,
            offset: self.slot(index)?,
        })
    }
}
