//! Lazily indexed runs of homogeneous entries inside a box payload.

use crate::boxes::BoxFlags;
use crate::error::{ParseError, Result};
use crate::format::Format;
use crate::value::BoxValue;
use crate::window::ByteWindow;
use std::cell::RefCell;
use std::collections::HashMap;

/// What an entry decoder may depend on besides its bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCtx {
    pub version: u8,
    pub flags: BoxFlags,
    /// Box-specific field widths, e.g. the offset/length/base/index sizes of `iloc`.
    pub widths: [u8; 4],
}

pub(crate) type EntryFn = fn(&EntryCtx, &[u8]) -> Result<BoxValue>;
pub(crate) type SizeFn = fn(&EntryCtx, &ByteWindow) -> Result<u64>;

/// Shape of one entry.
#[derive(Clone, Copy)]
pub(crate) enum EntryDef {
    /// Fixed-size record of named members.
    Record { format: &'static str, names: &'static [&'static str] },
    /// Single-code format, yielding the value itself.
    Scalar(&'static str),
    /// Sub-byte or narrow integers packed back to back (4, 8 or 16 bits).
    Packed(u8),
    Sized(u64, EntryFn),
    /// Entries whose size is only known by reading them.
    Variable(SizeFn, EntryFn),
}

enum Entries {
    Record(Format, &'static [&'static str]),
    Scalar(Format),
    Packed(u8),
    Sized(u64, EntryFn),
    Variable(SizeFn, EntryFn),
}

/// A table of `len()` entries. Fixed-size entries are located by arithmetic;
/// variable-size ones require every earlier entry to be measured first. Each
/// decoded entry is cached.
pub struct Table {
    window: ByteWindow,
    count: u64,
    entries: Entries,
    ctx: EntryCtx,
    spans: RefCell<Vec<(u64, u64)>>,
    cache: RefCell<HashMap<u64, BoxValue>>,
}

impl Table {
    pub(crate) fn new(window: ByteWindow, count: Option<u64>, def: EntryDef, ctx: EntryCtx) -> Result<Self> {
        let entries = match def {
            EntryDef::Record { format, names } => Entries::Record(Format::parse(format)?, names),
            EntryDef::Scalar(format) => Entries::Scalar(Format::parse(format)?),
            EntryDef::Packed(bits) => {
                if !matches!(bits, 4 | 8 | 16) {
                    return Err(ParseError::InvalidFormat {
                        format: format!("{bits}-bit entries"),
                        reason: "packed entries must be 4, 8 or 16 bits wide",
                    });
                }
                Entries::Packed(bits)
            }
            EntryDef::Sized(size, f) => Entries::Sized(size, f),
            EntryDef::Variable(size, f) => Entries::Variable(size, f),
        };
        let mut table = Self {
            window,
            count: 0,
            entries,
            ctx,
            spans: RefCell::new(Vec::new()),
            cache: RefCell::new(HashMap::new()),
        };
        table.count = match count {
            Some(n) => n,
            None => {
                let avail = table.window.end()? - table.window.start();
                match table.entry_bits() {
                    Some(0) | None => 0,
                    Some(bits) => avail * 8 / bits,
                }
            }
        };
        Ok(table)
    }

    fn entry_bits(&self) -> Option<u64> {
        match &self.entries {
            Entries::Record(f, _) | Entries::Scalar(f) => Some(f.size() as u64 * 8),
            Entries::Packed(bits) => Some(*bits as u64),
            Entries::Sized(size, _) => Some(size * 8),
            Entries::Variable(..) => None,
        }
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entry size in bytes when constant.
    pub fn entry_size(&self) -> Option<u64> {
        match &self.entries {
            Entries::Packed(_) => None,
            _ => self.entry_bits().map(|bits| bits / 8),
        }
    }

    /// How many entry offsets have been discovered so far. Constant-size
    /// tables never need to discover any.
    pub fn measured(&self) -> usize {
        self.spans.borrow().len()
    }

    /// Entry by index; negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<BoxValue> {
        let resolved = if index < 0 { self.count.checked_sub(index.unsigned_abs()) } else { Some(index as u64) };
        match resolved {
            Some(i) if i < self.count => self.entry(i),
            _ => Err(ParseError::IndexOutOfRange { index, len: self.count }),
        }
    }

    fn entry(&self, i: u64) -> Result<BoxValue> {
        if let Some(v) = self.cache.borrow().get(&i) {
            return Ok(v.clone());
        }
        let value = match &self.entries {
            Entries::Record(format, names) => {
                let size = format.size() as u64;
                let values = self.window.unpack_at(i * size, format)?;
                BoxValue::Record(names.iter().copied().zip(values).collect())
            }
            Entries::Scalar(format) => {
                let size = format.size() as u64;
                self.window.unpack_at(i * size, format)?.into_iter().next().unwrap_or(BoxValue::None)
            }
            Entries::Packed(4) => {
                let byte = self.window.u8_at(i / 2)?;
                let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                BoxValue::UInt(nibble as u64)
            }
            Entries::Packed(16) => BoxValue::UInt(self.window.u16_at(i * 2)? as u64),
            Entries::Packed(_) => BoxValue::UInt(self.window.u8_at(i)? as u64),
            Entries::Sized(size, decode) => decode(&self.ctx, &self.window.read_at(i * size, *size)?)?,
            Entries::Variable(size_fn, decode) => {
                let (start, len) = self.span(i, *size_fn)?;
                decode(&self.ctx, &self.window.read_at(start, len)?)?
            }
        };
        self.cache.borrow_mut().insert(i, value.clone());
        Ok(value)
    }

    fn span(&self, i: u64, size_fn: SizeFn) -> Result<(u64, u64)> {
        let mut spans = self.spans.borrow_mut();
        while spans.len() as u64 <= i {
            let start = spans.last().map_or(0, |(s, l)| s + l);
            let len = size_fn(&self.ctx, &self.window.sub_window(start, None)?)?;
            spans.push((start, len));
        }
        Ok(spans[i as usize])
    }

    pub fn iter(&self) -> TableIter<'_> {
        TableIter { table: self, next: 0 }
    }

    pub fn to_vec(&self) -> Result<Vec<BoxValue>> {
        self.iter().collect()
    }
}

pub struct TableIter<'a> {
    table: &'a Table,
    next: u64,
}

impl Iterator for TableIter<'_> {
    type Item = Result<BoxValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.table.count {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(self.table.entry(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.table.count - self.next) as usize;
        (left, Some(left))
    }
}
