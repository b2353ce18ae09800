//! Per-kind field schemas.
//!
//! A [`Layout`] is built on demand for one box: it may depend on the box's
//! version, flags and a few count fields, so layout functions get the box and
//! read what they need. Field values themselves are only decoded when asked
//! for.

use crate::error::Result;
use crate::known_boxes::KnownBox;
use crate::table::EntryDef;
use crate::value::BoxValue;

pub(crate) mod data;
pub(crate) mod file;
pub(crate) mod fragment;
pub(crate) mod group;
pub(crate) mod media;
pub(crate) mod meta;
pub(crate) mod movie;
pub(crate) mod protection;
pub(crate) mod sample;
pub(crate) mod time;
pub(crate) mod track;
pub(crate) mod user;

pub(crate) type DecodeFn = fn(&[u8]) -> Result<BoxValue>;

/// Where a field starts, relative to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum At {
    /// Offset into the payload, which begins after the base header and, for
    /// full boxes, version/flags.
    Payload(u64),
    /// Offset past the end of an earlier field, terminator included.
    After(&'static str, u64),
}

impl At {
    fn advance(self, n: u64) -> At {
        match self {
            At::Payload(p) => At::Payload(p + n),
            At::After(name, p) => At::After(name, p + n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Len {
    Fixed(u64),
    ToEnd,
    /// Up to a terminator byte, which is consumed but not part of the value.
    /// An optional field is absent when it would start at the end of the box.
    Until { terminator: u8, optional: bool },
}

#[derive(Clone, Copy)]
pub(crate) enum Decode {
    Key(&'static str),
    With(DecodeFn),
    Absent,
}

#[derive(Clone, Copy)]
pub(crate) struct FieldDef {
    pub name: &'static str,
    pub at: At,
    pub len: Len,
    pub decode: Decode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Count {
    Fixed(u64),
    /// As many whole entries as fit before the end of the box.
    ToEnd,
}

#[derive(Clone)]
pub(crate) struct TableDef {
    pub name: &'static str,
    pub at: At,
    pub count: Count,
    pub entry: EntryDef,
    pub widths: [u8; 4],
}

/// How a container resolves the kinds of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildResolve {
    Registry,
    /// Registry first, then this kind instead of the generic box.
    Fallback(KnownBox),
    /// Every child is this kind whatever its code.
    Force(KnownBox),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Body {
    Leaf,
    Children { at: At, limit: Option<u64>, resolve: ChildResolve },
}

#[derive(Clone)]
pub(crate) struct Layout {
    pub fields: Vec<FieldDef>,
    pub tables: Vec<TableDef>,
    pub body: Body,
    pos: At,
}

impl Layout {
    pub fn leaf() -> Self {
        Self { fields: Vec::new(), tables: Vec::new(), body: Body::Leaf, pos: At::Payload(0) }
    }

    /// Container whose children follow whatever fields are declared before
    /// [`children`](Self::children) is called; with no call they start at the
    /// payload.
    pub fn container() -> Self {
        Self::leaf().children()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn table_def(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn push(mut self, name: &'static str, len: Len, decode: Decode) -> Self {
        self.fields.push(FieldDef { name, at: self.pos, len, decode });
        self.pos = match len {
            Len::Fixed(n) => self.pos.advance(n),
            _ => At::After(name, 0),
        };
        self
    }

    /// Fixed-width field at the current position.
    pub fn next(self, name: &'static str, len: u64, key: &'static str) -> Self {
        self.push(name, Len::Fixed(len), Decode::Key(key))
    }

    pub fn next_with(self, name: &'static str, len: u64, f: DecodeFn) -> Self {
        self.push(name, Len::Fixed(len), Decode::With(f))
    }

    /// Field sharing bytes with the one that follows; the position does not move.
    pub fn overlay(mut self, name: &'static str, len: u64, f: DecodeFn) -> Self {
        self.fields.push(FieldDef { name, at: self.pos, len: Len::Fixed(len), decode: Decode::With(f) });
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.pos = self.pos.advance(n);
        self
    }

    /// NUL-terminated string.
    pub fn cstr(self, name: &'static str) -> Self {
        self.push(name, Len::Until { terminator: 0, optional: false }, Decode::Key("cstring"))
    }

    /// NUL-terminated string that may be missing at the end of the box.
    pub fn cstr_opt(self, name: &'static str) -> Self {
        self.push(name, Len::Until { terminator: 0, optional: true }, Decode::Key("cstring"))
    }

    /// Everything from the current position to the end of the box.
    pub fn rest(self, name: &'static str, key: &'static str) -> Self {
        self.push(name, Len::ToEnd, Decode::Key(key))
    }

    /// Declared for this kind but not present with this version/flags.
    pub fn absent(mut self, name: &'static str) -> Self {
        self.fields.push(FieldDef { name, at: self.pos, len: Len::Fixed(0), decode: Decode::Absent });
        self
    }

    pub fn table(mut self, name: &'static str, count: u64, entry: EntryDef) -> Self {
        self.tables.push(TableDef { name, at: self.pos, count: Count::Fixed(count), entry, widths: [0; 4] });
        self
    }

    pub fn table_to_end(mut self, name: &'static str, entry: EntryDef) -> Self {
        self.tables.push(TableDef { name, at: self.pos, count: Count::ToEnd, entry, widths: [0; 4] });
        self
    }

    /// Field widths handed to the entry decoders of the last table.
    pub fn widths(mut self, widths: [u8; 4]) -> Self {
        if let Some(t) = self.tables.last_mut() {
            t.widths = widths;
        }
        self
    }

    /// Children begin at the current position.
    pub fn children(mut self) -> Self {
        self.body = Body::Children { at: self.pos, limit: None, resolve: ChildResolve::Registry };
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        if let Body::Children { limit, .. } = &mut self.body {
            *limit = Some(count);
        }
        self
    }

    pub fn resolve(mut self, how: ChildResolve) -> Self {
        if let Body::Children { resolve, .. } = &mut self.body {
            *resolve = how;
        }
        self
    }
}

/// Width of time and duration fields in version 0 and 1 headers.
pub(crate) fn time_width(version: u8) -> u64 {
    if version == 1 { 8 } else { 4 }
}

pub(crate) fn decode_u16_list(data: &[u8]) -> Result<BoxValue> {
    let values = data.chunks_exact(2).map(|c| BoxValue::UInt(u16::from_be_bytes([c[0], c[1]]) as u64));
    Ok(BoxValue::List(values.collect()))
}

pub(crate) fn decode_high_nibble(data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::UInt(data.first().map_or(0, |b| (b >> 4) as u64)))
}

pub(crate) fn decode_low_nibble(data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::UInt(data.first().map_or(0, |b| (b & 0x0F) as u64)))
}
