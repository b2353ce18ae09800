use crate::boxes::{BoxHeader, FourCC};
use crate::error::{ParseError, Result};
use crate::window::ByteWindow;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Peeks the box header at `rel` inside `window` without deciding what kind of
/// box it is.
///
/// Returns `Ok(None)` when the stream ends exactly at `rel`. Running out of
/// bytes part way through a header is [`ParseError::Truncated`].
pub fn read_box_header(window: &ByteWindow, rel: u64) -> Result<Option<BoxHeader>> {
    let start = window.start() + rel;
    let mut wanted = 8u64;
    if let Some(len) = window.len() {
        let remaining = len.saturating_sub(rel);
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < wanted {
            return Err(ParseError::Truncated { offset: start, wanted, got: remaining });
        }
    }

    let base = window.peek(rel, wanted)?;
    if base.is_empty() {
        return Ok(None);
    }
    if (base.len() as u64) < wanted {
        return Err(ParseError::Truncated { offset: start, wanted, got: base.len() as u64 });
    }

    let mut r = Cursor::new(base);
    let size32 = r.read_u32::<BigEndian>()?;
    let mut typ = [0u8; 4];
    r.read_exact(&mut typ)?;
    let mut size = size32 as u64;
    let extended = size32 == 1;

    let mut extra = 0u64;
    if extended {
        extra += 8;
    }
    if &typ == b"uuid" {
        extra += 16;
    }
    if extra > 0 {
        let more = window.peek(rel + wanted, extra)?;
        if (more.len() as u64) < extra {
            return Err(ParseError::Truncated { offset: start, wanted: wanted + extra, got: wanted + more.len() as u64 });
        }
        wanted += extra;
        let mut r = Cursor::new(more);
        if extended {
            size = r.read_u64::<BigEndian>()?;
        }
        if &typ == b"uuid" {
            let mut u = [0u8; 16];
            r.read_exact(&mut u)?;
            return finish(BoxHeader { size, typ: FourCC(typ), uuid: Some(u), header_size: wanted, start, extended });
        }
    }

    finish(BoxHeader { size, typ: FourCC(typ), uuid: None, header_size: wanted, start, extended })
}

fn finish(h: BoxHeader) -> Result<Option<BoxHeader>> {
    if (h.size != 0 || h.extended) && h.size < h.header_size {
        return Err(ParseError::InvalidSize { offset: h.start, size: h.size });
    }
    // a 64-bit size can claim an end past the addressable range
    if h.start.checked_add(h.size).is_none() {
        return Err(ParseError::InvalidSize { offset: h.start, size: h.size });
    }
    log::debug!("box '{}' at {} size {}", h.typ, h.start, h.size);
    Ok(Some(h))
}
