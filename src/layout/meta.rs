//! `meta` and the item boxes (locations, info, references, properties).

use super::{ChildResolve, Layout, decode_high_nibble, decode_low_nibble};
use crate::error::{ParseError, Result};
use crate::known_boxes::KnownBox;
use crate::node::BoxRef;
use crate::table::{EntryCtx, EntryDef};
use crate::value::BoxValue;
use crate::window::ByteWindow;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

pub(crate) fn xml() -> Layout {
    Layout::leaf().rest("xml", "string")
}

pub(crate) fn binary_xml() -> Layout {
    Layout::leaf().rest("data", "default")
}

// widths: [offset_size, length_size, base_offset_size, index_size]
const OFFSET: usize = 0;
const LENGTH: usize = 1;
const BASE: usize = 2;
const INDEX: usize = 3;

fn item_id_width(ctx: &EntryCtx) -> u64 {
    if ctx.version == 2 { 4 } else { 2 }
}

/// Bytes before `extent_count` in one `iloc` item.
fn iloc_item_prefix(ctx: &EntryCtx) -> u64 {
    let construction = if ctx.version >= 1 { 2 } else { 0 };
    item_id_width(ctx) + construction + 2 + ctx.widths[BASE] as u64
}

fn iloc_extent_width(ctx: &EntryCtx) -> u64 {
    let index = if ctx.version >= 1 { ctx.widths[INDEX] as u64 } else { 0 };
    index + ctx.widths[OFFSET] as u64 + ctx.widths[LENGTH] as u64
}

/// Offset, length, base offset and index widths are 0, 4 or 8 bytes.
fn check_iloc_widths(ctx: &EntryCtx) -> Result<()> {
    match ctx.widths.iter().find(|w| !matches!(w, 0 | 4 | 8)) {
        Some(w) => Err(ParseError::InvalidFormat {
            format: format!("iloc field width {w}"),
            reason: "field widths must be 0, 4 or 8",
        }),
        None => Ok(()),
    }
}

fn iloc_item_size(ctx: &EntryCtx, w: &ByteWindow) -> Result<u64> {
    check_iloc_widths(ctx)?;
    let prefix = iloc_item_prefix(ctx);
    let extents = w.u16_at(prefix)? as u64;
    Ok(prefix + 2 + extents * iloc_extent_width(ctx))
}

fn read_sized(r: &mut Cursor<&[u8]>, width: u8) -> Result<u64> {
    match width {
        0 => Ok(0),
        1..=8 => Ok(r.read_uint::<BigEndian>(width as usize)?),
        _ => Err(ParseError::InvalidFormat { format: format!("uint{}", width as u32 * 8), reason: "wider than 8 bytes" }),
    }
}

fn iloc_item(ctx: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    check_iloc_widths(ctx)?;
    let mut r = Cursor::new(data);
    let item_id = read_sized(&mut r, item_id_width(ctx) as u8)?;
    let construction_method = if ctx.version >= 1 {
        BoxValue::UInt((r.read_u16::<BigEndian>()? & 0x0F) as u64)
    } else {
        BoxValue::None
    };
    let data_reference_index = r.read_u16::<BigEndian>()?;
    let base_offset = read_sized(&mut r, ctx.widths[BASE])?;
    let extent_count = r.read_u16::<BigEndian>()?;
    let mut extents = Vec::with_capacity(extent_count as usize);
    for _ in 0..extent_count {
        let index = if ctx.version >= 1 && ctx.widths[INDEX] > 0 {
            BoxValue::UInt(read_sized(&mut r, ctx.widths[INDEX])?)
        } else {
            BoxValue::None
        };
        extents.push(BoxValue::Record(vec![
            ("extent_index", index),
            ("extent_offset", BoxValue::UInt(read_sized(&mut r, ctx.widths[OFFSET])?)),
            ("extent_length", BoxValue::UInt(read_sized(&mut r, ctx.widths[LENGTH])?)),
        ]));
    }
    Ok(BoxValue::Record(vec![
        ("item_id", BoxValue::UInt(item_id)),
        ("construction_method", construction_method),
        ("data_reference_index", BoxValue::UInt(data_reference_index as u64)),
        ("base_offset", BoxValue::UInt(base_offset)),
        ("extent_count", BoxValue::UInt(extent_count as u64)),
        ("extents", BoxValue::List(extents)),
    ]))
}

/// `iloc`, versions 0 to 2. Item sizes depend on their extent counts, so
/// items are located one after another.
pub(crate) fn item_location(bx: &BoxRef) -> Result<Layout> {
    let version = bx.version_or_default()?;
    let sizes = bx.payload_u8(0)?;
    let more = bx.payload_u8(1)?;
    let index_size = if matches!(version, 1 | 2) { more & 0x0F } else { 0 };
    let layout = Layout::leaf()
        .overlay("offset_size", 1, decode_high_nibble)
        .next_with("length_size", 1, decode_low_nibble)
        .overlay("base_offset_size", 1, decode_high_nibble);
    let layout = if matches!(version, 1 | 2) {
        layout.next_with("index_size", 1, decode_low_nibble)
    } else {
        layout.absent("index_size").skip(1)
    };
    let (count_width, count) = if version < 2 {
        (2, bx.payload_u16(2)? as u64)
    } else {
        (4, bx.payload_u32(2)? as u64)
    };
    Ok(layout
        .next("item_count", count_width, "int")
        .table("items", count, EntryDef::Variable(iloc_item_size, iloc_item))
        .widths([sizes >> 4, sizes & 0x0F, more >> 4, index_size]))
}

pub(crate) fn primary_item(bx: &BoxRef) -> Result<Layout> {
    let w = if bx.version_or_default()? == 0 { 2 } else { 4 };
    Ok(Layout::leaf().next("item_id", w, "int"))
}

pub(crate) fn item_protection(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u16(0)? as u64;
    Ok(Layout::leaf().next("protection_count", 2, "int").children().limit(count))
}

/// `infe`. Versions 0 and 1 carry MIME-style names; versions 2 and 3 add an
/// item type that decides which strings follow.
pub(crate) fn item_info_entry(bx: &BoxRef) -> Result<Layout> {
    let version = bx.version_or_default()?;
    if version < 2 {
        return Ok(Layout::leaf()
            .next("item_id", 2, "int")
            .next("item_protection_index", 2, "int")
            .cstr("item_name")
            .cstr("content_type")
            .cstr_opt("content_encoding"));
    }
    let id_width = if version == 2 { 2 } else { 4 };
    let item_type = bx.payload_fourcc(id_width + 2)?;
    let layout = Layout::leaf()
        .next("item_id", id_width, "int")
        .next("item_protection_index", 2, "int")
        .next("item_type", 4, "fourcc")
        .cstr("item_name");
    Ok(match &item_type.0 {
        b"mime" => layout.cstr("content_type").cstr_opt("content_encoding"),
        b"uri " => layout.cstr("item_uri_type"),
        _ => layout,
    })
}

pub(crate) fn item_info(bx: &BoxRef) -> Result<Layout> {
    let (w, count) = if bx.version_or_default()? == 0 {
        (2, bx.payload_u16(0)? as u64)
    } else {
        (4, bx.payload_u32(0)? as u64)
    };
    Ok(Layout::leaf().next("entry_count", w, "int").children().limit(count))
}

pub(crate) fn metabox_relation() -> Layout {
    Layout::leaf()
        .next("first_metabox_handler_type", 4, "fourcc")
        .next("second_metabox_handler_type", 4, "fourcc")
        .next("metabox_relation", 1, "int")
}

/// `iref`: 16-bit item ids in version 0, 32-bit from version 1.
pub(crate) fn item_reference(bx: &BoxRef) -> Result<Layout> {
    let kind = if bx.version_or_default()? == 0 {
        KnownBox::SingleItemReference
    } else {
        KnownBox::SingleItemReferenceLarge
    };
    Ok(Layout::container().resolve(ChildResolve::Force(kind)))
}

pub(crate) fn single_item_reference(bx: &BoxRef, large: bool) -> Result<Layout> {
    let (w, entry) = if large { (4, ">I") } else { (2, ">H") };
    let count = bx.payload_u16(w)? as u64;
    Ok(Layout::leaf()
        .next("from_item_id", w, "int")
        .next("reference_count", 2, "int")
        .table("to_item_ids", count, EntryDef::Scalar(entry)))
}

pub(crate) fn image_spatial_extents() -> Layout {
    Layout::leaf().next("image_width", 4, "int").next("image_height", 4, "int")
}
