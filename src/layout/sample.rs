//! Sample description and the sample size, chunk and auxiliary tables.

use super::{ChildResolve, Layout};
use crate::error::Result;
use crate::known_boxes::KnownBox;
use crate::node::BoxRef;
use crate::parser::read_box_header;
use crate::table::{EntryCtx, EntryDef};
use crate::value::BoxValue;
use crate::window::ByteWindow;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

/// `stsd`: an entry count followed by that many sample entries.
pub(crate) fn sample_description(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf()
        .next("entry_count", 4, "int")
        .children()
        .limit(count)
        .resolve(ChildResolve::Fallback(KnownBox::SampleEntry)))
}

/// Entry of a coding we have no dedicated layout for.
pub(crate) fn sample_entry() -> Layout {
    Layout::leaf()
        .next("reserved", 6, "default")
        .next("data_reference_index", 2, "int")
        .rest("data", "default")
}

pub(crate) fn visual_sample_entry() -> Layout {
    Layout::leaf()
        .next("reserved", 6, "default")
        .next("data_reference_index", 2, "int")
        .skip(16)
        .next("width", 2, "int")
        .next("height", 2, "int")
        .next("horizresolution", 4, "ufixed32")
        .next("vertresolution", 4, "ufixed32")
        .skip(4)
        .next("frame_count", 2, "int")
        .next("compressorname", 32, "pstring")
        .next("depth", 2, "int")
        .skip(2)
        .children()
}

/// Audio entries. A non-zero QuickTime sound description version adds 16
/// (version 1) or 36 (version 2) bytes before the child boxes.
pub(crate) fn audio_sample_entry(bx: &BoxRef) -> Result<Layout> {
    let qt_version = bx.payload_u16(8)?;
    let layout = Layout::leaf()
        .next("reserved", 6, "default")
        .next("data_reference_index", 2, "int")
        .next("entry_version", 2, "int")
        .skip(6)
        .next("channelcount", 2, "int")
        .next("samplesize", 2, "int")
        .skip(4)
        .next("samplerate", 4, "ufixed32");
    let layout = match qt_version {
        1 => layout
            .next("samples_per_packet", 4, "int")
            .next("bytes_per_packet", 4, "int")
            .next("bytes_per_frame", 4, "int")
            .next("bytes_per_sample", 4, "int"),
        2 => layout.skip(36),
        _ => layout,
    };
    Ok(layout.children())
}

pub(crate) fn bit_rate() -> Layout {
    Layout::leaf()
        .next("buffer_size_db", 4, "int")
        .next("max_bitrate", 4, "int")
        .next("avg_bitrate", 4, "int")
}

/// Sample count of the sibling `stsz`/`stz2`, if there is one. Walks the
/// sibling headers directly so the answer does not depend on which other
/// handles are still alive.
fn sibling_sample_count(bx: &BoxRef) -> Result<Option<u64>> {
    let window = bx.enclosing();
    let mut rel = 0;
    let mut compact = None;
    while let Some(h) = read_box_header(window, rel)? {
        // both carry version/flags and one 32-bit field before sample_count
        let count_at = h.start - window.start() + h.header_size + 8;
        match &h.typ.0 {
            b"stsz" => return Ok(Some(window.u32_at(count_at)? as u64)),
            b"stz2" if compact.is_none() => compact = Some(window.u32_at(count_at)? as u64),
            _ => {}
        }
        match h.end() {
            Some(end) if window.stop().is_none_or(|stop| end <= stop) => rel = end - window.start(),
            _ => break,
        }
    }
    Ok(compact)
}

/// `stdp`: one 16-bit priority per sample.
pub(crate) fn degradation_priority(bx: &BoxRef) -> Result<Layout> {
    let count = match sibling_sample_count(bx)? {
        Some(n) => n,
        None => bx.payload_len()? / 2,
    };
    Ok(Layout::leaf().table("priorities", count, EntryDef::Scalar(">H")))
}

fn dependency_flags(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    let b = data.first().copied().unwrap_or(0);
    Ok(BoxValue::Record(vec![
        ("is_leading", BoxValue::UInt((b >> 6 & 0x3) as u64)),
        ("sample_depends_on", BoxValue::UInt((b >> 4 & 0x3) as u64)),
        ("sample_is_depended_on", BoxValue::UInt((b >> 2 & 0x3) as u64)),
        ("sample_has_redundancy", BoxValue::UInt((b & 0x3) as u64)),
    ]))
}

/// `sdtp`: one byte per sample. Without a sibling sample size box every
/// payload byte counts as a sample.
pub(crate) fn sample_dependency_type(bx: &BoxRef) -> Result<Layout> {
    let count = match sibling_sample_count(bx)? {
        Some(n) => n,
        None => bx.payload_len()?,
    };
    Ok(Layout::leaf().table("entries", count, EntryDef::Sized(1, dependency_flags)))
}

pub(crate) fn sample_size(bx: &BoxRef) -> Result<Layout> {
    let sample_size = bx.payload_u32(0)?;
    let count = bx.payload_u32(4)? as u64;
    let layout = Layout::leaf().next("sample_size", 4, "int").next("sample_count", 4, "int");
    Ok(if sample_size == 0 {
        layout.table("entry_sizes", count, EntryDef::Scalar(">I"))
    } else {
        layout.absent("entry_sizes")
    })
}

/// `stz2`: 4, 8 or 16-bit sizes; 4-bit sizes pack two per byte, high nibble first.
pub(crate) fn compact_sample_size(bx: &BoxRef) -> Result<Layout> {
    let field_size = bx.payload_u8(3)?;
    let count = bx.payload_u32(4)? as u64;
    Ok(Layout::leaf()
        .next("reserved", 3, "default")
        .next("field_size", 1, "int")
        .next("sample_count", 4, "int")
        .table("entry_sizes", count, EntryDef::Packed(field_size)))
}

pub(crate) fn sample_to_chunk(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf().next("entry_count", 4, "int").table(
        "entries",
        count,
        EntryDef::Record {
            format: ">III",
            names: &["first_chunk", "samples_per_chunk", "sample_description_index"],
        },
    ))
}

pub(crate) fn chunk_offset(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf().next("entry_count", 4, "int").table("entries", count, EntryDef::Scalar(">I")))
}

pub(crate) fn chunk_large_offset(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf().next("entry_count", 4, "int").table("entries", count, EntryDef::Scalar(">Q")))
}

fn padding_pair(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    let b = data.first().copied().unwrap_or(0);
    Ok(BoxValue::Record(vec![
        ("reserved_1", BoxValue::UInt((b >> 7) as u64)),
        ("pad1", BoxValue::UInt((b >> 4 & 0x7) as u64)),
        ("reserved_2", BoxValue::UInt((b >> 3 & 0x1) as u64)),
        ("pad2", BoxValue::UInt((b & 0x7) as u64)),
    ]))
}

/// `padb`: two samples per byte.
pub(crate) fn padding_bits(bx: &BoxRef) -> Result<Layout> {
    let samples = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf()
        .next("sample_count", 4, "int")
        .table("entries", samples.div_ceil(2), EntryDef::Sized(1, padding_pair)))
}

fn subsample_width(ctx: &EntryCtx) -> u64 {
    if ctx.version == 1 { 4 } else { 2 }
}

fn subs_entry_size(ctx: &EntryCtx, w: &ByteWindow) -> Result<u64> {
    let subsamples = w.u16_at(4)? as u64;
    Ok(6 + subsamples * (subsample_width(ctx) + 6))
}

fn subs_entry(ctx: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    let mut r = Cursor::new(data);
    let sample_delta = r.read_u32::<BigEndian>()?;
    let count = r.read_u16::<BigEndian>()?;
    let mut subsamples = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let size = if subsample_width(ctx) == 4 {
            r.read_u32::<BigEndian>()?
        } else {
            r.read_u16::<BigEndian>()? as u32
        };
        subsamples.push(BoxValue::Record(vec![
            ("subsample_size", BoxValue::UInt(size as u64)),
            ("subsample_priority", BoxValue::UInt(r.read_u8()? as u64)),
            ("discardable", BoxValue::UInt(r.read_u8()? as u64)),
            ("codec_specific_parameters", BoxValue::UInt(r.read_u32::<BigEndian>()? as u64)),
        ]));
    }
    Ok(BoxValue::Record(vec![
        ("sample_delta", BoxValue::UInt(sample_delta as u64)),
        ("subsample_count", BoxValue::UInt(count as u64)),
        ("subsamples", BoxValue::List(subsamples)),
    ]))
}

/// `subs`: entries vary in size with their subsample count.
pub(crate) fn sub_sample_information(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf()
        .next("entry_count", 4, "int")
        .table("entries", count, EntryDef::Variable(subs_entry_size, subs_entry)))
}

/// Optional `aux_info_type` pair shared by `saiz` and `saio`; returns the
/// layout and the payload offset after it.
fn aux_info(bx: &BoxRef) -> Result<(Layout, u64)> {
    if bx.flags_or_default()?.bit(0) {
        let layout = Layout::leaf()
            .next("aux_info_type", 4, "fourcc")
            .next("aux_info_type_parameter", 4, "int");
        Ok((layout, 8))
    } else {
        Ok((Layout::leaf().absent("aux_info_type").absent("aux_info_type_parameter"), 0))
    }
}

pub(crate) fn aux_info_sizes(bx: &BoxRef) -> Result<Layout> {
    let (layout, at) = aux_info(bx)?;
    let default_size = bx.payload_u8(at)?;
    let count = bx.payload_u32(at + 1)? as u64;
    let layout = layout
        .next("default_sample_info_size", 1, "int")
        .next("sample_count", 4, "int");
    Ok(if default_size == 0 {
        layout.table("sample_info_sizes", count, EntryDef::Scalar(">B"))
    } else {
        layout.absent("sample_info_sizes")
    })
}

pub(crate) fn aux_info_offsets(bx: &BoxRef) -> Result<Layout> {
    let (layout, at) = aux_info(bx)?;
    let count = bx.payload_u32(at)? as u64;
    let entry = if bx.version_or_default()? == 0 { ">I" } else { ">Q" };
    Ok(layout.next("entry_count", 4, "int").table("offsets", count, EntryDef::Scalar(entry)))
}
