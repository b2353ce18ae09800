//! Sample grouping.

use super::Layout;
use crate::error::Result;
use crate::node::BoxRef;
use crate::table::{EntryCtx, EntryDef};
use crate::value::BoxValue;
use crate::window::ByteWindow;

pub(crate) fn sample_to_group(bx: &BoxRef) -> Result<Layout> {
    let layout = Layout::leaf().next("grouping_type", 4, "fourcc");
    let (layout, at) = if bx.version_or_default()? == 1 {
        (layout.next("grouping_type_parameter", 4, "int"), 8)
    } else {
        (layout.absent("grouping_type_parameter"), 4)
    };
    let count = bx.payload_u32(at)? as u64;
    Ok(layout.next("entry_count", 4, "int").table(
        "entries",
        count,
        EntryDef::Record { format: ">II", names: &["sample_count", "group_description_index"] },
    ))
}

fn description(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::Record(vec![("description", BoxValue::Bytes(data.to_vec()))]))
}

fn prefixed_size(_: &EntryCtx, w: &ByteWindow) -> Result<u64> {
    Ok(4 + w.u32_at(0)? as u64)
}

fn prefixed_description(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    let (len, rest) = data.split_at(4.min(data.len()));
    let len = len.iter().fold(0u64, |acc, &b| acc << 8 | b as u64);
    Ok(BoxValue::Record(vec![
        ("description_length", BoxValue::UInt(len)),
        ("description", BoxValue::Bytes(rest.to_vec())),
    ]))
}

/// `sgpd`. Only version 1 says how long each entry is; for versions 0 and 2
/// the payload after the count is exposed raw.
pub(crate) fn sample_group_description(bx: &BoxRef) -> Result<Layout> {
    let version = bx.version_or_default()?;
    let layout = Layout::leaf().next("grouping_type", 4, "fourcc");
    let (layout, at, default_length) = match version {
        1 => (
            layout.next("default_length", 4, "int").absent("default_sample_description_index"),
            8,
            Some(bx.payload_u32(4)? as u64),
        ),
        0 => (layout.absent("default_length").absent("default_sample_description_index"), 4, None),
        _ => (
            layout.absent("default_length").next("default_sample_description_index", 4, "int"),
            8,
            None,
        ),
    };
    let count = bx.payload_u32(at)? as u64;
    let layout = layout.next("entry_count", 4, "int");
    Ok(match default_length {
        None => layout.absent("entries").rest("data", "default"),
        Some(0) => layout.table("entries", count, EntryDef::Variable(prefixed_size, prefixed_description)),
        Some(n) => layout.table("entries", count, EntryDef::Sized(n, description)),
    })
}
