//! Decoding/composition timing, sync samples and edit lists.

use super::Layout;
use crate::error::Result;
use crate::node::BoxRef;
use crate::table::EntryDef;

fn counted(bx: &BoxRef, name: &'static str, entry: EntryDef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf().next("entry_count", 4, "int").table(name, count, entry))
}

pub(crate) fn time_to_sample(bx: &BoxRef) -> Result<Layout> {
    counted(bx, "entries", EntryDef::Record { format: ">II", names: &["sample_count", "sample_delta"] })
}

/// `ctts`: offsets are unsigned in version 0 and signed from version 1.
pub(crate) fn composition_offset(bx: &BoxRef) -> Result<Layout> {
    let format = if bx.version_or_default()? == 0 { ">II" } else { ">Ii" };
    counted(bx, "entries", EntryDef::Record { format, names: &["sample_count", "sample_offset"] })
}

pub(crate) fn composition_to_decode(bx: &BoxRef) -> Result<Layout> {
    let w = if bx.version_or_default()? == 0 { 4 } else { 8 };
    Ok(Layout::leaf()
        .next("composition_to_dts_shift", w, "sint")
        .next("least_decode_to_display_delta", w, "sint")
        .next("greatest_decode_to_display_delta", w, "sint")
        .next("composition_start_time", w, "sint")
        .next("composition_end_time", w, "sint"))
}

pub(crate) fn sync_sample(bx: &BoxRef) -> Result<Layout> {
    counted(bx, "entries", EntryDef::Scalar(">I"))
}

pub(crate) fn shadow_sync_sample(bx: &BoxRef) -> Result<Layout> {
    counted(
        bx,
        "entries",
        EntryDef::Record { format: ">II", names: &["shadowed_sample_number", "sync_sample_number"] },
    )
}

pub(crate) fn edit_list(bx: &BoxRef) -> Result<Layout> {
    let format = if bx.version_or_default()? == 1 { ">Qqhh" } else { ">Iihh" };
    counted(
        bx,
        "entries",
        EntryDef::Record {
            format,
            names: &["segment_duration", "media_time", "media_rate_integer", "media_rate_fraction"],
        },
    )
}
