//! Track header, track references and track groups.

use super::{ChildResolve, Layout, time_width};
use crate::error::Result;
use crate::known_boxes::KnownBox;
use crate::node::BoxRef;
use crate::table::EntryDef;

pub(crate) fn track_header(bx: &BoxRef) -> Result<Layout> {
    let w = time_width(bx.version_or_default()?);
    Ok(Layout::leaf()
        .next("creation_time", w, "datetime")
        .next("modification_time", w, "datetime")
        .next("track_id", 4, "int")
        .skip(4)
        .next("duration", w, "int")
        .skip(8)
        .next("layer", 2, "sint")
        .next("alternate_group", 2, "sint")
        .next("volume", 2, "fixed16")
        .skip(2)
        .next("matrix", 36, "matrix")
        .next("width", 4, "ufixed32")
        .next("height", 4, "ufixed32"))
}

/// `tref`: every child is a reference list, whatever its code.
pub(crate) fn track_reference() -> Layout {
    Layout::container().resolve(ChildResolve::Force(KnownBox::TrackReferenceType))
}

/// `hint`, `cdsc`, `vdep` and the other reference codes.
pub(crate) fn track_reference_type() -> Layout {
    Layout::leaf().table_to_end("track_ids", EntryDef::Scalar(">I"))
}

pub(crate) fn track_group() -> Layout {
    Layout::container().resolve(ChildResolve::Force(KnownBox::TrackGroupType))
}

pub(crate) fn track_group_type() -> Layout {
    Layout::leaf().next("track_group_id", 4, "int")
}
