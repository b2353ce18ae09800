//! Movie fragments and fragment random access.

use super::{Layout, time_width};
use crate::error::Result;
use crate::node::BoxRef;

pub(crate) fn movie_extends_header(bx: &BoxRef) -> Result<Layout> {
    let w = time_width(bx.version_or_default()?);
    Ok(Layout::leaf().next("fragment_duration", w, "int"))
}

pub(crate) fn track_extends() -> Layout {
    Layout::leaf()
        .next("track_id", 4, "int")
        .next("default_sample_description_index", 4, "int")
        .next("default_sample_duration", 4, "int")
        .next("default_sample_size", 4, "int")
        .next("default_sample_flags", 4, "int")
}

pub(crate) fn movie_fragment_header() -> Layout {
    Layout::leaf().next("sequence_number", 4, "int")
}

pub(crate) fn decode_time(bx: &BoxRef) -> Result<Layout> {
    let w = time_width(bx.version_or_default()?);
    Ok(Layout::leaf().next("base_media_decode_time", w, "int"))
}

/// `mfro`. The field is the size of the enclosing `mfra`, not of this box.
pub(crate) fn random_access_offset() -> Layout {
    Layout::leaf().next("mfra_size", 4, "int")
}

/// `trep`: a track id, then optional boxes.
pub(crate) fn extension_properties() -> Layout {
    Layout::leaf().next("track_id", 4, "int").children()
}
