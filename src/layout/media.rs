//! Media header, handler and the media-specific headers under `minf`.

use super::{Layout, decode_u16_list, time_width};
use crate::error::Result;
use crate::node::BoxRef;

pub(crate) fn media_header(bx: &BoxRef) -> Result<Layout> {
    let w = time_width(bx.version_or_default()?);
    Ok(Layout::leaf()
        .next("creation_time", w, "datetime")
        .next("modification_time", w, "datetime")
        .next("timescale", 4, "int")
        .next("duration", w, "int")
        .next("language", 2, "lang")
        .next("pre_defined", 2, "int"))
}

pub(crate) fn handler() -> Layout {
    Layout::leaf()
        .next("pre_defined", 4, "int")
        .next("handler_type", 4, "fourcc")
        .next("reserved", 12, "default")
        .rest("name", "string")
}

pub(crate) fn video_media_header() -> Layout {
    Layout::leaf()
        .next("graphicsmode", 2, "int")
        .next_with("opcolor", 6, decode_u16_list)
}

pub(crate) fn sound_media_header() -> Layout {
    Layout::leaf().next("balance", 2, "fixed16").skip(2)
}

pub(crate) fn hint_media_header() -> Layout {
    Layout::leaf()
        .next("max_pdu_size", 2, "int")
        .next("avg_pdu_size", 2, "int")
        .next("max_bitrate", 4, "int")
        .next("avg_bitrate", 4, "int")
}

/// `nmhd`, `sthd`: version and flags only.
pub(crate) fn empty_full() -> Layout {
    Layout::leaf()
}

pub(crate) fn extended_language() -> Layout {
    Layout::leaf().rest("extended_language", "string")
}
