use super::{Layout, time_width};
use crate::error::Result;
use crate::node::BoxRef;

/// `mvhd`. Version 1 widens both times and the duration to 64 bits, which
/// shifts every later field by 12 bytes.
pub(crate) fn movie_header(bx: &BoxRef) -> Result<Layout> {
    let w = time_width(bx.version_or_default()?);
    Ok(Layout::leaf()
        .next("creation_time", w, "datetime")
        .next("modification_time", w, "datetime")
        .next("timescale", 4, "int")
        .next("duration", w, "int")
        .next("rate", 4, "fixed32")
        .next("volume", 2, "fixed16")
        .next("reserved", 10, "default")
        .next("matrix", 36, "matrix")
        .next("pre_defined", 24, "default")
        .next("next_track_id", 4, "int"))
}
