//! Data references.

use super::Layout;
use crate::error::Result;
use crate::node::BoxRef;

pub(crate) fn data_reference(bx: &BoxRef) -> Result<Layout> {
    let count = bx.payload_u32(0)? as u64;
    Ok(Layout::leaf().next("entry_count", 4, "int").children().limit(count))
}

/// `url `: flag bit 0 means the media is in the same file and no location follows.
pub(crate) fn data_entry_url(bx: &BoxRef) -> Result<Layout> {
    Ok(if bx.flags_or_default()?.bit(0) {
        Layout::leaf().absent("location")
    } else {
        Layout::leaf().cstr("location")
    })
}

pub(crate) fn data_entry_urn(bx: &BoxRef) -> Result<Layout> {
    Ok(if bx.flags_or_default()?.bit(0) {
        Layout::leaf().absent("name").absent("location")
    } else {
        Layout::leaf().cstr("name").cstr_opt("location")
    })
}
