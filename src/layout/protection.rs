//! Protected and restricted scheme information.

use super::Layout;
use crate::error::Result;
use crate::node::BoxRef;

pub(crate) fn original_format() -> Layout {
    Layout::leaf().next("data_format", 4, "fourcc")
}

pub(crate) fn scheme_type(bx: &BoxRef) -> Result<Layout> {
    let layout = Layout::leaf().next("scheme_type", 4, "fourcc").next("scheme_version", 4, "int");
    Ok(if bx.flags_or_default()?.bit(0) {
        layout.rest("scheme_uri", "cstring")
    } else {
        layout.absent("scheme_uri")
    })
}
