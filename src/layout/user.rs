//! User data: copyright, track selection, kind.

use super::Layout;
use crate::table::{EntryCtx, EntryDef};
use crate::value::BoxValue;
use crate::error::Result;

fn attribute(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::Text(String::from_utf8_lossy(data).into_owned()))
}

pub(crate) fn copyright() -> Layout {
    Layout::leaf().next("language", 2, "lang").rest("notice", "string")
}

pub(crate) fn track_selection() -> Layout {
    Layout::leaf()
        .next("switch_group", 4, "sint")
        .table_to_end("attribute_list", EntryDef::Sized(4, attribute))
}

pub(crate) fn kind() -> Layout {
    Layout::leaf().cstr("scheme_uri").cstr_opt("value")
}
