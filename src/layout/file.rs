//! File-level boxes: brands, media data, free space, progressive download.

use super::Layout;
use crate::error::Result;
use crate::table::{EntryCtx, EntryDef};
use crate::value::BoxValue;

fn brand(_: &EntryCtx, data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::Text(String::from_utf8_lossy(data).into_owned()))
}

/// `ftyp` and `styp`.
pub(crate) fn file_type() -> Layout {
    Layout::leaf()
        .next("major_brand", 4, "fourcc")
        .next("minor_version", 4, "int")
        .table_to_end("compatible_brands", EntryDef::Sized(4, brand))
}

/// `mdat`, `free` and `skip`: raw bytes only.
pub(crate) fn opaque_data() -> Layout {
    Layout::leaf().rest("data", "default")
}

pub(crate) fn progressive_download() -> Layout {
    Layout::leaf().table_to_end(
        "entries",
        EntryDef::Record { format: ">II", names: &["rate", "initial_delay"] },
    )
}
