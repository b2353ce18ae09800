use crate::{
    error::Result,
    iter::Siblings,
    node::BoxRef,
    scanner::Scanner,
    source::{SeekableSource, shared},
    util::hex_dump,
    window::ByteWindow,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fs::File, io::BufReader, path::Path};

/// A JSON-serializable representation of a single box.
///
/// Used for JSON output in `isodump` and by anything that wants the
/// whole tree as data.
#[derive(Serialize)]
pub struct JsonBox {
    #[serde(rename = "type")]
    pub typ: String,
    pub offset: u64,
    pub size: u64,
    pub header_size: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    pub name: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<JsonBox>>,
}

/// Limits applied while rendering a tree.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Decode fields at all; off gives geometry only.
    pub fields: bool,
    /// Fields spanning more bytes than this are shown as `"<N bytes>"`.
    pub max_field_bytes: u64,
    /// Tables are cut after this many entries.
    pub max_table_entries: usize,
    /// Levels of children to descend into; 0 renders only the given boxes.
    pub max_depth: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            fields: true,
            max_field_bytes: 4096,
            max_table_entries: 64,
            max_depth: usize::MAX,
        }
    }
}

/// Render every box of `siblings` (and, depth permitting, their children).
pub fn box_tree(siblings: &Siblings, opts: &JsonOptions) -> Result<Vec<JsonBox>> {
    build_level(siblings, opts, 0)
}

fn build_level(siblings: &Siblings, opts: &JsonOptions, depth: usize) -> Result<Vec<JsonBox>> {
    siblings
        .iter()
        .map(|bx| bx.and_then(|bx| json_box(&bx, opts, depth)))
        .collect()
}

/// Render one box and its subtree.
pub fn json_box(bx: &BoxRef, opts: &JsonOptions, depth: usize) -> Result<JsonBox> {
    let mut fields = Map::new();
    if opts.fields {
        for name in bx.field_names()? {
            fields.insert(name.to_string(), field_value(bx, name, opts));
        }
    }

    let children = match bx.children()? {
        Some(kids) if depth < opts.max_depth => Some(build_level(&kids, opts, depth + 1)?),
        _ => None,
    };

    Ok(JsonBox {
        typ: bx.box_type().to_string(),
        offset: bx.start(),
        size: bx.size()?,
        header_size: bx.header_size()?,
        uuid: bx.usertype().map(hex::encode),
        version: bx.version()?,
        flags: bx.flags()?.map(|f| f.bits()),
        name: bx.kind().full_name().to_string(),
        fields,
        children,
    })
}

/// One field as JSON, with large blobs and long tables cut down.
///
/// A field that fails to decode is rendered as its error message so one
/// damaged box does not hide the rest of the tree.
pub fn field_value(bx: &BoxRef, name: &str, opts: &JsonOptions) -> Value {
    match try_field_value(bx, name, opts) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{} @ {}: field {name}: {e}", bx.box_type(), bx.start());
            Value::String(format!("[error: {e}]"))
        }
    }
}

fn try_field_value(bx: &BoxRef, name: &str, opts: &JsonOptions) -> Result<Value> {
    if bx.has_table(name)? {
        let table = bx.table(name)?;
        let mut entries = Vec::new();
        for entry in table.iter().take(opts.max_table_entries) {
            entries.push(serde_json::to_value(entry?).unwrap_or(Value::Null));
        }
        if table.len() > entries.len() as u64 {
            entries.push(Value::String(format!("... {} more", table.len() - entries.len() as u64)));
        }
        return Ok(Value::Array(entries));
    }

    if let Some(extent) = bx.field_extent(name)? {
        let len = extent.end - extent.start;
        if len > opts.max_field_bytes {
            return Ok(Value::String(format!("<{len} bytes>")));
        }
    }
    Ok(serde_json::to_value(bx.field(name)?).unwrap_or(Value::Null))
}

/// Parse a file and return its box tree.
pub fn analyze_file(path: impl AsRef<Path>, opts: &JsonOptions) -> anyhow::Result<Vec<JsonBox>> {
    let scan = Scanner::open(path)?;
    Ok(box_tree(scan.root(), opts)?)
}

#[derive(Serialize)]
pub struct HexDump {
    pub offset: u64,
    pub length: u64,
    pub hex: String,
}

/// Hex-dump a range of bytes from a file.
///
/// `max_len` controls the maximum number of bytes to read. This function
/// never reads past EOF; if `offset + max_len` goes beyond the file size,
/// the returned length will be smaller than `max_len`.
///
/// ```no_run
/// use isobmff::json_api::hex_range;
///
/// fn main() -> anyhow::Result<()> {
///     let dump = hex_range("video.mp4", 0, 256)?;
///     println!("{}", dump.hex);
///     Ok(())
/// }
/// ```
pub fn hex_range<P: AsRef<Path>>(path: P, offset: u64, max_len: u64) -> anyhow::Result<HexDump> {
    let file = File::open(path.as_ref())?;
    let window = ByteWindow::whole(shared(SeekableSource::new(BufReader::new(file))));
    let file_len = window.end()?;

    let data = if offset >= file_len {
        Vec::new()
    } else {
        window.peek(offset, max_len.min(file_len - offset))?
    };

    Ok(HexDump {
        offset,
        length: data.len() as u64, // actual bytes read, not max_len
        hex: hex_dump(&data, offset),
    })
}
