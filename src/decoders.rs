//! Keyed byte-to-value decoders referenced by box field layouts.

use crate::boxes::FourCC;
use crate::error::{ParseError, Result};
use crate::value::BoxValue;
use crate::window::decode_text;
use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use std::collections::HashMap;

/// Seconds between 1904-01-01T00:00:00Z and the Unix epoch.
pub const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// What a decoder knows about the field it is decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    pub box_type: FourCC,
    pub encoding: &'static Encoding,
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self { box_type: FourCC(*b"    "), encoding: encoding_rs::UTF_8 }
    }
}

/// A pure function from raw field bytes to a value.
pub trait TypeDecoder: Send + Sync {
    fn decode(&self, ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue>;
}

impl<F> TypeDecoder for F
where
    F: Fn(&DecodeContext, &[u8]) -> Result<BoxValue> + Send + Sync,
{
    fn decode(&self, ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
        self(ctx, data)
    }
}

/// Decoder lookup by key. Unknown keys fall back to `default`, and to the
/// identity decoder when even that is missing.
pub struct DecoderRegistry {
    map: HashMap<String, Box<dyn TypeDecoder>>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// The decoders every box layout in this crate refers to.
    pub fn standard() -> Self {
        let entries: [(&str, fn(&DecodeContext, &[u8]) -> Result<BoxValue>); 14] = [
            ("default", decode_bytes),
            ("int", decode_int),
            ("sint", decode_sint),
            ("datetime", decode_datetime),
            ("string", decode_string),
            ("cstring", decode_cstring),
            ("pstring", decode_pstring),
            ("lang", decode_lang),
            ("fourcc", decode_fourcc),
            ("fixed32", decode_fixed32),
            ("ufixed32", decode_ufixed32),
            ("fixed16", decode_fixed16),
            ("matrix", decode_matrix),
            ("uuid", decode_uuid),
        ];
        let map = entries
            .into_iter()
            .map(|(key, f)| (key.to_string(), Box::new(f) as Box<dyn TypeDecoder>))
            .collect();
        Self { map }
    }

    /// Adds a decoder. A key may only be registered once.
    pub fn register(&mut self, key: &str, dec: impl TypeDecoder + 'static) -> Result<()> {
        if self.map.contains_key(key) {
            return Err(ParseError::RegistrationConflict { key: key.to_string() });
        }
        self.map.insert(key.to_string(), Box::new(dec));
        Ok(())
    }

    /// Return a new registry with the given decoder added.
    pub fn with_decoder(mut self, key: &str, dec: impl TypeDecoder + 'static) -> Result<Self> {
        self.register(key, dec)?;
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn decode(&self, key: &str, ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
        match self.map.get(key).or_else(|| self.map.get("default")) {
            Some(dec) => dec.decode(ctx, data),
            None => decode_bytes(ctx, data),
        }
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn decode_bytes(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    Ok(BoxValue::Bytes(data.to_vec()))
}

fn decode_int(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    match data.len() {
        0 => Ok(BoxValue::UInt(0)),
        1..=8 => Ok(BoxValue::UInt(BigEndian::read_uint(data, data.len()))),
        _ => Ok(BoxValue::Bytes(data.to_vec())),
    }
}

fn decode_sint(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    match data.len() {
        0 => Ok(BoxValue::Int(0)),
        1..=8 => Ok(BoxValue::Int(BigEndian::read_int(data, data.len()))),
        _ => Ok(BoxValue::Bytes(data.to_vec())),
    }
}

/// Seconds since 1904-01-01 UTC. Values chrono cannot represent stay integers.
fn decode_datetime(ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    let secs = match decode_int(ctx, data)? {
        BoxValue::UInt(v) => v,
        other => return Ok(other),
    };
    let unix = i64::try_from(secs).ok().map(|s| s - MAC_EPOCH_OFFSET);
    match unix.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)) {
        Some(t) => Ok(BoxValue::DateTime(t)),
        None => Ok(BoxValue::UInt(secs)),
    }
}

fn decode_string(ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    let text = decode_text(data, ctx.encoding);
    Ok(BoxValue::Text(text.trim_end_matches('\0').to_string()))
}

fn decode_cstring(ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    Ok(BoxValue::Text(decode_text(&data[..end], ctx.encoding)))
}

/// Length byte followed by text, padded to the field width.
fn decode_pstring(ctx: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    let Some((&len, rest)) = data.split_first() else {
        return Ok(BoxValue::Text(String::new()));
    };
    let len = (len as usize).min(rest.len());
    Ok(BoxValue::Text(decode_text(&rest[..len], ctx.encoding)))
}

/// Three 5-bit letters, each offset by 0x60. An all-zero code comes out as
/// three backticks; `"und"` is 0x55C4.
pub fn lang_from_u16(code: u16) -> String {
    let c1 = ((code >> 10) & 0x1F) as u8 + 0x60;
    let c2 = ((code >> 5) & 0x1F) as u8 + 0x60;
    let c3 = (code & 0x1F) as u8 + 0x60;
    format!("{}{}{}", c1 as char, c2 as char, c3 as char)
}

fn decode_lang(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    if data.len() != 2 {
        return Ok(BoxValue::Bytes(data.to_vec()));
    }
    Ok(BoxValue::Text(lang_from_u16(BigEndian::read_u16(data))))
}

fn decode_fourcc(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    match <[u8; 4]>::try_from(data) {
        Ok(code) => Ok(BoxValue::Text(FourCC(code).as_str_lossy())),
        Err(_) => Ok(BoxValue::Bytes(data.to_vec())),
    }
}

fn decode_fixed32(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    if data.len() != 4 {
        return Ok(BoxValue::Bytes(data.to_vec()));
    }
    Ok(BoxValue::Fixed(BigEndian::read_i32(data) as f64 / 65536.0))
}

fn decode_ufixed32(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    if data.len() != 4 {
        return Ok(BoxValue::Bytes(data.to_vec()));
    }
    Ok(BoxValue::Fixed(BigEndian::read_u32(data) as f64 / 65536.0))
}

fn decode_fixed16(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    if data.len() != 2 {
        return Ok(BoxValue::Bytes(data.to_vec()));
    }
    Ok(BoxValue::Fixed(BigEndian::read_i16(data) as f64 / 256.0))
}

/// Nine raw 32-bit values, row-major.
fn decode_matrix(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    if data.len() != 36 {
        return Ok(BoxValue::Bytes(data.to_vec()));
    }
    let values = data.chunks_exact(4).map(|c| BoxValue::Int(BigEndian::read_i32(c) as i64));
    Ok(BoxValue::List(values.collect()))
}

fn decode_uuid(_: &DecodeContext, data: &[u8]) -> Result<BoxValue> {
    match <[u8; 16]>::try_from(data) {
        Ok(u) => Ok(BoxValue::Uuid(u)),
        Err(_) => Ok(BoxValue::Bytes(data.to_vec())),
    }
}
