//! Bounded views over a shared byte source.

use crate::error::{ParseError, Result};
use crate::format::Format;
use crate::source::SharedSource;
use crate::value::BoxValue;
use byteorder::{BigEndian, ByteOrder};
use encoding_rs::Encoding;
use std::fmt;

const READ_CHUNK: u64 = 1 << 20;
const SCAN_CHUNK: u64 = 256;

/// `[start, stop)` of the shared source, in absolute offsets. `stop` is `None`
/// when the window runs to the end of the stream.
///
/// Creating sub-windows never touches the source; only reads do. Every read is
/// checked against `stop` and fails with [`ParseError::RangeExceeded`] instead
/// of being clamped.
#[derive(Clone)]
pub struct ByteWindow {
    source: SharedSource,
    start: u64,
    stop: Option<u64>,
}

impl ByteWindow {
    pub fn new(source: SharedSource, start: u64, stop: Option<u64>) -> Result<Self> {
        if let Some(stop) = stop
            && stop < start
        {
            return Err(ParseError::RangeExceeded { start, stop, limit: stop });
        }
        Ok(Self { source, start, stop })
    }

    /// Window over the whole stream.
    pub fn whole(source: SharedSource) -> Self {
        Self { source, start: 0, stop: None }
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> Option<u64> {
        self.stop
    }

    /// Length if the window is bounded.
    pub fn len(&self) -> Option<u64> {
        self.stop.map(|stop| stop - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Absolute end, asking the source for its length when unbounded.
    pub fn end(&self) -> Result<u64> {
        match self.stop {
            Some(stop) => Ok(stop),
            None => Ok(self.source.borrow_mut().len()?.max(self.start)),
        }
    }

    fn absolute(&self, rel_start: u64, rel_stop: Option<u64>) -> Result<(u64, Option<u64>)> {
        let limit = self.stop.unwrap_or(u64::MAX);
        let overflow = || ParseError::RangeExceeded { start: self.start, stop: u64::MAX, limit };
        let start = self.start.checked_add(rel_start).ok_or_else(overflow)?;
        let stop = match rel_stop {
            Some(rel) => Some(self.start.checked_add(rel).ok_or_else(overflow)?),
            None => self.stop,
        };
        let reach = stop.unwrap_or(start);
        if reach < start {
            return Err(ParseError::RangeExceeded { start, stop: reach, limit });
        }
        if self.stop.is_some() && (start > limit || reach > limit) {
            return Err(ParseError::RangeExceeded { start, stop: reach, limit });
        }
        Ok((start, stop))
    }

    /// Pure offset arithmetic: `rel_stop` of `None` inherits this window's stop.
    pub fn sub_window(&self, rel_start: u64, rel_stop: Option<u64>) -> Result<ByteWindow> {
        let (start, stop) = self.absolute(rel_start, rel_stop)?;
        Ok(ByteWindow { source: self.source.clone(), start, stop })
    }

    /// Reads `[rel_start, rel_stop)`; an open `rel_stop` reads to this window's
    /// stop, or to the end of the stream when the window is unbounded.
    pub fn read(&self, rel_start: u64, rel_stop: Option<u64>) -> Result<Vec<u8>> {
        let (start, stop) = self.absolute(rel_start, rel_stop)?;
        let stop = match stop {
            Some(stop) => stop,
            None => self.source.borrow_mut().len()?.max(start),
        };
        self.read_abs(start, stop - start)
    }

    pub fn read_all(&self) -> Result<Vec<u8>> {
        self.read(0, None)
    }

    /// Reads exactly `len` bytes at `rel`.
    pub fn read_at(&self, rel: u64, len: u64) -> Result<Vec<u8>> {
        let stop = rel.checked_add(len).ok_or(ParseError::RangeExceeded {
            start: rel,
            stop: u64::MAX,
            limit: self.stop.unwrap_or(u64::MAX),
        })?;
        self.read(rel, Some(stop))
    }

    /// Like [`read_at`](Self::read_at) but a stream that ends early yields a
    /// short buffer rather than an error. The range is still checked against
    /// the window.
    pub fn peek(&self, rel: u64, len: u64) -> Result<Vec<u8>> {
        let (start, _) = self.absolute(rel, Some(rel.saturating_add(len)))?;
        let mut buf = vec![0u8; len as usize];
        let n = self.source.borrow_mut().read_at(start, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    fn read_abs(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(len.min(READ_CHUNK) as usize);
        let mut src = self.source.borrow_mut();
        while (out.len() as u64) < len {
            let want = (len - out.len() as u64).min(READ_CHUNK) as usize;
            let filled = out.len();
            out.resize(filled + want, 0);
            let n = src.read_at(offset + filled as u64, &mut out[filled..])?;
            out.truncate(filled + n);
            if n < want {
                return Err(ParseError::Truncated { offset, wanted: len, got: out.len() as u64 });
            }
        }
        Ok(out)
    }

    /// Bytes from `rel_start` up to, not including, `terminator`.
    pub fn read_until(&self, rel_start: u64, terminator: u8) -> Result<Vec<u8>> {
        let (origin, _) = self.absolute(rel_start, None)?;
        let mut out = Vec::new();
        let mut rel = rel_start;
        loop {
            let mut want = SCAN_CHUNK;
            if let Some(len) = self.len() {
                want = want.min(len.saturating_sub(rel));
            }
            let chunk = if want == 0 { Vec::new() } else { self.peek(rel, want)? };
            if chunk.is_empty() {
                return Err(ParseError::UnterminatedString { offset: origin });
            }
            if let Some(i) = chunk.iter().position(|&b| b == terminator) {
                out.extend_from_slice(&chunk[..i]);
                return Ok(out);
            }
            rel += chunk.len() as u64;
            out.extend_from_slice(&chunk);
        }
    }

    /// Decodes the window (or the bytes before `terminator`) as text.
    /// `None` means UTF-8; a byte-order mark overrides the encoding.
    pub fn decode(&self, encoding: Option<&'static Encoding>, terminator: Option<u8>) -> Result<String> {
        let bytes = match terminator {
            Some(t) => self.read_until(0, t)?,
            None => self.read_all()?,
        };
        Ok(decode_text(&bytes, encoding.unwrap_or(encoding_rs::UTF_8)))
    }

    pub fn unpack(&self, format: &Format) -> Result<Vec<BoxValue>> {
        self.unpack_at(0, format)
    }

    pub fn unpack_at(&self, rel: u64, format: &Format) -> Result<Vec<BoxValue>> {
        let bytes = self.read_at(rel, format.size() as u64)?;
        format.unpack(&bytes)
    }

    /// Consecutive records from the start of the window, read one at a time.
    pub fn iter_unpack(&self, format: &Format) -> UnpackIter {
        UnpackIter { window: self.clone(), format: format.clone(), pos: 0, done: false }
    }

    pub fn u8_at(&self, rel: u64) -> Result<u8> {
        Ok(self.read_at(rel, 1)?[0])
    }

    pub fn u16_at(&self, rel: u64) -> Result<u16> {
        Ok(BigEndian::read_u16(&self.read_at(rel, 2)?))
    }

    pub fn u32_at(&self, rel: u64) -> Result<u32> {
        Ok(BigEndian::read_u32(&self.read_at(rel, 4)?))
    }

    pub fn u64_at(&self, rel: u64) -> Result<u64> {
        Ok(BigEndian::read_u64(&self.read_at(rel, 8)?))
    }

    /// Unsigned big-endian integer of `width` bytes (0 to 8). Width 0 reads nothing.
    pub fn uint_at(&self, rel: u64, width: u8) -> Result<u64> {
        match width {
            0 => Ok(0),
            1..=8 => Ok(BigEndian::read_uint(&self.read_at(rel, width as u64)?, width as usize)),
            _ => Err(ParseError::InvalidFormat { format: format!("uint{}", width as u32 * 8), reason: "wider than 8 bytes" }),
        }
    }
}

impl fmt::Debug for ByteWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stop {
            Some(stop) => write!(f, "ByteWindow({}..{})", self.start, stop),
            None => write!(f, "ByteWindow({}..)", self.start),
        }
    }
}

pub(crate) fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Lazy record iterator returned by [`ByteWindow::iter_unpack`]. Ending
/// exactly on a record boundary stops cleanly; a partial trailing record is an
/// error.
pub struct UnpackIter {
    window: ByteWindow,
    format: Format,
    pos: u64,
    done: bool,
}

impl Iterator for UnpackIter {
    type Item = Result<Vec<BoxValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let size = self.format.size() as u64;
        if let Some(len) = self.window.len()
            && self.pos >= len
        {
            self.done = true;
            return None;
        }
        let step = match self.window.len() {
            Some(len) => size.min(len - self.pos),
            None => size,
        };
        let bytes = match self.window.peek(self.pos, step) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if bytes.is_empty() {
            self.done = true;
            return None;
        }
        if (bytes.len() as u64) < size || size == 0 {
            self.done = true;
            return Some(Err(ParseError::Truncated {
                offset: self.window.start() + self.pos,
                wanted: size,
                got: bytes.len() as u64,
            }));
        }
        self.pos += size;
        Some(self.format.unpack(&bytes))
    }
}
