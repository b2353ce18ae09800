//! Byte providers shared by every window of a scan.

use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom};
use std::rc::Rc;

/// Random-access view of the underlying stream.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes at absolute `offset`. A short count means
    /// the stream ended.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total stream length. Sequential sources drain the stream to answer.
    fn len(&mut self) -> io::Result<u64>;

    fn is_seekable(&self) -> bool;
}

pub type SharedSource = Rc<RefCell<dyn ByteSource>>;

pub fn shared<S: ByteSource + 'static>(source: S) -> SharedSource {
    Rc::new(RefCell::new(source))
}

fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Source over anything that can seek. The cursor is only moved when it is not
/// already at the requested offset.
pub struct SeekableSource<R> {
    inner: R,
    pos: Option<u64>,
    len: Option<u64>,
}

impl<R: Read + Seek> SeekableSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: None, len: None }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for SeekableSource<R> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        // unknown until the read below succeeds
        let pos = self.pos.take();
        if pos != Some(offset) {
            self.inner.seek(SeekFrom::Start(offset))?;
        }
        let n = read_full(&mut self.inner, buf)?;
        self.pos = Some(offset + n as u64);
        Ok(n)
    }

    fn len(&mut self) -> io::Result<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        self.pos = None;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.pos = Some(end);
        self.len = Some(end);
        Ok(end)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

const FILL_CHUNK: usize = 64 * 1024;

/// Source over a forward-only reader. Everything read is retained so earlier
/// offsets stay addressable; this trades memory for not needing `Seek`.
pub struct SequentialSource<R> {
    inner: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> SequentialSource<R> {
    pub fn new(inner: R) -> Self {
        log::warn!("byte source is not seekable; reads will buffer the stream sequentially");
        Self { inner, buffer: Vec::new(), eof: false }
    }

    fn fill_to(&mut self, wanted: u64) -> io::Result<()> {
        let mut chunk = vec![0u8; FILL_CHUNK];
        while !self.eof && (self.buffer.len() as u64) < wanted {
            let n = read_full(&mut self.inner, &mut chunk)?;
            if n < chunk.len() {
                self.eof = true;
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

impl<R: Read> ByteSource for SequentialSource<R> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.fill_to(offset.saturating_add(buf.len() as u64))?;
        let have = self.buffer.len() as u64;
        if offset >= have {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.buffer.len() - start);
        buf[..n].copy_from_slice(&self.buffer[start..start + n]);
        Ok(n)
    }

    fn len(&mut self) -> io::Result<u64> {
        self.fill_to(u64::MAX)?;
        Ok(self.buffer.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
