use crate::decoders::DecoderRegistry;
use crate::error::{ParseError, Result};
use crate::iter::{Selection, SiblingIter, Siblings};
use crate::layout::ChildResolve;
use crate::node::{BoxRef, ScanContext};
use crate::registry::BoxRegistry;
use crate::source::{SeekableSource, SequentialSource, SharedSource, shared};
use crate::window::ByteWindow;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::ops::RangeBounds;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Entry point: binds a byte source to the registries and exposes the
/// top-level boxes as a lazily scanned [`Siblings`] sequence.
///
/// ```no_run
/// let scan = isobmff::Scanner::open("movie.mp4")?;
/// if let Some(moov) = scan.find("moov")? {
///     let mvhd = moov.child("mvhd")?.expect("mvhd");
///     println!("timescale {}", mvhd.field("timescale")?);
/// }
/// # Ok::<(), isobmff::ParseError>(())
/// ```
pub struct Scanner {
    source: SharedSource,
    root: Siblings,
}

impl Scanner {
    /// Scan a seekable reader with the standard registries.
    pub fn new<R: Read + Seek + 'static>(reader: R) -> Self {
        Self::builder().build(reader)
    }

    /// Scan a forward-only reader. Works, but buffers what it reads.
    pub fn sequential<R: Read + 'static>(reader: R) -> Self {
        Self::builder().build_sequential(reader)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }

    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::default()
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    /// The top-level sibling sequence.
    pub fn root(&self) -> &Siblings {
        &self.root
    }

    pub fn next_box(&self) -> Result<Option<BoxRef>> {
        self.root.next_box()
    }

    pub fn get(&self, index: i64) -> Result<BoxRef> {
        self.root.get(index)
    }

    pub fn iter(&self) -> SiblingIter {
        self.root.iter()
    }

    pub fn len(&self) -> Result<usize> {
        self.root.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.root.is_empty()
    }

    pub fn find(&self, code: &str) -> Result<Option<BoxRef>> {
        self.root.find(code)
    }

    pub fn filter(&self, code: &str) -> Result<Vec<BoxRef>> {
        self.root.filter(code)
    }

    pub fn select(&self, code: &str) -> Result<Selection> {
        self.root.select(code)
    }

    pub fn range(&self, range: impl RangeBounds<usize>) -> Result<Vec<BoxRef>> {
        self.root.range(range)
    }

    /// Follows a `/`-separated path from the top level, e.g. `"moov/trak/tkhd"`.
    pub fn descendant(&self, path: &str) -> Result<Option<BoxRef>> {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        let Some(first) = parts.next() else { return Ok(None) };
        let Some(top) = self.find(first)? else { return Ok(None) };
        let rest: Vec<&str> = parts.collect();
        top.descendant(&rest.join("/"))
    }
}

impl IntoIterator for &Scanner {
    type Item = Result<BoxRef>;
    type IntoIter = SiblingIter;

    fn into_iter(self) -> SiblingIter {
        self.iter()
    }
}

/// Scan options. Registries default to the standard ones and strings to UTF-8.
pub struct ScannerBuilder {
    boxes: Option<Arc<BoxRegistry>>,
    decoders: Option<Arc<DecoderRegistry>>,
    encoding: &'static Encoding,
    limit: Option<u64>,
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        Self { boxes: None, decoders: None, encoding: encoding_rs::UTF_8, limit: None }
    }
}

impl ScannerBuilder {
    pub fn box_registry(mut self, registry: impl Into<Arc<BoxRegistry>>) -> Self {
        self.boxes = Some(registry.into());
        self
    }

    pub fn decoder_registry(mut self, registry: impl Into<Arc<DecoderRegistry>>) -> Self {
        self.decoders = Some(registry.into());
        self
    }

    /// Encoding for `string` and `cstring` fields.
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Encoding by WHATWG label, e.g. `"utf-16le"` or `"latin1"`.
    pub fn encoding_label(self, label: &str) -> Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => Ok(self.encoding(encoding)),
            None => Err(ParseError::InvalidFormat {
                format: label.to_string(),
                reason: "unknown text encoding label",
            }),
        }
    }

    /// Stop the top level after this many boxes.
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn build<R: Read + Seek + 'static>(self, reader: R) -> Scanner {
        self.build_source(shared(SeekableSource::new(reader)))
    }

    pub fn build_sequential<R: Read + 'static>(self, reader: R) -> Scanner {
        self.build_source(shared(SequentialSource::new(reader)))
    }

    pub fn build_source(self, source: SharedSource) -> Scanner {
        let ctx = Rc::new(ScanContext {
            source: source.clone(),
            boxes: self.boxes.unwrap_or_else(|| Arc::new(BoxRegistry::iso())),
            decoders: self.decoders.unwrap_or_else(|| Arc::new(DecoderRegistry::standard())),
            encoding: self.encoding,
        });
        let window = ByteWindow::whole(source.clone());
        let root = Siblings::new(ctx, window, Weak::new(), self.limit, ChildResolve::Registry);
        Scanner { source, root }
    }
}
