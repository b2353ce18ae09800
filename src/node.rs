//! The box handle handed out by sibling iteration.

use crate::boxes::{BoxFlags, BoxHeader, FourCC};
use crate::decoders::{DecodeContext, DecoderRegistry};
use crate::error::{ParseError, Result};
use crate::iter::Siblings;
use crate::known_boxes::KnownBox;
use crate::layout::{At, Body, Count, Decode, FieldDef, Layout, Len};
use crate::registry::BoxRegistry;
use crate::source::SharedSource;
use crate::table::{EntryCtx, Table};
use crate::value::BoxValue;
use crate::window::ByteWindow;
use encoding_rs::Encoding;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Shared by every box and sibling sequence of one scan.
pub(crate) struct ScanContext {
    pub source: SharedSource,
    pub boxes: Arc<BoxRegistry>,
    pub decoders: Arc<DecoderRegistry>,
    pub encoding: &'static Encoding,
}

pub(crate) struct Node {
    ctx: Rc<ScanContext>,
    header: BoxHeader,
    kind: KnownBox,
    window: ByteWindow,
    // the window this box and its siblings were found in
    enclosing: ByteWindow,
    parent: Weak<Node>,
    full: OnceCell<(u8, BoxFlags)>,
    layout: OnceCell<Rc<Layout>>,
    extents: RefCell<HashMap<&'static str, Extent>>,
    values: RefCell<HashMap<&'static str, BoxValue>>,
    tables: RefCell<HashMap<&'static str, Rc<Table>>>,
    children: OnceCell<Option<Siblings>>,
}

/// Box-relative placement of one field's value bytes.
#[derive(Debug, Clone, Copy)]
struct Extent {
    offset: u64,
    len: u64,
    // terminator bytes consumed after the value
    skip: u64,
    present: bool,
}

/// A box found in the stream. Clones share the same cached state.
///
/// Only the header is read when the box is discovered. Version, flags, the
/// layout, every field value and every table entry are read on first use and
/// then kept for as long as the box is alive.
#[derive(Clone)]
pub struct BoxRef(Rc<Node>);

impl BoxRef {
    pub(crate) fn new(
        ctx: Rc<ScanContext>,
        header: BoxHeader,
        kind: KnownBox,
        enclosing: &ByteWindow,
        parent: Weak<Node>,
    ) -> Result<Self> {
        let window = ByteWindow::new(ctx.source.clone(), header.start, header.end().or(enclosing.stop()))?;
        Ok(BoxRef(Rc::new(Node {
            ctx,
            header,
            kind,
            window,
            enclosing: enclosing.clone(),
            parent,
            full: OnceCell::new(),
            layout: OnceCell::new(),
            extents: RefCell::new(HashMap::new()),
            values: RefCell::new(HashMap::new()),
            tables: RefCell::new(HashMap::new()),
            children: OnceCell::new(),
        })))
    }

    pub fn box_type(&self) -> FourCC {
        self.0.header.typ
    }

    /// Extended type of a `uuid` box.
    pub fn usertype(&self) -> Option<[u8; 16]> {
        self.0.header.uuid
    }

    pub fn kind(&self) -> KnownBox {
        self.0.kind
    }

    pub fn header(&self) -> &BoxHeader {
        &self.0.header
    }

    /// Window over the whole box, header included.
    pub fn window(&self) -> &ByteWindow {
        &self.0.window
    }

    pub fn start(&self) -> u64 {
        self.0.header.start
    }

    /// Absolute end. A box declared with size 0 ends where its container
    /// does, or at the end of the stream at the top level.
    pub fn end(&self) -> Result<u64> {
        self.0.window.end()
    }

    pub fn size(&self) -> Result<u64> {
        Ok(self.end()? - self.start())
    }

    /// Size as written in the header; 0 means open-ended.
    pub fn declared_size(&self) -> u64 {
        self.0.header.size
    }

    pub fn byte_range(&self) -> Result<Range<u64>> {
        Ok(self.start()..self.end()?)
    }

    pub fn is_full(&self) -> bool {
        self.0.kind.is_full_box()
    }

    fn full_header(&self) -> Result<Option<(u8, BoxFlags)>> {
        if !self.is_full() {
            return Ok(None);
        }
        if let Some(v) = self.0.full.get() {
            return Ok(Some(*v));
        }
        let b = self.0.window.read_at(self.0.header.header_size, 4)?;
        let v = (b[0], BoxFlags(u32::from_be_bytes([0, b[1], b[2], b[3]])));
        Ok(Some(*self.0.full.get_or_init(|| v)))
    }

    pub fn version(&self) -> Result<Option<u8>> {
        Ok(self.full_header()?.map(|(v, _)| v))
    }

    pub fn flags(&self) -> Result<Option<BoxFlags>> {
        Ok(self.full_header()?.map(|(_, f)| f))
    }

    pub(crate) fn version_or_default(&self) -> Result<u8> {
        Ok(self.version()?.unwrap_or(0))
    }

    pub(crate) fn flags_or_default(&self) -> Result<BoxFlags> {
        Ok(self.flags()?.unwrap_or_default())
    }

    /// Box-relative offset where this kind's own fields begin.
    pub fn payload_offset(&self) -> u64 {
        self.0.header.header_size + if self.is_full() { 4 } else { 0 }
    }

    /// Bytes from the payload offset to the end of the box.
    pub fn payload(&self) -> Result<ByteWindow> {
        self.0.window.sub_window(self.payload_offset(), None)
    }

    pub(crate) fn payload_len(&self) -> Result<u64> {
        Ok(self.size()?.saturating_sub(self.payload_offset()))
    }

    pub(crate) fn payload_u8(&self, rel: u64) -> Result<u8> {
        self.0.window.u8_at(self.payload_offset() + rel)
    }

    pub(crate) fn payload_u16(&self, rel: u64) -> Result<u16> {
        self.0.window.u16_at(self.payload_offset() + rel)
    }

    pub(crate) fn payload_u32(&self, rel: u64) -> Result<u32> {
        self.0.window.u32_at(self.payload_offset() + rel)
    }

    pub(crate) fn payload_fourcc(&self, rel: u64) -> Result<FourCC> {
        Ok(FourCC(self.payload_u32(rel)?.to_be_bytes()))
    }

    /// The whole box, header included.
    pub fn raw(&self) -> Result<Vec<u8>> {
        self.0.window.read_all()
    }

    fn layout(&self) -> Result<Rc<Layout>> {
        if let Some(l) = self.0.layout.get() {
            return Ok(l.clone());
        }
        let l = Rc::new(self.0.kind.layout(self)?);
        Ok(self.0.layout.get_or_init(|| l).clone())
    }

    /// Where children begin for containers; the whole size for leaf kinds,
    /// whose bytes are all typed content.
    pub fn header_size(&self) -> Result<u64> {
        let layout = self.layout()?;
        match layout.body {
            Body::Leaf => self.size(),
            Body::Children { at, .. } => self.resolve_at(&layout, at),
        }
    }

    pub fn has_children(&self) -> Result<bool> {
        let layout = self.layout()?;
        match layout.body {
            Body::Leaf => Ok(false),
            Body::Children { at, .. } => Ok(self.size()? != self.resolve_at(&layout, at)?),
        }
    }

    /// Lazily scanned children, or `None` when there is nothing after the header.
    pub fn children(&self) -> Result<Option<Siblings>> {
        if let Some(c) = self.0.children.get() {
            return Ok(c.clone());
        }
        let layout = self.layout()?;
        let built = match layout.body {
            Body::Leaf => None,
            Body::Children { at, limit, resolve } => {
                let offset = self.resolve_at(&layout, at)?;
                if offset == self.size()? {
                    None
                } else {
                    let window = self.0.window.sub_window(offset, None)?;
                    Some(Siblings::new(self.0.ctx.clone(), window, Rc::downgrade(&self.0), limit, resolve))
                }
            }
        };
        Ok(self.0.children.get_or_init(|| built).clone())
    }

    /// First child of type `code`.
    pub fn child(&self, code: &str) -> Result<Option<BoxRef>> {
        match self.children()? {
            Some(c) => c.find(code),
            None => Ok(None),
        }
    }

    /// Follows a `/`-separated path of child types, e.g. `"mdia/minf/stbl"`.
    pub fn descendant(&self, path: &str) -> Result<Option<BoxRef>> {
        let mut at = self.clone();
        for code in path.split('/').filter(|s| !s.is_empty()) {
            match at.child(code)? {
                Some(next) => at = next,
                None => return Ok(None),
            }
        }
        Ok(Some(at))
    }

    /// Window holding this box and its siblings. Unlike [`parent`](Self::parent)
    /// it stays usable after the rest of the tree has been dropped.
    pub(crate) fn enclosing(&self) -> &ByteWindow {
        &self.0.enclosing
    }

    pub fn parent(&self) -> Option<BoxRef> {
        self.0.parent.upgrade().map(BoxRef)
    }

    /// Number of ancestors; top-level boxes have depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut at = self.parent();
        while let Some(p) = at {
            depth += 1;
            at = p.parent();
        }
        depth
    }

    fn unknown(&self, name: &str) -> ParseError {
        ParseError::UnknownField { box_type: self.box_type(), name: name.to_string() }
    }

    fn resolve_at(&self, layout: &Layout, at: At) -> Result<u64> {
        match at {
            At::Payload(n) => Ok(self.payload_offset() + n),
            At::After(name, n) => {
                let def = layout.field(name).ok_or_else(|| self.unknown(name))?;
                let e = self.extent(layout, def)?;
                Ok(e.offset + e.len + e.skip + n)
            }
        }
    }

    fn extent(&self, layout: &Layout, def: &FieldDef) -> Result<Extent> {
        if let Some(e) = self.0.extents.borrow().get(def.name) {
            return Ok(*e);
        }
        let offset = self.resolve_at(layout, def.at)?;
        let e = match (def.decode, def.len) {
            (Decode::Absent, _) => Extent { offset, len: 0, skip: 0, present: false },
            (_, Len::Fixed(len)) => Extent { offset, len, skip: 0, present: true },
            (_, Len::ToEnd) => {
                let size = self.size()?;
                if offset > size {
                    return Err(ParseError::RangeExceeded {
                        start: self.start() + offset,
                        stop: self.start() + offset,
                        limit: self.start() + size,
                    });
                }
                Extent { offset, len: size - offset, skip: 0, present: true }
            }
            (_, Len::Until { terminator, optional }) => {
                if optional && offset >= self.size()? {
                    Extent { offset, len: 0, skip: 0, present: false }
                } else {
                    let bytes = self.0.window.read_until(offset, terminator)?;
                    Extent { offset, len: bytes.len() as u64, skip: 1, present: true }
                }
            }
        };
        self.0.extents.borrow_mut().insert(def.name, e);
        Ok(e)
    }

    /// Absolute byte range of a field's value, or `None` if the field is
    /// absent for this version/flags.
    pub fn field_extent(&self, name: &str) -> Result<Option<Range<u64>>> {
        let layout = self.layout()?;
        let def = layout.field(name).ok_or_else(|| self.unknown(name))?;
        let e = self.extent(&layout, def)?;
        if !e.present {
            return Ok(None);
        }
        let start = self.start() + e.offset;
        Ok(Some(start..start + e.len))
    }

    fn decode_context(&self) -> DecodeContext {
        DecodeContext { box_type: self.box_type(), encoding: self.0.ctx.encoding }
    }

    fn decode_field(&self, layout: &Layout, def: &FieldDef) -> Result<BoxValue> {
        let e = self.extent(layout, def)?;
        if !e.present {
            return Ok(BoxValue::None);
        }
        let bytes = self.0.window.read_at(e.offset, e.len)?;
        match def.decode {
            Decode::Key(key) => self.0.ctx.decoders.decode(key, &self.decode_context(), &bytes),
            Decode::With(f) => f(&bytes),
            Decode::Absent => Ok(BoxValue::None),
        }
    }

    /// Decoded value of a named field. Table names yield the whole table as
    /// a list. `type` and `size` are always available, `version` and `flags`
    /// for full boxes.
    pub fn field(&self, name: &str) -> Result<BoxValue> {
        if let Some(v) = self.0.values.borrow().get(name) {
            return Ok(v.clone());
        }
        let layout = self.layout()?;
        let (key, value) = if let Some(def) = layout.field(name) {
            (def.name, self.decode_field(&layout, def)?)
        } else if let Some(def) = layout.table_def(name) {
            (def.name, BoxValue::List(self.table(name)?.to_vec()?))
        } else {
            return match name {
                "type" => Ok(BoxValue::Text(self.box_type().as_str_lossy())),
                "size" => Ok(BoxValue::UInt(self.size()?)),
                "version" if self.is_full() => Ok(BoxValue::UInt(self.version_or_default()? as u64)),
                "flags" if self.is_full() => Ok(BoxValue::UInt(self.flags_or_default()?.bits() as u64)),
                _ => Err(self.unknown(name)),
            };
        };
        self.0.values.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    /// Names of the fields and tables this box declares, in layout order.
    pub fn field_names(&self) -> Result<Vec<&'static str>> {
        let layout = self.layout()?;
        let mut names: Vec<&'static str> = Vec::new();
        for name in layout.fields.iter().map(|f| f.name).chain(layout.tables.iter().map(|t| t.name)) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub fn fields(&self) -> Result<Vec<(&'static str, BoxValue)>> {
        self.field_names()?.into_iter().map(|name| Ok((name, self.field(name)?))).collect()
    }

    /// Entry-level access to a table field.
    pub fn table(&self, name: &str) -> Result<Rc<Table>> {
        if let Some(t) = self.0.tables.borrow().get(name) {
            return Ok(t.clone());
        }
        let layout = self.layout()?;
        let def = layout.table_def(name).ok_or_else(|| self.unknown(name))?;
        let offset = self.resolve_at(&layout, def.at)?;
        let window = self.0.window.sub_window(offset, None)?;
        let count = match def.count {
            Count::Fixed(n) => Some(n),
            Count::ToEnd => None,
        };
        let (version, flags) = self.full_header()?.unwrap_or_default();
        let ctx = EntryCtx { version, flags, widths: def.widths };
        let table = Rc::new(Table::new(window, count, def.entry, ctx)?);
        self.0.tables.borrow_mut().insert(def.name, table.clone());
        Ok(table)
    }

    pub fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.layout()?.table_def(name).is_some())
    }
}

impl PartialEq for BoxRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BoxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxRef")
            .field("type", &self.box_type())
            .field("kind", &self.kind())
            .field("start", &self.start())
            .field("declared_size", &self.declared_size())
            .finish()
    }
}

impl fmt::Display for BoxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.box_type(), self.start())?;
        match self.size() {
            Ok(size) => write!(f, " size={size}")?,
            Err(_) => write!(f, " size=?")?,
        }
        if let Ok(Some((version, flags))) = self.full_header() {
            write!(f, " v{version} flags={flags}")?;
        }
        Ok(())
    }
}
