//! Lazy, memoizing enumeration of sibling boxes.

use crate::error::{ParseError, Result};
use crate::layout::ChildResolve;
use crate::node::{BoxRef, Node, ScanContext};
use crate::parser::read_box_header;
use crate::window::ByteWindow;
use std::cell::{Cell, RefCell};
use std::ops::{Bound, RangeBounds};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Reading headers; `cursor` is relative to the window.
    Scanning { cursor: u64 },
    Exhausted,
    Replaying { next: usize },
}

/// Where a [`Siblings`] sequence is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Exhausted,
    Replaying,
}

/// Result of selecting siblings by type.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    None,
    One(BoxRef),
    Many(Vec<BoxRef>),
}

impl Selection {
    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::One(_) => 1,
            Selection::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn one(self) -> Option<BoxRef> {
        match self {
            Selection::One(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<BoxRef> {
        match self {
            Selection::None => Vec::new(),
            Selection::One(b) => vec![b],
            Selection::Many(v) => v,
        }
    }
}

struct Inner {
    ctx: Rc<ScanContext>,
    window: ByteWindow,
    parent: Weak<Node>,
    limit: Option<u64>,
    resolve: ChildResolve,
    state: Cell<State>,
    cache: RefCell<Vec<BoxRef>>,
}

/// Consecutive boxes inside one window, discovered one header at a time.
///
/// Every discovered box is kept, so indexing something already seen costs no
/// I/O. A negative index has to scan to the end first. Clones share the same
/// cache and cursor.
#[derive(Clone)]
pub struct Siblings(Rc<Inner>);

impl Siblings {
    pub(crate) fn new(
        ctx: Rc<ScanContext>,
        window: ByteWindow,
        parent: Weak<Node>,
        limit: Option<u64>,
        resolve: ChildResolve,
    ) -> Self {
        Siblings(Rc::new(Inner {
            ctx,
            window,
            parent,
            limit,
            resolve,
            state: Cell::new(State::Scanning { cursor: 0 }),
            cache: RefCell::new(Vec::new()),
        }))
    }

    pub fn window(&self) -> &ByteWindow {
        &self.0.window
    }

    pub fn phase(&self) -> Phase {
        match self.0.state.get() {
            State::Scanning { .. } => Phase::Scanning,
            State::Exhausted => Phase::Exhausted,
            State::Replaying { .. } => Phase::Replaying,
        }
    }

    /// Boxes discovered so far, without reading anything.
    pub fn scanned(&self) -> usize {
        self.0.cache.borrow().len()
    }

    fn cached(&self, i: usize) -> Option<BoxRef> {
        self.0.cache.borrow().get(i).cloned()
    }

    fn scan_next(&self) -> Result<Option<BoxRef>> {
        let State::Scanning { cursor } = self.0.state.get() else {
            return Ok(None);
        };
        if let Some(limit) = self.0.limit
            && self.scanned() as u64 >= limit
        {
            self.0.state.set(State::Exhausted);
            return Ok(None);
        }
        let Some(header) = read_box_header(&self.0.window, cursor)? else {
            self.0.state.set(State::Exhausted);
            return Ok(None);
        };
        let bound = self.0.window.stop();
        if let (Some(end), Some(stop)) = (header.end(), bound)
            && end > stop
        {
            return Err(ParseError::RangeExceeded { start: header.start, stop: end, limit: stop });
        }

        let boxes = &self.0.ctx.boxes;
        let kind = match self.0.resolve {
            ChildResolve::Registry => boxes.resolve(header.typ),
            ChildResolve::Fallback(kind) => boxes.get(header.typ).unwrap_or(kind),
            ChildResolve::Force(kind) => kind,
        };
        let next = header.end().map(|end| end - self.0.window.start());
        let bx = BoxRef::new(self.0.ctx.clone(), header, kind, &self.0.window, self.0.parent.clone())?;

        // a size-0 box runs to the end, so nothing can follow it
        self.0.state.set(match next {
            Some(cursor) => State::Scanning { cursor },
            None => State::Exhausted,
        });
        self.0.cache.borrow_mut().push(bx.clone());
        Ok(Some(bx))
    }

    /// Pull-style iteration. Once the window is exhausted, the next call
    /// starts replaying the cache from the beginning; the end of each replay
    /// is signalled by `None` again.
    pub fn next_box(&self) -> Result<Option<BoxRef>> {
        let next = match self.0.state.get() {
            State::Scanning { .. } => return self.scan_next(),
            State::Exhausted => 0,
            State::Replaying { next } => next,
        };
        match self.cached(next) {
            Some(bx) => {
                self.0.state.set(State::Replaying { next: next + 1 });
                Ok(Some(bx))
            }
            None => {
                self.0.state.set(State::Exhausted);
                Ok(None)
            }
        }
    }

    fn is_scanning(&self) -> bool {
        matches!(self.0.state.get(), State::Scanning { .. })
    }

    fn fill_to(&self, n: usize) -> Result<()> {
        while self.scanned() < n && self.is_scanning() {
            if self.scan_next()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Scans to the end of the window and returns the number of boxes.
    pub fn len(&self) -> Result<usize> {
        self.fill_to(usize::MAX)?;
        Ok(self.scanned())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.fill_to(1)?;
        Ok(self.scanned() == 0)
    }

    /// Box by position; negative indices count from the end and force a
    /// full scan.
    pub fn get(&self, index: i64) -> Result<BoxRef> {
        let resolved = if index < 0 {
            let len = self.len()?;
            len.checked_sub(index.unsigned_abs() as usize)
        } else {
            let i = index as usize;
            self.fill_to(i.saturating_add(1))?;
            Some(i)
        };
        resolved
            .and_then(|i| self.cached(i))
            .ok_or(ParseError::IndexOutOfRange { index, len: self.scanned() as u64 })
    }

    /// Positional iterator sharing this sequence's cache. Independent of
    /// [`next_box`](Self::next_box).
    pub fn iter(&self) -> SiblingIter {
        SiblingIter { siblings: self.clone(), pos: 0, failed: false }
    }

    /// First box of type `code`, scanning only as far as needed.
    pub fn find(&self, code: &str) -> Result<Option<BoxRef>> {
        for bx in self.iter() {
            let bx = bx?;
            if bx.box_type() == code {
                return Ok(Some(bx));
            }
        }
        Ok(None)
    }

    pub fn filter(&self, code: &str) -> Result<Vec<BoxRef>> {
        let mut out = Vec::new();
        for bx in self.iter() {
            let bx = bx?;
            if bx.box_type() == code {
                out.push(bx);
            }
        }
        Ok(out)
    }

    /// Every box of type `code`: a single box when exactly one matches.
    pub fn select(&self, code: &str) -> Result<Selection> {
        let mut found = self.filter(code)?;
        Ok(match found.len() {
            0 => Selection::None,
            1 => Selection::One(found.remove(0)),
            _ => Selection::Many(found),
        })
    }

    /// Boxes in a positional range. Like slicing, bounds past the end are
    /// clipped rather than rejected.
    pub fn range(&self, range: impl RangeBounds<usize>) -> Result<Vec<BoxRef>> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => Some(e.saturating_add(1)),
            Bound::Excluded(&e) => Some(e),
            Bound::Unbounded => None,
        };
        self.fill_to(end.unwrap_or(usize::MAX))?;
        let cache = self.0.cache.borrow();
        let end = end.unwrap_or(cache.len()).min(cache.len());
        Ok(cache.get(start..end).map(<[BoxRef]>::to_vec).unwrap_or_default())
    }

    /// Everything, scanning to the end.
    pub fn to_vec(&self) -> Result<Vec<BoxRef>> {
        self.range(..)
    }
}

pub struct SiblingIter {
    siblings: Siblings,
    pos: usize,
    failed: bool,
}

impl Iterator for SiblingIter {
    type Item = Result<BoxRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(bx) = self.siblings.cached(self.pos) {
            self.pos += 1;
            return Some(Ok(bx));
        }
        match self.siblings.fill_to(self.pos + 1) {
            Ok(()) => {
                let bx = self.siblings.cached(self.pos)?;
                self.pos += 1;
                Some(Ok(bx))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl IntoIterator for &Siblings {
    type Item = Result<BoxRef>;
    type IntoIter = SiblingIter;

    fn into_iter(self) -> SiblingIter {
        self.iter()
    }
}
