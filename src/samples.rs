//! Per-sample timing and placement, assembled from a track's sample tables.

use crate::error::{ParseError, Result};
use crate::node::BoxRef;
use crate::scanner::Scanner;
use crate::table::Table;
use crate::value::BoxValue;
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Serialize)]
pub struct SampleInfo {
    /// 0-based sample index
    pub index: u32,

    /// Decode time (DTS) in track timescale units
    pub dts: u64,

    /// Presentation time (PTS) in track timescale units (DTS + composition offset)
    pub pts: u64,

    /// Start time in seconds (pts / timescale as f64)
    pub start_time: f64,

    /// Duration in track timescale units (from stts)
    pub duration: u32,

    /// Composition/rendered offset in track timescale units (from ctts, may be 0)
    pub rendered_offset: i64,

    /// Byte offset in the file (from stsc + stco/co64)
    pub file_offset: u64,

    /// Sample size in bytes (from stsz/stz2)
    pub size: u32,

    /// Whether this sample is a sync sample / keyframe (from stss)
    pub is_sync: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackSamples {
    pub track_id: u32,
    pub handler_type: String, // "vide", "soun", etc.
    pub timescale: u32,
    pub duration: u64, // in track timescale units
    pub sample_count: u32,
    pub samples: Vec<SampleInfo>,
}

/// Samples of every `moov/trak` in the scan.
pub fn tracks(scan: &Scanner) -> Result<Vec<TrackSamples>> {
    let mut result = Vec::new();
    for moov in scan.filter("moov")? {
        let Some(children) = moov.children()? else { continue };
        for trak in children.filter("trak")? {
            result.push(track_samples(&trak)?);
        }
    }
    Ok(result)
}

pub fn track_samples_from_reader<R: Read + Seek + 'static>(reader: R) -> Result<Vec<TrackSamples>> {
    tracks(&Scanner::new(reader))
}

pub fn track_samples_from_path(path: impl AsRef<Path>) -> Result<Vec<TrackSamples>> {
    tracks(&Scanner::open(path)?)
}

fn uint(bx: &BoxRef, name: &str) -> Result<u64> {
    Ok(bx.field(name)?.as_u64().unwrap_or(0))
}

pub fn track_samples(trak: &BoxRef) -> Result<TrackSamples> {
    let track_id = match trak.child("tkhd")? {
        Some(tkhd) => uint(&tkhd, "track_id")? as u32,
        None => 0,
    };
    let (timescale, duration) = match trak.descendant("mdia/mdhd")? {
        Some(mdhd) => (uint(&mdhd, "timescale")? as u32, uint(&mdhd, "duration")?),
        None => (0, 0),
    };
    let handler_type = match trak.descendant("mdia/hdlr")? {
        Some(hdlr) => hdlr.field("handler_type")?.as_str().unwrap_or_default().to_string(),
        None => String::new(),
    };
    let samples = match trak.descendant("mdia/minf/stbl")? {
        Some(stbl) => build_samples(&stbl, timescale)?,
        None => Vec::new(),
    };

    Ok(TrackSamples {
        track_id,
        handler_type,
        timescale,
        duration,
        sample_count: samples.len() as u32,
        samples,
    })
}

enum Sizes {
    Constant(u64),
    Table(Rc<Table>),
}

impl Sizes {
    fn get(&self, i: u64) -> Result<u64> {
        match self {
            Sizes::Constant(size) => Ok(*size),
            Sizes::Table(t) => Ok(t.get(i as i64)?.as_u64().unwrap_or(0)),
        }
    }
}

/// Sample count and sizes from `stsz`, or `stz2` when there is no `stsz`.
fn sample_sizes(stbl: &BoxRef) -> Result<Option<(u64, Sizes)>> {
    if let Some(stsz) = stbl.child("stsz")? {
        let size = uint(&stsz, "sample_size")?;
        let count = uint(&stsz, "sample_count")?;
        let sizes = if size != 0 { Sizes::Constant(size) } else { Sizes::Table(stsz.table("entry_sizes")?) };
        return Ok(Some((count, sizes)));
    }
    if let Some(stz2) = stbl.child("stz2")? {
        let table = stz2.table("entry_sizes")?;
        return Ok(Some((table.len(), Sizes::Table(table))));
    }
    Ok(None)
}

fn entries(bx: Option<BoxRef>) -> Result<Option<Rc<Table>>> {
    bx.map(|b| b.table("entries")).transpose()
}

fn member(entry: &BoxValue, name: &str) -> u64 {
    entry.get(name).and_then(BoxValue::as_u64).unwrap_or(0)
}

/// Expands run-length `(sample_count, value)` tables such as `stts` and `ctts`.
struct Runs {
    table: Option<Rc<Table>>,
    field: &'static str,
    entry: u64,
    left: u64,
    value: i64,
}

impl Runs {
    fn new(table: Option<Rc<Table>>, field: &'static str) -> Self {
        Self { table, field, entry: 0, left: 0, value: 0 }
    }

    /// Value for the next sample. Past the end of the table the last value
    /// repeats.
    fn next_value(&mut self) -> Result<i64> {
        let Some(table) = &self.table else { return Ok(0) };
        while self.left == 0 {
            if self.entry >= table.len() {
                return Ok(self.value);
            }
            let e = table.get(self.entry as i64)?;
            self.left = member(&e, "sample_count");
            self.value = e.get(self.field).and_then(BoxValue::as_i64).unwrap_or(0);
            self.entry += 1;
        }
        self.left -= 1;
        Ok(self.value)
    }
}

/// Walks chunks as described by `stsc`, handing out sample offsets.
struct Chunks {
    stsc: Option<Rc<Table>>,
    offsets: Option<Rc<Table>>,
    stsc_entry: u64,
    chunk: u64,
    left: u64,
    next: u64,
}

impl Chunks {
    fn new(stsc: Option<Rc<Table>>, offsets: Option<Rc<Table>>) -> Self {
        Self { stsc, offsets, stsc_entry: 0, chunk: 0, left: 0, next: 0 }
    }

    fn next_offset(&mut self, size: u64) -> Result<u64> {
        let (Some(stsc), Some(offsets)) = (&self.stsc, &self.offsets) else { return Ok(0) };
        if stsc.is_empty() {
            return Ok(0);
        }
        if self.left == 0 {
            self.chunk += 1;
            while self.stsc_entry + 1 < stsc.len() {
                let next = stsc.get(self.stsc_entry as i64 + 1)?;
                if member(&next, "first_chunk") > self.chunk {
                    break;
                }
                self.stsc_entry += 1;
            }
            if self.chunk > offsets.len() {
                return Ok(0);
            }
            let entry = stsc.get(self.stsc_entry as i64)?;
            self.left = member(&entry, "samples_per_chunk").max(1);
            self.next = offsets.get(self.chunk as i64 - 1)?.as_u64().unwrap_or(0);
        }
        let at = self.next;
        self.next = at
            .checked_add(size)
            .ok_or(ParseError::RangeExceeded { start: at, stop: u64::MAX, limit: u64::MAX })?;
        self.left -= 1;
        Ok(at)
    }
}

fn build_samples(stbl: &BoxRef, timescale: u32) -> Result<Vec<SampleInfo>> {
    let Some((count, sizes)) = sample_sizes(stbl)? else {
        return Ok(Vec::new());
    };
    let mut stts = Runs::new(entries(stbl.child("stts")?)?, "sample_delta");
    let mut ctts = Runs::new(entries(stbl.child("ctts")?)?, "sample_offset");
    let chunk_offsets = match stbl.child("stco")? {
        Some(stco) => Some(stco.table("entries")?),
        None => entries(stbl.child("co64")?)?,
    };
    let mut chunks = Chunks::new(entries(stbl.child("stsc")?)?, chunk_offsets);
    // stss numbers samples from 1; without stss every sample is a sync sample
    let sync: Option<HashSet<u64>> = match entries(stbl.child("stss")?)? {
        Some(t) => Some(t.to_vec()?.iter().filter_map(BoxValue::as_u64).collect()),
        None => None,
    };

    let mut samples = Vec::with_capacity(count.min(1 << 20) as usize);
    let mut dts = 0u64;
    for i in 0..count {
        let size = sizes.get(i)?;
        let duration = stts.next_value()?.max(0) as u32;
        let offset = ctts.next_value()?;
        let pts = (dts as i64).saturating_add(offset).max(0) as u64;
        samples.push(SampleInfo {
            index: i as u32,
            dts,
            pts,
            start_time: if timescale > 0 { pts as f64 / timescale as f64 } else { 0.0 },
            duration,
            rendered_offset: offset,
            file_offset: chunks.next_offset(size)?,
            size: size as u32,
            is_sync: sync.as_ref().is_none_or(|s| s.contains(&(i + 1))),
        });
        dts += duration as u64;
    }
    Ok(samples)
}
