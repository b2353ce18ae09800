#![allow(dead_code)]

use isobmff::Scanner;
use std::io::Cursor;

/// Plain box: 32-bit size, type, payload.
pub fn boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// Full box: version and 24-bit flags ahead of the payload.
pub fn full_box(typ: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut p = vec![version];
    p.extend_from_slice(&flags.to_be_bytes()[1..]);
    p.extend_from_slice(payload);
    boxed(typ, &p)
}

pub fn container(typ: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    boxed(typ, &children.concat())
}

/// Concatenated big-endian u32s.
pub fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Concatenated big-endian u16s.
pub fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// NUL-terminated string bytes.
pub fn cstr(s: &str) -> Vec<u8> {
    let mut v = s.as_bytes().to_vec();
    v.push(0);
    v
}

pub fn scan(bytes: Vec<u8>) -> Scanner {
    Scanner::new(Cursor::new(bytes))
}

/// `ftyp` with major brand `isom`, minor version 512 and brands `isom`, `iso2`.
pub fn ftyp() -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(b"isom");
    p.extend_from_slice(&512u32.to_be_bytes());
    p.extend_from_slice(b"isom");
    p.extend_from_slice(b"iso2");
    boxed(b"ftyp", &p)
}

/// Version 0 `mvhd` payload fields after version/flags.
pub fn mvhd_v0_payload(creation: u32, modification: u32, timescale: u32, duration: u32) -> Vec<u8> {
    let mut p = u32s(&[creation, modification, timescale, duration]);
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate 1.0
    p.extend_from_slice(&0x0100u16.to_be_bytes()); // volume 1.0
    p.extend_from_slice(&[0u8; 10]);
    p.extend_from_slice(&u32s(&[0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000]));
    p.extend_from_slice(&[0u8; 24]);
    p.extend_from_slice(&2u32.to_be_bytes()); // next_track_id
    p
}
