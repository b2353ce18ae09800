//! Text rendering shared by the JSON output and `isodump`.

use std::fmt::Write;

/// Bytes per dump row.
pub const HEX_ROW: usize = 16;

/// `offset  hex bytes  |ascii|` rows. Offsets are absolute positions in the
/// source, so a dump of a box payload lines up with the box offsets.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    let mut offset = start_offset;
    for row in bytes.chunks(HEX_ROW) {
        let digits = hex::encode(row);
        let pairs: Vec<&str> = (0..row.len()).map(|i| &digits[2 * i..2 * i + 2]).collect();
        let ascii: String = row
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{offset:08x}  {:<width$}  |{ascii}|", pairs.join(" "), width = HEX_ROW * 3 - 1);
        offset += row.len() as u64;
    }
    out
}
