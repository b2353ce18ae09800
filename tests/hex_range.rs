use isobmff::hex_range;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

#[test]
fn hex_range_reads_within_bounds() {
    let data = (0u8..64u8).collect::<Vec<_>>();
    let path = temp_file("isobmff_hex_range_within.bin", &data);

    let dump = hex_range(&path, 16, 16).expect("hex_range failed");

    assert_eq!(dump.offset, 16);
    assert_eq!(dump.length, 16);
    // first byte of region is 16, printed at offset 0x10
    assert!(dump.hex.starts_with("00000010  10 11 12"));
}

#[test]
fn hex_range_clamps_to_eof() {
    let data = (0u8..32u8).collect::<Vec<_>>();
    let path = temp_file("isobmff_hex_range_clamp.bin", &data);

    // ask past EOF
    let dump = hex_range(&path, 24, 32).expect("hex_range failed");

    // we only have 8 bytes from 24..32
    assert_eq!(dump.offset, 24);
    assert_eq!(dump.length, 8);

    let empty = hex_range(&path, 40, 8).expect("hex_range failed");
    assert_eq!(empty.length, 0);
    assert!(empty.hex.is_empty());
}
