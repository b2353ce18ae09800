mod common;

use common::{boxed, container, ftyp, scan};
use isobmff::{Phase, Scanner, Selection};
use std::io::Cursor;

fn three_boxes() -> Vec<u8> {
    let mut data = boxed(b"free", &[1]);
    data.extend_from_slice(&boxed(b"free", &[2, 2]));
    data.extend_from_slice(&boxed(b"mdat", &[3, 3, 3]));
    data
}

#[test]
fn iteration_is_in_byte_order_and_last_matches() {
    let scan = scan(three_boxes());
    let forward: Vec<_> = scan.iter().collect::<Result<_, _>>().unwrap();

    assert_eq!(forward.len(), 3);
    let starts: Vec<u64> = forward.iter().map(|b| b.start()).collect();
    assert_eq!(starts, vec![0, 9, 19]);
    assert_eq!(scan.get(-1).unwrap(), forward[2]);
    assert_eq!(scan.root().phase(), Phase::Exhausted);

    // a second pass hands back the same boxes
    let again: Vec<_> = scan.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(again, forward);
}

#[test]
fn discovery_is_lazy() {
    let scan = scan(three_boxes());
    assert_eq!(scan.root().scanned(), 0);

    scan.get(0).unwrap();
    assert_eq!(scan.root().scanned(), 1);
    assert_eq!(scan.root().phase(), Phase::Scanning);

    scan.get(-1).unwrap();
    assert_eq!(scan.root().scanned(), 3);
    assert_eq!(scan.root().phase(), Phase::Exhausted);
}

#[test]
fn next_box_replays_after_exhaustion() {
    let scan = scan(three_boxes());
    let mut first_pass = Vec::new();
    while let Some(bx) = scan.next_box().unwrap() {
        first_pass.push(bx);
    }
    assert_eq!(first_pass.len(), 3);
    assert_eq!(scan.root().phase(), Phase::Exhausted);

    let replayed = scan.next_box().unwrap().expect("replay");
    assert_eq!(replayed, first_pass[0]);
    assert_eq!(scan.root().phase(), Phase::Replaying);

    assert_eq!(scan.next_box().unwrap().as_ref(), Some(&first_pass[1]));
    assert_eq!(scan.next_box().unwrap().as_ref(), Some(&first_pass[2]));
    assert!(scan.next_box().unwrap().is_none());
    assert_eq!(scan.root().phase(), Phase::Exhausted);
}

#[test]
fn index_past_end() {
    let scan = scan(three_boxes());
    assert!(matches!(
        scan.get(5),
        Err(isobmff::ParseError::IndexOutOfRange { index: 5, len: 3 })
    ));
    assert!(scan.get(-4).is_err());
}

#[test]
fn select_by_type() {
    let scan = scan(three_boxes());

    match scan.select("free").unwrap() {
        Selection::Many(found) => assert_eq!(found.len(), 2),
        other => panic!("expected two boxes, got {other:?}"),
    }
    let mdat = scan.select("mdat").unwrap().one().expect("one mdat");
    assert_eq!(mdat.start(), 19);
    assert_eq!(scan.select("moov").unwrap(), Selection::None);
    assert_eq!(scan.select("free").unwrap().into_vec().len(), 2);
    assert!(scan.select("moov").unwrap().into_vec().is_empty());
    assert!(scan.find("moov").unwrap().is_none());
}

#[test]
fn ranges_are_clipped() {
    let scan = scan(three_boxes());
    assert_eq!(scan.range(1..).unwrap().len(), 2);
    assert_eq!(scan.root().range(..10).unwrap().len(), 3);
    assert!(scan.root().range(5..).unwrap().is_empty());
}

#[test]
fn limit_caps_the_top_level() {
    let scan = Scanner::builder().limit(2).build(Cursor::new(three_boxes()));
    assert_eq!(scan.len().unwrap(), 2);
    assert!(scan.find("mdat").unwrap().is_none());
}

#[test]
fn empty_stream() {
    let scan = scan(Vec::new());
    assert!(scan.is_empty().unwrap());
    assert!(scan.next_box().unwrap().is_none());
}

#[test]
fn sequential_source_matches_seekable() {
    let mut data = ftyp();
    data.extend_from_slice(&container(b"moov", &[boxed(b"free", &[0; 4])]));

    let seekable = scan(data.clone());
    let sequential = Scanner::sequential(Cursor::new(data));
    assert!(!sequential.source().borrow().is_seekable());

    let a: Vec<_> = seekable.iter().collect::<Result<_, _>>().unwrap();
    let b: Vec<_> = sequential.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.box_type(), y.box_type());
        assert_eq!(x.byte_range().unwrap(), y.byte_range().unwrap());
    }

    let free = sequential.descendant("moov/free").unwrap().expect("free");
    assert_eq!(free.start(), 32);
    assert!(free.field("major_brand").is_err());
    assert_eq!(sequential.get(0).unwrap().field("minor_version").unwrap().as_u64(), Some(512));
}

#[test]
fn nested_descendant_paths() {
    let stbl = container(b"stbl", &[boxed(b"free", &[])]);
    let minf = container(b"minf", &[stbl]);
    let mdia = container(b"mdia", &[minf]);
    let trak = container(b"trak", &[mdia]);
    let moov = container(b"moov", &[trak]);

    let scan = scan(moov);
    let stbl = scan.descendant("moov/trak/mdia/minf/stbl").unwrap().expect("stbl");
    assert_eq!(stbl.depth(), 4);
    assert_eq!(stbl.start(), 32);
    assert!(scan.descendant("moov/trak/edts").unwrap().is_none());
}
