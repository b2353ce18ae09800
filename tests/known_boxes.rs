mod common;

use chrono::{TimeZone, Utc};
use common::{boxed, container, cstr, full_box, mvhd_v0_payload, scan, u16s, u32s};
use isobmff::decoders::MAC_EPOCH_OFFSET;
use isobmff::{BoxValue, KnownBox, ParseError};

#[test]
fn mvhd_version_0_times_start_at_1904() {
    let scan = scan(full_box(b"mvhd", 0, 0, &mvhd_v0_payload(0, 0, 1000, 5000)));
    let mvhd = scan.get(0).unwrap();

    assert_eq!(mvhd.kind(), KnownBox::MovieHeader);
    assert_eq!(mvhd.size().unwrap(), 108);
    assert_eq!(mvhd.version().unwrap(), Some(0));
    assert_eq!(mvhd.payload_offset(), 12);

    let epoch = Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(mvhd.field("creation_time").unwrap(), BoxValue::DateTime(epoch));
    assert_eq!(mvhd.field("creation_time").unwrap().as_datetime(), Some(epoch));
    assert_eq!(mvhd.field("modification_time").unwrap(), BoxValue::DateTime(epoch));
    assert_eq!(mvhd.field("timescale").unwrap(), BoxValue::UInt(1000));
    assert_eq!(mvhd.field("duration").unwrap(), BoxValue::UInt(5000));
    assert_eq!(mvhd.field("rate").unwrap(), BoxValue::Fixed(1.0));
    assert_eq!(mvhd.field("rate").unwrap().as_f64(), Some(1.0));
    assert_eq!(mvhd.field("volume").unwrap(), BoxValue::Fixed(1.0));
    assert_eq!(mvhd.field("next_track_id").unwrap(), BoxValue::UInt(2));
    assert_eq!(mvhd.field_extent("timescale").unwrap(), Some(20..24));

    let matrix = mvhd.field("matrix").unwrap();
    let matrix = matrix.as_list().expect("matrix list");
    assert_eq!(matrix.len(), 9);
    assert_eq!(matrix[0], BoxValue::Int(0x0001_0000));
    assert_eq!(matrix[8], BoxValue::Int(0x4000_0000));
}

#[test]
fn mvhd_version_1_widens_times() {
    let day_after_unix_epoch = (MAC_EPOCH_OFFSET + 86_400) as u64;
    let mut p = Vec::new();
    p.extend_from_slice(&day_after_unix_epoch.to_be_bytes());
    p.extend_from_slice(&day_after_unix_epoch.to_be_bytes());
    p.extend_from_slice(&600u32.to_be_bytes());
    p.extend_from_slice(&(1u64 << 33).to_be_bytes());
    // the rest matches version 0 from the rate on
    p.extend_from_slice(&mvhd_v0_payload(0, 0, 0, 0)[16..]);

    let scan = scan(full_box(b"mvhd", 1, 0, &p));
    let mvhd = scan.get(0).unwrap();

    assert_eq!(mvhd.size().unwrap(), 120);
    let day = Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap();
    assert_eq!(mvhd.field("creation_time").unwrap(), BoxValue::DateTime(day));
    assert_eq!(mvhd.field("timescale").unwrap(), BoxValue::UInt(600));
    assert_eq!(mvhd.field("duration").unwrap(), BoxValue::UInt(1 << 33));
    assert_eq!(mvhd.field("next_track_id").unwrap(), BoxValue::UInt(2));
    assert_eq!(mvhd.field_extent("timescale").unwrap(), Some(28..32));
}

#[test]
fn field_past_box_end_is_a_bounds_error() {
    // only the four leading fields fit
    let scan = scan(full_box(b"mvhd", 0, 0, &u32s(&[0, 0, 1000, 5000])));
    let mvhd = scan.get(0).unwrap();

    assert_eq!(mvhd.field("duration").unwrap(), BoxValue::UInt(5000));
    assert!(matches!(
        mvhd.field("rate"),
        Err(ParseError::RangeExceeded { start: 28, stop: 32, limit: 28 })
    ));
}

#[test]
fn mdhd_language_code() {
    let mdhd = |lang: u16| {
        let mut p = u32s(&[0, 0, 48000, 96000]);
        p.extend_from_slice(&lang.to_be_bytes());
        p.extend_from_slice(&[0, 0]);
        full_box(b"mdhd", 0, 0, &p)
    };

    let und = scan(mdhd(0x55C4)).get(0).unwrap();
    assert_eq!(und.field("language").unwrap(), BoxValue::Text("und".into()));
    assert_eq!(und.field("timescale").unwrap(), BoxValue::UInt(48000));

    let eng = scan(mdhd(0x15C7)).get(0).unwrap();
    assert_eq!(eng.field("language").unwrap(), BoxValue::Text("eng".into()));
}

#[test]
fn hdlr_name_drops_terminator() {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(b"vide");
    p.extend_from_slice(&[0u8; 12]);
    p.extend_from_slice(b"VideoHandler\0");

    let hdlr = scan(full_box(b"hdlr", 0, 0, &p)).get(0).unwrap();
    assert_eq!(hdlr.field("handler_type").unwrap(), BoxValue::Text("vide".into()));
    assert_eq!(hdlr.field("name").unwrap(), BoxValue::Text("VideoHandler".into()));
    assert_eq!(hdlr.field("version").unwrap(), BoxValue::UInt(0));
}

#[test]
fn url_location_follows_self_contained_flag() {
    let local = scan(full_box(b"url ", 0, 1, &[])).get(0).unwrap();
    assert!(local.flags().unwrap().unwrap().bit(0));
    assert!(local.field("location").unwrap().is_none());
    assert_eq!(local.field_extent("location").unwrap(), None);

    let remote = scan(full_box(b"url ", 0, 0, b"http://a/b\0")).get(0).unwrap();
    assert_eq!(remote.field("location").unwrap(), BoxValue::Text("http://a/b".into()));
    assert_eq!(remote.field_extent("location").unwrap(), Some(12..22));
}

#[test]
fn unterminated_cstring() {
    let url = scan(full_box(b"url ", 0, 0, b"abc")).get(0).unwrap();
    assert!(matches!(url.field("location"), Err(ParseError::UnterminatedString { offset: 12 })));
}

#[test]
fn dref_children_stop_at_entry_count() {
    let url = full_box(b"url ", 0, 1, &[]);
    let mut p = 1u32.to_be_bytes().to_vec();
    p.extend_from_slice(&url);
    p.extend_from_slice(&url);

    let dref = scan(full_box(b"dref", 0, 0, &p)).get(0).unwrap();
    assert_eq!(dref.field("entry_count").unwrap(), BoxValue::UInt(1));
    assert_eq!(dref.header_size().unwrap(), 16);
    let entries = dref.children().unwrap().expect("entries");
    assert_eq!(entries.len().unwrap(), 1);
    assert_eq!(entries.get(0).unwrap().kind(), KnownBox::DataEntryUrl);
}

#[test]
fn stsd_sample_entries() {
    let mut avc1 = Vec::new();
    avc1.extend_from_slice(&[0u8; 6]);
    avc1.extend_from_slice(&1u16.to_be_bytes());
    avc1.extend_from_slice(&[0u8; 16]);
    avc1.extend_from_slice(&1920u16.to_be_bytes());
    avc1.extend_from_slice(&1080u16.to_be_bytes());
    avc1.extend_from_slice(&u32s(&[0x0048_0000, 0x0048_0000, 0]));
    avc1.extend_from_slice(&1u16.to_be_bytes());
    let mut name = [0u8; 32];
    name[0] = 4;
    name[1..5].copy_from_slice(b"x264");
    avc1.extend_from_slice(&name);
    avc1.extend_from_slice(&0x18u16.to_be_bytes());
    avc1.extend_from_slice(&(-1i16).to_be_bytes());
    avc1.extend_from_slice(&boxed(b"btrt", &u32s(&[0, 5_000_000, 4_000_000])));

    let mut other = vec![0u8; 6];
    other.extend_from_slice(&3u16.to_be_bytes());
    other.extend_from_slice(b"opaque");

    let mut p = 2u32.to_be_bytes().to_vec();
    p.extend_from_slice(&boxed(b"avc1", &avc1));
    p.extend_from_slice(&boxed(b"zzzz", &other));
    let stsd = scan(full_box(b"stsd", 0, 0, &p)).get(0).unwrap();

    let entries = stsd.children().unwrap().expect("entries");
    assert_eq!(entries.len().unwrap(), 2);

    let avc1 = entries.get(0).unwrap();
    assert_eq!(avc1.kind(), KnownBox::VisualSampleEntry);
    assert_eq!(avc1.field("width").unwrap(), BoxValue::UInt(1920));
    assert_eq!(avc1.field("height").unwrap(), BoxValue::UInt(1080));
    assert_eq!(avc1.field("horizresolution").unwrap(), BoxValue::Fixed(72.0));
    assert_eq!(avc1.field("compressorname").unwrap(), BoxValue::Text("x264".into()));
    assert_eq!(avc1.field("depth").unwrap(), BoxValue::UInt(0x18));
    assert_eq!(avc1.header_size().unwrap(), 86);

    let btrt = avc1.child("btrt").unwrap().expect("btrt");
    assert!(!btrt.is_full());
    assert_eq!(btrt.field("max_bitrate").unwrap(), BoxValue::UInt(5_000_000));

    let other = entries.get(1).unwrap();
    assert_eq!(other.kind(), KnownBox::SampleEntry);
    assert_eq!(other.field("data_reference_index").unwrap(), BoxValue::UInt(3));
    assert_eq!(other.field("data").unwrap(), BoxValue::Bytes(b"opaque".to_vec()));
}

#[test]
fn tref_children_are_reference_lists() {
    let tref = container(b"tref", &[boxed(b"abcd", &u32s(&[1, 2]))]);
    let tref = scan(tref).get(0).unwrap();

    let refs = tref.child("abcd").unwrap().expect("reference");
    assert_eq!(refs.kind(), KnownBox::TrackReferenceType);
    assert_eq!(
        refs.field("track_ids").unwrap(),
        BoxValue::List(vec![BoxValue::UInt(1), BoxValue::UInt(2)])
    );
}

#[test]
fn sdtp_counts_samples_from_sibling_stsz() {
    let stsz = full_box(b"stsz", 0, 0, &u32s(&[100, 2]));
    let sdtp = full_box(b"sdtp", 0, 0, &[0b0001_0000, 0b0010_1000, 0, 0]);

    let stbl = scan(container(b"stbl", &[sdtp.clone(), stsz])).get(0).unwrap();
    let sdtp_in_stbl = stbl.child("sdtp").unwrap().expect("sdtp");
    let entries = sdtp_in_stbl.table("entries").unwrap();
    assert_eq!(entries.len(), 2);
    let second = entries.get(1).unwrap();
    assert_eq!(second.get("sample_depends_on"), Some(&BoxValue::UInt(2)));
    assert_eq!(second.get("sample_is_depended_on"), Some(&BoxValue::UInt(2)));

    // alone, every payload byte is a sample
    let alone = scan(sdtp).get(0).unwrap();
    assert_eq!(alone.table("entries").unwrap().len(), 4);
}

#[test]
fn sdtp_count_does_not_need_the_parent_alive() {
    let stsz = full_box(b"stsz", 0, 0, &u32s(&[100, 2]));
    let sdtp = full_box(b"sdtp", 0, 0, &[0b0001_0000, 0b0010_1000, 0, 0]);

    let sdtp = {
        let scan = scan(container(b"stbl", &[sdtp, stsz]));
        let stbl = scan.get(0).unwrap();
        stbl.child("sdtp").unwrap().expect("sdtp")
    };
    assert!(sdtp.parent().is_none());
    assert_eq!(sdtp.table("entries").unwrap().len(), 2);
}

#[test]
fn unparsed_boxes_keep_version_and_flags() {
    let trun = scan(full_box(b"trun", 1, 0x000205, &u32s(&[3]))).get(0).unwrap();
    assert_eq!(trun.kind(), KnownBox::Unparsed);
    assert_eq!(trun.version().unwrap(), Some(1));
    assert_eq!(trun.flags().unwrap().unwrap().bits(), 0x000205);
    assert!(!trun.has_children().unwrap());
    assert!(matches!(trun.field("sample_count"), Err(ParseError::UnknownField { .. })));
}

#[test]
fn full_names() {
    assert_eq!(KnownBox::FileType.full_name(), "File Type Box");
    assert!(KnownBox::MovieHeader.is_full_box());
    assert!(!KnownBox::MediaData.is_full_box());
}

fn tkhd_payload(version: u8) -> Vec<u8> {
    let mut p = Vec::new();
    if version == 1 {
        p.extend_from_slice(&[0u8; 16]);
        p.extend_from_slice(&u32s(&[3, 0]));
        p.extend_from_slice(&(1u64 << 33).to_be_bytes());
    } else {
        p.extend_from_slice(&u32s(&[0, 0, 3, 0, 9000]));
    }
    p.extend_from_slice(&[0u8; 8]);
    p.extend_from_slice(&(-1i16).to_be_bytes());
    p.extend_from_slice(&2i16.to_be_bytes());
    p.extend_from_slice(&0x0100u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 2]);
    p.extend_from_slice(&u32s(&[0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000]));
    p.extend_from_slice(&u32s(&[(1280 << 16) | 0x8000, 720 << 16]));
    p
}

#[test]
fn tkhd_both_versions() {
    let epoch = Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).unwrap();

    let v0 = scan(full_box(b"tkhd", 0, 3, &tkhd_payload(0))).get(0).unwrap();
    assert_eq!(v0.size().unwrap(), 92);
    assert_eq!(v0.flags().unwrap().unwrap().bits(), 3);
    assert_eq!(v0.field("creation_time").unwrap(), BoxValue::DateTime(epoch));
    assert_eq!(v0.field("track_id").unwrap(), BoxValue::UInt(3));
    assert_eq!(v0.field("duration").unwrap(), BoxValue::UInt(9000));
    assert_eq!(v0.field("layer").unwrap(), BoxValue::Int(-1));
    assert_eq!(v0.field("alternate_group").unwrap(), BoxValue::Int(2));
    assert_eq!(v0.field("volume").unwrap(), BoxValue::Fixed(1.0));
    assert_eq!(v0.field("width").unwrap(), BoxValue::Fixed(1280.5));
    assert_eq!(v0.field("height").unwrap(), BoxValue::Fixed(720.0));
    assert_eq!(v0.field_extent("width").unwrap(), Some(84..88));
    let matrix = v0.field("matrix").unwrap();
    assert_eq!(matrix.as_list().map(<[BoxValue]>::len), Some(9));

    let v1 = scan(full_box(b"tkhd", 1, 3, &tkhd_payload(1))).get(0).unwrap();
    assert_eq!(v1.size().unwrap(), 104);
    assert_eq!(v1.field("track_id").unwrap(), BoxValue::UInt(3));
    assert_eq!(v1.field("duration").unwrap(), BoxValue::UInt(1 << 33));
    assert_eq!(v1.field("layer").unwrap(), BoxValue::Int(-1));
    assert_eq!(v1.field("width").unwrap(), BoxValue::Fixed(1280.5));
    assert_eq!(v1.field_extent("width").unwrap(), Some(96..100));
}

#[test]
fn cslg_field_width_follows_version() {
    let v0 = u32s(&[(-10i32) as u32, 0, 200, 0, 5000]);
    let cslg = scan(full_box(b"cslg", 0, 0, &v0)).get(0).unwrap();
    assert_eq!(cslg.field("composition_to_dts_shift").unwrap(), BoxValue::Int(-10));
    assert_eq!(cslg.field("greatest_decode_to_display_delta").unwrap(), BoxValue::Int(200));
    assert_eq!(cslg.field("composition_end_time").unwrap(), BoxValue::Int(5000));

    let v1: Vec<u8> = [0i64, -3, 400, 0, 1 << 40].iter().flat_map(|v| v.to_be_bytes()).collect();
    let cslg = scan(full_box(b"cslg", 1, 0, &v1)).get(0).unwrap();
    assert_eq!(cslg.field("least_decode_to_display_delta").unwrap(), BoxValue::Int(-3));
    assert_eq!(cslg.field_extent("least_decode_to_display_delta").unwrap(), Some(20..28));
    assert_eq!(cslg.field("composition_end_time").unwrap(), BoxValue::Int(1 << 40));
}

#[test]
fn media_headers_under_minf() {
    let mut p = u16s(&[0]);
    p.extend_from_slice(&u16s(&[1, 2, 3]));
    let vmhd = scan(full_box(b"vmhd", 0, 1, &p)).get(0).unwrap();
    assert_eq!(vmhd.field("graphicsmode").unwrap(), BoxValue::UInt(0));
    assert_eq!(
        vmhd.field("opcolor").unwrap(),
        BoxValue::List(vec![BoxValue::UInt(1), BoxValue::UInt(2), BoxValue::UInt(3)])
    );

    let mut p = (-0x80i16).to_be_bytes().to_vec();
    p.extend_from_slice(&[0, 0]);
    let smhd = scan(full_box(b"smhd", 0, 0, &p)).get(0).unwrap();
    assert_eq!(smhd.field("balance").unwrap(), BoxValue::Fixed(-0.5));
    assert_eq!(smhd.header_size().unwrap(), 16);

    let mut p = u16s(&[1500, 1000]);
    p.extend_from_slice(&u32s(&[64000, 32000, 0]));
    let hmhd = scan(full_box(b"hmhd", 0, 0, &p)).get(0).unwrap();
    assert_eq!(hmhd.field("max_pdu_size").unwrap(), BoxValue::UInt(1500));
    assert_eq!(hmhd.field("avg_pdu_size").unwrap(), BoxValue::UInt(1000));
    assert_eq!(hmhd.field("max_bitrate").unwrap(), BoxValue::UInt(64000));
    assert_eq!(hmhd.field("avg_bitrate").unwrap(), BoxValue::UInt(32000));
}

#[test]
fn fragment_defaults_and_decode_times() {
    let trex = scan(full_box(b"trex", 0, 0, &u32s(&[1, 1, 1024, 0, 0x0001_0000]))).get(0).unwrap();
    assert_eq!(trex.field("track_id").unwrap(), BoxValue::UInt(1));
    assert_eq!(trex.field("default_sample_duration").unwrap(), BoxValue::UInt(1024));
    assert_eq!(trex.field("default_sample_flags").unwrap(), BoxValue::UInt(0x0001_0000));

    let mehd = scan(full_box(b"mehd", 0, 0, &u32s(&[90000]))).get(0).unwrap();
    assert_eq!(mehd.field("fragment_duration").unwrap(), BoxValue::UInt(90000));
    let mehd = scan(full_box(b"mehd", 1, 0, &(1u64 << 34).to_be_bytes())).get(0).unwrap();
    assert_eq!(mehd.field("fragment_duration").unwrap(), BoxValue::UInt(1 << 34));

    let tfdt = scan(full_box(b"tfdt", 0, 0, &u32s(&[12]))).get(0).unwrap();
    assert_eq!(tfdt.field("base_media_decode_time").unwrap(), BoxValue::UInt(12));
    let tfdt = scan(full_box(b"tfdt", 1, 0, &(1u64 << 40).to_be_bytes())).get(0).unwrap();
    assert_eq!(tfdt.field("base_media_decode_time").unwrap(), BoxValue::UInt(1 << 40));
    assert_eq!(tfdt.field_extent("base_media_decode_time").unwrap(), Some(12..20));

    let mut p = u32s(&[2]);
    p.extend_from_slice(&boxed(b"free", &[0; 4]));
    let trep = scan(full_box(b"trep", 0, 0, &p)).get(0).unwrap();
    assert_eq!(trep.field("track_id").unwrap(), BoxValue::UInt(2));
    assert_eq!(trep.header_size().unwrap(), 16);
    let children = trep.children().unwrap().expect("trep children");
    assert_eq!(children.len().unwrap(), 1);
    assert_eq!(children.get(0).unwrap().box_type(), "free");
}

#[test]
fn item_info_entries_by_version() {
    let mut p = u16s(&[1, 0]);
    p.extend_from_slice(&cstr("name"));
    p.extend_from_slice(&cstr("text/plain"));
    let v0 = scan(full_box(b"infe", 0, 0, &p)).get(0).unwrap();
    assert_eq!(v0.field("item_id").unwrap(), BoxValue::UInt(1));
    assert_eq!(v0.field("item_name").unwrap(), BoxValue::Text("name".into()));
    assert_eq!(v0.field("content_type").unwrap(), BoxValue::Text("text/plain".into()));
    assert_eq!(v0.field("content_encoding").unwrap(), BoxValue::None);

    let mut p = u16s(&[2, 0]);
    p.extend_from_slice(b"mime");
    p.extend_from_slice(&cstr("pic"));
    p.extend_from_slice(&cstr("image/jpeg"));
    p.extend_from_slice(&cstr("gzip"));
    let v2 = scan(full_box(b"infe", 2, 0, &p)).get(0).unwrap();
    assert_eq!(v2.field("item_id").unwrap(), BoxValue::UInt(2));
    assert_eq!(v2.field("item_type").unwrap(), BoxValue::Text("mime".into()));
    assert_eq!(v2.field("item_name").unwrap(), BoxValue::Text("pic".into()));
    assert_eq!(v2.field("content_type").unwrap(), BoxValue::Text("image/jpeg".into()));
    assert_eq!(v2.field("content_encoding").unwrap(), BoxValue::Text("gzip".into()));

    let mut p = u32s(&[70000]);
    p.extend_from_slice(&u16s(&[1]));
    p.extend_from_slice(b"uri ");
    p.extend_from_slice(&cstr("n"));
    p.extend_from_slice(&cstr("urn:x"));
    let v3 = scan(full_box(b"infe", 3, 0, &p)).get(0).unwrap();
    assert_eq!(v3.field("item_id").unwrap(), BoxValue::UInt(70000));
    assert_eq!(v3.field("item_protection_index").unwrap(), BoxValue::UInt(1));
    assert_eq!(v3.field("item_uri_type").unwrap(), BoxValue::Text("urn:x".into()));

    let mut p = u32s(&[7]);
    p.extend_from_slice(&u16s(&[0]));
    p.extend_from_slice(b"hvc1");
    p.extend_from_slice(&cstr(""));
    let hvc1 = scan(full_box(b"infe", 3, 0, &p)).get(0).unwrap();
    assert_eq!(hvc1.field_names().unwrap(), vec!["item_id", "item_protection_index", "item_type", "item_name"]);
    assert_eq!(hvc1.field("item_name").unwrap(), BoxValue::Text(String::new()));
}

#[test]
fn iinf_children_stop_at_entry_count() {
    let mut infe = u16s(&[1, 0]);
    infe.extend_from_slice(b"hvc1");
    infe.extend_from_slice(&cstr(""));
    let mut p = u16s(&[1]);
    p.extend_from_slice(&full_box(b"infe", 2, 0, &infe));
    p.extend_from_slice(&boxed(b"free", &[]));

    let iinf = scan(full_box(b"iinf", 0, 0, &p)).get(0).unwrap();
    assert_eq!(iinf.field("entry_count").unwrap(), BoxValue::UInt(1));
    let entries = iinf.children().unwrap().expect("entries");
    assert_eq!(entries.len().unwrap(), 1);
    assert_eq!(entries.get(0).unwrap().kind(), KnownBox::ItemInfoEntry);
}

#[test]
fn iref_id_width_follows_version() {
    let v0 = full_box(b"iref", 0, 0, &boxed(b"dimg", &u16s(&[1, 2, 2, 3])));
    let iref = scan(v0).get(0).unwrap();
    let dimg = iref.children().unwrap().expect("refs").get(0).unwrap();
    assert_eq!(dimg.kind(), KnownBox::SingleItemReference);
    assert_eq!(dimg.field("from_item_id").unwrap(), BoxValue::UInt(1));
    assert_eq!(dimg.field("reference_count").unwrap(), BoxValue::UInt(2));
    assert_eq!(dimg.field("to_item_ids").unwrap(), BoxValue::List(vec![BoxValue::UInt(2), BoxValue::UInt(3)]));

    let mut p = u32s(&[70000]);
    p.extend_from_slice(&u16s(&[1]));
    p.extend_from_slice(&u32s(&[70001]));
    let iref = scan(full_box(b"iref", 1, 0, &boxed(b"thmb", &p))).get(0).unwrap();
    let thmb = iref.children().unwrap().expect("refs").get(0).unwrap();
    assert_eq!(thmb.kind(), KnownBox::SingleItemReferenceLarge);
    assert_eq!(thmb.field("from_item_id").unwrap(), BoxValue::UInt(70000));
    assert_eq!(thmb.field("to_item_ids").unwrap(), BoxValue::List(vec![BoxValue::UInt(70001)]));
}

#[test]
fn item_properties_and_relations() {
    let pitm = scan(full_box(b"pitm", 0, 0, &u16s(&[5]))).get(0).unwrap();
    assert_eq!(pitm.field("item_id").unwrap(), BoxValue::UInt(5));
    let pitm = scan(full_box(b"pitm", 1, 0, &u32s(&[70000]))).get(0).unwrap();
    assert_eq!(pitm.field("item_id").unwrap(), BoxValue::UInt(70000));

    let ispe = scan(full_box(b"ispe", 0, 0, &u32s(&[640, 480]))).get(0).unwrap();
    assert_eq!(ispe.field("image_width").unwrap(), BoxValue::UInt(640));
    assert_eq!(ispe.field("image_height").unwrap(), BoxValue::UInt(480));

    let mut p = b"mdir".to_vec();
    p.extend_from_slice(b"mp7t");
    p.push(2);
    let mere = scan(full_box(b"mere", 0, 0, &p)).get(0).unwrap();
    assert_eq!(mere.field("first_metabox_handler_type").unwrap(), BoxValue::Text("mdir".into()));
    assert_eq!(mere.field("second_metabox_handler_type").unwrap(), BoxValue::Text("mp7t".into()));
    assert_eq!(mere.field("metabox_relation").unwrap(), BoxValue::UInt(2));
}

#[test]
fn scheme_boxes() {
    let frma = scan(boxed(b"frma", b"avc1")).get(0).unwrap();
    assert_eq!(frma.field("data_format").unwrap(), BoxValue::Text("avc1".into()));

    let mut p = b"cenc".to_vec();
    p.extend_from_slice(&u32s(&[0x0001_0000]));
    p.extend_from_slice(&cstr("http://x"));
    let schm = scan(full_box(b"schm", 0, 1, &p)).get(0).unwrap();
    assert_eq!(schm.field("scheme_type").unwrap(), BoxValue::Text("cenc".into()));
    assert_eq!(schm.field("scheme_version").unwrap(), BoxValue::UInt(0x0001_0000));
    assert_eq!(schm.field("scheme_uri").unwrap(), BoxValue::Text("http://x".into()));

    let mut p = b"cbcs".to_vec();
    p.extend_from_slice(&u32s(&[1]));
    let schm = scan(full_box(b"schm", 0, 0, &p)).get(0).unwrap();
    assert_eq!(schm.field("scheme_uri").unwrap(), BoxValue::None);
    assert_eq!(schm.field_extent("scheme_uri").unwrap(), None);
}

#[test]
fn user_data_boxes() {
    let mut p = u16s(&[0x15C7]);
    p.extend_from_slice(&cstr("(c) me"));
    let cprt = scan(full_box(b"cprt", 0, 0, &p)).get(0).unwrap();
    assert_eq!(cprt.field("language").unwrap(), BoxValue::Text("eng".into()));
    assert_eq!(cprt.field("notice").unwrap(), BoxValue::Text("(c) me".into()));

    let mut p = u32s(&[3]);
    p.extend_from_slice(b"langbitr");
    let tsel = scan(full_box(b"tsel", 0, 0, &p)).get(0).unwrap();
    assert_eq!(tsel.field("switch_group").unwrap(), BoxValue::Int(3));
    assert_eq!(
        tsel.field("attribute_list").unwrap(),
        BoxValue::List(vec![BoxValue::Text("lang".into()), BoxValue::Text("bitr".into())])
    );

    let mut p = cstr("urn:mpeg:dash:role:2011");
    p.extend_from_slice(&cstr("main"));
    let kind = scan(full_box(b"kind", 0, 0, &p)).get(0).unwrap();
    assert_eq!(kind.field("scheme_uri").unwrap(), BoxValue::Text("urn:mpeg:dash:role:2011".into()));
    assert_eq!(kind.field("value").unwrap(), BoxValue::Text("main".into()));
}

#[test]
fn urn_name_and_optional_location() {
    let mut p = cstr("urn:a");
    p.extend_from_slice(&cstr("loc"));
    let urn = scan(full_box(b"urn ", 0, 0, &p)).get(0).unwrap();
    assert_eq!(urn.field("name").unwrap(), BoxValue::Text("urn:a".into()));
    assert_eq!(urn.field("location").unwrap(), BoxValue::Text("loc".into()));
    assert_eq!(urn.field_extent("location").unwrap(), Some(18..21));

    let urn = scan(full_box(b"urn ", 0, 0, &cstr("urn:a"))).get(0).unwrap();
    assert_eq!(urn.field("location").unwrap(), BoxValue::None);
}
