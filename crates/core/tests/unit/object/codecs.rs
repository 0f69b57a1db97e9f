use blitz_core::object::codec::{Reader, Writer};
use blitz_core::object::{
    EXECUTABLE_MAGIC, Executable, ExecutableLabel, FormatError, LabelRecord, OBJECT_MAGIC,
    ObjectFile, RelativeTo, RelocationKind, RelocationRecord, SEPARATOR, Segment, SymbolRecord,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample_object() -> ObjectFile {
    ObjectFile {
        has_entry: true,
        text: vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88],
        data: b"hi\0\0".to_vec(),
        bss_size: 64,
        symbols: vec![
            SymbolRecord {
                number: 4,
                value: 4,
                relative_to: RelativeTo::Segment(Segment::Text),
                name: "main".into(),
            },
            SymbolRecord {
                number: 5,
                value: 0,
                relative_to: RelativeTo::Imported,
                name: "printf".into(),
            },
            SymbolRecord {
                number: 6,
                value: 8,
                relative_to: RelativeTo::Symbol(4),
                name: "after_main".into(),
            },
        ],
        relocations: vec![RelocationRecord {
            kind: RelocationKind::PcRelative24,
            location: 4,
            segment: Segment::Text,
            offset: 0,
            relative_to: 5,
            source_line: 12,
        }],
        labels: vec![LabelRecord {
            relative_to: 1,
            value: 4,
            name: "main".into(),
        }],
    }
}

#[test]
fn test_object_header_layout() {
    let bytes = sample_object().encode();
    let mut r = Reader::new(&bytes);
    assert_eq!(r.word().unwrap(), OBJECT_MAGIC);
    assert_eq!(r.word().unwrap(), 1);
    assert_eq!(r.word().unwrap(), 8);
    assert_eq!(r.word().unwrap(), 4);
    assert_eq!(r.word().unwrap(), 64);
    r.bytes(8).unwrap();
    assert_eq!(r.word().unwrap(), SEPARATOR);
}

#[test]
fn test_object_survives_encoding() {
    let obj = sample_object();
    assert_eq!(ObjectFile::decode(&obj.encode()).unwrap(), obj);
}

#[test]
fn test_empty_object_is_five_separated_sections() {
    let bytes = ObjectFile::default().encode();
    // header, two empty segments, three zero-terminated tables
    assert_eq!(bytes.len(), 4 * (5 + 2 + 3 * 2));
}

#[test]
fn test_wrong_magic() {
    let mut bytes = sample_object().encode();
    bytes[3] ^= 0xFF;
    assert!(matches!(
        ObjectFile::decode(&bytes),
        Err(FormatError::BadMagic { expected: OBJECT_MAGIC, .. })
    ));
    assert!(matches!(
        Executable::decode(&sample_object().encode()),
        Err(FormatError::BadMagic { expected: EXECUTABLE_MAGIC, found: OBJECT_MAGIC })
    ));
}

#[test]
fn test_truncated_file() {
    let bytes = sample_object().encode();
    let cut = &bytes[..bytes.len() - 1];
    assert!(matches!(
        ObjectFile::decode(cut),
        Err(FormatError::Truncated { offset }) if offset == bytes.len() - 4
    ));
}

#[test]
fn test_missing_separator_after_text() {
    let mut bytes = sample_object().encode();
    let at = 20 + 8;
    bytes[at] = 0;
    assert!(matches!(
        ObjectFile::decode(&bytes),
        Err(FormatError::MissingSeparator { offset }) if offset == at
    ));
}

#[test]
fn test_trailing_bytes() {
    let mut bytes = sample_object().encode();
    bytes.extend_from_slice(&[0; 4]);
    assert!(matches!(
        ObjectFile::decode(&bytes),
        Err(FormatError::TrailingData(4))
    ));
}

#[test]
fn test_unknown_relocation_type() {
    let mut w = Writer::new();
    w.word(OBJECT_MAGIC).word(0).word(0).word(0).word(0);
    w.separator().separator();
    w.word(0).separator();
    w.word(9).word(0).word(1).word(0).word(0).word(1);
    assert!(matches!(
        ObjectFile::decode(&w.finish()),
        Err(FormatError::BadRelocationType(9))
    ));
}

#[test]
fn test_relocation_in_bss_is_rejected() {
    let mut obj = sample_object();
    obj.relocations[0].segment = Segment::Bss;
    assert!(matches!(
        ObjectFile::decode(&obj.encode()),
        Err(FormatError::BadSegment(3))
    ));
}

#[test]
fn test_relative_to_words() {
    assert_eq!(RelativeTo::from_word(0), RelativeTo::Absolute);
    assert_eq!(RelativeTo::from_word(2), RelativeTo::Segment(Segment::Data));
    assert_eq!(RelativeTo::from_word(7), RelativeTo::Symbol(7));
    assert_eq!(RelativeTo::from_word(u32::MAX), RelativeTo::Imported);
    assert_eq!(RelativeTo::Segment(Segment::Bss).to_word(), 3);
}

#[test]
fn test_executable_file_round_trip_through_disk() {
    let exe = Executable {
        text_addr: 0,
        data_addr: 0x2000,
        bss_addr: 0x4000,
        text: vec![0; 12],
        data: vec![1, 2, 3, 4],
        bss_size: 100,
        labels: vec![ExecutableLabel {
            name: "_entry".into(),
            value: 0,
        }],
    };
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.out");
    exe.write_to(&path).unwrap();
    assert_eq!(Executable::read_from(&path).unwrap(), exe);
    assert_eq!(exe.end_address(), 0x4000 + 100);
}

#[test]
fn test_object_read_from_missing_file() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        ObjectFile::read_from(dir.path().join("nope.o")),
        Err(FormatError::Io(_))
    ));
}
