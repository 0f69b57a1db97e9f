use blitz_core::link::symbols::{SegmentBases, SymbolTable};
use blitz_core::object::{RelativeTo, Segment, SymbolRecord};
use pretty_assertions::assert_eq;

fn record(number: u32, value: u32, relative_to: RelativeTo, name: &str) -> SymbolRecord {
    SymbolRecord {
        number,
        value,
        relative_to,
        name: name.to_string(),
    }
}

fn chain() -> Vec<SymbolRecord> {
    vec![
        record(4, 5, RelativeTo::Symbol(5), "a"),
        record(5, 3, RelativeTo::Symbol(6), "b"),
        record(6, 100, RelativeTo::Absolute, "c"),
    ]
}

#[test]
fn test_chain_resolves_in_either_order() {
    for records in [chain(), chain().into_iter().rev().collect()] {
        let mut table = SymbolTable::new();
        table.add_file("chain.o", SegmentBases::default(), &records);
        table.resolve().unwrap();
        assert_eq!(table.lookup("a"), Some(108));
        assert_eq!(table.lookup("b"), Some(103));
        assert_eq!(table.lookup("c"), Some(100));
    }
}

#[test]
fn test_segment_relative_exports_use_file_bases() {
    let bases = SegmentBases {
        text: 0x40,
        data: 0x2000,
        bss: 0x4000,
    };
    let mut table = SymbolTable::new();
    let f = table.add_file(
        "seg.o",
        bases,
        &[
            record(4, 8, RelativeTo::Segment(Segment::Data), "table"),
            record(5, 0, RelativeTo::Segment(Segment::Bss), "heap"),
        ],
    );
    table.resolve().unwrap();
    assert_eq!(table.lookup("table"), Some(0x2008));
    assert_eq!(table.value_of(f, 4), Some(0x2008));
    assert_eq!(table.value_of(f, 0), Some(0));
    assert_eq!(table.value_of(f, Segment::Text.number()), Some(0x40));
    assert_eq!(table.value_of(f, Segment::Bss.number()), Some(0x4000));
}

#[test]
fn test_import_binds_to_export_of_another_file() {
    let mut table = SymbolTable::new();
    let user = table.add_file("user.o", SegmentBases::default(), &[
        record(4, 0, RelativeTo::Imported, "helper"),
        record(5, 4, RelativeTo::Symbol(4), "after_helper"),
    ]);
    table.add_file(
        "lib.o",
        SegmentBases {
            text: 0x100,
            ..SegmentBases::default()
        },
        &[record(4, 0x10, RelativeTo::Segment(Segment::Text), "helper")],
    );
    table.resolve().unwrap();
    assert_eq!(table.value_of(user, 4), Some(0x110));
    assert_eq!(table.lookup("after_helper"), Some(0x114));
    assert!(table.has_record(user, 5));
    assert!(!table.has_record(user, 6));
}

#[test]
fn test_duplicate_export_is_reported() {
    let mut table = SymbolTable::new();
    table.add_file("one.o", SegmentBases::default(), &[record(4, 1, RelativeTo::Absolute, "x")]);
    table.add_file("two.o", SegmentBases::default(), &[record(4, 2, RelativeTo::Absolute, "x")]);
    let errors = table.resolve().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file, "two.o");
    assert!(errors[0].message.contains("also exported by one.o"));
}

#[test]
fn test_missing_export_is_reported_once() {
    let mut table = SymbolTable::new();
    table.add_file("user.o", SegmentBases::default(), &[
        record(4, 0, RelativeTo::Imported, "nowhere"),
        record(5, 0, RelativeTo::Symbol(4), "derived"),
    ]);
    let errors = table.resolve().unwrap_err();
    let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec![
        "'nowhere' is imported but no file exports it",
        "symbol 'derived' could not be resolved",
    ]);
}

#[test]
fn test_cycle_is_unresolved() {
    let mut table = SymbolTable::new();
    table.add_file("loop.o", SegmentBases::default(), &[
        record(4, 0, RelativeTo::Symbol(5), "p"),
        record(5, 0, RelativeTo::Symbol(4), "q"),
    ]);
    let errors = table.resolve().unwrap_err();
    assert_eq!(errors.len(), 2);
}
