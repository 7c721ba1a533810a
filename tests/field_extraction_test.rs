//! Integration tests for field extraction

use memory_probe::config::reference_fields;
use memory_probe::{
    extract, resolve_chain, Address, FieldSpec, FieldTable, FieldValue, MemoryImage,
    PointerChain, PointerWidth,
};
use pretty_assertions::assert_eq;

#[test]
fn test_end_to_end_example() {
    let mut image = MemoryImage::new();
    image.write_pointer(Address::new(0x1020), Address::new(0x2000), PointerWidth::Eight);
    image.write_pointer(Address::new(0x2008), Address::new(0x3000), PointerWidth::Eight);
    image.write_i32(Address::new(0x3004), 77);

    let chain = PointerChain::from_raw(&[0x20, 0x8], PointerWidth::Eight).unwrap();
    let table = FieldTable::new(vec![FieldSpec::i32("hp", 0x4)]).unwrap();

    let base = resolve_chain(&image, Address::new(0x1000), &chain).unwrap();
    let snapshot = extract(&image, base, &table);

    assert_eq!(snapshot.base, Address::new(0x3000));
    assert_eq!(snapshot.get("hp"), Some(FieldValue::I32(77)));
    assert!(snapshot.is_valid("hp"));
    assert!(snapshot.is_complete());
}

#[test]
fn test_reference_table_reads_all_fields() {
    let values = [
        ("maxHP", 60),
        ("currentHP", 42),
        ("class", 2),
        ("mana", 3),
        ("experience", 1250),
        ("money", 99),
        ("cardDraws", 5),
        ("level", 7),
        ("actionPoints", 4),
    ];

    let table = FieldTable::new(reference_fields()).unwrap();
    let mut image = MemoryImage::new();
    image.map_zeroed(Address::new(0x5000), 0x40);
    for (field, (name, value)) in table.fields().iter().zip(values) {
        assert_eq!(field.name, name);
        image.write_i32(
            Address::new(0x5000 + field.offset.value() as usize),
            value,
        );
    }

    let snapshot = extract(&image, Address::new(0x5000), &table);
    let read: Vec<(String, Option<FieldValue>)> = snapshot
        .fields
        .iter()
        .map(|r| (r.name.clone(), r.value))
        .collect();
    let expected: Vec<(String, Option<FieldValue>)> = values
        .iter()
        .map(|&(name, value)| (name.to_string(), Some(FieldValue::I32(value))))
        .collect();

    assert_eq!(read, expected);
    assert!(snapshot.is_complete());
}

#[test]
fn test_one_unreadable_field_only_affects_itself() {
    let table = FieldTable::new(reference_fields()).unwrap();

    for broken in 0..table.len() {
        let mut image = MemoryImage::new();
        image.map_zeroed(Address::new(0x5000), 0x40);
        for (i, field) in table.fields().iter().enumerate() {
            image.write_i32(
                Address::new(0x5000 + field.offset.value() as usize),
                i as i32 + 100,
            );
        }
        let broken_offset = table.fields()[broken].offset.value() as usize;
        image.deny(Address::new(0x5000 + broken_offset), 4);

        let snapshot = extract(&image, Address::new(0x5000), &table);
        assert!(!snapshot.is_complete());

        for (i, reading) in snapshot.fields.iter().enumerate() {
            if i == broken {
                assert_eq!(reading.value, None);
                assert!(reading.error.is_some());
            } else {
                assert_eq!(reading.value, Some(FieldValue::I32(i as i32 + 100)));
            }
        }
        assert_eq!(snapshot.failed_fields().count(), 1);
    }
}

#[test]
fn test_fields_in_table_order() {
    let table = FieldTable::new(vec![
        FieldSpec::i32("b", 0x8),
        FieldSpec::i32("a", 0x0),
    ])
    .unwrap();
    let mut image = MemoryImage::new();
    image.map_zeroed(Address::new(0x100), 0x10);

    let snapshot = extract(&image, Address::new(0x100), &table);
    let names: Vec<&str> = snapshot.fields.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(
        image.read_log(),
        vec![Address::new(0x108), Address::new(0x100)]
    );
}
