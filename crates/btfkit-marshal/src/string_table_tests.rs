use crate::{MarshalError, StringTable};

#[test]
fn empty_string_is_offset_zero() {
    let mut table = StringTable::new();
    assert_eq!(table.len(), 1);
    assert!(!table.is_empty());
    assert_eq!(table.add("").unwrap(), 0);
    assert_eq!(table.as_bytes(), b"\0");
}

#[test]
fn add_deduplicates() {
    let mut table = StringTable::new();
    assert_eq!(table.add("foo").unwrap(), 1);
    assert_eq!(table.add("bar").unwrap(), 5);
    assert_eq!(table.add("foo").unwrap(), 1);
    assert_eq!(table.as_bytes(), b"\0foo\0bar\0");
}

#[test]
fn suffixes_are_separate_entries() {
    let mut table = StringTable::new();
    table.add("foobar").unwrap();
    assert_eq!(table.add("bar").unwrap(), 8);
}

#[test]
fn rejects_nul() {
    let mut table = StringTable::new();
    assert_eq!(
        table.add("a\0b"),
        Err(MarshalError::StringContainsNul("a\0b".to_owned()))
    );
    assert_eq!(table.len(), 1);
}

#[test]
fn name_offset_overflow() {
    let mut table = StringTable::new();
    // Fills the section to exactly MAX_NAME_OFFSET bytes.
    let long = "a".repeat(0x00ff_fffd);
    assert_eq!(table.add(&long).unwrap(), 1);
    assert_eq!(table.len(), 0x00ff_ffff);
    assert_eq!(table.add("b"), Err(MarshalError::NameOffsetOverflow));
    // Existing strings stay reachable.
    assert_eq!(table.add(&long).unwrap(), 1);
}

#[test]
fn string_ending_past_limit() {
    let mut table = StringTable::new();
    let long = "a".repeat(0x00ff_fffe);
    assert_eq!(table.add(&long), Err(MarshalError::NameOffsetOverflow));
    assert_eq!(table.len(), 1);
}
