//! Address-range lookup and address-to-source composition.

mod common;

use objscope_dwarf::constants::*;
use objscope_dwarf::{last_error_kind, ErrorKind};

use common::fixture;

#[test]
fn address_resolves_to_unit_and_source() {
    let f = fixture();
    let dwarf = f.dwarf();

    // Address to unit root.
    let cu_die = dwarf.die_for_address(0x40_0540).unwrap();
    assert_eq!(cu_die.tag(), DW_TAG_compile_unit);
    assert_eq!(cu_die.name().unwrap().unwrap(), b"hello.c");

    // Unit root to line record.
    let table = cu_die.unit().line_table(&dwarf).unwrap();
    let row = table.row_for_address(0x40_0540).unwrap();
    assert_eq!(row.line(), 5);
    assert!(row.is_statement());
    assert_eq!(table.file(row.file_index()).unwrap().name(), b"hello.c");

    // The second unit's ranges resolve to it.
    let aux = dwarf.die_for_address(0x40_0590).unwrap();
    assert_eq!(aux.unit().offset(), f.cu2);
    assert_eq!(aux.name().unwrap().unwrap(), b"aux.c");
}

#[test]
fn unknown_address_is_no_match() {
    let f = fixture();
    let dwarf = f.dwarf();

    let err = dwarf.die_for_address(0xdead_beef).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
    assert_eq!(last_error_kind(), Some(ErrorKind::NoMatch));
}

#[test]
fn entry_boundaries() {
    let f = fixture();
    let dwarf = f.dwarf();
    let aranges = dwarf.aranges().unwrap();

    assert_eq!(aranges.entries().len(), 2);
    assert!(aranges
        .entries()
        .windows(2)
        .all(|w| w[0].address() <= w[1].address()));

    for entry in aranges.entries() {
        assert!(entry.length() > 0);
        let first = entry.address();
        let last = entry.address() + entry.length() - 1;
        assert_eq!(aranges.find(first).unwrap(), entry);
        assert_eq!(aranges.find(last).unwrap(), entry);
        assert!(entry.contains(first));
        assert!(entry.contains(last));
        assert!(!entry.contains(last + 1));

        match aranges.find(entry.address() + entry.length()) {
            Ok(next) => assert_ne!(next, entry),
            Err(err) => assert_eq!(err.kind(), ErrorKind::NoMatch),
        }
    }
}

#[test]
fn index_is_decoded_once() {
    let f = fixture();
    let dwarf = f.dwarf();

    let first = dwarf.aranges().unwrap();
    let second = dwarf.aranges().unwrap();
    assert!(std::ptr::eq(first, second));
}
