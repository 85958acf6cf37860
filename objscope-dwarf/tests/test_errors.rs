//! Failure behavior: corrupt entries, truncation, schema mismatches.

mod common;

use objscope_dwarf::constants::*;
use objscope_dwarf::{
    last_error_kind, Dwarf, DwarfSections, Endianness, ErrorKind, FallibleIterator,
};

use common::{cstr, fixture, u16le, u32le, uleb};

/// Starts a DWARF32 version-3 unit header, returning its offset for
/// [`finish_unit`].
fn start_unit(info: &mut Vec<u8>) -> usize {
    let start = info.len();
    u32le(info, 0); // length, patched later
    u16le(info, 3); // version
    u32le(info, 0); // abbreviation offset
    info.push(8); // address size
    start
}

fn finish_unit(info: &mut Vec<u8>, start: usize) {
    let length = (info.len() - start - 4) as u32;
    info[start..start + 4].copy_from_slice(&length.to_le_bytes());
}

fn abbrev_decl(buf: &mut Vec<u8>, code: u64, tag: u32, children: bool, attrs: &[(u32, u32)]) {
    uleb(buf, code);
    uleb(buf, u64::from(tag));
    buf.push(u8::from(children));
    for &(name, form) in attrs {
        uleb(buf, u64::from(name));
        uleb(buf, u64::from(form));
    }
    buf.extend([0, 0]);
}

fn dwarf_over<'a>(info: &'a [u8], abbrev: &'a [u8]) -> Dwarf<'a> {
    Dwarf::new(
        DwarfSections {
            debug_info: Some(info),
            debug_abbrev: Some(abbrev),
            ..DwarfSections::default()
        },
        Endianness::Little,
    )
}

#[test]
fn mispointed_cursor_reports_invalid_tag() {
    let f = fixture();
    let dwarf = f.dwarf();

    // One past the entry start lands inside its attribute bytes.
    let bogus = dwarf.die_at(f.main_die + 1).unwrap();
    assert_eq!(bogus.tag(), DW_TAG_invalid);
    assert_eq!(last_error_kind(), Some(ErrorKind::InvalidDwarf));
    // The cursor remembers the failure.
    assert_eq!(bogus.tag(), DW_TAG_invalid);
    assert_eq!(bogus.attrs().unwrap_err().kind(), ErrorKind::InvalidDwarf);
    assert_eq!(
        bogus.first_child().unwrap_err().kind(),
        ErrorKind::InvalidDwarf
    );

    // The unit's abbreviation table survives the miss.
    let main = dwarf.die_at(f.main_die).unwrap();
    assert_eq!(main.tag(), DW_TAG_subprogram);
}

#[test]
fn offsets_outside_every_unit_are_invalid() {
    let f = fixture();
    let dwarf = f.dwarf();
    let err = dwarf.die_at(f.debug_info.len() as u64 + 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDwarf);
}

#[test]
fn truncated_unit_header_poisons_enumeration() {
    let f = fixture();
    let truncated = &f.debug_info[..f.debug_info.len() - 6];
    let dwarf = dwarf_over(truncated, &f.debug_abbrev);

    let mut units = dwarf.units();
    assert!(units.next().unwrap().is_some());
    assert_eq!(units.next().unwrap_err().kind(), ErrorKind::InvalidDwarf);

    // Enumeration stays failed instead of rescanning.
    let mut again = dwarf.units();
    assert!(again.next().unwrap().is_some());
    assert_eq!(again.next().unwrap_err().kind(), ErrorKind::InvalidDwarf);
}

#[test]
fn unsupported_version_is_invalid() {
    let f = fixture();
    let mut patched = f.debug_info.clone();
    patched[4..6].copy_from_slice(&99u16.to_le_bytes());
    let dwarf = dwarf_over(&patched, &f.debug_abbrev);
    assert_eq!(
        dwarf.units().next().unwrap_err().kind(),
        ErrorKind::InvalidDwarf
    );
}

#[test]
fn schema_mismatches_name_the_missing_class() {
    let f = fixture();
    let dwarf = f.dwarf();
    let main = dwarf.die_at(f.main_die).unwrap();

    let name = main.attr(DW_AT_name).unwrap().unwrap();
    assert_eq!(name.address().unwrap_err().kind(), ErrorKind::NoAddress);
    assert_eq!(name.udata().unwrap_err().kind(), ErrorKind::NoConstant);
    assert_eq!(name.flag().unwrap_err().kind(), ErrorKind::NoFlag);
    assert_eq!(name.block().unwrap_err().kind(), ErrorKind::NoBlock);
    assert_eq!(name.reference().unwrap_err().kind(), ErrorKind::NoReference);

    let low_pc = main.attr(DW_AT_low_pc).unwrap().unwrap();
    assert_eq!(low_pc.string().unwrap_err().kind(), ErrorKind::NoString);
    assert_eq!(low_pc.udata().unwrap_err().kind(), ErrorKind::NoConstant);
    assert_eq!(low_pc.address().unwrap(), 0x40_0540);
}

#[test]
fn unit_local_references_reject_ref_addr() {
    let mut abbrev = Vec::new();
    abbrev_decl(
        &mut abbrev,
        1,
        DW_TAG_compile_unit,
        true,
        &[(DW_AT_name, DW_FORM_string)],
    );
    abbrev_decl(
        &mut abbrev,
        2,
        DW_TAG_subprogram,
        false,
        &[(DW_AT_name, DW_FORM_string)],
    );
    abbrev_decl(
        &mut abbrev,
        3,
        DW_TAG_subprogram,
        false,
        &[(DW_AT_specification, DW_FORM_ref_addr)],
    );
    uleb(&mut abbrev, 0);

    let mut info = Vec::new();
    // Unit 1 declares the target.
    let unit1 = start_unit(&mut info);
    uleb(&mut info, 1);
    cstr(&mut info, b"a.c");
    let target = info.len() as u64;
    uleb(&mut info, 2);
    cstr(&mut info, b"target");
    info.push(0);
    finish_unit(&mut info, unit1);

    // Unit 2 refers to it across units.
    let unit2 = start_unit(&mut info);
    uleb(&mut info, 1);
    cstr(&mut info, b"b.c");
    let referrer = info.len() as u64;
    uleb(&mut info, 3);
    u32le(&mut info, target as u32);
    info.push(0);
    finish_unit(&mut info, unit2);

    let dwarf = dwarf_over(&info, &abbrev);
    let die = dwarf.die_at(referrer).unwrap();
    let spec = die.attr(DW_AT_specification).unwrap().unwrap();

    // Unit-local decoding refuses the global form ...
    assert_eq!(
        spec.reference().unwrap_err().kind(),
        ErrorKind::InvalidReference
    );
    assert_eq!(
        spec.reference_die().unwrap_err().kind(),
        ErrorKind::InvalidReference
    );

    // ... while integration follows it across the unit boundary.
    let name = die.attr_integrate(DW_AT_name).unwrap().unwrap();
    assert_eq!(name.string().unwrap(), b"target");
}

#[test]
fn block_running_past_the_unit_is_invalid() {
    let mut abbrev = Vec::new();
    abbrev_decl(
        &mut abbrev,
        1,
        DW_TAG_variable,
        false,
        &[(DW_AT_const_value, DW_FORM_block1)],
    );
    uleb(&mut abbrev, 0);

    let mut info = Vec::new();
    let unit = start_unit(&mut info);
    uleb(&mut info, 1);
    info.push(0xff); // block length far past the unit end
    info.extend([1, 2]);
    finish_unit(&mut info, unit);

    let dwarf = dwarf_over(&info, &abbrev);
    let die = dwarf.die_at(11).unwrap();
    assert_eq!(die.tag(), DW_TAG_variable);
    assert_eq!(
        dwarf
            .die_at(11)
            .unwrap()
            .attrs()
            .unwrap()
            .next()
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidDwarf
    );
}

#[test]
fn sibling_attribute_shortcuts_the_walk() {
    let mut abbrev = Vec::new();
    abbrev_decl(
        &mut abbrev,
        1,
        DW_TAG_compile_unit,
        true,
        &[(DW_AT_name, DW_FORM_string)],
    );
    abbrev_decl(
        &mut abbrev,
        2,
        DW_TAG_subprogram,
        false,
        &[(DW_AT_sibling, DW_FORM_ref4), (DW_AT_name, DW_FORM_string)],
    );
    uleb(&mut abbrev, 0);

    let mut info = Vec::new();
    let unit = start_unit(&mut info);
    uleb(&mut info, 1);
    cstr(&mut info, b"s.c");

    let first = info.len();
    uleb(&mut info, 2);
    let first_sibling_slot = info.len();
    u32le(&mut info, 0); // patched below
    cstr(&mut info, b"one");

    // Garbage between the siblings that only the shortcut can cross.
    info.extend([0xab, 0xcd, 0xef]);

    let second = info.len();
    uleb(&mut info, 2);
    let second_sibling_slot = info.len();
    u32le(&mut info, 0); // patched below
    cstr(&mut info, b"two");

    let terminator = info.len();
    info.push(0);
    finish_unit(&mut info, unit);

    info[first_sibling_slot..first_sibling_slot + 4]
        .copy_from_slice(&(second as u32).to_le_bytes());
    info[second_sibling_slot..second_sibling_slot + 4]
        .copy_from_slice(&(terminator as u32).to_le_bytes());

    let dwarf = dwarf_over(&info, &abbrev);
    let one = dwarf.die_at(first as u64).unwrap();
    assert_eq!(one.name().unwrap().unwrap(), b"one");

    let two = one.next_sibling().unwrap();
    assert_eq!(two.offset(), second as u64);
    assert_eq!(two.name().unwrap().unwrap(), b"two");

    // Its sibling reference points at the chain terminator.
    assert_eq!(two.next_sibling().unwrap_err().kind(), ErrorKind::NoEntry);
}
