//! A synthetic little-endian DWARF32 fixture.
//!
//! Builds the debug sections of an imaginary program with two compilation
//! units, a small scope tree, an inlined function, line programs, address
//! ranges, a name index and macro records. Offsets of interesting entries
//! are recorded while the bytes are laid down, so tests never hard-code
//! positions.

#![allow(dead_code)]

use objscope_dwarf::constants::*;
use objscope_dwarf::{Dwarf, DwarfSections, Endianness};

pub fn uleb(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

pub fn sleb(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let sign = byte & 0x40 != 0;
        if (value == 0 && !sign) || (value == -1 && sign) {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

pub fn u16le(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn u32le(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn u64le(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn cstr(buf: &mut Vec<u8>, s: &[u8]) {
    buf.extend_from_slice(s);
    buf.push(0);
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

/// One version-2 line program: a `set_address`, one `copy` row per step,
/// then an `end_sequence` after a final advance.
fn line_program(file: &[u8], start: u64, steps: &[(u64, i64)], end_advance: u64) -> Vec<u8> {
    let mut tables = Vec::new();
    tables.push(1); // minimum instruction length
    tables.push(1); // default is_stmt
    tables.push((-5i8) as u8); // line base
    tables.push(14); // line range
    tables.push(13); // opcode base
    tables.extend([0u8, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]); // standard arg counts
    tables.push(0); // empty directory table
    cstr(&mut tables, file);
    uleb(&mut tables, 0); // directory
    uleb(&mut tables, 0); // mtime
    uleb(&mut tables, 0); // length
    tables.push(0); // end of file table

    let mut program = Vec::new();
    program.push(0);
    uleb(&mut program, 9); // opcode + 8 address bytes
    program.push(DW_LNE_set_address);
    u64le(&mut program, start);
    for &(pc_advance, line_advance) in steps {
        if pc_advance != 0 {
            program.push(DW_LNS_advance_pc);
            uleb(&mut program, pc_advance);
        }
        if line_advance != 0 {
            program.push(DW_LNS_advance_line);
            sleb(&mut program, line_advance);
        }
        program.push(DW_LNS_copy);
    }
    program.push(DW_LNS_advance_pc);
    uleb(&mut program, end_advance);
    program.push(0);
    uleb(&mut program, 1);
    program.push(DW_LNE_end_sequence);

    let mut unit = Vec::new();
    u16le(&mut unit, 2); // line program version
    u32le(&mut unit, tables.len() as u32);
    unit.extend_from_slice(&tables);
    unit.extend_from_slice(&program);

    let mut out = Vec::new();
    u32le(&mut out, unit.len() as u32);
    out.extend_from_slice(&unit);
    out
}

fn aranges_contribution(unit_offset: u32, tuples: &[(u64, u64)]) -> Vec<u8> {
    let mut body = Vec::new();
    u16le(&mut body, 2);
    u32le(&mut body, unit_offset);
    body.push(8); // address size
    body.push(0); // segment size
    body.extend([0u8; 4]); // pad the 12 header bytes to the 16-byte tuple
    for &(addr, len) in tuples {
        u64le(&mut body, addr);
        u64le(&mut body, len);
    }
    u64le(&mut body, 0);
    u64le(&mut body, 0);

    let mut out = Vec::new();
    u32le(&mut out, body.len() as u32);
    out.extend_from_slice(&body);
    out
}

fn pubnames_set(unit_offset: u32, unit_length: u32, names: &[(u32, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    u16le(&mut body, 2);
    u32le(&mut body, unit_offset);
    u32le(&mut body, unit_length);
    for &(offset, name) in names {
        u32le(&mut body, offset);
        cstr(&mut body, name);
    }
    u32le(&mut body, 0);

    let mut out = Vec::new();
    u32le(&mut out, body.len() as u32);
    out.extend_from_slice(&body);
    out
}

/// The assembled sections plus the offsets recorded while building them.
pub struct Fixture {
    pub debug_info: Vec<u8>,
    pub debug_abbrev: Vec<u8>,
    pub debug_str: Vec<u8>,
    pub debug_line: Vec<u8>,
    pub debug_aranges: Vec<u8>,
    pub debug_pubnames: Vec<u8>,
    pub debug_macinfo: Vec<u8>,

    pub cu1: u64,
    pub cu2: u64,
    pub int_type: u64,
    pub main_die: u64,
    pub argc: u64,
    pub block: u64,
    pub tmp_var: u64,
    pub abstract_die: u64,
    pub caller: u64,
    pub inline_copy: u64,
    pub global_var: u64,
    pub helper: u64,
}

impl Fixture {
    pub fn sections(&self) -> DwarfSections<'_> {
        DwarfSections {
            debug_info: Some(&self.debug_info),
            debug_abbrev: Some(&self.debug_abbrev),
            debug_str: Some(&self.debug_str),
            debug_line: Some(&self.debug_line),
            debug_aranges: Some(&self.debug_aranges),
            debug_pubnames: Some(&self.debug_pubnames),
            debug_macinfo: Some(&self.debug_macinfo),
        }
    }

    pub fn dwarf(&self) -> Dwarf<'_> {
        Dwarf::new(self.sections(), Endianness::Little)
    }
}

pub fn fixture() -> Fixture {
    // Abbreviations, one table at offset 0 shared by both units.
    let mut abbrev = Vec::new();
    abbrev_decl(
        &mut abbrev,
        1,
        DW_TAG_compile_unit,
        true,
        &[
            (DW_AT_name, DW_FORM_strp),
            (DW_AT_comp_dir, DW_FORM_strp),
            (DW_AT_language, DW_FORM_data1),
            (DW_AT_low_pc, DW_FORM_addr),
            (DW_AT_high_pc, DW_FORM_addr),
            (DW_AT_stmt_list, DW_FORM_sec_offset),
            (DW_AT_macro_info, DW_FORM_sec_offset),
        ],
    );
    abbrev_decl(
        &mut abbrev,
        2,
        DW_TAG_subprogram,
        true,
        &[
            (DW_AT_name, DW_FORM_string),
            (DW_AT_decl_file, DW_FORM_data1),
            (DW_AT_decl_line, DW_FORM_data1),
            (DW_AT_low_pc, DW_FORM_addr),
            (DW_AT_high_pc, DW_FORM_addr),
        ],
    );
    abbrev_decl(
        &mut abbrev,
        3,
        DW_TAG_base_type,
        false,
        &[
            (DW_AT_name, DW_FORM_string),
            (DW_AT_encoding, DW_FORM_data1),
            (DW_AT_byte_size, DW_FORM_data1),
        ],
    );
    abbrev_decl(
        &mut abbrev,
        4,
        DW_TAG_variable,
        false,
        &[(DW_AT_name, DW_FORM_string), (DW_AT_type, DW_FORM_ref4)],
    );
    abbrev_decl(
        &mut abbrev,
        5,
        DW_TAG_lexical_block,
        true,
        &[(DW_AT_low_pc, DW_FORM_addr), (DW_AT_high_pc, DW_FORM_addr)],
    );
    abbrev_decl(
        &mut abbrev,
        6,
        DW_TAG_subprogram,
        false,
        &[(DW_AT_name, DW_FORM_string), (DW_AT_inline, DW_FORM_data1)],
    );
    abbrev_decl(
        &mut abbrev,
        7,
        DW_TAG_inlined_subroutine,
        false,
        &[
            (DW_AT_abstract_origin, DW_FORM_ref4),
            (DW_AT_low_pc, DW_FORM_addr),
            (DW_AT_high_pc, DW_FORM_addr),
        ],
    );
    abbrev_decl(
        &mut abbrev,
        8,
        DW_TAG_formal_parameter,
        false,
        &[(DW_AT_name, DW_FORM_string), (DW_AT_type, DW_FORM_ref4)],
    );
    abbrev_decl(
        &mut abbrev,
        9,
        DW_TAG_subprogram,
        false,
        &[
            (DW_AT_name, DW_FORM_string),
            (DW_AT_low_pc, DW_FORM_addr),
            (DW_AT_high_pc, DW_FORM_addr),
            (DW_AT_decl_file, DW_FORM_data1),
            (DW_AT_decl_line, DW_FORM_data1),
        ],
    );
    abbrev_decl(
        &mut abbrev,
        10,
        DW_TAG_compile_unit,
        true,
        &[
            (DW_AT_name, DW_FORM_string),
            (DW_AT_stmt_list, DW_FORM_data4),
            (DW_AT_low_pc, DW_FORM_addr),
            (DW_AT_high_pc, DW_FORM_addr),
        ],
    );
    uleb(&mut abbrev, 0);

    // String pool.
    let mut debug_str = Vec::new();
    let str_hello = debug_str.len() as u32;
    cstr(&mut debug_str, b"hello.c");
    let str_comp_dir = debug_str.len() as u32;
    cstr(&mut debug_str, b"/src");

    // Line programs.
    let mut debug_line = line_program(b"hello.c", 0x40_0540, &[(0, 4), (0x10, 1)], 0x10);
    let line2_offset = debug_line.len() as u32;
    debug_line.extend(line_program(b"aux.c", 0x40_0580, &[(0, 2)], 0x20));

    // Macro records.
    let mut debug_macinfo = Vec::new();
    debug_macinfo.push(DW_MACINFO_define);
    uleb(&mut debug_macinfo, 2);
    cstr(&mut debug_macinfo, b"PI 3");
    debug_macinfo.push(DW_MACINFO_start_file);
    uleb(&mut debug_macinfo, 4);
    uleb(&mut debug_macinfo, 1);
    debug_macinfo.push(DW_MACINFO_end_file);
    debug_macinfo.push(DW_MACINFO_undef);
    uleb(&mut debug_macinfo, 8);
    cstr(&mut debug_macinfo, b"PI");
    debug_macinfo.push(0);

    // Unit 1.
    let mut info = Vec::new();
    let cu1 = info.len() as u64;
    u32le(&mut info, 0); // length, patched below
    u16le(&mut info, 4); // version
    u32le(&mut info, 0); // abbreviation offset
    info.push(8); // address size

    uleb(&mut info, 1); // compile_unit
    u32le(&mut info, str_hello);
    u32le(&mut info, str_comp_dir);
    info.push(DW_LANG_C as u8);
    u64le(&mut info, 0x40_0540);
    u64le(&mut info, 0x40_0580);
    u32le(&mut info, 0); // stmt_list
    u32le(&mut info, 0); // macro_info

    let int_type = info.len() as u64;
    uleb(&mut info, 3);
    cstr(&mut info, b"int");
    info.push(DW_ATE_signed as u8);
    info.push(4);

    let main_die = info.len() as u64;
    uleb(&mut info, 2);
    cstr(&mut info, b"main");
    info.push(1); // decl_file
    info.push(5); // decl_line
    u64le(&mut info, 0x40_0540);
    u64le(&mut info, 0x40_0560);
    let argc = info.len() as u64;
    uleb(&mut info, 8);
    cstr(&mut info, b"argc");
    u32le(&mut info, int_type as u32);

    let block = info.len() as u64;
    uleb(&mut info, 5);
    u64le(&mut info, 0x40_0548);
    u64le(&mut info, 0x40_0558);
    let tmp_var = info.len() as u64;
    uleb(&mut info, 4);
    cstr(&mut info, b"tmp");
    u32le(&mut info, int_type as u32);
    info.push(0); // end of block children
    info.push(0); // end of main children

    let abstract_die = info.len() as u64;
    uleb(&mut info, 6);
    cstr(&mut info, b"inline_me");
    info.push(DW_INL_inlined as u8);

    let caller = info.len() as u64;
    uleb(&mut info, 2);
    cstr(&mut info, b"caller");
    info.push(1); // decl_file
    info.push(9); // decl_line
    u64le(&mut info, 0x40_0560);
    u64le(&mut info, 0x40_0580);
    let inline_copy = info.len() as u64;
    uleb(&mut info, 7);
    u32le(&mut info, abstract_die as u32);
    u64le(&mut info, 0x40_0568);
    u64le(&mut info, 0x40_0570);
    info.push(0); // end of caller children

    let global_var = info.len() as u64;
    uleb(&mut info, 4);
    cstr(&mut info, b"global");
    u32le(&mut info, int_type as u32);
    info.push(0); // end of unit children

    let cu1_length = (info.len() - 4) as u32;
    info[0..4].copy_from_slice(&cu1_length.to_le_bytes());

    // Unit 2.
    let cu2 = info.len() as u64;
    let cu2_start = info.len();
    u32le(&mut info, 0); // length, patched below
    u16le(&mut info, 2); // version
    u32le(&mut info, 0); // abbreviation offset
    info.push(8);

    uleb(&mut info, 10); // compile_unit
    cstr(&mut info, b"aux.c");
    u32le(&mut info, line2_offset);
    u64le(&mut info, 0x40_0580);
    u64le(&mut info, 0x40_05a0);
    let helper = info.len() as u64;
    uleb(&mut info, 9);
    cstr(&mut info, b"helper");
    u64le(&mut info, 0x40_0580);
    u64le(&mut info, 0x40_05a0);
    info.push(1); // decl_file
    info.push(3); // decl_line
    info.push(0); // end of unit children

    let cu2_length = (info.len() - cu2_start - 4) as u32;
    info[cu2_start..cu2_start + 4].copy_from_slice(&cu2_length.to_le_bytes());

    // Indexes over both units.
    let mut debug_aranges = aranges_contribution(cu1 as u32, &[(0x40_0540, 0x40)]);
    debug_aranges.extend(aranges_contribution(cu2 as u32, &[(0x40_0580, 0x20)]));

    let mut debug_pubnames = pubnames_set(
        cu1 as u32,
        (cu2 - cu1) as u32,
        &[
            ((main_die - cu1) as u32, b"main"),
            ((caller - cu1) as u32, b"caller"),
        ],
    );
    debug_pubnames.extend(pubnames_set(
        cu2 as u32,
        (info.len() as u64 - cu2) as u32,
        &[((helper - cu2) as u32, b"helper")],
    ));

    Fixture {
        debug_info: info,
        debug_abbrev: abbrev,
        debug_str,
        debug_line,
        debug_aranges,
        debug_pubnames,
        debug_macinfo,
        cu1,
        cu2,
        int_type,
        main_die,
        argc,
        block,
        tmp_var,
        abstract_die,
        caller,
        inline_copy,
        global_var,
        helper,
    }
}
