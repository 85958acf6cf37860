//! The raw DWARF vocabulary.
//!
//! Tags, attribute names, forms and opcodes are exposed as plain integer
//! constants rather than closed enums: readers hand back the codes exactly
//! as they appear in the sections, including vendor extensions this crate
//! has never heard of.

#![allow(non_upper_case_globals)]

// DIE tags.
pub const DW_TAG_invalid: u32 = 0x00;
pub const DW_TAG_array_type: u32 = 0x01;
pub const DW_TAG_class_type: u32 = 0x02;
pub const DW_TAG_entry_point: u32 = 0x03;
pub const DW_TAG_enumeration_type: u32 = 0x04;
pub const DW_TAG_formal_parameter: u32 = 0x05;
pub const DW_TAG_imported_declaration: u32 = 0x08;
pub const DW_TAG_label: u32 = 0x0a;
pub const DW_TAG_lexical_block: u32 = 0x0b;
pub const DW_TAG_member: u32 = 0x0d;
pub const DW_TAG_pointer_type: u32 = 0x0f;
pub const DW_TAG_reference_type: u32 = 0x10;
pub const DW_TAG_compile_unit: u32 = 0x11;
pub const DW_TAG_string_type: u32 = 0x12;
pub const DW_TAG_structure_type: u32 = 0x13;
pub const DW_TAG_subroutine_type: u32 = 0x15;
pub const DW_TAG_typedef: u32 = 0x16;
pub const DW_TAG_union_type: u32 = 0x17;
pub const DW_TAG_unspecified_parameters: u32 = 0x18;
pub const DW_TAG_variant: u32 = 0x19;
pub const DW_TAG_common_block: u32 = 0x1a;
pub const DW_TAG_common_inclusion: u32 = 0x1b;
pub const DW_TAG_inheritance: u32 = 0x1c;
pub const DW_TAG_inlined_subroutine: u32 = 0x1d;
pub const DW_TAG_module: u32 = 0x1e;
pub const DW_TAG_ptr_to_member_type: u32 = 0x1f;
pub const DW_TAG_set_type: u32 = 0x20;
pub const DW_TAG_subrange_type: u32 = 0x21;
pub const DW_TAG_with_stmt: u32 = 0x22;
pub const DW_TAG_access_declaration: u32 = 0x23;
pub const DW_TAG_base_type: u32 = 0x24;
pub const DW_TAG_catch_block: u32 = 0x25;
pub const DW_TAG_const_type: u32 = 0x26;
pub const DW_TAG_constant: u32 = 0x27;
pub const DW_TAG_enumerator: u32 = 0x28;
pub const DW_TAG_file_type: u32 = 0x29;
pub const DW_TAG_friend: u32 = 0x2a;
pub const DW_TAG_namelist: u32 = 0x2b;
pub const DW_TAG_namelist_item: u32 = 0x2c;
pub const DW_TAG_packed_type: u32 = 0x2d;
pub const DW_TAG_subprogram: u32 = 0x2e;
pub const DW_TAG_template_type_parameter: u32 = 0x2f;
pub const DW_TAG_template_value_parameter: u32 = 0x30;
pub const DW_TAG_thrown_type: u32 = 0x31;
pub const DW_TAG_try_block: u32 = 0x32;
pub const DW_TAG_variant_part: u32 = 0x33;
pub const DW_TAG_variable: u32 = 0x34;
pub const DW_TAG_volatile_type: u32 = 0x35;
pub const DW_TAG_dwarf_procedure: u32 = 0x36;
pub const DW_TAG_restrict_type: u32 = 0x37;
pub const DW_TAG_interface_type: u32 = 0x38;
pub const DW_TAG_namespace: u32 = 0x39;
pub const DW_TAG_imported_module: u32 = 0x3a;
pub const DW_TAG_unspecified_type: u32 = 0x3b;
pub const DW_TAG_partial_unit: u32 = 0x3c;
pub const DW_TAG_imported_unit: u32 = 0x3d;
pub const DW_TAG_condition: u32 = 0x3f;
pub const DW_TAG_shared_type: u32 = 0x40;
pub const DW_TAG_lo_user: u32 = 0x4080;
pub const DW_TAG_hi_user: u32 = 0xffff;

// Child determination byte in abbreviation declarations.
pub const DW_CHILDREN_no: u8 = 0;
pub const DW_CHILDREN_yes: u8 = 1;

// Attribute names.
pub const DW_AT_sibling: u32 = 0x01;
pub const DW_AT_location: u32 = 0x02;
pub const DW_AT_name: u32 = 0x03;
pub const DW_AT_ordering: u32 = 0x09;
pub const DW_AT_byte_size: u32 = 0x0b;
pub const DW_AT_bit_offset: u32 = 0x0c;
pub const DW_AT_bit_size: u32 = 0x0d;
pub const DW_AT_stmt_list: u32 = 0x10;
pub const DW_AT_low_pc: u32 = 0x11;
pub const DW_AT_high_pc: u32 = 0x12;
pub const DW_AT_language: u32 = 0x13;
pub const DW_AT_discr: u32 = 0x15;
pub const DW_AT_discr_value: u32 = 0x16;
pub const DW_AT_visibility: u32 = 0x17;
pub const DW_AT_import: u32 = 0x18;
pub const DW_AT_string_length: u32 = 0x19;
pub const DW_AT_common_reference: u32 = 0x1a;
pub const DW_AT_comp_dir: u32 = 0x1b;
pub const DW_AT_const_value: u32 = 0x1c;
pub const DW_AT_containing_type: u32 = 0x1d;
pub const DW_AT_default_value: u32 = 0x1e;
pub const DW_AT_inline: u32 = 0x20;
pub const DW_AT_is_optional: u32 = 0x21;
pub const DW_AT_lower_bound: u32 = 0x22;
pub const DW_AT_producer: u32 = 0x25;
pub const DW_AT_prototyped: u32 = 0x27;
pub const DW_AT_return_addr: u32 = 0x2a;
pub const DW_AT_start_scope: u32 = 0x2c;
pub const DW_AT_bit_stride: u32 = 0x2e;
pub const DW_AT_upper_bound: u32 = 0x2f;
pub const DW_AT_abstract_origin: u32 = 0x31;
pub const DW_AT_accessibility: u32 = 0x32;
pub const DW_AT_address_class: u32 = 0x33;
pub const DW_AT_artificial: u32 = 0x34;
pub const DW_AT_base_types: u32 = 0x35;
pub const DW_AT_calling_convention: u32 = 0x36;
pub const DW_AT_count: u32 = 0x37;
pub const DW_AT_data_member_location: u32 = 0x38;
pub const DW_AT_decl_column: u32 = 0x39;
pub const DW_AT_decl_file: u32 = 0x3a;
pub const DW_AT_decl_line: u32 = 0x3b;
pub const DW_AT_declaration: u32 = 0x3c;
pub const DW_AT_discr_list: u32 = 0x3d;
pub const DW_AT_encoding: u32 = 0x3e;
pub const DW_AT_external: u32 = 0x3f;
pub const DW_AT_frame_base: u32 = 0x40;
pub const DW_AT_friend: u32 = 0x41;
pub const DW_AT_identifier_case: u32 = 0x42;
pub const DW_AT_macro_info: u32 = 0x43;
pub const DW_AT_namelist_item: u32 = 0x44;
pub const DW_AT_priority: u32 = 0x45;
pub const DW_AT_segment: u32 = 0x46;
pub const DW_AT_specification: u32 = 0x47;
pub const DW_AT_static_link: u32 = 0x48;
pub const DW_AT_type: u32 = 0x49;
pub const DW_AT_use_location: u32 = 0x4a;
pub const DW_AT_variable_parameter: u32 = 0x4b;
pub const DW_AT_virtuality: u32 = 0x4c;
pub const DW_AT_vtable_elem_location: u32 = 0x4d;
pub const DW_AT_allocated: u32 = 0x4e;
pub const DW_AT_associated: u32 = 0x4f;
pub const DW_AT_data_location: u32 = 0x50;
pub const DW_AT_byte_stride: u32 = 0x51;
pub const DW_AT_entry_pc: u32 = 0x52;
pub const DW_AT_use_UTF8: u32 = 0x53;
pub const DW_AT_extension: u32 = 0x54;
pub const DW_AT_ranges: u32 = 0x55;
pub const DW_AT_call_file: u32 = 0x58;
pub const DW_AT_call_line: u32 = 0x59;
pub const DW_AT_call_column: u32 = 0x57;
pub const DW_AT_lo_user: u32 = 0x2000;
pub const DW_AT_hi_user: u32 = 0x3fff;

// Attribute forms.
pub const DW_FORM_addr: u32 = 0x01;
pub const DW_FORM_block2: u32 = 0x03;
pub const DW_FORM_block4: u32 = 0x04;
pub const DW_FORM_data2: u32 = 0x05;
pub const DW_FORM_data4: u32 = 0x06;
pub const DW_FORM_data8: u32 = 0x07;
pub const DW_FORM_string: u32 = 0x08;
pub const DW_FORM_block: u32 = 0x09;
pub const DW_FORM_block1: u32 = 0x0a;
pub const DW_FORM_data1: u32 = 0x0b;
pub const DW_FORM_flag: u32 = 0x0c;
pub const DW_FORM_sdata: u32 = 0x0d;
pub const DW_FORM_strp: u32 = 0x0e;
pub const DW_FORM_udata: u32 = 0x0f;
pub const DW_FORM_ref_addr: u32 = 0x10;
pub const DW_FORM_ref1: u32 = 0x11;
pub const DW_FORM_ref2: u32 = 0x12;
pub const DW_FORM_ref4: u32 = 0x13;
pub const DW_FORM_ref8: u32 = 0x14;
pub const DW_FORM_ref_udata: u32 = 0x15;
pub const DW_FORM_indirect: u32 = 0x16;
pub const DW_FORM_sec_offset: u32 = 0x17;
pub const DW_FORM_exprloc: u32 = 0x18;
pub const DW_FORM_flag_present: u32 = 0x19;
pub const DW_FORM_ref_sig8: u32 = 0x20;

// Inline codes (values of DW_AT_inline).
pub const DW_INL_not_inlined: u64 = 0;
pub const DW_INL_inlined: u64 = 1;
pub const DW_INL_declared_not_inlined: u64 = 2;
pub const DW_INL_declared_inlined: u64 = 3;

// Source languages (values of DW_AT_language).
pub const DW_LANG_C89: u64 = 0x01;
pub const DW_LANG_C: u64 = 0x02;
pub const DW_LANG_Ada83: u64 = 0x03;
pub const DW_LANG_C_plus_plus: u64 = 0x04;
pub const DW_LANG_Cobol74: u64 = 0x05;
pub const DW_LANG_Cobol85: u64 = 0x06;
pub const DW_LANG_Fortran77: u64 = 0x07;
pub const DW_LANG_Fortran90: u64 = 0x08;
pub const DW_LANG_Pascal83: u64 = 0x09;
pub const DW_LANG_Modula2: u64 = 0x0a;
pub const DW_LANG_Java: u64 = 0x0b;
pub const DW_LANG_C99: u64 = 0x0c;
pub const DW_LANG_Ada95: u64 = 0x0d;
pub const DW_LANG_Fortran95: u64 = 0x0e;
pub const DW_LANG_PLI: u64 = 0x0f;
pub const DW_LANG_ObjC: u64 = 0x10;
pub const DW_LANG_ObjC_plus_plus: u64 = 0x11;
pub const DW_LANG_UPC: u64 = 0x12;
pub const DW_LANG_D: u64 = 0x13;

// Base type encodings (values of DW_AT_encoding).
pub const DW_ATE_address: u64 = 0x01;
pub const DW_ATE_boolean: u64 = 0x02;
pub const DW_ATE_float: u64 = 0x04;
pub const DW_ATE_signed: u64 = 0x05;
pub const DW_ATE_signed_char: u64 = 0x06;
pub const DW_ATE_unsigned: u64 = 0x07;
pub const DW_ATE_unsigned_char: u64 = 0x08;

// Standard line-program opcodes.
pub const DW_LNS_copy: u8 = 1;
pub const DW_LNS_advance_pc: u8 = 2;
pub const DW_LNS_advance_line: u8 = 3;
pub const DW_LNS_set_file: u8 = 4;
pub const DW_LNS_set_column: u8 = 5;
pub const DW_LNS_negate_stmt: u8 = 6;
pub const DW_LNS_set_basic_block: u8 = 7;
pub const DW_LNS_const_add_pc: u8 = 8;
pub const DW_LNS_fixed_advance_pc: u8 = 9;
pub const DW_LNS_set_prologue_end: u8 = 10;
pub const DW_LNS_set_epilogue_begin: u8 = 11;
pub const DW_LNS_set_isa: u8 = 12;

// Extended line-program opcodes.
pub const DW_LNE_end_sequence: u8 = 1;
pub const DW_LNE_set_address: u8 = 2;
pub const DW_LNE_define_file: u8 = 3;
pub const DW_LNE_set_discriminator: u8 = 4;

// Macro information record types.
pub const DW_MACINFO_define: u8 = 1;
pub const DW_MACINFO_undef: u8 = 2;
pub const DW_MACINFO_start_file: u8 = 3;
pub const DW_MACINFO_end_file: u8 = 4;
pub const DW_MACINFO_vendor_ext: u8 = 0xff;
