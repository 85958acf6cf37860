//! Architecture backends.
//!
//! The reader core is machine-agnostic. The few places that need ABI
//! knowledge (classifying relocations, naming dynamic tags and registers,
//! locating return values) consult a [`Backend`] installed on the handle.
//! Without one, those operations report `NoEntry`.

use std::ops::ControlFlow;

use crate::constants;
use crate::die::Die;
use crate::error::{Error, ErrorKind};

/// The storage class a relocation resolves to, for applying debug
/// relocations without knowing the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocSimpleType {
    Unsigned8,
    Signed8,
    Unsigned16,
    Signed16,
    Unsigned32,
    Signed32,
    Unsigned64,
    Signed64,
}

/// Architecture-specific knowledge consumed by the reader.
pub trait Backend {
    /// A short machine name, e.g. `"x86_64"`.
    fn name(&self) -> &'static str;

    /// Classifies a relocation type into the storage class it writes, or
    /// `None` for relocations debug sections never carry.
    fn relocation_simple_type(&self, reloc_type: u32) -> Option<RelocSimpleType>;

    /// The name of a dynamic-section tag, or `None` for tags unknown to
    /// this machine.
    fn dynamic_tag_name(&self, tag: i64) -> Option<&'static str> {
        generic_dynamic_tag_name(tag)
    }

    /// Whether a dynamic-section tag is valid for this machine.
    fn dynamic_tag_check(&self, tag: i64) -> bool {
        self.dynamic_tag_name(tag).is_some()
    }

    /// The name of a register in DWARF numbering, or `None` for numbers the
    /// machine does not define.
    fn register_name(&self, register: u16) -> Option<&'static str>;

    /// The DWARF register a function's return value lands in, judging from
    /// the function entry's return type; `None` when the value is returned
    /// in memory.
    fn return_value_register(&self, function: &Die<'_, '_>) -> Result<Option<u16>, Error>;
}

/// Dynamic tags every machine shares.
fn generic_dynamic_tag_name(tag: i64) -> Option<&'static str> {
    const NAMES: &[&str] = &[
        "NULL",
        "NEEDED",
        "PLTRELSZ",
        "PLTGOT",
        "HASH",
        "STRTAB",
        "SYMTAB",
        "RELA",
        "RELASZ",
        "RELAENT",
        "STRSZ",
        "SYMENT",
        "INIT",
        "FINI",
        "SONAME",
        "RPATH",
        "SYMBOLIC",
        "REL",
        "RELSZ",
        "RELENT",
        "PLTREL",
        "DEBUG",
        "TEXTREL",
        "JMPREL",
        "BIND_NOW",
        "INIT_ARRAY",
        "FINI_ARRAY",
        "INIT_ARRAYSZ",
        "FINI_ARRAYSZ",
        "RUNPATH",
        "FLAGS",
    ];
    usize::try_from(tag).ok().and_then(|t| NAMES.get(t)).copied()
}

/// Strips typedefs and type qualifiers off a type entry.
fn peel_type<'a, 'data>(mut die: Die<'a, 'data>) -> Result<Die<'a, 'data>, Error> {
    loop {
        match die.tag() {
            constants::DW_TAG_typedef
            | constants::DW_TAG_const_type
            | constants::DW_TAG_volatile_type
            | constants::DW_TAG_restrict_type => {
                match die.attr_integrate(constants::DW_AT_type)? {
                    Some(attr) => die = attr.reference_die()?,
                    None => return Ok(die),
                }
            }
            _ => return Ok(die),
        }
    }
}

/// The x86-64 System V backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86_64;

/// x86-64 relocation types with a simple storage class.
const R_X86_64_64: u32 = 1;
const R_X86_64_32: u32 = 10;
const R_X86_64_32S: u32 = 11;
const R_X86_64_16: u32 = 12;
const R_X86_64_8: u32 = 14;

/// DWARF register numbers for the integer and SSE return slots.
const X86_64_REG_RAX: u16 = 0;
const X86_64_REG_XMM0: u16 = 17;

impl Backend for X86_64 {
    fn name(&self) -> &'static str {
        "x86_64"
    }

    fn relocation_simple_type(&self, reloc_type: u32) -> Option<RelocSimpleType> {
        match reloc_type {
            R_X86_64_64 => Some(RelocSimpleType::Unsigned64),
            R_X86_64_32 => Some(RelocSimpleType::Unsigned32),
            R_X86_64_32S => Some(RelocSimpleType::Signed32),
            R_X86_64_16 => Some(RelocSimpleType::Unsigned16),
            R_X86_64_8 => Some(RelocSimpleType::Unsigned8),
            _ => None,
        }
    }

    fn register_name(&self, register: u16) -> Option<&'static str> {
        const NAMES: &[&str] = &[
            "rax", "rdx", "rcx", "rbx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11",
            "r12", "r13", "r14", "r15", "rip",
        ];
        NAMES.get(usize::from(register)).copied()
    }

    fn return_value_register(&self, function: &Die<'_, '_>) -> Result<Option<u16>, Error> {
        let type_attr = match function.attr_integrate(constants::DW_AT_type)? {
            Some(attr) => attr,
            // No return type means no return value.
            None => return Ok(None),
        };
        let ty = peel_type(type_attr.reference_die()?)?;
        match ty.tag() {
            constants::DW_TAG_pointer_type | constants::DW_TAG_enumeration_type => {
                Ok(Some(X86_64_REG_RAX))
            }
            constants::DW_TAG_base_type => {
                let encoding = ty
                    .attr(constants::DW_AT_encoding)?
                    .map(|attr| attr.udata())
                    .transpose()?
                    .unwrap_or(constants::DW_ATE_signed);
                if encoding == constants::DW_ATE_float {
                    Ok(Some(X86_64_REG_XMM0))
                } else {
                    Ok(Some(X86_64_REG_RAX))
                }
            }
            // Aggregates go through memory unless small; classifying them
            // needs layout, which the reader does not model.
            _ => Ok(None),
        }
    }
}

/// Walks `function` and its formal parameters, handing each parameter entry
/// to `callback`. A convenience for ABI analyses driven by a backend.
pub fn visit_formal_parameters<'a, 'data, F>(
    function: &Die<'a, 'data>,
    mut callback: F,
) -> Result<(), Error>
where
    F: FnMut(Die<'a, 'data>) -> ControlFlow<()>,
{
    let mut child = match function.first_child() {
        Ok(die) => die,
        Err(err) if err.kind() == ErrorKind::NoEntry => return Ok(()),
        Err(err) => return Err(err),
    };
    loop {
        if child.tag() == constants::DW_TAG_formal_parameter {
            if let ControlFlow::Break(()) = callback(child.clone()) {
                return Ok(());
            }
        }
        child = match child.next_sibling() {
            Ok(die) => die,
            Err(err) if err.kind() == ErrorKind::NoEntry => return Ok(()),
            Err(err) => return Err(err),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_names() {
        let backend = X86_64;
        assert_eq!(backend.register_name(0), Some("rax"));
        assert_eq!(backend.register_name(7), Some("rsp"));
        assert_eq!(backend.register_name(16), Some("rip"));
        assert_eq!(backend.register_name(99), None);
    }

    #[test]
    fn relocation_classification() {
        let backend = X86_64;
        assert_eq!(
            backend.relocation_simple_type(R_X86_64_64),
            Some(RelocSimpleType::Unsigned64)
        );
        assert_eq!(
            backend.relocation_simple_type(R_X86_64_32S),
            Some(RelocSimpleType::Signed32)
        );
        // PC-relative relocations have no storage class.
        assert_eq!(backend.relocation_simple_type(2), None);
    }

    #[test]
    fn dynamic_tags() {
        let backend = X86_64;
        assert_eq!(backend.dynamic_tag_name(1), Some("NEEDED"));
        assert_eq!(backend.dynamic_tag_name(21), Some("DEBUG"));
        assert!(backend.dynamic_tag_check(0));
        assert!(!backend.dynamic_tag_check(-1));
        assert!(!backend.dynamic_tag_check(0x6000_0000));
    }
}
