//! Compilation units and their lazy registry.
//!
//! `.debug_info` is a run of contributions, each introduced by a header
//! naming the DWARF version, the offset dialect, the address width and the
//! base of the unit's abbreviation declarations. Units are enumerated
//! linearly on demand and memoized by starting offset, so resolving a global
//! DIE offset to its owning unit is a tree lookup after first touch.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::BTreeMap;

use fallible_iterator::FallibleIterator;

use crate::abbrev::AbbrevTable;
use crate::arena::Arena;
use crate::dwarf::Dwarf;
use crate::error::{Error, ErrorKind};
use crate::line::LineTable;
use crate::reader::{Endianness, Format};
use crate::sections::{DwarfSections, SectionId};

/// One compilation unit of `.debug_info`.
pub struct Unit<'data> {
    index: usize,
    offset: u64,
    content_length: u64,
    header_size: u64,
    end_offset: u64,
    version: u16,
    format: Format,
    address_size: u8,
    abbrev_offset: u64,
    pub(crate) abbrevs: AbbrevTable,
    pub(crate) lines: OnceCell<Result<LineTable<'data>, ErrorKind>>,
}

impl<'data> Unit<'data> {
    /// Parses and validates the unit header at `offset`.
    fn parse(
        index: usize,
        offset: u64,
        sections: &DwarfSections<'data>,
        endian: Endianness,
    ) -> Result<Unit<'data>, Error> {
        let info = sections.require(SectionId::DebugInfo, ErrorKind::InvalidDwarf)?;
        let mut reader = sections.reader(
            SectionId::DebugInfo,
            offset,
            endian,
            ErrorKind::InvalidDwarf,
        )?;

        let (content_length, format) = reader.read_initial_length()?;
        let content_start = reader.position() as u64;
        let end_offset = content_start
            .checked_add(content_length)
            .ok_or(ErrorKind::InvalidDwarf)?;
        if end_offset > info.len() as u64 {
            // The declared length runs past the section.
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let version = reader.read_u16()?;
        if !(2..=4).contains(&version) {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let abbrev_offset = reader.read_offset(format)?;
        let abbrev = sections.require(SectionId::DebugAbbrev, ErrorKind::InvalidDwarf)?;
        if abbrev_offset >= abbrev.len() as u64 {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let address_size = reader.read_u8()?;
        if address_size != 4 && address_size != 8 {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let header_size = reader.position() as u64 - offset;
        if end_offset < offset + header_size {
            // The unit must at least cover its own header.
            return Err(ErrorKind::InvalidDwarf.into());
        }

        Ok(Unit {
            index,
            offset,
            content_length,
            header_size,
            end_offset,
            version,
            format,
            address_size,
            abbrev_offset,
            abbrevs: AbbrevTable::new(abbrev_offset as usize),
            lines: OnceCell::new(),
        })
    }

    /// Position of this unit in enumeration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset of the unit header within `.debug_info`.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Value of the header's length field: the number of bytes following it
    /// that belong to this unit.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Size of the header in bytes; the root DIE starts right after.
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Offset one past the unit within `.debug_info`.
    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    /// Global offset of the unit's root DIE.
    pub fn first_die_offset(&self) -> u64 {
        self.offset + self.header_size
    }

    /// The DWARF version recorded in the header.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The offset dialect of the unit.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Width of target addresses in bytes, 4 or 8.
    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// Width of section offsets in bytes, 4 or 8.
    pub fn offset_size(&self) -> u8 {
        self.format.offset_size()
    }

    /// Offset of the unit's abbreviation declarations in `.debug_abbrev`.
    pub fn abbrev_offset(&self) -> u64 {
        self.abbrev_offset
    }

    /// Whether `offset` falls inside this unit's bytes.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end_offset
    }
}

impl std::fmt::Debug for Unit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unit")
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("version", &self.version)
            .field("format", &self.format)
            .field("address_size", &self.address_size)
            .field("abbrev_offset", &format_args!("{:#x}", self.abbrev_offset))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enumeration {
    InProgress,
    Complete,
    Failed,
}

/// Owns every unit parsed so far and the offset index over them.
pub(crate) struct UnitRegistry<'data> {
    arena: Arena<Unit<'data>>,
    by_offset: RefCell<BTreeMap<u64, usize>>,
    next_offset: Cell<u64>,
    state: Cell<Enumeration>,
}

impl<'data> UnitRegistry<'data> {
    pub fn new() -> Self {
        UnitRegistry {
            arena: Arena::new(),
            by_offset: RefCell::new(BTreeMap::new()),
            next_offset: Cell::new(0),
            state: Cell::new(Enumeration::InProgress),
        }
    }

    /// Returns the `index`th unit if it has been enumerated.
    pub fn by_index(&self, index: usize) -> Option<&Unit<'data>> {
        self.arena.get(index)
    }

    /// Parses the next unit header, if any are left.
    ///
    /// A malformed header poisons enumeration: every later call reports
    /// `InvalidDwarf` without rereading the section.
    pub fn parse_next(
        &self,
        sections: &DwarfSections<'data>,
        endian: Endianness,
    ) -> Result<Option<&Unit<'data>>, Error> {
        match self.state.get() {
            Enumeration::Complete => return Ok(None),
            Enumeration::Failed => return Err(ErrorKind::InvalidDwarf.into()),
            Enumeration::InProgress => {}
        }

        let info = sections.require(SectionId::DebugInfo, ErrorKind::InvalidDwarf)?;
        let offset = self.next_offset.get();
        if offset >= info.len() as u64 {
            self.state.set(Enumeration::Complete);
            return Ok(None);
        }

        let index = self.arena.len();
        match Unit::parse(index, offset, sections, endian) {
            Ok(unit) => {
                self.next_offset.set(unit.end_offset());
                let unit = self.arena.alloc(unit);
                self.by_offset.borrow_mut().insert(unit.offset(), index);
                Ok(Some(unit))
            }
            Err(err) => {
                self.state.set(Enumeration::Failed);
                Err(err)
            }
        }
    }

    /// Resolves the unit whose byte range contains `offset`, enumerating
    /// further units as needed.
    pub fn unit_containing(
        &self,
        offset: u64,
        sections: &DwarfSections<'data>,
        endian: Endianness,
    ) -> Result<&Unit<'data>, Error> {
        loop {
            let found = self
                .by_offset
                .borrow()
                .range(..=offset)
                .next_back()
                .map(|(_, &index)| index);
            if let Some(index) = found {
                let unit = self.arena.get(index).expect("indexed unit");
                if unit.contains(offset) {
                    return Ok(unit);
                }
            }
            if self.parse_next(sections, endian)?.is_none() {
                // Ran out of units without covering the offset.
                return Err(ErrorKind::InvalidDwarf.into());
            }
        }
    }
}

/// A fallible iterator over the compilation units of a handle, in section
/// order. Obtained from [`Dwarf::units`].
pub struct CompilationUnits<'a, 'data> {
    dwarf: &'a Dwarf<'data>,
    next_index: usize,
}

impl<'a, 'data> CompilationUnits<'a, 'data> {
    pub(crate) fn new(dwarf: &'a Dwarf<'data>) -> Self {
        CompilationUnits {
            dwarf,
            next_index: 0,
        }
    }
}

impl<'a, 'data> FallibleIterator for CompilationUnits<'a, 'data> {
    type Item = &'a Unit<'data>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Error> {
        let registry = self.dwarf.unit_registry();
        let unit = match registry.by_index(self.next_index) {
            Some(unit) => Some(unit),
            None => registry.parse_next(self.dwarf.sections(), self.dwarf.endianity())?,
        };
        if unit.is_some() {
            self.next_index += 1;
        }
        Ok(unit)
    }
}
