//! The map of debug sections a [`Dwarf`](crate::Dwarf) handle reads from.
//!
//! The container format is somebody else's business: whoever owns the object
//! file hands over one immutable byte slice per recognized section, keyed by
//! [`SectionId`]. Section names are spelled without container punctuation
//! (`"debug_info"`), mirroring how each container prefixes them (`.debug_info`
//! in ELF, `__debug_info` in MachO).

use crate::error::{Error, ErrorKind};
use crate::reader::{Endianness, Reader};

/// Identifies one of the debug sections this crate knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    /// Compilation units: headers plus DIE trees.
    DebugInfo,
    /// Abbreviation declarations, indexed per unit.
    DebugAbbrev,
    /// Pooled strings referenced by `DW_FORM_strp`.
    DebugStr,
    /// Per-unit line-number programs.
    DebugLine,
    /// Address-range contributions per unit.
    DebugAranges,
    /// Preprocessor macro records.
    DebugMacinfo,
    /// Name to (unit, DIE offset) index.
    DebugPubnames,
}

impl SectionId {
    /// All recognized sections, in the order a container reader would
    /// typically collect them.
    pub const ALL: [SectionId; 7] = [
        SectionId::DebugInfo,
        SectionId::DebugAbbrev,
        SectionId::DebugStr,
        SectionId::DebugLine,
        SectionId::DebugAranges,
        SectionId::DebugMacinfo,
        SectionId::DebugPubnames,
    ];

    /// The container-independent section name.
    pub fn name(self) -> &'static str {
        match self {
            SectionId::DebugInfo => "debug_info",
            SectionId::DebugAbbrev => "debug_abbrev",
            SectionId::DebugStr => "debug_str",
            SectionId::DebugLine => "debug_line",
            SectionId::DebugAranges => "debug_aranges",
            SectionId::DebugMacinfo => "debug_macinfo",
            SectionId::DebugPubnames => "debug_pubnames",
        }
    }

    /// The name of this section in an ELF file.
    pub fn elf_name(self) -> &'static str {
        match self {
            SectionId::DebugInfo => ".debug_info",
            SectionId::DebugAbbrev => ".debug_abbrev",
            SectionId::DebugStr => ".debug_str",
            SectionId::DebugLine => ".debug_line",
            SectionId::DebugAranges => ".debug_aranges",
            SectionId::DebugMacinfo => ".debug_macinfo",
            SectionId::DebugPubnames => ".debug_pubnames",
        }
    }
}

/// Borrowed byte slices for every recognized debug section.
///
/// Sections the container does not carry stay `None`; readers that need one
/// report a kind appropriate to the operation (`NoString` for the string
/// pool, `NoEntry` for the optional indexes, `InvalidDwarf` where the
/// structure demands the section).
#[derive(Debug, Default, Clone, Copy)]
pub struct DwarfSections<'data> {
    pub debug_info: Option<&'data [u8]>,
    pub debug_abbrev: Option<&'data [u8]>,
    pub debug_str: Option<&'data [u8]>,
    pub debug_line: Option<&'data [u8]>,
    pub debug_aranges: Option<&'data [u8]>,
    pub debug_macinfo: Option<&'data [u8]>,
    pub debug_pubnames: Option<&'data [u8]>,
}

impl<'data> DwarfSections<'data> {
    /// Collects sections by asking `lookup` for each recognized id.
    pub fn load<F>(mut lookup: F) -> Self
    where
        F: FnMut(SectionId) -> Option<&'data [u8]>,
    {
        let mut sections = DwarfSections::default();
        for id in SectionId::ALL {
            *sections.slot(id) = lookup(id);
        }
        sections
    }

    fn slot(&mut self, id: SectionId) -> &mut Option<&'data [u8]> {
        match id {
            SectionId::DebugInfo => &mut self.debug_info,
            SectionId::DebugAbbrev => &mut self.debug_abbrev,
            SectionId::DebugStr => &mut self.debug_str,
            SectionId::DebugLine => &mut self.debug_line,
            SectionId::DebugAranges => &mut self.debug_aranges,
            SectionId::DebugMacinfo => &mut self.debug_macinfo,
            SectionId::DebugPubnames => &mut self.debug_pubnames,
        }
    }

    /// Returns the bytes of `id`, if the container carried that section.
    pub fn get(&self, id: SectionId) -> Option<&'data [u8]> {
        match id {
            SectionId::DebugInfo => self.debug_info,
            SectionId::DebugAbbrev => self.debug_abbrev,
            SectionId::DebugStr => self.debug_str,
            SectionId::DebugLine => self.debug_line,
            SectionId::DebugAranges => self.debug_aranges,
            SectionId::DebugMacinfo => self.debug_macinfo,
            SectionId::DebugPubnames => self.debug_pubnames,
        }
    }

    /// Returns the bytes of `id`, reporting `missing` when absent.
    pub(crate) fn require(
        &self,
        id: SectionId,
        missing: ErrorKind,
    ) -> Result<&'data [u8], Error> {
        self.get(id).ok_or_else(|| missing.into())
    }

    /// Builds a reader over `id` positioned at `offset`.
    pub(crate) fn reader(
        &self,
        id: SectionId,
        offset: u64,
        endian: Endianness,
        missing: ErrorKind,
    ) -> Result<Reader<'data>, Error> {
        let data = self.require(id, missing)?;
        let offset = usize::try_from(offset).map_err(|_| ErrorKind::InvalidDwarf)?;
        let mut reader = Reader::new(data, endian);
        reader.seek(offset)?;
        Ok(reader)
    }
}
