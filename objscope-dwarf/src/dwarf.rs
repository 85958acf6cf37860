//! The top-level handle over a file's debug sections.

use std::cell::OnceCell;

use crate::aranges::Aranges;
use crate::backend::{Backend, RelocSimpleType};
use crate::die::Die;
use crate::error::{Error, ErrorKind};
use crate::macinfo::MacroIter;
use crate::pubnames::{PubName, PubNameIter};
use crate::reader::{Endianness, Reader};
use crate::sections::{DwarfSections, SectionId};
use crate::unit::{CompilationUnits, Unit, UnitRegistry};
use fallible_iterator::FallibleIterator;

use crate::constants;

/// A handle over one object file's debug information.
///
/// The handle borrows the section bytes and owns every cache built over
/// them: the unit registry, per-unit abbreviation and line tables, and the
/// address-range index. All caches follow a write-once discipline (once
/// computed, repeated queries observe identical results) and are released
/// together when the handle is dropped.
///
/// A handle is single-threaded; separate handles over the same bytes are
/// independent and may live on different threads.
pub struct Dwarf<'data> {
    sections: DwarfSections<'data>,
    endian: Endianness,
    units: UnitRegistry<'data>,
    aranges: OnceCell<Result<Aranges, ErrorKind>>,
    backend: Option<Box<dyn Backend>>,
}

impl<'data> Dwarf<'data> {
    /// Creates a handle over `sections` recorded in `endian` byte order.
    pub fn new(sections: DwarfSections<'data>, endian: Endianness) -> Self {
        Dwarf {
            sections,
            endian,
            units: UnitRegistry::new(),
            aranges: OnceCell::new(),
            backend: None,
        }
    }

    /// Installs an architecture backend.
    pub fn with_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// The installed backend, if any.
    pub fn backend(&self) -> Option<&dyn Backend> {
        self.backend.as_deref()
    }

    /// The section map this handle reads from.
    pub fn sections(&self) -> &DwarfSections<'data> {
        &self.sections
    }

    /// The byte order of the sections.
    pub fn endianity(&self) -> Endianness {
        self.endian
    }

    pub(crate) fn unit_registry(&self) -> &UnitRegistry<'data> {
        &self.units
    }

    /// Iterates the compilation units of `.debug_info` in section order.
    pub fn units(&self) -> CompilationUnits<'_, 'data> {
        CompilationUnits::new(self)
    }

    /// Resolves the unit whose bytes contain the global offset.
    pub fn unit_at(&self, offset: u64) -> Result<&Unit<'data>, Error> {
        self.units.unit_containing(offset, &self.sections, self.endian)
    }

    /// Returns a DIE cursor at a global `.debug_info` offset.
    ///
    /// The offset is only checked to lie inside a unit; pointing it at
    /// anything but the start of an entry yields a cursor whose tag is
    /// `DW_TAG_invalid`.
    pub fn die_at(&self, offset: u64) -> Result<Die<'_, 'data>, Error> {
        let unit = self.unit_at(offset)?;
        Ok(Die::new(self, unit, offset))
    }

    /// The root entry of `unit`.
    pub fn unit_die<'a>(&'a self, unit: &'a Unit<'data>) -> Die<'a, 'data> {
        Die::new(self, unit, unit.first_die_offset())
    }

    /// Reads the string starting at `offset` in the string pool.
    ///
    /// Returns the bytes before the terminator. An absent pool, an offset
    /// past it, or a missing terminator report `NoString`.
    pub fn string_at(&self, offset: u64) -> Result<&'data [u8], Error> {
        let section = self
            .sections
            .require(SectionId::DebugStr, ErrorKind::NoString)?;
        let offset = usize::try_from(offset).map_err(|_| ErrorKind::NoString)?;
        if offset >= section.len() {
            return Err(ErrorKind::NoString.into());
        }
        let rest = &section[offset..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ErrorKind::NoString)?;
        Ok(&rest[..nul])
    }

    /// The file's address-range index, decoded on first use.
    pub fn aranges(&self) -> Result<&Aranges, Error> {
        let cached = self
            .aranges
            .get_or_init(|| Aranges::parse(&self.sections, self.endian).map_err(|err| err.kind()));
        match cached {
            Ok(aranges) => Ok(aranges),
            Err(kind) => Err((*kind).into()),
        }
    }

    /// Returns the root entry of the unit covering `address`, via the
    /// address-range index.
    pub fn die_for_address(&self, address: u64) -> Result<Die<'_, 'data>, Error> {
        let entry = self.aranges()?.find(address)?;
        let unit = self.unit_at(entry.unit_offset())?;
        Ok(self.unit_die(unit))
    }

    /// Iterates the macro records starting at `offset` in
    /// `.debug_macinfo`.
    pub fn macro_records(&self, offset: u64) -> Result<MacroIter<'data>, Error> {
        let reader = self.sections.reader(
            SectionId::DebugMacinfo,
            offset,
            self.endian,
            ErrorKind::NoEntry,
        )?;
        Ok(MacroIter::new(reader))
    }

    /// Iterates the macro records of `unit`, located through the root
    /// entry's `DW_AT_macro_info` attribute.
    ///
    /// A unit compiled without macro information reports `NoEntry`.
    pub fn macro_records_for_unit(&self, unit: &Unit<'data>) -> Result<MacroIter<'data>, Error> {
        let attr = self
            .unit_die(unit)
            .attr(constants::DW_AT_macro_info)?
            .ok_or(ErrorKind::NoEntry)?;
        self.macro_records(attr.udata()?)
    }

    /// Iterates the global-name index.
    pub fn pubnames(&self) -> Result<PubNameIter<'data>, Error> {
        let section = self
            .sections
            .require(SectionId::DebugPubnames, ErrorKind::NoEntry)?;
        let info_len = self
            .sections
            .get(SectionId::DebugInfo)
            .map(|info| info.len() as u64)
            .unwrap_or(0);
        Ok(PubNameIter::new(
            Reader::new(section, self.endian),
            info_len,
        ))
    }

    /// Looks `name` up in the global-name index and resolves the first
    /// match to its entry.
    pub fn find_pubname(&self, name: &[u8]) -> Result<Option<Die<'_, 'data>>, Error> {
        let mut names = self.pubnames()?;
        while let Some(pubname) = names.next()? {
            if pubname.name() == name {
                return self.die_at(pubname.die_offset()).map(Some);
            }
        }
        Ok(None)
    }

    /// Collects the global-name index into a vector.
    pub fn pubnames_vec(&self) -> Result<Vec<PubName<'data>>, Error> {
        self.pubnames()?.collect()
    }

    /// Names a register in DWARF numbering via the backend.
    ///
    /// Reports `NoEntry` without a backend or for numbers the machine does
    /// not define.
    pub fn register_name(&self, register: u16) -> Result<&'static str, Error> {
        self.backend()
            .and_then(|backend| backend.register_name(register))
            .ok_or_else(|| ErrorKind::NoEntry.into())
    }

    /// Classifies a relocation type via the backend.
    pub fn relocation_simple_type(&self, reloc_type: u32) -> Result<RelocSimpleType, Error> {
        self.backend()
            .and_then(|backend| backend.relocation_simple_type(reloc_type))
            .ok_or_else(|| ErrorKind::NoEntry.into())
    }

    /// Names a dynamic-section tag via the backend.
    pub fn dynamic_tag_name(&self, tag: i64) -> Result<&'static str, Error> {
        self.backend()
            .and_then(|backend| backend.dynamic_tag_name(tag))
            .ok_or_else(|| ErrorKind::NoEntry.into())
    }

    /// Validates a dynamic-section tag via the backend; `false` without
    /// one.
    pub fn dynamic_tag_check(&self, tag: i64) -> bool {
        self.backend()
            .map(|backend| backend.dynamic_tag_check(tag))
            .unwrap_or(false)
    }

    /// Locates a function's return value via the backend.
    pub fn return_value_register(&self, function: &Die<'_, 'data>) -> Result<Option<u16>, Error> {
        match self.backend() {
            Some(backend) => backend.return_value_register(function),
            None => Err(ErrorKind::NoEntry.into()),
        }
    }
}

impl std::fmt::Debug for Dwarf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dwarf")
            .field("endian", &self.endian)
            .field(
                "has_backend",
                &self.backend.as_deref().map(|backend| backend.name()),
            )
            .finish()
    }
}
