//! Debugging information entries.
//!
//! A [`Die`] is a cheap cursor: a global `.debug_info` offset paired with
//! its owning unit. Nothing is decoded until asked for; the abbreviation
//! behind the entry is resolved on the first tag or attribute access and
//! cached on the cursor. A corrupt abbreviation code parks the cursor in an
//! invalid state: [`Die::tag`] reports `DW_TAG_invalid` and attribute
//! iteration refuses with `InvalidDwarf`.

use std::cell::Cell;
use std::ops::ControlFlow;

use fallible_iterator::FallibleIterator;

use crate::abbrev::{Abbrev, AttrSpec};
use crate::attr::{take_value, Attribute};
use crate::constants;
use crate::dwarf::Dwarf;
use crate::error::{Error, ErrorKind};
use crate::line::FileEntry;
use crate::reader::Reader;
use crate::sections::SectionId;
use crate::unit::Unit;

/// Redirection depth after which an abstract-origin/specification chain is
/// considered cyclic.
const INTEGRATE_REDIRECT_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy)]
enum AbbrevSlot<'a> {
    Unresolved,
    Invalid,
    Resolved(&'a Abbrev),
}

/// A cursor over one debugging information entry.
#[derive(Clone)]
pub struct Die<'a, 'data> {
    dwarf: &'a Dwarf<'data>,
    unit: &'a Unit<'data>,
    offset: u64,
    abbrev: Cell<AbbrevSlot<'a>>,
}

impl<'a, 'data> Die<'a, 'data> {
    pub(crate) fn new(dwarf: &'a Dwarf<'data>, unit: &'a Unit<'data>, offset: u64) -> Self {
        Die {
            dwarf,
            unit,
            offset,
            abbrev: Cell::new(AbbrevSlot::Unresolved),
        }
    }

    /// The handle this cursor reads from.
    pub fn dwarf(&self) -> &'a Dwarf<'data> {
        self.dwarf
    }

    /// The unit containing this entry.
    pub fn unit(&self) -> &'a Unit<'data> {
        self.unit
    }

    /// Global offset of this entry within `.debug_info`.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Offset of this entry relative to its unit header.
    pub fn cu_offset(&self) -> u64 {
        self.offset - self.unit.offset()
    }

    /// The root entry of this entry's unit.
    pub fn cu_die(&self) -> Die<'a, 'data> {
        Die::new(self.dwarf, self.unit, self.unit.first_die_offset())
    }

    /// A reader over `.debug_info`, clamped to this unit's bytes and
    /// positioned at `offset`.
    fn reader_at(&self, offset: u64) -> Result<Reader<'data>, Error> {
        let info = self
            .dwarf
            .sections()
            .require(SectionId::DebugInfo, ErrorKind::InvalidDwarf)?;
        let end = usize::try_from(self.unit.end_offset()).map_err(|_| ErrorKind::InvalidDwarf)?;
        let bounded = info.get(..end).ok_or(ErrorKind::InvalidDwarf)?;
        let mut reader = Reader::new(bounded, self.dwarf.endianity());
        reader.seek(usize::try_from(offset).map_err(|_| ErrorKind::InvalidDwarf)?)?;
        Ok(reader)
    }

    fn resolve_abbrev(&self) -> Result<&'a Abbrev, Error> {
        match self.abbrev.get() {
            AbbrevSlot::Resolved(abbrev) => return Ok(abbrev),
            AbbrevSlot::Invalid => return Err(ErrorKind::InvalidDwarf.into()),
            AbbrevSlot::Unresolved => {}
        }

        let resolved = (|| {
            let mut reader = self.reader_at(self.offset)?;
            let code = reader.read_uleb128()?;
            if code == 0 {
                // A null entry has no abbreviation.
                return Err(ErrorKind::InvalidDwarf.into());
            }
            let section = self
                .dwarf
                .sections()
                .require(SectionId::DebugAbbrev, ErrorKind::InvalidDwarf)?;
            self.unit
                .abbrevs
                .find(code, section, self.dwarf.endianity())
        })();

        match resolved {
            Ok(abbrev) => {
                self.abbrev.set(AbbrevSlot::Resolved(abbrev));
                Ok(abbrev)
            }
            Err(err) => {
                self.abbrev.set(AbbrevSlot::Invalid);
                Err(err)
            }
        }
    }

    /// The abbreviation declaration behind this entry.
    pub fn abbrev(&self) -> Result<&'a Abbrev, Error> {
        self.resolve_abbrev()
    }

    /// The abbreviation code in front of this entry. Zero names a null
    /// entry.
    pub fn abbrev_code(&self) -> Result<u64, Error> {
        self.reader_at(self.offset)?.read_uleb128()
    }

    /// The entry's tag, or `DW_TAG_invalid` when the abbreviation cannot be
    /// resolved (the failure kind is still recorded in the error channel).
    pub fn tag(&self) -> u32 {
        match self.resolve_abbrev() {
            Ok(abbrev) => abbrev.tag(),
            Err(_) => constants::DW_TAG_invalid,
        }
    }

    /// Whether this entry announces children.
    pub fn has_children(&self) -> Result<bool, Error> {
        Ok(self.resolve_abbrev()?.has_children())
    }

    /// A reader positioned at this entry's first attribute value, plus the
    /// resolved abbreviation.
    fn attr_reader(&self) -> Result<(Reader<'data>, &'a Abbrev), Error> {
        let abbrev = self.resolve_abbrev()?;
        let mut reader = self.reader_at(self.offset)?;
        reader.read_uleb128()?;
        Ok((reader, abbrev))
    }

    /// Global offset of the byte following this entry's attribute values.
    fn after_attrs(&self) -> Result<u64, Error> {
        let (mut reader, abbrev) = self.attr_reader()?;
        for spec in abbrev.attributes() {
            take_value(&mut reader, spec.form(), self.unit)?;
        }
        Ok(reader.position() as u64)
    }

    /// Iterates this entry's attributes in schema order.
    pub fn attrs(&self) -> Result<AttrIter<'a, 'data>, Error> {
        let (reader, abbrev) = self.attr_reader()?;
        Ok(AttrIter {
            dwarf: self.dwarf,
            unit: self.unit,
            reader,
            specs: abbrev.attributes(),
            next: 0,
        })
    }

    /// Returns the first attribute named `name`, without integration.
    pub fn attr(&self, name: u32) -> Result<Option<Attribute<'a, 'data>>, Error> {
        let mut attrs = self.attrs()?;
        while let Some(attr) = attrs.next()? {
            if attr.name() == name {
                return Ok(Some(attr));
            }
        }
        Ok(None)
    }

    /// Whether this entry itself carries an attribute named `name`.
    pub fn has_attr(&self, name: u32) -> Result<bool, Error> {
        Ok(self.attr(name)?.is_some())
    }

    /// Returns the attribute named `name`, following
    /// `DW_AT_abstract_origin` and `DW_AT_specification` redirections.
    ///
    /// A miss on this entry retries on the entry the redirection names,
    /// which may live in another unit. The search stops when an entry has
    /// neither redirecting attribute; a redirection cycle reports
    /// `InvalidDwarf`.
    pub fn attr_integrate(&self, name: u32) -> Result<Option<Attribute<'a, 'data>>, Error> {
        let mut die = self.clone();
        for _ in 0..INTEGRATE_REDIRECT_LIMIT {
            if let Some(attr) = die.attr(name)? {
                return Ok(Some(attr));
            }
            let follow = match die.attr(constants::DW_AT_abstract_origin)? {
                Some(attr) => attr,
                None => match die.attr(constants::DW_AT_specification)? {
                    Some(attr) => attr,
                    None => return Ok(None),
                },
            };
            die = self.dwarf.die_at(follow.global_reference()?)?;
        }
        Err(ErrorKind::InvalidDwarf.into())
    }

    /// Whether `name` is present here or on an integrated origin.
    pub fn has_attr_integrate(&self, name: u32) -> Result<bool, Error> {
        Ok(self.attr_integrate(name)?.is_some())
    }

    /// Streams attributes through `callback` starting at attribute index
    /// `resume` (0 for the first call).
    ///
    /// Returns `Some(next)`, the resume index, when the callback breaks,
    /// or `None` when every attribute was delivered.
    pub fn visit_attrs<F>(&self, resume: usize, mut callback: F) -> Result<Option<usize>, Error>
    where
        F: FnMut(&Attribute<'a, 'data>) -> ControlFlow<()>,
    {
        let mut attrs = self.attrs()?;
        let mut index = 0;
        while let Some(attr) = attrs.next()? {
            if index >= resume {
                if let ControlFlow::Break(()) = callback(&attr) {
                    return Ok(Some(index + 1));
                }
            }
            index += 1;
        }
        Ok(None)
    }

    /// Returns a cursor at `offset` if a non-null entry starts there,
    /// `NoEntry` at a null entry or the unit end.
    fn entry_at(&self, offset: u64) -> Result<Die<'a, 'data>, Error> {
        if offset >= self.unit.end_offset() {
            return Err(ErrorKind::NoEntry.into());
        }
        let mut reader = self.reader_at(offset)?;
        if reader.read_uleb128()? == 0 {
            return Err(ErrorKind::NoEntry.into());
        }
        Ok(Die::new(self.dwarf, self.unit, offset))
    }

    /// Returns this entry's first child.
    ///
    /// Reports `NoEntry` when the abbreviation announces no children or the
    /// child slot holds a chain terminator.
    pub fn first_child(&self) -> Result<Die<'a, 'data>, Error> {
        if !self.resolve_abbrev()?.has_children() {
            return Err(ErrorKind::NoEntry.into());
        }
        let offset = self.after_attrs()?;
        self.entry_at(offset)
    }

    /// Returns the next entry in this entry's sibling chain.
    ///
    /// Prefers a well-formed `DW_AT_sibling` attribute; otherwise skips the
    /// subtree by walking attribute encodings and null-entry terminators.
    /// Reports `NoEntry` at the end of the chain.
    pub fn next_sibling(&self) -> Result<Die<'a, 'data>, Error> {
        let abbrev = self.resolve_abbrev()?;

        if let Some(attr) = self.attr(constants::DW_AT_sibling)? {
            if let Ok(cu_offset) = attr.reference() {
                let offset = self.unit.offset() + cu_offset;
                if offset > self.offset && offset < self.unit.end_offset() {
                    return self.entry_at(offset);
                }
            }
        }

        let mut reader = self.reader_at(self.after_attrs()?)?;
        let mut depth = usize::from(abbrev.has_children());
        while depth > 0 {
            let code = reader.read_uleb128()?;
            if code == 0 {
                depth -= 1;
                continue;
            }
            let section = self
                .dwarf
                .sections()
                .require(SectionId::DebugAbbrev, ErrorKind::InvalidDwarf)?;
            let abb = self
                .unit
                .abbrevs
                .find(code, section, self.dwarf.endianity())?;
            for spec in abb.attributes() {
                take_value(&mut reader, spec.form(), self.unit)?;
            }
            if abb.has_children() {
                depth += 1;
            }
        }
        self.entry_at(reader.position() as u64)
    }

    /// The entry's name, integrated across origins.
    pub fn name(&self) -> Result<Option<&'data [u8]>, Error> {
        match self.attr_integrate(constants::DW_AT_name)? {
            Some(attr) => attr.string().map(Some),
            None => Ok(None),
        }
    }

    /// The file the entity was declared in, resolved through the unit's
    /// line-program file table.
    pub fn decl_file(&self) -> Result<Option<&'a FileEntry<'data>>, Error> {
        let attr = match self.attr_integrate(constants::DW_AT_decl_file)? {
            Some(attr) => attr,
            None => return Ok(None),
        };
        let table = self.unit.line_table(self.dwarf)?;
        table.file(attr.udata()?).map(Some)
    }

    /// The line the entity was declared on.
    pub fn decl_line(&self) -> Result<Option<u64>, Error> {
        self.integrated_udata(constants::DW_AT_decl_line)
    }

    /// The column the entity was declared at.
    pub fn decl_column(&self) -> Result<Option<u64>, Error> {
        self.integrated_udata(constants::DW_AT_decl_column)
    }

    /// The source language of the containing unit's code, as the raw
    /// `DW_LANG_*` constant.
    pub fn source_language(&self) -> Result<Option<u64>, Error> {
        self.integrated_udata(constants::DW_AT_language)
    }

    fn integrated_udata(&self, name: u32) -> Result<Option<u64>, Error> {
        match self.attr_integrate(name)? {
            Some(attr) => attr.udata().map(Some),
            None => Ok(None),
        }
    }

    /// The entry's low address bound.
    pub fn low_pc(&self) -> Result<Option<u64>, Error> {
        match self.attr(constants::DW_AT_low_pc)? {
            Some(attr) => attr.address().map(Some),
            None => Ok(None),
        }
    }

    /// The entry's high address bound. In version 4 units the attribute may
    /// be a constant offset from `low_pc`.
    pub fn high_pc(&self) -> Result<Option<u64>, Error> {
        let attr = match self.attr(constants::DW_AT_high_pc)? {
            Some(attr) => attr,
            None => return Ok(None),
        };
        match attr.address() {
            Ok(addr) => Ok(Some(addr)),
            Err(err) if err.kind() == ErrorKind::NoAddress => {
                let base = self.low_pc()?.ok_or(ErrorKind::NoEntry)?;
                let end = base
                    .checked_add(attr.udata()?)
                    .ok_or(ErrorKind::InvalidDwarf)?;
                Ok(Some(end))
            }
            Err(err) => Err(err),
        }
    }

    /// The address a function is entered at: `DW_AT_entry_pc` when present,
    /// otherwise the low address bound.
    pub fn entry_pc(&self) -> Result<Option<u64>, Error> {
        match self.attr_integrate(constants::DW_AT_entry_pc)? {
            Some(attr) => attr.address().map(Some),
            None => match self.attr_integrate(constants::DW_AT_low_pc)? {
                Some(attr) => attr.address().map(Some),
                None => Ok(None),
            },
        }
    }

    /// Whether this entry is the abstract definition of an inlined
    /// function (its `DW_AT_inline` value says the compiler inlined it).
    pub fn is_abstract_inline(&self) -> Result<bool, Error> {
        match self.attr(constants::DW_AT_inline)? {
            Some(attr) => Ok(matches!(
                attr.udata()?,
                constants::DW_INL_inlined | constants::DW_INL_declared_inlined
            )),
            None => Ok(false),
        }
    }

    /// Visits every `DW_TAG_inlined_subroutine` entry in this unit whose
    /// abstract origin names this entry.
    pub fn visit_inline_instances<F>(&self, mut callback: F) -> Result<(), Error>
    where
        F: FnMut(Die<'a, 'data>) -> ControlFlow<()>,
    {
        let root = self.cu_die();
        let mut parents: Vec<Die<'a, 'data>> = Vec::new();
        let mut current = match root.first_child() {
            Ok(die) => die,
            Err(err) if err.kind() == ErrorKind::NoEntry => return Ok(()),
            Err(err) => return Err(err),
        };

        loop {
            if current.tag() == constants::DW_TAG_inlined_subroutine {
                if let Some(attr) = current.attr(constants::DW_AT_abstract_origin)? {
                    if attr.global_reference()? == self.offset {
                        if let ControlFlow::Break(()) = callback(current.clone()) {
                            return Ok(());
                        }
                    }
                }
            }

            // Depth-first: descend, else advance, else pop.
            match current.first_child() {
                Ok(child) => {
                    parents.push(current);
                    current = child;
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::NoEntry => {}
                Err(err) => return Err(err),
            }
            loop {
                match current.next_sibling() {
                    Ok(sibling) => {
                        current = sibling;
                        break;
                    }
                    Err(err) if err.kind() == ErrorKind::NoEntry => match parents.pop() {
                        Some(parent) => current = parent,
                        None => return Ok(()),
                    },
                    Err(err) => return Err(err),
                }
            }
        }
    }
}

impl PartialEq for Die<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.unit.offset() == other.unit.offset()
    }
}

impl Eq for Die<'_, '_> {}

impl std::fmt::Debug for Die<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Die")
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("unit", &format_args!("{:#x}", self.unit.offset()))
            .finish()
    }
}

/// A fallible iterator over a DIE's attributes. Obtained from
/// [`Die::attrs`].
pub struct AttrIter<'a, 'data> {
    dwarf: &'a Dwarf<'data>,
    unit: &'a Unit<'data>,
    reader: Reader<'data>,
    specs: &'a [AttrSpec],
    next: usize,
}

impl std::fmt::Debug for AttrIter<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrIter")
            .field("unit", &format_args!("{:#x}", self.unit.offset()))
            .field("next", &self.next)
            .finish()
    }
}

impl<'a, 'data> FallibleIterator for AttrIter<'a, 'data> {
    type Item = Attribute<'a, 'data>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Error> {
        let spec = match self.specs.get(self.next) {
            Some(spec) => *spec,
            None => return Ok(None),
        };
        self.next += 1;
        let (form, value) = take_value(&mut self.reader, spec.form(), self.unit)?;
        Ok(Some(Attribute::new(
            spec.name(),
            form,
            value,
            self.unit,
            self.dwarf,
        )))
    }
}
