//! Per-unit abbreviation tables.
//!
//! Every DIE opens with a ULEB128 code naming an abbreviation declared in
//! `.debug_abbrev`; the declaration supplies the tag, the has-children flag
//! and the (name, form) schema of the attributes that follow. Declarations
//! are decoded on demand: a lookup miss advances a scan cursor one
//! declaration at a time, caching each parsed declaration by code, until the
//! wanted code turns up, the terminating zero code is reached, or the
//! section runs out. The latter two park the cursor in an exhausted state so
//! later misses fail fast instead of rescanning.

use std::cell::Cell;

use elsa::FrozenMap;
use smallvec::SmallVec;

use crate::constants;
use crate::error::{Error, ErrorKind};
use crate::reader::{Endianness, Reader};

/// One (attribute name, form) pair of an abbreviation's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    name: u32,
    form: u32,
}

impl AttrSpec {
    /// The attribute name code (`DW_AT_*`).
    pub fn name(self) -> u32 {
        self.name
    }

    /// The attribute form code (`DW_FORM_*`).
    pub fn form(self) -> u32 {
        self.form
    }
}

/// A decoded abbreviation declaration.
#[derive(Debug, Clone)]
pub struct Abbrev {
    code: u64,
    tag: u32,
    has_children: bool,
    attrs: SmallVec<[AttrSpec; 8]>,
}

impl Abbrev {
    /// The non-zero code DIEs use to select this declaration.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The DIE tag (`DW_TAG_*`).
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Whether DIEs of this shape are followed by children.
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// The attribute schema, in the order attribute values are encoded.
    pub fn attributes(&self) -> &[AttrSpec] {
        &self.attrs
    }

    /// Decodes one declaration, or `None` at the zero code terminating a
    /// unit's declarations.
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Option<Abbrev>, Error> {
        let code = reader.read_uleb128()?;
        if code == 0 {
            return Ok(None);
        }

        let tag = small_code(reader.read_uleb128()?)?;
        let has_children = match reader.read_u8()? {
            constants::DW_CHILDREN_no => false,
            constants::DW_CHILDREN_yes => true,
            _ => return Err(ErrorKind::InvalidDwarf.into()),
        };

        let mut attrs = SmallVec::new();
        loop {
            let name = small_code(reader.read_uleb128()?)?;
            let form = small_code(reader.read_uleb128()?)?;
            match (name, form) {
                (0, 0) => break,
                (0, _) | (_, 0) => return Err(ErrorKind::InvalidDwarf.into()),
                _ => attrs.push(AttrSpec { name, form }),
            }
        }

        Ok(Some(Abbrev {
            code,
            tag,
            has_children,
            attrs,
        }))
    }
}

/// Tag, name and form codes are ULEB128-encoded but fit 32 bits; anything
/// wider is corrupt.
fn small_code(value: u64) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| ErrorKind::InvalidDwarf.into())
}

/// Scan position of a table that is still being populated.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    /// Offset of the next undecoded declaration in `.debug_abbrev`.
    At(usize),
    /// The terminator or the section end was reached; only cached codes
    /// resolve from now on.
    Exhausted,
}

/// The lazily populated code-to-declaration index of one unit.
pub(crate) struct AbbrevTable {
    cache: FrozenMap<u64, Box<Abbrev>>,
    cursor: Cell<Cursor>,
}

impl AbbrevTable {
    /// Creates an empty table whose declarations start at `offset` within
    /// `.debug_abbrev`.
    pub fn new(offset: usize) -> Self {
        AbbrevTable {
            cache: FrozenMap::new(),
            cursor: Cell::new(Cursor::At(offset)),
        }
    }

    /// Resolves `code`, scanning further declarations as needed.
    ///
    /// An unknown code, a duplicate declaration or a malformed section
    /// reports `InvalidDwarf`.
    pub fn find<'a>(
        &'a self,
        code: u64,
        section: &[u8],
        endian: Endianness,
    ) -> Result<&'a Abbrev, Error> {
        if let Some(abbrev) = self.cache.get(&code) {
            return Ok(abbrev);
        }

        loop {
            let pos = match self.cursor.get() {
                Cursor::Exhausted => return Err(ErrorKind::InvalidDwarf.into()),
                Cursor::At(pos) => pos,
            };

            let mut reader = Reader::new(section, endian);
            reader.seek(pos)?;
            let abbrev = match Abbrev::parse(&mut reader) {
                Ok(Some(abbrev)) => abbrev,
                Ok(None) | Err(_) => {
                    self.cursor.set(Cursor::Exhausted);
                    return Err(ErrorKind::InvalidDwarf.into());
                }
            };
            self.cursor.set(Cursor::At(reader.position()));

            let found = abbrev.code;
            if self.cache.get(&found).is_some() {
                // Codes are unique within a unit.
                self.cursor.set(Cursor::Exhausted);
                return Err(ErrorKind::InvalidDwarf.into());
            }
            let cached = self.cache.insert(found, Box::new(abbrev));
            if found == code {
                return Ok(cached);
            }
        }
    }
}
