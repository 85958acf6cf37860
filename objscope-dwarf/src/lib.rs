//! A lazy, bounds-checked reader for DWARF debugging information.
//!
//! The reader turns the raw bytes of a file's debug sections into a
//! navigable tree of debugging information entries, an addressable table of
//! source-line rows and a searchable set of address ranges, without
//! copying the sections or materializing anything before it is asked for.
//!
//! The container format stays out of the picture: whoever parsed the object
//! file supplies a [`DwarfSections`] map of borrowed byte slices (the
//! companion `objscope-elf` crate does this for ELF images) and a
//! [`Dwarf`] handle is built over it:
//!
//! ```
//! use objscope_dwarf::{Dwarf, DwarfSections, Endianness};
//!
//! let sections = DwarfSections::default();
//! let dwarf = Dwarf::new(sections, Endianness::Little);
//! // No sections were supplied, so there is no range index to decode.
//! assert!(dwarf.aranges().is_err());
//! ```
//!
//! From the handle, [`Dwarf::units`] enumerates compilation units,
//! [`Die`] cursors walk their entry trees and decode attributes by form,
//! [`Unit::line_table`] executes the unit's line program once and caches
//! the rows, and [`Dwarf::die_for_address`] maps addresses back to units
//! through `.debug_aranges`.
//!
//! All decoding is done against the DWARF vocabulary as it appears on disk;
//! the [`constants`] module spells out the tag, attribute, form and opcode
//! codes without wrapping them in closed enums.

mod abbrev;
mod aranges;
mod arena;
mod attr;
mod backend;
pub mod constants;
mod die;
mod dwarf;
mod error;
mod line;
mod macinfo;
mod pubnames;
mod reader;
mod scopes;
mod sections;
mod unit;

pub use abbrev::{Abbrev, AttrSpec};
pub use aranges::{ArangeEntry, Aranges};
pub use attr::Attribute;
pub use backend::{visit_formal_parameters, Backend, RelocSimpleType, X86_64};
pub use die::{AttrIter, Die};
pub use dwarf::Dwarf;
pub use error::{last_error_kind, Error, ErrorKind};
pub use line::{FileEntry, LineRow, LineTable};
pub use macinfo::{MacroIter, MacroRecord};
pub use pubnames::{PubName, PubNameIter};
pub use reader::{Endianness, Format, Reader};
pub use scopes::{visit_scopes, DieChain, Visit};
pub use sections::{DwarfSections, SectionId};
pub use unit::{CompilationUnits, Unit};

pub use fallible_iterator::FallibleIterator;
