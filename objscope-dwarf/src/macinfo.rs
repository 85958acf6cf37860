//! `.debug_macinfo`: preprocessor macro records.
//!
//! A unit's records start at the offset named by its root entry's
//! `DW_AT_macro_info` attribute and run to a zero opcode. Records are
//! decoded on the fly; nothing is cached.

use fallible_iterator::FallibleIterator;

use crate::constants;
use crate::error::{Error, ErrorKind};
use crate::reader::Reader;

/// One record of a unit's macro information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroRecord<'data> {
    /// A `#define`, with the line it occurred on and the `NAME VALUE` text.
    Define { line: u64, text: &'data [u8] },
    /// An `#undef`, with the line it occurred on and the macro name.
    Undef { line: u64, text: &'data [u8] },
    /// Inclusion of a file, with the including line and the file's index in
    /// the unit's line-program file table.
    StartFile { line: u64, file: u64 },
    /// The end of the most recently started file.
    EndFile,
    /// A vendor extension record with its constant and payload.
    VendorExt { constant: u64, text: &'data [u8] },
}

/// A fallible iterator over macro records. Obtained from
/// [`Dwarf::macro_records`](crate::Dwarf::macro_records).
#[derive(Debug)]
pub struct MacroIter<'data> {
    reader: Reader<'data>,
    done: bool,
}

impl<'data> MacroIter<'data> {
    pub(crate) fn new(reader: Reader<'data>) -> Self {
        MacroIter {
            reader,
            done: false,
        }
    }
}

impl<'data> FallibleIterator for MacroIter<'data> {
    type Item = MacroRecord<'data>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Error> {
        if self.done || self.reader.is_empty() {
            return Ok(None);
        }

        let opcode = self.reader.read_u8()?;
        let record = match opcode {
            0 => {
                self.done = true;
                return Ok(None);
            }
            constants::DW_MACINFO_define => MacroRecord::Define {
                line: self.reader.read_uleb128()?,
                text: self.reader.read_null_terminated()?,
            },
            constants::DW_MACINFO_undef => MacroRecord::Undef {
                line: self.reader.read_uleb128()?,
                text: self.reader.read_null_terminated()?,
            },
            constants::DW_MACINFO_start_file => MacroRecord::StartFile {
                line: self.reader.read_uleb128()?,
                file: self.reader.read_uleb128()?,
            },
            constants::DW_MACINFO_end_file => MacroRecord::EndFile,
            constants::DW_MACINFO_vendor_ext => MacroRecord::VendorExt {
                constant: self.reader.read_uleb128()?,
                text: self.reader.read_null_terminated()?,
            },
            _ => {
                self.done = true;
                return Err(ErrorKind::InvalidDwarf.into());
            }
        };
        Ok(Some(record))
    }
}
