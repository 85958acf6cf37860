//! `.debug_pubnames`: the global-name index.
//!
//! The section is a run of per-unit sets: a header naming the unit's
//! `.debug_info` range, then (offset, name) pairs where the offset is
//! unit-relative and zero closes the set. A set whose declared length runs
//! out before that zero entry is malformed and reports `InvalidDwarf`.

use fallible_iterator::FallibleIterator;

use crate::error::{Error, ErrorKind};
use crate::reader::{Format, Reader};

/// One entry of the global-name index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubName<'data> {
    unit_offset: u64,
    die_offset: u64,
    name: &'data [u8],
}

impl<'data> PubName<'data> {
    /// `.debug_info` offset of the unit header declaring the name.
    pub fn unit_offset(&self) -> u64 {
        self.unit_offset
    }

    /// Global `.debug_info` offset of the named entry.
    pub fn die_offset(&self) -> u64 {
        self.die_offset
    }

    /// The name, as recorded.
    pub fn name(&self) -> &'data [u8] {
        self.name
    }
}

/// State of the set currently being walked.
#[derive(Clone, Copy)]
struct PubNameSet {
    unit_offset: u64,
    format: Format,
    end: usize,
}

/// A fallible iterator over the global-name index. Obtained from
/// [`Dwarf::pubnames`](crate::Dwarf::pubnames).
pub struct PubNameIter<'data> {
    reader: Reader<'data>,
    set: Option<PubNameSet>,
    info_len: u64,
}

impl<'data> PubNameIter<'data> {
    pub(crate) fn new(reader: Reader<'data>, info_len: u64) -> Self {
        PubNameIter {
            reader,
            set: None,
            info_len,
        }
    }

    /// Parses the next set header.
    fn start_set(&mut self) -> Result<PubNameSet, Error> {
        let (length, format) = self.reader.read_initial_length()?;
        let end = self.reader.position() as u64 + length;
        if end > self.reader.len() as u64 {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let version = self.reader.read_u16()?;
        if version != 2 {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        let unit_offset = self.reader.read_offset(format)?;
        let unit_length = self.reader.read_offset(format)?;
        if unit_offset >= self.info_len || unit_offset + unit_length > self.info_len {
            return Err(ErrorKind::InvalidDwarf.into());
        }

        Ok(PubNameSet {
            unit_offset,
            format,
            end: end as usize,
        })
    }
}

impl<'data> FallibleIterator for PubNameIter<'data> {
    type Item = PubName<'data>;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Error> {
        loop {
            let set = match self.set {
                Some(set) => set,
                None => {
                    if self.reader.is_empty() {
                        return Ok(None);
                    }
                    let set = self.start_set()?;
                    self.set = Some(set);
                    set
                }
            };

            if self.reader.position() >= set.end {
                // The declared length ran out before the zero terminator.
                return Err(ErrorKind::InvalidDwarf.into());
            }

            let offset = self.reader.read_offset(set.format)?;
            if offset == 0 {
                self.set = None;
                self.reader.seek(set.end)?;
                continue;
            }

            let name = self.reader.read_null_terminated()?;
            return Ok(Some(PubName {
                unit_offset: set.unit_offset,
                die_offset: set.unit_offset + offset,
                name,
            }));
        }
    }
}
