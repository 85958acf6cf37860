//! `.debug_aranges`: the address-to-unit index.
//!
//! Each unit may contribute a header plus a run of (address, length) tuples
//! closed by a (0, 0) pair. Contributions are decoded in one pass, their
//! entries concatenated and sorted by address, after which an address
//! resolves to its owning unit with a binary search.

use crate::error::{Error, ErrorKind};
use crate::reader::{Endianness, Reader};
use crate::sections::{DwarfSections, SectionId};

/// One address range and the unit describing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArangeEntry {
    address: u64,
    length: u64,
    unit_offset: u64,
}

impl ArangeEntry {
    /// First address of the range.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Length of the range in bytes, never zero.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// `.debug_info` offset of the unit header describing this range.
    pub fn unit_offset(&self) -> u64 {
        self.unit_offset
    }

    /// Whether `address` falls inside the half-open range.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.address && address - self.address < self.length
    }
}

/// Every address range of the file, sorted by address.
#[derive(Debug)]
pub struct Aranges {
    entries: Vec<ArangeEntry>,
}

impl Aranges {
    /// Decodes all contributions of `.debug_aranges`.
    ///
    /// An absent section reports `NoEntry`. Malformed headers, malformed
    /// tuples and a contribution that ends without its (0, 0) terminator
    /// report `InvalidDwarf`.
    pub(crate) fn parse(
        sections: &DwarfSections<'_>,
        endian: Endianness,
    ) -> Result<Aranges, Error> {
        let section = sections.require(SectionId::DebugAranges, ErrorKind::NoEntry)?;
        let info_len = sections
            .get(SectionId::DebugInfo)
            .map(|info| info.len() as u64)
            .unwrap_or(0);

        let mut reader = Reader::new(section, endian);
        let mut entries = Vec::new();

        while !reader.is_empty() {
            let contribution_start = reader.position();
            let (length, format) = reader.read_initial_length()?;
            let contribution_end = reader.position() as u64 + length;
            if contribution_end > section.len() as u64 {
                return Err(ErrorKind::InvalidDwarf.into());
            }
            let contribution_end = contribution_end as usize;

            let version = reader.read_u16()?;
            if version != 2 {
                return Err(ErrorKind::InvalidDwarf.into());
            }

            let unit_offset = reader.read_offset(format)?;
            if unit_offset >= info_len {
                return Err(ErrorKind::InvalidDwarf.into());
            }

            let address_size = reader.read_u8()?;
            if address_size != 4 && address_size != 8 {
                return Err(ErrorKind::InvalidDwarf.into());
            }
            let segment_size = reader.read_u8()?;
            if segment_size != 0 {
                // Segmented address spaces are not supported.
                return Err(ErrorKind::InvalidDwarf.into());
            }

            // Tuples start at a multiple of the tuple size, counted from the
            // contribution header.
            let tuple_size = 2 * usize::from(address_size);
            let misalignment = (reader.position() - contribution_start) % tuple_size;
            if misalignment != 0 {
                reader.skip(tuple_size - misalignment)?;
            }

            let mut terminated = false;
            while reader.position() < contribution_end {
                let address = reader.read_address(address_size)?;
                let length = reader.read_address(address_size)?;
                if address == 0 && length == 0 {
                    terminated = true;
                    break;
                }
                if length == 0 {
                    // Degenerate tuple; keep the invariant that every entry
                    // spans at least one byte.
                    continue;
                }
                entries.push(ArangeEntry {
                    address,
                    length,
                    unit_offset,
                });
            }
            if !terminated {
                // The declared length ran out before the (0, 0) pair.
                return Err(ErrorKind::InvalidDwarf.into());
            }
            if reader.position() > contribution_end {
                return Err(ErrorKind::InvalidDwarf.into());
            }
            reader.seek(contribution_end)?;
        }

        // Contributions arrive per unit and are mostly sorted already.
        dmsort::sort_by_key(&mut entries, |entry| entry.address);

        Ok(Aranges { entries })
    }

    /// All entries, sorted by address.
    pub fn entries(&self) -> &[ArangeEntry] {
        &self.entries
    }

    /// Finds the entry whose range contains `address`, or `NoMatch`.
    pub fn find(&self, address: u64) -> Result<&ArangeEntry, Error> {
        let entries = &self.entries;
        let mut lower = 0;
        let mut upper = entries.len();
        while lower < upper {
            let idx = (lower + upper) / 2;
            let entry = &entries[idx];
            if address < entry.address {
                upper = idx;
            } else if address > entry.address && address - entry.address >= entry.length {
                lower = idx + 1;
            } else {
                return Ok(entry);
            }
        }
        Err(ErrorKind::NoMatch.into())
    }
}
