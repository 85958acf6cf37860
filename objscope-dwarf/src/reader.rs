//! A bounds-checked cursor over raw section bytes.
//!
//! Every primitive decoder lives here: fixed-width words in either byte
//! order, both LEB128 flavors, initial-length fields and NUL-terminated
//! strings. Reads either return borrowed bytes from the underlying section
//! or plain integers; nothing in this module allocates. A read that would
//! run past the end of the slice fails with [`ErrorKind::InvalidDwarf`] and
//! leaves the cursor where it was.

use crate::error::{Error, ErrorKind};

/// Byte order of the object file the sections were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// The offset dialect of a DWARF contribution.
///
/// Selected by the initial-length field: a 32-bit contribution stores
/// section offsets in 4 bytes, a 64-bit one in 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Dwarf32,
    Dwarf64,
}

impl Format {
    /// The size in bytes of a section offset in this dialect.
    pub fn offset_size(self) -> u8 {
        match self {
            Format::Dwarf32 => 4,
            Format::Dwarf64 => 8,
        }
    }
}

/// The escape value announcing a 64-bit initial length.
const DWARF64_ESCAPE: u32 = 0xffff_ffff;

/// Longest encoding of a 64-bit LEB128 value.
const MAX_LEB128_BYTES: usize = 10;

/// A cursor over a section byte slice.
///
/// Cloning a reader is cheap and clones are independent; decoders routinely
/// fork a reader to look ahead without committing the position.
#[derive(Debug, Clone)]
pub struct Reader<'data> {
    data: &'data [u8],
    pos: usize,
    endian: Endianness,
}

impl<'data> Reader<'data> {
    /// Creates a reader over `data` positioned at its start.
    pub fn new(data: &'data [u8], endian: Endianness) -> Self {
        Reader {
            data,
            pos: 0,
            endian,
        }
    }

    /// The byte order used for fixed-width reads.
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Current position relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Repositions the cursor. The offset may be anywhere up to and
    /// including the end of the slice.
    pub fn seek(&mut self, pos: usize) -> Result<(), Error> {
        if pos > self.data.len() {
            return Err(ErrorKind::InvalidDwarf.into());
        }
        self.pos = pos;
        Ok(())
    }

    /// Bytes remaining after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True when the cursor sits at the end of the slice.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Total length of the underlying slice.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Takes the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'data [u8], Error> {
        let bytes = self
            .data
            .get(self.pos..self.pos.checked_add(n).ok_or(ErrorKind::InvalidDwarf)?)
            .ok_or(ErrorKind::InvalidDwarf)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Advances the cursor by `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let bytes: [u8; 2] = self.read_bytes(2)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    /// Reads a 3-byte word, widening to `u32`.
    pub fn read_u24(&mut self) -> Result<u32, Error> {
        let bytes = self.read_bytes(3)?;
        Ok(match self.endian {
            Endianness::Little => {
                u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16
            }
            Endianness::Big => {
                u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2])
            }
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let bytes: [u8; 4] = self.read_bytes(4)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let bytes: [u8; 8] = self.read_bytes(8)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Little => u64::from_le_bytes(bytes),
            Endianness::Big => u64::from_be_bytes(bytes),
        })
    }

    /// Reads an address of the width recorded in the unit header.
    pub fn read_address(&mut self, address_size: u8) -> Result<u64, Error> {
        match address_size {
            4 => self.read_u32().map(u64::from),
            8 => self.read_u64(),
            _ => Err(ErrorKind::InvalidDwarf.into()),
        }
    }

    /// Reads a section offset of the width selected by `format`.
    pub fn read_offset(&mut self, format: Format) -> Result<u64, Error> {
        match format {
            Format::Dwarf32 => self.read_u32().map(u64::from),
            Format::Dwarf64 => self.read_u64(),
        }
    }

    /// Reads an unsigned LEB128 value.
    ///
    /// Accepts at most ten continuation bytes; anything longer cannot fit a
    /// 64-bit value and reports `InvalidDwarf`.
    pub fn read_uleb128(&mut self) -> Result<u64, Error> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        for _ in 0..MAX_LEB128_BYTES {
            let byte = self.read_u8()?;
            let group = u64::from(byte & 0x7f);
            if shift == 63 && group > 1 {
                // Payload past bit 63.
                return Err(ErrorKind::InvalidDwarf.into());
            }
            result |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(ErrorKind::InvalidDwarf.into())
    }

    /// Reads a signed LEB128 value, sign-extending from the final group.
    pub fn read_sleb128(&mut self) -> Result<i64, Error> {
        let mut result: i64 = 0;
        let mut shift = 0u32;
        for _ in 0..MAX_LEB128_BYTES {
            let byte = self.read_u8()?;
            if shift == 63 {
                let group = byte & 0x7f;
                // Only all-zero or all-one high groups are representable.
                if group != 0 && group != 0x7f {
                    return Err(ErrorKind::InvalidDwarf.into());
                }
            }
            result |= i64::from(byte & 0x7f) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
        }
        Err(ErrorKind::InvalidDwarf.into())
    }

    /// Reads an initial-length field, detecting the 64-bit escape.
    pub fn read_initial_length(&mut self) -> Result<(u64, Format), Error> {
        let word = self.read_u32()?;
        if word == DWARF64_ESCAPE {
            let length = self.read_u64()?;
            Ok((length, Format::Dwarf64))
        } else {
            Ok((u64::from(word), Format::Dwarf32))
        }
    }

    /// Reads a NUL-terminated string, returning the bytes before the
    /// terminator and consuming the terminator itself.
    ///
    /// A missing terminator reports [`ErrorKind::NoString`].
    pub fn read_null_terminated(&mut self) -> Result<&'data [u8], Error> {
        let rest = &self.data[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ErrorKind::NoString)?;
        let bytes = &rest[..nul];
        self.pos += nul + 1;
        Ok(bytes)
    }
}
