//! Attribute values and form decoding.
//!
//! An attribute is decoded against its unit: the form code selects the
//! encoding, the unit supplies address and offset widths. Each accessor
//! covers one semantic class and rejects forms outside it with the matching
//! schema error, so callers always learn whether they misread the schema
//! (`NoAddress`, `NoConstant`, and so on) or the file is broken
//! (`InvalidDwarf`).

use crate::constants;
use crate::die::Die;
use crate::dwarf::Dwarf;
use crate::error::{Error, ErrorKind};
use crate::reader::Reader;
use crate::unit::Unit;

/// A single decoded attribute of a DIE.
#[derive(Clone)]
pub struct Attribute<'a, 'data> {
    name: u32,
    form: u32,
    value: &'data [u8],
    unit: &'a Unit<'data>,
    dwarf: &'a Dwarf<'data>,
}

impl<'a, 'data> Attribute<'a, 'data> {
    pub(crate) fn new(
        name: u32,
        form: u32,
        value: &'data [u8],
        unit: &'a Unit<'data>,
        dwarf: &'a Dwarf<'data>,
    ) -> Self {
        Attribute {
            name,
            form,
            value,
            unit,
            dwarf,
        }
    }

    /// The attribute name code (`DW_AT_*`).
    pub fn name(&self) -> u32 {
        self.name
    }

    /// The attribute form code (`DW_FORM_*`), with `DW_FORM_indirect`
    /// already resolved.
    pub fn form(&self) -> u32 {
        self.form
    }

    /// The undecoded value bytes, including any length prefix.
    pub fn raw_value(&self) -> &'data [u8] {
        self.value
    }

    /// The unit this attribute was read from.
    pub fn unit(&self) -> &'a Unit<'data> {
        self.unit
    }

    fn value_reader(&self) -> Reader<'data> {
        Reader::new(self.value, self.dwarf.endianity())
    }

    /// Decodes a `DW_FORM_addr` value.
    ///
    /// Any other form reports [`ErrorKind::NoAddress`].
    pub fn address(&self) -> Result<u64, Error> {
        if self.form != constants::DW_FORM_addr {
            return Err(ErrorKind::NoAddress.into());
        }
        self.value_reader().read_address(self.unit.address_size())
    }

    /// Decodes an unsigned constant.
    ///
    /// Accepts the fixed `data{1,2,4,8}` forms, both LEB128 constant forms
    /// and `DW_FORM_sec_offset`; anything else reports
    /// [`ErrorKind::NoConstant`].
    pub fn udata(&self) -> Result<u64, Error> {
        let mut reader = self.value_reader();
        match self.form {
            constants::DW_FORM_data1 => reader.read_u8().map(u64::from),
            constants::DW_FORM_data2 => reader.read_u16().map(u64::from),
            constants::DW_FORM_data4 => reader.read_u32().map(u64::from),
            constants::DW_FORM_data8 => reader.read_u64(),
            constants::DW_FORM_udata => reader.read_uleb128(),
            constants::DW_FORM_sdata => reader.read_sleb128().map(|v| v as u64),
            constants::DW_FORM_sec_offset => reader.read_offset(self.unit.format()),
            _ => Err(ErrorKind::NoConstant.into()),
        }
    }

    /// Decodes a signed constant.
    ///
    /// The fixed `data{1,2,4}` forms carry no sign information and are
    /// zero-extended; only `DW_FORM_sdata` sign-extends.
    pub fn sdata(&self) -> Result<i64, Error> {
        let mut reader = self.value_reader();
        match self.form {
            constants::DW_FORM_data1 => reader.read_u8().map(i64::from),
            constants::DW_FORM_data2 => reader.read_u16().map(i64::from),
            constants::DW_FORM_data4 => reader.read_u32().map(i64::from),
            constants::DW_FORM_data8 => reader.read_u64().map(|v| v as i64),
            constants::DW_FORM_sdata => reader.read_sleb128(),
            constants::DW_FORM_udata => reader.read_uleb128().map(|v| v as i64),
            _ => Err(ErrorKind::NoConstant.into()),
        }
    }

    /// Decodes a string value.
    ///
    /// `DW_FORM_string` returns the in-section bytes; `DW_FORM_strp`
    /// resolves the offset through the string pool. Other forms report
    /// [`ErrorKind::NoString`].
    pub fn string(&self) -> Result<&'data [u8], Error> {
        match self.form {
            constants::DW_FORM_string => self.value_reader().read_null_terminated(),
            constants::DW_FORM_strp => {
                let offset = self.value_reader().read_offset(self.unit.format())?;
                self.dwarf.string_at(offset)
            }
            _ => Err(ErrorKind::NoString.into()),
        }
    }

    /// Decodes a block value, returning the body without its length prefix.
    ///
    /// Accepts `block{1,2,4}`, `block` and `exprloc`; other forms report
    /// [`ErrorKind::NoBlock`]. A length running past the section reports
    /// [`ErrorKind::InvalidDwarf`].
    pub fn block(&self) -> Result<&'data [u8], Error> {
        let mut reader = self.value_reader();
        let length = match self.form {
            constants::DW_FORM_block1 => u64::from(reader.read_u8()?),
            constants::DW_FORM_block2 => u64::from(reader.read_u16()?),
            constants::DW_FORM_block4 => u64::from(reader.read_u32()?),
            constants::DW_FORM_block | constants::DW_FORM_exprloc => reader.read_uleb128()?,
            _ => return Err(ErrorKind::NoBlock.into()),
        };
        let length = usize::try_from(length).map_err(|_| ErrorKind::InvalidDwarf)?;
        reader.read_bytes(length)
    }

    /// Decodes a flag value.
    ///
    /// `DW_FORM_flag` is one byte, true when non-zero; `DW_FORM_flag_present`
    /// occupies no bytes and is always true. Other forms report
    /// [`ErrorKind::NoFlag`].
    pub fn flag(&self) -> Result<bool, Error> {
        match self.form {
            constants::DW_FORM_flag => Ok(self.value_reader().read_u8()? != 0),
            constants::DW_FORM_flag_present => Ok(true),
            _ => Err(ErrorKind::NoFlag.into()),
        }
    }

    /// Decodes a unit-local reference, returning the offset relative to the
    /// unit header.
    ///
    /// `DW_FORM_ref_addr` escapes the unit and reports
    /// [`ErrorKind::InvalidReference`]; non-reference forms report
    /// [`ErrorKind::NoReference`].
    pub fn reference(&self) -> Result<u64, Error> {
        let mut reader = self.value_reader();
        match self.form {
            constants::DW_FORM_ref1 => reader.read_u8().map(u64::from),
            constants::DW_FORM_ref2 => reader.read_u16().map(u64::from),
            constants::DW_FORM_ref4 => reader.read_u32().map(u64::from),
            constants::DW_FORM_ref8 => reader.read_u64(),
            constants::DW_FORM_ref_udata => reader.read_uleb128(),
            constants::DW_FORM_ref_addr => Err(ErrorKind::InvalidReference.into()),
            _ => Err(ErrorKind::NoReference.into()),
        }
    }

    /// Decodes a reference that may escape the unit: unit-local forms are
    /// rebased onto the unit start, `DW_FORM_ref_addr` is a global
    /// `.debug_info` offset already.
    pub(crate) fn global_reference(&self) -> Result<u64, Error> {
        if self.form == constants::DW_FORM_ref_addr {
            // Global references use the unit's offset width (address width
            // in DWARF 2).
            let mut reader = self.value_reader();
            if self.unit.version() == 2 {
                reader.read_address(self.unit.address_size())
            } else {
                reader.read_offset(self.unit.format())
            }
        } else {
            Ok(self.unit.offset() + self.reference()?)
        }
    }

    /// Resolves a reference attribute to the DIE it names.
    pub fn reference_die(&self) -> Result<Die<'a, 'data>, Error> {
        let offset = self.unit.offset() + self.reference()?;
        self.dwarf.die_at(offset)
    }
}

impl std::fmt::Debug for Attribute<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &format_args!("{:#x}", self.name))
            .field("form", &format_args!("{:#x}", self.form))
            .field("value.len()", &self.value.len())
            .finish()
    }
}

/// Consumes one attribute value from `reader`, returning exactly the bytes
/// it occupies.
///
/// The length is a function of the form, the unit's address and offset
/// widths, and, for the variable forms, the bytes themselves.
/// `DW_FORM_indirect` is resolved here; the returned form is the resolved
/// one. On any failure the reader is left at the value start.
pub(crate) fn take_value<'data>(
    reader: &mut Reader<'data>,
    form: u32,
    unit: &Unit<'_>,
) -> Result<(u32, &'data [u8]), Error> {
    let mut probe = reader.clone();
    let mut form = form;
    // An indirect form stores the real form in front of the value.
    while form == constants::DW_FORM_indirect {
        form = u32::try_from(probe.read_uleb128()?).map_err(|_| ErrorKind::InvalidDwarf)?;
    }

    let start = probe.position();
    match form {
        constants::DW_FORM_addr => probe.skip(usize::from(unit.address_size()))?,
        constants::DW_FORM_data1
        | constants::DW_FORM_ref1
        | constants::DW_FORM_flag => probe.skip(1)?,
        constants::DW_FORM_data2 | constants::DW_FORM_ref2 => probe.skip(2)?,
        constants::DW_FORM_data4 | constants::DW_FORM_ref4 => probe.skip(4)?,
        constants::DW_FORM_data8
        | constants::DW_FORM_ref8
        | constants::DW_FORM_ref_sig8 => probe.skip(8)?,
        constants::DW_FORM_string => {
            probe.read_null_terminated()?;
        }
        constants::DW_FORM_strp | constants::DW_FORM_sec_offset => {
            probe.skip(usize::from(unit.offset_size()))?
        }
        constants::DW_FORM_ref_addr => {
            // DWARF 2 encoded global references with the address width.
            if unit.version() == 2 {
                probe.skip(usize::from(unit.address_size()))?
            } else {
                probe.skip(usize::from(unit.offset_size()))?
            }
        }
        constants::DW_FORM_block1 => {
            let len = probe.read_u8()?;
            probe.skip(usize::from(len))?;
        }
        constants::DW_FORM_block2 => {
            let len = probe.read_u16()?;
            probe.skip(usize::from(len))?;
        }
        constants::DW_FORM_block4 => {
            let len = probe.read_u32()?;
            probe.skip(usize::try_from(len).map_err(|_| ErrorKind::InvalidDwarf)?)?;
        }
        constants::DW_FORM_block | constants::DW_FORM_exprloc => {
            let len = probe.read_uleb128()?;
            probe.skip(usize::try_from(len).map_err(|_| ErrorKind::InvalidDwarf)?)?;
        }
        constants::DW_FORM_udata | constants::DW_FORM_ref_udata => {
            probe.read_uleb128()?;
        }
        constants::DW_FORM_sdata => {
            probe.read_sleb128()?;
        }
        constants::DW_FORM_flag_present => {}
        _ => return Err(ErrorKind::InvalidDwarf.into()),
    }

    let end = probe.position();
    reader.seek(start)?;
    let value = reader.read_bytes(end - start)?;
    Ok((form, value))
}
