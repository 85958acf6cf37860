//! Line-number programs.
//!
//! `.debug_line` holds one bytecode program per unit. Executing it produces
//! the unit's line table: an address-sorted run of rows mapping machine
//! addresses to (file, line, column) plus the statement and sequence flags,
//! with every contiguous code range closed by an end-sequence row whose
//! address is one past its last instruction.
//!
//! Execution happens once per unit. The result is cached on the unit in a
//! three-state slot (untried, failed, or ready) so a table that failed to
//! parse reports the same error on every later query without rereading the
//! section.

use crate::constants;
use crate::dwarf::Dwarf;
use crate::error::{Error, ErrorKind};
use crate::reader::Reader;
use crate::sections::SectionId;
use crate::unit::Unit;

/// One row of a line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRow {
    address: u64,
    file: u64,
    line: u64,
    column: u64,
    is_stmt: bool,
    basic_block: bool,
    end_sequence: bool,
    prologue_end: bool,
    epilogue_begin: bool,
    isa: u64,
}

impl LineRow {
    /// The machine address the row describes.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// 1-based index into the table's file entries.
    pub fn file_index(&self) -> u64 {
        self.file
    }

    /// The 1-based source line, 0 when the instruction cannot be attributed
    /// to a line.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The 1-based source column, 0 meaning the left edge.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// Whether the address is a recommended breakpoint location.
    pub fn is_statement(&self) -> bool {
        self.is_stmt
    }

    /// Whether the address starts a basic block.
    pub fn basic_block(&self) -> bool {
        self.basic_block
    }

    /// Whether this row closes a sequence; its address is one past the
    /// sequence's last instruction.
    pub fn end_sequence(&self) -> bool {
        self.end_sequence
    }

    /// Whether execution should pause here when skipping a prologue.
    pub fn prologue_end(&self) -> bool {
        self.prologue_end
    }

    /// Whether execution should pause here before an epilogue.
    pub fn epilogue_begin(&self) -> bool {
        self.epilogue_begin
    }

    /// The instruction-set architecture selector.
    pub fn isa(&self) -> u64 {
        self.isa
    }
}

/// One entry of a line table's file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry<'data> {
    name: &'data [u8],
    dir_index: u64,
    mtime: u64,
    length: u64,
}

impl<'data> FileEntry<'data> {
    /// The file name as recorded, possibly relative to its directory.
    pub fn name(&self) -> &'data [u8] {
        self.name
    }

    /// 1-based index into the directory table; 0 names the compilation
    /// directory.
    pub fn directory_index(&self) -> u64 {
        self.dir_index
    }

    /// Modification time at compile time, 0 when unknown.
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// File size at compile time, 0 when unknown.
    pub fn length(&self) -> u64 {
        self.length
    }
}

/// The decoded line table of one unit.
#[derive(Debug)]
pub struct LineTable<'data> {
    rows: Vec<LineRow>,
    files: Vec<FileEntry<'data>>,
    dirs: Vec<&'data [u8]>,
}

impl<'data> LineTable<'data> {
    /// All rows, sorted by address with an end-sequence row preceding an
    /// ordinary row at the same address.
    pub fn rows(&self) -> &[LineRow] {
        &self.rows
    }

    /// The file table, in declaration order.
    pub fn files(&self) -> &[FileEntry<'data>] {
        &self.files
    }

    /// The include-directory table, in declaration order.
    pub fn directories(&self) -> &[&'data [u8]] {
        &self.dirs
    }

    /// Resolves a 1-based file index as used by `DW_AT_decl_file` and the
    /// `file` register.
    pub fn file(&self, index: u64) -> Result<&FileEntry<'data>, Error> {
        index
            .checked_sub(1)
            .and_then(|i| self.files.get(usize::try_from(i).ok()?))
            .ok_or_else(|| ErrorKind::InvalidLineIndex.into())
    }

    /// Resolves a 1-based directory index; 0 (the compilation directory) has
    /// no entry here.
    pub fn directory(&self, index: u64) -> Option<&'data [u8]> {
        index
            .checked_sub(1)
            .and_then(|i| self.dirs.get(usize::try_from(i).ok()?))
            .copied()
    }

    /// The file's name joined onto its include directory. Absolute names
    /// and names in the compilation directory are returned as-is.
    pub fn full_path(&self, index: u64) -> Result<Vec<u8>, Error> {
        let entry = self.file(index)?;
        if entry.name.first() == Some(&b'/') {
            return Ok(entry.name.to_vec());
        }
        match self.directory(entry.dir_index) {
            Some(dir) => {
                let mut path = dir.to_vec();
                path.push(b'/');
                path.extend_from_slice(entry.name);
                Ok(path)
            }
            None => Ok(entry.name.to_vec()),
        }
    }

    /// Finds the row describing `address`.
    ///
    /// On an exact hit the ordinary row is returned, never an end-sequence
    /// row. Otherwise the nearest predecessor within the same sequence is
    /// returned; an address before the first row or past the end of every
    /// sequence reports `AddressOutOfRange`.
    pub fn row_for_address(&self, address: u64) -> Result<&LineRow, Error> {
        let rows = &self.rows;
        let mut lower = 0;
        let mut upper = rows.len();
        while lower < upper {
            let idx = (lower + upper) / 2;
            if address < rows[idx].address {
                upper = idx;
            } else if address > rows[idx].address || rows[idx].end_sequence {
                lower = idx + 1;
            } else {
                return Ok(&rows[idx]);
            }
        }

        // No exact hit: the closest row below, unless the address sits past
        // an end-sequence marker.
        if upper > 0 && upper < rows.len() && address > rows[upper - 1].address {
            let mut back = upper;
            while back > 0 && rows[back - 1].end_sequence {
                back -= 1;
            }
            if back > 0 {
                return Ok(&rows[back - 1]);
            }
        }

        Err(ErrorKind::AddressOutOfRange.into())
    }
}

/// The state-machine registers, at their per-sequence reset values.
struct LineState {
    address: u64,
    file: u64,
    line: i64,
    column: u64,
    is_stmt: bool,
    basic_block: bool,
    prologue_end: bool,
    epilogue_begin: bool,
    isa: u64,
}

impl LineState {
    fn new(default_is_stmt: bool) -> Self {
        LineState {
            address: 0,
            file: 1,
            line: 1,
            column: 0,
            is_stmt: default_is_stmt,
            basic_block: false,
            prologue_end: false,
            epilogue_begin: false,
            isa: 0,
        }
    }

    fn emit(&mut self, rows: &mut Vec<LineRow>, end_sequence: bool) -> Result<(), Error> {
        let line = u64::try_from(self.line).map_err(|_| ErrorKind::InvalidDwarf)?;
        rows.push(LineRow {
            address: self.address,
            file: self.file,
            line,
            column: self.column,
            is_stmt: self.is_stmt,
            basic_block: self.basic_block,
            end_sequence,
            prologue_end: self.prologue_end,
            epilogue_begin: self.epilogue_begin,
            isa: self.isa,
        });
        self.basic_block = false;
        self.prologue_end = false;
        self.epilogue_begin = false;
        Ok(())
    }
}

/// Runs the unit's line program to completion.
pub(crate) fn parse_line_program<'data>(
    dwarf: &Dwarf<'data>,
    unit: &Unit<'data>,
) -> Result<LineTable<'data>, Error> {
    let cu_die = dwarf.unit_die(unit);
    let stmt_list = cu_die
        .attr(constants::DW_AT_stmt_list)?
        .ok_or(ErrorKind::NoEntry)?;
    let offset = stmt_list.udata()?;

    let section = dwarf
        .sections()
        .require(SectionId::DebugLine, ErrorKind::NoEntry)?;
    let mut reader = Reader::new(section, dwarf.endianity());
    reader.seek(usize::try_from(offset).map_err(|_| ErrorKind::InvalidDwarf)?)?;

    // Header.
    let (unit_length, format) = reader.read_initial_length()?;
    let program_end = reader.position() as u64 + unit_length;
    if program_end > section.len() as u64 {
        return Err(ErrorKind::InvalidDwarf.into());
    }
    let program_end = program_end as usize;

    let version = reader.read_u16()?;
    if !(2..=4).contains(&version) {
        return Err(ErrorKind::InvalidDwarf.into());
    }

    let header_length = reader.read_offset(format)?;
    let program_start = reader.position() as u64 + header_length;
    if program_start > program_end as u64 {
        return Err(ErrorKind::InvalidDwarf.into());
    }
    let program_start = program_start as usize;

    let min_inst_length = u64::from(reader.read_u8()?);
    if min_inst_length == 0 {
        return Err(ErrorKind::InvalidDwarf.into());
    }
    if version >= 4 {
        // Maximum operations per instruction; operation advances collapse
        // onto the address for the non-VLIW case.
        let max_ops = reader.read_u8()?;
        if max_ops == 0 {
            return Err(ErrorKind::InvalidDwarf.into());
        }
    }
    let default_is_stmt = reader.read_u8()? != 0;
    let line_base = i64::from(reader.read_u8()? as i8);
    let line_range = u64::from(reader.read_u8()?);
    if line_range == 0 {
        return Err(ErrorKind::InvalidDwarf.into());
    }
    let opcode_base = reader.read_u8()?;
    if opcode_base == 0 {
        return Err(ErrorKind::InvalidDwarf.into());
    }
    let mut std_opcode_lengths = Vec::with_capacity(usize::from(opcode_base) - 1);
    for _ in 1..opcode_base {
        std_opcode_lengths.push(reader.read_u8()?);
    }

    // Directory table: NUL-terminated names up to an empty one.
    let mut dirs = Vec::new();
    loop {
        let name = reader.read_null_terminated()?;
        if name.is_empty() {
            break;
        }
        dirs.push(name);
    }

    // File table: (name, directory, mtime, length) up to an empty name.
    let mut files = Vec::new();
    loop {
        let name = reader.read_null_terminated()?;
        if name.is_empty() {
            break;
        }
        files.push(FileEntry {
            name,
            dir_index: reader.read_uleb128()?,
            mtime: reader.read_uleb128()?,
            length: reader.read_uleb128()?,
        });
    }

    if reader.position() > program_start {
        // The tables overran the declared header length.
        return Err(ErrorKind::InvalidDwarf.into());
    }
    reader.seek(program_start)?;

    // The program proper.
    let mut rows = Vec::new();
    let mut state = LineState::new(default_is_stmt);
    let address_size = unit.address_size();
    let const_pc_advance = (255 - u64::from(opcode_base)) / line_range * min_inst_length;

    while reader.position() < program_end {
        let opcode = reader.read_u8()?;

        if opcode >= opcode_base {
            // Special opcode: advance address and line, emit.
            let adjusted = u64::from(opcode - opcode_base);
            state.address = state
                .address
                .wrapping_add(adjusted / line_range * min_inst_length);
            state.line = state
                .line
                .wrapping_add(line_base + (adjusted % line_range) as i64);
            state.emit(&mut rows, false)?;
            continue;
        }

        match opcode {
            0 => {
                // Extended opcode with explicit length.
                let length = reader.read_uleb128()?;
                let length = usize::try_from(length).map_err(|_| ErrorKind::InvalidDwarf)?;
                if length == 0 {
                    return Err(ErrorKind::InvalidDwarf.into());
                }
                let operand_end = reader
                    .position()
                    .checked_add(length)
                    .filter(|&end| end <= program_end)
                    .ok_or(ErrorKind::InvalidDwarf)?;

                let sub_opcode = reader.read_u8()?;
                match sub_opcode {
                    constants::DW_LNE_end_sequence => {
                        state.emit(&mut rows, true)?;
                        state = LineState::new(default_is_stmt);
                    }
                    constants::DW_LNE_set_address => {
                        state.address = reader.read_address(address_size)?;
                    }
                    constants::DW_LNE_define_file => {
                        let name = reader.read_null_terminated()?;
                        files.push(FileEntry {
                            name,
                            dir_index: reader.read_uleb128()?,
                            mtime: reader.read_uleb128()?,
                            length: reader.read_uleb128()?,
                        });
                    }
                    _ => {
                        // Vendor extensions and newer opcodes carry their
                        // own length; step over them.
                    }
                }
                if reader.position() > operand_end {
                    return Err(ErrorKind::InvalidDwarf.into());
                }
                reader.seek(operand_end)?;
            }
            constants::DW_LNS_copy => {
                state.emit(&mut rows, false)?;
            }
            constants::DW_LNS_advance_pc => {
                let advance = reader.read_uleb128()?;
                state.address = state
                    .address
                    .wrapping_add(advance.wrapping_mul(min_inst_length));
            }
            constants::DW_LNS_advance_line => {
                state.line = state.line.wrapping_add(reader.read_sleb128()?);
            }
            constants::DW_LNS_set_file => {
                state.file = reader.read_uleb128()?;
            }
            constants::DW_LNS_set_column => {
                state.column = reader.read_uleb128()?;
            }
            constants::DW_LNS_negate_stmt => {
                state.is_stmt = !state.is_stmt;
            }
            constants::DW_LNS_set_basic_block => {
                state.basic_block = true;
            }
            constants::DW_LNS_const_add_pc => {
                state.address = state.address.wrapping_add(const_pc_advance);
            }
            constants::DW_LNS_fixed_advance_pc => {
                state.address = state.address.wrapping_add(u64::from(reader.read_u16()?));
            }
            constants::DW_LNS_set_prologue_end => {
                state.prologue_end = true;
            }
            constants::DW_LNS_set_epilogue_begin => {
                state.epilogue_begin = true;
            }
            constants::DW_LNS_set_isa => {
                state.isa = reader.read_uleb128()?;
            }
            _ => {
                // A standard opcode this reader predates; the header's
                // length table says how many LEB operands to step over.
                let operands = std_opcode_lengths[usize::from(opcode) - 1];
                for _ in 0..operands {
                    reader.read_uleb128()?;
                }
            }
        }
    }

    // Sequences may legally be emitted out of address order relative to one
    // another. Restore the global order; a sequence-closing marker precedes
    // an ordinary row at the same address, so a sequence opening where
    // another ended stays reachable.
    let key = |row: &LineRow| (row.address, !row.end_sequence);
    if !rows.windows(2).all(|pair| key(&pair[0]) <= key(&pair[1])) {
        rows.sort_by_key(key);
    }

    Ok(LineTable { rows, files, dirs })
}

impl<'data> Unit<'data> {
    /// The unit's line table, computed on first use.
    ///
    /// A unit without a line program reports `NoEntry`; a malformed program
    /// reports its parse error again on every call without reparsing.
    pub fn line_table<'a>(&'a self, dwarf: &'a Dwarf<'data>) -> Result<&'a LineTable<'data>, Error> {
        let cached = self
            .lines
            .get_or_init(|| parse_line_program(dwarf, self).map_err(|err| err.kind()));
        match cached {
            Ok(table) => Ok(table),
            Err(kind) => Err((*kind).into()),
        }
    }
}
