//! Memory-mapped object files.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapMut, MmapOptions};

use objscope_dwarf::{Error, ErrorKind};

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Map the file read-only.
    Read,
    /// Prepare a file for emission. This toolkit only reads; the mode is
    /// reserved and reports `InvalidCommand`.
    Write,
    /// Map the file copy-on-write: the mapping is writable, the file is
    /// not touched.
    ReadWrite,
}

#[derive(Debug)]
enum Backing {
    Empty,
    Shared(Mmap),
    Private(MmapMut),
}

/// An object file mapped into memory.
#[derive(Debug)]
pub struct FileMapping {
    backing: Backing,
}

impl FileMapping {
    /// Opens and maps the file at `path`.
    ///
    /// Reports `InvalidCommand` for [`Mode::Write`], `NoRegularFile` when
    /// the path names something other than a regular file, and `Io` for
    /// open or map failures.
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode) -> Result<FileMapping, Error> {
        if mode == Mode::Write {
            return Err(ErrorKind::InvalidCommand.into());
        }

        let path = path.as_ref();
        let metadata =
            std::fs::metadata(path).map_err(|err| Error::new(ErrorKind::Io, err))?;
        if !metadata.is_file() {
            return Err(ErrorKind::NoRegularFile.into());
        }

        let file = File::open(path).map_err(|err| Error::new(ErrorKind::Io, err))?;
        if metadata.len() == 0 {
            // Zero-length mappings are rejected by some platforms.
            return Ok(FileMapping {
                backing: Backing::Empty,
            });
        }

        let backing = match mode {
            Mode::Read => Backing::Shared(
                // The file must not be truncated while mapped; the usual
                // object-file contract.
                unsafe { Mmap::map(&file) }.map_err(|err| Error::new(ErrorKind::Io, err))?,
            ),
            Mode::ReadWrite => Backing::Private(
                unsafe { MmapOptions::new().map_copy(&file) }
                    .map_err(|err| Error::new(ErrorKind::Io, err))?,
            ),
            Mode::Write => unreachable!(),
        };
        Ok(FileMapping { backing })
    }

    /// The mapped bytes.
    pub fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Empty => &[],
            Backing::Shared(map) => map,
            Backing::Private(map) => map,
        }
    }

    /// The mapped bytes, mutable. `None` unless opened with
    /// [`Mode::ReadWrite`].
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.backing {
            Backing::Private(map) => Some(map),
            _ => None,
        }
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}
