//! The ELF side of the objscope toolkit.
//!
//! [`ElfObject`] wraps a parsed ELF image and resolves debug sections by
//! their plain names (`"debug_info"` for `.debug_info`), inflating
//! zlib-compressed section data where the file carries it. [`DwarfData`]
//! collects those sections and bridges into the `objscope-dwarf` reader.
//! [`FileMapping`] memory-maps object files from disk.

use std::borrow::Cow;

use flate2::{Decompress, FlushDecompress};
use goblin::container::Ctx;
use goblin::elf;
use goblin::elf::compression_header::{CompressionHeader, ELFCOMPRESS_ZLIB};

use objscope_dwarf::{Dwarf, DwarfSections, Endianness, Error, ErrorKind, SectionId};

mod mapping;

pub use mapping::{FileMapping, Mode};

const SHF_COMPRESSED: u64 = elf::section_header::SHF_COMPRESSED as u64;

/// Information and data of one ELF section.
#[derive(Debug, Clone)]
pub struct Section<'data> {
    /// Virtual memory address of the section.
    pub address: u64,
    /// File offset of the section data.
    pub offset: u64,
    /// Address alignment, a power of two.
    pub align: u64,
    /// The section bytes; owned when inflated from compressed data.
    pub data: Cow<'data, [u8]>,
}

/// A parsed ELF image.
pub struct ElfObject<'data> {
    elf: elf::Elf<'data>,
    data: &'data [u8],
}

impl<'data> ElfObject<'data> {
    /// Tests whether the buffer starts with an ELF magic.
    pub fn test(data: &[u8]) -> bool {
        data.get(..elf::header::SELFMAG)
            .is_some_and(|magic| magic == elf::header::ELFMAG)
    }

    /// Parses the buffer as an ELF image.
    ///
    /// A buffer goblin rejects reports `InvalidFile` with the parse failure
    /// as source.
    pub fn parse(data: &'data [u8]) -> Result<Self, Error> {
        let elf = elf::Elf::parse(data)
            .map_err(|err| Error::new(ErrorKind::InvalidFile, err))?;
        Ok(ElfObject { elf, data })
    }

    /// The raw bytes the image was parsed from.
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// The byte order recorded in the image header.
    pub fn endianity(&self) -> Endianness {
        if self.elf.little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// Whether the image is 64-bit.
    pub fn is_64(&self) -> bool {
        self.elf.is_64
    }

    /// The machine field of the header, e.g. `EM_X86_64`.
    pub fn machine(&self) -> u16 {
        self.elf.header.e_machine
    }

    /// Looks up a section by its plain name, returning its data as stored
    /// in the file, possibly still compressed.
    ///
    /// Pass `"debug_info"` to find `.debug_info` or its compressed
    /// `.zdebug_info` spelling.
    pub fn raw_section(&self, name: &str) -> Option<Section<'data>> {
        self.find_section(name).map(|(_, section)| section)
    }

    /// Looks up a section by its plain name, inflating compressed data.
    pub fn section(&self, name: &str) -> Option<Section<'data>> {
        let (compressed, mut section) = self.find_section(name)?;
        if compressed {
            let inflated = self.decompress_section(&section.data)?;
            section.data = Cow::Owned(inflated);
        }
        Some(section)
    }

    /// Whether a section with this plain name exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.find_section(name).is_some()
    }

    /// The borrowed bytes of an uncompressed section; `None` when absent or
    /// compressed.
    pub fn section_slice(&self, name: &str) -> Option<&'data [u8]> {
        match self.find_section(name)? {
            (false, section) => match section.data {
                Cow::Borrowed(data) => Some(data),
                Cow::Owned(_) => None,
            },
            (true, _) => None,
        }
    }

    /// Locates a section, reporting whether its data is compressed.
    fn find_section(&self, name: &str) -> Option<(bool, Section<'data>)> {
        for header in &self.elf.section_headers {
            // Skip sections without file contents; debug sections are
            // normally SHT_PROGBITS but other types occur in the wild.
            if header.sh_type == elf::section_header::SHT_NOBITS {
                continue;
            }
            let section_name = match self.elf.shdr_strtab.get_at(header.sh_name) {
                Some(section_name) if !section_name.is_empty() => section_name,
                _ => continue,
            };
            if header.sh_offset == 0 {
                // Phantom headers left behind by strippers.
                continue;
            }

            // Ancient toolchains spelled compressed sections `.zdebug_*`;
            // current ones set SHF_COMPRESSED instead.
            let (compressed, plain_name) = match section_name.strip_prefix(".z") {
                Some(stripped) => (true, stripped),
                None => {
                    let trimmed = section_name.strip_prefix('.').unwrap_or(section_name);
                    (header.sh_flags & SHF_COMPRESSED != 0, trimmed)
                }
            };
            if plain_name != name {
                continue;
            }

            let offset = usize::try_from(header.sh_offset).ok()?;
            let size = usize::try_from(header.sh_size).ok()?;
            let data = self.data.get(offset..offset.checked_add(size)?)?;
            return Some((
                compressed,
                Section {
                    address: header.sh_addr,
                    offset: header.sh_offset,
                    align: header.sh_addralign,
                    data: Cow::Borrowed(data),
                },
            ));
        }
        None
    }

    /// Inflates a compressed section body.
    fn decompress_section(&self, data: &[u8]) -> Option<Vec<u8>> {
        let (size, compressed) = if let Some(rest) = data.strip_prefix(b"ZLIB") {
            // GNU header: the magic plus an 8-byte big-endian size.
            let size_bytes: [u8; 8] = rest.get(..8)?.try_into().ok()?;
            (u64::from_be_bytes(size_bytes), rest.get(8..)?)
        } else {
            let container = self.elf.header.container().ok()?;
            let endianness = self.elf.header.endianness().ok()?;
            let context = Ctx::new(container, endianness);

            let compression = CompressionHeader::parse(data, 0, context).ok()?;
            if compression.ch_type != ELFCOMPRESS_ZLIB {
                return None;
            }
            (compression.ch_size, data.get(CompressionHeader::size(context)..)?)
        };

        let mut inflated = Vec::with_capacity(usize::try_from(size).ok()?);
        Decompress::new(true)
            .decompress_vec(compressed, &mut inflated, FlushDecompress::Finish)
            .ok()?;
        Some(inflated)
    }
}

impl std::fmt::Debug for ElfObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElfObject")
            .field("machine", &self.machine())
            .field("is_64", &self.is_64())
            .field("endianity", &self.endianity())
            .field("sections", &self.elf.section_headers.len())
            .finish()
    }
}

/// The debug sections of one ELF image, owned where inflation was needed.
///
/// Borrowing the buffers through [`DwarfData::sections`] yields the section
/// map the DWARF reader consumes.
pub struct DwarfData<'data> {
    endian: Endianness,
    buffers: Vec<(SectionId, Cow<'data, [u8]>)>,
}

impl<'data> DwarfData<'data> {
    /// Collects every recognized debug section of `object`.
    pub fn from_object(object: &ElfObject<'data>) -> Self {
        let mut buffers = Vec::new();
        for id in SectionId::ALL {
            if let Some(section) = object.section(id.name()) {
                buffers.push((id, section.data));
            }
        }
        DwarfData {
            endian: object.endianity(),
            buffers,
        }
    }

    /// The byte order the sections are encoded in.
    pub fn endianity(&self) -> Endianness {
        self.endian
    }

    /// The section map over these buffers.
    pub fn sections(&self) -> DwarfSections<'_> {
        DwarfSections::load(|id| {
            self.buffers
                .iter()
                .find(|(have, _)| *have == id)
                .map(|(_, data)| data.as_ref())
        })
    }

    /// A DWARF handle reading from these buffers.
    pub fn to_dwarf(&self) -> Dwarf<'_> {
        Dwarf::new(self.sections(), self.endian)
    }
}
