//! Error types shared by every reader in this crate.
//!
//! The taxonomy is stable: each fallible operation documents the exact kinds
//! it can report, and no layer rewrites a kind produced further down. In
//! addition to the value returned from the failing call, every constructed
//! [`Error`] records its kind in a thread-local slot readable through
//! [`last_error_kind`]. The slot exists for consumers porting from
//! errno-style interfaces; it is left untouched by successful operations, so
//! its contents are only meaningful immediately after a failure.

use std::cell::Cell;

use thiserror::Error;

/// The kind of an [`Error`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A length field, offset or opcode violates the structure of a debug
    /// section.
    #[error("invalid DWARF data")]
    InvalidDwarf,
    /// A reference attribute uses `DW_FORM_ref_addr` where only unit-local
    /// references are allowed.
    #[error("invalid reference form")]
    InvalidReference,
    /// A file index does not name an entry of the line program's file table.
    #[error("file index out of range")]
    InvalidLineIndex,
    /// A string offset is out of bounds or the string has no terminator.
    #[error("no terminated string at offset")]
    NoString,
    /// An unsupported mode was passed when opening a file.
    #[error("invalid open mode")]
    InvalidCommand,

    /// The attribute's form does not encode an address.
    #[error("attribute value is not an address")]
    NoAddress,
    /// The attribute's form does not encode a constant.
    #[error("attribute value is not a constant")]
    NoConstant,
    /// The attribute's form does not encode a reference.
    #[error("attribute value is not a reference")]
    NoReference,
    /// The attribute's form does not encode a block.
    #[error("attribute value is not a block")]
    NoBlock,
    /// The attribute's form does not encode a flag.
    #[error("attribute value is not a flag")]
    NoFlag,

    /// The requested entry does not exist.
    #[error("no such entry")]
    NoEntry,
    /// No entry matches the query.
    #[error("no matching entry")]
    NoMatch,
    /// The address is not covered by any line-table sequence.
    #[error("address out of range")]
    AddressOutOfRange,

    /// A cache or arena reservation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// An operating-system level read or map failure.
    #[error("I/O error")]
    Io,
    /// The path does not name a regular file.
    #[error("not a regular file")]
    NoRegularFile,
    /// The buffer is not an object file this toolkit understands.
    #[error("invalid object file")]
    InvalidFile,
    /// Section headers were requested before the ELF header was read.
    ///
    /// Unreachable through the bundled container reader, which parses the
    /// whole header up front; the code stays reserved so the taxonomy is
    /// stable for external container implementations.
    #[error("section headers read before ELF header")]
    WrongOrderElfHeader,
}

thread_local! {
    static LAST_ERROR: Cell<Option<ErrorKind>> = const { Cell::new(None) };
}

/// Returns the kind of the most recent [`Error`] constructed on this thread.
///
/// Successful operations do not clear the slot; check it only right after a
/// call reported a failure.
pub fn last_error_kind() -> Option<ErrorKind> {
    LAST_ERROR.with(|slot| slot.get())
}

fn record(kind: ErrorKind) {
    LAST_ERROR.with(|slot| slot.set(Some(kind)));
}

/// An error produced while reading debug information.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error from a known kind as well as an arbitrary error
    /// payload.
    pub fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        record(kind);
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        record(kind);
        Self { kind, source: None }
    }
}
