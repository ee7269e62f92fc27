//! Error types for srecflash-core
//!
//! `RecordError` is no_std compatible and describes problems with a single
//! line. The stream-level errors returned by the decoder and encoder need
//! `std` because they can carry I/O failures.

use core::fmt;

/// Problems found while scanning a single record line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Type digit, length or address field did not scan
    MalformedHeader,
    /// The address field holds fewer digits than the record type needs
    ShortAddress {
        /// Hex digits actually present
        found: usize,
        /// Hex digits the address width requires
        needed: usize,
    },
    /// A payload hex pair did not scan
    MalformedByte {
        /// Character column of the pair within the line
        offset: usize,
    },
    /// Length field is too small to hold the address field and checksum
    LengthTooShort {
        /// Length field value
        length: u8,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader => write!(f, "malformed record header"),
            Self::ShortAddress { found, needed } => write!(
                f,
                "address field has {} hex digits, {} required",
                found, needed
            ),
            Self::MalformedByte { offset } => {
                write!(f, "malformed hex byte at column {}", offset)
            }
            Self::LengthTooShort { length } => {
                write!(f, "record length 0x{:02X} is too short", length)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RecordError {}

/// Errors returned by [`decode`](crate::decoder::decode)
///
/// Every variant aborts the whole decode; the memory window handed to the
/// decoder is dropped with it.
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Header or payload hex fields do not parse at the expected width
    #[error("error while parsing SREC at line {line}{}", byte_suffix(.offset))]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// Column of the offending payload byte, if the failure was mid-payload
        offset: Option<usize>,
    },

    /// A count record whose length field is not exactly 3
    #[error("error while parsing S5 record at line {line}")]
    MalformedCountRecord {
        /// 1-based line number
        line: usize,
    },

    /// A data record falls outside the memory window
    #[error("address {address:08X} + {length} is out of range at line {line}")]
    AddressOutOfRange {
        /// Record address
        address: u32,
        /// Payload length of the record
        length: u32,
        /// 1-based line number
        line: usize,
    },

    /// The count record disagrees with the data records actually read
    #[error(
        "S5 record declares {expected} data records but {actual} were read"
    )]
    RecordCountMismatch {
        /// Count declared by the S5 record
        expected: u32,
        /// Data records observed in the stream
        actual: u32,
    },

    /// Reading the stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "std")]
fn byte_suffix(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!(" byte {}", offset),
        None => String::new(),
    }
}

/// Errors returned by [`encode`](crate::encoder::encode)
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Requested payload bytes per record cannot be expressed in a length field
    #[error("invalid record size {0}: must be between 1 and {max}", max = crate::encoder::MAX_BYTES_PER_RECORD)]
    InvalidRecordSize(usize),

    /// Writing the stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors building a [`MemoryWindow`](crate::window::MemoryWindow)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// End address lies below the start address
    #[error("window end 0x{end:08X} is below start 0x{start:08X}")]
    InvertedRange {
        /// Start address
        start: u32,
        /// End address (exclusive)
        end: u32,
    },

    /// Buffer does not fit in the 32-bit address space from `start`
    #[error("{len} bytes at 0x{start:08X} exceed the 32-bit address space")]
    TooLarge {
        /// Start address
        start: u32,
        /// Buffer length
        len: usize,
    },
}
