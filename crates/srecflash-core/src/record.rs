//! S-record line structure
//!
//! A record line looks like
//!
//! ```text
//! S <type> <length:2> <address:4|6|8> <payload:2*n> <checksum:2>
//! ```
//!
//! where `length` counts the address bytes, the payload bytes and the
//! checksum byte. The header scanner always reads up to eight address digits
//! regardless of the record type; for the shorter address widths the extra
//! digits are leading payload digits and are shifted away again once the type
//! is known (see [`RecordHeader::address`]).

use crate::error::RecordError;

/// Character that opens every record line
pub const RECORD_START: u8 = b'S';

/// Column where the address field begins (after `S`, type digit and length)
pub const ADDRESS_COLUMN: usize = 4;

/// Address digits scanned for every record, whatever its true address width
pub const ADDRESS_SCAN_DIGITS: usize = 8;

/// Record type tag, taken from the digit following `S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    /// S0 - header
    Header,
    /// S1 - data with a 16-bit address
    Data16,
    /// S2 - data with a 24-bit address
    Data24,
    /// S3 - data with a 32-bit address
    Data32,
    /// S4 - reserved
    Reserved,
    /// S5 - 16-bit count of data records
    Count16,
    /// S6 - 24-bit count of data records
    Count24,
    /// S7 - 32-bit start address terminator
    Start32,
    /// S8 - 24-bit start address terminator
    Start24,
    /// S9 - 16-bit start address terminator
    Start16,
}

impl RecordType {
    /// Map a type digit to its record type
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Header),
            1 => Some(Self::Data16),
            2 => Some(Self::Data24),
            3 => Some(Self::Data32),
            4 => Some(Self::Reserved),
            5 => Some(Self::Count16),
            6 => Some(Self::Count24),
            7 => Some(Self::Start32),
            8 => Some(Self::Start24),
            9 => Some(Self::Start16),
            _ => None,
        }
    }

    /// The type digit written after `S`
    pub fn digit(self) -> u8 {
        match self {
            Self::Header => 0,
            Self::Data16 => 1,
            Self::Data24 => 2,
            Self::Data32 => 3,
            Self::Reserved => 4,
            Self::Count16 => 5,
            Self::Count24 => 6,
            Self::Start32 => 7,
            Self::Start24 => 8,
            Self::Start16 => 9,
        }
    }

    /// Whether records of this type carry memory contents
    pub fn is_data(self) -> bool {
        matches!(self, Self::Data16 | Self::Data24 | Self::Data32)
    }

    /// Address width code: 1 for 16-bit, 2 for 24-bit, 3 for 32-bit
    ///
    /// Only data records and the 16-bit count record have an address the
    /// decoder interprets.
    pub fn address_width_code(self) -> Option<u8> {
        match self {
            Self::Data16 | Self::Count16 => Some(1),
            Self::Data24 => Some(2),
            Self::Data32 => Some(3),
            _ => None,
        }
    }
}

/// Number of address bytes for a width code
pub const fn address_bytes(width_code: u8) -> usize {
    width_code as usize + 1
}

/// Fields scanned from the start of a record line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Raw type digit (0-15; only 0-9 are defined)
    pub type_digit: u8,
    /// Length field
    pub length: u8,
    /// Address field as scanned, possibly with payload digits in its low bits
    pub raw_address: u32,
    /// Number of hex digits that went into `raw_address`
    pub address_digits: usize,
}

impl RecordHeader {
    /// Record type, if the type digit is a defined one
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_digit(self.type_digit)
    }

    /// Recover the true address for the given width code
    ///
    /// With a full eight-digit scan this is `raw >> 8 * (3 - width_code)`.
    /// Shorter lines give fewer over-read digits and a correspondingly
    /// smaller shift.
    pub fn address(&self, width_code: u8) -> Result<u32, RecordError> {
        let needed = 2 * address_bytes(width_code);
        if self.address_digits < needed {
            return Err(RecordError::ShortAddress {
                found: self.address_digits,
                needed,
            });
        }
        Ok(self.raw_address >> (4 * (self.address_digits - needed)))
    }

    /// Payload length for a data record: length minus address bytes minus checksum
    pub fn payload_len(&self, width_code: u8) -> Result<usize, RecordError> {
        (self.length as usize)
            .checked_sub(address_bytes(width_code) + 1)
            .ok_or(RecordError::LengthTooShort {
                length: self.length,
            })
    }
}

/// Scan the header of a line
///
/// Returns `Ok(None)` for lines that do not begin with `S`; those are blank
/// or noise and carry no record.
pub fn scan_header(line: &[u8]) -> Result<Option<RecordHeader>, RecordError> {
    if line.first() != Some(&RECORD_START) {
        return Ok(None);
    }

    let (type_digit, digits) = scan_hex(line, 1, 1);
    if digits != 1 {
        return Err(RecordError::MalformedHeader);
    }

    let (length, digits) = scan_hex(line, 2, 2);
    if digits != 2 {
        return Err(RecordError::MalformedHeader);
    }

    let (raw_address, address_digits) = scan_hex(line, ADDRESS_COLUMN, ADDRESS_SCAN_DIGITS);
    if address_digits == 0 {
        return Err(RecordError::MalformedHeader);
    }

    Ok(Some(RecordHeader {
        type_digit: type_digit as u8,
        length: length as u8,
        raw_address,
        address_digits,
    }))
}

/// Column of the first payload byte for a width code
pub const fn payload_column(width_code: u8) -> usize {
    ADDRESS_COLUMN + 2 * address_bytes(width_code)
}

/// Decode the hex pair at `offset`
pub fn hex_byte(line: &[u8], offset: usize) -> Result<u8, RecordError> {
    match (
        line.get(offset).copied().and_then(hex_value),
        line.get(offset + 1).copied().and_then(hex_value),
    ) {
        (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
        _ => Err(RecordError::MalformedByte { offset }),
    }
}

/// Read up to `max_digits` hex digits starting at `pos`, most significant first
fn scan_hex(line: &[u8], pos: usize, max_digits: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut digits = 0;
    for nibble in line
        .iter()
        .skip(pos)
        .take(max_digits)
        .map_while(|&c| hex_value(c))
    {
        value = (value << 4) | nibble as u32;
        digits += 1;
    }
    (value, digits)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Record checksum used by the encoder
///
/// Two's complement of the 8-bit sum of `length`, the low and high address
/// bytes, `type_code` and every payload byte.
pub fn checksum(length: u8, address: u32, type_code: u8, payload: &[u8]) -> u8 {
    let seed = length
        .wrapping_add(address as u8)
        .wrapping_add((address >> 8) as u8)
        .wrapping_add(type_code);
    let sum = payload.iter().fold(seed, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Conventional S-record checksum: ones' complement of the byte sum
///
/// `bytes` is the count byte, the address bytes and the payload.
pub fn srec_checksum(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Check a complete line against the conventional S-record checksum
///
/// Returns `Ok(false)` when the count byte disagrees with the number of
/// pairs on the line or the checksum does not match. Nothing in the decoder
/// calls this; it is for inspection tools.
pub fn line_checksum_ok(line: &[u8]) -> Result<bool, RecordError> {
    let body = trim_line_end(line);
    if body.first() != Some(&RECORD_START) || body.len() < 4 || body.len() % 2 != 0 {
        return Err(RecordError::MalformedHeader);
    }

    let pairs = (body.len() - 2) / 2;
    let count = hex_byte(body, 2)?;
    let mut sum = count;
    let mut last = count;
    for i in 1..pairs {
        last = hex_byte(body, 2 + 2 * i)?;
        if i + 1 < pairs {
            sum = sum.wrapping_add(last);
        }
    }

    if pairs < 2 || count as usize != pairs - 1 {
        return Ok(false);
    }
    Ok(!sum == last)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r' | b' ' | b'\t') {
        end -= 1;
    }
    &line[..end]
}
