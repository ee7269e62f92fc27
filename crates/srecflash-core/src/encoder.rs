//! S-record encoder
//!
//! Walks a [`MemoryWindow`] from start to end and emits S1 data records of
//! at most [`EncoderConfig::bytes_per_record`] bytes, followed by an S9
//! terminator. S1 records only carry 16 address bits, so the window is cut
//! at every 64 KiB boundary and the upper bits are announced with an S0
//! record before the first data record of each block:
//!
//! ```text
//! S006BBBBCC      block BBBB follows
//! S1LLAAAA...CC   data, AAAA = low 16 address bits
//! S9030000FC      terminator
//! ```
//!
//! The announcement reuses the S0 type code even though S0 is a header
//! record for other S-record readers, and [`decode`](crate::decoder::decode)
//! skips it as such.

use std::io::Write;

use crate::error::EncodeError;
use crate::record;
use crate::window::MemoryWindow;

/// Payload bytes per data record unless configured otherwise
pub const DEFAULT_BYTES_PER_RECORD: usize = 32;

/// Largest payload a length byte can describe (payload + 2 address + 1 checksum)
pub const MAX_BYTES_PER_RECORD: usize = 252;

/// Size of an address block announced by an S0 record
const BLOCK_SIZE: u32 = 0x1_0000;

/// Fixed closing record
const TERMINATOR: &str = "S9030000FC";

/// Type code folded into the block announcement checksum
const BLOCK_TYPE_CODE: u8 = 4;

/// Bias applied to data record checksums
///
/// The data checksum is computed over the payload length instead of the
/// length field (payload + 3) and then adjusted by this constant.
const DATA_CHECKSUM_BIAS: u8 = 4;

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    bytes_per_record: usize,
}

impl EncoderConfig {
    /// Configure the number of payload bytes per data record (1 to 252)
    pub fn new(bytes_per_record: usize) -> Result<Self, EncodeError> {
        if bytes_per_record == 0 || bytes_per_record > MAX_BYTES_PER_RECORD {
            return Err(EncodeError::InvalidRecordSize(bytes_per_record));
        }
        Ok(Self { bytes_per_record })
    }

    /// Payload bytes per data record
    pub fn bytes_per_record(&self) -> usize {
        self.bytes_per_record
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            bytes_per_record: DEFAULT_BYTES_PER_RECORD,
        }
    }
}

/// Position of the encoder within the window
#[derive(Debug)]
struct EncodeCursor {
    current_address: u32,
    /// Most recently announced block, `None` before the first announcement
    current_block: Option<u32>,
}

impl EncodeCursor {
    fn new(start: u32, end: u32) -> Self {
        // Images confined to the first 64 KiB never announce a block.
        // Anything reaching past it announces every block, block 0 included.
        let current_block = if end > 0xFFFF { None } else { Some(0) };
        Self {
            current_address: start,
            current_block,
        }
    }

    fn next_chunk_len(&self, end: u32, max: usize) -> u32 {
        let mut len = (end - self.current_address).min(max as u32);
        let low = self.current_address & 0xFFFF;
        if low + len > 0xFFFF {
            len = BLOCK_SIZE - low;
        }
        len
    }
}

/// Encode `window` with the default configuration
pub fn encode<W: Write>(writer: W, window: &MemoryWindow) -> Result<(), EncodeError> {
    encode_with(writer, window, &EncoderConfig::default())
}

/// Encode `window` as S1 records plus block announcements and a terminator
pub fn encode_with<W: Write>(
    mut writer: W,
    window: &MemoryWindow,
    config: &EncoderConfig,
) -> Result<(), EncodeError> {
    let start = window.start();
    let end = window.end();
    let data = window.as_slice();

    let mut cursor = EncodeCursor::new(start, end);
    let mut data_records = 0usize;
    let mut announcements = 0usize;

    while cursor.current_address < end {
        let chunk_len = cursor.next_chunk_len(end, config.bytes_per_record());

        let block = cursor.current_address >> 16;
        if cursor.current_block != Some(block) {
            log::debug!("Announcing block 0x{:04X}", block);
            write_block_announcement(&mut writer, block)?;
            cursor.current_block = Some(block);
            announcements += 1;
        }

        let offset = (cursor.current_address - start) as usize;
        let payload = &data[offset..offset + chunk_len as usize];
        write_data_record(&mut writer, cursor.current_address, payload)?;
        data_records += 1;

        cursor.current_address += chunk_len;
    }

    writeln!(writer, "{}", TERMINATOR)?;
    writer.flush()?;

    log::info!(
        "Encoded {} bytes from 0x{:08X} as {} data records ({} block announcements)",
        window.len(),
        start,
        data_records,
        announcements
    );
    Ok(())
}

fn write_block_announcement<W: Write>(writer: &mut W, block: u32) -> Result<(), EncodeError> {
    let index = [(block >> 8) as u8, block as u8];
    let checksum = record::checksum(2, 0, BLOCK_TYPE_CODE, &index);
    writeln!(writer, "S006{:04X}{:02X}", block & 0xFFFF, checksum)?;
    Ok(())
}

fn write_data_record<W: Write>(
    writer: &mut W,
    address: u32,
    payload: &[u8],
) -> Result<(), EncodeError> {
    let len = payload.len() as u8;
    let checksum = record::checksum(len, address, 0, payload).wrapping_sub(DATA_CHECKSUM_BIAS);

    write!(writer, "S1{:02X}{:04X}", len + 3, address & 0xFFFF)?;
    for byte in payload {
        write!(writer, "{:02X}", byte)?;
    }
    writeln!(writer, "{:02X}", checksum)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::line_checksum_ok;

    fn encode_to_string(window: &MemoryWindow, config: &EncoderConfig) -> String {
        let mut out = Vec::new();
        encode_with(&mut out, window, config).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn counting_window(start: u32, len: usize) -> MemoryWindow {
        MemoryWindow::from_vec(start, (0..len).map(|i| i as u8).collect()).unwrap()
    }

    #[test]
    fn test_config_bounds() {
        assert_eq!(EncoderConfig::default().bytes_per_record(), 32);
        assert_eq!(EncoderConfig::new(252).unwrap().bytes_per_record(), 252);
        assert!(matches!(
            EncoderConfig::new(0),
            Err(EncodeError::InvalidRecordSize(0))
        ));
        assert!(matches!(
            EncoderConfig::new(253),
            Err(EncodeError::InvalidRecordSize(253))
        ));
    }

    #[test]
    fn test_encode_40_bytes_default() {
        let window = counting_window(0, 40);
        let text = encode_to_string(&window, &EncoderConfig::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "S1230000000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1FEC"
        );
        assert_eq!(lines[1], "S10B00202021222324252627B8");
        assert_eq!(lines[2], "S9030000FC");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_encode_40_bytes_single_record() {
        let window = counting_window(0, 40);
        let text = encode_to_string(&window, &EncoderConfig::new(40).unwrap());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("S12B0000000102"));
        assert!(lines[0].ends_with("2627C8"));
        assert_eq!(lines[1], "S9030000FC");
    }

    #[test]
    fn test_data_checksums_are_standard() {
        let window = MemoryWindow::from_vec(0x8000, (0..200u32).map(|i| (i * 7) as u8).collect())
            .unwrap();
        let text = encode_to_string(&window, &EncoderConfig::default());
        for line in text.lines() {
            assert!(line_checksum_ok(line.as_bytes()).unwrap(), "{}", line);
        }
    }

    #[test]
    fn test_encode_across_64k_boundary() {
        let window = MemoryWindow::new(0x1_FFF0, 0x2_0010, 0xFF).unwrap();
        let text = encode_to_string(&window, &EncoderConfig::default());
        let lines: Vec<&str> = text.lines().collect();

        let ff = "FF".repeat(16);
        assert_eq!(
            lines,
            vec![
                "S0060001F9".to_string(),
                format!("S113FFF0{}0D", ff),
                "S0060002F8".to_string(),
                format!("S1130000{}FC", ff),
                "S9030000FC".to_string(),
            ]
        );
    }

    #[test]
    fn test_window_ending_at_64k_announces_block_zero() {
        let window = MemoryWindow::new(0xFFF0, 0x1_0000, 0x00).unwrap();
        let text = encode_to_string(&window, &EncoderConfig::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "S0060000FA");
        assert!(lines[1].starts_with("S113FFF0"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_single_block_above_64k() {
        let window = counting_window(0x1_0000, 0x50);
        let text = encode_to_string(&window, &EncoderConfig::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.iter().filter(|l| l.starts_with("S0")).count(), 1);
        assert_eq!(lines[0], "S0060001F9");
        assert!(lines[1].starts_with("S1230000"));
        assert!(lines[2].starts_with("S1230020"));
        assert!(lines[3].starts_with("S1130040"));
    }

    #[test]
    fn test_empty_window() {
        let window = MemoryWindow::new(0x8000, 0x8000, 0xFF).unwrap();
        let text = encode_to_string(&window, &EncoderConfig::default());
        assert_eq!(text, "S9030000FC\n");
    }

    #[test]
    fn test_chunks_never_cross_blocks() {
        let window = MemoryWindow::new(0xFFE8, 0x1_0020, 0xAA).unwrap();
        let text = encode_to_string(&window, &EncoderConfig::default());
        let lengths: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("S1"))
            .map(|l| &l[2..8])
            .collect();
        // 0x18 bytes to the boundary, then a full 0x20 chunk
        assert_eq!(lengths, vec!["1BFFE8", "230000"]);
    }
}
