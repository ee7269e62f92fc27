//! S-record decoder
//!
//! Reads a record stream line by line and projects data record payloads into
//! a [`MemoryWindow`]. Only the record structure is validated: checksums on
//! the wire are never verified, so a record with a corrupt checksum byte is
//! still accepted.
//!
//! The window is moved into [`decode`]. On success it is handed back inside
//! [`Decoded`]; on failure it is dropped together with the partially
//! written contents, so callers cannot keep using a half-decoded image.

use std::io::BufRead;

use crate::error::DecodeError;
use crate::record::{self, RecordHeader, RecordType};
use crate::window::MemoryWindow;

/// Length field every S5 record must carry
const COUNT_RECORD_LENGTH: u8 = 3;

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The window, populated with the decoded data
    pub window: MemoryWindow,
    /// Bytes covered from the window start up to the highest address written
    pub bytes_written: u32,
}

/// Per-call scan state, discarded when the call returns
#[derive(Debug)]
struct ScanState {
    line_number: usize,
    data_records_seen: u32,
    expected_data_records: Option<u32>,
    highest_address_written: u32,
}

impl ScanState {
    fn new(start: u32) -> Self {
        Self {
            line_number: 0,
            data_records_seen: 0,
            expected_data_records: None,
            highest_address_written: start,
        }
    }

    fn malformed(&self, offset: Option<usize>) -> DecodeError {
        DecodeError::MalformedRecord {
            line: self.line_number,
            offset,
        }
    }

    fn process_line(
        &mut self,
        line: &[u8],
        window: &mut MemoryWindow,
    ) -> Result<(), DecodeError> {
        let header = match record::scan_header(line) {
            Ok(Some(header)) => header,
            Ok(None) => return Ok(()),
            Err(_) => return Err(self.malformed(None)),
        };

        match header.record_type() {
            Some(RecordType::Count16) => self.count_record(&header),
            Some(record_type) if record_type.is_data() => {
                self.data_record(line, &header, record_type, window)
            }
            // Header, reserved, S6 count, terminators and undefined types
            other => {
                log::trace!(
                    "Line {}: skipping {:?} record (type digit {})",
                    self.line_number,
                    other,
                    header.type_digit
                );
                Ok(())
            }
        }
    }

    fn count_record(&mut self, header: &RecordHeader) -> Result<(), DecodeError> {
        if header.length != COUNT_RECORD_LENGTH {
            return Err(DecodeError::MalformedCountRecord {
                line: self.line_number,
            });
        }
        let expected = header.address(1).map_err(|_| self.malformed(None))?;
        log::debug!(
            "Line {}: S5 record expects {} data records",
            self.line_number,
            expected
        );
        self.expected_data_records = Some(expected);
        Ok(())
    }

    fn data_record(
        &mut self,
        line: &[u8],
        header: &RecordHeader,
        record_type: RecordType,
        window: &mut MemoryWindow,
    ) -> Result<(), DecodeError> {
        let width_code = match record_type.address_width_code() {
            Some(code) => code,
            None => return Err(self.malformed(None)),
        };
        let address = header
            .address(width_code)
            .map_err(|_| self.malformed(None))?;
        let payload_len = header
            .payload_len(width_code)
            .map_err(|_| self.malformed(None))?;
        let length = payload_len as u32;

        let first = record::payload_column(width_code);
        for k in 0..payload_len {
            let offset = first + 2 * k;
            let byte = record::hex_byte(line, offset).map_err(|_| self.malformed(Some(offset)))?;

            if !window.contains_range(address, length) {
                return Err(DecodeError::AddressOutOfRange {
                    address,
                    length,
                    line: self.line_number,
                });
            }

            // contains_range guarantees address + length <= end
            let top = address + length;
            if top > self.highest_address_written {
                self.highest_address_written = top;
            }

            let index = (address - window.start()) as usize + k;
            window.as_mut_slice()[index] = byte;
        }

        log::trace!(
            "Line {}: S{} record, {} bytes at 0x{:08X}",
            self.line_number,
            record_type.digit(),
            payload_len,
            address
        );
        self.data_records_seen += 1;
        Ok(())
    }

    fn finish(&self) -> Result<(), DecodeError> {
        match self.expected_data_records {
            Some(expected) if expected != self.data_records_seen => {
                Err(DecodeError::RecordCountMismatch {
                    expected,
                    actual: self.data_records_seen,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Decode an S-record stream into `window`
///
/// Lines that do not start with `S` are ignored. Header (S0), reserved (S4)
/// and terminator records are skipped. Every data byte must land inside
/// `[window.start(), window.end())`; a record reaching outside the window is
/// an error, never truncated. If an S5 count record appears anywhere in the
/// stream, the number of data records must match it once the whole stream
/// has been read.
///
/// S0 records are skipped even when they were written by
/// [`encode`](crate::encoder::encode) as 64 KiB block announcements, so an
/// image spanning more than one block does not decode back to its original
/// addresses.
pub fn decode<R: BufRead>(mut reader: R, mut window: MemoryWindow) -> Result<Decoded, DecodeError> {
    let mut state = ScanState::new(window.start());
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        state.line_number += 1;
        state.process_line(&line, &mut window)?;
    }

    state.finish()?;

    let bytes_written = state.highest_address_written - window.start();
    log::info!(
        "Decoded {} data records from {} lines, {} bytes from 0x{:08X}",
        state.data_records_seen,
        state.line_number,
        bytes_written,
        window.start()
    );

    Ok(Decoded {
        window,
        bytes_written,
    })
}
