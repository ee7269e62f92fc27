//! Info command implementation

use srecflash_core::record::{self, RecordType};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// What an S-record file contains
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Lines read
    pub lines: usize,
    /// Lines that do not start with `S`
    pub ignored_lines: usize,
    /// Lines starting with `S` whose header does not scan
    pub malformed: usize,
    /// Records per type digit
    pub records: [usize; 16],
    /// Records failing the conventional S-record checksum
    pub bad_checksums: usize,
    /// Lowest data address and one past the highest
    pub data_span: Option<(u32, u32)>,
    /// Payload bytes across all data records
    pub data_bytes: u64,
    /// Value of the last well-formed S5 record
    pub declared_count: Option<u32>,
}

impl Summary {
    /// Number of data records (S1, S2, S3)
    pub fn data_records(&self) -> usize {
        self.records[1] + self.records[2] + self.records[3]
    }

    fn add_line(&mut self, line: &[u8]) {
        self.lines += 1;

        let header = match record::scan_header(line) {
            Ok(Some(header)) => header,
            Ok(None) => {
                self.ignored_lines += 1;
                return;
            }
            Err(_) => {
                self.malformed += 1;
                return;
            }
        };

        self.records[header.type_digit as usize] += 1;
        if !record::line_checksum_ok(line).unwrap_or(false) {
            self.bad_checksums += 1;
        }

        match header.record_type() {
            Some(RecordType::Count16) if header.length == 3 => {
                self.declared_count = header.address(1).ok();
            }
            Some(record_type) if record_type.is_data() => {
                let Some(code) = record_type.address_width_code() else {
                    return;
                };
                let (Ok(address), Ok(len)) = (header.address(code), header.payload_len(code))
                else {
                    return;
                };
                if len == 0 {
                    return;
                }
                self.data_bytes += len as u64;
                let top = address.saturating_add(len as u32);
                self.data_span = Some(match self.data_span {
                    Some((low, high)) => (low.min(address), high.max(top)),
                    None => (address, top),
                });
            }
            _ => {}
        }
    }
}

/// Scan a record stream without decoding it into memory
pub fn summarize<R: BufRead>(mut reader: R) -> io::Result<Summary> {
    let mut summary = Summary::default();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        summary.add_line(&line);
    }
    Ok(summary)
}

/// Print a summary of an S-record file
pub fn run_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let summary = summarize(BufReader::new(File::open(input)?))?;

    println!("S-record file: {:?}", input);
    println!("Lines:           {}", summary.lines);
    if summary.ignored_lines > 0 {
        println!("Ignored lines:   {}", summary.ignored_lines);
    }
    if summary.malformed > 0 {
        println!("Malformed:       {}", summary.malformed);
    }
    println!();
    println!("Records:");
    for (digit, &count) in summary.records.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let name = match RecordType::from_digit(digit as u8) {
            Some(record_type) => format!("{:?}", record_type),
            None => "Undefined".to_string(),
        };
        println!("  S{:X} {:<10} {}", digit, name, count);
    }
    println!();

    match summary.data_span {
        Some((low, high)) => println!(
            "Data:            {} bytes in 0x{:08X}..0x{:08X}",
            summary.data_bytes, low, high
        ),
        None => println!("Data:            none"),
    }
    if let Some(expected) = summary.declared_count {
        let status = if expected as usize == summary.data_records() {
            "matches"
        } else {
            "MISMATCH"
        };
        println!(
            "S5 count:        {} ({} {} data records)",
            expected,
            status,
            summary.data_records()
        );
    }
    // Checksums are informational; decode never rejects a record for them
    println!("Bad checksums:   {}", summary.bad_checksums);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_summarize() {
        let input = "\
S00F000068656C6C6F202020202000003C
S11F00007C0802A6900100049421FFF07C6C1B787C8C23783C6000003863000026
S11F001C4BFFFFE5398000007D83637880010014382100107C0803A64E800020E9
S111003848656C6C6F20776F726C642E0A0043

S5030003F9
S9030000FC
";
        let summary = summarize(Cursor::new(input)).unwrap();
        assert_eq!(summary.lines, 7);
        assert_eq!(summary.ignored_lines, 1);
        assert_eq!(summary.malformed, 0);
        assert_eq!(summary.records[0], 1);
        assert_eq!(summary.data_records(), 3);
        assert_eq!(summary.records[9], 1);
        assert_eq!(summary.bad_checksums, 1);
        assert_eq!(summary.data_span, Some((0, 0x46)));
        assert_eq!(summary.data_bytes, 0x46);
        assert_eq!(summary.declared_count, Some(3));
    }

    #[test]
    fn test_summarize_block_announcements() {
        let input = "S0060001F9\nS1050000AABB95\nS1zz\n";
        let summary = summarize(Cursor::new(input)).unwrap();
        assert_eq!(summary.records[0], 1);
        assert_eq!(summary.records[1], 1);
        assert_eq!(summary.malformed, 1);
        // The announcement does not satisfy a conventional reader
        assert_eq!(summary.bad_checksums, 1);
        assert_eq!(summary.data_span, Some((0, 2)));
    }
}
