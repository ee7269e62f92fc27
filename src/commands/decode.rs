//! Decode command implementation

use super::{format_size, resolve_window};
use crate::cli::WindowArgs;
use srecflash_core::decode;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Decode an S-record file into a binary image covering the window
pub fn run_decode(
    input: &Path,
    output: &Path,
    window_args: &WindowArgs,
    fill: Option<u8>,
    trim: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = resolve_window(window_args, fill, None)?;
    log::info!(
        "Decoding {:?} into 0x{:08X}..0x{:08X} ({})",
        input,
        spec.start,
        spec.end,
        format_size(spec.size() as u64)
    );

    let window = spec.allocate()?;
    let reader = BufReader::new(File::open(input)?);
    let decoded = decode(reader, window)?;

    let mut data = decoded.window.into_vec();
    if trim {
        data.truncate(decoded.bytes_written as usize);
    }
    fs::write(output, &data)?;

    println!(
        "Decoded {} bytes from 0x{:08X}, wrote {} to {:?}",
        decoded.bytes_written,
        spec.start,
        format_size(data.len() as u64),
        output
    );
    Ok(())
}
