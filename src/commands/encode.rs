//! Encode command implementation

use super::{format_size, resolve_window, CommandError};
use crate::cli::WindowArgs;
use srecflash_core::{encode_with, EncoderConfig, MemoryWindow};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Encode a binary image as S-records
///
/// With a memory map window the image may be shorter than the window; it is
/// encoded from the window start and only its own bytes are emitted.
pub fn run_encode(
    input: &Path,
    output: &Path,
    window_args: &WindowArgs,
    record_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = EncoderConfig::new(record_size)?;
    let data = fs::read(input)?;
    let input_len = u32::try_from(data.len()).map_err(|_| CommandError::SizeMismatch {
        window: u64::from(u32::MAX),
        input: data.len() as u64,
    })?;

    let spec = resolve_window(window_args, None, Some(input_len))?;
    if window_args.uses_map() {
        if input_len > spec.size() {
            return Err(CommandError::SizeMismatch {
                window: spec.size() as u64,
                input: data.len() as u64,
            }
            .into());
        }
    } else if spec.size() != input_len {
        return Err(CommandError::SizeMismatch {
            window: spec.size() as u64,
            input: data.len() as u64,
        }
        .into());
    }

    let window = MemoryWindow::from_vec(spec.start, data)?;
    log::info!(
        "Encoding {} from 0x{:08X} with {} bytes per record",
        format_size(window.len() as u64),
        window.start(),
        config.bytes_per_record()
    );

    let writer = BufWriter::new(File::create(output)?);
    encode_with(writer, &window, &config)?;

    println!(
        "Encoded 0x{:08X}..0x{:08X} to {:?}",
        window.start(),
        window.end(),
        output
    );
    Ok(())
}
