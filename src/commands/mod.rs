//! CLI command implementations
//!
//! Each command reads its input file, hands the contents to the codec in
//! `srecflash-core` and writes the result. Address windows come either from
//! `--start`/`--end` or from a named window in a TOML memory map.

pub mod decode;
pub mod encode;
pub mod info;
pub mod map;

use crate::cli::WindowArgs;
use srecflash_core::map::DEFAULT_FILL;
use srecflash_core::{MemoryMap, WindowError, WindowSpec};

/// Errors raised while resolving command arguments
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Neither a start address nor a memory map window was given
    #[error("No window specified. Use --start/--end or --map with --window")]
    MissingWindow,

    /// --window was given without --map, or the other way round
    #[error("--map and --window must be used together")]
    IncompleteMap,

    /// --start/--end were mixed with --map/--window
    #[error("--start/--end cannot be combined with --map/--window")]
    ConflictingWindow,

    /// The input does not match the size of the window
    #[error("input is {input} bytes but the window holds {window} bytes")]
    SizeMismatch {
        /// Window size in bytes
        window: u64,
        /// Input size in bytes
        input: u64,
    },
}

/// Resolve the window arguments to a concrete window
///
/// `default_len` supplies the window size when only `--start` is given.
pub fn resolve_window(
    args: &WindowArgs,
    fill: Option<u8>,
    default_len: Option<u32>,
) -> Result<WindowSpec, Box<dyn std::error::Error>> {
    if args.uses_map() {
        if args.start.is_some() || args.end.is_some() {
            return Err(CommandError::ConflictingWindow.into());
        }
        let (path, name) = match (&args.map, &args.window) {
            (Some(path), Some(name)) => (path, name),
            _ => return Err(CommandError::IncompleteMap.into()),
        };
        let map = MemoryMap::from_toml_file(path)?;
        log::info!("Loaded memory map from {:?}", path);
        let mut spec = map.window(name)?.clone();
        if let Some(fill) = fill {
            spec.fill = fill;
        }
        return Ok(spec);
    }

    let start = args.start.ok_or(CommandError::MissingWindow)?;
    let end = match (args.end, default_len) {
        (Some(end), _) => end,
        (None, Some(len)) => start.checked_add(len).ok_or(WindowError::TooLarge {
            start,
            len: len as usize,
        })?,
        (None, None) => return Err(CommandError::MissingWindow.into()),
    };
    if end < start {
        return Err(WindowError::InvertedRange { start, end }.into());
    }

    Ok(WindowSpec {
        name: "window".to_string(),
        start,
        end,
        fill: fill.unwrap_or(DEFAULT_FILL),
    })
}

/// Format a byte count for display
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_window() {
        let args = WindowArgs {
            start: Some(0x8000),
            end: Some(0x9000),
            ..Default::default()
        };
        let spec = resolve_window(&args, None, None).unwrap();
        assert_eq!((spec.start, spec.end, spec.fill), (0x8000, 0x9000, 0xFF));

        let args = WindowArgs {
            start: Some(0x8000),
            ..Default::default()
        };
        let spec = resolve_window(&args, Some(0), Some(0x40)).unwrap();
        assert_eq!((spec.start, spec.end, spec.fill), (0x8000, 0x8040, 0));
    }

    #[test]
    fn test_resolve_missing_window() {
        let args = WindowArgs::default();
        assert!(resolve_window(&args, None, Some(16)).is_err());

        let args = WindowArgs {
            start: Some(0x8000),
            ..Default::default()
        };
        assert!(resolve_window(&args, None, None).is_err());
    }

    #[test]
    fn test_resolve_window_past_address_space() {
        let args = WindowArgs {
            start: Some(0xFFFF_FFF0),
            ..Default::default()
        };
        let err = resolve_window(&args, None, Some(0x20)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<WindowError>(),
            Some(&WindowError::TooLarge {
                start: 0xFFFF_FFF0,
                len: 0x20
            })
        );
    }

    #[test]
    fn test_resolve_inverted_window() {
        let args = WindowArgs {
            start: Some(0x9000),
            end: Some(0x8000),
            ..Default::default()
        };
        assert!(resolve_window(&args, None, None).is_err());
    }

    #[test]
    fn test_resolve_conflicting_window() {
        let args = WindowArgs {
            start: Some(0x8000),
            window: Some("flash".into()),
            ..Default::default()
        };
        let err = resolve_window(&args, None, None).unwrap_err();
        assert_eq!(err.to_string(), CommandError::ConflictingWindow.to_string());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(32 * 1024), "32 KiB");
        assert_eq!(format_size(2 * 1024 * 1024), "2 MiB");
        assert_eq!(format_size(70), "70 bytes");
    }
}
