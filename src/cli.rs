//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal byte
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value).map_err(|_| format!("Value does not fit in a byte: {}", s))
}

#[derive(Parser)]
#[command(name = "srecflash")]
#[command(author, version, about = "Motorola S-record memory image converter", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Address window options shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// First address of the window (hex, e.g., 0x8000)
    #[arg(long, value_parser = parse_hex_u32)]
    pub start: Option<u32>,

    /// End of the window, exclusive (hex, e.g., 0x10000)
    #[arg(long, value_parser = parse_hex_u32)]
    pub end: Option<u32>,

    /// Memory map file (TOML format)
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Window name from the memory map (requires --map)
    #[arg(long)]
    pub window: Option<String>,
}

impl WindowArgs {
    /// Check if the window comes from a memory map
    pub fn uses_map(&self) -> bool {
        self.map.is_some() || self.window.is_some()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode an S-record file into a raw binary image
    Decode {
        /// Input S-record file
        #[arg(short, long)]
        input: PathBuf,

        /// Output binary file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Value of bytes not covered by any record (default 0xFF, or the map's fill)
        #[arg(long, value_parser = parse_hex_u8)]
        fill: Option<u8>,

        /// Only write bytes up to the highest address a record touched
        #[arg(long)]
        trim: bool,
    },

    /// Encode a raw binary image as S-records
    Encode {
        /// Input binary file
        #[arg(short, long)]
        input: PathBuf,

        /// Output S-record file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Payload bytes per data record (1-252)
        #[arg(long, default_value = "32")]
        record_size: usize,
    },

    /// Summarize the records in an S-record file
    Info {
        /// Input S-record file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Memory map operations
    #[command(subcommand)]
    Map(MapCommands),
}

/// Memory map subcommands
#[derive(Subcommand)]
pub enum MapCommands {
    /// Show the windows of a memory map
    Show {
        /// Memory map file (TOML format)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x8000").unwrap(), 0x8000);
        assert_eq!(parse_hex_u32("0X10").unwrap(), 16);
        assert_eq!(parse_hex_u32("4096").unwrap(), 4096);
        assert!(parse_hex_u32("0xG").is_err());
        assert!(parse_hex_u8("0x100").is_err());
        assert_eq!(parse_hex_u8("0xff").unwrap(), 0xFF);
    }

    #[test]
    fn test_parse_decode_command() {
        let cli = Cli::try_parse_from([
            "srecflash", "-v", "decode", "-i", "fw.s19", "-o", "fw.bin", "--start", "0x8000",
            "--end", "0x10000", "--trim",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Decode {
                window, trim, fill, ..
            } => {
                assert_eq!(window.start, Some(0x8000));
                assert_eq!(window.end, Some(0x10000));
                assert!(!window.uses_map());
                assert!(trim);
                assert_eq!(fill, None);
            }
            _ => panic!("expected decode"),
        }
    }

    #[test]
    fn test_parse_encode_command() {
        let cli = Cli::try_parse_from([
            "srecflash", "encode", "-i", "fw.bin", "-o", "fw.s19", "--map", "stm8.toml",
            "--window", "flash",
        ])
        .unwrap();
        match cli.command {
            Commands::Encode {
                window,
                record_size,
                ..
            } => {
                assert!(window.uses_map());
                assert_eq!(window.window.as_deref(), Some("flash"));
                assert_eq!(record_size, 32);
            }
            _ => panic!("expected encode"),
        }
    }
}
