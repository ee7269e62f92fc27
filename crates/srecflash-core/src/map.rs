//! TOML memory maps
//!
//! A memory map names the address windows of a device so that callers can
//! say `--window flash` instead of spelling out addresses:
//!
//! ```toml
//! [map]
//! name = "STM8S105"
//!
//! [[window]]
//! name = "flash"
//! start = 0x8000
//! end = 0x10000
//!
//! [[window]]
//! name = "eeprom"
//! start = "0x4000"
//! end = "0x4400"
//! fill = 0x00
//! ```
//!
//! `end` is exclusive. `fill` is the value of bytes no record touches and
//! defaults to `0xFF` (erased flash).

use std::fs;
use std::path::Path;

use crate::error::WindowError;
use crate::window::MemoryWindow;

/// Default fill byte for windows that do not specify one
pub const DEFAULT_FILL: u8 = 0xFF;

/// Memory map errors
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Map file could not be read
    #[error("failed to read memory map: {0}")]
    Io(#[from] std::io::Error),

    /// Map file is not valid TOML or does not match the map structure
    #[error("failed to parse memory map: {0}")]
    Parse(String),

    /// Two windows share a name
    #[error("duplicate window name: {0}")]
    DuplicateWindow(String),

    /// A window ends before it starts
    #[error("window '{name}' ends (0x{end:08X}) before it starts (0x{start:08X})")]
    InvalidWindow {
        /// Window name
        name: String,
        /// Start address
        start: u32,
        /// End address (exclusive)
        end: u32,
    },

    /// No window with the requested name
    #[error("window not found: {0}")]
    WindowNotFound(String),
}

#[derive(Debug, serde::Deserialize)]
struct TomlMapFile {
    map: Option<TomlMapMeta>,
    #[serde(default)]
    window: Vec<TomlWindow>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlMapMeta {
    name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlWindow {
    name: String,
    #[serde(deserialize_with = "deserialize_hex_u32")]
    start: u32,
    #[serde(deserialize_with = "deserialize_hex_u32")]
    end: u32,
    #[serde(default = "default_fill", deserialize_with = "deserialize_hex_u8")]
    fill: u8,
}

fn default_fill() -> u8 {
    DEFAULT_FILL
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_hex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(n),
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom),
    }
}

fn deserialize_hex_u8<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = deserialize_hex_u32(deserializer)?;
    u8::try_from(value)
        .map_err(|_| serde::de::Error::custom(format!("fill value 0x{:X} exceeds one byte", value)))
}

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

/// A named address window `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    /// Window name
    pub name: String,
    /// First address
    pub start: u32,
    /// One past the last address
    pub end: u32,
    /// Value of bytes not covered by any record
    pub fill: u8,
}

impl WindowSpec {
    /// Size of the window in bytes
    pub fn size(&self) -> u32 {
        self.end - self.start
    }

    /// Allocate a fresh buffer for this window
    pub fn allocate(&self) -> Result<MemoryWindow, WindowError> {
        MemoryWindow::new(self.start, self.end, self.fill)
    }
}

/// A set of named windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    /// Optional map name (usually the device)
    pub name: Option<String>,
    /// Windows sorted by start address
    pub windows: Vec<WindowSpec>,
}

impl MemoryMap {
    /// Load a memory map from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a memory map from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, MapError> {
        let file: TomlMapFile =
            toml::from_str(content).map_err(|e| MapError::Parse(e.to_string()))?;

        let mut map = MemoryMap {
            name: file.map.and_then(|meta| meta.name),
            windows: Vec::with_capacity(file.window.len()),
        };

        for window in file.window {
            if window.end < window.start {
                return Err(MapError::InvalidWindow {
                    name: window.name,
                    start: window.start,
                    end: window.end,
                });
            }
            if map.find(&window.name).is_some() {
                return Err(MapError::DuplicateWindow(window.name));
            }
            map.windows.push(WindowSpec {
                name: window.name,
                start: window.start,
                end: window.end,
                fill: window.fill,
            });
        }

        map.windows.sort_by_key(|w| w.start);
        log::debug!("Loaded memory map with {} windows", map.windows.len());
        Ok(map)
    }

    /// Find a window by name
    pub fn find(&self, name: &str) -> Option<&WindowSpec> {
        self.windows.iter().find(|w| w.name == name)
    }

    /// Find a window by name, failing if it is missing
    pub fn window(&self, name: &str) -> Result<&WindowSpec, MapError> {
        self.find(name)
            .ok_or_else(|| MapError::WindowNotFound(name.to_string()))
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the map has no windows
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
