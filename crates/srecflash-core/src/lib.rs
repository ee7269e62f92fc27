//! srecflash-core - Motorola S-record codec
//!
//! This crate converts between the Motorola S-record (SREC) text format and
//! a flat memory image covering a caller-supplied address window. The record
//! layer (header scanning, checksums) only needs `core`; the stream-level
//! decoder and encoder, memory windows and memory maps require `std`.
//!
//! # Features
//!
//! - `std` - Enable the decoder, encoder, memory windows and TOML memory maps
//!
//! # Example
//!
//! ```ignore
//! use srecflash_core::{decode, encode, MemoryWindow};
//!
//! let window = MemoryWindow::new(0x8000, 0x10000, 0xFF)?;
//! let decoded = decode(std::io::BufReader::new(file), window)?;
//! println!("{} bytes populated", decoded.bytes_written);
//!
//! encode(std::io::stdout().lock(), &decoded.window)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod record;

#[cfg(feature = "std")]
pub mod decoder;
#[cfg(feature = "std")]
pub mod encoder;
#[cfg(feature = "std")]
pub mod map;
#[cfg(feature = "std")]
pub mod window;

pub use error::RecordError;
pub use record::{RecordHeader, RecordType};

#[cfg(feature = "std")]
pub use decoder::{decode, Decoded};
#[cfg(feature = "std")]
pub use encoder::{encode, encode_with, EncoderConfig};
#[cfg(feature = "std")]
pub use error::{DecodeError, EncodeError, WindowError};
#[cfg(feature = "std")]
pub use map::{MapError, MemoryMap, WindowSpec};
#[cfg(feature = "std")]
pub use window::MemoryWindow;
