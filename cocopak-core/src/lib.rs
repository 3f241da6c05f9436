//! # cocopak core
//!
//! Core components shared by the cocopak codec crates.
//!
//! - [`bitstream`]: bit-level reader and writer over byte buffers
//! - [`crc`]: CRC-32 used to verify gzip trailers
//! - [`error`]: the error type and `Result` alias
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI: zip / gzip / unzip / info                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec: LZ77 + Huffman + RLE, single dynamic block,      │
//! │        gzip container strip, external gzip backend      │
//! ├─────────────────────────────────────────────────────────┤
//! │ BitStream (this crate): BitReader/BitWriter, CRC-32     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cocopak_core::bitstream::{BitReader, BitWriter};
//! use cocopak_core::crc::Crc32;
//!
//! let mut writer = BitWriter::new();
//! writer.write_raw(0xABC, 12).unwrap();
//! let data = writer.into_bytes();
//!
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitOrder, BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{CocoPakError, Result};
