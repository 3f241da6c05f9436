//! Error types for cocopak operations.
//!
//! Every failure in the codec is fatal for the call that raised it: the
//! compressor and decompressor never return partial output. The variants
//! group into four families:
//!
//! - stream underrun (reading past the end of the input),
//! - invalid format (bad magic, reserved fields, unsupported block types,
//!   malformed code-length symbols, bad back-references),
//! - code length overflow (a built Huffman code is deeper than its alphabet
//!   allows),
//! - count mismatch (decoded code-length table disagrees with its header).

use std::io;
use thiserror::Error;

/// The main error type for cocopak operations.
#[derive(Debug, Error)]
pub enum CocoPakError {
    /// I/O error from an underlying reader, writer or subprocess pipe.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read bits past the end of the input.
    #[error("Stream underrun at bit {bit_position}: {requested} more bits requested")]
    StreamUnderrun {
        /// Bit position where the read was attempted.
        bit_position: u64,
        /// Number of bits the caller asked for.
        requested: u8,
    },

    /// Invalid magic number in a container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Malformed stream or container data.
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the problem.
        message: String,
    },

    /// DEFLATE block type other than fixed (1) or dynamic (2).
    #[error("Unsupported DEFLATE block type {block_type}")]
    UnsupportedBlockType {
        /// The 2-bit block type read from the stream.
        block_type: u8,
    },

    /// Code-length symbol outside the 0-18 alphabet.
    #[error("Invalid code-length symbol {symbol}")]
    InvalidRleSymbol {
        /// The decoded symbol.
        symbol: u16,
    },

    /// Back-reference pointing before the start of the output.
    #[error("Invalid back-reference distance: {distance} exceeds output size {available}")]
    InvalidDistance {
        /// The decoded distance.
        distance: usize,
        /// Bytes produced so far.
        available: usize,
    },

    /// A constructed Huffman code is longer than its alphabet permits.
    #[error("Huffman code for symbol {symbol} is {length} bits, maximum is {max}")]
    CodeLengthOverflow {
        /// Symbol whose code is too long.
        symbol: usize,
        /// Length of the generated code.
        length: u32,
        /// Permitted maximum.
        max: u8,
    },

    /// Decoded code-length count differs from the header-declared count.
    #[error("Code length count mismatch: header declares {expected}, decoded {found}")]
    CountMismatch {
        /// Count declared by the block header.
        expected: usize,
        /// Count produced by the run-length expansion.
        found: usize,
    },

    /// A value handed to the bit writer does not fit in the requested width.
    #[error("Value {value} does not fit within {bits} bits")]
    ValueOverflow {
        /// The value that was written.
        value: u32,
        /// The requested bit width.
        bits: u8,
    },

    /// Write attempted after the bit writer was finalized.
    #[error("Bit writer already finalized")]
    WriterFinalized,

    /// External compressor failed to run or exited unsuccessfully.
    #[error("External tool {program} failed: {message}")]
    ExternalTool {
        /// Program that was invoked.
        program: String,
        /// Description of the failure.
        message: String,
    },

    /// CRC checksum mismatch in a gzip trailer.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// CRC stored in the trailer.
        expected: u32,
        /// CRC of the decoded data.
        computed: u32,
    },

    /// Uncompressed size mismatch in a gzip trailer.
    #[error("Size mismatch: trailer says {expected} bytes, decoded {actual}")]
    SizeMismatch {
        /// ISIZE stored in the trailer (size modulo 2^32).
        expected: u32,
        /// Decoded size modulo 2^32.
        actual: u32,
    },
}

/// Result type alias for cocopak operations.
pub type Result<T> = std::result::Result<T, CocoPakError>;

impl CocoPakError {
    /// Create a stream underrun error.
    pub fn stream_underrun(bit_position: u64, requested: u8) -> Self {
        Self::StreamUnderrun {
            bit_position,
            requested,
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an unsupported block type error.
    pub fn unsupported_block_type(block_type: u8) -> Self {
        Self::UnsupportedBlockType { block_type }
    }

    /// Create an invalid code-length symbol error.
    pub fn invalid_rle_symbol(symbol: u16) -> Self {
        Self::InvalidRleSymbol { symbol }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, available: usize) -> Self {
        Self::InvalidDistance {
            distance,
            available,
        }
    }

    /// Create a code length overflow error.
    pub fn code_length_overflow(symbol: usize, length: u32, max: u8) -> Self {
        Self::CodeLengthOverflow {
            symbol,
            length,
            max,
        }
    }

    /// Create a count mismatch error.
    pub fn count_mismatch(expected: usize, found: usize) -> Self {
        Self::CountMismatch { expected, found }
    }

    /// Create a value overflow error.
    pub fn value_overflow(value: u32, bits: u8) -> Self {
        Self::ValueOverflow { value, bits }
    }

    /// Create an external tool error.
    pub fn external_tool(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u32, actual: u32) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Whether this error reports malformed input rather than an
    /// environmental or internal failure.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. }
                | Self::InvalidFormat { .. }
                | Self::UnsupportedBlockType { .. }
                | Self::InvalidRleSymbol { .. }
                | Self::InvalidDistance { .. }
                | Self::CountMismatch { .. }
                | Self::StreamUnderrun { .. }
                | Self::CrcMismatch { .. }
                | Self::SizeMismatch { .. }
        )
    }
}
