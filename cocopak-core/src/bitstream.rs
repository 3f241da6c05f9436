//! Bit-level I/O over in-memory byte buffers.
//!
//! This module provides `BitReader` and `BitWriter` for the DEFLATE bit
//! layout. Bytes are always filled starting at their least significant bit,
//! but fields come in two flavours:
//!
//! - raw fields (block headers, counts, extra bits) are packed LSB-first,
//! - Huffman codes are packed MSB-first, so the most significant bit of a
//!   canonical code is the first one in the stream.
//!
//! # Example
//!
//! ```
//! use cocopak_core::bitstream::{BitOrder, BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3, BitOrder::LsbFirst).unwrap();
//! writer.write_bits(0b1100, 4, BitOrder::MsbFirst).unwrap();
//! let bytes = writer.into_bytes();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! // An MSB-first code comes back reversed when read as a raw field.
//! assert_eq!(reader.read_bits(4).unwrap(), 0b0011);
//! ```

use crate::error::{CocoPakError, Result};

/// Order in which the bits of a field enter the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Least significant bit first (raw DEFLATE fields and extra bits).
    LsbFirst,
    /// Most significant bit first (canonical Huffman codes).
    MsbFirst,
}

/// A bit-level reader over a byte slice.
///
/// Bits are consumed LSB-first from each byte. The reader never yields bits
/// past the end of its input: a request that cannot be satisfied fails with
/// [`CocoPakError::StreamUnderrun`] and leaves the position untouched.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input bytes.
    data: &'a [u8],
    /// Index of the byte holding the next bit.
    byte_pos: usize,
    /// Offset of the next bit inside that byte (0-7).
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_offset: 0,
        }
    }

    /// Current position in bits from the start of the input.
    pub fn bit_position(&self) -> u64 {
        self.byte_pos as u64 * 8 + self.bit_offset as u64
    }

    /// Number of bits left in the input.
    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() as u64 * 8).saturating_sub(self.bit_position())
    }

    /// Whether every bit of the input has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Number of whole or partial bytes touched so far.
    pub fn bytes_consumed(&self) -> usize {
        self.byte_pos + usize::from(self.bit_offset > 0)
    }

    #[inline]
    fn take_bit(&mut self) -> u32 {
        let bit = (self.data[self.byte_pos] >> self.bit_offset) & 1;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_pos += 1;
        }
        bit as u32
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Err(CocoPakError::stream_underrun(self.bit_position(), 1));
        }
        Ok(self.take_bit() != 0)
    }

    /// Read up to 32 bits from the stream.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of bits to read (0-32)
    ///
    /// # Returns
    ///
    /// The bits read as a u32, with the first bit read in the LSB position.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count as u64 > self.remaining_bits() {
            return Err(CocoPakError::stream_underrun(self.bit_position(), count));
        }

        let mut value = 0u32;
        for i in 0..count {
            value |= self.take_bit() << i;
        }
        Ok(value)
    }
}

/// A bit-level writer accumulating into an owned byte buffer.
///
/// Call [`BitWriter::finalize`] (or [`BitWriter::into_bytes`]) when done to
/// emit the zero-padded partial last byte. Writes after finalization fail.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// Completed bytes.
    buffer: Vec<u8>,
    /// Partially filled current byte.
    current: u8,
    /// Number of bits already placed in `current` (0-7).
    bit_offset: u8,
    /// Set once the final byte has been flushed.
    finalized: bool,
}

impl BitWriter {
    /// Create an empty `BitWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `BitWriter` with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.buffer.len() as u64 * 8 + self.bit_offset as u64
    }

    /// Whether [`BitWriter::finalize`] has been called.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[inline]
    fn push_bit(&mut self, bit: u32) {
        self.current |= ((bit & 1) as u8) << self.bit_offset;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.buffer.push(self.current);
            self.current = 0;
            self.bit_offset = 0;
        }
    }

    /// Write up to 32 bits to the stream.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write, right-justified
    /// * `count` - Number of bits to write (0-32)
    /// * `order` - Whether the field goes out LSB-first or MSB-first
    pub fn write_bits(&mut self, value: u32, count: u8, order: BitOrder) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if self.finalized {
            return Err(CocoPakError::WriterFinalized);
        }
        if count < 32 && value >> count != 0 {
            return Err(CocoPakError::value_overflow(value, count));
        }

        match order {
            BitOrder::LsbFirst => {
                for i in 0..count {
                    self.push_bit(value >> i);
                }
            }
            BitOrder::MsbFirst => {
                for i in (0..count).rev() {
                    self.push_bit(value >> i);
                }
            }
        }
        Ok(())
    }

    /// Write a raw LSB-first field.
    #[inline]
    pub fn write_raw(&mut self, value: u32, count: u8) -> Result<()> {
        self.write_bits(value, count, BitOrder::LsbFirst)
    }

    /// Write a Huffman code MSB-first.
    #[inline]
    pub fn write_code(&mut self, code: u32, length: u8) -> Result<()> {
        self.write_bits(code, length, BitOrder::MsbFirst)
    }

    /// Flush the partial last byte (zero-padded) and forbid further writes.
    ///
    /// Calling this more than once has no further effect.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        if self.bit_offset > 0 {
            self.buffer.push(self.current);
            self.current = 0;
            self.bit_offset = 0;
        }
        self.finalized = true;
    }

    /// Bytes written so far. Only complete once finalized.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Finalize and return the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.finalize();
        self.buffer
    }
}
