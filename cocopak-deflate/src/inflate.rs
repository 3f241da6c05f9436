//! DEFLATE decompression (inflate).
//!
//! Decodes fixed (type 1) and dynamic (type 2) Huffman blocks. Stored
//! blocks (type 0) are not supported, and type 3 is reserved.

use crate::gzip::GzipMember;
use crate::huffman::DecodeTree;
use crate::lz77::copy_within_output;
use crate::rle::RleSymbol;
use crate::tables::{
    CODE_LENGTH_ORDER, END_OF_BLOCK, LAST_LENGTH_CODE, RLE_ALPHABET_SIZE, decode_distance,
    decode_length, distance_extra_bits, fixed_distance_lengths, fixed_litlen_lengths,
    length_extra_bits,
};
use cocopak_core::BitReader;
use cocopak_core::error::{CocoPakError, Result};

/// Huffman block flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// BTYPE=1, the predefined code of RFC 1951 section 3.2.6.
    Fixed,
    /// BTYPE=2, codes transmitted in the block header.
    Dynamic,
}

/// Header counts of a dynamic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicHeader {
    /// Number of literal/length code lengths (257-288).
    pub hlit: usize,
    /// Number of distance code lengths (1-32).
    pub hdist: usize,
    /// Number of code-length code lengths (4-19).
    pub hclen: usize,
}

/// What one decoded block contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    /// BFINAL was set.
    pub is_final: bool,
    /// Block type.
    pub block_type: BlockType,
    /// Header counts, for dynamic blocks.
    pub header: Option<DynamicHeader>,
    /// Literal symbols decoded.
    pub literals: usize,
    /// Copy symbols decoded.
    pub copies: usize,
    /// Bytes produced by this block.
    pub output_bytes: usize,
}

/// DEFLATE decompressor over an in-memory stream.
#[derive(Debug)]
pub struct Inflater<'a> {
    reader: BitReader<'a>,
    output: Vec<u8>,
    blocks: Vec<BlockSummary>,
    finished: bool,
}

impl<'a> Inflater<'a> {
    /// Create a decompressor for the raw DEFLATE stream `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(data),
            output: Vec::with_capacity(data.len() * 3),
            blocks: Vec::new(),
            finished: false,
        }
    }

    /// Decode blocks until the final one. Bytes after it are ignored.
    pub fn run(&mut self) -> Result<()> {
        while !self.finished {
            self.inflate_block()?;
        }
        Ok(())
    }

    /// Decode the next block.
    pub fn inflate_block(&mut self) -> Result<BlockSummary> {
        let start = self.output.len();
        let is_final = self.reader.read_bit()?;
        let btype = self.reader.read_bits(2)? as u8;

        let (block_type, header, (literals, copies)) = match btype {
            1 => {
                log::trace!("fixed block (final={})", is_final);
                let litlen = DecodeTree::from_lengths(&fixed_litlen_lengths())?;
                let distance = DecodeTree::from_lengths(&fixed_distance_lengths())?;
                (BlockType::Fixed, None, self.inflate_huffman(&litlen, &distance)?)
            }
            2 => {
                let (header, litlen, distance) = self.read_dynamic_header()?;
                log::trace!(
                    "dynamic block (final={}): HLIT={} HDIST={} HCLEN={}",
                    is_final,
                    header.hlit,
                    header.hdist,
                    header.hclen
                );
                (
                    BlockType::Dynamic,
                    Some(header),
                    self.inflate_huffman(&litlen, &distance)?,
                )
            }
            other => return Err(CocoPakError::unsupported_block_type(other)),
        };

        let summary = BlockSummary {
            is_final,
            block_type,
            header,
            literals,
            copies,
            output_bytes: self.output.len() - start,
        };
        self.blocks.push(summary);
        self.finished = is_final;
        Ok(summary)
    }

    /// Read HLIT/HDIST/HCLEN, the code-length code and the RLE-coded
    /// literal/length and distance code lengths.
    fn read_dynamic_header(&mut self) -> Result<(DynamicHeader, DecodeTree, DecodeTree)> {
        let header = DynamicHeader {
            hlit: self.reader.read_bits(5)? as usize + 257,
            hdist: self.reader.read_bits(5)? as usize + 1,
            hclen: self.reader.read_bits(4)? as usize + 4,
        };

        let mut rle_lengths = [0u8; RLE_ALPHABET_SIZE];
        for &symbol in &CODE_LENGTH_ORDER[..header.hclen] {
            rle_lengths[symbol] = self.reader.read_bits(3)? as u8;
        }
        let rle_tree = DecodeTree::from_lengths(&rle_lengths)?;

        let expected = header.hlit + header.hdist;
        let mut lengths = Vec::with_capacity(expected + 138);
        while lengths.len() < expected {
            let symbol = rle_tree.decode(&mut self.reader)?;
            let mut rle = RleSymbol {
                symbol: symbol as u8,
                extra: 0,
            };
            let bits = rle.extra_bits();
            if bits > 0 {
                rle.extra = self.reader.read_bits(bits)? as u8;
            }
            rle.expand_into(&mut lengths)?;
        }
        if lengths.len() != expected {
            return Err(CocoPakError::count_mismatch(expected, lengths.len()));
        }

        let (litlen, distance) = lengths.split_at(header.hlit);
        Ok((
            header,
            DecodeTree::from_lengths(litlen)?,
            DecodeTree::from_lengths(distance)?,
        ))
    }

    /// Decode symbols up to the end of the block.
    ///
    /// Returns the number of literals and copies seen.
    fn inflate_huffman(
        &mut self,
        litlen: &DecodeTree,
        distance: &DecodeTree,
    ) -> Result<(usize, usize)> {
        let mut literals = 0;
        let mut copies = 0;

        loop {
            let symbol = litlen.decode(&mut self.reader)?;
            if symbol < END_OF_BLOCK {
                self.output.push(symbol as u8);
                literals += 1;
                continue;
            }
            if symbol == END_OF_BLOCK {
                break;
            }
            if symbol > LAST_LENGTH_CODE {
                return Err(CocoPakError::invalid_format(format!(
                    "Invalid literal/length symbol: {}",
                    symbol
                )));
            }

            let extra = self.reader.read_bits(length_extra_bits(symbol))? as u16;
            let length = decode_length(symbol, extra);

            let distance_symbol = distance.decode(&mut self.reader)?;
            if distance_symbol >= 30 {
                return Err(CocoPakError::invalid_format(format!(
                    "Invalid distance symbol: {}",
                    distance_symbol
                )));
            }
            let extra = self.reader.read_bits(distance_extra_bits(distance_symbol))? as u16;
            let copy_distance = decode_distance(distance_symbol, extra);

            copy_within_output(&mut self.output, copy_distance as usize, length as usize)?;
            copies += 1;
        }

        Ok((literals, copies))
    }

    /// Whether the final block has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Summaries of the blocks decoded so far.
    pub fn blocks(&self) -> &[BlockSummary] {
        &self.blocks
    }

    /// Input bytes consumed so far (a partially read byte counts).
    pub fn bytes_consumed(&self) -> usize {
        self.reader.bytes_consumed()
    }

    /// The decompressed output so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take ownership of the decompressed output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}

/// Decompress a raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new(data);
    inflater.run()?;
    log::debug!(
        "inflate: {} bytes -> {} bytes in {} block(s)",
        inflater.bytes_consumed(),
        inflater.output().len(),
        inflater.blocks().len()
    );
    Ok(inflater.into_output())
}

/// Decompress a raw DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    inflate(data)
}

/// Decompress a file's contents, using its name to pick the container.
///
/// Names ending in `.gz` are treated as a gzip member: the container is
/// stripped and the trailer CRC-32 and size are verified. Anything else is
/// a raw DEFLATE stream.
pub fn decompress_named(data: &[u8], name: &str) -> Result<Vec<u8>> {
    if !name.ends_with(".gz") {
        return inflate(data);
    }
    let member = GzipMember::parse(data)?;
    let output = inflate(member.payload)?;
    member.verify(&output)?;
    Ok(output)
}
