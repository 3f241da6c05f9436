//! DEFLATE compression.
//!
//! The built-in encoder always produces exactly one final block with dynamic
//! Huffman codes (BTYPE=2):
//!
//! 1. LZ77 tokenization of the whole input.
//! 2. Literal/length and distance histograms, turned into code lengths.
//! 3. The two length lists are run-length coded, and that RLE stream gets
//!    its own small Huffman code.
//! 4. Header, code-length code, RLE stream and symbol stream are written out.

use crate::external::GzipCommand;
use crate::gzip;
use crate::huffman::{HuffmanCode, HuffmanTree, canonicalize};
use crate::lz77::{Lz77Symbol, tokenize};
use crate::rle::{RleSymbol, compress_lengths};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_ALPHABET_SIZE, FIRST_LENGTH_CODE, LITLEN_ALPHABET_SIZE,
    MAX_CODE_BITS, MAX_RLE_CODE_BITS, RLE_ALPHABET_SIZE,
};
use cocopak_core::BitWriter;
use cocopak_core::error::Result;

/// Minimum number of code-length code lengths sent in a dynamic header.
const MIN_HCLEN: usize = 4;

/// Where compressed bytes come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backend {
    /// The built-in single-block encoder.
    #[default]
    Builtin,
    /// An external gzip program; its container is stripped off.
    ExternalGzip(GzipCommand),
}

impl Backend {
    /// Map the `use_external_gzip` flag to a backend with default settings.
    pub fn from_flag(use_external_gzip: bool) -> Self {
        if use_external_gzip {
            Self::ExternalGzip(GzipCommand::default())
        } else {
            Self::Builtin
        }
    }
}

/// DEFLATE compressor.
#[derive(Debug, Clone, Default)]
pub struct Deflater {
    backend: Backend,
}

impl Deflater {
    /// Create a compressor using `backend`.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// The configured backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Compress `data` into a raw DEFLATE stream.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match &self.backend {
            Backend::Builtin => deflate(data),
            Backend::ExternalGzip(command) => {
                let member = command.run(data)?;
                Ok(gzip::strip_container(&member)?.to_vec())
            }
        }
    }
}

/// Compress `data`, either with the built-in encoder or through `gzip -9`.
pub fn compress(data: &[u8], use_external_gzip: bool) -> Result<Vec<u8>> {
    Deflater::new(Backend::from_flag(use_external_gzip)).compress(data)
}

/// Compress `data` with the built-in encoder into one dynamic block.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let symbols = tokenize(data);
    let output = encode_block(&symbols)?;
    log::debug!(
        "deflate: {} bytes -> {} bytes ({} symbols)",
        data.len(),
        output.len(),
        symbols.len()
    );
    Ok(output)
}

/// Code tables for one dynamic block.
struct BlockCodes {
    litlen: Vec<HuffmanCode>,
    distance: Vec<HuffmanCode>,
    rle: Vec<HuffmanCode>,
    rle_symbols: Vec<RleSymbol>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
}

impl BlockCodes {
    fn plan(symbols: &[Lz77Symbol]) -> Result<Self> {
        let mut litlen_histogram = [0u32; LITLEN_ALPHABET_SIZE];
        let mut distance_histogram = [0u32; DISTANCE_ALPHABET_SIZE];
        for symbol in symbols {
            litlen_histogram[symbol.litlen_code() as usize] += 1;
            if let Some(code) = symbol.distance_code() {
                distance_histogram[code as usize] += 1;
            }
        }

        let litlen_lengths = HuffmanTree::build(&litlen_histogram)
            .code_lengths(LITLEN_ALPHABET_SIZE, MAX_CODE_BITS)?;
        let distance_lengths = HuffmanTree::build(&distance_histogram)
            .code_lengths(DISTANCE_ALPHABET_SIZE, MAX_CODE_BITS)?;

        let hlit = used_prefix(&litlen_lengths).max(FIRST_LENGTH_CODE as usize);
        // An unused distance alphabet still has its lone synthetic leaf.
        let hdist = used_prefix(&distance_lengths).max(1);

        let mut rle_symbols = compress_lengths(&litlen_lengths[..hlit]);
        rle_symbols.extend(compress_lengths(&distance_lengths[..hdist]));

        let mut rle_histogram = [0u32; RLE_ALPHABET_SIZE];
        for symbol in &rle_symbols {
            rle_histogram[symbol.symbol as usize] += 1;
        }
        let rle_lengths = HuffmanTree::build(&rle_histogram)
            .code_lengths(RLE_ALPHABET_SIZE, MAX_RLE_CODE_BITS)?;

        let reordered = CODE_LENGTH_ORDER.map(|symbol| rle_lengths[symbol]);
        let hclen = used_prefix(&reordered).max(MIN_HCLEN);

        Ok(Self {
            litlen: canonicalize(&litlen_lengths),
            distance: canonicalize(&distance_lengths),
            rle: canonicalize(&rle_lengths),
            rle_symbols,
            hlit,
            hdist,
            hclen,
        })
    }
}

/// Length of `lengths` without its trailing zeros.
fn used_prefix(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |last| last + 1)
}

fn write_huffman(writer: &mut BitWriter, code: HuffmanCode) -> Result<()> {
    writer.write_code(code.code as u32, code.length)
}

fn encode_block(symbols: &[Lz77Symbol]) -> Result<Vec<u8>> {
    let codes = BlockCodes::plan(symbols)?;
    log::debug!(
        "dynamic block: HLIT={} HDIST={} HCLEN={} rle_symbols={}",
        codes.hlit,
        codes.hdist,
        codes.hclen,
        codes.rle_symbols.len()
    );

    let mut writer = BitWriter::with_capacity(symbols.len());

    // BFINAL=1, BTYPE=2
    writer.write_raw(1, 1)?;
    writer.write_raw(2, 2)?;

    writer.write_raw((codes.hlit - 257) as u32, 5)?;
    writer.write_raw((codes.hdist - 1) as u32, 5)?;
    writer.write_raw((codes.hclen - 4) as u32, 4)?;
    for &symbol in &CODE_LENGTH_ORDER[..codes.hclen] {
        writer.write_raw(codes.rle[symbol].length as u32, 3)?;
    }

    for rle in &codes.rle_symbols {
        write_huffman(&mut writer, codes.rle[rle.symbol as usize])?;
        let bits = rle.extra_bits();
        if bits > 0 {
            writer.write_raw(rle.extra as u32, bits)?;
        }
    }

    for symbol in symbols {
        write_huffman(&mut writer, codes.litlen[symbol.litlen_code() as usize])?;
        if let Lz77Symbol::Copy { length, distance } = symbol {
            writer.write_raw(length.extra_value as u32, length.extra_bits)?;
            write_huffman(&mut writer, codes.distance[distance.code as usize])?;
            writer.write_raw(distance.extra_value as u32, distance.extra_bits)?;
        }
    }

    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    #[test]
    fn test_empty_input() {
        let compressed = deflate(b"").unwrap();
        assert!(!compressed.is_empty());
        assert_eq!(inflate(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_block_header() {
        let compressed = deflate(b"AAAA").unwrap();
        // BFINAL=1, BTYPE=2 (LSB first: 1, then 0b10)
        assert_eq!(compressed[0] & 0b111, 0b101);
        assert_eq!(inflate(&compressed).unwrap(), b"AAAA");
    }

    #[test]
    fn test_aaaa_code_lengths() {
        let symbols = tokenize(b"AAAA");
        let codes = BlockCodes::plan(&symbols).unwrap();
        assert_eq!(codes.litlen[257].length, 1);
        assert_eq!(codes.litlen[65].length, 2);
        assert_eq!(codes.litlen[256].length, 2);
        assert_eq!(codes.hlit, 258);
        assert_eq!(codes.hdist, 1);
        assert_eq!(codes.distance[0].length, 1);
    }

    #[test]
    fn test_no_copies_sends_one_distance_code() {
        let codes = BlockCodes::plan(&tokenize(b"abcdefg")).unwrap();
        assert_eq!(codes.hdist, 1);
        assert_eq!(codes.hlit, 257);
        assert!(codes.hclen >= MIN_HCLEN);
    }

    #[test]
    fn test_hclen_trimmed_in_transmission_order() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 7 % 251) as u8).collect();
        let codes = BlockCodes::plan(&tokenize(&data)).unwrap();
        let last_sent = CODE_LENGTH_ORDER[codes.hclen - 1];
        assert!(codes.hclen == MIN_HCLEN || codes.rle[last_sent].length > 0);
        for &symbol in &CODE_LENGTH_ORDER[codes.hclen..] {
            assert_eq!(codes.rle[symbol].length, 0);
        }
    }

    #[test]
    fn test_used_prefix() {
        assert_eq!(used_prefix(&[0, 0, 0]), 0);
        assert_eq!(used_prefix(&[1, 0, 2, 0]), 3);
    }

    #[test]
    fn test_deterministic_output() {
        let data = b"determinism determinism determinism".repeat(20);
        assert_eq!(deflate(&data).unwrap(), deflate(&data).unwrap());
    }

    #[test]
    fn test_backend_from_flag() {
        assert_eq!(Backend::from_flag(false), Backend::Builtin);
        assert_eq!(
            Backend::from_flag(true),
            Backend::ExternalGzip(GzipCommand::default())
        );
        assert_eq!(Deflater::default().backend(), &Backend::Builtin);
    }

    #[test]
    fn test_compress_builtin() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(10);
        let compressed = compress(&data, false).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(inflate(&compressed).unwrap(), data);
    }
}
