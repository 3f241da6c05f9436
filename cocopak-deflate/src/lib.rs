//! # cocopak deflate
//!
//! Raw DEFLATE (RFC 1951) codec for packing game assets.
//!
//! The encoder emits a single final block with dynamic Huffman codes built
//! from one LZ77 pass over the whole input. Its output is plain RFC 1951 and
//! can be read by any standard inflater. The decoder handles fixed and
//! dynamic Huffman blocks.
//!
//! ## Features
//!
//! - **Compression**: LZ77 (32KB window, 3-258 byte matches) + canonical
//!   Huffman codes, or an external `gzip -9` whose container is stripped
//! - **Decompression**: fixed and dynamic Huffman blocks, optional gzip
//!   container with CRC-32 and size verification
//! - Deterministic output: the same input always yields the same bytes
//!
//! ## Example
//!
//! ```rust
//! use cocopak_deflate::{compress, decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original, false).unwrap();
//!
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod external;
pub mod gzip;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod rle;
pub mod tables;

// Re-exports
pub use deflate::{Backend, Deflater, compress, deflate};
pub use external::GzipCommand;
pub use gzip::{GzipHeader, GzipMember, strip_container};
pub use huffman::{DecodeTree, HuffmanCode, HuffmanTree, canonicalize};
pub use inflate::{
    BlockSummary, BlockType, DynamicHeader, Inflater, decompress, decompress_named, inflate,
};
pub use lz77::{Lz77Matcher, Lz77Symbol, tokenize};
pub use rle::{RleSymbol, compress_lengths, expand_lengths};
