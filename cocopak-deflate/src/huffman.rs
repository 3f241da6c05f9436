//! Huffman coding for the DEFLATE block codec.
//!
//! Two separate tree types live here because their construction and
//! traversal have little in common:
//!
//! - [`HuffmanTree`] is built bottom-up from a histogram and only exists to
//!   measure code lengths. Its nodes sit in an arena and refer to their
//!   children by index.
//! - [`DecodeTree`] is rebuilt from transmitted code lengths and walked one
//!   bit at a time while decoding.
//!
//! Only code lengths are ever transmitted. Both sides regenerate identical
//! code values with [`canonicalize`].

use crate::tables::MAX_CODE_BITS;
use cocopak_core::BitReader;
use cocopak_core::error::{CocoPakError, Result};
use std::collections::VecDeque;

/// Index of a node inside a tree arena.
pub type NodeId = usize;

/// A canonical Huffman code: length in bits and right-justified value.
///
/// The value is written MSB-first. A length of zero means the symbol is not
/// part of the code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// Number of bits in the code (0-15).
    pub length: u8,
    /// The code bits, right-justified.
    pub code: u16,
}

/// A node of the construction tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildNode {
    /// A symbol and its frequency.
    Leaf {
        /// Symbol number.
        symbol: u16,
        /// Histogram count.
        weight: u32,
    },
    /// A merge of two subtrees.
    Internal {
        /// Sum of the children's weights.
        weight: u32,
        /// Child reached by a 0 bit.
        zero: NodeId,
        /// Child reached by a 1 bit.
        one: NodeId,
    },
}

impl BuildNode {
    /// Weight of this node.
    pub fn weight(&self) -> u32 {
        match *self {
            Self::Leaf { weight, .. } | Self::Internal { weight, .. } => weight,
        }
    }
}

/// Huffman construction tree built from a symbol histogram.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<BuildNode>,
    root: NodeId,
}

impl HuffmanTree {
    /// Build an optimal prefix code tree from `histogram`.
    ///
    /// Nodes are merged two at a time, always taking the two lowest weights.
    /// Ties resolve to the earliest node in the working list, which starts in
    /// symbol order and receives each merged node at its end. The lowest node
    /// becomes the zero child. An all-zero histogram yields a lone leaf for
    /// symbol 0 so that an unused alphabet can still be described.
    pub fn build(histogram: &[u32]) -> Self {
        let mut nodes: Vec<BuildNode> = histogram
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight > 0)
            .map(|(symbol, &weight)| BuildNode::Leaf {
                symbol: symbol as u16,
                weight,
            })
            .collect();

        if nodes.is_empty() {
            return Self {
                nodes: vec![BuildNode::Leaf {
                    symbol: 0,
                    weight: 0,
                }],
                root: 0,
            };
        }

        let mut loose: Vec<NodeId> = (0..nodes.len()).collect();

        while loose.len() > 1 {
            let weight = |slot: usize| nodes[loose[slot]].weight();

            let (mut smallest, mut small) = if weight(1) < weight(0) { (1, 0) } else { (0, 1) };
            for slot in 2..loose.len() {
                if weight(slot) < weight(smallest) {
                    small = smallest;
                    smallest = slot;
                } else if weight(slot) < weight(small) {
                    small = slot;
                }
            }

            let zero = loose[smallest];
            let one = loose[small];
            let merged = BuildNode::Internal {
                weight: nodes[zero].weight() + nodes[one].weight(),
                zero,
                one,
            };

            // Remove the higher slot first so the lower index stays valid.
            loose.remove(smallest.max(small));
            loose.remove(smallest.min(small));

            nodes.push(merged);
            loose.push(nodes.len() - 1);
        }

        let root = loose[0];
        Self { nodes, root }
    }

    /// The arena holding every node of the tree.
    pub fn nodes(&self) -> &[BuildNode] {
        &self.nodes
    }

    /// Arena index of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Extract each symbol's code from its root-to-leaf path.
    ///
    /// The first branch taken is the most significant bit of the code. A tree
    /// consisting of a single leaf assigns that symbol a 1-bit code of 0.
    /// Fails with [`CocoPakError::CodeLengthOverflow`] if any code is longer
    /// than `max_bits`.
    pub fn invert(&self, alphabet_size: usize, max_bits: u8) -> Result<Vec<HuffmanCode>> {
        let mut codes = vec![HuffmanCode::default(); alphabet_size];

        if let BuildNode::Leaf { symbol, .. } = self.nodes[self.root] {
            if let Some(slot) = codes.get_mut(symbol as usize) {
                *slot = HuffmanCode { length: 1, code: 0 };
            }
            return Ok(codes);
        }

        let mut stack: Vec<(NodeId, u32, u32)> = vec![(self.root, 0, 0)];
        while let Some((id, depth, path)) = stack.pop() {
            match self.nodes[id] {
                BuildNode::Leaf { symbol, .. } => {
                    if depth > max_bits as u32 {
                        return Err(CocoPakError::code_length_overflow(
                            symbol as usize,
                            depth,
                            max_bits,
                        ));
                    }
                    if let Some(slot) = codes.get_mut(symbol as usize) {
                        *slot = HuffmanCode {
                            length: depth as u8,
                            code: path as u16,
                        };
                    }
                }
                BuildNode::Internal { zero, one, .. } => {
                    // Paths past 32 bits cannot be stored, and are long past
                    // any permitted maximum anyway.
                    if depth >= 32 {
                        return Err(CocoPakError::code_length_overflow(0, depth + 1, max_bits));
                    }
                    stack.push((one, depth + 1, (path << 1) | 1));
                    stack.push((zero, depth + 1, path << 1));
                }
            }
        }

        Ok(codes)
    }

    /// Code lengths for an alphabet of `alphabet_size` symbols.
    pub fn code_lengths(&self, alphabet_size: usize, max_bits: u8) -> Result<Vec<u8>> {
        Ok(self
            .invert(alphabet_size, max_bits)?
            .iter()
            .map(|c| c.length)
            .collect())
    }
}

/// Assign canonical code values to a list of code lengths.
///
/// Codes are handed out in order of increasing length and, within a length,
/// increasing symbol number. The first code of length `L` is
/// `(first(L - 1) + count(L - 1)) << 1`. Symbols with length 0 get an empty
/// code.
pub fn canonicalize(lengths: &[u8]) -> Vec<HuffmanCode> {
    let max_length = lengths.iter().copied().max().unwrap_or(0) as usize;

    let mut count_by_length = vec![0u32; max_length + 1];
    for &len in lengths.iter().filter(|&&len| len > 0) {
        count_by_length[len as usize] += 1;
    }

    let mut next_code = vec![0u32; max_length + 1];
    let mut code = 0u32;
    for bits in 1..=max_length {
        code = (code + count_by_length[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return HuffmanCode::default();
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;
            HuffmanCode {
                length: len,
                code: code as u16,
            }
        })
        .collect()
}

/// A node of the decode tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeNode {
    /// Decoding stops here with this symbol.
    Leaf(u16),
    /// Interior node.
    Branch {
        /// Child reached by a 0 bit.
        zero: NodeId,
        /// Child reached by a 1 bit.
        one: NodeId,
    },
    /// Unassigned slot of an incomplete code.
    Vacant,
}

/// Bit-by-bit Huffman decoder rebuilt from code lengths.
#[derive(Debug, Clone)]
pub struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

impl DecodeTree {
    const ROOT: NodeId = 0;

    /// Build a decode tree from per-symbol code lengths.
    ///
    /// Level by level, symbols of the current length claim the leftmost open
    /// slots in symbol order; every slot still open then splits into two
    /// slots one level deeper. This reproduces exactly the tree implied by
    /// [`canonicalize`]. Slots left open after the deepest level stay
    /// [`DecodeNode::Vacant`].
    ///
    /// # Arguments
    ///
    /// * `lengths` - Array where `lengths[i]` is the bit length for symbol `i`.
    ///   A length of 0 means the symbol is not used.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let max_length = lengths.iter().copied().max().unwrap_or(0);
        if max_length > MAX_CODE_BITS {
            return Err(CocoPakError::invalid_format(format!(
                "Code length {} exceeds maximum {}",
                max_length, MAX_CODE_BITS
            )));
        }

        let mut nodes = vec![
            DecodeNode::Branch { zero: 1, one: 2 },
            DecodeNode::Vacant,
            DecodeNode::Vacant,
        ];
        let mut open: VecDeque<NodeId> = VecDeque::from([1, 2]);

        for level in 1..=max_length {
            for (symbol, _) in lengths.iter().enumerate().filter(|&(_, &l)| l == level) {
                let slot = open.pop_front().ok_or_else(|| {
                    CocoPakError::invalid_format(format!(
                        "Over-subscribed Huffman code at length {}",
                        level
                    ))
                })?;
                nodes[slot] = DecodeNode::Leaf(symbol as u16);
            }

            if level == max_length {
                break;
            }

            let mut deeper = VecDeque::with_capacity(open.len() * 2);
            for slot in open {
                let zero = nodes.len();
                nodes.push(DecodeNode::Vacant);
                nodes.push(DecodeNode::Vacant);
                nodes[slot] = DecodeNode::Branch { zero, one: zero + 1 };
                deeper.push_back(zero);
                deeper.push_back(zero + 1);
            }
            open = deeper;
        }

        Ok(Self { nodes })
    }

    /// The arena holding every node of the tree.
    pub fn nodes(&self) -> &[DecodeNode] {
        &self.nodes
    }

    /// Read one symbol, walking the tree a bit at a time.
    ///
    /// A 0 bit follows the zero child and a 1 bit the one child. Landing on
    /// an unassigned slot is a format error.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let start = reader.bit_position();
        let mut node = Self::ROOT;
        loop {
            let bit = reader.read_bit()?;
            node = match self.nodes[node] {
                DecodeNode::Branch { zero, one } => {
                    if bit {
                        one
                    } else {
                        zero
                    }
                }
                _ => unreachable!("walk only continues from branch nodes"),
            };
            match self.nodes[node] {
                DecodeNode::Leaf(symbol) => return Ok(symbol),
                DecodeNode::Branch { .. } => {}
                DecodeNode::Vacant => {
                    return Err(CocoPakError::invalid_format(format!(
                        "Invalid Huffman code at bit position {}",
                        start
                    )));
                }
            }
        }
    }
}
