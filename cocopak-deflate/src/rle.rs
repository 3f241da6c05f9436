//! Run-length coding of Huffman code-length tables.
//!
//! Dynamic blocks transmit their literal/length and distance code lengths
//! through a 19-symbol alphabet:
//!
//! | symbol | meaning                          | extra bits |
//! |--------|----------------------------------|------------|
//! | 0-15   | literal code length              | 0          |
//! | 16     | repeat previous length 3-6 times | 2          |
//! | 17     | repeat zero 3-10 times           | 3          |
//! | 18     | repeat zero 11-138 times         | 7          |

use cocopak_core::error::{CocoPakError, Result};

/// Repeat the previous length 3-6 times.
pub const REPEAT_PREVIOUS: u8 = 16;

/// Repeat zero 3-10 times.
pub const REPEAT_ZERO_SHORT: u8 = 17;

/// Repeat zero 11-138 times.
pub const REPEAT_ZERO_LONG: u8 = 18;

const MAX_PREVIOUS_RUN: usize = 6;
const MAX_ZERO_RUN: usize = 138;

/// Inputs shorter than this are sent as plain literals.
const MIN_RLE_INPUT: usize = 4;

/// One code-length symbol and the value of its extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleSymbol {
    /// Symbol in the 0-18 alphabet.
    pub symbol: u8,
    /// Extra-bit value (repeat count minus the symbol's minimum).
    pub extra: u8,
}

impl RleSymbol {
    /// A plain code length.
    pub fn literal(length: u8) -> Self {
        Self {
            symbol: length,
            extra: 0,
        }
    }

    /// Number of extra bits that follow this symbol.
    pub fn extra_bits(&self) -> u8 {
        match self.symbol {
            REPEAT_PREVIOUS => 2,
            REPEAT_ZERO_SHORT => 3,
            REPEAT_ZERO_LONG => 7,
            _ => 0,
        }
    }

    /// Number of code lengths this symbol stands for.
    pub fn run_length(&self) -> usize {
        match self.symbol {
            REPEAT_PREVIOUS | REPEAT_ZERO_SHORT => self.extra as usize + 3,
            REPEAT_ZERO_LONG => self.extra as usize + 11,
            _ => 1,
        }
    }

    /// Append the lengths this symbol stands for to `out`.
    pub fn expand_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self.symbol {
            0..=15 => out.push(self.symbol),
            REPEAT_PREVIOUS => {
                let previous = *out.last().ok_or_else(|| {
                    CocoPakError::invalid_format("Repeat code 16 with no previous length")
                })?;
                out.extend(std::iter::repeat_n(previous, self.run_length()));
            }
            REPEAT_ZERO_SHORT | REPEAT_ZERO_LONG => {
                out.extend(std::iter::repeat_n(0, self.run_length()));
            }
            other => return Err(CocoPakError::invalid_rle_symbol(other as u16)),
        }
        Ok(())
    }
}

/// Run-length encode a list of code lengths (each 0-15).
///
/// Greedy, left to right: a run of three or more zeros becomes 18 or 17;
/// otherwise three or more copies of the preceding length become 16;
/// anything else is sent as a literal length.
pub fn compress_lengths(lengths: &[u8]) -> Vec<RleSymbol> {
    if lengths.len() < MIN_RLE_INPUT {
        return lengths.iter().map(|&l| RleSymbol::literal(l)).collect();
    }

    let mut symbols = Vec::new();
    let mut idx = 0;

    while idx < lengths.len() {
        let zeros = lengths[idx..]
            .iter()
            .take(MAX_ZERO_RUN)
            .take_while(|&&l| l == 0)
            .count();
        if zeros >= 11 {
            symbols.push(RleSymbol {
                symbol: REPEAT_ZERO_LONG,
                extra: (zeros - 11) as u8,
            });
            idx += zeros;
            continue;
        }
        if zeros >= 3 {
            symbols.push(RleSymbol {
                symbol: REPEAT_ZERO_SHORT,
                extra: (zeros - 3) as u8,
            });
            idx += zeros;
            continue;
        }

        if idx > 0 {
            let previous = lengths[idx - 1];
            let repeats = lengths[idx..]
                .iter()
                .take(MAX_PREVIOUS_RUN)
                .take_while(|&&l| l == previous)
                .count();
            if repeats >= 3 {
                symbols.push(RleSymbol {
                    symbol: REPEAT_PREVIOUS,
                    extra: (repeats - 3) as u8,
                });
                idx += repeats;
                continue;
            }
        }

        symbols.push(RleSymbol::literal(lengths[idx]));
        idx += 1;
    }

    symbols
}

/// Expand run-length symbols back into code lengths.
pub fn expand_lengths(symbols: &[RleSymbol]) -> Result<Vec<u8>> {
    let mut lengths = Vec::with_capacity(symbols.iter().map(RleSymbol::run_length).sum());
    for symbol in symbols {
        symbol.expand_into(&mut lengths)?;
    }
    Ok(lengths)
}
