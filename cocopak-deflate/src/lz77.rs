//! LZ77 matching for the DEFLATE encoder.
//!
//! The matcher makes a single forward pass over the input and turns it into
//! a flat list of literals and (length, distance) copies, terminated by an
//! end-of-block marker.
//!
//! # Algorithm
//!
//! Every 3-byte prefix seen so far is indexed with the ascending list of
//! offsets where it starts. At each position the matcher looks up the prefix
//! at the cursor, drops offsets that have fallen out of the 32KB window, and
//! measures each remaining candidate. The longest match wins; among equally
//! long matches the most recent (nearest) one is used. Matches shorter than
//! 3 bytes are emitted as literals.
//!
//! The index only ever answers lookups, so the output does not depend on
//! hash iteration order and is identical from run to run.

use crate::tables::{
    END_OF_BLOCK, ExtraCode, decode_distance, decode_length, distance_code, length_code,
};
use cocopak_core::error::{CocoPakError, Result};
use std::collections::HashMap;

/// Maximum back-reference distance (32KB).
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// A symbol of the LZ77 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Symbol {
    /// A literal byte.
    Literal(u8),
    /// A back-reference into the already produced output.
    Copy {
        /// Length symbol (257-285) and its extra bits.
        length: ExtraCode,
        /// Distance symbol (0-29) and its extra bits.
        distance: ExtraCode,
    },
    /// End of block (literal/length symbol 256).
    EndOfBlock,
}

impl Lz77Symbol {
    /// Build a copy symbol from a length (3-258) and a distance (1-32768).
    pub fn copy(length: u16, distance: u16) -> Self {
        Self::Copy {
            length: length_code(length),
            distance: distance_code(distance),
        }
    }

    /// Symbol in the literal/length alphabet.
    pub fn litlen_code(&self) -> u16 {
        match self {
            Self::Literal(byte) => *byte as u16,
            Self::Copy { length, .. } => length.code,
            Self::EndOfBlock => END_OF_BLOCK,
        }
    }

    /// Symbol in the distance alphabet, for copies.
    pub fn distance_code(&self) -> Option<u16> {
        match self {
            Self::Copy { distance, .. } => Some(distance.code),
            _ => None,
        }
    }

    /// Copy length in bytes, for copies.
    pub fn copy_length(&self) -> Option<u16> {
        match self {
            Self::Copy { length, .. } => Some(decode_length(length.code, length.extra_value)),
            _ => None,
        }
    }

    /// Copy distance in bytes, for copies.
    pub fn copy_distance(&self) -> Option<u32> {
        match self {
            Self::Copy { distance, .. } => {
                Some(decode_distance(distance.code, distance.extra_value))
            }
            _ => None,
        }
    }
}

/// Hash-chain LZ77 matcher over one input buffer.
#[derive(Debug)]
pub struct Lz77Matcher<'a> {
    /// Input being tokenized.
    input: &'a [u8],
    /// 3-byte prefix -> ascending offsets where it occurs.
    index: HashMap<[u8; 3], Vec<usize>>,
}

impl<'a> Lz77Matcher<'a> {
    /// Create a matcher for `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            index: HashMap::new(),
        }
    }

    #[inline]
    fn prefix(&self, pos: usize) -> [u8; 3] {
        [self.input[pos], self.input[pos + 1], self.input[pos + 2]]
    }

    /// Record the prefix starting at `pos`, if three bytes are available.
    fn record(&mut self, pos: usize) {
        if self.input.len() - pos >= MIN_MATCH {
            let key = self.prefix(pos);
            self.index.entry(key).or_default().push(pos);
        }
    }

    /// Find the longest match for the bytes at `pos`.
    ///
    /// Returns `(length, distance)`; the length is 0 when nothing matches.
    fn longest_match(&mut self, pos: usize) -> (usize, usize) {
        let input = self.input;
        let key = self.prefix(pos);
        let Some(offsets) = self.index.get_mut(&key) else {
            return (0, 0);
        };

        let stale = offsets.partition_point(|&origin| pos - origin > WINDOW_SIZE);
        offsets.drain(..stale);

        let limit = (input.len() - pos).min(MAX_MATCH);
        let target = &input[pos..pos + limit];
        let mut best = (0, 0);

        // Newest first, so the first of several equally long matches is the
        // nearest one.
        for &origin in offsets.iter().rev() {
            let length = input[origin..]
                .iter()
                .zip(target)
                .take_while(|(a, b)| a == b)
                .count();
            if length > best.0 {
                best = (length, pos - origin);
                if length == limit {
                    break;
                }
            }
        }

        best
    }

    /// Tokenize the whole input.
    pub fn run(mut self) -> Vec<Lz77Symbol> {
        let len = self.input.len();
        let mut symbols = Vec::with_capacity(len / 2 + 1);
        let mut pos = 0;

        while pos < len {
            if len - pos < MIN_MATCH {
                symbols.push(Lz77Symbol::Literal(self.input[pos]));
                pos += 1;
                continue;
            }

            let (length, distance) = self.longest_match(pos);
            if length < MIN_MATCH {
                symbols.push(Lz77Symbol::Literal(self.input[pos]));
                self.record(pos);
                pos += 1;
                continue;
            }

            for covered in pos..pos + length {
                self.record(covered);
            }
            symbols.push(Lz77Symbol::copy(length as u16, distance as u16));
            pos += length;
        }

        symbols.push(Lz77Symbol::EndOfBlock);
        log::debug!(
            "lz77: {} input bytes -> {} symbols ({} prefixes indexed)",
            len,
            symbols.len(),
            self.index.len()
        );
        symbols
    }
}

/// Tokenize `input` into an LZ77 symbol stream ending in `EndOfBlock`.
pub fn tokenize(input: &[u8]) -> Vec<Lz77Symbol> {
    Lz77Matcher::new(input).run()
}

/// Rebuild the bytes an LZ77 symbol stream stands for.
///
/// Stops at the first `EndOfBlock`. Copies are resolved byte by byte, so a
/// distance shorter than the length repeats the most recent bytes.
pub fn reconstruct(symbols: &[Lz77Symbol]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    for symbol in symbols {
        match *symbol {
            Lz77Symbol::Literal(byte) => output.push(byte),
            Lz77Symbol::Copy { .. } => {
                let length = symbol.copy_length().unwrap_or(0) as usize;
                let distance = symbol.copy_distance().unwrap_or(0) as usize;
                copy_within_output(&mut output, distance, length)?;
            }
            Lz77Symbol::EndOfBlock => break,
        }
    }
    Ok(output)
}

/// Append `length` bytes starting `distance` bytes back in `output`.
pub(crate) fn copy_within_output(
    output: &mut Vec<u8>,
    distance: usize,
    length: usize,
) -> Result<()> {
    if distance == 0 || distance > output.len() {
        return Err(CocoPakError::invalid_distance(distance, output.len()));
    }
    let mut from = output.len() - distance;
    output.reserve(length);
    for _ in 0..length {
        let byte = output[from];
        output.push(byte);
        from += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random(size: usize, seed: u32) -> Vec<u8> {
        let mut seed = seed;
        (0..size)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn test_aaaa() {
        let symbols = tokenize(b"AAAA");
        assert_eq!(
            symbols,
            vec![
                Lz77Symbol::Literal(b'A'),
                Lz77Symbol::copy(3, 1),
                Lz77Symbol::EndOfBlock
            ]
        );
        assert_eq!(symbols[1].litlen_code(), 257);
        assert_eq!(symbols[1].distance_code(), Some(0));
    }

    #[test]
    fn test_short_inputs_are_literals() {
        assert_eq!(tokenize(b""), vec![Lz77Symbol::EndOfBlock]);
        assert_eq!(
            tokenize(b"xy"),
            vec![
                Lz77Symbol::Literal(b'x'),
                Lz77Symbol::Literal(b'y'),
                Lz77Symbol::EndOfBlock
            ]
        );
    }

    #[test]
    fn test_literals_only() {
        let symbols = tokenize(b"abcdefgh");
        assert_eq!(symbols.len(), 9);
        assert!(
            symbols[..8]
                .iter()
                .all(|s| matches!(s, Lz77Symbol::Literal(_)))
        );
    }

    #[test]
    fn test_long_run_uses_max_copies() {
        let input = vec![0x5Au8; 300];
        let symbols = tokenize(&input);
        assert!(symbols.iter().any(|s| s.copy_length() == Some(258)));
        assert_eq!(
            symbols,
            vec![
                Lz77Symbol::Literal(0x5A),
                Lz77Symbol::copy(258, 1),
                Lz77Symbol::copy(41, 1),
                Lz77Symbol::EndOfBlock
            ]
        );
        assert_eq!(reconstruct(&symbols).unwrap(), input);
    }

    #[test]
    fn test_nearest_match_wins_ties() {
        // The last "abc" matches at distances 8 and 4.
        let symbols = tokenize(b"abcXabcYabc");
        assert_eq!(symbols.len(), 8);
        assert_eq!(symbols[4], Lz77Symbol::copy(3, 4));
        assert_eq!(symbols[6], Lz77Symbol::copy(3, 4));
    }

    #[test]
    fn test_window_boundary() {
        let pattern = b"PATTERN_TO_MATCH";

        // Exactly 32768 bytes back: still reachable.
        let mut input = vec![0u8; WINDOW_SIZE];
        input[..pattern.len()].copy_from_slice(pattern);
        input.extend_from_slice(pattern);
        let symbols = tokenize(&input);
        assert!(
            symbols
                .iter()
                .any(|s| s.copy_distance() == Some(WINDOW_SIZE as u32))
        );
        assert_eq!(reconstruct(&symbols).unwrap(), input);

        // One byte further: out of the window.
        let mut input = vec![0u8; WINDOW_SIZE + 1];
        input[..pattern.len()].copy_from_slice(pattern);
        input.extend_from_slice(pattern);
        let symbols = tokenize(&input);
        assert!(
            symbols
                .iter()
                .filter_map(Lz77Symbol::copy_distance)
                .all(|d| d <= WINDOW_SIZE as u32)
        );
        assert!(
            !symbols
                .iter()
                .any(|s| s.copy_distance() == Some(WINDOW_SIZE as u32 + 1))
        );
        assert_eq!(reconstruct(&symbols).unwrap(), input);
    }

    #[test]
    fn test_reconstruct_mixed_inputs() {
        let mut text = Vec::new();
        while text.len() < 5000 {
            text.extend_from_slice(b"The quick brown fox jumps over the lazy dog. ");
        }
        let inputs = [
            b"Hello, Hello, Hello!".to_vec(),
            pseudo_random(4000, 7),
            text,
            (0..=255u8).cycle().take(3000).collect(),
        ];
        for input in &inputs {
            let symbols = tokenize(input);
            assert_eq!(symbols.last(), Some(&Lz77Symbol::EndOfBlock));
            assert_eq!(&reconstruct(&symbols).unwrap(), input);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = pseudo_random(2000, 99)
            .into_iter()
            .map(|b| b & 0x07)
            .collect::<Vec<_>>();
        assert_eq!(tokenize(&input), tokenize(&input));
    }

    #[test]
    fn test_bad_distance() {
        let mut output = vec![1, 2, 3];
        assert!(copy_within_output(&mut output, 4, 3).is_err());
        assert!(copy_within_output(&mut output, 0, 3).is_err());
        copy_within_output(&mut output, 1, 3).unwrap();
        assert_eq!(output, vec![1, 2, 3, 3, 3, 3]);
    }
}
