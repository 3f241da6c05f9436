//! Edge case tests for DEFLATE compression.

use cocopak_core::CocoPakError;
use cocopak_deflate::lz77::WINDOW_SIZE;
use cocopak_deflate::{
    BlockType, HuffmanTree, Inflater, Lz77Symbol, canonicalize, deflate, inflate, tokenize,
};

#[test]
fn test_empty_input() {
    let input = b"";
    let compressed = deflate(input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_single_byte() {
    let input = b"A";
    let compressed = deflate(input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_two_bytes() {
    for input in [&b"AB"[..], b"\x00\x00", b"\xFF\x00"] {
        let compressed = deflate(input).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }
}

#[test]
fn test_aaaa() {
    assert_eq!(
        tokenize(b"AAAA"),
        vec![
            Lz77Symbol::Literal(b'A'),
            Lz77Symbol::copy(3, 1),
            Lz77Symbol::EndOfBlock
        ]
    );
    let compressed = deflate(b"AAAA").unwrap();
    assert_eq!(inflate(&compressed).unwrap(), b"AAAA");
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // All zeros should compress very well
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 300];
    assert!(
        tokenize(&input)
            .iter()
            .any(|s| s.copy_length() == Some(258))
    );

    let compressed = deflate(&input).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_alternating_pattern() {
    let input: Vec<u8> = (0..1000)
        .map(|i| if i % 2 == 0 { b'A' } else { b'B' })
        .collect();

    let compressed = deflate(&input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_incremental_pattern() {
    let mut input = Vec::new();
    for i in 0..256 {
        for _ in 0..10 {
            input.push(i as u8);
        }
    }

    let compressed = deflate(&input).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_long_distance_match() {
    // Pattern repeated exactly 32768 bytes later.
    let pattern = b"PATTERN_TO_MATCH";
    let mut input = vec![0u8; WINDOW_SIZE];
    input[0..pattern.len()].copy_from_slice(pattern);
    input.extend_from_slice(pattern);

    let symbols = tokenize(&input);
    assert!(
        symbols
            .iter()
            .any(|s| s.copy_distance() == Some(WINDOW_SIZE as u32))
    );

    let compressed = deflate(&input).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_distance_past_window_never_emitted() {
    let pattern = b"PATTERN_TO_MATCH";
    let mut input = vec![0u8; WINDOW_SIZE + 1];
    input[0..pattern.len()].copy_from_slice(pattern);
    input.extend_from_slice(pattern);

    let symbols = tokenize(&input);
    assert!(
        symbols
            .iter()
            .filter_map(Lz77Symbol::copy_distance)
            .all(|d| d <= WINDOW_SIZE as u32)
    );

    let compressed = deflate(&input).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}

#[test]
fn test_single_dynamic_block() {
    let input = b"one block, always one block, always dynamic".repeat(50);
    let compressed = deflate(&input).unwrap();

    let mut inflater = Inflater::new(&compressed);
    inflater.run().unwrap();
    let blocks = inflater.blocks();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_final);
    assert_eq!(blocks[0].block_type, BlockType::Dynamic);
    assert_eq!(blocks[0].output_bytes, input.len());
    assert!(blocks[0].copies > 0);
}

#[test]
fn test_all_zero_histogram_tree() {
    let tree = HuffmanTree::build(&[0; 30]);
    let lengths = tree.code_lengths(30, 15).unwrap();
    assert_eq!(lengths[0], 1);
    assert!(lengths[1..].iter().all(|&l| l == 0));
}

#[test]
fn test_canonical_codes_are_complete_and_prefix_free() {
    let histograms: [&[u32]; 4] = [
        &[1, 1],
        &[10, 1, 1, 5, 0, 0, 3],
        &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        &[1000, 1, 1, 1, 1, 1, 1, 1, 1, 500, 0, 2],
    ];
    for histogram in histograms {
        let lengths = HuffmanTree::build(histogram)
            .code_lengths(histogram.len(), 15)
            .unwrap();

        // Kraft equality: sum of 2^-len over used symbols is exactly 1.
        let kraft: u64 = lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1u64 << (15 - l))
            .sum();
        assert_eq!(kraft, 1 << 15, "histogram {:?}", histogram);

        let codes: Vec<_> = canonicalize(&lengths)
            .into_iter()
            .filter(|c| c.length > 0)
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                let (short, long) = if a.length <= b.length { (a, b) } else { (b, a) };
                let prefix = long.code >> (long.length - short.length);
                assert_ne!(prefix, short.code, "{:?} is a prefix of {:?}", short, long);
            }
        }
    }
}

#[test]
fn test_corrupted_stream_is_an_error() {
    let input = b"corruption should be reported, never panic ".repeat(30);
    let compressed = deflate(&input).unwrap();

    // Truncation
    for cut in [1, compressed.len() / 2, compressed.len() - 1] {
        assert!(inflate(&compressed[..cut]).is_err());
    }

    // Bit flips in the header and body either fail or decode to something;
    // they must never panic.
    for pos in 0..compressed.len().min(64) {
        let mut damaged = compressed.clone();
        damaged[pos] ^= 0x10;
        let _ = inflate(&damaged);
    }
}

#[test]
fn test_block_type_errors() {
    assert!(matches!(
        inflate(&[0x01, 0x00, 0x00, 0xFF, 0xFF]),
        Err(CocoPakError::UnsupportedBlockType { block_type: 0 })
    ));
    assert!(matches!(
        inflate(&[0x07]),
        Err(CocoPakError::UnsupportedBlockType { block_type: 3 })
    ));
}
