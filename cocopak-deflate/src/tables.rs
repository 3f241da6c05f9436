//! DEFLATE alphabets, bucket formulas and fixed code tables (RFC 1951).
//!
//! Copy lengths (3-258) and distances (1-32768) are sent as a bucket symbol
//! followed by a few raw extra bits. The bucket boundaries are computed here
//! from closed-form expressions rather than lookup tables; the tests pin them
//! against the tables printed in RFC 1951 section 3.2.5.

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_CODE_BITS: u8 = 15;

/// Maximum code length for the code-length (RLE) alphabet.
pub const MAX_RLE_CODE_BITS: u8 = 7;

/// Size of the literal/length alphabet used by the encoder (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet used by the encoder (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code-length alphabet (0-18).
pub const RLE_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// First length symbol.
pub const FIRST_LENGTH_CODE: u16 = 257;

/// Last length symbol.
pub const LAST_LENGTH_CODE: u16 = 285;

/// Order of code-length code lengths in a dynamic block header.
///
/// Front-loads the symbols most likely to be used.
pub const CODE_LENGTH_ORDER: [usize; RLE_ALPHABET_SIZE] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A bucket symbol plus its raw extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtraCode {
    /// Symbol in the literal/length or distance alphabet.
    pub code: u16,
    /// Number of raw extra bits following the symbol.
    pub extra_bits: u8,
    /// Value of the extra bits.
    pub extra_value: u16,
}

/// Convert a copy length (3-258) to its length symbol (257-285).
pub fn length_code(length: u16) -> ExtraCode {
    debug_assert!(
        (3..=258).contains(&length),
        "Length out of range: {}",
        length
    );

    if length <= 10 {
        return ExtraCode {
            code: 254 + length,
            extra_bits: 0,
            extra_value: 0,
        };
    }
    if length == 258 {
        return ExtraCode {
            code: LAST_LENGTH_CODE,
            extra_bits: 0,
            extra_value: 0,
        };
    }

    // Buckets of four codes each; every group doubles in width.
    let mut extra_bits = 1u8;
    let mut group_end = 18u16;
    while length > group_end {
        extra_bits += 1;
        group_end = group_end * 2 - 2;
    }
    let offset = length - (1 << (extra_bits + 2)) - 3;

    ExtraCode {
        code: 261 + extra_bits as u16 * 4 + (offset >> extra_bits),
        extra_bits,
        extra_value: offset & ((1 << extra_bits) - 1),
    }
}

/// Convert a copy distance (1-32768) to its distance symbol (0-29).
pub fn distance_code(distance: u16) -> ExtraCode {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    if distance <= 4 {
        return ExtraCode {
            code: distance - 1,
            extra_bits: 0,
            extra_value: 0,
        };
    }

    // Buckets come in pairs; every pair doubles in width.
    let mut extra_bits = 1u8;
    let mut group_end = 8u32;
    while distance as u32 > group_end {
        extra_bits += 1;
        group_end *= 2;
    }
    let offset = distance - (1 << (extra_bits + 1)) - 1;

    ExtraCode {
        code: (extra_bits as u16 + 1) * 2 + (offset >> extra_bits),
        extra_bits,
        extra_value: offset & ((1 << extra_bits) - 1),
    }
}

/// Number of extra bits following length symbol `code` (257-285).
pub fn length_extra_bits(code: u16) -> u8 {
    debug_assert!(
        (FIRST_LENGTH_CODE..=LAST_LENGTH_CODE).contains(&code),
        "Invalid length code: {}",
        code
    );
    if code < 265 || code == LAST_LENGTH_CODE {
        0
    } else {
        ((code - 261) >> 2) as u8
    }
}

/// Decode a copy length from its symbol and extra bits.
pub fn decode_length(code: u16, extra: u16) -> u16 {
    if code < 265 {
        return code - 254;
    }
    if code == LAST_LENGTH_CODE {
        return 258;
    }
    let extra_bits = (code - 261) >> 2;
    let quadrant = (code - 261) & 3;
    (4 << extra_bits) + quadrant * (1 << extra_bits) + 3 + extra
}

/// Number of extra bits following distance symbol `code` (0-29).
pub fn distance_extra_bits(code: u16) -> u8 {
    debug_assert!(code < 30, "Invalid distance code: {}", code);
    if code < 4 { 0 } else { ((code - 2) >> 1) as u8 }
}

/// Decode a copy distance from its symbol and extra bits.
///
/// Returned as `u32` because the largest bucket tops out one past `u16`
/// range when fed garbage extra bits.
pub fn decode_distance(code: u16, extra: u16) -> u32 {
    if code < 4 {
        return code as u32 + 1;
    }
    let extra_bits = (code - 2) >> 1;
    let parity = ((code - 2) & 1) as u32;
    (2u32 << extra_bits) + parity * (1u32 << extra_bits) + 1 + extra as u32
}

/// Fixed literal/length code lengths (RFC 1951 section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

/// Fixed distance code lengths: all 32 symbols use 5 bits.
pub fn fixed_distance_lengths() -> [u8; 32] {
    [5u8; 32]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 1951 length base values for codes 257-285.
    const RFC_LENGTH_BASE: [u16; 29] = [
        3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
        131, 163, 195, 227, 258,
    ];
    const RFC_LENGTH_EXTRA: [u8; 29] = [
        0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
    ];
    /// RFC 1951 distance base values for codes 0-29.
    const RFC_DISTANCE_BASE: [u16; 30] = [
        1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
        2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
    ];

    #[test]
    fn test_length_buckets_match_rfc() {
        for (i, (&base, &bits)) in RFC_LENGTH_BASE.iter().zip(&RFC_LENGTH_EXTRA).enumerate() {
            let code = FIRST_LENGTH_CODE + i as u16;
            assert_eq!(length_extra_bits(code), bits, "extra bits for {}", code);
            assert_eq!(decode_length(code, 0), base, "base for {}", code);
            assert_eq!(
                length_code(base),
                ExtraCode {
                    code,
                    extra_bits: bits,
                    extra_value: 0
                }
            );
        }
    }

    #[test]
    fn test_distance_buckets_match_rfc() {
        for (code, &base) in RFC_DISTANCE_BASE.iter().enumerate() {
            let code = code as u16;
            let expected_bits = if code < 4 { 0 } else { (code / 2 - 1) as u8 };
            assert_eq!(distance_extra_bits(code), expected_bits);
            assert_eq!(decode_distance(code, 0), base as u32);
            assert_eq!(distance_code(base).code, code);
        }
    }

    #[test]
    fn test_every_length_inverts() {
        for length in 3..=258u16 {
            let c = length_code(length);
            assert!((FIRST_LENGTH_CODE..=LAST_LENGTH_CODE).contains(&c.code));
            assert_eq!(c.extra_bits, length_extra_bits(c.code));
            assert!(c.extra_value < (1 << c.extra_bits).max(1));
            assert_eq!(decode_length(c.code, c.extra_value), length);
        }
    }

    #[test]
    fn test_every_distance_inverts() {
        for distance in 1..=32768u16 {
            let c = distance_code(distance);
            assert!(c.code < 30);
            assert_eq!(c.extra_bits, distance_extra_bits(c.code));
            assert_eq!(decode_distance(c.code, c.extra_value), distance as u32);
        }
    }

    #[test]
    fn test_specific_codes() {
        assert_eq!(length_code(3).code, 257);
        assert_eq!(length_code(10).code, 264);
        let c = length_code(12);
        assert_eq!((c.code, c.extra_bits, c.extra_value), (265, 1, 1));
        let c = length_code(257);
        assert_eq!((c.code, c.extra_bits, c.extra_value), (284, 5, 30));
        assert_eq!(length_code(258).code, 285);

        let c = distance_code(6);
        assert_eq!((c.code, c.extra_bits, c.extra_value), (4, 1, 1));
        let c = distance_code(32768);
        assert_eq!((c.code, c.extra_bits, c.extra_value), (29, 13, 8191));
    }

    #[test]
    fn test_fixed_lengths() {
        let lengths = fixed_litlen_lengths();
        assert_eq!(lengths[0], 8);
        assert_eq!(lengths[143], 8);
        assert_eq!(lengths[144], 9);
        assert_eq!(lengths[255], 9);
        assert_eq!(lengths[256], 7);
        assert_eq!(lengths[279], 7);
        assert_eq!(lengths[280], 8);
        assert_eq!(lengths[287], 8);
        assert!(fixed_distance_lengths().iter().all(|&l| l == 5));
    }
}
