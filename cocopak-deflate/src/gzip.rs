//! Gzip (RFC 1952) member parsing.
//!
//! Only what is needed to get at the raw DEFLATE payload of a single member:
//! the header is parsed and skipped, the 8-byte trailer is split off and can
//! be checked against the decoded bytes.

use cocopak_core::Crc32;
use cocopak_core::error::{CocoPakError, Result};

/// Gzip magic bytes followed by the DEFLATE method byte.
pub const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];

/// Size of the fixed part of a gzip header.
pub const HEADER_SIZE: usize = 10;

/// Size of the trailer (CRC-32 and ISIZE).
pub const TRAILER_SIZE: usize = 8;

/// Gzip header flags.
pub mod flags {
    /// Probably ASCII text.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC-16 present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits 5-7 must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// Parsed gzip member header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GzipHeader {
    /// Flag byte.
    pub flags: u8,
    /// Modification time (Unix timestamp, 0 if unknown).
    pub mtime: u32,
    /// Extra flags (2 = best compression, 4 = fastest).
    pub xfl: u8,
    /// Operating system that produced the member.
    pub os: u8,
    /// Extra field payload (if FEXTRA is set).
    pub extra: Option<Vec<u8>>,
    /// Original filename (if FNAME is set), decoded as ISO 8859-1.
    pub filename: Option<String>,
    /// Comment (if FCOMMENT is set), decoded as ISO 8859-1.
    pub comment: Option<String>,
    /// Header CRC-16 (if FHCRC is set).
    pub header_crc: Option<u16>,
}

/// A single gzip member split into header, payload and trailer.
#[derive(Debug, Clone)]
pub struct GzipMember<'a> {
    /// Parsed header.
    pub header: GzipHeader,
    /// Raw DEFLATE stream between header and trailer.
    pub payload: &'a [u8],
    /// CRC-32 of the uncompressed data, from the trailer.
    pub crc32: u32,
    /// Uncompressed size modulo 2^32, from the trailer.
    pub isize: u32,
}

impl<'a> GzipMember<'a> {
    /// Parse a gzip member.
    ///
    /// Anything after the header up to the last 8 bytes is taken as the
    /// payload; concatenated members are not split.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut rest = data;

        let fixed = take(&mut rest, HEADER_SIZE)?;
        if fixed[..3] != GZIP_MAGIC {
            return Err(CocoPakError::invalid_magic(GZIP_MAGIC, &fixed[..3]));
        }

        let flag_byte = fixed[3];
        if flag_byte & flags::RESERVED != 0 {
            return Err(CocoPakError::invalid_format(format!(
                "Reserved gzip flag bits set: {:#04x}",
                flag_byte
            )));
        }

        let mut header = GzipHeader {
            flags: flag_byte,
            mtime: u32::from_le_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]),
            xfl: fixed[8],
            os: fixed[9],
            ..GzipHeader::default()
        };

        if flag_byte & flags::FEXTRA != 0 {
            let xlen = take(&mut rest, 2)?;
            let xlen = u16::from_le_bytes([xlen[0], xlen[1]]) as usize;
            header.extra = Some(take(&mut rest, xlen)?.to_vec());
        }
        if flag_byte & flags::FNAME != 0 {
            header.filename = Some(take_latin1(&mut rest)?);
        }
        if flag_byte & flags::FCOMMENT != 0 {
            header.comment = Some(take_latin1(&mut rest)?);
        }
        if flag_byte & flags::FHCRC != 0 {
            let crc = take(&mut rest, 2)?;
            header.header_crc = Some(u16::from_le_bytes([crc[0], crc[1]]));
        }

        if rest.len() < TRAILER_SIZE {
            return Err(CocoPakError::invalid_format("Gzip member has no trailer"));
        }
        let (payload, trailer) = rest.split_at(rest.len() - TRAILER_SIZE);

        log::debug!(
            "gzip member: name={:?} comment={:?} mtime={} os={} payload={} bytes",
            header.filename,
            header.comment,
            header.mtime,
            header.os,
            payload.len()
        );

        Ok(Self {
            header,
            payload,
            crc32: u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]),
            isize: u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]),
        })
    }

    /// Check the trailer against the decoded bytes.
    pub fn verify(&self, decoded: &[u8]) -> Result<()> {
        let computed = Crc32::compute(decoded);
        if computed != self.crc32 {
            return Err(CocoPakError::crc_mismatch(self.crc32, computed));
        }
        let actual = decoded.len() as u32;
        if actual != self.isize {
            return Err(CocoPakError::size_mismatch(self.isize, actual));
        }
        Ok(())
    }
}

/// Strip the gzip container and return the raw DEFLATE payload.
pub fn strip_container(data: &[u8]) -> Result<&[u8]> {
    Ok(GzipMember::parse(data)?.payload)
}

fn take<'a>(rest: &mut &'a [u8], count: usize) -> Result<&'a [u8]> {
    if rest.len() < count {
        return Err(CocoPakError::invalid_format("Truncated gzip header"));
    }
    let (head, tail) = rest.split_at(count);
    *rest = tail;
    Ok(head)
}

fn take_latin1(rest: &mut &[u8]) -> Result<String> {
    let end = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| CocoPakError::invalid_format("Unterminated gzip header string"))?;
    let text = rest[..end].iter().map(|&b| b as char).collect();
    *rest = &rest[end + 1..];
    Ok(text)
}
