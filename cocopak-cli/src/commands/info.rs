//! Info command implementation.

use crate::utils::{is_gzip_path, space_savings};
use cocopak_deflate::{BlockSummary, BlockType, GzipMember, Inflater};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct BlockJson {
    index: usize,
    is_final: bool,
    block_type: &'static str,
    hlit: Option<usize>,
    hdist: Option<usize>,
    hclen: Option<usize>,
    literals: usize,
    copies: usize,
    output_bytes: usize,
}

impl BlockJson {
    fn new(index: usize, block: &BlockSummary) -> Self {
        Self {
            index,
            is_final: block.is_final,
            block_type: match block.block_type {
                BlockType::Fixed => "fixed",
                BlockType::Dynamic => "dynamic",
            },
            hlit: block.header.map(|h| h.hlit),
            hdist: block.header.map(|h| h.hdist),
            hclen: block.header.map(|h| h.hclen),
            literals: block.literals,
            copies: block.copies,
            output_bytes: block.output_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
struct GzipJson {
    filename: Option<String>,
    comment: Option<String>,
    mtime: u32,
    os: u8,
    crc32: u32,
    isize: u32,
    trailer_ok: bool,
}

#[derive(Debug, Serialize)]
struct StreamInfoJson {
    file: String,
    container: &'static str,
    compressed_size: usize,
    decompressed_size: usize,
    gzip: Option<GzipJson>,
    blocks: Vec<BlockJson>,
}

fn describe(path: &Path, data: &[u8]) -> Result<StreamInfoJson, Box<dyn std::error::Error>> {
    let (payload, member) = if is_gzip_path(path) {
        let member = GzipMember::parse(data)?;
        (member.payload, Some(member))
    } else {
        (data, None)
    };

    let mut inflater = Inflater::new(payload);
    inflater.run()?;

    let gzip = member.map(|m| GzipJson {
        trailer_ok: m.verify(inflater.output()).is_ok(),
        filename: m.header.filename,
        comment: m.header.comment,
        mtime: m.header.mtime,
        os: m.header.os,
        crc32: m.crc32,
        isize: m.isize,
    });

    Ok(StreamInfoJson {
        file: path.display().to_string(),
        container: if gzip.is_some() { "gzip" } else { "raw" },
        compressed_size: payload.len(),
        decompressed_size: inflater.output().len(),
        gzip,
        blocks: inflater
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, b)| BlockJson::new(i, b))
            .collect(),
    })
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let info = describe(input, &data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", info.file);
    println!("Container: {}", info.container);
    println!("Compressed size: {} bytes", info.compressed_size);
    println!("Decompressed size: {} bytes", info.decompressed_size);
    println!(
        "Space savings: {:.1}%",
        space_savings(info.decompressed_size, info.compressed_size)
    );

    if let Some(gzip) = &info.gzip {
        println!();
        println!("GZIP Header:");
        if let Some(name) = &gzip.filename {
            println!("  Original filename: {}", name);
        }
        if let Some(comment) = &gzip.comment {
            println!("  Comment: {}", comment);
        }
        if gzip.mtime > 0 {
            println!("  Modification time: {} (Unix timestamp)", gzip.mtime);
        }
        println!("  CRC-32: {:#010x}", gzip.crc32);
        println!(
            "  Trailer: {}",
            if gzip.trailer_ok { "OK" } else { "MISMATCH" }
        );
    }

    println!();
    println!(
        "{:>5} {:>8} {:>5} {:>5} {:>5} {:>5} {:>9} {:>8} {:>10}",
        "Block", "Type", "Final", "HLIT", "HDIST", "HCLEN", "Literals", "Copies", "Output"
    );
    println!("{}", "-".repeat(72));
    let dash = || "-".to_string();
    for block in &info.blocks {
        println!(
            "{:>5} {:>8} {:>5} {:>5} {:>5} {:>5} {:>9} {:>8} {:>10}",
            block.index,
            block.block_type,
            if block.is_final { "yes" } else { "no" },
            block.hlit.map_or_else(dash, |v| v.to_string()),
            block.hdist.map_or_else(dash, |v| v.to_string()),
            block.hclen.map_or_else(dash, |v| v.to_string()),
            block.literals,
            block.copies,
            block.output_bytes
        );
    }

    Ok(())
}
