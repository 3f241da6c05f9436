//! Unzip command implementation.

use crate::utils::print_sizes;
use cocopak_deflate::decompress_named;
use std::path::Path;

pub fn cmd_unzip(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let name = input.to_string_lossy();

    let decompressed = decompress_named(&data, &name)?;
    std::fs::write(output, &decompressed)?;

    print_sizes(input, output, decompressed.len(), data.len());
    Ok(())
}
