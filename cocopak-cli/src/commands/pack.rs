//! Zip and gzip command implementations.

use crate::utils::print_sizes;
use cocopak_deflate::{Backend, Deflater, GzipCommand};
use std::path::Path;

pub fn cmd_zip(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    pack(input, output, Backend::Builtin)
}

pub fn cmd_gzip(
    input: &Path,
    output: &Path,
    gzip_program: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = GzipCommand::with_program(gzip_program);
    pack(input, output, Backend::ExternalGzip(command))
}

fn pack(input: &Path, output: &Path, backend: Backend) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    log::debug!("packing {} ({} bytes) with {:?}", input.display(), data.len(), backend);

    let compressed = Deflater::new(backend).compress(&data)?;
    std::fs::write(output, &compressed)?;

    print_sizes(input, output, data.len(), compressed.len());
    Ok(())
}
