//! Utility functions for the CLI.

use std::path::Path;

/// Whether `path` names a gzip file.
pub fn is_gzip_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Space saved by compression, in percent.
pub fn space_savings(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

/// Print a one-line size summary for a pack or unpack.
pub fn print_sizes(input: &Path, output: &Path, original: usize, compressed: usize) {
    println!(
        "{} -> {}: {} -> {} bytes ({:.1}% saved)",
        input.display(),
        output.display(),
        original,
        compressed,
        space_savings(original, compressed)
    );
}
