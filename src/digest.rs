use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use log::debug;

/// Streams the whole file through BLAKE3 and returns the lower-case hex digest.
pub fn file_digest(file_path: &Path) -> Result<String> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: '{}'", file_path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read file: '{}'", file_path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total_bytes += bytes_read as u64;
    }

    let digest = hasher.finalize().to_hex().to_string();
    debug!(
        "Digest for '{}': {} ({} bytes)",
        file_path.display(),
        digest,
        total_bytes
    );
    Ok(digest)
}
