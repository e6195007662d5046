//! Free-space checks for the output filesystem.

use std::path::Path;

use bytesize::ByteSize;
use nix::sys::statvfs::statvfs;

use crate::error::GeneratorError;

/// Returns the number of bytes available to unprivileged users on the
/// filesystem holding `path`.
pub fn available_bytes(path: &Path) -> Result<u64, GeneratorError> {
    let stat = statvfs(path).map_err(std::io::Error::from)?;
    Ok(stat.blocks_available() as u64 * stat.fragment_size() as u64)
}

/// Ensures the filesystem holding `path` can take another `required` bytes
/// while keeping `reserve` bytes free.
pub fn ensure_space(path: &Path, required: u64, reserve: u64) -> Result<(), GeneratorError> {
    let needed = required.saturating_add(reserve);
    let available = available_bytes(path)?;

    if available < needed {
        return Err(GeneratorError::InsufficientSpace {
            needed: ByteSize::b(needed),
            available: ByteSize::b(available),
        });
    }

    Ok(())
}
