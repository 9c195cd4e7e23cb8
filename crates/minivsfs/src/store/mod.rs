//! Whole-image persistence: load an image file into memory, write it back in one pass.


use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::{MmapMut, MmapOptions};
use tracing::debug;

use crate::constants::BLOCK_SIZE;
use crate::error::FsError;
use crate::image::check_payload_len;

/// # Errors
/// Returns an error if the image cannot be opened or mapped, or is shorter than one block.
pub fn load_image(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat image {}", path.display()))?
        .len();
    if len < BLOCK_SIZE as u64 {
        return Err(FsError::Format(format!(
            "image too small ({len} bytes, need at least one {BLOCK_SIZE}-byte block)"
        )))
        .with_context(|| format!("cannot load {}", path.display()));
    }
    let map_len = usize::try_from(len)
        .map_err(|_| anyhow::anyhow!("image length {len} exceeds addressable size"))?;
    let map = unsafe { MmapOptions::new().len(map_len).map(&file)? };
    debug!(path = %path.display(), len, "loaded image");
    Ok(map.to_vec())
}

/// `write_image` replaces `path` with `bytes`, presizing the file and copying through a
/// writable mapping that is flushed before returning.
///
/// # Errors
/// Returns an error if the output cannot be created, sized, mapped or flushed.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        anyhow::bail!("refusing to write an empty image to {}", path.display());
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to create image {}", path.display()))?;
    file.set_len(bytes.len() as u64)
        .with_context(|| format!("failed to size image {}", path.display()))?;

    let mut map: MmapMut = unsafe { MmapOptions::new().len(bytes.len()).map_mut(&file)? };
    map.copy_from_slice(bytes);
    map.flush()
        .with_context(|| format!("failed to flush image {}", path.display()))?;
    debug!(path = %path.display(), len = bytes.len(), "wrote image");
    Ok(())
}

/// `read_payload` reads a host file to add, rejecting it by length before reading
/// when it cannot fit in an inode's direct blocks.
///
/// # Errors
/// Returns an error if the file cannot be read, or `FsError::FileTooLarge` when it is too big.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    let len = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    check_payload_len(len).with_context(|| format!("cannot add {}", path.display()))?;
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
