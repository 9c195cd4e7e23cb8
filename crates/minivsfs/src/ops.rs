//! End-to-end operations: each loads (or creates) a whole image, mutates it in memory,
//! and writes it out only after every step has succeeded.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::FsError;
use crate::image::{AddedFile, FormatOptions, Image};
use crate::layout::Layout;
use crate::store::{load_image, read_payload, write_image};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub layout: Layout,
}

/// `format_image` plans, formats and writes a fresh image to `output`.
///
/// # Errors
/// Returns `FsError::Config` for rejected geometry (nothing is written) or an I/O error.
pub fn format_image(
    output: &Path,
    size_kib: u64,
    inode_count: u64,
    options: &FormatOptions,
) -> Result<FormatReport> {
    let layout = Layout::plan(size_kib, inode_count)?;
    let image = Image::format(&layout, options);
    write_image(output, image.as_bytes())?;
    info!(
        "created MiniVSFS image '{}' blocks={} inode_tbl={} data={}",
        output.display(),
        layout.total_blocks,
        layout.inode_table_blocks,
        layout.data_region_blocks
    );
    Ok(FormatReport { layout })
}

/// `add_to_image` inserts the host file at `file` into the image at `input`, writing
/// the result to `output`. `input` and `output` may be the same path.
///
/// # Errors
/// Returns the first failing step's error; `output` is left untouched in that case.
pub fn add_to_image(input: &Path, output: &Path, file: &Path) -> Result<AddedFile> {
    let name = file
        .file_name()
        .ok_or(FsError::InvalidName)
        .with_context(|| format!("cannot add {}", file.display()))?;
    let bytes = load_image(input)?;
    let mut image =
        Image::from_bytes(bytes).with_context(|| format!("cannot use {}", input.display()))?;
    let payload = read_payload(file)?;
    let added = image
        .add_file(name.as_encoded_bytes(), &payload)
        .with_context(|| format!("cannot add {} to {}", file.display(), input.display()))?;
    write_image(output, image.as_bytes())?;
    info!(
        "added '{}' as inode={} ({} bytes) -> {}",
        added.name_lossy(),
        added.inode,
        added.size,
        output.display()
    );
    Ok(added)
}

/// `open_image` loads and validates an image for read-only inspection.
///
/// # Errors
/// Returns an I/O error or the validation failure from [`Image::from_bytes`].
pub fn open_image(path: &Path) -> Result<Image> {
    let bytes = load_image(path)?;
    Image::from_bytes(bytes).with_context(|| format!("cannot use {}", path.display()))
}

/// `exit_code` picks the process exit status for an operation error.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<FsError>().map_or(1, FsError::exit_code)
}
