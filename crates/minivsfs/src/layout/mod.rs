//! Region planning for a MiniVSFS image.
//!
//! An image is laid out as contiguous regions, in order:
//!
//! Block 0: superblock
//! Block 1: inode bitmap
//! Block 2: data bitmap
//! Block 3..: inode table (`INODE_SIZE` records, `INODES_PER_BLOCK` per block)
//! Remaining: data region (file contents and the root directory block)


use crate::constants::{
    BITMAP_BITS, BLOCK_SIZE, BLOCK_SIZE_KIB, INODES_PER_BLOCK, MAX_INODES, MAX_SIZE_KIB,
    MIN_INODES, MIN_SIZE_KIB,
};
use crate::error::{FsError, FsResult};

const SUPERBLOCK_BLOCK: u64 = 0;
pub(crate) const INODE_BITMAP_BLOCK: u64 = 1;
pub(crate) const DATA_BITMAP_BLOCK: u64 = 2;
pub(crate) const INODE_TABLE_START: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_blocks: u64,
    pub inode_count: u64,
    pub inode_bitmap_start: u64,
    pub data_bitmap_start: u64,
    pub inode_table_start: u64,
    pub inode_table_blocks: u64,
    pub data_region_start: u64,
    pub data_region_blocks: u64,
}

/// Region names one contiguous run of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub start: u64,
    pub blocks: u64,
}

impl Region {
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.blocks
    }
}

impl Layout {
    /// `plan` validates the user-facing image size and inode capacity and computes the layout.
    ///
    /// # Arguments
    /// * `size_kib` - Image size in KiB; a multiple of 4 within `[MIN_SIZE_KIB, MAX_SIZE_KIB]`.
    /// * `inode_count` - Inode capacity within `[MIN_INODES, MAX_INODES]`.
    ///
    /// # Errors
    /// Returns `FsError::Config` when an argument is out of range or the regions do not fit.
    pub fn plan(size_kib: u64, inode_count: u64) -> FsResult<Self> {
        if !(MIN_SIZE_KIB..=MAX_SIZE_KIB).contains(&size_kib) || size_kib % BLOCK_SIZE_KIB != 0 {
            return Err(FsError::Config(format!(
                "size must be a multiple of {BLOCK_SIZE_KIB} KiB in [{MIN_SIZE_KIB},{MAX_SIZE_KIB}], got {size_kib}"
            )));
        }
        if !(MIN_INODES..=MAX_INODES).contains(&inode_count) {
            return Err(FsError::Config(format!(
                "inode count must be in [{MIN_INODES},{MAX_INODES}], got {inode_count}"
            )));
        }
        Self::from_blocks(size_kib / BLOCK_SIZE_KIB, inode_count)
    }

    /// `from_blocks` computes region boundaries for an image of `total_blocks` blocks,
    /// without the user-facing range checks.
    ///
    /// # Errors
    /// Returns `FsError::Config` when metadata leaves no data block, or when either
    /// bitmap would need more than one block.
    pub fn from_blocks(total_blocks: u64, inode_count: u64) -> FsResult<Self> {
        if inode_count == 0 {
            return Err(FsError::Config("inode count must be positive".into()));
        }
        if inode_count > BITMAP_BITS {
            return Err(FsError::Config(format!(
                "inode count {inode_count} exceeds a single-block bitmap ({BITMAP_BITS})"
            )));
        }
        let inode_table_blocks = inode_count.div_ceil(INODES_PER_BLOCK);
        let data_region_start = INODE_TABLE_START + inode_table_blocks;
        if total_blocks <= data_region_start {
            return Err(FsError::Config(format!(
                "image too small for metadata layout ({total_blocks} blocks, metadata needs {data_region_start} plus one data block)"
            )));
        }
        let data_region_blocks = total_blocks - data_region_start;
        if data_region_blocks > BITMAP_BITS {
            return Err(FsError::Config(format!(
                "data region of {data_region_blocks} blocks too big for a single-block bitmap ({BITMAP_BITS})"
            )));
        }
        Ok(Self {
            total_blocks,
            inode_count,
            inode_bitmap_start: INODE_BITMAP_BLOCK,
            data_bitmap_start: DATA_BITMAP_BLOCK,
            inode_table_start: INODE_TABLE_START,
            inode_table_blocks,
            data_region_start,
            data_region_blocks,
        })
    }

    #[must_use]
    pub const fn image_len(&self) -> usize {
        self.total_blocks as usize * BLOCK_SIZE
    }

    /// `regions` lists every region in on-disk order.
    #[must_use]
    pub const fn regions(&self) -> [Region; 5] {
        [
            Region {
                name: "superblock",
                start: SUPERBLOCK_BLOCK,
                blocks: 1,
            },
            Region {
                name: "inode bitmap",
                start: self.inode_bitmap_start,
                blocks: 1,
            },
            Region {
                name: "data bitmap",
                start: self.data_bitmap_start,
                blocks: 1,
            },
            Region {
                name: "inode table",
                start: self.inode_table_start,
                blocks: self.inode_table_blocks,
            },
            Region {
                name: "data region",
                start: self.data_region_start,
                blocks: self.data_region_blocks,
            },
        ]
    }

    /// `contains_data_block` reports whether an absolute block number lies in the data region.
    #[must_use]
    pub const fn contains_data_block(&self, block: u64) -> bool {
        block >= self.data_region_start && block < self.data_region_start + self.data_region_blocks
    }
}
