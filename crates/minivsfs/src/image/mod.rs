//! In-memory MiniVSFS image: the whole image is one owned byte buffer.
//!
//! Every operation reads and mutates that buffer; persistence is a separate,
//! whole-image write (see [`crate::store`]).

mod add;
mod read;
mod verify;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::bits::BitmapBlock;
use crate::checksum::block_checksum;
use crate::constants::{BLOCK_SIZE, DIRENT_SIZE, INODE_SIZE, ROOT_INO, SUPERBLOCK_SIZE};
use crate::error::{FsError, FsResult};
use crate::layout::Layout;
use crate::ondisk::{DirEntry, Inode, NodeKind, Superblock};

pub use add::{AddedFile, blocks_needed, check_payload_len};
pub use read::FileMetadata;
pub use verify::Issue;

/// FormatOptions carries caller-supplied knobs for a fresh image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Reserved for randomized layout perturbation; recorded but not consulted.
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct Image {
    bytes: Vec<u8>,
    superblock: Superblock,
    layout: Layout,
}

impl Image {
    /// `format` builds a zeroed image for `layout` holding only the root directory.
    ///
    /// # Arguments
    /// * `layout` - Validated region plan.
    /// * `options` - Format options; the seed is reserved.
    #[must_use]
    pub fn format(layout: &Layout, options: &FormatOptions) -> Self {
        debug!(
            seed = options.seed,
            total_blocks = layout.total_blocks,
            inode_count = layout.inode_count,
            "formatting image"
        );
        Self::format_at(layout, now_epoch())
    }

    fn format_at(layout: &Layout, now: u64) -> Self {
        let mut bytes = vec![0u8; layout.image_len()];

        let mut superblock = Superblock::for_layout(layout, now);
        superblock.write_sealed(&mut bytes[..BLOCK_SIZE]);

        let mut image = Self {
            bytes,
            superblock,
            layout: *layout,
        };

        let mut inode_map = image.inode_bitmap();
        let mut data_map = image.data_bitmap();
        inode_map.set(0, true);
        data_map.set(0, true);
        image.store_inode_bitmap(&inode_map);
        image.store_data_bitmap(&data_map);

        let root_block = layout.data_region_start as u32;
        image.store_inode(ROOT_INO, &Inode::directory(root_block, now));

        let dot = DirEntry::new(ROOT_INO, NodeKind::Dir, b".");
        let dotdot = DirEntry::new(ROOT_INO, NodeKind::Dir, b"..");
        image.store_dirent(u64::from(root_block), 0, &dot);
        image.store_dirent(u64::from(root_block), 1, &dotdot);
        image
    }

    /// `from_bytes` adopts an existing image buffer after validating its superblock.
    ///
    /// # Errors
    /// Returns `FsError::Format` for foreign or truncated images and `FsError::Corrupt`
    /// when the superblock disagrees with the buffer or its own checksum.
    pub fn from_bytes(bytes: Vec<u8>) -> FsResult<Self> {
        if bytes.len() < BLOCK_SIZE {
            return Err(FsError::Format(format!(
                "image too small ({} bytes, need at least one {BLOCK_SIZE}-byte block)",
                bytes.len()
            )));
        }
        let mut head = [0u8; SUPERBLOCK_SIZE];
        head.copy_from_slice(&bytes[..SUPERBLOCK_SIZE]);
        let superblock = Superblock::decode(&head);
        superblock.check_identity()?;

        let expected_len = superblock.total_blocks.checked_mul(BLOCK_SIZE as u64);
        if expected_len != Some(bytes.len() as u64) {
            return Err(FsError::Corrupt(format!(
                "image length {} and superblock ({} blocks) disagree",
                bytes.len(),
                superblock.total_blocks
            )));
        }
        if block_checksum(&bytes[..BLOCK_SIZE]) != superblock.checksum {
            return Err(FsError::Corrupt("superblock checksum mismatch".into()));
        }
        let layout = superblock.layout()?;
        Ok(Self {
            bytes,
            superblock,
            layout,
        })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub const fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// `free_inodes` counts clear bits in the valid range of the inode bitmap.
    #[must_use]
    pub fn free_inodes(&self) -> u64 {
        let count = self.layout.inode_count as usize;
        (count - self.inode_bitmap().count_set(count)) as u64
    }

    /// `free_blocks` counts clear bits in the valid range of the data bitmap.
    #[must_use]
    pub fn free_blocks(&self) -> u64 {
        let count = self.layout.data_region_blocks as usize;
        (count - self.data_bitmap().count_set(count)) as u64
    }

    fn block(&self, block: u64) -> &[u8] {
        let start = block as usize * BLOCK_SIZE;
        &self.bytes[start..start + BLOCK_SIZE]
    }

    fn block_mut(&mut self, block: u64) -> &mut [u8] {
        let start = block as usize * BLOCK_SIZE;
        &mut self.bytes[start..start + BLOCK_SIZE]
    }

    fn inode_bitmap(&self) -> BitmapBlock {
        BitmapBlock::from_slice(self.block(self.layout.inode_bitmap_start))
    }

    fn data_bitmap(&self) -> BitmapBlock {
        BitmapBlock::from_slice(self.block(self.layout.data_bitmap_start))
    }

    fn store_inode_bitmap(&mut self, bits: &BitmapBlock) {
        let start = self.layout.inode_bitmap_start;
        self.block_mut(start).copy_from_slice(bits.as_bytes());
    }

    fn store_data_bitmap(&mut self, bits: &BitmapBlock) {
        let start = self.layout.data_bitmap_start;
        self.block_mut(start).copy_from_slice(bits.as_bytes());
    }

    fn inode_offset(&self, ino: u32) -> usize {
        let index = (ino - 1) as usize;
        self.layout.inode_table_start as usize * BLOCK_SIZE + index * INODE_SIZE
    }

    /// `load_inode` decodes an inode slot regardless of its bitmap state.
    fn load_inode(&self, ino: u32) -> FsResult<Inode> {
        if ino == 0 || u64::from(ino) > self.layout.inode_count {
            return Err(FsError::NotFound);
        }
        let offset = self.inode_offset(ino);
        let mut buf = [0u8; INODE_SIZE];
        buf.copy_from_slice(&self.bytes[offset..offset + INODE_SIZE]);
        Ok(Inode::decode(&buf))
    }

    fn store_inode(&mut self, ino: u32, inode: &Inode) {
        let offset = self.inode_offset(ino);
        self.bytes[offset..offset + INODE_SIZE].copy_from_slice(&inode.encode());
    }

    fn load_dirent(&self, block: u64, slot: usize) -> DirEntry {
        let offset = slot * DIRENT_SIZE;
        let mut buf = [0u8; DIRENT_SIZE];
        buf.copy_from_slice(&self.block(block)[offset..offset + DIRENT_SIZE]);
        DirEntry::decode(&buf)
    }

    fn store_dirent(&mut self, block: u64, slot: usize, entry: &DirEntry) {
        let offset = slot * DIRENT_SIZE;
        self.block_mut(block)[offset..offset + DIRENT_SIZE].copy_from_slice(&entry.encode());
    }

    /// `root_block` returns the root directory's only data block.
    ///
    /// # Errors
    /// Returns `FsError::Corrupt` when the root has no block or points outside the data region.
    fn root_block(&self) -> FsResult<(Inode, u64)> {
        let root = self.load_inode(ROOT_INO)?;
        let block = u64::from(root.direct[0]);
        if block == 0 {
            return Err(FsError::Corrupt("root has no block".into()));
        }
        if !self.layout.contains_data_block(block) {
            return Err(FsError::Corrupt(format!(
                "root block {block} outside data region"
            )));
        }
        Ok((root, block))
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
