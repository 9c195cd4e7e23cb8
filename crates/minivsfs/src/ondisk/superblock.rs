use super::{Reader, Writer};
use crate::checksum::block_checksum;
use crate::constants::{
    BITMAP_BITS, BLOCK_SIZE, INODES_PER_BLOCK, MAGIC, ROOT_INO, SUPERBLOCK_CHECKSUM_OFFSET,
    SUPERBLOCK_SIZE, VERSION,
};
use crate::error::{FsError, FsResult};
use crate::layout::{DATA_BITMAP_BLOCK, INODE_BITMAP_BLOCK, INODE_TABLE_START, Layout};

/// Superblock is the packed 116-byte header at the start of block 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u32,
    pub version: u32,
    pub block_size: u32,
    pub total_blocks: u64,
    pub inode_count: u64,
    pub inode_bitmap_start: u64,
    pub inode_bitmap_blocks: u64,
    pub data_bitmap_start: u64,
    pub data_bitmap_blocks: u64,
    pub inode_table_start: u64,
    pub inode_table_blocks: u64,
    pub data_region_start: u64,
    pub data_region_blocks: u64,
    pub root_inode: u64,
    pub mtime_epoch: u64,
    pub flags: u32,
    pub checksum: u32,
}

impl Superblock {
    /// `for_layout` builds an unsealed superblock describing `layout`.
    #[must_use]
    pub const fn for_layout(layout: &Layout, mtime_epoch: u64) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            block_size: BLOCK_SIZE as u32,
            total_blocks: layout.total_blocks,
            inode_count: layout.inode_count,
            inode_bitmap_start: layout.inode_bitmap_start,
            inode_bitmap_blocks: 1,
            data_bitmap_start: layout.data_bitmap_start,
            data_bitmap_blocks: 1,
            inode_table_start: layout.inode_table_start,
            inode_table_blocks: layout.inode_table_blocks,
            data_region_start: layout.data_region_start,
            data_region_blocks: layout.data_region_blocks,
            root_inode: ROOT_INO as u64,
            mtime_epoch,
            flags: 0,
            checksum: 0,
        }
    }

    /// `decode` parses the leading `SUPERBLOCK_SIZE` bytes of block 0.
    #[must_use]
    pub fn decode(buf: &[u8; SUPERBLOCK_SIZE]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            magic: r.u32(),
            version: r.u32(),
            block_size: r.u32(),
            total_blocks: r.u64(),
            inode_count: r.u64(),
            inode_bitmap_start: r.u64(),
            inode_bitmap_blocks: r.u64(),
            data_bitmap_start: r.u64(),
            data_bitmap_blocks: r.u64(),
            inode_table_start: r.u64(),
            inode_table_blocks: r.u64(),
            data_region_start: r.u64(),
            data_region_blocks: r.u64(),
            root_inode: r.u64(),
            mtime_epoch: r.u64(),
            flags: r.u32(),
            checksum: r.u32(),
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut buf = [0u8; SUPERBLOCK_SIZE];
        let mut w = Writer::new(&mut buf);
        w.u32(self.magic);
        w.u32(self.version);
        w.u32(self.block_size);
        w.u64(self.total_blocks);
        w.u64(self.inode_count);
        w.u64(self.inode_bitmap_start);
        w.u64(self.inode_bitmap_blocks);
        w.u64(self.data_bitmap_start);
        w.u64(self.data_bitmap_blocks);
        w.u64(self.inode_table_start);
        w.u64(self.inode_table_blocks);
        w.u64(self.data_region_start);
        w.u64(self.data_region_blocks);
        w.u64(self.root_inode);
        w.u64(self.mtime_epoch);
        w.u32(self.flags);
        w.u32(self.checksum);
        debug_assert_eq!(w.position(), SUPERBLOCK_SIZE);
        buf
    }

    /// `write_sealed` stores this superblock at the start of `block` and stamps the block CRC.
    ///
    /// # Arguments
    /// * `block` - Block 0 of the image, `BLOCK_SIZE` bytes.
    pub fn write_sealed(&mut self, block: &mut [u8]) {
        self.checksum = 0;
        block[..SUPERBLOCK_SIZE].copy_from_slice(&self.encode());
        self.checksum = block_checksum(block);
        block[SUPERBLOCK_CHECKSUM_OFFSET..SUPERBLOCK_SIZE]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// `check_identity` rejects images that are not MiniVSFS v1 with 4 KiB blocks.
    ///
    /// # Errors
    /// Returns `FsError::Format` on a magic, version or block size mismatch.
    pub fn check_identity(&self) -> FsResult<()> {
        if self.magic != MAGIC {
            return Err(FsError::Format(format!(
                "not a MiniVSFS image (magic {:#010x})",
                self.magic
            )));
        }
        if self.version != VERSION {
            return Err(FsError::Format(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.block_size as usize != BLOCK_SIZE {
            return Err(FsError::Format(format!(
                "unsupported block size {}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// `layout` converts the recorded regions into a `Layout`, checking that the regions
    /// sit back to back in on-disk order, end at the last block, and that both bitmaps
    /// fit in their single block.
    ///
    /// # Errors
    /// Returns `FsError::Corrupt` when the recorded geometry is inconsistent.
    pub fn layout(&self) -> FsResult<Layout> {
        let total = self.total_blocks;
        let corrupt = |what: &str| Err(FsError::Corrupt(format!("superblock {what}")));

        if self.root_inode != u64::from(ROOT_INO) {
            return corrupt("root inode is not 1");
        }
        if self.inode_count == 0 || self.inode_count > BITMAP_BITS {
            return corrupt("inode count out of range");
        }
        if self.data_region_blocks == 0 || self.data_region_blocks > BITMAP_BITS {
            return corrupt("data region size out of range");
        }
        if self.inode_bitmap_blocks != 1 || self.data_bitmap_blocks != 1 {
            return corrupt("bitmap regions must be one block");
        }
        let table_capacity = self.inode_table_blocks.saturating_mul(INODES_PER_BLOCK);
        if table_capacity < self.inode_count {
            return corrupt("inode table smaller than inode count");
        }
        if self.inode_bitmap_start != INODE_BITMAP_BLOCK
            || self.data_bitmap_start != DATA_BITMAP_BLOCK
            || self.inode_table_start != INODE_TABLE_START
        {
            return corrupt("metadata regions out of place");
        }
        if self.inode_table_start.checked_add(self.inode_table_blocks)
            != Some(self.data_region_start)
        {
            return corrupt("data region does not follow the inode table");
        }
        if self.data_region_start.checked_add(self.data_region_blocks) != Some(total) {
            return corrupt("data region does not end at the last block");
        }
        Ok(Layout {
            total_blocks: total,
            inode_count: self.inode_count,
            inode_bitmap_start: self.inode_bitmap_start,
            data_bitmap_start: self.data_bitmap_start,
            inode_table_start: self.inode_table_start,
            inode_table_blocks: self.inode_table_blocks,
            data_region_start: self.data_region_start,
            data_region_blocks: self.data_region_blocks,
        })
    }
}
