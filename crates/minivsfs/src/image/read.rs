use sha2::{Digest, Sha256};

use super::Image;
use crate::constants::{BLOCK_SIZE, DIRENTS_PER_BLOCK};
use crate::error::{FsError, FsResult};
use crate::ondisk::{DirEntry, Inode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub checksum: [u8; 32],
}

impl FileMetadata {
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        self.checksum.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Image {
    /// `list_root` returns the used prefix of the root directory block, in insertion order.
    ///
    /// # Errors
    /// Returns `FsError::Corrupt` when the root inode has no usable block.
    pub fn list_root(&self) -> FsResult<Vec<DirEntry>> {
        let (_, block) = self.root_block()?;
        Ok((0..DIRENTS_PER_BLOCK)
            .map(|slot| self.load_dirent(block, slot))
            .take_while(|entry| !entry.is_free())
            .collect())
    }

    /// `lookup` finds the first root entry whose stored name equals `name`.
    ///
    /// # Errors
    /// Returns `FsError::NotFound` when no entry matches.
    pub fn lookup(&self, name: &[u8]) -> FsResult<u32> {
        self.list_root()?
            .into_iter()
            .find(|entry| entry.name_bytes() == name)
            .map(|entry| entry.inode)
            .ok_or(FsError::NotFound)
    }

    /// `inode` decodes an allocated inode.
    ///
    /// # Errors
    /// Returns `FsError::NotFound` when `ino` is out of range or not marked in the bitmap.
    pub fn inode(&self, ino: u32) -> FsResult<Inode> {
        let inode = self.load_inode(ino)?;
        if !self.inode_bitmap().get((ino - 1) as usize) {
            return Err(FsError::NotFound);
        }
        Ok(inode)
    }

    /// `read_file` concatenates the inode's direct blocks and trims to its recorded size.
    ///
    /// # Errors
    /// Returns `FsError::NotFound` for unallocated inodes and `FsError::Corrupt` when a
    /// pointer leaves the data region or the size exceeds the addressed blocks.
    pub fn read_file(&self, ino: u32) -> FsResult<Vec<u8>> {
        let inode = self.inode(ino)?;
        let mut out = Vec::with_capacity(inode.block_count() * BLOCK_SIZE);
        for block in inode.blocks() {
            if !self.layout.contains_data_block(u64::from(block)) {
                return Err(FsError::Corrupt(format!(
                    "inode {ino} points at block {block} outside data region"
                )));
            }
            out.extend_from_slice(self.block(u64::from(block)));
        }
        let size = usize::try_from(inode.size_bytes).unwrap_or(usize::MAX);
        if size > out.len() {
            return Err(FsError::Corrupt(format!(
                "inode {ino} size {} exceeds its {} blocks",
                inode.size_bytes,
                inode.block_count()
            )));
        }
        out.truncate(size);
        Ok(out)
    }

    /// `file_metadata` reports the size and SHA-256 digest of a file's contents.
    ///
    /// # Errors
    /// Propagates errors from [`Image::read_file`].
    pub fn file_metadata(&self, ino: u32) -> FsResult<FileMetadata> {
        let data = self.read_file(ino)?;
        let mut hasher = Sha256::new();
        hasher.update(&data);
        Ok(FileMetadata {
            size: data.len() as u64,
            checksum: hasher.finalize().into(),
        })
    }
}
