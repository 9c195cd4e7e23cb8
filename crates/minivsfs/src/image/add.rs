use tracing::debug;

use super::{Image, now_epoch};
use crate::constants::{BLOCK_SIZE, DIRECT_PTRS, DIRENTS_PER_BLOCK, NAME_LEN, ROOT_INO};
use crate::error::{FsError, FsResult};
use crate::ondisk::{DirEntry, Inode, NodeKind};

/// AddedFile reports where a newly inserted file landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedFile {
    pub inode: u32,
    /// Name as stored in the directory entry (truncated to the name field).
    pub name: Vec<u8>,
    pub size: u64,
    pub blocks: Vec<u32>,
}

impl AddedFile {
    #[must_use]
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// `blocks_needed` returns how many data blocks a payload of `len` bytes occupies.
/// Empty payloads still take one block.
#[must_use]
pub fn blocks_needed(len: u64) -> u64 {
    len.div_ceil(BLOCK_SIZE as u64).max(1)
}

/// `check_payload_len` rejects payloads that need more than `DIRECT_PTRS` blocks.
///
/// # Errors
/// Returns `FsError::FileTooLarge` when the payload cannot be addressed directly.
pub fn check_payload_len(len: u64) -> FsResult<u64> {
    let need_blocks = blocks_needed(len);
    if need_blocks > DIRECT_PTRS as u64 {
        return Err(FsError::FileTooLarge {
            need_blocks,
            max_blocks: DIRECT_PTRS as u64,
        });
    }
    Ok(need_blocks)
}

impl Image {
    /// `add_file` inserts `payload` into the root directory under `name`.
    ///
    /// The whole insertion is planned against the current buffer first (inode slot,
    /// data blocks, directory slot) and committed only once every step is known to
    /// succeed, so a failed call leaves the image untouched.
    ///
    /// # Arguments
    /// * `name` - Base name; truncated to `NAME_LEN` bytes. Duplicates are allowed.
    /// * `payload` - File contents.
    ///
    /// # Errors
    /// `InvalidName` for an empty name, `FileTooLarge` past `DIRECT_PTRS` blocks,
    /// `NoFreeInode` / `NoSpace` when the bitmaps are exhausted, `DirectoryFull` when
    /// the root block has no free slot, `Corrupt` when the root has no usable block.
    pub fn add_file(&mut self, name: &[u8], payload: &[u8]) -> FsResult<AddedFile> {
        self.add_file_at(name, payload, now_epoch())
    }

    pub(super) fn add_file_at(
        &mut self,
        name: &[u8],
        payload: &[u8],
        now: u64,
    ) -> FsResult<AddedFile> {
        if name.is_empty() {
            return Err(FsError::InvalidName);
        }
        let need_blocks = check_payload_len(payload.len() as u64)? as usize;

        let mut inode_map = self.inode_bitmap();
        let index = inode_map
            .first_clear(self.layout.inode_count as usize)
            .ok_or(FsError::NoFreeInode)?;
        let ino = (index + 1) as u32;

        let mut data_map = self.data_bitmap();
        let free: Vec<usize> = data_map
            .clear_bits(self.layout.data_region_blocks as usize)
            .take(need_blocks)
            .collect();
        if free.len() < need_blocks {
            return Err(FsError::NoSpace {
                need: need_blocks as u64,
                free: free.len() as u64,
            });
        }

        let (root, root_block) = self.root_block()?;
        let slot = (0..DIRENTS_PER_BLOCK)
            .find(|&slot| self.load_dirent(root_block, slot).is_free())
            .ok_or(FsError::DirectoryFull)?;

        inode_map.set(index, true);
        for &bit in &free {
            data_map.set(bit, true);
        }
        self.store_inode_bitmap(&inode_map);
        self.store_data_bitmap(&data_map);

        let blocks: Vec<u32> = free
            .iter()
            .map(|&bit| (self.layout.data_region_start + bit as u64) as u32)
            .collect();
        for (block, chunk) in blocks.iter().zip(payload_chunks(payload)) {
            let dst = self.block_mut(u64::from(*block));
            dst[..chunk.len()].copy_from_slice(chunk);
            dst[chunk.len()..].fill(0);
        }

        let inode = Inode::regular(payload.len() as u64, &blocks, now);
        self.store_inode(ino, &inode);

        let entry = DirEntry::new(ino, NodeKind::File, name);
        self.store_dirent(root_block, slot, &entry);

        let mut root = root;
        root.links = root.links.saturating_add(1);
        root.mtime = now;
        self.store_inode(ROOT_INO, &root.sealed());

        debug!(ino, slot, ?blocks, size = payload.len(), "added file");
        Ok(AddedFile {
            inode: ino,
            name: name[..name.len().min(NAME_LEN)].to_vec(),
            size: payload.len() as u64,
            blocks,
        })
    }
}

/// `payload_chunks` splits a payload into block-sized pieces, yielding one empty
/// piece for an empty payload so it still claims a block.
fn payload_chunks(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    let empty: &[u8] = &[];
    let first = payload.is_empty().then_some(empty);
    first.into_iter().chain(payload.chunks(BLOCK_SIZE))
}
