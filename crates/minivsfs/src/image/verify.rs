use std::fmt;

use super::Image;
use super::add::blocks_needed;
use crate::checksum::block_checksum;
use crate::constants::{BLOCK_SIZE, DIRENTS_PER_BLOCK};

/// Issue is one inconsistency found by [`Image::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    SuperblockChecksum,
    RootDirectory(String),
    InodeChecksum { ino: u32 },
    BlockOutOfRange { ino: u32, block: u32 },
    BlockNotAllocated { ino: u32, block: u32 },
    BlockCount { ino: u32, expected: u64, actual: u64 },
    DirentChecksum { slot: usize },
    DanglingEntry { slot: usize, ino: u32 },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperblockChecksum => write!(f, "superblock checksum mismatch"),
            Self::RootDirectory(msg) => write!(f, "root directory: {msg}"),
            Self::InodeChecksum { ino } => write!(f, "inode {ino}: checksum mismatch"),
            Self::BlockOutOfRange { ino, block } => {
                write!(f, "inode {ino}: block {block} outside data region")
            }
            Self::BlockNotAllocated { ino, block } => {
                write!(f, "inode {ino}: block {block} not marked in data bitmap")
            }
            Self::BlockCount {
                ino,
                expected,
                actual,
            } => write!(
                f,
                "inode {ino}: {actual} direct blocks, size implies {expected}"
            ),
            Self::DirentChecksum { slot } => write!(f, "dirent {slot}: checksum mismatch"),
            Self::DanglingEntry { slot, ino } => {
                write!(f, "dirent {slot}: references unallocated inode {ino}")
            }
        }
    }
}

impl Image {
    /// `verify` recomputes every checksum and cross-checks bitmaps against inodes and
    /// directory entries. An empty result means the image is consistent.
    #[must_use]
    pub fn verify(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if block_checksum(&self.bytes[..BLOCK_SIZE]) != self.superblock.checksum {
            issues.push(Issue::SuperblockChecksum);
        }

        let inode_map = self.inode_bitmap();
        let data_map = self.data_bitmap();
        let data_start = self.layout.data_region_start;

        for index in 0..self.layout.inode_count as usize {
            if !inode_map.get(index) {
                continue;
            }
            let ino = (index + 1) as u32;
            let Ok(inode) = self.load_inode(ino) else {
                continue;
            };
            if !inode.checksum_valid() {
                issues.push(Issue::InodeChecksum { ino });
            }
            for block in inode.blocks() {
                let abs = u64::from(block);
                if !self.layout.contains_data_block(abs) {
                    issues.push(Issue::BlockOutOfRange { ino, block });
                } else if !data_map.get((abs - data_start) as usize) {
                    issues.push(Issue::BlockNotAllocated { ino, block });
                }
            }
            let expected = blocks_needed(inode.size_bytes);
            let actual = inode.block_count() as u64;
            if expected != actual {
                issues.push(Issue::BlockCount {
                    ino,
                    expected,
                    actual,
                });
            }
        }

        match self.root_block() {
            Ok((_, block)) => {
                for slot in 0..DIRENTS_PER_BLOCK {
                    let entry = self.load_dirent(block, slot);
                    if entry.is_free() {
                        break;
                    }
                    if !entry.checksum_valid() {
                        issues.push(Issue::DirentChecksum { slot });
                    }
                    let allocated = u64::from(entry.inode) <= self.layout.inode_count
                        && inode_map.get((entry.inode - 1) as usize);
                    if !allocated {
                        issues.push(Issue::DanglingEntry {
                            slot,
                            ino: entry.inode,
                        });
                    }
                }
            }
            Err(err) => issues.push(Issue::RootDirectory(err.to_string())),
        }

        issues
    }
}
