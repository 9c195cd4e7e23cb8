//! On-disk format constants for MiniVSFS images.

/// MAGIC identifies a MiniVSFS superblock ("MVSF" when read as a little-endian u32).
pub const MAGIC: u32 = 0x4D56_5346;
/// VERSION is the only on-disk format version understood by this crate.
pub const VERSION: u32 = 1;
/// BLOCK_SIZE is the fixed block size in bytes.
pub const BLOCK_SIZE: usize = 4096;
/// BLOCK_SIZE_KIB is the block size expressed in KiB, used to turn image sizes into block counts.
pub const BLOCK_SIZE_KIB: u64 = (BLOCK_SIZE / 1024) as u64;

/// SUPERBLOCK_SIZE is the packed size of the superblock record at the start of block 0.
pub const SUPERBLOCK_SIZE: usize = 116;
/// SUPERBLOCK_CHECKSUM_OFFSET is where the superblock CRC32 lives inside block 0.
pub const SUPERBLOCK_CHECKSUM_OFFSET: usize = SUPERBLOCK_SIZE - 4;

/// INODE_SIZE is the packed size of one inode record.
pub const INODE_SIZE: usize = 128;
/// INODE_CHECKSUM_OFFSET is where the 8-byte inode CRC field starts.
pub const INODE_CHECKSUM_OFFSET: usize = INODE_SIZE - 8;
/// INODES_PER_BLOCK is the number of inode records in one inode table block.
pub const INODES_PER_BLOCK: u64 = (BLOCK_SIZE / INODE_SIZE) as u64;
/// DIRECT_PTRS is the number of direct block pointers per inode.
pub const DIRECT_PTRS: usize = 12;
/// MAX_FILE_SIZE is the largest payload a single inode can address.
pub const MAX_FILE_SIZE: u64 = (DIRECT_PTRS * BLOCK_SIZE) as u64;

/// DIRENT_SIZE is the packed size of one directory entry.
pub const DIRENT_SIZE: usize = 64;
/// NAME_LEN is the width of the directory entry name field.
pub const NAME_LEN: usize = 58;
/// DIRENTS_PER_BLOCK is how many entries fit in the root directory's only block.
pub const DIRENTS_PER_BLOCK: usize = BLOCK_SIZE / DIRENT_SIZE;

/// BITMAP_BITS is the number of resources a single bitmap block can track.
pub const BITMAP_BITS: u64 = (BLOCK_SIZE * 8) as u64;

/// ROOT_INO is the inode number of the root directory.
pub const ROOT_INO: u32 = 1;
/// MODE_DIR marks a directory inode.
pub const MODE_DIR: u16 = 0o040_000;
/// MODE_FILE marks a regular file inode.
pub const MODE_FILE: u16 = 0o100_000;
/// MODE_TYPE_MASK selects the file type bits of a mode.
pub const MODE_TYPE_MASK: u16 = 0o170_000;
/// PROJECT_ID is the fixed tag stamped into every inode this crate writes.
pub const PROJECT_ID: u32 = 6;

/// DIRENT_TYPE_FILE is the directory entry type byte for regular files.
pub const DIRENT_TYPE_FILE: u8 = 1;
/// DIRENT_TYPE_DIR is the directory entry type byte for directories.
pub const DIRENT_TYPE_DIR: u8 = 2;

/// MIN_SIZE_KIB and MAX_SIZE_KIB bound the accepted image size.
pub const MIN_SIZE_KIB: u64 = 180;
pub const MAX_SIZE_KIB: u64 = 4096;
/// MIN_INODES and MAX_INODES bound the accepted inode capacity.
pub const MIN_INODES: u64 = 128;
pub const MAX_INODES: u64 = 512;
