//! CRC32 and XOR checksums used by MiniVSFS records.

#[cfg(test)]
mod checksum_tests;

use crate::constants::{
    BLOCK_SIZE, DIRENT_SIZE, INODE_CHECKSUM_OFFSET, INODE_SIZE, SUPERBLOCK_CHECKSUM_OFFSET,
};

const POLY: u32 = 0xEDB8_8320;

/// Crc32 owns the lookup table for the reflected CRC-32 polynomial.
pub struct Crc32 {
    table: [u32; 256],
}

/// CRC32 is the shared, compile-time built table.
pub static CRC32: Crc32 = Crc32::new();

impl Crc32 {
    #[must_use]
    pub const fn new() -> Self {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut c = i as u32;
            let mut j = 0;
            while j < 8 {
                c = if c & 1 == 1 { POLY ^ (c >> 1) } else { c >> 1 };
                j += 1;
            }
            table[i] = c;
            i += 1;
        }
        Self { table }
    }

    /// `update` feeds `bytes` into a running (pre-inverted) CRC state.
    #[must_use]
    pub fn update(&self, crc: u32, bytes: &[u8]) -> u32 {
        bytes.iter().fold(crc, |c, &b| {
            self.table[((c ^ u32::from(b)) & 0xFF) as usize] ^ (c >> 8)
        })
    }

    #[must_use]
    pub fn checksum(&self, bytes: &[u8]) -> u32 {
        self.update(u32::MAX, bytes) ^ u32::MAX
    }

    #[must_use]
    pub const fn table(&self) -> &[u32; 256] {
        &self.table
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// `block_checksum` computes the superblock CRC over the first `BLOCK_SIZE - 4` bytes of
/// block 0, treating the stored checksum field as zero.
///
/// # Arguments
/// * `block` - Block 0 of an image; must hold at least `BLOCK_SIZE - 4` bytes.
#[must_use]
pub fn block_checksum(block: &[u8]) -> u32 {
    let body = &block[..BLOCK_SIZE - 4];
    let mut crc = CRC32.update(u32::MAX, &body[..SUPERBLOCK_CHECKSUM_OFFSET]);
    crc = CRC32.update(crc, &[0u8; 4]);
    crc = CRC32.update(crc, &body[SUPERBLOCK_CHECKSUM_OFFSET + 4..]);
    crc ^ u32::MAX
}

/// `inode_checksum` returns the CRC of the first 120 bytes of an inode record, widened
/// into the 64-bit trailer format (upper half zero).
#[must_use]
pub fn inode_checksum(record: &[u8; INODE_SIZE]) -> u64 {
    u64::from(crc32(&record[..INODE_CHECKSUM_OFFSET]))
}

/// `dirent_checksum` XORs every byte that precedes the trailing checksum byte.
#[must_use]
pub fn dirent_checksum(entry: &[u8; DIRENT_SIZE]) -> u8 {
    entry[..DIRENT_SIZE - 1].iter().fold(0u8, |x, b| x ^ b)
}
