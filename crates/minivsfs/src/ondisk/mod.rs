//! Byte-exact codecs for the packed on-disk records.
//!
//! All integers are little-endian and records carry no implicit padding.

mod dirent;
mod inode;
mod superblock;

pub use dirent::DirEntry;
pub use inode::Inode;
pub use superblock::Superblock;

use crate::constants::{DIRENT_TYPE_DIR, DIRENT_TYPE_FILE, MODE_DIR, MODE_FILE, MODE_TYPE_MASK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

impl NodeKind {
    #[must_use]
    pub const fn from_mode(mode: u16) -> Option<Self> {
        match mode & MODE_TYPE_MASK {
            MODE_FILE => Some(Self::File),
            MODE_DIR => Some(Self::Dir),
            _ => None,
        }
    }

    #[must_use]
    pub const fn from_dirent_type(byte: u8) -> Option<Self> {
        match byte {
            DIRENT_TYPE_FILE => Some(Self::File),
            DIRENT_TYPE_DIR => Some(Self::Dir),
            _ => None,
        }
    }

    #[must_use]
    pub const fn mode(self) -> u16 {
        match self {
            Self::File => MODE_FILE,
            Self::Dir => MODE_DIR,
        }
    }

    #[must_use]
    pub const fn dirent_type(self) -> u8 {
        match self {
            Self::File => DIRENT_TYPE_FILE,
            Self::Dir => DIRENT_TYPE_DIR,
        }
    }
}

/// Sequential little-endian reader over a fixed record.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.array::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.array())
    }
}

/// Sequential little-endian writer into a fixed record.
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.put(&v.to_le_bytes());
    }

    const fn position(&self) -> usize {
        self.pos
    }
}
