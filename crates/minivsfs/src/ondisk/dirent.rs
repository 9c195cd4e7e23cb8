use super::{NodeKind, Reader, Writer};
use crate::checksum::dirent_checksum;
use crate::constants::{DIRENT_SIZE, NAME_LEN};

/// DirEntry is one packed 64-byte directory slot. An inode number of 0 marks a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u32,
    pub kind: u8,
    pub name: [u8; NAME_LEN],
    pub checksum: u8,
}

impl DirEntry {
    /// `new` builds a sealed entry, truncating `name` to `NAME_LEN` bytes.
    #[must_use]
    pub fn new(inode: u32, kind: NodeKind, name: &[u8]) -> Self {
        let mut field = [0u8; NAME_LEN];
        let len = name.len().min(NAME_LEN);
        field[..len].copy_from_slice(&name[..len]);
        let mut entry = Self {
            inode,
            kind: kind.dirent_type(),
            name: field,
            checksum: 0,
        };
        entry.checksum = dirent_checksum(&entry.encode());
        entry
    }

    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.inode == 0
    }

    #[must_use]
    pub const fn node_kind(&self) -> Option<NodeKind> {
        NodeKind::from_dirent_type(self.kind)
    }

    /// `name_bytes` returns the name up to its first NUL, or the whole field.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
        &self.name[..end]
    }

    #[must_use]
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(self.name_bytes()).into_owned()
    }

    #[must_use]
    pub fn checksum_valid(&self) -> bool {
        dirent_checksum(&self.encode()) == self.checksum
    }

    #[must_use]
    pub fn decode(buf: &[u8; DIRENT_SIZE]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            inode: r.u32(),
            kind: r.u8(),
            name: r.array(),
            checksum: r.u8(),
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; DIRENT_SIZE] {
        let mut buf = [0u8; DIRENT_SIZE];
        let mut w = Writer::new(&mut buf);
        w.u32(self.inode);
        w.u8(self.kind);
        w.put(&self.name);
        w.u8(self.checksum);
        debug_assert_eq!(w.position(), DIRENT_SIZE);
        buf
    }
}
