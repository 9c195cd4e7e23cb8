use super::{NodeKind, Reader, Writer};
use crate::checksum::inode_checksum;
use crate::constants::{BLOCK_SIZE, DIRECT_PTRS, INODE_SIZE, PROJECT_ID};

/// Inode is the packed 128-byte metadata record for one file or directory.
///
/// A direct pointer of 0 marks an unused slot. `crc` carries a CRC32 in its low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub mode: u16,
    pub links: u16,
    pub uid: u32,
    pub gid: u32,
    pub size_bytes: u64,
    pub atime: u64,
    pub mtime: u64,
    pub ctime: u64,
    pub direct: [u32; DIRECT_PTRS],
    pub reserved: [u32; 3],
    pub proj_id: u32,
    pub uid16_gid16: u32,
    pub xattr_ptr: u64,
    pub crc: u64,
}

impl Inode {
    /// `directory` builds the root directory inode owning a single data block.
    #[must_use]
    pub fn directory(block: u32, now: u64) -> Self {
        let mut direct = [0u32; DIRECT_PTRS];
        direct[0] = block;
        Self::new(NodeKind::Dir, 2, BLOCK_SIZE as u64, direct, now).sealed()
    }

    /// `regular` builds a file inode whose payload lives in `blocks`, in order.
    ///
    /// # Arguments
    /// * `size_bytes` - Exact payload length.
    /// * `blocks` - Absolute block numbers; at most `DIRECT_PTRS` are kept.
    /// * `now` - Timestamp for atime, mtime and ctime.
    #[must_use]
    pub fn regular(size_bytes: u64, blocks: &[u32], now: u64) -> Self {
        let mut direct = [0u32; DIRECT_PTRS];
        for (slot, block) in direct.iter_mut().zip(blocks) {
            *slot = *block;
        }
        Self::new(NodeKind::File, 1, size_bytes, direct, now).sealed()
    }

    const fn new(
        kind: NodeKind,
        links: u16,
        size_bytes: u64,
        direct: [u32; DIRECT_PTRS],
        now: u64,
    ) -> Self {
        Self {
            mode: kind.mode(),
            links,
            uid: 0,
            gid: 0,
            size_bytes,
            atime: now,
            mtime: now,
            ctime: now,
            direct,
            reserved: [0; 3],
            proj_id: PROJECT_ID,
            uid16_gid16: 0,
            xattr_ptr: 0,
            crc: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_mode(self.mode)
    }

    /// `blocks` yields the non-zero direct pointers in order.
    pub fn blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.direct.iter().copied().filter(|&b| b != 0)
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// `sealed` returns a copy with `crc` recomputed over the other fields.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.crc = 0;
        self.crc = inode_checksum(&self.encode());
        self
    }

    #[must_use]
    pub fn checksum_valid(&self) -> bool {
        inode_checksum(&self.encode()) == self.crc
    }

    #[must_use]
    pub fn decode(buf: &[u8; INODE_SIZE]) -> Self {
        let mut r = Reader::new(buf);
        let mode = r.u16();
        let links = r.u16();
        let uid = r.u32();
        let gid = r.u32();
        let size_bytes = r.u64();
        let atime = r.u64();
        let mtime = r.u64();
        let ctime = r.u64();
        let mut direct = [0u32; DIRECT_PTRS];
        for slot in &mut direct {
            *slot = r.u32();
        }
        let reserved = [r.u32(), r.u32(), r.u32()];
        Self {
            mode,
            links,
            uid,
            gid,
            size_bytes,
            atime,
            mtime,
            ctime,
            direct,
            reserved,
            proj_id: r.u32(),
            uid16_gid16: r.u32(),
            xattr_ptr: r.u64(),
            crc: r.u64(),
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; INODE_SIZE] {
        let mut buf = [0u8; INODE_SIZE];
        let mut w = Writer::new(&mut buf);
        w.u16(self.mode);
        w.u16(self.links);
        w.u32(self.uid);
        w.u32(self.gid);
        w.u64(self.size_bytes);
        w.u64(self.atime);
        w.u64(self.mtime);
        w.u64(self.ctime);
        for slot in self.direct {
            w.u32(slot);
        }
        for word in self.reserved {
            w.u32(word);
        }
        w.u32(self.proj_id);
        w.u32(self.uid16_gid16);
        w.u64(self.xattr_ptr);
        w.u64(self.crc);
        debug_assert_eq!(w.position(), INODE_SIZE);
        buf
    }
}
