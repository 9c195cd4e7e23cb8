//! Fixed-width byte buffers with bit-level helpers for allocation bitmaps.


use crate::constants::BLOCK_SIZE;

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
/// Bits stores a fixed-size array of bytes with LSB-first bit addressing.
pub struct Bits<const N: usize>(pub [u8; N]);

/// BitmapBlock is one on-disk bitmap block.
pub type BitmapBlock = Bits<BLOCK_SIZE>;

impl<const N: usize> Bits<N> {
    /// CAPACITY is the number of addressable bits.
    pub const CAPACITY: usize = N * 8;

    #[inline]
    #[must_use]
    /// `zero` returns a zero-initialized bit buffer.
    pub const fn zero() -> Self {
        Self([0u8; N])
    }

    #[must_use]
    /// `from_slice` copies the first `N` bytes of `bytes` into a new buffer.
    ///
    /// # Arguments
    /// * `bytes` - Source bytes; must be at least `N` long.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut out = Self::zero();
        out.0.copy_from_slice(&bytes[..N]);
        out
    }

    #[inline]
    #[must_use]
    /// `as_bytes` returns a shared reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline]
    #[must_use]
    /// `get` returns the bit value at the provided index.
    ///
    /// # Arguments
    /// * `i` - The bit index within the buffer.
    pub const fn get(&self, i: usize) -> bool {
        let (byte, bit) = (i >> 3, i & 7);
        (self.0[byte] >> bit) & 1 == 1
    }

    #[inline]
    /// `set` updates the bit at the provided index.
    ///
    /// # Arguments
    /// * `i` - The bit index within the buffer.
    /// * `val` - Whether the bit should be set.
    pub const fn set(&mut self, i: usize, val: bool) {
        let (byte, bit) = (i >> 3, i & 7);
        let m = 1u8 << bit;
        if val {
            self.0[byte] |= m;
        } else {
            self.0[byte] &= !m;
        }
    }

    /// `clear_bits` yields the indices of clear bits below `limit`, lowest first.
    ///
    /// Bits at or past `limit` are never inspected.
    pub fn clear_bits(&self, limit: usize) -> impl Iterator<Item = usize> + '_ {
        (0..limit.min(Self::CAPACITY)).filter(move |&i| !self.get(i))
    }

    #[must_use]
    pub fn first_clear(&self, limit: usize) -> Option<usize> {
        self.clear_bits(limit).next()
    }

    #[must_use]
    pub fn count_set(&self, limit: usize) -> usize {
        (0..limit.min(Self::CAPACITY)).filter(|&i| self.get(i)).count()
    }
}
