//! # Frame Bitmap
//!
//! One bit per page frame: `1` = allocated or unavailable, `0` = free.
//!
//! The store is a fixed array so it can live in `.bss` before any heap
//! exists. A zeroed bitmap would read as "everything free", so the allocator
//! fills it with ones before clearing the frames it knows to be usable.

const BITS: usize = u64::BITS as usize;

/// Fixed-capacity bitmap of `WORDS * 64` frames.
#[derive(Clone)]
pub struct FrameBitmap<const WORDS: usize> {
    words: [u64; WORDS],
}

impl<const WORDS: usize> FrameBitmap<WORDS> {
    /// Number of frames the bitmap can describe.
    pub const CAPACITY: usize = WORDS * BITS;

    /// A zeroed bitmap. Call [`fill_used`](Self::fill_used) before use.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Mark every frame as allocated.
    pub fn fill_used(&mut self) {
        self.words.fill(u64::MAX);
    }

    #[inline]
    const fn locate(index: usize) -> (usize, u64) {
        (index / BITS, 1 << (index % BITS))
    }

    /// Mark `index` allocated. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize) {
        let (word, mask) = Self::locate(index);
        if let Some(w) = self.words.get_mut(word) {
            *w |= mask;
        }
    }

    /// Mark `index` free. Out-of-range indices are ignored.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        let (word, mask) = Self::locate(index);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !mask;
        }
    }

    /// Whether `index` is allocated. Indices past the capacity read as allocated.
    #[inline]
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        self.words.get(word).is_none_or(|w| w & mask != 0)
    }

    /// Lowest free index below `limit`.
    ///
    /// Walks the bitmap in ascending order, one word at a time.
    #[must_use]
    pub fn first_clear(&self, limit: usize) -> Option<usize> {
        let limit = limit.min(Self::CAPACITY);
        for (i, &w) in self.words.iter().enumerate() {
            let base = i * BITS;
            if base >= limit {
                break;
            }
            if w != u64::MAX {
                let index = base + (!w).trailing_zeros() as usize;
                return (index < limit).then_some(index);
            }
        }
        None
    }

    /// Number of free indices below `limit`.
    #[must_use]
    pub fn count_clear(&self, limit: usize) -> usize {
        let limit = limit.min(Self::CAPACITY);
        let full = limit / BITS;
        let mut count: usize = self.words[..full]
            .iter()
            .map(|w| w.count_zeros() as usize)
            .sum();

        let rest = limit % BITS;
        if rest != 0 {
            let mask = (1u64 << rest) - 1;
            count += (!self.words[full] & mask).count_ones() as usize;
        }
        count
    }
}

impl<const WORDS: usize> Default for FrameBitmap<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}
