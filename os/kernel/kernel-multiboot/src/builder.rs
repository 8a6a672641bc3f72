//! Assembles synthetic boot information blocks for tests.

use alloc::vec::Vec;
use kernel_info::boot::{TAG_ALIGN, TAG_TYPE_END, TAG_TYPE_FRAMEBUFFER, TAG_TYPE_MEMORY_MAP};

/// Builds a Multiboot2 boot information block tag by tag.
///
/// ```rust
/// # use kernel_multiboot::{builder::BootInfoBuilder, BootInformation};
/// let block = BootInfoBuilder::new()
///     .memory_map(&[(0x10_0000, 0x40_0000, 1)])
///     .build();
/// let info = BootInformation::new(&block).unwrap();
/// assert_eq!(info.memory_map_tag().unwrap().unwrap().entries().count(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BootInfoBuilder {
    tags: Vec<u8>,
}

impl BootInfoBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Append a tag of type `ty` with the given payload, padded to 8 bytes.
    ///
    /// # Panics
    /// If the tag size does not fit in a `u32`.
    #[must_use]
    pub fn tag(mut self, ty: u32, payload: &[u8]) -> Self {
        let size = u32::try_from(8 + payload.len()).expect("tag too large");
        self.tags.extend_from_slice(&ty.to_le_bytes());
        self.tags.extend_from_slice(&size.to_le_bytes());
        self.tags.extend_from_slice(payload);
        self.tags
            .resize(self.tags.len().next_multiple_of(TAG_ALIGN), 0);
        self
    }

    /// Append a memory map with 24-byte entries of `(base, length, type)`.
    #[must_use]
    pub fn memory_map(self, entries: &[(u64, u64, u32)]) -> Self {
        self.memory_map_with_entry_size(24, entries)
    }

    /// Append a memory map with an arbitrary declared entry stride.
    ///
    /// Each entry is zero-padded (or cut) to `entry_size` bytes.
    #[must_use]
    pub fn memory_map_with_entry_size(self, entry_size: u32, entries: &[(u64, u64, u32)]) -> Self {
        let mut payload = Vec::new();
        payload.extend_from_slice(&entry_size.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        for &(base, len, ty) in entries {
            let mut entry = Vec::with_capacity(24);
            entry.extend_from_slice(&base.to_le_bytes());
            entry.extend_from_slice(&len.to_le_bytes());
            entry.extend_from_slice(&ty.to_le_bytes());
            entry.extend_from_slice(&0u32.to_le_bytes());
            entry.resize(entry_size as usize, 0);
            payload.extend_from_slice(&entry);
        }
        self.tag(TAG_TYPE_MEMORY_MAP, &payload)
    }

    /// Append a framebuffer tag without color information.
    #[must_use]
    pub fn framebuffer(
        self,
        address: u64,
        pitch: u32,
        width: u32,
        height: u32,
        bpp: u8,
        kind: u8,
    ) -> Self {
        let mut payload = Vec::new();
        payload.extend_from_slice(&address.to_le_bytes());
        payload.extend_from_slice(&pitch.to_le_bytes());
        payload.extend_from_slice(&width.to_le_bytes());
        payload.extend_from_slice(&height.to_le_bytes());
        payload.push(bpp);
        payload.push(kind);
        payload.extend_from_slice(&0u16.to_le_bytes());
        self.tag(TAG_TYPE_FRAMEBUFFER, &payload)
    }

    /// Finish the block with an END tag.
    ///
    /// # Panics
    /// If the block size does not fit in a `u32`.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.tag(TAG_TYPE_END, &[]).build_without_end()
    }

    /// Finish the block as is, without appending an END tag.
    ///
    /// # Panics
    /// If the block size does not fit in a `u32`.
    #[must_use]
    pub fn build_without_end(self) -> Vec<u8> {
        let total = u32::try_from(8 + self.tags.len()).expect("block too large");
        let mut block = Vec::with_capacity(total as usize);
        block.extend_from_slice(&total.to_le_bytes());
        block.extend_from_slice(&0u32.to_le_bytes());
        block.extend_from_slice(&self.tags);
        block
    }
}
