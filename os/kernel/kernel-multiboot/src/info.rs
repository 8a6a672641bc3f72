use crate::framebuffer::FramebufferTag;
use crate::memory_map::{MemoryMapError, MemoryMapTag};
use crate::read_u32;
use crate::tag::{Tag, TagType, Tags};
use kernel_info::boot::BOOT_INFO_HEADER_SIZE;

/// Problems with the boot information block itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootInfoError {
    #[error("boot information pointer is null")]
    NullPointer,
    #[error("boot information block of {0} bytes is shorter than its 8-byte header")]
    TooShort(usize),
    #[error("declared total size {declared} is invalid for a block of {available} bytes")]
    InvalidTotalSize { declared: u32, available: usize },
}

/// A validated view over a Multiboot2 boot information block.
///
/// The view is cut to the block's declared `total_size`, so every scan over
/// it is bounded even if the END tag is missing.
#[derive(Copy, Clone)]
pub struct BootInformation<'a> {
    bytes: &'a [u8],
}

impl<'a> BootInformation<'a> {
    /// Validate the header of `bytes` and wrap it.
    ///
    /// `bytes` may be longer than the block; anything past `total_size` is
    /// ignored.
    ///
    /// # Errors
    /// Fails if `bytes` cannot hold the 8-byte header, or if the declared
    /// total size is smaller than the header or larger than `bytes`.
    pub fn new(bytes: &'a [u8]) -> Result<Self, BootInfoError> {
        let Some(declared) = read_u32(bytes, 0) else {
            return Err(BootInfoError::TooShort(bytes.len()));
        };

        let total = declared as usize;
        if total < BOOT_INFO_HEADER_SIZE || total > bytes.len() {
            return Err(BootInfoError::InvalidTotalSize {
                declared,
                available: bytes.len(),
            });
        }

        Ok(Self {
            bytes: &bytes[..total],
        })
    }

    /// Wrap the block the bootloader left at `ptr`.
    ///
    /// # Errors
    /// Fails on a null pointer or a declared total size below the header size.
    ///
    /// # Safety
    /// `ptr` must point to a Multiboot2 boot information block that stays
    /// readable and unmodified for `'a`, and whose first four bytes hold its
    /// true total size.
    pub unsafe fn from_ptr(ptr: *const u8) -> Result<Self, BootInfoError> {
        if ptr.is_null() {
            return Err(BootInfoError::NullPointer);
        }

        let declared = unsafe { ptr.cast::<u32>().read_unaligned() };
        let total = declared as usize;
        if total < BOOT_INFO_HEADER_SIZE {
            return Err(BootInfoError::InvalidTotalSize {
                declared,
                available: BOOT_INFO_HEADER_SIZE,
            });
        }

        let bytes = unsafe { core::slice::from_raw_parts(ptr, total) };
        Self::new(bytes)
    }

    /// Declared size of the block in bytes, header included.
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// All tags up to (not including) the END tag.
    #[must_use]
    pub const fn tags(&self) -> Tags<'a> {
        Tags::new(self.bytes, BOOT_INFO_HEADER_SIZE)
    }

    /// The first tag of type `wanted`.
    ///
    /// Returns `None` if the scan reaches the END tag or the end of the
    /// block first. Asking for [`TagType::END`] always yields `None`.
    #[must_use]
    pub fn find_tag(&self, wanted: TagType) -> Option<Tag<'a>> {
        self.tags().find(|tag| tag.ty() == wanted)
    }

    /// The memory map tag, if present, parsed.
    #[must_use]
    pub fn memory_map_tag(&self) -> Option<Result<MemoryMapTag<'a>, MemoryMapError>> {
        self.find_tag(TagType::MEMORY_MAP).map(MemoryMapTag::parse)
    }

    /// The framebuffer tag, if present and well-formed.
    #[must_use]
    pub fn framebuffer_tag(&self) -> Option<FramebufferTag> {
        self.find_tag(TagType::FRAMEBUFFER)
            .and_then(FramebufferTag::parse)
    }
}

impl core::fmt::Debug for BootInformation<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootInformation")
            .field("total_size", &self.total_size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BootInfoBuilder;

    #[test]
    fn rejects_short_buffers() {
        assert_eq!(
            BootInformation::new(&[8, 0, 0]).unwrap_err(),
            BootInfoError::TooShort(3)
        );
    }

    #[test]
    fn rejects_inconsistent_total_size() {
        let mut block = BootInfoBuilder::new().build();
        let len = block.len();

        block[0..4].copy_from_slice(&4u32.to_le_bytes());
        assert_eq!(
            BootInformation::new(&block).unwrap_err(),
            BootInfoError::InvalidTotalSize {
                declared: 4,
                available: len
            }
        );

        block[0..4].copy_from_slice(&(u32::try_from(len).unwrap() + 8).to_le_bytes());
        assert!(matches!(
            BootInformation::new(&block),
            Err(BootInfoError::InvalidTotalSize { .. })
        ));
    }

    #[test]
    fn ignores_bytes_past_total_size() {
        let mut block = BootInfoBuilder::new().tag(1, b"root=/dev/sda\0").build();
        let total = block.len();
        block.extend_from_slice(&[0xFF; 64]);
        let info = BootInformation::new(&block).unwrap();
        assert_eq!(info.total_size(), total);
    }

    #[test]
    fn from_ptr_reads_declared_size() {
        let block = BootInfoBuilder::new()
            .memory_map(&[(0x10_0000, 0x40_0000, 1)])
            .build();
        let info = unsafe { BootInformation::from_ptr(block.as_ptr()) }.unwrap();
        assert_eq!(info.total_size(), block.len());
        assert!(info.memory_map_tag().is_some());
    }

    #[test]
    fn from_ptr_rejects_null() {
        let err = unsafe { BootInformation::from_ptr(core::ptr::null()) }.unwrap_err();
        assert_eq!(err, BootInfoError::NullPointer);
    }

    #[test]
    fn finds_requested_tag() {
        let block = BootInfoBuilder::new()
            .tag(1, b"quiet\0")
            .tag(2, b"GRUB 2.12\0")
            .memory_map(&[(0, 0x9_FC00, 1), (0x10_0000, 0x7EE_0000, 1)])
            .build();
        let info = BootInformation::new(&block).unwrap();

        let tag = info.find_tag(TagType::BOOT_LOADER_NAME).unwrap();
        assert_eq!(tag.payload(), b"GRUB 2.12\0");

        let mmap = info.find_tag(TagType::MEMORY_MAP).unwrap();
        assert_eq!(mmap.size(), 16 + 2 * 24);
    }

    #[test]
    fn missing_tag_is_none() {
        let block = BootInfoBuilder::new().tag(1, b"quiet\0").build();
        let info = BootInformation::new(&block).unwrap();
        assert!(info.find_tag(TagType::MEMORY_MAP).is_none());
        assert!(info.memory_map_tag().is_none());
        assert!(info.framebuffer_tag().is_none());
    }

    #[test]
    fn end_is_never_found() {
        let block = BootInfoBuilder::new().tag(1, b"quiet\0").build();
        let info = BootInformation::new(&block).unwrap();
        assert!(info.find_tag(TagType::END).is_none());
    }

    #[test]
    fn tags_after_end_are_invisible() {
        let block = BootInfoBuilder::new()
            .tag(1, b"quiet\0")
            .tag(0, &[])
            .memory_map(&[(0x10_0000, 0x10_0000, 1)])
            .build();
        let info = BootInformation::new(&block).unwrap();
        assert!(info.find_tag(TagType::MEMORY_MAP).is_none());
        assert_eq!(info.tags().count(), 1);
    }

    #[test]
    fn scan_is_bounded_without_end_tag() {
        let block = BootInfoBuilder::new()
            .tag(1, b"quiet\0")
            .build_without_end();
        let info = BootInformation::new(&block).unwrap();
        assert!(info.find_tag(TagType::MEMORY_MAP).is_none());
    }

    #[test]
    fn repeated_lookups_agree() {
        let block = BootInfoBuilder::new()
            .memory_map(&[(0x10_0000, 0x40_0000, 1)])
            .build();
        let info = BootInformation::new(&block).unwrap();
        let a = info.find_tag(TagType::MEMORY_MAP).unwrap();
        let b = info.find_tag(TagType::MEMORY_MAP).unwrap();
        assert_eq!(a.as_bytes().as_ptr(), b.as_bytes().as_ptr());
    }
}
