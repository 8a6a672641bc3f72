use crate::header::TagHeader;
use core::fmt;
use kernel_info::boot::{
    TAG_ALIGN, TAG_HEADER_SIZE, TAG_TYPE_BASIC_MEMINFO, TAG_TYPE_BOOT_LOADER_NAME,
    TAG_TYPE_CMDLINE, TAG_TYPE_END, TAG_TYPE_FRAMEBUFFER, TAG_TYPE_MEMORY_MAP,
};
use log::warn;

/// Numeric tag type.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TagType(pub u32);

impl TagType {
    pub const END: Self = Self(TAG_TYPE_END);
    pub const CMDLINE: Self = Self(TAG_TYPE_CMDLINE);
    pub const BOOT_LOADER_NAME: Self = Self(TAG_TYPE_BOOT_LOADER_NAME);
    pub const BASIC_MEMINFO: Self = Self(TAG_TYPE_BASIC_MEMINFO);
    pub const MEMORY_MAP: Self = Self(TAG_TYPE_MEMORY_MAP);
    pub const FRAMEBUFFER: Self = Self(TAG_TYPE_FRAMEBUFFER);

    const fn name(self) -> Option<&'static str> {
        match self.0 {
            TAG_TYPE_END => Some("END"),
            TAG_TYPE_CMDLINE => Some("CMDLINE"),
            TAG_TYPE_BOOT_LOADER_NAME => Some("BOOT_LOADER_NAME"),
            TAG_TYPE_BASIC_MEMINFO => Some("BASIC_MEMINFO"),
            TAG_TYPE_MEMORY_MAP => Some("MEMORY_MAP"),
            TAG_TYPE_FRAMEBUFFER => Some("FRAMEBUFFER"),
            _ => None,
        }
    }
}

impl fmt::Debug for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "TagType::{name}"),
            None => write!(f, "TagType({})", self.0),
        }
    }
}

impl From<u32> for TagType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// One tag of the boot information block: its header and `size` bytes
/// (header included, padding excluded).
#[derive(Copy, Clone)]
pub struct Tag<'a> {
    header: TagHeader,
    bytes: &'a [u8],
}

impl<'a> Tag<'a> {
    #[must_use]
    pub const fn header(&self) -> TagHeader {
        self.header
    }

    #[must_use]
    pub const fn ty(&self) -> TagType {
        TagType(self.header.ty())
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.header.size()
    }

    /// Header and payload.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The bytes following the tag header.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[TAG_HEADER_SIZE..]
    }
}

impl fmt::Debug for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("ty", &self.ty())
            .field("size", &self.size())
            .finish()
    }
}

/// Iterator over the tags of a boot information block.
///
/// `bytes` is the block cut to its declared total size; iteration never
/// leaves it.
#[derive(Clone)]
pub struct Tags<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Tags<'a> {
    pub(crate) const fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    const fn finish(&mut self) {
        self.offset = self.bytes.len();
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let Some(header) = TagHeader::read(self.bytes, self.offset) else {
            warn!(
                "Tag header at offset {:#x} runs past the end of the boot information",
                self.offset
            );
            self.finish();
            return None;
        };

        if header.ty() == TAG_TYPE_END {
            self.finish();
            return None;
        }

        let size = header.size() as usize;
        if size < TAG_HEADER_SIZE {
            warn!(
                "Tag {:?} at offset {:#x} declares size {size}, stopping scan",
                TagType(header.ty()),
                self.offset
            );
            self.finish();
            return None;
        }

        let end = match self.offset.checked_add(size) {
            Some(end) if end <= self.bytes.len() => end,
            _ => {
                warn!(
                    "Tag {:?} at offset {:#x} with size {size} exceeds the boot information",
                    TagType(header.ty()),
                    self.offset
                );
                self.finish();
                return None;
            }
        };

        let tag = Tag {
            header,
            bytes: &self.bytes[self.offset..end],
        };

        // Tags start on 8-byte boundaries.
        self.offset = end
            .checked_next_multiple_of(TAG_ALIGN)
            .unwrap_or(self.bytes.len());
        Some(tag)
    }
}

impl core::iter::FusedIterator for Tags<'_> {}
