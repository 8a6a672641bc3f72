use crate::tag::Tag;
use crate::{read_u32, read_u64};

/// Framebuffer type byte of the framebuffer tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramebufferKind {
    /// Palette-indexed colors (type 0).
    Indexed,
    /// Direct RGB colors (type 1).
    Rgb,
    /// VGA text mode at `0xB8000` (type 2).
    EgaText,
    Unknown(u8),
}

impl FramebufferKind {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Indexed,
            1 => Self::Rgb,
            2 => Self::EgaText,
            other => Self::Unknown(other),
        }
    }
}

/// The common part of the framebuffer tag (type 8).
///
/// The color information that follows it is not interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FramebufferTag {
    /// Physical address of the framebuffer.
    pub address: u64,
    /// Bytes per scanline.
    pub pitch: u32,
    /// Width in pixels (or characters, for text mode).
    pub width: u32,
    /// Height in pixels (or characters, for text mode).
    pub height: u32,
    /// Bits per pixel.
    pub bpp: u8,
    pub kind: FramebufferKind,
}

impl FramebufferTag {
    /// Tag header plus the fixed fields read here.
    const MIN_SIZE: usize = 30;

    /// Interpret `tag` as a framebuffer description.
    #[must_use]
    pub fn parse(tag: Tag<'_>) -> Option<Self> {
        let bytes = tag.as_bytes();
        if bytes.len() < Self::MIN_SIZE {
            return None;
        }

        Some(Self {
            address: read_u64(bytes, 8)?,
            pitch: read_u32(bytes, 16)?,
            width: read_u32(bytes, 20)?,
            height: read_u32(bytes, 24)?,
            bpp: *bytes.get(28)?,
            kind: FramebufferKind::from_raw(*bytes.get(29)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BootInformation;
    use crate::builder::BootInfoBuilder;

    #[test]
    fn parses_rgb_framebuffer() {
        let block = BootInfoBuilder::new()
            .tag(1, b"quiet\0")
            .framebuffer(0xFD00_0000, 4096, 1024, 768, 32, 1)
            .memory_map(&[(0x10_0000, 0x40_0000, 1)])
            .build();
        let info = BootInformation::new(&block).unwrap();
        let fb = info.framebuffer_tag().unwrap();
        assert_eq!(fb.address, 0xFD00_0000);
        assert_eq!(fb.pitch, 4096);
        assert_eq!(fb.width, 1024);
        assert_eq!(fb.height, 768);
        assert_eq!(fb.bpp, 32);
        assert_eq!(fb.kind, FramebufferKind::Rgb);
    }

    #[test]
    fn text_mode_framebuffer() {
        let block = BootInfoBuilder::new()
            .framebuffer(0xB_8000, 160, 80, 25, 16, 2)
            .build();
        let info = BootInformation::new(&block).unwrap();
        assert_eq!(info.framebuffer_tag().unwrap().kind, FramebufferKind::EgaText);
    }

    #[test]
    fn short_tag_is_rejected() {
        let block = BootInfoBuilder::new().tag(8, &[0u8; 8]).build();
        let info = BootInformation::new(&block).unwrap();
        assert!(info.find_tag(crate::TagType::FRAMEBUFFER).is_some());
        assert!(info.framebuffer_tag().is_none());
    }
}
