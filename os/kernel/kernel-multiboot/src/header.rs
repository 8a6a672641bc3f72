use bitfield_struct::bitfield;

/// The 8-byte header in front of every tag.
///
/// Read as a single little-endian `u64`: the low half is the tag type, the high
/// half the size of header plus payload (padding excluded).
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct TagHeader {
    /// Bits 0-31: tag type, see [`TagType`](crate::TagType).
    pub ty: u32,

    /// Bits 32-63: size of header and payload in bytes.
    pub size: u32,
}

impl TagHeader {
    /// Read a header at `offset`, if all eight bytes are inside `bytes`.
    #[must_use]
    pub fn read(bytes: &[u8], offset: usize) -> Option<Self> {
        crate::read_u64(bytes, offset).map(Self::from_bits)
    }
}
