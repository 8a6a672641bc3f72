use crate::tag::Tag;
use crate::{read_u32, read_u64};
use core::fmt;
use kernel_info::boot::{
    MEMORY_ACPI_RECLAIMABLE, MEMORY_AVAILABLE, MEMORY_BADRAM, MEMORY_NVS, MEMORY_RESERVED,
    TAG_HEADER_SIZE,
};

/// Bytes of an entry this crate reads (`u64 addr`, `u64 len`, `u32 type`, `u32 reserved`).
pub const MEMORY_MAP_ENTRY_SIZE: usize = 24;

/// Largest entry stride accepted. Anything above this is taken as a
/// corrupted tag rather than a newer entry format.
pub const MAX_ENTRY_SIZE: u32 = 64;

/// Memory map tag header: tag header plus `entry_size` and `entry_version`.
const MEMORY_MAP_HEADER_SIZE: usize = TAG_HEADER_SIZE + 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryMapError {
    #[error("memory map tag of {0} bytes is too short for its header")]
    Truncated(u32),
    #[error("memory map entry size {0} is outside (0, 64]")]
    InvalidEntrySize(u32),
}

/// Region type of a memory map entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MemoryRegionKind {
    /// RAM usable by the kernel (type 1).
    Available,
    /// Reserved by firmware or hardware (type 2).
    Reserved,
    /// ACPI tables; reclaimable once parsed (type 3).
    AcpiReclaimable,
    /// ACPI non-volatile storage (type 4).
    AcpiNvs,
    /// Defective RAM (type 5).
    Defective,
    /// Any other value; treated as reserved.
    Unknown(u32),
}

impl MemoryRegionKind {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            MEMORY_AVAILABLE => Self::Available,
            MEMORY_RESERVED => Self::Reserved,
            MEMORY_ACPI_RECLAIMABLE => Self::AcpiReclaimable,
            MEMORY_NVS => Self::AcpiNvs,
            MEMORY_BADRAM => Self::Defective,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Available => MEMORY_AVAILABLE,
            Self::Reserved => MEMORY_RESERVED,
            Self::AcpiReclaimable => MEMORY_ACPI_RECLAIMABLE,
            Self::AcpiNvs => MEMORY_NVS,
            Self::Defective => MEMORY_BADRAM,
            Self::Unknown(raw) => raw,
        }
    }
}

/// One physical memory region as reported by the bootloader.
///
/// Entries are neither sorted nor guaranteed to be disjoint.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct MemoryMapEntry {
    pub base_addr: u64,
    pub length: u64,
    pub kind: MemoryRegionKind,
}

impl MemoryMapEntry {
    #[must_use]
    pub const fn new(base_addr: u64, length: u64, kind: MemoryRegionKind) -> Self {
        Self {
            base_addr,
            length,
            kind,
        }
    }

    fn read(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            base_addr: read_u64(bytes, 0)?,
            length: read_u64(bytes, 8)?,
            kind: MemoryRegionKind::from_raw(read_u32(bytes, 16)?),
        })
    }

    /// Exclusive end address, saturating at `u64::MAX`.
    #[must_use]
    pub const fn end_addr(&self) -> u64 {
        self.base_addr.saturating_add(self.length)
    }

    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(self.kind, MemoryRegionKind::Available)
    }

    /// Whether both the start address and the length fit into 32 bits.
    #[must_use]
    pub const fn fits_32bit(&self) -> bool {
        self.base_addr <= u32::MAX as u64 && self.length <= u32::MAX as u64
    }
}

impl fmt::Debug for MemoryMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryMapEntry({:#x}..{:#x}, {:?})",
            self.base_addr,
            self.end_addr(),
            self.kind
        )
    }
}

/// The memory map tag (type 6).
#[derive(Copy, Clone)]
pub struct MemoryMapTag<'a> {
    entry_size: u32,
    entry_version: u32,
    entries: &'a [u8],
}

impl<'a> MemoryMapTag<'a> {
    /// Interpret `tag` as a memory map.
    ///
    /// # Errors
    /// Fails if the tag cannot hold the memory map header or if the declared
    /// entry size is zero or larger than [`MAX_ENTRY_SIZE`]; a bad stride would
    /// otherwise derail every walk over the entries.
    pub fn parse(tag: Tag<'a>) -> Result<Self, MemoryMapError> {
        let bytes = tag.as_bytes();
        if bytes.len() < MEMORY_MAP_HEADER_SIZE {
            return Err(MemoryMapError::Truncated(tag.size()));
        }

        let entry_size =
            read_u32(bytes, TAG_HEADER_SIZE).ok_or_else(|| MemoryMapError::Truncated(tag.size()))?;
        let entry_version =
            read_u32(bytes, TAG_HEADER_SIZE + 4).ok_or_else(|| MemoryMapError::Truncated(tag.size()))?;

        if entry_size == 0 || entry_size > MAX_ENTRY_SIZE {
            return Err(MemoryMapError::InvalidEntrySize(entry_size));
        }

        Ok(Self {
            entry_size,
            entry_version,
            entries: &bytes[MEMORY_MAP_HEADER_SIZE..],
        })
    }

    #[must_use]
    pub const fn entry_size(&self) -> u32 {
        self.entry_size
    }

    #[must_use]
    pub const fn entry_version(&self) -> u32 {
        self.entry_version
    }

    /// All entries whose 24 bytes lie completely inside the tag.
    #[must_use]
    pub const fn entries(&self) -> MemoryMapEntries<'a> {
        MemoryMapEntries {
            bytes: self.entries,
            stride: self.entry_size as usize,
            offset: 0,
        }
    }
}

impl fmt::Debug for MemoryMapTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMapTag")
            .field("entry_size", &self.entry_size)
            .field("entry_version", &self.entry_version)
            .field("entries", &(self.entries.len() / self.entry_size as usize))
            .finish()
    }
}

/// Iterator over the entries of a [`MemoryMapTag`].
#[derive(Clone)]
pub struct MemoryMapEntries<'a> {
    bytes: &'a [u8],
    stride: usize,
    offset: usize,
}

impl Iterator for MemoryMapEntries<'_> {
    type Item = MemoryMapEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.offset.checked_add(MEMORY_MAP_ENTRY_SIZE)?;
        let raw = self.bytes.get(self.offset..end)?;
        self.offset = self.offset.saturating_add(self.stride);
        MemoryMapEntry::read(raw)
    }
}

impl core::iter::FusedIterator for MemoryMapEntries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BootInformation;
    use crate::builder::BootInfoBuilder;
    use alloc::vec::Vec;

    fn parse(block: &[u8]) -> Result<Vec<MemoryMapEntry>, MemoryMapError> {
        let info = BootInformation::new(block).unwrap();
        let tag = info.memory_map_tag().expect("memory map tag")?;
        Ok(tag.entries().collect())
    }

    #[test]
    fn reads_entries_in_order() {
        let block = BootInfoBuilder::new()
            .memory_map(&[
                (0x0, 0x9_FC00, 1),
                (0x9_FC00, 0x400, 2),
                (0x10_0000, 0x7EE_0000, 1),
                (0xFFFC_0000, 0x4_0000, 2),
                (0x1_0000_0000, 0x4000_0000, 1),
            ])
            .build();
        let entries = parse(&block).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[2],
            MemoryMapEntry::new(0x10_0000, 0x7EE_0000, MemoryRegionKind::Available)
        );
        assert_eq!(entries[1].kind, MemoryRegionKind::Reserved);
        assert!(!entries[4].fits_32bit());
    }

    #[test]
    fn debug_shows_entry_count() {
        let block = BootInfoBuilder::new()
            .memory_map_with_entry_size(32, &[(0x10_0000, 0x1000, 1), (0x20_0000, 0x2000, 3)])
            .build();
        let info = BootInformation::new(&block).unwrap();
        let tag = info.memory_map_tag().unwrap().unwrap();
        assert_eq!(
            format!("{tag:?}"),
            "MemoryMapTag { entry_size: 32, entry_version: 0, entries: 2 }"
        );
    }

    #[test]
    fn honours_larger_stride() {
        let block = BootInfoBuilder::new()
            .memory_map_with_entry_size(32, &[(0x10_0000, 0x1000, 1), (0x20_0000, 0x2000, 3)])
            .build();
        let info = BootInformation::new(&block).unwrap();
        let tag = info.memory_map_tag().unwrap().unwrap();
        assert_eq!(tag.entry_size(), 32);
        let entries: Vec<_> = tag.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].base_addr, 0x20_0000);
        assert_eq!(entries[1].kind, MemoryRegionKind::AcpiReclaimable);
    }

    #[test]
    fn rejects_zero_entry_size() {
        let block = BootInfoBuilder::new()
            .memory_map_with_entry_size(0, &[(0x10_0000, 0x1000, 1)])
            .build();
        assert_eq!(parse(&block).unwrap_err(), MemoryMapError::InvalidEntrySize(0));
    }

    #[test]
    fn rejects_oversized_entry_size() {
        let block = BootInfoBuilder::new()
            .memory_map_with_entry_size(65, &[(0x10_0000, 0x1000, 1)])
            .build();
        assert_eq!(parse(&block).unwrap_err(), MemoryMapError::InvalidEntrySize(65));
    }

    #[test]
    fn accepts_maximum_entry_size() {
        let block = BootInfoBuilder::new()
            .memory_map_with_entry_size(64, &[(0x10_0000, 0x1000, 1)])
            .build();
        assert_eq!(parse(&block).unwrap().len(), 1);
    }

    #[test]
    fn rejects_truncated_header() {
        let block = BootInfoBuilder::new().tag(6, &24u32.to_le_bytes()).build();
        assert_eq!(parse(&block).unwrap_err(), MemoryMapError::Truncated(12));
    }

    #[test]
    fn partial_trailing_entry_is_dropped() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&24u32.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&0x10_0000u64.to_le_bytes());
        payload.extend_from_slice(&0x1000u64.to_le_bytes());
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        // Half an entry.
        payload.extend_from_slice(&0x20_0000u64.to_le_bytes());
        payload.extend_from_slice(&0x1000u64.to_le_bytes());

        let block = BootInfoBuilder::new().tag(6, &payload).build();
        assert_eq!(parse(&block).unwrap().len(), 1);
    }

    #[test]
    fn region_kinds_round_trip_raw_values() {
        for raw in 0..8 {
            assert_eq!(MemoryRegionKind::from_raw(raw).as_raw(), raw);
        }
        assert_eq!(MemoryRegionKind::from_raw(9), MemoryRegionKind::Unknown(9));
    }

    #[test]
    fn entry_end_saturates() {
        let e = MemoryMapEntry::new(u64::MAX - 1, 16, MemoryRegionKind::Reserved);
        assert_eq!(e.end_addr(), u64::MAX);
    }
}
