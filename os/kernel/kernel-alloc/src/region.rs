//! # Managed Region
//!
//! Derives the contiguous, page-aligned physical range the bitmap tracks from
//! the bootloader's memory map, and translates between physical addresses and
//! frame indices inside it.

use crate::frame_alloc::InitError;
use core::ops::Range;
use kernel_info::memory::{
    LOW_MEMORY_FLOOR, PAGE_SHIFT, PAGE_SIZE, PHYS_32BIT_LIMIT, page_align_down, page_align_up,
};
use kernel_info::{KernelImage, PhysicalAddress};
use kernel_multiboot::MemoryMapEntry;

/// The usable span `[start, end)` of an entry, if the allocator may consider it.
///
/// Only available entries whose base and length both fit in 32 bits qualify.
/// The end is cut at 4 GiB.
pub(crate) fn usable_span(entry: &MemoryMapEntry) -> Option<(u64, u64)> {
    if !entry.is_usable() || !entry.fits_32bit() {
        return None;
    }
    Some((entry.base_addr, entry.end_addr().min(PHYS_32BIT_LIMIT)))
}

/// A half-open range of frame indices.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameWindow {
    pub first: usize,
    pub end: usize,
}

impl FrameWindow {
    #[must_use]
    pub const fn empty() -> Self {
        Self { first: 0, end: 0 }
    }

    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.first && index < self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.first)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The page-aligned physical range `[start, end)` tracked by the bitmap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ManagedRegion {
    start: u64,
    end: u64,
    total_pages: usize,
    untracked_pages: u64,
}

impl ManagedRegion {
    /// Derive the region from memory map entries.
    ///
    /// Takes the lowest start and highest end over all usable 32-bit entries,
    /// raises the start to a page boundary and to at least 1 MiB, lowers the end
    /// to a page boundary, and finally caps the page count at `capacity`. Frames
    /// beyond the cap are counted in [`untracked_pages`](Self::untracked_pages)
    /// and never managed.
    ///
    /// # Errors
    /// [`InitError::NoUsableMemory`] if no entry qualifies,
    /// [`InitError::InvalidRange`] if nothing is left after alignment and the
    /// low-memory floor.
    #[allow(clippy::cast_possible_truncation)]
    pub fn derive<I>(entries: I, capacity: usize) -> Result<Self, InitError>
    where
        I: IntoIterator<Item = MemoryMapEntry>,
    {
        let mut bounds: Option<(u64, u64)> = None;
        for (start, end) in entries.into_iter().filter_map(|e| usable_span(&e)) {
            bounds = Some(match bounds {
                None => (start, end),
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
            });
        }

        let Some((min_addr, max_addr)) = bounds else {
            return Err(InitError::NoUsableMemory);
        };
        if max_addr == 0 {
            return Err(InitError::NoUsableMemory);
        }

        let start = page_align_up(min_addr).max(LOW_MEMORY_FLOOR);
        let end = page_align_down(max_addr);
        if end <= start {
            return Err(InitError::InvalidRange {
                start: PhysicalAddress::new(start),
                end: PhysicalAddress::new(end),
            });
        }

        let pages = (end - start) >> PAGE_SHIFT;
        let capacity_pages = capacity as u64;
        let (tracked, untracked) = if pages > capacity_pages {
            (capacity_pages, pages - capacity_pages)
        } else {
            (pages, 0)
        };

        Ok(Self {
            start,
            end: start + (tracked << PAGE_SHIFT),
            total_pages: tracked as usize,
            untracked_pages: untracked,
        })
    }

    #[must_use]
    pub const fn start(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.start)
    }

    /// Exclusive end of the tracked range; lowered when the bitmap was too small.
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.end)
    }

    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Usable pages past the bitmap's capacity.
    #[must_use]
    pub const fn untracked_pages(&self) -> u64 {
        self.untracked_pages
    }

    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        addr.as_u64() >= self.start && addr.as_u64() < self.end
    }

    /// Frame index of a page-aligned address inside the region.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn frame_index(&self, addr: PhysicalAddress) -> Option<usize> {
        if !self.contains(addr) || !addr.is_page_aligned() {
            return None;
        }
        Some(((addr.as_u64() - self.start) >> PAGE_SHIFT) as usize)
    }

    /// Physical address of frame `index`.
    #[must_use]
    pub const fn address_of(&self, index: usize) -> PhysicalAddress {
        PhysicalAddress::new(self.start + index as u64 * PAGE_SIZE)
    }

    /// Frames completely covered by `[start, end)`, clipped to the region.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn frames_within(&self, start: u64, end: u64) -> Range<usize> {
        let lo = page_align_up(start).max(self.start);
        let hi = page_align_down(end).min(self.end);
        if hi <= lo {
            return 0..0;
        }
        let first = ((lo - self.start) >> PAGE_SHIFT) as usize;
        let end = ((hi - self.start) >> PAGE_SHIFT) as usize;
        first..end
    }

    /// Frames touched by the kernel image, clipped to the region.
    ///
    /// Partially covered frames at either end belong to the window.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn kernel_window(&self, image: &KernelImage) -> FrameWindow {
        let lo = image.start.as_u64().max(self.start);
        let hi = image.end.as_u64().min(self.end);
        if hi <= lo {
            return FrameWindow::empty();
        }

        let first = (lo - self.start) >> PAGE_SHIFT;
        let end = (page_align_up(hi) - self.start) >> PAGE_SHIFT;
        FrameWindow {
            first: first as usize,
            end: (end as usize).min(self.total_pages),
        }
    }
}
