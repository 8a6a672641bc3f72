//! # Bitmap Frame Allocator
//!
//! First-fit allocator over a [`FrameBitmap`], populated once from the
//! Multiboot2 memory map.

use crate::bitmap::FrameBitmap;
use crate::region::{FrameWindow, ManagedRegion, usable_span};
use crate::{DEFAULT_BITMAP_WORDS, FrameAllocator, MAX_MMAP_ENTRIES};
use kernel_info::boot::MULTIBOOT2_BOOTLOADER_MAGIC;
use kernel_info::{KernelImage, PhysicalAddress};
use kernel_multiboot::{BootInformation, MemoryMapError};
use log::{debug, error, info, trace, warn};

/// Why [`BitmapFrameAlloc::init`] left the allocator inert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("invalid bootloader magic {0:#x}")]
    InvalidMagic(u32),
    #[error("no memory map tag found")]
    MissingMemoryMap,
    #[error("invalid memory map entry size {0}")]
    InvalidEntrySize(u32),
    #[error("memory map tag of {0} bytes is truncated")]
    TruncatedMemoryMap(u32),
    #[error("no usable memory found")]
    NoUsableMemory,
    #[error("invalid memory range {start}..{end}")]
    InvalidRange {
        start: PhysicalAddress,
        end: PhysicalAddress,
    },
    #[error("frame allocator already initialized")]
    AlreadyInitialized,
}

impl From<MemoryMapError> for InitError {
    fn from(value: MemoryMapError) -> Self {
        match value {
            MemoryMapError::InvalidEntrySize(size) => Self::InvalidEntrySize(size),
            MemoryMapError::Truncated(size) => Self::TruncatedMemoryMap(size),
        }
    }
}

/// Outcome of a successful [`BitmapFrameAlloc::init`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InitSummary {
    pub memory_start: PhysicalAddress,
    pub memory_end: PhysicalAddress,
    pub total_pages: usize,
    pub free_pages: usize,
    /// Frames withheld for the kernel image.
    pub kernel_pages: usize,
    /// Usable frames past the bitmap's capacity; never allocatable.
    pub untracked_pages: u64,
}

impl InitSummary {
    /// Whether the machine has more memory than this build can track.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.untracked_pages != 0
    }
}

/// Physical frame allocator backed by a fixed-size bitmap.
///
/// `WORDS` sets the bitmap capacity to `WORDS * 64` frames; the default covers
/// all memory below 4 GiB.
///
/// ### Lifecycle
/// 1. [`new`](Self::new): inert. Allocation fails, counters read zero.
/// 2. [`init`](Self::init): exactly once, before anything else wants a page.
/// 3. [`alloc_page`](Self::alloc_page) / [`free_page`](Self::free_page) for
///    the rest of the kernel's life.
pub struct BitmapFrameAlloc<const WORDS: usize = DEFAULT_BITMAP_WORDS> {
    bitmap: FrameBitmap<WORDS>,
    /// `None` until `init` succeeds.
    region: Option<ManagedRegion>,
    kernel_image: KernelImage,
    kernel_window: FrameWindow,
    free_pages: usize,
}

impl<const WORDS: usize> BitmapFrameAlloc<WORDS> {
    /// An inert allocator that will never hand out frames of `kernel_image`.
    #[must_use]
    pub const fn new(kernel_image: KernelImage) -> Self {
        Self {
            bitmap: FrameBitmap::new(),
            region: None,
            kernel_image,
            kernel_window: FrameWindow::empty(),
            free_pages: 0,
        }
    }

    /// Build the frame pool from the boot information.
    ///
    /// Validates `magic`, finds the memory map, derives the managed region from
    /// the first [`MAX_MMAP_ENTRIES`] entries, and marks every frame free that a
    /// usable entry covers completely and the kernel image does not touch.
    /// Everything else stays allocated.
    ///
    /// # Errors
    /// Any [`InitError`]; the allocator is left exactly as it was.
    pub fn init(
        &mut self,
        magic: u32,
        info: &BootInformation<'_>,
    ) -> Result<InitSummary, InitError> {
        if self.is_initialized() {
            warn!("Frame allocator already initialized, ignoring");
            return Err(InitError::AlreadyInitialized);
        }

        debug!("Starting initialization ...");
        let result = self.populate(magic, info);
        match &result {
            Ok(summary) => info!(
                "Initialized: {} total pages, {} free pages ({}..{})",
                summary.total_pages, summary.free_pages, summary.memory_start, summary.memory_end
            ),
            Err(e) => error!("Initialization failed: {e}"),
        }
        result
    }

    fn populate(
        &mut self,
        magic: u32,
        info: &BootInformation<'_>,
    ) -> Result<InitSummary, InitError> {
        if magic != MULTIBOOT2_BOOTLOADER_MAGIC {
            return Err(InitError::InvalidMagic(magic));
        }

        let mmap = info.memory_map_tag().ok_or(InitError::MissingMemoryMap)??;
        debug!(
            "Memory map found: entry size {}, version {}",
            mmap.entry_size(),
            mmap.entry_version()
        );

        let entries = || mmap.entries().take(MAX_MMAP_ENTRIES);

        let region = ManagedRegion::derive(entries(), FrameBitmap::<WORDS>::CAPACITY)?;
        debug!(
            "Managed region {}..{}, {} pages",
            region.start(),
            region.end(),
            region.total_pages()
        );
        if region.untracked_pages() != 0 {
            warn!(
                "Bitmap holds {} frames; {} usable pages above {} stay unmanaged",
                FrameBitmap::<WORDS>::CAPACITY,
                region.untracked_pages(),
                region.end()
            );
        }

        let window = region.kernel_window(&self.kernel_image);
        debug!(
            "Kernel image {}..{} withholds frames {}..{}",
            self.kernel_image.start, self.kernel_image.end, window.first, window.end
        );

        self.bitmap.fill_used();
        let mut free_pages = 0;
        for (start, end) in entries().filter_map(|e| usable_span(&e)) {
            for index in region.frames_within(start, end) {
                if window.contains(index) || !self.bitmap.is_set(index) {
                    continue;
                }
                self.bitmap.clear(index);
                free_pages += 1;
            }
        }

        self.region = Some(region);
        self.kernel_window = window;
        self.free_pages = free_pages;

        Ok(InitSummary {
            memory_start: region.start(),
            memory_end: region.end(),
            total_pages: region.total_pages(),
            free_pages,
            kernel_pages: window.len(),
            untracked_pages: region.untracked_pages(),
        })
    }

    /// Allocate the lowest free frame.
    ///
    /// Returns `None` before `init` and once every frame is taken.
    pub fn alloc_page(&mut self) -> Option<PhysicalAddress> {
        let region = self.region.as_ref()?;
        if self.free_pages == 0 {
            return None;
        }

        let index = self.bitmap.first_clear(region.total_pages())?;
        self.bitmap.set(index);
        self.free_pages -= 1;
        Some(region.address_of(index))
    }

    /// Return a frame to the pool.
    ///
    /// Silently ignored before `init`, and for addresses that are outside the
    /// managed region, not page-aligned, inside the kernel image, or already
    /// free.
    pub fn free_page(&mut self, page: PhysicalAddress) {
        let Some(region) = self.region.as_ref() else {
            return;
        };

        let Some(index) = region.frame_index(page) else {
            trace!("Ignoring free of unmanaged address {page}");
            return;
        };

        if self.kernel_window.contains(index) {
            trace!("Ignoring free of kernel image frame {page}");
            return;
        }

        if !self.bitmap.is_set(index) {
            trace!("Ignoring double free of {page}");
            return;
        }

        self.bitmap.clear(index);
        self.free_pages += 1;
    }

    /// Frames under management; zero before `init`.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.region.as_ref().map_or(0, ManagedRegion::total_pages)
    }

    /// Frames currently free; zero before `init`.
    #[must_use]
    pub const fn free_pages(&self) -> usize {
        self.free_pages
    }

    #[must_use]
    pub fn memory_start(&self) -> PhysicalAddress {
        self.region
            .as_ref()
            .map_or(PhysicalAddress::zero(), ManagedRegion::start)
    }

    #[must_use]
    pub fn memory_end(&self) -> PhysicalAddress {
        self.region
            .as_ref()
            .map_or(PhysicalAddress::zero(), ManagedRegion::end)
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.region.is_some()
    }

    #[must_use]
    pub const fn kernel_window(&self) -> FrameWindow {
        self.kernel_window
    }

    /// Whether the frame at `page` is unavailable. Anything the allocator
    /// does not manage counts as unavailable.
    #[must_use]
    pub fn is_allocated(&self, page: PhysicalAddress) -> bool {
        self.region
            .as_ref()
            .and_then(|r| r.frame_index(page))
            .is_none_or(|index| self.bitmap.is_set(index))
    }

    /// Free frames according to the bitmap itself.
    #[must_use]
    pub fn count_free_frames(&self) -> usize {
        self.bitmap.count_clear(self.total_pages())
    }
}

impl<const WORDS: usize> FrameAllocator for BitmapFrameAlloc<WORDS> {
    fn alloc_4k(&mut self) -> Option<PhysicalAddress> {
        self.alloc_page()
    }

    fn free_4k(&mut self, frame: PhysicalAddress) {
        self.free_page(frame);
    }
}
