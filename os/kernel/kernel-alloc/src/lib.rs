//! # Physical Page Frame Allocator
//!
//! This crate turns the bootloader's memory map into a pool of 4 KiB physical
//! page frames the rest of the kernel can allocate from and return to. It runs
//! in the earliest phase of boot: no paging, no heap and no fault handling
//! exist yet, so all bookkeeping lives in a fixed-size bitmap and every input
//! from the bootloader is treated as untrusted.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │         Multiboot2 boot information block           │
//! │    • located via `kernel-multiboot`                 │
//! └─────────────────┬───────────────────────────────────┘
//!                   │ memory map tag (≤ 64 entries)
//! ┌─────────────────▼───────────────────────────────────┐
//! │              Managed Region ([`region`])            │
//! │    • union of usable 32-bit entries                 │
//! │    • 1 MiB floor, page alignment                    │
//! │    • capped to bitmap capacity                      │
//! │    • kernel image exclusion window                  │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │           Frame Bitmap ([`bitmap`])                 │
//! │    • 1 bit per frame, 1 = allocated                 │
//! │    • starts all-ones, usable frames cleared         │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │      Bitmap Frame Allocator ([`frame_alloc`])       │
//! │    • first-fit `alloc_page`                         │
//! │    • checked, idempotent `free_page`                │
//! │    • `total_pages` / `free_pages` counters          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! The allocator is an ordinary owned value: [`BitmapFrameAlloc::new`] yields an
//! inert allocator, [`BitmapFrameAlloc::init`] populates it exactly once, and
//! from then on it is handed by reference to whoever needs frames. Until `init`
//! succeeds every allocation fails and both counters read zero. A failed `init`
//! leaves the allocator inert; the kernel degrades to having no dynamic
//! physical memory instead of halting.
//!
//! ## Capacity
//!
//! The bitmap capacity is a const generic. The default of
//! [`DEFAULT_BITMAP_WORDS`] covers every frame below 4 GiB. A smaller bitmap
//! tracks only the lowest frames of the region; the remainder is reported in
//! [`InitSummary::untracked_pages`] rather than silently dropped.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_alloc::BitmapFrameAlloc;
//! use kernel_info::{KernelImage, boot::MULTIBOOT2_BOOTLOADER_MAGIC};
//! use kernel_multiboot::{BootInformation, builder::BootInfoBuilder};
//!
//! let block = BootInfoBuilder::new()
//!     .memory_map(&[(0x10_0000, 0x40_0000, 1)])
//!     .build();
//! let info = BootInformation::new(&block).unwrap();
//!
//! let mut pmm: Box<BitmapFrameAlloc> = Box::new(BitmapFrameAlloc::new(KernelImage::empty()));
//! let summary = pmm.init(MULTIBOOT2_BOOTLOADER_MAGIC, &info).unwrap();
//! assert_eq!(summary.total_pages, 1024);
//!
//! let frame = pmm.alloc_page().unwrap();
//! assert_eq!(frame.as_u64(), 0x10_0000);
//! pmm.free_page(frame);
//! assert_eq!(pmm.free_pages(), 1024);
//! ```
//!
//! ## Concurrency
//!
//! None. `init` must complete before interrupts are enabled and before any other
//! code asks for a page. Should concurrent callers ever appear, the whole
//! allocator must sit behind a single lock; a scan-then-set allocation is not
//! atomic against a concurrent free.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod bitmap;
mod dump;
pub mod frame_alloc;
pub mod region;

pub use bitmap::FrameBitmap;
pub use dump::dump_memory_map;
pub use frame_alloc::{BitmapFrameAlloc, InitError, InitSummary};
pub use region::{FrameWindow, ManagedRegion};

use kernel_info::PhysicalAddress;

/// Upper bound on memory map entries looked at. Entries past this are ignored.
pub const MAX_MMAP_ENTRIES: usize = 64;

/// Default bitmap size in 64-bit words: 128 KiB, one bit for every frame below 4 GiB.
pub const DEFAULT_BITMAP_WORDS: usize = 128 * 1024 / size_of::<u64>();

#[allow(clippy::cast_possible_truncation)]
const _: () = {
    assert!(DEFAULT_BITMAP_WORDS * u64::BITS as usize == kernel_info::memory::MAX_32BIT_FRAMES as usize);
};

/// A source of single 4 KiB physical frames.
pub trait FrameAllocator {
    /// Hand out one free frame, or `None` if none is left.
    fn alloc_4k(&mut self) -> Option<PhysicalAddress>;

    /// Return a frame previously handed out by [`alloc_4k`](Self::alloc_4k).
    fn free_4k(&mut self, frame: PhysicalAddress);
}
