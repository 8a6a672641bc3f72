//! # Multiboot2 Boot Information Scanner
//!
//! Read-only, bounds-checked access to the boot information block a
//! Multiboot2 bootloader hands to the kernel.
//!
//! ## Layout
//!
//! ```text
//! offset 0  ┌──────────────┬──────────────┐
//!           │ total_size   │ reserved     │  u32, u32
//! offset 8  ├──────────────┼──────────────┤
//!           │ type         │ size         │  tag header, u32, u32
//!           │ payload (size - 8 bytes)    │
//!           │ padding up to 8-byte align  │
//!           ├──────────────┼──────────────┤
//!           │ ...          │              │
//!           ├──────────────┼──────────────┤
//!           │ 0 (END)      │ 8            │
//!           └──────────────┴──────────────┘
//! ```
//!
//! A tag's `size` covers its header and payload but not the padding; the next
//! tag starts at `(size + 7) & !7`. A tag of type `0` ends the sequence.
//!
//! ## Bounds
//!
//! The END tag is a convention, not a guarantee. Every walk over the tags is
//! limited to the block's declared `total_size`, and stops early at a tag whose
//! header or payload would run past it, or whose `size` is too small to ever
//! advance. Nothing in this crate reads outside the slice it was given.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kernel_multiboot::{BootInformation, TagType};
//!
//! # let mbi_ptr: *const u8 = core::ptr::null();
//! let info = unsafe { BootInformation::from_ptr(mbi_ptr) }.expect("valid boot information");
//! if let Some(Ok(mmap)) = info.memory_map_tag() {
//!     for entry in mmap.entries() {
//!         log::info!("{:#x}+{:#x} {:?}", entry.base_addr, entry.length, entry.kind);
//!     }
//! }
//! let has_fb = info.find_tag(TagType::FRAMEBUFFER).is_some();
//! # let _ = has_fb;
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(any(test, feature = "builder"))]
extern crate alloc;

#[cfg(any(test, feature = "builder"))]
pub mod builder;
mod framebuffer;
mod header;
mod info;
mod memory_map;
mod tag;

pub use framebuffer::{FramebufferKind, FramebufferTag};
pub use header::TagHeader;
pub use info::{BootInfoError, BootInformation};
pub use memory_map::{
    MAX_ENTRY_SIZE, MEMORY_MAP_ENTRY_SIZE, MemoryMapEntries, MemoryMapEntry, MemoryMapError,
    MemoryMapTag, MemoryRegionKind,
};
pub use tag::{Tag, TagType, Tags};

/// Read a little-endian `u32` at `offset`, if it lies fully inside `bytes`.
#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(raw.try_into().ok()?))
}

/// Read a little-endian `u64` at `offset`, if it lies fully inside `bytes`.
#[inline]
fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let raw = bytes.get(offset..offset.checked_add(8)?)?;
    Some(u64::from_le_bytes(raw.try_into().ok()?))
}
