//! Diagnostic listing of the bootloader's memory map.

use crate::frame_alloc::InitError;
use kernel_info::boot::MULTIBOOT2_BOOTLOADER_MAGIC;
use kernel_multiboot::BootInformation;
use log::{error, info};

/// Log every memory map entry, one line each, and return how many were listed.
///
/// Unlike [`BitmapFrameAlloc::init`](crate::BitmapFrameAlloc::init) this lists
/// all entries, including those above 4 GiB and past the first
/// [`MAX_MMAP_ENTRIES`](crate::MAX_MMAP_ENTRIES).
///
/// # Errors
/// [`InitError::InvalidMagic`], [`InitError::MissingMemoryMap`], or the
/// memory map's own parse error.
pub fn dump_memory_map(magic: u32, info: &BootInformation<'_>) -> Result<usize, InitError> {
    if magic != MULTIBOOT2_BOOTLOADER_MAGIC {
        error!("Invalid bootloader magic {magic:#x}, no memory map");
        return Err(InitError::InvalidMagic(magic));
    }

    let mmap = match info.memory_map_tag() {
        Some(Ok(mmap)) => mmap,
        Some(Err(e)) => {
            error!("Unreadable memory map: {e}");
            return Err(e.into());
        }
        None => {
            error!("No memory map tag found");
            return Err(InitError::MissingMemoryMap);
        }
    };

    info!("Memory map:");
    let mut count = 0;
    for entry in mmap.entries() {
        let usable = if entry.is_usable() { " (usable)" } else { "" };
        info!(
            "  type={} addr={:#x} len={:#x}{usable}",
            entry.kind.as_raw(),
            entry.base_addr,
            entry.length
        );
        count += 1;
    }
    Ok(count)
}
