//! # Physical Memory Layout

/// Size of a physical page frame in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// `log2(PAGE_SIZE)`.
pub const PAGE_SHIFT: u32 = 12;

/// Physical memory below this address is reserved for legacy use
/// (real-mode IVT, BDA, EBDA, VGA memory, option ROMs) and is never managed.
pub const LOW_MEMORY_FLOOR: u64 = 0x0010_0000; // 1 MiB

/// First address the early allocator can no longer reach.
///
/// Memory map entries that need more than 32 bits to describe are ignored
/// entirely; entries that merely extend past this line are cut at it.
pub const PHYS_32BIT_LIMIT: u64 = 0x1_0000_0000; // 4 GiB

/// Number of page frames below [`PHYS_32BIT_LIMIT`].
pub const MAX_32BIT_FRAMES: u64 = PHYS_32BIT_LIMIT >> PAGE_SHIFT;

/// Round `addr` up to the next page boundary.
///
/// Saturates at the last page boundary representable in a `u64`.
#[inline]
#[must_use]
pub const fn page_align_up(addr: u64) -> u64 {
    match addr.checked_add(PAGE_SIZE - 1) {
        Some(v) => v & !(PAGE_SIZE - 1),
        None => !(PAGE_SIZE - 1),
    }
}

/// Round `addr` down to a page boundary.
#[inline]
#[must_use]
pub const fn page_align_down(addr: u64) -> u64 {
    addr & !(PAGE_SIZE - 1)
}

const _: () = {
    assert!(PAGE_SIZE == 1 << PAGE_SHIFT);
    assert!(LOW_MEMORY_FLOOR.is_multiple_of(PAGE_SIZE));
    assert!(LOW_MEMORY_FLOOR < PHYS_32BIT_LIMIT);
    assert!(MAX_32BIT_FRAMES == 0x10_0000);
};
