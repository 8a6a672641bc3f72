//! # Kernel Boot Information
//!
//! Constants of the Multiboot2 handoff. The bootloader enters the kernel with
//! [`MULTIBOOT2_BOOTLOADER_MAGIC`] in `EAX` and the physical address of the
//! boot information block in `EBX`.

/// Value the bootloader leaves in `EAX` when it handed over a Multiboot2
/// information block.
pub const MULTIBOOT2_BOOTLOADER_MAGIC: u32 = 0x36d7_6289;

/// Size of the fixed header at the start of the boot information block
/// (`u32 total_size`, `u32 reserved`).
pub const BOOT_INFO_HEADER_SIZE: usize = 8;

/// Size of a tag header (`u32 type`, `u32 size`).
pub const TAG_HEADER_SIZE: usize = 8;

/// Tags are laid out on 8-byte boundaries.
pub const TAG_ALIGN: usize = 8;

/// Terminates the tag sequence.
pub const TAG_TYPE_END: u32 = 0;

/// Kernel command line.
pub const TAG_TYPE_CMDLINE: u32 = 1;

/// Name of the bootloader.
pub const TAG_TYPE_BOOT_LOADER_NAME: u32 = 2;

/// Lower/upper memory sizes in KiB.
pub const TAG_TYPE_BASIC_MEMINFO: u32 = 4;

/// Physical memory map.
pub const TAG_TYPE_MEMORY_MAP: u32 = 6;

/// Framebuffer description.
pub const TAG_TYPE_FRAMEBUFFER: u32 = 8;

/// Memory map entry type: RAM the kernel may use.
pub const MEMORY_AVAILABLE: u32 = 1;

/// Memory map entry type: reserved by firmware or hardware.
pub const MEMORY_RESERVED: u32 = 2;

/// Memory map entry type: ACPI tables, reclaimable after parsing.
pub const MEMORY_ACPI_RECLAIMABLE: u32 = 3;

/// Memory map entry type: ACPI non-volatile storage.
pub const MEMORY_NVS: u32 = 4;

/// Memory map entry type: defective RAM.
pub const MEMORY_BADRAM: u32 = 5;

const _: () = {
    assert!(BOOT_INFO_HEADER_SIZE.is_multiple_of(TAG_ALIGN));
    assert!(TAG_ALIGN.is_power_of_two());
};
