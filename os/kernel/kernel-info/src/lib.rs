//! # Kernel Configuration and Boot Interface
//!
//! This crate defines the constants and small value types that the early
//! boot code and the physical memory manager have to agree on. It is the
//! single source of truth for the Multiboot2 handoff contract and for the
//! physical memory layout assumptions the kernel makes before paging exists.
//!
//! ## Architecture
//!
//! ### Boot Information ([`boot`])
//! Defines the bootloader-to-kernel handoff:
//! * **Magic Value**: The signature the bootloader leaves in `EAX`
//! * **Tag Types**: Numeric identifiers of the records in the boot information block
//! * **Memory Region Types**: The region type values found in memory map entries
//!
//! ### Memory Layout ([`memory`])
//! Establishes the physical memory rules of the early kernel:
//! * **Page Frames**: 4 KiB granularity for all physical bookkeeping
//! * **Low Memory Floor**: The first MiB is never handed out
//! * **32-bit Ceiling**: Nothing at or above 4 GiB is managed
//!
//! ### Physical Addresses ([`PhysicalAddress`])
//! A thin wrapper that keeps physical addresses from being mixed up with
//! plain integers or pointers.
//!
//! ### Kernel Image ([`KernelImage`])
//! The physical window occupied by the loaded kernel, as reported by the
//! linker through the `__kernel_start` / `__kernel_end` symbols.
//!
//! ## Physical Memory Layout
//!
//! ```text
//! Physical Memory Layout:
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │     Low Memory (< 1MiB)         │
//!             │  (BIOS, VGA, legacy firmware)   │
//! FLOOR       ├─────────────────────────────────┤ 0x0010_0000 (1 MiB)
//!             │       Kernel Image              │
//!             │   (Text, Data, BSS)             │
//!             ├─────────────────────────────────┤
//!             │    Available RAM                │
//!             │  (Managed by the frame bitmap)  │
//! 4 GiB       └─────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use kernel_info::boot::MULTIBOOT2_BOOTLOADER_MAGIC;
//! use kernel_info::memory::{LOW_MEMORY_FLOOR, PAGE_SIZE};
//!
//! assert_eq!(MULTIBOOT2_BOOTLOADER_MAGIC, 0x36d7_6289);
//! assert_eq!(LOW_MEMORY_FLOOR % PAGE_SIZE, 0);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod address;
pub mod boot;
mod image;
pub mod memory;

pub use address::PhysicalAddress;
pub use image::KernelImage;
