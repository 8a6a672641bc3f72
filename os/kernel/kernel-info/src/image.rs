use crate::PhysicalAddress;

/// Physical load window of the kernel image, `[start, end)`.
///
/// The frame allocator never marks frames inside this window as free, no
/// matter what the bootloader's memory map claims about them.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct KernelImage {
    pub start: PhysicalAddress,
    pub end: PhysicalAddress,
}

impl KernelImage {
    #[must_use]
    pub const fn new(start: PhysicalAddress, end: PhysicalAddress) -> Self {
        Self { start, end }
    }

    /// An image that occupies no memory.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(PhysicalAddress::zero(), PhysicalAddress::zero())
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end.as_u64().saturating_sub(self.start.as_u64())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `addr` lies inside the image.
    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        addr.as_u64() >= self.start.as_u64() && addr.as_u64() < self.end.as_u64()
    }

    /// The window the linker placed the running kernel in.
    ///
    /// Reads the `__kernel_start` and `__kernel_end` symbols defined by the
    /// kernel's linker script. Only available when building for the bare-metal
    /// target, where the image is identity-loaded at its physical address.
    #[cfg(target_os = "none")]
    #[must_use]
    #[allow(unsafe_code)]
    pub fn linked() -> Self {
        unsafe extern "C" {
            static __kernel_start: u8;
            static __kernel_end: u8;
        }

        let start = &raw const __kernel_start;
        let end = &raw const __kernel_end;
        Self::new(PhysicalAddress::from_ptr(start), PhysicalAddress::from_ptr(end))
    }
}
