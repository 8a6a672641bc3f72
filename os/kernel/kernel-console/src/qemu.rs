use crate::Console;

/// The port number for QEMU's debug console.
const QEMU_DEBUG_PORT: u16 = 0x402;

/// Console on QEMU's debug port.
///
/// Start QEMU with `-debugcon stdio` (or `file:debug.log`) to see the output.
/// On real hardware the port is usually unused and the writes go nowhere.
#[derive(Debug, Default, Copy, Clone)]
pub struct QemuDebugCon;

impl Console for QemuDebugCon {
    #[inline]
    fn put_char(&self, c: u8) {
        unsafe { outb(QEMU_DEBUG_PORT, c) }
    }
}

/// Write a byte to an I/O port.
#[allow(clippy::inline_always)]
#[inline(always)]
unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") val,
            options(nomem, nostack, preserves_flags)
        );
    }
}
