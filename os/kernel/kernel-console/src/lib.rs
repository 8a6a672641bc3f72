//! # Early Boot Diagnostic Output
//!
//! The memory subsystem runs long before any real driver exists, but still
//! wants to say what it is doing. This crate is the narrow bridge between the
//! `log` facade used by the kernel crates and whatever character device the
//! boot code has at hand.
//!
//! ## Output Path
//!
//! ```text
//! info!/warn!/... (log facade)
//!     ↓
//! ConsoleLogger<C>  (log::Log)
//!     ↓
//! ConsoleWriter<C>  (fmt::Write)
//!     ↓
//! C: Console        (put_char / put_str)
//!     ↓
//! QEMU debug port, VGA text buffer, framebuffer, ...
//! ```
//!
//! Output is best-effort: a console cannot fail, and nothing a console does
//! feeds back into control flow.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "qemu", any(target_arch = "x86", target_arch = "x86_64")))]
//! # fn demo() {
//! use kernel_console::{ConsoleLogger, QemuDebugCon};
//! use log::LevelFilter;
//!
//! static LOGGER: ConsoleLogger<QemuDebugCon> =
//!     ConsoleLogger::new(QemuDebugCon, LevelFilter::Debug);
//!
//! LOGGER.install().expect("logger installed once");
//! log::info!("console online");
//! # }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;
#[cfg(all(feature = "qemu", any(target_arch = "x86", target_arch = "x86_64")))]
mod qemu;

use core::fmt;

pub use logger::ConsoleLogger;
#[cfg(all(feature = "qemu", any(target_arch = "x86", target_arch = "x86_64")))]
pub use qemu::QemuDebugCon;

/// A character output device.
///
/// Writes are one-way and must not block indefinitely; there is no way to
/// report failure.
pub trait Console {
    /// Emit a single byte.
    fn put_char(&self, c: u8);

    /// Emit a string.
    fn put_str(&self, s: &str) {
        for b in s.bytes() {
            self.put_char(b);
        }
    }
}

impl<C: Console + ?Sized> Console for &C {
    fn put_char(&self, c: u8) {
        (**self).put_char(c);
    }

    fn put_str(&self, s: &str) {
        (**self).put_str(s);
    }
}

/// Adapts a [`Console`] to [`core::fmt::Write`].
pub struct ConsoleWriter<'a, C: Console + ?Sized>(pub &'a C);

impl<C: Console + ?Sized> fmt::Write for ConsoleWriter<'_, C> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

/// Write formatted text to `console`, ignoring errors.
pub fn write_fmt<C: Console + ?Sized>(console: &C, args: fmt::Arguments<'_>) {
    // Consoles cannot fail; only a broken `Display` impl can, and then the
    // partial line is all there is to show.
    fmt::write(&mut ConsoleWriter(console), args).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<u8>>);

    impl Console for Recorder {
        fn put_char(&self, c: u8) {
            self.0.lock().unwrap().push(c);
        }
    }

    #[test]
    fn put_str_falls_back_to_put_char() {
        let rec = Recorder::default();
        rec.put_str("PMM\n");
        assert_eq!(rec.0.lock().unwrap().as_slice(), b"PMM\n");
    }

    #[test]
    fn formats_hex_and_decimal() {
        let rec = Recorder::default();
        write_fmt(&rec, format_args!("{:#x} {}", 0x10_0000, 1024));
        assert_eq!(rec.0.lock().unwrap().as_slice(), b"0x100000 1024");
    }

    #[test]
    fn failing_display_keeps_partial_output() {
        struct Broken;

        impl fmt::Display for Broken {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("half")?;
                Err(fmt::Error)
            }
        }

        let rec = Recorder::default();
        write_fmt(&rec, format_args!("[{}] rest", Broken));
        assert_eq!(rec.0.lock().unwrap().as_slice(), b"[half");
    }

    #[test]
    fn references_are_consoles() {
        let rec = Recorder::default();
        let by_ref = &rec;
        by_ref.put_str("ok");
        assert_eq!(rec.0.lock().unwrap().as_slice(), b"ok");
    }
}
