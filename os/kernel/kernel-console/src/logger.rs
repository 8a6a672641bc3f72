use crate::{Console, write_fmt};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A `log::Log` implementation that writes every record to a [`Console`].
///
/// Lines look like `[INFO] kernel_alloc::frame_alloc: 1024 total pages`.
pub struct ConsoleLogger<C> {
    console: C,
    max_level: LevelFilter,
}

impl<C> ConsoleLogger<C> {
    #[must_use]
    pub const fn new(console: C, max_level: LevelFilter) -> Self {
        Self { console, max_level }
    }

    #[must_use]
    pub const fn console(&self) -> &C {
        &self.console
    }
}

impl<C> ConsoleLogger<C>
where
    C: Console + Send + Sync + 'static,
{
    /// Register this logger with the `log` facade. Call once during early init.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl<C> Log for ConsoleLogger<C>
where
    C: Console + Send + Sync,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        write_fmt(
            &self.console,
            format_args!(
                "[{}] {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            ),
        );
    }

    fn flush(&self) {}
}
