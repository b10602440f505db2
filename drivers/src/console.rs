//! Debug Console
//!
//! A byte sink bound to USART0, plus a `log` backend that writes records
//! through it. Purely observational: nothing the core decides depends on
//! what (or whether) the console writes.

use core::fmt::Write;

use common::sync::SpinLock;
use log::{LevelFilter, Log, Metadata, Record};

use crate::hal::serial::{SerialPort, SerialWriter};
use crate::platform::atmega328p::Usart0;

static CONSOLE: SpinLock<Option<Usart0>> = SpinLock::new(None);

/// Register the configured console port.
pub fn init(port: Usart0) {
    *CONSOLE.lock() = Some(port);
}

/// `log` backend writing records to the console.
///
/// Records must never be emitted from interrupt context; the console lock
/// may be held by interrupted code.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Some(port) = CONSOLE.lock().as_mut() {
            let _ = writeln!(
                SerialWriter(port),
                "[{}] {}",
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Some(port) = CONSOLE.lock().as_mut() {
            let _ = port.flush();
        }
    }
}

/// Install the console logger. Call after [`init`], before interrupts are
/// enabled.
pub fn init_logging(level: LevelFilter) {
    #[cfg(target_has_atomic = "ptr")]
    {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(level);
    }

    // AVR has no pointer-width atomics. The racy variants are sound here:
    // logging is set up once, before the interrupt enable.
    #[cfg(not(target_has_atomic = "ptr"))]
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(level);
    }
}
