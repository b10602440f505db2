//! Architecture selection.
//!
//! The AVR implementation talks to the real status register; every other
//! target gets a no-op implementation so the decision logic and its tests can
//! run on a development host.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "avr")] {
        pub mod avr;
        pub use avr::AvrIrq as Irq;
        pub use avr::enable_interrupts;
    } else {
        pub mod host;
        pub use host::HostIrq as Irq;
        pub use host::enable_interrupts;
    }
}
