//! Platform Layer
//!
//! Concrete register access for each supported MCU, selected by Cargo
//! feature, plus the simulated register file used by tests and host builds.

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "atmega328p")] {
        pub mod atmega328p;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features atmega328p"
        );
    }
}

pub mod sim;
