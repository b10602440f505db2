//! Architecture-neutral support code shared by the driver and firmware
//! crates: spinlock-based mutual exclusion and interrupt masking.

#![no_std]

pub mod arch;
pub mod sync;
