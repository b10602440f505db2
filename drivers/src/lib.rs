//! Hardware Driver Subsystem
//!
//! This crate provides a layered architecture for hardware abstraction:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait and type definitions
//! - [`platform`]: Platform-specific drivers (MCU level)
//! - [`peripheral`]: Reusable peripheral logic, notably the timer
//!   configuration engine
//! - [`console`]: Debug output channel and `log` backend
//!
//! # Design Principles
//!
//! 1. **Separation of Concerns**: Decision logic is separate from register
//!    access, so the same engine drives real hardware and the simulated
//!    register file
//! 2. **Zero-Cost Abstractions**: HAL traits compile to direct hardware
//!    access
//! 3. **No Partial State**: every timer configuration either commits fully
//!    or leaves the unit reset

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod console;
pub mod hal;
pub mod peripheral;
pub mod platform;

// Re-export commonly used types
pub use hal::serial::{SerialConfig, SerialPort};
pub use hal::timer::{ConfigError, TimerMode, TimerRegisters, TimerUnit};
