pub mod irq;
pub use irq::{AvrIrq, enable_interrupts};
