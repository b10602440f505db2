pub mod irq;
pub use irq::{HostIrq, enable_interrupts};
