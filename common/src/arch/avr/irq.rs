use crate::sync::irq::IrqControl;

/// Interrupt control for the AVR architecture.
///
/// The global interrupt flag lives in bit 7 of the status register (SREG,
/// I/O address 0x3F). `disable` saves the whole SREG and clears the flag;
/// `restore` writes the saved value back, so nested critical sections
/// compose.
pub struct AvrIrq;

impl IrqControl for AvrIrq {
    type State = u8;

    #[inline(always)]
    fn disable() -> u8 {
        let sreg: u8;
        unsafe {
            // Save SREG, then clear the global interrupt flag
            core::arch::asm!(
                "in {0}, 0x3f",
                "cli",
                out(reg) sreg,
                options(nomem, nostack)
            );
        }
        sreg
    }

    #[inline(always)]
    fn restore(sreg: u8) {
        unsafe {
            core::arch::asm!(
                "out 0x3f, {0}",
                in(reg) sreg,
                options(nomem, nostack)
            );
        }
    }
}

/// Set the global interrupt flag.
///
/// Called exactly once by the firmware entry point, after every timer has
/// been configured.
#[inline(always)]
pub fn enable_interrupts() {
    unsafe {
        core::arch::asm!("sei", options(nomem, nostack));
    }
}
