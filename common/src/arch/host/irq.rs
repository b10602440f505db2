use crate::sync::irq::IrqControl;

/// No-op interrupt control for non-AVR builds.
///
/// Host builds have no hardware interrupts to mask; the simulated register
/// file is only ever touched from one thread. Keeping the same shape as
/// [`crate::arch::avr::AvrIrq`] lets the configurator take its critical
/// section unconditionally.
pub struct HostIrq;

impl IrqControl for HostIrq {
    type State = ();

    #[inline(always)]
    fn disable() {}

    #[inline(always)]
    fn restore(_state: ()) {}
}

/// No-op counterpart of the AVR global interrupt enable.
#[inline(always)]
pub fn enable_interrupts() {}
