//! Interrupt Dispatch
//!
//! Compare-match interrupts land in a registered-callback table instead of
//! hardwired handler bodies. Handlers are registered before the global
//! interrupt enable and run in interrupt context: they must not block and
//! must not take the console lock.

use common::arch::Irq;
use common::sync::IrqSpinLock;

/// A registered interrupt callback.
pub type IrqHandler = fn();

/// Compare-match interrupt vectors this firmware can dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Vector {
    Timer0CompareA,
    Timer1CompareA,
    Timer2CompareA,
}

impl Vector {
    fn index(self) -> usize {
        match self {
            Vector::Timer0CompareA => 0,
            Vector::Timer1CompareA => 1,
            Vector::Timer2CompareA => 2,
        }
    }
}

const MAX_VECTORS: usize = 3;

static HANDLERS: IrqSpinLock<[Option<IrqHandler>; MAX_VECTORS], Irq> =
    IrqSpinLock::new([None; MAX_VECTORS]);

/// Register `handler` for `vector`, replacing any previous registration.
pub fn register(vector: Vector, handler: IrqHandler) {
    HANDLERS.lock()[vector.index()] = Some(handler);
}

/// Invoke the handler registered for `vector`, if any.
///
/// Unregistered vectors are ignored silently; this runs in interrupt
/// context, where logging is off limits.
pub fn dispatch(vector: Vector) {
    let handler = { HANDLERS.lock()[vector.index()] };
    if let Some(handler) = handler {
        handler();
    }
}

// Hardware vector stubs, named per the ATmega328P vector table.
#[cfg(target_arch = "avr")]
mod vectors {
    use super::{Vector, dispatch};

    #[unsafe(no_mangle)]
    pub unsafe extern "avr-interrupt" fn __vector_7() {
        dispatch(Vector::Timer2CompareA);
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "avr-interrupt" fn __vector_11() {
        dispatch(Vector::Timer1CompareA);
    }

    #[unsafe(no_mangle)]
    pub unsafe extern "avr-interrupt" fn __vector_14() {
        dispatch(Vector::Timer0CompareA);
    }
}
