//! ATmega328P Platform
//!
//! Register-level drivers for the ATmega328P's three timer/counter units,
//! USART0, and the GPIO ports, plus the timer descriptor table the
//! configuration engine consults.

pub mod gpio;
pub mod timer;
pub mod usart;

pub use self::gpio::Atmega328pGpio;
pub use self::timer::Atmega328pTimers;
pub use self::usart::Usart0;

use self::timer::{ClockSelect, Control, IrqMask};
use crate::hal::timer::{CounterWidth, Prescaler, TimerDescriptor, TimerUnit, Waveform};

/// System clock frequency in Hz.
///
/// Every maximum-delay threshold in [`DESCRIPTORS`] derives from this one
/// constant.
pub const CLOCK_HZ: u32 = 16_000_000;

/// Clock-select encodings, ascending by divisor. All three units share this
/// set.
const PRESCALERS: [Prescaler; 5] = [
    Prescaler {
        divisor: 1,
        clock_select: ClockSelect::CS0.bits() as u16,
    },
    Prescaler {
        divisor: 8,
        clock_select: ClockSelect::CS1.bits() as u16,
    },
    Prescaler {
        divisor: 64,
        clock_select: ClockSelect::CS0.union(ClockSelect::CS1).bits() as u16,
    },
    Prescaler {
        divisor: 256,
        clock_select: ClockSelect::CS2.bits() as u16,
    },
    Prescaler {
        divisor: 1024,
        clock_select: ClockSelect::CS0.union(ClockSelect::CS2).bits() as u16,
    },
];

/// Timer descriptor table. Immutable and process-wide; indexable by
/// [`TimerUnit::index`].
///
/// The 8-bit units carry their CTC waveform bit in the control register;
/// Timer1's lives in the clock-select register (WGM12).
pub static DESCRIPTORS: [TimerDescriptor; TimerUnit::COUNT] = [
    TimerDescriptor {
        unit: TimerUnit::Timer0,
        width: CounterWidth::Bits8,
        clock_hz: CLOCK_HZ,
        prescalers: &PRESCALERS,
        ctc_waveform: Waveform {
            control: Control::WGM_CTC.bits() as u16,
            clock_select: 0,
        },
        compare_irq_enable: IrqMask::OCIE_A.bits() as u16,
    },
    TimerDescriptor {
        unit: TimerUnit::Timer1,
        width: CounterWidth::Bits16,
        clock_hz: CLOCK_HZ,
        prescalers: &PRESCALERS,
        ctc_waveform: Waveform {
            control: 0,
            clock_select: ClockSelect::WGM_CTC.bits() as u16,
        },
        compare_irq_enable: IrqMask::OCIE_A.bits() as u16,
    },
    TimerDescriptor {
        unit: TimerUnit::Timer2,
        width: CounterWidth::Bits8,
        clock_hz: CLOCK_HZ,
        prescalers: &PRESCALERS,
        ctc_waveform: Waveform {
            control: Control::WGM_CTC.bits() as u16,
            clock_select: 0,
        },
        compare_irq_enable: IrqMask::OCIE_A.bits() as u16,
    },
];

/// Look up the descriptor for `unit`.
pub fn descriptor(unit: TimerUnit) -> &'static TimerDescriptor {
    &DESCRIPTORS[unit.index()]
}
