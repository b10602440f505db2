//! ATmega328P Timer Register File
//!
//! Maps the named timer registers of [`crate::hal::timer::TimerReg`] onto
//! the MCU's data-space addresses. All decision logic lives in
//! [`crate::peripheral::timer`]; this driver only moves bytes.

use bitflags::bitflags;
use core::ptr::{read_volatile, write_volatile};

use crate::hal::timer::{TimerReg, TimerRegisters, TimerUnit};

bitflags! {
    /// Waveform bits of the control register (TCCR0A/TCCR2A).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u8 {
        /// WGM01/WGM21: clear timer on compare match.
        const WGM_CTC = 1 << 1;
    }

    /// Bits of the clock-select register (TCCR0B/TCCR1B/TCCR2B).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockSelect: u8 {
        const CS0 = 1 << 0;
        const CS1 = 1 << 1;
        const CS2 = 1 << 2;
        /// WGM12: clear timer on compare match, Timer1 only.
        const WGM_CTC = 1 << 3;
    }

    /// Bits of the interrupt-mask register (TIMSK0/TIMSK1/TIMSK2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqMask: u8 {
        /// OCIEnA: output-compare-match-A interrupt enable.
        const OCIE_A = 1 << 1;
    }
}

/// Data-space addresses of one unit's registers.
struct RegisterMap {
    control: usize,
    clock_select: usize,
    interrupt_mask: usize,
    compare: usize,
    /// Compare is a 16-bit register pair (low byte at `compare`).
    wide_compare: bool,
}

// TCCR0A, TCCR0B, TIMSK0, OCR0A
const TIMER0_MAP: RegisterMap = RegisterMap {
    control: 0x44,
    clock_select: 0x45,
    interrupt_mask: 0x6E,
    compare: 0x47,
    wide_compare: false,
};

// TCCR1A, TCCR1B, TIMSK1, OCR1AL/OCR1AH
const TIMER1_MAP: RegisterMap = RegisterMap {
    control: 0x80,
    clock_select: 0x81,
    interrupt_mask: 0x6F,
    compare: 0x88,
    wide_compare: true,
};

// TCCR2A, TCCR2B, TIMSK2, OCR2A
const TIMER2_MAP: RegisterMap = RegisterMap {
    control: 0xB0,
    clock_select: 0xB1,
    interrupt_mask: 0x70,
    compare: 0xB3,
    wide_compare: false,
};

fn map(unit: TimerUnit) -> &'static RegisterMap {
    match unit {
        TimerUnit::Timer0 => &TIMER0_MAP,
        TimerUnit::Timer1 => &TIMER1_MAP,
        TimerUnit::Timer2 => &TIMER2_MAP,
    }
}

#[inline(always)]
fn read_reg(addr: usize) -> u8 {
    unsafe { read_volatile(addr as *const u8) }
}

#[inline(always)]
fn write_reg(addr: usize, value: u8) {
    unsafe { write_volatile(addr as *mut u8, value) }
}

/// Memory-mapped access to the three timer units.
pub struct Atmega328pTimers {
    _private: (),
}

impl Atmega328pTimers {
    /// Create the register-file handle.
    ///
    /// # Safety
    ///
    /// Only one instance may drive the timer registers at a time, and the
    /// code must be running on the ATmega328P.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl TimerRegisters for Atmega328pTimers {
    fn read(&self, unit: TimerUnit, reg: TimerReg) -> u16 {
        let map = map(unit);
        match reg {
            TimerReg::Control => read_reg(map.control) as u16,
            TimerReg::ClockSelect => read_reg(map.clock_select) as u16,
            TimerReg::InterruptMask => read_reg(map.interrupt_mask) as u16,
            TimerReg::Compare if map.wide_compare => {
                // 16-bit access goes through the shared TEMP register:
                // low byte first on reads
                let low = read_reg(map.compare) as u16;
                let high = read_reg(map.compare + 1) as u16;
                (high << 8) | low
            }
            TimerReg::Compare => read_reg(map.compare) as u16,
        }
    }

    fn write(&mut self, unit: TimerUnit, reg: TimerReg, value: u16) {
        let map = map(unit);
        match reg {
            TimerReg::Control => write_reg(map.control, value as u8),
            TimerReg::ClockSelect => write_reg(map.clock_select, value as u8),
            TimerReg::InterruptMask => write_reg(map.interrupt_mask, value as u8),
            TimerReg::Compare if map.wide_compare => {
                // High byte first on writes, again via TEMP
                write_reg(map.compare + 1, (value >> 8) as u8);
                write_reg(map.compare, value as u8);
            }
            TimerReg::Compare => write_reg(map.compare, value as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_maps_do_not_overlap() {
        let mut addresses = std::vec::Vec::new();
        for unit in [TimerUnit::Timer0, TimerUnit::Timer1, TimerUnit::Timer2] {
            let map = map(unit);
            addresses.push(map.control);
            addresses.push(map.clock_select);
            addresses.push(map.interrupt_mask);
            addresses.push(map.compare);
            if map.wide_compare {
                addresses.push(map.compare + 1);
            }
        }
        let count = addresses.len();
        addresses.sort_unstable();
        addresses.dedup();
        assert_eq!(addresses.len(), count);
    }
}
