//! ATmega328P USART0 Driver
//!
//! Blocking serial driver for the MCU's single hardware USART, used as the
//! debug console. Supports the 8N1 frame format only.

use core::ptr::{read_volatile, write_volatile};

use super::CLOCK_HZ;
use crate::hal::serial::{DataBits, Parity, SerialConfig, SerialError, SerialPort, StopBits};

// Register addresses
const UCSR0A: usize = 0xC0;
const UCSR0B: usize = 0xC1;
const UCSR0C: usize = 0xC2;
const UBRR0L: usize = 0xC4;
const UBRR0H: usize = 0xC5;
const UDR0: usize = 0xC6;

// UCSR0A status bits
const UPE: u8 = 1 << 2;
const DOR: u8 = 1 << 3;
const FE: u8 = 1 << 4;
const UDRE: u8 = 1 << 5;
const RXC: u8 = 1 << 7;

// UCSR0B control bits
const TXEN: u8 = 1 << 3;
const RXEN: u8 = 1 << 4;

// UCSR0C frame bits: 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0b11 << 1;

// Largest value the 12-bit UBRR0 register pair can hold
const UBRR_MAX: u64 = 0x0FFF;

/// Compute the baud-rate register value for normal-speed operation.
fn ubrr_for(baud_rate: u32) -> Result<u16, SerialError> {
    if baud_rate == 0 {
        return Err(SerialError::InvalidConfig);
    }

    // UBRR = f_osc / (16 * baud) - 1
    let divisor = CLOCK_HZ as u64 / (16 * baud_rate as u64);
    if divisor == 0 || divisor - 1 > UBRR_MAX {
        return Err(SerialError::InvalidConfig);
    }

    Ok((divisor - 1) as u16)
}

/// USART0 driver.
pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    /// Create the USART0 handle.
    ///
    /// # Safety
    ///
    /// Only one instance may drive the USART registers at a time, and the
    /// code must be running on the ATmega328P.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    fn status(&self) -> u8 {
        unsafe { read_volatile(UCSR0A as *const u8) }
    }

    #[inline(always)]
    fn write_reg(&mut self, addr: usize, value: u8) {
        unsafe { write_volatile(addr as *mut u8, value) }
    }
}

impl SerialPort for Usart0 {
    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError> {
        // Only the 8N1 format is wired up
        if !matches!(config.data_bits, DataBits::Eight)
            || !matches!(config.parity, Parity::None)
            || !matches!(config.stop_bits, StopBits::One)
        {
            return Err(SerialError::InvalidConfig);
        }

        let ubrr = ubrr_for(config.baud_rate)?;
        self.write_reg(UBRR0H, (ubrr >> 8) as u8);
        self.write_reg(UBRR0L, ubrr as u8);

        self.write_reg(UCSR0C, FRAME_8N1);
        self.write_reg(UCSR0B, TXEN | RXEN);

        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        // Wait until the transmit buffer can take another byte
        while self.status() & UDRE == 0 {
            core::hint::spin_loop();
        }
        self.write_reg(UDR0, byte);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, SerialError> {
        while self.status() & RXC == 0 {
            core::hint::spin_loop();
        }

        // Error flags are only valid before UDR0 is read
        let status = self.status();
        let byte = unsafe { read_volatile(UDR0 as *const u8) };
        if status & FE != 0 {
            return Err(SerialError::Framing);
        }
        if status & DOR != 0 {
            return Err(SerialError::Overrun);
        }
        if status & UPE != 0 {
            return Err(SerialError::Parity);
        }
        Ok(byte)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        // The last frame may still be shifting out after this returns
        while self.status() & UDRE == 0 {
            core::hint::spin_loop();
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.status() & UDRE == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubrr_derivation_matches_datasheet_values() {
        assert_eq!(ubrr_for(9600), Ok(103));
        assert_eq!(ubrr_for(19200), Ok(51));
        assert_eq!(ubrr_for(115200), Ok(7));
    }

    #[test]
    fn out_of_range_baud_rates_are_rejected() {
        assert_eq!(ubrr_for(0), Err(SerialError::InvalidConfig));
        // Faster than the clock can divide down to
        assert_eq!(ubrr_for(2_000_000), Err(SerialError::InvalidConfig));
    }
}
