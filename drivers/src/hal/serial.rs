//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! Platform-independent serial types and the byte-sink trait the debug
//! console writes through.

use core::fmt;

/// Serial port configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Number of data bits per frame.
    pub data_bits: DataBits,
    /// Parity checking mode.
    pub parity: Parity,
    /// Number of stop bits.
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration at the specified baud rate.
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialConfig {
    /// Default configuration: 9600 baud, 8N1.
    fn default() -> Self {
        Self::new_8n1(9600)
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Serial port errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Framing error (invalid stop bit).
    Framing,
    /// Parity check failed.
    Parity,
    /// Data received faster than it could be read.
    Overrun,
    /// Invalid configuration parameter.
    InvalidConfig,
}

/// Blocking serial port.
///
/// Object-safe so the console can hold any implementation.
pub trait SerialPort {
    /// Configure the serial port. Must be called before any transfer.
    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError>;

    /// Write a single byte (blocking).
    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError>;

    /// Write multiple bytes (blocking).
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(bytes.len())
    }

    /// Read a single byte (blocking).
    fn read_byte(&mut self) -> Result<u8, SerialError>;

    /// Wait until all queued output has left the wire.
    fn flush(&mut self) -> Result<(), SerialError>;

    /// Check if the serial port is busy transmitting.
    fn is_busy(&self) -> bool;
}

/// Adapter implementing `core::fmt::Write` over a serial port, so the
/// console can use the `write!`/`writeln!` macros.
pub struct SerialWriter<'a>(pub &'a mut dyn SerialPort);

impl fmt::Write for SerialWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            // Convert line endings
            if byte == b'\n' {
                self.0.write_byte(b'\r').map_err(|_| fmt::Error)?;
            }
            self.0.write_byte(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    struct Capture {
        bytes: std::vec::Vec<u8>,
    }

    impl SerialPort for Capture {
        fn configure(&mut self, _config: SerialConfig) -> Result<(), SerialError> {
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
            self.bytes.push(byte);
            Ok(())
        }

        fn read_byte(&mut self) -> Result<u8, SerialError> {
            Err(SerialError::Overrun)
        }

        fn flush(&mut self) -> Result<(), SerialError> {
            Ok(())
        }

        fn is_busy(&self) -> bool {
            false
        }
    }

    #[test]
    fn writer_converts_line_endings() {
        let mut port = Capture {
            bytes: std::vec::Vec::new(),
        };
        write!(SerialWriter(&mut port), "ok\n").unwrap();
        assert_eq!(port.bytes, b"ok\r\n");
    }

    #[test]
    fn write_sends_every_byte_in_order() {
        let mut port = Capture {
            bytes: std::vec::Vec::new(),
        };
        assert_eq!(port.write(b"abc"), Ok(3));
        assert_eq!(port.bytes, b"abc");
    }
}
