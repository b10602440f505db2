//! Timer Hardware Abstraction Layer.
//!
//! Defines the timer units, operating modes, the register-access capability
//! the configuration engine runs against, and the per-unit descriptor data
//! that drives prescaler selection.

use core::fmt;

/// Delays below this cannot be produced reliably; prescaler divisors whose
/// whole range sits under it are never selected (see
/// [`TimerDescriptor::reliable`]).
pub const MIN_RELIABLE_DELAY_MS: f64 = 1.0;

/// Hardware timer/counter units.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerUnit {
    /// 8-bit Timer/Counter0.
    Timer0,
    /// 16-bit Timer/Counter1.
    Timer1,
    /// 8-bit Timer/Counter2.
    Timer2,
}

impl TimerUnit {
    /// Number of timer units.
    pub const COUNT: usize = 3;

    /// Decode a raw unit identifier (wire values `0x01..=0x03`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimer`] for identifiers outside the
    /// fixed enumeration.
    pub fn from_id(id: u8) -> Result<Self, ConfigError> {
        match id {
            0x01 => Ok(TimerUnit::Timer0),
            0x02 => Ok(TimerUnit::Timer1),
            0x03 => Ok(TimerUnit::Timer2),
            _ => Err(ConfigError::InvalidTimer),
        }
    }

    /// The raw identifier for this unit.
    pub fn id(self) -> u8 {
        match self {
            TimerUnit::Timer0 => 0x01,
            TimerUnit::Timer1 => 0x02,
            TimerUnit::Timer2 => 0x03,
        }
    }

    /// Dense index, usable for table lookups.
    pub fn index(self) -> usize {
        match self {
            TimerUnit::Timer0 => 0,
            TimerUnit::Timer1 => 1,
            TimerUnit::Timer2 => 2,
        }
    }
}

/// Counter resolution of a timer unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CounterWidth {
    Bits8,
    Bits16,
}

impl CounterWidth {
    /// Maximum countable value (the counter TOP ceiling).
    pub const fn max(self) -> u16 {
        match self {
            CounterWidth::Bits8 => 0xFF,
            CounterWidth::Bits16 => 0xFFFF,
        }
    }
}

/// Discriminant of [`TimerMode`], decodable from the raw mode codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModeKind {
    Delay,
    ClearOnCompare,
    PhaseCorrectPwm,
    PhaseCorrectPwmDuty,
}

impl ModeKind {
    /// Decode a raw mode code (wire values `0x01..=0x04`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMode`] for unrecognized codes.
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            0x01 => Ok(ModeKind::Delay),
            0x02 => Ok(ModeKind::ClearOnCompare),
            0x03 => Ok(ModeKind::PhaseCorrectPwm),
            0x04 => Ok(ModeKind::PhaseCorrectPwmDuty),
            _ => Err(ConfigError::InvalidMode),
        }
    }

    /// The raw code for this mode.
    pub fn code(self) -> u8 {
        match self {
            ModeKind::Delay => 0x01,
            ModeKind::ClearOnCompare => 0x02,
            ModeKind::PhaseCorrectPwm => 0x03,
            ModeKind::PhaseCorrectPwmDuty => 0x04,
        }
    }
}

/// A timer operating mode together with its parameters.
///
/// Each variant carries exactly the fields its mode needs, so a request with
/// missing or mistyped parameters cannot be constructed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimerMode {
    /// Periodic compare-match interrupt after every `millis` milliseconds.
    Delay { millis: f64 },
    /// Clear-on-compare-match with a caller-chosen top value.
    ClearOnCompare { top: u16 },
    /// Phase-correct PWM with explicit on-time.
    PhaseCorrectPwm { period_ms: f64, on_time_ms: f64 },
    /// Phase-correct PWM with a duty cycle in `[0, 1]`.
    PhaseCorrectPwmDuty { period_ms: f64, duty_cycle: f64 },
}

impl TimerMode {
    /// The discriminant of this mode.
    pub fn kind(&self) -> ModeKind {
        match self {
            TimerMode::Delay { .. } => ModeKind::Delay,
            TimerMode::ClearOnCompare { .. } => ModeKind::ClearOnCompare,
            TimerMode::PhaseCorrectPwm { .. } => ModeKind::PhaseCorrectPwm,
            TimerMode::PhaseCorrectPwmDuty { .. } => ModeKind::PhaseCorrectPwmDuty,
        }
    }
}

/// The named registers of one timer unit.
///
/// The engine only ever speaks in these names; the platform driver maps them
/// to concrete addresses and bit widths.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerReg {
    /// Waveform-mode control register.
    Control,
    /// Clock-select register (also carries waveform bits on some units).
    ClockSelect,
    /// Interrupt-mask register.
    InterruptMask,
    /// Output-compare register.
    Compare,
}

/// Register-level access to the timer units.
///
/// Implemented by the memory-mapped platform driver and by the simulated
/// register file, so the configuration engine can be exercised without
/// hardware.
pub trait TimerRegisters {
    /// Read a register. Registers narrower than 16 bits return the value
    /// zero-extended.
    fn read(&self, unit: TimerUnit, reg: TimerReg) -> u16;

    /// Write a register. Registers narrower than 16 bits take the low byte.
    fn write(&mut self, unit: TimerUnit, reg: TimerReg, value: u16);
}

/// One prescaler option of a timer unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Prescaler {
    /// Clock divisor.
    pub divisor: u16,
    /// Clock-select register bits that engage this divisor.
    pub clock_select: u16,
}

/// Register bits selecting clear-timer-on-compare-match mode, split across
/// the two registers they land in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Waveform {
    /// Bits written to [`TimerReg::Control`].
    pub control: u16,
    /// Bits merged into [`TimerReg::ClockSelect`].
    pub clock_select: u16,
}

/// Static metadata for one timer unit. Pure data, no side effects.
pub struct TimerDescriptor {
    pub unit: TimerUnit,
    pub width: CounterWidth,
    /// System clock feeding the unit, in Hz.
    pub clock_hz: u32,
    /// Available prescalers, ascending by divisor.
    pub prescalers: &'static [Prescaler],
    /// Bits selecting CTC mode on this unit.
    pub ctc_waveform: Waveform,
    /// Interrupt-mask bit enabling the compare-match interrupt.
    pub compare_irq_enable: u16,
}

impl TimerDescriptor {
    /// Maximum delay achievable at `divisor`, in milliseconds:
    /// `(1000 / clock_hz) * counter_max * divisor`.
    pub fn max_delay_ms(&self, divisor: u16) -> f64 {
        (1000.0 / self.clock_hz as f64) * self.width.max() as f64 * divisor as f64
    }

    /// Maximum delay achievable on this unit at all (coarsest divisor).
    pub fn max_delay_any_ms(&self) -> f64 {
        match self.prescalers.last() {
            Some(p) => self.max_delay_ms(p.divisor),
            None => 0.0,
        }
    }

    /// Whether `divisor` can produce the minimum supported delay.
    ///
    /// On the 8-bit units this derives the fixed exclusion of the two finest
    /// divisors, whose whole range falls short of
    /// [`MIN_RELIABLE_DELAY_MS`]; the 16-bit unit reaches it even undivided.
    pub fn reliable(&self, divisor: u16) -> bool {
        self.max_delay_ms(divisor) >= MIN_RELIABLE_DELAY_MS
    }
}

/// Look up the descriptor for `unit` in `table`.
pub fn descriptor_for(table: &[TimerDescriptor], unit: TimerUnit) -> Option<&TimerDescriptor> {
    table.iter().find(|d| d.unit == unit)
}

/// Timer configuration errors.
///
/// Each error carries a stable negative code used in diagnostic output; the
/// `Display` impl renders the matching description.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Mode code not recognized.
    InvalidMode,
    /// Delay not strictly positive, unreachable on the selected unit, or too
    /// short to produce a nonzero compare count.
    InvalidDelayTime,
    /// Timer-unit identifier not recognized, or unit absent from the
    /// descriptor table.
    InvalidTimer,
    /// Mode recognized but intentionally unfinished.
    NotImplemented,
}

impl ConfigError {
    /// Stable numeric code for diagnostic output.
    pub const fn code(self) -> i16 {
        match self {
            ConfigError::InvalidMode => -100,
            ConfigError::InvalidDelayTime => -102,
            ConfigError::InvalidTimer => -103,
            ConfigError::NotImplemented => -104,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ConfigError::InvalidMode => "Invalid mode selected",
            ConfigError::InvalidDelayTime => {
                "Delay time negative or too long for specified timer"
            }
            ConfigError::InvalidTimer => "Invalid timer selected",
            ConfigError::NotImplemented => "Mode recognized but not implemented",
        };
        f.write_str(description)
    }
}
