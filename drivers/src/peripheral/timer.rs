//! Timer-Configuration Engine
//!
//! Turns "fire an interrupt every N milliseconds" into committed register
//! state for one timer unit: validate the request, reset the unit, pick the
//! smallest prescaler whose range reaches the requested delay, compute the
//! compare value, and write the result, or fail and leave the unit reset.
//!
//! The engine is generic over [`TimerRegisters`], so every decision it makes
//! can be observed on the simulated register file.

use common::arch::Irq;
use common::sync::irq::with_masked;
use log::debug;
use num_traits::float::FloatCore;

use crate::hal::timer::{
    ConfigError, TimerDescriptor, TimerMode, TimerReg, TimerRegisters, TimerUnit, descriptor_for,
};

/// Outcome of prescaler selection for a delay request. Derived per call,
/// never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen clock divisor.
    pub divisor: u16,
    /// Clock-select bits engaging the divisor.
    pub clock_select: u16,
    /// Compare value, in `1..=counter_max`.
    pub compare: u16,
}

/// Return a unit's control, clock-select, and interrupt-mask registers to
/// zero (disabled, no clock source, no interrupts).
///
/// Runs before every configuration attempt and as the rollback action on any
/// failure inside the commit window. Idempotent.
pub fn reset<R: TimerRegisters + ?Sized>(regs: &mut R, unit: TimerUnit) {
    regs.write(unit, TimerReg::Control, 0);
    regs.write(unit, TimerReg::ClockSelect, 0);
    regs.write(unit, TimerReg::InterruptMask, 0);
}

/// Choose the prescaler and compare value for a delay request.
///
/// Scans the unit's divisors in ascending order and takes the first whose
/// maximum achievable delay reaches `millis`; the smallest fitting divisor
/// maximizes timing resolution.
///
/// # Errors
///
/// [`ConfigError::InvalidDelayTime`] when the first fitting divisor cannot
/// time the minimum supported delay, when no divisor reaches `millis`, or
/// when the compare value would round to zero.
pub fn select_prescaler(desc: &TimerDescriptor, millis: f64) -> Result<Selection, ConfigError> {
    for prescaler in desc.prescalers {
        let max_delay_ms = desc.max_delay_ms(prescaler.divisor);
        if millis > max_delay_ms {
            continue;
        }
        if !desc.reliable(prescaler.divisor) {
            // The only range this request fits is one the unit cannot time
            // reliably; refusing beats committing a known-bad period.
            return Err(ConfigError::InvalidDelayTime);
        }
        let compare = FloatCore::round(millis / max_delay_ms * desc.width.max() as f64);
        if compare < 1.0 {
            // A zero compare would mean a zero-length period.
            return Err(ConfigError::InvalidDelayTime);
        }
        return Ok(Selection {
            divisor: prescaler.divisor,
            clock_select: prescaler.clock_select,
            compare: compare as u16,
        });
    }
    Err(ConfigError::InvalidDelayTime)
}

/// Configure `unit` according to `mode`.
///
/// Delay mode commits clear-timer-on-compare-match waveform bits, the
/// compare-match interrupt enable, the selected clock-select bits, and the
/// compare value. All register mutation happens inside one interrupt-masked
/// section; any failure after the initial reset performs another reset
/// before returning, so the unit is never left half-configured.
///
/// The remaining modes validate the unit, then report
/// [`ConfigError::NotImplemented`] without touching any register.
pub fn configure<R: TimerRegisters>(
    regs: &mut R,
    table: &[TimerDescriptor],
    unit: TimerUnit,
    mode: TimerMode,
) -> Result<(), ConfigError> {
    match mode {
        TimerMode::Delay { millis } => {
            if !millis.is_finite() || millis <= 0.0 {
                debug!("rejecting non-positive delay for {:?}", unit);
                return Err(ConfigError::InvalidDelayTime);
            }
            let desc = descriptor_for(table, unit).ok_or(ConfigError::InvalidTimer)?;
            debug!("configuring {:?} for a {} ms period", unit, millis);

            // A live compare-match handler must never observe the window
            // between reset and commit.
            with_masked::<Irq, _>(|| {
                reset(regs, unit);
                regs.write(unit, TimerReg::Control, desc.ctc_waveform.control);
                regs.write(unit, TimerReg::InterruptMask, desc.compare_irq_enable);

                match select_prescaler(desc, millis) {
                    Ok(selection) => {
                        regs.write(
                            unit,
                            TimerReg::ClockSelect,
                            desc.ctc_waveform.clock_select | selection.clock_select,
                        );
                        regs.write(unit, TimerReg::Compare, selection.compare);
                        debug!(
                            "{:?}: divisor {}, compare {}",
                            unit, selection.divisor, selection.compare
                        );
                        Ok(())
                    }
                    Err(err) => {
                        reset(regs, unit);
                        Err(err)
                    }
                }
            })
        }
        TimerMode::ClearOnCompare { .. }
        | TimerMode::PhaseCorrectPwm { .. }
        | TimerMode::PhaseCorrectPwmDuty { .. } => {
            descriptor_for(table, unit).ok_or(ConfigError::InvalidTimer)?;
            Err(ConfigError::NotImplemented)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::atmega328p::{DESCRIPTORS, descriptor};
    use crate::platform::sim::SimTimers;

    fn three_state(regs: &SimTimers, unit: TimerUnit) -> [u16; 3] {
        [
            regs.read(unit, TimerReg::Control),
            regs.read(unit, TimerReg::ClockSelect),
            regs.read(unit, TimerReg::InterruptMask),
        ]
    }

    #[test]
    fn smallest_fitting_divisor_wins() {
        let desc = descriptor(TimerUnit::Timer1);
        let cases = [
            (1.0, 1),
            (4.0, 1),
            (5.0, 8),
            (100.0, 64),
            (1000.0, 256),
            (2000.0, 1024),
        ];
        for (millis, divisor) in cases {
            let selection = select_prescaler(desc, millis).unwrap();
            assert_eq!(selection.divisor, divisor, "delay {millis} ms");
        }
    }

    #[test]
    fn compare_values_are_exact_for_even_ratios() {
        // compare = millis * clock / (1000 * divisor) when the ratio divides
        // the counter range evenly
        let timer1 = descriptor(TimerUnit::Timer1);
        assert_eq!(
            select_prescaler(timer1, 1000.0).unwrap(),
            Selection {
                divisor: 256,
                clock_select: 0b100,
                compare: 62500,
            }
        );
        assert_eq!(select_prescaler(timer1, 1.0).unwrap().compare, 16000);

        let timer0 = descriptor(TimerUnit::Timer0);
        let selection = select_prescaler(timer0, 1.0).unwrap();
        assert_eq!(selection.divisor, 64);
        assert_eq!(selection.compare, 250);
    }

    #[test]
    fn compare_stays_within_counter_range() {
        for desc in &DESCRIPTORS {
            for prescaler in desc.prescalers {
                let max = desc.max_delay_ms(prescaler.divisor);
                if !desc.reliable(prescaler.divisor) {
                    continue;
                }
                let selection = select_prescaler(desc, max).unwrap();
                assert_eq!(selection.divisor, prescaler.divisor);
                assert_eq!(selection.compare, desc.width.max());
            }
        }
    }

    #[test]
    fn delays_in_unreliable_ranges_are_refused() {
        // Requests that only fit the two finest divisors of the 8-bit units
        for unit in [TimerUnit::Timer0, TimerUnit::Timer2] {
            let desc = descriptor(unit);
            assert_eq!(
                select_prescaler(desc, 0.01),
                Err(ConfigError::InvalidDelayTime),
                "{unit:?} divisor-1 range"
            );
            assert_eq!(
                select_prescaler(desc, 0.1),
                Err(ConfigError::InvalidDelayTime),
                "{unit:?} divisor-8 range"
            );
            // Just past the divisor-8 range the request lands on divisor 64
            assert_eq!(select_prescaler(desc, 0.5).unwrap().divisor, 64);
        }
    }

    #[test]
    fn compare_rounding_to_zero_is_refused() {
        // Timer1 at divisor 1 spans ~4.1 ms; a 10 ns request rounds to a
        // zero compare count
        let desc = descriptor(TimerUnit::Timer1);
        assert_eq!(
            select_prescaler(desc, 0.00001),
            Err(ConfigError::InvalidDelayTime)
        );
    }

    #[test]
    fn delay_beyond_coarsest_divisor_is_refused() {
        assert_eq!(
            select_prescaler(descriptor(TimerUnit::Timer0), 17.0),
            Err(ConfigError::InvalidDelayTime)
        );
        assert_eq!(
            select_prescaler(descriptor(TimerUnit::Timer1), 4200.0),
            Err(ConfigError::InvalidDelayTime)
        );
    }

    #[test]
    fn configure_commits_full_register_state() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer1,
            TimerMode::Delay { millis: 1000.0 },
        )
        .unwrap();

        // TCCR1A stays clear, TCCR1B carries WGM12 plus CS bits for /256
        assert_eq!(regs.read(TimerUnit::Timer1, TimerReg::Control), 0);
        assert_eq!(
            regs.read(TimerUnit::Timer1, TimerReg::ClockSelect),
            (1 << 3) | 0b100
        );
        assert_eq!(regs.read(TimerUnit::Timer1, TimerReg::InterruptMask), 1 << 1);
        assert_eq!(regs.read(TimerUnit::Timer1, TimerReg::Compare), 62500);
    }

    #[test]
    fn configure_8bit_unit_sets_control_waveform() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer0,
            TimerMode::Delay { millis: 1.0 },
        )
        .unwrap();

        assert_eq!(regs.read(TimerUnit::Timer0, TimerReg::Control), 1 << 1);
        assert_eq!(regs.read(TimerUnit::Timer0, TimerReg::ClockSelect), 0b011);
        assert_eq!(regs.read(TimerUnit::Timer0, TimerReg::InterruptMask), 1 << 1);
        assert_eq!(regs.read(TimerUnit::Timer0, TimerReg::Compare), 250);
    }

    #[test]
    fn non_positive_delay_leaves_registers_untouched() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer0,
            TimerMode::Delay { millis: 1.0 },
        )
        .unwrap();
        let before = three_state(&regs, TimerUnit::Timer0);

        for millis in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                configure(
                    &mut regs,
                    &DESCRIPTORS,
                    TimerUnit::Timer0,
                    TimerMode::Delay { millis },
                ),
                Err(ConfigError::InvalidDelayTime)
            );
            assert_eq!(three_state(&regs, TimerUnit::Timer0), before);
        }
    }

    #[test]
    fn failed_selection_resets_previous_configuration() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer0,
            TimerMode::Delay { millis: 1.0 },
        )
        .unwrap();

        // Out of range for Timer0, so the earlier configuration is rolled
        // back to the reset state
        assert_eq!(
            configure(
                &mut regs,
                &DESCRIPTORS,
                TimerUnit::Timer0,
                TimerMode::Delay { millis: 5000.0 },
            ),
            Err(ConfigError::InvalidDelayTime)
        );
        assert_eq!(three_state(&regs, TimerUnit::Timer0), [0, 0, 0]);
    }

    #[test]
    fn unimplemented_modes_do_not_mutate_registers() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer0,
            TimerMode::Delay { millis: 1.0 },
        )
        .unwrap();
        let before = three_state(&regs, TimerUnit::Timer0);

        let modes = [
            TimerMode::ClearOnCompare { top: 200 },
            TimerMode::PhaseCorrectPwm {
                period_ms: 20.0,
                on_time_ms: 1.5,
            },
            TimerMode::PhaseCorrectPwmDuty {
                period_ms: 20.0,
                duty_cycle: 0.25,
            },
        ];
        for mode in modes {
            assert_eq!(
                configure(&mut regs, &DESCRIPTORS, TimerUnit::Timer0, mode),
                Err(ConfigError::NotImplemented)
            );
            assert_eq!(three_state(&regs, TimerUnit::Timer0), before);
        }
    }

    #[test]
    fn unit_missing_from_table_is_invalid_timer() {
        let mut regs = SimTimers::new();
        let partial = &DESCRIPTORS[..1]; // Timer0 only
        assert_eq!(
            configure(
                &mut regs,
                partial,
                TimerUnit::Timer1,
                TimerMode::Delay { millis: 10.0 },
            ),
            Err(ConfigError::InvalidTimer)
        );
        assert_eq!(three_state(&regs, TimerUnit::Timer1), [0, 0, 0]);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer2,
            TimerMode::Delay { millis: 4.0 },
        )
        .unwrap();

        reset(&mut regs, TimerUnit::Timer2);
        let once = three_state(&regs, TimerUnit::Timer2);
        reset(&mut regs, TimerUnit::Timer2);
        assert_eq!(three_state(&regs, TimerUnit::Timer2), once);
        assert_eq!(once, [0, 0, 0]);
    }

    #[test]
    fn configure_only_touches_the_target_unit() {
        let mut regs = SimTimers::new();
        configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer1,
            TimerMode::Delay { millis: 250.0 },
        )
        .unwrap();

        for unit in [TimerUnit::Timer0, TimerUnit::Timer2] {
            assert_eq!(three_state(&regs, unit), [0, 0, 0]);
            assert_eq!(regs.read(unit, TimerReg::Compare), 0);
        }
    }
}
