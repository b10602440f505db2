//! Firmware Entry Point
//!
//! Configures Timer1 for a one-second periodic interrupt, then toggles the
//! on-board LED from the compare-match handler. Interrupts are enabled
//! globally only after the timer is fully committed.
//!
//! Non-AVR builds run the identical decision path against the simulated
//! register file and report the engine's choices on stdout.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

mod irq;

/// Period of the indicator toggle.
const BLINK_PERIOD_MS: f64 = 1000.0;

#[cfg(target_arch = "avr")]
mod avr {
    use core::panic::PanicInfo;

    use drivers::console;
    use drivers::hal::gpio::{GpioController, PinMode};
    use drivers::hal::serial::{SerialConfig, SerialPort};
    use drivers::hal::timer::{TimerMode, TimerUnit};
    use drivers::peripheral::timer;
    use drivers::platform::atmega328p::gpio::{Port, PortPin};
    use drivers::platform::atmega328p::{Atmega328pGpio, Atmega328pTimers, DESCRIPTORS, Usart0};
    use log::{LevelFilter, error, info};

    use crate::{BLINK_PERIOD_MS, irq};

    /// On-board LED, PB5.
    const INDICATOR: PortPin = PortPin::new(Port::B, 5);

    #[unsafe(no_mangle)]
    pub extern "C" fn main() -> ! {
        // SAFETY: sole owner of each peripheral, created once at boot
        let mut port = unsafe { Usart0::new() };
        if port.configure(SerialConfig::new_8n1(9600)).is_ok() {
            console::init(port);
        }
        console::init_logging(LevelFilter::Debug);

        let mut gpio = unsafe { Atmega328pGpio::new() };
        let _ = gpio.set_mode(INDICATOR, PinMode::Output);

        let mut timers = unsafe { Atmega328pTimers::new() };
        match timer::configure(
            &mut timers,
            &DESCRIPTORS,
            TimerUnit::Timer1,
            TimerMode::Delay {
                millis: BLINK_PERIOD_MS,
            },
        ) {
            Ok(()) => info!("timer 1 armed, {} ms period", BLINK_PERIOD_MS),
            Err(err) => error!("({}) {}", err.code(), err),
        }

        irq::register(irq::Vector::Timer1CompareA, toggle_indicator);

        // Nothing fires until the committed configuration is in place
        common::arch::enable_interrupts();

        loop {
            core::hint::spin_loop();
        }
    }

    /// Compare-match handler: one hardware toggle, nothing else.
    fn toggle_indicator() {
        // SAFETY: the PINx toggle is a single volatile write
        let mut gpio = unsafe { Atmega328pGpio::new() };
        let _ = gpio.toggle(INDICATOR);
    }

    #[panic_handler]
    fn panic(_info: &PanicInfo) -> ! {
        loop {}
    }
}

#[cfg(not(target_arch = "avr"))]
mod host {
    use drivers::hal::timer::{TimerMode, TimerReg, TimerRegisters, TimerUnit};
    use drivers::peripheral::timer::{configure, select_prescaler};
    use drivers::platform::atmega328p::{DESCRIPTORS, descriptor};
    use drivers::platform::sim::SimTimers;
    use log::{LevelFilter, Log, Metadata, Record, error, info};

    use crate::{BLINK_PERIOD_MS, irq};

    struct StdoutLogger;

    static LOGGER: StdoutLogger = StdoutLogger;

    impl Log for StdoutLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            println!("[{}] {}", record.level(), record.args());
        }

        fn flush(&self) {}
    }

    pub fn run() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Debug);

        let mut regs = SimTimers::new();

        if let Ok(selection) = select_prescaler(descriptor(TimerUnit::Timer1), BLINK_PERIOD_MS) {
            info!(
                "timer 1, {} ms: divisor {}, compare {}",
                BLINK_PERIOD_MS, selection.divisor, selection.compare
            );
        }

        match configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer1,
            TimerMode::Delay {
                millis: BLINK_PERIOD_MS,
            },
        ) {
            Ok(()) => info!(
                "committed: clock-select {:#06b}, compare {}",
                regs.read(TimerUnit::Timer1, TimerReg::ClockSelect),
                regs.read(TimerUnit::Timer1, TimerReg::Compare)
            ),
            Err(err) => error!("({}) {}", err.code(), err),
        }

        irq::register(irq::Vector::Timer1CompareA, || info!("indicator toggled"));
        common::arch::enable_interrupts();

        // Simulate the first compare-match fire
        irq::dispatch(irq::Vector::Timer1CompareA);

        // Unregistered vectors are ignored
        for vector in [irq::Vector::Timer0CompareA, irq::Vector::Timer2CompareA] {
            irq::dispatch(vector);
        }

        // Out of range for the 8-bit unit: the failure path and its
        // diagnostic string
        if let Err(err) = configure(
            &mut regs,
            &DESCRIPTORS,
            TimerUnit::Timer0,
            TimerMode::Delay { millis: 100.0 },
        ) {
            error!("({}) {}", err.code(), err);
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    host::run();
}
