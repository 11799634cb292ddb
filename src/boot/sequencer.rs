//! Two-pin reset/boot-mode sequencer
//!
//! Drives the attached device's NRST and BOOT0 lines to reset it into
//! either its system bootloader (download mode) or its flashed program
//! (run mode). The attached device observes the pins continuously, so a
//! pulse sequence must not interleave with other pin writes; the
//! sequencer owns both pins and its methods take `&mut self`, which makes
//! each sequence run to completion before anything else can touch them.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

/// Errors that can occur while driving the boot pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    /// Setting a pin level was rejected by the pin driver
    PinWrite,
}

/// Timed pulse generator for the NRST/BOOT0 pair
///
/// There is no feedback channel from the attached device: the sequencer
/// cannot verify that the intended mode was actually entered. BOOT0 keeps
/// its last-set level after a sequence completes.
pub struct ModeSequencer<RST, BOOT, D> {
    reset: RST,
    boot_select: BOOT,
    delay: D,
    settle_delay_ms: u32,
}

impl<RST, BOOT, D> ModeSequencer<RST, BOOT, D>
where
    RST: OutputPin,
    BOOT: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the reset and boot-select pins
    ///
    /// `settle_delay_ms` is how long NRST is held low; it is a timing
    /// requirement of the attached device's reset circuit, not a tunable.
    pub fn new(reset: RST, boot_select: BOOT, delay: D, settle_delay_ms: u32) -> Self {
        Self {
            reset,
            boot_select,
            delay,
            settle_delay_ms,
        }
    }

    /// Reset the attached device into its system bootloader
    ///
    /// BOOT0 goes high before reset is released, so the device samples the
    /// alternate boot source when it comes out of reset.
    pub async fn enter_download_mode(&mut self) -> Result<(), SequencerError> {
        self.boot_select
            .set_high()
            .map_err(|_| SequencerError::PinWrite)?;
        self.pulse_reset().await
    }

    /// Reset the attached device into its normal program
    pub async fn enter_run_mode(&mut self) -> Result<(), SequencerError> {
        self.boot_select
            .set_low()
            .map_err(|_| SequencerError::PinWrite)?;
        self.pulse_reset().await
    }

    /// Hold NRST low for the settle delay, then release it
    async fn pulse_reset(&mut self) -> Result<(), SequencerError> {
        self.reset.set_low().map_err(|_| SequencerError::PinWrite)?;
        self.delay.delay_ms(self.settle_delay_ms).await;
        self.reset.set_high().map_err(|_| SequencerError::PinWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use futures::executor::block_on;
    use std::rc::Rc;
    use std::vec::Vec;

    /// A single observation of the pin interface, in call order
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TraceEvent {
        Reset(bool),
        BootSelect(bool),
        HoldMs(u32),
    }

    type Trace = Rc<RefCell<Vec<TraceEvent>>>;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Line {
        Reset,
        BootSelect,
    }

    struct TracePin {
        trace: Trace,
        line: Line,
    }

    impl embedded_hal::digital::ErrorType for TracePin {
        type Error = Infallible;
    }

    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.record(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.record(true);
            Ok(())
        }
    }

    impl TracePin {
        fn record(&mut self, high: bool) {
            let event = match self.line {
                Line::Reset => TraceEvent::Reset(high),
                Line::BootSelect => TraceEvent::BootSelect(high),
            };
            self.trace.borrow_mut().push(event);
        }
    }

    struct TraceDelay {
        trace: Trace,
    }

    impl DelayNs for TraceDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.trace.borrow_mut().push(TraceEvent::HoldMs(ns / 1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.trace.borrow_mut().push(TraceEvent::HoldMs(ms));
        }
    }

    fn sequencer_with_trace(
        settle_delay_ms: u32,
    ) -> (ModeSequencer<TracePin, TracePin, TraceDelay>, Trace) {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let reset = TracePin {
            trace: trace.clone(),
            line: Line::Reset,
        };
        let boot = TracePin {
            trace: trace.clone(),
            line: Line::BootSelect,
        };
        let delay = TraceDelay {
            trace: trace.clone(),
        };
        (ModeSequencer::new(reset, boot, delay, settle_delay_ms), trace)
    }

    #[test]
    fn test_download_mode_pulse_shape() {
        let (mut sequencer, trace) = sequencer_with_trace(20);

        block_on(sequencer.enter_download_mode()).unwrap();

        // BOOT0 high and NRST asserted for the full settle delay, then
        // NRST released while BOOT0 stays high
        assert_eq!(
            trace.borrow().as_slice(),
            &[
                TraceEvent::BootSelect(true),
                TraceEvent::Reset(false),
                TraceEvent::HoldMs(20),
                TraceEvent::Reset(true),
            ]
        );
    }

    #[test]
    fn test_run_mode_pulse_shape() {
        let (mut sequencer, trace) = sequencer_with_trace(20);

        block_on(sequencer.enter_run_mode()).unwrap();

        assert_eq!(
            trace.borrow().as_slice(),
            &[
                TraceEvent::BootSelect(false),
                TraceEvent::Reset(false),
                TraceEvent::HoldMs(20),
                TraceEvent::Reset(true),
            ]
        );
    }

    #[test]
    fn test_both_sequences_end_with_reset_released() {
        let (mut sequencer, trace) = sequencer_with_trace(20);

        block_on(sequencer.enter_download_mode()).unwrap();
        assert_eq!(*trace.borrow().last().unwrap(), TraceEvent::Reset(true));

        block_on(sequencer.enter_run_mode()).unwrap();
        assert_eq!(*trace.borrow().last().unwrap(), TraceEvent::Reset(true));
    }

    #[test]
    fn test_settle_delay_is_honoured() {
        let (mut sequencer, trace) = sequencer_with_trace(50);

        block_on(sequencer.enter_download_mode()).unwrap();

        assert!(trace.borrow().contains(&TraceEvent::HoldMs(50)));
    }

    #[test]
    fn test_back_to_back_sequences_do_not_interleave() {
        let (mut sequencer, trace) = sequencer_with_trace(20);

        block_on(sequencer.enter_download_mode()).unwrap();
        block_on(sequencer.enter_run_mode()).unwrap();

        // Second sequence starts only after the first fully completed
        assert_eq!(
            trace.borrow().as_slice(),
            &[
                TraceEvent::BootSelect(true),
                TraceEvent::Reset(false),
                TraceEvent::HoldMs(20),
                TraceEvent::Reset(true),
                TraceEvent::BootSelect(false),
                TraceEvent::Reset(false),
                TraceEvent::HoldMs(20),
                TraceEvent::Reset(true),
            ]
        );
    }
}
