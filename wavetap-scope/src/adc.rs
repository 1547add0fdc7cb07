//! Bit-banged readout protocol for the serial ADC.
//!
//! The converter speaks an SPI-like protocol over three lines: a clock we
//! drive, a data line it drives, and an active-low chip select. One readout
//! frame is 14 clock cycles; the first 3 carry nothing, then each remaining
//! cycle shifts one data bit out, MSB first. After power-up the converter
//! sits in shutdown until it has seen a burst of clocks with chip select
//! held low.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::hw::{InputPin, OutputPin};
use crate::types::RawSample;

/// Clock cycles per readout frame.
pub const FRAME_CLOCKS: u32 = 14;
/// Leading clocks of a frame that carry no data.
pub const QUIET_CLOCKS: u32 = FRAME_CLOCKS - RawSample::BITS;
/// Clock pulses in the wake-up burst that puts the converter in normal mode.
pub const WAKE_PULSES: u32 = 20;
/// Half of one clock period.
pub const HALF_PERIOD: Duration = Duration::from_micros(1);

/// Driver for the three-wire readout.
///
/// Generic over the pin traits; production code plugs in the sysfs pins,
/// tests plug in scripted mocks.
pub struct BitBangAdc<CLK, DAT, CS> {
    sclk: CLK,
    sdata: DAT,
    cs: CS,
}

impl<CLK, DAT, CS> BitBangAdc<CLK, DAT, CS>
where
    CLK: OutputPin,
    DAT: InputPin,
    CS: OutputPin,
{
    /// Take ownership of the three lines. Chip select idles high.
    pub fn new(sclk: CLK, sdata: DAT, mut cs: CS) -> Result<Self> {
        cs.set_high()?;
        Ok(Self { sclk, sdata, cs })
    }

    /// Clock the converter out of shutdown.
    ///
    /// Run once before the first frame.
    pub fn wake(&mut self) -> Result<()> {
        for _ in 0..WAKE_PULSES {
            self.cs.set_low()?;
            self.pulse()?;
        }
        Ok(())
    }

    /// Run one 14-clock frame and return the decoded sample.
    ///
    /// The data line is sampled after the falling edge of each data clock.
    /// A pin fault aborts the frame; no partial sample escapes.
    pub fn read_frame(&mut self) -> Result<RawSample> {
        self.cs.set_low()?;
        let mut acc: u16 = 0;
        for clock in 0..FRAME_CLOCKS {
            self.pulse()?;
            if clock >= QUIET_CLOCKS {
                acc = (acc << 1) | u16::from(self.sdata.is_high()?);
            }
        }
        self.cs.set_high()?;
        settle();
        Ok(RawSample::new(acc))
    }

    // One clock cycle: rising edge, half period, falling edge, half period.
    fn pulse(&mut self) -> Result<()> {
        self.sclk.set_high()?;
        settle();
        self.sclk.set_low()?;
        settle();
        Ok(())
    }
}

// Busy-wait one half period. OS sleep granularity is three orders of
// magnitude coarser than the clock, so spin on the monotonic clock instead.
fn settle() {
    let deadline = Instant::now() + HALF_PERIOD;
    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;
    use test_case::test_case;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Clock(bool),
        Cs(bool),
        Read,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct LoggedOutput {
        log: Log,
        line: fn(bool) -> Event,
    }

    impl OutputPin for LoggedOutput {
        fn set_high(&mut self) -> Result<()> {
            self.log.borrow_mut().push((self.line)(true));
            Ok(())
        }

        fn set_low(&mut self) -> Result<()> {
            self.log.borrow_mut().push((self.line)(false));
            Ok(())
        }
    }

    struct ScriptedInput {
        log: Log,
        bits: Vec<bool>,
        cursor: usize,
    }

    impl InputPin for ScriptedInput {
        fn is_high(&mut self) -> Result<bool> {
            self.log.borrow_mut().push(Event::Read);
            let bit = self
                .bits
                .get(self.cursor)
                .copied()
                .ok_or_else(|| Error::Hardware("bit script exhausted".into()))?;
            self.cursor += 1;
            Ok(bit)
        }
    }

    fn rig(bits: &[u8]) -> (BitBangAdc<LoggedOutput, ScriptedInput, LoggedOutput>, Log) {
        let log: Log = Log::default();
        let sclk = LoggedOutput {
            log: log.clone(),
            line: Event::Clock,
        };
        let cs = LoggedOutput {
            log: log.clone(),
            line: Event::Cs,
        };
        let sdata = ScriptedInput {
            log: log.clone(),
            bits: bits.iter().map(|&b| b != 0).collect(),
            cursor: 0,
        };
        let adc = BitBangAdc::new(sclk, sdata, cs).unwrap();
        log.borrow_mut().clear();
        (adc, log)
    }

    #[test_case(&[0; 11], 0 ; "all zeros")]
    #[test_case(&[1; 11], 2047 ; "all ones")]
    #[test_case(&[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1], 0b101_0101_0101 ; "alternating")]
    #[test_case(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], 1024 ; "msb only")]
    #[test_case(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1], 1 ; "lsb only")]
    fn test_frame_decodes_msb_first(bits: &[u8], expected: u16) {
        let (mut adc, _log) = rig(bits);
        assert_eq!(adc.read_frame().unwrap().counts(), expected);
    }

    #[test]
    fn test_frame_clocks_and_reads() {
        let (mut adc, log) = rig(&[0; 11]);
        adc.read_frame().unwrap();

        let log = log.borrow();
        let rising = log.iter().filter(|e| **e == Event::Clock(true)).count();
        let reads = log.iter().filter(|e| **e == Event::Read).count();
        assert_eq!(rising, FRAME_CLOCKS as usize);
        assert_eq!(reads, RawSample::BITS as usize);
    }

    #[test]
    fn test_quiet_clocks_are_not_read() {
        let (mut adc, log) = rig(&[0; 11]);
        adc.read_frame().unwrap();

        // Chip select drop, then three full cycles before the first read.
        let log = log.borrow();
        let first_read = log.iter().position(|e| *e == Event::Read).unwrap();
        assert_eq!(first_read, 1 + 2 * QUIET_CLOCKS as usize + 2);
    }

    #[test]
    fn test_chip_select_frames_the_readout() {
        let (mut adc, log) = rig(&[0; 11]);
        adc.read_frame().unwrap();

        let log = log.borrow();
        assert_eq!(*log.first().unwrap(), Event::Cs(false));
        assert_eq!(*log.last().unwrap(), Event::Cs(true));
    }

    #[test]
    fn test_wake_burst() {
        let (mut adc, log) = rig(&[]);
        adc.wake().unwrap();

        let log = log.borrow();
        let rising = log.iter().filter(|e| **e == Event::Clock(true)).count();
        let selects = log.iter().filter(|e| **e == Event::Cs(false)).count();
        let reads = log.iter().filter(|e| **e == Event::Read).count();
        assert_eq!(rising, WAKE_PULSES as usize);
        assert_eq!(selects, WAKE_PULSES as usize);
        assert_eq!(reads, 0);
    }

    #[test]
    fn test_pin_fault_aborts_frame() {
        let (mut adc, _log) = rig(&[1, 1]);
        assert!(matches!(adc.read_frame(), Err(Error::Hardware(_))));
    }
}
