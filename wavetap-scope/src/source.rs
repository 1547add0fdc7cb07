//! Sample sources for the acquisition loop.
//!
//! The sampler pulls from a [`SampleSource`] without caring whether readings
//! come off the GPIO header or out of a synthesizer. The sine source exists
//! so the full pipeline can run on a machine with no converter attached.

use std::f64::consts::TAU;

use crate::adc::BitBangAdc;
use crate::error::Result;
use crate::hw::{self, InputPin, OutputPin, SysfsInput, SysfsOutput};
use crate::types::RawSample;

/// Anything the sampler can pull readings from.
pub trait SampleSource {
    fn next_sample(&mut self) -> Result<RawSample>;
}

/// The real converter, one frame per sample.
pub struct AdcSource<CLK, DAT, CS> {
    adc: BitBangAdc<CLK, DAT, CS>,
}

impl<CLK, DAT, CS> AdcSource<CLK, DAT, CS>
where
    CLK: OutputPin,
    DAT: InputPin,
    CS: OutputPin,
{
    /// Wrap a driver and run its wake-up sequence.
    pub fn new(mut adc: BitBangAdc<CLK, DAT, CS>) -> Result<Self> {
        adc.wake()?;
        Ok(Self { adc })
    }
}

impl<CLK, DAT, CS> SampleSource for AdcSource<CLK, DAT, CS>
where
    CLK: OutputPin,
    DAT: InputPin,
    CS: OutputPin,
{
    fn next_sample(&mut self) -> Result<RawSample> {
        self.adc.read_frame()
    }
}

/// Open the fixed header pins and wake the converter.
///
/// Any pin that fails to export or configure aborts startup here, before a
/// single frame is clocked.
pub fn open_gpio_source() -> Result<AdcSource<SysfsOutput, SysfsInput, SysfsOutput>> {
    let sclk = SysfsOutput::open(hw::SCLK_GPIO, false)?;
    let sdata = SysfsInput::open(hw::SDATA_GPIO)?;
    let cs = SysfsOutput::open(hw::CS_GPIO, true)?;
    AdcSource::new(BitBangAdc::new(sclk, sdata, cs)?)
}

/// Synthetic sine source: `amplitude * (1 + sin)` keeps the wave unipolar
/// like the converter's output, swinging `0..=2*amplitude` counts.
pub struct SineSource {
    amplitude: f64,
    step: f64,
    n: u64,
}

impl SineSource {
    /// `frequency` and `sample_rate` in Hz, `amplitude` in counts.
    pub fn new(frequency: f64, sample_rate: f64, amplitude: u16) -> Self {
        Self {
            amplitude: f64::from(amplitude),
            step: TAU * frequency / sample_rate,
            n: 0,
        }
    }
}

impl SampleSource for SineSource {
    fn next_sample(&mut self) -> Result<RawSample> {
        let value = self.amplitude * (1.0 + (self.step * self.n as f64).sin());
        self.n = self.n.wrapping_add(1);
        Ok(RawSample::new(value.round() as u16))
    }
}
