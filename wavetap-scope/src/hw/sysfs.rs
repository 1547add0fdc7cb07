//! Sysfs GPIO backend.
//!
//! Exporting a pin is asynchronous: the kernel creates the attribute files
//! and udev applies permissions some time later, so [`export`] polls until
//! the pin is usable.

use std::thread;
use std::time::Duration;

use linux_embedded_hal::sysfs_gpio::{Direction, Pin};

use crate::error::{Error, Result};
use crate::hw::{InputPin, OutputPin};

const EXPORT_POLL: Duration = Duration::from_millis(10);
const EXPORT_TRIES: u32 = 100;

fn export(number: u64) -> Result<Pin> {
    let pin = Pin::new(number);
    pin.export()?;
    for _ in 0..EXPORT_TRIES {
        if pin.is_exported() {
            return Ok(pin);
        }
        thread::sleep(EXPORT_POLL);
    }
    Err(Error::Hardware(format!(
        "GPIO {number} did not appear after export"
    )))
}

/// An exported sysfs output line.
pub struct SysfsOutput {
    pin: Pin,
}

impl SysfsOutput {
    /// Export a pin and configure it as an output at the given level.
    pub fn open(number: u64, initial_high: bool) -> Result<Self> {
        let pin = export(number)?;
        // Direction::High/Low sets direction and initial level in one write,
        // so the line never glitches through the wrong state.
        pin.set_direction(if initial_high {
            Direction::High
        } else {
            Direction::Low
        })?;
        Ok(Self { pin })
    }
}

impl OutputPin for SysfsOutput {
    fn set_high(&mut self) -> Result<()> {
        self.pin.set_value(1)?;
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        self.pin.set_value(0)?;
        Ok(())
    }
}

/// An exported sysfs input line.
pub struct SysfsInput {
    pin: Pin,
}

impl SysfsInput {
    /// Export a pin and configure it as an input.
    pub fn open(number: u64) -> Result<Self> {
        let pin = export(number)?;
        pin.set_direction(Direction::In)?;
        Ok(Self { pin })
    }
}

impl InputPin for SysfsInput {
    fn is_high(&mut self) -> Result<bool> {
        Ok(self.pin.get_value()? != 0)
    }
}
