/*
 *  display/drivers/gpio.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 on direct parallel GPIO lines (4-bit mode, R/W tied low)
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_hal::digital::{OutputPin, PinState};
use linux_embedded_hal::{Delay, SysfsPin};
use log::{debug, info};

use crate::config::GpioPins;
use crate::display::drivers::hd44780::{Hd44780, NibbleBus};
use crate::display::error::DisplayError;
use crate::display::traits::Geometry;

/// An output line that may need handing back to the OS on shutdown
pub trait ReleasablePin: OutputPin + Send {
    fn release(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

impl ReleasablePin for SysfsPin {
    fn release(&mut self) -> Result<(), DisplayError> {
        self.unexport()
            .map_err(|e| DisplayError::GpioError(format!("unexport failed: {}", e)))
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool, name: &str) -> Result<(), DisplayError> {
    pin.set_state(PinState::from(high))
        .map_err(|e| DisplayError::GpioError(format!("{} pin: {:?}", name, e)))
}

/// RS, E, D4..D7 and the backlight transistor, one pin each
pub struct GpioBus<P: ReleasablePin> {
    rs: P,
    e: P,
    data: [P; 4],
    backlight: P,
}

impl<P: ReleasablePin> GpioBus<P> {
    /// `data` is ordered D4, D5, D6, D7
    pub fn new(rs: P, e: P, data: [P; 4], backlight: P) -> Self {
        Self { rs, e, data, backlight }
    }
}

impl<P: ReleasablePin> NibbleBus for GpioBus<P> {
    fn put_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), DisplayError> {
        drive(&mut self.rs, rs, "RS")?;
        for (bit, pin) in self.data.iter_mut().enumerate() {
            drive(pin, nibble & (1 << bit) != 0, "data")?;
        }
        Ok(())
    }

    fn set_enable(&mut self, high: bool) -> Result<(), DisplayError> {
        drive(&mut self.e, high, "E")
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        drive(&mut self.backlight, on, "LED")
    }

    fn release(&mut self) -> Result<(), DisplayError> {
        self.rs.release()?;
        self.e.release()?;
        for pin in self.data.iter_mut() {
            pin.release()?;
        }
        self.backlight.release()
    }
}

/// Parallel wired panel on Linux sysfs GPIO
pub type GpioLcd = Hd44780<GpioBus<SysfsPin>, Delay>;

fn open_output(pin_num: u64) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(pin_num);
    pin.export()
        .map_err(|e| DisplayError::GpioError(format!("export GPIO{}: {}", pin_num, e)))?;
    pin.into_output_pin(PinState::Low)
        .map_err(|e| DisplayError::GpioError(format!("GPIO{} as output: {:?}", pin_num, e)))
}

/// Create a parallel wired HD44780 using BCM pin numbers from `pins`
pub fn new_gpio(pins: &GpioPins, geometry: Geometry) -> Result<GpioLcd, DisplayError> {
    info!(
        "Initializing GPIO LCD RS={} E={} D4-7={},{},{},{} LED={}",
        pins.rs, pins.e, pins.d4, pins.d5, pins.d6, pins.d7, pins.backlight
    );
    let bus = GpioBus::new(
        open_output(pins.rs)?,
        open_output(pins.e)?,
        [
            open_output(pins.d4)?,
            open_output(pins.d5)?,
            open_output(pins.d6)?,
            open_output(pins.d7)?,
        ],
        open_output(pins.backlight)?,
    );
    debug!("GPIO lines exported");
    Ok(Hd44780::new(bus, Delay, geometry))
}
