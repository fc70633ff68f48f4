/*
 *  display/drivers/i2c.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 behind a PCF8574 I2C backpack
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

use embedded_hal::i2c::I2c;
use linux_embedded_hal::{Delay, I2cdev};
use log::info;

use crate::display::drivers::hd44780::{Hd44780, NibbleBus};
use crate::display::error::DisplayError;
use crate::display::traits::Geometry;

// PCF8574 pin mapping: P0=RS, P1=RW, P2=E, P3=Backlight, P4-P7=Data
const LCD_RS: u8 = 0x01;
const LCD_ENABLE: u8 = 0x04;
const LCD_BACKLIGHT: u8 = 0x08;

/// Expander port state, rewritten on every line change
pub struct Pcf8574Bus<I: I2c + Send> {
    i2c: I,
    address: u8,
    port: u8,
    backlight: bool,
}

impl<I: I2c + Send> Pcf8574Bus<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            port: 0,
            backlight: false,
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let byte = if self.backlight { self.port | LCD_BACKLIGHT } else { self.port & !LCD_BACKLIGHT };
        self.i2c
            .write(self.address, &[byte])
            .map_err(|e| DisplayError::I2cError(format!("write 0x{:02X}: {:?}", self.address, e)))
    }
}

impl<I: I2c + Send> NibbleBus for Pcf8574Bus<I> {
    fn put_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), DisplayError> {
        let rs_bit = if rs { LCD_RS } else { 0 };
        self.port = (nibble << 4) | rs_bit | (self.port & LCD_ENABLE);
        self.flush()
    }

    fn set_enable(&mut self, high: bool) -> Result<(), DisplayError> {
        if high {
            self.port |= LCD_ENABLE;
        } else {
            self.port &= !LCD_ENABLE;
        }
        self.flush()
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        self.flush()
    }
}

/// Backpack wired panel on a Linux i2c-dev bus
pub type I2cLcd = Hd44780<Pcf8574Bus<I2cdev>, Delay>;

/// Open `i2c_bus_path` (e.g. "/dev/i2c-1") and address the backpack at `address`
pub fn new_i2c(i2c_bus_path: &str, address: u8, geometry: Geometry) -> Result<I2cLcd, DisplayError> {
    info!("Initializing I2C LCD on {} at address 0x{:02X}", i2c_bus_path, address);

    let i2c = I2cdev::new(i2c_bus_path)
        .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;

    Ok(Hd44780::new(Pcf8574Bus::new(i2c, address), Delay, geometry))
}
