/*
 *  display/drivers/hd44780.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 command set shared by the parallel and I2C wirings
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

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::display::charmap::glyph_byte;
use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySurface, Geometry};

// command bytes
const CMD_CLEAR: u8 = 0x01;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_SET_DDRAM: u8 = 0x80;

// 4-bit bring-up: 8-bit x3 then switch, 2 lines 5x8, display on, entry inc, clear
const INIT_SEQUENCE: [u8; 6] = [0x33, 0x32, 0x28, CMD_DISPLAY_ON, 0x06, CMD_CLEAR];

const E_PULSE_US: u32 = 50;
const E_DELAY_US: u32 = 50;
const INIT_SETTLE_MS: u32 = 300;
const CLEAR_SETTLE_MS: u32 = 2;

/// The wire between the controller and the host
///
/// Implementations only know how to present one nibble with the RS line set
/// and strobe Enable; the command set lives in [`Hd44780`].
pub trait NibbleBus: Send {
    /// Latch data lines and RS, ready for a strobe
    fn put_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), DisplayError>;

    /// Drive the Enable line
    fn set_enable(&mut self, high: bool) -> Result<(), DisplayError>;

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Release the underlying device (pins unexported, bus closed)
    fn release(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// DDRAM set-address command for `row`
///
/// Rows 2 and 3 continue rows 0 and 1 after `width` columns, which puts them
/// at 0x94 / 0xD4 on a 20 column panel.
pub fn row_address(row: usize, width: usize) -> u8 {
    let base: usize = match row {
        0 => 0x00,
        1 => 0x40,
        2 => width,
        _ => 0x40 + width,
    };
    CMD_SET_DDRAM | (base as u8 & 0x7F)
}

/// HD44780 compatible controller behind any [`NibbleBus`]
pub struct Hd44780<B: NibbleBus, D: DelayNs + Send> {
    bus: B,
    delay: D,
    geometry: Geometry,
    initialized: bool,
}

impl<B: NibbleBus, D: DelayNs + Send> Hd44780<B, D> {
    pub fn new(bus: B, delay: D, geometry: Geometry) -> Self {
        Self {
            bus,
            delay,
            geometry,
            initialized: false,
        }
    }

    /// Borrow the bus (tests inspect the recorded traffic through this)
    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn strobe(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_us(E_DELAY_US);
        self.bus.set_enable(true)?;
        self.delay.delay_us(E_PULSE_US);
        self.bus.set_enable(false)?;
        self.delay.delay_us(E_DELAY_US);
        Ok(())
    }

    /// Send one byte, high nibble first; `rs` selects data (true) or command
    fn byte_out(&mut self, bits: u8, rs: bool) -> Result<(), DisplayError> {
        self.bus.put_nibble(bits >> 4, rs)?;
        self.strobe()?;
        self.bus.put_nibble(bits & 0x0F, rs)?;
        self.strobe()
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.byte_out(cmd, false)
    }

    fn ensure_initialized(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }
}

impl<B: NibbleBus, D: DelayNs + Send> DisplaySurface for Hd44780<B, D> {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        for cmd in INIT_SEQUENCE {
            self.command(cmd)
                .map_err(|e| DisplayError::InitializationFailed(e.to_string()))?;
        }
        self.delay.delay_ms(INIT_SETTLE_MS);
        self.initialized = true;
        info!("HD44780 {}x{} initialized", self.geometry.width, self.geometry.rows);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Ok(());
        }
        self.command(CMD_DISPLAY_OFF)?;
        self.bus.set_backlight(false)?;
        self.initialized = false;
        debug!("HD44780 display off, releasing bus");
        self.bus.release()
    }

    fn write_line(&mut self, row: usize, text: &str) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        if !self.geometry.contains_row(row) {
            return Err(DisplayError::RowOutOfRange { row, rows: self.geometry.rows });
        }
        self.command(row_address(row, self.geometry.width))?;
        let width = self.geometry.width;
        for ch in text.chars().chain(std::iter::repeat(' ')).take(width) {
            self.byte_out(glyph_byte(ch), true)?;
        }
        Ok(())
    }

    fn set_backlight(&mut self, enabled: bool) -> Result<(), DisplayError> {
        self.bus.set_backlight(enabled)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(CLEAR_SETTLE_MS);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Decoded bus traffic: (rs, byte) pairs plus backlight changes
    #[derive(Debug, Default)]
    pub struct RecordingBus {
        pub bytes: Vec<(bool, u8)>,
        pub backlight: Vec<bool>,
        pub released: bool,
        pending: Option<(bool, u8)>,
        latched: Option<(bool, u8)>,
        enable: bool,
    }

    impl RecordingBus {
        pub fn data(&self) -> Vec<u8> {
            self.bytes.iter().filter(|(rs, _)| *rs).map(|(_, b)| *b).collect()
        }

        pub fn commands(&self) -> Vec<u8> {
            self.bytes.iter().filter(|(rs, _)| !*rs).map(|(_, b)| *b).collect()
        }
    }

    impl NibbleBus for RecordingBus {
        fn put_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), DisplayError> {
            self.latched = Some((rs, nibble));
            Ok(())
        }

        fn set_enable(&mut self, high: bool) -> Result<(), DisplayError> {
            // falling edge clocks the latched nibble in
            if self.enable && !high {
                if let Some((rs, nibble)) = self.latched {
                    match self.pending.take() {
                        None => self.pending = Some((rs, nibble)),
                        Some((_, hi)) => self.bytes.push((rs, (hi << 4) | nibble)),
                    }
                }
            }
            self.enable = high;
            Ok(())
        }

        fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
            self.backlight.push(on);
            Ok(())
        }

        fn release(&mut self) -> Result<(), DisplayError> {
            self.released = true;
            Ok(())
        }
    }

    pub struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }
}
