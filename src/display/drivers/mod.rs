/*
 *  display/drivers/mod.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character display surface implementations
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

// HD44780 command set, shared by both wirings
pub mod hd44780;

// Conditionally compile each wiring based on feature flags
#[cfg(feature = "driver-gpio")]
pub mod gpio;

#[cfg(feature = "driver-i2c")]
pub mod i2c;

// Mock surface for tests and hardware-free runs
pub mod mock;
