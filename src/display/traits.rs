/*
 *  display/traits.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for character display abstraction
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

use crate::display::error::DisplayError;

/// Character panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Number of addressable rows (2 or 4)
    pub rows: usize,

    /// Characters per row
    pub width: usize,
}

impl Geometry {
    pub fn new(rows: usize, width: usize) -> Self {
        Self { rows, width }
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row < self.rows
    }
}

/// Minimal hardware abstraction - every character display must implement this trait
///
/// The scrolling core only ever talks to this trait. It has no idea whether the
/// panel hangs off six GPIO lines or a PCF8574 backpack, and it never retries:
/// a failed write is logged by the caller and forgotten.
pub trait DisplaySurface: Send {
    /// Returns the panel geometry
    fn geometry(&self) -> &Geometry;

    /// Acquire the bus and run the controller init sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the panel and release the hardware
    fn shutdown(&mut self) -> Result<(), DisplayError>;

    /// Render `text` at `row`
    ///
    /// `text` must already be translated and padded to exactly `width`
    /// characters. Each char is a glyph code in U+0000..=U+00FF.
    fn write_line(&mut self, row: usize, text: &str) -> Result<(), DisplayError>;

    /// Switch the backlight on or off
    fn set_backlight(&mut self, enabled: bool) -> Result<(), DisplayError>;

    /// Clear the panel
    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Type alias for boxed display surface trait objects
pub type BoxedSurface = Box<dyn DisplaySurface>;
