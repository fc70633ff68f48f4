/*
 *  scroll/buffer.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Full text per display row
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

use crate::lcd::LcdError;

/// Holds the full, possibly over-width, string for every row
///
/// Content is replaced wholesale and never truncated here; the engine picks
/// the visible window on each tick.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rows: Vec<String>,
}

impl TextBuffer {
    pub fn new(row_count: usize) -> Self {
        Self {
            rows: vec![String::new(); row_count],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn check(&self, row: usize) -> Result<(), LcdError> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(LcdError::InvalidIndex { row, rows: self.rows.len() })
        }
    }

    pub fn set_row(&mut self, row: usize, text: impl Into<String>) -> Result<(), LcdError> {
        self.check(row)?;
        self.rows[row] = text.into();
        Ok(())
    }

    pub fn get_row(&self, row: usize) -> Result<&str, LcdError> {
        self.check(row)?;
        Ok(&self.rows[row])
    }

    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(String::clear);
    }
}
