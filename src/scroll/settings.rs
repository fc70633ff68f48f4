/*
 *  scroll/settings.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime display settings, adjustable while scrolling
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

use std::time::Duration;

use log::debug;

use crate::config::DisplayConfig;
use crate::display::charmap::UmlautMode;

pub const DEFAULT_WIDTH: usize = 16;
pub const DEFAULT_SCROLL_SPEED: u32 = 5;
pub const DEFAULT_PAUSE_CYCLES: u32 = 5;

pub const MIN_SCROLL_SPEED: u32 = 1;
pub const MAX_SCROLL_SPEED: u32 = 20;

/// Bring `speed` into 1..=20 ticks per second
pub fn clamp_scroll_speed(speed: u32) -> u32 {
    let clamped = speed.clamp(MIN_SCROLL_SPEED, MAX_SCROLL_SPEED);
    if clamped != speed {
        debug!("scroll speed {} clamped to {}", speed, clamped);
    }
    clamped
}

/// Everything a tick needs to know besides the text itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub width: usize,
    scroll_speed: u32,
    pub pause_cycles: u32,
    pub umlaut_mode: UmlautMode,
    pub raw_mode: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            pause_cycles: DEFAULT_PAUSE_CYCLES,
            umlaut_mode: UmlautMode::Native,
            raw_mode: false,
        }
    }
}

impl DisplaySettings {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let mut settings = Self {
            width: config.width(),
            pause_cycles: config.pause_cycles(),
            umlaut_mode: config.umlauts(),
            raw_mode: config.raw_mode(),
            ..Default::default()
        };
        settings.set_scroll_speed(config.scroll_speed());
        settings
    }

    /// Defaults with a given window width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_pause_cycles(mut self, pause_cycles: u32) -> Self {
        self.pause_cycles = pause_cycles;
        self
    }

    /// Builder form of [`DisplaySettings::set_scroll_speed`]
    pub fn with_scroll_speed(mut self, speed: u32) -> Self {
        self.set_scroll_speed(speed);
        self
    }

    pub fn scroll_speed(&self) -> u32 {
        self.scroll_speed
    }

    /// Out of range values are clamped, never rejected; returns the stored value
    pub fn set_scroll_speed(&mut self, speed: u32) -> u32 {
        self.scroll_speed = clamp_scroll_speed(speed);
        self.scroll_speed
    }

    /// Gap between ticks, 1 / scroll_speed seconds
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.scroll_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_speed_clamps() {
        let mut settings = DisplaySettings::default();
        assert_eq!(settings.set_scroll_speed(30), 20);
        assert_eq!(settings.scroll_speed(), 20);
        assert_eq!(settings.set_scroll_speed(0), 1);
        assert_eq!(settings.set_scroll_speed(7), 7);
    }

    #[test]
    fn test_tick_interval() {
        let mut settings = DisplaySettings::default();
        assert_eq!(settings.tick_interval(), Duration::from_millis(200));
        settings.set_scroll_speed(20);
        assert_eq!(settings.tick_interval(), Duration::from_millis(50));
        settings.set_scroll_speed(1);
        assert_eq!(settings.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_from_config_clamps_speed() {
        let config = DisplayConfig {
            width: Some(20),
            scroll_speed: Some(99),
            umlauts: Some(UmlautMode::Ascii),
            ..Default::default()
        };
        let settings = DisplaySettings::from_config(&config);
        assert_eq!(settings.width, 20);
        assert_eq!(settings.scroll_speed(), MAX_SCROLL_SPEED);
        assert_eq!(settings.pause_cycles, DEFAULT_PAUSE_CYCLES);
        assert_eq!(settings.umlaut_mode, UmlautMode::Ascii);
    }

    #[test]
    fn test_builders_keep_speed_clamped() {
        let settings = DisplaySettings::default()
            .with_width(20)
            .with_pause_cycles(0)
            .with_scroll_speed(45);
        assert_eq!(settings.width, 20);
        assert_eq!(settings.pause_cycles, 0);
        assert_eq!(settings.scroll_speed(), MAX_SCROLL_SPEED);
        assert_eq!(DisplaySettings::default().with_width(8).scroll_speed(), DEFAULT_SCROLL_SPEED);
    }
}
