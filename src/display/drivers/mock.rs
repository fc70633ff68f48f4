/*
 *  display/drivers/mock.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock character display for testing without hardware
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

use std::sync::{Arc, Mutex, MutexGuard};

use log::trace;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySurface, Geometry};

/// Mock display surface
///
/// Simulates a character panel without hardware. It's useful for:
/// - Unit tests
/// - Integration tests
/// - Running the daemon on a desktop (`driver: mock`)
///
/// Every operation is recorded in a shared [`MockSurfaceState`]; keep the
/// handle from [`MockSurface::state`] before boxing the surface away.
#[derive(Debug, Clone)]
pub struct MockSurface {
    geometry: Geometry,
    state: Arc<Mutex<MockSurfaceState>>,
}

/// Internal state for the mock surface (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockSurfaceState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times shutdown() was called
    pub shutdown_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Every backlight change, oldest first
    pub backlight_history: Vec<bool>,

    /// Whether init() succeeded and shutdown() has not run since
    pub is_initialized: bool,

    /// What each row currently shows
    pub lines: Vec<String>,

    /// Every write_line call in order
    pub writes: Vec<(usize, String)>,

    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockSurfaceState {
    pub fn backlight(&self) -> Option<bool> {
        self.backlight_history.last().copied()
    }

    /// Number of writes that targeted `row`
    pub fn writes_to(&self, row: usize) -> usize {
        self.writes.iter().filter(|(r, _)| *r == row).count()
    }
}

fn lock(state: &Mutex<MockSurfaceState>) -> MutexGuard<'_, MockSurfaceState> {
    // a panicking test thread must not hide the recorded calls from the rest
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSurface {
    pub fn new(geometry: Geometry) -> Self {
        let state = MockSurfaceState {
            lines: vec![String::new(); geometry.rows],
            ..Default::default()
        };
        Self {
            geometry,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSurfaceState>> {
        Arc::clone(&self.state)
    }

    /// Reset recorded calls (useful between test phases)
    pub fn reset_state(&self) {
        let mut state = lock(&self.state);
        *state = MockSurfaceState {
            lines: vec![String::new(); self.geometry.rows],
            ..Default::default()
        };
    }
}

impl DisplaySurface for MockSurface {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = lock(&self.state);

        if state.simulate_init_failure {
            return Err(DisplayError::Other("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        let mut state = lock(&self.state);
        state.shutdown_count += 1;
        state.is_initialized = false;
        Ok(())
    }

    fn write_line(&mut self, row: usize, text: &str) -> Result<(), DisplayError> {
        let mut state = lock(&self.state);

        if state.simulate_write_failure {
            return Err(DisplayError::Other("Simulated write failure".to_string()));
        }
        if !state.is_initialized {
            return Err(DisplayError::NotInitialized);
        }
        if !self.geometry.contains_row(row) {
            return Err(DisplayError::RowOutOfRange { row, rows: self.geometry.rows });
        }

        trace!("mock row {}: [{}]", row, text);
        state.lines[row] = text.to_string();
        state.writes.push((row, text.to_string()));
        Ok(())
    }

    fn set_backlight(&mut self, enabled: bool) -> Result<(), DisplayError> {
        lock(&self.state).backlight_history.push(enabled);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = lock(&self.state);
        state.clear_count += 1;
        for line in state.lines.iter_mut() {
            line.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_surface_init() {
        let mut surface = MockSurface::new(Geometry::new(2, 16));

        let state = surface.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        surface.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_surface_records_lines() {
        let mut surface = MockSurface::new(Geometry::new(4, 20));
        surface.init().unwrap();

        surface.write_line(3, "fourth").unwrap();
        surface.write_line(0, "first").unwrap();

        let state = surface.state();
        let state = state.lock().unwrap();
        assert_eq!(state.lines[0], "first");
        assert_eq!(state.lines[3], "fourth");
        assert_eq!(state.writes, vec![(3, "fourth".to_string()), (0, "first".to_string())]);
        assert_eq!(state.writes_to(0), 1);
    }

    #[test]
    fn test_mock_surface_rejects_bad_row() {
        let mut surface = MockSurface::new(Geometry::new(2, 16));
        surface.init().unwrap();
        assert!(matches!(
            surface.write_line(2, "x"),
            Err(DisplayError::RowOutOfRange { row: 2, rows: 2 })
        ));
    }

    #[test]
    fn test_mock_surface_simulated_failures() {
        let mut surface = MockSurface::new(Geometry::new(2, 16));
        surface.state().lock().unwrap().simulate_init_failure = true;
        assert!(surface.init().is_err());

        surface.state().lock().unwrap().simulate_init_failure = false;
        surface.init().unwrap();
        surface.state().lock().unwrap().simulate_write_failure = true;
        assert!(surface.write_line(0, "x").is_err());
    }

    #[test]
    fn test_mock_surface_clear_and_backlight() {
        let mut surface = MockSurface::new(Geometry::new(2, 16));
        surface.init().unwrap();
        surface.write_line(1, "hello").unwrap();
        surface.set_backlight(true).unwrap();
        surface.set_backlight(false).unwrap();
        surface.clear().unwrap();

        let state = surface.state();
        let state = state.lock().unwrap();
        assert_eq!(state.clear_count, 1);
        assert!(state.lines.iter().all(|l| l.is_empty()));
        assert_eq!(state.backlight_history, vec![true, false]);
        assert_eq!(state.backlight(), Some(false));
    }

    #[test]
    fn test_mock_surface_reset_state() {
        let mut surface = MockSurface::new(Geometry::new(2, 16));
        surface.init().unwrap();
        surface.reset_state();
        assert_eq!(surface.state().lock().unwrap().init_count, 0);
        assert_eq!(surface.state().lock().unwrap().lines.len(), 2);
    }
}
