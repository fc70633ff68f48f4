/*
 *  lcd.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scrolling LCD context shared by the tick task and the player glue
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

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace, warn};
use thiserror::Error;
use tokio::sync::Mutex as TokMutex; // Aliased tokio::sync::Mutex

use crate::display::charmap::{render_line, UmlautMode};
use crate::display::error::DisplayError;
use crate::display::traits::BoxedSurface;
use crate::scroll::buffer::TextBuffer;
use crate::scroll::engine::{ScrollEngine, ScrollState};
use crate::scroll::scheduler::TickScheduler;
use crate::scroll::settings::DisplaySettings;

#[derive(Debug, Error)]
pub enum LcdError {
    #[error("row {row} out of range (display has {rows} rows)")]
    InvalidIndex { row: usize, rows: usize },
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Everything a tick reads or writes, behind one lock
pub struct ScrollShared {
    pub buffer: TextBuffer,
    pub engine: ScrollEngine,
    pub settings: DisplaySettings,
    /// Last line pushed to each row, `None` when unknown
    last_written: Vec<Option<String>>,
}

impl ScrollShared {
    fn new(rows: usize, settings: DisplaySettings) -> Self {
        Self {
            buffer: TextBuffer::new(rows),
            engine: ScrollEngine::new(rows),
            settings,
            last_written: vec![None; rows],
        }
    }

    fn set_row(&mut self, row: usize, text: String) -> Result<(), LcdError> {
        self.engine.note_content(row, &text, self.settings.width);
        self.buffer.set_row(row, text)
    }

    fn render(&self, window: &str) -> String {
        let s = &self.settings;
        render_line(window, s.width, s.umlaut_mode, s.raw_mode)
    }

    fn forget_written(&mut self) {
        self.last_written.iter_mut().for_each(|line| *line = None);
    }
}

/// Advance every row once and push changed lines to the surface
///
/// Lock order: shared state, then surface.
async fn tick(shared: &TokMutex<ScrollShared>, surface: &TokMutex<BoxedSurface>) -> Duration {
    let mut guard = shared.lock().await;
    let shared = &mut *guard;
    let mut surface = surface.lock().await;

    let width = shared.settings.width;
    let pause = shared.settings.pause_cycles as usize;
    for row in 0..shared.buffer.row_count() {
        let Ok(content) = shared.buffer.get_row(row) else {
            continue;
        };
        if content.is_empty() && shared.last_written[row].is_none() {
            continue;
        }
        let window = shared.engine.advance(row, content, width, pause);
        let line = shared.render(&window);
        if shared.last_written[row].as_deref() == Some(line.as_str()) {
            continue;
        }
        trace!("row {}: [{}]", row, line);
        match surface.write_line(row, &line) {
            Ok(()) => shared.last_written[row] = Some(line),
            Err(e) => {
                warn!("row {} write failed: {}", row, e);
                shared.last_written[row] = None;
            }
        }
    }
    shared.settings.tick_interval()
}

/// Scrolling text on a character LCD
///
/// Owns the text buffer, per-row scroll state, runtime settings and the
/// display surface. The caller side sets rows and settings; a background tick
/// task started with [`ScrollingLcd::start_scrolling`] renders them.
pub struct ScrollingLcd {
    shared: Arc<TokMutex<ScrollShared>>,
    surface: Arc<TokMutex<BoxedSurface>>,
    scheduler: TickScheduler,
    rows: usize,
}

impl ScrollingLcd {
    /// Row count comes from the surface geometry and is fixed from here on
    pub fn new(surface: BoxedSurface, settings: DisplaySettings) -> Self {
        let rows = surface.geometry().rows;
        Self {
            shared: Arc::new(TokMutex::new(ScrollShared::new(rows, settings))),
            surface: Arc::new(TokMutex::new(surface)),
            scheduler: TickScheduler::new(),
            rows,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub async fn settings(&self) -> DisplaySettings {
        self.shared.lock().await.settings
    }

    /// Run the controller bring-up
    pub async fn initialize(&self) -> Result<(), LcdError> {
        let mut shared = self.shared.lock().await;
        let mut surface = self.surface.lock().await;
        surface.init()?;
        shared.forget_written();
        info!("LCD initialized, {} rows x {}", self.rows, shared.settings.width);
        Ok(())
    }

    /// Replace the text for `row`; it shows up on the next tick
    pub async fn set_row(&self, row: usize, text: impl Into<String>) -> Result<(), LcdError> {
        self.shared.lock().await.set_row(row, text.into())
    }

    pub async fn get_row(&self, row: usize) -> Result<String, LcdError> {
        Ok(self.shared.lock().await.buffer.get_row(row)?.to_string())
    }

    /// Set `row` and write its head immediately, without waiting for a tick
    pub async fn display_line(&self, row: usize, text: impl Into<String>) -> Result<(), LcdError> {
        let mut shared = self.shared.lock().await;
        let text = text.into();
        shared.set_row(row, text.clone())?;
        let line = shared.render(&text);

        let mut surface = self.surface.lock().await;
        match surface.write_line(row, &line) {
            Ok(()) => shared.last_written[row] = Some(line),
            Err(e) => {
                warn!("row {} write failed: {}", row, e);
                shared.last_written[row] = None;
            }
        }
        Ok(())
    }

    /// Change the window width; every row restarts its cycle
    pub async fn set_width(&self, width: usize) -> Result<(), LcdError> {
        if width == 0 {
            return Err(LcdError::InvalidGeometry("width must be > 0".into()));
        }
        let mut shared = self.shared.lock().await;
        shared.settings.width = width;
        shared.engine.reset_all();
        shared.forget_written();
        debug!("width set to {}", width);
        Ok(())
    }

    /// Ticks per second, clamped to 1..=20; returns the value in effect
    pub async fn set_scroll_speed(&self, speed: u32) -> u32 {
        let applied = self.shared.lock().await.settings.set_scroll_speed(speed);
        debug!("scroll speed {}", applied);
        applied
    }

    pub async fn set_pause_cycles(&self, cycles: u32) {
        self.shared.lock().await.settings.pause_cycles = cycles;
    }

    /// Skip character translation entirely
    pub async fn set_raw_mode(&self, raw: bool) {
        self.shared.lock().await.settings.raw_mode = raw;
    }

    /// Native ROM umlauts when `native`, spelled out otherwise
    pub async fn display_umlauts(&self, native: bool) {
        self.shared.lock().await.settings.umlaut_mode =
            if native { UmlautMode::Native } else { UmlautMode::Ascii };
    }

    pub async fn set_backlight(&self, enabled: bool) {
        let _shared = self.shared.lock().await;
        if let Err(e) = self.surface.lock().await.set_backlight(enabled) {
            warn!("backlight {} failed: {}", if enabled { "on" } else { "off" }, e);
        }
    }

    pub async fn enable_backlight(&self) {
        self.set_backlight(true).await
    }

    pub async fn disable_backlight(&self) {
        self.set_backlight(false).await
    }

    /// Blank the panel; buffered text is kept and redrawn by the next tick
    pub async fn clear(&self) {
        let mut shared = self.shared.lock().await;
        if let Err(e) = self.surface.lock().await.clear() {
            warn!("clear failed: {}", e);
        }
        shared.forget_written();
    }

    pub async fn scroll_state(&self, row: usize) -> Option<ScrollState> {
        self.shared.lock().await.engine.state(row)
    }

    /// Run a single tick on the calling task
    pub async fn tick_once(&self) {
        tick(&self.shared, &self.surface).await;
    }

    pub fn start_scrolling(&mut self) {
        let shared = Arc::clone(&self.shared);
        let surface = Arc::clone(&self.surface);
        self.scheduler.start(move || {
            let shared = Arc::clone(&shared);
            let surface = Arc::clone(&surface);
            async move { tick(&shared, &surface).await }
        });
    }

    /// Stop the tick task; no writes happen after this returns
    pub async fn stop_scrolling(&mut self) {
        self.scheduler.stop().await;
    }

    pub fn is_scrolling(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop scrolling, blank the panel, and release the hardware
    pub async fn shutdown(&mut self) -> Result<(), LcdError> {
        self.stop_scrolling().await;
        let mut shared = self.shared.lock().await;
        let mut surface = self.surface.lock().await;
        if let Err(e) = surface.clear() {
            warn!("clear failed: {}", e);
        }
        if let Err(e) = surface.set_backlight(false) {
            warn!("backlight off failed: {}", e);
        }
        shared.buffer.clear();
        shared.engine.reset_all();
        shared.forget_written();
        surface.shutdown()?;
        info!("LCD shut down");
        Ok(())
    }
}
