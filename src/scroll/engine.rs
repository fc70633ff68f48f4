/*
 *  scroll/engine.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-row scroll state machine
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

use log::debug;

use crate::display::charmap::fit_to_width;

/// Stages of one scroll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Show the head of the text
    #[default]
    PauseStart,
    ScrollForward,
    /// Show the tail of the text
    PauseEnd,
    ScrollBackward,
}

impl Phase {
    /// Decode a stored discriminant; unknown values restart the cycle
    pub fn from_raw(raw: u8) -> Phase {
        match raw {
            0 => Phase::PauseStart,
            1 => Phase::ScrollForward,
            2 => Phase::PauseEnd,
            3 => Phase::ScrollBackward,
            other => {
                debug!("corrupt scroll phase {}, restarting cycle", other);
                Phase::PauseStart
            }
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }

    fn next(self) -> Phase {
        match self {
            Phase::PauseStart => Phase::ScrollForward,
            Phase::ScrollForward => Phase::PauseEnd,
            Phase::PauseEnd => Phase::ScrollBackward,
            Phase::ScrollBackward => Phase::PauseStart,
        }
    }

    fn is_pause(self) -> bool {
        matches!(self, Phase::PauseStart | Phase::PauseEnd)
    }
}

/// Where a row is in its scroll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    pub phase: Phase,
    pub progress: usize,
}

impl ScrollState {
    pub fn new(phase: Phase, progress: usize) -> Self {
        Self { phase, progress }
    }

    /// Rebuild from raw parts; a corrupt phase drops the progress too
    pub fn from_raw(phase: u8, progress: usize) -> Self {
        match phase {
            0..=3 => Self::new(Phase::from_raw(phase), progress),
            _ => Self::new(Phase::from_raw(phase), 0),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_reset(&self) -> bool {
        *self == Self::default()
    }

    fn advance_to(&mut self, phase: Phase) {
        self.phase = phase;
        self.progress = 0;
    }
}

fn window(content: &str, offset: usize, width: usize) -> String {
    content.chars().skip(offset).take(width).collect()
}

/// Compute the window for one tick and advance `state`
///
/// Text that fits is returned padded and leaves `state` alone. Longer text
/// walks PauseStart, ScrollForward, PauseEnd, ScrollBackward; the last unit
/// of each phase moves straight on to the next one, so a full cycle is
/// `pause + len_diff + pause + len_diff` ticks. A zero pause skips the pause
/// phases within the same tick.
pub fn step(content: &str, state: &mut ScrollState, width: usize, pause_cycles: usize) -> String {
    let len = content.chars().count();
    if len <= width {
        return fit_to_width(content, width);
    }
    let len_diff = len - width;

    if pause_cycles == 0 && state.phase.is_pause() {
        state.advance_to(state.phase.next());
    }

    match state.phase {
        Phase::PauseStart => {
            state.progress += 1;
            if state.progress >= pause_cycles {
                state.advance_to(Phase::ScrollForward);
            }
            window(content, 0, width)
        }
        Phase::ScrollForward => {
            state.progress = (state.progress + 1).min(len_diff);
            let offset = state.progress;
            if state.progress >= len_diff {
                state.advance_to(Phase::PauseEnd);
            }
            window(content, offset, width)
        }
        Phase::PauseEnd => {
            state.progress += 1;
            if state.progress >= pause_cycles {
                state.advance_to(Phase::ScrollBackward);
            }
            window(content, len_diff, width)
        }
        Phase::ScrollBackward => {
            state.progress = (state.progress + 1).min(len_diff);
            let offset = len_diff - state.progress;
            if state.progress >= len_diff {
                state.advance_to(Phase::PauseStart);
            }
            window(content, offset, width)
        }
    }
}

/// Scroll state for every row, plus whether each row fitted last time
#[derive(Debug, Clone)]
pub struct ScrollEngine {
    states: Vec<ScrollState>,
    fits: Vec<Option<bool>>,
}

impl ScrollEngine {
    pub fn new(row_count: usize) -> Self {
        Self {
            states: vec![ScrollState::default(); row_count],
            fits: vec![None; row_count],
        }
    }

    pub fn state(&self, row: usize) -> Option<ScrollState> {
        self.states.get(row).copied()
    }

    pub fn reset(&mut self, row: usize) {
        if let Some(state) = self.states.get_mut(row) {
            state.reset();
        }
        if let Some(fit) = self.fits.get_mut(row) {
            *fit = None;
        }
    }

    pub fn reset_all(&mut self) {
        for row in 0..self.states.len() {
            self.reset(row);
        }
    }

    /// Record new content for `row`, restarting its cycle when it crosses
    /// the fits/overflows boundary for `width`
    pub fn note_content(&mut self, row: usize, content: &str, width: usize) {
        let fits = content.chars().count() <= width;
        let Some(previous) = self.fits.get_mut(row) else {
            return;
        };
        if previous.is_some_and(|was| was != fits) {
            debug!("row {} now {}, scroll restarted", row, if fits { "fits" } else { "overflows" });
            self.states[row].reset();
        }
        *previous = Some(fits);
    }

    /// One tick for `row`; rows outside the engine render blank
    pub fn advance(&mut self, row: usize, content: &str, width: usize, pause_cycles: usize) -> String {
        if row >= self.states.len() {
            return fit_to_width("", width);
        }
        self.note_content(row, content, width);
        step(content, &mut self.states[row], width, pause_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BVSC: &str = "Buena Vista Social Club";

    fn run(content: &str, state: &mut ScrollState, ticks: usize, width: usize, pause: usize) -> Vec<String> {
        (0..ticks).map(|_| step(content, state, width, pause)).collect()
    }

    #[test]
    fn test_short_text_is_padded_and_static() {
        let mut state = ScrollState::default();
        for _ in 0..10 {
            assert_eq!(step("Hello", &mut state, 8, 5), "Hello   ");
            assert!(state.is_reset());
        }
    }

    #[test]
    fn test_exact_width_does_not_scroll() {
        let mut state = ScrollState::default();
        assert_eq!(step("0123456789abcdef", &mut state, 16, 5), "0123456789abcdef");
        assert!(state.is_reset());
    }

    #[test]
    fn test_buena_vista_scenario() {
        // 23 chars on a 16 wide panel: len_diff 7, period 5 + 7 + 5 + 7
        let mut state = ScrollState::default();
        let frames = run(BVSC, &mut state, 24, 16, 5);

        // ticks are 1-based in the comments, frames are 0-based
        for tick in 1..=5 {
            assert_eq!(frames[tick - 1], "Buena Vista Soci", "tick {}", tick);
        }
        // tick 6: first step forward
        assert_eq!(frames[5], "uena Vista Socia");
        // tick 12: tail reached
        assert_eq!(frames[11], "ista Social Club");
        for tick in 13..=17 {
            assert_eq!(frames[tick - 1], "ista Social Club", "tick {}", tick);
        }
        // tick 18: first step back
        assert_eq!(frames[17], "Vista Social Clu");
        assert_eq!(frames[23], "Buena Vista Soci");
        assert!(state.is_reset());

        // and the next cycle starts over with the head paused
        assert_eq!(step(BVSC, &mut state, 16, 5), "Buena Vista Soci");
        assert_eq!(state, ScrollState::new(Phase::PauseStart, 1));
    }

    #[test]
    fn test_phase_transitions_in_scenario() {
        let mut state = ScrollState::default();
        run(BVSC, &mut state, 5, 16, 5);
        assert_eq!(state, ScrollState::new(Phase::ScrollForward, 0));
        run(BVSC, &mut state, 1, 16, 5);
        assert_eq!(state, ScrollState::new(Phase::ScrollForward, 1));
        run(BVSC, &mut state, 6, 16, 5);
        assert_eq!(state, ScrollState::new(Phase::PauseEnd, 0));
        run(BVSC, &mut state, 6, 16, 5);
        assert_eq!(state, ScrollState::new(Phase::ScrollBackward, 1));
    }

    #[test]
    fn test_cycle_is_periodic() {
        for (content, width, pause) in [
            (BVSC, 16, 5),
            ("a considerably longer line of text to scroll", 20, 3),
            ("seventeen chars!!", 16, 1),
            ("Größe über alles, schön", 16, 2),
        ] {
            let len_diff = content.chars().count() - width;
            let period = 2 * pause + 2 * len_diff;
            let mut state = ScrollState::default();
            let first = run(content, &mut state, period, width, pause);
            assert!(state.is_reset(), "{} did not return to start", content);
            let second = run(content, &mut state, period, width, pause);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_zero_pause_skips_pause_phases() {
        let mut state = ScrollState::default();
        let frames = run("abcdefg", &mut state, 4, 5, 0);
        assert_eq!(frames, vec!["bcdef", "cdefg", "bcdef", "abcde"]);
        assert!(state.is_reset());
    }

    #[test]
    fn test_window_always_exact_width() {
        let contents = ["", "a", "abcd", "abcdefgh", "abcdefghijklmnop", "ÄÖÜ äöü ß ©£ çÇ ñÑ"];
        for content in contents {
            let mut state = ScrollState::default();
            for _ in 0..40 {
                assert_eq!(step(content, &mut state, 8, 2).chars().count(), 8);
            }
        }
    }

    #[test]
    fn test_progress_clamped_after_content_shrinks() {
        // content shrinks while still overflowing: offset never runs past the tail
        let mut state = ScrollState::new(Phase::ScrollForward, 7);
        let frame = step("abcdefghij", &mut state, 8, 5);
        assert_eq!(frame, "cdefghij");
        assert_eq!(state, ScrollState::new(Phase::PauseEnd, 0));
    }

    #[test]
    fn test_corrupt_phase_recovers() {
        assert_eq!(Phase::from_raw(9), Phase::PauseStart);
        assert_eq!(Phase::from_raw(2), Phase::PauseEnd);
        assert_eq!(ScrollState::from_raw(42, 7), ScrollState::default());
        assert_eq!(ScrollState::from_raw(1, 3), ScrollState::new(Phase::ScrollForward, 3));

        let mut state = ScrollState::from_raw(200, 11);
        assert_eq!(step(BVSC, &mut state, 16, 5), "Buena Vista Soci");
    }

    #[test]
    fn test_raw_round_trip_of_phase() {
        for phase in [Phase::PauseStart, Phase::ScrollForward, Phase::PauseEnd, Phase::ScrollBackward] {
            assert_eq!(Phase::from_raw(phase.as_raw()), phase);
        }
    }

    #[test]
    fn test_engine_resets_on_threshold_crossing() {
        let mut engine = ScrollEngine::new(2);
        for _ in 0..8 {
            engine.advance(0, BVSC, 16, 5);
        }
        assert_eq!(engine.state(0), Some(ScrollState::new(Phase::ScrollForward, 3)));

        // now fits: state resets and stays put
        assert_eq!(engine.advance(0, "Short", 16, 5), "Short           ");
        assert_eq!(engine.state(0), Some(ScrollState::default()));

        // overflowing again starts from the head
        assert_eq!(engine.advance(0, BVSC, 16, 5), "Buena Vista Soci");
        assert_eq!(engine.state(0), Some(ScrollState::new(Phase::PauseStart, 1)));
    }

    #[test]
    fn test_engine_keeps_state_while_overflowing() {
        let mut engine = ScrollEngine::new(1);
        for _ in 0..7 {
            engine.advance(0, BVSC, 16, 5);
        }
        let before = engine.state(0);
        engine.note_content(0, "Another overlong title here", 16);
        assert_eq!(engine.state(0), before);
    }

    #[test]
    fn test_engine_rows_are_independent() {
        let mut engine = ScrollEngine::new(2);
        engine.advance(0, BVSC, 16, 5);
        engine.advance(1, "fits", 16, 5);
        assert_eq!(engine.state(0), Some(ScrollState::new(Phase::PauseStart, 1)));
        assert_eq!(engine.state(1), Some(ScrollState::default()));
        assert_eq!(engine.advance(7, BVSC, 16, 5), " ".repeat(16));
    }
}
