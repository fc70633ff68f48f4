/*
 *  player/song.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Now-playing metadata derived from MPD tags
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

use std::collections::HashMap;
use std::fmt;

pub const UNKNOWN: &str = "Unknown";

/// What the panel shows for the current track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub artist: String,
    pub title: String,
}

impl Default for SongInfo {
    fn default() -> Self {
        Self {
            artist: UNKNOWN.to_string(),
            title: UNKNOWN.to_string(),
        }
    }
}

impl SongInfo {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// Build from `currentsong` tags (keys lower-cased)
    ///
    /// Streams often carry only a title of the form "Artist - Title"; that
    /// is split on the first separator. A bare title with no separator
    /// leaves both fields unknown.
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        let artist = tags.get("artist").filter(|a| !a.is_empty());
        let title = tags.get("title").filter(|t| !t.is_empty());

        match (artist, title) {
            (Some(artist), title) => Self::new(artist.as_str(), title.map_or(UNKNOWN, |t| t.as_str())),
            (None, Some(title)) => match title.split_once(" - ") {
                Some((artist, title)) => Self::new(artist.trim(), title.trim()),
                None => Self::default(),
            },
            (None, None) => Self::default(),
        }
    }
}

impl fmt::Display for SongInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.artist, self.title)
    }
}

/// Player state from the `state` field of `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Play,
    Pause,
    Stop,
    Unknown,
}

impl PlaybackState {
    pub fn from_status(status: &HashMap<String, String>) -> Self {
        match status.get("state").map(String::as_str) {
            Some("play") => PlaybackState::Play,
            Some("pause") => PlaybackState::Pause,
            Some("stop") => PlaybackState::Stop,
            _ => PlaybackState::Unknown,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlaybackState::Play
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_artist_and_title() {
        let song = SongInfo::from_tags(&tags(&[("artist", "Ibrahim Ferrer"), ("title", "Dos Gardenias")]));
        assert_eq!(song, SongInfo::new("Ibrahim Ferrer", "Dos Gardenias"));
    }

    #[test]
    fn test_no_tags_is_unknown() {
        assert_eq!(SongInfo::from_tags(&tags(&[("file", "x.flac")])), SongInfo::default());
        assert_eq!(SongInfo::default().artist, "Unknown");
    }

    #[test]
    fn test_artist_without_title() {
        let song = SongInfo::from_tags(&tags(&[("artist", "Orishas")]));
        assert_eq!(song, SongInfo::new("Orishas", UNKNOWN));
    }

    #[test]
    fn test_stream_title_split_on_first_separator() {
        let song = SongInfo::from_tags(&tags(&[("title", "Chucho Valdés - Mambo Influenciado - Live")]));
        assert_eq!(song, SongInfo::new("Chucho Valdés", "Mambo Influenciado - Live"));
    }

    #[test]
    fn test_title_without_separator() {
        let song = SongInfo::from_tags(&tags(&[("title", "Radio Rebelde")]));
        assert_eq!(song, SongInfo::new(UNKNOWN, UNKNOWN));
        assert_eq!(song, SongInfo::default());
    }

    #[test]
    fn test_playback_state() {
        assert!(PlaybackState::from_status(&tags(&[("state", "play")])).is_playing());
        assert_eq!(PlaybackState::from_status(&tags(&[("state", "pause")])), PlaybackState::Pause);
        assert_eq!(PlaybackState::from_status(&tags(&[("state", "stop")])), PlaybackState::Stop);
        assert_eq!(PlaybackState::from_status(&tags(&[])), PlaybackState::Unknown);
        assert!(!PlaybackState::Pause.is_playing());
    }

    #[test]
    fn test_display() {
        assert_eq!(SongInfo::new("A", "B").to_string(), "A: B");
    }
}
