/*
 *  player/mod.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playback source: MPD client and now-playing glue
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

pub mod mpd;
pub mod song;

pub use mpd::{connect_with_retry, Backoff, MpdClient};
pub use song::{PlaybackState, SongInfo};

use log::info;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::lcd::{LcdError, ScrollingLcd};

/// Rows used for the now-playing text
pub const ARTIST_ROW: usize = 0;
pub const TITLE_ROW: usize = 1;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("mpd error: {0}")]
    Ack(String),
    #[error("connection closed")]
    Closed,
}

/// One poll's worth of player state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub song: SongInfo,
    pub playing: bool,
}

/// Feeds polled playback state into the LCD
///
/// Remembers what it last applied so the backlight is only switched, and a
/// track change only logged, when something actually changed.
#[derive(Debug, Default)]
pub struct PlaybackAdapter {
    last: Option<Playback>,
}

impl PlaybackAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask mpd for the current status and song
    pub async fn poll<S>(client: &mut MpdClient<S>) -> Result<Playback, PlayerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let status = client.status().await?;
        let song = client.current_song().await?;
        Ok(Playback {
            song: SongInfo::from_tags(&song),
            playing: PlaybackState::from_status(&status).is_playing(),
        })
    }

    /// Backlight follows play state, artist and title go to their rows
    pub async fn apply(&mut self, lcd: &ScrollingLcd, playback: &Playback) -> Result<(), LcdError> {
        let previous = self.last.as_ref();

        if previous.map(|p| p.playing) != Some(playback.playing) {
            info!("playback {}", if playback.playing { "started" } else { "paused" });
            lcd.set_backlight(playback.playing).await;
        }
        if previous.map(|p| &p.song) != Some(&playback.song) {
            info!("now playing {}", playback.song);
        }

        lcd.set_row(ARTIST_ROW, playback.song.artist.as_str()).await?;
        lcd.set_row(TITLE_ROW, playback.song.title.as_str()).await?;
        self.last = Some(playback.clone());
        Ok(())
    }

    /// Forget the applied state, e.g. after a reconnect
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockSurface;
    use crate::display::traits::Geometry;
    use crate::scroll::settings::DisplaySettings;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};

    #[tokio::test]
    async fn test_poll_builds_playback() {
        let (client, server) = duplex(4096);
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(server);
            let mut read = BufReader::new(read);
            write.write_all(b"OK MPD 0.23.5\n").await.unwrap();
            for reply in ["state: pause\nOK\n", "Title: Orishas - Represent\nOK\n"] {
                let mut cmd = String::new();
                read.read_line(&mut cmd).await.unwrap();
                write.write_all(reply.as_bytes()).await.unwrap();
            }
        });

        let mut client = MpdClient::handshake(client).await.unwrap();
        let playback = PlaybackAdapter::poll(&mut client).await.unwrap();
        assert_eq!(
            playback,
            Playback { song: SongInfo::new("Orishas", "Represent"), playing: false }
        );
    }

    #[tokio::test]
    async fn test_apply_sets_rows_and_backlight_once() {
        let surface = MockSurface::new(Geometry::new(2, 16));
        let state = surface.state();
        let lcd = ScrollingLcd::new(Box::new(surface), DisplaySettings::default());
        lcd.initialize().await.unwrap();

        let mut adapter = PlaybackAdapter::new();
        let playing = Playback { song: SongInfo::new("Omara Portuondo", "Veinte Años"), playing: true };
        adapter.apply(&lcd, &playing).await.unwrap();
        adapter.apply(&lcd, &playing).await.unwrap();

        assert_eq!(lcd.get_row(ARTIST_ROW).await.unwrap(), "Omara Portuondo");
        assert_eq!(lcd.get_row(TITLE_ROW).await.unwrap(), "Veinte Años");
        assert_eq!(state.lock().unwrap().backlight_history, vec![true]);

        let paused = Playback { playing: false, ..playing };
        adapter.apply(&lcd, &paused).await.unwrap();
        assert_eq!(state.lock().unwrap().backlight_history, vec![true, false]);

        adapter.reset();
        adapter.apply(&lcd, &paused).await.unwrap();
        assert_eq!(state.lock().unwrap().backlight_history, vec![true, false, false]);
    }
}
