/*
 *  player/mpd.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Minimal async MPD protocol client
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
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::player::PlayerError;

const GREETING: &str = "OK MPD ";

const RETRY_INITIAL: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(6);
const RETRY_FACTOR: f64 = 1.5;

/// Line oriented MPD client, just enough for status polling
pub struct MpdClient<S = TcpStream> {
    stream: BufStream<S>,
    version: String,
}

impl MpdClient<TcpStream> {
    pub async fn connect(host: &str, port: u16) -> Result<Self, PlayerError> {
        let stream = TcpStream::connect((host, port)).await?;
        let client = Self::handshake(stream).await?;
        info!("connected to mpd {} at {}:{}", client.version(), host, port);
        Ok(client)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> MpdClient<S> {
    /// Wrap an open stream and consume the server greeting
    pub async fn handshake(stream: S) -> Result<Self, PlayerError> {
        let mut stream = BufStream::new(stream);
        let mut line = String::new();
        if stream.read_line(&mut line).await? == 0 {
            return Err(PlayerError::Closed);
        }
        let version = line
            .trim_end()
            .strip_prefix(GREETING)
            .ok_or_else(|| PlayerError::Protocol(format!("unexpected greeting: {}", line.trim_end())))?
            .to_string();
        Ok(Self { stream, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    async fn read_line(&mut self) -> Result<String, PlayerError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line).await? == 0 {
            return Err(PlayerError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Send `cmd` and collect the `key: value` response lines up to `OK`
    pub async fn command(&mut self, cmd: &str) -> Result<Vec<(String, String)>, PlayerError> {
        debug!("mpd > {}", cmd);
        self.stream.write_all(cmd.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;

        let mut pairs = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == "OK" {
                return Ok(pairs);
            }
            if let Some(ack) = line.strip_prefix("ACK ") {
                return Err(PlayerError::Ack(ack.to_string()));
            }
            match line.split_once(": ") {
                Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
                None => return Err(PlayerError::Protocol(format!("malformed line: {}", line))),
            }
        }
    }

    /// Response fields keyed by lower-cased name; later duplicates win
    async fn command_map(&mut self, cmd: &str) -> Result<HashMap<String, String>, PlayerError> {
        Ok(self
            .command(cmd)
            .await?
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect())
    }

    pub async fn status(&mut self) -> Result<HashMap<String, String>, PlayerError> {
        self.command_map("status").await
    }

    pub async fn current_song(&mut self) -> Result<HashMap<String, String>, PlayerError> {
        self.command_map("currentsong").await
    }

    /// Polite goodbye; errors are irrelevant at this point
    pub async fn close(mut self) {
        let _ = self.stream.write_all(b"close\n").await;
        let _ = self.stream.flush().await;
    }
}

/// Reconnect delays: 1 s, growing by half each attempt, never above 6 s
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { next: RETRY_INITIAL }
    }
}

impl Backoff {
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.mul_f64(RETRY_FACTOR).min(RETRY_MAX);
        delay
    }
}

/// Keep trying to reach mpd until it answers or `shutdown_token` fires
pub async fn connect_with_retry(
    host: &str,
    port: u16,
    shutdown_token: &CancellationToken,
) -> Option<MpdClient<TcpStream>> {
    let mut backoff = Backoff::default();
    loop {
        match MpdClient::connect(host, port).await {
            Ok(client) => return Some(client),
            Err(e) => {
                let delay = backoff.next_delay();
                warn!("couldn't connect to mpd at {}:{} ({}), trying again in {:.1}s", host, port, e, delay.as_secs_f64());
                tokio::select! {
                    _ = shutdown_token.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {},
                }
            }
        }
    }
}
