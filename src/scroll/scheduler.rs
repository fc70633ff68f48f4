/*
 *  scroll/scheduler.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cancellable periodic tick task
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

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs a tick closure on a background task until stopped
///
/// Each tick returns the delay before the next one, so a speed change takes
/// effect from the following tick. Cancellation is only observed while
/// sleeping between ticks: a tick in progress always completes.
#[derive(Default)]
pub struct TickScheduler {
    shutdown_token: Option<CancellationToken>,
    task_handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the tick loop; a no-op if it is already running
    pub fn start<F, Fut>(&mut self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Duration> + Send + 'static,
    {
        if self.is_running() {
            debug!("tick scheduler already running");
            return;
        }

        let shutdown_token = CancellationToken::new();
        let token = shutdown_token.clone();
        self.task_handle = Some(tokio::spawn(async move {
            debug!("tick task started");
            loop {
                let interval = tick().await;
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {},
                }
            }
            debug!("tick task finished");
        }));
        self.shutdown_token = Some(shutdown_token);
        info!("scrolling started");
    }

    /// Cancel the tick loop and wait for it; a no-op when not running
    pub async fn stop(&mut self) {
        let Some(token) = self.shutdown_token.take() else {
            debug!("tick scheduler not running");
            return;
        };
        token.cancel();
        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                debug!("tick task ended abnormally: {}", e);
            }
        }
        info!("scrolling stopped");
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(token) = self.shutdown_token.take() {
            token.cancel();
        }
    }
}
