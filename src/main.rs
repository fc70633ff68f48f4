/*
 *  main.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Daemon: follow mpd and show artist/title on a character LCD
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

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches};
use env_logger::Env;
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use mpdlcd::config::{self, Cli, PlayerConfig};
use mpdlcd::display::SurfaceFactory;
use mpdlcd::player::{connect_with_retry, MpdClient, PlaybackAdapter, ARTIST_ROW, TITLE_ROW};
use mpdlcd::scroll::DisplaySettings;
use mpdlcd::ScrollingLcd;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

// goodbye message stays up this long before the panel is cleared
const SHUTDOWN_HOLD: Duration = Duration::from_secs(3);

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Poll mpd until shutdown, reconnecting whenever the connection drops
async fn player_loop(
    lcd: &ScrollingLcd,
    player: &PlayerConfig,
    mut client: MpdClient<TcpStream>,
    shutdown_token: &CancellationToken,
) -> Result<()> {
    let interval = Duration::from_millis(player.poll_interval_ms());
    let mut adapter = PlaybackAdapter::new();

    loop {
        adapter.reset();
        loop {
            match PlaybackAdapter::poll(&mut client).await {
                Ok(playback) => adapter.apply(lcd, &playback).await?,
                Err(e) => {
                    warn!("lost mpd connection: {}", e);
                    break;
                }
            }
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    client.close().await;
                    return Ok(());
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        match connect_with_retry(player.host(), player.port(), shutdown_token).await {
            Some(reconnected) => client = reconnected,
            None => return Ok(()),
        }
    }
}

#[tokio::main] // Requires the `tokio` runtime with `macros` and `rt-multi-thread` features
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Cli::command()
        .after_help(format!("Build: v.{} {}", env!("CARGO_PKG_VERSION"), BUILD_DATE))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let cfg = config::load_from(&cli).context("loading configuration")?;
    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    // Initialize the logger, --debug wins over the configured level
    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display_cfg = cfg.display_or_default();
    let player_cfg = cfg.player_or_default();

    let surface = SurfaceFactory::create_from_config(&display_cfg)
        .context("creating display surface")?;
    let mut lcd = ScrollingLcd::new(surface, DisplaySettings::from_config(&display_cfg));
    lcd.initialize().await.context("initializing LCD")?;
    lcd.disable_backlight().await;
    lcd.set_scroll_speed(display_cfg.scroll_speed()).await;
    lcd.display_line(ARTIST_ROW, "LCD-Daemon on").await?;
    lcd.display_line(TITLE_ROW, "").await?;

    let shutdown_token = CancellationToken::new();
    {
        let token = shutdown_token.clone();
        tokio::spawn(async move {
            if let Err(e) = signal_handler().await {
                error!("signal handler failed: {}", e);
            }
            token.cancel();
        });
    }

    info!("connecting to mpd at {}:{}", player_cfg.host(), player_cfg.port());
    if let Some(client) = connect_with_retry(player_cfg.host(), player_cfg.port(), &shutdown_token).await {
        lcd.start_scrolling();
        if let Err(e) = player_loop(&lcd, &player_cfg, client, &shutdown_token).await {
            error!("player loop failed: {:#}", e);
        }
    }

    info!("Stopping daemon");
    lcd.stop_scrolling().await;
    lcd.display_line(ARTIST_ROW, "LCD-Daemon off").await?;
    lcd.display_line(TITLE_ROW, "").await?;
    lcd.disable_backlight().await;
    tokio::time::sleep(SHUTDOWN_HOLD).await;
    lcd.shutdown().await.context("shutting down LCD")?;

    Ok(())
}
