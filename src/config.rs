/*
 *  config.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration with CLI overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::charmap::{transform_umlaut_mode, UmlautMode};
use crate::scroll::settings::{DEFAULT_PAUSE_CYCLES, DEFAULT_SCROLL_SPEED, DEFAULT_WIDTH};

pub const DEFAULT_ROWS: usize = 2;
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
/// Most backpacks ship at 0x27, the rest at 0x3F
pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;
pub const DEFAULT_MPD_HOST: &str = "localhost";
pub const DEFAULT_MPD_PORT: u16 = 6600;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub player: Option<PlayerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub rows: Option<usize>,        // 2 or 4
    pub width: Option<usize>,
    pub scroll_speed: Option<u32>,  // ticks per second, clamped 1..=20 at runtime
    pub pause_cycles: Option<u32>,
    pub umlauts: Option<UmlautMode>,
    pub raw_mode: Option<bool>,
    pub bus: Option<BusConfig>,     // <- i2c backpack or parallel gpio wiring
}

impl DisplayConfig {
    pub fn rows(&self) -> usize {
        self.rows.unwrap_or(DEFAULT_ROWS)
    }

    pub fn width(&self) -> usize {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn scroll_speed(&self) -> u32 {
        self.scroll_speed.unwrap_or(DEFAULT_SCROLL_SPEED)
    }

    pub fn pause_cycles(&self) -> u32 {
        self.pause_cycles.unwrap_or(DEFAULT_PAUSE_CYCLES)
    }

    pub fn umlauts(&self) -> UmlautMode {
        self.umlauts.unwrap_or_default()
    }

    pub fn raw_mode(&self) -> bool {
        self.raw_mode.unwrap_or(false)
    }

    pub fn driver(&self) -> DriverKind {
        self.driver.unwrap_or(DriverKind::I2c)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub poll_interval_ms: Option<u64>,
}

impl PlayerConfig {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_MPD_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MPD_PORT)
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS)
    }
}

impl Config {
    /// Display section, or all defaults when absent
    pub fn display_or_default(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn player_or_default(&self) -> PlayerConfig {
        self.player.clone().unwrap_or_default()
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "mpdlcd", about = "MPD now-playing on a character LCD", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Debug logging (same as --log-level debug)
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Display wiring: i2c | gpio | mock
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long)]
    pub rows: Option<usize>,
    #[arg(long)]
    pub width: Option<usize>,
    /// Scroll ticks per second (1-20)
    #[arg(short = 's', long)]
    pub scroll_speed: Option<u32>,
    #[arg(long)]
    pub pause_cycles: Option<u32>,
    /// native | ascii
    #[arg(long)]
    pub umlauts: Option<String>,
    #[arg(long, action = ArgAction::Set)]
    pub raw_mode: Option<bool>,
    /// I2C bus device path (e.g., /dev/i2c-1)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    /// I2C backpack address, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_address)]
    pub i2c_address: Option<u8>,
    #[arg(short = 'H', long)]
    pub mpd_host: Option<String>,
    #[arg(short = 'p', long)]
    pub mpd_port: Option<u16>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", s, e))
}

/// Public entry point: read YAML, merge `cli` over it, validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/mpdlcd/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/mpdlcd/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/mpdlcd.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["mpdlcd.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    // player
    match (&mut dst.player, src.player) {
        (None, Some(c)) => dst.player = Some(c),
        (Some(d), Some(s)) => merge_player(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()       { dst.driver = src.driver; }
    if src.rows.is_some()         { dst.rows = src.rows; }
    if src.width.is_some()        { dst.width = src.width; }
    if src.scroll_speed.is_some() { dst.scroll_speed = src.scroll_speed; }
    if src.pause_cycles.is_some() { dst.pause_cycles = src.pause_cycles; }
    if src.umlauts.is_some()      { dst.umlauts = src.umlauts; }
    if src.raw_mode.is_some()     { dst.raw_mode = src.raw_mode; }
    if src.bus.is_some()          { dst.bus = src.bus; }
}

fn merge_player(dst: &mut PlayerConfig, src: PlayerConfig) {
    if src.host.is_some()             { dst.host = src.host; }
    if src.port.is_some()             { dst.port = src.port; }
    if src.poll_interval_ms.is_some() { dst.poll_interval_ms = src.poll_interval_ms; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    } else if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.driver.is_some()       { display.driver = cli.driver; }
    if cli.rows.is_some()         { display.rows = cli.rows; }
    if cli.width.is_some()        { display.width = cli.width; }
    if cli.scroll_speed.is_some() { display.scroll_speed = cli.scroll_speed; }
    if cli.pause_cycles.is_some() { display.pause_cycles = cli.pause_cycles; }
    if let Some(mode) = cli.umlauts.as_deref() {
        display.umlauts = Some(transform_umlaut_mode(mode));
    }
    if cli.raw_mode.is_some()     { display.raw_mode = cli.raw_mode; }

    if cli.i2c_bus.is_some() || cli.i2c_address.is_some() {
        let (bus, address) = match display.bus.take() {
            Some(BusConfig::I2c { bus, address }) => (bus, address),
            _ => (DEFAULT_I2C_BUS.to_string(), DEFAULT_I2C_ADDRESS),
        };
        display.bus = Some(BusConfig::I2c {
            bus: cli.i2c_bus.clone().unwrap_or(bus),
            address: cli.i2c_address.unwrap_or(address),
        });
    }

    if cli.mpd_host.is_some() || cli.mpd_port.is_some() {
        let player = cfg.player.get_or_insert_with(PlayerConfig::default);
        if cli.mpd_host.is_some() { player.host = cli.mpd_host.clone(); }
        if cli.mpd_port.is_some() { player.port = cli.mpd_port; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if let Some(rows) = display.rows {
            if rows != 2 && rows != 4 {
                return Err(ConfigError::Validation("display rows must be 2|4".into()));
            }
        }
        if display.width == Some(0) {
            return Err(ConfigError::Validation("display width must be > 0".into()));
        }
        match (display.driver, display.bus.as_ref()) {
            (Some(DriverKind::I2c), Some(BusConfig::Gpio(_)))
            | (Some(DriverKind::Gpio), Some(BusConfig::I2c { .. })) => {
                return Err(ConfigError::Validation(
                    "display driver and bus type disagree".into(),
                ));
            }
            _ => {}
        }
    }
    if let Some(player) = cfg.player.as_ref() {
        if player.poll_interval_ms == Some(0) {
            return Err(ConfigError::Validation("player poll_interval_ms must be > 0".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x27 (I2C addresses are 7-bit, stored in u8)
    },
    Gpio(GpioPins),
}

/// BCM pin numbers for a parallel wired panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioPins {
    pub rs: u64,
    pub e: u64,
    pub d4: u64,
    pub d5: u64,
    pub d6: u64,
    pub d7: u64,
    pub backlight: u64,
}

impl Default for GpioPins {
    fn default() -> Self {
        Self {
            rs: 7,
            e: 8,
            d4: 25,
            d5: 24,
            d6: 23,
            d7: 18,
            backlight: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    I2c,
    Gpio,
    Mock,
}
