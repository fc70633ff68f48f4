/*
 *  display/error.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the display subsystem
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

use std::fmt;
use std::error::Error;

/// Unified error type for all display surface operations
#[derive(Debug)]
pub enum DisplayError {
    /// Hardware initialization failed
    InitializationFailed(String),

    /// I2C communication error
    I2cError(String),

    /// GPIO pin error
    GpioError(String),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Row outside the panel geometry
    RowOutOfRange { row: usize, rows: usize },

    /// Surface used before `init()` or after `shutdown()`
    NotInitialized,

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Display initialization failed: {}", msg),
            DisplayError::I2cError(msg) =>
                write!(f, "I2C communication error: {}", msg),
            DisplayError::GpioError(msg) =>
                write!(f, "GPIO error: {}", msg),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::RowOutOfRange { row, rows } =>
                write!(f, "Row {} out of range (display has {} rows)", row, rows),
            DisplayError::NotInitialized =>
                write!(f, "Display surface is not initialized"),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {}

// Conversion from Linux I2C errors
impl From<linux_embedded_hal::I2CError> for DisplayError {
    fn from(err: linux_embedded_hal::I2CError) -> Self {
        DisplayError::I2cError(format!("{:?}", err))
    }
}

/// Factory error types
#[derive(Debug)]
pub enum SurfaceFactoryError {
    /// No bus configuration specified
    NoBusConfiguration,

    /// Driver kind and bus wiring disagree
    UnsupportedCombination,

    /// Display surface initialization failed
    DriverInitFailed(DisplayError),

    /// Configuration validation error
    ConfigError(String),
}

impl fmt::Display for SurfaceFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceFactoryError::NoBusConfiguration =>
                write!(f, "No bus configuration specified"),
            SurfaceFactoryError::UnsupportedCombination =>
                write!(f, "Unsupported driver/bus combination"),
            SurfaceFactoryError::DriverInitFailed(err) =>
                write!(f, "Driver initialization failed: {}", err),
            SurfaceFactoryError::ConfigError(msg) =>
                write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for SurfaceFactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SurfaceFactoryError::DriverInitFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DisplayError> for SurfaceFactoryError {
    fn from(err: DisplayError) -> Self {
        SurfaceFactoryError::DriverInitFailed(err)
    }
}
