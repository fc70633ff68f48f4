/*
 *  display/factory.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Build the configured display surface
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

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::mock::MockSurface;
use crate::display::error::SurfaceFactoryError;
use crate::display::traits::{BoxedSurface, Geometry};
use log::info;

#[cfg(feature = "driver-gpio")]
use crate::display::drivers::gpio::new_gpio;

#[cfg(feature = "driver-i2c")]
use crate::display::drivers::i2c::new_i2c;

/// Factory for creating display surfaces from configuration
pub struct SurfaceFactory;

impl SurfaceFactory {
    /// Create a display surface from configuration
    ///
    /// The driver kind picks the wiring; the bus section supplies the pins or
    /// the I2C device. `driver: mock` needs no bus. A gpio driver without a
    /// bus section uses the stock BCM wiring.
    ///
    /// The surface is returned un-initialized; `ScrollingLcd::initialize`
    /// runs the controller bring-up.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedSurface, SurfaceFactoryError> {
        let geometry = Geometry::new(config.rows(), config.width());
        let driver_kind = config.driver();

        if geometry.width == 0 || !matches!(geometry.rows, 2 | 4) {
            return Err(SurfaceFactoryError::ConfigError(format!(
                "unsupported geometry {}x{}",
                geometry.width, geometry.rows
            )));
        }

        info!("Creating {:?} surface {}x{}", driver_kind, geometry.width, geometry.rows);

        match (driver_kind, config.bus.as_ref()) {
            (DriverKind::Mock, _) => Ok(Box::new(MockSurface::new(geometry))),

            #[cfg(feature = "driver-i2c")]
            (DriverKind::I2c, Some(crate::config::BusConfig::I2c { bus, address })) => {
                Ok(Box::new(new_i2c(bus, *address, geometry)?))
            }

            #[cfg(feature = "driver-gpio")]
            (DriverKind::Gpio, Some(crate::config::BusConfig::Gpio(pins))) => {
                Ok(Box::new(new_gpio(pins, geometry)?))
            }

            #[cfg(feature = "driver-gpio")]
            (DriverKind::Gpio, None) => {
                Ok(Box::new(new_gpio(&crate::config::GpioPins::default(), geometry)?))
            }

            (DriverKind::I2c, None) => Err(SurfaceFactoryError::NoBusConfiguration),

            // Catch-all for unsupported combinations or disabled features
            _ => {
                #[cfg(not(feature = "driver-i2c"))]
                if driver_kind == DriverKind::I2c {
                    return Err(SurfaceFactoryError::ConfigError(
                        "I2C driver not enabled. Enable with --features driver-i2c".to_string(),
                    ));
                }

                #[cfg(not(feature = "driver-gpio"))]
                if driver_kind == DriverKind::Gpio {
                    return Err(SurfaceFactoryError::ConfigError(
                        "GPIO driver not enabled. Enable with --features driver-gpio".to_string(),
                    ));
                }

                Err(SurfaceFactoryError::UnsupportedCombination)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;

    #[test]
    fn test_mock_needs_no_bus() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            rows: Some(4),
            width: Some(20),
            ..Default::default()
        };
        let surface = SurfaceFactory::create_from_config(&config).unwrap();
        assert_eq!(*surface.geometry(), Geometry::new(4, 20));
    }

    #[test]
    fn test_i2c_without_bus_is_rejected() {
        let config = DisplayConfig {
            driver: Some(DriverKind::I2c),
            ..Default::default()
        };
        assert!(matches!(
            SurfaceFactory::create_from_config(&config),
            Err(SurfaceFactoryError::NoBusConfiguration)
        ));
    }

    #[test]
    fn test_mismatched_bus_is_unsupported() {
        let config = DisplayConfig {
            driver: Some(DriverKind::I2c),
            bus: Some(BusConfig::Gpio(Default::default())),
            ..Default::default()
        };
        assert!(SurfaceFactory::create_from_config(&config).is_err());
    }

    #[test]
    fn test_bad_geometry_is_rejected() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            rows: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            SurfaceFactory::create_from_config(&config),
            Err(SurfaceFactoryError::ConfigError(_))
        ));
    }
}
