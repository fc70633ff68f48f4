/*
 *  display/mod.rs
 *
 *  mpdlcd - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - character panels behind a single surface trait
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;
pub mod charmap;

// Display surfaces (hardware wirings are feature gated inside)
pub mod drivers;

// Re-exports for convenience
pub use traits::{DisplaySurface, Geometry, BoxedSurface};
pub use error::{DisplayError, SurfaceFactoryError};
pub use factory::SurfaceFactory;
pub use charmap::UmlautMode;
pub use drivers::mock::{MockSurface, MockSurfaceState};
