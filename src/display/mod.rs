/*
 *  display/mod.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - colors, gradient, rasterizer and surfaces
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
pub mod framebuffer;

// Color handling
pub mod color;
pub mod gradient;

// Heatmap rasterization
pub mod raster;

// Output surfaces
pub mod drivers;

// Re-exports for convenience
pub use traits::Surface;
pub use error::DisplayError;
pub use framebuffer::PixelBuffer;
pub use color::{Color, ColorError, Hsl, hsl_to_color, hue_to_rgb, rgb_to_hsl};
pub use gradient::{ColorGradient, GradientSpec, color_for_power};
pub use raster::{Rasterizer, Viewport, ViewportError, render};
