/*
 *  lib.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scrolling frequency/power heatmap: sweep history, color gradient and
 *  rasterizer, plus the producer and render tasks that drive them
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

pub mod config;
pub mod display;
pub mod history;
pub mod pacer;
pub mod producer;
pub mod renderer;
pub mod sweep;

pub use config::{Cli, Config, ConfigError, GraphSettings, Settings, SourceKind};
pub use display::{Color, ColorGradient, GradientSpec, PixelBuffer, Rasterizer, Surface, Viewport};
pub use history::{HistoryBuffer, HistoryError};
pub use producer::{Producer, RandomSweep, SineSweep, SweepSource};
pub use renderer::{FrameOutcome, Renderer, draw_frame};
pub use sweep::{Row, Sample};
