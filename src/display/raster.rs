/*
 *  display/raster.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Resample irregular sweep rows onto a fixed pixel grid
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

use log::trace;
use thiserror::Error;

use super::color::Color;
use super::framebuffer::PixelBuffer;
use super::gradient::{ColorGradient, GradientSpec};
use crate::sweep::{Row, Sample};

/// Geometry of one render pass: raster size plus the visible frequency window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub freq_min: f64,
    pub freq_max: f64,
    pub displayed_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewportError {
    #[error("viewport has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frequency window is empty: freq_max {max} <= freq_min {min}")]
    EmptyFrequencyWindow { min: f64, max: f64 },
}

impl Viewport {
    /// Check the caller-side preconditions of [`Rasterizer::render`].
    ///
    /// `render` itself never clamps a bad frequency window; it produces
    /// unspecified columns instead, so callers validate first.
    pub fn validate(&self) -> Result<(), ViewportError> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(ViewportError::Empty { width: self.pixel_width, height: self.pixel_height });
        }
        if self.freq_min.is_nan() || self.freq_max.is_nan() || self.freq_max <= self.freq_min {
            return Err(ViewportError::EmptyFrequencyWindow { min: self.freq_min, max: self.freq_max });
        }
        Ok(())
    }

    #[inline]
    fn freq_to_x(&self, freq: f64) -> f64 {
        let width = self.pixel_width as f64;
        ((freq - self.freq_min) / (self.freq_max - self.freq_min) * width).clamp(0.0, width)
    }

    /// Pixel columns `[x_start, x_end)` covered by a frequency span, or None
    /// when the span misses the visible window.
    ///
    /// The window test is half-open: a span that only touches `freq_min` or
    /// `freq_max` at a single point counts as outside, so no forced column is
    /// painted at either edge.
    fn columns(&self, start: f64, end: f64) -> Option<(u32, u32)> {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        if hi <= self.freq_min || lo >= self.freq_max {
            return None;
        }
        let x_start = self.freq_to_x(lo).floor() as u32;
        let mut x_end = self.freq_to_x(hi).floor() as u32;
        if x_start >= self.pixel_width {
            return None;
        }
        if x_start >= x_end {
            x_end = x_start + 1;
        }
        Some((x_start, x_end))
    }
}

/// Frequency span `[start, end)` attributed to `samples[j]`.
///
/// The last sample mirrors the previous gap; a lone sample runs to
/// `freq_max`.
pub fn sample_span(samples: &[Sample], j: usize, freq_max: f64) -> (f64, f64) {
    let start = samples[j].frequency;
    let end = match (samples.get(j + 1), j.checked_sub(1).and_then(|i| samples.get(i))) {
        (Some(next), _) => next.frequency,
        (None, Some(prev)) => 2.0 * start - prev.frequency,
        (None, None) => freq_max,
    };
    (start, end)
}

/// Pixel rows `[y_start, y_end)` of strip `index` when `height` is split into
/// `strips` bands; the bands tile the height exactly.
pub fn strip_bounds(index: u32, strips: u32, height: u32) -> (u32, u32) {
    // floor(i * height / strips) in exact integer arithmetic
    let edge = |i: u32| (i as u64 * height as u64 / strips.max(1) as u64) as u32;
    let y_end = if index + 1 >= strips { height } else { edge(index + 1) };
    (edge(index).min(height), y_end.min(height))
}

/// Turns a history snapshot into a heatmap raster.
///
/// Every pass recomputes all visible rows, O(rows x samples); nothing is
/// cached between frames.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    background: Color,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self { background: Color::BLACK }
    }
}

impl Rasterizer {
    pub fn new(background: Color) -> Self {
        Self { background }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Render into a freshly allocated buffer.
    ///
    /// Returns None, writing nothing, when the viewport has no pixels or the
    /// snapshot holds no rows.
    pub fn render(&self, snapshot: &[Row], gradient: &GradientSpec, viewport: &Viewport) -> Option<PixelBuffer> {
        let mut target = PixelBuffer::new(0, 0, self.background);
        self.render_into(&mut target, snapshot, gradient, viewport).then_some(target)
    }

    /// Render into an exclusively owned buffer, resizing it to the viewport.
    ///
    /// Returns false and leaves `target` untouched under the same conditions
    /// where [`Rasterizer::render`] returns None.
    pub fn render_into(
        &self,
        target: &mut PixelBuffer,
        snapshot: &[Row],
        gradient: &GradientSpec,
        viewport: &Viewport,
    ) -> bool {
        let (width, height) = (viewport.pixel_width, viewport.pixel_height);
        if width < 1 || height < 1 || snapshot.is_empty() {
            return false;
        }

        let rows_to_draw = viewport
            .displayed_rows
            .min(height)
            .min(u32::try_from(snapshot.len()).unwrap_or(u32::MAX));
        let visible = &snapshot[snapshot.len() - rows_to_draw as usize..];

        target.resize(width, height, self.background);
        if rows_to_draw == 0 {
            return true;
        }

        let gradient = ColorGradient::new(*gradient);
        let mut painted = 0usize;
        // oldest visible row on top, newest at the bottom
        for (index, row) in visible.iter().enumerate() {
            let (y_start, y_end) = strip_bounds(index as u32, rows_to_draw, height);
            painted += paint_row(target, row, &gradient, viewport, y_start, y_end);
        }
        trace!("raster: {rows_to_draw} rows, {painted} spans into {width}x{height}");
        true
    }
}

/// Paint one row into its strip; returns the number of spans drawn.
fn paint_row(
    target: &mut PixelBuffer,
    row: &Row,
    gradient: &ColorGradient,
    viewport: &Viewport,
    y_start: u32,
    y_end: u32,
) -> usize {
    let samples = row.samples();
    let mut painted = 0;
    for (j, sample) in samples.iter().enumerate() {
        let (start, end) = sample_span(samples, j, viewport.freq_max);
        let Some((x_start, x_end)) = viewport.columns(start, end) else {
            continue;
        };
        target.fill_rect(x_start, y_start, x_end, y_end, gradient.color_for(sample.power));
        painted += 1;
    }
    painted
}

/// Render with a black background.
pub fn render(snapshot: &[Row], gradient: &GradientSpec, viewport: &Viewport) -> Option<PixelBuffer> {
    Rasterizer::default().render(snapshot, gradient, viewport)
}
