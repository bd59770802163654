/*
 *  display/gradient.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Power to color mapping, interpolated in HSL space
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

use super::color::{Color, Hsl, rgb_to_hsl};

/// Domain of the power to color mapping.
///
/// `min_power >= max_power` is a valid (degenerate) range: every power at or
/// below `min_power` maps to `min_color`, everything else to `max_color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientSpec {
    pub min_power: f64,
    pub max_power: f64,
    pub min_color: Color,
    pub max_color: Color,
}

impl GradientSpec {
    pub fn new(min_power: f64, max_power: f64, min_color: Color, max_color: Color) -> Self {
        Self { min_power, max_power, min_color, max_color }
    }

    pub fn is_degenerate(&self) -> bool {
        self.max_power - self.min_power <= 0.0
    }
}

/// Color for `power` under `spec`.
///
/// Endpoints are returned untouched; only the interior goes through HSL.
pub fn color_for_power(power: f64, spec: &GradientSpec) -> Color {
    ColorGradient::new(*spec).color_for(power)
}

/// A [`GradientSpec`] with its endpoint HSL values resolved once.
///
/// The rasterizer colors every sample of every row, so the endpoint
/// conversion is hoisted out of the per-sample path.
#[derive(Debug, Clone, Copy)]
pub struct ColorGradient {
    spec: GradientSpec,
    start: Hsl,
    end: Hsl,
}

impl ColorGradient {
    pub fn new(spec: GradientSpec) -> Self {
        Self {
            spec,
            start: rgb_to_hsl(spec.min_color),
            end: rgb_to_hsl(spec.max_color),
        }
    }

    pub fn spec(&self) -> &GradientSpec {
        &self.spec
    }

    pub fn color_for(&self, power: f64) -> Color {
        let spec = &self.spec;
        let range = spec.max_power - spec.min_power;

        if range <= 0.0 {
            return if power <= spec.min_power { spec.min_color } else { spec.max_color };
        }
        if power <= spec.min_power {
            return spec.min_color;
        }
        if power >= spec.max_power {
            return spec.max_color;
        }

        // NaN power falls through both guards; clamp keeps it NaN and the
        // byte casts below saturate, so it still yields a color
        let t = ((power - spec.min_power) / range).clamp(0.0, 1.0);
        self.start.lerp(&self.end, t).to_color()
    }
}

impl From<GradientSpec> for ColorGradient {
    fn from(spec: GradientSpec) -> Self {
        ColorGradient::new(spec)
    }
}
