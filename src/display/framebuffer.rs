/*
 *  display/framebuffer.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized BGRA pixel buffer handed to display surfaces
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

use super::color::Color;

/// Bytes per pixel: B, G, R, A.
pub const BYTES_PER_PIXEL: usize = 4;

/// A runtime-sized pixel buffer, 4 bytes per pixel in B,G,R,A order with
/// premultiplied alpha, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    buf: Vec<u8>,
    w: u32,
    h: u32,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut fb = Self { buf: Vec::new(), w: 0, h: 0 };
        fb.resize(width, height, fill);
        fb
    }

    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    /// Returns the dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) { (self.w, self.h) }

    /// Immutable raw access, `width * height * 4` bytes
    pub fn as_bytes(&self) -> &[u8] { &self.buf }

    /// Reshape to `width x height`, reusing the allocation, and clear to `fill`.
    pub fn resize(&mut self, width: u32, height: u32, fill: Color) {
        self.w = width;
        self.h = height;
        self.buf.resize(width as usize * height as usize * BYTES_PER_PIXEL, 0);
        self.clear(fill);
    }

    /// Clear to a color
    pub fn clear(&mut self, color: Color) {
        let px = color.to_bgra_premultiplied();
        for chunk in self.buf.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Map (x,y) to byte offset; returns None if out of bounds
    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.w && y < self.h {
            return Some((y as usize * self.w as usize + x as usize) * BYTES_PER_PIXEL);
        }
        None
    }

    /// Raw B,G,R,A bytes at (x,y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.buf[i..i + BYTES_PER_PIXEL]);
        Some(px)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.buf[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_bgra_premultiplied());
        }
    }

    /// Fill the half-open rectangle `[x0,x1) x [y0,y1)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Color) {
        let x1 = x1.min(self.w);
        let y1 = y1.min(self.h);
        if x0 >= x1 || y0 >= y1 { return; }

        let px = color.to_bgra_premultiplied();
        let stride = self.w as usize * BYTES_PER_PIXEL;
        let (a, b) = (x0 as usize * BYTES_PER_PIXEL, x1 as usize * BYTES_PER_PIXEL);
        for row in y0 as usize..y1 as usize {
            let base = row * stride;
            for chunk in self.buf[base + a..base + b].chunks_exact_mut(BYTES_PER_PIXEL) {
                chunk.copy_from_slice(&px);
            }
        }
    }

    /// Iterate pixels as B,G,R,A quads, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.buf.chunks_exact(BYTES_PER_PIXEL).map(|c| [c[0], c[1], c[2], c[3]])
    }
}
