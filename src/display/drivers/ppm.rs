/*
 *  display/drivers/ppm.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless surface that writes each frame as a binary PPM image
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

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;
use crate::display::traits::Surface;

/// Writes the latest frame to `path`, replacing it atomically so an image
/// viewer polling the file never sees half a frame.
///
/// `present` does blocking file I/O on the calling task. The surface is meant
/// for low-rate headless output (a few frames per second at modest sizes);
/// keep `fps` low when pointing it at large frames.
#[derive(Debug)]
pub struct PpmSurface {
    width: u32,
    height: u32,
    path: PathBuf,
    frames: u64,
}

impl PpmSurface {
    pub fn new(width: u32, height: u32, path: impl Into<PathBuf>) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "surface must have pixels, got {}x{}", width, height
            )));
        }
        Ok(Self { width, height, path: path.into(), frames: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

/// Encode a BGRA frame as binary (P6) PPM, dropping alpha.
pub fn encode_ppm(frame: &PixelBuffer) -> Vec<u8> {
    let (w, h) = frame.dimensions();
    let header = format!("P6\n{} {}\n255\n", w, h);
    let mut out = Vec::with_capacity(header.len() + w as usize * h as usize * 3);
    out.extend_from_slice(header.as_bytes());
    for [b, g, r, _a] in frame.pixels() {
        out.extend_from_slice(&[r, g, b]);
    }
    out
}

impl Surface for PpmSurface {
    fn name(&self) -> &str {
        "ppm"
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_size(frame)?;
        let tmp = self.path.with_extension("ppm.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&encode_ppm(frame))?;
            file.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.frames += 1;
        debug!("ppm: frame {} written to {}", self.frames, self.path.display());
        Ok(())
    }
}
