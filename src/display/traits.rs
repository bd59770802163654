/*
 *  display/traits.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Surface abstraction the renderer blits finished frames onto
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

use crate::display::color::Color;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;

/// Minimal display surface - every output target implements this trait
///
/// The surface never owns the frame; the renderer hands it a finished
/// B,G,R,A buffer whose dimensions match [`Surface::dimensions`].
pub trait Surface: Send {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Returns the surface dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Show a finished frame
    fn present(&mut self, frame: &PixelBuffer) -> Result<(), DisplayError>;

    /// Paint the whole surface a flat color
    ///
    /// Used when there is nothing to rasterize yet.
    fn clear(&mut self, color: Color) -> Result<(), DisplayError> {
        let (w, h) = self.dimensions();
        self.present(&PixelBuffer::new(w, h, color))
    }

    /// Reject frames that do not match the surface
    fn check_size(&self, frame: &PixelBuffer) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = frame.dimensions();
        if expected != actual {
            return Err(DisplayError::SizeMismatch { expected, actual });
        }
        Ok(())
    }
}
