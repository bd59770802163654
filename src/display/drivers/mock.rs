/*
 *  display/drivers/mock.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory surface for tests and headless runs
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

use std::sync::Arc;

use parking_lot::Mutex;

use crate::display::color::Color;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;
use crate::display::traits::Surface;

/// Mock surface for testing
///
/// Records every presented frame so tests can inspect what the renderer
/// produced. State is shared, so a clone handed to the renderer task can be
/// observed from the test body.
#[derive(Debug, Clone)]
pub struct MockSurface {
    width: u32,
    height: u32,
    state: Arc<Mutex<MockSurfaceState>>,
}

/// Internal state for the mock surface (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockSurfaceState {
    /// Number of frames presented
    pub present_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Most recent frame
    pub last_frame: Option<PixelBuffer>,

    /// Simulate failures (for error testing)
    pub simulate_failure: bool,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: Arc::new(Mutex::new(MockSurfaceState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSurfaceState>> {
        Arc::clone(&self.state)
    }

    pub fn present_count(&self) -> usize {
        self.state.lock().present_count
    }

    pub fn last_frame(&self) -> Option<PixelBuffer> {
        self.state.lock().last_frame.clone()
    }
}

impl Surface for MockSurface {
    fn name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_size(frame)?;
        let mut state = self.state.lock();
        if state.simulate_failure {
            return Err(DisplayError::Other("Simulated present failure".to_string()));
        }
        state.present_count += 1;
        state.last_frame = Some(frame.clone());
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<(), DisplayError> {
        self.state.lock().clear_count += 1;
        let frame = PixelBuffer::new(self.width, self.height, color);
        self.present(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_surface_records_frames() {
        let mut surface = MockSurface::new(4, 2);
        let frame = PixelBuffer::new(4, 2, Color::RED);
        surface.present(&frame).unwrap();
        assert_eq!(surface.present_count(), 1);
        assert_eq!(surface.last_frame(), Some(frame));
    }

    #[test]
    fn test_mock_surface_size_mismatch() {
        let mut surface = MockSurface::new(4, 2);
        let err = surface.present(&PixelBuffer::new(2, 4, Color::RED)).unwrap_err();
        assert!(matches!(err, DisplayError::SizeMismatch { expected: (4, 2), actual: (2, 4) }));
        assert_eq!(surface.present_count(), 0);
    }

    #[test]
    fn test_mock_surface_clear() {
        let mut surface = MockSurface::new(3, 3);
        surface.clear(Color::WHITE).unwrap();
        let state = surface.state();
        let state = state.lock();
        assert_eq!(state.clear_count, 1);
        assert_eq!(state.present_count, 1);
        assert!(state.last_frame.as_ref().unwrap().pixels().all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn test_mock_surface_simulated_failure() {
        let mut surface = MockSurface::new(1, 1);
        surface.state().lock().simulate_failure = true;
        assert!(surface.present(&PixelBuffer::new(1, 1, Color::BLACK)).is_err());
        surface.state().lock().simulate_failure = false;
        assert!(surface.present(&PixelBuffer::new(1, 1, Color::BLACK)).is_ok());
    }
}
