/*
 *  pacer.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Redraw rate limiting
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
use std::time::{Duration, Instant};

/// Caps how often frames are presented. Pushes that arrive faster than the
/// frame period are coalesced into the next redraw.
#[derive(Debug, Clone)]
pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

fn frame_period(fps: u32) -> Duration {
    Duration::from_micros(1_000_000u64 / u64::from(fps.max(1)))
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: frame_period(target_fps) }
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = frame_period(fps);
    }

    #[inline]
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// How long to hold off before the next frame may go out.
    #[inline]
    pub fn wait_time(&self) -> Duration {
        self.next_deadline.saturating_duration_since(Instant::now())
    }

    /// A frame is going out now; the next one may not start before a full
    /// frame period has passed.
    #[inline]
    pub fn mark_drawn(&mut self) {
        self.next_deadline = Instant::now() + self.frame;
    }
}

/// Pacer that backs off when rasterizing and presenting take longer than
/// the frame period allows.
#[derive(Debug, Clone)]
pub struct AutoPacer {
    pacer: Pacer,
    ema_ms: f32,     // moving avg of render+present time
    alpha: f32,      // smoothing (0.1 ~ 0.3)
    headroom: f32,   // >1.0 to avoid saturation
    max_fps: u32,    // user cap
    min_fps: u32,    // floor
}

impl AutoPacer {
    pub fn new(initial_fps: u32, max_fps: u32, min_fps: u32) -> Self {
        let max_fps = max_fps.max(1);
        Self {
            pacer: Pacer::new(initial_fps.min(max_fps)),
            ema_ms: 0.0,
            alpha: 0.2,
            headroom: 1.25,
            max_fps,
            min_fps: min_fps.clamp(1, max_fps),
        }
    }

    pub fn mark_drawn(&mut self) { self.pacer.mark_drawn() }

    pub fn wait_time(&self) -> Duration { self.pacer.wait_time() }

    pub fn frame(&self) -> Duration { self.pacer.frame() }

    /// New user cap, e.g. after a config reload.
    pub fn set_max_fps(&mut self, max_fps: u32) {
        self.max_fps = max_fps.max(1);
        self.min_fps = self.min_fps.min(self.max_fps);
        self.ema_ms = 0.0;
        self.pacer.set_fps(self.max_fps);
    }

    /// Call immediately after a frame was presented.
    pub fn record_frame_ms(&mut self, frame_ms: f32) {
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.alpha * frame_ms + (1.0 - self.alpha) * self.ema_ms
        };
        if self.ema_ms > 0.0 {
            let safe_fps = (1000.0 / (self.ema_ms * self.headroom))
                .clamp(self.min_fps as f32, self.max_fps as f32) as u32;
            self.pacer.set_fps(safe_fps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_draw_is_immediate() {
        let mut pacer = Pacer::new(10);
        assert_eq!(pacer.wait_time(), Duration::ZERO);
        pacer.mark_drawn();
        // the next one has to wait a frame
        assert!(pacer.wait_time() > Duration::ZERO);
        assert!(pacer.wait_time() <= Duration::from_millis(100));
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let pacer = Pacer::new(0);
        assert_eq!(pacer.frame(), Duration::from_secs(1));
    }

    #[test]
    fn test_auto_pacer_backs_off() {
        let mut pacer = AutoPacer::new(60, 60, 5);
        assert_eq!(pacer.frame(), frame_period(60));
        // 40ms per frame with 1.25 headroom leaves 20 fps
        pacer.record_frame_ms(40.0);
        assert_eq!(pacer.frame(), frame_period(20));
        // pathological frames hit the floor
        for _ in 0..50 {
            pacer.record_frame_ms(2000.0);
        }
        assert_eq!(pacer.frame(), frame_period(5));
    }

    #[test]
    fn test_auto_pacer_respects_cap() {
        let mut pacer = AutoPacer::new(30, 30, 1);
        pacer.record_frame_ms(0.5);
        assert_eq!(pacer.frame(), frame_period(30));
        pacer.set_max_fps(10);
        pacer.record_frame_ms(0.5);
        assert_eq!(pacer.frame(), frame_period(10));
    }
}
