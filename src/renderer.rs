/*
 *  renderer.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Render loop: history change -> snapshot -> rasterize -> present
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
use std::time::Instant;

use log::{error, info, trace, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::{GraphSettings, Settings};
use crate::display::{Color, DisplayError, PixelBuffer, Rasterizer, Surface};
use crate::history::HistoryBuffer;
use crate::pacer::AutoPacer;

/// What a single pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// rows were rasterized and presented
    Drawn,
    /// nothing to draw; the surface was cleared to the background
    Cleared,
    /// the settings describe an unusable viewport; nothing was touched
    Skipped,
}

/// One redraw pass against the current settings.
///
/// Gradient and viewport are rebuilt from `graph` every call so a settings
/// change shows on the very next frame. `frame` is reused between passes.
pub fn draw_frame<S: Surface + ?Sized>(
    history: &HistoryBuffer,
    surface: &mut S,
    graph: &GraphSettings,
    frame: &mut PixelBuffer,
) -> Result<FrameOutcome, DisplayError> {
    let (width, height) = surface.dimensions();
    let viewport = graph.viewport(width, height);
    if let Err(e) = viewport.validate() {
        warn!("renderer: skipping frame, {e}");
        return Ok(FrameOutcome::Skipped);
    }

    let gradient = graph.gradient_spec();
    let rasterizer = Rasterizer::new(graph.background_color);
    // rows beyond this can never be visible
    let wanted = graph.displayed_row_count.min(height) as usize;
    let snapshot = history.snapshot_latest(wanted);

    if rasterizer.render_into(frame, &snapshot, &gradient, &viewport) {
        surface.present(frame)?;
        Ok(FrameOutcome::Drawn)
    } else {
        surface.clear(graph.background_color)?;
        Ok(FrameOutcome::Cleared)
    }
}

/// Handle to the background render task.
pub struct Renderer {
    stop_tx: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl Renderer {
    pub fn spawn<S>(history: Arc<HistoryBuffer>, surface: S, settings_rx: watch::Receiver<Settings>) -> Self
    where
        S: Surface + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let join = tokio::spawn(async move {
            renderer_worker(history, surface, stop_rx, settings_rx).await
        });
        Self { stop_tx, join: Some(join) }
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.stop_tx.send(()).await;
        if let Some(handle) = self.join.take() {
            if let Err(e) = handle.await {
                error!("renderer task failed to join: {e}");
            }
        }
        info!("renderer stopped");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.join.take() {
            handle.abort();
        }
    }
}

async fn renderer_worker<S: Surface>(
    history: Arc<HistoryBuffer>,
    mut surface: S,
    mut stop_rx: mpsc::Receiver<()>,
    mut settings_rx: watch::Receiver<Settings>,
) {
    let mut history_rx = history.subscribe();
    let fps = settings_rx.borrow_and_update().display.fps;
    let mut pacer = AutoPacer::new(fps, fps, 1);
    let mut frame = PixelBuffer::new(0, 0, Color::BLACK);
    info!("renderer started on {} surface {:?}", surface.name(), surface.dimensions());

    loop {
        let graph = settings_rx.borrow().graph.clone();
        pacer.mark_drawn();
        let started = Instant::now();
        match draw_frame(&history, &mut surface, &graph, &mut frame) {
            Ok(outcome) => trace!("renderer: {outcome:?} in {:?} (budget {:?})", started.elapsed(), pacer.frame()),
            Err(e) => error!("renderer: {} present failed: {e}", surface.name()),
        }
        pacer.record_frame_ms(started.elapsed().as_secs_f32() * 1000.0);

        // wait for something worth redrawing
        tokio::select! {
            changed = history_rx.changed() => {
                if changed.is_err() { break; }
            }
            changed = settings_rx.changed() => {
                if changed.is_err() { break; }
                let fps = settings_rx.borrow_and_update().display.fps;
                pacer.set_max_fps(fps);
            }
            _ = stop_rx.recv() => break,
        }

        // pushes landing inside the frame period fold into one redraw
        let wait = pacer.wait_time();
        if !wait.is_zero() {
            tokio::select! {
                _ = sleep(wait) => {}
                _ = stop_rx.recv() => break,
            }
        }
    }
    info!("renderer received stop signal. Exiting.");
}
