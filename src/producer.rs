/*
 *  producer.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Synthetic sweep sources and the background task feeding the history
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

use log::{debug, error, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::config::{Settings, SourceKind};
use crate::history::HistoryBuffer;
use crate::sweep::{Row, Sample};

/// Anything that can produce one complete sweep at a time.
pub trait SweepSource: Send {
    fn name(&self) -> &'static str;

    /// Build the next sweep. The row is complete before it is returned.
    fn next_row(&mut self) -> Row;
}

pub const RANDOM_FREQ_START: f64 = 5000.0;
pub const RANDOM_FREQ_STEP: f64 = 10.0;
pub const RANDOM_SAMPLES: usize = 101;
pub const RANDOM_POWER_MAX: f64 = -100.0;
pub const RANDOM_POWER_SPAN: f64 = 10.0;

/// 101 points across 5000..=6000 with noise-floor power in (-110, -100].
pub struct RandomSweep {
    rng: StdRng,
}

impl RandomSweep {
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Deterministic sequence, for tests and repeatable captures.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepSource for RandomSweep {
    fn name(&self) -> &'static str {
        "random"
    }

    fn next_row(&mut self) -> Row {
        let samples = (0..RANDOM_SAMPLES)
            .map(|i| {
                let frequency = RANDOM_FREQ_START + i as f64 * RANDOM_FREQ_STEP;
                // random() is in [0, 1)
                let power = RANDOM_POWER_MAX - self.rng.random::<f64>() * RANDOM_POWER_SPAN;
                Sample::new(frequency, power)
            })
            .collect();
        Row::new(samples)
    }
}

pub const SINE_SAMPLES: usize = 2000;
pub const SINE_PHASE_STEP: f64 = 0.1;

/// 2000 points at x/100 with power sin(x/100 + phase); the phase moves on
/// every sweep so the waterfall visibly scrolls.
#[derive(Debug, Default)]
pub struct SineSweep {
    phase: f64,
}

impl SineSweep {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SweepSource for SineSweep {
    fn name(&self) -> &'static str {
        "sine"
    }

    fn next_row(&mut self) -> Row {
        let phase = self.phase;
        let samples = (0..SINE_SAMPLES)
            .map(|x| {
                let f = x as f64 / 100.0;
                Sample::new(f, (f + phase).sin())
            })
            .collect();
        self.phase = (self.phase + SINE_PHASE_STEP) % std::f64::consts::TAU;
        Row::new(samples)
    }
}

pub fn source_for(kind: SourceKind) -> Box<dyn SweepSource> {
    match kind {
        SourceKind::Random => Box::new(RandomSweep::new()),
        SourceKind::Sine => Box::new(SineSweep::new()),
    }
}

/// Handle to the background producer task.
pub struct Producer {
    stop_tx: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl Producer {
    /// Spawn a producer using the source named in the current settings.
    pub fn spawn(history: Arc<HistoryBuffer>, settings_rx: watch::Receiver<Settings>) -> Self {
        let source = source_for(settings_rx.borrow().producer.source);
        Self::spawn_with_source(history, source, settings_rx)
    }

    pub fn spawn_with_source(
        history: Arc<HistoryBuffer>,
        source: Box<dyn SweepSource>,
        settings_rx: watch::Receiver<Settings>,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let join = tokio::spawn(async move {
            producer_worker(history, source, stop_rx, settings_rx).await
        });
        Self { stop_tx, join: Some(join) }
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.stop_tx.send(()).await;
        if let Some(handle) = self.join.take() {
            if let Err(e) = handle.await {
                error!("producer task failed to join: {e}");
            }
        }
        info!("producer stopped");
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.join.take() {
            handle.abort();
        }
    }
}

async fn producer_worker(
    history: Arc<HistoryBuffer>,
    mut source: Box<dyn SweepSource>,
    mut stop_rx: mpsc::Receiver<()>,
    mut settings_rx: watch::Receiver<Settings>,
) {
    let mut kind = settings_rx.borrow().producer.source;
    info!("producer started ({})", source.name());

    'outer: loop {
        let (real_time, interval, wanted) = {
            let s = settings_rx.borrow_and_update();
            (s.graph.real_time, s.producer.interval, s.producer.source)
        };

        if wanted != kind {
            source = source_for(wanted);
            kind = wanted;
            info!("producer switched to {}", source.name());
        }

        if !real_time {
            debug!("producer paused");
            tokio::select! {
                changed = settings_rx.changed() => {
                    if changed.is_err() { break; }
                    continue;
                }
                _ = stop_rx.recv() => break,
            }
        }

        history.push(source.next_row());

        // settings changes do not shorten the wait; only a pause or stop does
        let wait = sleep_until(Instant::now() + interval);
        tokio::pin!(wait);
        loop {
            tokio::select! {
                _ = &mut wait => break,
                changed = settings_rx.changed() => {
                    if changed.is_err() { break 'outer; }
                    if !settings_rx.borrow().graph.real_time { break; }
                }
                _ = stop_rx.recv() => break 'outer,
            }
        }
    }
    info!("producer received stop signal. Exiting.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.producer.interval = Duration::from_millis(5);
        settings
    }

    async fn wait_for_len(history: &HistoryBuffer, len: usize) -> bool {
        tokio::time::timeout(Duration::from_secs(5), async {
            while history.len() < len {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .is_ok()
    }

    #[test]
    fn test_random_sweep_shape() {
        let mut source = RandomSweep::seeded(7);
        let row = source.next_row();
        assert_eq!(row.len(), RANDOM_SAMPLES);
        assert_eq!(row.frequency_range(), Some((5000.0, 6000.0)));
        assert!(row.iter().all(|s| s.power > -110.0 && s.power <= -100.0));
        assert_ne!(source.next_row(), row);
    }

    #[test]
    fn test_random_sweep_seeded_is_repeatable() {
        assert_eq!(RandomSweep::seeded(3).next_row(), RandomSweep::seeded(3).next_row());
    }

    #[test]
    fn test_sine_sweep_advances_phase() {
        let mut source = SineSweep::new();
        let first = source.next_row();
        let second = source.next_row();
        assert_eq!(first.len(), SINE_SAMPLES);
        assert_eq!(first.frequency_range(), Some((0.0, 19.99)));
        assert!((first.samples()[0].power - 0.0).abs() < 1e-12);
        assert!((second.samples()[0].power - SINE_PHASE_STEP.sin()).abs() < 1e-12);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_producer_fills_history() {
        let history = Arc::new(HistoryBuffer::new(4).unwrap());
        let (_settings_tx, settings_rx) = watch::channel(fast_settings());
        let producer = Producer::spawn(Arc::clone(&history), settings_rx);

        assert!(wait_for_len(&history, 4).await);
        producer.shutdown().await;
        assert_eq!(history.len(), 4);
        assert!(history.snapshot().iter().all(|row| row.len() == RANDOM_SAMPLES));
    }

    #[tokio::test]
    async fn test_producer_pauses_and_resumes() {
        let history = Arc::new(HistoryBuffer::new(100).unwrap());
        let mut paused = fast_settings();
        paused.graph.real_time = false;
        let (settings_tx, settings_rx) = watch::channel(paused);
        let producer = Producer::spawn_with_source(
            Arc::clone(&history),
            Box::new(SineSweep::new()),
            settings_rx,
        );

        sleep(Duration::from_millis(40)).await;
        assert!(history.is_empty());

        settings_tx.send_modify(|s| s.graph.real_time = true);
        assert!(wait_for_len(&history, 2).await);

        settings_tx.send_modify(|s| s.graph.real_time = false);
        sleep(Duration::from_millis(20)).await;
        let held = history.generation();
        sleep(Duration::from_millis(40)).await;
        assert_eq!(history.generation(), held);

        producer.shutdown().await;
    }

    #[tokio::test]
    async fn test_producer_switches_source() {
        let history = Arc::new(HistoryBuffer::new(100).unwrap());
        let (settings_tx, settings_rx) = watch::channel(fast_settings());
        let producer = Producer::spawn(Arc::clone(&history), settings_rx);
        assert!(wait_for_len(&history, 1).await);

        settings_tx.send_modify(|s| s.producer.source = SourceKind::Sine);
        let switched = tokio::time::timeout(Duration::from_secs(5), async {
            while history.latest().map(|r| r.len()) != Some(SINE_SAMPLES) {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(switched.is_ok());
        producer.shutdown().await;
    }

    #[tokio::test]
    async fn test_settings_churn_keeps_cadence() {
        let history = Arc::new(HistoryBuffer::new(100).unwrap());
        let mut settings = Settings::default();
        settings.producer.interval = Duration::from_millis(500);
        let (settings_tx, settings_rx) = watch::channel(settings);
        let producer = Producer::spawn_with_source(
            Arc::clone(&history),
            Box::new(SineSweep::new()),
            settings_rx,
        );
        assert!(wait_for_len(&history, 1).await);

        for _ in 0..20 {
            settings_tx.send_modify(|s| s.display.fps += 1);
            sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(history.len(), 1);

        producer.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_long_wait() {
        let history = Arc::new(HistoryBuffer::new(8).unwrap());
        let mut settings = Settings::default();
        settings.producer.interval = Duration::from_secs(60);
        let (_settings_tx, settings_rx) = watch::channel(settings);
        let producer = Producer::spawn(Arc::clone(&history), settings_rx);
        assert!(wait_for_len(&history, 1).await);

        let stopped = tokio::time::timeout(Duration::from_millis(200), producer.shutdown()).await;
        assert!(stopped.is_ok());
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_producer_stops_when_settings_dropped() {
        let history = Arc::new(HistoryBuffer::new(8).unwrap());
        let (settings_tx, settings_rx) = watch::channel(fast_settings());
        let mut producer = Producer::spawn(Arc::clone(&history), settings_rx);
        drop(settings_tx);
        let handle = producer.join.take().unwrap();
        assert!(tokio::time::timeout(Duration::from_secs(5), handle).await.is_ok());
    }
}
