/*
 *  main.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
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

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use tokio::sync::watch;

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind};

use heatmap::config::{self, Cli, Settings};
use heatmap::display::drivers::PpmSurface;
use heatmap::history::HistoryBuffer;
use heatmap::producer::Producer;
use heatmap::renderer::Renderer;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }
    let settings = config::resolve(&cfg)?;

    let level = if cli.debug {
        "debug"
    } else {
        settings.log_level.as_deref().unwrap_or("info")
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);
    info!(
        "window {}..{} Hz, gradient {}..{} dBm, holding {} rows",
        settings.graph.chart_x_level_min,
        settings.graph.chart_x_level_max,
        settings.graph.gradient_level_min,
        settings.graph.gradient_level_max,
        settings.graph.time_to_hold
    );

    let history = Arc::new(HistoryBuffer::new(settings.graph.time_to_hold as usize)?);
    let surface = PpmSurface::new(
        settings.display.width,
        settings.display.height,
        settings.display.output.clone(),
    )?;
    info!(
        "rendering {}x{} frames to {}",
        settings.display.width,
        settings.display.height,
        surface.path().display()
    );

    let (settings_tx, settings_rx) = watch::channel(settings);
    let producer = Producer::spawn(Arc::clone(&history), settings_rx.clone());
    let renderer = Renderer::spawn(Arc::clone(&history), surface, settings_rx);

    signal_handler(&cli, &settings_tx).await?;

    producer.shutdown().await;
    renderer.shutdown().await;
    info!("shutdown complete");
    Ok(())
}

/// Runs until SIGINT/SIGTERM; SIGHUP re-reads the configuration.
#[cfg(unix)]
async fn signal_handler(cli: &Cli, settings_tx: &watch::Sender<Settings>) -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT received. Initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received. Initiating graceful shutdown.");
                break;
            }
            _ = sighup.recv() => {
                info!("SIGHUP received. Reloading configuration.");
                reload(cli, settings_tx);
            }
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler(_cli: &Cli, _settings_tx: &watch::Sender<Settings>) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

fn reload(cli: &Cli, settings_tx: &watch::Sender<Settings>) {
    let fresh = match config::load(cli).and_then(|cfg| config::resolve(&cfg)) {
        Ok(s) => s,
        Err(e) => {
            error!("config reload failed, keeping current settings: {e}");
            return;
        }
    };

    {
        let current = settings_tx.borrow();
        if fresh.graph.time_to_hold != current.graph.time_to_hold {
            warn!("time_to_hold change ({} -> {}) needs a restart", current.graph.time_to_hold, fresh.graph.time_to_hold);
        }
        let (new, old) = (&fresh.display, &current.display);
        if (new.width, new.height, &new.output) != (old.width, old.height, &old.output) {
            warn!("display size/output changes need a restart");
        }
    }
    settings_tx.send_replace(fresh);
    info!("configuration reloaded");
}
