/*
 *  config.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Settings: defaults, YAML file and CLI overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::{Color, GradientSpec, Viewport};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level file configuration. Every field is optional so files, CLI and
/// defaults can be layered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// heatmap appearance and history depth
    pub graph: Option<GraphConfig>,
    /// output surface geometry & cadence
    pub display: Option<DisplayConfig>,
    /// synthetic sweep producer
    pub producer: Option<ProducerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphConfig {
    pub gradient_level_min: Option<f64>,
    pub gradient_level_max: Option<f64>,
    pub chart_x_level_min: Option<f64>,
    pub chart_x_level_max: Option<f64>,
    pub displayed_row_count: Option<u32>,
    pub min_power_color: Option<Color>,    // "#RRGGBB" in YAML
    pub max_power_color: Option<Color>,
    pub background_color: Option<Color>,
    pub real_time: Option<bool>,
    pub time_to_hold: Option<u32>,         // history capacity, in rows
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub output: Option<PathBuf>,           // PPM file the frames land in
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProducerConfig {
    pub source: Option<SourceKind>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Random,
    Sine,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "heatmap", about = "Scrolling frequency/power heatmap", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub fps: Option<u32>,
    /// PPM file each rendered frame is written to
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
    #[arg(long)]
    pub time_to_hold: Option<u32>,
    #[arg(long)]
    pub displayed_rows: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    pub gradient_min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub gradient_max: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub freq_min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub freq_max: Option<f64>,
    /// "#RRGGBB"
    #[arg(long)]
    pub min_color: Option<Color>,
    #[arg(long)]
    pub max_color: Option<Color>,
    #[arg(long, action = ArgAction::Set)]
    pub real_time: Option<bool>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Resolved heatmap settings; the renderer derives a fresh gradient and
/// viewport from these on every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSettings {
    pub gradient_level_min: f64,
    pub gradient_level_max: f64,
    pub chart_x_level_min: f64,
    pub chart_x_level_max: f64,
    pub displayed_row_count: u32,
    pub min_power_color: Color,
    pub max_power_color: Color,
    pub background_color: Color,
    pub real_time: bool,
    pub time_to_hold: u32,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            gradient_level_min: -110.0,
            gradient_level_max: -100.0,
            chart_x_level_min: 5000.0,
            chart_x_level_max: 6000.0,
            displayed_row_count: 200,
            min_power_color: Color::BLUE,
            max_power_color: Color::RED,
            background_color: Color::BLACK,
            real_time: true,
            time_to_hold: 200,
        }
    }
}

impl GraphSettings {
    pub fn gradient_spec(&self) -> GradientSpec {
        GradientSpec::new(
            self.gradient_level_min,
            self.gradient_level_max,
            self.min_power_color,
            self.max_power_color,
        )
    }

    pub fn viewport(&self, pixel_width: u32, pixel_height: u32) -> Viewport {
        Viewport {
            pixel_width,
            pixel_height,
            freq_min: self.chart_x_level_min,
            freq_max: self.chart_x_level_max,
            displayed_rows: self.displayed_row_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub output: PathBuf,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { width: 640, height: 400, fps: 30, output: PathBuf::from("heatmap.ppm") }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerSettings {
    pub source: SourceKind,
    pub interval: Duration,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self { source: SourceKind::Random, interval: Duration::from_millis(100) }
    }
}

/// Everything the binary needs, validated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub log_level: Option<String>,
    pub graph: GraphSettings,
    pub display: DisplaySettings,
    pub producer: ProducerSettings,
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults live in the resolved Settings types
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    resolve(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of the effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/heatmap/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/heatmap/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/heatmap.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["heatmap.yaml", "config.yaml", "config/heatmap.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.graph, src.graph) {
        (None, Some(c)) => dst.graph = Some(c),
        (Some(d), Some(s)) => merge_graph(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.producer, src.producer) {
        (None, Some(c)) => dst.producer = Some(c),
        (Some(d), Some(s)) => {
            if s.source.is_some()      { d.source = s.source; }
            if s.interval_ms.is_some() { d.interval_ms = s.interval_ms; }
        }
        _ => {}
    }
}

fn merge_graph(dst: &mut GraphConfig, src: GraphConfig) {
    if src.gradient_level_min.is_some()  { dst.gradient_level_min = src.gradient_level_min; }
    if src.gradient_level_max.is_some()  { dst.gradient_level_max = src.gradient_level_max; }
    if src.chart_x_level_min.is_some()   { dst.chart_x_level_min = src.chart_x_level_min; }
    if src.chart_x_level_max.is_some()   { dst.chart_x_level_max = src.chart_x_level_max; }
    if src.displayed_row_count.is_some() { dst.displayed_row_count = src.displayed_row_count; }
    if src.min_power_color.is_some()     { dst.min_power_color = src.min_power_color; }
    if src.max_power_color.is_some()     { dst.max_power_color = src.max_power_color; }
    if src.background_color.is_some()    { dst.background_color = src.background_color; }
    if src.real_time.is_some()           { dst.real_time = src.real_time; }
    if src.time_to_hold.is_some()        { dst.time_to_hold = src.time_to_hold; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.fps.is_some()         { dst.fps = src.fps; }
    if src.output.is_some()      { dst.output = src.output; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    let graph = cfg.graph.get_or_insert_with(GraphConfig::default);
    if cli.gradient_min.is_some()   { graph.gradient_level_min = cli.gradient_min; }
    if cli.gradient_max.is_some()   { graph.gradient_level_max = cli.gradient_max; }
    if cli.freq_min.is_some()       { graph.chart_x_level_min = cli.freq_min; }
    if cli.freq_max.is_some()       { graph.chart_x_level_max = cli.freq_max; }
    if cli.displayed_rows.is_some() { graph.displayed_row_count = cli.displayed_rows; }
    if cli.min_color.is_some()      { graph.min_power_color = cli.min_color; }
    if cli.max_color.is_some()      { graph.max_power_color = cli.max_color; }
    if cli.real_time.is_some()      { graph.real_time = cli.real_time; }
    if cli.time_to_hold.is_some()   { graph.time_to_hold = cli.time_to_hold; }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.width.is_some()  { display.width = cli.width; }
    if cli.height.is_some() { display.height = cli.height; }
    if cli.fps.is_some()    { display.fps = cli.fps; }
    if cli.output.is_some() { display.output = cli.output.clone(); }

    let producer = cfg.producer.get_or_insert_with(ProducerConfig::default);
    if cli.source.is_some()      { producer.source = cli.source; }
    if cli.interval_ms.is_some() { producer.interval_ms = cli.interval_ms; }
}

/// Fill defaults and check invariants (required fields, ranges, etc.)
pub fn resolve(cfg: &Config) -> Result<Settings, ConfigError> {
    let defaults = Settings::default();

    let g = cfg.graph.clone().unwrap_or_default();
    let dg = &defaults.graph;
    let graph = GraphSettings {
        gradient_level_min: g.gradient_level_min.unwrap_or(dg.gradient_level_min),
        gradient_level_max: g.gradient_level_max.unwrap_or(dg.gradient_level_max),
        chart_x_level_min: g.chart_x_level_min.unwrap_or(dg.chart_x_level_min),
        chart_x_level_max: g.chart_x_level_max.unwrap_or(dg.chart_x_level_max),
        displayed_row_count: g.displayed_row_count.unwrap_or(dg.displayed_row_count),
        min_power_color: g.min_power_color.unwrap_or(dg.min_power_color),
        max_power_color: g.max_power_color.unwrap_or(dg.max_power_color),
        background_color: g.background_color.unwrap_or(dg.background_color),
        real_time: g.real_time.unwrap_or(dg.real_time),
        time_to_hold: g.time_to_hold.unwrap_or(dg.time_to_hold),
    };

    let d = cfg.display.clone().unwrap_or_default();
    let display = DisplaySettings {
        width: d.width.unwrap_or(defaults.display.width),
        height: d.height.unwrap_or(defaults.display.height),
        fps: d.fps.unwrap_or(defaults.display.fps),
        output: d.output.unwrap_or(defaults.display.output),
    };

    let p = cfg.producer.clone().unwrap_or_default();
    let producer = ProducerSettings {
        source: p.source.unwrap_or(defaults.producer.source),
        interval: p.interval_ms.map(Duration::from_millis).unwrap_or(defaults.producer.interval),
    };

    let settings = Settings { log_level: cfg.log_level.clone(), graph, display, producer };
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let g = &settings.graph;
    if g.time_to_hold == 0 {
        return Err(ConfigError::Validation("graph time_to_hold must be > 0".into()));
    }
    if g.displayed_row_count == 0 {
        return Err(ConfigError::Validation("graph displayed_row_count must be > 0".into()));
    }
    if g.chart_x_level_min.is_nan()
        || g.chart_x_level_max.is_nan()
        || g.chart_x_level_max <= g.chart_x_level_min
    {
        return Err(ConfigError::Validation(format!(
            "graph chart_x_level_max ({}) must exceed chart_x_level_min ({})",
            g.chart_x_level_max, g.chart_x_level_min
        )));
    }
    let d = &settings.display;
    if d.width == 0 || d.height == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    if d.fps == 0 {
        return Err(ConfigError::Validation("display fps must be > 0".into()));
    }
    if settings.producer.interval.is_zero() {
        return Err(ConfigError::Validation("producer interval_ms must be > 0".into()));
    }
    Ok(())
}
