/*
 *  tests/heatmap_integration.rs
 *
 *  Integration tests: history -> rasterizer -> surface
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 */

use std::sync::Arc;
use std::time::Duration;

use heatmap::display::drivers::MockSurface;
use heatmap::display::{color_for_power, render, Color, GradientSpec, Viewport};
use heatmap::{HistoryBuffer, Producer, Renderer, Row, Sample, Settings};
use tokio::sync::watch;

fn two_sample_row(power: f64) -> Row {
    Row::new(vec![Sample::new(5000.0, power), Sample::new(5500.0, power)])
}

fn gradient() -> GradientSpec {
    GradientSpec::new(-110.0, -100.0, Color::BLUE, Color::RED)
}

fn viewport(width: u32, height: u32, displayed_rows: u32) -> Viewport {
    Viewport {
        pixel_width: width,
        pixel_height: height,
        freq_min: 5000.0,
        freq_max: 6000.0,
        displayed_rows,
    }
}

#[test]
fn test_capacity_eviction_then_render() {
    let history = HistoryBuffer::new(3).unwrap();
    let rows: Vec<Row> = [-107.0, -110.0, -105.0, -100.0]
        .into_iter()
        .map(two_sample_row)
        .collect();
    for row in &rows {
        assert!(history.push(row.clone()));
    }

    let snapshot = history.snapshot();
    assert_eq!(snapshot, rows[1..].to_vec());

    let frame = render(&snapshot, &gradient(), &viewport(100, 30, 3)).unwrap();
    assert_eq!(frame.dimensions(), (100, 30));

    let blue = Color::BLUE.to_bgra_premultiplied();
    let red = Color::RED.to_bgra_premultiplied();
    let middle = color_for_power(-105.0, &gradient()).to_bgra_premultiplied();
    for x in [0, 49, 50, 99] {
        // 10px strips, oldest held row on top
        for y in 0..10 {
            assert_eq!(frame.pixel(x, y), Some(blue), "top strip at ({x},{y})");
        }
        for y in 10..20 {
            assert_eq!(frame.pixel(x, y), Some(middle), "middle strip at ({x},{y})");
        }
        for y in 20..30 {
            assert_eq!(frame.pixel(x, y), Some(red), "bottom strip at ({x},{y})");
        }
    }
}

#[test]
fn test_history_is_fifo_past_capacity() {
    let history = HistoryBuffer::new(5).unwrap();
    let rows: Vec<Row> = (0..12).map(|i| two_sample_row(-110.0 + i as f64)).collect();
    for row in &rows {
        history.push(row.clone());
        assert!(history.len() <= 5);
    }
    assert_eq!(history.snapshot(), rows[7..].to_vec());
}

#[test]
fn test_samples_outside_window_are_clipped() {
    let history = HistoryBuffer::new(4).unwrap();
    history.push(Row::new(vec![
        Sample::new(4000.0, -100.0),
        Sample::new(4500.0, -100.0),
        Sample::new(5500.0, -110.0),
        Sample::new(7000.0, -100.0),
    ]));

    let frame = render(&history.snapshot(), &gradient(), &viewport(10, 2, 1)).unwrap();
    let black = Color::BLACK.to_bgra_premultiplied();
    let blue = Color::BLUE.to_bgra_premultiplied();
    let red = Color::RED.to_bgra_premultiplied();
    // 4500 spans up to 5500 and paints the left half in the max color
    assert_eq!(frame.pixel(0, 0), Some(red));
    assert_eq!(frame.pixel(4, 1), Some(red));
    assert_eq!(frame.pixel(5, 0), Some(blue));
    assert_eq!(frame.pixel(9, 1), Some(blue));
    assert!(frame.pixels().all(|p| p != black));
}

#[test]
fn test_nothing_to_draw() {
    let empty: Vec<Row> = Vec::new();
    assert!(render(&empty, &gradient(), &viewport(10, 10, 5)).is_none());

    let rows = vec![two_sample_row(-105.0)];
    assert!(render(&rows, &gradient(), &viewport(0, 10, 5)).is_none());
    assert!(render(&rows, &gradient(), &viewport(10, 0, 5)).is_none());
}

#[tokio::test]
async fn test_producer_to_renderer_flow() {
    let mut settings = Settings::default();
    settings.producer.interval = Duration::from_millis(5);
    settings.graph.displayed_row_count = 4;
    settings.display.fps = 120;

    let history = Arc::new(HistoryBuffer::new(settings.graph.time_to_hold as usize).unwrap());
    let (_settings_tx, settings_rx) = watch::channel(settings);
    let surface = MockSurface::new(101, 8);

    let producer = Producer::spawn(Arc::clone(&history), settings_rx.clone());
    let renderer = Renderer::spawn(Arc::clone(&history), surface.clone(), settings_rx);

    let background = Color::BLACK.to_bgra_premultiplied();
    let drawn = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            // four rows fill every strip; random sweeps cover the whole window
            if history.len() >= 4
                && surface
                    .last_frame()
                    .is_some_and(|frame| frame.pixels().all(|p| p != background))
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(drawn.is_ok());

    producer.shutdown().await;
    renderer.shutdown().await;
    assert!(surface.present_count() >= 1);
}
