//! Scrawl - freehand sketch capture and classification
//!
//! Demo driver for the pipeline: builds a small template model, loads it
//! through the asynchronous backend loader, replays a scripted drawing
//! of the digit "1" as pointer events, and prints the classification
//! report.

mod session;

use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scrawl_canvas::{DrawModel, Point, PointerEvent, Rasterizer};
use scrawl_config::CanvasConfig;
use scrawl_recognize::backends::TemplateFactory;
use scrawl_recognize::{BackendBundle, Resources, spawn_load};

use session::{SessionReply, SketchSession};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CanvasConfig::default();

    // Bundle descriptors: one real template model plus a deliberately
    // broken bundle, to show the skip-and-continue loading policy.
    let bundles = vec![
        BackendBundle {
            name: "Templates".to_string(),
            model_resource: "digits.json".to_string(),
            labels_resource: "labels.txt".to_string(),
            input_side: 28,
            input_tensor: "input".to_string(),
            output_tensor: "output".to_string(),
            quantized: false,
        },
        BackendBundle {
            name: "Experimental".to_string(),
            model_resource: "missing.json".to_string(),
            labels_resource: "labels.txt".to_string(),
            input_side: 28,
            input_tensor: "input".to_string(),
            output_tensor: "output".to_string(),
            quantized: false,
        },
    ];

    let loader = spawn_load(bundles, TemplateFactory::new(demo_resources(config)?));
    let mut session = SketchSession::new(config, loader);

    // Draw a "1" while the loader runs in the background
    for event in digit_one_events(config) {
        session.handle_pointer(&event);
    }

    let report = loop {
        match session.classify()? {
            SessionReply::NotReady => {
                info!("backends still loading");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            SessionReply::LoadFailed => {
                anyhow::bail!("backend loading failed; nothing to classify with");
            }
            SessionReply::Report(report) => break report,
        }
    };

    println!("{report}");

    if let Ok(dir) = std::env::var("SCRAWL_DUMP") {
        session.save_debug_images(std::path::Path::new(&dir))?;
        info!("debug images written to {dir}");
    }

    // Clearing resets the drawing; the blank surface still classifies
    session.clear();
    if let SessionReply::Report(blank) = session.classify()? {
        println!("after clear:\n{blank}");
    }

    Ok(())
}

/// Build the template model resources by tracing each digit shape
/// through the rasterizer itself
fn demo_resources(config: CanvasConfig) -> Result<Resources> {
    let zero = trace_template(config, &digit_zero_path(config))?;
    let one = trace_template(config, &digit_one_path(config))?;

    let model = serde_json::json!({
        "templates": [zero, one],
        "threshold": 0.4,
    });

    let mut resources = Resources::new();
    resources.insert("digits.json", serde_json::to_vec(&model)?);
    resources.insert("labels.txt", b"0\n1\n".to_vec());
    Ok(resources)
}

/// Rasterize one polyline into a 784-value template
fn trace_template(config: CanvasConfig, path: &[Point]) -> Result<Vec<f32>> {
    let mut model = DrawModel::new();
    let (first, rest) = path.split_first().expect("template path is non-empty");
    model.begin_stroke(*first);
    for point in rest {
        model.extend_stroke(*point);
    }
    model.end_stroke();

    let mut rasterizer = Rasterizer::new(config);
    Ok(rasterizer.downsample(&model)?.as_slice().to_vec())
}

fn digit_one_path(config: CanvasConfig) -> Vec<Point> {
    let size = config.surface_size_f32();
    let x = size / 2.0;
    (0..=20)
        .map(|i| Point::new(x, size * 0.15 + size * 0.7 * (i as f32 / 20.0)))
        .collect()
}

fn digit_zero_path(config: CanvasConfig) -> Vec<Point> {
    let size = config.surface_size_f32();
    let (cx, cy) = (size / 2.0, size / 2.0);
    let (rx, ry) = (size * 0.22, size * 0.32);
    (0..=24)
        .map(|i| {
            let angle = std::f32::consts::TAU * (i as f32 / 24.0);
            Point::new(cx + rx * angle.cos(), cy + ry * angle.sin())
        })
        .collect()
}

fn digit_one_events(config: CanvasConfig) -> Vec<PointerEvent> {
    let path = digit_one_path(config);
    let mut events = Vec::with_capacity(path.len() + 1);
    let mut timestamp = 0u64;

    events.push(PointerEvent::Press {
        pos: path[0],
        timestamp_ms: timestamp,
    });
    for pos in &path[1..] {
        timestamp += 8;
        events.push(PointerEvent::Move {
            pos: *pos,
            history: Vec::new(),
            timestamp_ms: timestamp,
        });
    }
    events.push(PointerEvent::Release {
        pos: path[path.len() - 1],
        timestamp_ms: timestamp + 8,
    });
    events
}
