mod app;
mod notes;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Classified notes as JSON. Defaults to the built-in demo captures.
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Mind map metadata (significance scores and links) as JSON.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Fixed seed for reproducible layouts.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulation ticks per layout.
    #[arg(long, default_value_t = 300)]
    iterations: usize,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 860.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,momentsmith_map=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let source = notes::NoteSource {
        notes_path: args.notes,
        map_path: args.map,
    };
    let layout_config = app::LayoutConfig {
        iterations: args.iterations.max(1),
        ..Default::default()
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "MomentSmith Map",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::MindMapApp::new(
                cc,
                source,
                layout_config,
                args.seed,
            )))
        }),
    )
}
