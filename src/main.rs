mod annotator;
mod app;
mod config;
mod export;
mod fixtures;
mod geometry;
mod locator;
mod session;

use anyhow::{bail, Result};
use eframe::egui;
use std::path::PathBuf;

use crate::app::FixtureApp;
use crate::config::Config;
use crate::session::Designer;

const USAGE: &str = "Usage: fixture-locator [--designer <name>] [slide.png|jpg]";

struct Args {
    image_path: Option<PathBuf>,
    designer: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut image_path = None;
    let mut designer = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--designer" | "-d" => match args.next() {
                Some(name) => designer = Some(name),
                None => bail!("--designer needs a name\n{}", USAGE),
            },
            "--help" | "-h" => bail!("{}", USAGE),
            _ if image_path.is_none() => image_path = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument '{}'\n{}", arg, USAGE),
        }
    }
    Ok(Args {
        image_path,
        designer,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(std::env::args().skip(1))?;
    if let Some(ref path) = args.image_path {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }
    }

    let config = Config::load();
    let designer = Designer::resolve(args.designer);
    log::info!("Starting session for {}", designer.name());

    let title = match args.image_path {
        Some(ref path) => format!(
            "fixture-locator — {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "fixture-locator".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_title(&title),
        ..Default::default()
    };

    let image_path = args.image_path;
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(FixtureApp::new(cc, config, designer, image_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run eframe: {}", e))
}
