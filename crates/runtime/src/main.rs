#![deny(clippy::all, clippy::pedantic)]
//! # Runtime
//!
//! Builds a small demo scene and drives it through the frame scheduler. Frames go to
//! the headless backend unless `--gpu` is given (with the `gpu` feature). With
//! `--watch`, edits to the config file retune physics while the loop runs.

mod app;
mod demo;
mod watcher;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON scene configuration; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frames to run before exiting
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Reload physics settings when the config file changes
    #[arg(short, long, default_value_t = false)]
    pub watch: bool,

    /// Upload frames to a GPU device instead of capturing them
    #[cfg(feature = "gpu")]
    #[arg(long, default_value_t = false)]
    pub gpu: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    app::run(&args)
}
