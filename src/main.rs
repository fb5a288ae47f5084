mod app;
mod audio;
mod config;
mod error;
mod library;
mod metadata;
mod runtime;
mod ui;
mod visualizer;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
