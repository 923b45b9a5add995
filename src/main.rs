mod app;
mod assets;
mod audio;
mod config;
mod error;
mod input;
mod pet;
mod platform;
mod render;

use clap::Parser;

use crate::assets::SpriteSheet;
use crate::config::{Args, Config};

fn start() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    log::info!(
        "Config: speed={} scale={} quiet={} passthrough={} assets={}",
        config.speed,
        config.scale,
        config.quiet,
        config.mouse_passthrough,
        config.assets.display()
    );

    let sprites = SpriteSheet::load(&config.assets)?;
    let audio = audio::open(&config)?;

    app::run(config, sprites, audio)
}

fn main() {
    env_logger::init();
    log::info!("Neko starting up");

    if let Err(e) = start() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
