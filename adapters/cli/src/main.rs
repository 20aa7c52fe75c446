#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that opens the Warpfield window.

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use warpfield_core::Viewport;
use warpfield_rendering::{Color, Presentation, RenderingBackend, Scene, SpriteId, TitleCard};
use warpfield_rendering_macroquad::MacroquadBackend;
use warpfield_system_starfield::StarfieldSimulator;

use self::config::DemoConfig;

/// Warp-speed starfield with an opening title card.
#[derive(Debug, Parser)]
#[command(name = "warpfield", version)]
struct Cli {
    /// TOML file providing defaults for every other option.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of stars to simulate.
    #[arg(long, value_name = "COUNT")]
    stars: Option<usize>,
    /// Seed for star placement. A random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Milliseconds between cruise and warp toggles.
    #[arg(long, value_name = "MILLIS")]
    warp_period_ms: Option<u64>,
    /// Image used for every star.
    #[arg(long, value_name = "PATH")]
    star_texture: Option<PathBuf>,
    /// Render as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Hide the title card.
    #[arg(long)]
    no_title: bool,
    /// Log filter directives, overriding `RUST_LOG`.
    #[arg(long, value_name = "DIRECTIVES")]
    log_filter: Option<String>,
}

impl Cli {
    fn apply_to(&self, config: &mut DemoConfig) {
        if let Some(stars) = self.stars {
            config.star_count = stars;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(period) = self.warp_period_ms {
            config.warp_period_ms = period;
        }
        if let Some(texture) = &self.star_texture {
            config.star_texture = texture.clone();
        }
        if self.no_vsync {
            config.vsync = false;
        }
        if self.no_title {
            config.title_card = false;
        }
    }
}

/// Entry point for the Warpfield command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_filter.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    cli.apply_to(&mut config);

    let seed = config.seed.unwrap_or_else(rand::random);
    let viewport = Viewport::new(config.window_width as f32, config.window_height as f32);
    let title_card = config.title_card.then(TitleCard::opening_credits);
    let mut scene = Scene::new(viewport, title_card);
    let texture = scene
        .textures
        .register(config.star_texture.to_string_lossy().into_owned());

    let mut simulator: StarfieldSimulator<SpriteId> =
        StarfieldSimulator::initialize(config.starfield(seed), &mut scene, texture)
            .context("failed to initialise starfield")?;
    info!(
        seed,
        texture = %config.star_texture.display(),
        "starting warpfield"
    );

    let presentation = Presentation::new("Warpfield", Color::from_hex(config.clear_color), scene);
    let backend = MacroquadBackend::new()
        .with_vsync(config.vsync)
        .with_show_fps(cli.show_fps)
        .with_window_size(config.window_width, config.window_height);

    backend.run(presentation, move |dt, scene| {
        let viewport = scene.viewport;
        let _ = simulator.advance(dt, viewport, scene);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let cli = Cli::parse_from([
            "warpfield",
            "--stars",
            "64",
            "--seed",
            "9",
            "--warp-period-ms",
            "1000",
            "--star-texture",
            "other.png",
            "--no-vsync",
            "--no-title",
        ]);
        let mut config = DemoConfig::default();

        cli.apply_to(&mut config);

        assert_eq!(config.star_count, 64);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.warp_period_ms, 1_000);
        assert_eq!(config.star_texture, PathBuf::from("other.png"));
        assert!(!config.vsync);
        assert!(!config.title_card);
    }

    #[test]
    fn absent_flags_keep_file_settings() {
        let cli = Cli::parse_from(["warpfield"]);
        let mut config = DemoConfig {
            star_count: 10,
            seed: Some(3),
            ..DemoConfig::default()
        };

        cli.apply_to(&mut config);

        assert_eq!(config.star_count, 10);
        assert_eq!(config.seed, Some(3));
        assert!(config.vsync);
        assert!(config.title_card);
    }
}
