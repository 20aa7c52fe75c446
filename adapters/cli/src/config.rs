use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use warpfield_core::{ProjectionTuning, DEFAULT_STAR_COUNT};
use warpfield_system_starfield::StarfieldConfig;

/// Settings of a demo run, loaded from TOML and refined by command-line flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DemoConfig {
    /// Number of simulated stars.
    pub(crate) star_count: usize,
    /// Seed for star placement; a random seed is drawn when absent.
    pub(crate) seed: Option<u64>,
    /// Focal-length-like constant of the projection.
    pub(crate) field_of_view: f32,
    /// Speed the camera always moves with.
    pub(crate) base_speed: f32,
    /// Strength of the motion streak at full warp.
    pub(crate) stretch_factor: f32,
    /// Sprite scale of a star on the camera plane.
    pub(crate) base_size: f32,
    /// Milliseconds between cruise/warp toggles.
    pub(crate) warp_period_ms: u64,
    /// Image used for every star.
    pub(crate) star_texture: PathBuf,
    /// Initial window width in pixels.
    pub(crate) window_width: u32,
    /// Initial window height in pixels.
    pub(crate) window_height: u32,
    /// Background color as `0xRRGGBB`.
    pub(crate) clear_color: u32,
    /// Whether the title card is drawn above the stars.
    pub(crate) title_card: bool,
    /// Whether presentation is synchronised with the display.
    pub(crate) vsync: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let tuning = ProjectionTuning::default();
        Self {
            star_count: DEFAULT_STAR_COUNT,
            seed: None,
            field_of_view: tuning.field_of_view,
            base_speed: tuning.base_speed,
            stretch_factor: tuning.stretch_factor,
            base_size: tuning.base_size,
            warp_period_ms: 5_000,
            star_texture: PathBuf::from("assets/star.png"),
            window_width: 1280,
            window_height: 720,
            clear_color: 0x000000,
            title_card: true,
            vsync: true,
        }
    }
}

impl DemoConfig {
    /// Reads a configuration file; missing keys fall back to defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    /// Parses a configuration from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid warpfield configuration")
    }

    /// Projection constants described by this configuration.
    pub(crate) fn tuning(&self) -> ProjectionTuning {
        ProjectionTuning {
            field_of_view: self.field_of_view,
            base_speed: self.base_speed,
            stretch_factor: self.stretch_factor,
            base_size: self.base_size,
        }
    }

    /// Simulator parameters for the provided placement seed.
    pub(crate) fn starfield(&self, seed: u64) -> StarfieldConfig {
        StarfieldConfig {
            star_count: self.star_count,
            tuning: self.tuning(),
            seed,
            warp_period: Duration::from_millis(self.warp_period_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = DemoConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.star_count, 2000);
        assert_eq!(config.tuning(), ProjectionTuning::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config = DemoConfig::from_toml_str(
            r#"
                star_count = 500
                seed = 42
                clear_color = 0x1099bb
                title_card = false
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.star_count, 500);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.clear_color, 0x1099bb);
        assert!(!config.title_card);
        assert_eq!(config.warp_period_ms, 5_000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = DemoConfig::from_toml_str("warp_speed = 9").expect_err("unknown key");

        assert!(format!("{error:#}").contains("warp_speed"));
    }

    #[test]
    fn starfield_config_carries_tuning_and_period() {
        let config = DemoConfig {
            base_size: 0.1,
            warp_period_ms: 2_500,
            ..DemoConfig::default()
        };

        let starfield = config.starfield(7);

        assert_eq!(starfield.seed, 7);
        assert_eq!(starfield.tuning.base_size, 0.1);
        assert_eq!(starfield.warp_period, Duration::from_millis(2_500));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let error = DemoConfig::load(Path::new("no/such/warpfield.toml"))
            .expect_err("missing file must fail");

        assert!(format!("{error:#}").contains("no/such/warpfield.toml"));
    }
}
