#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Warpfield.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Textures registered in the scene are decoded and uploaded once, inside the
//! window context, before the first frame. A texture that is missing or does
//! not decode aborts the run and the error is returned from
//! [`RenderingBackend::run`].

mod text;
mod textures;

use anyhow::{Context, Result};
use macroquad::input::{is_key_pressed, KeyCode};
use std::{
    collections::VecDeque,
    sync::mpsc,
    time::{Duration, Instant},
};
use tracing::{error, info};
use warpfield_core::Viewport;
use warpfield_rendering::{Presentation, RenderingBackend};

use self::textures::TextureCache;

const DEFAULT_WINDOW_WIDTH: i32 = 1280;
const DEFAULT_WINDOW_HEIGHT: i32 = 720;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the initial window size in pixels. The window stays resizable.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = i32::try_from(width).unwrap_or(i32::MAX);
        self.window_height = i32::try_from(height).unwrap_or(i32::MAX);
        self
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut warpfield_rendering::Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            let textures = match TextureCache::load(&scene.textures) {
                Ok(textures) => textures,
                Err(load_error) => {
                    error!(%load_error, "texture loading failed");
                    let _ = init_sender
                        .send(Err::<(), _>(load_error).context("failed to load scene textures"));
                    return;
                }
            };
            info!(textures = textures.len(), "scene textures loaded");
            let _ = init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if KeyboardShortcuts::poll().quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                scene.viewport = Viewport::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let simulation_start = Instant::now();
                update_scene(frame_dt, &mut scene);
                let simulation = simulation_start.elapsed();

                let render_start = Instant::now();
                for sprite in &scene.sprites {
                    textures.draw(sprite);
                }
                if let Some(card) = &scene.title_card {
                    text::draw_title_card(card, scene.viewport);
                }
                let render = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation,
                    render,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        info!(
                            fps = format_args!("{:.2}", metrics.per_second),
                            fps_10s = format_args!("{:.2}", metrics.trailing_ten_seconds),
                            sim_ms = metrics.avg_simulation.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver
            .recv()
            .context("render loop ended before scene textures were loaded")??;

        Ok(())
    }
}

fn to_macroquad_color(color: warpfield_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(millis: u64) -> FrameBreakdown {
        FrameBreakdown {
            frame: Duration::from_millis(millis),
            simulation: Duration::from_millis(2),
            render: Duration::from_millis(4),
        }
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();

        for _ in 0..49 {
            assert!(counter.record_frame(frame(20)).is_none());
        }
        let metrics = counter
            .record_frame(frame(20))
            .expect("fifty 20ms frames fill one second");

        assert!((metrics.per_second - 50.0).abs() < 1e-3);
        assert!((metrics.trailing_ten_seconds - 50.0).abs() < 1e-3);
        assert_eq!(metrics.avg_simulation, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(4));
        assert!(counter.record_frame(frame(20)).is_none());
    }

    #[test]
    fn fps_counter_trailing_window_drops_old_frames() {
        let mut counter = FpsCounter::default();

        for _ in 0..10 {
            let _ = counter.record_frame(frame(1_000));
        }
        let _ = counter.record_frame(frame(500));

        assert!(counter.window_duration <= Duration::from_secs(10));
        assert_eq!(counter.frame_times.len(), 10);
    }

    #[test]
    fn backend_builder_applies_vsync_and_window_size() {
        let backend = MacroquadBackend::new()
            .with_vsync(true)
            .with_show_fps(true)
            .with_window_size(800, 600);

        assert_eq!(backend.swap_interval, Some(1));
        assert!(backend.show_fps);
        assert_eq!((backend.window_width, backend.window_height), (800, 600));
    }

    #[test]
    fn colors_convert_channel_for_channel() {
        let color = to_macroquad_color(warpfield_rendering::Color::new(0.1, 0.2, 0.3, 0.4));

        assert_eq!((color.r, color.g, color.b, color.a), (0.1, 0.2, 0.3, 0.4));
    }
}
