//! Title card rendering.
//!
//! Macroquad's built-in font ships a single face, so italic and bold flags are
//! not honoured and the vertical fill gradient is approximated by its midpoint
//! color. Outlines are drawn by stamping the glyphs around a ring of offsets.

use std::f32::consts::TAU;

use glam::Vec2;
use macroquad::text::{draw_text_ex, measure_text, TextParams};
use warpfield_core::Viewport;
use warpfield_rendering::{Color, TextStyle, TitleCard};

use crate::to_macroquad_color;

const STROKE_SAMPLES: usize = 12;

/// Draws every label of the card centred on its row.
pub(crate) fn draw_title_card(card: &TitleCard, viewport: Viewport) {
    for placed in card.layout(viewport) {
        let label = placed.label;
        let dimensions = measure_text(&label.text, None, label.style.font_size, 1.0);
        let baseline = baseline_origin(
            placed.center,
            Vec2::new(dimensions.width, dimensions.height),
            dimensions.offset_y,
        );
        draw_styled_text(&label.text, baseline, &label.style);
    }
}

/// Converts a label centre into the baseline origin macroquad draws from.
pub(crate) fn baseline_origin(center: Vec2, size: Vec2, offset_y: f32) -> Vec2 {
    Vec2::new(center.x - size.x / 2.0, center.y - size.y / 2.0 + offset_y)
}

/// Offsets around the glyphs used to fake an outline of the given thickness.
pub(crate) fn stroke_offsets(thickness: f32) -> Vec<Vec2> {
    if thickness <= 0.0 {
        return Vec::new();
    }

    // Strokes straddle the glyph edge.
    let radius = thickness / 2.0;
    (0..STROKE_SAMPLES)
        .map(|sample| {
            let angle = TAU * sample as f32 / STROKE_SAMPLES as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn draw_styled_text(text: &str, origin: Vec2, style: &TextStyle) {
    let stroke = stroke_offsets(style.stroke_thickness);

    if let Some(shadow) = style.drop_shadow {
        let shadow_origin = origin + shadow.offset();
        stamp(text, shadow_origin, &stroke, style.font_size, shadow.color);
        stamp_once(text, shadow_origin, style.font_size, shadow.color);
    }

    stamp(text, origin, &stroke, style.font_size, style.stroke);

    let fill = style.fill.top.lerp(style.fill.bottom, 0.5);
    stamp_once(text, origin, style.font_size, fill);
}

fn stamp(text: &str, origin: Vec2, offsets: &[Vec2], font_size: u16, color: Color) {
    for offset in offsets {
        stamp_once(text, origin + *offset, font_size, color);
    }
}

fn stamp_once(text: &str, origin: Vec2, font_size: u16, color: Color) {
    draw_text_ex(
        text,
        origin.x,
        origin.y,
        TextParams {
            font_size,
            color: to_macroquad_color(color),
            ..TextParams::default()
        },
    );
}
