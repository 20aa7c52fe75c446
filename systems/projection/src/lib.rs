#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure projection system mapping stars onto screen-space sprite transforms.
//!
//! Stars are projected through a pinhole camera sitting at the world's camera
//! depth. Both screen axes are scaled by the viewport width so the radial
//! spread of the field is not distorted by the window's aspect ratio.

use std::f32::consts::FRAC_PI_2;

use warpfield_core::{ProjectionTuning, Star, StarTransform, Viewport, VISIBLE_DEPTH};

/// Linear size falloff for a star `z` units in front of the camera.
///
/// Stars at or beyond [`VISIBLE_DEPTH`] collapse to a zero scale.
#[must_use]
pub fn depth_scale(z: f32) -> f32 {
    ((VISIBLE_DEPTH - z) / VISIBLE_DEPTH).max(0.0)
}

/// Projects a single star onto the viewport.
///
/// The caller guarantees `star.depth() > camera_depth`; the world recycles
/// every star that falls behind the camera before projection happens.
#[must_use]
pub fn project(
    star: &Star,
    camera_depth: f64,
    speed: f32,
    viewport: Viewport,
    tuning: &ProjectionTuning,
) -> StarTransform {
    let z = (star.depth() - camera_depth) as f32;
    debug_assert!(z > 0.0, "star projected from behind the camera (z = {z})");

    let perspective = tuning.field_of_view / z * viewport.width;
    let x = star.x() * perspective + viewport.center_x();
    let y = star.y() * perspective + viewport.center_y();

    let dx = x - viewport.center_x();
    let dy = y - viewport.center_y();
    let distance_from_center = dx.hypot(dy);
    let scale = depth_scale(z);

    let scale_x = scale * tuning.base_size;
    // The long axis points away from the vanishing point, so the streak grows
    // with speed and with distance from the screen centre.
    let scale_y = scale * tuning.base_size
        + scale * speed * tuning.stretch_factor * distance_from_center / viewport.width;

    StarTransform {
        x,
        y,
        scale_x,
        scale_y,
        rotation: dy.atan2(dx) + FRAC_PI_2,
    }
}

/// Batch projection over the star arena.
#[derive(Clone, Copy, Debug, Default)]
pub struct Projection;

impl Projection {
    /// Projects every star in index order, replacing the contents of `out`.
    pub fn handle(
        &self,
        stars: &[Star],
        camera_depth: f64,
        speed: f32,
        viewport: Viewport,
        tuning: &ProjectionTuning,
        out: &mut Vec<StarTransform>,
    ) {
        out.clear();
        out.extend(
            stars
                .iter()
                .map(|star| project(star, camera_depth, speed, viewport, tuning)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn tuning() -> ProjectionTuning {
        ProjectionTuning {
            field_of_view: 20.0,
            base_speed: 0.025,
            stretch_factor: 5.0,
            base_size: 0.05,
        }
    }

    #[test]
    fn projects_star_through_pinhole_camera() {
        let star = Star::new(500.0, 10.0, 0.0);
        let viewport = Viewport::new(1000.0, 1000.0);

        let transform = project(&star, 0.25, 0.0, viewport, &tuning());

        let expected_x = 10.0 * (20.0 / 499.75) * 1000.0 + 500.0;
        assert!((transform.x - expected_x).abs() < EPSILON);
        assert!((transform.x - 900.2).abs() < 0.1);
        assert!((transform.y - 500.0).abs() < EPSILON);
        assert!((transform.rotation - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn distant_camera_projects_like_camera_near_origin() {
        let viewport = Viewport::new(1000.0, 1000.0);
        let near = project(&Star::new(500.0, 10.0, 0.0), 0.25, 0.0, viewport, &tuning());
        let far = project(
            &Star::new(8_500_500.0, 10.0, 0.0),
            8_500_000.25,
            0.0,
            viewport,
            &tuning(),
        );

        assert!((far.x - near.x).abs() < EPSILON);
        assert!((far.scale_x - near.scale_x).abs() < 1e-6);
    }

    #[test]
    fn vertical_offset_is_scaled_by_width_not_height() {
        let star = Star::new(100.0, 0.0, 1.0);
        let viewport = Viewport::new(1600.0, 400.0);

        let transform = project(&star, 0.0, 0.0, viewport, &tuning());

        assert!((transform.y - (0.2 * 1600.0 + 200.0)).abs() < EPSILON);
        assert!((transform.x - 800.0).abs() < EPSILON);
    }

    #[test]
    fn depth_scale_is_clamped_to_unit_interval() {
        assert_eq!(depth_scale(0.0), 1.0);
        assert!((depth_scale(1000.0) - 0.5).abs() < f32::EPSILON);
        assert_eq!(depth_scale(2000.0), 0.0);
        assert_eq!(depth_scale(3000.0), 0.0);
        for z in [0.001, 1.0, 250.0, 1999.0, 2500.0, 1.0e6] {
            let scale = depth_scale(z);
            assert!((0.0..=1.0).contains(&scale));
        }
    }

    #[test]
    fn far_stars_have_zero_scale() {
        let star = Star::new(2_800.0, 20.0, 20.0);
        let transform = project(&star, 0.0, 1.0, Viewport::new(800.0, 600.0), &tuning());

        assert_eq!(transform.scale_x, 0.0);
        assert_eq!(transform.scale_y, 0.0);
    }

    #[test]
    fn stretch_grows_with_speed() {
        let star = Star::new(400.0, 30.0, -12.0);
        let viewport = Viewport::new(1280.0, 720.0);

        let cruise = project(&star, 0.0, 0.0, viewport, &tuning());
        let warp = project(&star, 0.0, 1.0, viewport, &tuning());

        assert_eq!(cruise.scale_x, warp.scale_x);
        assert!((cruise.scale_y - cruise.scale_x).abs() < f32::EPSILON);
        assert!(warp.scale_y > cruise.scale_y);
    }

    #[test]
    fn rotation_points_away_from_vanishing_point() {
        let viewport = Viewport::new(1000.0, 1000.0);
        let below = project(&Star::new(500.0, 0.0, 10.0), 0.0, 0.0, viewport, &tuning());
        let left = project(&Star::new(500.0, -10.0, 0.0), 0.0, 0.0, viewport, &tuning());

        assert!((below.rotation - std::f32::consts::PI).abs() < EPSILON);
        assert!((left.rotation - (std::f32::consts::PI + FRAC_PI_2)).abs() < EPSILON);
    }

    #[test]
    fn batch_projection_preserves_star_order() {
        let stars = [Star::new(300.0, 5.0, 0.0), Star::new(600.0, -5.0, 0.0)];
        let viewport = Viewport::new(1000.0, 500.0);
        let mut out = vec![project(&stars[1], 0.0, 0.0, viewport, &tuning())];

        Projection.handle(&stars, 0.0, 0.0, viewport, &tuning(), &mut out);

        assert_eq!(out.len(), 2);
        assert!(out[0].x > viewport.center_x());
        assert!(out[1].x < viewport.center_x());
    }
}
