//! Cascade-split and light-space matrix computation for [`super::shadow`].
//!
//! Function decomposition follows `renderer::graph::shadow_utils`
//! (`compute_cascade_splits`/`compute_frustum_corners_world`/
//! `build_cascade_vp`), but every formula below is the spec's own —
//! the teacher's own cascade math is a different, lambda-blended variant.

use glam::{Mat4, Vec3, Vec4Swizzles};

use crate::renderer::deferred::scene_data::SceneCamera;
use crate::renderer::deferred::types::CascadeShadow;

/// Computes per-cascade split fractions using the spec 4.4 logarithmic/
/// uniform blend (fixed 0.95 weight, not a tunable lambda).
#[must_use]
pub fn compute_cascade_splits(cascade_count: u32, near: f32, far: f32) -> Vec<f32> {
    (0..cascade_count)
        .map(|i| {
            let p = f64::from(i + 1) / f64::from(cascade_count);
            let log_d = f64::from(near) * (f64::from(far) / f64::from(near)).powf(p);
            let lin_d = f64::from(near) + f64::from(far - near) * p;
            let d_i = 0.95 * (log_d - lin_d) + lin_d;
            ((d_i - f64::from(near)) / f64::from(far - near)) as f32
        })
        .collect()
}

/// The 8 frustum corners in world space for the camera sub-range
/// `[near_fraction, far_fraction]` of its full `[near, far]` range.
#[must_use]
pub fn compute_frustum_corners_world(camera: &SceneCamera, near_fraction: f32, far_fraction: f32) -> [Vec3; 8] {
    let inv_view_proj = (camera.projection_matrix * camera.view_matrix).inverse();

    let ndc_corners = [
        (-1.0, -1.0, 0.0), (1.0, -1.0, 0.0), (1.0, 1.0, 0.0), (-1.0, 1.0, 0.0),
        (-1.0, -1.0, 1.0), (1.0, -1.0, 1.0), (1.0, 1.0, 1.0), (-1.0, 1.0, 1.0),
    ];

    let mut world_corners = [Vec3::ZERO; 8];
    for (i, (x, y, z)) in ndc_corners.into_iter().enumerate() {
        let clip = glam::Vec4::new(x, y, z, 1.0);
        let world = inv_view_proj * clip;
        world_corners[i] = world.xyz() / world.w;
    }

    // Shrink each near->far corner pair to [near_fraction, far_fraction].
    let mut result = [Vec3::ZERO; 8];
    for i in 0..4 {
        let near_corner = world_corners[i];
        let far_corner = world_corners[i + 4];
        result[i] = near_corner + (far_corner - near_corner) * near_fraction;
        result[i + 4] = near_corner + (far_corner - near_corner) * far_fraction;
    }
    result
}

/// Builds one cascade's light-space projection-view matrix and applies the
/// texel-snap stabilization described in spec 4.4 step 7.
#[must_use]
pub fn build_cascade_vp(light_direction: Vec3, frustum_corners: &[Vec3; 8], shadow_map_size: u32) -> Mat4 {
    let center = frustum_corners.iter().copied().sum::<Vec3>() / 8.0;
    let mut radius = frustum_corners.iter().map(|c| (*c - center).length()).fold(0.0f32, f32::max);
    // Round up to the nearest 1/16 for temporal stability.
    radius = (radius * 16.0).ceil() / 16.0;

    let up = if light_direction.normalize().abs_diff_eq(Vec3::Y, 1e-3) { Vec3::Z } else { Vec3::Y };
    let eye = center - light_direction.normalize() * radius;
    let light_view = Mat4::look_at_rh(eye, center, up);

    let mut light_ortho = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 2.0 * radius);

    // Stabilization: snap the world origin to a shadow texel.
    let origin_light_space = light_view.transform_point3(Vec3::ZERO);
    let texel_size = shadow_map_size as f32 / 2.0;
    let origin_texels = (origin_light_space * texel_size).round();
    let rounded_origin = origin_texels / texel_size;
    let offset = (rounded_origin - origin_light_space) * (2.0 / shadow_map_size as f32);

    light_ortho.w_axis.x += offset.x;
    light_ortho.w_axis.y += offset.y;

    light_ortho * light_view
}

/// Builds the full per-cascade list plus view-space split distances for a
/// directional ("sun") light, per spec 4.4 steps 1-8.
#[must_use]
pub fn build_cascades(
    camera: &SceneCamera,
    light_direction: Vec3,
    cascade_count: u32,
    shadow_map_size: u32,
) -> Vec<CascadeShadow> {
    let near = camera.near;
    let far = camera.far;
    let splits = compute_cascade_splits(cascade_count, near, far);

    let mut last_split = 0.0f32;
    let mut cascades = Vec::with_capacity(cascade_count as usize);
    for &split_fraction in &splits {
        let corners = compute_frustum_corners_world(camera, last_split, split_fraction);
        let proj_view = build_cascade_vp(light_direction, &corners, shadow_map_size);
        // View space looks down -Z, so the split distance is stored negative.
        let split_distance = -(near + split_fraction * (far - near));
        cascades.push(CascadeShadow { proj_view, split_distance });
        last_split = split_fraction;
    }
    cascades
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_are_monotonic_and_cover_far_plane() {
        let splits = compute_cascade_splits(3, 0.1, 100.0);
        assert_eq!(splits.len(), 3);
        for pair in splits.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!((splits.last().unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn stabilized_origin_has_zero_fractional_texel_offset() {
        let camera = SceneCamera {
            position: Vec3::new(0.0, 5.0, 10.0),
            view_matrix: Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y),
            projection_matrix: Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 50.0),
            near: 0.1,
            far: 50.0,
        };
        let corners = compute_frustum_corners_world(&camera, 0.0, 1.0);
        let light_dir = Vec3::new(-0.3, -1.0, -0.2).normalize();
        let vp = build_cascade_vp(light_dir, &corners, 2048);

        // Recompute the light-view alone to check the origin snaps cleanly.
        let center = corners.iter().copied().sum::<Vec3>() / 8.0;
        let mut radius = corners.iter().map(|c| (*c - center).length()).fold(0.0f32, f32::max);
        radius = (radius * 16.0).ceil() / 16.0;
        let up = if light_dir.abs_diff_eq(Vec3::Y, 1e-3) { Vec3::Z } else { Vec3::Y };
        let eye = center - light_dir * radius;
        let light_view = Mat4::look_at_rh(eye, center, up);

        let origin_clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let _ = light_view; // used above only to document derivation
        let texel_size = 2048f32 / 2.0;
        let ndc_x_texels = origin_clip.x * texel_size;
        assert!((ndc_x_texels.round() - ndc_x_texels).abs() < 0.05);
    }
}
