//! Per-frame uniform/storage record layouts shared between the CPU-side
//! orchestration code and the WGSL shaders in `shaders/`.
//!
//! Follows the explicit-alignment padding idiom of `resources/uniforms.rs`'s
//! `Mat3Padded` rather than relying on `encase`/`crevice` auto-layout, since
//! this module's record set is small and fixed.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::deferred::types::{CascadeShadow, MAX_JOINTS};

/// Bound once per frame at set 3 for `LightingPass` (and view/proj for
/// `ScenePass`/`ShadowPass`'s per-frame UBO).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: [f32; 3],
    pub light_count: u32,
    pub ambient_light: [f32; 3],
    pub cascade_count: u32,
}

impl FrameUniforms {
    #[must_use]
    pub fn new(
        view: Mat4,
        projection: Mat4,
        camera_position: Vec3,
        ambient_light: Vec3,
        light_count: u32,
        cascade_count: u32,
    ) -> Self {
        Self {
            view,
            projection,
            camera_position: camera_position.into(),
            light_count,
            ambient_light: ambient_light.into(),
            cascade_count,
        }
    }
}

/// One cascade's GPU-visible record: projView matrix + split distance,
/// padded to a 16-byte-aligned stride for the cascade storage buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CascadeGpu {
    pub proj_view: Mat4,
    pub split_distance: f32,
    pub _pad: [f32; 3],
}

impl From<CascadeShadow> for CascadeGpu {
    fn from(c: CascadeShadow) -> Self {
        Self { proj_view: c.proj_view, split_distance: c.split_distance, _pad: [0.0; 3] }
    }
}

/// Fixed-size cascade array uploaded to the cascade storage buffer; unused
/// trailing slots (beyond the configured cascade count) are zeroed.
pub const MAX_CASCADES: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CascadeArray {
    pub cascades: [CascadeGpu; MAX_CASCADES],
}

/// Shadow-tunable parameters, bound alongside the cascade array.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShadowParams {
    pub shadow_bias: f32,
    pub shadow_debug: u32,
    pub shadow_map_size: f32,
    pub point_light_attenuation_scale: f32,
}

/// Point-light distance scale from spec 9's "surfaced as a tunable" note.
/// Value (`0.2`) is unchanged from the source behavior it documents.
pub const POINT_LIGHT_ATTENUATION_SCALE: f32 = 0.2;

/// The five offsets `SkinCompute` needs per dispatch, carried via a
/// dynamic-offset uniform buffer in place of Vulkan push constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SkinningParams {
    pub src_offset: u32,
    pub src_size: u32,
    pub weights_offset: u32,
    pub joint_matrices_base: u32,
    pub dst_offset: u32,
    pub _pad: [u32; 3],
}

const _: () = assert!(MAX_JOINTS <= 4096, "joint index must fit the shader's array bound");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_uniforms_new_packs_vec3_fields_without_reordering() {
        let u = FrameUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3), 4, 2);
        assert_eq!(u.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(u.ambient_light, [0.1, 0.2, 0.3]);
        assert_eq!(u.light_count, 4);
        assert_eq!(u.cascade_count, 2);
    }

    #[test]
    fn cascade_gpu_from_cascade_shadow_zeroes_padding() {
        let shadow = CascadeShadow { proj_view: Mat4::IDENTITY, split_distance: -12.5 };
        let gpu: CascadeGpu = shadow.into();
        assert_eq!(gpu.proj_view, Mat4::IDENTITY);
        assert_eq!(gpu.split_distance, -12.5);
        assert_eq!(gpu._pad, [0.0; 3]);
    }

    #[test]
    fn cascade_array_holds_exactly_max_cascades_entries() {
        assert_eq!(std::mem::size_of::<CascadeArray>(), MAX_CASCADES * std::mem::size_of::<CascadeGpu>());
    }
}
