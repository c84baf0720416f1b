//! Core data-model types for the deferred render graph: vertices, meshes,
//! models, materials, textures, entities and lights.
//!
//! Layout-sensitive types are `#[repr(C)]` + `bytemuck::Pod` so they can be
//! copied straight into GPU storage buffers without per-field marshalling.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Byte stride of one [`Vertex`] record in the global vertex buffer.
pub const VERTEX_STRIDE: u64 = 56;
/// Byte stride of one [`WeightRecord`] in the global weights buffer.
pub const WEIGHT_STRIDE: u64 = 32;
/// Byte stride of one packed instance record (model matrix + material index).
pub const INSTANCE_STRIDE: u64 = 64 + 4;
/// Maximum joint matrices per animation frame.
pub const MAX_JOINTS: usize = 256;
/// Sentinel texture index meaning "no texture bound".
pub const TEXTURE_INDEX_NONE: u32 = u32::MAX;

/// One per-vertex record: position, normal, tangent, bitangent, uv.
/// Fixed 56-byte stride, matching the bind-pose and skinned vertex buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Vertex>() as u64 == VERTEX_STRIDE);

/// Four joint weights plus four joint indices (stored as f32, per spec 3.1).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct WeightRecord {
    pub weights: [f32; 4],
    pub joint_indices: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<WeightRecord>() as u64 == WEIGHT_STRIDE);

/// One packed per-instance record consumed as a second, per-instance-rate
/// vertex-input binding by `ScenePass`/`ShadowPass`. Stride is exactly
/// `64 + 4` bytes per spec 3.2 — `[[f32; 4]; 4]` has 4-byte alignment in
/// `repr(C)`, so no implicit padding is inserted after `material_index`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceRecord {
    pub model_matrix: [[f32; 4]; 4],
    pub material_index: u32,
}

const _: () = assert!(std::mem::size_of::<InstanceRecord>() as u64 == INSTANCE_STRIDE);

/// GPU-resident material record, std430-aligned with explicit trailing padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuMaterial {
    pub diffuse_color: Vec4,
    pub albedo_texture: u32,
    pub normal_texture: u32,
    pub metallic_roughness_texture: u32,
    pub _pad0: u32,
    pub roughness_factor: f32,
    pub metallic_factor: f32,
    pub _pad1: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<GpuMaterial>() % 16 == 0);

impl Default for GpuMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: Vec4::ONE,
            albedo_texture: TEXTURE_INDEX_NONE,
            normal_texture: TEXTURE_INDEX_NONE,
            metallic_roughness_texture: TEXTURE_INDEX_NONE,
            _pad0: 0,
            roughness_factor: 1.0,
            metallic_factor: 0.0,
            _pad1: [0.0; 2],
        }
    }
}

/// GPU-resident light record. `position.w == 0` marks a directional light
/// (`position.xyz` is then read as a direction); `w == 1` marks a point light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuLight {
    pub position: Vec4,
    pub color: Vec4,
}

impl GpuLight {
    #[must_use]
    pub fn directional(direction: glam::Vec3, color: glam::Vec3) -> Self {
        Self {
            position: direction.extend(0.0),
            color: color.extend(0.0),
        }
    }

    #[must_use]
    pub fn point(position: glam::Vec3, color: glam::Vec3) -> Self {
        Self {
            position: position.extend(1.0),
            color: color.extend(0.0),
        }
    }

    #[must_use]
    pub fn is_directional(&self) -> bool {
        self.position.w == 0.0
    }
}

/// One CPU-side mesh descriptor: an offset/size view into the global buffers.
#[derive(Debug, Clone, Copy)]
pub struct Mesh {
    pub vertex_offset: u64,
    pub vertex_size: u64,
    pub index_offset: u64,
    pub index_count: u32,
    pub material_index: u32,
    /// Byte offset into the global weights buffer; `None` if unskinned.
    pub weights_offset: Option<u64>,
}

impl Mesh {
    /// Validates the invariants named in spec 3.1: `vertex_size` is a whole
    /// number of vertex strides, and the index range fits the index buffer.
    pub fn validate(&self, index_buffer_len: u64) -> Result<(), crate::errors::RenderError> {
        if self.vertex_size % VERTEX_STRIDE != 0 {
            return Err(crate::errors::RenderError::InvalidManifest(format!(
                "mesh vertex_size {} is not a multiple of the vertex stride {VERTEX_STRIDE}",
                self.vertex_size
            )));
        }
        let index_end = self.index_offset + u64::from(self.index_count) * 4;
        if index_end > index_buffer_len {
            return Err(crate::errors::RenderError::InvalidManifest(format!(
                "mesh index range [{}, {}) exceeds index buffer of {} bytes",
                self.index_offset, index_end, index_buffer_len
            )));
        }
        Ok(())
    }
}

/// One animation frame: an offset into the joint-matrices buffer plus the
/// number of joints actually present (<= `MAX_JOINTS`).
#[derive(Debug, Clone, Copy)]
pub struct AnimationFrame {
    pub joint_matrices_offset: u64,
    pub joint_count: u32,
}

/// One animation clip: an ordered list of frames.
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
}

/// Dense identifier for a loaded [`Model`] within `GlobalBuffers`.
pub type ModelId = u32;

/// Immutable-after-load model: an ordered mesh list plus optional animations.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub id: ModelId,
    pub meshes: Vec<Mesh>,
    pub animations: Vec<AnimationClip>,
}

impl Model {
    /// A model is either fully skinned (every mesh carries weights) or fully
    /// static; mixed models violate the spec 3.1 invariant.
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.meshes.is_empty() && self.meshes.iter().all(|m| m.weights_offset.is_some())
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.meshes.iter().all(|m| m.weights_offset.is_none())
    }
}

/// Per-entity animation playback state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationState {
    pub clip: usize,
    pub frame: usize,
    pub started: bool,
}

/// Scene-resident, mutable instance of a [`Model`].
#[derive(Debug, Clone)]
pub struct Entity {
    pub model: ModelId,
    pub transform: Mat4,
    pub animation: Option<AnimationState>,
}

impl Entity {
    #[must_use]
    pub fn new_static(model: ModelId, transform: Mat4) -> Self {
        Self { model, transform, animation: None }
    }

    #[must_use]
    pub fn new_animated(model: ModelId, transform: Mat4, animation: AnimationState) -> Self {
        Self { model, transform, animation: Some(animation) }
    }
}

/// One cascade split: the light-space projection-view matrix and the
/// view-space far-plane distance it covers (negative, per spec 4.4).
#[derive(Debug, Clone, Copy)]
pub struct CascadeShadow {
    pub proj_view: Mat4,
    pub split_distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(weights_offset: Option<u64>) -> Mesh {
        Mesh { vertex_offset: 0, vertex_size: VERTEX_STRIDE, index_offset: 0, index_count: 3, material_index: 0, weights_offset }
    }

    #[test]
    fn model_with_all_weighted_meshes_is_skinned() {
        let model = Model { id: 0, meshes: vec![mesh(Some(0)), mesh(Some(96))], animations: vec![] };
        assert!(model.is_skinned());
        assert!(!model.is_static());
    }

    #[test]
    fn model_with_no_weighted_meshes_is_static() {
        let model = Model { id: 0, meshes: vec![mesh(None), mesh(None)], animations: vec![] };
        assert!(model.is_static());
        assert!(!model.is_skinned());
    }

    #[test]
    fn model_with_mixed_meshes_is_neither() {
        let model = Model { id: 0, meshes: vec![mesh(Some(0)), mesh(None)], animations: vec![] };
        assert!(!model.is_skinned());
        assert!(!model.is_static());
    }

    #[test]
    fn model_with_no_meshes_is_static_but_not_skinned() {
        let model = Model { id: 0, meshes: vec![], animations: vec![] };
        assert!(model.is_static());
        assert!(!model.is_skinned());
    }

    #[test]
    fn mesh_validate_rejects_misaligned_vertex_size() {
        let m = Mesh { vertex_offset: 0, vertex_size: VERTEX_STRIDE + 1, index_offset: 0, index_count: 3, material_index: 0, weights_offset: None };
        assert!(m.validate(1024).is_err());
    }

    #[test]
    fn mesh_validate_rejects_index_range_past_buffer_end() {
        let m = mesh(None);
        assert!(m.validate(0).is_err());
        assert!(m.validate(12).is_ok());
    }

    #[test]
    fn gpu_light_directional_and_point_round_trip_w_tag() {
        let dir = GpuLight::directional(glam::Vec3::Y, glam::Vec3::ONE);
        assert!(dir.is_directional());
        let point = GpuLight::point(glam::Vec3::ZERO, glam::Vec3::ONE);
        assert!(!point.is_directional());
    }
}
