//! `GlobalBuffers` — consolidates all static mesh/material/joint/weight data
//! and the per-frame indirect-draw + instance streams into a small, fixed
//! set of GPU-resident storage buffers.
//!
//! Grounded on the version-gated upload pattern of
//! `core::resources::buffer::ResourceManager::write_buffer`, generalized
//! from per-object heterogeneous buffers to the handful of big concatenated
//! buffers this data model needs.

use bytemuck::cast_slice;
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::errors::{RenderError, RenderResult};
use crate::renderer::deferred::texture_cache::TextureCache;
use crate::renderer::deferred::types::{
    AnimationClip, AnimationFrame, Entity, GpuMaterial, INSTANCE_STRIDE, InstanceRecord, Mesh,
    Model, ModelId, VERTEX_STRIDE, WEIGHT_STRIDE,
};
use crate::renderer::settings::DeferredSettings;

/// One GPU-indirect draw command, matching `wgpu::util::DrawIndexedIndirectArgs`
/// byte layout (`vkCmdDrawIndexedIndirect`'s `VkDrawIndexedIndirectCommand`).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedIndirectCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// Per-entity-mesh bookkeeping needed by `SkinCompute` to dispatch one
/// skinning pass per animated entity-mesh.
#[derive(Debug, Clone, Copy)]
pub struct SkinningJob {
    pub src_offset: u32,
    pub src_size: u32,
    pub weights_offset: u32,
    pub joint_matrices_base: u32,
    pub dst_offset: u32,
    pub vertex_count: u32,
}

/// A source model descriptor as consumed by [`GlobalBuffers::load_models`].
pub struct ModelSource {
    pub id: ModelId,
    pub meshes: Vec<MeshSource>,
    pub animations: Vec<AnimationClipSource>,
}

/// One animation frame as read from a manifest: the raw joint-matrix bytes,
/// not yet appended to the global joint-matrices buffer.
pub struct AnimationFrameSource {
    pub joint_matrices: Vec<u8>,
}

/// One animation clip as read from a manifest: an ordered list of raw frames.
pub struct AnimationClipSource {
    pub frames: Vec<AnimationFrameSource>,
}

/// A source mesh: raw vertex/index/weight bytes plus the material it binds.
pub struct MeshSource {
    pub vertices: Vec<u8>,
    pub indices: Vec<u8>,
    pub material_index: u32,
    pub weights: Option<Vec<u8>>,
}

fn grow_capacity_error(resource: &'static str, requested: u64, capacity: u64) -> RenderError {
    RenderError::CapacityExceeded { resource, requested, capacity }
}

/// Pure result of [`build_indirect_streams`] — no GPU resources, so it's
/// exercisable from a plain test without a live `wgpu::Device`.
pub struct IndirectStreams {
    pub static_cmds: Vec<DrawIndexedIndirectCommand>,
    pub anim_cmds: Vec<DrawIndexedIndirectCommand>,
    pub skinning_jobs: Vec<SkinningJob>,
    pub skinned_dst_cursor: u64,
}

/// Builds the static and animated indirect-draw command streams plus the
/// per-entity-mesh skinning-job list for `entities` against `models`
/// (spec 4.1, spec 8.3 scenario 4). Split out of [`GlobalBuffers::load_entities`]
/// so the command-building logic is testable without a device: it performs
/// no GPU calls at all.
pub fn build_indirect_streams(models: &[Model], entities: &[Entity]) -> RenderResult<IndirectStreams> {
    let mut static_cmds: Vec<DrawIndexedIndirectCommand> = Vec::new();
    let mut anim_cmds: Vec<DrawIndexedIndirectCommand> = Vec::new();
    let mut skinning_jobs: Vec<SkinningJob> = Vec::new();

    let mut static_instance_count = 0u32;
    let mut skinned_dst_cursor = 0u64;

    // Static stream: one command per (model, mesh) batching all of that
    // model's entities as instances.
    for model in models {
        if model.is_static() {
            let count = entities.iter().filter(|e| e.model == model.id).count() as u32;
            if count == 0 {
                continue;
            }
            for mesh in &model.meshes {
                static_cmds.push(DrawIndexedIndirectCommand {
                    index_count: mesh.index_count,
                    instance_count: count,
                    first_index: (mesh.index_offset / 4) as u32,
                    vertex_offset: (mesh.vertex_offset / VERTEX_STRIDE) as i32,
                    first_instance: static_instance_count,
                });
                static_instance_count += 1;
            }
        }
    }

    // Animated stream: one command per animated entity-mesh, instance_count = 1.
    for (entity_idx, entity) in entities.iter().enumerate() {
        let Some(model) = models.iter().find(|m| m.id == entity.model) else { continue };
        if !model.is_skinned() {
            continue;
        }
        for mesh in &model.meshes {
            let dst_offset = skinned_dst_cursor;
            skinned_dst_cursor += mesh.vertex_size;

            anim_cmds.push(DrawIndexedIndirectCommand {
                index_count: mesh.index_count,
                instance_count: 1,
                first_index: (mesh.index_offset / 4) as u32,
                vertex_offset: (dst_offset / VERTEX_STRIDE) as i32,
                first_instance: entity_idx as u32,
            });

            let weights_offset = mesh
                .weights_offset
                .ok_or_else(|| RenderError::InvalidManifest("skinned mesh missing weights_offset".into()))?;

            skinning_jobs.push(SkinningJob {
                src_offset: mesh.vertex_offset as u32,
                src_size: mesh.vertex_size as u32,
                weights_offset: weights_offset as u32,
                // Set for real by `GlobalBuffers::refresh_skinning_jobs`, which
                // runs every frame regardless of whether the entity set changed.
                joint_matrices_base: 0,
                dst_offset: dst_offset as u32,
                vertex_count: mesh.vertex_size as u32 / VERTEX_STRIDE as u32,
            });
        }
    }

    Ok(IndirectStreams { static_cmds, anim_cmds, skinning_jobs, skinned_dst_cursor })
}

/// Owns all GPU-resident scene data and the indirect-draw command stream.
pub struct GlobalBuffers {
    vertices: wgpu::Buffer,
    vertices_len: u64,
    vertices_cap: u64,

    indices: wgpu::Buffer,
    indices_len: u64,
    indices_cap: u64,

    materials: wgpu::Buffer,
    materials_len: u32,
    materials_cap: u32,

    joint_matrices: wgpu::Buffer,
    joint_matrices_len: u64,
    joint_matrices_cap: u64,

    weights: wgpu::Buffer,
    weights_len: u64,
    weights_cap: u64,

    skinned_vertices: Option<wgpu::Buffer>,
    skinned_vertices_len: u64,

    indirect_static: Option<wgpu::Buffer>,
    indirect_static_count: u32,
    indirect_anim: Option<wgpu::Buffer>,
    indirect_anim_count: u32,

    instance_static: Vec<wgpu::Buffer>,
    instance_static_cap: Vec<u64>,
    instance_anim: Vec<wgpu::Buffer>,
    instance_anim_cap: Vec<u64>,

    models: Vec<Model>,
    skinning_jobs: Vec<SkinningJob>,
}

impl GlobalBuffers {
    #[must_use]
    pub fn new(device: &wgpu::Device, settings: &DeferredSettings) -> Self {
        let make = |cap: u64, usage: wgpu::BufferUsages, label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: cap.max(16),
                usage,
                mapped_at_creation: false,
            })
        };
        let storage_rw = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
        let materials_cap_bytes =
            u64::from(settings.max_materials) * u64::from(std::mem::size_of::<GpuMaterial>() as u32);

        let instance_bufs = |count: u32, label: &str| -> Vec<wgpu::Buffer> {
            (0..count)
                .map(|i| {
                    device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(&format!("{label}[{i}]")),
                        size: INSTANCE_STRIDE.max(16),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    })
                })
                .collect()
        };

        Self {
            vertices: make(settings.max_vertices_buffer, storage_rw | wgpu::BufferUsages::VERTEX, "GlobalVertices"),
            vertices_len: 0,
            vertices_cap: settings.max_vertices_buffer,

            indices: make(settings.max_indices_buffer, storage_rw | wgpu::BufferUsages::INDEX, "GlobalIndices"),
            indices_len: 0,
            indices_cap: settings.max_indices_buffer,

            materials: make(materials_cap_bytes, storage_rw, "GlobalMaterials"),
            materials_len: 0,
            materials_cap: settings.max_materials,

            joint_matrices: make(settings.max_joint_matrices_buffer, storage_rw, "GlobalJointMatrices"),
            joint_matrices_len: 0,
            joint_matrices_cap: settings.max_joint_matrices_buffer,

            weights: make(settings.max_anim_weights_buffer, storage_rw, "GlobalWeights"),
            weights_len: 0,
            weights_cap: settings.max_anim_weights_buffer,

            skinned_vertices: None,
            skinned_vertices_len: 0,

            indirect_static: None,
            indirect_static_count: 0,
            indirect_anim: None,
            indirect_anim_count: 0,

            instance_static: instance_bufs(settings.frames_in_flight, "InstanceStatic"),
            instance_static_cap: vec![INSTANCE_STRIDE; settings.frames_in_flight as usize],
            instance_anim: instance_bufs(settings.frames_in_flight, "InstanceAnim"),
            instance_anim_cap: vec![INSTANCE_STRIDE; settings.frames_in_flight as usize],

            models: Vec::new(),
            skinning_jobs: Vec::new(),
        }
    }

    #[must_use]
    pub fn vertices_buffer(&self) -> &wgpu::Buffer {
        &self.vertices
    }
    #[must_use]
    pub fn indices_buffer(&self) -> &wgpu::Buffer {
        &self.indices
    }
    #[must_use]
    pub fn materials_buffer(&self) -> &wgpu::Buffer {
        &self.materials
    }
    #[must_use]
    pub fn joint_matrices_buffer(&self) -> &wgpu::Buffer {
        &self.joint_matrices
    }
    #[must_use]
    pub fn weights_buffer(&self) -> &wgpu::Buffer {
        &self.weights
    }
    #[must_use]
    pub fn skinned_vertices_buffer(&self) -> Option<&wgpu::Buffer> {
        self.skinned_vertices.as_ref()
    }
    #[must_use]
    pub fn indirect_static_buffer(&self) -> Option<(&wgpu::Buffer, u32)> {
        self.indirect_static.as_ref().map(|b| (b, self.indirect_static_count))
    }
    #[must_use]
    pub fn indirect_anim_buffer(&self) -> Option<(&wgpu::Buffer, u32)> {
        self.indirect_anim.as_ref().map(|b| (b, self.indirect_anim_count))
    }
    #[must_use]
    pub fn instance_static_buffer(&self, frame_index: usize) -> &wgpu::Buffer {
        &self.instance_static[frame_index % self.instance_static.len()]
    }
    #[must_use]
    pub fn instance_anim_buffer(&self, frame_index: usize) -> &wgpu::Buffer {
        &self.instance_anim[frame_index % self.instance_anim.len()]
    }
    #[must_use]
    pub fn models(&self) -> &[Model] {
        &self.models
    }
    #[must_use]
    pub fn skinning_jobs(&self) -> &[SkinningJob] {
        &self.skinning_jobs
    }

    /// Load contract (spec 4.1): consolidates static geometry, materials,
    /// joints and weights into the global buffers in one staging submission.
    pub fn load_models(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_cache: &mut TextureCache,
        sources: Vec<(ModelSource, Vec<MaterialSource>)>,
    ) -> RenderResult<()> {
        // Default material at index 0, per spec 4.1.
        if self.materials_len == 0 {
            self.append_material(device, queue, GpuMaterial::default())?;
        }

        let mut vertex_bytes: Vec<u8> = Vec::new();
        let mut index_bytes: Vec<u8> = Vec::new();
        let mut weight_bytes: Vec<u8> = Vec::new();
        let mut joint_bytes: Vec<u8> = Vec::new();

        for (model_source, materials) in sources {
            let material_base = self.materials_len;
            for material in &materials {
                let record = material.resolve(texture_cache);
                self.append_material(device, queue, record)?;
            }

            let mut model = Model { id: model_source.id, meshes: Vec::new(), animations: Vec::new() };

            for mesh_source in &model_source.meshes {
                let vertex_offset = self.vertices_len + vertex_bytes.len() as u64;
                let index_offset = self.indices_len + index_bytes.len() as u64;
                let weights_offset = mesh_source.weights.as_ref().map(|_| {
                    self.weights_len + weight_bytes.len() as u64
                });

                vertex_bytes.extend_from_slice(&mesh_source.vertices);
                index_bytes.extend_from_slice(&mesh_source.indices);
                if let Some(weights) = &mesh_source.weights {
                    weight_bytes.extend_from_slice(weights);
                }

                let mesh = Mesh {
                    vertex_offset,
                    vertex_size: mesh_source.vertices.len() as u64,
                    index_offset,
                    index_count: mesh_source.indices.len() as u32 / 4,
                    material_index: material_base + mesh_source.material_index,
                    weights_offset,
                };
                mesh.validate(self.indices_cap)?;
                model.meshes.push(mesh);
            }

            for clip in model_source.animations {
                let mut new_clip = AnimationClip::default();
                for frame in clip.frames {
                    let joint_matrices_offset = self.joint_matrices_len + joint_bytes.len() as u64;
                    let joint_count = (frame.joint_matrices.len() / std::mem::size_of::<Mat4>()) as u32;
                    joint_bytes.extend_from_slice(&frame.joint_matrices);
                    new_clip.frames.push(AnimationFrame { joint_matrices_offset, joint_count });
                }
                model.animations.push(new_clip);
            }

            self.models.push(model);
        }

        self.append_staging(device, queue, &vertex_bytes, &index_bytes, &weight_bytes, &joint_bytes)?;
        Ok(())
    }

    fn append_material(&mut self, _device: &wgpu::Device, queue: &wgpu::Queue, record: GpuMaterial) -> RenderResult<()> {
        let size = std::mem::size_of::<GpuMaterial>() as u64;
        let cap_bytes = u64::from(self.materials_cap) * size;
        let offset = u64::from(self.materials_len) * size;
        if offset + size > cap_bytes {
            return Err(grow_capacity_error("materials", offset + size, cap_bytes));
        }
        queue.write_buffer(&self.materials, offset, bytemuck::bytes_of(&record));
        self.materials_len += 1;
        Ok(())
    }

    fn append_staging(
        &mut self,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertex_bytes: &[u8],
        index_bytes: &[u8],
        weight_bytes: &[u8],
        joint_bytes: &[u8],
    ) -> RenderResult<()> {
        if self.vertices_len + vertex_bytes.len() as u64 > self.vertices_cap {
            return Err(grow_capacity_error("vertices", self.vertices_len + vertex_bytes.len() as u64, self.vertices_cap));
        }
        if self.indices_len + index_bytes.len() as u64 > self.indices_cap {
            return Err(grow_capacity_error("indices", self.indices_len + index_bytes.len() as u64, self.indices_cap));
        }
        if self.weights_len + weight_bytes.len() as u64 > self.weights_cap {
            return Err(grow_capacity_error("weights", self.weights_len + weight_bytes.len() as u64, self.weights_cap));
        }
        if self.joint_matrices_len + joint_bytes.len() as u64 > self.joint_matrices_cap {
            return Err(grow_capacity_error(
                "joint_matrices",
                self.joint_matrices_len + joint_bytes.len() as u64,
                self.joint_matrices_cap,
            ));
        }

        if !vertex_bytes.is_empty() {
            queue.write_buffer(&self.vertices, self.vertices_len, vertex_bytes);
            self.vertices_len += vertex_bytes.len() as u64;
        }
        if !index_bytes.is_empty() {
            queue.write_buffer(&self.indices, self.indices_len, index_bytes);
            self.indices_len += index_bytes.len() as u64;
        }
        if !weight_bytes.is_empty() {
            queue.write_buffer(&self.weights, self.weights_len, weight_bytes);
            self.weights_len += weight_bytes.len() as u64;
        }
        if !joint_bytes.is_empty() {
            queue.write_buffer(&self.joint_matrices, self.joint_matrices_len, joint_bytes);
            self.joint_matrices_len += joint_bytes.len() as u64;
        }
        log::debug!(
            "GlobalBuffers load complete: {} vertex bytes, {} index bytes, {} models",
            self.vertices_len, self.indices_len, self.models.len()
        );
        Ok(())
    }

    /// Entity-load contract (spec 4.1): builds the static and animated
    /// indirect-command streams and reserves `skinned_vertices` slots.
    pub fn load_entities(&mut self, device: &wgpu::Device, entities: &[Entity]) -> RenderResult<()> {
        let built = build_indirect_streams(&self.models, entities)?;
        let IndirectStreams { static_cmds, anim_cmds, skinning_jobs, skinned_dst_cursor } = built;
        self.skinning_jobs = skinning_jobs;

        self.skinned_vertices_len = skinned_dst_cursor;
        if skinned_dst_cursor > 0 {
            self.skinned_vertices = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("SkinnedVertices"),
                size: skinned_dst_cursor,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        } else {
            self.skinned_vertices = None;
        }

        self.indirect_static = (!static_cmds.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("IndirectStatic"),
                contents: cast_slice(&static_cmds),
                usage: wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST,
            })
        });
        self.indirect_static_count = static_cmds.len() as u32;

        self.indirect_anim = (!anim_cmds.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("IndirectAnim"),
                contents: cast_slice(&anim_cmds),
                usage: wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST,
            })
        });
        self.indirect_anim_count = anim_cmds.len() as u32;

        Ok(())
    }

    /// Recomputes each skinning job's joint-matrix offset from the entity's
    /// live animation-playback frame. Called every frame, independent of the
    /// entity-set-change gate that guards `load_entities`: `entities_mut()`
    /// lets callers advance `animation.frame` in place without bumping
    /// `SceneData::entities_changed_at`, so this is the only place that
    /// observes the new frame. Traversal order must match `load_entities`'s
    /// nested model→mesh→entity order exactly, since `skinning_jobs` is a
    /// flat parallel array with no other key back to its owning entity.
    pub fn refresh_skinning_jobs(&mut self, entities: &[Entity]) {
        let mut job_index = 0usize;
        for entity in entities {
            let Some(model) = self.models.iter().find(|m| m.id == entity.model) else { continue };
            if !model.is_skinned() {
                continue;
            }
            for _mesh in &model.meshes {
                let Some(job) = self.skinning_jobs.get_mut(job_index) else { break };
                job.joint_matrices_base = entity
                    .animation
                    .and_then(|a| model.animations.get(a.clip).map(|clip| (clip, a.frame)))
                    .and_then(|(clip, frame)| clip.frames.get(frame))
                    .map(|f| f.joint_matrices_offset as u32)
                    .unwrap_or(0);
                job_index += 1;
            }
        }
    }

    /// Per-frame contract (spec 4.1): rewrites both instance buffers for
    /// `frame_index` from current entity transforms. Traversal order must
    /// match `load_entities`'s nested model→mesh→entity order exactly.
    pub fn update_instance_data(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        entities: &[Entity],
        frame_index: usize,
    ) {
        let mut static_records: Vec<InstanceRecord> = Vec::new();
        for model in &self.models {
            if !model.is_static() {
                continue;
            }
            for mesh in &model.meshes {
                for entity in entities.iter().filter(|e| e.model == model.id) {
                    static_records.push(pack_instance(entity, mesh.material_index));
                }
            }
        }

        let mut anim_records: Vec<InstanceRecord> = Vec::new();
        for entity in entities {
            let Some(model) = self.models.iter().find(|m| m.id == entity.model) else { continue };
            if !model.is_skinned() {
                continue;
            }
            for mesh in &model.meshes {
                anim_records.push(pack_instance(entity, mesh.material_index));
            }
        }

        let frame_index = frame_index % self.instance_static.len();
        Self::upload_instances(
            device, queue,
            &mut self.instance_static[frame_index],
            &mut self.instance_static_cap[frame_index],
            &static_records,
            "InstanceStatic",
        );
        Self::upload_instances(
            device, queue,
            &mut self.instance_anim[frame_index],
            &mut self.instance_anim_cap[frame_index],
            &anim_records,
            "InstanceAnim",
        );
    }

    fn upload_instances(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        buffer: &mut wgpu::Buffer,
        capacity: &mut u64,
        records: &[InstanceRecord],
        label: &str,
    ) {
        if records.is_empty() {
            return;
        }
        let bytes = cast_slice(records);
        let needed = bytes.len() as u64;
        if needed > *capacity {
            let new_cap = needed.next_power_of_two();
            *buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: new_cap,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            *capacity = new_cap;
        }
        queue.write_buffer(buffer, 0, bytes);
    }
}

fn pack_instance(entity: &Entity, material_index: u32) -> InstanceRecord {
    InstanceRecord {
        model_matrix: entity.transform.to_cols_array_2d(),
        material_index,
    }
}

/// A source material descriptor, resolved against [`TextureCache`] at load time.
pub struct MaterialSource {
    pub diffuse_color: [f32; 4],
    pub albedo_texture: Option<String>,
    pub normal_texture: Option<String>,
    pub metallic_roughness_texture: Option<String>,
    pub roughness_factor: f32,
    pub metallic_factor: f32,
}

impl MaterialSource {
    fn resolve(&self, texture_cache: &mut TextureCache) -> GpuMaterial {
        let resolve_one = |path: &Option<String>, cache: &mut TextureCache| {
            path.as_deref()
                .and_then(|p| cache.get_or_create(p))
                .unwrap_or(crate::renderer::deferred::types::TEXTURE_INDEX_NONE)
        };
        GpuMaterial {
            diffuse_color: self.diffuse_color.into(),
            albedo_texture: resolve_one(&self.albedo_texture, texture_cache),
            normal_texture: resolve_one(&self.normal_texture, texture_cache),
            metallic_roughness_texture: resolve_one(&self.metallic_roughness_texture, texture_cache),
            _pad0: 0,
            roughness_factor: self.roughness_factor,
            metallic_factor: self.metallic_factor,
            _pad1: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::deferred::types::AnimationState;

    #[test]
    fn mesh_validation_rejects_misaligned_vertex_size() {
        let mesh = Mesh {
            vertex_offset: 0,
            vertex_size: VERTEX_STRIDE + 1,
            index_offset: 0,
            index_count: 3,
            material_index: 0,
            weights_offset: None,
        };
        assert!(mesh.validate(1024).is_err());
    }

    #[test]
    fn mesh_validation_rejects_out_of_bounds_indices() {
        let mesh = Mesh {
            vertex_offset: 0,
            vertex_size: VERTEX_STRIDE,
            index_offset: 100,
            index_count: 10,
            material_index: 0,
            weights_offset: None,
        };
        assert!(mesh.validate(100).is_err());
        assert!(mesh.validate(140).is_ok());
    }

    fn static_mesh(index: u32) -> Mesh {
        Mesh {
            vertex_offset: 0,
            vertex_size: VERTEX_STRIDE,
            index_offset: u64::from(index) * 12,
            index_count: 3,
            material_index: 0,
            weights_offset: None,
        }
    }

    fn skinned_mesh() -> Mesh {
        Mesh {
            vertex_offset: 0,
            vertex_size: VERTEX_STRIDE,
            index_offset: 0,
            index_count: 3,
            material_index: 0,
            weights_offset: Some(0),
        }
    }

    // spec 8.3 scenario 4: 10 models, 3 meshes each, 100 entities per model.
    #[test]
    fn indirect_streams_batch_static_models_by_mesh() {
        let models: Vec<Model> = (0..10)
            .map(|id| Model { id, meshes: vec![static_mesh(0), static_mesh(1), static_mesh(2)], animations: vec![] })
            .collect();
        let entities: Vec<Entity> = (0..10)
            .flat_map(|model_id| (0..100).map(move |_| Entity::new_static(model_id, Mat4::IDENTITY)))
            .collect();
        assert_eq!(entities.len(), 1000);

        let streams = build_indirect_streams(&models, &entities).expect("static-only stream build must not fail");

        // One command per (model, mesh): exactly one `multi_draw_indexed_indirect`
        // call per stream is issued regardless of how many commands it carries
        // (see `GBufferNode::run`), so this count is the indirect buffer's
        // length, not the number of draw calls submitted to the encoder.
        assert_eq!(streams.static_cmds.len(), 30);
        assert!(streams.anim_cmds.is_empty());
        assert!(streams.skinning_jobs.is_empty());

        // Every command for a given model carries that model's full instance
        // count, and summing just one mesh slot across all models recovers
        // the total entity count.
        for cmd in &streams.static_cmds {
            assert_eq!(cmd.instance_count, 100);
        }
        let first_mesh_total: u32 = streams.static_cmds.iter().step_by(3).map(|c| c.instance_count).sum();
        assert_eq!(first_mesh_total, 1000);

        // `first_instance` is a dense, strictly increasing command index.
        let first_instances: Vec<u32> = streams.static_cmds.iter().map(|c| c.first_instance).collect();
        assert_eq!(first_instances, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn indirect_streams_skip_models_with_no_entities() {
        let models = vec![Model { id: 0, meshes: vec![static_mesh(0)], animations: vec![] }];
        let streams = build_indirect_streams(&models, &[]).expect("empty entity set must not fail");
        assert!(streams.static_cmds.is_empty());
        assert!(streams.anim_cmds.is_empty());
    }

    #[test]
    fn indirect_streams_emit_one_animated_command_per_entity_mesh() {
        let models = vec![Model { id: 0, meshes: vec![skinned_mesh(), skinned_mesh()], animations: vec![] }];
        let entities = vec![
            Entity::new_animated(0, Mat4::IDENTITY, AnimationState::default()),
            Entity::new_animated(0, Mat4::IDENTITY, AnimationState::default()),
        ];

        let streams = build_indirect_streams(&models, &entities).expect("skinned stream build must not fail");

        assert!(streams.static_cmds.is_empty());
        assert_eq!(streams.anim_cmds.len(), 4);
        assert!(streams.anim_cmds.iter().all(|c| c.instance_count == 1));
        assert_eq!(streams.skinning_jobs.len(), 4);
        // Skinned vertices are packed back-to-back per entity-mesh, no gaps.
        assert_eq!(streams.skinned_dst_cursor, 4 * VERTEX_STRIDE);
    }

}
