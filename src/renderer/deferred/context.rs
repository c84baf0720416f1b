//! Prepare/execute contexts threaded through every [`super::node::DeferredNode`].

use crate::renderer::deferred::attachments::{ColorAttachment, GBuffer, ShadowMap};
use crate::renderer::deferred::global_buffers::GlobalBuffers;
use crate::renderer::deferred::scene_data::SceneData;
use crate::renderer::deferred::texture_cache::TextureCache;
use crate::renderer::deferred::types::CascadeShadow;
use crate::renderer::settings::DeferredSettings;

/// Mutable-access context for the `prepare` phase: resource allocation,
/// per-frame uniform writes, cascade-matrix computation.
pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub settings: &'a DeferredSettings,
    pub global_buffers: &'a mut GlobalBuffers,
    pub texture_cache: &'a mut TextureCache,
    pub scene: &'a SceneData,
    pub gbuffer: &'a GBuffer,
    pub hdr: &'a ColorAttachment,
    pub ldr: &'a ColorAttachment,
    pub shadow_map: &'a ShadowMap,
    pub cascades: &'a mut Vec<CascadeShadow>,
    pub frame_index: usize,
}

/// Read-only context for the `run` phase: command recording only.
pub struct ExecuteContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub settings: &'a DeferredSettings,
    pub global_buffers: &'a GlobalBuffers,
    pub texture_cache: &'a TextureCache,
    pub scene: &'a SceneData,
    pub gbuffer: &'a GBuffer,
    pub hdr: &'a ColorAttachment,
    pub ldr: &'a ColorAttachment,
    pub shadow_map: &'a ShadowMap,
    pub cascades: &'a [CascadeShadow],
    pub frame_index: usize,
    pub surface_view: &'a wgpu::TextureView,
}
