//! `FrameOrchestrator` — owns every resize-sensitive attachment and the
//! fixed pipeline set, rebuilds the indirect-draw streams when the scene's
//! entity set changes, and drives the six passes in data-flow order each
//! frame (spec 4.8): `SkinCompute -> ShadowPass -> ScenePass -> LightingPass
//! -> PostPass -> SwapBlit`.
//!
//! Grounded on `Renderer`/`RendererState`'s init/resize/begin_frame split in
//! `renderer/mod.rs`, narrowed to this subsystem's fixed six-pass graph —
//! there is no per-frame `FrameComposer` chaining since the pass order is
//! not configurable.

use crate::errors::RenderResult;
use crate::renderer::deferred::attachments::{ColorAttachment, GBuffer, ShadowMap, HDR_FORMAT, LDR_FORMAT};
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::global_buffers::{GlobalBuffers, MaterialSource, ModelSource};
use crate::renderer::deferred::graph::FrameGraph;
use crate::renderer::deferred::passes::gbuffer::GBufferNode;
use crate::renderer::deferred::passes::lighting::LightingNode;
use crate::renderer::deferred::passes::post::PostNode;
use crate::renderer::deferred::passes::shadow::ShadowNode;
use crate::renderer::deferred::passes::skin_compute::SkinComputeNode;
use crate::renderer::deferred::passes::swap_blit::SwapBlitNode;
use crate::renderer::deferred::pipelines::DeferredPipelines;
use crate::renderer::deferred::scene_data::SceneData;
use crate::renderer::deferred::texture_cache::TextureCache;
use crate::renderer::deferred::types::{CascadeShadow, Entity};
use crate::renderer::settings::DeferredSettings;

/// Owns the GPU-resident deferred render graph across frames.
pub struct FrameOrchestrator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: DeferredSettings,
    pipelines: DeferredPipelines,

    gbuffer: GBuffer,
    hdr: ColorAttachment,
    ldr: ColorAttachment,
    shadow_map: ShadowMap,

    global_buffers: GlobalBuffers,
    texture_cache: TextureCache,
    cascades: Vec<CascadeShadow>,

    width: u32,
    height: u32,
    frame_index: usize,
    frames_in_flight: usize,
    entities_loaded_at: Option<u64>,
}

impl FrameOrchestrator {
    #[must_use]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        settings: DeferredSettings,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let pipelines = DeferredPipelines::new(&device, &settings, surface_format);
        let gbuffer = GBuffer::new(&device, width, height);
        let hdr = ColorAttachment::new(&device, width, height, HDR_FORMAT, "HdrAttachment");
        let ldr = ColorAttachment::new(&device, width, height, LDR_FORMAT, "LdrAttachment");
        let shadow_map = ShadowMap::new(&device, settings.shadow_map_size, settings.cascade_count);
        let global_buffers = GlobalBuffers::new(&device, &settings);
        let texture_cache = TextureCache::new(settings.max_textures);
        let frames_in_flight = settings.frames_in_flight as usize;

        Self {
            device,
            queue,
            settings,
            pipelines,
            gbuffer,
            hdr,
            ldr,
            shadow_map,
            global_buffers,
            texture_cache,
            cascades: Vec::new(),
            width,
            height,
            frame_index: 0,
            frames_in_flight: frames_in_flight.max(1),
            entities_loaded_at: None,
        }
    }

    /// Resizes every screen-resolution attachment. The shadow map is
    /// resolution-independent (spec 4.8) and is left untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.gbuffer = GBuffer::new(&self.device, width, height);
        self.hdr = ColorAttachment::new(&self.device, width, height, HDR_FORMAT, "HdrAttachment");
        self.ldr = ColorAttachment::new(&self.device, width, height, LDR_FORMAT, "LdrAttachment");
    }

    /// Loads the static model/material catalog, spec 6.1/6.2's external
    /// interface. Call once at startup, or whenever the asset catalog
    /// changes; cheap per-frame calls are avoided by `load_entities`'s
    /// separate entity-set-change gate.
    pub fn load_models(&mut self, sources: Vec<(ModelSource, Vec<MaterialSource>)>) -> RenderResult<()> {
        self.global_buffers.load_models(&self.device, &self.queue, &mut self.texture_cache, sources)
    }

    /// Registers a decoded texture under `path` in the bindless array.
    pub fn register_texture(&mut self, path: &str, width: u32, height: u32, rgba8: &[u8]) -> Option<u32> {
        self.texture_cache.register(&self.device, &self.queue, path, width, height, rgba8)
    }

    fn sync_entities(&mut self, scene: &SceneData) -> RenderResult<()> {
        let changed_at = scene.entities_changed_at();
        if self.entities_loaded_at != Some(changed_at) {
            self.global_buffers.load_entities(&self.device, scene.entities())?;
            self.entities_loaded_at = Some(changed_at);
        }
        Ok(())
    }

    /// Runs one full frame: rebuild indirect-draw streams if the entity set
    /// changed, write this frame's instance data, run the six passes, and
    /// present via `surface_view`.
    pub fn render_frame(&mut self, scene: &SceneData, surface_view: &wgpu::TextureView) -> RenderResult<()> {
        self.sync_entities(scene)?;
        self.global_buffers.update_instance_data(&self.device, &self.queue, scene.entities(), self.frame_index);
        self.global_buffers.refresh_skinning_jobs(scene.entities());

        let mut skin_compute = SkinComputeNode::new(&self.pipelines.skin_compute);
        let mut shadow = ShadowNode::new(&self.pipelines.shadow);
        let mut gbuffer_pass = GBufferNode::new(&self.pipelines.gbuffer);
        let mut lighting = LightingNode::new(&self.pipelines.lighting);
        let mut post = PostNode::new(&self.pipelines.post);
        let mut swap_blit = SwapBlitNode::new(&self.pipelines.swap_blit);

        {
            let mut prepare_ctx = PrepareContext {
                device: &self.device,
                queue: &self.queue,
                settings: &self.settings,
                global_buffers: &mut self.global_buffers,
                texture_cache: &mut self.texture_cache,
                scene,
                gbuffer: &self.gbuffer,
                hdr: &self.hdr,
                ldr: &self.ldr,
                shadow_map: &self.shadow_map,
                cascades: &mut self.cascades,
                frame_index: self.frame_index,
            };

            let mut graph = FrameGraph::new();
            graph
                .push(&mut skin_compute)
                .push(&mut shadow)
                .push(&mut gbuffer_pass)
                .push(&mut lighting)
                .push(&mut post)
                .push(&mut swap_blit);
            graph.prepare(&mut prepare_ctx)?;

            let execute_ctx = ExecuteContext {
                device: &self.device,
                queue: &self.queue,
                settings: &self.settings,
                global_buffers: &self.global_buffers,
                texture_cache: &self.texture_cache,
                scene,
                gbuffer: &self.gbuffer,
                hdr: &self.hdr,
                ldr: &self.ldr,
                shadow_map: &self.shadow_map,
                cascades: &self.cascades,
                frame_index: self.frame_index,
                surface_view,
            };
            graph.execute(&execute_ctx);
        }

        self.frame_index = (self.frame_index + 1) % self.frames_in_flight;
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> &DeferredSettings {
        &self.settings
    }
}
