//! ScenePass: populates the G-buffer, spec 4.5.
//!
//! Grounded on the teacher's MRT bind-group-layout conventions in
//! `pipeline/cache.rs::get_or_create_graphics`, narrowed to one fixed
//! 4-color-target + depth pipeline since bindless texture selection is a
//! runtime index rather than a per-material shader permutation.

use wgpu::util::DeviceExt;

use crate::errors::RenderResult;
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::node::DeferredNode;
use crate::renderer::deferred::pipelines::GBufferPipeline;
use crate::renderer::deferred::uniforms::FrameUniforms;

pub struct GBufferNode<'p> {
    pipeline: &'p GBufferPipeline,
    frame_buffer: Option<wgpu::Buffer>,
    frame_bind_group: Option<wgpu::BindGroup>,
    material_bind_group: Option<wgpu::BindGroup>,
    default_sampler: Option<wgpu::Sampler>,
}

impl<'p> GBufferNode<'p> {
    #[must_use]
    pub fn new(pipeline: &'p GBufferPipeline) -> Self {
        Self { pipeline, frame_buffer: None, frame_bind_group: None, material_bind_group: None, default_sampler: None }
    }
}

impl DeferredNode for GBufferNode<'_> {
    fn name(&self) -> &str {
        "ScenePass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        let uniforms = FrameUniforms::new(
            ctx.scene.camera.view_matrix,
            ctx.scene.camera.projection_matrix,
            ctx.scene.camera.position,
            ctx.scene.ambient_light,
            ctx.scene.lights.len() as u32,
            ctx.settings.cascade_count,
        );

        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ScenePassFrameUniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        self.frame_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ScenePassFrameBindGroup"),
            layout: &self.pipeline.frame_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
        }));
        self.frame_buffer = Some(buffer);

        if self.default_sampler.is_none() {
            self.default_sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("ScenePassMaterialSampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                ..Default::default()
            }));
        }
        let sampler = self.default_sampler.as_ref().unwrap();
        let views = ctx.texture_cache.as_list();
        self.material_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ScenePassMaterialBindGroup"),
            layout: &self.pipeline.material_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ctx.global_buffers.materials_buffer().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureViewArray(&views) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        }));
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(frame_bind_group), Some(material_bind_group)) = (&self.frame_bind_group, &self.material_bind_group) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ScenePass"),
            color_attachments: &[
                Some(color_attachment(&ctx.gbuffer.albedo)),
                Some(color_attachment(&ctx.gbuffer.normal)),
                Some(color_attachment(&ctx.gbuffer.pbr)),
                Some(color_attachment(&ctx.gbuffer.position)),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.gbuffer.depth,
                depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, material_bind_group, &[]);
        pass.set_index_buffer(ctx.global_buffers.indices_buffer().slice(..), wgpu::IndexFormat::Uint32);

        if let Some((indirect, count)) = ctx.global_buffers.indirect_static_buffer() {
            pass.set_vertex_buffer(0, ctx.global_buffers.vertices_buffer().slice(..));
            pass.set_vertex_buffer(1, ctx.global_buffers.instance_static_buffer(ctx.frame_index).slice(..));
            pass.multi_draw_indexed_indirect(indirect, 0, count);
        }
        if let (Some((indirect, count)), Some(skinned)) =
            (ctx.global_buffers.indirect_anim_buffer(), ctx.global_buffers.skinned_vertices_buffer())
        {
            pass.set_vertex_buffer(0, skinned.slice(..));
            pass.set_vertex_buffer(1, ctx.global_buffers.instance_anim_buffer(ctx.frame_index).slice(..));
            pass.multi_draw_indexed_indirect(indirect, 0, count);
        }
    }
}

fn color_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT), store: wgpu::StoreOp::Store },
    }
}
