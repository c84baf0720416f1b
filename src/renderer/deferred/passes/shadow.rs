//! ShadowPass: depth-only cascaded shadow map, spec 4.4.
//!
//! wgpu has no geometry-shader stage, so cascade layer replication (spec's
//! `invocations = N` geometry shader) is realized as `N` separate render
//! passes, each targeting one layer of the shadow map array, per spec 9's
//! own documented fallback.

use wgpu::util::DeviceExt;

use crate::errors::{RenderError, RenderResult};
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::node::DeferredNode;
use crate::renderer::deferred::passes::shadow_math::build_cascades;
use crate::renderer::deferred::pipelines::ShadowPipeline;
use crate::renderer::deferred::texture_cache::TextureCache;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CascadeUniform {
    view_proj: [[f32; 4]; 4],
}

pub struct ShadowNode<'p> {
    pipeline: &'p ShadowPipeline,
    cascade_buffers: Vec<wgpu::Buffer>,
    cascade_bind_groups: Vec<wgpu::BindGroup>,
    material_bind_group: Option<wgpu::BindGroup>,
    default_sampler: Option<wgpu::Sampler>,
}

impl<'p> ShadowNode<'p> {
    #[must_use]
    pub fn new(pipeline: &'p ShadowPipeline) -> Self {
        Self {
            pipeline,
            cascade_buffers: Vec::new(),
            cascade_bind_groups: Vec::new(),
            material_bind_group: None,
            default_sampler: None,
        }
    }
}

fn build_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    materials: &wgpu::Buffer,
    texture_cache: &TextureCache,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let views = texture_cache.as_list();
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("ShadowMaterialBindGroup"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: materials.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureViewArray(&views) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
        ],
    })
}

impl DeferredNode for ShadowNode<'_> {
    fn name(&self) -> &str {
        "ShadowPass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        let Some(light) = ctx.scene.directional_light() else {
            return Err(RenderError::RequiredLightMissing);
        };
        let light_direction = light.position.truncate();

        let cascades = build_cascades(&ctx.scene.camera, light_direction, ctx.settings.cascade_count, ctx.settings.shadow_map_size);
        *ctx.cascades = cascades;

        self.cascade_buffers.clear();
        self.cascade_bind_groups.clear();
        for cascade in ctx.cascades.iter() {
            let uniform = CascadeUniform { view_proj: cascade.proj_view.to_cols_array_2d() };
            let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ShadowCascadeUniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ShadowCascadeBindGroup"),
                layout: &self.pipeline.cascade_layout,
                entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
            });
            self.cascade_buffers.push(buffer);
            self.cascade_bind_groups.push(bind_group);
        }

        if self.default_sampler.is_none() {
            self.default_sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("ShadowMaterialSampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }
        let sampler = self.default_sampler.as_ref().unwrap();
        self.material_bind_group = Some(build_material_bind_group(
            ctx.device,
            &self.pipeline.material_layout,
            ctx.global_buffers.materials_buffer(),
            ctx.texture_cache,
            sampler,
        ));
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(material_bind_group) = &self.material_bind_group else { return };

        for (layer, cascade_bind_group) in self.cascade_bind_groups.iter().enumerate() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ShadowCascadePass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: ctx.shadow_map.layer_view(layer as u32),
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, cascade_bind_group, &[]);
            pass.set_bind_group(1, material_bind_group, &[]);
            pass.set_index_buffer(ctx.global_buffers.indices_buffer().slice(..), wgpu::IndexFormat::Uint32);

            // One `multi_draw_indexed_indirect` call replays the whole
            // static (or animated) stream, per spec 8.3 scenario 4's
            // "exactly two indirect draw calls per pass" invariant.
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
}
