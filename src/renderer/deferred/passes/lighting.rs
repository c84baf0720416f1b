//! LightingPass: full-screen Cook-Torrance BRDF + cascaded PCF shadows,
//! spec 4.6.
//!
//! Full-screen-triangle trick grounded on the teacher's fullscreen pipeline
//! helper shape (`PipelineCache::get_or_create_fullscreen`).

use wgpu::util::DeviceExt;

use crate::errors::RenderResult;
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::node::DeferredNode;
use crate::renderer::deferred::pipelines::LightingPipeline;
use crate::renderer::deferred::uniforms::{
    CascadeArray, CascadeGpu, FrameUniforms, ShadowParams, MAX_CASCADES, POINT_LIGHT_ATTENUATION_SCALE,
};

pub struct LightingNode<'p> {
    pipeline: &'p LightingPipeline,
    gbuffer_bind_group: Option<wgpu::BindGroup>,
    lights_bind_group: Option<wgpu::BindGroup>,
    shadow_bind_group: Option<wgpu::BindGroup>,
    frame_bind_group: Option<wgpu::BindGroup>,
    gbuffer_sampler: Option<wgpu::Sampler>,
    shadow_sampler: Option<wgpu::Sampler>,
}

impl<'p> LightingNode<'p> {
    #[must_use]
    pub fn new(pipeline: &'p LightingPipeline) -> Self {
        Self {
            pipeline,
            gbuffer_bind_group: None,
            lights_bind_group: None,
            shadow_bind_group: None,
            frame_bind_group: None,
            gbuffer_sampler: None,
            shadow_sampler: None,
        }
    }
}

impl DeferredNode for LightingNode<'_> {
    fn name(&self) -> &str {
        "LightingPass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        if self.gbuffer_sampler.is_none() {
            self.gbuffer_sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("LightingGBufferSampler"),
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            }));
        }
        if self.shadow_sampler.is_none() {
            self.shadow_sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("LightingShadowSampler"),
                compare: Some(wgpu::CompareFunction::LessEqual),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }

        self.gbuffer_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightingGBufferBindGroup"),
            layout: &self.pipeline.gbuffer_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&ctx.gbuffer.albedo) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&ctx.gbuffer.normal) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&ctx.gbuffer.pbr) },
                wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::TextureView(&ctx.gbuffer.position) },
                wgpu::BindGroupEntry { binding: 4, resource: wgpu::BindingResource::TextureView(&ctx.shadow_map.array_view) },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(self.shadow_sampler.as_ref().unwrap()),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(self.gbuffer_sampler.as_ref().unwrap()),
                },
            ],
        }));

        let lights_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("LightingLightsBuffer"),
            contents: bytemuck::cast_slice(&ctx.scene.lights),
            usage: wgpu::BufferUsages::STORAGE,
        });
        self.lights_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightingLightsBindGroup"),
            layout: &self.pipeline.lights_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: lights_buffer.as_entire_binding() }],
        }));

        let mut cascades = [CascadeGpu { proj_view: glam::Mat4::IDENTITY, split_distance: 0.0, _pad: [0.0; 3] }; MAX_CASCADES];
        for (i, cascade) in ctx.cascades.iter().take(MAX_CASCADES).enumerate() {
            cascades[i] = (*cascade).into();
        }
        let cascade_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("LightingCascadeBuffer"),
            contents: bytemuck::bytes_of(&CascadeArray { cascades }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let shadow_params = ShadowParams {
            shadow_bias: ctx.settings.shadow_bias,
            shadow_debug: u32::from(ctx.settings.shadow_debug),
            shadow_map_size: ctx.settings.shadow_map_size as f32,
            point_light_attenuation_scale: POINT_LIGHT_ATTENUATION_SCALE,
        };
        let shadow_params_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("LightingShadowParamsBuffer"),
            contents: bytemuck::bytes_of(&shadow_params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        self.shadow_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightingShadowBindGroup"),
            layout: &self.pipeline.shadow_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: cascade_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: shadow_params_buffer.as_entire_binding() },
            ],
        }));

        let frame_uniforms = FrameUniforms::new(
            ctx.scene.camera.view_matrix,
            ctx.scene.camera.projection_matrix,
            ctx.scene.camera.position,
            ctx.scene.ambient_light,
            ctx.scene.lights.len() as u32,
            ctx.settings.cascade_count,
        );
        let frame_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("LightingFrameBuffer"),
            contents: bytemuck::bytes_of(&frame_uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        self.frame_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightingFrameBindGroup"),
            layout: &self.pipeline.frame_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        }));
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(gbuffer_bg), Some(lights_bg), Some(shadow_bg), Some(frame_bg)) =
            (&self.gbuffer_bind_group, &self.lights_bind_group, &self.shadow_bind_group, &self.frame_bind_group)
        else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("LightingPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.hdr.view,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::BLACK), store: wgpu::StoreOp::Store },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, gbuffer_bg, &[]);
        pass.set_bind_group(1, lights_bg, &[]);
        pass.set_bind_group(2, shadow_bg, &[]);
        pass.set_bind_group(3, frame_bg, &[]);
        pass.draw(0..3, 0..1);
    }
}
