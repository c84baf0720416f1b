//! PostPass: FXAA + manual gamma, spec 4.7.
//!
//! Full-screen-triangle trick grounded on the teacher's fullscreen pipeline
//! helper shape (`PipelineCache::get_or_create_fullscreen`).

use crate::errors::RenderResult;
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::node::DeferredNode;
use crate::renderer::deferred::pipelines::PostPipeline;

pub struct PostNode<'p> {
    pipeline: &'p PostPipeline,
    bind_group: Option<wgpu::BindGroup>,
    sampler: Option<wgpu::Sampler>,
}

impl<'p> PostNode<'p> {
    #[must_use]
    pub fn new(pipeline: &'p PostPipeline) -> Self {
        Self { pipeline, bind_group: None, sampler: None }
    }
}

impl DeferredNode for PostNode<'_> {
    fn name(&self) -> &str {
        "PostPass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("PostSampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }
        let sampler = self.sampler.as_ref().unwrap();
        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PostBindGroup"),
            layout: &self.pipeline.layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&ctx.hdr.view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        }));
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(bind_group) = &self.bind_group else { return };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("PostPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.ldr.view,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::BLACK), store: wgpu::StoreOp::Store },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
