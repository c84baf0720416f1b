//! SkinCompute: per-frame GPU skeletal skinning, spec 4.3.
//!
//! wgpu has no push constants, so the five per-dispatch offsets are carried
//! in a dynamic-offset uniform buffer, the same mechanism
//! `renderer::graph::passes::shadow` uses for its per-cascade matrix
//! selection — one buffer, bound once, offset advanced per dispatch.

use wgpu::util::DeviceExt;

use crate::errors::RenderResult;
use crate::renderer::deferred::context::{ExecuteContext, PrepareContext};
use crate::renderer::deferred::node::DeferredNode;
use crate::renderer::deferred::pipelines::SkinComputePipeline;
use crate::renderer::deferred::uniforms::SkinningParams;

/// wgpu requires dynamic uniform offsets aligned to the device's
/// `min_uniform_buffer_offset_alignment`; 256 covers every adapter this
/// engine targets.
const DYNAMIC_OFFSET_ALIGNMENT: u64 = 256;

pub struct SkinComputeNode<'p> {
    pipeline: &'p SkinComputePipeline,
    params_buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    job_count: u32,
}

impl<'p> SkinComputeNode<'p> {
    #[must_use]
    pub fn new(pipeline: &'p SkinComputePipeline) -> Self {
        Self { pipeline, params_buffer: None, bind_group: None, job_count: 0 }
    }
}

impl DeferredNode for SkinComputeNode<'_> {
    fn name(&self) -> &str {
        "SkinCompute"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        let jobs = ctx.global_buffers.skinning_jobs();
        self.job_count = jobs.len() as u32;
        if jobs.is_empty() {
            self.bind_group = None;
            return Ok(());
        }

        let stride = DYNAMIC_OFFSET_ALIGNMENT;
        let mut bytes = vec![0u8; stride as usize * jobs.len()];
        for (i, job) in jobs.iter().enumerate() {
            let params = SkinningParams {
                src_offset: job.src_offset,
                src_size: job.src_size,
                weights_offset: job.weights_offset,
                joint_matrices_base: job.joint_matrices_base,
                dst_offset: job.dst_offset,
                _pad: [0; 3],
            };
            let start = i * stride as usize;
            bytes[start..start + std::mem::size_of::<SkinningParams>()].copy_from_slice(bytemuck::bytes_of(&params));
        }

        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("SkinComputeParams"),
            contents: &bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let Some(skinned) = ctx.global_buffers.skinned_vertices_buffer() else {
            self.bind_group = None;
            return Ok(());
        };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SkinComputeBindGroup"),
            layout: &self.pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ctx.global_buffers.vertices_buffer().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: ctx.global_buffers.weights_buffer().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: ctx.global_buffers.joint_matrices_buffer().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: skinned.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: std::num::NonZeroU64::new(std::mem::size_of::<SkinningParams>() as u64),
                    }),
                },
            ],
        }));
        self.params_buffer = Some(buffer);
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(bind_group), true) = (&self.bind_group, self.job_count > 0) else { return };

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("SkinComputePass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline.pipeline);

        for (i, job) in ctx.global_buffers.skinning_jobs().iter().enumerate() {
            let offset = (i as u64) * DYNAMIC_OFFSET_ALIGNMENT;
            pass.set_bind_group(0, bind_group, &[offset as u32]);
            let workgroups = job.vertex_count.div_ceil(32);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
    }
}
