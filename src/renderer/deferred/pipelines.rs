//! Fixed pipeline set for the deferred graph.
//!
//! Grounded on `pipeline::cache::PipelineCache`'s descriptor-building code
//! shape (bind-group-layout construction, `create_render_pipeline`/
//! `create_compute_pipeline` calls), but without its L1/L2 hash-cache
//! machinery — this design has one pipeline per pass and no per-material
//! shader variants, so there is no variant axis to cache against.

use crate::renderer::deferred::attachments::{
    GBUFFER_ALBEDO_FORMAT, GBUFFER_DEPTH_FORMAT, GBUFFER_NORMAL_FORMAT, GBUFFER_PBR_FORMAT,
    GBUFFER_POSITION_FORMAT, HDR_FORMAT, LDR_FORMAT, SHADOW_FORMAT,
};
use crate::renderer::settings::DeferredSettings;

fn vertex_and_instance_layout<'a>(
    vertex_attrs: &'a [wgpu::VertexAttribute],
    instance_attrs: &'a [wgpu::VertexAttribute],
) -> [wgpu::VertexBufferLayout<'a>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: crate::renderer::deferred::types::VERTEX_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: vertex_attrs,
        },
        wgpu::VertexBufferLayout {
            array_stride: crate::renderer::deferred::types::INSTANCE_STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: instance_attrs,
        },
    ]
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x3, 1 => Float32x3, 2 => Float32x3, 3 => Float32x3, 4 => Float32x2,
];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    5 => Float32x4, 6 => Float32x4, 7 => Float32x4, 8 => Float32x4, 9 => Uint32,
];

pub struct SkinComputePipeline {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

pub struct ShadowPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub cascade_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
}

pub struct GBufferPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
}

pub struct LightingPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub gbuffer_layout: wgpu::BindGroupLayout,
    pub lights_layout: wgpu::BindGroupLayout,
    pub shadow_layout: wgpu::BindGroupLayout,
    pub frame_layout: wgpu::BindGroupLayout,
}

pub struct PostPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub layout: wgpu::BindGroupLayout,
}

pub struct SwapBlitPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub layout: wgpu::BindGroupLayout,
}

/// Owns every pipeline the deferred graph needs, built once at startup.
pub struct DeferredPipelines {
    pub skin_compute: SkinComputePipeline,
    pub shadow: ShadowPipeline,
    pub gbuffer: GBufferPipeline,
    pub lighting: LightingPipeline,
    pub post: PostPipeline,
    pub swap_blit: SwapBlitPipeline,
}

impl DeferredPipelines {
    #[must_use]
    pub fn new(device: &wgpu::Device, settings: &DeferredSettings, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            skin_compute: build_skin_compute(device),
            shadow: build_shadow(device, settings.max_textures),
            gbuffer: build_gbuffer(device, settings.max_textures),
            lighting: build_lighting(device, settings.shadow_pcf),
            post: build_post(device, settings.fxaa),
            swap_blit: build_swap_blit(device, surface_format),
        }
    }
}

fn build_skin_compute(device: &wgpu::Device) -> SkinComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("SkinComputeShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skin_compute.wgsl").into()),
    });

    let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("SkinComputeBindGroupLayout"),
        entries: &[
            storage_entry(0, true),
            storage_entry(1, true),
            storage_entry(2, true),
            storage_entry(3, false),
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("SkinComputePipelineLayout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("SkinComputePipeline"),
        layout: Some(&layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    SkinComputePipeline { pipeline, bind_group_layout }
}

fn material_bind_group_layout(device: &wgpu::Device, max_textures: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("MaterialBindGroupLayout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: std::num::NonZeroU32::new(max_textures),
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn frame_uniform_layout(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn build_shadow(device: &wgpu::Device, max_textures: u32) -> ShadowPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ShadowShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
    });

    let cascade_layout = frame_uniform_layout(device, "ShadowCascadeLayout", wgpu::ShaderStages::VERTEX);
    let material_layout = material_bind_group_layout(device, max_textures, wgpu::ShaderStages::FRAGMENT);

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("ShadowPipelineLayout"),
        bind_group_layouts: &[&cascade_layout, &material_layout],
        immediate_size: 0,
    });

    let buffers = vertex_and_instance_layout(&VERTEX_ATTRS, &INSTANCE_ATTRS);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("ShadowPipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: SHADOW_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    ShadowPipeline { pipeline, cascade_layout, material_layout }
}

fn build_gbuffer(device: &wgpu::Device, max_textures: u32) -> GBufferPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("GBufferShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gbuffer.wgsl").into()),
    });

    let frame_layout = frame_uniform_layout(device, "GBufferFrameLayout", wgpu::ShaderStages::VERTEX_FRAGMENT);
    let material_layout = material_bind_group_layout(device, max_textures, wgpu::ShaderStages::FRAGMENT);

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("GBufferPipelineLayout"),
        bind_group_layouts: &[&frame_layout, &material_layout],
        immediate_size: 0,
    });

    let buffers = vertex_and_instance_layout(&VERTEX_ATTRS, &INSTANCE_ATTRS);

    let color_target = |format: wgpu::TextureFormat| {
        Some(wgpu::ColorTargetState { format, blend: None, write_mask: wgpu::ColorWrites::ALL })
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("GBufferPipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[
                color_target(GBUFFER_ALBEDO_FORMAT),
                color_target(GBUFFER_NORMAL_FORMAT),
                color_target(GBUFFER_PBR_FORMAT),
                color_target(GBUFFER_POSITION_FORMAT),
            ],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: GBUFFER_DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    GBufferPipeline { pipeline, frame_layout, material_layout }
}

/// Maps a boolean config key to the `f64` wgpu expects for
/// `PipelineCompilationOptions::constants` — the override-constant analog of
/// a Vulkan specialization constant (spec 6.5's `shadow_pcf`/`fxaa` keys).
#[must_use]
pub fn override_constant(enabled: bool) -> f64 {
    if enabled { 1.0 } else { 0.0 }
}

fn build_lighting(device: &wgpu::Device, shadow_pcf: bool) -> LightingPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("LightingShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lighting.wgsl").into()),
    });

    let tex_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("LightingGBufferLayout"),
        entries: &[
            tex_entry(0),
            tex_entry(1),
            tex_entry(2),
            tex_entry(3),
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 6,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let lights_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("LightingLightsLayout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("LightingShadowLayout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let frame_layout = frame_uniform_layout(device, "LightingFrameLayout", wgpu::ShaderStages::FRAGMENT);

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("LightingPipelineLayout"),
        bind_group_layouts: &[&gbuffer_layout, &lights_layout, &shadow_layout, &frame_layout],
        immediate_size: 0,
    });

    let shadow_pcf_constant = override_constant(shadow_pcf);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("LightingPipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format: HDR_FORMAT, blend: None, write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &[("SHADOW_PCF".to_string(), shadow_pcf_constant)],
                ..Default::default()
            },
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    LightingPipeline { pipeline, gbuffer_layout, lights_layout, shadow_layout, frame_layout }
}

fn fullscreen_sampled_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn build_post(device: &wgpu::Device, fxaa: bool) -> PostPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("PostShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/post.wgsl").into()),
    });

    let layout_bgl = fullscreen_sampled_layout(device, "PostBindGroupLayout");
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("PostPipelineLayout"),
        bind_group_layouts: &[&layout_bgl],
        immediate_size: 0,
    });

    let fxaa_constant = override_constant(fxaa);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("PostPipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format: LDR_FORMAT, blend: None, write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &[("USE_FXAA".to_string(), fxaa_constant)],
                ..Default::default()
            },
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    PostPipeline { pipeline, layout: layout_bgl }
}

fn build_swap_blit(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> SwapBlitPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("SwapBlitShader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/swap_blit.wgsl").into()),
    });

    let layout_bgl = fullscreen_sampled_layout(device, "SwapBlitBindGroupLayout");
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("SwapBlitPipelineLayout"),
        bind_group_layouts: &[&layout_bgl],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("SwapBlitPipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format: surface_format, blend: None, write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    SwapBlitPipeline { pipeline, layout: layout_bgl }
}

#[cfg(test)]
mod tests {
    use super::override_constant;

    #[test]
    fn override_constant_maps_bool_to_wgpu_f64() {
        assert_eq!(override_constant(true), 1.0);
        assert_eq!(override_constant(false), 0.0);
    }
}
