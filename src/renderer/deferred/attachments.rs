//! Resize-sensitive attachment sets: the G-buffer, the HDR/LDR
//! intermediates, and the resolution-independent cascaded shadow map.
//!
//! Grounded on the teacher's `GpuImage`/`create_shadow_2d_layer_view`
//! per-layer-view pattern in `core::resources::texture`, narrowed to the
//! fixed attachment set this spec names.

pub const GBUFFER_ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgb10a2Unorm;
pub const GBUFFER_PBR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const LDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The four G-buffer color targets plus depth, recreated on resize.
pub struct GBuffer {
    pub width: u32,
    pub height: u32,
    pub albedo: wgpu::TextureView,
    pub normal: wgpu::TextureView,
    pub pbr: wgpu::TextureView,
    pub position: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

impl GBuffer {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let color = |format: wgpu::TextureFormat, label: &str| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("GBufferDepth"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: GBUFFER_DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            width,
            height,
            albedo: color(GBUFFER_ALBEDO_FORMAT, "GBufferAlbedo"),
            normal: color(GBUFFER_NORMAL_FORMAT, "GBufferNormal"),
            pbr: color(GBUFFER_PBR_FORMAT, "GBufferPbr"),
            position: color(GBUFFER_POSITION_FORMAT, "GBufferPosition"),
            depth,
        }
    }
}

/// A single-color-target offscreen attachment (used for HDR and LDR).
pub struct ColorAttachment {
    pub width: u32,
    pub height: u32,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl ColorAttachment {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat, label: &str) -> Self {
        let view = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self { width, height, view, format }
    }
}

/// The layered cascaded-shadow depth image: one layer per cascade, plus a
/// per-layer 2D view for rendering (wgpu has no geometry-shader layer
/// replication, so `ShadowPass` records one pass per layer, per spec 9's
/// documented fallback) and a single array view for `LightingPass` sampling.
pub struct ShadowMap {
    pub size: u32,
    pub cascade_count: u32,
    layer_views: Vec<wgpu::TextureView>,
    pub array_view: wgpu::TextureView,
}

impl ShadowMap {
    #[must_use]
    pub fn new(device: &wgpu::Device, size: u32, cascade_count: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("CascadedShadowMap"),
            size: wgpu::Extent3d { width: size, height: size, depth_or_array_layers: cascade_count },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let layer_views = (0..cascade_count)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("ShadowMapLayer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("ShadowMapArray"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        Self { size, cascade_count, layer_views, array_view }
    }

    #[must_use]
    pub fn layer_view(&self, layer: u32) -> &wgpu::TextureView {
        &self.layer_views[layer as usize]
    }
}
