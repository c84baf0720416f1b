//! Render Settings Configuration
//!
//! This module defines the configuration options for the rendering system.
//!
//! # Example
//!
//! ```rust,ignore
//! use myth::render::RenderSettings;
//!
//! let settings = RenderSettings {
//!     vsync: false,
//!     clear_color: wgpu::Color { r: 0.1, g: 0.2, b: 0.3, a: 1.0 },
//!     power_preference: wgpu::PowerPreference::HighPerformance,
//!     ..Default::default()
//! };
//!
//! App::new()
//!     .with_settings(settings)
//!     .run::<MyApp>()?;
//! ```

/// Configuration options for the rendering system.
///
/// This struct controls fundamental rendering parameters including GPU selection,
/// required features, and common render state settings.
///
/// # Fields
///
/// | Field | Description | Default |
/// |-------|-------------|---------|
/// | `enable_hdr` | Enable HDR rendering mode | `true` |
/// | `msaa_samples` | Number of MSAA samples | `1` |
/// | `vsync` | Vertical sync enabled | `true` |
/// | `clear_color` | Background clear color | Black |
/// | `power_preference` | GPU selection preference | `HighPerformance` |
/// | `required_features` | Required wgpu features | Empty |
/// | `required_limits` | Required wgpu limits | Default |
/// | `depth_format` | Depth buffer format | `Depth32Float` |
///
/// # GPU Selection
///
/// The `power_preference` field controls which GPU adapter is selected:
///
/// - `HighPerformance`: Prefer discrete GPU (better for games/visualization)
/// - `LowPower`: Prefer integrated GPU (better for battery life)
///
/// # Example
///
/// ```rust,ignore
/// use myth::render::RenderSettings;
///
/// // High-performance settings for games
/// let game_settings = RenderSettings {
///     power_preference: wgpu::PowerPreference::HighPerformance,
///     vsync: false, // Uncapped framerate
///     ..Default::default()
/// };
///
/// // Battery-friendly settings for tools
/// let tool_settings = RenderSettings {
///     power_preference: wgpu::PowerPreference::LowPower,
///     vsync: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Whether to use straightforward rendering mode.
    ///
    /// if false, the main scene will be rendered directly to the screen surface,
    /// bypassing intermediate render targets and post-processing.
    /// This can improve performance for simple scenes without effects.
    pub enable_hdr: bool,

    /// Background clear color for the main render target.
    ///
    /// This color is used to clear the framebuffer at the start of each frame.
    pub clear_color: wgpu::Color,

    /// Enable vertical synchronization (`VSync`).
    ///
    /// When `true`, the framerate is capped to the display refresh rate,
    /// reducing screen tearing and power consumption.
    /// When `false`, the framerate is uncapped, which may cause tearing
    /// but reduces input latency.
    pub vsync: bool,

    /// Number of samples for multi-sample anti-aliasing (MSAA).
    ///
    /// Set to 1 to disable MSAA. Common values are 2, 4, or 8.
    /// Higher values improve quality but increase GPU load.
    pub msaa_samples: u32,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete/dedicated GPU
    /// - `LowPower`: Prefer integrated GPU
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features that must be supported by the adapter.
    ///
    /// The engine will fail to initialize if these features are not available.
    /// Use with caution on WebGPU targets where feature support varies.
    pub required_features: wgpu::Features,

    /// Required wgpu limits that must be supported by the adapter.
    ///
    /// Limits define maximum resource sizes, binding counts, etc.
    pub required_limits: wgpu::Limits,

    /// Depth buffer texture format.
    ///
    /// `Depth32Float` is recommended for reverse-Z rendering (better precision).
    /// `Depth24PlusStencil8` can be used if stencil buffer is needed.
    pub depth_format: wgpu::TextureFormat,

    /// Configuration for the bind-less deferred render graph (`renderer::deferred`).
    pub deferred: DeferredSettings,
}

/// Configuration for the deferred render graph (`renderer::deferred`).
///
/// Covers every key in the configuration table of the external-interfaces
/// section: shadow quality/behavior, FXAA, and the global-buffer capacity
/// caps that size `GlobalBuffers` up front.
///
/// # Fields
///
/// | Field | Effect |
/// |-------|--------|
/// | `shadow_map_size` | Side length of the cascaded shadow map, per layer. |
/// | `shadow_pcf` | Enables 5×5 PCF filtering in `LightingPass`. |
/// | `shadow_bias` | Base depth bias for the shadow comparison. |
/// | `shadow_debug` | Tints fragments by cascade index. |
/// | `fxaa` | Enables FXAA in `PostPass`. |
/// | `cascade_count` | Number of cascaded shadow-map splits. |
/// | `max_materials` | Cap for the materials buffer (record count). |
/// | `max_textures` | Size of the bindless texture-index array. |
/// | `max_vertices_buffer` | Cap for the vertex buffer (bytes). |
/// | `max_indices_buffer` | Cap for the index buffer (bytes). |
/// | `max_joint_matrices_buffer` | Cap for the joint-matrices buffer (bytes). |
/// | `max_anim_weights_buffer` | Cap for the weights buffer (bytes). |
/// | `frames_in_flight` | `MAX_IN_FLIGHT`, the number of ring-buffered per-frame resource copies. |
#[derive(Debug, Clone)]
pub struct DeferredSettings {
    pub shadow_map_size: u32,
    pub shadow_pcf: bool,
    pub shadow_bias: f32,
    pub shadow_debug: bool,
    pub fxaa: bool,
    pub cascade_count: u32,
    pub max_materials: u32,
    pub max_textures: u32,
    pub max_vertices_buffer: u64,
    pub max_indices_buffer: u64,
    pub max_joint_matrices_buffer: u64,
    pub max_anim_weights_buffer: u64,
    pub frames_in_flight: u32,
}

impl Default for DeferredSettings {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            shadow_pcf: true,
            shadow_bias: 0.005,
            shadow_debug: false,
            fxaa: true,
            cascade_count: 3,
            max_materials: 256,
            max_textures: 100,
            max_vertices_buffer: 64 * 1024 * 1024,
            max_indices_buffer: 32 * 1024 * 1024,
            max_joint_matrices_buffer: 4 * 1024 * 1024,
            max_anim_weights_buffer: 16 * 1024 * 1024,
            frames_in_flight: 2,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            vsync: true,
            msaa_samples: 1,
            depth_format: wgpu::TextureFormat::Depth32Float,
            enable_hdr: true,
            deferred: DeferredSettings::default(),
        }
    }
}
