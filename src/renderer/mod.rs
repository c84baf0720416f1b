//! Rendering System
//!
//! Hosts the bind-less, indirect-draw deferred render graph
//! ([`deferred`]) on top of a thin wgpu context wrapper ([`core`]).
//!
//! # Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Renderer                     │
//! ├───────────────────────────────────────────────┤
//! │              FrameOrchestrator                 │
//! │   (SkinCompute -> Shadow -> GBuffer -> Lighting │
//! │    -> Post -> SwapBlit, renderer::deferred)     │
//! ├───────────────────────────────────────────────┤
//! │                   WgpuContext                   │
//! │            (Device, Queue, Surface)             │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let mut renderer = Renderer::new(RenderSettings::default());
//! renderer.init(window, width, height).await?;
//! renderer.load_deferred_models(sources)?;
//! renderer.render_deferred_frame(&scene, &surface_view)?;
//! ```

pub mod core;
pub mod deferred;
pub mod settings;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{RenderResult, Result};
use crate::renderer::deferred::global_buffers::{MaterialSource, ModelSource};
use crate::renderer::deferred::scene_data::SceneData;
use crate::renderer::deferred::FrameOrchestrator;

use self::core::WgpuContext;
use self::settings::RenderSettings;

/// The main renderer responsible for GPU rendering operations.
///
/// # Lifecycle
///
/// 1. Create with [`Renderer::new`] (no GPU resources allocated)
/// 2. Initialize GPU with [`Renderer::init`]
/// 3. Load a model/material catalog with [`Renderer::load_deferred_models`]
/// 4. Render frames with [`Renderer::render_deferred_frame`]
pub struct Renderer {
    settings: RenderSettings,
    context: Option<RendererState>,
    size: (u32, u32),
}

/// Internal renderer state
struct RendererState {
    wgpu_ctx: WgpuContext,
    deferred: FrameOrchestrator,
}

impl Renderer {
    /// Phase 1: Create configuration (no GPU resources yet).
    ///
    /// This only stores the render settings. GPU resources are
    /// allocated when [`init`](Self::init) is called.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            context: None,
            size: (0, 0),
        }
    }

    /// Phase 2: Initialize GPU context with window handle.
    ///
    /// This method:
    /// 1. Creates the wgpu instance and adapter
    /// 2. Requests a device with required features/limits
    /// 3. Configures the surface for presentation
    /// 4. Builds the deferred render graph's fixed pipeline set and
    ///    resize-sensitive attachments
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        if self.context.is_some() {
            return Ok(());
        }

        self.size = (width, height);

        let wgpu_ctx = WgpuContext::new(window, &self.settings, width, height).await?;

        let deferred = FrameOrchestrator::new(
            wgpu_ctx.device.clone(),
            wgpu_ctx.queue.clone(),
            self.settings.deferred.clone(),
            wgpu_ctx.config.format,
            width,
            height,
        );

        self.context = Some(RendererState { wgpu_ctx, deferred });

        log::info!("Renderer Initialized");
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32, _scale_factor: f32) {
        self.size = (width, height);
        if let Some(state) = &mut self.context {
            state.wgpu_ctx.resize(width, height);
            state.deferred.resize(width, height);
        }
    }

    /// Returns the current surface/window size in pixels as `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    // === Bind-less deferred render graph (renderer::deferred) ===

    /// Loads a model/material catalog into the deferred render graph's
    /// global buffers. Call once at startup per catalog, or whenever it
    /// changes; `FrameOrchestrator` gates the expensive per-entity rebuild
    /// separately, so this can be called independently of frame timing.
    pub fn load_deferred_models(&mut self, sources: Vec<(ModelSource, Vec<MaterialSource>)>) -> RenderResult<()> {
        let state = self.context.as_mut().expect("Renderer::init must run before loading deferred models");
        state.deferred.load_models(sources)
    }

    /// Registers a decoded texture in the deferred graph's bindless array.
    pub fn register_deferred_texture(&mut self, path: &str, width: u32, height: u32, rgba8: &[u8]) -> Option<u32> {
        let state = self.context.as_mut()?;
        state.deferred.register_texture(path, width, height, rgba8)
    }

    /// Runs one frame of the bind-less deferred render graph against
    /// `surface_view`.
    pub fn render_deferred_frame(&mut self, scene: &SceneData, surface_view: &wgpu::TextureView) -> RenderResult<()> {
        let state = self.context.as_mut().expect("Renderer::init must run before rendering a deferred frame");
        state.deferred.render_frame(scene, surface_view)
    }

    // === Public Methods: For External Plugins ===

    /// Returns a reference to the wgpu Device.
    pub fn device(&self) -> Option<&wgpu::Device> {
        self.context.as_ref().map(|s| &s.wgpu_ctx.device)
    }

    /// Returns a reference to the wgpu Queue.
    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.context.as_ref().map(|s| &s.wgpu_ctx.queue)
    }

    /// Returns the surface texture format.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.context.as_ref().map(|s| s.wgpu_ctx.config.format)
    }

    /// Returns a reference to the `WgpuContext`.
    pub fn wgpu_ctx(&self) -> Option<&WgpuContext> {
        self.context.as_ref().map(|s| &s.wgpu_ctx)
    }
}
