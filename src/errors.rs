//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`MythError`] covers all failure modes including:
//! - GPU initialization failures
//! - Asset I/O and manifest-parsing errors
//! - Resource management errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, MythError>`.
//!
//! ```rust,ignore
//! use myth::errors::{MythError, Result};
//!
//! fn load_asset() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Myth engine.
///
/// This enum covers all possible error conditions that can occur
/// during engine operation. Each variant provides specific context
/// about what went wrong.
#[derive(Error, Debug)]
pub enum MythError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Image & Texture Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// Cube map validation error.
    #[error("Cube map error: {0}")]
    CubeMapError(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Platform-Specific Errors
    // ========================================================================
    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),

    /// WASM-specific error.
    #[cfg(target_arch = "wasm32")]
    #[error("WASM error: {0}")]
    WasmError(String),
}

/// Alias for `Result<T, MythError>`.
pub type Result<T> = std::result::Result<T, MythError>;

/// Errors raised by the deferred render graph (`renderer::deferred`).
///
/// Mirrors [`MythError`]'s structure but is kept separate since most
/// variants here are specific to the bind-less GPU-resident data model
/// (capacity caps, missing required lights) rather than asset I/O.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A fixed-size GPU buffer (vertices, indices, materials, joint
    /// matrices, weights, ...) would overflow its configured capacity.
    #[error("{resource} capacity exceeded: requested {requested} bytes, capacity is {capacity} bytes")]
    CapacityExceeded {
        resource: &'static str,
        requested: u64,
        capacity: u64,
    },

    /// A mesh, model or manifest violates one of the invariants in spec 3.1.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A required wgpu adapter feature (e.g. `MULTI_DRAW_INDIRECT`) is missing.
    #[error("required GPU feature missing: {0}")]
    RequiredFeatureMissing(String),

    /// The scene has no directional light; one is required for shadow computation.
    #[error("scene has no directional light; exactly one is required for shadow computation")]
    RequiredLightMissing,

    /// The GPU device was lost during submission.
    #[error("device lost: {0}")]
    DeviceLost(String),

    /// Surface acquire/present reported out-of-date or suboptimal; recoverable via resize.
    #[error("surface out of date")]
    SurfaceOutdated,

    /// Asset I/O error while reading a model/material manifest or binary blob.
    #[error("asset I/O error: {0}")]
    AssetIo(#[from] std::io::Error),

    /// Manifest JSON failed to parse.
    #[error("manifest parse error: {0}")]
    AssetParse(#[from] serde_json::Error),

    /// Shader module failed validation at pipeline-creation time.
    #[error("shader validation error: {0}")]
    ShaderValidation(String),
}

/// Alias for `Result<T, RenderError>`.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
