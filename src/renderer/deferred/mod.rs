//! Bind-less, indirect-draw deferred renderer: GPU skeletal skinning,
//! cascaded shadow maps, a four-target G-buffer, and a Cook-Torrance
//! lighting pass with FXAA.
//!
//! This subsystem is self-contained: it has its own scene representation
//! ([`scene_data::SceneData`]) rather than reusing `crate::scene::Scene`,
//! because its data model is a flat, GPU-resident entity list with no node
//! graph, skeleton hierarchy, or morph targets — see `scene_data`'s module
//! doc for the full rationale.

pub mod attachments;
pub mod context;
pub mod global_buffers;
pub mod graph;
pub mod manifest;
pub mod node;
pub mod orchestrator;
pub mod passes;
pub mod pipelines;
pub mod scene_data;
pub mod texture_cache;
pub mod types;
pub mod uniforms;

pub use orchestrator::FrameOrchestrator;
pub use scene_data::{SceneCamera, SceneData};
