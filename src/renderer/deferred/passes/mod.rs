//! The six `DeferredNode` passes that make up one frame, in data-flow order.

pub mod gbuffer;
pub mod lighting;
pub mod post;
pub mod shadow;
pub mod shadow_math;
pub mod skin_compute;
pub mod swap_blit;
