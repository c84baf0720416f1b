//! Transient frame graph executor.
//!
//! Mirrors `renderer::graph::graph::RenderGraph`'s shape (a fresh,
//! reference-only graph built each frame, single shared `CommandEncoder`,
//! debug groups per node) but the component order here is fixed by spec 2's
//! data-flow diagram rather than discovered through stage sorting, so there
//! is no `FrameBuilder`/`RenderStage` indirection — `FrameOrchestrator`
//! pushes nodes in the exact order the spec names them.

use smallvec::SmallVec;

use crate::errors::RenderResult;

use super::context::{ExecuteContext, PrepareContext};
use super::node::DeferredNode;

pub struct FrameGraph<'a> {
    nodes: SmallVec<[&'a mut dyn DeferredNode; 9]>,
}

impl<'a> FrameGraph<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: SmallVec::new() }
    }

    pub fn push(&mut self, node: &'a mut dyn DeferredNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Prepares every node in push order. Stops at the first fatal error —
    /// a node later in the order may depend on state an earlier node failed
    /// to produce (e.g. `LightingPass` needs the cascades `ShadowPass` builds).
    pub fn prepare(&mut self, ctx: &mut PrepareContext) -> RenderResult<()> {
        for node in &mut self.nodes {
            node.prepare(ctx)?;
        }
        Ok(())
    }

    /// Records every node's commands against one shared encoder, in push
    /// order, and submits once — the frame-internal ordering guarantees of
    /// spec 5 fall out of this because wgpu inserts implicit barriers
    /// between render/compute passes recorded against the same encoder.
    pub fn execute(&self, ctx: &ExecuteContext) {
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("DeferredFrameGraph"),
        });

        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            node.run(ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        ctx.queue.submit(Some(encoder.finish()));
    }
}

impl Default for FrameGraph<'_> {
    fn default() -> Self {
        Self::new()
    }
}
