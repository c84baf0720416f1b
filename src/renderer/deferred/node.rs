//! Render node trait for the deferred graph.
//!
//! Mirrors `renderer::graph::node::RenderNode`'s `prepare`/`run` split
//! exactly, but against this subsystem's own [`PrepareContext`]/
//! [`ExecuteContext`] — the teacher's contexts carry per-material pipeline
//! variant and cull/sort state that this bind-less data model doesn't have.

use crate::errors::RenderResult;

use super::context::{ExecuteContext, PrepareContext};

pub trait DeferredNode {
    /// Name used for debug groups and logging.
    fn name(&self) -> &str;

    /// Allocates resources, builds pipelines/bind groups. No GPU commands.
    ///
    /// Returns `Err` for a fatal, scene-level misconfiguration (e.g. a
    /// missing required light) that the frame cannot recover from.
    fn prepare(&mut self, _ctx: &mut PrepareContext) -> RenderResult<()> {
        Ok(())
    }

    /// Records GPU commands. Read-only with respect to node state.
    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
