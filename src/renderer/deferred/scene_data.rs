//! Scene API (spec 6.3) — the thin, flat data surface the render graph
//! consumes from the embedding application each frame.
//!
//! This is deliberately independent of `crate::scene::Scene` (the teacher's
//! full ECS scene graph with nodes/skeletons/morph targets): the spec's
//! `Entity` model is a flat list of (model, transform, animation-state)
//! records, which is what `GlobalBuffers` actually needs to build its
//! indirect-draw streams.

use glam::{Mat4, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::renderer::deferred::types::{AnimationState, Entity, ModelId};

/// Camera state read once per frame by `ShadowPass`/`ScenePass`/`LightingPass`.
#[derive(Debug, Clone, Copy)]
pub struct SceneCamera {
    pub position: Vec3,
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub near: f32,
    pub far: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0),
            near: 0.1,
            far: 100.0,
        }
    }
}

/// The renderer-facing scene container described in spec 6.3.
pub struct SceneData {
    entities: Vec<Entity>,
    pub camera: SceneCamera,
    pub ambient_light: Vec3,
    pub lights: Vec<crate::renderer::deferred::types::GpuLight>,
    entities_changed_at: u64,
}

static NEXT_TIMESTAMP: AtomicU64 = AtomicU64::new(1);

impl Default for SceneData {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            camera: SceneCamera::default(),
            ambient_light: Vec3::splat(0.03),
            lights: Vec::new(),
            entities_changed_at: NEXT_TIMESTAMP.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Adds an entity and bumps the entities-changed timestamp, signalling
    /// `FrameOrchestrator` to rebuild the indirect/instance/skinned buffers.
    pub fn add_entity(&mut self, model: ModelId, model_matrix: Mat4, animation: Option<AnimationState>) -> usize {
        self.entities.push(Entity { model, transform: model_matrix, animation });
        self.entities_changed_at = NEXT_TIMESTAMP.fetch_add(1, Ordering::Relaxed);
        self.entities.len() - 1
    }

    pub fn remove_entity(&mut self, index: usize) {
        if index < self.entities.len() {
            self.entities.remove(index);
            self.entities_changed_at = NEXT_TIMESTAMP.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    #[must_use]
    pub fn entities_changed_at(&self) -> u64 {
        self.entities_changed_at
    }

    /// The one required directional ("sun") light, per spec 3.1/7.
    #[must_use]
    pub fn directional_light(&self) -> Option<&crate::renderer::deferred::types::GpuLight> {
        self.lights.iter().find(|l| l.is_directional())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::deferred::types::GpuLight;

    #[test]
    fn add_entity_appends_and_bumps_changed_timestamp() {
        let mut scene = SceneData::new();
        let before = scene.entities_changed_at();
        let idx = scene.add_entity(0, Mat4::IDENTITY, None);
        assert_eq!(idx, 0);
        assert_eq!(scene.entities().len(), 1);
        assert!(scene.entities_changed_at() > before);
    }

    #[test]
    fn remove_entity_shrinks_list_and_bumps_timestamp() {
        let mut scene = SceneData::new();
        scene.add_entity(0, Mat4::IDENTITY, None);
        scene.add_entity(1, Mat4::IDENTITY, None);
        let before = scene.entities_changed_at();
        scene.remove_entity(0);
        assert_eq!(scene.entities().len(), 1);
        assert_eq!(scene.entities()[0].model, 1);
        assert!(scene.entities_changed_at() > before);
    }

    #[test]
    fn remove_entity_out_of_bounds_is_a_no_op() {
        let mut scene = SceneData::new();
        scene.add_entity(0, Mat4::IDENTITY, None);
        let before = scene.entities_changed_at();
        scene.remove_entity(5);
        assert_eq!(scene.entities().len(), 1);
        assert_eq!(scene.entities_changed_at(), before);
    }

    #[test]
    fn directional_light_finds_the_only_directional_entry() {
        let mut scene = SceneData::new();
        scene.lights.push(GpuLight::point(Vec3::ZERO, Vec3::ONE));
        assert!(scene.directional_light().is_none());
        scene.lights.push(GpuLight::directional(Vec3::Y, Vec3::ONE));
        assert!(scene.directional_light().is_some());
        assert!(scene.directional_light().unwrap().is_directional());
    }

    #[test]
    fn entities_mut_allows_in_place_transform_updates() {
        let mut scene = SceneData::new();
        scene.add_entity(0, Mat4::IDENTITY, None);
        scene.entities_mut()[0].transform = Mat4::from_translation(Vec3::X);
        assert_eq!(scene.entities()[0].transform, Mat4::from_translation(Vec3::X));
    }
}
