//! spec 8.3 scenario 4: indirect-draw stream construction.
//!
//! Loads 10 models, 3 meshes each, 100 entities per model, and checks the
//! static indirect-command stream's shape (one command per model/mesh,
//! correct per-model instance counts, dense `first_instance` ordering)
//! without touching a `wgpu::Device` — `build_indirect_streams` is pure.

use glam::Mat4;
use myth::renderer::deferred::global_buffers::build_indirect_streams;
use myth::renderer::deferred::types::{AnimationState, Entity, Mesh, Model, VERTEX_STRIDE};

fn static_mesh(index: u32) -> Mesh {
    Mesh {
        vertex_offset: 0,
        vertex_size: VERTEX_STRIDE,
        index_offset: u64::from(index) * 12,
        index_count: 3,
        material_index: 0,
        weights_offset: None,
    }
}

fn skinned_mesh() -> Mesh {
    Mesh {
        vertex_offset: 0,
        vertex_size: VERTEX_STRIDE,
        index_offset: 0,
        index_count: 3,
        material_index: 0,
        weights_offset: Some(0),
    }
}

#[test]
fn ten_models_three_meshes_hundred_instances_each() {
    let models: Vec<Model> = (0..10)
        .map(|id| Model { id, meshes: vec![static_mesh(0), static_mesh(1), static_mesh(2)], animations: vec![] })
        .collect();
    let entities: Vec<Entity> =
        (0..10).flat_map(|model_id| (0..100).map(move |_| Entity::new_static(model_id, Mat4::IDENTITY))).collect();
    assert_eq!(entities.len(), 1000);

    let streams = build_indirect_streams(&models, &entities).expect("static-only load must not fail");

    // 10 models x 3 meshes = 30 commands in the static indirect buffer; the
    // G-buffer pass still issues exactly one `multi_draw_indexed_indirect`
    // call against this whole buffer (see GBufferNode::run), so the draw
    // call count stays fixed at two per ScenePass regardless of how many
    // commands the buffer carries.
    assert_eq!(streams.static_cmds.len(), 30);
    assert!(streams.anim_cmds.is_empty());

    for cmd in &streams.static_cmds {
        assert_eq!(cmd.instance_count, 100);
    }

    // Every third command belongs to the same mesh slot across all ten
    // models; summing that slot recovers the total entity count from the
    // scenario (1000).
    let per_mesh_slot_total: u32 = streams.static_cmds.iter().step_by(3).map(|c| c.instance_count).sum();
    assert_eq!(per_mesh_slot_total, 1000);

    let first_instances: Vec<u32> = streams.static_cmds.iter().map(|c| c.first_instance).collect();
    assert_eq!(first_instances, (0..30).collect::<Vec<_>>());
}

#[test]
fn mixed_static_and_animated_models_stay_in_separate_streams() {
    let models = vec![
        Model { id: 0, meshes: vec![static_mesh(0)], animations: vec![] },
        Model { id: 1, meshes: vec![skinned_mesh(), skinned_mesh()], animations: vec![] },
    ];
    let entities = vec![
        Entity::new_static(0, Mat4::IDENTITY),
        Entity::new_static(0, Mat4::IDENTITY),
        Entity::new_animated(1, Mat4::IDENTITY, AnimationState::default()),
    ];

    let streams = build_indirect_streams(&models, &entities).expect("mixed load must not fail");

    assert_eq!(streams.static_cmds.len(), 1);
    assert_eq!(streams.static_cmds[0].instance_count, 2);

    assert_eq!(streams.anim_cmds.len(), 2);
    assert!(streams.anim_cmds.iter().all(|c| c.instance_count == 1));
    assert_eq!(streams.skinning_jobs.len(), 2);
}
