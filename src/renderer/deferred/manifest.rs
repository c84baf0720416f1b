//! Model and material manifest loaders (spec 6.1/6.2): turns an offline
//! converter's JSON + raw binary output into the [`ModelSource`]/
//! [`MaterialSource`] descriptors `GlobalBuffers::load_models` consumes.
//!
//! Grounded on the teacher's `assets::loaders::gltf` JSON-walking style
//! (`serde_json::Value` field lookups with explicit error propagation)
//! rather than its glTF-specific details, since this format is this spec's
//! own flat JSON manifest, not glTF.

use serde::Deserialize;

use crate::errors::{RenderError, RenderResult};
use crate::renderer::deferred::global_buffers::{
    AnimationClipSource, AnimationFrameSource, MaterialSource, MeshSource, ModelSource,
};
use crate::renderer::deferred::types::ModelId;

#[derive(Debug, Deserialize)]
struct MeshManifest {
    #[allow(dead_code)]
    id: u32,
    #[serde(rename = "materialId")]
    material_id: u32,
    #[serde(rename = "vtxOffset")]
    vtx_offset: u64,
    #[serde(rename = "vtxSize")]
    vtx_size: u64,
    #[serde(rename = "idxOffset")]
    idx_offset: u64,
    #[serde(rename = "idxSize")]
    idx_size: u64,
}

#[derive(Debug, Deserialize)]
struct AnimFrameManifest {
    #[serde(rename = "jointMatrices")]
    joint_matrices: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct AnimationManifest {
    frames: Vec<AnimFrameManifest>,
}

#[derive(Debug, Deserialize)]
struct AnimMeshDataManifest {
    #[serde(rename = "meshId")]
    #[allow(dead_code)]
    mesh_id: u32,
    weights: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ModelManifest {
    id: u32,
    meshes: Vec<MeshManifest>,
    #[serde(rename = "vtxPath")]
    vtx_path: String,
    #[serde(rename = "idxPath")]
    idx_path: String,
    #[serde(rename = "animMeshDataList", default)]
    anim_mesh_data_list: Vec<AnimMeshDataManifest>,
    #[serde(rename = "animationsList", default)]
    animations_list: Vec<AnimationManifest>,
}

/// Parses a model manifest (spec 6.1) plus its sibling vertex/index binary
/// files into a [`ModelSource`] ready for `GlobalBuffers::load_models`.
///
/// `read_file` abstracts the filesystem so callers can point at any
/// `AssetSource` (disk, embedded, virtual) the way `assets::io` does.
pub fn load_model_manifest(
    manifest_json: &str,
    mut read_file: impl FnMut(&str) -> RenderResult<Vec<u8>>,
) -> RenderResult<ModelSource> {
    let manifest: ModelManifest = serde_json::from_str(manifest_json)?;

    let vtx_bytes = read_file(&manifest.vtx_path)?;
    let idx_bytes = read_file(&manifest.idx_path)?;

    let weights_by_mesh: std::collections::HashMap<u32, &AnimMeshDataManifest> =
        manifest.anim_mesh_data_list.iter().map(|a| (a.mesh_id, a)).collect();

    let meshes = manifest
        .meshes
        .iter()
        .map(|mesh| {
            let vtx_start = usize::try_from(mesh.vtx_offset)
                .map_err(|_| RenderError::InvalidManifest("vtxOffset overflow".into()))?;
            let vtx_end = vtx_start + usize::try_from(mesh.vtx_size).unwrap_or(0);
            let idx_start = usize::try_from(mesh.idx_offset)
                .map_err(|_| RenderError::InvalidManifest("idxOffset overflow".into()))?;
            let idx_end = idx_start + usize::try_from(mesh.idx_size).unwrap_or(0);

            let vertices = vtx_bytes
                .get(vtx_start..vtx_end)
                .ok_or_else(|| RenderError::InvalidManifest("mesh vertex range out of bounds".into()))?
                .to_vec();
            let indices = idx_bytes
                .get(idx_start..idx_end)
                .ok_or_else(|| RenderError::InvalidManifest("mesh index range out of bounds".into()))?
                .to_vec();

            let weights = weights_by_mesh.get(&mesh.id).map(|w| bytemuck::cast_slice(&w.weights).to_vec());

            Ok(MeshSource { vertices, indices, material_index: mesh.material_id, weights })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    let animations = manifest
        .animations_list
        .into_iter()
        .map(|anim| AnimationClipSource {
            frames: anim
                .frames
                .into_iter()
                .map(|frame| AnimationFrameSource { joint_matrices: bytemuck::cast_slice(&frame.joint_matrices).to_vec() })
                .collect(),
        })
        .collect();

    Ok(ModelSource { id: manifest.id as ModelId, meshes, animations })
}

#[derive(Debug, Deserialize)]
struct MaterialManifestEntry {
    id: u32,
    #[serde(rename = "diffuseTexture", default)]
    diffuse_texture: Option<String>,
    #[serde(rename = "normalTexture", default)]
    normal_texture: Option<String>,
    #[serde(rename = "metallicRoughTexture", default)]
    metallic_rough_texture: Option<String>,
    #[serde(rename = "diffuseColor")]
    diffuse_color: [f32; 4],
    #[serde(rename = "roughnessFactor")]
    roughness_factor: f32,
    #[serde(rename = "metallicFactor")]
    metallic_factor: f32,
}

/// Parses a material manifest (spec 6.2) into ordered [`MaterialSource`]
/// records; texture paths are resolved against `TextureCache` later, at
/// `GlobalBuffers::load_models` time.
pub fn load_material_manifest(manifest_json: &str) -> RenderResult<Vec<(u32, MaterialSource)>> {
    let entries: Vec<MaterialManifestEntry> = serde_json::from_str(manifest_json)?;

    Ok(entries
        .into_iter()
        .map(|e| {
            (
                e.id,
                MaterialSource {
                    diffuse_color: e.diffuse_color,
                    albedo_texture: e.diffuse_texture,
                    normal_texture: e.normal_texture,
                    metallic_roughness_texture: e.metallic_rough_texture,
                    roughness_factor: e.roughness_factor,
                    metallic_factor: e.metallic_factor,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_manifest_parses_fields() {
        let json = r#"[{"id":0,"diffuseTexture":"a.png","diffuseColor":[1,1,1,1],"roughnessFactor":0.5,"metallicFactor":0.0}]"#;
        let parsed = load_material_manifest(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, 0);
        assert_eq!(parsed[0].1.albedo_texture.as_deref(), Some("a.png"));
    }

    #[test]
    fn model_manifest_rejects_out_of_bounds_mesh_range() {
        let json = r#"{"id":1,"meshes":[{"id":0,"materialId":0,"vtxOffset":0,"vtxSize":1000,"idxOffset":0,"idxSize":4}],"vtxPath":"v.bin","idxPath":"i.bin"}"#;
        let result = load_model_manifest(json, |path| {
            if path == "v.bin" {
                Ok(vec![0u8; 56])
            } else {
                Ok(vec![0u8; 4])
            }
        });
        assert!(result.is_err());
    }
}
