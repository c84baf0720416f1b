//! `TextureCache` — deduplicating registry mapping a texture path to a
//! dense `u32` index into the bindless sampled-texture array.
//!
//! Narrowed from the teacher's `core::resources::texture::GpuImage`
//! lifecycle (`version`/`generation_id` dirty tracking) down to the two
//! operations this spec names; texture *decoding* stays external (the
//! renderer only registers an already-decoded `image::RgbaImage` per path).

use rustc_hash::FxHashMap;

use crate::renderer::deferred::types::TEXTURE_INDEX_NONE;

struct CachedTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Maps texture paths to dense indices, and produces the padded view list
/// consumed by `ScenePass`'s bindless texture-array bind group.
pub struct TextureCache {
    index_of: FxHashMap<String, u32>,
    textures: Vec<CachedTexture>,
    max_textures: u32,
}

impl TextureCache {
    #[must_use]
    pub fn new(max_textures: u32) -> Self {
        Self { index_of: FxHashMap::default(), textures: Vec::new(), max_textures }
    }

    /// Registers a decoded image under `path`, uploading it to a new GPU
    /// texture the first time it is seen. Returns `None` for an empty path
    /// (callers should store [`TEXTURE_INDEX_NONE`] in that case); the
    /// index assigned to a path never changes afterwards.
    pub fn register(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
        width: u32,
        height: u32,
        rgba8: &[u8],
    ) -> Option<u32> {
        if path.is_empty() {
            return None;
        }
        if let Some(&idx) = self.index_of.get(path) {
            return Some(idx);
        }
        if self.textures.len() as u32 >= self.max_textures {
            log::error!("TextureCache: max_textures ({}) exceeded, reusing last slot for {path}", self.max_textures);
            return self.textures.len().checked_sub(1).map(|i| i as u32);
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(path),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            rgba8,
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(4 * width), rows_per_image: Some(height) },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let idx = self.textures.len() as u32;
        self.textures.push(CachedTexture { texture, view });
        self.index_of.insert(path.to_string(), idx);
        Some(idx)
    }

    /// Synchronous lookup-only path for callers (e.g. `MaterialSource`)
    /// that only need the stable index of an already-registered path, or
    /// the sentinel if it was never registered.
    #[must_use]
    pub fn get_or_create(&mut self, path: &str) -> Option<u32> {
        if path.is_empty() {
            return None;
        }
        self.index_of.get(path).copied().or(Some(TEXTURE_INDEX_NONE))
    }

    /// Returns the backing views in index order, padded by repeating the
    /// last registered view up to `max_textures` (Vulkan/wgpu requires
    /// every binding in a fixed-size array to be a valid descriptor).
    #[must_use]
    pub fn as_list(&self) -> Vec<&wgpu::TextureView> {
        let mut views: Vec<&wgpu::TextureView> = self.textures.iter().map(|t| &t.view).collect();
        if let Some(last) = views.last().copied() {
            while views.len() < self.max_textures as usize {
                views.push(last);
            }
        }
        views
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_returns_none() {
        let mut cache = TextureCache::new(4);
        assert_eq!(cache.get_or_create(""), None);
    }

    #[test]
    fn unregistered_path_is_sentinel() {
        let mut cache = TextureCache::new(4);
        assert_eq!(cache.get_or_create("missing.png"), Some(TEXTURE_INDEX_NONE));
    }
}
