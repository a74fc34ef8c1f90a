// GPU texture cache for embedded thumbnails, with LRU eviction
use egui::{ColorImage, Context, TextureHandle};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use tracing::warn;

use crate::media::{decode_data_uri, MediaError};

/// Textures decoded from `data:` URI thumbnails, keyed by entry id.
///
/// Remote thumbnails are left to egui's own HTTP image loader; only embedded
/// ones are decoded here. Keys that failed to decode are remembered so the
/// work is not retried every frame.
pub struct ThumbnailCache {
    cache: LruCache<String, TextureHandle>,
    failed: HashSet<String>,
}

impl ThumbnailCache {
    /// Create a new cache holding at most `max_size` textures
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN)),
            failed: HashSet::new(),
        }
    }

    /// Get a texture from the cache, decoding `data_uri` if not present
    pub fn get_or_decode(&mut self, ctx: &Context, key: &str, data_uri: &str) -> Option<&TextureHandle> {
        if self.failed.contains(key) {
            return None;
        }

        if !self.cache.contains(key) {
            match decode_image(data_uri) {
                Ok(image) => {
                    let handle = ctx.load_texture(format!("thumb-{}", key), image, egui::TextureOptions::LINEAR);
                    self.cache.put(key.to_string(), handle);
                }
                Err(e) => {
                    warn!("Failed to decode thumbnail for {}: {}", key, e);
                    self.failed.insert(key.to_string());
                    return None;
                }
            }
        }
        self.cache.get(key)
    }

    /// Get the number of cached textures
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// Decode an embedded image into pixels ready for upload to the GPU
pub fn decode_image(data_uri: &str) -> Result<ColorImage, MediaError> {
    let data = decode_data_uri(data_uri)?;
    let img = image::load_from_memory(&data.bytes)?.to_rgba8();
    let (w, h) = img.dimensions();
    Ok(ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &img))
}
