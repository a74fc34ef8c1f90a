// Cache module - decoded thumbnail textures
mod texture_cache;

pub use texture_cache::{decode_image, ThumbnailCache};
