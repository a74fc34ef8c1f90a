// Media module - data URI encoding of picked files and spooling for playback
mod data_uri;
mod spool;

pub use data_uri::{decode_data_uri, encode_data_uri, is_data_uri};
pub use spool::MediaSpool;

use thiserror::Error;

/// Extensions offered by the thumbnail picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Extensions offered by the video picker
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}
