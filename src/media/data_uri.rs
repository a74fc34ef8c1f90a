// data: URI helpers
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use super::MediaError;

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn is_data_uri(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Read a file into a base64 `data:` URI typed by its extension
pub fn encode_data_uri(path: &Path) -> Result<String, MediaError> {
    let bytes = std::fs::read(path)?;
    Ok(encode_bytes(mime_for_path(path), &bytes))
}

fn encode_bytes(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn decode_data_uri(uri: &str) -> Result<DataUri, MediaError> {
    let rest = uri.strip_prefix("data:").ok_or(MediaError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::NotDataUri)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(MediaError::NotBase64);
    }

    Ok(DataUri {
        mime: if mime.is_empty() { "text/plain" } else { mime }.to_string(),
        bytes: STANDARD.decode(payload.trim())?,
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// File extension to use when writing out bytes of the given type
pub(crate) fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/x-msvideo" => "avi",
        _ => "bin",
    }
}
