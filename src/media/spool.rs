// Media spool - writes embedded videos to disk so the player can open them
use md5::{Digest, Md5};
use std::path::PathBuf;
use tracing::debug;

use super::data_uri::{decode_data_uri, extension_for_mime, is_data_uri};
use super::MediaError;

/// Content-addressed cache of embedded media
#[derive(Debug, Clone)]
pub struct MediaSpool {
    dir: PathBuf,
}

impl MediaSpool {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Turn a video reference into something the player can open.
    ///
    /// `data:` URIs are written once to `<dir>/<md5>.<ext>`; any other
    /// reference (remote URL, file path) is returned unchanged.
    pub fn materialize(&self, reference: &str) -> Result<String, MediaError> {
        if !is_data_uri(reference) {
            return Ok(reference.to_string());
        }

        let data = decode_data_uri(reference)?;
        let digest = Md5::digest(&data.bytes);
        let path = self
            .dir
            .join(format!("{:x}.{}", digest, extension_for_mime(&data.mime)));

        if !path.exists() {
            std::fs::create_dir_all(&self.dir)?;
            // Write beside the target first so a partial file is never opened
            let partial = path.with_extension("part");
            std::fs::write(&partial, &data.bytes)?;
            std::fs::rename(&partial, &path)?;
            debug!("Spooled {} bytes to {}", data.bytes.len(), path.display());
        }

        Ok(path.display().to_string())
    }
}
