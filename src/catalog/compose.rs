// Entry composer - turns upload form input into a catalog entry
use chrono::{DateTime, Datelike, Local, TimeZone};
use thiserror::Error;
use tracing::debug;

use super::{CatalogEntry, UPLOADS_CATEGORY};

/// Thumbnail used when the form carries an empty thumbnail reference
pub const DEFAULT_THUMBNAIL: &str = "https://picsum.photos/seed/default/800/450";

/// Rating given to every upload
pub const UPLOAD_RATING: &str = "PG-13";

/// Raw upload form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    /// Chosen in the form, but not used for placement
    pub category: String,
    /// Thumbnail as a data URI, once the picked file has been read
    pub thumbnail: Option<String>,
    /// Video as a data URI, once the picked file has been read
    pub video: Option<String>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: "Action".to_string(),
            thumbnail: None,
            video: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("a title is required")]
    MissingTitle,

    #[error("a thumbnail is required")]
    MissingThumbnail,
}

impl UploadForm {
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.title.trim().is_empty() {
            return Err(UploadError::MissingTitle);
        }
        if self.thumbnail.is_none() {
            return Err(UploadError::MissingThumbnail);
        }
        Ok(())
    }
}

/// Builds catalog entries from upload forms and hands out their identifiers.
///
/// Identifiers are millisecond timestamps, bumped past the last one issued so
/// two uploads in the same millisecond still differ.
#[derive(Debug, Default)]
pub struct EntryComposer {
    last_id: Option<i64>,
}

impl EntryComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compose(&mut self, form: &UploadForm) -> Result<CatalogEntry, UploadError> {
        self.compose_at(form, &Local::now())
    }

    /// Compose as if the current time were `now`
    pub fn compose_at<Tz: TimeZone>(
        &mut self,
        form: &UploadForm,
        now: &DateTime<Tz>,
    ) -> Result<CatalogEntry, UploadError> {
        form.validate()?;

        let thumbnail = match form.thumbnail.as_deref() {
            Some("") | None => DEFAULT_THUMBNAIL.to_string(),
            Some(uri) => uri.to_string(),
        };
        let video_url = form.video.clone().filter(|uri| !uri.is_empty());

        let entry = CatalogEntry {
            id: self.next_id(now.timestamp_millis()),
            title: form.title.clone(),
            description: form.description.clone(),
            thumbnail,
            video_url,
            category: placement(form).to_string(),
            rating: UPLOAD_RATING.to_string(),
            year: now.year().to_string(),
            is_user_uploaded: true,
        };

        debug!(id = %entry.id, playable = entry.is_playable(), "Composed upload entry");
        Ok(entry)
    }

    fn next_id(&mut self, millis: i64) -> String {
        let id = match self.last_id {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last_id = Some(id);
        id.to_string()
    }
}

/// Category an upload is filed under.
///
/// Uploads always go to the uploads row. The category picked in the form
/// stays on the form and does not affect placement.
fn placement(form: &UploadForm) -> &'static str {
    if form.category != UPLOADS_CATEGORY {
        debug!(requested = %form.category, "Filing upload under {}", UPLOADS_CATEGORY);
    }
    UPLOADS_CATEGORY
}
