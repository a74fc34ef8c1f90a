// Catalog module - entry model, seed data, store, search and upload composition
mod compose;
mod search;
mod store;

pub use compose::{EntryComposer, UploadForm};
pub use search::{partition, row_title, search, SearchOutcome};
pub use store::{CatalogError, CatalogStore};

use serde::{Deserialize, Serialize};

/// Category label reserved for user uploads
pub const UPLOADS_CATEGORY: &str = "My Uploads";

/// Category rows shown on the browse screen, in display order
pub const CATEGORIES: [&str; 5] = ["Trending", "Popular", "Action", "Sci-Fi", UPLOADS_CATEGORY];

/// Choices offered by the upload form's category selector
pub const UPLOAD_CATEGORY_CHOICES: [&str; 4] = ["Action", "Sci-Fi", "Trending", "Popular"];

/// One browsable item in the catalog.
///
/// Serialized with the same field names the catalog has always been stored
/// with (`videoUrl`, `isUserUploaded`), so existing saved catalogs keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Remote URI or embedded `data:` URI
    pub thumbnail: String,
    /// Remote URI or embedded `data:` URI. Absent means not playable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub category: String,
    pub rating: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_user_uploaded: bool,
}

impl CatalogEntry {
    /// Whether the detail view should show a player rather than the placeholder
    pub fn is_playable(&self) -> bool {
        self.video_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The catalog used when nothing usable has been persisted yet
pub fn seed_catalog() -> Vec<CatalogEntry> {
    vec![
        seed_entry(
            "1",
            "Interstellar Voyager",
            "A team of explorers travel beyond this galaxy to discover whether mankind has a future among the stars.",
            "interstellar",
            "Sci-Fi",
            "PG-13",
            "2024",
        ),
        seed_entry(
            "2",
            "Neon Nights",
            "In a dystopian future, a small-time hacker uncovers a massive corporate conspiracy that could change everything.",
            "neon",
            "Action",
            "R",
            "2023",
        ),
        seed_entry(
            "3",
            "The Silent Forest",
            "A biologist studying rare plant life in a remote forest discovers a secret that the local legends warned about.",
            "forest",
            "Trending",
            "12+",
            "2024",
        ),
        seed_entry(
            "4",
            "Midnight Heist",
            "A master thief is pulled out of retirement for one last job: stealing an impossible treasure from a high-security vault.",
            "heist",
            "Popular",
            "PG-13",
            "2023",
        ),
        seed_entry(
            "5",
            "Ocean Deep",
            "An underwater expedition goes wrong when the crew discovers something ancient and alive at the bottom of the Mariana Trench.",
            "ocean",
            "Sci-Fi",
            "R",
            "2024",
        ),
        seed_entry(
            "6",
            "Echoes of Time",
            "A scientist discovers a way to send messages to the past, but every message changes the future in unpredictable ways.",
            "time",
            "Popular",
            "PG-13",
            "2022",
        ),
    ]
}

/// The entry featured in the hero banner
pub fn hero_entry() -> CatalogEntry {
    seed_catalog().swap_remove(0)
}

fn seed_entry(
    id: &str,
    title: &str,
    description: &str,
    picsum_seed: &str,
    category: &str,
    rating: &str,
    year: &str,
) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        thumbnail: format!("https://picsum.photos/seed/{}/800/450", picsum_seed),
        video_url: None,
        category: category.to_string(),
        rating: rating.to_string(),
        year: year.to_string(),
        is_user_uploaded: false,
    }
}
