// Search filter and category partitioning over the catalog
use super::{CatalogEntry, UPLOADS_CATEGORY};

/// Result of running a search query, keeping "no query" and "no matches" apart
#[derive(Debug, PartialEq)]
pub enum SearchOutcome<'a> {
    /// The query is empty; the browse screen should be shown
    Inactive,
    Matches(Vec<&'a CatalogEntry>),
    NoMatches,
}

/// Entries whose title, description or category contain `query`, ignoring case.
/// An empty query keeps every entry.
pub fn filter<'a>(catalog: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    if query.is_empty() {
        return catalog.iter().collect();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|entry| {
            entry.title.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
                || entry.category.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn search<'a>(catalog: &'a [CatalogEntry], query: &str) -> SearchOutcome<'a> {
    if query.is_empty() {
        return SearchOutcome::Inactive;
    }

    let hits = filter(catalog, query);
    if hits.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(hits)
    }
}

/// Entries belonging to one category row.
///
/// The uploads row holds every user upload whatever its stored label; other
/// rows match the label exactly and never include uploads.
pub fn partition<'a>(catalog: &'a [CatalogEntry], category: &str) -> Vec<&'a CatalogEntry> {
    if category == UPLOADS_CATEGORY {
        catalog.iter().filter(|e| e.is_user_uploaded).collect()
    } else {
        catalog
            .iter()
            .filter(|e| !e.is_user_uploaded && e.category == category)
            .collect()
    }
}

/// Heading shown above a category row
pub fn row_title(category: &str) -> String {
    if category == UPLOADS_CATEGORY {
        "Your Personal Collection".to_string()
    } else {
        format!("{} on View 4K", category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_catalog;

    fn uploaded(id: &str, title: &str, category: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            title: title.to_string(),
            description: "home footage".to_string(),
            thumbnail: "data:image/png;base64,AAAA".to_string(),
            video_url: None,
            category: category.to_string(),
            rating: "PG-13".to_string(),
            year: "2025".to_string(),
            is_user_uploaded: true,
        }
    }

    fn titles(entries: &[&CatalogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn empty_query_keeps_catalog_in_order() {
        let catalog = seed_catalog();
        let result = filter(&catalog, "");

        assert_eq!(result.len(), catalog.len());
        assert!(result.iter().zip(&catalog).all(|(a, b)| std::ptr::eq(*a, b)));
        assert_eq!(search(&catalog, ""), SearchOutcome::Inactive);
    }

    #[test]
    fn finds_title_ignoring_case() {
        let catalog = seed_catalog();
        assert_eq!(titles(&filter(&catalog, "neon")), ["Neon Nights"]);
        assert_eq!(titles(&filter(&catalog, "NEON")), ["Neon Nights"]);
    }

    #[test]
    fn matches_description_and_category_substrings() {
        let catalog = seed_catalog();
        assert_eq!(titles(&filter(&catalog, "mariana")), ["Ocean Deep"]);
        assert_eq!(
            titles(&filter(&catalog, "sci-f")),
            ["Interstellar Voyager", "Ocean Deep"]
        );
        // Substring, not word match: "pop" hits the Popular category
        assert_eq!(
            titles(&filter(&catalog, "pop")),
            ["Midnight Heist", "Echoes of Time"]
        );
    }

    #[test]
    fn no_match_is_distinct_from_no_query() {
        let catalog = seed_catalog();
        assert!(filter(&catalog, "xyz123").is_empty());
        assert_eq!(search(&catalog, "xyz123"), SearchOutcome::NoMatches);
        assert!(matches!(search(&catalog, "neon"), SearchOutcome::Matches(hits) if hits.len() == 1));
    }

    #[test]
    fn every_result_matches_and_every_omission_does_not() {
        let mut catalog = seed_catalog();
        catalog.insert(0, uploaded("10", "Beach Day", "My Uploads"));
        let query = "the";
        let needle = query.to_lowercase();
        let hits = filter(&catalog, query);

        let matches = |e: &CatalogEntry| {
            e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
                || e.category.to_lowercase().contains(&needle)
        };
        for entry in &catalog {
            let included = hits.iter().any(|h| h.id == entry.id);
            assert_eq!(included, matches(entry), "entry {}", entry.title);
        }
    }

    #[test]
    fn uploads_row_uses_flag_not_label() {
        let mut catalog = seed_catalog();
        catalog.insert(0, uploaded("11", "Mislabeled", "Action"));
        catalog.insert(0, uploaded("12", "Newest", "My Uploads"));

        assert_eq!(
            titles(&partition(&catalog, UPLOADS_CATEGORY)),
            ["Newest", "Mislabeled"]
        );
    }

    #[test]
    fn content_rows_match_label_exactly_and_skip_uploads() {
        let mut catalog = seed_catalog();
        catalog.insert(0, uploaded("11", "Mislabeled", "Action"));

        assert_eq!(titles(&partition(&catalog, "Action")), ["Neon Nights"]);
        assert!(partition(&catalog, "action").is_empty());
        assert!(partition(&catalog, "Documentary").is_empty());
    }

    #[test]
    fn seed_catalog_has_no_uploads_row() {
        assert!(partition(&seed_catalog(), UPLOADS_CATEGORY).is_empty());
    }

    #[test]
    fn row_titles() {
        assert_eq!(row_title("Sci-Fi"), "Sci-Fi on View 4K");
        assert_eq!(row_title(UPLOADS_CATEGORY), "Your Personal Collection");
    }
}
