//! Data models for anitrack
//!
//! Defines the catalog item, the watchlist entry stored per user, and the
//! signed-in identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One anime from the ranked catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// MyAnimeList identifier
    pub mal_id: i64,
    /// Display title
    pub title: String,
    /// Poster image URL
    pub image_url: String,
    /// Position in the ranking, when the API reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    /// Canonical page for the anime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CatalogItem {
    /// Create an item with only the fields a watchlist keeps
    pub fn new(mal_id: i64, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            mal_id,
            title: title.into(),
            image_url: image_url.into(),
            rank: None,
            score: None,
            episodes: None,
            url: None,
        }
    }

    /// The fields copied into a watchlist document
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            mal_id: self.mal_id,
            title: self.title.clone(),
            image_url: self.image_url.clone(),
        }
    }

    /// Page to open for this item, falling back to the MyAnimeList URL
    pub fn page_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://myanimelist.net/anime/{}", self.mal_id))
    }
}

/// The body of a watchlist document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryFields {
    pub mal_id: i64,
    pub title: String,
    pub image_url: String,
}

/// A saved anime in a user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistEntry {
    /// Document id assigned by the store
    pub id: String,
    pub mal_id: i64,
    pub title: String,
    pub image_url: String,
}

impl WatchlistEntry {
    /// Build an entry from a stored document
    pub fn from_document(id: impl Into<String>, fields: EntryFields) -> Self {
        Self {
            id: id.into(),
            mal_id: fields.mal_id,
            title: fields.title,
            image_url: fields.image_url,
        }
    }

    pub fn page_url(&self) -> String {
        format!("https://myanimelist.net/anime/{}", self.mal_id)
    }
}

/// A signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user id that scopes the watchlist collection
    pub user_id: String,
    /// Name shown in the UI
    pub display_name: String,
    /// When this session started
    pub signed_in_at: DateTime<Utc>,
}

impl Identity {
    /// Create an identity for a session starting now
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            signed_in_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_drop_display_metadata() {
        let mut item = CatalogItem::new(1, "Naruto", "x");
        item.rank = Some(3);
        item.score = Some(8.1);

        let fields = item.fields();
        assert_eq!(fields.mal_id, 1);
        assert_eq!(fields.title, "Naruto");
        assert_eq!(fields.image_url, "x");

        let json = serde_json::to_value(&fields).unwrap();
        assert!(json.get("rank").is_none());
    }

    #[test]
    fn test_entry_from_document() {
        let entry = WatchlistEntry::from_document("abc", CatalogItem::new(5, "Bleach", "y").fields());
        assert_eq!(entry.id, "abc");
        assert_eq!(entry.mal_id, 5);
        assert_eq!(entry.title, "Bleach");
    }

    #[test]
    fn test_page_url_fallback() {
        let item = CatalogItem::new(20, "Naruto", "");
        assert_eq!(item.page_url(), "https://myanimelist.net/anime/20");

        let mut linked = item.clone();
        linked.url = Some("https://example.com/naruto".to_string());
        assert_eq!(linked.page_url(), "https://example.com/naruto");
    }
}
