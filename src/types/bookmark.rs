use serde::{Deserialize, Serialize};

/// Represents a saved bookmark. URLs are unique across the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
}
