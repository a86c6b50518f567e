//! Bookmark Manager for Zentabs.
//!
//! Implements `BookmarkManagerTrait`: an in-memory bookmark list where each
//! URL appears at most once.

use uuid::Uuid;

use crate::types::bookmark::Bookmark;
use crate::types::errors::BookmarkError;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        favicon: Option<&str>,
    ) -> Result<String, BookmarkError>;
    fn remove_bookmark(&mut self, url: &str) -> Result<(), BookmarkError>;
    fn get_bookmark(&self, url: &str) -> Option<&Bookmark>;
    fn is_bookmarked(&self, url: &str) -> bool;
    fn list_bookmarks(&self) -> &[Bookmark];
}

/// Bookmarks kept in insertion order.
#[derive(Debug, Default)]
pub struct BookmarkManager {
    bookmarks: Vec<Bookmark>,
}

impl BookmarkManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    /// Adds a new bookmark. Returns the generated bookmark ID.
    fn add_bookmark(
        &mut self,
        url: &str,
        title: &str,
        favicon: Option<&str>,
    ) -> Result<String, BookmarkError> {
        if self.is_bookmarked(url) {
            return Err(BookmarkError::DuplicateUrl(url.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        self.bookmarks.push(Bookmark {
            id: id.clone(),
            url: url.to_string(),
            title: title.to_string(),
            favicon: favicon.map(str::to_string),
        });
        Ok(id)
    }

    /// Removes the bookmark for `url`.
    fn remove_bookmark(&mut self, url: &str) -> Result<(), BookmarkError> {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.url != url);
        if self.bookmarks.len() == before {
            return Err(BookmarkError::NotFound(url.to_string()));
        }
        Ok(())
    }

    fn get_bookmark(&self, url: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.url == url)
    }

    fn is_bookmarked(&self, url: &str) -> bool {
        self.get_bookmark(url).is_some()
    }

    fn list_bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }
}
