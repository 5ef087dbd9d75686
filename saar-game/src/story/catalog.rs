//! Static chapter, document and whisper definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use super::StoryError;

const DEFAULT_STORY_DATA: &str = include_str!("../../assets/story.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDef {
    pub id: u8,
    pub name: String,
    pub location: String,
    pub objective: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDef {
    pub id: u8,
    pub title: String,
    /// Chapter whose successor this document unlocks.
    pub chapter: u8,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryCatalog {
    pub chapters: Vec<ChapterDef>,
    pub documents: Vec<DocumentDef>,
    #[serde(default)]
    pub whispers: Vec<String>,
}

impl StoryCatalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidCatalog`] for malformed JSON or broken references.
    pub fn from_json(json: &str) -> Result<Self, StoryError> {
        let catalog: Self = serde_json::from_str(json)
            .map_err(|err| StoryError::InvalidCatalog(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog shipped with the crate, shared across sessions.
    ///
    /// # Panics
    ///
    /// Panics if the embedded story asset is invalid, which the unit tests rule out.
    #[must_use]
    pub fn shipped() -> Arc<Self> {
        static CATALOG: OnceLock<Arc<StoryCatalog>> = OnceLock::new();
        CATALOG
            .get_or_init(|| {
                Arc::new(Self::from_json(DEFAULT_STORY_DATA).expect("embedded story catalog"))
            })
            .clone()
    }

    /// Chapters are numbered `0..n` in order and every document points at a real chapter.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidCatalog`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoryError> {
        if self.chapters.is_empty() {
            return Err(StoryError::InvalidCatalog("no chapters".into()));
        }
        if self.chapters.len() > usize::from(u8::MAX) {
            return Err(StoryError::InvalidCatalog("too many chapters".into()));
        }
        for (idx, chapter) in self.chapters.iter().enumerate() {
            if usize::from(chapter.id) != idx {
                return Err(StoryError::InvalidCatalog(format!(
                    "chapter {} listed at position {idx}",
                    chapter.id
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for doc in &self.documents {
            if !seen.insert(doc.id) {
                return Err(StoryError::InvalidCatalog(format!(
                    "document {} defined twice",
                    doc.id
                )));
            }
            if usize::from(doc.chapter) >= self.chapters.len() {
                return Err(StoryError::InvalidCatalog(format!(
                    "document {} references chapter {}",
                    doc.id, doc.chapter
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn chapter(&self, index: u8) -> Option<&ChapterDef> {
        self.chapters.get(usize::from(index))
    }

    #[must_use]
    pub fn document(&self, id: u8) -> Option<&DocumentDef> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    #[must_use]
    pub fn last_chapter_index(&self) -> u8 {
        u8::try_from(self.chapters.len().saturating_sub(1)).unwrap_or(u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_catalog_has_eight_chapters_and_documents() {
        let catalog = StoryCatalog::shipped();
        assert_eq!(catalog.chapters.len(), 8);
        assert_eq!(catalog.documents.len(), 8);
        assert_eq!(catalog.last_chapter_index(), 7);
        assert!(!catalog.whispers.is_empty());
        for doc in &catalog.documents {
            assert_eq!(doc.chapter, doc.id - 1, "document {} chapter mapping", doc.id);
        }
    }

    #[test]
    fn rejects_document_pointing_past_last_chapter() {
        let json = r#"{
            "chapters": [{ "id": 0, "name": "A", "location": "L", "objective": "O" }],
            "documents": [{ "id": 1, "title": "T", "chapter": 3 }]
        }"#;
        let err = StoryCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, StoryError::InvalidCatalog(msg) if msg.contains("chapter 3")));
    }

    #[test]
    fn rejects_out_of_order_chapters() {
        let json = r#"{
            "chapters": [{ "id": 1, "name": "A", "location": "L", "objective": "O" }],
            "documents": []
        }"#;
        assert!(StoryCatalog::from_json(json).is_err());
    }

    #[test]
    fn rejects_duplicate_documents() {
        let json = r#"{
            "chapters": [
                { "id": 0, "name": "A", "location": "L", "objective": "O" },
                { "id": 1, "name": "B", "location": "L", "objective": "O" }
            ],
            "documents": [
                { "id": 1, "title": "T", "chapter": 0 },
                { "id": 1, "title": "U", "chapter": 0 }
            ]
        }"#;
        assert!(StoryCatalog::from_json(json).is_err());
    }
}
