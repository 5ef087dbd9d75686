//! Narrative progression: documents unlock chapters, chapters advance in order.

mod catalog;

pub use catalog::{ChapterDef, DocumentDef, StoryCatalog};

use num_traits::cast::cast;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::constants::DEFAULT_HINT;
use crate::numbers::ratio_to_percent;
use crate::rng::{RandomSource, RollStream};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("unknown document {0}")]
    UnknownDocument(u8),
    #[error("already at the final chapter")]
    NoNextChapter,
    #[error("chapter {0} is still locked")]
    ChapterLocked(u8),
    #[error("unknown chapter {0}")]
    UnknownChapter(u8),
    #[error("invalid story catalog: {0}")]
    InvalidCatalog(String),
    #[error("invalid story state: {0}")]
    InvalidState(String),
}

/// Persistable progression snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    pub current_chapter_index: u8,
    /// Found document ids in discovery order.
    pub documents_found_ids: Vec<u8>,
    pub chapter_unlocked: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentDiscovery<'a> {
    Found {
        document: &'a DocumentDef,
        /// Chapter unlocked by this discovery, if it was still locked.
        unlocked_chapter: Option<u8>,
    },
    AlreadyFound,
}

impl DocumentDiscovery<'_> {
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    catalog: Arc<StoryCatalog>,
    current: u8,
    found: Vec<u8>,
    unlocked: Vec<bool>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(StoryCatalog::shipped())
    }
}

impl Progression {
    /// Fresh story: cursor on chapter 0, only chapter 0 unlocked.
    #[must_use]
    pub fn new(catalog: Arc<StoryCatalog>) -> Self {
        let mut unlocked = vec![false; catalog.chapters.len()];
        if let Some(first) = unlocked.first_mut() {
            *first = true;
        }
        Self {
            catalog,
            current: 0,
            found: Vec::new(),
            unlocked,
        }
    }

    /// Rebuild a progression from a snapshot, validating it against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidState`] when the snapshot cannot belong to this catalog.
    pub fn from_state(catalog: Arc<StoryCatalog>, state: &StoryState) -> Result<Self, StoryError> {
        let chapters = catalog.chapters.len();
        if state.chapter_unlocked.len() != chapters {
            return Err(StoryError::InvalidState(format!(
                "expected {chapters} chapter flags, got {}",
                state.chapter_unlocked.len()
            )));
        }
        if state.chapter_unlocked.first() != Some(&true) {
            return Err(StoryError::InvalidState("chapter 0 must be unlocked".into()));
        }
        match state.chapter_unlocked.get(usize::from(state.current_chapter_index)) {
            Some(true) => {}
            Some(false) => {
                return Err(StoryError::InvalidState(format!(
                    "current chapter {} is locked",
                    state.current_chapter_index
                )));
            }
            None => {
                return Err(StoryError::InvalidState(format!(
                    "current chapter {} out of range",
                    state.current_chapter_index
                )));
            }
        }
        for (idx, id) in state.documents_found_ids.iter().enumerate() {
            if catalog.document(*id).is_none() {
                return Err(StoryError::InvalidState(format!("unknown document {id}")));
            }
            if state.documents_found_ids[..idx].contains(id) {
                return Err(StoryError::InvalidState(format!("document {id} listed twice")));
            }
        }

        Ok(Self {
            catalog,
            current: state.current_chapter_index,
            found: state.documents_found_ids.clone(),
            unlocked: state.chapter_unlocked.clone(),
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> StoryState {
        StoryState {
            current_chapter_index: self.current,
            documents_found_ids: self.found.clone(),
            chapter_unlocked: self.unlocked.clone(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<StoryCatalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn current_chapter_index(&self) -> u8 {
        self.current
    }

    /// # Panics
    ///
    /// Never: the cursor is kept within the validated catalog.
    #[must_use]
    pub fn current_chapter(&self) -> &ChapterDef {
        &self.catalog.chapters[usize::from(self.current)]
    }

    #[must_use]
    pub fn chapter_unlocked(&self) -> &[bool] {
        &self.unlocked
    }

    /// # Errors
    ///
    /// Returns [`StoryError::UnknownChapter`] for an index past the last chapter.
    pub fn is_unlocked(&self, index: u8) -> Result<bool, StoryError> {
        self.unlocked
            .get(usize::from(index))
            .copied()
            .ok_or(StoryError::UnknownChapter(index))
    }

    #[must_use]
    pub fn is_found(&self, id: u8) -> bool {
        self.found.contains(&id)
    }

    #[must_use]
    pub fn found_ids(&self) -> &[u8] {
        &self.found
    }

    #[must_use]
    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.catalog.documents.len()
    }

    /// Mark a document found and unlock the chapter after the one it belongs to.
    ///
    /// Rediscovering a found document changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::UnknownDocument`] if the id is not in the catalog.
    pub fn discover_document(&mut self, id: u8) -> Result<DocumentDiscovery<'_>, StoryError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(doc) = catalog.document(id) else {
            return Err(StoryError::UnknownDocument(id));
        };
        if self.found.contains(&id) {
            return Ok(DocumentDiscovery::AlreadyFound);
        }
        self.found.push(id);

        let next = usize::from(doc.chapter) + 1;
        let unlocked_chapter = match self.unlocked.get_mut(next) {
            Some(flag) if !*flag => {
                *flag = true;
                u8::try_from(next).ok()
            }
            _ => None,
        };
        log::debug!(
            "document {id} found ({}/{}), unlocked chapter {unlocked_chapter:?}",
            self.found.len(),
            catalog.documents.len()
        );

        let document = self
            .catalog
            .document(id)
            .ok_or(StoryError::UnknownDocument(id))?;
        Ok(DocumentDiscovery::Found {
            document,
            unlocked_chapter,
        })
    }

    /// Move the cursor one chapter forward.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NoNextChapter`] at the last chapter and
    /// [`StoryError::ChapterLocked`] when the next chapter is still locked.
    pub fn advance_chapter(&mut self) -> Result<&ChapterDef, StoryError> {
        let next = self.current.checked_add(1).ok_or(StoryError::NoNextChapter)?;
        match self.unlocked.get(usize::from(next)) {
            None => Err(StoryError::NoNextChapter),
            Some(false) => Err(StoryError::ChapterLocked(next)),
            Some(true) => {
                self.current = next;
                log::debug!("advanced to chapter {next}");
                Ok(self.current_chapter())
            }
        }
    }

    /// All documents found and the cursor on the last chapter.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.found.len() == self.catalog.documents.len()
            && self.current == self.catalog.last_chapter_index()
    }

    #[must_use]
    pub fn objectives(&self) -> [String; 3] {
        let chapter = self.current_chapter();
        [
            chapter.objective.clone(),
            format!(
                "Documents found: {}/{}",
                self.found.len(),
                self.catalog.documents.len()
            ),
            format!("Current location: {}", chapter.location),
        ]
    }

    #[must_use]
    pub fn objective_text(&self) -> String {
        self.objectives().join("\n")
    }

    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        ratio_to_percent(self.found.len(), self.catalog.documents.len())
    }

    #[must_use]
    pub fn chapter_hint(&self) -> &str {
        self.current_chapter()
            .hint
            .as_deref()
            .unwrap_or(DEFAULT_HINT)
    }

    /// A random line from the whisper pool.
    pub fn whisper_message(&self, rng: &mut dyn RandomSource) -> Option<&str> {
        let pool = &self.catalog.whispers;
        if pool.is_empty() {
            return None;
        }
        let len = cast::<usize, f32>(pool.len()).unwrap_or(1.0);
        let idx = cast::<f32, usize>((rng.roll(RollStream::Lore) * len).floor()).unwrap_or(0);
        pool.get(idx.min(pool.len() - 1)).map(String::as_str)
    }

    /// Found documents in discovery order.
    #[must_use]
    pub fn found_documents(&self) -> Vec<&DocumentDef> {
        self.found
            .iter()
            .filter_map(|id| self.catalog.document(*id))
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.catalog));
    }
}
