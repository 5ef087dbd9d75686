//! Bounded item container. Documents are additionally tracked for the story.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::INVENTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("inventory full ({capacity} slots)")]
    Full { capacity: usize },
    #[error("item {0} already carried")]
    DuplicateItem(String),
    #[error("no item {0} in inventory")]
    UnknownItem(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Generic,
    Document { document_id: u8 },
}

/// What happens when an item is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemEffect {
    /// Recharge the flashlight by this many points.
    Battery(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub consumable: bool,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
}

impl InventoryItem {
    #[must_use]
    pub fn generic(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Generic,
            consumable: false,
            effect: None,
        }
    }

    #[must_use]
    pub fn document(document_id: u8, title: impl Into<String>) -> Self {
        Self {
            id: format!("document-{document_id}"),
            name: title.into(),
            kind: ItemKind::Document { document_id },
            consumable: false,
            effect: None,
        }
    }

    /// Single-use battery pack.
    #[must_use]
    pub fn battery(id: impl Into<String>, charge: f32) -> Self {
        Self {
            id: id.into(),
            name: "Battery".into(),
            kind: ItemKind::Generic,
            consumable: true,
            effect: Some(ItemEffect::Battery(charge)),
        }
    }

    #[must_use]
    pub const fn document_id(&self) -> Option<u8> {
        match self.kind {
            ItemKind::Document { document_id } => Some(document_id),
            ItemKind::Generic => None,
        }
    }
}

/// Result of using an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUse {
    pub item: InventoryItem,
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(INVENTORY_CAPACITY)
    }
}

impl Inventory {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// # Errors
    ///
    /// Fails when every slot is taken or an item with the same id is carried.
    pub fn add_item(&mut self, item: InventoryItem) -> Result<(), InventoryError> {
        if self.items.len() >= self.capacity {
            log::warn!("inventory full, dropping {}", item.id);
            return Err(InventoryError::Full {
                capacity: self.capacity,
            });
        }
        if self.has_item(&item.id) {
            return Err(InventoryError::DuplicateItem(item.id));
        }
        log::debug!("picked up {}", item.name);
        self.items.push(item);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownItem`] when nothing matches `id`.
    pub fn remove_item(&mut self, id: &str) -> Result<InventoryItem, InventoryError> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| InventoryError::UnknownItem(id.to_string()))?;
        Ok(self.items.remove(idx))
    }

    #[must_use]
    pub fn has_item(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn get_item(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Use an item; consumables leave the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownItem`] when nothing matches `id`.
    pub fn use_item(&mut self, id: &str) -> Result<ItemUse, InventoryError> {
        let item = self
            .get_item(id)
            .cloned()
            .ok_or_else(|| InventoryError::UnknownItem(id.to_string()))?;
        if item.consumable {
            self.remove_item(id)?;
        }
        Ok(ItemUse {
            consumed: item.consumable,
            item,
        })
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents().count()
    }

    pub fn documents(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items
            .iter()
            .filter(|item| item.document_id().is_some())
    }

    /// Drop document items whose id fails `keep`, returning how many went.
    pub fn retain_documents(&mut self, mut keep: impl FnMut(u8) -> bool) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| item.document_id().is_none_or(&mut keep));
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
