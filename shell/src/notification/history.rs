//! In-memory history backing the sidebar.

use std::sync::Arc;

use notification_history::{HistoryError, HistoryItem, decode};

use super::types::ArchivedNotification;
use crate::icon::IconFactory;
use crate::ui::{Card, ElementRef, Renderer};

/// Builds the sidebar card of an archived notification.
pub type EntryBuilder<'a> = &'a dyn Fn(&ArchivedNotification) -> Card;

struct StoredEntry {
    item: ArchivedNotification,
    element: Option<ElementRef>,
}

/// Archived notifications in insertion order. The sidebar shows them
/// newest-first.
pub struct HistoryStore {
    renderer: Arc<dyn Renderer>,
    entries: Vec<StoredEntry>,
}

impl HistoryStore {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies of the stored items, oldest first.
    pub fn items(&self) -> Vec<ArchivedNotification> {
        self.entries.iter().map(|e| e.item.clone()).collect()
    }

    /// Store an archived notification and put its entry on top of the sidebar.
    pub fn append(&mut self, item: ArchivedNotification, entry: EntryBuilder<'_>) {
        let element = self.renderer.build_card(entry(&item));
        self.renderer.prepend_history(&element);
        self.entries.push(StoredEntry {
            item,
            element: Some(element),
        });
    }

    /// Replace everything with the items of a history document.
    ///
    /// Validation is all-or-nothing: on error the store is left as it was.
    pub fn load(&mut self, document: &str, icons: &dyn IconFactory) -> Result<usize, HistoryError> {
        let items = decode(document)?;
        Ok(self.replace(items, icons))
    }

    /// Replace everything with already validated items. Sidebar entries are
    /// created by the next [`HistoryStore::render_all`].
    pub fn replace(&mut self, items: Vec<HistoryItem>, icons: &dyn IconFactory) -> usize {
        self.entries = items
            .into_iter()
            .map(|item| StoredEntry {
                item: ArchivedNotification::from_history_item(item, icons),
                element: None,
            })
            .collect();
        self.entries.len()
    }

    /// Drop every item without touching the sidebar.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Persistable copy, icon handles replaced by their markup.
    pub fn serialize(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .map(|e| e.item.to_history_item())
            .collect()
    }

    /// Rebuild the sidebar list from scratch.
    pub fn render_all(&mut self, entry: EntryBuilder<'_>) {
        self.renderer.clear_history();
        for stored in &mut self.entries {
            let element = self.renderer.build_card(entry(&stored.item));
            self.renderer.prepend_history(&element);
            stored.element = Some(element);
        }
    }

    /// Take an item out by snapshot, together with its sidebar element.
    pub fn remove(&mut self, snapshot: i64) -> Option<(ArchivedNotification, Option<ElementRef>)> {
        let index = self
            .entries
            .iter()
            .position(|e| e.item.snapshot == snapshot)?;
        let stored = self.entries.remove(index);
        Some((stored.item, stored.element))
    }

    /// Drop every item and empty the sidebar list.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        self.renderer.clear_history();
        cleared
    }
}
