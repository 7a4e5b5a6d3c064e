//! In-memory renderer for running the center without a toolkit.
//!
//! Elements keep their class set, attachment state and the callbacks of the
//! card they were built from, so a host (or a test) can "click" them.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::lock;
use crate::ui::{
    Card, CardKind, Element, ElementRef, NOTIFICATION_CLASS, Renderer, SidebarHeader,
};

/// An element of the headless tree.
pub struct HeadlessElement {
    label: String,
    classes: Mutex<BTreeSet<String>>,
    attached: AtomicBool,
    transition: Duration,
    card: Option<Card>,
}

impl HeadlessElement {
    /// A bare element, e.g. the control that toggles the sidebar.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            classes: Mutex::new(BTreeSet::new()),
            attached: AtomicBool::new(false),
            transition: Duration::ZERO,
            card: None,
        }
    }

    fn from_card(card: Card, transition: Duration) -> Self {
        let mut classes = BTreeSet::from([
            NOTIFICATION_CLASS.to_string(),
            card.level.as_str().to_string(),
        ]);
        if card.kind == CardKind::History {
            classes.insert("history".into());
        }
        Self {
            label: card.title.clone(),
            classes: Mutex::new(classes),
            attached: AtomicBool::new(false),
            transition,
            card: Some(card),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub fn classes(&self) -> Vec<String> {
        lock(&self.classes).iter().cloned().collect()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Press the card's close control.
    pub fn click_close(&self) {
        if let Some(card) = &self.card {
            (card.on_close)();
        }
    }

    /// Press the card button called `name`. Returns `false` if there is none.
    pub fn click_button(&self, name: &str) -> bool {
        let Some(button) = self
            .card
            .as_ref()
            .and_then(|card| card.buttons.iter().find(|b| b.name == name))
        else {
            return false;
        };
        (button.on_press)();
        true
    }
}

impl Element for HeadlessElement {
    fn add_class(&self, class: &str) {
        lock(&self.classes).insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        lock(&self.classes).remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        lock(&self.classes).contains(class)
    }

    fn transition_duration(&self) -> Duration {
        self.transition
    }

    fn detach(&self) {
        if self.attached.swap(false, Ordering::SeqCst) {
            tracing::debug!(label = %self.label, "Element detached");
        }
    }
}

#[derive(Default)]
struct Tree {
    /// Built but not mounted yet.
    pending: Vec<Arc<HeadlessElement>>,
    active: Vec<Arc<HeadlessElement>>,
    history: Vec<Arc<HeadlessElement>>,
    header: Option<SidebarHeader>,
}

impl Tree {
    fn take_pending(&mut self, element: &ElementRef) -> Option<Arc<HeadlessElement>> {
        let index = self
            .pending
            .iter()
            .position(|e| std::ptr::addr_eq(Arc::as_ptr(e), Arc::as_ptr(element)))?;
        let found = self.pending.swap_remove(index);
        found.attached.store(true, Ordering::SeqCst);
        Some(found)
    }

    fn prune(&mut self) {
        self.active.retain(|e| e.is_attached());
        self.history.retain(|e| e.is_attached());
    }
}

/// Renderer keeping the active area and the sidebar in memory.
pub struct HeadlessRenderer {
    transition: Duration,
    panel: Arc<HeadlessElement>,
    tree: Mutex<Tree>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TRANSITION)
    }
}

impl HeadlessRenderer {
    /// Dismiss transition given to every card.
    pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

    pub fn new(transition: Duration) -> Self {
        let panel = HeadlessElement::new("notification-page");
        panel.attached.store(true, Ordering::SeqCst);
        Self {
            transition,
            panel: Arc::new(panel),
            tree: Mutex::new(Tree::default()),
        }
    }

    pub fn panel(&self) -> Arc<HeadlessElement> {
        self.panel.clone()
    }

    /// Attached cards of the active area, in insertion order.
    pub fn active_elements(&self) -> Vec<Arc<HeadlessElement>> {
        let mut tree = lock(&self.tree);
        tree.prune();
        tree.active.clone()
    }

    /// Attached sidebar entries, top first.
    pub fn history_elements(&self) -> Vec<Arc<HeadlessElement>> {
        let mut tree = lock(&self.tree);
        tree.prune();
        tree.history.clone()
    }

    /// Press "clear all" in the sidebar header.
    pub fn click_clear_all(&self) -> bool {
        let callback = lock(&self.tree).header.as_ref().map(|h| h.on_clear.clone());
        let Some(on_clear) = callback else {
            return false;
        };
        on_clear();
        true
    }

    /// Press the config control in the sidebar header.
    pub fn click_config(&self) -> bool {
        let callback = lock(&self.tree).header.as_ref().map(|h| h.on_config.clone());
        let Some(on_config) = callback else {
            return false;
        };
        on_config();
        true
    }
}

impl Renderer for HeadlessRenderer {
    fn build_card(&self, card: Card) -> ElementRef {
        let element = Arc::new(HeadlessElement::from_card(card, self.transition));
        lock(&self.tree).pending.push(element.clone());
        element
    }

    fn append_active(&self, element: &ElementRef) {
        let mut tree = lock(&self.tree);
        let Some(mounted) = tree.take_pending(element) else {
            tracing::warn!("Ignoring element not built by this renderer");
            return;
        };
        if let Some(card) = mounted.card() {
            tracing::info!(
                level = %card.level,
                title = %card.title,
                text = %card.text,
                "Notification shown"
            );
        }
        tree.prune();
        tree.active.push(mounted);
    }

    fn prepend_history(&self, element: &ElementRef) {
        let mut tree = lock(&self.tree);
        let Some(mounted) = tree.take_pending(element) else {
            tracing::warn!("Ignoring element not built by this renderer");
            return;
        };
        tree.prune();
        tree.history.insert(0, mounted);
    }

    fn clear_history(&self) {
        let mut tree = lock(&self.tree);
        for element in tree.history.drain(..) {
            element.detach();
        }
    }

    fn sidebar_panel(&self) -> ElementRef {
        self.panel.clone()
    }

    fn install_header(&self, header: SidebarHeader) {
        lock(&self.tree).header = Some(header);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str) -> Card {
        Card {
            kind: CardKind::Active,
            level: notification_history::Level::Low,
            title: title.to_string(),
            text: String::new(),
            date: String::new(),
            icon: None,
            buttons: Vec::new(),
            on_close: Arc::new(|| {}),
        }
    }

    #[test]
    fn test_mounting_drops_detached_cards() {
        let renderer = HeadlessRenderer::default();
        for title in ["a", "b", "c"] {
            let element = renderer.build_card(card(title));
            renderer.append_active(&element);
            element.detach();
        }

        let element = renderer.build_card(card("d"));
        renderer.append_active(&element);

        let tree = lock(&renderer.tree);
        assert_eq!(tree.active.len(), 1);
        assert_eq!(tree.active[0].label(), "d");
        assert!(tree.pending.is_empty());
    }

    #[test]
    fn test_history_prepend_drops_detached_entries() {
        let renderer = HeadlessRenderer::default();
        let old = renderer.build_card(card("old"));
        renderer.prepend_history(&old);
        old.detach();

        let new = renderer.build_card(card("new"));
        renderer.prepend_history(&new);

        let tree = lock(&renderer.tree);
        assert_eq!(tree.history.len(), 1);
        assert_eq!(tree.history[0].label(), "new");
    }
}
