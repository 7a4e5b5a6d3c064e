//! Toolkit-facing side of the subsystem.
//!
//! The center never builds widgets itself. It describes a card and hands it
//! to a [`Renderer`], then drives the returned [`Element`] through CSS-like
//! class flags.

use std::sync::Arc;
use std::time::Duration;

use notification_history::Level;

use crate::icon::IconHandle;
use crate::notification::{ButtonLevel, NotificationIcon};

/// Marks an element as a live notification card.
pub const NOTIFICATION_CLASS: &str = "notification";
/// Starts the dismiss transition.
pub const REMOVE_CLASS: &str = "remove";
/// Hides the sidebar panel.
pub const HIDDEN_CLASS: &str = "hidden";
/// Marks the control that opened the sidebar.
pub const ACTIVE_CLASS: &str = "active";

/// UI event handler.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A rendered element.
pub trait Element: Send + Sync {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Dismiss transition duration from the element's computed style.
    fn transition_duration(&self) -> Duration;

    /// Remove the element from whatever container holds it.
    fn detach(&self);
}

pub type ElementRef = Arc<dyn Element>;

/// Where a card is going to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Active,
    History,
}

/// A button row entry on an active card.
#[derive(Clone)]
pub struct CardButton {
    pub name: String,
    pub level: ButtonLevel,
    pub icon: Option<IconHandle>,
    pub on_press: Callback,
}

/// Everything a renderer needs to build one notification card.
#[derive(Clone)]
pub struct Card {
    pub kind: CardKind,
    pub level: Level,
    pub title: String,
    /// Inline markup, inserted as-is.
    pub text: String,
    /// Human readable creation date.
    pub date: String,
    pub icon: Option<NotificationIcon>,
    pub buttons: Vec<CardButton>,
    pub on_close: Callback,
}

/// Controls in the sidebar header.
#[derive(Clone)]
pub struct SidebarHeader {
    pub on_clear: Callback,
    pub on_config: Callback,
}

/// Opaque UI-element factory owning the active area and the sidebar.
pub trait Renderer: Send + Sync {
    fn build_card(&self, card: Card) -> ElementRef;

    /// Append a card to the active-notification area.
    fn append_active(&self, element: &ElementRef);

    /// Insert a card at the top of the sidebar list.
    fn prepend_history(&self, element: &ElementRef);

    /// Empty the sidebar list.
    fn clear_history(&self);

    fn sidebar_panel(&self) -> ElementRef;

    /// (Re)build the sidebar header.
    fn install_header(&self, header: SidebarHeader);
}
