//! Icon handles and the factory producing them.

use std::fmt;
use std::sync::Arc;

/// Bell icon used by the center's own notices.
pub const MODULE_ICON: &str = include_str!("../assets/notifications.svg");

/// A live, renderable icon.
pub trait IconElement: fmt::Debug + Send + Sync {
    /// Serialized form written to the history file.
    fn outer_markup(&self) -> String;
}

pub type IconHandle = Arc<dyn IconElement>;

/// Turns a source asset into a live icon, if it can.
pub trait IconFactory: Send + Sync {
    fn create_icon(&self, source: &str) -> Option<IconHandle>;
}

/// Icon backed by its markup text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupIcon {
    markup: String,
}

impl IconElement for MarkupIcon {
    fn outer_markup(&self) -> String {
        self.markup.clone()
    }
}

/// Factory accepting inline markup (`<svg ...>...</svg>`).
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupIcons;

impl IconFactory for MarkupIcons {
    fn create_icon(&self, source: &str) -> Option<IconHandle> {
        let markup = source.trim();
        if !(markup.starts_with('<') && markup.ends_with('>')) {
            return None;
        }
        Some(Arc::new(MarkupIcon {
            markup: markup.to_string(),
        }))
    }
}
