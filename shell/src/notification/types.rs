//! Notification data: the live record and its archived form.

use std::fmt;
use std::sync::Arc;

use notification_history::{HistoryIcon, HistoryItem};

use crate::icon::{IconFactory, IconHandle};

pub use notification_history::Level;

/// Button side effect.
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// Icon shown next to a notification.
#[derive(Debug, Clone)]
pub struct NotificationIcon {
    /// Stable tag, used as a class on the icon box.
    pub name: String,
    pub element: Option<IconHandle>,
}

impl NotificationIcon {
    pub fn new(name: impl Into<String>, element: Option<IconHandle>) -> Self {
        Self {
            name: name.into(),
            element,
        }
    }
}

/// How prominent a button is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLevel {
    Accept,
    Alternate,
}

impl ButtonLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Alternate => "alternate",
        }
    }
}

/// A button on an active notification. Never persisted.
#[derive(Clone)]
pub struct Button {
    pub name: String,
    pub action: Action,
    pub level: ButtonLevel,
    pub icon: Option<IconHandle>,
}

impl Button {
    pub fn new(
        name: impl Into<String>,
        level: ButtonLevel,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            action: Arc::new(action),
            level,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: IconHandle) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Fields shared by a live record and its archived form.
#[derive(Debug, Clone)]
pub struct NotificationBody {
    pub level: Level,
    /// Inline markup, rendered as-is.
    pub text: String,
    pub title: String,
    pub icon: Option<NotificationIcon>,
}

/// A notification about to be shown.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub body: NotificationBody,
    /// Display time in milliseconds, `-1` for never. `None` or `0` uses the level default.
    pub time: Option<i64>,
    pub buttons: Vec<Button>,
}

impl NotificationRecord {
    pub fn new(level: Level, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            body: NotificationBody {
                level,
                text: text.into(),
                title: title.into(),
                icon: None,
            },
            time: None,
            buttons: Vec::new(),
        }
    }

    pub fn with_time(mut self, time_ms: i64) -> Self {
        self.time = Some(time_ms);
        self
    }

    pub fn with_icon(mut self, icon: NotificationIcon) -> Self {
        self.body.icon = Some(icon);
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    /// Display time with the level default applied. `0` counts as unset.
    pub fn resolved_time(&self) -> i64 {
        self.time
            .filter(|&time| time != 0)
            .unwrap_or_else(|| self.body.level.default_time_ms())
    }

    /// Archived form of this record. Buttons are dropped.
    pub fn archive(&self, snapshot: i64) -> ArchivedNotification {
        ArchivedNotification {
            body: self.body.clone(),
            snapshot,
        }
    }
}

/// A dismissed notification kept in history, with a live icon.
#[derive(Debug, Clone)]
pub struct ArchivedNotification {
    pub body: NotificationBody,
    pub snapshot: i64,
}

impl ArchivedNotification {
    /// Persisted form. A missing icon handle is written as empty markup.
    pub fn to_history_item(&self) -> HistoryItem {
        HistoryItem {
            level: self.body.level,
            text: self.body.text.clone(),
            title: self.body.title.clone(),
            snapshot: self.snapshot,
            icon: self.body.icon.as_ref().map(|icon| HistoryIcon {
                name: icon.name.clone(),
                element: icon
                    .element
                    .as_ref()
                    .map(|element| element.outer_markup())
                    .unwrap_or_default(),
            }),
        }
    }

    /// Rebuild from a persisted item, materializing its icon markup.
    pub fn from_history_item(item: HistoryItem, icons: &dyn IconFactory) -> Self {
        let icon = item.icon.map(|icon| NotificationIcon {
            element: icons.create_icon(&icon.element),
            name: icon.name,
        });

        Self {
            body: NotificationBody {
                level: item.level,
                text: item.text,
                title: item.title,
                icon,
            },
            snapshot: item.snapshot,
        }
    }
}
