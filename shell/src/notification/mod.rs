//! Notification lifecycle: creation, timed dismissal, history and persistence.
//!
//! A notification is created through [`NotificationCenter::create`], shown in
//! the active area and, unless its display time is infinite, dismissed by a
//! per-notification task once the time runs out. Dismissed notifications
//! that asked to be saved are archived into the [`HistoryStore`] and appear
//! at the top of the sidebar.

pub mod center;
pub mod history;
pub mod lifecycle;
pub mod types;

pub use center::{MODULE_ICON_NAME, MODULE_TITLE, NotificationCenter, PersistError};
pub use history::HistoryStore;
pub use lifecycle::{ActiveNotification, Dismissal, Lifecycle, Phase};
pub use types::{
    Action, ArchivedNotification, Button, ButtonLevel, Level, NotificationBody, NotificationIcon,
    NotificationRecord,
};

#[cfg(test)]
mod tests;
