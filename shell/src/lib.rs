//! Notification subsystem of the desktop shell.
//!
//! Shows transient and persistent notifications, keeps the history sidebar
//! and persists history across sessions. Toolkit specifics stay behind the
//! [`ui::Renderer`], [`icon::IconFactory`] and [`bridge::PersistenceBridge`]
//! traits.

pub mod bridge;
pub mod config;
pub mod headless;
pub mod icon;
pub mod notification;
pub mod ui;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::NotificationConfig;
pub use notification::{
    ActiveNotification, Button, ButtonLevel, Dismissal, Level, NotificationCenter,
    NotificationIcon, NotificationRecord, Phase,
};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
