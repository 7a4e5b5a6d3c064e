//! Public façade: creates notifications, drives their dismissal, and moves
//! history between memory and the history file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use notification_history::{EMPTY_DOCUMENT, HistoryError, encode};

use super::history::HistoryStore;
use super::lifecycle::{ActiveNotification, Claim, Dismissal};
use super::types::{Action, ArchivedNotification, Level, NotificationIcon, NotificationRecord};
use crate::bridge::{BridgeError, PersistenceBridge};
use crate::config::NotificationConfig;
use crate::icon::{IconFactory, MODULE_ICON};
use crate::lock;
use crate::ui::{
    ACTIVE_CLASS, Callback, Card, CardButton, CardKind, Element, HIDDEN_CLASS, NOTIFICATION_CLASS,
    REMOVE_CLASS, Renderer, SidebarHeader,
};

/// Title of the notices the center issues about itself.
pub const MODULE_TITLE: &str = "NotificationCenter";
/// Icon tag of those notices.
pub const MODULE_ICON_NAME: &str = "notification_center";

/// History persistence error type.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Owns the active area, the sidebar and the history.
///
/// Cheap to clone; clones share state. Creating or removing notifications
/// spawns Tokio tasks, so the center must be used within a Tokio runtime.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

struct CenterInner {
    renderer: Arc<dyn Renderer>,
    icons: Arc<dyn IconFactory>,
    bridge: Arc<dyn PersistenceBridge>,
    directory: PathBuf,
    history_file: PathBuf,
    history: Mutex<HistoryStore>,
    /// Notifications not yet archived or discarded.
    active: Mutex<Vec<Arc<ActiveNotification>>>,
}

impl NotificationCenter {
    pub fn new(
        config: &NotificationConfig,
        renderer: Arc<dyn Renderer>,
        icons: Arc<dyn IconFactory>,
        bridge: Arc<dyn PersistenceBridge>,
    ) -> Self {
        Self {
            inner: Arc::new(CenterInner {
                history: Mutex::new(HistoryStore::new(renderer.clone())),
                renderer,
                icons,
                bridge,
                directory: config.data_dir.clone(),
                history_file: config.history_path(),
                active: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn history_file(&self) -> &Path {
        &self.inner.history_file
    }

    /// Copies of the archived notifications, oldest first.
    pub fn history_snapshot(&self) -> Vec<ArchivedNotification> {
        self.history().items()
    }

    pub fn active_count(&self) -> usize {
        lock(&self.inner.active).len()
    }

    pub fn active_notifications(&self) -> Vec<Arc<ActiveNotification>> {
        lock(&self.inner.active).clone()
    }

    /// Show a notification.
    ///
    /// The display time is resolved from the level when unset. A positive
    /// time schedules the dismissal right away; `-1` keeps the notification
    /// until it is closed. With `save`, the dismissed notification is archived.
    pub fn create(&self, record: NotificationRecord, save: bool) -> Arc<ActiveNotification> {
        let time = record.resolved_time();
        let snapshot = now_millis();

        let notification = Arc::new_cyclic(|weak| {
            let card = self.active_card(&record, snapshot, weak);
            let element = self.inner.renderer.build_card(card);
            ActiveNotification::new(record, snapshot, time, save, element)
        });

        notification.lifecycle().show();
        self.inner.renderer.append_active(notification.element());
        lock(&self.inner.active).push(notification.clone());

        tracing::debug!(
            snapshot,
            level = %notification.record().body.level,
            time,
            save,
            "Notification created"
        );

        if time > 0 {
            let center = self.clone();
            let scheduled = notification.clone();
            tokio::spawn(async move { center.remove(&scheduled, Dismissal::Remaining).await });
        }

        notification
    }

    /// Dismiss a notification: wait, play the remove transition, detach, then
    /// archive or discard it.
    ///
    /// Without effect when the element is no longer an active notification or
    /// when another call is already dismissing it; an earlier deadline is
    /// handed over to that call instead.
    pub async fn remove(&self, notification: &Arc<ActiveNotification>, dismissal: Dismissal) {
        let element = notification.element();
        if !element.has_class(NOTIFICATION_CLASS) {
            return;
        }

        let lifecycle = notification.lifecycle();
        let transition = element.transition_duration();
        if lifecycle.request(dismissal, transition) != Claim::Drive {
            return;
        }

        if !lifecycle.wait_until_due().await || !lifecycle.begin_dismiss() {
            return;
        }

        element.add_class(REMOVE_CLASS);
        if !lifecycle.animate(transition).await {
            return;
        }

        element.detach();
        self.forget(notification);
        lifecycle.finish(notification.save());
        if notification.save() {
            self.archive(notification);
        }

        tracing::debug!(
            snapshot = notification.snapshot(),
            archived = notification.save(),
            "Notification removed"
        );
    }

    /// Tear a notification down from outside: its timer stops, its element is
    /// detached and it is never archived.
    pub fn destroy(&self, notification: &Arc<ActiveNotification>) -> bool {
        if !notification.lifecycle().destroy() {
            return false;
        }
        notification.element().detach();
        self.forget(notification);
        tracing::debug!(snapshot = notification.snapshot(), "Notification destroyed");
        true
    }

    /// Write the history file. Reports the outcome with a notice.
    pub async fn backup(&self) -> bool {
        match self.write_history().await {
            Ok(count) => {
                tracing::info!(
                    count,
                    path = %self.inner.history_file.display(),
                    "History file saved"
                );
                self.notify(Level::Low, "History file saved");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %self.inner.history_file.display(),
                    "Failed to save history file"
                );
                self.notify(Level::Urgent, "Failed to save history file");
                false
            }
        }
    }

    /// Load the history file and render the sidebar.
    ///
    /// A missing file is created empty. Any failure leaves the history empty.
    pub async fn parse(&self) {
        match self.read_history().await {
            Ok(count) => {
                tracing::info!(
                    count,
                    path = %self.inner.history_file.display(),
                    "History loaded"
                );
            }
            Err(PersistError::Bridge(e)) if e.is_not_found() => {
                tracing::warn!(error = %e, "History file not found, creating it");
                self.history().reset();
                self.create_history_file().await;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %self.inner.history_file.display(),
                    "Failed to load history file"
                );
                self.history().reset();
            }
        }

        self.render_sidebar();
    }

    /// Toggle the sidebar and the active state of the control that opened it.
    pub fn show_sidebar(&self, control: &dyn Element) {
        let panel = self.inner.renderer.sidebar_panel();
        if panel.has_class(HIDDEN_CLASS) {
            panel.remove_class(HIDDEN_CLASS);
            control.add_class(ACTIVE_CLASS);
        } else {
            panel.add_class(HIDDEN_CLASS);
            control.remove_class(ACTIVE_CLASS);
        }
    }

    pub fn show_config_page(&self) {
        tracing::debug!("Notification config page requested");
    }

    /// Drop every archived notification. The file keeps its content until the
    /// next backup.
    pub fn clear_history(&self) -> usize {
        let cleared = self.history().clear();
        tracing::info!(cleared, "Notification history cleared");
        cleared
    }

    /// Close a sidebar entry and drop its item from history.
    pub async fn dismiss_history_entry(&self, snapshot: i64) -> bool {
        let removed = self.history().remove(snapshot);
        let Some((_, element)) = removed else {
            return false;
        };

        if let Some(element) = element {
            let transition = element.transition_duration();
            element.add_class(REMOVE_CLASS);
            tokio::time::sleep(transition).await;
            element.detach();
        }

        tracing::debug!(snapshot, "History entry dismissed");
        true
    }

    async fn write_history(&self) -> Result<usize, PersistError> {
        let items = self.history().serialize();
        let document = encode(&items)?;
        self.inner
            .bridge
            .write_file(&self.inner.history_file, &document)
            .await?;
        Ok(items.len())
    }

    async fn read_history(&self) -> Result<usize, PersistError> {
        let document = self.inner.bridge.read_file(&self.inner.history_file).await?;
        let count = self.history().load(&document, &*self.inner.icons)?;
        Ok(count)
    }

    async fn create_history_file(&self) {
        if let Err(e) = self.inner.bridge.create_directory(&self.inner.directory).await {
            tracing::error!(error = %e, "Failed to create history directory");
        }

        match self
            .inner
            .bridge
            .write_file(&self.inner.history_file, EMPTY_DOCUMENT)
            .await
        {
            Ok(()) => {
                let path = self.inner.history_file.display();
                self.notify(
                    Level::Urgent,
                    format!("Created the history file on <b>{path}</b>"),
                );
            }
            Err(e) => tracing::error!(error = %e, "Failed to create history file"),
        }
    }

    /// Notice about the center itself. Never archived.
    fn notify(&self, level: Level, text: impl Into<String>) {
        let icon = NotificationIcon::new(MODULE_ICON_NAME, self.inner.icons.create_icon(MODULE_ICON));
        let record = NotificationRecord::new(level, MODULE_TITLE, text).with_icon(icon);
        self.create(record, false);
    }

    fn archive(&self, notification: &ActiveNotification) {
        let item = notification.record().archive(notification.snapshot());
        let entry = |item: &ArchivedNotification| self.history_card(item);
        self.history().append(item, &entry);
    }

    fn render_sidebar(&self) {
        self.inner.renderer.sidebar_panel().add_class(HIDDEN_CLASS);
        self.inner.renderer.install_header(self.sidebar_header());

        let entry = |item: &ArchivedNotification| self.history_card(item);
        self.history().render_all(&entry);
    }

    fn forget(&self, notification: &Arc<ActiveNotification>) {
        lock(&self.inner.active).retain(|active| !Arc::ptr_eq(active, notification));
    }

    fn history(&self) -> MutexGuard<'_, HistoryStore> {
        lock(&self.inner.history)
    }

    fn active_card(
        &self,
        record: &NotificationRecord,
        snapshot: i64,
        notification: &Weak<ActiveNotification>,
    ) -> Card {
        let buttons = record
            .buttons
            .iter()
            .map(|button| CardButton {
                name: button.name.clone(),
                level: button.level,
                icon: button.icon.clone(),
                on_press: self.on_button(notification, button.action.clone()),
            })
            .collect();

        Card {
            kind: CardKind::Active,
            level: record.body.level,
            title: record.body.title.clone(),
            text: record.body.text.clone(),
            date: date_label(snapshot),
            icon: record.body.icon.clone(),
            buttons,
            on_close: self.on_dismiss(notification, Dismissal::Remaining),
        }
    }

    fn history_card(&self, item: &ArchivedNotification) -> Card {
        let center = self.downgrade();
        let snapshot = item.snapshot;

        Card {
            kind: CardKind::History,
            level: item.body.level,
            title: item.body.title.clone(),
            text: item.body.text.clone(),
            date: date_label(snapshot),
            icon: item.body.icon.clone(),
            buttons: Vec::new(),
            on_close: Arc::new(move || {
                let Some(center) = Self::upgrade(&center) else {
                    return;
                };
                tokio::spawn(async move {
                    center.dismiss_history_entry(snapshot).await;
                });
            }),
        }
    }

    fn sidebar_header(&self) -> SidebarHeader {
        let clear = self.downgrade();
        let config = self.downgrade();

        SidebarHeader {
            on_clear: Arc::new(move || {
                if let Some(center) = Self::upgrade(&clear) {
                    center.clear_history();
                }
            }),
            on_config: Arc::new(move || {
                if let Some(center) = Self::upgrade(&config) {
                    center.show_config_page();
                }
            }),
        }
    }

    fn on_dismiss(&self, notification: &Weak<ActiveNotification>, dismissal: Dismissal) -> Callback {
        let center = self.downgrade();
        let notification = notification.clone();

        Arc::new(move || {
            let (Some(center), Some(notification)) =
                (Self::upgrade(&center), notification.upgrade())
            else {
                return;
            };
            tokio::spawn(async move { center.remove(&notification, dismissal).await });
        })
    }

    /// Dismiss without waiting, then run the button's action.
    fn on_button(&self, notification: &Weak<ActiveNotification>, action: Action) -> Callback {
        let dismiss = self.on_dismiss(notification, Dismissal::After(0));
        Arc::new(move || {
            dismiss();
            action();
        })
    }

    fn downgrade(&self) -> Weak<CenterInner> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(inner: &Weak<CenterInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Local date shown on a card.
fn date_label(snapshot: i64) -> String {
    chrono::DateTime::from_timestamp_millis(snapshot)
        .map(|at| {
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}
