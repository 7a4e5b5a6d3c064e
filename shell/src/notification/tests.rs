use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::sleep;

use super::*;
use crate::bridge::{BridgeError, FsBridge, PersistenceBridge};
use crate::config::NotificationConfig;
use crate::headless::{HeadlessElement, HeadlessRenderer};
use crate::icon::{IconFactory, MODULE_ICON, MarkupIcons};
use crate::lock;
use crate::ui::{ACTIVE_CLASS, Element, HIDDEN_CLASS, REMOVE_CLASS};

const DATA_DIR: &str = "/data/notification-shell";
const TRANSITION: Duration = Duration::from_millis(300);

#[derive(Default)]
struct MemoryBridge {
    files: Mutex<HashMap<PathBuf, String>>,
    directories: Mutex<Vec<PathBuf>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBridge {
    fn put(&self, path: &Path, contents: &str) {
        lock(&self.files).insert(path.to_path_buf(), contents.to_string());
    }

    fn file(&self, path: &Path) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }
}

#[async_trait]
impl PersistenceBridge for MemoryBridge {
    async fn read_file(&self, path: &Path) -> Result<String, BridgeError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BridgeError::Io {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.file(path).ok_or_else(|| BridgeError::NotFound {
            path: path.to_path_buf(),
        })
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), BridgeError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BridgeError::Io {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.put(path, contents);
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<(), BridgeError> {
        lock(&self.directories).push(path.to_path_buf());
        Ok(())
    }
}

struct Harness {
    center: NotificationCenter,
    renderer: Arc<HeadlessRenderer>,
    bridge: Arc<MemoryBridge>,
}

fn harness() -> Harness {
    harness_with(Arc::new(MemoryBridge::default()))
}

fn harness_with(bridge: Arc<MemoryBridge>) -> Harness {
    let renderer = Arc::new(HeadlessRenderer::new(TRANSITION));
    let center = NotificationCenter::new(
        &NotificationConfig::new(DATA_DIR),
        renderer.clone(),
        Arc::new(MarkupIcons),
        bridge.clone(),
    );
    Harness {
        center,
        renderer,
        bridge,
    }
}

fn history_path() -> PathBuf {
    PathBuf::from(DATA_DIR).join("history.json")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn labels(elements: &[Arc<HeadlessElement>]) -> Vec<String> {
    elements.iter().map(|e| e.label().to_string()).collect()
}

const TWO_ITEMS: &str = r#"[
  { "level": "low", "text": "first", "title": "Clock", "snapshot": 1 },
  { "level": "urgent", "text": "second", "title": "Battery", "snapshot": 2,
    "icon": { "name": "battery", "element": "<svg><path d=\"M0 0\"/></svg>" } }
]"#;

#[tokio::test(start_paused = true)]
async fn low_notification_is_archived_after_its_time() {
    let h = harness();
    let before = now_ms();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Low, "t", "hi"), true);
    let after = now_ms();

    assert_eq!(notification.lifecycle().time(), 2500);
    assert_eq!(notification.phase(), Phase::Visible);
    assert_eq!(h.renderer.active_elements().len(), 1);

    sleep(Duration::from_millis(2300)).await;
    let active = h.renderer.active_elements();
    assert_eq!(active.len(), 1);
    assert!(active[0].has_class(REMOVE_CLASS));
    assert_eq!(notification.phase(), Phase::Dismissing);

    sleep(Duration::from_millis(300)).await;
    assert!(h.renderer.active_elements().is_empty());
    assert_eq!(notification.phase(), Phase::Archived);
    assert_eq!(h.center.active_count(), 0);

    let history = h.center.history_snapshot();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].body.level, Level::Low);
    assert_eq!(history[0].body.title, "t");
    assert_eq!(history[0].body.text, "hi");
    assert!((before..=after).contains(&history[0].snapshot));
    assert_eq!(labels(&h.renderer.history_elements()), vec!["t"]);
}

#[tokio::test(start_paused = true)]
async fn unsaved_notification_is_discarded() {
    let h = harness();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Normal, "t", "x"), false);

    sleep(Duration::from_millis(5100)).await;
    assert_eq!(notification.phase(), Phase::Discarded);
    assert!(h.renderer.active_elements().is_empty());
    assert!(h.center.history_snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn infinite_notification_waits_for_close() {
    let h = harness();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Urgent, "Disk", "almost full"), true);
    assert_eq!(notification.lifecycle().time(), -1);

    sleep(Duration::from_secs(600)).await;
    assert_eq!(notification.phase(), Phase::Visible);
    assert_eq!(h.center.active_count(), 1);

    h.renderer.active_elements()[0].click_close();
    sleep(TRANSITION + Duration::from_millis(10)).await;
    assert_eq!(notification.phase(), Phase::Archived);
    assert_eq!(h.center.history_snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn explicit_time_overrides_level() {
    let h = harness();
    let notification = h.center.create(
        NotificationRecord::new(Level::Urgent, "t", "x").with_time(1000),
        true,
    );

    sleep(Duration::from_millis(1010)).await;
    assert_eq!(notification.phase(), Phase::Archived);
}

#[tokio::test(start_paused = true)]
async fn zero_time_falls_back_to_level_default() {
    let h = harness();
    let notification = h.center.create(
        NotificationRecord::new(Level::Low, "t", "zero").with_time(0),
        true,
    );
    assert_eq!(notification.lifecycle().time(), 2500);

    sleep(Duration::from_millis(2400)).await;
    assert_eq!(notification.phase(), Phase::Dismissing);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(notification.phase(), Phase::Archived);
    assert_eq!(h.center.history_snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_removals_archive_once() {
    let h = harness();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Urgent, "t", "x"), true);

    tokio::join!(
        h.center.remove(&notification, Dismissal::Remaining),
        h.center.remove(&notification, Dismissal::Remaining),
    );
    assert_eq!(h.center.history_snapshot().len(), 1);

    h.center.remove(&notification, Dismissal::After(0)).await;
    assert_eq!(h.center.history_snapshot().len(), 1);
    assert_eq!(h.renderer.history_elements().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_during_timer_archives_once() {
    let h = harness();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Normal, "t", "x"), true);

    sleep(Duration::from_millis(1000)).await;
    h.renderer.active_elements()[0].click_close();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(notification.phase(), Phase::Archived);
    assert_eq!(h.center.history_snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn button_dismisses_immediately_then_runs_action() {
    let h = harness();
    let pressed = Arc::new(AtomicUsize::new(0));
    let counter = pressed.clone();
    let record = NotificationRecord::new(Level::Normal, "Update", "Restart now?").with_button(
        Button::new("Restart", ButtonLevel::Accept, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let notification = h.center.create(record, true);

    sleep(Duration::from_millis(1000)).await;
    assert!(h.renderer.active_elements()[0].click_button("Restart"));
    assert_eq!(pressed.load(Ordering::SeqCst), 1);

    sleep(TRANSITION + Duration::from_millis(10)).await;
    assert_eq!(notification.phase(), Phase::Archived);
    assert!(h.renderer.active_elements().is_empty());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.center.history_snapshot().len(), 1);
    assert_eq!(pressed.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn destroy_stops_pending_timer() {
    let h = harness();
    let notification = h
        .center
        .create(NotificationRecord::new(Level::Normal, "t", "x"), true);

    sleep(Duration::from_millis(1000)).await;
    assert!(h.center.destroy(&notification));
    assert!(!h.center.destroy(&notification));
    assert_eq!(notification.phase(), Phase::Discarded);
    assert!(h.renderer.active_elements().is_empty());

    sleep(Duration::from_secs(10)).await;
    assert!(h.center.history_snapshot().is_empty());
    assert_eq!(h.center.active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn parse_missing_file_creates_empty_history() {
    let h = harness();
    h.center.parse().await;

    assert_eq!(
        lock(&h.bridge.directories).clone(),
        vec![PathBuf::from(DATA_DIR)]
    );
    assert_eq!(h.bridge.file(&history_path()).as_deref(), Some("[]"));
    assert!(h.center.history_snapshot().is_empty());
    assert!(h.renderer.history_elements().is_empty());
    assert!(h.renderer.panel().has_class(HIDDEN_CLASS));

    let notices = h.renderer.active_elements();
    assert_eq!(labels(&notices), vec![MODULE_TITLE]);
    assert!(notices[0].has_class("urgent"));
    let card = notices[0].card().unwrap();
    assert!(card.text.contains("history.json"));
    assert_eq!(card.icon.as_ref().unwrap().name, MODULE_ICON_NAME);

    // Notices about the center itself are never archived.
    notices[0].click_close();
    sleep(TRANSITION * 2).await;
    assert!(h.center.history_snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn parse_loads_history_newest_first() {
    let h = harness();
    h.bridge.put(&history_path(), TWO_ITEMS);
    h.center.parse().await;

    let history = h.center.history_snapshot();
    assert_eq!(history.len(), 2);
    let icon = history[1].body.icon.as_ref().unwrap();
    assert_eq!(icon.name, "battery");
    assert!(icon.element.is_some());

    assert_eq!(labels(&h.renderer.history_elements()), vec!["Battery", "Clock"]);
    assert_eq!(h.center.active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn parse_invalid_history_leaves_it_empty() {
    let h = harness();
    h.center.create(
        NotificationRecord::new(Level::Low, "t", "x").with_time(100),
        true,
    );
    sleep(TRANSITION + Duration::from_millis(10)).await;
    assert_eq!(h.center.history_snapshot().len(), 1);

    let invalid = r#"[{ "level": "critical", "text": "x", "title": "t", "snapshot": 1 }]"#;
    h.bridge.put(&history_path(), invalid);
    h.center.parse().await;

    assert!(h.center.history_snapshot().is_empty());
    assert!(h.renderer.history_elements().is_empty());
    assert_eq!(h.center.active_count(), 0);
    assert_eq!(h.bridge.file(&history_path()).as_deref(), Some(invalid));
}

#[tokio::test(start_paused = true)]
async fn parse_read_failure_is_only_logged() {
    let h = harness();
    h.bridge.put(&history_path(), TWO_ITEMS);
    h.bridge.fail_reads.store(true, Ordering::SeqCst);

    h.center.parse().await;

    assert!(h.center.history_snapshot().is_empty());
    assert!(h.renderer.history_elements().is_empty());
    assert!(lock(&h.bridge.directories).is_empty());
    assert_eq!(h.bridge.file(&history_path()).as_deref(), Some(TWO_ITEMS));
    assert_eq!(h.center.active_count(), 0);
    assert!(h.renderer.panel().has_class(HIDDEN_CLASS));
}

#[tokio::test(start_paused = true)]
async fn backup_writes_icon_as_markup() {
    let h = harness();
    let icon = NotificationIcon::new("clock", MarkupIcons.create_icon(MODULE_ICON));
    h.center.create(
        NotificationRecord::new(Level::Low, "Clock", "noon")
            .with_time(400)
            .with_icon(icon),
        true,
    );
    sleep(Duration::from_millis(500)).await;

    assert!(h.center.backup().await);

    let document = h.bridge.file(&history_path()).unwrap();
    assert!(document.starts_with("[\n  {\n    \"level\": \"low\""));
    let value: Value = serde_json::from_str(&document).unwrap();
    let element = value[0]["icon"]["element"].as_str().unwrap();
    assert!(element.starts_with("<svg"));
    assert_eq!(value[0]["icon"]["name"], "clock");

    let notices = h.renderer.active_elements();
    assert_eq!(labels(&notices), vec![MODULE_TITLE]);
    assert!(notices[0].has_class("low"));
    assert_eq!(notices[0].card().unwrap().text, "History file saved");

    sleep(Duration::from_secs(3)).await;
    assert!(h.renderer.active_elements().is_empty());
    assert_eq!(h.center.history_snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn backup_failure_reports_urgent_notice() {
    let h = harness();
    h.bridge.fail_writes.store(true, Ordering::SeqCst);

    assert!(!h.center.backup().await);

    let notices = h.renderer.active_elements();
    assert_eq!(labels(&notices), vec![MODULE_TITLE]);
    assert!(notices[0].has_class("urgent"));
    assert_eq!(notices[0].card().unwrap().text, "Failed to save history file");
    assert!(h.bridge.file(&history_path()).is_none());
}

#[tokio::test(start_paused = true)]
async fn backup_then_parse_restores_history() {
    let h = harness();
    for (level, title) in [(Level::Normal, "a"), (Level::Low, "b")] {
        h.center.create(
            NotificationRecord::new(level, title, format!("{title} text")).with_time(100),
            true,
        );
    }
    sleep(Duration::from_secs(1)).await;
    assert!(h.center.backup().await);

    let restored = harness_with(h.bridge.clone());
    restored.center.parse().await;

    let tuple = |items: Vec<ArchivedNotification>| -> Vec<(Level, String, String, i64)> {
        items
            .into_iter()
            .map(|i| (i.body.level, i.body.text, i.body.title, i.snapshot))
            .collect()
    };
    assert_eq!(
        tuple(restored.center.history_snapshot()),
        tuple(h.center.history_snapshot())
    );
}

#[tokio::test(start_paused = true)]
async fn show_sidebar_toggles_panel_and_control() {
    let h = harness();
    h.center.parse().await;
    let panel = h.renderer.panel();
    let control = HeadlessElement::new("bell");

    h.center.show_sidebar(&control);
    assert!(!panel.has_class(HIDDEN_CLASS));
    assert!(control.has_class(ACTIVE_CLASS));

    h.center.show_sidebar(&control);
    assert!(panel.has_class(HIDDEN_CLASS));
    assert!(!control.has_class(ACTIVE_CLASS));
}

#[tokio::test(start_paused = true)]
async fn closing_history_entry_drops_item() {
    let h = harness();
    h.bridge.put(&history_path(), TWO_ITEMS);
    h.center.parse().await;

    let entries = h.renderer.history_elements();
    entries[0].click_close();
    sleep(TRANSITION + Duration::from_millis(10)).await;

    let history = h.center.history_snapshot();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].snapshot, 1);
    assert_eq!(labels(&h.renderer.history_elements()), vec!["Clock"]);
    assert!(!h.center.dismiss_history_entry(2).await);
}

#[tokio::test(start_paused = true)]
async fn sidebar_header_controls() {
    let h = harness();
    h.bridge.put(&history_path(), TWO_ITEMS);
    h.center.parse().await;

    assert!(h.renderer.click_config());
    assert!(h.renderer.click_clear_all());
    assert!(h.center.history_snapshot().is_empty());
    assert!(h.renderer.history_elements().is_empty());
    // The file is only rewritten by a backup.
    assert_eq!(h.bridge.file(&history_path()).as_deref(), Some(TWO_ITEMS));
}

#[tokio::test]
async fn parse_creates_history_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("shell");
    let center = NotificationCenter::new(
        &NotificationConfig::new(&data_dir),
        Arc::new(HeadlessRenderer::default()),
        Arc::new(MarkupIcons),
        Arc::new(FsBridge),
    );

    center.parse().await;

    let written = std::fs::read_to_string(data_dir.join("history.json")).unwrap();
    assert_eq!(written, "[]");
    assert!(center.history_snapshot().is_empty());
    assert_eq!(center.active_count(), 1);
}
