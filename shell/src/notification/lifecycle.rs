//! Per-notification state machine.
//!
//! ```text
//! Pending -> Visible -> Dismissing -> Archived | Discarded
//! ```
//!
//! Only one task drives a lifecycle out of `Visible`. Later removal requests
//! either bring the pending deadline forward or are ignored, so a notification
//! is archived or discarded exactly once.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

use super::types::NotificationRecord;
use crate::lock;
use crate::ui::ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Visible,
    Dismissing,
    Archived,
    Discarded,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived | Self::Discarded)
    }
}

/// Display time used when a removal is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// What is left of the display time. Infinite notifications have `-1` left.
    Remaining,
    /// Explicit display time in milliseconds; `After(0)` skips straight to the animation.
    After(i64),
}

/// Outcome of a removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The caller owns the dismissal and must drive it.
    Drive,
    /// An earlier deadline was handed to the task already driving it.
    Hurried,
    Ignored,
}

struct State {
    phase: Phase,
    shown_at: Option<Instant>,
    due: Option<Instant>,
}

pub struct Lifecycle {
    time: i64,
    state: Mutex<State>,
    hurry: Notify,
    cancel: CancellationToken,
}

impl Lifecycle {
    pub(crate) fn new(time: i64) -> Self {
        Self {
            time,
            state: Mutex::new(State {
                phase: Phase::Pending,
                shown_at: None,
                due: None,
            }),
            hurry: Notify::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Resolved display time in milliseconds.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn phase(&self) -> Phase {
        lock(&self.state).phase
    }

    /// Display time left, `-1` when infinite. May be negative once elapsed.
    pub fn remaining_ms(&self) -> i64 {
        remaining(self.time, &lock(&self.state))
    }

    pub(crate) fn show(&self) {
        let mut state = lock(&self.state);
        if state.phase == Phase::Pending {
            state.phase = Phase::Visible;
            state.shown_at = Some(Instant::now());
        }
    }

    pub(crate) fn request(&self, dismissal: Dismissal, transition: Duration) -> Claim {
        let mut state = lock(&self.state);
        if state.phase != Phase::Visible {
            return Claim::Ignored;
        }

        let time = match dismissal {
            Dismissal::Remaining => remaining(self.time, &state),
            Dismissal::After(ms) => ms,
        };
        let transition_ms = i64::try_from(transition.as_millis()).unwrap_or(i64::MAX);
        let wait = time.saturating_sub(transition_ms).max(0);
        let due = Instant::now() + Duration::from_millis(wait as u64);

        match state.due {
            None => {
                state.due = Some(due);
                Claim::Drive
            }
            Some(current) if due < current => {
                state.due = Some(due);
                self.hurry.notify_one();
                Claim::Hurried
            }
            Some(_) => Claim::Ignored,
        }
    }

    /// Wait for the (possibly moving) deadline. `false` when cancelled.
    pub(crate) async fn wait_until_due(&self) -> bool {
        loop {
            let due = lock(&self.state).due;
            let Some(due) = due else {
                return false;
            };
            if Instant::now() >= due {
                return true;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = self.hurry.notified() => {}
                _ = sleep_until(due) => {}
            }
        }
    }

    pub(crate) fn begin_dismiss(&self) -> bool {
        let mut state = lock(&self.state);
        if state.phase != Phase::Visible {
            return false;
        }
        state.phase = Phase::Dismissing;
        true
    }

    /// Wait out the dismiss animation. `false` when cancelled.
    pub(crate) async fn animate(&self, transition: Duration) -> bool {
        !sleep_or_cancel(&self.cancel, transition).await
    }

    pub(crate) fn finish(&self, archived: bool) {
        let mut state = lock(&self.state);
        if state.phase == Phase::Dismissing {
            state.phase = if archived {
                Phase::Archived
            } else {
                Phase::Discarded
            };
        }
    }

    /// Discard immediately and stop any pending timer.
    pub(crate) fn destroy(&self) -> bool {
        {
            let mut state = lock(&self.state);
            if state.phase.is_terminal() {
                return false;
            }
            state.phase = Phase::Discarded;
        }
        self.cancel.cancel();
        true
    }
}

fn remaining(time: i64, state: &State) -> i64 {
    if time < 0 {
        return time;
    }
    let elapsed = state
        .shown_at
        .map(|at| i64::try_from(at.elapsed().as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    time.saturating_sub(elapsed)
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// A notification currently owned by the center: its record, rendered
/// element and lifecycle.
pub struct ActiveNotification {
    record: NotificationRecord,
    snapshot: i64,
    save: bool,
    element: ElementRef,
    lifecycle: Lifecycle,
}

impl ActiveNotification {
    pub(crate) fn new(
        record: NotificationRecord,
        snapshot: i64,
        time: i64,
        save: bool,
        element: ElementRef,
    ) -> Self {
        Self {
            record,
            snapshot,
            save,
            element,
            lifecycle: Lifecycle::new(time),
        }
    }

    pub fn record(&self) -> &NotificationRecord {
        &self.record
    }

    /// Creation time in epoch milliseconds.
    pub fn snapshot(&self) -> i64 {
        self.snapshot
    }

    /// Whether the notification is archived when dismissed.
    pub fn save(&self) -> bool {
        self.save
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }
}
