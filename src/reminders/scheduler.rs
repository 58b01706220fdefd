/// One-shot job scheduling for reminders
///
/// The scheduler holds one pending timer per schedule request, grouped by
/// habit tag so a habit's reminders can be replaced as a whole.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::HabitId;
use crate::reminders::{ReminderPayload, ScheduleRequest};

/// A reminder whose delay elapsed
pub type FiredReminder = ReminderPayload;

/// Collaborator that runs one-shot delayed jobs
pub trait JobScheduler {
    /// Schedule a single job
    fn enqueue(&self, request: ScheduleRequest);

    /// Cancel every pending job carrying `tag`
    fn cancel_by_tag(&self, tag: &HabitId);

    /// Cancel every pending job
    fn cancel_all(&self);

    /// Cancel the tag's jobs, then enqueue `requests`.
    ///
    /// Implementations shared across threads must not let two replacements
    /// for the same tag interleave.
    fn replace_for_tag(&self, tag: &HabitId, requests: Vec<ScheduleRequest>) {
        self.cancel_by_tag(tag);
        for request in requests {
            self.enqueue(request);
        }
    }
}

/// Scheduler backed by tokio timers.
///
/// Fired reminders are sent into an unbounded channel; whoever holds the
/// receiver decides how to notify the user.
pub struct TokioJobScheduler {
    runtime: Handle,
    sender: mpsc::UnboundedSender<FiredReminder>,
    pending: Mutex<HashMap<HabitId, Vec<JoinHandle<()>>>>,
}

impl TokioJobScheduler {
    /// Create a scheduler on the current tokio runtime.
    ///
    /// Panics when called outside a runtime, like `tokio::spawn`.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredReminder>) {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(runtime: Handle) -> (Self, mpsc::UnboundedReceiver<FiredReminder>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            runtime,
            sender,
            pending: Mutex::new(HashMap::new()),
        };
        (scheduler, receiver)
    }

    /// Number of jobs still waiting for `tag`
    pub fn pending_for(&self, tag: &HabitId) -> usize {
        self.lock_pending()
            .get(tag)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<HabitId, Vec<JoinHandle<()>>>> {
        // A panic while holding the lock leaves the map itself consistent
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn(&self, request: ScheduleRequest) -> JoinHandle<()> {
        let sender = self.sender.clone();
        let ScheduleRequest { delay, payload, .. } = request;
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Reminder fired for habit {}", payload.habit_id);
            // The receiver is gone only during shutdown
            let _ = sender.send(payload);
        })
    }

    fn abort_all(handles: Vec<JoinHandle<()>>) -> usize {
        let count = handles.len();
        for handle in handles {
            handle.abort();
        }
        count
    }
}

impl JobScheduler for TokioJobScheduler {
    fn enqueue(&self, request: ScheduleRequest) {
        let tag = request.tag.clone();
        let handle = self.spawn(request);
        let mut pending = self.lock_pending();
        let handles = pending.entry(tag).or_default();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    fn cancel_by_tag(&self, tag: &HabitId) {
        let removed = self.lock_pending().remove(tag).unwrap_or_default();
        let count = Self::abort_all(removed);
        debug!("Cancelled {} pending reminder(s) for habit {}", count, tag);
    }

    fn cancel_all(&self) {
        let drained: Vec<_> = self.lock_pending().drain().collect();
        let count: usize = drained.into_iter().map(|(_, handles)| Self::abort_all(handles)).sum();
        info!("Cancelled {} pending reminder(s)", count);
    }

    fn replace_for_tag(&self, tag: &HabitId, requests: Vec<ScheduleRequest>) {
        // Hold the lock across cancel and enqueue so replacements for the
        // same habit never interleave.
        let mut pending = self.lock_pending();
        let cancelled = Self::abort_all(pending.remove(tag).unwrap_or_default());

        let handles: Vec<JoinHandle<()>> = requests
            .into_iter()
            .map(|request| self.spawn(request))
            .collect();
        debug!(
            "Replaced {} pending reminder(s) with {} for habit {}",
            cancelled,
            handles.len(),
            tag
        );
        if !handles.is_empty() {
            pending.insert(tag.clone(), handles);
        }
    }
}
