use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

/// Where coalesced drafts end up. The Postgres implementation lives in the
/// onboarding module; tests inject fakes.
#[async_trait]
pub trait DraftSink: Send + Sync {
    async fn write_draft(&self, user_id: Uuid, draft: &Value) -> anyhow::Result<()>;
}

#[derive(Default)]
struct AutosaveState {
    /// Latest unsaved draft per user; a newer queue() overwrites the older one.
    pending: HashMap<Uuid, Value>,
    /// At most one writer pass runs at a time.
    in_flight: bool,
    /// A debounce timer is armed and will trigger a pass.
    timer_armed: bool,
    last_error: Option<String>,
}

/// Coalesces rapid draft saves into occasional writes.
///
/// Saves are best-effort: `queue` returns immediately, a debounced background
/// pass persists the newest draft per user, and only an explicit [`flush`]
/// retries a failed write (once). There is no cancellation and no queue
/// beyond the single latest-wins slot per user.
///
/// [`flush`]: DraftAutosave::flush
pub struct DraftAutosave {
    sink: Arc<dyn DraftSink>,
    debounce: Duration,
    state: Mutex<AutosaveState>,
    drained: Notify,
}

impl DraftAutosave {
    pub fn new(sink: Arc<dyn DraftSink>, debounce: Duration) -> Arc<Self> {
        Arc::new(Self {
            sink,
            debounce,
            state: Mutex::new(AutosaveState::default()),
            drained: Notify::new(),
        })
    }

    /// Record `draft` as the user's newest unsaved state and arm the debounce
    /// timer if no pass is already scheduled or running.
    pub fn queue(self: &Arc<Self>, user_id: Uuid, draft: Value) {
        let arm_timer = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.pending.insert(user_id, draft);
            if state.timer_armed {
                false
            } else {
                state.timer_armed = true;
                true
            }
        };
        if arm_timer {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(this.debounce).await;
                this.run_pass(false).await;
            });
        }
    }

    /// Persist everything pending right now, waiting out any in-flight pass.
    /// Failed writes are retried once; an error from this flush's own writes
    /// (not from earlier background passes) is returned.
    pub async fn flush(&self) -> anyhow::Result<()> {
        let mut flush_error: Option<String> = None;
        loop {
            // Register for the drained signal before checking state, so a
            // pass finishing in between cannot be missed.
            let mut drained = std::pin::pin!(self.drained.notified());
            drained.as_mut().enable();
            let claimed = {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.pending.is_empty() && !state.in_flight {
                    return match flush_error {
                        None => Ok(()),
                        Some(e) => Err(anyhow::anyhow!(e)),
                    };
                }
                if state.in_flight {
                    false
                } else {
                    state.in_flight = true;
                    state.last_error = None;
                    true
                }
            };
            if claimed {
                self.drain(true).await;
                flush_error = self
                    .state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .last_error
                    .clone();
            } else {
                drained.await;
            }
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_error
            .clone()
    }

    async fn run_pass(self: Arc<Self>, retry: bool) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.in_flight {
                // The running pass drains whatever we queued.
                return;
            }
            state.in_flight = true;
        }
        self.drain(retry).await;
    }

    /// Caller must have set `in_flight`. Loops until nothing is pending, so
    /// drafts queued while writing are picked up before the pass ends.
    ///
    /// A write that fails on a background pass (`retry == false`) is parked
    /// until the pass finishes and then put back as pending, where the next
    /// explicit flush finds it. A write that fails even after the flush retry
    /// is dropped; the error is surfaced through `last_error`.
    async fn drain(&self, retry: bool) {
        let mut failed: Vec<(Uuid, Value)> = Vec::new();
        loop {
            let batch: Vec<(Uuid, Value)> = {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.pending.is_empty() {
                    for (user_id, draft) in failed {
                        state.pending.entry(user_id).or_insert(draft);
                    }
                    state.in_flight = false;
                    state.timer_armed = false;
                    self.drained.notify_waiters();
                    return;
                }
                state.pending.drain().collect()
            };
            for (user_id, draft) in batch {
                let mut result = self.sink.write_draft(user_id, &draft).await;
                if result.is_err() && retry {
                    debug!(%user_id, "draft write failed, retrying once");
                    result = self.sink.write_draft(user_id, &draft).await;
                }
                if let Err(e) = result {
                    warn!(%user_id, error = %e, "draft write failed");
                    self.state
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .last_error = Some(e.to_string());
                    if !retry {
                        failed.push((user_id, draft));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(Uuid, Value)>>,
        fail_first: AtomicUsize,
    }

    impl RecordingSink {
        fn failing(times: usize) -> Self {
            let sink = Self::default();
            sink.fail_first.store(times, Ordering::SeqCst);
            sink
        }

        fn written(&self) -> Vec<(Uuid, Value)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DraftSink for RecordingSink {
        async fn write_draft(&self, user_id: Uuid, draft: &Value) -> anyhow::Result<()> {
            if self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                anyhow::bail!("sink unavailable");
            }
            self.writes.lock().unwrap().push((user_id, draft.clone()));
            Ok(())
        }
    }

    fn draft(n: u64) -> Value {
        serde_json::json!({ "step": n })
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_queues_coalesce_into_one_write() {
        let sink = Arc::new(RecordingSink::default());
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_millis(500));
        let user = Uuid::new_v4();

        autosave.queue(user, draft(1));
        autosave.queue(user, draft(2));
        autosave.queue(user, draft(3));

        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        let writes = sink.written();
        assert_eq!(writes.len(), 1, "expected a single coalesced write");
        assert_eq!(writes[0], (user, draft(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_written_before_the_debounce_expires() {
        let sink = Arc::new(RecordingSink::default());
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_millis(500));
        autosave.queue(Uuid::new_v4(), draft(1));

        tokio::time::sleep(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;
        assert!(sink.written().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_users_each_keep_their_newest_draft() {
        let sink = Arc::new(RecordingSink::default());
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_millis(100));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        autosave.queue(alice, draft(1));
        autosave.queue(bob, draft(10));
        autosave.queue(alice, draft(2));
        autosave.flush().await.unwrap();

        let mut writes = sink.written();
        writes.sort_by_key(|(id, _)| *id);
        let mut expected = vec![(alice, draft(2)), (bob, draft(10))];
        expected.sort_by_key(|(id, _)| *id);
        assert_eq!(writes, expected);
    }

    #[tokio::test]
    async fn flush_writes_pending_without_waiting_for_the_timer() {
        let sink = Arc::new(RecordingSink::default());
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_secs(3600));
        let user = Uuid::new_v4();

        autosave.queue(user, draft(1));
        autosave.flush().await.unwrap();
        assert_eq!(sink.written(), vec![(user, draft(1))]);
    }

    #[tokio::test]
    async fn flush_retries_a_failed_write_once() {
        let sink = Arc::new(RecordingSink::failing(1));
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_secs(3600));
        let user = Uuid::new_v4();

        autosave.queue(user, draft(7));
        autosave.flush().await.unwrap();
        assert_eq!(sink.written(), vec![(user, draft(7))]);
        assert!(autosave.last_error().is_none());
    }

    #[tokio::test]
    async fn flush_surfaces_a_persistent_failure() {
        let sink = Arc::new(RecordingSink::failing(10));
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_secs(3600));
        let user = Uuid::new_v4();

        autosave.queue(user, draft(1));
        let err = autosave.flush().await.unwrap_err();
        assert!(err.to_string().contains("sink unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_background_write_is_retried_by_the_next_flush() {
        let sink = Arc::new(RecordingSink::failing(1));
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_millis(100));
        let user = Uuid::new_v4();

        autosave.queue(user, draft(5));
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        // Background pass does not retry; the draft stays pending.
        assert!(sink.written().is_empty());
        assert!(autosave.last_error().is_some());

        autosave.flush().await.unwrap();
        assert_eq!(sink.written(), vec![(user, draft(5))]);
    }

    #[tokio::test]
    async fn flush_with_nothing_pending_is_a_no_op() {
        let sink = Arc::new(RecordingSink::default());
        let autosave = DraftAutosave::new(sink.clone(), Duration::from_millis(100));
        autosave.flush().await.unwrap();
        assert!(sink.written().is_empty());
    }
}
