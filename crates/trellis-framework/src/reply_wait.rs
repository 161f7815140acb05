//! Reply-wait correlation cache.
//!
//! A time-bounded mailbox keyed by `(chat, user)`. When intents are
//! enabled, the dispatcher records every non-command text message here;
//! a handler blocked in [`Context::wait_for_message`] is woken as soon as
//! a value lands under its key.
//!
//! Each key holds at most one value. Recording over an unconsumed value
//! overwrites it in place - this is a mailbox, not a queue. Entries carry
//! a fixed 90-second time to live, independent of any waiter's timeout,
//! and expire lazily on the next read or write.
//!
//! [`Context::wait_for_message`]: crate::context::Context::wait_for_message

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Fixed time to live of a recorded entry.
pub const REPLY_TTL: Duration = Duration::from_secs(90);

struct Slot {
    /// The recorded content and when it was recorded.
    content: Option<(String, Instant)>,
    /// Wakes the waiter blocked on this key, if any.
    notify: Arc<Notify>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            content: None,
            notify: Arc::new(Notify::new()),
        }
    }
}

/// Concurrent reply-wait store shared between the dispatcher and every
/// active [`Context`](crate::context::Context).
#[derive(Default)]
pub struct ReplyWaitCache {
    slots: Mutex<HashMap<(String, String), Slot>>,
}

impl ReplyWaitCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `content` under `(chat_id, user_id)`, overwriting any
    /// unconsumed value, and wakes the waiter if one is blocked.
    ///
    /// Also purges expired entries, so keys that chat but are never
    /// awaited do not accumulate. Slots holding no value belong to an
    /// active waiter and are kept.
    pub fn record(&self, chat_id: &str, user_id: &str, content: &str) {
        let mut slots = self.slots.lock();
        slots.retain(|_, slot| {
            slot.content
                .as_ref()
                .is_none_or(|(_, recorded_at)| recorded_at.elapsed() < REPLY_TTL)
        });
        let slot = slots
            .entry((chat_id.to_string(), user_id.to_string()))
            .or_insert_with(Slot::empty);
        slot.content = Some((content.to_string(), Instant::now()));
        slot.notify.notify_one();
    }

    /// Blocks until a value recorded under `(chat_id, user_id)` can be
    /// compared against `expected`.
    ///
    /// Returns `true` when the recorded value equals `expected`, `false`
    /// when a different value arrives or `timeout` elapses first. In every
    /// exit path the entry is cleared, so a stale key never outlives the
    /// call that consumed or abandoned it.
    pub async fn await_reply(
        &self,
        chat_id: &str,
        user_id: &str,
        expected: &str,
        timeout: Duration,
    ) -> bool {
        let key = (chat_id.to_string(), user_id.to_string());
        let deadline = Instant::now() + timeout;

        let notify = {
            let mut slots = self.slots.lock();
            let slot = slots.entry(key.clone()).or_insert_with(Slot::empty);
            Arc::clone(&slot.notify)
        };

        loop {
            {
                let mut slots = self.slots.lock();
                if let Some(slot) = slots.get_mut(&key)
                    && let Some((value, recorded_at)) = slot.content.take()
                {
                    // Lazy expiry: a value older than the TTL counts as
                    // never having been recorded.
                    if recorded_at.elapsed() < REPLY_TTL {
                        slots.remove(&key);
                        return value == expected;
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if tokio::time::timeout(deadline - now, notify.notified())
                .await
                .is_err()
            {
                break;
            }
        }

        self.slots.lock().remove(&key);
        false
    }

    /// Number of live keys. Intended for diagnostics and tests.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
