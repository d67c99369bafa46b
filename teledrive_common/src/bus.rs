//! In-process latest-value topics.
//!
//! A topic holds only the most recent message. Writers overwrite it and bump
//! a monotonically increasing heartbeat; each reader polls at its own pace
//! and derives three per-poll flags from that heartbeat:
//!
//! - `updated`: the heartbeat changed since this reader's previous poll.
//! - `alive`: the heartbeat changed within the last `stale_threshold` polls.
//! - `valid`: the publisher's validity flag on the latest message.
//!
//! Polling never waits on a writer beyond the copy of the latest value, so a
//! silent publisher can never stall the control tick; it just goes stale.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Latest message plus its sequence number.
#[derive(Debug, Clone)]
struct Envelope<T> {
    heartbeat: u64,
    valid: bool,
    value: T,
}

struct Slot<T> {
    name: String,
    heartbeat: AtomicU64,
    latest: RwLock<Option<Envelope<T>>>,
}

/// Topic factory.
pub struct Topic<T>(std::marker::PhantomData<T>);

impl<T: Clone> Topic<T> {
    /// Create a topic and return its first writer and reader.
    ///
    /// `stale_threshold` is the number of consecutive polls without a
    /// heartbeat change after which the reader reports the topic as dead.
    pub fn new(name: &str, stale_threshold: u32) -> (TopicWriter<T>, TopicReader<T>) {
        let slot = Arc::new(Slot {
            name: name.to_string(),
            heartbeat: AtomicU64::new(0),
            latest: RwLock::new(None),
        });
        let writer = TopicWriter {
            slot: Arc::clone(&slot),
        };
        let reader = TopicReader {
            slot,
            last_heartbeat: 0,
            stale_count: 0,
            stale_threshold: stale_threshold.max(1),
        };
        (writer, reader)
    }
}

/// Publishing side of a topic. Cheap to clone.
pub struct TopicWriter<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for TopicWriter<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for TopicWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicWriter")
            .field("name", &self.slot.name)
            .field("heartbeat", &self.heartbeat())
            .finish()
    }
}

impl<T> TopicWriter<T> {
    /// Replace the latest message and bump the heartbeat.
    pub fn publish(&self, value: T, valid: bool) {
        let mut latest = self.slot.latest.write();
        let heartbeat = self.slot.heartbeat.load(Ordering::Relaxed) + 1;
        *latest = Some(Envelope {
            heartbeat,
            valid,
            value,
        });
        self.slot.heartbeat.store(heartbeat, Ordering::Release);
    }

    /// Number of messages published so far.
    pub fn heartbeat(&self) -> u64 {
        self.slot.heartbeat.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &str {
        &self.slot.name
    }
}

/// Result of one [`TopicReader::poll`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T> {
    /// Latest message, `None` if nothing was ever published.
    pub value: Option<T>,
    pub updated: bool,
    pub alive: bool,
    pub valid: bool,
}

impl<T> Polled<T> {
    /// Nothing ever published.
    pub const fn empty() -> Self {
        Self {
            value: None,
            updated: false,
            alive: false,
            valid: false,
        }
    }

    /// Fresh and valid this poll.
    #[inline]
    pub fn is_fresh(&self) -> bool {
        self.updated && self.valid
    }
}

/// Subscribing side of a topic.
///
/// Each reader tracks its own heartbeat cursor; cloning a reader yields an
/// independent cursor starting from the same position.
pub struct TopicReader<T> {
    slot: Arc<Slot<T>>,
    last_heartbeat: u64,
    stale_count: u32,
    stale_threshold: u32,
}

impl<T> Clone for TopicReader<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            last_heartbeat: self.last_heartbeat,
            stale_count: self.stale_count,
            stale_threshold: self.stale_threshold,
        }
    }
}

impl<T> fmt::Debug for TopicReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicReader")
            .field("name", &self.slot.name)
            .field("last_heartbeat", &self.last_heartbeat)
            .field("stale_count", &self.stale_count)
            .finish()
    }
}

impl<T: Clone> TopicReader<T> {
    /// Take the latest message and update the staleness counters.
    pub fn poll(&mut self) -> Polled<T> {
        let envelope = self.slot.latest.read().as_ref().cloned();
        let Some(envelope) = envelope else {
            return Polled::empty();
        };

        let updated = envelope.heartbeat != self.last_heartbeat;
        if updated {
            self.last_heartbeat = envelope.heartbeat;
            self.stale_count = 0;
        } else {
            self.stale_count = self.stale_count.saturating_add(1);
        }

        Polled {
            value: Some(envelope.value),
            updated,
            alive: self.stale_count < self.stale_threshold,
            valid: envelope.valid,
        }
    }
}

impl<T> TopicReader<T> {
    /// Cheap check for a new message without consuming it.
    pub fn has_changed(&self) -> bool {
        self.slot.heartbeat.load(Ordering::Acquire) != self.last_heartbeat
    }

    /// Consecutive polls without a heartbeat change.
    pub fn stale_count(&self) -> u32 {
        self.stale_count
    }

    pub fn name(&self) -> &str {
        &self.slot.name
    }
}
