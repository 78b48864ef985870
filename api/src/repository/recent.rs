use std::{
    collections::VecDeque,
    num::NonZeroUsize,
    sync::{Mutex, PoisonError},
};
use vibration::TelemetrySample;

/// Fixed-capacity FIFO. Pushing onto a full buffer evicts the oldest item.
#[derive(Debug)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: NonZeroUsize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Appends `item`, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity.get() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Up to `n` items, newest first.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().rev().take(n)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

/// Recently ingested samples shared between the HTTP handlers and the
/// broker listener.
///
/// The lock only guards in-memory pushes and copies; no I/O happens while it
/// is held.
#[derive(Debug)]
pub struct RecentSamples {
    inner: Mutex<RingBuffer<TelemetrySample>>,
}

impl RecentSamples {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    pub fn push(&self, sample: TelemetrySample) -> Option<TelemetrySample> {
        self.lock().push(sample)
    }

    /// The `n` most recent samples, most recent first.
    pub fn latest(&self, n: usize) -> Vec<TelemetrySample> {
        self.lock().newest(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().capacity()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RingBuffer<TelemetrySample>> {
        // Push and pop leave the deque consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
