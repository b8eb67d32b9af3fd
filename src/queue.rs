//! Bounded FIFO buffer between measurement and delivery.
//!
//! Readings wait here until the sink confirms them. All operations take a
//! bounded timeout — a stalled producer or consumer can never deadlock the
//! control loop. The single-threaded cooperative loop never actually
//! blocks on a contended lock, but the queue is internally synchronized so
//! the semantics hold unchanged if delivery ever moves to its own thread.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::reading::Reading;

pub struct ReadingQueue {
    slots: Mutex<VecDeque<Reading>>,
    capacity: usize,
    not_full: Condvar,
    not_empty: Condvar,
}

impl ReadingQueue {
    /// Capacity is fixed for the lifetime of the queue.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Reading>> {
        // A poisoned lock only means a panicking thread died mid-access;
        // the deque itself is still structurally sound.
        self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append a reading, waiting up to `timeout` for a free slot.
    /// Returns `false` (and drops the reading) if the queue stayed full.
    pub fn enqueue(&self, reading: Reading, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slots = self.lock();
        while slots.len() >= self.capacity {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, result) = self
                .not_full
                .wait_timeout(slots, remaining)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slots = guard;
            if result.timed_out() && slots.len() >= self.capacity {
                return false;
            }
        }
        slots.push_back(reading);
        self.not_empty.notify_one();
        true
    }

    /// Copy of the oldest pending reading, left in place.
    pub fn peek(&self, timeout: Duration) -> Option<Reading> {
        let slots = self.wait_non_empty(timeout)?;
        slots.front().cloned()
    }

    /// Remove and return the oldest pending reading.
    pub fn dequeue(&self, timeout: Duration) -> Option<Reading> {
        let mut slots = self.wait_non_empty(timeout)?;
        let reading = slots.pop_front();
        if reading.is_some() {
            self.not_full.notify_one();
        }
        reading
    }

    /// Number of readings awaiting delivery.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of free slots.
    pub fn free_count(&self) -> usize {
        self.capacity - self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn wait_non_empty(&self, timeout: Duration) -> Option<MutexGuard<'_, VecDeque<Reading>>> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.lock();
        while slots.is_empty() {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (guard, result) = self
                .not_empty
                .wait_timeout(slots, remaining)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slots = guard;
            if result.timed_out() && slots.is_empty() {
                return None;
            }
        }
        Some(slots)
    }
}
