//! Frontier queue with built-in duplicate suppression
//!
//! The frontier is a FIFO queue of URLs still to be fetched, paired with the
//! set of every URL ever admitted. Both live under a single mutex so that
//! the visited-check and the queue append are one atomic step: two workers
//! discovering the same link concurrently can never both enqueue it.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

struct FrontierInner {
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

/// Thread-safe FIFO frontier with a visited-set guard
///
/// URLs are compared by exact string match; no normalization is applied.
/// A URL enters the visited set the moment it is accepted into the queue,
/// not when it is fetched.
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FrontierInner {
                queue: VecDeque::new(),
                visited: HashSet::new(),
            }),
        }
    }

    /// Atomically checks the visited set and, if the URL is new, admits it
    /// to both the set and the queue. Returns whether the insert happened.
    pub fn try_enqueue(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.visited.contains(url) {
            return false;
        }
        inner.visited.insert(url.to_string());
        inner.queue.push_back(url.to_string());
        true
    }

    /// Removes and returns the head of the queue, or `None` if the queue is
    /// currently empty. Never blocks; an empty queue means "nothing to do
    /// right now", not "the crawl is over".
    pub fn try_dequeue(&self) -> Option<String> {
        self.inner.lock().unwrap().queue.pop_front()
    }

    /// Admits a URL to the visited set without queueing it.
    ///
    /// Used for the seed page, which is fetched and scanned before the
    /// worker pool starts and must never be fetched again.
    pub fn mark_visited(&self, url: &str) {
        self.inner.lock().unwrap().visited.insert(url.to_string());
    }

    /// Puts a previously dequeued URL back at the tail, bypassing the
    /// visited check.
    ///
    /// Only valid for URLs obtained from [`try_dequeue`](Self::try_dequeue)
    /// whose processing did not complete (a worker cancelled mid-batch);
    /// calling it with anything else would break the dedup invariant.
    pub fn requeue(&self, url: String) {
        self.inner.lock().unwrap().queue.push_back(url);
    }

    /// Number of URLs currently waiting in the queue
    pub fn queued_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Number of URLs ever admitted to the frontier
    pub fn visited_len(&self) -> usize {
        self.inner.lock().unwrap().visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().queue.is_empty()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
