//! Pending check tag updates.
//!
//! Check tags describe the check itself rather than any one metric. They are
//! queued here between updates and handed to the transport as sorted
//! `category:value` strings.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Queue of check tags waiting to be submitted. The last value queued for a
/// category wins.
#[derive(Debug, Default)]
pub struct CheckTagQueue {
    pending: Mutex<BTreeMap<String, String>>,
}

impl CheckTagQueue {
    /// Create an empty queue
    pub fn new() -> CheckTagQueue {
        CheckTagQueue::default()
    }

    /// Queue `category:value`. Empty categories or values are ignored.
    pub fn queue(&self, category: &str, value: &str) {
        if category.is_empty() || value.is_empty() {
            return;
        }
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category.to_string(), value.to_string());
    }

    /// Number of categories queued
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Determine if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the queue, returning what it held as sorted `category:value`
    /// strings.
    pub fn drain(&self) -> Vec<String> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let tags = pending
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect();
        pending.clear();
        tags
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ignores_empty() {
        let q = CheckTagQueue::new();
        q.queue("", "bar");
        q.queue("foo", "");
        assert!(q.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let q = CheckTagQueue::new();
        q.queue("foo", "bar");
        q.queue("foo", "baz");
        assert_eq!(1, q.len());
        assert_eq!(vec!["foo:baz".to_string()], q.drain());
    }

    #[test]
    fn drain_sorts_and_clears() {
        let q = CheckTagQueue::new();
        q.queue("zed", "1");
        q.queue("alpha", "2");
        q.queue("mid", "3");
        assert_eq!(
            vec![
                "alpha:2".to_string(),
                "mid:3".to_string(),
                "zed:1".to_string()
            ],
            q.drain()
        );
        assert!(q.is_empty());
        assert!(q.drain().is_empty());
    }
}
