use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use futures_util::lock::Mutex as AsyncMutex;

/// Mutual exclusion per key.
///
/// Entries exist only while a key is in use.
pub struct KeyedLock<K> {
    entries: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLock<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `future` while holding the lock of `key`.
    ///
    /// The entry of `key` is released even if the returned future is dropped early.
    pub async fn run<F: Future>(&self, key: K, future: F) -> F::Output {
        let held = self.acquire(key);
        let _guard = held.entry.lock().await;
        future.await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn acquire(&self, key: K) -> Held<'_, K> {
        let entry = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone();
        Held {
            entries: &self.entries,
            key,
            entry,
        }
    }
}

struct Held<'a, K: Eq + Hash> {
    entries: &'a Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
    key: K,
    entry: Arc<AsyncMutex<()>>,
}

impl<K: Eq + Hash> Drop for Held<'_, K> {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map and this one
        if Arc::strong_count(&self.entry) == 2 {
            entries.remove(&self.key);
        }
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_run_serializes_same_key() {
        let lock = KeyedLock::new();
        let events = RefCell::new(vec![]);
        let task = |name: &'static str| {
            let lock = &lock;
            let events = &events;
            async move {
                lock.run(1, async {
                    events.borrow_mut().push(format!("{name} start"));
                    tokio::task::yield_now().await;
                    events.borrow_mut().push(format!("{name} end"));
                })
                .await;
            }
        };

        tokio::join!(task("a"), task("b"));

        assert_eq!(
            events.into_inner(),
            vec!["a start", "a end", "b start", "b end"]
        );
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_run_interleaves_different_keys() {
        let lock = KeyedLock::new();
        let events = RefCell::new(vec![]);
        let task = |key: u32, name: &'static str| {
            let lock = &lock;
            let events = &events;
            async move {
                lock.run(key, async {
                    events.borrow_mut().push(format!("{name} start"));
                    tokio::task::yield_now().await;
                    events.borrow_mut().push(format!("{name} end"));
                })
                .await;
            }
        };

        tokio::join!(task(1, "a"), task(2, "b"));

        let events = events.into_inner();
        assert_eq!(events.len(), 4);
        assert_eq!(events[..2], ["a start", "b start"]);
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_run_dropped_early() {
        let lock = KeyedLock::new();
        let mut holding = Box::pin(lock.run(1, std::future::pending::<()>()));
        let mut waiting = Box::pin(lock.run(1, async {}));

        assert!(futures_util::poll!(holding.as_mut()).is_pending());
        assert!(futures_util::poll!(waiting.as_mut()).is_pending());
        assert_eq!(lock.len(), 1);

        drop(waiting);
        assert_eq!(lock.len(), 1);

        drop(holding);
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_run_returns_output() {
        let lock = KeyedLock::new();
        assert_eq!(lock.run("key", async { 42 }).await, 42);
        assert_eq!(lock.len(), 0);
    }
}
