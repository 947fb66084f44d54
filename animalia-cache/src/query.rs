use crate::entry::{Entry, EntryInfo, EntryState, Snapshot};
use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

/// Client-side cache of query results, keyed by query identity.
///
/// All reads hand out clones; no lock is held once a method returns, so callers are free to
/// `.await` between reading and writing. Writes coming from fetches go through a
/// [`FetchTicket`] and are dropped if the fetch was cancelled in the meantime.
pub struct QueryCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    fetches: HashMap<K, CancellationToken>,
    next_version: u64,
}

/// Handed out when a fetch starts; the fetch may only write back while the ticket is live.
#[derive(Clone, Debug)]
pub struct FetchTicket {
    token: CancellationToken,
}

impl FetchTicket {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

impl<K, V> Inner<K, V> {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                fetches: HashMap::new(),
                next_version: 0,
            }),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().entries.get(key).map(|entry| entry.value.clone())
    }

    #[must_use]
    pub fn info(&self, key: &K) -> Option<EntryInfo> {
        self.lock().entries.get(key).map(Entry::info)
    }

    /// Missing entries count as stale: there is nothing fresh to show.
    #[must_use]
    pub fn is_stale(&self, key: &K) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_none_or(|entry| entry.state == EntryState::Stale)
    }

    pub fn set(&self, key: K, value: V) {
        let mut inner = self.lock();
        let version = inner.bump();
        inner.entries.insert(key, Entry::new(value, version));
    }

    /// Mutates an existing entry in place without changing its freshness.
    ///
    /// Returns `false` if there was no entry to update.
    pub fn update(&self, key: &K, f: impl FnOnce(&mut V)) -> bool {
        let mut inner = self.lock();
        let version = inner.bump();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                f(&mut entry.value);
                entry.touch(version);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn snapshot(&self, key: &K) -> Snapshot<V> {
        let inner = self.lock();
        let entry = inner.entries.get(key);
        Snapshot {
            value: entry.map(|entry| entry.value.clone()),
            version: entry.map_or(0, |entry| entry.version),
        }
    }

    /// Puts back the value captured by [`QueryCache::snapshot`]. An empty snapshot removes the
    /// entry. Writes made after the snapshot was taken are overwritten.
    pub fn restore(&self, key: K, snapshot: Snapshot<V>) {
        let mut inner = self.lock();
        let current_version = inner.entries.get(&key).map_or(0, |entry| entry.version);
        if current_version > snapshot.version + 1 {
            debug!(
                ?key,
                current_version,
                snapshot_version = snapshot.version,
                "Restoring snapshot over newer writes"
            );
        }

        match snapshot.value {
            Some(value) => {
                let version = inner.bump();
                let state = inner
                    .entries
                    .get(&key)
                    .map_or(EntryState::Fresh, |entry| entry.state);
                let mut entry = Entry::new(value, version);
                entry.state = state;
                inner.entries.insert(key, entry);
            }
            None => {
                inner.entries.remove(&key);
            }
        }
    }

    /// Marks the entry stale. Returns whether there was an entry.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.lock();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                debug!(?key, "Invalidating query");
                entry.state = EntryState::Stale;
                true
            }
            None => false,
        }
    }

    /// Marks every entry whose key matches `predicate` stale, returning how many were hit.
    pub fn invalidate_where(&self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let mut inner = self.lock();
        let mut invalidated = 0;
        for (key, entry) in &mut inner.entries {
            if predicate(key) {
                debug!(?key, "Invalidating query");
                entry.state = EntryState::Stale;
                invalidated += 1;
            }
        }
        invalidated
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        for token in inner.fetches.values() {
            token.cancel();
        }
        inner.fetches.clear();
        inner.entries.clear();
    }

    /// Registers an in-flight fetch for `key`.
    #[must_use]
    pub fn begin_fetch(&self, key: K) -> FetchTicket {
        let mut inner = self.lock();
        let token = inner.fetches.entry(key).or_default().child_token();
        FetchTicket { token }
    }

    /// Cancels every fetch in flight for `key`; their results will not be written back.
    pub fn cancel_fetches(&self, key: &K) {
        if let Some(token) = self.lock().fetches.remove(key) {
            debug!(?key, "Cancelling in-flight fetches");
            token.cancel();
        }
    }

    /// Replaces the entry with a fetched value and marks it fresh, unless the fetch was cancelled.
    pub fn commit_replace(&self, ticket: &FetchTicket, key: K, value: V) -> bool {
        let mut inner = self.lock();
        if ticket.is_cancelled() {
            return false;
        }
        let version = inner.bump();
        inner.entries.insert(key, Entry::new(value, version));
        true
    }

    /// Merges a fetched result into the entry, keeping its freshness, unless the fetch was
    /// cancelled. A new entry starts fresh.
    pub fn commit_update(
        &self,
        ticket: &FetchTicket,
        key: K,
        f: impl FnOnce(Option<V>) -> V,
    ) -> bool {
        let mut inner = self.lock();
        if ticket.is_cancelled() {
            return false;
        }
        let version = inner.bump();
        match inner.entries.remove(&key) {
            Some(mut entry) => {
                entry.value = f(Some(entry.value));
                entry.touch(version);
                inner.entries.insert(key, entry);
            }
            None => {
                inner.entries.insert(key, Entry::new(f(None), version));
            }
        }
        true
    }
}
