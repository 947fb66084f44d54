use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum EntryState {
    Fresh,
    /// Invalidated: still readable, but the next read should re-fetch.
    Stale,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub(crate) struct Entry<V> {
    pub value: V,
    pub state: EntryState,
    pub updated_at: UtcDateTime,
    pub version: u64,
}

/// Bookkeeping of a cache entry, without its value.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct EntryInfo {
    pub state: EntryState,
    pub updated_at: UtcDateTime,
    pub version: u64,
}

/// The value of an entry as it was at one point in time, used to roll back optimistic writes.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Snapshot<V> {
    pub(crate) value: Option<V>,
    pub(crate) version: u64,
}

impl<V> Entry<V> {
    pub fn new(value: V, version: u64) -> Self {
        Self {
            value,
            state: EntryState::Fresh,
            updated_at: UtcDateTime::now(),
            version,
        }
    }

    pub fn touch(&mut self, version: u64) {
        self.updated_at = UtcDateTime::now();
        self.version = version;
    }

    pub fn info(&self) -> EntryInfo {
        EntryInfo {
            state: self.state,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

impl<V> Snapshot<V> {
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn into_value(self) -> Option<V> {
        self.value
    }
}
