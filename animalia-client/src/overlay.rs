use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum OverlayError {
    #[error("Overlay {id} is not on top of the stack")]
    NotTop { id: String },
}

#[derive(Debug)]
struct Entry {
    id: String,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<Entry>,
    next_seq: u64,
}

/// The stack of open overlays. Only the top overlay may react to gestures.
///
/// Cloning shares the same stack.
#[derive(Clone, Debug, Default)]
pub struct ModalStack {
    inner: Arc<Mutex<Inner>>,
}

/// Proof of a push. Only the holder of the top handle can pop.
#[derive(Debug)]
pub struct OverlayHandle {
    id: String,
    seq: u64,
    stack: ModalStack,
}

impl OverlayHandle {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn is_top(&self) -> bool {
        self.stack
            .lock()
            .entries
            .last()
            .is_some_and(|entry| entry.seq == self.seq)
    }
}

/// Pops its overlay when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard closes the overlay immediately"]
pub struct OverlayGuard {
    handle: OverlayHandle,
}

impl OverlayGuard {
    #[must_use]
    pub fn handle(&self) -> &OverlayHandle {
        &self.handle
    }

    #[must_use]
    pub fn is_top(&self) -> bool {
        self.handle.is_top()
    }
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        let mut inner = self.handle.stack.lock();
        let Some(position) = inner
            .entries
            .iter()
            .rposition(|entry| entry.seq == self.handle.seq)
        else {
            return;
        };

        if position + 1 != inner.entries.len() {
            warn!(
                id = %self.handle.id,
                depth = inner.entries.len(),
                "Overlay closed while not on top"
            );
        }
        inner.entries.remove(position);
    }
}

impl ModalStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, id: impl Into<String>) -> OverlayHandle {
        let id = id.into();
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.entries.push(Entry { id: id.clone(), seq });
        debug!(%id, depth = inner.entries.len(), "Pushed overlay");

        OverlayHandle {
            id,
            seq,
            stack: self.clone(),
        }
    }

    pub fn push_scoped(&self, id: impl Into<String>) -> OverlayGuard {
        OverlayGuard {
            handle: self.push(id),
        }
    }

    /// Removes the top overlay, provided it is the one `handle` was issued for.
    pub fn pop(&self, handle: &OverlayHandle) -> Result<(), OverlayError> {
        let mut inner = self.lock();
        match inner.entries.last() {
            Some(entry) if entry.seq == handle.seq => {
                inner.entries.pop();
                debug!(id = %handle.id, depth = inner.entries.len(), "Popped overlay");
                Ok(())
            }
            _ => Err(OverlayError::NotTop {
                id: handle.id.clone(),
            }),
        }
    }

    #[must_use]
    pub fn is_top(&self, id: &str) -> bool {
        self.lock().entries.last().is_some_and(|entry| entry.id == id)
    }

    #[must_use]
    pub fn top(&self) -> Option<String> {
        self.lock().entries.last().map(|entry| entry.id.clone())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// Id for an overlay opened on top of the current one: its one-based depth.
    #[must_use]
    pub fn next_child_id(&self) -> String {
        (self.depth() + 1).to_string()
    }
}
