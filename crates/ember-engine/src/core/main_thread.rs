use std::sync::{Mutex, MutexGuard, PoisonError};

/// Multi-producer queue drained once per frame by the main thread.
///
/// The mutex is held only to append or to swap the whole backlog out.
/// Draining hands back an owned batch, so jobs run with the lock released
/// and may enqueue further jobs; those land in the next batch.
pub(crate) struct MainThreadQueue<T> {
    pending: Mutex<Vec<T>>,
}

impl<T> MainThreadQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, job: T) {
        self.lock().push(job);
    }

    /// Takes every pending job in enqueue order.
    pub(crate) fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    // A producer that panicked mid-push leaves a valid Vec behind.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
