use super::{Durability, GraphStore, StoreError};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Store handle with durability switched off for the duration of a bulk load.
///
/// The previous durability is put back by [`BulkMode::finish`], or on drop if
/// the guard goes out of scope early (error path, panic unwinding).
pub struct BulkMode<'a, S: GraphStore + ?Sized> {
    store: &'a mut S,
    previous: Durability,
    restored: bool,
}

impl<'a, S: GraphStore + ?Sized> BulkMode<'a, S> {
    pub fn acquire(store: &'a mut S) -> Result<Self, StoreError> {
        let previous = store.durability()?;
        store.set_durability(Durability::Off)?;
        debug!(?previous, "bulk mode on");
        Ok(Self {
            store,
            previous,
            restored: false,
        })
    }

    pub fn previous(&self) -> Durability {
        self.previous
    }

    pub fn finish(mut self) -> Result<(), StoreError> {
        self.restored = true;
        self.store.set_durability(self.previous)?;
        debug!(previous = ?self.previous, "bulk mode off");
        Ok(())
    }
}

impl<S: GraphStore + ?Sized> Deref for BulkMode<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.store
    }
}

impl<S: GraphStore + ?Sized> DerefMut for BulkMode<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.store
    }
}

impl<S: GraphStore + ?Sized> Drop for BulkMode<'_, S> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.store.set_durability(self.previous) {
            warn!(%err, previous = ?self.previous, "failed to restore store durability");
        }
    }
}
