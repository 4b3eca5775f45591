//! Optimistic in-memory unit of work.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::MemoryWorld;
use crate::repository::{RaidStore, Result, StoreError};

struct Versioned {
    version: u64,
    world: MemoryWorld,
}

/// [`RaidStore`] over a single [`MemoryWorld`].
///
/// A transaction clones the world at the current version, runs against the
/// clone, and swaps it in only if no other commit happened meanwhile.
/// Otherwise the commit fails with [`StoreError::Conflict`].
pub struct InMemoryRaidStore {
    state: RwLock<Versioned>,
    fail_next_commit: AtomicBool,
}

impl InMemoryRaidStore {
    pub fn new(world: MemoryWorld) -> Self {
        Self {
            state: RwLock::new(Versioned { version: 0, world }),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Makes the next commit fail as if a concurrent writer had won.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn version(&self) -> Result<u64> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.version)
    }

    fn snapshot(&self) -> Result<(u64, MemoryWorld)> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok((state.version, state.world.clone()))
    }

    fn commit(&self, base_version: u64, world: MemoryWorld) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            debug!(base_version, "injected commit failure");
            return Err(StoreError::Conflict);
        }

        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        if state.version != base_version {
            debug!(base_version, current = state.version, "commit lost to a concurrent writer");
            return Err(StoreError::Conflict);
        }
        state.world = world;
        state.version += 1;
        Ok(())
    }
}

impl Default for InMemoryRaidStore {
    fn default() -> Self {
        Self::new(MemoryWorld::default())
    }
}

impl RaidStore for InMemoryRaidStore {
    type View = MemoryWorld;

    fn read<R>(&self, f: impl FnOnce(&MemoryWorld) -> R) -> Result<R> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&state.world))
    }

    fn transaction<R, E>(
        &self,
        f: impl FnOnce(&mut MemoryWorld) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E>
    where
        E: From<StoreError>,
    {
        let (base_version, mut working) = self.snapshot()?;
        let output = f(&mut working)?;
        self.commit(base_version, working)?;
        Ok(output)
    }
}
