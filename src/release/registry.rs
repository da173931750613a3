/*!
 * Deallocation Hook Registry
 * One-shot background discovery of the unmanaged release mechanism
 */

use super::hook::{self, ReleaseHook};
use crate::buffer::handle::BufferHandle;
use crate::buffer::storage::Region;
use crate::core::types::AllocationKind;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;

/// Discovery state: a single-assignment promise the background task
/// completes exactly once. Stale regions superseded by growth before
/// discovery finishes queue here and are released on completion.
enum DiscoveryState {
    Pending { stale: Vec<Arc<Region>> },
    Resolved(Option<ReleaseHook>),
}

/// Registry for the platform release mechanism of unmanaged memory
///
/// Discovery runs once, asynchronously, at registry start. Callers that
/// need the hook before discovery completes block on the registry's
/// barrier; a platform without the mechanism still completes discovery
/// (hook absent) so waiters never hang. Absence is degraded but non-fatal:
/// every later release simply reports `false`.
pub struct DeallocationHookRegistry {
    state: Mutex<DiscoveryState>,
    completed: Condvar,
}

impl DeallocationHookRegistry {
    /// Create the registry and start background discovery
    pub fn start() -> Arc<Self> {
        let registry = Arc::new(Self {
            state: Mutex::new(DiscoveryState::Pending { stale: Vec::new() }),
            completed: Condvar::new(),
        });
        let background = Arc::clone(&registry);
        let spawned = thread::Builder::new()
            .name("dealloc-hook-discovery".into())
            .spawn(move || background.run_discovery());
        if spawned.is_err() {
            warn!("Could not spawn discovery thread, resolving hook inline");
            registry.run_discovery();
        }
        registry
    }

    fn run_discovery(&self) {
        let resolved = hook::discover();
        match resolved {
            Some(_) => info!("Deallocation hook resolved"),
            None => warn!("No deallocation hook on this platform; unmanaged release disabled"),
        }
        let stale = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut *state, DiscoveryState::Resolved(resolved));
            self.completed.notify_all();
            match previous {
                DiscoveryState::Pending { stale } => stale,
                DiscoveryState::Resolved(_) => Vec::new(),
            }
        };
        if stale.is_empty() {
            return;
        }
        match resolved {
            Some(hook) => {
                for region in &stale {
                    if region.release(&hook) {
                        debug!(
                            "Released queued superseded region of {} bytes",
                            region.capacity()
                        );
                    }
                }
            }
            None => warn!(
                "Leaking {} superseded unmanaged regions: no release hook",
                stale.len()
            ),
        }
    }

    /// The resolved hook, blocking until discovery completes
    pub fn resolve(&self) -> Option<ReleaseHook> {
        let mut state = self.state.lock();
        loop {
            if let DiscoveryState::Resolved(hook) = &*state {
                return *hook;
            }
            self.completed.wait(&mut state);
        }
    }

    /// The resolved hook without blocking: `None` while discovery runs
    pub fn try_resolve(&self) -> Option<Option<ReleaseHook>> {
        match &*self.state.lock() {
            DiscoveryState::Resolved(hook) => Some(*hook),
            DiscoveryState::Pending { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.try_resolve().is_some()
    }

    /// Explicitly release a handle's unmanaged backing memory
    ///
    /// Idempotent and safe to call speculatively: returns `false` for
    /// managed handles, already-released storage, an absent hook, or a
    /// shared view without `force`. A view does not own a release point of
    /// its own; `force` releases the chain's shared storage, marking every
    /// alias released in the same critical section.
    pub fn release(&self, handle: &BufferHandle, force: bool) -> bool {
        if handle.kind() != AllocationKind::Unmanaged {
            return false;
        }
        if handle.is_view() && !force {
            debug!("Refusing non-forced release through a shared view");
            return false;
        }
        if handle.is_released() {
            return false;
        }
        let hook = match self.resolve() {
            Some(hook) => hook,
            None => return false,
        };
        let released = handle.region().release(&hook);
        if released {
            debug!(
                "Released {} bytes of unmanaged memory",
                handle.capacity()
            );
        }
        released
    }

    /// Release a region superseded by growth
    ///
    /// If discovery has not completed yet the region is queued and
    /// released once it does, instead of leaking the intermediate buffer.
    pub(crate) fn release_superseded(&self, region: Arc<Region>) -> bool {
        let hook = {
            let mut state = self.state.lock();
            match &mut *state {
                DiscoveryState::Pending { stale } => {
                    debug!(
                        "Queueing superseded region of {} bytes until discovery completes",
                        region.capacity()
                    );
                    stale.push(region);
                    return false;
                }
                DiscoveryState::Resolved(None) => {
                    warn!(
                        "Leaking superseded unmanaged region of {} bytes: no release hook",
                        region.capacity()
                    );
                    return false;
                }
                DiscoveryState::Resolved(Some(hook)) => *hook,
            }
        };
        let released = region.release(&hook);
        if released {
            debug!(
                "Released superseded region of {} bytes",
                region.capacity()
            );
        }
        released
    }
}
