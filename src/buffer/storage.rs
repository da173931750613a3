/*!
 * Buffer Storage
 * Refcounted backing regions with release gating
 */

use crate::core::errors::BufferError;
use crate::core::types::{AllocationKind, BufferResult, Size};
use crate::release::hook::{self, ReleaseHook};
use parking_lot::RwLock;
use std::ptr::NonNull;
use std::sync::Arc;

/// One physical allocation, shared by an owner handle and its views
///
/// All aliases of the same storage hold the same `Arc<Region>`, so marking
/// the region released covers the whole alias chain in one state change.
/// Access after release is gated and surfaces `InvalidState`.
pub(crate) struct Region {
    kind: AllocationKind,
    capacity: Size,
    state: RwLock<RegionState>,
}

enum RegionState {
    Managed(Box<[u8]>),
    Unmanaged(NonNull<u8>),
    Released,
}

// The raw pointer is uniquely owned by the region and only dereferenced
// under the state lock.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Allocate a zeroed managed region
    pub(crate) fn managed(capacity: Size) -> BufferResult<Arc<Self>> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity).map_err(|_| {
            BufferError::AllocationFailure {
                requested: capacity,
                kind: AllocationKind::Managed,
            }
        })?;
        bytes.resize(capacity, 0);
        Ok(Arc::new(Self {
            kind: AllocationKind::Managed,
            capacity,
            state: RwLock::new(RegionState::Managed(bytes.into_boxed_slice())),
        }))
    }

    /// Allocate a zeroed unmanaged region from the global allocator
    pub(crate) fn unmanaged(capacity: Size) -> BufferResult<Arc<Self>> {
        let ptr = hook::alloc_unmanaged(capacity).ok_or(BufferError::AllocationFailure {
            requested: capacity,
            kind: AllocationKind::Unmanaged,
        })?;
        Ok(Arc::new(Self {
            kind: AllocationKind::Unmanaged,
            capacity,
            state: RwLock::new(RegionState::Unmanaged(ptr)),
        }))
    }

    /// Wrap pre-filled bytes as a managed region
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Arc<Self> {
        let capacity = bytes.len();
        Arc::new(Self {
            kind: AllocationKind::Managed,
            capacity,
            state: RwLock::new(RegionState::Managed(bytes.into_boxed_slice())),
        })
    }

    pub(crate) fn kind(&self) -> AllocationKind {
        self.kind
    }

    pub(crate) fn capacity(&self) -> Size {
        self.capacity
    }

    pub(crate) fn is_released(&self) -> bool {
        matches!(*self.state.read(), RegionState::Released)
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`
    pub(crate) fn read_at(&self, offset: Size, dst: &mut [u8]) -> BufferResult<()> {
        let len = dst.len();
        self.with_bytes(offset, len, |src| dst.copy_from_slice(src))
    }

    /// Copy `src` into the region starting at `offset`
    pub(crate) fn write_at(&self, offset: Size, src: &[u8]) -> BufferResult<()> {
        self.check_bounds(offset, src.len())?;
        let mut state = self.state.write();
        match &mut *state {
            RegionState::Managed(bytes) => {
                bytes[offset..offset + src.len()].copy_from_slice(src);
                Ok(())
            }
            RegionState::Unmanaged(ptr) => {
                // Bounds checked above; pointer is live while the lock is held.
                unsafe {
                    std::ptr::copy_nonoverlapping(
                        src.as_ptr(),
                        ptr.as_ptr().add(offset),
                        src.len(),
                    );
                }
                Ok(())
            }
            RegionState::Released => Err(released_error()),
        }
    }

    /// Copy the first `len` bytes into a fresh vector
    pub(crate) fn copy_to_vec(&self, offset: Size, len: Size) -> BufferResult<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_at(offset, &mut out)?;
        Ok(out)
    }

    /// Copy the first `len` bytes into the start of `dst`
    ///
    /// Used by the growth path; `dst` is always a distinct, freshly
    /// allocated region.
    pub(crate) fn copy_range_to(&self, dst: &Region, len: Size) -> BufferResult<()> {
        self.with_bytes(0, len, |src| dst.write_at(0, src))?
    }

    /// Free the backing memory through the hook and mark the chain released
    ///
    /// Returns `false` when the region was already released (the address is
    /// already gone) or is managed. Marking and freeing happen under the
    /// same write lock, so no alias can observe a half-released chain.
    pub(crate) fn release(&self, hook: &ReleaseHook) -> bool {
        let mut state = self.state.write();
        match *state {
            RegionState::Unmanaged(ptr) => {
                unsafe { hook.free(ptr, self.capacity) };
                *state = RegionState::Released;
                true
            }
            _ => false,
        }
    }

    fn with_bytes<R>(
        &self,
        offset: Size,
        len: Size,
        f: impl FnOnce(&[u8]) -> R,
    ) -> BufferResult<R> {
        self.check_bounds(offset, len)?;
        let state = self.state.read();
        match &*state {
            RegionState::Managed(bytes) => Ok(f(&bytes[offset..offset + len])),
            RegionState::Unmanaged(ptr) => {
                // Bounds checked above; pointer is live while the lock is held.
                let slice =
                    unsafe { std::slice::from_raw_parts(ptr.as_ptr().add(offset), len) };
                Ok(f(slice))
            }
            RegionState::Released => Err(released_error()),
        }
    }

    fn check_bounds(&self, offset: Size, len: Size) -> BufferResult<()> {
        let end = offset
            .checked_add(len)
            .ok_or(BufferError::CapacityOverflow {
                current: self.capacity,
                required: len,
            })?;
        if end > self.capacity {
            return Err(BufferError::CapacityOverflow {
                current: self.capacity,
                required: end - self.capacity,
            });
        }
        Ok(())
    }
}

// Dropping an unreleased unmanaged region leaks its memory: release must
// stay an explicit caller action and never run as a drop side effect.
impl Drop for Region {
    fn drop(&mut self) {
        if let RegionState::Unmanaged(_) = *self.state.get_mut() {
            log::debug!(
                "Dropping unreleased unmanaged region of {} bytes (leaked until process exit)",
                self.capacity
            );
        }
    }
}

fn released_error() -> BufferError {
    BufferError::InvalidState("storage has been released".into())
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("kind", &self.kind)
            .field("capacity", &self.capacity)
            .field("released", &self.is_released())
            .finish()
    }
}
