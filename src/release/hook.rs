/*!
 * Release Hook
 * Platform free mechanism for unmanaged regions
 */

use crate::core::types::Size;
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// The discovered mechanism that frees an unmanaged region's backing memory
///
/// Resolved at most once per registry by a background probe; absent on
/// platforms where the allocator cannot hand raw regions back.
#[derive(Clone, Copy)]
pub struct ReleaseHook {
    free_fn: unsafe fn(NonNull<u8>, Size),
}

impl ReleaseHook {
    /// Free a region previously produced by `alloc_unmanaged`
    ///
    /// # Safety
    ///
    /// `ptr` must come from `alloc_unmanaged(capacity)` with the same
    /// `capacity`, and must not be freed twice. The region state machine
    /// in `buffer::storage` enforces both.
    pub(crate) unsafe fn free(&self, ptr: NonNull<u8>, capacity: Size) {
        (self.free_fn)(ptr, capacity)
    }
}

impl std::fmt::Debug for ReleaseHook {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ReleaseHook").finish_non_exhaustive()
    }
}

/// Allocate a zeroed unmanaged region from the global allocator
///
/// Returns `None` on allocation failure. `capacity` must be positive.
pub(crate) fn alloc_unmanaged(capacity: Size) -> Option<NonNull<u8>> {
    let layout = region_layout(capacity)?;
    // Zeroed to match the managed path; callers may read before writing.
    NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
}

/// Probe for the platform release mechanism
///
/// The probe does a trial allocation round trip through the global
/// allocator; if that works, freeing through it is the release mechanism.
pub(crate) fn discover() -> Option<ReleaseHook> {
    const PROBE_SIZE: Size = 16;
    let ptr = alloc_unmanaged(PROBE_SIZE)?;
    unsafe { global_free(ptr, PROBE_SIZE) };
    Some(ReleaseHook {
        free_fn: global_free,
    })
}

fn region_layout(capacity: Size) -> Option<Layout> {
    Layout::array::<u8>(capacity).ok()
}

unsafe fn global_free(ptr: NonNull<u8>, capacity: Size) {
    if let Some(layout) = region_layout(capacity) {
        alloc::dealloc(ptr.as_ptr(), layout);
    }
}
