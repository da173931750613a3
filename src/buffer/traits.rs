/*!
 * Buffer Traits
 * Buffer subsystem abstractions
 */

use super::handle::BufferHandle;
use crate::core::types::{AllocationKind, BufferResult, Size};

/// Buffer allocation interface
pub trait Allocator: Send + Sync {
    /// Allocate a write-mode buffer of exactly `size` bytes, default kind
    fn allocate(&self, size: Size) -> BufferResult<BufferHandle>;

    /// Allocate a write-mode buffer of exactly `size` bytes and `kind`
    fn allocate_with(&self, size: Size, kind: AllocationKind) -> BufferResult<BufferHandle>;

    /// Allocate a write-mode buffer of the configured default size
    fn allocate_default(&self) -> BufferResult<BufferHandle>;

    /// Wrap pre-filled bytes as a wrap-mode buffer (limit at capacity)
    fn wrap(&self, bytes: Vec<u8>) -> BufferHandle;
}

/// Explicit release of unmanaged buffer memory
pub trait Releaser: Send + Sync {
    /// Release a handle's unmanaged backing memory
    ///
    /// Safe to call speculatively and redundantly; `false` reports every
    /// non-fatal reason the memory was not freed by this call.
    fn release(&self, handle: &BufferHandle, force: bool) -> bool;

    /// Whether hook discovery has completed (present or absent)
    fn release_hook_resolved(&self) -> bool;
}
