/*!
 * Buffer Manager
 * Facade tying allocation, growth, and release together
 */

use super::growth::GrowthEngine;
use super::handle::BufferHandle;
use super::policy::AllocationPolicy;
use super::stream::BufferOutputStream;
use super::traits::{Allocator, Releaser};
use super::types::BufferStats;
use crate::config::BufferConfig;
use crate::core::types::{AllocationKind, BufferResult, Size};
use crate::release::registry::DeallocationHookRegistry;
use std::sync::Arc;

/// Entry point for the buffer subsystem
///
/// Owns the allocation policy, the growth engine, and the deallocation
/// hook registry; hook discovery starts in the background as soon as the
/// manager is created.
pub struct BufferManager {
    policy: Arc<AllocationPolicy>,
    registry: Arc<DeallocationHookRegistry>,
    growth: GrowthEngine,
}

impl BufferManager {
    pub fn new(config: BufferConfig) -> Self {
        let policy = Arc::new(AllocationPolicy::new(config));
        let registry = DeallocationHookRegistry::start();
        let growth = GrowthEngine::new(Arc::clone(&policy), Arc::clone(&registry));
        Self {
            policy,
            registry,
            growth,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BufferConfig::default())
    }

    pub fn policy(&self) -> &Arc<AllocationPolicy> {
        &self.policy
    }

    pub fn registry(&self) -> &Arc<DeallocationHookRegistry> {
        &self.registry
    }

    pub fn growth(&self) -> &GrowthEngine {
        &self.growth
    }

    /// Replace the configuration; existing handles are unaffected
    pub fn update_config(&self, config: BufferConfig) {
        self.policy.update(config);
    }

    /// Re-parse configuration entries and swap them in
    ///
    /// A malformed value fails the reload and leaves the previous
    /// settings in effect.
    pub fn reload_from_entries<'a, I>(&self, entries: I) -> BufferResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let config = BufferConfig::from_entries(entries)?;
        self.policy.update(config);
        Ok(())
    }

    /// Allocate `size` if given, otherwise the configured default
    pub fn buffer(&self, size: Option<Size>) -> BufferResult<BufferHandle> {
        self.policy.allocate_or_default(size)
    }

    /// Open an output stream over a fresh buffer of `capacity` bytes
    pub fn stream(&self, capacity: Size) -> BufferResult<BufferOutputStream> {
        BufferOutputStream::new(self.growth.clone(), capacity)
    }

    /// Open an output stream over a fresh default-size buffer
    pub fn stream_with_default_size(&self) -> BufferResult<BufferOutputStream> {
        BufferOutputStream::with_default_size(self.growth.clone())
    }

    /// Open an output stream over a caller-supplied handle
    pub fn stream_for(&self, handle: BufferHandle) -> BufferOutputStream {
        BufferOutputStream::wrap(self.growth.clone(), handle)
    }

    /// Zeroed scratch byte array of `size`, or the configured default
    pub fn byte_array(&self, size: Option<Size>) -> Vec<u8> {
        vec![0u8; size.unwrap_or_else(|| self.policy.default_size())]
    }

    /// Write `bytes` at the handle's position, growing it as needed
    pub fn put(&self, handle: &mut BufferHandle, bytes: &[u8]) -> BufferResult<()> {
        self.growth.ensure_remaining(handle, bytes.len())?;
        handle.put_slice(bytes)
    }

    /// Make sure `handle` can absorb `required` more bytes, growing it
    /// in place when needed; returns whether the storage was replaced
    pub fn ensure_remaining(
        &self,
        handle: &mut BufferHandle,
        required: Size,
    ) -> BufferResult<bool> {
        self.growth.ensure_remaining(handle, required)
    }

    pub fn stats(&self) -> BufferStats {
        self.policy.stats()
    }
}

impl Allocator for BufferManager {
    fn allocate(&self, size: Size) -> BufferResult<BufferHandle> {
        self.policy.allocate(size)
    }

    fn allocate_with(&self, size: Size, kind: AllocationKind) -> BufferResult<BufferHandle> {
        self.policy.allocate_with(size, kind)
    }

    fn allocate_default(&self) -> BufferResult<BufferHandle> {
        self.policy.allocate_default()
    }

    fn wrap(&self, bytes: Vec<u8>) -> BufferHandle {
        self.policy.wrap(bytes)
    }
}

impl Releaser for BufferManager {
    fn release(&self, handle: &BufferHandle, force: bool) -> bool {
        let released = self.registry.release(handle, force);
        if released {
            self.policy.counters().record_release();
        }
        released
    }

    fn release_hook_resolved(&self) -> bool {
        self.registry.is_resolved()
    }
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}
