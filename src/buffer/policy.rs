/*!
 * Allocation Policy
 * Produces buffer handles per the configured defaults
 */

use super::handle::BufferHandle;
use super::storage::Region;
use super::types::{BufferCounters, BufferStats};
use crate::config::BufferConfig;
use crate::core::errors::BufferError;
use crate::core::types::{AllocationKind, BufferResult, Size};
use arc_swap::ArcSwap;
use log::{debug, info};
use std::sync::Arc;

/// Process-wide allocation defaults and the allocation entry point
///
/// The configuration is swapped atomically on hot reload; handles that
/// already exist keep the storage they were allocated with.
pub struct AllocationPolicy {
    config: ArcSwap<BufferConfig>,
    counters: Arc<BufferCounters>,
}

impl AllocationPolicy {
    pub fn new(config: BufferConfig) -> Self {
        info!(
            "Allocation policy initialized: default size {} bytes, default mode {}",
            config.default_size, config.default_kind
        );
        Self {
            config: ArcSwap::from_pointee(config),
            counters: Arc::new(BufferCounters::default()),
        }
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<BufferConfig> {
        self.config.load_full()
    }

    pub fn default_size(&self) -> Size {
        self.config.load().default_size
    }

    pub fn default_kind(&self) -> AllocationKind {
        self.config.load().default_kind
    }

    /// Replace the configuration (hot reload)
    ///
    /// Only future allocations observe the new defaults.
    pub fn update(&self, config: BufferConfig) {
        info!(
            "Allocation policy reconfigured: default size {} bytes, default mode {}",
            config.default_size, config.default_kind
        );
        self.config.store(Arc::new(config));
    }

    /// Allocate a write-mode buffer of exactly `size` bytes, default kind
    pub fn allocate(&self, size: Size) -> BufferResult<BufferHandle> {
        self.allocate_with(size, self.default_kind())
    }

    /// Allocate a write-mode buffer of exactly `size` bytes and `kind`
    pub fn allocate_with(&self, size: Size, kind: AllocationKind) -> BufferResult<BufferHandle> {
        if size == 0 {
            return Err(BufferError::InvalidSize(size));
        }
        let region = match kind {
            AllocationKind::Managed => Region::managed(size)?,
            AllocationKind::Unmanaged => Region::unmanaged(size)?,
        };
        self.counters.record_allocation();
        debug!("Allocated {} bytes of {} memory", size, kind);
        Ok(BufferHandle::new_write(region))
    }

    /// Allocate a write-mode buffer of the configured default size
    pub fn allocate_default(&self) -> BufferResult<BufferHandle> {
        self.allocate(self.default_size())
    }

    /// Allocate `size` if given, otherwise the configured default
    pub fn allocate_or_default(&self, size: Option<Size>) -> BufferResult<BufferHandle> {
        match size {
            Some(size) => self.allocate(size),
            None => self.allocate_default(),
        }
    }

    /// Wrap pre-filled bytes as a managed wrap-mode buffer
    /// (position 0, limit at capacity)
    pub fn wrap(&self, bytes: Vec<u8>) -> BufferHandle {
        self.counters.record_allocation();
        BufferHandle::new_wrap(Region::from_bytes(bytes))
    }

    pub(crate) fn counters(&self) -> &Arc<BufferCounters> {
        &self.counters
    }

    pub fn stats(&self) -> BufferStats {
        let config = self.config.load();
        self.counters
            .snapshot(config.default_size, config.default_kind)
    }
}

impl super::traits::Allocator for AllocationPolicy {
    fn allocate(&self, size: Size) -> BufferResult<BufferHandle> {
        AllocationPolicy::allocate(self, size)
    }

    fn allocate_with(&self, size: Size, kind: AllocationKind) -> BufferResult<BufferHandle> {
        AllocationPolicy::allocate_with(self, size, kind)
    }

    fn allocate_default(&self) -> BufferResult<BufferHandle> {
        AllocationPolicy::allocate_default(self)
    }

    fn wrap(&self, bytes: Vec<u8>) -> BufferHandle {
        AllocationPolicy::wrap(self, bytes)
    }
}
