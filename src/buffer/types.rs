/*!
 * Buffer Types
 * Statistics types for the buffer subsystem
 */

use crate::core::types::{AllocationKind, Size};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of buffer subsystem activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferStats {
    pub allocations: u64,
    pub growths: u64,
    pub releases: u64,
    pub grow_bytes_copied: u64,
    pub default_size: Size,
    pub default_kind: AllocationKind,
}

/// Live counters shared by the policy, growth engine, and manager
#[derive(Debug, Default)]
pub(crate) struct BufferCounters {
    pub allocations: AtomicU64,
    pub growths: AtomicU64,
    pub releases: AtomicU64,
    pub grow_bytes_copied: AtomicU64,
}

impl BufferCounters {
    pub fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_growth(&self, bytes_copied: Size) {
        self.growths.fetch_add(1, Ordering::Relaxed);
        self.grow_bytes_copied
            .fetch_add(bytes_copied as u64, Ordering::Relaxed);
    }

    pub fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, default_size: Size, default_kind: AllocationKind) -> BufferStats {
        BufferStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            growths: self.growths.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            grow_bytes_copied: self.grow_bytes_copied.load(Ordering::Relaxed),
            default_size,
            default_kind,
        }
    }
}
