/*!
 * Core Types
 * Common types used across the buffer subsystem
 */

use serde::{Deserialize, Serialize};

/// Size type for capacities and cursors
pub type Size = usize;

/// Common result type for buffer operations
pub type BufferResult<T> = Result<T, super::errors::BufferError>;

/// Largest capacity a single buffer may reach
pub const MAX_CAPACITY: Size = isize::MAX as Size;

/// Where a buffer's backing memory comes from
///
/// Managed memory is reclaimed when the last handle over it drops.
/// Unmanaged memory is only ever freed through the discovered release
/// hook; dropping the last handle without releasing leaks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationKind {
    Managed,
    Unmanaged,
}

impl std::fmt::Display for AllocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AllocationKind::Managed => write!(f, "managed"),
            AllocationKind::Unmanaged => write!(f, "unmanaged"),
        }
    }
}
