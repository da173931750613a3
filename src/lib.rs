/*!
 * growbuf
 * Growable byte buffers over managed or unmanaged memory, with
 * transparent growth and explicit, idempotent release
 */

pub mod buffer;
pub mod config;
pub mod core;
pub mod io;
pub mod release;

// Re-exports
pub use buffer::{
    AllocationPolicy, Allocator, BufferHandle, BufferManager, BufferOutputStream, BufferStats,
    GrowthEngine, Releaser, GROWTH_FACTOR,
};
pub use config::{BufferConfig, KEY_ALLOCATION_MODE, KEY_DEFAULT_SIZE};
pub use crate::core::{AllocationKind, BufferError, BufferResult, Size};
pub use io::Signature;
pub use release::{DeallocationHookRegistry, ReleaseHook};
