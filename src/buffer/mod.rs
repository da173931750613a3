/*!
 * Buffer Module
 * Buffer handles, allocation, growth, and streaming
 */

pub mod growth;
pub mod handle;
pub mod manager;
pub mod policy;
pub(crate) mod storage;
pub mod stream;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use growth::{GrowthEngine, GROWTH_FACTOR};
pub use handle::BufferHandle;
pub use manager::BufferManager;
pub use policy::AllocationPolicy;
pub use stream::BufferOutputStream;
pub use traits::*;
pub use types::BufferStats;
