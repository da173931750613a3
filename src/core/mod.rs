/*!
 * Core Module
 * Shared types and error handling
 */

pub mod errors;
pub mod types;

pub use errors::BufferError;
pub use types::{AllocationKind, BufferResult, Size, MAX_CAPACITY};
