/*!
 * Release Module
 * Explicit deallocation of unmanaged buffer memory
 */

pub(crate) mod hook;
pub mod registry;

pub use hook::ReleaseHook;
pub use registry::DeallocationHookRegistry;
