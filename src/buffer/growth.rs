/*!
 * Growth Engine
 * Transparent buffer replacement on overflow
 */

use super::handle::BufferHandle;
use super::policy::AllocationPolicy;
use crate::core::errors::BufferError;
use crate::core::types::{AllocationKind, BufferResult, Size, MAX_CAPACITY};
use crate::release::registry::DeallocationHookRegistry;
use log::debug;
use std::sync::Arc;

/// Multiplicative overallocation ratio applied when a buffer must grow
///
/// Amortizes repeated small appends to sub-linear total copy cost.
pub const GROWTH_FACTOR: f64 = 1.1;

/// Grows buffers in place of their handles
///
/// Holds no mutable state; the outcome is a pure function of the current
/// handle, the required bytes, and the growth factor.
#[derive(Clone)]
pub struct GrowthEngine {
    policy: Arc<AllocationPolicy>,
    registry: Arc<DeallocationHookRegistry>,
}

impl GrowthEngine {
    pub fn new(policy: Arc<AllocationPolicy>, registry: Arc<DeallocationHookRegistry>) -> Self {
        Self { policy, registry }
    }

    pub(crate) fn policy(&self) -> &Arc<AllocationPolicy> {
        &self.policy
    }

    /// Make sure `handle` can absorb `required` more bytes at its position
    ///
    /// Replaces the handle's storage when `capacity - position` falls
    /// short: the new capacity is
    /// `max(capacity * GROWTH_FACTOR, position + required)`, bytes
    /// `[0, position)` are copied over, the position is preserved, and the
    /// full new capacity becomes writable (`limit = capacity`). Returns
    /// whether the storage was replaced.
    ///
    /// A superseded unmanaged region is released through the hook registry
    /// so intermediate buffers do not leak; if hook discovery is still
    /// running the region is queued for release on completion.
    pub fn ensure_remaining(
        &self,
        handle: &mut BufferHandle,
        required: Size,
    ) -> BufferResult<bool> {
        if required == 0 {
            return Ok(false);
        }
        if handle.capacity() - handle.position() >= required {
            return Ok(false);
        }
        // A view must never be writable, and growing one would replace it
        // with a fresh owning handle and release the storage the real
        // owner still aliases. Reject before allocating or releasing.
        if handle.is_view() {
            return Err(BufferError::InvalidState(
                "cannot grow a shared view".into(),
            ));
        }
        *handle = self.grow(handle, required)?;
        Ok(true)
    }

    fn grow(&self, old: &BufferHandle, required: Size) -> BufferResult<BufferHandle> {
        let capacity = old.capacity();
        let position = old.position();
        let needed = position
            .checked_add(required)
            .ok_or(BufferError::CapacityOverflow {
                current: capacity,
                required,
            })?;
        let scaled = (capacity as f64 * GROWTH_FACTOR) as u128;
        let target = scaled.max(needed as u128);
        if target > MAX_CAPACITY as u128 {
            return Err(BufferError::CapacityOverflow {
                current: capacity,
                required,
            });
        }
        let target = target as Size;

        let mut grown = self.policy.allocate_with(target, old.kind())?;
        old.region().copy_range_to(grown.region(), position)?;
        grown.set_limit(target)?;
        grown.set_position(position)?;

        self.policy.counters().record_growth(position);
        debug!(
            "Grew {} buffer from {} to {} bytes ({} live bytes copied)",
            old.kind(),
            capacity,
            target,
            position
        );

        if old.kind() == AllocationKind::Unmanaged && !old.is_released() {
            self.registry.release_superseded(Arc::clone(old.region()));
        }
        Ok(grown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;

    fn engine() -> GrowthEngine {
        GrowthEngine::new(
            Arc::new(AllocationPolicy::new(BufferConfig::default())),
            DeallocationHookRegistry::start(),
        )
    }

    #[test]
    fn grows_by_factor_when_scaled_capacity_wins() {
        let engine = engine();
        let mut handle = engine.policy().allocate(1000).unwrap();
        handle.put_slice(&[7u8; 1000]).unwrap();
        assert!(engine.ensure_remaining(&mut handle, 50).unwrap());
        // max(1000 * 1.1, 1000 + 50) = 1100
        assert_eq!(handle.capacity(), 1100);
        assert_eq!(handle.position(), 1000);
        assert_eq!(handle.limit(), 1100);
    }

    #[test]
    fn grows_to_requirement_when_it_exceeds_the_factor() {
        let engine = engine();
        let mut handle = engine.policy().allocate(100).unwrap();
        handle.put_slice(&[1u8; 100]).unwrap();
        assert!(engine.ensure_remaining(&mut handle, 500).unwrap());
        assert_eq!(handle.capacity(), 600);
    }

    #[test]
    fn zero_required_bytes_is_a_no_op() {
        let engine = engine();
        let mut handle = engine.policy().allocate(8).unwrap();
        assert!(!engine.ensure_remaining(&mut handle, 0).unwrap());
        assert_eq!(handle.capacity(), 8);
    }

    #[test]
    fn overflowing_growth_target_is_fatal() {
        let engine = engine();
        let mut handle = engine.policy().allocate(16).unwrap();
        let err = engine.ensure_remaining(&mut handle, usize::MAX).unwrap_err();
        assert!(matches!(err, BufferError::CapacityOverflow { .. }));
    }
}
