/*!
 * Buffer Handle
 * Cursor state over a contiguous byte region
 */

use super::storage::Region;
use crate::core::errors::BufferError;
use crate::core::types::{AllocationKind, BufferResult, Size};
use std::sync::Arc;

/// A contiguous byte region plus cursor state
///
/// Invariant: `position <= limit <= capacity` after every operation.
/// A handle normally owns its storage exclusively; [`share_content`]
/// produces the one sanctioned exception, a read-only view aliasing the
/// same region with independent cursors.
///
/// [`share_content`]: BufferHandle::share_content
pub struct BufferHandle {
    region: Arc<Region>,
    position: Size,
    limit: Size,
    view: bool,
}

impl BufferHandle {
    /// Write-mode handle: nothing written yet, limit starts at zero
    pub(crate) fn new_write(region: Arc<Region>) -> Self {
        Self {
            region,
            position: 0,
            limit: 0,
            view: false,
        }
    }

    /// Wrap-mode handle: pre-filled region, limit starts at capacity
    pub(crate) fn new_wrap(region: Arc<Region>) -> Self {
        let limit = region.capacity();
        Self {
            region,
            position: 0,
            limit,
            view: false,
        }
    }

    pub(crate) fn region(&self) -> &Arc<Region> {
        &self.region
    }

    pub(crate) fn into_region(self) -> Arc<Region> {
        self.region
    }

    pub fn capacity(&self) -> Size {
        self.region.capacity()
    }

    pub fn position(&self) -> Size {
        self.position
    }

    pub fn limit(&self) -> Size {
        self.limit
    }

    /// Bytes left between position and limit
    pub fn remaining(&self) -> Size {
        self.limit - self.position
    }

    pub fn kind(&self) -> AllocationKind {
        self.region.kind()
    }

    /// Whether this handle is a read-only view over shared storage
    pub fn is_view(&self) -> bool {
        self.view
    }

    /// Whether the backing storage has been released
    pub fn is_released(&self) -> bool {
        self.region.is_released()
    }

    /// Move the cursor; the new position must not pass the limit
    pub fn set_position(&mut self, position: Size) -> BufferResult<()> {
        if position > self.limit {
            return Err(BufferError::InvalidState(format!(
                "position {} exceeds limit {}",
                position, self.limit
            )));
        }
        self.position = position;
        Ok(())
    }

    /// Move the limit; the position is pulled back if it would pass it
    pub fn set_limit(&mut self, limit: Size) -> BufferResult<()> {
        if limit > self.capacity() {
            return Err(BufferError::InvalidState(format!(
                "limit {} exceeds capacity {}",
                limit,
                self.capacity()
            )));
        }
        self.limit = limit;
        self.position = self.position.min(limit);
        Ok(())
    }

    /// Flip for reading: limit becomes the current position, position resets
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Seek used by the output stream: may extend the limit forward but
    /// never truncates it when moving backward
    pub(crate) fn seek(&mut self, position: Size) -> BufferResult<()> {
        if position > self.capacity() {
            return Err(BufferError::CapacityOverflow {
                current: self.capacity(),
                required: position - self.capacity(),
            });
        }
        self.position = position;
        self.limit = self.limit.max(position);
        Ok(())
    }

    /// Copy `src` at the current position and advance it
    ///
    /// The handle must have room; callers that want transparent growth go
    /// through `GrowthEngine::ensure_remaining` first.
    pub fn put_slice(&mut self, src: &[u8]) -> BufferResult<()> {
        if self.view {
            return Err(BufferError::InvalidState(
                "cannot write through a shared view".into(),
            ));
        }
        let end = self
            .position
            .checked_add(src.len())
            .ok_or(BufferError::CapacityOverflow {
                current: self.capacity(),
                required: src.len(),
            })?;
        if end > self.capacity() {
            return Err(BufferError::CapacityOverflow {
                current: self.capacity(),
                required: end - self.capacity(),
            });
        }
        self.region.write_at(self.position, src)?;
        self.position = end;
        self.limit = self.limit.max(end);
        Ok(())
    }

    /// Read up to `dst.len()` bytes at the current position, advancing it;
    /// returns the number of bytes read
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> BufferResult<Size> {
        let len = dst.len().min(self.remaining());
        self.region.read_at(self.position, &mut dst[..len])?;
        self.position += len;
        Ok(len)
    }

    /// Positional read that never mutates cursors
    ///
    /// Supports random byte-range inspection such as signature sniffing.
    pub fn read_at(&self, offset: Size, dst: &mut [u8]) -> BufferResult<()> {
        self.region.read_at(offset, dst)
    }

    /// Produce a read-only view aliasing this handle's storage
    ///
    /// If the handle has been written into (`position > 0`) the view is
    /// flipped to expose exactly `[0, position)`; sharing an existing view
    /// preserves its window, and an untouched write-mode handle exposes
    /// the raw backing region. No bytes are copied.
    pub fn share_content(&self) -> BufferHandle {
        let limit = if self.position > 0 {
            self.position
        } else if self.limit > 0 {
            self.limit
        } else {
            self.capacity()
        };
        BufferHandle {
            region: Arc::clone(&self.region),
            position: 0,
            limit,
            view: true,
        }
    }

    /// Materialize the shared-view window into a freshly owned copy
    pub fn to_vec(&self) -> BufferResult<Vec<u8>> {
        let shared = self.share_content();
        self.region.copy_to_vec(shared.position, shared.remaining())
    }
}

impl std::fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("BufferHandle")
            .field("kind", &self.kind())
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .field("view", &self.view)
            .finish()
    }
}
