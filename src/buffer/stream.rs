/*!
 * Buffer Output Stream
 * Write adapter that grows its buffer transparently
 */

use super::growth::GrowthEngine;
use super::handle::BufferHandle;
use crate::core::errors::BufferError;
use crate::core::types::{BufferResult, Size};
use std::io;

/// Write-oriented adapter around a [`BufferHandle`]
///
/// Every write checks remaining capacity first and lets the growth engine
/// replace the backing storage when it falls short; callers never observe
/// a resize. Closing invalidates the stream; it does not release unmanaged
/// storage, which stays a separate, deliberate caller action.
pub struct BufferOutputStream {
    inner: Option<StreamInner>,
}

struct StreamInner {
    handle: BufferHandle,
    growth: GrowthEngine,
    initial_position: Size,
    initial_capacity: Size,
}

impl BufferOutputStream {
    /// Open a stream over a fresh write-mode buffer of `capacity` bytes
    pub fn new(growth: GrowthEngine, capacity: Size) -> BufferResult<Self> {
        let handle = growth.policy().allocate(capacity)?;
        Ok(Self::wrap(growth, handle))
    }

    /// Open a stream over a fresh buffer of the configured default size
    pub fn with_default_size(growth: GrowthEngine) -> BufferResult<Self> {
        let handle = growth.policy().allocate_default()?;
        Ok(Self::wrap(growth, handle))
    }

    /// Open a stream over a caller-supplied handle
    pub fn wrap(growth: GrowthEngine, handle: BufferHandle) -> Self {
        let initial_position = handle.position();
        let initial_capacity = handle.capacity();
        Self {
            inner: Some(StreamInner {
                handle,
                growth,
                initial_position,
                initial_capacity,
            }),
        }
    }

    fn inner(&self) -> BufferResult<&StreamInner> {
        self.inner.as_ref().ok_or_else(closed_error)
    }

    fn inner_mut(&mut self) -> BufferResult<&mut StreamInner> {
        self.inner.as_mut().ok_or_else(closed_error)
    }

    /// Write a single byte
    pub fn write_byte(&mut self, byte: u8) -> BufferResult<()> {
        self.write_slice(&[byte])
    }

    /// Write a byte slice, growing the buffer as needed
    pub fn write_slice(&mut self, bytes: &[u8]) -> BufferResult<()> {
        let inner = self.inner_mut()?;
        inner.growth.ensure_remaining(&mut inner.handle, bytes.len())?;
        inner.handle.put_slice(bytes)
    }

    /// Write another buffer's remaining bytes, advancing its position
    pub fn write_handle(&mut self, source: &mut BufferHandle) -> BufferResult<()> {
        let mut bytes = vec![0u8; source.remaining()];
        source.read_bytes(&mut bytes)?;
        self.write_slice(&bytes)
    }

    pub fn position(&self) -> BufferResult<Size> {
        Ok(self.inner()?.handle.position())
    }

    pub fn remaining(&self) -> BufferResult<Size> {
        Ok(self.inner()?.handle.remaining())
    }

    pub fn limit(&self) -> BufferResult<Size> {
        Ok(self.inner()?.handle.limit())
    }

    /// Capacity the stream was opened with, for diagnostics
    pub fn initial_capacity(&self) -> BufferResult<Size> {
        Ok(self.inner()?.initial_capacity)
    }

    /// Position the stream was opened at, for diagnostics
    pub fn initial_position(&self) -> BufferResult<Size> {
        Ok(self.inner()?.initial_position)
    }

    /// Seek the write cursor
    ///
    /// Seeking forward grows the buffer if the target lies past its
    /// capacity; seeking backward never truncates the limit.
    pub fn set_position(&mut self, position: Size) -> BufferResult<()> {
        let inner = self.inner_mut()?;
        let required = position.saturating_sub(inner.handle.position());
        inner.growth.ensure_remaining(&mut inner.handle, required)?;
        inner.handle.seek(position)
    }

    /// Read-only view over what has been written, without copying
    ///
    /// Exposes exactly `[0, position)` once the stream has been written
    /// into, or the raw backing region of an untouched stream.
    pub fn to_shared_view(&self) -> BufferResult<BufferHandle> {
        Ok(self.inner()?.handle.share_content())
    }

    /// Flat owned copy of what has been written
    pub fn to_byte_array(&self) -> BufferResult<Vec<u8>> {
        self.inner()?.handle.to_vec()
    }

    /// Give up the stream and take its buffer
    pub fn into_handle(mut self) -> BufferResult<BufferHandle> {
        self.inner
            .take()
            .map(|inner| inner.handle)
            .ok_or_else(closed_error)
    }

    /// Close the stream; every later operation fails with `InvalidState`
    ///
    /// The owned handle is dropped. Unmanaged storage is not released
    /// here; explicit release remains the caller's decision.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

fn closed_error() -> BufferError {
    BufferError::InvalidState("stream is closed".into())
}

impl io::Write for BufferOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_slice(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error().into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for BufferOutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.inner {
            Some(inner) => f
                .debug_struct("BufferOutputStream")
                .field("position", &inner.handle.position())
                .field("capacity", &inner.handle.capacity())
                .field("initial_capacity", &inner.initial_capacity)
                .finish(),
            None => f
                .debug_struct("BufferOutputStream")
                .field("state", &"closed")
                .finish(),
        }
    }
}
