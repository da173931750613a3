/*!
 * IO Module
 * Persistence and stream plumbing for buffer collaborators
 */

pub mod sniff;

pub use sniff::{classify, classify_file, classify_handle, Signature};

use crate::buffer::handle::BufferHandle;
use crate::buffer::manager::BufferManager;
use crate::core::errors::BufferError;
use crate::core::types::{BufferResult, Size};
use log::debug;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Pump `input` into `output` through a default-size scratch buffer,
/// returning the number of bytes copied
pub fn copy<R: Read, W: Write>(
    manager: &BufferManager,
    input: &mut R,
    output: &mut W,
) -> BufferResult<u64> {
    let mut scratch = manager.byte_array(None);
    let mut total = 0u64;
    loop {
        let read = input
            .read(&mut scratch)
            .map_err(|err| BufferError::io("reading input stream", err))?;
        if read == 0 {
            return Ok(total);
        }
        output
            .write_all(&scratch[..read])
            .map_err(|err| BufferError::io("writing output stream", err))?;
        total += read as u64;
    }
}

/// Drain `input` into a growable buffer and return it flipped for reading
///
/// `size_hint` sizes the initial allocation; the buffer grows past it
/// transparently.
pub fn read_to_handle<R: Read>(
    manager: &BufferManager,
    input: &mut R,
    size_hint: Option<Size>,
) -> BufferResult<BufferHandle> {
    let mut handle = manager.buffer(size_hint)?;
    let mut scratch = manager.byte_array(None);
    loop {
        let read = input
            .read(&mut scratch)
            .map_err(|err| BufferError::io("reading input stream", err))?;
        if read == 0 {
            break;
        }
        manager.put(&mut handle, &scratch[..read])?;
    }
    handle.flip();
    Ok(handle)
}

/// Persist a buffer's content to `path`
///
/// The handle's content is shared, not consumed: persistence works on a
/// read-only view and can never extend the writer's buffer. Parent
/// directories are created; an existing file is replaced.
pub fn store(path: impl AsRef<Path>, handle: &BufferHandle) -> BufferResult<()> {
    let path = path.as_ref();
    let view = handle.share_content();
    let bytes = view.to_vec()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| BufferError::io(format!("creating {}", parent.display()), err))?;
    }
    fs::write(path, &bytes)
        .map_err(|err| BufferError::io(format!("storing {}", path.display()), err))?;
    debug!("Stored {} bytes at {}", bytes.len(), path.display());
    Ok(())
}

/// Persist raw bytes to `path` through a wrap-mode buffer
pub fn store_bytes(
    manager: &BufferManager,
    path: impl AsRef<Path>,
    bytes: &[u8],
) -> BufferResult<()> {
    let handle = manager.policy().wrap(bytes.to_vec());
    store(path, &handle)
}
