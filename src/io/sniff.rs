/*!
 * Signature Sniffing
 * 4-byte-prefix content classification
 */

use crate::buffer::handle::BufferHandle;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ZIP_LOCAL_HEADER: u32 = 0x504B_0304;
const ZIP_EMPTY_ARCHIVE: u32 = 0x504B_0506;
const ZIP_SPANNED_ARCHIVE: u32 = 0x504B_0708;
const JMOD_RELEASE: u32 = 0x4A4D_0100;
const JMOD_EARLY: u32 = 0x4A4D_0000;
const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Content classes recognized by their 4-byte prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Archive,
    ModuleArchive,
    CompiledClass,
}

impl Signature {
    /// Whether the content is some kind of archive
    /// (module archives count as archives)
    pub fn is_archive(self) -> bool {
        matches!(self, Signature::Archive | Signature::ModuleArchive)
    }
}

/// Classify a big-endian 4-byte prefix
pub fn classify(prefix: u32) -> Option<Signature> {
    match prefix {
        ZIP_LOCAL_HEADER | ZIP_EMPTY_ARCHIVE | ZIP_SPANNED_ARCHIVE => Some(Signature::Archive),
        JMOD_RELEASE | JMOD_EARLY => Some(Signature::ModuleArchive),
        CLASS_MAGIC => Some(Signature::CompiledClass),
        _ => None,
    }
}

/// Classify a buffer by its first 4 bytes
///
/// Reads positionally and never mutates the handle's cursors. Buffers
/// whose valid region does not extend past 4 bytes classify as `None`,
/// as does released storage.
pub fn classify_handle(handle: &BufferHandle) -> Option<Signature> {
    if handle.capacity() <= 4 || handle.limit() <= 4 {
        return None;
    }
    let mut prefix = [0u8; 4];
    handle.read_at(0, &mut prefix).ok()?;
    classify(u32::from_be_bytes(prefix))
}

/// Classify a file by its first 4 bytes
///
/// Files of 4 bytes or fewer classify as `None`.
pub fn classify_file(path: impl AsRef<Path>) -> std::io::Result<Option<Signature>> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() <= 4 {
        return Ok(None);
    }
    let mut prefix = [0u8; 4];
    file.take(4).read_exact(&mut prefix)?;
    Ok(classify(u32::from_be_bytes(prefix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_prefixes() {
        assert_eq!(classify(0x504B0304), Some(Signature::Archive));
        assert_eq!(classify(0x504B0506), Some(Signature::Archive));
        assert_eq!(classify(0x504B0708), Some(Signature::Archive));
        assert_eq!(classify(0x4A4D0100), Some(Signature::ModuleArchive));
        assert_eq!(classify(0x4A4D0000), Some(Signature::ModuleArchive));
        assert_eq!(classify(0xCAFEBABE), Some(Signature::CompiledClass));
        assert_eq!(classify(0x00000000), None);
    }

    #[test]
    fn module_archives_are_archives() {
        assert!(Signature::ModuleArchive.is_archive());
        assert!(Signature::Archive.is_archive());
        assert!(!Signature::CompiledClass.is_archive());
    }
}
