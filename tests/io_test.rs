/*!
 * IO Tests
 * Persistence, stream pumping, and signature sniffing
 */

use growbuf::io::{self, Signature};
use growbuf::{AllocationKind, Allocator, BufferConfig, BufferManager};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

fn small_manager() -> BufferManager {
    // A tiny default size forces the growth path in the pump tests.
    BufferManager::new(BufferConfig {
        default_size: 16,
        default_kind: AllocationKind::Managed,
    })
}

#[test]
fn store_writes_the_shared_view_and_creates_parents() {
    let manager = BufferManager::with_defaults();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/dir/out.bin");

    let mut handle = manager.allocate(64).unwrap();
    handle.put_slice(b"persisted bytes").unwrap();
    io::store(&path, &handle).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"persisted bytes");
    // The writer's buffer is untouched by persistence.
    assert_eq!(handle.position(), 15);
}

#[test]
fn store_replaces_an_existing_file() {
    let manager = BufferManager::with_defaults();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.bin");

    io::store_bytes(&manager, &path, b"first, longer content").unwrap();
    io::store_bytes(&manager, &path, b"second").unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"second");
}

#[test]
fn read_to_handle_grows_past_the_size_hint() {
    let manager = small_manager();
    let payload: Vec<u8> = (0..200u8).collect();
    let mut input = Cursor::new(payload.clone());

    let handle = io::read_to_handle(&manager, &mut input, None).unwrap();

    assert_eq!(handle.position(), 0);
    assert_eq!(handle.remaining(), 200);
    assert_eq!(handle.to_vec().unwrap(), payload);
}

#[test]
fn copy_pumps_everything_through_the_scratch_buffer() {
    let manager = small_manager();
    let payload = vec![0x5Au8; 1000];
    let mut input = Cursor::new(payload.clone());
    let mut output = Vec::new();

    let copied = io::copy(&manager, &mut input, &mut output).unwrap();

    assert_eq!(copied, 1000);
    assert_eq!(output, payload);
}

#[test]
fn classifies_buffers_by_their_prefix() {
    let manager = BufferManager::with_defaults();

    let zip = manager.wrap(vec![0x50, 0x4B, 0x03, 0x04, 0, 0, 0, 0]);
    assert_eq!(io::classify_handle(&zip), Some(Signature::Archive));

    let class = manager.wrap(vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0]);
    assert_eq!(io::classify_handle(&class), Some(Signature::CompiledClass));

    let jmod = manager.wrap(vec![0x4A, 0x4D, 0x01, 0x00, 0]);
    assert_eq!(io::classify_handle(&jmod), Some(Signature::ModuleArchive));

    let noise = manager.wrap(vec![1, 2, 3, 4, 5]);
    assert_eq!(io::classify_handle(&noise), None);
}

#[test]
fn sniffing_never_moves_the_cursor() {
    let manager = BufferManager::with_defaults();
    let mut handle = manager.wrap(vec![0x50, 0x4B, 0x03, 0x04, 9, 9, 9, 9]);
    handle.set_position(2).unwrap();

    io::classify_handle(&handle);

    assert_eq!(handle.position(), 2);
}

#[test]
fn short_content_classifies_as_none() {
    let manager = BufferManager::with_defaults();
    let exactly_four = manager.wrap(vec![0x50, 0x4B, 0x03, 0x04]);
    assert_eq!(io::classify_handle(&exactly_four), None);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("short.bin");
    fs::write(&path, [0xCA, 0xFE]).unwrap();
    assert_eq!(io::classify_file(&path).unwrap(), None);
}

#[test]
fn classifies_files_by_their_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("archive.zip");
    fs::write(&path, [0x50, 0x4B, 0x03, 0x04, 0, 0, 0, 0]).unwrap();

    assert_eq!(
        io::classify_file(&path).unwrap(),
        Some(Signature::Archive)
    );
}
