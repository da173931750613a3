/*!
 * Release Tests
 * Hook discovery, idempotent release, and alias-chain semantics
 */

use growbuf::{AllocationKind, Allocator, BufferManager, Releaser};
use std::sync::Arc;
use std::thread;

fn manager() -> BufferManager {
    BufferManager::with_defaults()
}

#[test]
fn release_on_managed_handles_always_reports_false() {
    let manager = manager();
    let handle = manager.allocate_with(32, AllocationKind::Managed).unwrap();

    assert!(!manager.release(&handle, false));
    assert!(!manager.release(&handle, true));
    assert!(!handle.is_released());
}

#[test]
fn release_is_idempotent() {
    let manager = manager();
    let handle = manager
        .allocate_with(32, AllocationKind::Unmanaged)
        .unwrap();

    assert!(manager.release(&handle, false));
    assert!(!manager.release(&handle, false));
    assert!(!manager.release(&handle, true));
    assert!(handle.is_released());
}

#[test]
fn released_storage_is_gated() {
    let manager = manager();
    let mut handle = manager
        .allocate_with(16, AllocationKind::Unmanaged)
        .unwrap();
    handle.put_slice(b"gone").unwrap();

    assert!(manager.release(&handle, false));

    assert!(handle.put_slice(b"x").is_err());
    assert!(handle.to_vec().is_err());
    let mut probe = [0u8; 1];
    assert!(handle.read_at(0, &mut probe).is_err());
}

#[test]
fn views_need_force_to_release_the_chain() {
    let manager = manager();
    let mut handle = manager
        .allocate_with(16, AllocationKind::Unmanaged)
        .unwrap();
    handle.put_slice(b"shared").unwrap();
    let view = handle.share_content();

    // A view owns no release point of its own.
    assert!(!manager.release(&view, false));
    assert!(!view.is_released());

    // Forced release frees the shared storage and gates every alias.
    assert!(manager.release(&view, true));
    assert!(view.is_released());
    assert!(handle.is_released());
    assert!(!manager.release(&handle, false));
}

#[test]
fn release_counts_into_stats() {
    let manager = manager();
    let handle = manager
        .allocate_with(8, AllocationKind::Unmanaged)
        .unwrap();
    manager.release(&handle, false);
    manager.release(&handle, false);

    assert_eq!(manager.stats().releases, 1);
}

#[test]
fn waiters_block_until_discovery_completes_and_agree() {
    let manager = Arc::new(manager());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.registry().resolve().is_some())
        })
        .collect();

    let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(manager.release_hook_resolved());
    // Every waiter observed the same resolved hook state.
    let first = outcomes[0];
    assert!(outcomes.iter().all(|&o| o == first));
}

#[test]
fn releases_before_discovery_completes_block_then_succeed() {
    // A freshly started registry may still be discovering; release must
    // wait for the barrier rather than fail or observe a partial hook.
    let manager = manager();
    let handle = manager
        .allocate_with(64, AllocationKind::Unmanaged)
        .unwrap();

    assert!(manager.release(&handle, false));
    assert!(manager.release_hook_resolved());
}

#[test]
fn dropping_without_release_only_leaks_unmanaged_memory() {
    let manager = manager();
    // Managed storage is reclaimed on drop; unmanaged is deliberately
    // leaked unless released. Either way dropping must be safe.
    let managed = manager.allocate_with(32, AllocationKind::Managed).unwrap();
    let unmanaged = manager
        .allocate_with(32, AllocationKind::Unmanaged)
        .unwrap();
    drop(managed);
    drop(unmanaged);
}
