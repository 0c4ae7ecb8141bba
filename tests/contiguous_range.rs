//! Contiguous-range reservation tests for the port registry.

mod common;

use portreg::config::ConfigBuilder;
use portreg::engine::Engine;
use portreg::error::Error;

/// **What this tests:**
/// Port `50001` is reserved; a subsequent `reserve_range(50000, 3)` spans
/// it.
///
/// **Invariant verified:**
/// The call fails with `RangeOccupied(50001)` and no entries from the
/// failed range request are left in the registry.
#[test]
fn reserve_range_fails_on_partial_occupancy_with_no_side_effects() {
    let dir = common::create_temp_dir().unwrap();
    let config = ConfigBuilder::new()
        .registry_dir(dir.path())
        .allow_privileged(true)
        .build()
        .unwrap();
    let engine = Engine::new(config);

    let held = engine.get_in_range(50001, 50001, Some("held")).unwrap();
    assert_eq!(held.port, 50001);

    let result = engine.reserve_range(50000, 3, Some("batch"));
    match result {
        Err(Error::RangeOccupied { port }) => assert_eq!(port, 50001),
        other => panic!("expected RangeOccupied(50001), got {other:?}"),
    }

    let entries = engine.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].port, 50001);
}

/// **What this tests:**
/// A port within the requested range is bound directly on the host (not
/// merely promised in the registry).
///
/// **Invariant verified:**
/// The call fails with `RangeInUse`, distinguishing an OS-held port from
/// a registry-promised one.
#[test]
fn reserve_range_distinguishes_os_in_use_from_registry_occupied() {
    let dir = common::create_temp_dir().unwrap();
    let config = ConfigBuilder::new()
        .registry_dir(dir.path())
        .allow_privileged(true)
        .build()
        .unwrap();
    let engine = Engine::new(config);

    let listener = std::net::TcpListener::bind(("127.0.0.1", 50777)).unwrap();

    let result = engine.reserve_range(50776, 3, None);
    assert!(matches!(result, Err(Error::RangeInUse { port: 50777 })));

    drop(listener);
}
