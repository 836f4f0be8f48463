//! Performance benchmarks for critical server systems

use bincode::{deserialize, serialize};
use server::game::GameState;
use shared::{boxes_overlap, Key, Packet, Vec2, HITBOX_RIGHT, HURTBOX};
use std::time::Instant;

/// Benchmarks the AABB overlap predicate
#[test]
fn benchmark_overlap_test() {
    let attacker = Vec2::new(100.0, 300.0);
    let target = Vec2::new(150.0, 300.0);

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = boxes_overlap(attacker, &HITBOX_RIGHT, target, &HURTBOX);
    }

    let duration = start.elapsed();
    println!(
        "Overlap test: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks the full simulation step with a busy arena
#[test]
fn benchmark_simulation_step() {
    let mut state = GameState::new();
    for id in 0..50 {
        state.join(id, "brawler");
        // everyone swings at everyone nearby
        state.handle_input(id, Key::Attack, true);
        state.handle_input(id, Key::Right, true);
    }

    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = state.step();
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} players × {} ticks in {:?} ({:.2} μs/tick)",
        50,
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks snapshot construction and serialization
#[test]
fn benchmark_snapshot_serialization() {
    let mut state = GameState::new();
    for id in 0..50 {
        state.join(id, "brawler");
    }
    state.step();

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let players = state.snapshot();
        let packet = Packet::GameStatus {
            total_players: players.len() as u32,
            players,
            timestamp: 1234567890,
        };
        let data = serialize(&packet).unwrap();
        let _: Packet = deserialize(&data).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}
