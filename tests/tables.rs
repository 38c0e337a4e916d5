//! Move-table and pruning-table correctness, and the on-disk cache.

mod common;

use std::fs;

use cube_solver::coords;
use cube_solver::cube::{CubieCube, Move, PHASE2_MOVES};
use cube_solver::tables::{
    build_move_table, CoordSpec, MoveTable, TableError, Tables, CORNER_PERM_SPEC, FLIP_SPEC,
    TWIST_SPEC, UDSLICE_SORTED_SPEC, UDSLICE_SPEC, UD_EDGE_SPEC,
};
use rustc_hash::FxHashMap;

use common::tables;

/// Check `table[v][m]` against constructing a representative state, applying
/// the move at the cubie level and re-deriving the coordinate.
fn check_against_cubie_level(table: &MoveTable, spec: &CoordSpec, stride: usize) {
    for coord in (0..spec.size).step_by(stride) {
        let mut rep = CubieCube::SOLVED;
        (spec.inject)(&mut rep, coord);
        for (col, &m) in spec.moves.iter().enumerate() {
            let mut moved = rep;
            moved.apply_move(m);
            assert_eq!(
                table.apply(coord, col),
                (spec.extract)(&moved),
                "{} disagrees at coord {coord}, move {m}",
                spec.name,
            );
        }
    }
}

#[test]
fn small_move_tables_exhaustive() {
    let t = tables();
    check_against_cubie_level(&t.udslice_move, &UDSLICE_SPEC, 1);
    check_against_cubie_level(&t.udslice_sorted_move, &UDSLICE_SORTED_SPEC, 1);
}

#[test]
fn large_move_tables_sampled() {
    let t = tables();
    check_against_cubie_level(&t.twist_move, &TWIST_SPEC, 13);
    check_against_cubie_level(&t.flip_move, &FLIP_SPEC, 11);
    check_against_cubie_level(&t.corner_perm_move, &CORNER_PERM_SPEC, 97);
    check_against_cubie_level(&t.ud_edge_move, &UD_EDGE_SPEC, 97);
}

#[test]
fn goal_pairs_have_distance_zero() {
    let t = tables();
    assert_eq!(t.twist_udslice_prune.distance(0, 0), 0);
    assert_eq!(t.flip_udslice_prune.distance(0, 0), 0);
    assert_eq!(t.corner_perm_udslice_prune.distance(0, 0), 0);
    assert_eq!(t.ud_edge_udslice_prune.distance(0, 0), 0);
    assert_eq!(
        t.twist_udslice_prune.shape(),
        (coords::N_TWIST, coords::N_UDSLICE)
    );
    assert_eq!(
        t.ud_edge_udslice_prune.shape(),
        (coords::N_UD_EDGE_PERM, coords::N_UDSLICE_SORTED)
    );
}

/// BFS distances drop by exactly one along some move: every non-goal pair
/// has a predecessor on a shortest path.
#[test]
fn pruning_distances_decrease_along_some_move() {
    let t = tables();
    for twist in (0..coords::N_TWIST).step_by(23) {
        for udslice in (0..coords::N_UDSLICE).step_by(7) {
            let d = t.twist_udslice_prune.distance(twist, udslice);
            if d == 0 {
                continue;
            }
            let reachable = (0..Move::ALL.len()).any(|m| {
                t.twist_udslice_prune.distance(
                    t.twist_move.apply(twist, m),
                    t.udslice_move.apply(udslice, m),
                ) == d - 1
            });
            assert!(reachable, "no shortest-path move at ({twist}, {udslice})");
        }
    }
}

/// Cross-check the first BFS shells against an independent breadth-first
/// expansion of the coordinate-pair graph. Moves are invertible, so the
/// distance from the goal equals the distance to it.
#[test]
fn pruning_matches_brute_force_near_goal() {
    let t = tables();
    let mut distance: FxHashMap<(usize, usize), u8> = FxHashMap::default();
    let mut frontier = vec![(0usize, 0usize)];
    distance.insert((0, 0), 0);
    for depth in 1..=4u8 {
        let mut next = Vec::new();
        for &(cperm, uds) in frontier.iter() {
            for m in 0..PHASE2_MOVES.len() {
                let pair = (
                    t.corner_perm_move.apply(cperm, m),
                    t.udslice_sorted_move.apply(uds, m),
                );
                if !distance.contains_key(&pair) {
                    distance.insert(pair, depth);
                    next.push(pair);
                }
            }
        }
        frontier = next;
    }

    for (&(cperm, uds), &d) in distance.iter() {
        assert_eq!(
            t.corner_perm_udslice_prune.distance(cperm, uds),
            d,
            "pruning value disagrees with brute force at ({cperm}, {uds})"
        );
    }
}

/// The heuristic must never overestimate the true distance of a state to
/// the phase-1 goal.
#[test]
fn phase1_heuristic_is_admissible_on_short_scrambles() {
    let t = tables();
    // every state at move distance <= 3 from solved
    let mut states = vec![CubieCube::SOLVED];
    let mut all = vec![(CubieCube::SOLVED, 0u8)];
    for depth in 1..=3u8 {
        let mut next = Vec::new();
        for cube in states.iter() {
            for &m in Move::ALL.iter() {
                let mut moved = *cube;
                moved.apply_move(m);
                next.push(moved);
                all.push((moved, depth));
            }
        }
        states = next;
    }
    for (cube, depth) in all {
        let bound = t
            .twist_udslice_prune
            .distance(coords::twist(&cube), coords::udslice(&cube))
            .max(
                t.flip_udslice_prune
                    .distance(coords::flip(&cube), coords::udslice(&cube)),
            );
        assert!(
            bound <= depth,
            "heuristic {bound} exceeds true distance {depth}"
        );
    }
}

#[test]
fn pruning_tables_are_exhaustive_by_construction() {
    // build_pruning_table errors out if any pair stays unreached; reaching
    // this point after common::tables() proves the four product spaces were
    // fully swept. Spot-check the advertised maxima look like BFS output.
    let t = tables();
    for prune in [
        &t.twist_udslice_prune,
        &t.flip_udslice_prune,
        &t.corner_perm_udslice_prune,
        &t.ud_edge_udslice_prune,
    ] {
        let max = prune.max_depth();
        assert!(max > 0 && max < 0xFF, "implausible max depth {max}");
    }
}

#[test]
fn cache_round_trip_preserves_tables() {
    let dir = std::env::temp_dir().join(format!("cube_solver_cache_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let t = tables();
    t.persist(&dir).expect("persist");
    let loaded = Tables::load(&dir).expect("load");
    assert_eq!(&loaded, t);

    // load_or_build takes the load path once a valid cache exists
    let again = Tables::load_or_build(&dir).expect("load_or_build");
    assert_eq!(&again, t);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn cache_detects_corruption_and_version_skew() {
    let dir = std::env::temp_dir().join(format!("cube_solver_cache_bad_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    assert!(
        Tables::load(&dir).is_err(),
        "loading a missing cache must fail"
    );

    let t = tables();
    t.persist(&dir).expect("persist");

    // truncate one blob
    let blob = dir.join("udslice_move.tab");
    let bytes = fs::read(&blob).unwrap();
    fs::write(&blob, &bytes[..bytes.len() / 2]).unwrap();
    assert!(matches!(
        Tables::load(&dir),
        Err(TableError::Corrupt { .. })
    ));

    // restore the blob, then stamp a wrong manifest version
    fs::write(&blob, &bytes).unwrap();
    Tables::load(&dir).expect("restored cache loads again");
    let manifest_path = dir.join("manifest.json");
    let manifest = fs::read_to_string(&manifest_path).unwrap();
    fs::write(
        &manifest_path,
        manifest.replace("\"format_version\": 1", "\"format_version\": 999"),
    )
    .unwrap();
    assert!(matches!(
        Tables::load(&dir),
        Err(TableError::Corrupt { .. })
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rebuilt_tables_are_deterministic() {
    // a second build of one small table matches the shared instance
    let rebuilt = build_move_table(&UDSLICE_SPEC);
    assert_eq!(&rebuilt, &tables().udslice_move);
}
