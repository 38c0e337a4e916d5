//! Round-trip checks for the six coordinate bijections: exhaustive where the
//! domain is small, sampled plus randomized where it is 8!.

use cube_solver::coords::{self, N_CORNER_PERM, N_FLIP, N_TWIST, N_UDSLICE, N_UDSLICE_SORTED, N_UD_EDGE_PERM};
use cube_solver::cube::{CubieCube, PHASE2_MOVES};
use cube_solver::solver::random_scramble;
use cube_solver::Move;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn twist_exhaustive() {
    let mut c = CubieCube::SOLVED;
    for t in 0..N_TWIST {
        coords::set_twist(&mut c, t);
        assert_eq!(coords::twist(&c), t);
    }
}

#[test]
fn flip_exhaustive() {
    let mut c = CubieCube::SOLVED;
    for f in 0..N_FLIP {
        coords::set_flip(&mut c, f);
        assert_eq!(coords::flip(&c), f);
    }
}

#[test]
fn udslice_exhaustive() {
    let mut c = CubieCube::SOLVED;
    for s in 0..N_UDSLICE {
        coords::set_udslice(&mut c, s);
        assert_eq!(coords::udslice(&c), s);
    }
}

#[test]
fn udslice_sorted_exhaustive() {
    let mut c = CubieCube::SOLVED;
    for s in 0..N_UDSLICE_SORTED {
        coords::set_udslice_sorted(&mut c, s);
        assert_eq!(coords::udslice_sorted(&c), s);
    }
}

#[test]
fn permutation_coordinates_sampled() {
    let mut c = CubieCube::SOLVED;
    for p in (0..N_CORNER_PERM).step_by(37) {
        coords::set_corner_perm(&mut c, p);
        assert_eq!(coords::corner_perm(&c), p);
    }
    let mut c = CubieCube::SOLVED;
    for p in (0..N_UD_EDGE_PERM).step_by(41) {
        coords::set_ud_edge_perm(&mut c, p);
        assert_eq!(coords::ud_edge_perm(&c), p);
    }
}

/// `set_*(get_*(s))` must reproduce the sub-state each coordinate encodes,
/// for states reachable from solved.
#[test]
fn random_states_round_trip_through_coordinates() {
    let mut rng = StdRng::seed_from_u64(4096);
    for _ in 0..1000 {
        let length = rng.gen_range(1..=30);
        let (s, _) = random_scramble(&mut rng, length);

        let mut c = s;
        coords::set_twist(&mut c, coords::twist(&s));
        assert_eq!(c.co, s.co);

        let mut c = s;
        coords::set_flip(&mut c, coords::flip(&s));
        assert_eq!(c.eo, s.eo);

        let mut c = s;
        coords::set_corner_perm(&mut c, coords::corner_perm(&s));
        assert_eq!(c.cp, s.cp);

        // udslice encodes the occupancy pattern only
        let mut c = s;
        coords::set_udslice(&mut c, coords::udslice(&s));
        let occupancy = |cube: &CubieCube| -> [bool; 12] {
            std::array::from_fn(|i| cube.ep[i].in_ud_slice())
        };
        assert_eq!(occupancy(&c), occupancy(&s));
    }
}

/// The two phase-2 edge coordinates are defined once the slice edges are
/// home, so exercise them with subgroup-preserving scrambles.
#[test]
fn phase2_states_round_trip_through_edge_coordinates() {
    let mut rng = StdRng::seed_from_u64(8192);
    for _ in 0..1000 {
        let mut s = CubieCube::SOLVED;
        for _ in 0..rng.gen_range(1..=30) {
            s.apply_move(PHASE2_MOVES[rng.gen_range(0..PHASE2_MOVES.len())]);
        }
        assert_eq!(coords::udslice(&s), 0);

        let mut c = s;
        coords::set_ud_edge_perm(&mut c, coords::ud_edge_perm(&s));
        assert_eq!(c.ep[..8], s.ep[..8]);

        let mut c = s;
        coords::set_udslice_sorted(&mut c, coords::udslice_sorted(&s));
        assert_eq!(c.ep[8..], s.ep[8..]);
    }
}

/// Zero coordinates characterise the phase goals.
#[test]
fn goal_membership_matches_zero_coordinates() {
    let mut rng = StdRng::seed_from_u64(12288);
    // Phase-2 scrambles stay in the phase-1 goal subgroup.
    let mut s = CubieCube::SOLVED;
    for _ in 0..40 {
        s.apply_move(PHASE2_MOVES[rng.gen_range(0..PHASE2_MOVES.len())]);
    }
    assert_eq!(coords::twist(&s), 0);
    assert_eq!(coords::flip(&s), 0);
    assert_eq!(coords::udslice(&s), 0);

    // A quarter turn of a side face leaves it.
    s.apply_move(Move::R);
    assert_ne!(
        (coords::twist(&s), coords::udslice(&s)),
        (0, 0),
        "R should disturb orientation or slice occupancy"
    );
}
