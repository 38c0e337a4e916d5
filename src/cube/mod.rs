//! Cubie-level model of the 3×3×3 cube.
//!
//! A state is the positions and orientations of the 8 corner and 12 edge
//! cubies (centers are fixed). Face turns act on states by permutation
//! composition:
//! - `cp[i] = j` means position `i` holds the corner that is at position `j`
//!   when the cube is solved, and `co[i]` is its clockwise twist (mod 3),
//! - `ep[i]` / `eo[i]` are the same for edges (flip mod 2).
//!
//! Every state reachable by face turns satisfies the group invariants checked
//! by [`CubieCube::verify`]: twist sum ≡ 0 (mod 3), flip sum ≡ 0 (mod 2), and
//! corner parity equal to edge parity.

pub mod facelet;
pub mod moves;

use std::fmt;

pub use moves::{Face, Move, PHASE2_MOVES};

use self::Corner::*;
use self::Edge::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
/// The 8 corner positions/cubies, named by the faces they touch.
pub enum Corner {
    URF,
    UFL,
    ULB,
    UBR,
    DFR,
    DLF,
    DBL,
    DRB,
}

impl Corner {
    pub const ALL: [Corner; 8] = [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
/// The 12 edge positions/cubies. The last four (FR, FL, BL, BR) form the
/// UD-slice, the middle layer between the U and D faces.
pub enum Edge {
    UR,
    UF,
    UL,
    UB,
    DR,
    DF,
    DL,
    DB,
    FR,
    FL,
    BL,
    BR,
}

impl Edge {
    pub const ALL: [Edge; 12] = [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR];

    /// True for the four middle-layer edges.
    #[inline]
    pub fn in_ud_slice(self) -> bool {
        self as usize >= 8
    }
}

#[derive(Debug)]
/// Reasons a quadruple of permutation/orientation arrays is not a state
/// reachable from the solved cube by face turns.
pub enum StateError {
    CornerPermutation,
    EdgePermutation,
    CornerTwist { sum: u32 },
    EdgeFlip { sum: u32 },
    Parity,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::CornerPermutation => write!(f, "corner permutation is not a permutation"),
            StateError::EdgePermutation => write!(f, "edge permutation is not a permutation"),
            StateError::CornerTwist { sum } => {
                write!(f, "corner twist sum {sum} is not divisible by 3")
            }
            StateError::EdgeFlip { sum } => write!(f, "edge flip sum {sum} is not divisible by 2"),
            StateError::Parity => write!(f, "corner and edge permutation parities differ"),
        }
    }
}

impl std::error::Error for StateError {}

/// A cube state at the cubie level. This is the ground-truth representation;
/// all coordinates are derived from it on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubieCube {
    pub cp: [Corner; 8],
    pub co: [u8; 8],
    pub ep: [Edge; 12],
    pub eo: [u8; 12],
}

impl CubieCube {
    pub const SOLVED: CubieCube = CubieCube {
        cp: Corner::ALL,
        co: [0; 8],
        ep: Edge::ALL,
        eo: [0; 12],
    };

    #[inline]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    /// Compose the corner arrays with `rhs`: the result is `self` followed by
    /// `rhs`. The twist a moving corner carries is read *through* `rhs`'s
    /// permutation before `rhs`'s own twist delta is added.
    pub fn corner_multiply(&self, rhs: &CubieCube) -> ([Corner; 8], [u8; 8]) {
        let mut cp = [URF; 8];
        let mut co = [0u8; 8];
        for i in 0..8 {
            let from = rhs.cp[i] as usize;
            cp[i] = self.cp[from];
            co[i] = (self.co[from] + rhs.co[i]) % 3;
        }
        (cp, co)
    }

    /// Edge counterpart of [`CubieCube::corner_multiply`], flips mod 2.
    pub fn edge_multiply(&self, rhs: &CubieCube) -> ([Edge; 12], [u8; 12]) {
        let mut ep = [UR; 12];
        let mut eo = [0u8; 12];
        for i in 0..12 {
            let from = rhs.ep[i] as usize;
            ep[i] = self.ep[from];
            eo[i] = (self.eo[from] + rhs.eo[i]) % 2;
        }
        (ep, eo)
    }

    /// Group composition: apply `self` first, then `rhs`.
    pub fn multiply(&self, rhs: &CubieCube) -> CubieCube {
        let (cp, co) = self.corner_multiply(rhs);
        let (ep, eo) = self.edge_multiply(rhs);
        CubieCube { cp, co, ep, eo }
    }

    /// Apply one of the 18 face turns in place.
    pub fn apply_move(&mut self, m: Move) {
        let basic = &moves::BASIC_MOVE_CUBES[m.face() as usize];
        for _ in 0..m.power() {
            *self = self.multiply(basic);
        }
    }

    /// The group inverse: `a.multiply(&a.inverse())` is the solved cube.
    pub fn inverse(&self) -> CubieCube {
        let mut inv = CubieCube::SOLVED;
        for i in 0..8 {
            inv.cp[self.cp[i] as usize] = Corner::ALL[i];
            inv.co[self.cp[i] as usize] = (3 - self.co[i]) % 3;
        }
        for i in 0..12 {
            inv.ep[self.ep[i] as usize] = Edge::ALL[i];
            // a flip is its own inverse
            inv.eo[self.ep[i] as usize] = self.eo[i];
        }
        inv
    }

    /// Check the group invariants. States handed over by a well-behaved
    /// caller always satisfy them; the solver still fails fast on violations
    /// instead of searching a space that contains no solution.
    pub fn verify(&self) -> Result<(), StateError> {
        let mut seen = [false; 8];
        for &c in self.cp.iter() {
            seen[c as usize] = true;
        }
        if seen.iter().any(|&s| !s) {
            return Err(StateError::CornerPermutation);
        }

        let mut seen = [false; 12];
        for &e in self.ep.iter() {
            seen[e as usize] = true;
        }
        if seen.iter().any(|&s| !s) {
            return Err(StateError::EdgePermutation);
        }

        let twist: u32 = self.co.iter().map(|&o| o as u32).sum();
        if self.co.iter().any(|&o| o > 2) || twist % 3 != 0 {
            return Err(StateError::CornerTwist { sum: twist });
        }

        let flip: u32 = self.eo.iter().map(|&o| o as u32).sum();
        if self.eo.iter().any(|&o| o > 1) || flip % 2 != 0 {
            return Err(StateError::EdgeFlip { sum: flip });
        }

        let cp: Vec<usize> = self.cp.iter().map(|&c| c as usize).collect();
        let ep: Vec<usize> = self.ep.iter().map(|&e| e as usize).collect();
        if permutation_parity(&cp) != permutation_parity(&ep) {
            return Err(StateError::Parity);
        }

        Ok(())
    }
}

/// 0 for an even permutation, 1 for an odd one.
pub(crate) fn permutation_parity(perm: &[usize]) -> u8 {
    let mut inversions = 0usize;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[j] < perm[i] {
                inversions += 1;
            }
        }
    }
    (inversions % 2) as u8
}
