//! The 18-move vocabulary and the six basic face turns as cubie permutations.
//!
//! Moves are written in standard notation: `U` is a clockwise quarter turn of
//! the upper face, `U2` a half turn, `U'` (spelled `U3` in code) a
//! counter-clockwise quarter turn. The ten moves that preserve the phase-1
//! subgroup are `U* D*` plus the four half turns of the side faces.

use std::fmt;
use std::str::FromStr;

use super::Corner::*;
use super::CubieCube;
use super::Edge::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A face of the cube. The order fixes move indexing (three moves per face)
/// and the canonical orientation used by the opposite-face move filter.
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::U => Face::D,
            Face::D => Face::U,
            Face::R => Face::L,
            Face::L => Face::R,
            Face::F => Face::B,
            Face::B => Face::F,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
#[rustfmt::skip]
/// One of the 18 elementary face turns. `U3` prints as `U'`.
pub enum Move {
    U, U2, U3,
    R, R2, R3,
    F, F2, F3,
    D, D2, D3,
    L, L2, L3,
    B, B2, B3,
}

use Move::*;

impl Move {
    #[rustfmt::skip]
    pub const ALL: [Move; 18] = [
        U, U2, U3,
        R, R2, R3,
        F, F2, F3,
        D, D2, D3,
        L, L2, L3,
        B, B2, B3,
    ];

    /// Index into move-table columns built over the full vocabulary.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn face(self) -> Face {
        Face::ALL[self as usize / 3]
    }

    /// How many clockwise quarter turns this move applies (1, 2 or 3).
    #[inline]
    pub fn power(self) -> usize {
        self as usize % 3 + 1
    }

    /// The move undoing this one.
    pub fn inverse(self) -> Move {
        Move::ALL[self.face() as usize * 3 + 3 - self.power()]
    }

    /// Redundancy filter for the depth-first search. A move is skipped after
    /// a move of the same face, and of a commuting opposite-face pair only
    /// the canonical order is explored (`D` may follow `U`, not vice versa).
    #[inline]
    pub fn allowed_after(self, last: Option<Move>) -> bool {
        let Some(last) = last else { return true };
        let face = self.face();
        let last_face = last.face();
        if last_face == face {
            return false;
        }
        !(last_face.opposite() == face && (last_face as usize) > (face as usize))
    }

    /// True for the ten moves that keep a state inside the phase-1 subgroup.
    pub fn preserves_phase1_goal(self) -> bool {
        PHASE2_MOVES.contains(&self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            U3 => write!(f, "U'"),
            R3 => write!(f, "R'"),
            F3 => write!(f, "F'"),
            D3 => write!(f, "D'"),
            L3 => write!(f, "L'"),
            B3 => write!(f, "B'"),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(U),
            "U2" => Ok(U2),
            "U'" | "U3" => Ok(U3),
            "R" => Ok(R),
            "R2" => Ok(R2),
            "R'" | "R3" => Ok(R3),
            "F" => Ok(F),
            "F2" => Ok(F2),
            "F'" | "F3" => Ok(F3),
            "D" => Ok(D),
            "D2" => Ok(D2),
            "D'" | "D3" => Ok(D3),
            "L" => Ok(L),
            "L2" => Ok(L2),
            "L'" | "L3" => Ok(L3),
            "B" => Ok(B),
            "B2" => Ok(B2),
            "B'" | "B3" => Ok(B3),
            _ => Err(ParseMoveError {
                word: s.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct ParseMoveError {
    pub word: String,
}

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown move \"{}\"", self.word)
    }
}

impl std::error::Error for ParseMoveError {}

/// The move set of the phase-2 search: every move that maps the phase-1
/// subgroup to itself. Column order of the phase-2 move tables.
pub const PHASE2_MOVES: [Move; 10] = [U, U2, U3, D, D2, D3, R2, L2, F2, B2];

/// The six clockwise face turns as cubie permutations. Half and inverse
/// turns are powers of these.
#[rustfmt::skip]
pub const BASIC_MOVE_CUBES: [CubieCube; 6] = [
    // U
    CubieCube {
        cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // R
    CubieCube {
        cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR],
        co: [2, 0, 0, 1, 1, 0, 0, 2],
        ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // F
    CubieCube {
        cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
        co: [1, 2, 0, 0, 2, 1, 0, 0],
        ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
        eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubieCube {
        cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // L
    CubieCube {
        cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
        co: [0, 1, 2, 0, 0, 2, 1, 0],
        ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // B
    CubieCube {
        cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
        co: [0, 0, 1, 2, 0, 0, 2, 1],
        ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
        eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];
