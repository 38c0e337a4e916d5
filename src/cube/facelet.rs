//! Conversion between cubie states and 54-character facelet strings.
//!
//! The string lists the stickers of the six faces in U, R, F, D, L, B order,
//! each face row by row:
//!
//! ```text
//!   0 1 2
//!   3 4 5
//!   6 7 8
//! ```
//!
//! A sticker is named by the face whose color it carries, so the solved cube
//! is `UUUUUUUUURRRRRRRRR…`. This is the interchange format presentation
//! layers tend to speak natively.

use std::fmt;

use rustc_hash::FxHashMap;

use super::moves::Face;
use super::{Corner, CubieCube, Edge};

const COLOR_CHARS: [char; 6] = ['U', 'R', 'F', 'D', 'L', 'B'];

const U: usize = 0;
const R: usize = 9;
const F: usize = 18;
const D: usize = 27;
const L: usize = 36;
const B: usize = 45;

/// Sticker indices of each corner position: the U/D sticker first, then the
/// next two clockwise as seen from outside along the corner's diagonal.
#[rustfmt::skip]
const CORNER_FACELETS: [[usize; 3]; 8] = [
    [U + 8, R, F + 2],     // URF
    [U + 6, F, L + 2],     // UFL
    [U, L, B + 2],         // ULB
    [U + 2, B, R + 2],     // UBR
    [D + 2, F + 8, R + 6], // DFR
    [D, L + 8, F + 6],     // DLF
    [D + 6, B + 8, L + 6], // DBL
    [D + 8, R + 8, B + 6], // DRB
];

/// Sticker indices of each edge position, the U/D (or F/B for slice edges)
/// sticker first.
#[rustfmt::skip]
const EDGE_FACELETS: [[usize; 2]; 12] = [
    [U + 5, R + 1], // UR
    [U + 7, F + 1], // UF
    [U + 3, L + 1], // UL
    [U + 1, B + 1], // UB
    [D + 5, R + 7], // DR
    [D + 7, F + 7], // DF
    [D + 3, L + 7], // DL
    [D + 1, B + 7], // DB
    [F + 5, R + 3], // FR
    [F + 3, L + 5], // FL
    [B + 5, L + 3], // BL
    [B + 3, R + 5], // BR
];

/// Colors of each corner cubie in the solved state, in the same sticker
/// order as [`CORNER_FACELETS`].
#[rustfmt::skip]
const CORNER_COLORS: [[Face; 3]; 8] = [
    [Face::U, Face::R, Face::F],
    [Face::U, Face::F, Face::L],
    [Face::U, Face::L, Face::B],
    [Face::U, Face::B, Face::R],
    [Face::D, Face::F, Face::R],
    [Face::D, Face::L, Face::F],
    [Face::D, Face::B, Face::L],
    [Face::D, Face::R, Face::B],
];

#[rustfmt::skip]
const EDGE_COLORS: [[Face; 2]; 12] = [
    [Face::U, Face::R],
    [Face::U, Face::F],
    [Face::U, Face::L],
    [Face::U, Face::B],
    [Face::D, Face::R],
    [Face::D, Face::F],
    [Face::D, Face::L],
    [Face::D, Face::B],
    [Face::F, Face::R],
    [Face::F, Face::L],
    [Face::B, Face::L],
    [Face::B, Face::R],
];

#[derive(Debug)]
/// Reasons a facelet string does not describe any cubie arrangement.
pub enum FaceletError {
    Length { found: usize },
    Character { index: usize, found: char },
    Corner { position: Corner },
    Edge { position: Edge },
}

impl fmt::Display for FaceletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceletError::Length { found } => {
                write!(f, "facelet string must have 54 characters, found {found}")
            }
            FaceletError::Character { index, found } => {
                write!(f, "invalid facelet character {found:?} at index {index}")
            }
            FaceletError::Corner { position } => {
                write!(f, "stickers at corner position {position:?} match no corner cubie")
            }
            FaceletError::Edge { position } => {
                write!(f, "stickers at edge position {position:?} match no edge cubie")
            }
        }
    }
}

impl std::error::Error for FaceletError {}

/// Render a cubie state as a facelet string.
pub fn to_facelets(cube: &CubieCube) -> String {
    let mut facelets = [Face::U; 54];
    for (i, &face) in Face::ALL.iter().enumerate() {
        facelets[i * 9 + 4] = face;
    }

    for i in 0..8 {
        let cubie = cube.cp[i] as usize;
        let ori = cube.co[i] as usize;
        for k in 0..3 {
            facelets[CORNER_FACELETS[i][(k + 3 - ori) % 3]] = CORNER_COLORS[cubie][k];
        }
    }

    for i in 0..12 {
        let cubie = cube.ep[i] as usize;
        let ori = cube.eo[i] as usize;
        for k in 0..2 {
            facelets[EDGE_FACELETS[i][(k + ori) % 2]] = EDGE_COLORS[cubie][k];
        }
    }

    facelets.iter().map(|&f| COLOR_CHARS[f as usize]).collect()
}

/// Decode a facelet string into a cubie state.
///
/// Only sticker-level consistency is checked here; the result may still
/// violate the group invariants (e.g. a single twisted corner), which
/// [`CubieCube::verify`] reports.
pub fn from_facelets(s: &str) -> Result<CubieCube, FaceletError> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 54 {
        return Err(FaceletError::Length { found: chars.len() });
    }

    let color_of: FxHashMap<char, Face> = COLOR_CHARS
        .iter()
        .zip(Face::ALL.iter())
        .map(|(&c, &f)| (c, f))
        .collect();

    let mut facelets = [Face::U; 54];
    for (i, &ch) in chars.iter().enumerate() {
        facelets[i] = *color_of
            .get(&ch)
            .ok_or(FaceletError::Character { index: i, found: ch })?;
    }

    let mut cube = CubieCube::SOLVED;

    for i in 0..8 {
        let colors = CORNER_FACELETS[i].map(|idx| facelets[idx]);
        let mut found = false;
        'cubies: for j in 0..8 {
            let target = CORNER_COLORS[j];
            for ori in 0..3 {
                if (0..3).all(|k| colors[k] == target[(k + ori) % 3]) {
                    cube.cp[i] = Corner::ALL[j];
                    cube.co[i] = ori as u8;
                    found = true;
                    break 'cubies;
                }
            }
        }
        if !found {
            return Err(FaceletError::Corner {
                position: Corner::ALL[i],
            });
        }
    }

    for i in 0..12 {
        let colors = EDGE_FACELETS[i].map(|idx| facelets[idx]);
        let mut found = false;
        for j in 0..12 {
            let target = EDGE_COLORS[j];
            if colors == target {
                cube.ep[i] = Edge::ALL[j];
                cube.eo[i] = 0;
                found = true;
                break;
            }
            if colors == [target[1], target[0]] {
                cube.ep[i] = Edge::ALL[j];
                cube.eo[i] = 1;
                found = true;
                break;
            }
        }
        if !found {
            return Err(FaceletError::Edge {
                position: Edge::ALL[i],
            });
        }
    }

    Ok(cube)
}
