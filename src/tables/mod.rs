//! Precomputed transition and distance tables.
//!
//! Move tables map `(coordinate value, move) → new value` so the search
//! never touches cubie-level state in its hot loop. Pruning tables map a
//! packed pair of coordinates to the exact minimum number of moves needed to
//! reach that phase's goal pair, computed by breadth-first search from the
//! goal; the searcher uses them as admissible lower bounds.
//!
//! Construction is pure and deterministic. The ten tables are independent,
//! so they are built in parallel; once built they are immutable and shared
//! read-only. [`cache`] persists them so the build runs once per machine.

pub mod cache;

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::coords;
use crate::cube::{CubieCube, Move, PHASE2_MOVES};

const UNVISITED: u8 = 0xFF;

#[derive(Debug)]
/// Fatal table construction / persistence failures. A table that cannot be
/// built consistently must never be used: a partial table silently produces
/// wrong or missing solutions.
pub enum TableError {
    Io {
        stage: &'static str,
        path: String,
        error: String,
    },
    Corrupt {
        path: String,
        reason: String,
    },
    Inconsistent {
        table: &'static str,
        reason: String,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io { stage, path, error } => {
                write!(f, "io error at {stage} for {path}: {error}")
            }
            TableError::Corrupt { path, reason } => {
                write!(f, "corrupt table file {path}: {reason}")
            }
            TableError::Inconsistent { table, reason } => {
                write!(f, "inconsistent table {table}: {reason}")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Everything the builder needs to enumerate one coordinate: its range, its
/// move set, and the getter/setter pair from [`coords`].
#[derive(Debug, Clone, Copy)]
pub struct CoordSpec {
    pub name: &'static str,
    pub size: usize,
    pub moves: &'static [Move],
    pub extract: fn(&CubieCube) -> usize,
    pub inject: fn(&mut CubieCube, usize),
}

pub const TWIST_SPEC: CoordSpec = CoordSpec {
    name: "twist_move",
    size: coords::N_TWIST,
    moves: &Move::ALL,
    extract: coords::twist,
    inject: coords::set_twist,
};

pub const FLIP_SPEC: CoordSpec = CoordSpec {
    name: "flip_move",
    size: coords::N_FLIP,
    moves: &Move::ALL,
    extract: coords::flip,
    inject: coords::set_flip,
};

pub const UDSLICE_SPEC: CoordSpec = CoordSpec {
    name: "udslice_move",
    size: coords::N_UDSLICE,
    moves: &Move::ALL,
    extract: coords::udslice,
    inject: coords::set_udslice,
};

pub const CORNER_PERM_SPEC: CoordSpec = CoordSpec {
    name: "corner_perm_move",
    size: coords::N_CORNER_PERM,
    moves: &PHASE2_MOVES,
    extract: coords::corner_perm,
    inject: coords::set_corner_perm,
};

pub const UD_EDGE_SPEC: CoordSpec = CoordSpec {
    name: "ud_edge_move",
    size: coords::N_UD_EDGE_PERM,
    moves: &PHASE2_MOVES,
    extract: coords::ud_edge_perm,
    inject: coords::set_ud_edge_perm,
};

pub const UDSLICE_SORTED_SPEC: CoordSpec = CoordSpec {
    name: "udslice_sorted_move",
    size: coords::N_UDSLICE_SORTED,
    moves: &PHASE2_MOVES,
    extract: coords::udslice_sorted,
    inject: coords::set_udslice_sorted,
};

/// Dense transition table for one coordinate: row per value, column per move
/// of the coordinate's move set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTable {
    name: &'static str,
    size: usize,
    moves: &'static [Move],
    values: Vec<u16>,
}

impl MoveTable {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn moves(&self) -> &'static [Move] {
        self.moves
    }

    /// The coordinate value after applying column `mv` of this table's move
    /// set to `coord`.
    #[inline]
    pub fn apply(&self, coord: usize, mv: usize) -> usize {
        self.values[coord * self.moves.len() + mv] as usize
    }

    pub(crate) fn values(&self) -> &[u16] {
        &self.values
    }

    pub(crate) fn from_raw(
        spec: &CoordSpec,
        values: Vec<u16>,
        path: &str,
    ) -> Result<Self, TableError> {
        if values.len() != spec.size * spec.moves.len() {
            return Err(TableError::Corrupt {
                path: path.to_string(),
                reason: format!(
                    "{} entries, expected {}",
                    values.len(),
                    spec.size * spec.moves.len()
                ),
            });
        }
        if let Some(&v) = values.iter().find(|&&v| v as usize >= spec.size) {
            return Err(TableError::Corrupt {
                path: path.to_string(),
                reason: format!("value {v} outside coordinate range {}", spec.size),
            });
        }
        Ok(MoveTable {
            name: spec.name,
            size: spec.size,
            moves: spec.moves,
            values,
        })
    }
}

/// Build one move table by constructing a representative cubie-level state
/// for every coordinate value and applying every move of the set to it.
pub fn build_move_table(spec: &CoordSpec) -> MoveTable {
    let n_moves = spec.moves.len();
    let mut values = vec![0u16; spec.size * n_moves];
    values
        .par_chunks_mut(n_moves)
        .enumerate()
        .for_each(|(coord, row)| {
            let mut rep = CubieCube::SOLVED;
            (spec.inject)(&mut rep, coord);
            for (col, &m) in spec.moves.iter().enumerate() {
                let mut moved = rep;
                moved.apply_move(m);
                row[col] = (spec.extract)(&moved) as u16;
            }
        });
    MoveTable {
        name: spec.name,
        size: spec.size,
        moves: spec.moves,
        values,
    }
}

/// Exact distance-to-goal over a packed coordinate pair `a * |B| + b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruningTable {
    name: &'static str,
    a_size: usize,
    b_size: usize,
    depths: Vec<u8>,
}

impl PruningTable {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Sizes of the two coordinate domains this table is the product of.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.a_size, self.b_size)
    }

    /// Minimum number of moves from pair `(a, b)` to the goal pair `(0, 0)`.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> u8 {
        self.depths[a * self.b_size + b]
    }

    pub fn max_depth(&self) -> u8 {
        self.depths.iter().copied().max().unwrap_or(0)
    }

    pub(crate) fn depths(&self) -> &[u8] {
        &self.depths
    }

    pub(crate) fn from_raw(
        name: &'static str,
        a_size: usize,
        b_size: usize,
        depths: Vec<u8>,
        path: &str,
    ) -> Result<Self, TableError> {
        if depths.len() != a_size * b_size {
            return Err(TableError::Corrupt {
                path: path.to_string(),
                reason: format!("{} entries, expected {}", depths.len(), a_size * b_size),
            });
        }
        if depths[0] != 0 {
            return Err(TableError::Corrupt {
                path: path.to_string(),
                reason: "goal pair does not have distance 0".to_string(),
            });
        }
        if depths.iter().any(|&d| d == UNVISITED) {
            return Err(TableError::Corrupt {
                path: path.to_string(),
                reason: "table contains unvisited entries".to_string(),
            });
        }
        Ok(PruningTable {
            name,
            a_size,
            b_size,
            depths,
        })
    }
}

/// Breadth-first search outward from the goal pair, expanding through the
/// two move tables. The product space must be exhausted: an unreached pair
/// means the move tables disagree and the build is defective.
pub fn build_pruning_table(
    name: &'static str,
    a: &MoveTable,
    b: &MoveTable,
) -> Result<PruningTable, TableError> {
    if a.moves != b.moves {
        return Err(TableError::Inconsistent {
            table: name,
            reason: format!("{} and {} have different move sets", a.name, b.name),
        });
    }

    let n_moves = a.moves.len();
    let total = a.size * b.size;
    let mut depths = vec![UNVISITED; total];
    depths[0] = 0;
    let mut visited = 1usize;
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();
    queue.push_back((0, 0));

    while let Some((ca, cb)) = queue.pop_front() {
        let depth = depths[ca as usize * b.size + cb as usize];
        for m in 0..n_moves {
            let na = a.apply(ca as usize, m);
            let nb = b.apply(cb as usize, m);
            let idx = na * b.size + nb;
            if depths[idx] == UNVISITED {
                depths[idx] = depth + 1;
                visited += 1;
                queue.push_back((na as u32, nb as u32));
            }
        }
    }

    if visited != total {
        return Err(TableError::Inconsistent {
            table: name,
            reason: format!("{} of {total} coordinate pairs unreached", total - visited),
        });
    }

    Ok(PruningTable {
        name,
        a_size: a.size,
        b_size: b.size,
        depths,
    })
}

/// All ten tables the two-phase search consults. Built once, then shared
/// read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub twist_move: MoveTable,
    pub flip_move: MoveTable,
    pub udslice_move: MoveTable,
    pub corner_perm_move: MoveTable,
    pub ud_edge_move: MoveTable,
    pub udslice_sorted_move: MoveTable,
    pub twist_udslice_prune: PruningTable,
    pub flip_udslice_prune: PruningTable,
    pub corner_perm_udslice_prune: PruningTable,
    pub ud_edge_udslice_prune: PruningTable,
}

impl Tables {
    /// Build every table from scratch. CPU-bound; the independent tables are
    /// built across the available cores.
    pub fn build() -> Result<Tables, TableError> {
        let started = Instant::now();

        let (
            (twist_move, (flip_move, udslice_move)),
            (corner_perm_move, (ud_edge_move, udslice_sorted_move)),
        ) = rayon::join(
            || {
                rayon::join(
                    || build_move_table(&TWIST_SPEC),
                    || {
                        rayon::join(
                            || build_move_table(&FLIP_SPEC),
                            || build_move_table(&UDSLICE_SPEC),
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || build_move_table(&CORNER_PERM_SPEC),
                    || {
                        rayon::join(
                            || build_move_table(&UD_EDGE_SPEC),
                            || build_move_table(&UDSLICE_SORTED_SPEC),
                        )
                    },
                )
            },
        );
        info!("move tables built in {:.2}s", started.elapsed().as_secs_f64());

        let pruning_started = Instant::now();
        let ((twist_prune, flip_prune), (corner_perm_prune, ud_edge_prune)) = rayon::join(
            || {
                rayon::join(
                    || build_pruning_table("twist_udslice_prune", &twist_move, &udslice_move),
                    || build_pruning_table("flip_udslice_prune", &flip_move, &udslice_move),
                )
            },
            || {
                rayon::join(
                    || {
                        build_pruning_table(
                            "corner_perm_udslice_prune",
                            &corner_perm_move,
                            &udslice_sorted_move,
                        )
                    },
                    || {
                        build_pruning_table(
                            "ud_edge_udslice_prune",
                            &ud_edge_move,
                            &udslice_sorted_move,
                        )
                    },
                )
            },
        );

        let tables = Tables {
            twist_move,
            flip_move,
            udslice_move,
            corner_perm_move,
            ud_edge_move,
            udslice_sorted_move,
            twist_udslice_prune: twist_prune?,
            flip_udslice_prune: flip_prune?,
            corner_perm_udslice_prune: corner_perm_prune?,
            ud_edge_udslice_prune: ud_edge_prune?,
        };
        info!(
            "pruning tables built in {:.2}s (max depths: {} {} {} {})",
            pruning_started.elapsed().as_secs_f64(),
            tables.twist_udslice_prune.max_depth(),
            tables.flip_udslice_prune.max_depth(),
            tables.corner_perm_udslice_prune.max_depth(),
            tables.ud_edge_udslice_prune.max_depth(),
        );

        Ok(tables)
    }

    /// Load from `dir`, or build and persist there when the cache is absent,
    /// stale or corrupt.
    pub fn load_or_build(dir: &std::path::Path) -> Result<Tables, TableError> {
        cache::load_or_build(dir)
    }

    /// Deserialize a previously persisted cache. Any mismatch is an error;
    /// [`Tables::load_or_build`] treats it as "absent".
    pub fn load(dir: &std::path::Path) -> Result<Tables, TableError> {
        cache::load(dir)
    }

    /// Write all tables to `dir`, replacing whatever is there.
    pub fn persist(&self, dir: &std::path::Path) -> Result<(), TableError> {
        cache::persist(self, dir)
    }

    pub(crate) fn move_tables(&self) -> [&MoveTable; 6] {
        [
            &self.twist_move,
            &self.flip_move,
            &self.udslice_move,
            &self.corner_perm_move,
            &self.ud_edge_move,
            &self.udslice_sorted_move,
        ]
    }

    pub(crate) fn pruning_tables(&self) -> [&PruningTable; 4] {
        [
            &self.twist_udslice_prune,
            &self.flip_udslice_prune,
            &self.corner_perm_udslice_prune,
            &self.ud_edge_udslice_prune,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_move_sets_are_rejected() {
        let slice = build_move_table(&UDSLICE_SPEC);
        let sorted = build_move_table(&UDSLICE_SORTED_SPEC);
        let err = build_pruning_table("bad_pair", &slice, &sorted).unwrap_err();
        assert!(matches!(err, TableError::Inconsistent { .. }));
    }

    #[test]
    fn udslice_table_stays_in_range() {
        let table = build_move_table(&UDSLICE_SPEC);
        for coord in 0..table.size() {
            for mv in 0..table.moves().len() {
                assert!(table.apply(coord, mv) < table.size());
            }
        }
    }
}
