//! Public solve entry point.
//!
//! A [`Solver`] bundles the shared read-only tables with search limits and
//! exposes the one function the presentation layer needs: cubie state in,
//! move sequence out. Table loading/building happens once, up front; a
//! `Solver` is cheap to clone and safe to share across threads.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;

use crate::cube::{facelet, CubieCube, Face, Move};
use crate::search::{self, SearchLimits, Solution, SolveError};
use crate::tables::{TableError, Tables};

#[derive(Debug, Clone)]
pub struct Solver {
    tables: Arc<Tables>,
    limits: SearchLimits,
}

impl Solver {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self {
            tables,
            limits: SearchLimits::default(),
        }
    }

    /// Load the tables from `cache_dir`, building and persisting them there
    /// on first run (or whenever the cache is stale or corrupt).
    pub fn from_cache_dir(cache_dir: &Path) -> Result<Self, TableError> {
        Ok(Self::new(Arc::new(Tables::load_or_build(cache_dir)?)))
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    #[inline]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Solve a cubie-level snapshot. An already-solved state yields an empty
    /// sequence; applying the returned moves to `cube` yields the solved
    /// cube.
    pub fn solve(&self, cube: &CubieCube) -> Result<Solution, SolveError> {
        search::solve(&self.tables, cube, &self.limits)
    }

    /// Solve a state given as a 54-character facelet string.
    pub fn solve_facelets(&self, facelets: &str) -> Result<Solution, SolveError> {
        let cube = facelet::from_facelets(facelets).map_err(|e| SolveError::InvalidCube {
            reason: e.to_string(),
        })?;
        self.solve(&cube)
    }
}

/// Scramble the solved cube with `length` random moves, never turning the
/// same face twice in a row. Returns the scrambled state and the moves that
/// produced it.
pub fn random_scramble<R: Rng + ?Sized>(rng: &mut R, length: usize) -> (CubieCube, Vec<Move>) {
    let mut cube = CubieCube::SOLVED;
    let mut moves = Vec::with_capacity(length);
    let mut last_face: Option<Face> = None;
    while moves.len() < length {
        let m = Move::ALL[rng.gen_range(0..Move::ALL.len())];
        if Some(m.face()) == last_face {
            continue;
        }
        cube.apply_move(m);
        moves.push(m);
        last_face = Some(m.face());
    }
    (cube, moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn scramble_has_no_repeated_faces() {
        let mut rng = StdRng::seed_from_u64(7);
        let (cube, moves) = random_scramble(&mut rng, 50);
        assert_eq!(moves.len(), 50);
        assert!(moves.windows(2).all(|w| w[0].face() != w[1].face()));
        assert!(cube.verify().is_ok());
    }

    #[test]
    fn scramble_replays_to_same_state() {
        let mut rng = StdRng::seed_from_u64(99);
        let (cube, moves) = random_scramble(&mut rng, 20);
        let mut replay = CubieCube::SOLVED;
        for m in moves {
            replay.apply_move(m);
        }
        assert_eq!(replay, cube);
    }
}
