//! Two-phase iterative-deepening search.
//!
//! The outer loop raises a total move budget `max_depth` from 0 to the
//! configured ceiling. Phase 1 runs a depth-first search over all 18 moves
//! on the (twist, flip, udslice) coordinates, pruning any branch whose
//! admissible lower bound — the max of the two phase-1 pruning tables —
//! exceeds the remaining budget. When the coordinates hit (0, 0, 0) the
//! state is in the subgroup reachable without disturbing orientations or
//! slice membership; the search re-derives the phase-2 coordinates from the
//! cubie-level state and spends the leftover budget on a phase-2 search over
//! the ten subgroup-preserving moves.
//!
//! The first complete solution is returned immediately. With the
//! deterministic left-to-right move ordering this is the shortest solution
//! findable at the smallest feasible budget, which tracks near-optimal
//! length; global optimality is not guaranteed.
//!
//! Search state lives in value parameters and one move accumulator that is
//! pushed/popped around each recursive call, so the search is testable in
//! isolation from table construction.

use std::fmt;
use std::time::{Duration, Instant};

use log::debug;

use crate::coords;
use crate::cube::{CubieCube, Move, PHASE2_MOVES};
use crate::tables::Tables;

/// Depth and wall-clock budgets for one `solve` call.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Hard ceiling on total solution length.
    pub max_length: usize,
    /// Wall-clock budget before the search reports exhaustion.
    pub timeout: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_length: 23,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A move sequence returning the input state to the solved cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    /// How many leading moves belong to phase 1.
    pub phase1_length: usize,
}

impl Solution {
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.moves.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
/// Recoverable solve failures. An already-solved input is not a failure; it
/// yields an empty [`Solution`] without entering the search.
pub enum SolveError {
    /// The input violates the cube group invariants; searching would never
    /// terminate with a valid solution.
    InvalidCube { reason: String },
    /// No solution found within the depth ceiling and wall-clock budget.
    /// Retrying with larger [`SearchLimits`] is the intended recovery.
    SearchExhausted {
        max_length: usize,
        elapsed: Duration,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidCube { reason } => write!(f, "invalid cube state: {reason}"),
            SolveError::SearchExhausted {
                max_length,
                elapsed,
            } => write!(
                f,
                "no solution within {max_length} moves ({:.2}s elapsed)",
                elapsed.as_secs_f64()
            ),
        }
    }
}

impl std::error::Error for SolveError {}

/// Find a move sequence solving `cube`, consulting the shared read-only
/// `tables`.
pub fn solve(
    tables: &Tables,
    cube: &CubieCube,
    limits: &SearchLimits,
) -> Result<Solution, SolveError> {
    cube.verify().map_err(|e| SolveError::InvalidCube {
        reason: e.to_string(),
    })?;
    if cube.is_solved() {
        return Ok(Solution {
            moves: Vec::new(),
            phase1_length: 0,
        });
    }

    let started = Instant::now();
    let mut search = Search {
        tables,
        start: *cube,
        deadline: started + limits.timeout,
        nodes: 0,
        timed_out: false,
        solution: None,
    };

    let twist = coords::twist(cube);
    let flip = coords::flip(cube);
    let udslice = coords::udslice(cube);

    let mut moves = Vec::with_capacity(limits.max_length);
    for max_depth in 0..=limits.max_length {
        if Instant::now() >= search.deadline {
            search.timed_out = true;
            break;
        }
        if search.phase1(twist, flip, udslice, max_depth, &mut moves) {
            break;
        }
    }

    match search.solution {
        Some(solution) => {
            debug!(
                "solved in {} moves ({} phase 1) after {} nodes, {:.3}s",
                solution.len(),
                solution.phase1_length,
                search.nodes,
                started.elapsed().as_secs_f64()
            );
            Ok(solution)
        }
        None => Err(SolveError::SearchExhausted {
            max_length: limits.max_length,
            elapsed: started.elapsed(),
        }),
    }
}

struct Search<'a> {
    tables: &'a Tables,
    start: CubieCube,
    deadline: Instant,
    nodes: u64,
    timed_out: bool,
    solution: Option<Solution>,
}

impl Search<'_> {
    /// Deadline check, amortized over blocks of 4096 nodes. Returns true
    /// once the search should unwind.
    #[inline]
    fn stop_for_deadline(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes & 0xFFF == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
        }
        self.timed_out
    }

    /// One phase-1 node with `remaining` total budget below it. Returns true
    /// when the whole search should unwind: a solution was recorded or the
    /// deadline passed.
    fn phase1(
        &mut self,
        twist: usize,
        flip: usize,
        udslice: usize,
        remaining: usize,
        moves: &mut Vec<Move>,
    ) -> bool {
        if twist == 0 && flip == 0 && udslice == 0 {
            return self.phase2_root(remaining, moves);
        }
        if remaining == 0 {
            return false;
        }

        let bound = self
            .tables
            .twist_udslice_prune
            .distance(twist, udslice)
            .max(self.tables.flip_udslice_prune.distance(flip, udslice));
        if bound as usize > remaining {
            return false;
        }

        for &m in Move::ALL.iter() {
            if !m.allowed_after(moves.last().copied()) {
                continue;
            }
            if self.stop_for_deadline() {
                return true;
            }
            let mi = m.index();
            moves.push(m);
            let stop = self.phase1(
                self.tables.twist_move.apply(twist, mi),
                self.tables.flip_move.apply(flip, mi),
                self.tables.udslice_move.apply(udslice, mi),
                remaining - 1,
                moves,
            );
            moves.pop();
            if stop {
                return true;
            }
        }
        false
    }

    /// Entered on every phase-1 goal hit: derive the phase-2 coordinates
    /// from the state the phase-1 prefix produces and spend the leftover
    /// budget on phase 2, shortest completion first.
    fn phase2_root(&mut self, budget: usize, moves: &mut Vec<Move>) -> bool {
        let mut cube = self.start;
        for &m in moves.iter() {
            cube.apply_move(m);
        }
        let corner_perm = coords::corner_perm(&cube);
        let ud_edges = coords::ud_edge_perm(&cube);
        let udslice_sorted = coords::udslice_sorted(&cube);
        let phase1_length = moves.len();

        if corner_perm == 0 && ud_edges == 0 && udslice_sorted == 0 {
            self.solution = Some(Solution {
                moves: moves.clone(),
                phase1_length,
            });
            return true;
        }

        let bound = self
            .tables
            .corner_perm_udslice_prune
            .distance(corner_perm, udslice_sorted)
            .max(
                self.tables
                    .ud_edge_udslice_prune
                    .distance(ud_edges, udslice_sorted),
            ) as usize;
        if bound > budget {
            return false;
        }

        for depth in bound.max(1)..=budget {
            if self.phase2(
                corner_perm,
                ud_edges,
                udslice_sorted,
                depth,
                moves,
                phase1_length,
            ) {
                return true;
            }
        }
        false
    }

    fn phase2(
        &mut self,
        corner_perm: usize,
        ud_edges: usize,
        udslice_sorted: usize,
        remaining: usize,
        moves: &mut Vec<Move>,
        phase1_length: usize,
    ) -> bool {
        if remaining == 0 {
            if corner_perm == 0 && ud_edges == 0 && udslice_sorted == 0 {
                self.solution = Some(Solution {
                    moves: moves.clone(),
                    phase1_length,
                });
                return true;
            }
            return false;
        }

        let bound = self
            .tables
            .corner_perm_udslice_prune
            .distance(corner_perm, udslice_sorted)
            .max(
                self.tables
                    .ud_edge_udslice_prune
                    .distance(ud_edges, udslice_sorted),
            );
        if bound as usize > remaining {
            return false;
        }

        for (mi, &m) in PHASE2_MOVES.iter().enumerate() {
            if !m.allowed_after(moves.last().copied()) {
                continue;
            }
            if self.stop_for_deadline() {
                return true;
            }
            moves.push(m);
            let stop = self.phase2(
                self.tables.corner_perm_move.apply(corner_perm, mi),
                self.tables.ud_edge_move.apply(ud_edges, mi),
                self.tables.udslice_sorted_move.apply(udslice_sorted, mi),
                remaining - 1,
                moves,
                phase1_length,
            );
            moves.pop();
            if stop {
                return true;
            }
        }
        false
    }
}
