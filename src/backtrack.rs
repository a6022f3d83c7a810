//! Exhaustive backtracking enumeration over pruned domains.
//!
//! Depth-first search over the course names in domain order. Each depth tries
//! every candidate offering id, re-checks *global* consistency over the whole
//! assigned prefix (not just against the parent), recurses, and undoes the
//! choice. Every full consistent assignment is recorded and the search
//! continues, so the output is the complete solution set. The search space is
//! worst-case exponential; the only mitigations are the upstream pruning and
//! the explicit limits below.
//!
//! The assignment under construction is an owned stack of per-depth candidate
//! indices rather than a shared mutable map, so independent subtrees could be
//! searched in parallel without aliasing.

use crate::ac3::ConflictMode;
use crate::{Assignment, ConstraintMap};
use log::debug;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resource limits for one enumeration run. `Default` means unbounded.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// Maximum number of candidate placements to try.
    pub max_nodes: Option<u64>,
    /// Wall-clock budget, measured from the start of the run.
    pub timeout: Option<Duration>,
}

/// Cooperative cancellation flag, checked between candidate placements.
/// Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of an enumeration run.
#[derive(Debug)]
pub struct Enumeration {
    /// All solutions found, in depth-first discovery order.
    pub solutions: Vec<Assignment>,
    /// False if a node budget, deadline or cancellation stopped the search
    /// before exhaustion; the solution list is then a subset.
    pub complete: bool,
    /// Number of candidate placements tried.
    pub nodes: u64,
}

/// Enumerate all consistent full assignments over the given domains.
///
/// Variables with an empty domain are dropped up front; if none survive, the
/// result is the empty solution set ("infeasible under current constraints",
/// not an error).
pub fn enumerate(
    constraints: &ConstraintMap,
    mode: ConflictMode,
    variables: &[String],
    domains: &[Vec<String>],
    limits: &SearchLimits,
    token: &CancelToken,
) -> Enumeration {
    let mut vars = Vec::<&String>::new();
    let mut doms = Vec::<&Vec<String>>::new();
    for (v, d) in variables.iter().zip(domains) {
        if d.is_empty() {
            debug!("Dropping {} from enumeration: empty domain", v);
        } else {
            vars.push(v);
            doms.push(d);
        }
    }

    let mut search = Search {
        constraints,
        mode,
        variables: vars,
        domains: doms,
        deadline: limits.timeout.map(|t| Instant::now() + t),
        max_nodes: limits.max_nodes,
        token,
        chosen: Vec::new(),
        solutions: Vec::new(),
        nodes: 0,
        aborted: false,
    };
    if !search.variables.is_empty() {
        search.dfs(0);
    }
    Enumeration {
        solutions: search.solutions,
        complete: !search.aborted,
        nodes: search.nodes,
    }
}

struct Search<'a> {
    constraints: &'a ConstraintMap,
    mode: ConflictMode,
    variables: Vec<&'a String>,
    domains: Vec<&'a Vec<String>>,
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
    token: &'a CancelToken,
    /// Candidate index chosen per depth; `chosen.len()` is the current depth.
    chosen: Vec<usize>,
    solutions: Vec<Assignment>,
    nodes: u64,
    aborted: bool,
}

impl Search<'_> {
    fn dfs(&mut self, depth: usize) {
        if depth == self.variables.len() {
            let solution: Assignment = self
                .chosen
                .iter()
                .enumerate()
                .map(|(d, &c)| (self.variables[d].clone(), self.domains[d][c].clone()))
                .collect();
            debug!("Found solution {:?}", solution);
            self.solutions.push(solution);
            return;
        }
        for candidate in 0..self.domains[depth].len() {
            self.nodes += 1;
            if self.out_of_budget() {
                self.aborted = true;
                return;
            }
            self.chosen.push(candidate);
            if self.consistent() {
                self.dfs(depth + 1);
            }
            self.chosen.pop();
            if self.aborted {
                return;
            }
        }
    }

    fn out_of_budget(&self) -> bool {
        if self.token.is_cancelled() {
            debug!("Enumeration cancelled after {} nodes", self.nodes);
            return true;
        }
        if let Some(max) = self.max_nodes {
            if self.nodes > max {
                debug!("Node budget of {} exhausted", max);
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                debug!("Deadline reached after {} nodes", self.nodes);
                return true;
            }
        }
        false
    }

    /// Global consistency of the whole assigned prefix: no time shared by any
    /// two chosen offerings.
    fn consistent(&self) -> bool {
        let schedules = self
            .chosen
            .iter()
            .enumerate()
            .filter_map(|(d, &c)| self.constraints.get(&self.domains[d][c]));
        match self.mode {
            ConflictMode::ExactKey => {
                let mut seen = HashSet::<&str>::new();
                for schedule in schedules {
                    for key in &schedule.slot_keys {
                        if !seen.insert(key) {
                            return false;
                        }
                    }
                }
                true
            }
            ConflictMode::IntervalOverlap => {
                let mut slots = Vec::<&crate::slot::Slot>::new();
                for schedule in schedules {
                    for slot in &schedule.slots {
                        if slots.iter().any(|&other| slot.overlaps(other)) {
                            return false;
                        }
                        slots.push(slot);
                    }
                }
                true
            }
        }
    }
}
