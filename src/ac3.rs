//! Arc-consistency pruning of per-course candidate domains (AC-3).
//!
//! One variable per course name, its domain being the offering ids that share
//! the name. Two offering ids conflict if they occupy the same time; see
//! [`ConflictMode`] for the two supported notions of "same time". The engine
//! removes user-forbidden values up front, then runs worklist propagation
//! until every remaining value has support in every other domain. Termination
//! is guaranteed: domains are finite and only ever shrink.
//!
//! The arc queue is seeded with *every* ordered pair of distinct course names
//! rather than only actually-conflicting pairs. That is an intentional
//! over-approximation (O(n²) arcs), acceptable for catalog-sized inputs.
//!
//! Every domain mutation and detected conflict is appended to an ordered,
//! human-readable trace, which is part of the engine's output contract.

use crate::backtrack::{self, CancelToken, Enumeration, SearchLimits};
use crate::ConstraintMap;
use log::debug;
use std::collections::{HashSet, VecDeque};

/// How two offering ids are tested for a time conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictMode {
    /// Legacy-compatible: slot-key lists intersect under exact string
    /// equality. Offerings must share the same time granularity for this to
    /// be meaningful; overlapping but unequal ranges go undetected.
    #[default]
    ExactKey,
    /// True half-open interval overlap on the parsed slots.
    IntervalOverlap,
}

/// The AC-3 engine: pruned domains plus the diagnostic trace.
///
/// Domains are mutated only during [`Ac3::run`]; afterwards they are frozen
/// and handed to the backtracking enumerator.
pub struct Ac3<'a> {
    constraints: &'a ConstraintMap,
    mode: ConflictMode,
    variables: Vec<String>,
    domains: Vec<Vec<String>>,
    queue: VecDeque<(usize, usize)>,
    trace: Vec<String>,
}

impl<'a> Ac3<'a> {
    /// Set up domains and the arc queue.
    ///
    /// `picks` are previously chosen offering ids: each one whose slots all
    /// avoid the no-class constraints seeds its course name's domain with
    /// exactly that id; the rest are dropped with a trace entry (never kept
    /// silently). `no_class` is a list of forbidden `(day, time)` pairs; a
    /// course name whose candidates are all forbidden is dropped up front
    /// with a trace entry, and the remaining courses are solved without it.
    pub fn new(
        constraints: &'a ConstraintMap,
        picks: &[String],
        no_class: &[(String, String)],
        mode: ConflictMode,
    ) -> Ac3<'a> {
        let forbidden: HashSet<String> = no_class
            .iter()
            .map(|(day, time)| crate::slot::slot_key(day, time))
            .collect();

        let mut variables = Vec::<String>::new();
        let mut domains = Vec::<Vec<String>>::new();
        let mut trace = Vec::<String>::new();

        // Lock in user picks first, by id.
        let mut skipped_picks = Vec::<&str>::new();
        for pick in picks {
            let info = match constraints.get(pick) {
                Some(info) => info,
                None => continue,
            };
            if info.slot_keys.iter().all(|k| !forbidden.contains(k)) {
                let dom = match variables.iter().position(|v| *v == info.course_name) {
                    Some(i) => &mut domains[i],
                    None => {
                        variables.push(info.course_name.clone());
                        domains.push(Vec::new());
                        domains.last_mut().unwrap()
                    }
                };
                if !dom.contains(pick) {
                    dom.push(pick.clone());
                }
            } else {
                skipped_picks.push(pick.as_str());
            }
        }
        if !skipped_picks.is_empty() {
            trace.push(format!(
                "Skipped picked {} due to no-class constraint",
                skipped_picks.join(", ")
            ));
        }

        // Fill in all other course names from the catalog, skipping offerings
        // that touch a forbidden slot. A course name losing all its candidates
        // is dropped entirely: an empty domain in the variable set would deny
        // support to every other domain and wipe out the whole problem during
        // propagation.
        let mut dropped = Vec::<String>::new();
        for (_, info) in constraints.iter() {
            if variables.contains(&info.course_name) || dropped.contains(&info.course_name) {
                continue;
            }
            let mut allowed = Vec::<String>::new();
            let mut pruned = Vec::<&str>::new();
            for (id, detail) in constraints.iter() {
                if detail.course_name != info.course_name {
                    continue;
                }
                if detail.slot_keys.iter().all(|k| !forbidden.contains(k)) {
                    allowed.push(id.clone());
                } else {
                    pruned.push(id.as_str());
                }
            }
            if !pruned.is_empty() {
                trace.push(format!(
                    "Pruned {} from {} due to no-class constraint",
                    pruned.join(", "),
                    info.course_name
                ));
            }
            if allowed.is_empty() {
                trace.push(format!(
                    "Dropped {}: no offerings remain after no-class constraint",
                    info.course_name
                ));
                dropped.push(info.course_name.clone());
                continue;
            }
            variables.push(info.course_name.clone());
            domains.push(allowed);
        }

        // Smallest domains first: deterministic enumeration order and early
        // failure. The sort is stable, so ties keep catalog order.
        let mut order: Vec<usize> = (0..variables.len()).collect();
        order.sort_by_key(|&i| domains[i].len());
        let variables: Vec<String> = order.iter().map(|&i| variables[i].clone()).collect();
        let domains: Vec<Vec<String>> = order.into_iter().map(|i| domains[i].clone()).collect();

        trace.push(format!(
            "Domains initialized: {}",
            variables
                .iter()
                .zip(&domains)
                .map(|(v, d)| format!("{}({})", v, d.len()))
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let n = variables.len();
        let queue: VecDeque<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|(i, j)| i != j)
            .collect();
        trace.push(format!("Queue initialized with {} arcs", queue.len()));

        Ac3 {
            constraints,
            mode,
            variables,
            domains,
            queue,
            trace,
        }
    }

    /// Course names in enumeration order (ascending initial domain size).
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Candidate offering ids per variable, parallel to [`Ac3::variables`].
    pub fn domains(&self) -> &[Vec<String>] {
        &self.domains
    }

    /// The ordered diagnostic trace collected so far.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn mode(&self) -> ConflictMode {
        self.mode
    }

    /// Do offering ids `a` and `b` occupy a common time? Returns a description
    /// of the first conflict found.
    fn conflict(&self, a: &str, b: &str) -> Option<String> {
        let sa = self.constraints.get(a)?;
        let sb = self.constraints.get(b)?;
        match self.mode {
            ConflictMode::ExactKey => {
                for ka in &sa.slot_keys {
                    if sb.slot_keys.contains(ka) {
                        return Some(format!(
                            "Conflict detected: {} and {} have overlapping timeslot {}",
                            a, b, ka
                        ));
                    }
                }
                None
            }
            ConflictMode::IntervalOverlap => {
                for slot_a in &sa.slots {
                    for slot_b in &sb.slots {
                        if slot_a.overlaps(slot_b) {
                            return Some(format!(
                                "Conflict detected: {} ({}) overlaps {} ({})",
                                a, slot_a, b, slot_b
                            ));
                        }
                    }
                }
                None
            }
        }
    }

    /// Remove values of `xi`'s domain that have no support in `xj`'s domain.
    /// Returns whether anything was pruned.
    fn revise(&mut self, xi: usize, xj: usize) -> bool {
        debug!(
            "Revising domain for {} (current: {:?})",
            self.variables[xi], self.domains[xi]
        );
        let candidates = self.domains[xi].clone();
        let others = self.domains[xj].clone();
        let mut newdom = Vec::with_capacity(candidates.len());
        let mut pruned = false;
        for vi in candidates {
            let mut supported = false;
            for vj in &others {
                match self.conflict(&vi, vj) {
                    None => {
                        supported = true;
                        break;
                    }
                    Some(event) => self.trace.push(event),
                }
            }
            if supported {
                newdom.push(vi);
            } else {
                pruned = true;
                self.trace.push(format!(
                    "Pruned {} from {} (no support in {})",
                    vi, self.variables[xi], self.variables[xj]
                ));
            }
        }
        if pruned {
            self.domains[xi] = newdom;
        }
        pruned
    }

    /// Worklist propagation to the arc-consistent fixpoint.
    pub fn run(&mut self) {
        debug!("Domains before pruning: {:?}", self.domains);
        while let Some((xi, xj)) = self.queue.pop_front() {
            if self.revise(xi, xj) {
                // Everything that was consistent against xi's old domain must
                // be re-checked against the smaller one.
                for xk in 0..self.variables.len() {
                    if xk != xi && xk != xj {
                        self.queue.push_back((xk, xi));
                    }
                }
            }
        }
        debug!("Domains after pruning: {:?}", self.domains);
        self.trace.push("AC-3 done.".to_owned());
    }

    /// Run propagation, then enumerate all consistent full assignments over
    /// the pruned domains. Returns the enumeration result together with the
    /// complete diagnostic trace.
    pub fn solve(
        mut self,
        limits: &SearchLimits,
        token: &CancelToken,
    ) -> (Enumeration, Vec<String>) {
        self.run();
        let enumeration = backtrack::enumerate(
            self.constraints,
            self.mode,
            &self.variables,
            &self.domains,
            limits,
            token,
        );
        (enumeration, self.trace)
    }
}
