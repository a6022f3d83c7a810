//! Comparison of two solution sets against each other, e.g. the engine's
//! output against an independent exact solver used as ground truth.
//!
//! Both sides are given in a common tabular form: one row per chosen offering
//! of a solution. Each solution is canonicalized to an order-independent set
//! of (offering id, slot list) pairs, so neither row order nor course naming
//! nor solution labels affect the comparison. The result partitions the
//! canonical solutions into "only in A", "only in B" and "in both".

use crate::{Assignment, ConstraintMap};
use std::collections::BTreeSet;
use std::fmt::Write;

/// One row of the tabular solution interchange form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRow {
    /// Solution identifier grouping rows into solutions.
    pub solution: String,
    pub offering_id: String,
    pub course_name: String,
    /// Ordered slot keys of the offering.
    pub slots: Vec<String>,
}

/// A solution reduced to its identity: which offerings at which times.
pub type CanonicalSolution = BTreeSet<(String, Vec<String>)>;

/// Result of comparing two solution sets.
#[derive(Debug)]
pub struct ComparisonReport {
    pub only_a: Vec<CanonicalSolution>,
    pub only_b: Vec<CanonicalSolution>,
    pub both: Vec<CanonicalSolution>,
}

impl ComparisonReport {
    /// Set equality up to canonicalization.
    pub fn is_equal(&self) -> bool {
        self.only_a.is_empty() && self.only_b.is_empty()
    }
}

/// Convert the exact solver's output into interchange rows, labelling the
/// solutions `S0`, `S1`, … in input order.
pub fn rows_from_assignments(
    assignments: &[Assignment],
    constraints: &ConstraintMap,
) -> Vec<SolutionRow> {
    let mut rows = Vec::new();
    for (index, assignment) in assignments.iter().enumerate() {
        for (course_name, offering_id) in assignment {
            let slots = constraints
                .get(offering_id)
                .map(|s| s.slot_keys.clone())
                .unwrap_or_default();
            rows.push(SolutionRow {
                solution: format!("S{}", index),
                offering_id: offering_id.clone(),
                course_name: course_name.clone(),
                slots,
            });
        }
    }
    rows
}

/// Group rows by solution identifier and canonicalize each group.
pub fn canonicalize(rows: &[SolutionRow]) -> BTreeSet<CanonicalSolution> {
    let mut grouped = std::collections::HashMap::<&str, CanonicalSolution>::new();
    for row in rows {
        grouped
            .entry(&row.solution)
            .or_default()
            .insert((row.offering_id.clone(), row.slots.clone()));
    }
    grouped.into_values().collect()
}

/// Partition the canonicalized solution sets of `a` and `b`.
pub fn compare(a: &[SolutionRow], b: &[SolutionRow]) -> ComparisonReport {
    let set_a = canonicalize(a);
    let set_b = canonicalize(b);
    ComparisonReport {
        only_a: set_a.difference(&set_b).cloned().collect(),
        only_b: set_b.difference(&set_a).cloned().collect(),
        both: set_a.intersection(&set_b).cloned().collect(),
    }
}

/// Format the comparison into a human-readable sectioned report.
pub fn format_report(report: &ComparisonReport) -> String {
    let mut out = String::new();
    for (title, solutions) in [
        ("Only in A", &report.only_a),
        ("Only in B", &report.only_b),
        ("In Both", &report.both),
    ] {
        writeln!(out, "=== {} ({} solutions) ===", title, solutions.len()).unwrap();
        for solution in solutions {
            for (offering_id, slots) in solution {
                writeln!(out, "{}: {:?}", offering_id, slots).unwrap();
            }
            writeln!(out, "{}", "-".repeat(40)).unwrap();
        }
        writeln!(out).unwrap();
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(solution: &str, id: &str, name: &str, slots: &[&str]) -> SolutionRow {
        SolutionRow {
            solution: solution.to_owned(),
            offering_id: id.to_owned(),
            course_name: name.to_owned(),
            slots: slots.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn canonicalization_ignores_row_order_and_labels() {
        let a = vec![
            row("X", "M1", "Math", &["Monday 9-10"]),
            row("X", "C2", "CS", &["Tuesday 9-10"]),
        ];
        let b = vec![
            row("7", "C2", "CS", &["Tuesday 9-10"]),
            row("7", "M1", "Math", &["Monday 9-10"]),
        ];
        let report = compare(&a, &b);
        assert!(report.is_equal());
        assert_eq!(report.both.len(), 1);
    }

    #[test]
    fn partition_separates_disagreements() {
        let a = vec![
            row("S0", "M1", "Math", &["Monday 9-10"]),
            row("S1", "M2", "Math", &["Monday 10-11"]),
        ];
        let b = vec![
            row("S0", "M1", "Math", &["Monday 9-10"]),
            row("S1", "M3", "Math", &["Friday 10-11"]),
        ];
        let report = compare(&a, &b);
        assert!(!report.is_equal());
        assert_eq!(report.only_a.len(), 1);
        assert_eq!(report.only_b.len(), 1);
        assert_eq!(report.both.len(), 1);
    }

    #[test]
    fn report_lists_all_sections() {
        let a = vec![row("S0", "M1", "Math", &["Monday 9-10"])];
        let report = format_report(&compare(&a, &[]));
        assert!(report.contains("=== Only in A (1 solutions) ==="));
        assert!(report.contains("=== Only in B (0 solutions) ==="));
        assert!(report.contains("=== In Both (0 solutions) ==="));
        assert!(report.contains("M1: [\"Monday 9-10\"]"));
    }
}
