//! Input and output formats of the solver collaborators: JSON catalog and
//! swarm-problem ingestion, and solution output as text or JSON.

pub mod catalog;
pub mod swarm;

use crate::Assignment;
use ndarray::Array2;
use serde_json::json;
use std::fmt::Write;

/// Format the enumerated schedules into a human readable String (e.g. to
/// print them to stdout).
///
/// The output format will look like
/// ```text
/// ===== Solution 1 =====
/// CS: C2
/// Math: M1
///
/// ===== Solution 2 =====
/// …
/// ```
pub fn format_solutions(solutions: &[Assignment]) -> String {
    let mut result = String::new();
    for (index, solution) in solutions.iter().enumerate() {
        write!(result, "\n===== Solution {} =====\n", index + 1).unwrap();
        for (course_name, offering_id) in solution {
            write!(result, "{}: {}\n", course_name, offering_id).unwrap();
        }
    }
    result
}

/// Write the enumerated schedules as a versioned JSON document to a Writer
/// (e.g. an output file).
pub fn write_solutions<W: std::io::Write>(
    writer: W,
    solutions: &[Assignment],
) -> Result<(), String> {
    let s: serde_json::Value = serde_json::to_value(solutions).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": "X-schedule-solutions",
        "version": "1.0",
        "solutions": s
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

/// Format a binary enrollment matrix as one row of 0/1 digits per student.
pub fn format_enrollment(matrix: &Array2<u8>) -> String {
    let mut result = String::new();
    for row in matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        write!(result, "{}\n", cells.join(" ")).unwrap();
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn format_solutions_lists_choices_per_solution() {
        let mut solution = Assignment::new();
        solution.insert("Math".to_owned(), "M1".to_owned());
        solution.insert("CS".to_owned(), "C2".to_owned());
        let text = format_solutions(&[solution]);
        assert!(text.contains("===== Solution 1 ====="));
        assert!(text.contains("Math: M1"));
        assert!(text.contains("CS: C2"));
    }

    #[test]
    fn write_solutions_emits_versioned_json() {
        let mut solution = Assignment::new();
        solution.insert("Math".to_owned(), "M2".to_owned());
        let mut buffer = Vec::<u8>::new();
        write_solutions(&mut buffer, &[solution]).unwrap();

        let mut data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
        assert_eq!(data["format"], "X-schedule-solutions");
        let parsed: Vec<Assignment> =
            serde_json::from_value(data["solutions"].take()).unwrap();
        assert_eq!(parsed[0]["Math"], "M2");
    }

    #[test]
    fn format_enrollment_prints_binary_rows() {
        let matrix = array![[1u8, 0, 1], [0, 0, 1]];
        assert_eq!(format_enrollment(&matrix), "1 0 1\n0 0 1\n");
    }
}
