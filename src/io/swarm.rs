//! Loading of a swarm problem description from JSON.
//!
//! The document is a JSON object with the fields of
//! [`SwarmConfig`](crate::pso::SwarmConfig). Slots may be written either as
//! `"Day HH-HH"` strings or as `[day, start, end]` triples; the penalty
//! weights and the seed are optional and fall back to their defaults. The
//! configuration is validated before it is returned.

use crate::pso::SwarmConfig;

/// Read and validate a swarm problem description.
pub fn read<R: std::io::Read>(reader: R) -> Result<SwarmConfig, String> {
    let config: SwarmConfig = serde_json::from_reader(reader).map_err(|e| e.to_string())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod test {
    const PROBLEM: &str = r#"{
        "num_students": 2,
        "num_courses": 2,
        "num_particles": 4,
        "max_iterations": 10,
        "inertia_weight": 0.7,
        "cognitive_coefficient": 1.5,
        "social_coefficient": 1.5,
        "student_preferences": [[0], [1]],
        "course_times": [["Monday 9-10"], [["Tuesday", 9, "11"]]],
        "course_labels": ["theory", "lab"],
        "course_caps": [2, 2],
        "seed": 7
    }"#;

    #[test]
    fn parse_problem_with_both_slot_shapes() {
        let config = super::read(PROBLEM.as_bytes()).unwrap();
        assert_eq!(config.num_students, 2);
        assert_eq!(config.course_times[0][0].to_string(), "Monday 9-10");
        assert_eq!(config.course_times[1][0].to_string(), "Tuesday 9-11");
        assert_eq!(config.seed, 7);
        // Weights were omitted and fall back to the original tuning.
        assert_eq!(config.weights.course_load, 5.0);
    }

    #[test]
    fn shape_mismatch_is_rejected_on_read() {
        let broken = PROBLEM.replace("\"course_caps\": [2, 2]", "\"course_caps\": [2]");
        let err = super::read(broken.as_bytes()).unwrap_err();
        assert!(err.contains("course_caps"), "{}", err);
    }

    #[test]
    fn malformed_slot_is_rejected() {
        let broken = PROBLEM.replace("Monday 9-10", "sometime");
        assert!(super::read(broken.as_bytes()).is_err());
    }
}
