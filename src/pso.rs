//! Binary particle swarm optimization of a student×course enrollment matrix.
//!
//! Each particle is a binary enrollment matrix (1 = enrolled) with a
//! same-shaped real-valued velocity matrix. The swarm minimizes a weighted
//! sum of five penalty terms: preference violations, time clashes, repeated
//! category labels, capacity overflow and course-load shortfall. Velocities
//! follow the canonical PSO update rule (inertia + cognitive pull toward the
//! particle's personal best + social pull toward the global best); a velocity
//! becomes an enrollment probability through the logistic function and the
//! new cell value is sampled from it.
//!
//! This is a best-effort heuristic: no feasibility guarantee and no
//! optimality bound. The only guarantee is that the global-best fitness never
//! worsens across iterations, and that a fixed seed reproduces the run
//! exactly.

use crate::slot::Slot;
use log::debug;
use ndarray::{Array2, Array3, ArrayView2, Axis};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Weights of the five penalty terms. Defaults match the original tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    pub preference: f64,
    pub time: f64,
    pub label: f64,
    pub capacity: f64,
    pub course_load: f64,
}

impl Default for PenaltyWeights {
    fn default() -> PenaltyWeights {
        PenaltyWeights {
            preference: 1.0,
            time: 3.0,
            label: 4.0,
            capacity: 2.0,
            course_load: 5.0,
        }
    }
}

/// Full problem description and tuning of one swarm run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub num_students: usize,
    pub num_courses: usize,
    pub num_particles: usize,
    pub max_iterations: usize,
    pub inertia_weight: f64,
    pub cognitive_coefficient: f64,
    pub social_coefficient: f64,
    /// Per student, the course indices they would like to take.
    pub student_preferences: Vec<Vec<usize>>,
    /// Per course, its weekly time occurrences.
    pub course_times: Vec<Vec<Slot>>,
    /// Per course, its category label.
    pub course_labels: Vec<String>,
    /// Per course, its declared capacity.
    pub course_caps: Vec<u32>,
    #[serde(default)]
    pub weights: PenaltyWeights,
    #[serde(default)]
    pub seed: u64,
}

impl SwarmConfig {
    /// Reject shape mismatches before any matrix is allocated. The error
    /// names the inconsistent list.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_particles == 0 {
            return Err("num_particles must be at least 1".to_owned());
        }
        if self.student_preferences.len() != self.num_students {
            return Err(format!(
                "student_preferences has {} entries, but num_students is {}",
                self.student_preferences.len(),
                self.num_students
            ));
        }
        for (name, len) in [
            ("course_times", self.course_times.len()),
            ("course_labels", self.course_labels.len()),
            ("course_caps", self.course_caps.len()),
        ] {
            if len != self.num_courses {
                return Err(format!(
                    "{} has {} entries, but num_courses is {}",
                    name, len, self.num_courses
                ));
            }
        }
        for (student, prefs) in self.student_preferences.iter().enumerate() {
            if let Some(course) = prefs.iter().find(|&&c| c >= self.num_courses) {
                return Err(format!(
                    "student_preferences[{}] references course {} out of {}",
                    student, course, self.num_courses
                ));
            }
        }
        Ok(())
    }
}

/// The swarm state: particle positions and velocities, per-particle personal
/// bests and the single global best. Discarded after the run except for the
/// returned global best.
pub struct BinaryPso {
    config: SwarmConfig,
    /// Number of distinct category labels system-wide.
    num_labels: usize,
    positions: Array3<u8>,
    velocities: Array3<f64>,
    personal_best: Array3<u8>,
    personal_best_fitness: Vec<f64>,
    global_best: Array2<u8>,
    global_best_fitness: f64,
    history: Vec<f64>,
    rng: StdRng,
}

impl BinaryPso {
    /// Validate the configuration and initialize the swarm from the seed:
    /// positions uniform over {0, 1}, velocities uniform over [-1, 1). The
    /// best initial particle becomes the first global best, so the global
    /// best is a valid matrix from the start.
    pub fn new(config: SwarmConfig) -> Result<BinaryPso, String> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let shape = (config.num_particles, config.num_students, config.num_courses);
        let positions = Array3::from_shape_fn(shape, |_| rng.random_range(0..2u8));
        let velocities = Array3::from_shape_fn(shape, |_| rng.random_range(-1.0..1.0));
        let num_labels = config
            .course_labels
            .iter()
            .collect::<HashSet<_>>()
            .len();

        let mut pso = BinaryPso {
            config,
            num_labels,
            personal_best: positions.clone(),
            personal_best_fitness: Vec::new(),
            global_best: Array2::zeros((0, 0)),
            global_best_fitness: f64::INFINITY,
            history: Vec::new(),
            positions,
            velocities,
            rng,
        };
        let initial_fitness: Vec<f64> = (0..pso.config.num_particles)
            .map(|i| pso.fitness(&pso.positions.index_axis(Axis(0), i)))
            .collect();
        pso.personal_best_fitness = initial_fitness;
        let best = pso
            .personal_best_fitness
            .iter()
            .cloned()
            .enumerate()
            .min_by_key(|&(_, f)| OrderedFloat(f))
            .ok_or("num_particles must be at least 1")?;
        pso.global_best = pso.positions.index_axis(Axis(0), best.0).to_owned();
        pso.global_best_fitness = best.1;
        Ok(pso)
    }

    /// Weighted multi-objective penalty of one enrollment matrix (lower is
    /// better).
    pub fn fitness(&self, particle: &ArrayView2<u8>) -> f64 {
        let config = &self.config;
        let mut preference_clashes = 0u64;
        let mut time_clashes = 0u64;
        let mut label_clashes = 0u64;
        let mut capacity_overflow = 0u64;
        let mut course_load_penalty = 0u64;

        for student in 0..config.num_students {
            let enrolled: Vec<usize> = (0..config.num_courses)
                .filter(|&c| particle[[student, c]] == 1)
                .collect();
            let prefs = &config.student_preferences[student];

            let mut label_counts = HashMap::<&str, u64>::new();
            for &course in &enrolled {
                if !prefs.contains(&course) {
                    preference_clashes += 1;
                }
                *label_counts
                    .entry(config.course_labels[course].as_str())
                    .or_insert(0) += 1;
            }

            for i in 0..enrolled.len() {
                for j in i + 1..enrolled.len() {
                    for slot_i in &config.course_times[enrolled[i]] {
                        for slot_j in &config.course_times[enrolled[j]] {
                            if slot_i.overlaps(slot_j) {
                                time_clashes += 1;
                            }
                        }
                    }
                }
            }

            label_clashes += label_counts.values().filter(|&&n| n > 1).map(|n| n - 1).sum::<u64>();

            // Encourage broad coverage of the available category labels.
            let distinct = label_counts.len();
            if distinct < self.num_labels {
                course_load_penalty += (self.num_labels - distinct) as u64;
            }
        }

        for course in 0..config.num_courses {
            let enrolled: u64 = (0..config.num_students)
                .map(|s| particle[[s, course]] as u64)
                .sum();
            let cap = config.course_caps[course] as u64;
            if enrolled > cap {
                capacity_overflow += enrolled - cap;
            }
        }

        config.weights.preference * preference_clashes as f64
            + config.weights.time * time_clashes as f64
            + config.weights.label * label_clashes as f64
            + config.weights.capacity * capacity_overflow as f64
            + config.weights.course_load * course_load_penalty as f64
    }

    /// Canonical PSO velocity update, with two fresh random coefficients per
    /// cell.
    fn update_velocities(&mut self) {
        let w = self.config.inertia_weight;
        let c1 = self.config.cognitive_coefficient;
        let c2 = self.config.social_coefficient;
        for i in 0..self.config.num_particles {
            for s in 0..self.config.num_students {
                for c in 0..self.config.num_courses {
                    let r1: f64 = self.rng.random();
                    let r2: f64 = self.rng.random();
                    let x = self.positions[[i, s, c]] as f64;
                    let p = self.personal_best[[i, s, c]] as f64;
                    let g = self.global_best[[s, c]] as f64;
                    self.velocities[[i, s, c]] = w * self.velocities[[i, s, c]]
                        + c1 * r1 * (p - x)
                        + c2 * r2 * (g - x);
                }
            }
        }
    }

    /// Sample each cell anew: enrolled with probability sigmoid(velocity).
    fn update_positions(&mut self) {
        for i in 0..self.config.num_particles {
            for s in 0..self.config.num_students {
                for c in 0..self.config.num_courses {
                    let probability = 1.0 / (1.0 + (-self.velocities[[i, s, c]]).exp());
                    self.positions[[i, s, c]] =
                        u8::from(self.rng.random::<f64>() < probability);
                }
            }
        }
    }

    fn update_bests(&mut self) {
        for i in 0..self.config.num_particles {
            let fitness = self.fitness(&self.positions.index_axis(Axis(0), i));
            if fitness < self.personal_best_fitness[i] {
                self.personal_best_fitness[i] = fitness;
                self.personal_best
                    .index_axis_mut(Axis(0), i)
                    .assign(&self.positions.index_axis(Axis(0), i));
            }
            if fitness < self.global_best_fitness {
                self.global_best_fitness = fitness;
                self.global_best = self.positions.index_axis(Axis(0), i).to_owned();
            }
        }
    }

    /// Run the fixed number of iterations and return the global-best matrix
    /// with its fitness. No convergence-based early stop.
    pub fn run(&mut self) -> (Array2<u8>, f64) {
        for iteration in 0..self.config.max_iterations {
            self.update_velocities();
            self.update_positions();
            self.update_bests();
            self.history.push(self.global_best_fitness);
            debug!(
                "Iteration {}/{}: best fitness {}",
                iteration + 1,
                self.config.max_iterations,
                self.global_best_fitness
            );
        }
        (self.global_best.clone(), self.global_best_fitness)
    }

    /// Global-best fitness after each completed iteration; non-increasing.
    pub fn best_fitness_history(&self) -> &[f64] {
        &self.history
    }

    pub fn global_best(&self) -> (&Array2<u8>, f64) {
        (&self.global_best, self.global_best_fitness)
    }
}
