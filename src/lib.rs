//! Course schedule solving with two alternative strategies: exact enumeration
//! of all conflict-free schedules (AC-3 constraint propagation followed by
//! backtracking, see [`ac3`] and [`backtrack`]) and approximate search for a
//! good student enrollment matrix under soft, weighted constraints (binary
//! particle swarm optimization, see [`pso`]). The [`oracle`] module compares
//! solution sets against an independent reference solver.
//!
//! The two strategies do not share state: the exact path works on per-course
//! domains of offering ids derived from a [`ConstraintMap`], the swarm path on
//! its own [`pso::SwarmConfig`]. Callers pick one.

pub mod ac3;
pub mod backtrack;
pub mod io;
pub mod oracle;
pub mod pso;
pub mod slot;

use crate::slot::{normalize, slot_key, Slot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One catalog record: a single weekly occurrence of an offering.
///
/// Several records may share the same `id`; together they form one
/// schedulable offering that meets more than once a week. Immutable once
/// loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    /// Course name; offerings sharing a name are interchangeable candidates.
    pub name: String,
    /// Program/cohort tag.
    pub program: String,
    pub instructor: String,
    /// Offering id, unique per schedulable instance (not per record).
    pub id: String,
    pub room: String,
    /// Day of week, whitespace-normalized.
    pub day: String,
    /// Hour range as `"HH-HH"`, whitespace-normalized.
    pub time: String,
    /// Free-text notes.
    pub comments: String,
}

/// Aggregated schedule of one offering id: its course name plus all weekly
/// occurrences, both as canonical conflict keys and as parsed slots.
#[derive(Debug, Clone)]
pub struct OfferingSchedule {
    pub course_name: String,
    /// Canonical `"day time"` keys, one per occurrence, in catalog order.
    pub slot_keys: Vec<String>,
    /// Parsed counterparts of `slot_keys`.
    pub slots: Vec<Slot>,
}

/// Conflict-detection substrate of the exact solver: offering id → schedule,
/// built once from the catalog. Iteration follows catalog insertion order so
/// that domain construction is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ConstraintMap {
    ids: Vec<String>,
    by_id: HashMap<String, OfferingSchedule>,
}

impl ConstraintMap {
    /// Aggregate the catalog records into per-offering schedules.
    ///
    /// Fails with a format error if any record's `"day time"` string cannot be
    /// parsed as a slot.
    pub fn build(offerings: &[Offering]) -> Result<ConstraintMap, String> {
        let mut map = ConstraintMap::default();
        for offering in offerings {
            let key = slot_key(&offering.day, &offering.time);
            let slot =
                Slot::parse(&key).map_err(|e| format!("Offering '{}': {}", offering.id, e))?;
            if !map.by_id.contains_key(&offering.id) {
                map.ids.push(offering.id.clone());
                map.by_id.insert(
                    offering.id.clone(),
                    OfferingSchedule {
                        course_name: normalize(&offering.name),
                        slot_keys: Vec::new(),
                        slots: Vec::new(),
                    },
                );
            }
            let entry = map.by_id.get_mut(&offering.id).unwrap();
            entry.slot_keys.push(key);
            entry.slots.push(slot);
        }
        Ok(map)
    }

    pub fn get(&self, id: &str) -> Option<&OfferingSchedule> {
        self.by_id.get(id)
    }

    /// Offering ids in catalog insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// (id, schedule) pairs in catalog insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OfferingSchedule)> {
        self.ids.iter().map(move |id| (id, &self.by_id[id]))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A (partial or full) schedule: course name → chosen offering id. A full
/// consistent assignment is a solution of the exact solver.
pub type Assignment = BTreeMap<String, String>;

#[cfg(test)]
mod test {
    use super::*;

    fn offering(id: &str, name: &str, day: &str, time: &str) -> Offering {
        Offering {
            name: name.to_owned(),
            program: "CS".to_owned(),
            instructor: "N.N.".to_owned(),
            id: id.to_owned(),
            room: "A1".to_owned(),
            day: day.to_owned(),
            time: time.to_owned(),
            comments: String::new(),
        }
    }

    #[test]
    fn build_aggregates_records_by_id() {
        let catalog = vec![
            offering("M1", "Math", "Monday", "9-10"),
            offering("M1", "Math", "Wednesday", "9-10"),
            offering("C1", "CS", "Tuesday", "9-10"),
        ];
        let map = ConstraintMap::build(&catalog).unwrap();
        assert_eq!(map.ids(), &["M1".to_owned(), "C1".to_owned()]);
        let m1 = map.get("M1").unwrap();
        assert_eq!(m1.course_name, "Math");
        assert_eq!(m1.slot_keys, vec!["Monday 9-10", "Wednesday 9-10"]);
        assert_eq!(m1.slots.len(), 2);
    }

    #[test]
    fn build_rejects_malformed_time() {
        let catalog = vec![offering("M1", "Math", "Monday", "morning")];
        let err = ConstraintMap::build(&catalog).unwrap_err();
        assert!(err.contains("M1"), "error should name the offering: {}", err);
    }
}
