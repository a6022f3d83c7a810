//! Time slots of course occurrences.
//!
//! A slot is one weekly occurrence of an offering: a day of week plus a
//! half-open `[start, end)` hour interval. The catalog and the user interface
//! describe slots as strings of the form `"Day HH-HH"` (en-dashes are
//! tolerated); the swarm problem format additionally allows a
//! `[day, start, end]` triple. Any other shape is a format error naming the
//! offending value.
//!
//! Two notions of "same time" exist side by side: the canonical *slot key*
//! (the whitespace-normalized raw `"day time"` string, compared by exact
//! equality) used by the legacy conflict test, and true interval overlap on
//! the parsed representation.

use chrono::NaiveTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Collapse all whitespace runs to single spaces and trim the ends.
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove all whitespace. Day and time strings come in with stray spaces
/// ("9 - 10") that would break the canonical slot keys.
pub(crate) fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}

/// Canonical conflict key of a (day, time) string pair, e.g. `"Monday 9-10"`.
/// Both components are compacted, so "9 - 10" and "9-10" yield the same key.
pub fn slot_key(day: &str, time: &str) -> String {
    format!("{} {}", compact(day), compact(time))
}

/// One weekly occurrence: a day of week and a half-open hour interval.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub day: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    /// Parse a `"Day HH-HH"` slot string (en-dash tolerated).
    pub fn parse(input: &str) -> Result<Slot, String> {
        let normalized = normalize(input).replace('–', "-");
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(format!("Invalid time slot format: '{}'", input));
        }
        let (start_str, end_str) = tokens[1]
            .split_once('-')
            .ok_or_else(|| format!("Invalid time slot format: '{}'", input))?;
        Ok(Slot {
            day: tokens[0].to_owned(),
            start: parse_hour(start_str)?,
            end: parse_hour(end_str)?,
        })
    }

    /// Build a slot from the three-element `(day, start, end)` form.
    pub fn from_parts(day: &str, start: &str, end: &str) -> Result<Slot, String> {
        let day = normalize(day);
        if day.is_empty() {
            return Err("Invalid time slot format: empty day".to_owned());
        }
        Ok(Slot {
            day,
            start: parse_hour(start)?,
            end: parse_hour(end)?,
        })
    }

    /// Half-open interval overlap on the same day.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

fn parse_hour(s: &str) -> Result<NaiveTime, String> {
    let hour: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid hour value: '{}'", s))?;
    NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(|| format!("Invalid hour value: '{}'", s))
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use chrono::Timelike;
        write!(f, "{} {}-{}", self.day, self.start.hour(), self.end.hour())
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts both external slot shapes: the `"Day HH-HH"` string and the
/// `[day, start, end]` triple (hours as numbers or strings).
impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Slot, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Hour {
            Number(u32),
            Text(String),
        }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Key(String),
            Parts(String, Hour, Hour),
        }
        impl Hour {
            fn as_string(&self) -> String {
                match self {
                    Hour::Number(n) => n.to_string(),
                    Hour::Text(s) => s.clone(),
                }
            }
        }
        match Repr::deserialize(deserializer).map_err(|_| {
            D::Error::custom("expected a \"Day HH-HH\" string or a [day, start, end] triple")
        })? {
            Repr::Key(s) => Slot::parse(&s).map_err(D::Error::custom),
            Repr::Parts(day, start, end) => {
                Slot::from_parts(&day, &start.as_string(), &end.as_string())
                    .map_err(D::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_day_range_string() {
        let slot = Slot::parse("Monday 9-10").unwrap();
        assert_eq!(slot.day, "Monday");
        assert_eq!(slot.to_string(), "Monday 9-10");
    }

    #[test]
    fn parse_tolerates_whitespace_and_en_dash() {
        let slot = Slot::parse("  Tuesday   14–16 ").unwrap();
        assert_eq!(slot.day, "Tuesday");
        assert_eq!(slot.to_string(), "Tuesday 14-16");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["Monday", "Monday 9", "Mon day 9-10", "Monday 9-25", "Monday x-10"] {
            let err = Slot::parse(bad).unwrap_err();
            assert!(err.contains("Invalid"), "unexpected error for {:?}: {}", bad, err);
        }
    }

    #[test]
    fn from_parts_matches_parsed_string() {
        assert_eq!(
            Slot::from_parts("Monday", "9", "10").unwrap(),
            Slot::parse("Monday 9-10").unwrap()
        );
    }

    #[test]
    fn overlap_is_half_open_and_day_scoped() {
        let a = Slot::parse("Monday 9-11").unwrap();
        let b = Slot::parse("Monday 10-12").unwrap();
        let c = Slot::parse("Monday 11-12").unwrap();
        let d = Slot::parse("Tuesday 9-11").unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn slot_key_normalizes_whitespace() {
        assert_eq!(slot_key(" Monday ", " 9-10 "), "Monday 9-10");
        assert_eq!(slot_key("Monday", "9  -  10"), "Monday 9-10");
    }

    #[test]
    fn deserialize_both_shapes() {
        let from_key: Slot = serde_json::from_str("\"Monday 9-10\"").unwrap();
        let from_parts: Slot = serde_json::from_str("[\"Monday\", 9, \"10\"]").unwrap();
        assert_eq!(from_key, from_parts);
        assert!(serde_json::from_str::<Slot>("{\"day\": \"Monday\"}").is_err());
    }
}
