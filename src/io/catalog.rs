//! Loading of the course catalog from its JSON export.
//!
//! The catalog is a JSON array of offering records with eight required string
//! fields. Loading is all-or-nothing: a missing or mis-typed field fails the
//! whole load with an error naming the record index and the field, so the
//! caller can correct the input instead of silently working with a truncated
//! catalog.

use crate::slot::compact;
use crate::Offering;

/// Read the ordered list of offering records from a JSON catalog export.
///
/// Day and time fields are whitespace-normalized before use, the remaining
/// fields are trimmed.
///
/// # Errors
///
/// Fails with a string error message to be displayed to the user, if
/// * the file has invalid JSON syntax (the string representation of the
///   serde_json error is returned)
/// * the document root is not an array
/// * any record is missing one of the required fields or holds a non-string
///   value there (the message names the record index and field)
pub fn read<R: std::io::Read>(reader: R) -> Result<Vec<Offering>, String> {
    let data: serde_json::Value = serde_json::from_reader(reader).map_err(|err| err.to_string())?;
    let records = data
        .as_array()
        .ok_or("Catalog root must be a JSON array of offering records.")?;

    let mut offerings = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        offerings.push(Offering {
            name: get_str(record, index, "name")?,
            program: get_str(record, index, "program")?,
            instructor: get_str(record, index, "instructor")?,
            id: get_str(record, index, "id")?,
            room: get_str(record, index, "room")?,
            day: compact(&get_str(record, index, "day")?),
            time: compact(&get_str(record, index, "time")?),
            comments: get_str(record, index, "comments")?,
        });
    }
    Ok(offerings)
}

fn get_str(record: &serde_json::Value, index: usize, field: &str) -> Result<String, String> {
    record
        .get(field)
        .ok_or_else(|| format!("Record {}: missing field '{}'", index, field))?
        .as_str()
        .map(|s| s.trim().to_owned())
        .ok_or_else(|| format!("Record {}: field '{}' is not a string", index, field))
}

#[cfg(test)]
mod test {
    const CATALOG: &str = r#"[
        {"name": "Math", "program": "CS", "instructor": "Dr. A", "id": "M1",
         "room": "101", "day": " Monday ", "time": "9 - 10", "comments": ""},
        {"name": "CS", "program": "CS", "instructor": "Dr. B", "id": "C1",
         "room": "102", "day": "Tuesday", "time": "9-10", "comments": "lab"}
    ]"#;

    #[test]
    fn parse_catalog_normalizes_day_and_time() {
        let offerings = super::read(CATALOG.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].day, "Monday");
        assert_eq!(offerings[0].time, "9-10");
        assert_eq!(offerings[1].comments, "lab");
    }

    #[test]
    fn missing_field_names_record_and_field() {
        let data = r#"[{"name": "Math", "program": "CS", "instructor": "Dr. A",
                        "id": "M1", "room": "101", "day": "Monday", "time": "9-10",
                        "comments": ""},
                       {"name": "CS", "program": "CS", "instructor": "Dr. B",
                        "id": "C1", "room": "102", "time": "9-10", "comments": ""}]"#;
        let err = super::read(data.as_bytes()).unwrap_err();
        assert!(err.contains("Record 1"), "{}", err);
        assert!(err.contains("'day'"), "{}", err);
    }

    #[test]
    fn mistyped_field_names_record_and_field() {
        let data = r#"[{"name": "Math", "program": "CS", "instructor": "Dr. A",
                        "id": 17, "room": "101", "day": "Monday", "time": "9-10",
                        "comments": ""}]"#;
        let err = super::read(data.as_bytes()).unwrap_err();
        assert!(err.contains("Record 0"), "{}", err);
        assert!(err.contains("'id'"), "{}", err);
        assert!(err.contains("not a string"), "{}", err);
    }

    #[test]
    fn non_array_root_is_rejected() {
        assert!(super::read("{}".as_bytes()).is_err());
    }
}
