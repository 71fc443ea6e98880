use crate::model::Record;

pub fn normalize_all(records: &mut [Record]) {
    for record in records.iter_mut() {
        normalize_record(record);
    }
}

fn normalize_record(record: &mut Record) {
    let trimmed = record.id.trim();
    if trimmed.is_empty() {
        // rows without an identifier stay addressable by position
        record.id = format!("unknown#{}", record.row);
    } else if trimmed.len() != record.id.len() {
        record.id = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, id: &str) -> Record {
        Record {
            row,
            id: id.into(),
            visits: Some(1),
            share: None,
            captured_on: None,
        }
    }

    #[test]
    fn trims_and_fills_identifiers() {
        let mut records = vec![record(0, "  alpha "), record(1, ""), record(2, "beta")];
        normalize_all(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["alpha", "unknown#1", "beta"]);
    }
}
