use crate::model::{DailyTotal, DegenerateInputError, Record};
use std::collections::BTreeMap;

/// Groups records by capture date. Records without a date are skipped;
/// records without visits still count towards the date's record count.
pub fn build_daily_totals(records: &[Record]) -> Result<Vec<DailyTotal>, DegenerateInputError> {
    let mut grouped: BTreeMap<_, DailyTotal> = BTreeMap::new();

    for record in records {
        let Some(date) = record.captured_on else {
            continue;
        };
        let entry = grouped.entry(date).or_insert_with(|| DailyTotal {
            date,
            records: 0,
            visits: 0,
        });
        entry.records += 1;
        entry.visits = entry
            .visits
            .checked_add(record.visits.unwrap_or(0))
            .ok_or(DegenerateInputError::TotalOverflow)?;
    }

    Ok(grouped.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(row: usize, visits: Option<u64>, day: Option<u32>) -> Record {
        Record {
            row,
            id: format!("r{row}"),
            visits,
            share: None,
            captured_on: day.and_then(|d| NaiveDate::from_ymd_opt(2023, 11, d)),
        }
    }

    #[test]
    fn groups_by_date_in_ascending_order() {
        let records = vec![
            record(0, Some(10), Some(18)),
            record(1, Some(5), Some(17)),
            record(2, None, Some(18)),
            record(3, Some(99), None),
            record(4, Some(1), Some(17)),
        ];

        let days = build_daily_totals(&records).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2023, 11, 17).unwrap());
        assert_eq!((days[0].records, days[0].visits), (2, 6));
        assert_eq!((days[1].records, days[1].visits), (2, 10));
    }

    #[test]
    fn daily_sum_overflow_is_an_error() {
        let records = vec![record(0, Some(u64::MAX), Some(17)), record(1, Some(1), Some(17))];
        assert_eq!(
            build_daily_totals(&records).unwrap_err(),
            DegenerateInputError::TotalOverflow
        );
    }
}
