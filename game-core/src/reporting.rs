use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use game_types::{AdminReport, DailyResults, PlayRecord, PlaySummary};

/// Totals and win rate over a set of records.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a PlayRecord>) -> PlaySummary {
    let (total_plays, total_wins) = records
        .into_iter()
        .fold((0u32, 0u32), |(plays, wins), record| {
            (plays + 1, wins + u32::from(record.won))
        });

    PlaySummary {
        total_plays,
        total_wins,
        win_rate: format_win_rate(total_wins, total_plays),
    }
}

/// wins / total * 100 with one decimal place, `"0"` for no plays.
pub fn format_win_rate(wins: u32, total: u32) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", f64::from(wins) / f64::from(total) * 100.0)
}

/// Group records by the calendar date they were played on in `tz`.
///
/// Days are ordered newest first, and so are the records inside each day.
pub fn build_admin_report<Tz: TimeZone>(records: Vec<PlayRecord>, tz: &Tz) -> AdminReport {
    let summary = summarize(&records);

    let mut by_date: BTreeMap<NaiveDate, Vec<PlayRecord>> = BTreeMap::new();
    for record in records {
        let date = record.played_at.with_timezone(tz).date_naive();
        by_date.entry(date).or_default().push(record);
    }

    let days = by_date
        .into_iter()
        .rev()
        .map(|(date, mut results)| {
            results.sort_by(|a, b| b.played_at.cmp(&a.played_at));
            DailyResults {
                date,
                summary: summarize(&results),
                results,
            }
        })
        .collect();

    AdminReport { summary, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use game_types::{Grid, LineId, MatchSet, Symbol};
    use uuid::Uuid;

    fn record(uid: &str, won: bool, played_at: DateTime<Utc>) -> PlayRecord {
        let matches = if won {
            MatchSet::new(vec![LineId::Row(0)])
        } else {
            MatchSet::default()
        };
        PlayRecord {
            id: Uuid::new_v4(),
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            grid: Grid::from_rows(vec![vec![Symbol::Apple; 3]; 3]).unwrap(),
            won,
            matches,
            played_at,
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_win_rate_format() {
        assert_eq!(format_win_rate(0, 0), "0");
        assert_eq!(format_win_rate(0, 4), "0.0");
        assert_eq!(format_win_rate(1, 3), "33.3");
        assert_eq!(format_win_rate(2, 3), "66.7");
        assert_eq!(format_win_rate(5, 5), "100.0");
    }

    #[test]
    fn test_empty_report() {
        let report = build_admin_report(vec![], &Utc);
        assert_eq!(report.summary.total_plays, 0);
        assert_eq!(report.summary.win_rate, "0");
        assert!(report.days.is_empty());
    }

    #[test]
    fn test_grouped_by_date_newest_first() {
        let records = vec![
            record("a", true, at(1, 9)),
            record("b", false, at(2, 8)),
            record("c", false, at(1, 17)),
            record("d", true, at(2, 20)),
            record("e", false, at(3, 1)),
        ];

        let report = build_admin_report(records, &Utc);

        assert_eq!(report.summary.total_plays, 5);
        assert_eq!(report.summary.total_wins, 2);
        assert_eq!(report.summary.win_rate, "40.0");

        let dates: Vec<u32> = report
            .days
            .iter()
            .map(|d| chrono::Datelike::day(&d.date))
            .collect();
        assert_eq!(dates, vec![3, 2, 1]);

        let day_two = &report.days[1];
        assert_eq!(day_two.summary.total_plays, 2);
        assert_eq!(day_two.summary.win_rate, "50.0");
        assert_eq!(day_two.results[0].uid, "d");
        assert_eq!(day_two.results[1].uid, "b");
    }

    #[test]
    fn test_grouping_uses_time_zone() {
        // 23:00 UTC on the 1st is already the 2nd at UTC+3.
        let records = vec![record("a", false, at(1, 23)), record("b", false, at(2, 10))];
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();

        let report = build_admin_report(records.clone(), &tz);
        assert_eq!(report.days.len(), 1);

        let report = build_admin_report(records, &Utc);
        assert_eq!(report.days.len(), 2);
    }
}
