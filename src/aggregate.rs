//! Completion statistics over calendar periods.
//!
//! Every report is an ordered sequence of [`Bucket`]s, one per period in
//! range. Periods without tasks still produce a zero bucket so charts keep a
//! continuous x-axis.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_key::{days_in_month, DateKey};
use crate::error::{Error, Result};
use crate::task::{DayCounts, TaskMap};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const WEEK_LEN: u32 = 7;

/// How days are grouped into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportMode {
    /// One bucket per day of the reference month
    Daily,
    /// Seven-day runs of the reference month, the last one possibly short
    Weekly,
    /// One bucket per month of the reference year
    Monthly,
    /// Sunday to Saturday around the real current date
    CurrentWeek,
}

impl ReportMode {
    pub const ALL: [ReportMode; 4] = [
        ReportMode::Daily,
        ReportMode::Weekly,
        ReportMode::Monthly,
        ReportMode::CurrentWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Daily => "daily",
            ReportMode::Weekly => "weekly",
            ReportMode::Monthly => "monthly",
            ReportMode::CurrentWeek => "currentWeek",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportMode::Daily => "Daily",
            ReportMode::Weekly => "Weekly",
            ReportMode::Monthly => "Monthly",
            ReportMode::CurrentWeek => "Current week",
        }
    }

    /// The mode after this one, wrapping around.
    pub fn cycle(&self) -> ReportMode {
        let idx = Self::ALL.iter().position(|mode| mode == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(ReportMode::Daily),
            "weekly" => Ok(ReportMode::Weekly),
            "monthly" => Ok(ReportMode::Monthly),
            "currentweek" | "current-week" | "current_week" => Ok(ReportMode::CurrentWeek),
            _ => Err(Error::InvalidArgument(format!(
                "invalid mode '{}': must be daily, weekly, monthly, or currentWeek",
                s
            ))),
        }
    }
}

/// Counts for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub completed: usize,
    pub uncompleted: usize,
}

impl Bucket {
    fn new(label: impl Into<String>, counts: DayCounts) -> Self {
        Self {
            label: label.into(),
            completed: counts.completed,
            uncompleted: counts.uncompleted,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.uncompleted
    }
}

/// Build the buckets for `mode`.
///
/// `month0`/`year` locate the navigated month; `today` anchors
/// [`ReportMode::CurrentWeek`] and nothing else.
pub fn aggregate(
    tasks: &TaskMap,
    mode: ReportMode,
    month0: u32,
    year: i32,
    today: NaiveDate,
) -> Result<Vec<Bucket>> {
    match mode {
        ReportMode::Daily => daily(tasks, month0, year),
        ReportMode::Weekly => weekly(tasks, month0, year),
        ReportMode::Monthly => monthly(tasks, year),
        ReportMode::CurrentWeek => current_week(tasks, today),
    }
}

/// [`aggregate`] anchored to the local current date.
pub fn aggregate_now(
    tasks: &TaskMap,
    mode: ReportMode,
    month0: u32,
    year: i32,
) -> Result<Vec<Bucket>> {
    aggregate(tasks, mode, month0, year, Local::now().date_naive())
}

/// Sum of all buckets.
pub fn totals(buckets: &[Bucket]) -> DayCounts {
    let mut counts = DayCounts::default();
    for bucket in buckets {
        counts.add(DayCounts {
            completed: bucket.completed,
            uncompleted: bucket.uncompleted,
        });
    }
    counts
}

fn day_counts(tasks: &TaskMap, year: i32, month0: u32, day: u32) -> Result<DayCounts> {
    let key = DateKey::encode(year, month0, day)?;
    Ok(tasks.counts_for(&key))
}

fn daily(tasks: &TaskMap, month0: u32, year: i32) -> Result<Vec<Bucket>> {
    let days = days_in_month(year, month0)?;
    (1..=days)
        .map(|day| Ok(Bucket::new(day.to_string(), day_counts(tasks, year, month0, day)?)))
        .collect()
}

fn weekly(tasks: &TaskMap, month0: u32, year: i32) -> Result<Vec<Bucket>> {
    let days = days_in_month(year, month0)?;
    let mut buckets = Vec::with_capacity(days.div_ceil(WEEK_LEN) as usize);
    let mut week = DayCounts::default();

    for day in 1..=days {
        week.add(day_counts(tasks, year, month0, day)?);
        if day % WEEK_LEN == 0 || day == days {
            buckets.push(Bucket::new(format!("W{}", buckets.len() + 1), week));
            week = DayCounts::default();
        }
    }

    Ok(buckets)
}

fn monthly(tasks: &TaskMap, year: i32) -> Result<Vec<Bucket>> {
    (0..12u32)
        .map(|month0| {
            let mut counts = DayCounts::default();
            for day in 1..=days_in_month(year, month0)? {
                counts.add(day_counts(tasks, year, month0, day)?);
            }
            Ok(Bucket::new(MONTH_NAMES[month0 as usize], counts))
        })
        .collect()
}

fn current_week(tasks: &TaskMap, today: NaiveDate) -> Result<Vec<Bucket>> {
    let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (0..7i64)
        .map(|offset| {
            let date = sunday + Duration::days(offset);
            let key = DateKey::from_date(date)?;
            let label = WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize];
            Ok(Bucket::new(label, tasks.counts_for(&key)))
        })
        .collect()
}

/// A computed report with its coordinates, as handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub mode: ReportMode,
    /// 0-indexed reference month
    pub month: u32,
    pub year: i32,
    pub buckets: Vec<Bucket>,
    pub completed: usize,
    pub uncompleted: usize,
}

impl Report {
    pub fn build(
        tasks: &TaskMap,
        mode: ReportMode,
        month0: u32,
        year: i32,
        today: NaiveDate,
    ) -> Result<Self> {
        let buckets = aggregate(tasks, mode, month0, year, today)?;
        let sums = totals(&buckets);
        Ok(Self {
            mode,
            month: month0,
            year,
            buckets,
            completed: sums.completed,
            uncompleted: sums.uncompleted,
        })
    }

    /// Chart title such as `Daily · March 2025`.
    pub fn title(&self) -> String {
        match self.mode {
            ReportMode::Monthly => format!("{} · {}", self.mode.title(), self.year),
            ReportMode::CurrentWeek => self.mode.title().to_string(),
            _ => format!(
                "{} · {} {}",
                self.mode.title(),
                MONTH_NAMES.get(self.month as usize).copied().unwrap_or("?"),
                self.year
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::task::TaskStore;

    fn key(raw: &str) -> DateKey {
        raw.parse().expect("valid key")
    }

    fn date(raw: &str) -> NaiveDate {
        key(raw).date()
    }

    fn store_with(entries: &[(&str, &str, bool)]) -> TaskStore<MemoryStorage> {
        let mut store = TaskStore::new(MemoryStorage::new());
        for (day, text, done) in entries {
            let day = key(day);
            let index = store.add(&day, text).unwrap();
            if *done {
                store.toggle(&day, index).unwrap();
            }
        }
        store
    }

    /// Whether `day` belongs to bucket `index` of a report, derived from the
    /// calendar alone.
    fn in_bucket(
        mode: ReportMode,
        index: usize,
        day: NaiveDate,
        month0: u32,
        year: i32,
        today: NaiveDate,
    ) -> bool {
        let same_month = day.year() == year && day.month0() == month0;
        match mode {
            ReportMode::Daily => same_month && day.day() as usize == index + 1,
            ReportMode::Weekly => same_month && (day.day() as usize - 1) / 7 == index,
            ReportMode::Monthly => day.year() == year && day.month0() as usize == index,
            ReportMode::CurrentWeek => {
                let sunday = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                day == sunday + Duration::days(index as i64)
            }
        }
    }

    /// Recount every bucket straight from the stored tasks.
    fn assert_consistent(
        tasks: &TaskMap,
        mode: ReportMode,
        month0: u32,
        year: i32,
        today: NaiveDate,
        buckets: &[Bucket],
    ) {
        for (index, bucket) in buckets.iter().enumerate() {
            let mut expected = DayCounts::default();
            for (key, day_tasks) in tasks.iter() {
                if in_bucket(mode, index, key.date(), month0, year, today) {
                    for task in day_tasks {
                        if task.done {
                            expected.completed += 1;
                        } else {
                            expected.uncompleted += 1;
                        }
                    }
                }
            }
            assert_eq!(
                (bucket.completed, bucket.uncompleted),
                (expected.completed, expected.uncompleted),
                "{mode} bucket {} ({index})",
                bucket.label
            );
        }
    }

    #[test]
    fn daily_single_task_scenario() {
        let store = store_with(&[("2025-03-15", "Buy milk", false)]);
        let buckets = aggregate(store.tasks(), ReportMode::Daily, 2, 2025, date("2025-03-15")).unwrap();

        assert_eq!(buckets.len(), 31);
        for bucket in &buckets {
            if bucket.label == "15" {
                assert_eq!((bucket.completed, bucket.uncompleted), (0, 1));
            } else {
                assert_eq!((bucket.completed, bucket.uncompleted), (0, 0));
            }
        }
        assert_eq!(buckets[0].label, "1");
        assert_eq!(buckets[30].label, "31");
    }

    #[test]
    fn daily_reflects_toggle() {
        let store = store_with(&[("2025-03-15", "A", true)]);
        let buckets = aggregate(store.tasks(), ReportMode::Daily, 2, 2025, date("2025-01-01")).unwrap();
        let day15 = &buckets[14];
        assert_eq!(day15.label, "15");
        assert_eq!((day15.completed, day15.uncompleted), (1, 0));
    }

    #[test]
    fn daily_ignores_other_months() {
        let store = store_with(&[("2025-04-15", "April", false), ("2024-03-15", "Last year", false)]);
        let buckets = aggregate(store.tasks(), ReportMode::Daily, 2, 2025, date("2025-03-01")).unwrap();
        assert_eq!(totals(&buckets).total(), 0);
    }

    #[test]
    fn weekly_thirty_day_month_has_five_buckets() {
        let store = store_with(&[
            ("2025-04-01", "a", true),
            ("2025-04-07", "b", false),
            ("2025-04-08", "c", false),
            ("2025-04-29", "d", true),
            ("2025-04-30", "e", false),
        ]);
        let buckets = aggregate(store.tasks(), ReportMode::Weekly, 3, 2025, date("2025-04-01")).unwrap();

        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["W1", "W2", "W3", "W4", "W5"]);
        assert_eq!((buckets[0].completed, buckets[0].uncompleted), (1, 1));
        assert_eq!((buckets[1].completed, buckets[1].uncompleted), (0, 1));
        assert_eq!((buckets[2].completed, buckets[2].uncompleted), (0, 0));
        assert_eq!((buckets[4].completed, buckets[4].uncompleted), (1, 1));

        let sums = totals(&buckets);
        assert_eq!(sums, DayCounts { completed: 2, uncompleted: 3 });
        assert_consistent(store.tasks(), ReportMode::Weekly, 3, 2025, date("2025-04-01"), &buckets);
    }

    #[test]
    fn weekly_february_non_leap_has_four_buckets() {
        let store = store_with(&[("2025-02-28", "end", false)]);
        let buckets = aggregate(store.tasks(), ReportMode::Weekly, 1, 2025, date("2025-02-01")).unwrap();
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[3].uncompleted, 1);
    }

    #[test]
    fn weekly_trailing_week_does_not_carry_into_next_month() {
        let store = store_with(&[("2025-01-31", "jan", false), ("2025-02-01", "feb", false)]);
        let buckets = aggregate(store.tasks(), ReportMode::Weekly, 0, 2025, date("2025-01-01")).unwrap();
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[4].total(), 1);
    }

    #[test]
    fn monthly_always_has_twelve_buckets() {
        let store = store_with(&[
            ("2025-01-01", "a", true),
            ("2025-01-31", "b", false),
            ("2025-12-31", "c", true),
            ("2026-01-01", "next year", true),
        ]);
        for month0 in [0, 5, 11, 99] {
            let buckets =
                aggregate(store.tasks(), ReportMode::Monthly, month0, 2025, date("2025-06-01")).unwrap();
            assert_eq!(buckets.len(), 12);
            assert_eq!(buckets[0].label, "January");
            assert_eq!(buckets[11].label, "December");
            assert_eq!((buckets[0].completed, buckets[0].uncompleted), (1, 1));
            assert_eq!((buckets[11].completed, buckets[11].uncompleted), (1, 0));
            assert_eq!(totals(&buckets).total(), 3);
        }
    }

    #[test]
    fn current_week_is_anchored_to_today() {
        // 2025-03-12 is a Wednesday; its week runs 03-09 .. 03-15.
        let store = store_with(&[
            ("2025-03-08", "before", false),
            ("2025-03-09", "sun", true),
            ("2025-03-12", "wed", false),
            ("2025-03-15", "sat", false),
            ("2025-03-16", "after", false),
        ]);
        let buckets =
            aggregate(store.tasks(), ReportMode::CurrentWeek, 0, 1999, date("2025-03-12")).unwrap();

        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, WEEKDAY_NAMES.to_vec());
        assert_eq!((buckets[0].completed, buckets[0].uncompleted), (1, 0));
        assert_eq!(buckets[3].uncompleted, 1);
        assert_eq!(buckets[6].uncompleted, 1);
        assert_eq!(totals(&buckets).total(), 3);
    }

    #[test]
    fn current_week_crosses_year_boundary() {
        // 2025-01-01 is a Wednesday; the week starts on 2024-12-29.
        let store = store_with(&[("2024-12-29", "old", false), ("2025-01-04", "new", true)]);
        let buckets =
            aggregate(store.tasks(), ReportMode::CurrentWeek, 5, 2030, date("2025-01-01")).unwrap();
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].uncompleted, 1);
        assert_eq!(buckets[6].completed, 1);
    }

    #[test]
    fn current_week_on_sunday_starts_today() {
        let store = store_with(&[("2025-03-16", "today", false)]);
        let buckets =
            aggregate(store.tasks(), ReportMode::CurrentWeek, 0, 2025, date("2025-03-16")).unwrap();
        assert_eq!(buckets[0].label, "Sun");
        assert_eq!(buckets[0].uncompleted, 1);
    }

    #[test]
    fn buckets_are_consistent_after_mixed_mutations() {
        let mut store = store_with(&[
            ("2025-05-01", "a", false),
            ("2025-05-01", "b", true),
            ("2025-05-09", "c", false),
        ]);
        let first = key("2025-05-01");
        store.toggle(&first, 0).unwrap();
        store.remove(&first, 1).unwrap();
        store.add(&key("2025-05-31"), "d").unwrap();

        store.add(&key("2025-05-27"), "e").unwrap();
        store.add(&key("2025-11-02"), "f").unwrap();
        store.add(&key("2026-05-02"), "other year").unwrap();

        let today = date("2025-05-28");
        for mode in ReportMode::ALL {
            let buckets = aggregate(store.tasks(), mode, 4, 2025, today).unwrap();
            assert_consistent(store.tasks(), mode, 4, 2025, today, &buckets);
        }
        let daily = aggregate(store.tasks(), ReportMode::Daily, 4, 2025, today).unwrap();
        assert_eq!(totals(&daily), DayCounts { completed: 1, uncompleted: 3 });
        let monthly = aggregate(store.tasks(), ReportMode::Monthly, 4, 2025, today).unwrap();
        assert_eq!(totals(&monthly).total(), 5);
    }

    #[test]
    fn invalid_reference_month_is_rejected() {
        let store = store_with(&[]);
        assert!(matches!(
            aggregate(store.tasks(), ReportMode::Daily, 12, 2025, date("2025-01-01")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn mode_parsing_accepts_aliases() {
        assert_eq!("daily".parse::<ReportMode>().unwrap(), ReportMode::Daily);
        assert_eq!("Weekly".parse::<ReportMode>().unwrap(), ReportMode::Weekly);
        assert_eq!("currentWeek".parse::<ReportMode>().unwrap(), ReportMode::CurrentWeek);
        assert_eq!("current-week".parse::<ReportMode>().unwrap(), ReportMode::CurrentWeek);
        assert!("yearly".parse::<ReportMode>().is_err());
        assert_eq!(ReportMode::CurrentWeek.to_string(), "currentWeek");
        assert_eq!(ReportMode::CurrentWeek.cycle(), ReportMode::Daily);
    }

    #[test]
    fn report_title_and_totals() {
        let store = store_with(&[("2025-03-15", "a", true), ("2025-03-16", "b", false)]);
        let report =
            Report::build(store.tasks(), ReportMode::Daily, 2, 2025, date("2025-03-15")).unwrap();
        assert_eq!(report.title(), "Daily · March 2025");
        assert_eq!(report.completed, 1);
        assert_eq!(report.uncompleted, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "daily");
        assert_eq!(json["buckets"][14]["completed"], 1);
    }
}
