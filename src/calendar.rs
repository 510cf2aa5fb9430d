//! Month navigation and month grid layout.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date_key::{days_in_month, MAX_YEAR};
use crate::error::{Error, Result};

/// The displayed month. `month` is 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCursor {
    pub month: u32,
    pub year: i32,
}

impl CalendarCursor {
    /// Years are limited to what a date key can hold (0-9999).
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if month > 11 {
            return Err(Error::InvalidArgument(format!(
                "month {month} out of range (expected 0-11)"
            )));
        }
        if !(0..=MAX_YEAR).contains(&year) {
            return Err(Error::InvalidArgument(format!(
                "year {year} out of range (expected 0-{MAX_YEAR})"
            )));
        }
        Ok(Self { month, year })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month0(),
            year: date.year(),
        }
    }
}

/// What happens at the edges of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum NavigationPolicy {
    /// December rolls over into January of the next year and back.
    Unbounded,
    /// Navigation stays inside `year`; stepping past either end is a no-op.
    Bounded { year: i32 },
}

#[derive(Debug, Clone)]
pub struct Navigator {
    cursor: CalendarCursor,
    policy: NavigationPolicy,
}

impl Navigator {
    /// A bounded navigator starting outside its year is moved into it,
    /// keeping the month.
    pub fn new(start: CalendarCursor, policy: NavigationPolicy) -> Self {
        let cursor = match policy {
            NavigationPolicy::Bounded { year } if start.year != year => CalendarCursor {
                month: start.month,
                year,
            },
            _ => start,
        };
        Self { cursor, policy }
    }

    /// `(month0, year)` currently displayed.
    pub fn current(&self) -> (u32, i32) {
        (self.cursor.month, self.cursor.year)
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    /// Advance one month. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.cursor.month < 11 {
            self.cursor.month += 1;
            return true;
        }
        match self.policy {
            NavigationPolicy::Unbounded if self.cursor.year < MAX_YEAR => {
                self.cursor.month = 0;
                self.cursor.year += 1;
                true
            }
            _ => false,
        }
    }

    /// Step back one month. Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        if self.cursor.month > 0 {
            self.cursor.month -= 1;
            return true;
        }
        match self.policy {
            NavigationPolicy::Unbounded if self.cursor.year > 0 => {
                self.cursor.month = 11;
                self.cursor.year -= 1;
                true
            }
            _ => false,
        }
    }

    /// Jump to the month containing `date`, if the policy allows it.
    pub fn jump_to(&mut self, date: NaiveDate) -> bool {
        let Ok(target) = CalendarCursor::new(date.month0(), date.year()) else {
            return false;
        };
        if let NavigationPolicy::Bounded { year } = self.policy {
            if target.year != year {
                return false;
            }
        }
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }
}

/// Layout data for a 7-column month view starting on Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub month: u32,
    pub year: i32,
    /// Blank cells before day 1 (weekday of the 1st, Sunday = 0)
    pub leading_blanks: u32,
    pub days_in_month: u32,
    /// Day number of the real current date when it falls in this month
    pub today: Option<u32>,
}

impl MonthGrid {
    pub fn new(month0: u32, year: i32, today: NaiveDate) -> Result<Self> {
        let days = days_in_month(year, month0)?;
        let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
            .ok_or_else(|| Error::InvalidArgument(format!("year {year} out of range")))?;
        let today = (today.year() == year && today.month0() == month0).then(|| today.day());
        Ok(Self {
            month: month0,
            year,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days_in_month: days,
            today,
        })
    }

    /// Cells row by row; `None` is a blank before day 1 or after the last day.
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut column = self.leading_blanks as usize;
        for day in 1..=self.days_in_month {
            week[column] = Some(day);
            column += 1;
            if column == 7 {
                weeks.push(week);
                week = [None; 7];
                column = 0;
            }
        }
        if column > 0 {
            weeks.push(week);
        }
        weeks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(month: u32, year: i32) -> CalendarCursor {
        CalendarCursor::new(month, year).unwrap()
    }

    #[test]
    fn unbounded_rolls_over_years() {
        let mut nav = Navigator::new(cursor(11, 2025), NavigationPolicy::Unbounded);
        assert!(nav.next());
        assert_eq!(nav.current(), (0, 2026));
        assert!(nav.previous());
        assert_eq!(nav.current(), (11, 2025));

        let mut nav = Navigator::new(cursor(0, 2025), NavigationPolicy::Unbounded);
        assert!(nav.previous());
        assert_eq!(nav.current(), (11, 2024));
    }

    #[test]
    fn bounded_refuses_to_leave_its_year() {
        let policy = NavigationPolicy::Bounded { year: 2025 };
        let mut nav = Navigator::new(cursor(11, 2025), policy);
        assert!(!nav.next());
        assert_eq!(nav.current(), (11, 2025));

        let mut nav = Navigator::new(cursor(0, 2025), policy);
        assert!(!nav.previous());
        assert_eq!(nav.current(), (0, 2025));
        assert!(nav.next());
        assert_eq!(nav.current(), (1, 2025));
    }

    #[test]
    fn bounded_start_is_moved_into_its_year() {
        let nav = Navigator::new(cursor(4, 2030), NavigationPolicy::Bounded { year: 2025 });
        assert_eq!(nav.current(), (4, 2025));
    }

    #[test]
    fn next_and_previous_are_inverse_inside_a_year() {
        let mut nav = Navigator::new(cursor(5, 2025), NavigationPolicy::Unbounded);
        for _ in 0..3 {
            nav.next();
        }
        for _ in 0..3 {
            nav.previous();
        }
        assert_eq!(nav.current(), (5, 2025));
    }

    #[test]
    fn jump_respects_bounds() {
        let mut nav = Navigator::new(cursor(0, 2025), NavigationPolicy::Bounded { year: 2025 });
        assert!(!nav.jump_to(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert_eq!(nav.current(), (0, 2025));
        assert!(nav.jump_to(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        assert_eq!(nav.current(), (2, 2025));
    }

    #[test]
    fn unbounded_stops_at_the_ends_of_the_key_range() {
        let mut nav = Navigator::new(cursor(11, MAX_YEAR), NavigationPolicy::Unbounded);
        assert!(!nav.next());
        assert_eq!(nav.current(), (11, MAX_YEAR));

        let mut nav = Navigator::new(cursor(0, 0), NavigationPolicy::Unbounded);
        assert!(!nav.previous());
        assert_eq!(nav.current(), (0, 0));
    }

    #[test]
    fn cursor_rejects_years_outside_key_range() {
        assert!(matches!(
            CalendarCursor::new(11, i32::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CalendarCursor::new(0, -1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(CalendarCursor::new(11, MAX_YEAR).is_ok());
    }

    #[test]
    fn cursor_rejects_month_twelve() {
        assert!(matches!(
            CalendarCursor::new(12, 2025),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn month_grid_for_march_2025() {
        // March 1st 2025 is a Saturday.
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let grid = MonthGrid::new(2, 2025, today).unwrap();
        assert_eq!(grid.leading_blanks, 6);
        assert_eq!(grid.days_in_month, 31);
        assert_eq!(grid.today, Some(15));

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0], [None, None, None, None, None, None, Some(1)]);
        assert_eq!(weeks[5][0], Some(30));
        assert_eq!(weeks[5][1], Some(31));
        assert_eq!(weeks[5][2], None);
    }

    #[test]
    fn month_grid_today_only_in_its_month() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let grid = MonthGrid::new(2, 2025, today).unwrap();
        assert_eq!(grid.today, None);
        let grid = MonthGrid::new(3, 2024, today).unwrap();
        assert_eq!(grid.today, None);
    }

    #[test]
    fn february_starting_sunday_fills_four_rows() {
        // February 2026 starts on a Sunday and has 28 days.
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let grid = MonthGrid::new(1, 2026, today).unwrap();
        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.weeks().len(), 4);
    }
}
