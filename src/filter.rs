use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::Error;
use crate::models::Task;

/// Keyword selecting every task, shared by all three filters.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }

    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::All,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ALL => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "pending" => Ok(StatusFilter::Pending),
            _ => Err(Error::InvalidFilter { kind: "status", value: s.to_string() }),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => ALL,
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(c) => task.category == *c,
        }
    }

    /// Advances through `all` followed by `categories`, wrapping around.
    pub fn next(&self, categories: &[String]) -> CategoryFilter {
        let pos = match self {
            CategoryFilter::All => None,
            CategoryFilter::Named(c) => categories.iter().position(|x| x == c),
        };
        let next = match pos {
            None => 0,
            Some(i) => i + 1,
        };
        match categories.get(next) {
            Some(c) => CategoryFilter::Named(c.clone()),
            None => CategoryFilter::All,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Named(s.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Named(c) => f.write_str(c),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
}

impl DateFilter {
    /// Tests the task deadline against this bucket, relative to `now`.
    ///
    /// Weeks start at midnight on Sunday. A deadline that does not parse
    /// only ever matches `All`.
    pub fn matches(self, task: &Task, now: NaiveDateTime) -> bool {
        if self == DateFilter::All {
            return true;
        }
        let deadline = match task.deadline_at() {
            Some(d) => d,
            None => return false,
        };
        let today = now.date();
        let this_week = week_start(today);
        let next_week = this_week + Duration::days(7);
        match self {
            DateFilter::All => true,
            DateFilter::Today => deadline.date() == today,
            DateFilter::Tomorrow => Some(deadline.date()) == today.succ_opt(),
            DateFilter::ThisWeek => deadline >= this_week && deadline < next_week,
            DateFilter::NextWeek => deadline >= next_week,
        }
    }

    pub fn next(self) -> DateFilter {
        match self {
            DateFilter::All => DateFilter::Today,
            DateFilter::Today => DateFilter::Tomorrow,
            DateFilter::Tomorrow => DateFilter::ThisWeek,
            DateFilter::ThisWeek => DateFilter::NextWeek,
            DateFilter::NextWeek => DateFilter::All,
        }
    }
}

fn week_start(day: NaiveDate) -> NaiveDateTime {
    let back = day.weekday().num_days_from_sunday() as i64;
    (day - Duration::days(back)).and_time(chrono::NaiveTime::MIN)
}

impl FromStr for DateFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ALL => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "tomorrow" => Ok(DateFilter::Tomorrow),
            "this-week" => Ok(DateFilter::ThisWeek),
            "next-week" => Ok(DateFilter::NextWeek),
            _ => Err(Error::InvalidFilter { kind: "date", value: s.to_string() }),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateFilter::All => ALL,
            DateFilter::Today => "today",
            DateFilter::Tomorrow => "tomorrow",
            DateFilter::ThisWeek => "this-week",
            DateFilter::NextWeek => "next-week",
        })
    }
}

/// The three list filters, combined by intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub date: DateFilter,
}

impl Filters {
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        self.status.matches(task) && self.category.matches(task) && self.date.matches(task, now)
    }

    /// Narrows `tasks` by status, then category, then date, keeping order.
    pub fn apply(&self, tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
        let by_status = filter_by_status(self.status, tasks);
        let by_category = filter_by_category(&self.category, &by_status);
        filter_by_date(self.date, &by_category, now)
    }
}

pub fn filter_by_status(status: StatusFilter, tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| status.matches(t)).cloned().collect()
}

pub fn filter_by_category(category: &CategoryFilter, tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| category.matches(t)).cloned().collect()
}

pub fn filter_by_date(date: DateFilter, tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
    tasks.iter().filter(|t| date.matches(t, now)).cloned().collect()
}
