use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone};
use tracing::trace;

pub const COMPLETED_MESSAGE: &str = "Completed!";
pub const OVERDUE_MESSAGE: &str = "Overdue!";
pub const INVALID_MESSAGE: &str = "Invalid deadline";

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time left until a deadline, split into whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Splits a non-negative millisecond span, flooring each unit.
    pub fn from_millis(ms: i64) -> Remaining {
        Remaining {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h {}m {}s", self.days, self.hours, self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// Not ticked yet.
    Pending,
    Running(Remaining),
    Done,
    Expired,
    Invalid,
}

impl CountdownState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CountdownState::Done | CountdownState::Expired | CountdownState::Invalid)
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownState::Pending => Ok(()),
            CountdownState::Running(r) => write!(f, "{}", r),
            CountdownState::Done => f.write_str(COMPLETED_MESSAGE),
            CountdownState::Expired => f.write_str(OVERDUE_MESSAGE),
            CountdownState::Invalid => f.write_str(INVALID_MESSAGE),
        }
    }
}

/// Countdown for one rendered task.
#[derive(Debug, Clone)]
pub struct Countdown {
    deadline: Option<NaiveDateTime>,
    state: CountdownState,
}

impl Countdown {
    pub fn new(deadline: Option<NaiveDateTime>) -> Countdown {
        Countdown { deadline, state: CountdownState::Pending }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Advances one step using the local time zone.
    pub fn tick(&mut self, now: NaiveDateTime, completed: bool) -> CountdownState {
        self.tick_in(&Local, now, completed)
    }

    /// Advances one step with `now` and the deadline read as wall-clock times
    /// in `tz`. Terminal states never change again.
    pub fn tick_in<Tz: TimeZone>(&mut self, tz: &Tz, now: NaiveDateTime, completed: bool) -> CountdownState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = if completed {
            CountdownState::Done
        } else {
            match self.deadline {
                None => CountdownState::Invalid,
                Some(deadline) => {
                    let left = millis_until(tz, now, deadline);
                    if left < 0 {
                        CountdownState::Expired
                    } else {
                        CountdownState::Running(Remaining::from_millis(left))
                    }
                }
            }
        };
        self.state
    }
}

/// Real milliseconds from `now` until `deadline`, both wall-clock times in `tz`.
pub fn millis_until<Tz: TimeZone>(tz: &Tz, now: NaiveDateTime, deadline: NaiveDateTime) -> i64 {
    (resolve(tz, deadline) - resolve(tz, now)).num_milliseconds()
}

// Repeated wall-clock times take the earlier instant; times skipped by a
// forward jump move one hour ahead.
fn resolve<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&local)),
    }
}

/// Live countdowns keyed by task id.
///
/// A list rebuild calls [`CountdownRegistry::reset`] before starting the new
/// set, so no countdown outlives the row it was started for.
#[derive(Debug, Default)]
pub struct CountdownRegistry {
    countdowns: BTreeMap<u64, Countdown>,
}

impl CountdownRegistry {
    pub fn new() -> CountdownRegistry {
        CountdownRegistry::default()
    }

    /// Cancels every countdown.
    pub fn reset(&mut self) {
        trace!(cancelled = self.countdowns.len(), "countdowns reset");
        self.countdowns.clear();
    }

    /// Starts (or restarts) the countdown for `id`.
    pub fn start(&mut self, id: u64, deadline: Option<NaiveDateTime>) {
        self.countdowns.insert(id, Countdown::new(deadline));
    }

    pub fn cancel(&mut self, id: u64) {
        self.countdowns.remove(&id);
    }

    /// Ticks every non-terminal countdown. `is_completed` reports the current
    /// completion flag of a task id.
    pub fn tick<F>(&mut self, now: NaiveDateTime, is_completed: F)
    where
        F: Fn(u64) -> bool,
    {
        for (id, countdown) in self.countdowns.iter_mut() {
            countdown.tick(now, is_completed(*id));
        }
    }

    pub fn state(&self, id: u64) -> Option<CountdownState> {
        self.countdowns.get(&id).map(|c| c.state())
    }

    /// Text shown in the row of task `id`; empty if no countdown runs for it.
    pub fn label(&self, id: u64) -> String {
        self.state(id).map(|s| s.to_string()).unwrap_or_default()
    }

    /// Number of countdowns that still need ticks.
    pub fn running(&self) -> usize {
        self.countdowns.values().filter(|c| !c.state().is_terminal()).count()
    }

    pub fn len(&self) -> usize {
        self.countdowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countdowns.is_empty()
    }
}
