//! Alternative-Window Search
//!
//! Finds the nearest fully passing block of the same duration on each side of
//! the requested window, inside the extended range. Each direction yields at
//! most one candidate, so a result holds zero to two alternatives.
//!
//! Both scans keep a running count of consecutive passing hours, which makes
//! the search linear in the extended range. A run only continues across
//! exactly hour-spaced timestamps; a gap in the source breaks it.

use crate::temporal::{is_next_hour, TimeWindow};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;

/// Which side of the requested window a candidate lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Before,
    After,
}

impl Direction {
    pub fn display_text(&self) -> &'static str {
        match self {
            Direction::Before => "Earlier",
            Direction::After => "Later",
        }
    }
}

/// Candidate replacement window, closed on its last hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub direction: Direction,
}

impl AltWindow {
    pub fn end_exclusive(&self) -> DateTime<Tz> {
        self.end + Duration::hours(1)
    }

    pub fn hours(&self) -> i64 {
        (self.end - self.start).num_hours() + 1
    }
}

impl Serialize for AltWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AltWindow", 4)?;
        state.serialize_field("start", &self.start.to_rfc3339())?;
        state.serialize_field("end", &self.end.to_rfc3339())?;
        state.serialize_field("end_exclusive", &self.end_exclusive().to_rfc3339())?;
        state.serialize_field("direction", &self.direction)?;
        state.end()
    }
}

/// Indices splitting the extended range around the requested window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchBoundary {
    /// Last hour strictly before the window start
    pub last_before: Option<usize>,
    /// First hour at or after the window end
    pub first_after: Option<usize>,
}

impl SearchBoundary {
    /// Locate the boundary in sorted extended-range timestamps
    pub fn around(times: &[DateTime<Tz>], window: &TimeWindow) -> Self {
        let before_count = times.partition_point(|t| *t < window.start());
        let after_start = times.partition_point(|t| *t < window.end());
        Self {
            last_before: before_count.checked_sub(1),
            first_after: (after_start < times.len()).then_some(after_start),
        }
    }
}

/// Length of the passing run ending at each index in `from..=to`, fed to `visit`
///
/// Stops as soon as `visit` returns `true` and reports that index.
fn scan_runs(
    times: &[DateTime<Tz>],
    mask: &[bool],
    from: usize,
    to: usize,
    mut visit: impl FnMut(usize, usize) -> bool,
) -> Option<usize> {
    let mut run = 0usize;
    for i in from..=to {
        let continues = i > from && is_next_hour(times[i - 1], times[i]);
        run = match (mask[i], continues) {
            (false, _) => 0,
            (true, true) => run + 1,
            (true, false) => 1,
        };
        if visit(i, run) {
            return Some(i);
        }
    }
    None
}

/// Most recent `duration`-hour passing block ending at or before `last_before`
fn search_before(
    times: &[DateTime<Tz>],
    mask: &[bool],
    duration: usize,
    last_before: usize,
) -> Option<AltWindow> {
    let mut latest_end = None;
    scan_runs(times, mask, 0, last_before, |i, run| {
        if run >= duration {
            latest_end = Some(i);
        }
        false
    });
    latest_end.map(|end| AltWindow {
        start: times[end + 1 - duration],
        end: times[end],
        direction: Direction::Before,
    })
}

/// Soonest `duration`-hour passing block starting at or after `first_after`
fn search_after(
    times: &[DateTime<Tz>],
    mask: &[bool],
    duration: usize,
    first_after: usize,
) -> Option<AltWindow> {
    let last = times.len() - 1;
    scan_runs(times, mask, first_after, last, |_, run| run >= duration).map(|end| AltWindow {
        start: times[end + 1 - duration],
        end: times[end],
        direction: Direction::After,
    })
}

/// Nearest all-pass alternatives before and after the requested window
///
/// `times` and `mask` cover the extended range; `duration` is the requested
/// window length in whole hours.
pub fn find_alternatives(
    times: &[DateTime<Tz>],
    mask: &[bool],
    duration: usize,
    boundary: SearchBoundary,
) -> Vec<AltWindow> {
    let len = times.len().min(mask.len());
    let (times, mask) = (&times[..len], &mask[..len]);
    if duration == 0 || len == 0 {
        return Vec::new();
    }

    let before = boundary
        .last_before
        .filter(|&i| i < len)
        .and_then(|i| search_before(times, mask, duration, i));
    let after = boundary
        .first_after
        .filter(|&i| i < len)
        .and_then(|i| search_after(times, mask, duration, i));

    tracing::debug!(
        duration,
        before = before.is_some(),
        after = after.is_some(),
        "alternative window search"
    );
    before.into_iter().chain(after).collect()
}
