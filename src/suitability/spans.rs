//! Span Grouper
//!
//! Collapses a per-hour predicate into maximal contiguous runs. A span is
//! closed on its last matching hour; `end_exclusive` (one hour later) is the
//! half-open close consumers should use to enumerate rows.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Contiguous run of matching hours `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Span {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    /// Half-open close of the span
    pub fn end_exclusive(&self) -> DateTime<Tz> {
        self.end + Duration::hours(1)
    }

    pub fn contains(&self, t: DateTime<Tz>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Hours covered, counting both ends
    pub fn hours(&self) -> i64 {
        (self.end - self.start).num_hours() + 1
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Span", 3)?;
        state.serialize_field("start", &self.start.to_rfc3339())?;
        state.serialize_field("end", &self.end.to_rfc3339())?;
        state.serialize_field("end_exclusive", &self.end_exclusive().to_rfc3339())?;
        state.end()
    }
}

/// One span per maximal run of items matching `predicate`
///
/// `timestamps` and `items` are parallel; extra entries on either side are ignored.
pub fn group_by<T>(
    timestamps: &[DateTime<Tz>],
    items: &[T],
    predicate: impl Fn(&T) -> bool,
) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut open: Option<(DateTime<Tz>, DateTime<Tz>)> = None;

    for (t, item) in timestamps.iter().zip(items) {
        if predicate(item) {
            open = match open {
                Some((start, _)) => Some((start, *t)),
                None => Some((*t, *t)),
            };
        } else if let Some((start, end)) = open.take() {
            spans.push(Span::new(start, end));
        }
    }
    if let Some((start, end)) = open {
        spans.push(Span::new(start, end));
    }
    spans
}

/// Spans of `true` in a boolean mask
pub fn group(timestamps: &[DateTime<Tz>], mask: &[bool]) -> Vec<Span> {
    group_by(timestamps, mask, |b| *b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{align, parse_timezone};

    fn hours(n: usize) -> Vec<DateTime<Tz>> {
        let raw: Vec<String> = (0..n).map(|h| format!("2024-06-01T{:02}:00", h)).collect();
        align(&raw, parse_timezone("Europe/Berlin").unwrap()).unwrap()
    }

    #[test]
    fn test_runs_become_spans() {
        let t = hours(6);
        let spans = group(&t, &[false, true, true, false, true, false]);
        assert_eq!(spans, vec![Span::new(t[1], t[2]), Span::new(t[4], t[4])]);
        assert_eq!(spans[0].hours(), 2);
        assert_eq!(spans[1].hours(), 1);
        assert_eq!(spans[1].end_exclusive(), t[5]);
    }

    #[test]
    fn test_trailing_run_is_closed() {
        let t = hours(3);
        assert_eq!(group(&t, &[false, true, true]), vec![Span::new(t[1], t[2])]);
        assert_eq!(group(&t, &[true, true, true]), vec![Span::new(t[0], t[2])]);
    }

    #[test]
    fn test_empty_and_all_false() {
        assert!(group(&[], &[]).is_empty());
        let t = hours(3);
        assert!(group(&t, &[false, false, false]).is_empty());
    }

    #[test]
    fn test_group_by_predicate() {
        let t = hours(4);
        let values = [10.0, 80.0, 85.0, 5.0];
        let spans = group_by(&t, &values, |v| *v > 50.0);
        assert_eq!(spans, vec![Span::new(t[1], t[2])]);
        assert!(spans[0].contains(t[2]));
        assert!(!spans[0].contains(t[3]));
    }

    #[test]
    fn test_serialized_with_exclusive_close() {
        let t = hours(2);
        let value = serde_json::to_value(Span::new(t[0], t[0])).unwrap();
        assert_eq!(value["start"], "2024-06-01T00:00:00+02:00");
        assert_eq!(value["end"], "2024-06-01T00:00:00+02:00");
        assert_eq!(value["end_exclusive"], "2024-06-01T01:00:00+02:00");
    }
}
