//! Temporal Alignment
//!
//! Normalizes the two timestamp shapes weather providers emit into
//! timezone-aware local times:
//! - naive local `YYYY-MM-DDTHH:MM[:SS]`, read as wall-clock time in the target zone
//! - UTC-marked (`Z`) or offset-marked (`±HH:MM`, `±HHMM`, `±HH`), converted into the target zone
//!
//! Windows are half-open `[start, end)`. Selecting hours from a window yields
//! indices, never copies, so the same aligned series serves both the selected
//! window and the padded extended range.
//!
//! Naive local series must not repeat or skip wall-clock hours across a DST
//! change: the hour after a spring-forward gap lands on the same instant as
//! the shifted gap hour, and the source is rejected as non-increasing.

use crate::error::{EvalError, EvalResult};
use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Context padding either side of a window for span reporting and alternative search
pub const DEFAULT_PAD_HOURS: i64 = 6;

/// Largest accepted pad (one leap year)
pub const MAX_PAD_HOURS: i64 = 24 * 366;

/// Length of the date-and-minute prefix `YYYY-MM-DDTHH:MM`
const MINUTE_PREFIX_LEN: usize = 16;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Resolve an IANA zone id such as "Europe/Berlin"
pub fn parse_timezone(name: &str) -> EvalResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| EvalError::UnknownTimezone(name.to_string()))
}

fn malformed(raw: &str) -> EvalError {
    EvalError::MalformedTimestamp { raw: raw.to_string() }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Parse "+05:30", "-0800" or "+02" into a fixed offset
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, digits) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Attach `tz` to a wall-clock time
///
/// Ambiguous times (autumn fold) take the earlier instant. Times inside a
/// spring-forward gap do not exist and are moved one hour later.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Parse one provider timestamp into the target zone
pub fn parse_timestamp(raw: &str, tz: Tz) -> EvalResult<DateTime<Tz>> {
    let text = raw.trim();
    if !text.is_ascii() || text.len() < MINUTE_PREFIX_LEN {
        return Err(malformed(raw));
    }

    if let Some(body) = text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        let naive = parse_naive(body).ok_or_else(|| malformed(raw))?;
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(&tz));
    }

    // Offset sign can only appear after the minute field; earlier '-' are date separators
    if let Some(pos) = text[MINUTE_PREFIX_LEN..].find(|c: char| c == '+' || c == '-') {
        let split = MINUTE_PREFIX_LEN + pos;
        let naive = parse_naive(&text[..split]).ok_or_else(|| malformed(raw))?;
        let offset = parse_offset(&text[split..]).ok_or_else(|| malformed(raw))?;
        let utc = naive - Duration::seconds(offset.local_minus_utc() as i64);
        return Ok(Utc.from_utc_datetime(&utc).with_timezone(&tz));
    }

    parse_naive(text)
        .map(|naive| localize(naive, tz))
        .ok_or_else(|| malformed(raw))
}

/// Parse a whole timestamp column, preserving length and order
pub fn align<S: AsRef<str>>(raw: &[S], tz: Tz) -> EvalResult<Vec<DateTime<Tz>>> {
    raw.iter().map(|s| parse_timestamp(s.as_ref(), tz)).collect()
}

/// Whether `next` is exactly one hour after `prev`
pub fn is_next_hour(prev: DateTime<Tz>, next: DateTime<Tz>) -> bool {
    next - prev == Duration::hours(1)
}

// ============================================================================
// Windows
// ============================================================================

/// Half-open local-time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Rejects `start >= end` with `InvalidWindow`
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> EvalResult<Self> {
        if start >= end {
            return Err(EvalError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window from two local (or offset-marked) timestamp strings
    pub fn parse(start: &str, end: &str, tz: Tz) -> EvalResult<Self> {
        Self::new(parse_timestamp(start, tz)?, parse_timestamp(end, tz)?)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn contains(&self, t: DateTime<Tz>) -> bool {
        self.start <= t && t < self.end
    }

    /// Duration rounded to the nearest whole hour, at least 1
    pub fn duration_hours(&self) -> usize {
        let hours = (self.end - self.start).num_seconds() as f64 / 3600.0;
        hours.round().max(1.0) as usize
    }

    /// Same window widened by `pad_hours` on both sides
    ///
    /// Rejects pads outside `0..=MAX_PAD_HOURS` with `InvalidPad`.
    pub fn extended(&self, pad_hours: i64) -> EvalResult<Self> {
        if !(0..=MAX_PAD_HOURS).contains(&pad_hours) {
            return Err(EvalError::InvalidPad(pad_hours));
        }
        let pad = Duration::try_hours(pad_hours).ok_or(EvalError::InvalidPad(pad_hours))?;
        let start = self
            .start
            .checked_sub_signed(pad)
            .ok_or(EvalError::InvalidPad(pad_hours))?;
        let end = self
            .end
            .checked_add_signed(pad)
            .ok_or(EvalError::InvalidPad(pad_hours))?;
        Ok(Self { start, end })
    }
}

/// Indices of `times` inside the window, in order
///
/// An empty result means "no data in window"; callers must short-circuit
/// rather than evaluate an empty selection.
pub fn select(times: &[DateTime<Tz>], window: &TimeWindow) -> Vec<usize> {
    times
        .iter()
        .enumerate()
        .filter(|(_, t)| window.contains(**t))
        .map(|(i, _)| i)
        .collect()
}
