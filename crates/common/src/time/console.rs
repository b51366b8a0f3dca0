//! Console timestamp parsing
//!
//! The MailUp console reports times as `DD/MM/YYYY HH:MM:SS` local to Italy,
//! without any zone marker. Parsing always happens in [`CONSOLE_TIMEZONE`],
//! never in the host zone.

use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Zone in which console timestamps are expressed.
pub const CONSOLE_TIMEZONE: Tz = chrono_tz::Europe::Rome;

static CONSOLE_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)/(\d+)/(\d+) (\d+)[:.](\d+)[:.](\d+)")
        .expect("CONSOLE_DATETIME should compile - this is a bug")
});

/// Parse a console timestamp into seconds since the UNIX epoch.
///
/// The date separator is `/`; the time separator may be `:` or `.`.
/// Returns `None` for empty input, text that does not contain the pattern, or
/// an impossible calendar date.
///
/// Wall times that fall into the spring-forward gap are moved one hour ahead;
/// ambiguous wall times in the autumn overlap resolve to the earlier instant.
pub fn parse_console_datetime(value: &str) -> Option<i64> {
    let caps = CONSOLE_DATETIME.captures(value)?;
    let field = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let (day, month, year) = (field(1)?, field(2)?, field(3)?);
    let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);

    let naive = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?
        .and_hms_opt(hour, minute, second)?;

    localize(naive)
}

fn localize(naive: NaiveDateTime) -> Option<i64> {
    match CONSOLE_TIMEZONE.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp()),
        LocalResult::None => CONSOLE_TIMEZONE
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp()),
    }
}
