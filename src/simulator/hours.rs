//! Exchange-session predicate.

use chrono::{DateTime, Datelike, Local, Timelike, Weekday};

const OPEN_MINUTE_OF_DAY: u32 = 9 * 60 + 15;
const CLOSE_MINUTE_OF_DAY: u32 = 15 * 60 + 30;

/// Whether the market is deemed open at `now`: a weekday with the local
/// time-of-day in `[09:15, 15:30)`. No holiday calendar.
pub fn is_market_open(now: DateTime<Local>) -> bool {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minute_of_day = now.hour() * 60 + now.minute();
    (OPEN_MINUTE_OF_DAY..CLOSE_MINUTE_OF_DAY).contains(&minute_of_day)
}
