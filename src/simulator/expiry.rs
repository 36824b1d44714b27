//! Expiry-date selection.
//!
//! A static seed list is filtered to dates that have not yet lapsed and
//! topped up with forward weekly Thursday expiries until four are
//! available. This operation cannot fail.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Number of expiries always returned.
pub const EXPIRY_COUNT: usize = 4;

const SEED_DATES: [(i32, u32, u32); 4] = [
    (2026, 8, 27),
    (2026, 9, 3),
    (2026, 9, 10),
    (2026, 9, 24),
];

pub fn seed_dates() -> Vec<NaiveDate> {
    SEED_DATES
        .iter()
        .map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid seed expiry date"))
        .collect()
}

/// The [`EXPIRY_COUNT`] nearest expiries on or after `today`, ascending.
pub fn upcoming_expiries(seed: &[NaiveDate], today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = seed.iter().copied().filter(|d| *d >= today).collect();
    dates.sort_unstable();
    dates.dedup();

    let mut cursor = dates.last().copied().unwrap_or(today);
    while dates.len() < EXPIRY_COUNT {
        cursor = next_thursday_after(cursor);
        if !dates.contains(&cursor) {
            dates.push(cursor);
        }
    }

    dates.sort_unstable();
    dates.truncate(EXPIRY_COUNT);
    dates
}

fn next_thursday_after(date: NaiveDate) -> NaiveDate {
    let mut next = date + Days::new(1);
    while next.weekday() != Weekday::Thu {
        next = next + Days::new(1);
    }
    next
}
