//! Unit tests for the market-hours predicate

use chrono::{Local, TimeZone};
use optrix::simulator::hours::is_market_open;

#[test]
fn weekday_inside_session_is_open() {
    // Wednesday
    let now = Local.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap();
    assert!(is_market_open(now));
}

#[test]
fn session_boundaries_are_half_open() {
    let before_open = Local.with_ymd_and_hms(2026, 8, 5, 9, 14, 59).unwrap();
    let at_open = Local.with_ymd_and_hms(2026, 8, 5, 9, 15, 0).unwrap();
    let last_minute = Local.with_ymd_and_hms(2026, 8, 5, 15, 29, 59).unwrap();
    let at_close = Local.with_ymd_and_hms(2026, 8, 5, 15, 30, 0).unwrap();

    assert!(!is_market_open(before_open));
    assert!(is_market_open(at_open));
    assert!(is_market_open(last_minute));
    assert!(!is_market_open(at_close));
}

#[test]
fn weekends_are_closed() {
    let saturday = Local.with_ymd_and_hms(2026, 8, 8, 11, 0, 0).unwrap();
    let sunday = Local.with_ymd_and_hms(2026, 8, 9, 11, 0, 0).unwrap();
    assert!(!is_market_open(saturday));
    assert!(!is_market_open(sunday));
}

#[test]
fn weekday_evening_is_closed() {
    let evening = Local.with_ymd_and_hms(2026, 8, 5, 18, 0, 0).unwrap();
    assert!(!is_market_open(evening));
}
