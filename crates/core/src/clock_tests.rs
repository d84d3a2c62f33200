use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advances_by_duration() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(chrono::Duration::seconds(90));
    assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
}

#[test]
fn fake_clock_set_overrides_value() {
    let clock = FakeClock::new(Utc::now());
    let target = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}
