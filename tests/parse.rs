//! Parsing, serialization and model round-trip tests.

use cadence::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum, parse_rrule};
use chrono::NaiveDate;

#[test_log::test]
fn parsed_rules_survive_display_and_reparse() {
    let texts = [
        "FREQ=DAILY",
        "FREQ=DAILY;COUNT=10",
        "FREQ=WEEKLY;INTERVAL=2;WKST=SU;BYDAY=MO,WE,FR",
        "FREQ=MONTHLY;BYDAY=2TU",
        "FREQ=MONTHLY;BYDAY=-1FR;BYSETPOS=1",
        "FREQ=YEARLY;UNTIL=20301231;BYMONTH=3,9",
        "FREQ=YEARLY;BYWEEKNO=1,-1;BYDAY=MO",
        "FREQ=YEARLY;BYYEARDAY=1,100,-1",
        "FREQ=HOURLY;BYMINUTE=0,30;BYSECOND=0",
    ];
    for text in texts {
        let parsed = parse_rrule(text).expect(text);
        let reparsed = parse_rrule(&parsed.to_string()).expect(text);
        assert_eq!(parsed, reparsed, "{text}");
    }
}

#[test_log::test]
fn rules_round_trip_through_serde() {
    let rule = RRule {
        interval: Some(4),
        until: Some(RRuleUntil::Date(
            NaiveDate::from_ymd_opt(2040, 11, 10).unwrap(),
        )),
        by_month: vec![11],
        by_day: vec![WeekdayNum::nth(1, Weekday::Tuesday)],
        ..RRule::new(Frequency::Yearly)
    };

    let json = serde_json::to_string(&rule).unwrap();
    let back: RRule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rule);
    assert_eq!(back.freq, Some(Frequency::Yearly));
}

#[test_log::test]
fn parsed_rule_expands() {
    // The parser output feeds the pipeline directly.
    let rule = parse_rrule("FREQ=MONTHLY;BYDAY=2TU;COUNT=2").unwrap();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();
    let occurrences: Vec<_> = rule
        .iter_from(start)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        occurrences,
        vec![
            NaiveDate::from_ymd_opt(2020, 1, 14)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 11)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
        ]
    );
}
