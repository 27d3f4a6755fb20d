#![cfg(feature = "serde")]
//! Loading schedules from configuration.

use std::time::Duration;

use millrace::{JitterStrategy, Schedule};

#[test]
fn schedule_survives_json() {
    let schedule = Schedule::exponential(Duration::from_millis(100))
        .take(5)
        .max_delay(Duration::from_secs(1))
        .with_decorrelated_jitter();

    let json = serde_json::to_string(&schedule).unwrap();
    let back: Schedule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, schedule);
}

#[test]
fn schedule_from_hand_written_config() {
    let json = r#"{
        "union": [
            { "recurs": 3 },
            { "take": [{ "spaced": { "secs": 2, "nanos": 0 } }, 1] }
        ]
    }"#;

    let schedule: Schedule = serde_json::from_str(json).unwrap();
    let delays: Vec<Duration> = schedule.decisions().collect();
    assert_eq!(delays, vec![Duration::ZERO; 3]);
}

#[test]
fn unit_variants_are_snake_case_strings() {
    assert_eq!(serde_json::to_string(&Schedule::forever()).unwrap(), r#""forever""#);
    assert_eq!(serde_json::to_string(&JitterStrategy::Full).unwrap(), r#""full""#);

    let strategy: JitterStrategy = serde_json::from_str(r#"{ "proportional": 0.25 }"#).unwrap();
    assert_eq!(strategy, JitterStrategy::Proportional(0.25));
}
