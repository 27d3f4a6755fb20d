use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn delays(schedule: &Schedule) -> Vec<Duration> {
    schedule.decisions().collect()
}

#[test]
fn test_recurs_yields_zero_delays() {
    assert_eq!(delays(&Schedule::recurs(3)), vec![Duration::ZERO; 3]);
    assert!(delays(&Schedule::never()).is_empty());
}

#[test]
fn test_forever_is_unbounded() {
    assert_eq!(Schedule::forever().decisions().take(1000).count(), 1000);
}

#[test]
fn test_linear_delay() {
    let s = Schedule::linear(ms(100)).take(3);
    assert_eq!(delays(&s), vec![ms(100), ms(200), ms(300)]);
}

#[test]
fn test_fibonacci_delay() {
    let s = Schedule::fibonacci(ms(10)).take(6);
    assert_eq!(
        delays(&s),
        vec![ms(10), ms(10), ms(20), ms(30), ms(50), ms(80)]
    );
}

#[test]
fn test_exponential_saturates() {
    let last = Schedule::exponential(Duration::from_secs(1))
        .decisions()
        .nth(100);
    assert!(last.is_some());
}

#[test]
fn test_union_takes_shorter_delay_and_longer_run() {
    let s = Schedule::spaced(ms(50)).take(2) | Schedule::spaced(ms(10)).take(4);
    assert_eq!(delays(&s), vec![ms(10), ms(10), ms(10), ms(10)]);
}

#[test]
fn test_intersect_takes_longer_delay_and_shorter_run() {
    let s = Schedule::spaced(ms(50)).take(2) & Schedule::spaced(ms(10)).take(4);
    assert_eq!(delays(&s), vec![ms(50), ms(50)]);
}

#[test]
fn test_then_appends() {
    let s = Schedule::recurs(1).then(Schedule::spaced(ms(5)).take(2));
    assert_eq!(delays(&s), vec![Duration::ZERO, ms(5), ms(5)]);
}

#[test]
fn test_repeat_restarts_inner_schedule() {
    let s = Schedule::linear(ms(1)).take(2).repeat(3);
    assert_eq!(
        delays(&s),
        vec![ms(1), ms(2), ms(1), ms(2), ms(1), ms(2)]
    );
}

#[test]
fn test_max_delay_cap() {
    let s = Schedule::exponential(ms(100)).max_delay(ms(250)).take(4);
    assert_eq!(delays(&s), vec![ms(100), ms(200), ms(250), ms(250)]);
}

#[test]
fn test_max_cumulative_delay_stops() {
    let s = Schedule::spaced(ms(40)).max_cumulative_delay(ms(100));
    assert_eq!(delays(&s), vec![ms(40), ms(40)]);
}

#[test]
fn test_decisions_restart_from_beginning() {
    let s = Schedule::linear(ms(1)).take(2);
    assert_eq!(delays(&s), delays(&s));
}

#[test]
fn test_done_is_sticky() {
    let mut d = Schedule::never().decisions();
    assert_eq!(d.decide(), Decision::Done);
    assert_eq!(d.decide(), Decision::Done);
}

#[test]
fn test_jitter_keeps_length() {
    let s = Schedule::spaced(ms(100)).take(5).with_full_jitter();
    let out = delays(&s);
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|d| *d <= ms(100)));
}

#[test]
fn test_fibonacci_function() {
    assert_eq!(fibonacci(0), 0);
    assert_eq!(fibonacci(1), 1);
    assert_eq!(fibonacci(2), 1);
    assert_eq!(fibonacci(10), 55);
    assert_eq!(fibonacci(100), u32::MAX);
}

#[test]
fn test_schedule_is_clone_and_debug() {
    let s = Schedule::exponential(ms(1)).take(3);
    assert_eq!(s.clone(), s);
    assert!(format!("{:?}", s).contains("Exponential"));
}
