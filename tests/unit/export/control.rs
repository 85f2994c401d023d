use super::*;

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check().is_ok());
    other.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.check(), Err(ReelError::Cancelled)));
}

#[test]
fn every_frames_is_due_on_multiples() {
    let mut clock = YieldClock::new(YieldPolicy::EveryFrames(4));
    let due: Vec<u64> = (1..=12).filter(|&k| clock.due(k)).collect();
    assert_eq!(due, vec![4, 8, 12]);
}

#[test]
fn every_interval_is_due_after_elapsed_time() {
    let mut clock = YieldClock::new(YieldPolicy::EveryInterval(Duration::from_millis(5)));
    std::thread::sleep(Duration::from_millis(10));
    assert!(clock.due(1));
    assert!(!clock.due(2));
}

#[test]
fn zero_cadence_is_rejected() {
    assert!(YieldPolicy::EveryFrames(0).validate().is_err());
    assert!(YieldPolicy::EveryInterval(Duration::ZERO).validate().is_err());
    assert!(YieldPolicy::default().validate().is_ok());
}

#[test]
fn yield_policy_serializes_interval_as_millis() {
    let json = serde_json::to_string(&YieldPolicy::EveryInterval(Duration::from_millis(16))).unwrap();
    assert_eq!(json, r#"{"every_interval":16}"#);
    let back: YieldPolicy = serde_json::from_str(r#"{"every_frames":3}"#).unwrap();
    assert_eq!(back, YieldPolicy::EveryFrames(3));
}

#[test]
fn busy_guard_is_exclusive_and_released_on_drop() {
    let flag = AtomicBool::new(false);
    let guard = BusyGuard::acquire(&flag).unwrap();
    assert!(matches!(BusyGuard::acquire(&flag), Err(ReelError::Busy)));
    drop(guard);
    assert!(BusyGuard::acquire(&flag).is_ok());
}
