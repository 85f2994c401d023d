use super::*;

#[test]
fn linear_backoff_grows_with_attempt() {
    let b = Backoff::Linear { base_ms: 1000 };
    assert_eq!(b.delay_after(1), Duration::from_millis(1000));
    assert_eq!(b.delay_after(2), Duration::from_millis(2000));
    assert_eq!(b.delay_after(3), Duration::from_millis(3000));
}

#[test]
fn exponential_backoff_is_capped() {
    let b = Backoff::Exponential {
        base_ms: 100,
        max_ms: 500,
    };
    assert_eq!(b.delay_after(1), Duration::from_millis(100));
    assert_eq!(b.delay_after(2), Duration::from_millis(200));
    assert_eq!(b.delay_after(3), Duration::from_millis(400));
    assert_eq!(b.delay_after(4), Duration::from_millis(500));
    assert_eq!(b.delay_after(60), Duration::from_millis(500));
}

#[test]
fn succeeds_after_transient_failures() {
    let mut calls = Vec::new();
    let out = retry_with_backoff(&RetryPolicy::immediate(3), "t", |attempt| {
        calls.push(attempt);
        if attempt < 3 { Err("flaky") } else { Ok(42) }
    });
    assert_eq!(out.unwrap(), 42);
    assert_eq!(calls, vec![1, 2, 3]);
}

#[test]
fn gives_up_after_max_attempts() {
    let mut calls = 0;
    let out: Result<(), _> = retry_with_backoff(&RetryPolicy::immediate(4), "t", |_| {
        calls += 1;
        Err("down")
    });
    let err = out.unwrap_err();
    assert_eq!(err.attempts, 4);
    assert_eq!(err.last, "down");
    assert_eq!(calls, 4);
}

#[test]
fn zero_attempts_still_tries_once() {
    let mut calls = 0;
    let _: Result<(), _> = retry_with_backoff(&RetryPolicy::immediate(0), "t", |_| {
        calls += 1;
        Err("x")
    });
    assert_eq!(calls, 1);
}
