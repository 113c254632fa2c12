use std::time::Duration;

use super::Backoff;

#[test]
fn test_delay_grows_quadratically() {
    let mut backoff = Backoff::new(Duration::from_secs(180));
    let delays: Vec<u64> = (0..5).map(|_| backoff.next_delay().as_secs()).collect();
    assert_eq!(delays, vec![1, 4, 9, 16, 25]);
    assert_eq!(backoff.failures(), 5);
}

#[test]
fn test_delay_is_capped_at_limit() {
    let mut backoff = Backoff::new(Duration::from_secs(180));
    for _ in 0..13 {
        backoff.next_delay();
    }
    // 14² = 196 > 180
    assert_eq!(backoff.next_delay(), Duration::from_secs(180));
    assert_eq!(backoff.next_delay(), Duration::from_secs(180));
}

#[test]
fn test_reset_starts_over() {
    let mut backoff = Backoff::new(Duration::from_secs(180));
    backoff.next_delay();
    backoff.next_delay();
    backoff.reset();
    assert_eq!(backoff.failures(), 0);
    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
}
