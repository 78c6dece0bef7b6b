use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll `condition` until it holds or `timeout` elapses. Returns the last result.
pub fn wait_for_condition(timeout: Duration, condition: impl FnMut() -> bool) -> bool {
    wait_for_condition_with_interval(timeout, DEFAULT_POLL_INTERVAL, condition)
}

pub fn wait_for_condition_with_interval(
    timeout: Duration,
    interval: Duration,
    mut condition: impl FnMut() -> bool,
) -> bool {
    // `None` when the timeout overflows; poll until the condition holds.
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if condition() {
            return true;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        thread::sleep(pause);
    }
}
