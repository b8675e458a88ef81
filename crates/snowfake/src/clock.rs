use jiff::Timestamp;
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Block for roughly the time left until `target`.
    ///
    /// May return before the target is reached, e.g. when the clock is
    /// adjusted during the wait. Callers re-read [`Clock::now`] afterwards.
    fn wait_until(&self, target: Timestamp);
}

/// Wall clock backed by [`Timestamp::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        let gap = target.as_nanosecond() - Timestamp::now().as_nanosecond();
        if gap <= 0 {
            return;
        }
        // At least 1 ms so a sub-millisecond gap never spins.
        let gap = Duration::from_nanos(u64::try_from(gap).unwrap_or(u64::MAX));
        std::thread::sleep(gap.max(Duration::from_millis(1)));
    }
}
