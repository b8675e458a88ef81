use crate::{
    clock::{Clock, SystemClock},
    error::{ConfigError, GenerateError},
    IdParts, Layout,
};
use jiff::Timestamp;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Length of one time-field slot.
const SLOT: Duration = Duration::from_secs(1);

/// Clock re-reads allowed while waiting for one slot before giving up.
const MAX_WAIT_ROUNDS: usize = 16;

/// 2020-01-01T00:00:00Z.
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_577_836_800, 0);

/// How far the clock may step back before [`Snowfake::next_id`] gives up
/// waiting and reports [`GenerateError::ClockMovedBackwards`].
pub const DEFAULT_MAX_BACKWARD_DRIFT: Duration = Duration::from_secs(5);

/// Configures a Snowfake generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct SnowfakeSettings {
    /// Node index, unique across the deployment. Must be below
    /// `2^layout.node_bits()`.
    #[builder]
    pub node_id: u64,
    /// Zero point of the time field.
    ///
    /// Only whole seconds are used; sub-second detail is dropped.
    #[builder(default = DEFAULT_EPOCH)]
    pub epoch: Timestamp,
    #[builder(default)]
    pub layout: Layout,
    #[builder(default = DEFAULT_MAX_BACKWARD_DRIFT)]
    pub max_backward_drift: Duration,
}

#[derive(Debug, Default)]
struct GeneratorState {
    /// Elapsed seconds of the last emitted id.
    last_timestamp: u64,
    sequence: u64,
}

/// Snowflake-style id generator with second resolution.
///
/// Clock policy:
/// - if the per-second sequence is exhausted, wait for the next second
/// - if the clock moves backward by at most `max_backward_drift`, wait until
///   it catches up with the last emitted second; beyond that, fail
/// - a clock before the epoch, or past what the time field can hold, fails
///
/// Failures leave the generator untouched.
pub struct Snowfake<C: Clock> {
    node_id: u64,
    epoch: Timestamp,
    layout: Layout,
    max_backward_drift: Duration,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Snowfake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: SnowfakeSettings) -> Result<Self, ConfigError> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Snowfake<C> {
    fn with_clock(settings: SnowfakeSettings, clock: C) -> Result<Self, ConfigError> {
        let layout = settings.layout;
        if settings.node_id > layout.max_node_id() {
            return Err(ConfigError::NodeOutOfRange {
                node_id: settings.node_id,
                bound: layout.node_capacity(),
            });
        }

        let now = clock.now();
        if settings.epoch > now {
            return Err(ConfigError::EpochAhead {
                epoch: settings.epoch,
                now,
            });
        }

        Ok(Self {
            node_id: settings.node_id,
            epoch: settings.epoch,
            layout,
            max_backward_drift: settings.max_backward_drift,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    /// Generates the next id.
    ///
    /// Ids from one instance never decrease, and never repeat within a second
    /// as long as the node id is unique. May block for up to a second when the
    /// sequence is exhausted, or up to `max_backward_drift` after a clock step
    /// back.
    pub fn next_id(&self) -> Result<u64, GenerateError> {
        let mut state = self.state.lock().map_err(|_| GenerateError::StatePoisoned)?;
        let last = state.last_timestamp;

        let (mut now, mut elapsed) = self.elapsed()?;

        if elapsed < last {
            // Never emit a time field below one already handed out.
            let last_at = self.slot_start(last)?;
            if behind_by_more_than(last_at, now, self.max_backward_drift) {
                warn!(last = %last_at, now = %now, "clock moved backwards beyond tolerance");
                return Err(GenerateError::ClockMovedBackwards { last: last_at, now });
            }
            warn!(last = %last_at, now = %now, "clock moved backwards, waiting");
            (now, elapsed) = self.wait_for(last, self.max_backward_drift)?;
        }

        let sequence = if elapsed == last {
            let next = (state.sequence + 1) & self.layout.max_sequence();
            if next == 0 {
                // Sequence exhausted for this second: move on to the next one.
                let max = self.layout.max_timestamp();
                if last >= max {
                    return Err(GenerateError::TimeOverflow {
                        elapsed: last.saturating_add(1),
                        max,
                    });
                }
                debug!(timestamp = last, "sequence exhausted, waiting for next second");
                let tolerance = self.max_backward_drift.saturating_add(SLOT);
                (now, elapsed) = self.wait_for(last + 1, tolerance)?;
            }
            next
        } else {
            0
        };

        let id = self.layout.compose(elapsed, self.node_id, sequence);

        state.last_timestamp = elapsed;
        state.sequence = sequence;

        trace!(id, now = %now, sequence, "generated id");
        Ok(id)
    }

    /// Splits an id produced by this generator into its fields.
    pub fn decompose(&self, id: u64) -> IdParts {
        self.layout.decompose(id)
    }

    /// Wall-clock second at which `id` was generated.
    pub fn timestamp_of(&self, id: u64) -> Option<Timestamp> {
        self.decompose(id).timestamp_at(self.epoch)
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Reads the clock and converts it to seconds since the epoch.
    fn elapsed(&self) -> Result<(Timestamp, u64), GenerateError> {
        let now = self.clock.now();
        let seconds = now.as_second() - self.epoch.as_second();
        let elapsed = u64::try_from(seconds).map_err(|_| GenerateError::ClockBeforeEpoch {
            epoch: self.epoch,
            now,
        })?;

        let max = self.layout.max_timestamp();
        if elapsed > max {
            return Err(GenerateError::TimeOverflow { elapsed, max });
        }

        Ok((now, elapsed))
    }

    /// Blocks until at least `target` seconds have elapsed since the epoch.
    ///
    /// Fails with [`GenerateError::ClockMovedBackwards`] as soon as the clock
    /// is more than `tolerance` short of the target, or after
    /// `MAX_WAIT_ROUNDS` waits that did not reach it.
    fn wait_for(
        &self,
        target: u64,
        tolerance: Duration,
    ) -> Result<(Timestamp, u64), GenerateError> {
        let target_at = self.slot_start(target)?;
        let mut now = self.clock.now();
        for _ in 0..MAX_WAIT_ROUNDS {
            if behind_by_more_than(target_at, now, tolerance) {
                warn!(target = %target_at, now = %now, "clock fell behind while waiting");
                return Err(GenerateError::ClockMovedBackwards {
                    last: target_at,
                    now,
                });
            }
            self.clock.wait_until(target_at);
            let (read_at, elapsed) = self.elapsed()?;
            if elapsed >= target {
                return Ok((read_at, elapsed));
            }
            now = read_at;
        }
        warn!(target = %target_at, now = %now, "clock did not reach target");
        Err(GenerateError::ClockMovedBackwards {
            last: target_at,
            now,
        })
    }

    fn slot_start(&self, elapsed: u64) -> Result<Timestamp, GenerateError> {
        let overflow = || GenerateError::TimeOverflow {
            elapsed,
            max: self.layout.max_timestamp(),
        };
        let elapsed_i64 = i64::try_from(elapsed).map_err(|_| overflow())?;
        let second = self
            .epoch
            .as_second()
            .checked_add(elapsed_i64)
            .ok_or_else(overflow)?;
        Timestamp::from_second(second).map_err(|_| overflow())
    }
}

/// Whether `now` lags `target` by more than `tolerance`.
fn behind_by_more_than(target: Timestamp, now: Timestamp, tolerance: Duration) -> bool {
    let gap = target.as_nanosecond() - now.as_nanosecond();
    u128::try_from(gap).is_ok_and(|gap| gap > tolerance.as_nanos())
}
