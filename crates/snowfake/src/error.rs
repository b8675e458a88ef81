use jiff::Timestamp;
use thiserror::Error;

/// Errors raised while validating a generator configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "bit budget exceeded: time + node + sequence = {total} bits, budget is {budget} ({excess} over)",
        excess = .total - .budget
    )]
    BitBudgetExceeded { total: u16, budget: u16 },
    #[error("invalid node id {node_id}; expected a value below {bound}")]
    NodeOutOfRange { node_id: u64, bound: u128 },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
}

/// Errors returned by [`Snowfake::next_id`](crate::Snowfake::next_id).
///
/// None of these mutate the generator: the last emitted timestamp and the
/// sequence counter stay as they were, so a later call can simply retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("clock is before the epoch: epoch={epoch}, now={now}")]
    ClockBeforeEpoch { epoch: Timestamp, now: Timestamp },
    #[error("elapsed time {elapsed}s does not fit the time field (max {max}s)")]
    TimeOverflow { elapsed: u64, max: u64 },
    #[error("clock moved backwards beyond tolerance: last={last}, now={now}")]
    ClockMovedBackwards { last: Timestamp, now: Timestamp },
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}

/// Errors returned when decoding a base58 string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty base58 string")]
    Empty,
    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("base58 value does not fit in 64 bits")]
    Overflow,
    #[error("malformed base58 string: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
