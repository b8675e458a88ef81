//! Coordination-free, time-ordered 64-bit ids.
//!
//! A [`Snowfake`] packs seconds since an epoch, a node id and a per-second
//! sequence into one `u64` according to a [`Layout`]. The [`base58`] module
//! turns such ids into short strings and back.

pub mod base58;
mod clock;
pub mod error;
mod layout;
mod parts;
mod snowfake;

pub use base58::Base58Id;
pub use clock::{Clock, SystemClock};
pub use error::{ConfigError, DecodeError, Error, GenerateError};
pub use layout::{Layout, DEFAULT_NODE_BITS, DEFAULT_SEQ_BITS, DEFAULT_TIME_BITS, ID_BITS};
pub use parts::IdParts;
pub use snowfake::{Snowfake, SnowfakeSettings, DEFAULT_EPOCH, DEFAULT_MAX_BACKWARD_DRIFT};
