use crate::{error::ConfigError, IdParts};

/// Number of bits available in an id.
pub const ID_BITS: u8 = 64;

pub const DEFAULT_TIME_BITS: u8 = 32;
pub const DEFAULT_NODE_BITS: u8 = 8;
pub const DEFAULT_SEQ_BITS: u8 = 24;

/// Bit positions of the time, node and sequence fields inside a 64-bit id.
///
/// Fields are packed from the most significant end:
///
/// ```text
/// | unused | time (time_bits) | node (node_bits) | sequence (seq_bits) |
/// ```
///
/// Ids from one layout therefore sort by time first, then node, then
/// sequence. Widths may sum to less than 64; the remaining high bits stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    time_bits: u8,
    node_bits: u8,
    seq_bits: u8,

    time_shift: u8,
    node_shift: u8,
    seq_shift: u8,

    time_mask: u64,
    node_mask: u64,
    seq_mask: u64,
}

impl Layout {
    /// Derives shifts and masks for the given field widths.
    ///
    /// Fails with [`ConfigError::BitBudgetExceeded`] when the widths sum to
    /// more than 64 bits.
    pub fn new(time_bits: u8, node_bits: u8, seq_bits: u8) -> Result<Self, ConfigError> {
        let total = u16::from(time_bits) + u16::from(node_bits) + u16::from(seq_bits);
        if total > u16::from(ID_BITS) {
            return Err(ConfigError::BitBudgetExceeded {
                total,
                budget: u16::from(ID_BITS),
            });
        }

        let time_shift = node_bits + seq_bits;
        let node_shift = seq_bits;
        let seq_shift = 0;

        Ok(Self {
            time_bits,
            node_bits,
            seq_bits,
            time_shift,
            node_shift,
            seq_shift,
            time_mask: shl(field_max(time_bits), time_shift),
            node_mask: shl(field_max(node_bits), node_shift),
            seq_mask: shl(field_max(seq_bits), seq_shift),
        })
    }

    pub fn time_bits(&self) -> u8 {
        self.time_bits
    }

    pub fn node_bits(&self) -> u8 {
        self.node_bits
    }

    pub fn seq_bits(&self) -> u8 {
        self.seq_bits
    }

    pub fn time_shift(&self) -> u8 {
        self.time_shift
    }

    pub fn node_shift(&self) -> u8 {
        self.node_shift
    }

    pub fn seq_shift(&self) -> u8 {
        self.seq_shift
    }

    pub fn time_mask(&self) -> u64 {
        self.time_mask
    }

    pub fn node_mask(&self) -> u64 {
        self.node_mask
    }

    pub fn seq_mask(&self) -> u64 {
        self.seq_mask
    }

    /// Total number of bits the three fields occupy.
    pub fn used_bits(&self) -> u8 {
        self.time_bits + self.node_bits + self.seq_bits
    }

    /// Largest elapsed-seconds value the time field can hold.
    pub fn max_timestamp(&self) -> u64 {
        field_max(self.time_bits)
    }

    pub fn max_node_id(&self) -> u64 {
        field_max(self.node_bits)
    }

    pub fn max_sequence(&self) -> u64 {
        field_max(self.seq_bits)
    }

    /// Number of distinct node ids, `2^node_bits`.
    pub fn node_capacity(&self) -> u128 {
        1_u128 << self.node_bits
    }

    /// Packs the three fields into an id. Each value is truncated to its field.
    pub fn compose(&self, timestamp: u64, node_id: u64, sequence: u64) -> u64 {
        (shl(timestamp, self.time_shift) & self.time_mask)
            | (shl(node_id, self.node_shift) & self.node_mask)
            | (shl(sequence, self.seq_shift) & self.seq_mask)
    }

    /// Splits an id back into its fields.
    pub fn decompose(&self, id: u64) -> IdParts {
        IdParts {
            timestamp: shr(id & self.time_mask, self.time_shift),
            node_id: shr(id & self.node_mask, self.node_shift),
            sequence: shr(id & self.seq_mask, self.seq_shift),
        }
    }
}

impl Default for Layout {
    /// 32 bits of seconds (about 136 years), 256 nodes and 16,777,216 ids
    /// per node per second.
    fn default() -> Self {
        Self {
            time_bits: DEFAULT_TIME_BITS,
            node_bits: DEFAULT_NODE_BITS,
            seq_bits: DEFAULT_SEQ_BITS,
            time_shift: DEFAULT_NODE_BITS + DEFAULT_SEQ_BITS,
            node_shift: DEFAULT_SEQ_BITS,
            seq_shift: 0,
            time_mask: field_max(DEFAULT_TIME_BITS) << (DEFAULT_NODE_BITS + DEFAULT_SEQ_BITS),
            node_mask: field_max(DEFAULT_NODE_BITS) << DEFAULT_SEQ_BITS,
            seq_mask: field_max(DEFAULT_SEQ_BITS),
        }
    }
}

/// `2^width - 1`, saturating at `u64::MAX` for a 64-bit field.
fn field_max(width: u8) -> u64 {
    if width >= ID_BITS {
        u64::MAX
    } else {
        (1_u64 << width) - 1
    }
}

// A zero-width field may sit at shift 64, which plain `<<` rejects.
fn shl(value: u64, shift: u8) -> u64 {
    value.checked_shl(u32::from(shift)).unwrap_or(0)
}

fn shr(value: u64, shift: u8) -> u64 {
    value.checked_shr(u32::from(shift)).unwrap_or(0)
}
