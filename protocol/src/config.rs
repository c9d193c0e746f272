//! # Protocol Configuration & Constants
//!
//! Every magic number in Strata lives here. Key-space prefixes, salt sizes,
//! Merkle domain separators, total-order entry layout. If you're hardcoding
//! one of these somewhere else, move it here.
//!
//! Most of these values are baked into on-disk data and into transaction
//! IDs. Changing them after a ledger has data in it means the old data no
//! longer reads back (or no longer hashes to the same ID). Treat them as
//! frozen.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate version, assembled at compile time.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Transaction Identity
// ---------------------------------------------------------------------------

/// Minimum salt length, in bytes. A transaction with a shorter (or missing)
/// salt cannot be assigned an ID.
pub const MIN_SALT_LENGTH: usize = 32;

/// Field number of the salt inside the transaction message.
pub const SALT_FIELD_NUMBER: u32 = 1;

/// Field numbers of the five element groups that feed the transaction ID,
/// in the order their group roots are combined: inputs, references,
/// outputs, parameters, required signers.
pub const ID_FIELD_NUMBERS: [u32; 5] = [2, 3, 4, 5, 6];

// ---------------------------------------------------------------------------
// Merkle Domain Separation
// ---------------------------------------------------------------------------

/// Prepended to leaf data before hashing.
pub const MERKLE_LEAF_PREFIX: u8 = 0x00;

/// Prepended to the concatenation of two child hashes before hashing.
pub const MERKLE_NODE_PREFIX: u8 = 0x01;

// ---------------------------------------------------------------------------
// Total Order Log
// ---------------------------------------------------------------------------

/// Size of each half of a serialized total-order entry (txid, then HMAC).
pub const TOTAL_ORDER_PART_LENGTH: usize = 32;

/// Size of a serialized total-order entry. Fixed; anything else is a bug.
pub const TOTAL_ORDER_ENTRY_LENGTH: usize = TOTAL_ORDER_PART_LENGTH * 2;

/// Metadata key holding the last committed sequence number (8 bytes BE).
pub const TOTAL_ORDER_KEY_LAST_COMMITTED: [u8; 2] = [0x01, 0x01];

/// Metadata key holding the current accumulator hash.
pub const TOTAL_ORDER_KEY_ACCUMULATOR: [u8; 2] = [0x01, 0x02];

/// Prefix for sequence-number keys: `0x02 || BE64(seq)`.
pub const TOTAL_ORDER_SEQUENCE_PREFIX: u8 = 0x02;

/// Capacity of the in-process sequencer handoff channel. One slot is the
/// closest tokio gets to a rendezvous channel.
pub const SEQUENCER_QUEUE_CAPACITY: usize = 1;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Default on-disk location for ledger data, relative to the working
/// directory (or to the config file that names it).
pub const DEFAULT_DATA_DIR: &str = "data";

/// Name of the sled tree holding transactions, states, receipts and commit
/// markers.
pub const LEDGER_TREE: &str = "ledger";

/// Name of the sled tree holding the total-order log.
pub const TOTAL_ORDER_TREE: &str = "totalorder";
