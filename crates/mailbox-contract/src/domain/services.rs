//! # Domain Services
//!
//! Pure helpers shared by the action handlers: argument decoding, the bulk
//! charge computation and the marker-delimited log record format consumed by
//! off-chain indexers.

use crate::domain::value_objects::{Address, Bytes, ADDRESS_LENGTH, MAX_UINT_ARG_LENGTH};

// =============================================================================
// ARGUMENT DECODING
// =============================================================================

/// Decodes a big-endian unsigned integer of at most 8 bytes.
///
/// Empty input decodes to zero. Longer input is rejected.
#[must_use]
pub fn btoi(raw: &[u8]) -> Option<u64> {
    if raw.len() > MAX_UINT_ARG_LENGTH {
        return None;
    }
    Some(raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Encodes an integer as 8 big-endian bytes.
#[must_use]
pub fn itob(value: u64) -> Bytes {
    Bytes(value.to_be_bytes().to_vec())
}

/// Required payment for a bulk of `count` items. None on overflow.
#[must_use]
pub fn bulk_charge(fee: u64, count: u64) -> Option<u64> {
    fee.checked_mul(count)
}

// =============================================================================
// LOG RECORDS
// =============================================================================

/// Marker sequences separating log record fields.
pub mod markers {
    /// Follows the version tag of a share record.
    pub const SHARE: &[u8] = b"|share|";
    /// Follows the version tag of a bulk record.
    pub const BULK: &[u8] = b"|bulk|";
    /// Precedes the sender.
    pub const FROM: &[u8] = b"|from|";
    /// Precedes the recipient of a share record.
    pub const TO: &[u8] = b"|to|";
    /// Precedes the decimal count of a bulk record.
    pub const COUNT: &[u8] = b"|count|";
}

/// Decoded view of a log record.
///
/// Fields are not escaped: a payload containing a marker sequence makes
/// [`LogRecord::parse`] split in the wrong place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogRecord {
    /// A single share.
    Share {
        /// Version tag at emission time.
        version: Bytes,
        /// Content identifier.
        cid: Bytes,
        /// Sharing account.
        sender: Address,
        /// Recipient argument (empty if none was supplied).
        recipient: Bytes,
    },
    /// A committed batch.
    Bulk {
        /// Version tag at emission time.
        version: Bytes,
        /// Batch commitment.
        merkle_root: Bytes,
        /// Committing account.
        sender: Address,
        /// Number of items in the batch.
        count: u64,
    },
}

impl LogRecord {
    /// Serializes the record exactly as the engine emits it.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::new();
        match self {
            Self::Share {
                version,
                cid,
                sender,
                recipient,
            } => {
                out.extend_from_slice(version.as_slice());
                out.extend_from_slice(markers::SHARE);
                out.extend_from_slice(cid.as_slice());
                out.extend_from_slice(markers::FROM);
                out.extend_from_slice(sender.as_bytes());
                out.extend_from_slice(markers::TO);
                out.extend_from_slice(recipient.as_slice());
            }
            Self::Bulk {
                version,
                merkle_root,
                sender,
                count,
            } => {
                out.extend_from_slice(version.as_slice());
                out.extend_from_slice(markers::BULK);
                out.extend_from_slice(merkle_root.as_slice());
                out.extend_from_slice(markers::FROM);
                out.extend_from_slice(sender.as_bytes());
                out.extend_from_slice(markers::COUNT);
                out.extend_from_slice(count.to_string().as_bytes());
            }
        }
        Bytes(out)
    }

    /// Splits a raw record on its markers.
    ///
    /// The sender is read as a fixed 32-byte field, so only the version and
    /// the payload (`cid` / `merkle_root`) are sensitive to embedded markers.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let share_at = find(raw, markers::SHARE);
        let bulk_at = find(raw, markers::BULK);
        let is_share = match (share_at, bulk_at) {
            (Some(s), Some(b)) => s < b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        let (action_at, action_marker, tail_marker) = if is_share {
            (share_at?, markers::SHARE, markers::TO)
        } else {
            (bulk_at?, markers::BULK, markers::COUNT)
        };

        let version = Bytes::from_slice(&raw[..action_at]);
        let rest = &raw[action_at + action_marker.len()..];
        let from_at = find(rest, markers::FROM)?;
        let payload = Bytes::from_slice(&rest[..from_at]);
        let rest = &rest[from_at + markers::FROM.len()..];
        if rest.len() < ADDRESS_LENGTH {
            return None;
        }
        let sender = Address::from_slice(&rest[..ADDRESS_LENGTH])?;
        let trailer = rest[ADDRESS_LENGTH..].strip_prefix(tail_marker)?;

        if is_share {
            Some(Self::Share {
                version,
                cid: payload,
                sender,
                recipient: Bytes::from_slice(trailer),
            })
        } else {
            let count = std::str::from_utf8(trailer).ok()?.parse().ok()?;
            Some(Self::Bulk {
                version,
                merkle_root: payload,
                sender,
                count,
            })
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// =============================================================================
// TESTS
// =============================================================================
