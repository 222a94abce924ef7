/// Maximum number of distinct source ports tolerated from one address.
///
/// A legitimate game peer keeps a single UDP socket for the lifetime of a
/// session; a second or third port shows up when the peer reconnects behind
/// a NAT rebinding. Anything beyond that within [`HOST_TIMEOUT`] is a port
/// scanner probing for the game socket, and the fourth distinct port bans
/// the address on the spot.
pub const MAX_PORTS: usize = 3;

/// Seconds of inactivity after which an address's statistics are stale.
///
/// A peer silent for longer than this is treated as gone: its port history
/// no longer counts against it and its next packet starts a fresh window.
pub const HOST_TIMEOUT: u64 = 60;

/// Minimum number of seconds between housekeeping passes.
///
/// Housekeeping runs inline after data packets, so this gate keeps the
/// full-table sweep off the hot path. Note that once an address is blocked
/// by the OS filter its packets stop arriving, so this interval is also the
/// effective resolution of ban expiry.
pub const PURGE_INTERVAL: u64 = 30;

/// Capacity of the arrival-time ring buffer per address.
///
/// Together with [`FLOOD_FRAME`] this defines the flood contract: more than
/// this many packets inside one frame is a flood.
pub const MAX_PACKETS: usize = 80;

/// Width of the flood detection window in seconds.
pub const FLOOD_FRAME: u64 = 1;

/// Ban duration in seconds for a port-diversity violation.
pub const BAN_MULTIPORT: u64 = 60;

/// Ban duration in seconds for a packet-rate violation.
pub const BAN_FLOOD: u64 = 60;

/// Ban duration in seconds for an address inside the data-center blacklist.
///
/// An hour rather than a minute: a data-center origin is not going to turn
/// into a residential peer any time soon.
pub const BAN_BLACKLIST: u64 = 3600;

/// Initial capacity for the tracking and ban tables.
///
/// Under a randomized-source attack both tables can legitimately reach tens
/// of thousands of entries before the purge reclaims them; pre-sizing keeps
/// rehashing off the packet path.
pub const TABLE_CAPACITY: usize = 0xFFFF;
