//! The address-classification and ban-lifecycle engine.
//!
//! One engine instance owns the tracking table, the ban table and the
//! whitelist, and is driven from a single loop: `receive_packet` for every
//! accepted observation, `clear_old_entries` for inline housekeeping, and
//! `is_active` for the local query service. All side effects — actuator
//! directives and audit lines — are emitted synchronously before an
//! operation returns, so they are totally ordered with respect to
//! subsequent calls.

pub mod ban;
pub mod cidr;
pub mod clock;
pub mod config;
pub mod ranges;
pub mod special;
pub mod stats;

use crate::actuator::FirewallActuator;
use crate::firewall::ban::BanEntry;
use crate::firewall::cidr::CidrMatcher;
use crate::firewall::clock::Clock;
use crate::firewall::config::{
    BAN_BLACKLIST, BAN_FLOOD, BAN_MULTIPORT, MAX_PORTS, PURGE_INTERVAL, TABLE_CAPACITY,
};
use crate::firewall::stats::PeerStats;
use crate::logger::{Event, SharedLogger};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

// ── Classification outcome ───────────────────────────────────────────────────

/// Outcome of classifying one packet.
///
/// `Ban` and `Unban` mark the edge transitions emitted by this very call;
/// `Banned` and `Unbanned` report steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanStatus {
    Unbanned,
    Banned,
    Ban,
    Unban,
}

/// Monotonic session counters surfaced in the shutdown summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Totals {
    pub packets: u64,
    pub bans: u64,
    pub unbans: u64,
}

/// What a tracked address's statistics say about the packet just recorded.
enum Verdict {
    Clean,
    Reappeared,
    Multiport,
    Flood,
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// The flood/scan mitigation engine.
///
/// Generic over the clock and the actuator so tests can drive time by hand
/// and record directives instead of touching the OS packet filter.
pub struct Firewall<C: Clock, A: FirewallActuator> {
    /// Per-address statistics for addresses currently considered peers.
    /// Disjoint from `bans` at all times: banning an address discards its
    /// statistics, and a banned address is dropped before tracking.
    table: HashMap<Ipv4Addr, PeerStats>,
    bans: HashMap<Ipv4Addr, BanEntry>,
    /// Addresses never banned: local interface addresses plus first-contact
    /// hits in the exceptions set.
    whitelist: HashSet<Ipv4Addr>,
    blacklist: Option<CidrMatcher>,
    exceptions: Option<CidrMatcher>,
    last_purge: u64,
    totals: Totals,
    clock: C,
    actuator: A,
    logger: SharedLogger,
}

impl<C: Clock, A: FirewallActuator> Firewall<C, A> {
    pub fn new(clock: C, actuator: A, logger: SharedLogger) -> Self {
        let last_purge = clock.now();
        Firewall {
            table: HashMap::with_capacity(TABLE_CAPACITY),
            bans: HashMap::with_capacity(TABLE_CAPACITY),
            whitelist: HashSet::with_capacity(TABLE_CAPACITY),
            blacklist: None,
            exceptions: None,
            last_purge,
            totals: Totals::default(),
            clock,
            actuator,
            logger,
        }
    }

    /// Adds an address to the permanent whitelist. Additive and idempotent.
    pub fn add_whitelist(&mut self, addr: Ipv4Addr) {
        self.whitelist.insert(addr);
    }

    /// Installs the CIDR tables consulted on an address's first sighting.
    /// Either may be absent.
    pub fn set_blacklist(&mut self, blacklist: Option<CidrMatcher>, exceptions: Option<CidrMatcher>) {
        self.blacklist = blacklist;
        self.exceptions = exceptions;
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Classifies one observed packet and applies the resulting transition.
    ///
    /// The clock is read once here; every comparison below uses this
    /// snapshot. Precedence: exemption, existing ban, first sighting,
    /// returning address — first match wins.
    pub fn receive_packet(&mut self, addr: Ipv4Addr, port: u16) -> BanStatus {
        let now = self.clock.now();
        self.totals.packets += 1;

        if special::is_special(addr) || self.whitelist.contains(&addr) {
            return BanStatus::Unbanned;
        }

        if let Some(ban) = self.bans.get(&addr) {
            if !ban.expired(now) {
                return BanStatus::Banned;
            }
            self.bans.remove(&addr);
            self.actuator.unban(addr);
            self.totals.unbans += 1;
            self.logger.log(&Event::Unban { addr });
            return BanStatus::Unban;
        }

        if !self.table.contains_key(&addr) {
            if self.matches(&self.exceptions, addr) {
                self.whitelist.insert(addr);
                self.logger.log(&Event::Whitelist { addr });
                return BanStatus::Unbanned;
            }
            if self.matches(&self.blacklist, addr) {
                return self.install_ban(addr, BAN_BLACKLIST, Event::Blacklist { addr }, now);
            }
            self.table.insert(addr, PeerStats::new(port, now));
            self.logger.log(&Event::FirstPacket { addr });
            return BanStatus::Unbanned;
        }

        let verdict = match self.table.get_mut(&addr) {
            Some(stats) => Self::judge(stats, port, now),
            None => return BanStatus::Unbanned,
        };

        match verdict {
            Verdict::Clean => BanStatus::Unbanned,
            Verdict::Reappeared => {
                self.logger.log(&Event::Reappearance { addr });
                BanStatus::Unbanned
            }
            Verdict::Multiport => {
                self.table.remove(&addr);
                self.install_ban(addr, BAN_MULTIPORT, Event::Multiport { addr }, now)
            }
            Verdict::Flood => {
                self.table.remove(&addr);
                self.install_ban(addr, BAN_FLOOD, Event::Flood { addr }, now)
            }
        }
    }

    /// True iff `addr` is tracked and not timed out. No mutation; used by
    /// the local query responder.
    pub fn is_active(&self, addr: Ipv4Addr) -> bool {
        let now = self.clock.now();
        self.table
            .get(&addr)
            .map(|stats| !stats.timed_out(now))
            .unwrap_or(false)
    }

    /// Inline housekeeping, rate-limited to one pass per purge interval.
    ///
    /// Stale statistics are dropped silently. For bans, the rule removal is
    /// re-asserted through the actuator on every pass regardless of expiry
    /// (the actuator contract makes redundant removals harmless); expired
    /// records are additionally dropped and logged.
    pub fn clear_old_entries(&mut self) {
        let now = self.clock.now();
        if now.saturating_sub(self.last_purge) <= PURGE_INTERVAL {
            return;
        }

        self.table.retain(|_, stats| !stats.timed_out(now));

        let banned: Vec<Ipv4Addr> = self.bans.keys().copied().collect();
        for addr in banned {
            self.actuator.unban(addr);
            let expired = self.bans.get(&addr).map(|b| b.expired(now)).unwrap_or(false);
            if expired {
                self.bans.remove(&addr);
                self.totals.unbans += 1;
                self.logger.log(&Event::Unban { addr });
            }
        }

        self.last_purge = now;
    }

    fn matches(&self, matcher: &Option<CidrMatcher>, addr: Ipv4Addr) -> bool {
        matcher.as_ref().map(|m| m.contains(addr)).unwrap_or(false)
    }

    fn install_ban(&mut self, addr: Ipv4Addr, duration: u64, event: Event, now: u64) -> BanStatus {
        self.bans.insert(addr, BanEntry::new(now, duration));
        self.actuator.ban(addr);
        self.totals.bans += 1;
        self.logger.log(&event);
        BanStatus::Ban
    }

    /// Updates a tracked address's statistics with the packet and decides
    /// what the engine should do about it.
    ///
    /// The port is recorded before the diversity check so the fourth
    /// distinct port trips the limit on the call that introduces it; the
    /// over-limit map is discarded with the entry when the caller bans, so
    /// it never outlives this invocation.
    fn judge(stats: &mut PeerStats, port: u16, now: u64) -> Verdict {
        if stats.timed_out(now) {
            stats.reset(port, now);
            return Verdict::Reappeared;
        }
        stats.remove_old_ports(now);
        if stats.record_port(port, now) > MAX_PORTS {
            return Verdict::Multiport;
        }
        stats.count_packet(now);
        if stats.hit_limit() {
            return Verdict::Flood;
        }
        Verdict::Clean
    }
}

impl<C: Clock, A: FirewallActuator> Drop for Firewall<C, A> {
    /// Best-effort firewall cleanup: leave no blocking rule behind.
    fn drop(&mut self) {
        for addr in self.bans.keys() {
            self.actuator.unban(*addr);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
