//! Read-only IPv4 CIDR membership sets.

use std::net::Ipv4Addr;

/// A fixed set of CIDR ranges supporting membership queries.
///
/// Built once at startup from a static table and never mutated. Lookups are
/// a linear scan over the (small, sorted) range list — the match is only
/// consulted on an address's first sighting, after which the result is
/// cached in the whitelist or the ban table, so there is no hot path here.
pub struct CidrMatcher {
    /// `(network, mask)` pairs, network already masked, sorted by network.
    ranges: Vec<(u32, u32)>,
}

impl CidrMatcher {
    /// Builds a matcher from `(prefix, prefix_len)` entries.
    ///
    /// A prefix length of 0 matches everything; lengths above 32 are
    /// clamped to a host route.
    pub fn new(entries: &[(Ipv4Addr, u8)]) -> Self {
        let mut ranges: Vec<(u32, u32)> = entries
            .iter()
            .map(|&(prefix, len)| {
                let mask = if len == 0 {
                    0
                } else {
                    u32::MAX << (32 - len.min(32) as u32)
                };
                (u32::from(prefix) & mask, mask)
            })
            .collect();
        ranges.sort_unstable();
        CidrMatcher { ranges }
    }

    /// True if any range in the set covers `addr`.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr = u32::from(addr);
        self.ranges
            .iter()
            .any(|&(network, mask)| addr & mask == network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn empty_set_matches_nothing() {
        let m = CidrMatcher::new(&[]);
        assert!(!m.contains(ip("1.2.3.4")));
        assert!(!m.contains(ip("0.0.0.0")));
    }

    #[test]
    fn slash_eight() {
        let m = CidrMatcher::new(&[(ip("89.0.0.0"), 8)]);
        assert!(m.contains(ip("89.0.0.1")));
        assert!(m.contains(ip("89.255.255.255")));
        assert!(!m.contains(ip("90.0.0.0")));
        assert!(!m.contains(ip("88.255.255.255")));
    }

    #[test]
    fn host_route() {
        let m = CidrMatcher::new(&[(ip("5.6.7.8"), 32)]);
        assert!(m.contains(ip("5.6.7.8")));
        assert!(!m.contains(ip("5.6.7.9")));
    }

    #[test]
    fn unaligned_prefix_is_masked() {
        // 10.1.2.3/16 should behave as 10.1.0.0/16.
        let m = CidrMatcher::new(&[(ip("10.1.2.3"), 16)]);
        assert!(m.contains(ip("10.1.0.0")));
        assert!(m.contains(ip("10.1.255.255")));
        assert!(!m.contains(ip("10.2.0.0")));
    }

    #[test]
    fn multiple_ranges() {
        let m = CidrMatcher::new(&[
            (ip("51.38.0.0"), 16),
            (ip("167.99.0.0"), 16),
            (ip("95.216.0.0"), 15),
        ]);
        assert!(m.contains(ip("51.38.9.9")));
        assert!(m.contains(ip("95.217.1.1")));
        assert!(m.contains(ip("167.99.0.255")));
        assert!(!m.contains(ip("167.100.0.1")));
    }
}
