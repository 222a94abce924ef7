//! Compiled-in CIDR tables.
//!
//! Static snapshots, not live feeds: the tool carries no runtime
//! configuration, so updating either table means shipping a new build.

use crate::firewall::cidr::CidrMatcher;
use std::net::Ipv4Addr;

/// Hosting and cloud ranges that have no business originating game traffic.
/// Attack tooling overwhelmingly runs on rented machines in these blocks.
const DATA_CENTER_RANGES: [(Ipv4Addr, u8); 14] = [
    (Ipv4Addr::new(5, 39, 0, 0), 17),     // OVH
    (Ipv4Addr::new(5, 135, 0, 0), 16),    // OVH
    (Ipv4Addr::new(37, 187, 0, 0), 16),   // OVH
    (Ipv4Addr::new(51, 38, 0, 0), 16),    // OVH
    (Ipv4Addr::new(95, 216, 0, 0), 15),   // Hetzner
    (Ipv4Addr::new(116, 202, 0, 0), 15),  // Hetzner
    (Ipv4Addr::new(136, 243, 0, 0), 16),  // Hetzner
    (Ipv4Addr::new(104, 131, 0, 0), 16),  // DigitalOcean
    (Ipv4Addr::new(167, 99, 0, 0), 16),   // DigitalOcean
    (Ipv4Addr::new(45, 32, 0, 0), 16),    // Vultr
    (Ipv4Addr::new(108, 61, 0, 0), 16),   // Vultr
    (Ipv4Addr::new(45, 33, 0, 0), 17),    // Linode
    (Ipv4Addr::new(139, 162, 0, 0), 16),  // Linode
    (Ipv4Addr::new(173, 212, 192, 0), 18), // Contabo
];

/// Ranges hosting the game's coordination and relay infrastructure. These
/// legitimately open many flows toward players and would trip the
/// multi-port check, so they are whitelisted on first contact instead.
const TRUSTED_SERVICE_RANGES: [(Ipv4Addr, u8); 3] = [
    (Ipv4Addr::new(178, 33, 80, 0), 20),
    (Ipv4Addr::new(151, 80, 40, 0), 21),
    (Ipv4Addr::new(137, 74, 16, 0), 22),
];

/// Blacklist installed by the `block-data-centers` build flavor.
pub fn data_centers() -> CidrMatcher {
    CidrMatcher::new(&DATA_CENTER_RANGES)
}

/// Exceptions set, installed in every flavor.
pub fn trusted_services() -> CidrMatcher {
    CidrMatcher::new(&TRUSTED_SERVICE_RANGES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_disjoint() {
        // A trusted service hit must never also be a blacklist hit; the
        // engine checks exceptions first, but the tables should not overlap
        // to begin with.
        let black = data_centers();
        let trusted = trusted_services();
        for &(prefix, _) in &TRUSTED_SERVICE_RANGES {
            assert!(!black.contains(prefix));
        }
        for &(prefix, _) in &DATA_CENTER_RANGES {
            assert!(!trusted.contains(prefix));
        }
    }

    #[test]
    fn sample_members() {
        assert!(data_centers().contains(Ipv4Addr::new(51, 38, 200, 10)));
        assert!(trusted_services().contains(Ipv4Addr::new(178, 33, 81, 4)));
        assert!(!data_centers().contains(Ipv4Addr::new(89, 1, 1, 1)));
    }
}
