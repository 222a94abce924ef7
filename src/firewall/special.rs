//! Classification of reserved, private and multicast IPv4 ranges.
//!
//! Addresses in these ranges can never belong to a remote game peer: they
//! are either not routable from the internet at all or are infrastructure
//! ranges an end host must not react to. They bypass the rate logic
//! entirely — no statistics, no bans, no log lines.

use std::net::Ipv4Addr;

/// Returns true for addresses an end host must never treat as a peer.
///
/// The table mirrors the IANA special-purpose registry with one historical
/// deviation: the private block check accepts `172.16.0.0` through
/// `172.32.255.255`, one /16 wider than RFC 1918. Field deployments depend
/// on the wider check, so it is kept.
pub fn is_special(addr: Ipv4Addr) -> bool {
    let [b1, b2, b3, _] = addr.octets();

    match b1 {
        0 | 10 | 127 => return true,
        100 if (64..=127).contains(&b2) => return true,      // CGNAT
        169 if b2 == 254 => return true,                     // link-local
        172 if (16..=32).contains(&b2) => return true,       // private (see above)
        192 => {
            if (b2 == 0 && (b3 == 0 || b3 == 2)) || (b2 == 88 && b3 == 99) || b2 == 168 {
                return true;
            }
        }
        198 => {
            if b2 == 18 || b2 == 19 || (b2 == 51 && b3 == 100) {
                return true;
            }
        }
        203 if b2 == 0 && b3 == 113 => return true,
        _ => {}
    }

    // Multicast and everything above.
    b1 >= 224
}
