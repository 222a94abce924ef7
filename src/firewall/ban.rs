//! Ban records: an expiry instant per blocked address.

/// A single active ban. The address itself is the key in the ban table.
pub struct BanEntry {
    pub expiry: u64,
}

impl BanEntry {
    pub fn new(now: u64, duration: u64) -> Self {
        BanEntry {
            expiry: now + duration,
        }
    }

    /// True once the ban has run its course. The comparison is inclusive:
    /// a packet arriving exactly at the expiry second lifts the ban.
    pub fn expired(&self, now: u64) -> bool {
        now >= self.expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive() {
        let ban = BanEntry::new(100, 60);
        assert!(!ban.expired(159));
        assert!(ban.expired(160));
        assert!(ban.expired(500));
    }
}
