//! OS packet-filter actuation.
//!
//! The engine never talks to the firewall directly; it is handed a small
//! capability with two operations at construction time. The production
//! implementation shells out to iptables. Rule installation failures stay
//! the actuator's concern and never unwind engine state, so both
//! operations are infallible from the caller's point of view.

use std::net::Ipv4Addr;
use std::process::Command;

/// The two directives the engine can issue against the OS packet filter.
///
/// Calls must be idempotent: the engine re-asserts `unban` for addresses
/// that may already be unblocked during housekeeping and at shutdown.
pub trait FirewallActuator {
    fn ban(&mut self, addr: Ipv4Addr);
    fn unban(&mut self, addr: Ipv4Addr);
}

/// Per-address DROP rules in the INPUT chain via the system iptables binary.
pub struct IptablesFilter;

impl IptablesFilter {
    fn run(&self, flag: &str, addr: Ipv4Addr) {
        let _ = Command::new("iptables")
            .args([flag, "INPUT", "-s", &addr.to_string(), "-p", "udp", "-j", "DROP"])
            .output();
    }
}

impl FirewallActuator for IptablesFilter {
    fn ban(&mut self, addr: Ipv4Addr) {
        self.run("-I", addr);
    }

    fn unban(&mut self, addr: Ipv4Addr) {
        self.run("-D", addr);
    }
}

#[cfg(test)]
pub mod testing {
    use super::FirewallActuator;
    use std::cell::RefCell;
    use std::net::Ipv4Addr;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Directive {
        Ban,
        Unban,
    }

    /// Records every directive instead of touching the OS. Clones share the
    /// call log, so a test keeps one handle while the engine owns another.
    #[derive(Clone, Default)]
    pub struct RecordingActuator {
        pub calls: Rc<RefCell<Vec<(Directive, Ipv4Addr)>>>,
    }

    impl RecordingActuator {
        pub fn bans(&self) -> Vec<Ipv4Addr> {
            self.of_kind(Directive::Ban)
        }

        pub fn unbans(&self) -> Vec<Ipv4Addr> {
            self.of_kind(Directive::Unban)
        }

        fn of_kind(&self, kind: Directive) -> Vec<Ipv4Addr> {
            self.calls
                .borrow()
                .iter()
                .filter(|(d, _)| *d == kind)
                .map(|(_, a)| *a)
                .collect()
        }
    }

    impl FirewallActuator for RecordingActuator {
        fn ban(&mut self, addr: Ipv4Addr) {
            self.calls.borrow_mut().push((Directive::Ban, addr));
        }

        fn unban(&mut self, addr: Ipv4Addr) {
            self.calls.borrow_mut().push((Directive::Unban, addr));
        }
    }
}
