//! Loopback liveness query service.
//!
//! A cooperating application (the game client's signature verifier) asks
//! whether a remote address is currently an active peer by sending a
//! 4-byte datagram — the address in network byte order — to the loopback
//! query port. The reply is a single byte: `1` when the address is tracked
//! and fresh, `0` otherwise. Anything that is not exactly four bytes is
//! dropped without an answer.

use crate::actuator::FirewallActuator;
use crate::firewall::clock::Clock;
use crate::firewall::Firewall;
use crate::logger::{Event, SharedLogger};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

pub struct QueryResponder {
    socket: UdpSocket,
    logger: SharedLogger,
}

impl QueryResponder {
    /// Binds the loopback query socket in nonblocking mode so it can be
    /// polled from the capture loop.
    pub fn bind(port: u16, logger: SharedLogger) -> io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))?;
        socket.set_nonblocking(true)?;
        Ok(QueryResponder { socket, logger })
    }

    /// Drains and answers all pending probes.
    pub fn poll<C: Clock, A: FirewallActuator>(&self, fw: &Firewall<C, A>) {
        // Oversized datagrams get truncated into the buffer and then fail
        // the exact-length check in `decode`, which is the contract.
        let mut buf = [0u8; 8];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, peer)) => {
                    if let Some(addr) = decode(&buf[..len]) {
                        let reply = [u8::from(fw.is_active(addr))];
                        self.logger.log(&Event::Query { addr });
                        let _ = self.socket.send_to(&reply, peer);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
    }
}

/// Parses a probe: exactly four bytes, a network-order IPv4 address.
fn decode(datagram: &[u8]) -> Option<Ipv4Addr> {
    let bytes: [u8; 4] = datagram.try_into().ok()?;
    Some(Ipv4Addr::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_bytes_decode_in_network_order() {
        assert_eq!(decode(&[1, 2, 3, 4]), Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(decode(&[0, 0, 0, 0]), Some(Ipv4Addr::new(0, 0, 0, 0)));
    }

    #[test]
    fn other_lengths_are_discarded() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[1, 2, 3]), None);
        assert_eq!(decode(&[1, 2, 3, 4, 5]), None);
    }
}
