//! Promiscuous capture loop and ingress filtering.
//!
//! One cooperative loop serves both sockets: each iteration drains the
//! loopback query socket, then blocks on the capture handle for at most
//! 200 ms so the shutdown flag and new probes are observed promptly.
//! Frames that survive the ingress filter are handed to the engine,
//! followed by an inline housekeeping call.

use crate::actuator::FirewallActuator;
use crate::firewall::clock::Clock;
use crate::firewall::Firewall;
use crate::query::QueryResponder;
use etherparse::{InternetSlice, SlicedPacket, TransportSlice};
use pcap::Capture;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Never react to traffic aimed at the local RDP service; a false positive
/// there can lock the operator out of the machine entirely.
const RDP_PORT: u16 = 3389;

/// Opens the capture device and runs the packet loop until shutdown.
///
/// When `iface` is `Some`, that device is opened; otherwise libpcap picks
/// its default. Returns `Err` if the device cannot be opened or capture
/// cannot start.
pub fn run<C: Clock, A: FirewallActuator>(
    iface: Option<&str>,
    fw: &mut Firewall<C, A>,
    query: Option<&QueryResponder>,
    shutdown: &Arc<AtomicBool>,
) -> Result<(), String> {
    let mut cap = if let Some(name) = iface {
        Capture::from_device(name)
            .map_err(|e| format!("Cannot open interface '{}': {}", name, e))?
            .promisc(true)
            .timeout(200) // wake every 200ms so shutdown flag and queries are handled
            .open()
            .map_err(|e| format!("Cannot start capture on '{}': {}", name, e))?
    } else {
        let dev = pcap::Device::lookup()
            .map_err(|e| format!("pcap device lookup failed: {}", e))?
            .ok_or_else(|| "No capture device found".to_string())?;
        Capture::from_device(dev)
            .map_err(|e| format!("Cannot open default device: {}", e))?
            .promisc(true)
            .timeout(200)
            .open()
            .map_err(|e| format!("Cannot start capture: {}", e))?
    };

    while !shutdown.load(Ordering::Relaxed) {
        if let Some(responder) = query {
            responder.poll(fw);
        }

        match cap.next_packet() {
            Ok(pkt) => {
                if let Some((addr, port)) = inspect(pkt.data) {
                    fw.receive_packet(addr, port);
                    fw.clear_old_entries();
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue, // woke up to check shutdown flag
            Err(_) => break,
        }
    }

    Ok(())
}

/// Applies the ingress contract to a raw frame.
///
/// Accepts only complete IPv4+UDP packets. Anything involving a port below
/// 1024 is left alone so low-port services (DNS and friends) keep working
/// in both directions, as is anything aimed at RDP. Returns the source
/// address and source port of an accepted packet; everything else is
/// dropped silently.
fn inspect(data: &[u8]) -> Option<(Ipv4Addr, u16)> {
    let sliced = SlicedPacket::from_ethernet(data).ok()?;

    let header = match sliced.ip {
        Some(InternetSlice::Ipv4(header, _)) => header,
        _ => return None,
    };
    let udp = match sliced.transport {
        Some(TransportSlice::Udp(udp)) => udp,
        _ => return None,
    };

    let sport = udp.source_port();
    let dport = udp.destination_port();
    if sport < 1024 || dport < 1024 || dport == RDP_PORT {
        return None;
    }

    Some((header.source_addr(), sport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::PacketBuilder;

    fn udp_frame(src: [u8; 4], sport: u16, dport: u16) -> Vec<u8> {
        let builder = PacketBuilder::ethernet2([1; 6], [2; 6])
            .ipv4(src, [10, 0, 0, 1], 64)
            .udp(sport, dport);
        let mut frame = Vec::with_capacity(builder.size(4));
        builder.write(&mut frame, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        frame
    }

    #[test]
    fn game_traffic_is_accepted() {
        let frame = udp_frame([1, 2, 3, 4], 9000, 41000);
        assert_eq!(
            inspect(&frame),
            Some((Ipv4Addr::new(1, 2, 3, 4), 9000))
        );
    }

    #[test]
    fn low_source_port_is_ignored() {
        let frame = udp_frame([1, 2, 3, 4], 53, 41000);
        assert_eq!(inspect(&frame), None);
    }

    #[test]
    fn low_destination_port_is_ignored() {
        let frame = udp_frame([1, 2, 3, 4], 9000, 123);
        assert_eq!(inspect(&frame), None);
    }

    #[test]
    fn rdp_destination_is_ignored() {
        let frame = udp_frame([1, 2, 3, 4], 9000, RDP_PORT);
        assert_eq!(inspect(&frame), None);
    }

    #[test]
    fn tcp_is_ignored() {
        let builder = PacketBuilder::ethernet2([1; 6], [2; 6])
            .ipv4([1, 2, 3, 4], [10, 0, 0, 1], 64)
            .tcp(9000, 41000, 0, 4096);
        let mut frame = Vec::with_capacity(builder.size(0));
        builder.write(&mut frame, &[]).unwrap();
        assert_eq!(inspect(&frame), None);
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert_eq!(inspect(&[]), None);
        assert_eq!(inspect(&[0u8; 10]), None);
        // A valid frame cut short.
        let frame = udp_frame([1, 2, 3, 4], 9000, 41000);
        assert_eq!(inspect(&frame[..20]), None);
    }
}
