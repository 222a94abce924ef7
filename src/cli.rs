use clap::Parser;

/// udpwall — host firewall against UDP floods and multi-port scans aimed
/// at peer-to-peer game traffic.
///
/// Observes inbound IPv4/UDP packets on one interface, classifies source
/// addresses by arrival pattern, and installs transient OS-level blocks
/// for abusive peers.
#[derive(Parser, Debug, Clone)]
#[command(
    name    = "udpwall",
    version = "0.3.0",
    about   = "UDP flood and port-scan mitigator for peer-to-peer game hosts",
    long_about = None,
)]
pub struct Cli {
    // ── Interface ────────────────────────────────────────────────────────────

    /// Network interface to capture on.
    ///
    /// If omitted, udpwall selects the first non-loopback IPv4 interface
    /// automatically. Use `ip link` or `ifconfig` to list available
    /// interfaces.
    #[arg(short = 'i', long = "interface", value_name = "IFACE")]
    pub interface: Option<String>,

    // ── Logging ──────────────────────────────────────────────────────────────

    /// Audit log path, written in addition to stdout.
    ///
    /// The file is truncated at startup so each run produces a fresh log.
    /// JSON mode (--json) affects the format written to this file as well.
    #[arg(short = 'o', long = "log-file", value_name = "PATH", default_value = "firewall.log")]
    pub log_file: String,

    /// Emit log entries as newline-delimited JSON (NDJSON).
    ///
    /// Each event is a self-contained JSON object on its own line, suitable
    /// for ingestion by log shippers (Logstash, Fluentd, Vector) or SIEM
    /// platforms (Splunk, Elastic, Loki).
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    // ── Query service ────────────────────────────────────────────────────────

    /// Loopback UDP port for the peer liveness query service.
    ///
    /// A cooperating application sends a 4-byte network-order IPv4 address
    /// and receives a single byte: 1 if that address is an active peer,
    /// 0 otherwise.
    #[arg(long = "query-port", value_name = "PORT", default_value_t = 1337)]
    pub query_port: u16,
}
