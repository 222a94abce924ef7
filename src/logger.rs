//! Structured audit logging for udpwall.
//!
//! Provides a [`Logger`] that writes events to stdout and to the audit file.
//! Output is either the line-oriented audit format
//! (`[YYYY-MM-DD HH:MM:SS] <tag> A.B.C.D`) or newline-delimited JSON
//! (NDJSON) for ingestion into log shippers and SIEM platforms.
//!
//! All public functions are intentionally cheap — they take a shared
//! reference to the logger and do a single allocation per event for the
//! formatted string.

use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

// ── Event types ──────────────────────────────────────────────────────────────

/// All distinct event kinds that udpwall can emit.
///
/// Each variant carries exactly the fields needed to describe that event.
/// The `#[serde(tag = "event")]` attribute ensures JSON output includes an
/// `"event"` key so consumers can filter by type without inspecting
/// structure.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    /// Informational startup / status message.
    Info { message: &'a str },

    /// A local interface address was placed under protection.
    Protecting { addr: Ipv4Addr },

    /// First packet accepted from a previously unknown address.
    FirstPacket { addr: Ipv4Addr },

    /// A tracked address came back after its statistics went stale.
    Reappearance { addr: Ipv4Addr },

    /// An address was banned for exceeding the distinct-port limit.
    Multiport { addr: Ipv4Addr },

    /// An address was banned for exceeding the packet-rate limit.
    Flood { addr: Ipv4Addr },

    /// An address was banned on first sighting via the data-center list.
    Blacklist { addr: Ipv4Addr },

    /// An address was whitelisted on first sighting via the exceptions set.
    Whitelist { addr: Ipv4Addr },

    /// A ban expired and the blocking rule was removed.
    Unban { addr: Ipv4Addr },

    /// The local query service answered a liveness probe for this address.
    Query { addr: Ipv4Addr },

    /// Session summary emitted on graceful shutdown.
    SessionSummary {
        duration_secs: u64,
        packets: u64,
        bans: u64,
        unbans: u64,
    },
}

// ── Logger ───────────────────────────────────────────────────────────────────

/// Shared audit logger.
///
/// Constructed once in `main` and passed as an `Arc<Logger>` to every
/// component that emits events. The internal `Mutex` serialises file writes
/// so lines are never interleaved.
pub struct Logger {
    /// Whether to format events as NDJSON instead of the plain audit format.
    json: bool,
    /// Buffered audit-file writer. `None` when the file could not be opened;
    /// the logger then degrades to stdout only.
    file: Option<Mutex<BufWriter<File>>>,
}

/// Type alias used throughout the codebase for convenience.
pub type SharedLogger = Arc<Logger>;

impl Logger {
    /// Creates a new logger.
    ///
    /// The audit file is opened truncating: each run starts a fresh log.
    /// If the file cannot be created the logger keeps running on stdout
    /// alone rather than aborting startup.
    pub fn new(json: bool, log_path: Option<&str>) -> Self {
        let file = log_path.and_then(|path| match File::create(path) {
            Ok(f) => Some(Mutex::new(BufWriter::new(f))),
            Err(e) => {
                println!("Cannot open {} ({}); logging to stdout only.", path, e);
                None
            }
        });

        Logger { json, file }
    }

    /// Logs a single [`Event`], writing to stdout and to the audit file.
    pub fn log(&self, event: &Event) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let line = if self.json {
            // Serialise the event to a JSON Value so the timestamp can be
            // injected alongside the event fields.
            let mut val = serde_json::to_value(event).unwrap_or_default();
            if let Some(obj) = val.as_object_mut() {
                obj.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp.clone()),
                );
            }
            serde_json::to_string(&val).unwrap_or_default()
        } else {
            format!("[{}] {}", timestamp, self.plain_text(event))
        };

        println!("{}", line);

        if let Some(mutex) = &self.file {
            if let Ok(mut writer) = mutex.lock() {
                let _ = writeln!(writer, "{}", line);
                let _ = writer.flush();
            }
        }
    }

    /// Formats an [`Event`] as a plain-text audit line body (no timestamp).
    fn plain_text(&self, event: &Event) -> String {
        match event {
            Event::Info { message } => format!("[INFO] {}", message),
            Event::Protecting { addr } => format!("Protecting {}", addr),
            Event::FirstPacket { addr } => format!("First packet: {}", addr),
            Event::Reappearance { addr } => format!("Reappearance: {}", addr),
            Event::Multiport { addr } => format!("Multiport: {}", addr),
            Event::Flood { addr } => format!("Flood: {}", addr),
            Event::Blacklist { addr } => format!("Blacklist: {}", addr),
            Event::Whitelist { addr } => format!("Whitelist: {}", addr),
            Event::Unban { addr } => format!("Unban: {}", addr),
            Event::Query { addr } => format!("Query: {}", addr),
            Event::SessionSummary {
                duration_secs,
                packets,
                bans,
                unbans,
            } => format!(
                "[SUMMARY] duration={}s packets={} bans={} unbans={}",
                duration_secs, packets, bans, unbans
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(event: &Event) -> String {
        Logger::new(false, None).plain_text(event)
    }

    #[test]
    fn audit_tags_match_the_log_contract() {
        let addr = Ipv4Addr::new(1, 2, 3, 4);
        assert_eq!(body(&Event::FirstPacket { addr }), "First packet: 1.2.3.4");
        assert_eq!(body(&Event::Reappearance { addr }), "Reappearance: 1.2.3.4");
        assert_eq!(body(&Event::Multiport { addr }), "Multiport: 1.2.3.4");
        assert_eq!(body(&Event::Flood { addr }), "Flood: 1.2.3.4");
        assert_eq!(body(&Event::Blacklist { addr }), "Blacklist: 1.2.3.4");
        assert_eq!(body(&Event::Whitelist { addr }), "Whitelist: 1.2.3.4");
        assert_eq!(body(&Event::Unban { addr }), "Unban: 1.2.3.4");
        assert_eq!(body(&Event::Query { addr }), "Query: 1.2.3.4");
        // No colon after this tag.
        assert_eq!(body(&Event::Protecting { addr }), "Protecting 1.2.3.4");
    }

    #[test]
    fn json_events_carry_the_event_tag() {
        let val = serde_json::to_value(Event::Flood {
            addr: Ipv4Addr::new(9, 9, 9, 9),
        })
        .unwrap();
        assert_eq!(val["event"], "flood");
        assert_eq!(val["addr"], "9.9.9.9");
    }
}
