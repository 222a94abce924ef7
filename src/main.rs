mod actuator;
mod capture;
mod cli;
mod firewall;
mod logger;
mod query;

use actuator::IptablesFilter;
use clap::Parser;
use cli::Cli;
use firewall::clock::SystemClock;
use firewall::{ranges, Firewall};
use get_if_addrs::{get_if_addrs, IfAddr};
use logger::{Event, Logger, SharedLogger};
use query::QueryResponder;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    let session_start = Instant::now();

    let logger: SharedLogger = Arc::new(Logger::new(cli.json, Some(&cli.log_file)));

    // Shared shutdown flag for graceful termination.
    let shutdown = Arc::new(AtomicBool::new(false));
    register_shutdown_handler(Arc::clone(&shutdown));

    // ── Interface discovery ──────────────────────────────────────────────────
    // Every local IPv4 address goes on the whitelist so the host's own
    // outbound traffic reflected by promiscuous capture can never ban the
    // machine itself. The first non-loopback interface doubles as the
    // capture default.
    let ifaces = match get_if_addrs() {
        Ok(list) => list,
        Err(e) => {
            logger.log(&Event::Info {
                message: &format!("Cannot enumerate interfaces: {}", e),
            });
            std::process::exit(1);
        }
    };

    let mut capture_iface = cli.interface.clone();
    let mut local_addrs: Vec<Ipv4Addr> = Vec::new();
    for iface in &ifaces {
        if let IfAddr::V4(v4) = &iface.addr {
            if v4.ip.is_loopback() {
                continue;
            }
            if capture_iface.is_none() {
                capture_iface = Some(iface.name.clone());
            }
            local_addrs.push(v4.ip);
        }
    }

    if local_addrs.is_empty() {
        logger.log(&Event::Info {
            message: "No usable IPv4 interface found",
        });
        std::process::exit(1);
    }

    // ── Engine setup ─────────────────────────────────────────────────────────
    let mut fw = Firewall::new(SystemClock, IptablesFilter, Arc::clone(&logger));

    for addr in local_addrs {
        fw.add_whitelist(addr);
        logger.log(&Event::Protecting { addr });
    }

    let blacklist = if cfg!(feature = "block-data-centers") {
        logger.log(&Event::Info {
            message: "Data center blacklisting enabled.",
        });
        Some(ranges::data_centers())
    } else {
        logger.log(&Event::Info {
            message: "Data center blacklisting disabled.",
        });
        None
    };
    fw.set_blacklist(blacklist, Some(ranges::trusted_services()));

    // ── Query service ────────────────────────────────────────────────────────
    // Best effort: the firewall keeps running without it.
    let responder = match QueryResponder::bind(cli.query_port, Arc::clone(&logger)) {
        Ok(r) => Some(r),
        Err(e) => {
            logger.log(&Event::Info {
                message: &format!("Failed to start query service: {}", e),
            });
            None
        }
    };

    logger.log(&Event::Info {
        message: "Firewall started. Keep this window open.",
    });

    // ── Capture loop ─────────────────────────────────────────────────────────
    if let Err(e) = capture::run(
        capture_iface.as_deref(),
        &mut fw,
        responder.as_ref(),
        &shutdown,
    ) {
        logger.log(&Event::Info {
            message: &format!("Capture error: {}", e),
        });
    }

    let totals = fw.totals();
    logger.log(&Event::SessionSummary {
        duration_secs: session_start.elapsed().as_secs(),
        packets: totals.packets,
        bans: totals.bans,
        unbans: totals.unbans,
    });

    // `fw` drops here and releases every remaining block rule.
}

/// Registers a signal handler for graceful shutdown on Ctrl+C.
fn register_shutdown_handler(shutdown: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        println!("\nExiting...");
        shutdown.store(true, Ordering::SeqCst);
    });
    if result.is_err() {
        println!("Failed to set exit handler.");
    }
}
