//! cifstatd - CIFS client statistics poller.
//!
//! Reads /proc/fs/cifs/Stats at a fixed interval and writes each parsed
//! report to stdout, as JSON lines or as a human-readable summary.

use std::fmt::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use cifstat::collector::{CifsCollector, CollectError, RealFs};
use cifstat::{ClientStats, ShareStats};

/// Output format for collected reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per poll.
    Json,
    /// Human-readable summary.
    Text,
}

/// CIFS client statistics poller.
#[derive(Parser)]
#[command(name = "cifstatd", about = "CIFS client statistics poller", version)]
struct Args {
    /// Poll interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Number of polls before exiting. Polls until interrupted if omitted.
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so that stdout only carries reports.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in [format!("cifstatd={}", level), format!("cifstat={}", level)] {
        match directive.parse::<Directive>() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("invalid log directive {}: {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Serialize)]
struct Report<'a> {
    timestamp: String,
    stats: &'a ClientStats,
}

fn render_json(timestamp: &str, stats: &ClientStats) -> serde_json::Result<String> {
    serde_json::to_string(&Report {
        timestamp: timestamp.to_string(),
        stats,
    })
}

fn render_text(timestamp: &str, stats: &ClientStats) -> String {
    let general = stats.general();
    let show = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  sessions={} shares={} vfs_ops={} (max {}) reconnects={}/{}",
        timestamp,
        show(general.sessions),
        show(general.shares),
        show(general.total_operations),
        show(general.total_max_operations),
        show(general.session_reconnects),
        show(general.share_reconnects),
    );

    for share in &stats.shares {
        let session = share.session();
        let _ = writeln!(
            out,
            "  {}) \\\\{}{} [{}] smbs={}",
            session.session_id,
            session.server,
            session.share,
            if share.is_legacy() { "smb1" } else { "smb2" },
            show(share.smbs()),
        );
        match share {
            ShareStats::Smb1(s) => {
                let counters: Vec<String> = s
                    .stats
                    .iter()
                    .filter(|(k, _)| k.as_str() != "smbs")
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                let _ = writeln!(out, "     {}", counters.join(" "));
            }
            ShareStats::Smb2(s) => {
                for (keyword, counters) in s.stats.iter().filter(|(k, _)| k.as_str() != "smbs") {
                    let _ = writeln!(
                        out,
                        "     {}: {} sent, {} failed",
                        keyword,
                        show(counters.get("sent").copied()),
                        show(counters.get("failed").copied()),
                    );
                }
            }
        }
    }

    out
}

/// Sleeps for `interval`, waking early if `running` is cleared.
fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep((deadline - now).min(Duration::from_millis(200)));
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("cifstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, count={}, format={:?}",
        args.interval,
        args.proc_path,
        args.count.map_or_else(|| "unlimited".to_string(), |c| c.to_string()),
        args.format
    );

    let collector = CifsCollector::new(RealFs::new(), &args.proc_path);
    if !collector.is_available() {
        warn!(
            "{} not found, is the cifs module loaded?",
            collector.stats_path().display()
        );
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_secs(args.interval);
    let mut polls: u64 = 0;
    let mut successes: u64 = 0;

    while running.load(Ordering::SeqCst) {
        polls += 1;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        match collector.collect() {
            Ok(stats) => {
                successes += 1;
                debug!("Poll #{}: {} shares", polls, stats.shares.len());
                match args.format {
                    Format::Json => match render_json(&timestamp, &stats) {
                        Ok(line) => println!("{}", line),
                        Err(e) => error!("Failed to serialize report: {}", e),
                    },
                    Format::Text => print!("{}", render_text(&timestamp, &stats)),
                }
            }
            Err(CollectError::Unavailable(path)) => {
                warn!("Poll #{}: {} not available", polls, path.display());
            }
            Err(e) => {
                error!("Poll #{} failed: {}", polls, e);
            }
        }

        if args.count.is_some_and(|count| polls >= count) {
            break;
        }
        sleep_while_running(interval, &running);
    }

    info!("cifstatd stopped after {} polls ({} successful)", polls, successes);

    if successes > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cifstat::collector::MockFs;

    fn collect(fs: MockFs) -> ClientStats {
        CifsCollector::new(fs, "/proc").collect().unwrap()
    }

    #[test]
    fn test_render_json_line() {
        let stats = collect(MockFs::mixed_client());
        let line = render_json("2024-01-01T00:00:00Z", &stats).unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(value["stats"]["header"]["sessions"], 2);
        assert_eq!(value["stats"]["shares"][0]["format"], "smb1");
        assert_eq!(value["stats"]["shares"][1]["format"], "smb2");
        assert_eq!(value["stats"]["shares"][1]["stats"]["Reads"]["sent"], 66);
    }

    #[test]
    fn test_render_text() {
        let stats = collect(MockFs::mixed_client());
        let text = render_text("2024-01-01T00:00:00Z", &stats);

        assert!(text.starts_with("2024-01-01T00:00:00Z  sessions=2 shares=2 vfs_ops=315 (max 2)"));
        assert!(text.contains("  1) \\\\oldnas\\scans [smb1] smbs=88"));
        assert!(text.contains("reads=10 readsBytes=40960"));
        assert!(text.contains("  2) \\\\winsrv\\projects [smb2] smbs=214"));
        assert!(text.contains("     Creates: 40 sent, 0 failed"));
    }

    #[test]
    fn test_sleep_returns_when_stopped() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        sleep_while_running(Duration::from_secs(60), &running);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["cifstatd", "-i", "5", "-n", "3", "--format", "text"]);
        assert_eq!(args.interval, 5);
        assert_eq!(args.count, Some(3));
        assert_eq!(args.format, Format::Text);
        assert_eq!(args.proc_path, "/proc");
    }
}
