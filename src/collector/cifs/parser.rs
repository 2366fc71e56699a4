//! Parser for `/proc/fs/cifs/Stats`.
//!
//! The dump starts with a fixed header block that ends at the
//! `Total vfs operations` line, followed by one section per mounted share:
//!
//! ```text
//! Resources in use
//! CIFS Session: 1
//! Share (unique mount targets): 2
//! SMB Request/Response Buffer: 1 Pool size: 5
//! SMB Small Req/Resp Buffer: 1 Pool size: 30
//! Operations (MIDs): 0
//!
//! 0 session 0 share reconnects
//! Total vfs operations: 16 maximum at one time: 2
//!
//! 1) \\server\share
//! SMBs: 9 Oplocks breaks: 0
//! Reads:  0 Bytes: 0
//! ...
//! ```
//!
//! Share sections come in two layouts. SMB1 mounts report
//! `SMBs: N Oplocks breaks: M` followed by flat counters; SMB2+ mounts report
//! `SMBs: N` followed by `<Keyword>: N sent M failed` lines. Nothing but the
//! `SMBs:` line tells them apart, so the layout is re-derived at every one.

use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::error::CifsError;
use super::model::{
    ClientStats, Header, SMBS_KEY, SessionIds, ShareStats, Smb1Counters, Smb1Stats, Smb2Stats,
};

const SENT: &str = "sent";
const FAILED: &str = "failed";

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid CIFS stats pattern"))
        .collect()
}

/// Header lines, in match priority order. Capture names are the header keys.
static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"^CIFS Session:\s+(?P<sessions>\d+)",
        r"^Share \(unique mount targets\):\s+(?P<shares>\d+)",
        r"^SMB Request/Response Buffer:\s+(?P<smbBuffer>\d+)\s+Pool size:\s+(?P<smbPoolSize>\d+)",
        r"^SMB Small Req/Resp Buffer:\s+(?P<smbSmallBuffer>\d+)\s+Pool size:\s+(?P<smbSmallPoolSize>\d+)",
        r"^Operations \(MIDs\):\s+(?P<operations>\d+)",
        r"^(?P<sessionCount>\d+) session (?P<shareReconnects>\d+) share reconnects",
        r"^Total vfs operations:\s+(?P<totalOperations>\d+)\s+maximum at one time:\s+(?P<totalMaxOperations>\d+)",
    ])
});

/// Counter lines of an SMB1 share section. Capture names are the counter keys.
static SMB1_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"^Reads:\s+(?P<reads>\d+)\s+Bytes:\s+(?P<readsBytes>\d+)",
        r"^Writes:\s+(?P<writes>\d+)\s+Bytes:\s+(?P<writesBytes>\d+)",
        r"^Flushes:\s+(?P<flushes>\d+)",
        r"^Locks:\s+(?P<locks>\d+)\s+HardLinks:\s+(?P<hardlinks>\d+)\s+Symlinks:\s+(?P<symlinks>\d+)",
        r"^Opens:\s+(?P<opens>\d+)\s+Closes:\s+(?P<closes>\d+)\s+Deletes:\s+(?P<deletes>\d+)",
        r"^Posix Opens:\s+(?P<posixOpens>\d+)\s+Posix Mkdirs:\s+(?P<posixMkdirs>\d+)",
        r"^Mkdirs:\s+(?P<mkdirs>\d+)\s+Rmdirs:\s+(?P<rmdirs>\d+)",
        r"^Renames:\s+(?P<renames>\d+)\s+T2 Renames\s+(?P<t2Renames>\d+)",
        r"^FindFirst:\s+(?P<findFirst>\d+)\s+FNext\s+(?P<fNext>\d+)\s+FClose\s+(?P<fClose>\d+)",
    ])
});

/// `N) \\server\share`, optionally followed by a tab and `DISCONNECTED`.
static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<session_id>\d+)\) \\\\(?P<server>[^\\\s]+)(?P<share>\\[^\t]*)")
        .expect("invalid CIFS banner pattern")
});

static SMB1_SMBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SMBs:\s+(?P<smbs>\d+)\s+Oplocks breaks:\s+(?P<breaks>\d+)")
        .expect("invalid CIFS SMBs pattern")
});

static SMB2_SMBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SMBs:\s+(?P<smbs>\d+)$").expect("invalid CIFS SMBs pattern")
});

static SMB2_OPERATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<keyword>[^:]+):\s+(?P<sent>\d+) sent (?P<failed>\d+) failed")
        .expect("invalid CIFS operation pattern")
});

/// Returns the first pattern matching `line` together with its captures.
fn first_match<'r, 'l>(patterns: &'r [Regex], line: &'l str) -> Option<(&'r Regex, Captures<'l>)> {
    patterns
        .iter()
        .find_map(|re| re.captures(line).map(|caps| (re, caps)))
}

/// Inserts `raw` under `name` if it parses as `u64`; otherwise leaves the key unset.
fn insert_counter(into: &mut BTreeMap<String, u64>, name: &str, raw: &str) {
    match raw.parse::<u64>() {
        Ok(value) => {
            into.insert(name.to_string(), value);
        }
        Err(e) => debug!("skipping CIFS counter {}={:?}: {}", name, raw, e),
    }
}

/// Inserts every named capture of `re` as a counter.
fn insert_counters(re: &Regex, caps: &Captures<'_>, into: &mut BTreeMap<String, u64>) {
    for name in re.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            insert_counter(into, name, m.as_str());
        }
    }
}

fn parse_banner(line: &str) -> Option<SessionIds> {
    let caps = BANNER.captures(line)?;
    let session_id = match caps["session_id"].parse::<u64>() {
        Ok(id) => id,
        Err(e) => {
            debug!("unparsable CIFS session id in {:?}: {}", line, e);
            0
        }
    };

    Some(SessionIds {
        session_id,
        server: caps["server"].to_string(),
        share: caps["share"].trim_end().to_string(),
    })
}

/// Reads header lines up to and including the `Total vfs operations` line.
fn parse_header<I>(lines: &mut I) -> Result<Header, CifsError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut header = Header::new();

    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim();

        match first_match(&HEADER_PATTERNS, line) {
            Some((re, caps)) => insert_counters(re, &caps, &mut header),
            None if !line.is_empty() => trace!("skipping CIFS header line: {:?}", line),
            None => {}
        }

        if line.starts_with("Total vfs") {
            break;
        }
    }

    Ok(header)
}

/// Share section layout currently being parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// SMB1: flat counters after `SMBs: N Oplocks breaks: M`.
    #[default]
    Legacy,
    /// SMB2+: `sent`/`failed` pairs after `SMBs: N`.
    Modern,
}

/// Line-by-line parser for the share sections that follow the header.
///
/// The share under construction is always the last one in the list.
#[derive(Debug, Default)]
pub struct ShareParser {
    mode: Mode,
    shares: Vec<ShareStats>,
}

impl ShareParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Classifies and applies one line.
    ///
    /// Banners are checked first, then `SMBs:` lines, then the counter lines of
    /// the current mode. Lines matching none of these are ignored.
    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(session) = parse_banner(line) {
            trace!(
                "CIFS share section {} for \\\\{}{}",
                session.session_id, session.server, session.share
            );
            self.shares.push(empty_share(self.mode, session));
            return;
        }

        if let Some(caps) = SMB1_SMBS.captures(line) {
            self.switch_mode(Mode::Legacy);
            match self.reset_current() {
                Some(ShareStats::Smb1(share)) => {
                    insert_counters(&SMB1_SMBS, &caps, &mut share.stats)
                }
                _ => trace!("discarding CIFS counters outside a share: {:?}", line),
            }
            return;
        }

        if let Some(caps) = SMB2_SMBS.captures(line) {
            self.switch_mode(Mode::Modern);
            match self.reset_current() {
                Some(ShareStats::Smb2(share)) => {
                    let mut total = BTreeMap::new();
                    insert_counter(&mut total, SMBS_KEY, &caps["smbs"]);
                    if !total.is_empty() {
                        share.stats.insert(SMBS_KEY.to_string(), total);
                    }
                }
                _ => trace!("discarding CIFS counters outside a share: {:?}", line),
            }
            return;
        }

        match (self.mode, self.shares.last_mut()) {
            (_, None) => trace!("discarding CIFS counters outside a share: {:?}", line),
            (Mode::Legacy, Some(ShareStats::Smb1(share))) => {
                apply_smb1_line(&mut share.stats, line)
            }
            (Mode::Modern, Some(ShareStats::Smb2(share))) => apply_smb2_line(share, line),
            _ => trace!("skipping CIFS line for another share layout: {:?}", line),
        }
    }

    /// Returns the shares in banner order.
    pub fn finish(self) -> Vec<ShareStats> {
        self.shares
    }

    fn switch_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!("CIFS share layout switched from {:?} to {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Replaces the counters of the current share with an empty store of the
    /// current mode, keeping its session ids.
    fn reset_current(&mut self) -> Option<&mut ShareStats> {
        let mode = self.mode;
        let share = self.shares.last_mut()?;
        let session = match share {
            ShareStats::Smb1(s) => std::mem::take(&mut s.session),
            ShareStats::Smb2(s) => std::mem::take(&mut s.session),
        };
        *share = empty_share(mode, session);
        Some(share)
    }
}

fn empty_share(mode: Mode, session: SessionIds) -> ShareStats {
    match mode {
        Mode::Legacy => ShareStats::Smb1(Smb1Stats {
            session,
            stats: Smb1Counters::new(),
        }),
        Mode::Modern => ShareStats::Smb2(Smb2Stats {
            session,
            stats: BTreeMap::new(),
        }),
    }
}

fn apply_smb1_line(stats: &mut Smb1Counters, line: &str) {
    match first_match(&SMB1_PATTERNS, line) {
        Some((re, caps)) => insert_counters(re, &caps, stats),
        None => trace!("skipping unknown SMB1 line: {:?}", line),
    }
}

fn apply_smb2_line(share: &mut Smb2Stats, line: &str) {
    let Some(caps) = SMB2_OPERATION.captures(line) else {
        trace!("skipping unknown SMB2 line: {:?}", line);
        return;
    };

    let mut counters = BTreeMap::new();
    insert_counter(&mut counters, SENT, &caps[SENT]);
    insert_counter(&mut counters, FAILED, &caps[FAILED]);
    if !counters.is_empty() {
        share
            .stats
            .insert(caps["keyword"].trim().to_string(), counters);
    }
}

/// Parses a full `/proc/fs/cifs/Stats` snapshot.
///
/// The reader is consumed line by line; it is not closed here. Unknown lines
/// and unparsable counters are skipped. Fails if reading fails or if no header
/// counter was found.
pub fn parse_client_stats<R: BufRead>(reader: R) -> Result<ClientStats, CifsError> {
    let mut lines = reader.lines();
    let header = parse_header(&mut lines)?;

    let mut parser = ShareParser::new();
    for line in lines {
        parser.feed(&line?);
    }

    if header.is_empty() {
        return Err(CifsError::EmptyHeader);
    }

    let shares = parser.finish();
    debug!(
        "parsed CIFS stats: {} header fields, {} shares",
        header.len(),
        shares.len()
    );

    Ok(ClientStats { header, shares })
}

impl FromStr for ClientStats {
    type Err = CifsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_client_stats(s.as_bytes())
    }
}
