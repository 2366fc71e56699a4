//! Data model for `/proc/fs/cifs/Stats`.
//!
//! Counter names are kept as string keys so that new kernel fields can be
//! carried without a model change. Maps are ordered for deterministic output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header counters keyed by field name (see [`keys`]).
pub type Header = BTreeMap<String, u64>;

/// Flat counter map of a legacy (SMB1) share.
pub type Smb1Counters = BTreeMap<String, u64>;

/// Per-operation counter map of a modern (SMB2) share.
pub type Smb2Counters = BTreeMap<String, BTreeMap<String, u64>>;

/// Key of the aggregate SMB count, in both share formats.
pub const SMBS_KEY: &str = "smbs";

/// Header field names.
pub mod keys {
    pub const SESSIONS: &str = "sessions";
    pub const SHARES: &str = "shares";
    pub const SMB_BUFFER: &str = "smbBuffer";
    pub const SMB_POOL_SIZE: &str = "smbPoolSize";
    pub const SMB_SMALL_BUFFER: &str = "smbSmallBuffer";
    pub const SMB_SMALL_POOL_SIZE: &str = "smbSmallPoolSize";
    pub const OPERATIONS: &str = "operations";
    pub const SESSION_COUNT: &str = "sessionCount";
    pub const SHARE_RECONNECTS: &str = "shareReconnects";
    pub const TOTAL_OPERATIONS: &str = "totalOperations";
    pub const TOTAL_MAX_OPERATIONS: &str = "totalMaxOperations";
}

/// Identity of a share section, taken from its banner line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIds {
    pub session_id: u64,
    pub server: String,
    /// Share path with its leading backslash, e.g. `\share`.
    pub share: String,
}

/// Counters of a share reported in the legacy (SMB1) layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smb1Stats {
    pub session: SessionIds,
    pub stats: Smb1Counters,
}

/// Counters of a share reported in the SMB2+ layout.
///
/// Each operation keyword maps to `{"sent": n, "failed": m}`. The aggregate
/// count is stored as `{"smbs": {"smbs": n}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smb2Stats {
    pub session: SessionIds,
    pub stats: Smb2Counters,
}

/// One share section of the stats dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ShareStats {
    Smb1(Smb1Stats),
    Smb2(Smb2Stats),
}

impl ShareStats {
    pub fn session(&self) -> &SessionIds {
        match self {
            ShareStats::Smb1(s) => &s.session,
            ShareStats::Smb2(s) => &s.session,
        }
    }

    /// Aggregate SMB count of the share, if it was reported.
    pub fn smbs(&self) -> Option<u64> {
        match self {
            ShareStats::Smb1(s) => s.stats.get(SMBS_KEY).copied(),
            ShareStats::Smb2(s) => s
                .stats
                .get(SMBS_KEY)
                .and_then(|m| m.get(SMBS_KEY))
                .copied(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ShareStats::Smb1(_))
    }
}

/// Parsed content of `/proc/fs/cifs/Stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStats {
    pub header: Header,
    /// Share sections in the order their banners appear.
    pub shares: Vec<ShareStats>,
}

impl ClientStats {
    /// Typed view over the header counters.
    pub fn general(&self) -> General {
        let get = |key: &str| self.header.get(key).copied();
        General {
            sessions: get(keys::SESSIONS),
            shares: get(keys::SHARES),
            smb_buffers: get(keys::SMB_BUFFER),
            smb_pool_size: get(keys::SMB_POOL_SIZE),
            smb_small_buffers: get(keys::SMB_SMALL_BUFFER),
            smb_small_pool_size: get(keys::SMB_SMALL_POOL_SIZE),
            operations: get(keys::OPERATIONS),
            session_reconnects: get(keys::SESSION_COUNT),
            share_reconnects: get(keys::SHARE_RECONNECTS),
            total_operations: get(keys::TOTAL_OPERATIONS),
            total_max_operations: get(keys::TOTAL_MAX_OPERATIONS),
        }
    }

    pub fn smb1(&self) -> impl Iterator<Item = &Smb1Stats> {
        self.shares.iter().filter_map(|s| match s {
            ShareStats::Smb1(stats) => Some(stats),
            ShareStats::Smb2(_) => None,
        })
    }

    pub fn smb2(&self) -> impl Iterator<Item = &Smb2Stats> {
        self.shares.iter().filter_map(|s| match s {
            ShareStats::Smb2(stats) => Some(stats),
            ShareStats::Smb1(_) => None,
        })
    }
}

/// Header counters with explicit "unset" semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct General {
    pub sessions: Option<u64>,
    pub shares: Option<u64>,
    pub smb_buffers: Option<u64>,
    pub smb_pool_size: Option<u64>,
    pub smb_small_buffers: Option<u64>,
    pub smb_small_pool_size: Option<u64>,
    pub operations: Option<u64>,
    pub session_reconnects: Option<u64>,
    pub share_reconnects: Option<u64>,
    pub total_operations: Option<u64>,
    pub total_max_operations: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionIds {
        SessionIds {
            session_id: 3,
            server: "fileserver".to_string(),
            share: "\\data".to_string(),
        }
    }

    #[test]
    fn test_share_smbs_both_formats() {
        let mut smb1 = Smb1Stats {
            session: session(),
            ..Default::default()
        };
        smb1.stats.insert(SMBS_KEY.to_string(), 9);

        let mut smb2 = Smb2Stats {
            session: session(),
            ..Default::default()
        };
        smb2.stats.insert(
            SMBS_KEY.to_string(),
            BTreeMap::from([(SMBS_KEY.to_string(), 20)]),
        );

        assert_eq!(ShareStats::Smb1(smb1).smbs(), Some(9));
        assert_eq!(ShareStats::Smb2(smb2).smbs(), Some(20));
        assert_eq!(ShareStats::Smb2(Smb2Stats::default()).smbs(), None);
    }

    #[test]
    fn test_general_unset_fields() {
        let mut stats = ClientStats::default();
        stats.header.insert(keys::SESSIONS.to_string(), 2);
        stats.header.insert(keys::TOTAL_MAX_OPERATIONS.to_string(), 7);

        let general = stats.general();
        assert_eq!(general.sessions, Some(2));
        assert_eq!(general.total_max_operations, Some(7));
        assert_eq!(general.shares, None);
        assert_eq!(general.operations, None);
    }

    #[test]
    fn test_format_filters() {
        let stats = ClientStats {
            header: Header::new(),
            shares: vec![
                ShareStats::Smb1(Smb1Stats::default()),
                ShareStats::Smb2(Smb2Stats::default()),
                ShareStats::Smb1(Smb1Stats::default()),
            ],
        };
        assert_eq!(stats.smb1().count(), 2);
        assert_eq!(stats.smb2().count(), 1);
        assert!(stats.shares[0].is_legacy());
        assert!(!stats.shares[1].is_legacy());
    }

    #[test]
    fn test_share_serializes_with_format_tag() {
        let share = ShareStats::Smb1(Smb1Stats {
            session: session(),
            stats: BTreeMap::from([("reads".to_string(), 4)]),
        });
        let json = serde_json::to_value(&share).unwrap();
        assert_eq!(json["format"], "smb1");
        assert_eq!(json["session"]["server"], "fileserver");
        assert_eq!(json["stats"]["reads"], 4);

        let back: ShareStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, share);
    }
}
