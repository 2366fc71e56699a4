//! cifstat - Linux CIFS/SMB client statistics library.
//!
//! Parses `/proc/fs/cifs/Stats` into a typed report. Shared between the
//! library consumers and the `cifstatd` polling daemon.

pub mod collector;

pub use collector::cifs::{
    CifsError, ClientStats, General, SessionIds, ShareStats, Smb1Stats, Smb2Stats,
    parse_client_stats,
};
