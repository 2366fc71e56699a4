//! Collector for the CIFS/SMB client statistics in `/proc/fs/cifs/Stats`.
//!
//! The parser works on any buffered reader; `CifsCollector` opens the file
//! through a [`FileSystem`](crate::collector::traits::FileSystem).

mod collector;
pub mod error;
pub mod model;
pub mod parser;

pub use collector::{CifsCollector, CollectError, STATS_PATH};
pub use error::CifsError;
pub use model::{ClientStats, General, SessionIds, ShareStats, Smb1Stats, Smb2Stats};
pub use parser::{Mode, ShareParser, parse_client_stats};
