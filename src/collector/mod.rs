//! CIFS client statistics collector for Linux.
//!
//! This module provides infrastructure for reading `/proc/fs/cifs/Stats`,
//! with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CifsCollector                         │
//! │                  - /proc/fs/cifs/Stats                      │
//! │                            │                                │
//! │              ┌─────────────▼─────────────┐                  │
//! │              │   parse_client_stats      │                  │
//! │              │   header → ShareParser    │                  │
//! │              └─────────────┬─────────────┘                  │
//! │                            │ BufRead                        │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use cifstat::collector::{CifsCollector, RealFs};
//!
//! let collector = CifsCollector::new(RealFs::new(), "/proc");
//! let stats = collector.collect().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use cifstat::collector::{CifsCollector, MockFs};
//!
//! let collector = CifsCollector::new(MockFs::smb2_client(), "/proc");
//! let stats = collector.collect().unwrap();
//! assert_eq!(stats.shares.len(), 2);
//! ```

pub mod cifs;
pub mod mock;
pub mod traits;

pub use cifs::{CifsCollector, CifsError, ClientStats, CollectError, parse_client_stats};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
