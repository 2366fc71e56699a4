//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc/fs/cifs/Stats` contents
//! for the client states the collector has to handle.

use super::filesystem::MockFs;

const STATS: &str = "/proc/fs/cifs/Stats";

#[allow(dead_code)]
impl MockFs {
    /// Client with two shares mounted over SMB1 (`vers=1.0`).
    pub fn smb1_client() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            STATS,
            "\
Resources in use
CIFS Session: 1
Share (unique mount targets): 2
SMB Request/Response Buffer: 1 Pool size: 5
SMB Small Req/Resp Buffer: 1 Pool size: 30
Operations (MIDs): 0

0 session 0 share reconnects
Total vfs operations: 2410 maximum at one time: 3

1) \\\\nas01\\media
SMBs: 569 Oplocks breaks: 2
Reads:  120 Bytes: 7864320
Writes: 14 Bytes: 917504
Flushes: 3
Locks: 0 HardLinks: 0 Symlinks: 0
Opens: 44 Closes: 44 Deletes: 1
Posix Opens: 0 Posix Mkdirs: 0
Mkdirs: 2 Rmdirs: 0
Renames: 1 T2 Renames 0
FindFirst: 31 FNext 4 FClose 0
2) \\\\nas01\\public
SMBs: 1841 Oplocks breaks: 0
Reads:  902 Bytes: 59113472
Writes: 0 Bytes: 0
Flushes: 0
Locks: 6 HardLinks: 0 Symlinks: 0
Opens: 210 Closes: 209 Deletes: 0
Posix Opens: 0 Posix Mkdirs: 0
Mkdirs: 0 Rmdirs: 0
Renames: 0 T2 Renames 0
FindFirst: 97 FNext 12 FClose 0
",
        );
        fs
    }

    /// Client with two SMB2+ shares; the second one is disconnected.
    pub fn smb2_client() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            STATS,
            "\
Resources in use
CIFS Session: 1
Share (unique mount targets): 3
SMB Request/Response Buffer: 1 Pool size: 5
SMB Small Req/Resp Buffer: 1 Pool size: 30
Total Large 10 Small 1840 Allocations
Operations (MIDs): 0

0 session 1 share reconnects
Total vfs operations: 6340 maximum at one time: 4

1) \\\\files.example.com\\home
SMBs: 6129
Bytes read: 1048576  Bytes written: 524288
Negotiates: 0 sent 0 failed
SessionSetups: 0 sent 0 failed
Logoffs: 0 sent 0 failed
TreeConnects: 1 sent 0 failed
TreeDisconnects: 0 sent 0 failed
Creates: 1523 sent 12 failed
Closes: 1511 sent 0 failed
Flushes: 8 sent 0 failed
Reads: 402 sent 0 failed
Writes: 97 sent 0 failed
Locks: 0 sent 0 failed
IOCTLs: 3 sent 1 failed
Cancels: 0 sent 0 failed
Echos: 0 sent 0 failed
QueryDirectories: 210 sent 0 failed
ChangeNotifies: 0 sent 0 failed
QueryInfos: 2291 sent 4 failed
SetInfos: 23 sent 0 failed
OplockBreaks: 61 sent 0 failed
2) \\\\files.example.com\\archive\tDISCONNECTED
SMBs: 3
Negotiates: 0 sent 0 failed
SessionSetups: 0 sent 0 failed
TreeConnects: 1 sent 0 failed
Creates: 2 sent 0 failed
",
        );
        fs
    }

    /// Client with one SMB1 share and one SMB2+ share.
    pub fn mixed_client() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            STATS,
            "\
Resources in use
CIFS Session: 2
Share (unique mount targets): 2
SMB Request/Response Buffer: 2 Pool size: 6
SMB Small Req/Resp Buffer: 2 Pool size: 30
Operations (MIDs): 1

0 session 0 share reconnects
Total vfs operations: 315 maximum at one time: 2

1) \\\\oldnas\\scans
SMBs: 88 Oplocks breaks: 0
Reads:  10 Bytes: 40960
Writes: 5 Bytes: 20480
Opens: 7 Closes: 7 Deletes: 0
2) \\\\winsrv\\projects
SMBs: 214
Creates: 40 sent 0 failed
Closes: 40 sent 0 failed
Reads: 66 sent 0 failed
",
        );
        fs
    }

    /// Host without the cifs module loaded.
    pub fn no_cifs() -> Self {
        let mut fs = Self::new();
        fs.add_dir("/proc/fs/ext4");
        fs.add_file("/proc/filesystems", "nodev\tproc\n\text4\n");
        fs
    }
}
