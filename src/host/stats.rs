use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{FileMode, FileType};

/// The full status record of a path or handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub mode: FileMode,
    pub raw_mode: u32,
    pub descriptor_type: FileType,
    pub n_links: u64,
    pub user_id: u32,
    pub group_id: u32,
    pub inode: u64,
    pub size: u64,
    pub block_count: u64,
    pub block_size: u64,

    pub last_access_time: SystemTime,
    pub last_modification_time: SystemTime,
    pub last_status_change_time: SystemTime,

    pub device_id: u64,
    pub rdev: u64,
}

fn system_time(seconds: i64, nanoseconds: i64) -> SystemTime {
    let nanoseconds = nanoseconds.clamp(0, 999_999_999) as u32;

    if seconds >= 0 {
        UNIX_EPOCH + Duration::new(seconds as u64, nanoseconds)
    } else {
        let before_epoch = seconds.unsigned_abs();
        let offset = if nanoseconds == 0 {
            Duration::from_secs(before_epoch)
        } else {
            Duration::new(before_epoch - 1, 1_000_000_000 - nanoseconds)
        };
        UNIX_EPOCH - offset
    }
}

impl From<libc::stat> for Stats {
    fn from(stats: libc::stat) -> Self {
        let raw_mode = stats.st_mode as u32;

        Self {
            mode: FileMode::from_bits(raw_mode),
            raw_mode,
            descriptor_type: FileType::from(stats.st_mode),
            n_links: stats.st_nlink as u64,
            user_id: stats.st_uid,
            group_id: stats.st_gid,
            inode: stats.st_ino as u64,
            size: stats.st_size as u64,
            block_count: stats.st_blocks as u64,
            block_size: stats.st_blksize as u64,

            last_access_time: system_time(stats.st_atime as i64, stats.st_atime_nsec as i64),
            last_modification_time: system_time(stats.st_mtime as i64, stats.st_mtime_nsec as i64),
            last_status_change_time: system_time(stats.st_ctime as i64, stats.st_ctime_nsec as i64),

            device_id: stats.st_dev as u64,
            rdev: stats.st_rdev as u64,
        }
    }
}

impl Stats {
    pub fn is_dir(&self) -> bool { self.descriptor_type == FileType::DIRECTORY }
    pub fn is_file(&self) -> bool { self.descriptor_type == FileType::FILE }
}
