use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Permissions: u32 {
        const NONE = 0;
        const EXECUTE = 1 << 0;
        const WRITE = 1 << 1;
        const READ = 1 << 2;
    }
}

bitflags! {
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FileType: u32 {
        const FILE = libc::S_IFREG;
        const DIRECTORY = libc::S_IFDIR;
        const SYM_LINK = libc::S_IFLNK;
        const CHAR_DEVICE = libc::S_IFCHR;
        const BLOCK_DEVICE = libc::S_IFBLK;
        const PIPE = libc::S_IFIFO;
        const SOCKET = libc::S_IFSOCK;
        const UNKNOWN = 0;
    }
}

impl From<libc::mode_t> for FileType {
    fn from(value: libc::mode_t) -> Self {
        FileType::from_bits_truncate(value & libc::S_IFMT)
    }
}

impl From<libc::c_uchar> for FileType {
    fn from(value: libc::c_uchar) -> Self {
        match value {
            libc::DT_BLK => FileType::BLOCK_DEVICE,
            libc::DT_CHR => FileType::CHAR_DEVICE,
            libc::DT_DIR => FileType::DIRECTORY,
            libc::DT_FIFO => FileType::PIPE,
            libc::DT_LNK => FileType::SYM_LINK,
            libc::DT_REG => FileType::FILE,
            libc::DT_SOCK => FileType::SOCKET,
            _ => FileType::UNKNOWN,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (FileType::FILE, "file"),
            (FileType::DIRECTORY, "dir"),
            (FileType::SYM_LINK, "link"),
            (FileType::CHAR_DEVICE, "char"),
            (FileType::BLOCK_DEVICE, "block"),
            (FileType::PIPE, "fifo"),
            (FileType::SOCKET, "socket"),
        ];

        let name = names
            .iter()
            .find(|(file_type, _)| file_type == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown");

        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileMode {
    pub user_permissions: Permissions,
    pub group_permissions: Permissions,
    pub other_permissions: Permissions,
}

/// Mode used for directories created on behalf of [`crate::Filesystem::write_with_auto_create`].
pub const DEFAULT_DIRECTORY_MODE: FileMode = FileMode::from_bits(0o770);

/// Mode requested for newly created files, before the process umask applies.
pub const DEFAULT_FILE_MODE: FileMode = FileMode::from_bits(0o666);

impl FileMode {

    pub fn new(
        user_permissions: Permissions,
        group_permissions: Permissions,
        other_permissions: Permissions,
    ) -> Self {
        Self {
            user_permissions,
            group_permissions,
            other_permissions,
        }
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self {
            user_permissions: Permissions::from_bits_truncate((bits >> 6) & 0b111),
            group_permissions: Permissions::from_bits_truncate((bits >> 3) & 0b111),
            other_permissions: Permissions::from_bits_truncate(bits & 0b111),
        }
    }

    pub const fn bits(self) -> u32 {
        (self.user_permissions.bits() << 6)
            | (self.group_permissions.bits() << 3)
            | self.other_permissions.bits()
    }

    pub fn private() -> Self {
        Self {
            user_permissions: Permissions::READ | Permissions::WRITE,
            group_permissions: Permissions::NONE,
            other_permissions: Permissions::NONE,
        }
    }

    pub fn shared_read_only() -> Self {
        Self {
            user_permissions: Permissions::READ | Permissions::WRITE,
            group_permissions: Permissions::READ,
            other_permissions: Permissions::READ,
        }
    }

    pub fn group_read_write() -> Self {
        Self {
            user_permissions: Permissions::READ | Permissions::WRITE,
            group_permissions: Permissions::READ | Permissions::WRITE,
            other_permissions: Permissions::NONE,
        }
    }

    pub fn permissive() -> Self {
        Self {
            user_permissions: Permissions::all(),
            group_permissions: Permissions::all(),
            other_permissions: Permissions::all(),
        }
    }
}

impl From<FileMode> for libc::mode_t {
    fn from(value: FileMode) -> Self {
        value.bits() as libc::mode_t
    }
}

impl From<libc::mode_t> for FileMode {
    fn from(value: libc::mode_t) -> Self {
        Self::from_bits(value as u32)
    }
}

impl Default for FileMode {
    fn default() -> Self {
        DEFAULT_FILE_MODE
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    DoNotCreate,
    Create(FileMode),
    // Fails with "File exists" when the path is already there.
    CreateNew(FileMode),
}

impl CreateMode {
    fn as_flag(&self) -> i32 {
        match self {
            CreateMode::DoNotCreate => 0,
            CreateMode::Create(_) => libc::O_CREAT,
            CreateMode::CreateNew(_) => libc::O_CREAT | libc::O_EXCL,
        }
    }

    pub fn file_mode(&self) -> Option<FileMode> {
        match self {
            CreateMode::DoNotCreate => None,
            CreateMode::Create(mode) | CreateMode::CreateNew(mode) => Some(*mode),
        }
    }
}

impl Default for CreateMode {
    fn default() -> Self {
        Self::DoNotCreate
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(i32)]
pub enum WriteMode {
    Default = 0,
    Append = libc::O_APPEND,
    Truncate = libc::O_TRUNC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSettings {
    flags: i32,
    mode: CreateMode,
}

impl fmt::Display for OpenSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OpenSettings {{ flags: {:#x}, mode: {:?} }}", self.flags, self.mode)
    }
}

impl OpenSettings {

    pub fn read_only() -> Self {
        Self {
            flags: libc::O_RDONLY,
            mode: CreateMode::DoNotCreate
        }
    }

    pub fn write_only(
        write_mode: WriteMode,
        mode: CreateMode
    ) -> Self {
        Self {
            flags: libc::O_WRONLY | write_mode as i32 | mode.as_flag(),
            mode
        }
    }

    pub fn read_write(
        write_mode: WriteMode,
        mode: CreateMode
    ) -> Self {
        Self {
            flags: libc::O_RDWR | write_mode as i32 | mode.as_flag(),
            mode
        }
    }

    pub fn flags(&self) -> i32 { self.flags | libc::O_CLOEXEC }

    pub fn is_read_only(&self) -> bool {
        self.flags & libc::O_ACCMODE == libc::O_RDONLY
    }

    pub fn is_write_only(&self) -> bool {
        self.flags & libc::O_ACCMODE == libc::O_WRONLY
    }

    pub fn mode(&self) -> &CreateMode {
        &self.mode
    }
}

bitflags! {
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct WriteFlags: u32 {
        // Append instead of truncating.
        const APPEND = 1 << 0;
        // Hold an exclusive advisory lock for the duration of the write.
        const LOCK = 1 << 1;
    }
}

bitflags! {
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct LineFlags: u32 {
        const IGNORE_NEW_LINES = 1 << 0;
        const SKIP_EMPTY_LINES = 1 << 1;
    }
}

bitflags! {
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct GlobFlags: i32 {
        // Stop on read errors instead of skipping unreadable directories.
        const ERR = libc::GLOB_ERR;
        // Append a slash to matched directories.
        const MARK = libc::GLOB_MARK;
        const NO_SORT = libc::GLOB_NOSORT;
        // Return the pattern itself when nothing matches.
        const NO_CHECK = libc::GLOB_NOCHECK;
        const NO_ESCAPE = libc::GLOB_NOESCAPE;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
    Unsorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl From<Whence> for libc::c_int {
    fn from(value: Whence) -> Self {
        match value {
            Whence::Start => libc::SEEK_SET,
            Whence::Current => libc::SEEK_CUR,
            Whence::End => libc::SEEK_END,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOperation {
    Shared,
    Exclusive,
    Unlock,
}

impl LockOperation {
    pub(crate) fn as_flag(self, non_blocking: bool) -> libc::c_int {
        let operation = match self {
            LockOperation::Shared => libc::LOCK_SH,
            LockOperation::Exclusive => libc::LOCK_EX,
            LockOperation::Unlock => libc::LOCK_UN,
        };

        if non_blocking { operation | libc::LOCK_NB } else { operation }
    }
}

/// Per-call options for operations that may create files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamContext {
    pub create_mode: FileMode,
}

impl StreamContext {
    pub fn new(create_mode: FileMode) -> Self {
        Self { create_mode }
    }
}

impl Default for StreamContext {
    fn default() -> Self {
        Self { create_mode: DEFAULT_FILE_MODE }
    }
}
