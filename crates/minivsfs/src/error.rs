//! Error taxonomy shared by the planner, formatter and file adder.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Size or inode count out of range, or the layout cannot fit.
    Config(String),
    /// Not a MiniVSFS image: bad magic, version or block size.
    Format(String),
    /// Image is structurally inconsistent with its own superblock.
    Corrupt(String),
    FileTooLarge { need_blocks: u64, max_blocks: u64 },
    DirectoryFull,
    NoFreeInode,
    NoSpace { need: u64, free: u64 },
    InvalidName,
    NotFound,
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    /// `exit_code` maps an error onto the process exit status reported by the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. } | Self::DirectoryFull)
    }

    #[must_use]
    pub const fn is_exhaustion(&self) -> bool {
        matches!(self, Self::NoFreeInode | Self::NoSpace { .. })
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Corrupt(msg) => write!(f, "corrupt image: {msg}"),
            Self::FileTooLarge {
                need_blocks,
                max_blocks,
            } => write!(
                f,
                "file too big for MiniVSFS (needs {need_blocks} blocks, max {max_blocks})"
            ),
            Self::DirectoryFull => write!(f, "root directory full"),
            Self::NoFreeInode => write!(f, "no free inode"),
            Self::NoSpace { need, free } => {
                write!(f, "not enough free data blocks (need {need}, free {free})")
            }
            Self::InvalidName => write!(f, "path has no usable file name"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for FsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_exit_as_usage_errors() {
        assert_eq!(FsError::Config("bad".into()).exit_code(), 2);
        assert_eq!(FsError::DirectoryFull.exit_code(), 1);
        assert_eq!(FsError::NoFreeInode.exit_code(), 1);
    }

    #[test]
    fn classifies_capacity_and_exhaustion() {
        let too_big = FsError::FileTooLarge {
            need_blocks: 13,
            max_blocks: 12,
        };
        assert!(too_big.is_capacity());
        assert!(!too_big.is_exhaustion());
        assert!(FsError::NoSpace { need: 2, free: 1 }.is_exhaustion());
        assert!(
            too_big
                .to_string()
                .contains("needs 13 blocks, max 12")
        );
    }
}
