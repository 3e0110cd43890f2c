//! 错误类型定义
//!
//! 块层与元数据编解码使用的底层错误。journal 层面的结果（busy、full 等）
//! 见 [`crate::journal::JournalError`]，它把这里的 [`Error`] 包装为不可恢复的 I/O 类别。

use core::fmt;

/// 块层错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// I/O 错误（包括短读、短写）
    Io,
    /// 无效参数
    InvalidInput,
    /// 磁盘内容损坏
    Corrupted,
    /// 空间不足
    NoSpace,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// 创建带原因的错误
    ///
    /// 原因不随错误保存（保持 `no_std` 下零分配），只在 debug 级别记录一次。
    pub fn with_cause(kind: ErrorKind, message: &'static str, cause: impl fmt::Debug) -> Self {
        log::debug!("{:?}: {} (cause: {:?})", kind, message, cause);
        Self { kind, message }
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// 是否是致命的存储错误
    pub const fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Error::with_cause(ErrorKind::Io, "short read from backing image", err)
            }
            std::io::ErrorKind::WriteZero => {
                Error::with_cause(ErrorKind::Io, "short write to backing image", err)
            }
            _ => Error::with_cause(ErrorKind::Io, "backing image I/O failed", err),
        }
    }
}

// Journal error conversion
impl From<crate::journal::JournalError> for Error {
    fn from(err: crate::journal::JournalError) -> Self {
        use crate::journal::JournalError;
        match err {
            JournalError::Io(inner) => inner,
            JournalError::NotAFilesystem => Error::new(ErrorKind::Corrupted, "Invalid filesystem magic"),
            JournalError::Uninitialized => Error::new(ErrorKind::Corrupted, "Journal not initialized"),
            JournalError::Busy => Error::new(ErrorKind::NoSpace, "Journal has pending transactions"),
            JournalError::NoFreeInodes => Error::new(ErrorKind::NoSpace, "No free inodes"),
            JournalError::NoFreeDirectorySlots => {
                Error::new(ErrorKind::NoSpace, "No free directory slots")
            }
            JournalError::Full => Error::new(ErrorKind::NoSpace, "Journal full"),
            JournalError::UnknownRecordType { .. } => {
                Error::new(ErrorKind::Corrupted, "Unknown journal record type")
            }
            JournalError::TooManyRecords { .. } => {
                Error::new(ErrorKind::Corrupted, "Too many data records in one transaction")
            }
            JournalError::MalformedRecord { .. } => {
                Error::new(ErrorKind::Corrupted, "Malformed journal record")
            }
            JournalError::InvalidName => Error::new(ErrorKind::InvalidInput, "Invalid file name"),
        }
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalError;

    #[test]
    fn test_journal_error_conversion_keeps_io() {
        let io = Error::new(ErrorKind::Io, "short read");
        let err: Error = JournalError::Io(io.clone()).into();
        assert_eq!(err, io);
        assert!(err.is_io());
    }

    #[test]
    fn test_journal_error_conversion_kinds() {
        let err: Error = JournalError::Busy.into();
        assert_eq!(err.kind(), ErrorKind::NoSpace);
        let err: Error = JournalError::UnknownRecordType { offset: 8, kind: 9 }.into();
        assert_eq!(err.kind(), ErrorKind::Corrupted);
        assert!(!err.is_io());
    }
}
