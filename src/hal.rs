//! 系统时钟抽象
//!
//! inode 的 ctime/mtime 需要"当前时间"，`no_std` 环境下由使用者提供。

use core::time::Duration;

/// 系统抽象层
///
/// # 示例
///
/// ```ignore
/// struct MyHal;
/// impl SystemHal for MyHal {
///     fn now() -> Option<Duration> {
///         Some(Duration::from_secs(get_unix_timestamp()))
///     }
/// }
/// ```
pub trait SystemHal {
    /// 获取当前系统时间（从 UNIX 纪元开始）
    ///
    /// 返回 `None` 表示时间不可用，此时时间戳写为 0
    fn now() -> Option<Duration>;
}

/// 以秒为单位的 32 位时间戳（磁盘格式）
pub(crate) fn timestamp<H: SystemHal>() -> u32 {
    H::now().map_or(0, |d| d.as_secs().min(u32::MAX as u64) as u32)
}

/// 基于 `std::time::SystemTime` 的实现
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdHal;

#[cfg(feature = "std")]
impl SystemHal for StdHal {
    fn now() -> Option<Duration> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
    }
}

#[cfg(test)]
pub(crate) struct FixedHal;

#[cfg(test)]
impl SystemHal for FixedHal {
    fn now() -> Option<Duration> {
        Some(Duration::from_secs(1_700_000_000))
    }
}
