//! vsfs_journal: VSFS 文件系统镜像的预写日志（write-ahead journal）
//!
//! 这个库为一个极简的块文件系统（VSFS）提供崩溃一致的多块原子更新：
//! - **暂存（stage）**：把一组"块 N 的新内容"写成 data record，以 commit record 结尾，追加进 journal 区域
//! - **安装（install）**：重放所有已提交的事务到目标块，然后把 journal 清空
//!
//! journal header 中的 `bytes_used` 游标是唯一的持久化标记：
//! 只有在 commit record 写完之后才推进它，所以崩溃时半写的事务对重放不可见。
//!
//! # 示例
//!
//! ```rust,ignore
//! use vsfs_journal::{stage_create_file, BlockDev, FileDevice, Journal, JournalConfig, StdHal};
//!
//! let device = FileDevice::open("vsfs.img")?;
//! let mut bdev = BlockDev::new(device)?;
//! let config = JournalConfig::default();
//!
//! // 暂存一个创建文件的事务
//! stage_create_file::<_, StdHal>(&mut bdev, &config, "foo.txt")?;
//!
//! // 稍后（可能在另一次进程启动中）安装
//! let mut journal = Journal::load(&mut bdev, config)?;
//! let report = journal.install(&mut bdev)?;
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`block`] - 块设备抽象和 I/O 操作
//! - [`consts`] - 常量与磁盘布局
//! - [`journal`] - journal header、record 编解码、追加与重放
//! - [`transaction`] - 事务构建（create-file）
//! - [`types`] - superblock / inode / 目录项的磁盘格式
//! - [`superblock`]、[`inode`]、[`dir`] - 对应结构的读写
//! - [`fs`] - 格式化一个新镜像

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 块设备抽象
pub mod block;

/// 常量定义
pub mod consts;

/// 位图操作
pub mod bitmap;

/// 磁盘数据结构
pub mod types;

/// Superblock 读写
pub mod superblock;

/// Inode 表读写
pub mod inode;

/// 根目录块操作
pub mod dir;

/// 格式化
pub mod fs;

/// Journal 系统
pub mod journal;

/// 事务构建
pub mod transaction;

/// 系统时钟抽象
pub mod hal;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 块设备
pub use block::{BlockDev, BlockDevice};
#[cfg(feature = "std")]
pub use block::FileDevice;

// Journal
pub use journal::{
    InstallReport, Journal, JournalConfig, JournalError, JournalHeader, Record, RecordInfo,
};

// Transaction
pub use transaction::{stage_create_file, CreatedFile, Transaction};

// 元数据
pub use fs::{format, FormatOptions};
pub use types::{DirEntry, Inode, Superblock};

// 时钟
pub use hal::SystemHal;
#[cfg(feature = "std")]
pub use hal::StdHal;
