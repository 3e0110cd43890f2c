//! 块设备抽象
//!
//! 提供块设备接口和块级 I/O 操作。
//! block/device.rs 定义 `BlockDevice` trait 以及按块号寻址的 `BlockDev` 包装器
//! block/io.rs 提供整块读写，短读、短写都视为致命 I/O 错误
//! block/file.rs 是基于镜像文件的设备实现（需要 `std`）

mod device;
mod io;
#[cfg(feature = "std")]
mod file;

#[cfg(test)]
pub(crate) mod mock;

pub use device::{BlockDevice, BlockDev};
#[cfg(feature = "std")]
pub use file::FileDevice;
