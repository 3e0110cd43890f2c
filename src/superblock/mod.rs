//! Superblock 操作模块
//!
//! 这个模块提供 VSFS superblock 的读取和写入功能。
//! 结构定义见 [`crate::types::Superblock`]。

mod read;
mod write;

pub use read::*;
pub use write::*;
