//! 位图操作
//!
//! VSFS 的 inode 位图和数据块位图都是单个块，第 i 位（字节 i/8 的第 i%8 位，LSB 优先）
//! 为 1 表示第 i 个对象已分配。

mod ops;

pub use ops::{count_ones, find_first_zero, set_bit, test_bit};
