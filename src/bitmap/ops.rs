//! Bitmap 操作实现

use crate::error::{Error, ErrorKind, Result};

/// 测试位图中某一位是否被设置
///
/// 超出位图范围的位视为未设置。
pub fn test_bit(bitmap: &[u8], index: u32) -> bool {
    bitmap
        .get((index / 8) as usize)
        .map_or(false, |byte| byte & (1 << (index % 8)) != 0)
}

/// 设置位图中的某一位
///
/// # 返回
///
/// 返回该位原来的值；索引超出范围返回错误
pub fn set_bit(bitmap: &mut [u8], index: u32) -> Result<bool> {
    let byte = bitmap.get_mut((index / 8) as usize).ok_or(Error::new(
        ErrorKind::InvalidInput,
        "Bitmap index out of range",
    ))?;
    let mask = 1u8 << (index % 8);
    let was_set = *byte & mask != 0;
    *byte |= mask;
    Ok(was_set)
}

/// 在 `[0, limit)` 中查找第一个空闲位（first-fit，按位序）
///
/// 整字节为 0xFF 时直接跳过。
///
/// # 返回
///
/// 第一个为 0 的位的索引，没有则返回 None
pub fn find_first_zero(bitmap: &[u8], limit: u32) -> Option<u32> {
    let limit = limit.min((bitmap.len() * 8) as u32);

    for (byte_index, &byte) in bitmap.iter().enumerate() {
        let base = byte_index as u32 * 8;
        if base >= limit {
            break;
        }
        if byte == 0xFF {
            continue;
        }
        let index = base + (!byte).trailing_zeros();
        return (index < limit).then_some(index);
    }

    None
}

/// 统计 `[0, limit)` 中被设置的位数
pub fn count_ones(bitmap: &[u8], limit: u32) -> u32 {
    (0..limit.min((bitmap.len() * 8) as u32))
        .filter(|&i| test_bit(bitmap, i))
        .count() as u32
}
