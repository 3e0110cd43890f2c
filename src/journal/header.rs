//! Journal header 管理
//!
//! header 占据 journal 起始块的前 8 字节，块内其余字节保留不动。

use super::{JournalConfig, JournalHeader};
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
};
use alloc::vec;

/// 读取 header（不校验魔数）
pub fn read_header<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
) -> Result<JournalHeader> {
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(config.start_block as u64, &mut block)?;
    Ok(JournalHeader::decode(&block))
}

/// 写入 header
///
/// 读-改-写：只覆盖块的前 8 字节，保留 header 之后的 record 字节。
pub fn write_header<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
    header: &JournalHeader,
) -> Result<()> {
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(config.start_block as u64, &mut block)?;
    header.encode(&mut block);
    bdev.write_block(config.start_block as u64, &block)?;
    log::debug!(
        "journal header written: magic={:#x} bytes_used={}",
        header.magic,
        header.bytes_used
    );
    Ok(())
}

/// 魔数不匹配时写入一个空 header
///
/// 幂等：已初始化的 journal 原样返回，不产生写入。
pub fn initialize_if_absent<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
) -> Result<JournalHeader> {
    let header = read_header(bdev, config)?;
    if header.is_initialized() {
        return Ok(header);
    }

    log::info!("initializing journal at block {}", config.start_block);
    let header = JournalHeader::empty();
    write_header(bdev, config, &header)?;
    Ok(header)
}
