//! Superblock 写入

use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    types::Superblock,
};
use alloc::vec;

/// 将 superblock 写回块 0
///
/// 先读出整块，只覆盖前 128 字节，块内其余字节保持不变。
pub fn write_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>, sb: &Superblock) -> Result<()> {
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(SUPERBLOCK_BLOCK, &mut block)?;
    sb.encode(&mut block);
    bdev.write_block(SUPERBLOCK_BLOCK, &block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::mock::MockDevice;
    use crate::superblock::read_superblock;

    #[test]
    fn test_superblock_write_preserves_tail() {
        let mut device = MockDevice::new(4);
        device.storage[SUPERBLOCK_SIZE + 10] = 0x42;
        let mut bdev = BlockDev::new(device).unwrap();

        let sb = Superblock {
            magic: FS_MAGIC,
            block_size: BLOCK_SIZE as u32,
            total_blocks: 4,
            ..Default::default()
        };
        write_superblock(&mut bdev, &sb).unwrap();

        let loaded = read_superblock(&mut bdev).unwrap();
        assert_eq!(loaded, sb);
        assert!(loaded.is_valid());
        assert_eq!(bdev.device().storage[SUPERBLOCK_SIZE + 10], 0x42);
    }

    #[test]
    fn test_blank_device_is_not_a_filesystem() {
        let mut bdev = BlockDev::new(MockDevice::new(4)).unwrap();
        assert!(!read_superblock(&mut bdev).unwrap().is_valid());
    }
}
