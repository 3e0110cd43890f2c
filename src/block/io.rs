//! 块 I/O 操作实现

use super::{BlockDev, BlockDevice};
use crate::error::{Error, ErrorKind, Result};

impl<D: BlockDevice> BlockDev<D> {
    /// 读取单个逻辑块
    ///
    /// # 参数
    ///
    /// * `block_no` - 块号
    /// * `buf` - 目标缓冲区（大小至少为 block_size）
    ///
    /// # 错误
    ///
    /// 设备报告的字节数少于一个块时返回 `ErrorKind::Io`（短读）
    pub fn read_block(&mut self, block_no: u64, buf: &mut [u8]) -> Result<()> {
        let block_size = self.device().block_size() as usize;

        if buf.len() < block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "buffer too small for block",
            ));
        }
        self.check_range(block_no)?;

        self.inc_read_count();

        let sector = self.block_to_sector(block_no);
        let count = self.sectors_per_block();
        let n = self.device_mut().read_blocks(sector, count, &mut buf[..block_size])?;
        if n != block_size {
            log::error!("short read of block {}: {} of {} bytes", block_no, n, block_size);
            return Err(Error::new(ErrorKind::Io, "read_block failed: short read"));
        }
        Ok(())
    }

    /// 写入单个逻辑块
    ///
    /// # 参数
    ///
    /// * `block_no` - 块号
    /// * `buf` - 源数据缓冲区（大小至少为 block_size）
    ///
    /// # 错误
    ///
    /// 设备报告的字节数少于一个块时返回 `ErrorKind::Io`（短写）
    pub fn write_block(&mut self, block_no: u64, buf: &[u8]) -> Result<()> {
        let block_size = self.device().block_size() as usize;

        if buf.len() < block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "buffer too small for block",
            ));
        }
        self.check_range(block_no)?;

        self.inc_write_count();

        let sector = self.block_to_sector(block_no);
        let count = self.sectors_per_block();
        let n = self.device_mut().write_blocks(sector, count, &buf[..block_size])?;
        if n != block_size {
            log::error!("short write of block {}: {} of {} bytes", block_no, n, block_size);
            return Err(Error::new(ErrorKind::Io, "write_block failed: short write"));
        }
        Ok(())
    }

    /// 持久化已写入的块
    pub fn flush(&mut self) -> Result<()> {
        self.inc_flush_count();
        self.device_mut().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::mock::MockDevice;
    use crate::consts::BLOCK_SIZE;
    use alloc::vec;

    #[test]
    fn test_read_write_block() {
        let mut bdev = BlockDev::new(MockDevice::new(8)).unwrap();
        let data = vec![0x5Au8; BLOCK_SIZE];
        bdev.write_block(3, &data).unwrap();

        let mut buf = vec![0u8; BLOCK_SIZE];
        bdev.read_block(3, &mut buf).unwrap();
        assert_eq!(buf, data);
        assert_eq!(bdev.write_count(), 1);
        assert_eq!(bdev.read_count(), 1);

        // 相邻块不受影响
        bdev.read_block(4, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_out_of_range_is_io_error() {
        let mut bdev = BlockDev::new(MockDevice::new(8)).unwrap();
        let mut buf = vec![0u8; BLOCK_SIZE];
        let err = bdev.read_block(8, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_short_write_is_io_error() {
        let mut device = MockDevice::new(8);
        device.short_writes = true;
        let mut bdev = BlockDev::new(device).unwrap();
        let err = bdev.write_block(1, &vec![1u8; BLOCK_SIZE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_small_buffer_rejected() {
        let mut bdev = BlockDev::new(MockDevice::new(8)).unwrap();
        let mut buf = vec![0u8; 100];
        let err = bdev.read_block(0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
