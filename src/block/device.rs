//! 块设备核心类型

use crate::consts::BLOCK_SIZE;
use crate::error::{Error, ErrorKind, Result};

/// 块设备接口
///
/// 实现此 trait 以提供底层块设备访问。
///
/// # 示例
///
/// ```rust,ignore
/// use vsfs_journal::{BlockDevice, Result};
///
/// struct MyDevice {
///     // ...
/// }
///
/// impl BlockDevice for MyDevice {
///     fn block_size(&self) -> u32 {
///         4096
///     }
///
///     fn sector_size(&self) -> u32 {
///         512
///     }
///
///     fn total_blocks(&self) -> u64 {
///         64
///     }
///
///     fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
///         // 实现扇区读取
///         Ok(count as usize * self.sector_size() as usize)
///     }
///
///     fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
///         // 实现扇区写入
///         Ok(count as usize * self.sector_size() as usize)
///     }
/// }
/// ```
pub trait BlockDevice {
    /// 逻辑块大小（VSFS 固定为 4096）
    fn block_size(&self) -> u32;

    /// 物理扇区大小（通常 512）
    fn sector_size(&self) -> u32;

    /// 总块数
    fn total_blocks(&self) -> u64;

    /// 读取扇区
    ///
    /// # 参数
    ///
    /// * `lba` - 起始地址（以扇区为单位）
    /// * `count` - 要读取的扇区数
    /// * `buf` - 目标缓冲区（大小至少为 count * sector_size）
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数。返回值小于请求长度即为短读。
    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize>;

    /// 写入扇区
    ///
    /// # 参数
    ///
    /// * `lba` - 起始地址（以扇区为单位）
    /// * `count` - 要写入的扇区数
    /// * `buf` - 源缓冲区（大小至少为 count * sector_size）
    ///
    /// # 返回
    ///
    /// 成功返回实际写入的字节数。返回值小于请求长度即为短写。
    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize>;

    /// 把已写入的数据持久化（如 fsync）
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// 关闭设备
    ///
    /// 在停止使用设备后调用。默认实现什么都不做。
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 块设备包装器
///
/// 按块号寻址，独占底层设备句柄（镜像文件），作用域覆盖一次完整的命令调用。
/// 不带缓存：每次读写都直接落到设备上，journal 的原子性依赖于此。
///
/// 读写计数用于观察一次操作到底碰了多少块（测试里用来断言"什么都没写"）。
pub struct BlockDev<D> {
    /// 底层设备
    device: D,
    /// 整块读取次数
    read_count: u64,
    /// 整块写入次数
    write_count: u64,
    /// flush 次数
    flush_count: u64,
}

impl<D: BlockDevice> BlockDev<D> {
    /// 创建新的块设备包装器
    ///
    /// 设备块大小必须等于 [`BLOCK_SIZE`]，并且是扇区大小的整数倍。
    pub fn new(device: D) -> Result<Self> {
        let block_size = device.block_size();
        let sector_size = device.sector_size();

        if block_size as usize != BLOCK_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size must be 4096",
            ));
        }

        // 验证块大小是扇区大小的整数倍
        if sector_size == 0 || block_size % sector_size != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size must be a multiple of sector size",
            ));
        }

        Ok(Self {
            device,
            read_count: 0,
            write_count: 0,
            flush_count: 0,
        })
    }

    /// 获取底层设备的引用
    pub fn device(&self) -> &D {
        &self.device
    }

    /// 获取底层设备的可变引用
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// 获取总块数
    pub fn total_blocks(&self) -> u64 {
        self.device.total_blocks()
    }

    /// 获取整块读取次数
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取整块写入次数
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// 获取 flush 次数
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    // 内部辅助方法

    /// 将块号转换为扇区地址
    pub(super) fn block_to_sector(&self, block_no: u64) -> u64 {
        let block_size = self.device.block_size() as u64;
        let sector_size = self.device.sector_size() as u64;
        block_no * block_size / sector_size
    }

    /// 每个逻辑块包含的扇区数
    pub(super) fn sectors_per_block(&self) -> u32 {
        self.device.block_size() / self.device.sector_size()
    }

    /// 检查块号是否在设备范围内
    pub(super) fn check_range(&self, block_no: u64) -> Result<()> {
        if block_no >= self.device.total_blocks() {
            return Err(Error::new(ErrorKind::Io, "Block number beyond end of device"));
        }
        Ok(())
    }

    /// 增加读计数
    pub(super) fn inc_read_count(&mut self) {
        self.read_count += 1;
    }

    /// 增加写计数
    pub(super) fn inc_write_count(&mut self) {
        self.write_count += 1;
    }

    /// 增加 flush 计数
    pub(super) fn inc_flush_count(&mut self) {
        self.flush_count += 1;
    }

    /// 关闭底层设备
    ///
    /// 先 flush，然后调用底层设备的 `close()` 方法。
    pub fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.device.close()
    }
}
