//! 基于镜像文件的块设备

use super::BlockDevice;
use crate::consts::{BLOCK_SIZE, DEFAULT_SECTOR_SIZE};
use crate::error::{Error, ErrorKind, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// 镜像文件设备
///
/// 以读写方式打开一个平坦的镜像文件，按扇区偏移定位后整段读写。
/// 文件长度不是块大小整数倍时，尾部不足一块的部分不可寻址。
#[derive(Debug)]
pub struct FileDevice {
    file: File,
    path: PathBuf,
    total_blocks: u64,
}

impl FileDevice {
    /// 打开已存在的镜像
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        log::debug!("opened image {} ({} bytes)", path.display(), len);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            total_blocks: len / BLOCK_SIZE as u64,
        })
    }

    /// 创建（或截断）一个全零镜像
    pub fn create(path: impl AsRef<Path>, total_blocks: u64) -> Result<Self> {
        let path = path.as_ref();
        if total_blocks == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Image must have at least one block"));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total_blocks * BLOCK_SIZE as u64)?;
        log::debug!("created image {} ({} blocks)", path.display(), total_blocks);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            total_blocks,
        })
    }

    /// 镜像路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek_sector(&mut self, lba: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(lba * DEFAULT_SECTOR_SIZE as u64))?;
        Ok(())
    }
}

impl BlockDevice for FileDevice {
    fn block_size(&self) -> u32 {
        BLOCK_SIZE as u32
    }

    fn sector_size(&self) -> u32 {
        DEFAULT_SECTOR_SIZE
    }

    fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let len = (count * DEFAULT_SECTOR_SIZE) as usize;
        self.seek_sector(lba)?;

        // 读到 EOF 为止，由调用者判断是否短读
        let mut done = 0;
        while done < len {
            match self.file.read(&mut buf[done..len]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(done)
    }

    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
        let len = (count * DEFAULT_SECTOR_SIZE) as usize;
        self.seek_sector(lba)?;
        self.file.write_all(&buf[..len])?;
        Ok(len)
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}
