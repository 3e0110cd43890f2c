//! 创建文件的事务
//!
//! 在根目录下新建一个空的普通文件，一次事务改三块：
//! inode 位图、新 inode 所在的 inode 表块、根目录块。
//!
//! 所有前置检查都在第一次修改性写入之前完成（journal 的惰性初始化除外）。

use super::Transaction;
use crate::{
    bitmap::{find_first_zero, set_bit},
    block::{BlockDev, BlockDevice},
    consts::*,
    dir::{find_free_slot, set_entry},
    error::{Error, ErrorKind},
    hal::{timestamp, SystemHal},
    inode::{inode_in_block, set_inode_in_block, InodeLocation},
    journal::{Journal, JournalConfig, JournalError},
    superblock::read_superblock,
    types::{DirEntry, Inode},
};
use alloc::vec;

/// 暂存成功后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedFile {
    /// 新分配的 inode 编号
    pub inode: u32,
    /// 根目录中的槽位
    pub slot: usize,
}

/// 暂存"在根目录下创建 `name`"的事务
///
/// 检查顺序：文件系统魔数、journal 空闲、空闲 inode、空闲目录槽、名字、journal 剩余空间。
/// 任何一项不满足都直接返回，不写入事务内容。名字超过 27 字节时截断。
pub fn stage_create_file<D: BlockDevice, H: SystemHal>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
    name: &str,
) -> Result<CreatedFile, JournalError> {
    let sb = read_superblock(bdev)?;
    if !sb.is_valid() {
        return Err(JournalError::NotAFilesystem);
    }
    if sb.journal_block != config.start_block {
        log::warn!(
            "superblock says journal at block {}, using configured block {}",
            sb.journal_block,
            config.start_block
        );
    }

    let mut journal = Journal::open(bdev, *config)?;
    journal.ensure_idle()?;

    let mut bitmap = vec![0u8; BLOCK_SIZE];
    bdev.read_block(sb.inode_bitmap as u64, &mut bitmap)?;
    let ino = find_first_zero(&bitmap, sb.inode_count).ok_or(JournalError::NoFreeInodes)?;

    let mut dir = vec![0u8; BLOCK_SIZE];
    bdev.read_block(sb.data_start as u64, &mut dir)?;
    let slot = find_free_slot(&dir).ok_or(JournalError::NoFreeDirectorySlots)?;

    if name.is_empty() {
        return Err(JournalError::InvalidName);
    }

    let now = timestamp::<H>();
    set_bit(&mut bitmap, ino)?;

    let loc = InodeLocation::of(ino);
    let table_block = loc.block_no(&sb)?;
    let mut table = vec![0u8; BLOCK_SIZE];
    bdev.read_block(table_block as u64, &mut table)?;
    set_inode_in_block(&mut table, loc.slot, &Inode::new_file(now));

    // 根 inode 只有和新 inode 在同一块时才随事务一起更新
    if loc.table_block == InodeLocation::of(ROOT_INODE).table_block {
        let root_slot = InodeLocation::of(ROOT_INODE).slot;
        let mut root = inode_in_block(&table, root_slot);
        root.size = root
            .size
            .checked_add(DIRENT_SIZE as u32)
            .ok_or(Error::new(ErrorKind::Corrupted, "root directory size overflow"))?;
        root.mtime = now;
        set_inode_in_block(&mut table, root_slot, &root);
    }

    if name.len() >= NAME_LEN {
        log::warn!("name '{}' truncated to {} bytes", name, NAME_LEN - 1);
    }
    set_entry(&mut dir, slot, &DirEntry::new(ino, name));

    let mut txn = Transaction::new();
    txn.write_block(sb.inode_bitmap, &bitmap)?;
    txn.write_block(table_block, &table)?;
    txn.write_block(sb.data_start, &dir)?;
    journal.stage(bdev, &txn)?;

    log::info!("staged creation of '{}' as inode {} in slot {}", name, ino, slot);
    Ok(CreatedFile { inode: ino, slot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::test_bit;
    use crate::block::mock::MockDevice;
    use crate::dir::lookup;
    use crate::fs::{format, FormatOptions};
    use crate::hal::FixedHal;
    use crate::inode::{read_inode, write_inode};
    use crate::journal::read_header;
    use crate::superblock::write_superblock;
    use crate::types::Superblock;

    fn formatted(opts: &FormatOptions) -> (BlockDev<MockDevice>, Superblock) {
        let mut bdev = BlockDev::new(MockDevice::new(opts.total_blocks as u64)).unwrap();
        let sb = format::<_, FixedHal>(&mut bdev, opts).unwrap();
        (bdev, sb)
    }

    fn create(bdev: &mut BlockDev<MockDevice>, name: &str) -> Result<CreatedFile, JournalError> {
        stage_create_file::<_, FixedHal>(bdev, &JournalConfig::default(), name)
    }

    #[test]
    fn test_create_then_install_round_trip() {
        let (mut bdev, sb) = formatted(&FormatOptions::default());

        let created = create(&mut bdev, "foo.txt").unwrap();
        assert_eq!(created, CreatedFile { inode: 1, slot: 2 });

        // 安装之前目标块不变
        let dir = bdev.device().block(sb.data_start as u64);
        assert!(lookup(dir, "foo.txt").is_none());

        let mut journal = Journal::load(&mut bdev, JournalConfig::default()).unwrap();
        let report = journal.install(&mut bdev).unwrap();
        assert_eq!(report.transactions, 1);
        assert_eq!(report.blocks_written, 3);

        assert!(test_bit(bdev.device().block(sb.inode_bitmap as u64), 1));
        let inode = read_inode(&mut bdev, &sb, 1).unwrap();
        assert!(inode.is_file());
        assert_eq!(inode.links, 1);
        assert_eq!(inode.size, 0);
        assert_eq!(inode.ctime, 1_700_000_000);

        let root = read_inode(&mut bdev, &sb, ROOT_INODE).unwrap();
        assert_eq!(root.size, 64 + 32);

        let dir = bdev.device().block(sb.data_start as u64);
        assert_eq!(lookup(dir, "foo.txt").unwrap().inode, 1);
        assert!(read_header(&mut bdev, &JournalConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_create_refuses_busy_journal() {
        let (mut bdev, _) = formatted(&FormatOptions::default());
        create(&mut bdev, "a").unwrap();

        let before = bdev.device().storage.clone();
        assert_eq!(create(&mut bdev, "b"), Err(JournalError::Busy));
        assert_eq!(bdev.device().storage, before);
    }

    #[test]
    fn test_create_on_unformatted_image() {
        let mut bdev = BlockDev::new(MockDevice::new(64)).unwrap();
        assert_eq!(create(&mut bdev, "foo"), Err(JournalError::NotAFilesystem));
        assert_eq!(bdev.write_count(), 0);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let (mut bdev, _) = formatted(&FormatOptions::default());
        let writes = bdev.write_count();
        assert_eq!(create(&mut bdev, ""), Err(JournalError::InvalidName));
        assert_eq!(bdev.write_count(), writes);

        // 魔数检查先于名字检查
        let mut blank = BlockDev::new(MockDevice::new(64)).unwrap();
        assert_eq!(create(&mut blank, ""), Err(JournalError::NotAFilesystem));
    }

    #[test]
    fn test_corrupt_root_size_is_reported() {
        let (mut bdev, sb) = formatted(&FormatOptions::default());
        let mut root = read_inode(&mut bdev, &sb, ROOT_INODE).unwrap();
        root.size = u32::MAX - 4;
        write_inode(&mut bdev, &sb, ROOT_INODE, &root).unwrap();
        let writes = bdev.write_count();

        match create(&mut bdev, "foo") {
            Err(JournalError::Io(err)) => assert_eq!(err.kind(), ErrorKind::Corrupted),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(bdev.write_count(), writes);
    }

    #[test]
    fn test_corrupt_inode_table_start_is_reported() {
        let (mut bdev, mut sb) = formatted(&FormatOptions::default());
        // 第一个空闲 inode 在第 0 块，改成落在第 1 块才会溢出
        let mut bitmap = bdev.device().block(sb.inode_bitmap as u64).to_vec();
        for ino in 0..INODES_PER_BLOCK {
            set_bit(&mut bitmap, ino).unwrap();
        }
        bdev.write_block(sb.inode_bitmap as u64, &bitmap).unwrap();
        sb.inode_start = u32::MAX;
        write_superblock(&mut bdev, &sb).unwrap();

        match create(&mut bdev, "foo") {
            Err(JournalError::Io(err)) => assert_eq!(err.kind(), ErrorKind::Corrupted),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_without_free_inodes() {
        let opts = FormatOptions {
            inode_count: 3,
            ..Default::default()
        };
        let (mut bdev, _) = formatted(&opts);
        for name in ["a", "b"] {
            create(&mut bdev, name).unwrap();
            let mut journal = Journal::load(&mut bdev, opts.journal).unwrap();
            journal.install(&mut bdev).unwrap();
        }
        assert_eq!(create(&mut bdev, "c"), Err(JournalError::NoFreeInodes));
    }

    #[test]
    fn test_create_without_free_directory_slots() {
        let (mut bdev, sb) = formatted(&FormatOptions::default());
        let mut dir = bdev.device().block(sb.data_start as u64).to_vec();
        for slot in 2..DIRENTS_PER_BLOCK {
            set_entry(&mut dir, slot, &DirEntry::new(40, "x"));
        }
        bdev.write_block(sb.data_start as u64, &dir).unwrap();

        assert_eq!(create(&mut bdev, "foo"), Err(JournalError::NoFreeDirectorySlots));
    }

    #[test]
    fn test_create_when_journal_full() {
        let opts = FormatOptions {
            journal: JournalConfig {
                block_count: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut bdev, _) = formatted(&opts);
        let writes = bdev.write_count();
        assert_eq!(
            stage_create_file::<_, FixedHal>(&mut bdev, &opts.journal, "foo"),
            Err(JournalError::Full)
        );
        assert_eq!(bdev.write_count(), writes);
    }

    #[test]
    fn test_root_inode_untouched_outside_first_table_block() {
        let opts = FormatOptions {
            inode_count: 64,
            ..Default::default()
        };
        let (mut bdev, sb) = formatted(&opts);
        // 占满 inode 表第 0 块，下一个 inode 落在第 1 块
        let mut bitmap = bdev.device().block(sb.inode_bitmap as u64).to_vec();
        for ino in 0..INODES_PER_BLOCK {
            set_bit(&mut bitmap, ino).unwrap();
        }
        bdev.write_block(sb.inode_bitmap as u64, &bitmap).unwrap();

        let created = create(&mut bdev, "far").unwrap();
        assert_eq!(created.inode, INODES_PER_BLOCK);
        let mut journal = Journal::load(&mut bdev, JournalConfig::default()).unwrap();
        journal.install(&mut bdev).unwrap();

        assert_eq!(read_inode(&mut bdev, &sb, ROOT_INODE).unwrap().size, 64);
        assert!(read_inode(&mut bdev, &sb, INODES_PER_BLOCK).unwrap().is_file());
    }

    #[test]
    fn test_long_name_is_truncated() {
        let (mut bdev, sb) = formatted(&FormatOptions::default());
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        create(&mut bdev, long).unwrap();
        let mut journal = Journal::load(&mut bdev, JournalConfig::default()).unwrap();
        journal.install(&mut bdev).unwrap();

        let dir = bdev.device().block(sb.data_start as u64);
        assert!(lookup(dir, &long[..NAME_LEN - 1]).is_some());
    }

    #[test]
    fn test_crash_mid_stage_leaves_image_consistent() {
        let (mut bdev, sb) = formatted(&FormatOptions::default());
        // 惰性初始化不写入（format 已写 header）；两条 data record 写完后崩溃
        bdev.device_mut().writes_left = Some(4);
        assert!(create(&mut bdev, "foo").unwrap_err().is_fatal());

        bdev.device_mut().writes_left = None;
        let mut journal = Journal::load(&mut bdev, JournalConfig::default()).unwrap();
        assert!(journal.header().is_empty());
        assert_eq!(journal.install(&mut bdev).unwrap().transactions, 0);
        let dir = bdev.device().block(sb.data_start as u64);
        assert!(lookup(dir, "foo").is_none());
    }

    #[test]
    fn test_mismatched_journal_block_still_stages() {
        let (mut bdev, mut sb) = formatted(&FormatOptions::default());
        sb.journal_block = 5;
        write_superblock(&mut bdev, &sb).unwrap();
        assert!(create(&mut bdev, "foo").is_ok());
    }
}
