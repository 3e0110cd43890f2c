//! vsfs-journal: 命令行入口
//!
//! 每次调用打开一次镜像，执行一个子命令后退出。退出码见 [`JournalError::exit_code`]。

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vsfs_journal::consts::{JOURNAL_BLOCKS, JOURNAL_START_BLOCK};
use vsfs_journal::superblock::read_superblock;
use vsfs_journal::{
    format, stage_create_file, BlockDev, FileDevice, FormatOptions, Journal, JournalConfig,
    JournalError, StdHal,
};

/// Write-ahead journal for VSFS images
#[derive(Parser, Debug)]
#[command(name = "vsfs-journal")]
#[command(about = "Stage metadata transactions into a VSFS journal and install them")]
struct Args {
    /// Path to the filesystem image
    #[arg(long, global = true, default_value = "vsfs.img")]
    image: PathBuf,

    /// First block of the journal region
    #[arg(long, global = true, default_value_t = JOURNAL_START_BLOCK)]
    journal_start: u32,

    /// Number of blocks in the journal region
    #[arg(long, global = true, default_value_t = JOURNAL_BLOCKS)]
    journal_blocks: u32,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage the creation of an empty file in the root directory
    Create {
        /// File name (truncated to 27 bytes)
        name: String,
    },
    /// Replay committed transactions and clear the journal
    Install,
    /// Write a fresh image
    Format {
        /// Total blocks in the image
        #[arg(long, default_value_t = 64)]
        blocks: u32,
        /// Number of inodes
        #[arg(long, default_value_t = 64)]
        inodes: u32,
    },
    /// Show the journal header and pending records
    Status,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("ERROR: {}", err);
        if matches!(err, JournalError::Busy | JournalError::Full) {
            eprintln!("Please run 'vsfs-journal install' first.");
        }
        process::exit(err.exit_code());
    }
}

/// 安装 fmt subscriber；`RUST_LOG` 优先于 `-v`
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), JournalError> {
    let config = JournalConfig {
        start_block: args.journal_start,
        block_count: args.journal_blocks,
        ..Default::default()
    };

    match &args.command {
        Command::Create { name } => {
            println!("Creating file: {}", name);
            let mut bdev = BlockDev::new(FileDevice::open(&args.image)?)?;
            let created = stage_create_file::<_, StdHal>(&mut bdev, &config, name)?;
            bdev.close()?;
            println!(
                "File '{}' creation journaled successfully (inode {}).",
                name, created.inode
            );
        }
        Command::Install => {
            let mut bdev = BlockDev::new(FileDevice::open(&args.image)?)?;
            let mut journal = Journal::load(&mut bdev, config)?;
            let was_empty = journal.header().is_initialized() && journal.header().is_empty();
            let report = journal.install(&mut bdev)?;
            bdev.close()?;

            if was_empty {
                println!("Journal is empty - nothing to install.");
            } else {
                if report.discarded_records > 0 {
                    println!(
                        "WARNING: Found {} uncommitted data record(s) - discarded.",
                        report.discarded_records
                    );
                }
                println!(
                    "Journal installed successfully. {} transaction(s) applied.",
                    report.transactions
                );
            }
        }
        Command::Format { blocks, inodes } => {
            let opts = FormatOptions {
                total_blocks: *blocks,
                inode_count: *inodes,
                journal: config,
            };
            let mut bdev = BlockDev::new(FileDevice::create(&args.image, *blocks as u64)?)?;
            let sb = format::<_, StdHal>(&mut bdev, &opts)?;
            bdev.close()?;
            println!(
                "Formatted {}: {} blocks, {} inodes, data starts at block {}.",
                bdev.device().path().display(),
                sb.total_blocks,
                sb.inode_count,
                sb.data_start
            );
        }
        Command::Status => {
            let mut bdev = BlockDev::new(FileDevice::open(&args.image)?)?;
            let sb = read_superblock(&mut bdev)?;
            if !sb.is_valid() {
                return Err(JournalError::NotAFilesystem);
            }
            println!(
                "filesystem: {} blocks, {} inodes, journal at block {}",
                sb.total_blocks, sb.inode_count, sb.journal_block
            );

            let journal = Journal::load(&mut bdev, config)?;
            let records = journal.records(&mut bdev)?;
            println!(
                "journal: {} of {} bytes used ({} free), {} record(s) pending",
                journal.header().bytes_used,
                config.capacity(),
                journal.remaining(),
                records.len()
            );
            for info in &records {
                match info.block_no {
                    Some(block_no) => println!(
                        "  @{:<6} data    size={} block={}",
                        info.offset, info.size, block_no
                    ),
                    None => println!("  @{:<6} commit  size={}", info.offset, info.size),
                }
            }
        }
    }

    Ok(())
}
