//! 分诊工作台主程序

mod commands;
mod desk;
mod intake;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use desk::{user_message, Desk, Reply};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use triage_admin::{logging, ConfigManager};
use triage_storage::{JsonFileStore, SnapshotStore};
use triage_workflow::TieBreakPolicy;

/// 分诊工作台命令行参数
#[derive(Parser, Debug)]
#[command(name = "triage-desk")]
#[command(about = "Patient intake and triage desk")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 快照文件路径，覆盖配置文件
    #[arg(short, long)]
    snapshot: Option<String>,

    /// 急诊层内排序策略 (lifo | fifo)
    #[arg(short, long)]
    tie_break: Option<TieBreakPolicy>,

    /// 不读写快照
    #[arg(long)]
    no_persist: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut manager = ConfigManager::new(args.config.as_deref())?;
    manager.update(|config| {
        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }
        if let Some(path) = &args.snapshot {
            config.storage.snapshot_path = path.clone();
        }
        if let Some(policy) = args.tie_break {
            config.workflow.tie_break = policy;
        }
        if args.no_persist {
            config.storage.enabled = false;
        }
    })?;
    let config = manager.config().clone();

    // 初始化日志
    logging::init_tracing(&config.logging)?;

    info!("Starting triage desk...");
    info!("  Tie-break policy: {}", config.workflow.tie_break);
    if config.storage.enabled {
        info!("  Snapshot path: {}", config.storage.snapshot_path);
    } else {
        warn!("  Snapshot persistence disabled");
    }

    let store: Option<Arc<dyn SnapshotStore>> = if config.storage.enabled {
        Some(Arc::new(JsonFileStore::new(&config.storage.snapshot_path)))
    } else {
        None
    };

    let mut desk = Desk::open(&config, store).await?;
    run_console(&mut desk).await
}

/// 逐行读取标准输入并执行命令，直到 quit 或输入结束
async fn run_console(desk: &mut Desk) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"Triage desk ready. Type 'help' for commands.\n").await?;
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            desk.shutdown().await?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match line.parse::<Command>() {
            Ok(command) => desk.handle(command).await?,
            Err(e) => Reply::Message(user_message(&e)),
        };

        match reply {
            Reply::Message(message) => {
                stdout.write_all(message.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Reply::Quit => break,
        }
    }

    let stats = desk.workflow().stats();
    info!(
        total = stats.total_patients,
        treated = stats.treated_count,
        waiting = stats.waiting_count,
        "Triage desk stopped"
    );
    Ok(())
}
