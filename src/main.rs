mod cli;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use lines_cli::config::{Config, OutputFormat};
use lines_cli::report;
use lines_cli::scanner::{ParallelFileWalker, ScanEvent};
use lines_cli::utils::{format_elapsed, format_time};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志写到 stderr，stdout 只输出统计结果
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    // 加载配置，命令行参数优先
    let mut config = match &cli.config {
        Some(config_path) => Config::load_from_file(config_path)?,
        None => Config::load_or_default()?,
    };
    if cli.hidden {
        config.scan.include_hidden = true;
    }
    if let Some(top) = cli.top {
        config.display.top = top;
    }
    if let Some(jobs) = cli.jobs {
        config.scan.concurrency_limit = jobs;
    }
    if let Some(format) = cli.format {
        config.display.format = format;
    }

    if !cli.dir.exists() {
        anyhow::bail!("目录 {} 不存在", cli.dir.display());
    }

    let table = config.display.format == OutputFormat::Table;
    if table {
        println!("Analyzing.. {}\n", cli.dir.display());
    }

    let progress = create_progress_bar();
    let walker = {
        let progress = progress.clone();
        ParallelFileWalker::from_config(&config).with_progress(move |event| {
            if let ScanEvent::FileClassified { path, .. } = event {
                progress.inc(1);
                progress.set_message(path.display().to_string());
            }
        })
    };

    // Ctrl-C 时停止派发新任务，已有结果照常输出
    let cancel = walker.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到中断信号，正在停止扫描");
            cancel.cancel();
        }
    });

    let report = walker.scan(&cli.dir).await?;
    progress.finish_and_clear();

    print!("{}", report::render(&report, config.display.top, config.display.format)?);

    if table {
        if !report.stats.completed {
            println!("\n扫描被中断，结果不完整");
        }
        if cli.verbose {
            println!(
                "\n开始时间: {} | 目录: {} | 文件: {} | 错误: {}",
                format_time(report.stats.scan_start_time),
                report.stats.directories_visited,
                report.stats.files_classified,
                report.diagnostics.len()
            );
        }
        println!(
            "\nTime taken: {} to analyze files",
            format_elapsed(report.stats.scan_duration)
        );
    }

    Ok(())
}

/// 创建进度条
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] 已统计 {pos} 个文件 {wide_msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
