use clap::Parser;
use std::path::PathBuf;

use lines_cli::config::OutputFormat;

#[derive(Parser)]
#[command(name = "lines")]
#[command(about = "按扩展名统计目录中非空代码行数的 CLI 工具")]
#[command(version)]
pub struct Cli {
    /// 要分析的目录
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// 同时分析隐藏文件和隐藏目录
    #[arg(long)]
    pub hidden: bool,

    /// 只显示前 N 个扩展名 (0 表示全部)
    #[arg(short, long)]
    pub top: Option<usize>,

    /// 同时进行 I/O 的任务上限 (0 表示不限制)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// 输出格式
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}
