use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 忽略配置
    pub ignore: IgnoreConfig,

    /// 扫描配置
    pub scan: ScanConfig,

    /// 显示配置
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// 忽略的目录名
    pub directories: HashSet<String>,

    /// 忽略的文件扩展名（含前导 `.`）
    pub extensions: HashSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 是否分析隐藏文件和隐藏目录
    pub include_hidden: bool,

    /// 同时进行 I/O 的任务上限，0 表示不限制
    pub concurrency_limit: usize,

    /// 单行允许的最大字节数
    pub max_line_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 只显示前 N 个扩展名，0 表示全部
    pub top: usize,

    /// 输出格式
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 表格格式
    Table,
    /// JSON 格式
    Json,
    /// CSV 格式
    Csv,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            directories: DefaultConfig::default_ignore_dirs(),
            extensions: DefaultConfig::default_ignore_extensions(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            concurrency_limit: DefaultConfig::default_concurrency_limit(),
            max_line_bytes: DefaultConfig::MAX_LINE_BYTES,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top: 0,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        anyhow::ensure!(
            config.scan.max_line_bytes > 0,
            "配置文件 {} 中 scan.max_line_bytes 必须大于 0",
            path.display()
        );
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("lines");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果默认配置文件不存在则使用内置默认值
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Ok(config_path) if config_path.exists() => Self::load_from_file(&config_path),
            _ => Ok(Self::default()),
        }
    }
}
