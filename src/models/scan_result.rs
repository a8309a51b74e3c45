use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Diagnostic;

/// 某个扩展名的累计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionTally {
    /// 非空行总数
    pub lines: u64,

    /// 参与统计的文件数
    pub files: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// 扫描的根目录
    pub root: PathBuf,

    /// 按扩展名汇总的行数快照
    pub totals: BTreeMap<String, ExtensionTally>,

    /// 扫描统计信息
    pub stats: ScanStats,

    /// 扫描过程中的非致命错误
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    /// 已读取的目录数量
    pub directories_visited: u64,

    /// 已统计的文件数量
    pub files_classified: u64,

    /// 扫描开始时间
    pub scan_start_time: DateTime<Utc>,

    /// 扫描耗时
    pub scan_duration: Duration,

    /// 扫描是否完整结束（被取消时为 false）
    pub completed: bool,
}

impl ScanReport {
    /// 指定扩展名的非空行数，不存在时为 0
    pub fn lines_for(&self, extension: &str) -> u64 {
        self.totals.get(extension).map(|t| t.lines).unwrap_or(0)
    }

    /// 所有扩展名的非空行总数
    pub fn total_lines(&self) -> u64 {
        self.totals.values().map(|t| t.lines).sum()
    }

    /// 只保留行数，便于和其它结果比较
    pub fn line_totals(&self) -> BTreeMap<String, u64> {
        self.totals
            .iter()
            .map(|(ext, tally)| (ext.clone(), tally.lines))
            .collect()
    }
}
