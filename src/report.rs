use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::config::OutputFormat;
use crate::models::{Diagnostic, ExtensionTally, ScanReport, ScanStats};

/// 排名后的一行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub extension: String,
    pub lines: u64,
    pub files: u64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    total_lines: u64,
    extensions: &'a [RankedEntry],
    stats: &'a ScanStats,
    diagnostics: &'a [Diagnostic],
}

/// 按行数降序排列，行数相同时按扩展名升序；行数为 0 的扩展名不显示。
/// `top` 为 0 时返回全部。
/// 行数为 0 的扩展名在截取前 N 个之前就被去掉，不会占用名额。
pub fn rank(totals: &BTreeMap<String, ExtensionTally>, top: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = totals
        .iter()
        .filter(|(_, tally)| tally.lines > 0)
        .map(|(extension, tally)| RankedEntry {
            extension: extension.clone(),
            lines: tally.lines,
            files: tally.files,
        })
        .collect();

    entries.sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.extension.cmp(&b.extension)));

    if top > 0 {
        entries.truncate(top);
    }
    entries
}

/// 把扫描结果渲染成指定格式
pub fn render(report: &ScanReport, top: usize, format: OutputFormat) -> serde_json::Result<String> {
    let entries = rank(&report.totals, top);

    match format {
        OutputFormat::Table => Ok(render_table(&entries)),
        OutputFormat::Csv => Ok(render_csv(&entries)),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport {
            root: &report.root,
            total_lines: report.total_lines(),
            extensions: &entries,
            stats: &report.stats,
            diagnostics: &report.diagnostics,
        }),
    }
}

fn render_table(entries: &[RankedEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{} | Lines of code: {}", entry.extension, entry.lines);
    }
    out
}

fn render_csv(entries: &[RankedEntry]) -> String {
    let mut out = String::from("extension,lines,files\n");
    for entry in entries {
        let _ = writeln!(out, "{},{},{}", entry.extension, entry.lines, entry.files);
    }
    out
}
