use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

use crate::models::DiagnosticKind;

/// 读取缓冲区大小
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// 单行的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// 去掉首尾空白后为空
    Blank,
    /// 看起来像注释的非空行
    Comment,
    /// 其它非空行
    Code,
}

impl LineKind {
    pub fn is_blank(&self) -> bool {
        matches!(self, LineKind::Blank)
    }
}

/// 单个文件的行统计
///
/// `non_blank` 是唯一参与汇总的数值。注释行同样计入 `non_blank`，
/// `comment_like` 只是记录识别结果，不会从计数中扣除。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTally {
    pub non_blank: u64,
    pub comment_like: u64,
    pub blank: u64,
}

impl LineTally {
    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => {
                self.non_blank += 1;
                self.comment_like += 1;
            }
            LineKind::Code => self.non_blank += 1,
        }
    }

    pub fn total_lines(&self) -> u64 {
        self.non_blank + self.blank
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("无法打开文件: {source}")]
    Open { source: io::Error },

    #[error("读取第 {line} 行时出错: {source}")]
    Read {
        line: u64,
        partial: LineTally,
        source: io::Error,
    },

    #[error("第 {line} 行超过 {limit} 字节上限")]
    LineTooLong {
        line: u64,
        limit: usize,
        partial: LineTally,
    },
}

impl ClassifyError {
    /// 出错前已经统计到的结果，无法打开的文件为 0
    pub fn partial(&self) -> LineTally {
        match self {
            ClassifyError::Open { .. } => LineTally::default(),
            ClassifyError::Read { partial, .. } | ClassifyError::LineTooLong { partial, .. } => *partial,
        }
    }

    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            ClassifyError::Open { .. } => DiagnosticKind::FileOpen,
            ClassifyError::Read { .. } => DiagnosticKind::FileRead,
            ClassifyError::LineTooLong { .. } => DiagnosticKind::LineTooLong,
        }
    }
}

/// 对单行分类
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if looks_like_comment(trimmed) {
        LineKind::Comment
    } else {
        LineKind::Code
    }
}

/// 与语言无关的注释识别：`//`、`/*`、`*`、`#` 开头，或以 `*/` 结尾
fn looks_like_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
        || trimmed.ends_with("*/")
}

/// 统计文件中的非空行
///
/// 每行最多读取 `max_line_bytes` 字节，超长的行会终止统计并返回
/// 已经统计到的部分结果。
pub async fn count_lines(path: &Path, max_line_bytes: usize) -> Result<LineTally, ClassifyError> {
    let file = File::open(path)
        .await
        .map_err(|source| ClassifyError::Open { source })?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);

    let mut tally = LineTally::default();
    let mut line_no = 0u64;
    let mut buf = Vec::new();
    // 多读一个字节才能分辨出超长的行
    let limit = (max_line_bytes as u64).saturating_add(1);

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| ClassifyError::Read {
                line: line_no + 1,
                partial: tally,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let content = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        if content.len() > max_line_bytes {
            return Err(ClassifyError::LineTooLong {
                line: line_no,
                limit: max_line_bytes,
                partial: tally,
            });
        }

        tally.record(classify_line(&String::from_utf8_lossy(content)));
    }

    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line(" \t \r"), LineKind::Blank);
        assert_eq!(classify_line("  // note"), LineKind::Comment);
        assert_eq!(classify_line("/* open"), LineKind::Comment);
        assert_eq!(classify_line(" * middle"), LineKind::Comment);
        assert_eq!(classify_line("close */"), LineKind::Comment);
        assert_eq!(classify_line("# heading"), LineKind::Comment);
        assert_eq!(classify_line("let x = 1;"), LineKind::Code);
        assert!(!classify_line("let x = 1; // trailing").is_blank());
    }

    #[tokio::test]
    async fn test_counts_total_minus_blank() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("a.go");
        // 7 行，其中 3 行为空或只有空白
        std::fs::write(&path, "package a\n\n   \nfunc A() {\n\t\n}\nvar x = 1").unwrap();

        let tally = count_lines(&path, 1024).await.unwrap();
        assert_eq!(tally.non_blank, 4);
        assert_eq!(tally.blank, 3);
        assert_eq!(tally.total_lines(), 7);
    }

    #[tokio::test]
    async fn test_comment_lines_are_still_counted() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("notes.rs");
        std::fs::write(&path, "// one\n// two\n\n/* three\n * four\n */\n# five\n").unwrap();

        let tally = count_lines(&path, 1024).await.unwrap();
        assert_eq!(tally.non_blank, 6);
        assert_eq!(tally.comment_like, 6);
    }

    #[tokio::test]
    async fn test_crlf_and_invalid_utf8() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("win.c");
        std::fs::write(&path, b"int a;\r\n\r\n\xff\xfe\r\n").unwrap();

        let tally = count_lines(&path, 1024).await.unwrap();
        assert_eq!(tally.non_blank, 2);
        assert_eq!(tally.blank, 1);
    }

    #[tokio::test]
    async fn test_line_exactly_at_limit_is_accepted() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("wide.js");
        let content = format!("{}\nshort\n", "x".repeat(16));
        std::fs::write(&path, content).unwrap();

        let tally = count_lines(&path, 16).await.unwrap();
        assert_eq!(tally.non_blank, 2);
    }

    #[tokio::test]
    async fn test_overlong_line_returns_partial_count() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("min.js");
        let content = format!("one\ntwo\n{}\nfour\n", "x".repeat(64));
        std::fs::write(&path, content).unwrap();

        let err = count_lines(&path, 16).await.unwrap_err();
        assert!(matches!(err, ClassifyError::LineTooLong { line: 3, .. }));
        assert_eq!(err.partial().non_blank, 2);
        assert_eq!(err.diagnostic_kind(), DiagnosticKind::LineTooLong);
    }

    #[tokio::test]
    async fn test_unlimited_line_length() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("huge.js");
        let content = format!("{}\n\nend\n", "x".repeat(200_000));
        std::fs::write(&path, content).unwrap();

        let tally = count_lines(&path, usize::MAX).await.unwrap();
        assert_eq!(tally.non_blank, 2);
        assert_eq!(tally.blank, 1);
    }

    #[tokio::test]
    async fn test_missing_file_counts_zero() {
        let temp_dir = tempdir().unwrap();
        let err = count_lines(&temp_dir.path().join("gone.rs"), 1024).await.unwrap_err();

        assert_eq!(err.diagnostic_kind(), DiagnosticKind::FileOpen);
        assert_eq!(err.partial(), LineTally::default());
    }
}
