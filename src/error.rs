//! 扫描前的致命错误
//!
//! 单个文件或目录读取失败不会走到这里，而是作为 [`Diagnostic`](crate::models::Diagnostic)
//! 记录下来，扫描继续进行。

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// 根目录不存在或无法访问
    #[error("目录 {path:?} 不存在或无法访问: {source}")]
    RootUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 根路径不是目录
    #[error("{path:?} 不是目录")]
    NotADirectory { path: PathBuf },
}
