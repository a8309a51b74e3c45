use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 扫描过程中遇到的非致命错误，不会中断整个扫描
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 出错的文件或目录
    pub path: PathBuf,

    /// 错误类别
    pub kind: DiagnosticKind,

    /// 错误信息
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 文件无法打开
    FileOpen,
    /// 读取文件内容时出错
    FileRead,
    /// 某一行超过了长度上限
    LineTooLong,
    /// 目录无法读取或在遍历中消失
    DirectoryRead,
    /// 无法获取目录项的类型
    Metadata,
}

impl Diagnostic {
    pub fn new(path: impl Into<PathBuf>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl DiagnosticKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DiagnosticKind::FileOpen => "无法打开文件",
            DiagnosticKind::FileRead => "读取文件失败",
            DiagnosticKind::LineTooLong => "行过长",
            DiagnosticKind::DirectoryRead => "无法读取目录",
            DiagnosticKind::Metadata => "无法获取文件信息",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.display_name(), self.path.display(), self.message)
    }
}
