use std::collections::HashSet;
use std::path::Path;

use crate::config::{Config, DefaultConfig};

/// 路径的类型，决定使用哪一套排除规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// 排除策略 - 纯函数，只检查路径字符串，不做任何 I/O
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// 是否分析隐藏条目
    include_hidden: bool,

    /// 需要整棵剪掉的目录名
    ignore_dirs: HashSet<String>,

    /// 需要忽略的文件扩展名（含前导 `.`）
    ignore_extensions: HashSet<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ExclusionPolicy {
    /// 使用默认的忽略列表创建排除策略
    pub fn new(include_hidden: bool) -> Self {
        Self {
            include_hidden,
            ignore_dirs: DefaultConfig::default_ignore_dirs(),
            ignore_extensions: DefaultConfig::default_ignore_extensions(),
        }
    }

    /// 使用自定义忽略列表创建排除策略
    pub fn with_rules(
        include_hidden: bool,
        ignore_dirs: HashSet<String>,
        ignore_extensions: HashSet<String>,
    ) -> Self {
        Self {
            include_hidden,
            ignore_dirs,
            ignore_extensions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_rules(
            config.scan.include_hidden,
            config.ignore.directories.clone(),
            config.ignore.extensions.clone(),
        )
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// 判断路径是否需要分析
    pub fn should_analyze(&self, path: &Path, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Directory => self.should_enter_directory(path),
            EntryKind::File => self.should_analyze_file(path),
        }
    }

    /// 目录被排除时整棵子树都不会被访问
    pub fn should_enter_directory(&self, path: &Path) -> bool {
        let Some(name) = base_name(path) else {
            return true;
        };

        if self.is_hidden(&name) {
            return false;
        }

        !self.ignore_dirs.contains(&*name)
    }

    pub fn should_analyze_file(&self, path: &Path) -> bool {
        let Some(name) = base_name(path) else {
            return false;
        };

        if self.is_hidden(&name) {
            return false;
        }

        match extension_key(path) {
            Some(ext) => !self.ignore_extensions.contains(&ext),
            None => false,
        }
    }

    fn is_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

fn base_name(path: &Path) -> Option<std::borrow::Cow<'_, str>> {
    path.file_name().map(|name| name.to_string_lossy())
}

/// 聚合使用的扩展名键，例如 `src/main.rs` -> `.rs`
///
/// 以 `.` 开头且没有其它 `.` 的文件名（如 `.env`）没有扩展名，
/// 以 `.` 结尾的文件名也视为没有扩展名。大小写保持不变。
pub fn extension_key(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy();
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext))
}
