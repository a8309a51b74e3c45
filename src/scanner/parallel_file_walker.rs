use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::fs;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, DefaultConfig};
use crate::error::ScanError;
use crate::models::{Diagnostic, DiagnosticKind, ScanReport, ScanStats};
use crate::scanner::aggregator::ExtensionTotals;
use crate::scanner::exclusion::{extension_key, ExclusionPolicy};
use crate::scanner::line_classifier::count_lines;
use crate::scanner::pending::PendingWork;

/// 扫描进度事件
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// 开始读取一个目录
    DirectoryEntered { path: PathBuf },

    /// 一个文件统计完成，即将合并到汇总结果
    FileClassified {
        path: PathBuf,
        extension: String,
        lines: u64,
    },
}

pub type ProgressCallback = Arc<dyn Fn(ScanEvent) + Send + Sync>;

/// 并发文件系统扫描器
///
/// 每个需要进入的子目录和每个需要统计的文件都会派发成一个独立的 tokio 任务，
/// 子目录的递归发生在派发出去的任务内部。`concurrency_limit` 为 0 时不限制
/// 同时进行 I/O 的任务数，否则用信号量限流。
pub struct ParallelFileWalker {
    policy: Arc<ExclusionPolicy>,

    /// 同时进行 I/O 的任务上限，0 表示不限制
    concurrency_limit: usize,

    /// 单行允许的最大字节数
    max_line_bytes: usize,

    cancel: CancellationToken,

    progress: Option<ProgressCallback>,
}

impl ParallelFileWalker {
    /// 使用默认忽略规则创建扫描器
    pub fn new(include_hidden: bool) -> Self {
        Self::with_policy(ExclusionPolicy::new(include_hidden))
    }

    pub fn with_policy(policy: ExclusionPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            concurrency_limit: DefaultConfig::default_concurrency_limit(),
            max_line_bytes: DefaultConfig::MAX_LINE_BYTES,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_policy(ExclusionPolicy::from_config(config))
            .with_concurrency_limit(config.scan.concurrency_limit)
            .with_max_line_bytes(config.scan.max_line_bytes)
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// 使用外部的取消信号，取消后尚未开始的任务直接结束
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ScanEvent) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 扫描根目录，所有任务结束后返回汇总结果
    pub async fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        let metadata = fs::metadata(root)
            .await
            .map_err(|source| ScanError::RootUnavailable {
                path: root.to_path_buf(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let started = Instant::now();
        let scan_start_time = Utc::now();
        info!(
            root = %root.display(),
            include_hidden = self.policy.include_hidden(),
            concurrency_limit = self.concurrency_limit,
            "开始扫描"
        );

        let (context, mut diagnostics_rx) = WalkContext::new(self);

        // 根目录本身不经过排除规则
        context.dispatch_directory(root.to_path_buf());
        context.pending.wait().await;

        let mut diagnostics = Vec::new();
        while let Ok(diagnostic) = diagnostics_rx.try_recv() {
            diagnostics.push(diagnostic);
        }
        diagnostics.sort_by(|a, b| a.path.cmp(&b.path));

        let stats = ScanStats {
            directories_visited: context.directories_visited.load(Ordering::Acquire),
            files_classified: context.files_classified.load(Ordering::Acquire),
            scan_start_time,
            scan_duration: started.elapsed(),
            completed: !context.skipped.load(Ordering::Acquire),
        };

        info!(
            directories = stats.directories_visited,
            files = stats.files_classified,
            diagnostics = diagnostics.len(),
            completed = stats.completed,
            "扫描结束"
        );

        Ok(ScanReport {
            root: root.to_path_buf(),
            totals: context.totals.snapshot(),
            stats,
            diagnostics,
        })
    }
}

/// 单次扫描共享的状态，扫描结束后即丢弃
struct WalkContext {
    policy: Arc<ExclusionPolicy>,
    max_line_bytes: usize,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
    totals: ExtensionTotals,
    pending: Arc<PendingWork>,
    diagnostics: mpsc::UnboundedSender<Diagnostic>,
    directories_visited: AtomicU64,
    files_classified: AtomicU64,

    /// 有任务因为取消而放弃了工作
    skipped: AtomicBool,
}

impl WalkContext {
    fn new(walker: &ParallelFileWalker) -> (Arc<Self>, mpsc::UnboundedReceiver<Diagnostic>) {
        let (diagnostics_tx, diagnostics_rx) = mpsc::unbounded_channel();
        let context = Arc::new(Self {
            policy: Arc::clone(&walker.policy),
            max_line_bytes: walker.max_line_bytes,
            limiter: (walker.concurrency_limit > 0)
                .then(|| Arc::new(Semaphore::new(walker.concurrency_limit))),
            cancel: walker.cancel.clone(),
            progress: walker.progress.clone(),
            totals: ExtensionTotals::new(),
            pending: PendingWork::new(),
            diagnostics: diagnostics_tx,
            directories_visited: AtomicU64::new(0),
            files_classified: AtomicU64::new(0),
            skipped: AtomicBool::new(false),
        });
        (context, diagnostics_rx)
    }

    /// 派发一个目录任务，任务内部继续递归
    fn dispatch_directory(self: &Arc<Self>, dir: PathBuf) {
        let guard = self.pending.register();
        let context = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            context.walk_directory(dir).await;
        });
    }

    /// 派发一个文件统计任务
    fn dispatch_file(self: &Arc<Self>, path: PathBuf, extension: String) {
        let guard = self.pending.register();
        let context = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            context.classify_file(path, extension).await;
        });
    }

    async fn walk_directory(self: &Arc<Self>, dir: PathBuf) {
        let _permit = self.admit().await;
        if self.cancel.is_cancelled() {
            self.mark_skipped();
            return;
        }

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) => {
                self.report(Diagnostic::new(&dir, DiagnosticKind::DirectoryRead, err.to_string()));
                return;
            }
        };

        self.directories_visited.fetch_add(1, Ordering::AcqRel);
        debug!(dir = %dir.display(), "读取目录");
        self.emit(|| ScanEvent::DirectoryEntered { path: dir.clone() });

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    // 目录在遍历中消失，放弃剩余的条目
                    self.report(Diagnostic::new(&dir, DiagnosticKind::DirectoryRead, err.to_string()));
                    break;
                }
            };
            if self.cancel.is_cancelled() {
                self.mark_skipped();
                break;
            }

            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    self.report(Diagnostic::new(&path, DiagnosticKind::Metadata, err.to_string()));
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.policy.should_enter_directory(&path) {
                    self.dispatch_directory(path);
                } else {
                    debug!(dir = %path.display(), "跳过目录");
                }
            } else if file_type.is_file() {
                if !self.policy.should_analyze_file(&path) {
                    continue;
                }
                if let Some(extension) = extension_key(&path) {
                    self.dispatch_file(path, extension);
                }
            }
            // 符号链接和其它特殊文件既不跟随也不统计
        }
    }

    async fn classify_file(&self, path: PathBuf, extension: String) {
        let _permit = self.admit().await;
        if self.cancel.is_cancelled() {
            self.mark_skipped();
            return;
        }

        let tally = match count_lines(&path, self.max_line_bytes).await {
            Ok(tally) => tally,
            Err(err) => {
                self.report(Diagnostic::new(&path, err.diagnostic_kind(), err.to_string()));
                err.partial()
            }
        };

        self.emit(|| ScanEvent::FileClassified {
            path: path.clone(),
            extension: extension.clone(),
            lines: tally.non_blank,
        });

        self.totals.add(&extension, tally.non_blank);
        self.files_classified.fetch_add(1, Ordering::AcqRel);
    }

    /// 有并发上限时等待一个许可，取消时立即返回
    async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        let limiter = self.limiter.as_ref()?;
        tokio::select! {
            permit = Arc::clone(limiter).acquire_owned() => permit.ok(),
            _ = self.cancel.cancelled() => None,
        }
    }

    fn mark_skipped(&self) {
        self.skipped.store(true, Ordering::Release);
    }

    fn report(&self, diagnostic: Diagnostic) {
        warn!(kind = ?diagnostic.kind, "扫描时出错: {}", diagnostic);
        // 接收端只会在扫描结束后丢弃
        let _ = self.diagnostics.send(diagnostic);
    }

    fn emit(&self, event: impl FnOnce() -> ScanEvent) {
        if let Some(progress) = &self.progress {
            progress(event());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_scanning() {
        let temp_dir = TempDir::new().unwrap();
        let root_path = temp_dir.path();

        write(root_path, "src/main.rs", "fn main() {}\n\n");
        write(root_path, "src/lib.rs", "pub mod test;\n// doc\n");
        write(root_path, "target/debug/build.rs", "fn ignored() {}\n");
        write(root_path, "target/output.exe", "binary data");

        let scanner = ParallelFileWalker::new(false);
        let report = scanner.scan(root_path).await.unwrap();

        assert_eq!(report.lines_for(".rs"), 3);
        assert_eq!(report.totals[".rs"].files, 2);
        assert_eq!(report.stats.directories_visited, 2);
        assert_eq!(report.stats.files_classified, 2);
        assert!(report.stats.completed);
        assert!(report.diagnostics.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_progress_events() {
        let temp_dir = TempDir::new().unwrap();
        let root_path = temp_dir.path();
        write(root_path, "a/b/c/deep.py", "print(1)\n");
        write(root_path, "top.py", "x = 1\ny = 2\n");

        let events = Arc::new(Mutex::new(HashMap::<PathBuf, u64>::new()));
        let dirs = Arc::new(AtomicU64::new(0));
        let scanner = {
            let events = Arc::clone(&events);
            let dirs = Arc::clone(&dirs);
            ParallelFileWalker::new(false).with_progress(move |event| match event {
                ScanEvent::DirectoryEntered { .. } => {
                    dirs.fetch_add(1, Ordering::SeqCst);
                }
                ScanEvent::FileClassified { path, lines, .. } => {
                    events.lock().unwrap().insert(path, lines);
                }
            })
        };

        let report = scanner.scan(root_path).await.unwrap();

        assert_eq!(dirs.load(Ordering::SeqCst), 4);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[&root_path.join("top.py")], 2);
        assert_eq!(report.lines_for(".py"), 3);
    }

    #[tokio::test]
    async fn test_root_must_be_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "file.rs", "fn f() {}\n");

        let scanner = ParallelFileWalker::new(false);
        let missing = scanner.scan(&temp_dir.path().join("missing")).await;
        assert!(matches!(missing, Err(ScanError::RootUnavailable { .. })));

        let file = scanner.scan(&temp_dir.path().join("file.rs")).await;
        assert!(matches!(file, Err(ScanError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_scan_is_marked_incomplete() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/main.rs", "fn main() {}\n");

        let token = CancellationToken::new();
        token.cancel();
        let scanner = ParallelFileWalker::new(false).with_cancellation(token);

        let report = scanner.scan(temp_dir.path()).await.unwrap();
        assert!(!report.stats.completed);
        assert_eq!(report.total_lines(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_all_work_keeps_scan_complete() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "only.rs", "fn main() {}\n");

        let token = CancellationToken::new();
        let scanner = {
            let token = token.clone();
            // 唯一的文件统计完成时才取消，此时已经没有剩余的工作
            ParallelFileWalker::new(false)
                .with_cancellation(token.clone())
                .with_progress(move |event| {
                    if let ScanEvent::FileClassified { .. } = event {
                        token.cancel();
                    }
                })
        };

        let report = scanner.scan(temp_dir.path()).await.unwrap();
        assert!(token.is_cancelled());
        assert!(report.stats.completed);
        assert_eq!(report.lines_for(".rs"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_vanished_directory_leaves_siblings_intact() {
        let temp_dir = TempDir::new().unwrap();
        let root_path = temp_dir.path();
        write(root_path, "sibling/a.rs", "fn a() {}\n\nfn b() {}\n");
        write(root_path, "sibling/nested/c.rs", "fn c() {}\n");
        let missing = root_path.join("gone");

        let scanner = ParallelFileWalker::new(false).with_concurrency_limit(0);
        let (context, mut diagnostics_rx) = WalkContext::new(&scanner);
        context.dispatch_directory(missing.clone());
        context.dispatch_directory(root_path.join("sibling"));
        context.pending.wait().await;

        let mut diagnostics = Vec::new();
        while let Ok(diagnostic) = diagnostics_rx.try_recv() {
            diagnostics.push(diagnostic);
        }
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DirectoryRead);
        assert_eq!(diagnostics[0].path, missing);

        let tally = context.totals.get(".rs").unwrap();
        assert_eq!(tally.lines, 3);
        assert_eq!(tally.files, 2);
        assert_eq!(context.directories_visited.load(Ordering::Acquire), 2);
        assert!(!context.skipped.load(Ordering::Acquire));
    }
}
