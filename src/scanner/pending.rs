use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// 未完成任务计数器
///
/// 每个派发出去的任务在派发前登记一次，任务结束时（包括 panic 或被取消）
/// 由 [`WorkGuard`] 注销。子任务总是在父任务结束前登记，所以计数只会在
/// 整棵树处理完毕时归零。
#[derive(Debug, Default)]
pub struct PendingWork {
    count: AtomicUsize,
    idle: Notify,
}

/// 任务结束时自动注销
#[derive(Debug)]
#[must_use = "guard 被丢弃时任务即视为完成"]
pub struct WorkGuard {
    pending: Arc<PendingWork>,
}

impl PendingWork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 登记一个新任务
    pub fn register(self: &Arc<Self>) -> WorkGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            pending: Arc::clone(self),
        }
    }

    /// 当前未完成的任务数
    pub fn outstanding(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// 等待直到所有已登记的任务都完成
    pub async fn wait(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // 先注册唤醒再检查计数，避免错过归零通知
            notified.as_mut().enable();

            if self.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish_one(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.pending.finish_one();
    }
}
