use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::ExtensionTally;

/// 按扩展名汇总行数，所有扫描任务共享同一个实例
///
/// 读取、累加、写回在同一把锁内完成，并发累加不会丢失更新。
/// 锁不会跨越 `.await` 持有。
#[derive(Debug, Default)]
pub struct ExtensionTotals {
    inner: Mutex<HashMap<String, ExtensionTally>>,
}

impl ExtensionTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一个文件的行数累加到对应扩展名上，不存在时新建
    pub fn add(&self, extension: &str, lines: u64) {
        let mut totals = self.lock();
        match totals.get_mut(extension) {
            Some(tally) => {
                tally.lines += lines;
                tally.files += 1;
            }
            None => {
                totals.insert(extension.to_string(), ExtensionTally { lines, files: 1 });
            }
        }
    }

    pub fn get(&self, extension: &str) -> Option<ExtensionTally> {
        self.lock().get(extension).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 当前内容的稳定快照，按扩展名排序
    pub fn snapshot(&self) -> BTreeMap<String, ExtensionTally> {
        self.lock()
            .iter()
            .map(|(ext, tally)| (ext.clone(), *tally))
            .collect()
    }

    /// 扫描结束后取出全部结果
    pub fn into_snapshot(self) -> BTreeMap<String, ExtensionTally> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ExtensionTally>> {
        // 累加操作不会在持锁期间 panic，中毒后的数据依然完整
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
