use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// エンティティIDごとのストライプドミューテックス
///
/// 変更系の操作は対象の書籍（会員削除では対象の全書籍）のロックを取って
/// 直列化される。ガードを保持している間、同じIDへの操作はブロックする。
///
/// エントリは解放されない。IDの集合は小さい前提。
#[derive(Default)]
pub struct LockRegistry {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 単一キーのロックを取得する
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        self.entry(key).lock_owned().await
    }

    /// 複数キーのロックを取得する
    ///
    /// デッドロック回避のため、キーをソート・重複排除した正規順で取得する。
    pub async fn acquire_many(&self, keys: &[String]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.entry(key).lock_owned().await);
        }
        guards
    }
}
