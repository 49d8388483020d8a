//! アノテーションストア
//!
//! レコードID → エントリのマップを保持し、変更のたびにマップ全体を
//! キーバリューストアへJSONとして書き出す。
//! 読み込み時の破損データは「作業なし」として空マップで再開する。

use crate::entry::AnnotationEntry;
use crate::error::Result;
use crate::types::Record;
use std::collections::HashMap;

/// 既定の保存キー
pub const DEFAULT_NAMESPACE_KEY: &str = "top5_annotations_v1";

/// レコードID → エントリ
pub type AnnotationMap = HashMap<String, AnnotationEntry>;

/// 永続化先のキーバリューストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// メモリ上のストア（テスト・一時セッション用）
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut kv = Self::default();
        kv.values.insert(key.to_string(), value.to_string());
        kv
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 書き込み結果
///
/// 失敗しても致命的ではなく、メモリ上の状態がセッション中は正となる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Saved,
    Failed(String),
}

impl Persisted {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Persisted::Saved => None,
            Persisted::Failed(msg) => Some(msg),
        }
    }
}

pub struct AnnotationStore<S: KeyValueStore> {
    backend: S,
    key: String,
    entries: AnnotationMap,
}

impl<S: KeyValueStore> AnnotationStore<S> {
    /// ストアから読み込み（キーなし・破損時は空）
    pub fn load(backend: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = Self::read_entries(&backend, &key);
        tracing::debug!(key = %key, entries = entries.len(), "annotation store loaded");
        Self { backend, key, entries }
    }

    fn read_entries(backend: &S, key: &str) -> AnnotationMap {
        let raw = match backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AnnotationMap::new(),
            Err(e) => {
                tracing::warn!("annotation store unreadable, starting empty: {e}");
                return AnnotationMap::new();
            }
        };

        match serde_json::from_str::<AnnotationMap>(&raw) {
            Ok(mut entries) => {
                for entry in entries.values_mut() {
                    entry.normalize();
                }
                entries
            }
            Err(e) => {
                tracing::warn!("annotation store corrupted, starting empty: {e}");
                AnnotationMap::new()
            }
        }
    }

    /// 既存エントリまたは初期エントリ（書き戻しはしない）
    pub fn get(&self, record: &Record) -> AnnotationEntry {
        self.entries
            .get(&record.id)
            .cloned()
            .unwrap_or_else(|| AnnotationEntry::for_record(record))
    }

    /// エントリがなければメモリ上に作成する
    pub fn get_or_create(&mut self, record: &Record) -> &AnnotationEntry {
        self.entries
            .entry(record.id.clone())
            .or_insert_with(|| AnnotationEntry::for_record(record))
    }

    pub fn entry(&self, record_id: &str) -> Option<&AnnotationEntry> {
        self.entries.get(record_id)
    }

    /// 補正して保存し、マップ全体を書き出す
    pub fn put(&mut self, record_id: &str, mut entry: AnnotationEntry) -> Persisted {
        if entry.normalize() {
            tracing::debug!(record_id, "entry normalized before store");
        }
        self.entries.insert(record_id.to_string(), entry);
        self.persist()
    }

    /// マップ全体を書き出す（セッション終了時の最終保存にも使う）
    pub fn persist(&mut self) -> Persisted {
        let result = serde_json::to_string(&self.entries)
            .map_err(crate::error::Error::from)
            .and_then(|blob| self.backend.set(&self.key, &blob));

        match result {
            Ok(()) => Persisted::Saved,
            Err(e) => {
                tracing::warn!("failed to persist annotations: {e}");
                Persisted::Failed(e.to_string())
            }
        }
    }

    pub fn entries(&self) -> &AnnotationMap {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 完了済みエントリ数
    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_complete()).count()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Item;

    fn record(id: &str) -> Record {
        Record {
            id: id.into(),
            category: "billing".into(),
            items: vec![Item { id: "a".into(), title: "A".into() }],
            ..Default::default()
        }
    }

    struct FailingKv;

    impl KeyValueStore for FailingKv {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Config("backend offline".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Config("disk full".into()))
        }
    }

    #[test]
    fn test_load_missing_key() {
        let store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupted_value() {
        let kv = MemoryKv::with_value(DEFAULT_NAMESPACE_KEY, "{ invalid json }");
        let store = AnnotationStore::load(kv, DEFAULT_NAMESPACE_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_wrong_shape() {
        let kv = MemoryKv::with_value(DEFAULT_NAMESPACE_KEY, "[1, 2, 3]");
        let store = AnnotationStore::load(kv, DEFAULT_NAMESPACE_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_unreadable_backend() {
        let store = AnnotationStore::load(FailingKv, DEFAULT_NAMESPACE_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_returns_default_without_writing() {
        let store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        let entry = store.get(&record("r1"));
        assert_eq!(entry.category, "billing");
        assert!(store.entry("r1").is_none());
    }

    #[test]
    fn test_get_or_create() {
        let mut store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        store.get_or_create(&record("r1"));
        assert_eq!(store.len(), 1);
        // メモリ上のみで、まだ書き出されていない
        assert_eq!(store.backend().get(DEFAULT_NAMESPACE_KEY).unwrap(), None);
    }

    #[test]
    fn test_put_persists_whole_map() {
        let mut store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        let mut entry = store.get(&record("r1"));
        entry.selected.push("a".into());
        assert_eq!(store.put("r1", entry), Persisted::Saved);
        store.put("r2", AnnotationEntry::for_record(&record("r2")));

        let reloaded = AnnotationStore::load(store.into_backend(), DEFAULT_NAMESPACE_KEY);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entry("r1").unwrap().selected, vec!["a"]);
    }

    #[test]
    fn test_put_normalizes() {
        let mut store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        let entry = AnnotationEntry {
            selected: (0..8).map(|i| format!("i{}", i)).collect(),
            is_null: true,
            ..Default::default()
        };
        store.put("r1", entry);
        let stored = store.entry("r1").unwrap();
        assert_eq!(stored.selected.len(), 5);
        assert!(!stored.is_null);
    }

    #[test]
    fn test_put_failure_is_warning() {
        let mut store = AnnotationStore::load(FailingKv, DEFAULT_NAMESPACE_KEY);
        let outcome = store.put("r1", AnnotationEntry::default());
        assert!(outcome.warning().unwrap().contains("disk full"));
        // メモリ上の状態は維持される
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_completed_count() {
        let mut store = AnnotationStore::load(MemoryKv::new(), DEFAULT_NAMESPACE_KEY);
        store.put(
            "done",
            AnnotationEntry { is_null: true, reason: "none".into(), ..Default::default() },
        );
        store.put("nulled_no_reason", AnnotationEntry { is_null: true, ..Default::default() });
        store.put("empty", AnnotationEntry::default());
        assert_eq!(store.completed_count(), 1);
    }
}
