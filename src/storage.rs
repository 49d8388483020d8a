//! ファイル保存のキーバリューストア
//!
//! 1つのJSONファイルに `キー → JSON文字列` を保持する。
//! ファイルなし・読み込み失敗・バージョン不一致・破損はすべて空として扱う。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use top5_annotator_common::{KeyValueStore, Result};

/// 保存ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    values: HashMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: FileKv::CURRENT_VERSION,
            values: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileKv {
    path: PathBuf,
    file: StoreFile,
}

impl FileKv {
    const CURRENT_VERSION: u32 = 1;

    /// 保存ファイルを開く
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = Self::read(&path);
        Self { path, file }
    }

    fn read(path: &Path) -> StoreFile {
        if !path.exists() {
            return StoreFile::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("保存ファイルを開けません ({}): {e}", path.display());
                return StoreFile::default();
            }
        };

        match serde_json::from_reader::<_, StoreFile>(BufReader::new(file)) {
            Ok(store) if store.version == Self::CURRENT_VERSION => store,
            Ok(store) => {
                tracing::warn!(version = store.version, "保存ファイルのバージョン不一致、空で開始します");
                StoreFile::default()
            }
            Err(e) => {
                tracing::warn!("保存ファイルが破損しています、空で開始します: {e}");
                StoreFile::default()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.file.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.values.is_empty()
    }

    /// 保存ファイルを削除
    pub fn clear(path: &Path) -> std::io::Result<bool> {
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 一時ファイルに書き出してから置き換える（書き込み途中で元のファイルを壊さない）
    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, &self.file)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.file.values.insert(key.to_string(), value.to_string());
        self.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open(dir.path().join("none.json"));
        assert!(kv.is_empty());
        assert_eq!(kv.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut kv = FileKv::open(&path);
        kv.set("k", "v").unwrap();
        assert!(path.exists());
        assert_eq!(FileKv::open(&path).get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut kv = FileKv::open(&path);
        kv.set("k", "v1").unwrap();

        // 一時ファイルを作れない状態にする
        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        assert!(kv.set("k", "v2").is_err());

        assert_eq!(FileKv::open(&path).get("k").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        FileKv::open(&path).set("k", "v").unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_version_mismatch_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"version": 99, "values": {"k": "v"}}"#).unwrap();
        assert!(FileKv::open(&path).is_empty());
    }
}
