use crate::error::{AnnotatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use top5_annotator_common::DEFAULT_NAMESPACE_KEY;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// アノテーション保存ファイル
    pub store_path: Option<PathBuf>,
    /// 保存キー
    pub namespace_key: String,
    /// 検索入力のデバウンス（ミリ秒）
    pub search_debounce_ms: u64,
    /// エクスポート先ディレクトリ
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            namespace_key: DEFAULT_NAMESPACE_KEY.into(),
            search_debounce_ms: 200,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("top5-annotator"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 保存ファイルの解決（CLI指定 > 設定 > 既定）
    pub fn store_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        Ok(Self::config_dir()?.join("annotations.json"))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn set_store_path(&mut self, path: PathBuf) -> Result<()> {
        self.store_path = Some(path);
        self.save()
    }

    pub fn set_export_dir(&mut self, path: PathBuf) -> Result<()> {
        self.export_dir = Some(path);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.namespace_key, "top5_annotations_v1");
        assert_eq!(config.search_debounce(), Duration::from_millis(200));
    }

    #[test]
    fn test_store_path_precedence() {
        let config = Config {
            store_path: Some(PathBuf::from("/data/store.json")),
            ..Default::default()
        };
        assert_eq!(
            config.store_path(Some(Path::new("cli.json"))).unwrap(),
            PathBuf::from("cli.json")
        );
        assert_eq!(config.store_path(None).unwrap(), PathBuf::from("/data/store.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"search_debounce_ms": 50}"#).unwrap();
        assert_eq!(config.search_debounce_ms, 50);
        assert_eq!(config.namespace_key, DEFAULT_NAMESPACE_KEY);
    }
}
