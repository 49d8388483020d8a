//! レコードデータの読み込みと生成

pub mod build;

use crate::error::{AnnotatorError, Result};
use std::collections::HashSet;
use std::path::Path;
use top5_annotator_common::Record;

pub use build::{build_dataset, conversation_to_text, write_dataset, BuildOptions};

/// レコード一覧（data.json）を非同期で読み込む
pub async fn load_records(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(AnnotatorError::FileNotFound(path.display().to_string()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AnnotatorError::RecordLoad(format!("{}: {}", path.display(), e)))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .map_err(|e| AnnotatorError::RecordLoad(format!("{}: {}", path.display(), e)))?;

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.id.as_str()) {
            tracing::warn!(record_id = %record.id, "duplicate record id");
        }
    }

    tracing::info!(count = records.len(), path = %path.display(), "records loaded");
    Ok(records)
}
