//! アノテーション用データセットの生成
//!
//! ## 処理フロー
//! 1. reco_dir の `top20_<カテゴリ>.jsonl` をファイル名順に走査
//! 2. 同じカテゴリの会話ファイル `<カテゴリ>.jsonl` と行番号で対応付け
//! 3. 候補（llm_top20_items）を `{id, title}` に縮約してレコード化

use crate::error::{AnnotatorError, Result};
use regex::Regex;
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use top5_annotator_common::{Conversation, Item, Record};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// `top20_<カテゴリ>.jsonl` のあるフォルダ
    pub reco_dir: PathBuf,
    /// `<カテゴリ>.jsonl` のあるフォルダ
    pub chat_dir: PathBuf,
    /// 最大レコード数
    pub max_items: Option<usize>,
}

/// 推薦ファイル名からカテゴリを取り出す
fn reco_category(file_name: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref RECO_RE: Regex = Regex::new(r"^top20_(.+)\.jsonl$").unwrap();
    }
    RECO_RE
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// JSONLを読み込む（空行・不正行はスキップ）
fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    let file = std::fs::File::open(path)?;
    let mut rows = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(value) => rows.push(value),
            Err(e) => tracing::debug!(path = %path.display(), "skip invalid jsonl line: {e}"),
        }
    }
    Ok(rows)
}

fn value_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 会話を1つのテキストにする
///
/// メッセージ列は `role: content` を改行で連結、それ以外はJSON文字列。
pub fn conversation_to_text(conversation: &Value) -> String {
    let Value::Array(messages) = conversation else {
        return conversation.to_string();
    };

    messages
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|msg| {
            let role = value_to_string(msg.get("role"));
            let content = value_to_string(msg.get("content"));
            let (role, content) = (role.trim(), content.trim());
            match (role.is_empty(), content.is_empty()) {
                (false, false) => Some(format!("{}: {}", role, content)),
                (true, false) => Some(content.to_string()),
                _ => None,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_items(reco_row: &Value) -> Vec<Item> {
    reco_row
        .get("llm_top20_items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|it| Item {
                    id: value_to_string(it.get("id")),
                    title: value_to_string(it.get("title")),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// 推薦ファイル一覧（ファイル名順）
fn reco_files(reco_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !reco_dir.is_dir() {
        return Err(AnnotatorError::FolderNotFound(reco_dir.display().to_string()));
    }

    let mut files: Vec<(String, PathBuf)> = WalkDir::new(reco_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            reco_category(&name).map(|category| (category, e.path().to_path_buf()))
        })
        .collect();

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// データセットを生成
pub fn build_dataset(options: &BuildOptions) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let limit_reached = |n: usize| options.max_items.is_some_and(|max| n >= max);

    for (category, reco_path) in reco_files(&options.reco_dir)? {
        if limit_reached(records.len()) {
            break;
        }

        let chat_path = options.chat_dir.join(format!("{}.jsonl", category));
        if !chat_path.exists() {
            tracing::debug!(category = %category, "no chat file, skipping");
            continue;
        }

        let chat_rows = read_jsonl(&chat_path)?;
        for (idx, reco_row) in read_jsonl(&reco_path)?.iter().enumerate() {
            let Some(chat_row) = chat_rows.get(idx) else {
                break;
            };
            let conversation = chat_row.get("conversation").unwrap_or(chat_row);
            let index = idx + 1;

            records.push(Record {
                id: format!("{}:{}", category, index),
                category: category.clone(),
                conversation_index: Some(index),
                conversation: serde_json::from_value::<Conversation>(conversation.clone()).ok(),
                conversation_text: Some(conversation_to_text(conversation)),
                items: extract_items(reco_row),
            });

            if limit_reached(records.len()) {
                break;
            }
        }
    }

    if records.is_empty() {
        tracing::warn!(reco_dir = %options.reco_dir.display(), "no records built");
    }
    Ok(records)
}

/// データセットをJSONで書き出す
pub fn write_dataset(records: &[Record], out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string(records)
        .map_err(|e| AnnotatorError::Dataset(e.to_string()))?;
    std::fs::write(out, json)?;
    tracing::info!(count = records.len(), out = %out.display(), "dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reco_category() {
        assert_eq!(reco_category("top20_Billing.jsonl").as_deref(), Some("Billing"));
        assert_eq!(reco_category("top20_a_b.jsonl").as_deref(), Some("a_b"));
        assert_eq!(reco_category("Billing.jsonl"), None);
        assert_eq!(reco_category("top20_.jsonl"), None);
    }

    #[test]
    fn test_conversation_to_text() {
        let conv = json!([
            {"role": " user ", "content": " hi "},
            {"role": "", "content": "anonymous"},
            {"role": "assistant", "content": ""},
            "not a message",
        ]);
        assert_eq!(conversation_to_text(&conv), "user: hi\nanonymous");
        assert_eq!(conversation_to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_items() {
        let row = json!({"llm_top20_items": [{"id": "x", "title": "X"}, 3, {"id": 7}]});
        let items = extract_items(&row);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "7");
        assert_eq!(items[1].title, "");
        assert!(extract_items(&json!({})).is_empty());
    }
}
