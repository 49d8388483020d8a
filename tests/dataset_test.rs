//! データセット生成テスト
//!
//! 推薦JSONLと会話JSONLからレコードJSONを生成する流れを検証

use std::path::Path;
use tempfile::tempdir;
use top5_annotator::dataset::{self, BuildOptions};
use top5_annotator_common::Conversation;

fn write_lines(path: &Path, lines: &[&str]) {
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn setup(root: &Path) -> BuildOptions {
    let reco_dir = root.join("reco");
    let chat_dir = root.join("chat");
    std::fs::create_dir_all(&reco_dir).unwrap();
    std::fs::create_dir_all(&chat_dir).unwrap();

    write_lines(
        &reco_dir.join("top20_Billing.jsonl"),
        &[
            r#"{"llm_top20_items": [{"id": "b1", "title": "Refund policy"}, {"id": "b2", "title": "Invoices"}]}"#,
            "",
            "not json",
            r#"{"llm_top20_items": [{"id": "b3"}]}"#,
            r#"{"llm_top20_items": []}"#,
        ],
    );
    write_lines(
        &chat_dir.join("Billing.jsonl"),
        &[
            r#"{"conversation": [{"role": "user", "content": "I need a refund"}, {"role": "assistant", "content": "OK"}]}"#,
            r#"{"conversation": "plain text chat"}"#,
        ],
    );
    // 会話ファイルがないカテゴリはスキップ
    write_lines(&reco_dir.join("top20_Orphan.jsonl"), &[r#"{"llm_top20_items": []}"#]);
    write_lines(&reco_dir.join("notes.txt"), &["ignored"]);

    BuildOptions { reco_dir, chat_dir, max_items: None }
}

#[test]
fn test_build_dataset() {
    let dir = tempdir().expect("Failed to create temp dir");
    let options = setup(dir.path());

    let records = dataset::build_dataset(&options).expect("生成失敗");

    // 会話が2行しかないので3行目以降は対応付けない
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.id, "Billing:1");
    assert_eq!(first.category, "Billing");
    assert_eq!(first.conversation_index, Some(1));
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].title, "Refund policy");
    assert_eq!(
        first.conversation_text.as_deref(),
        Some("user: I need a refund\nassistant: OK")
    );
    assert!(matches!(first.conversation, Some(Conversation::Messages(_))));

    let second = &records[1];
    assert_eq!(second.id, "Billing:2");
    assert_eq!(second.items[0].id, "b3");
    assert_eq!(second.items[0].title, "");
    assert_eq!(second.conversation_text.as_deref(), Some("\"plain text chat\""));
}

#[test]
fn test_build_dataset_max_items() {
    let dir = tempdir().expect("Failed to create temp dir");
    let options = BuildOptions { max_items: Some(1), ..setup(dir.path()) };

    let records = dataset::build_dataset(&options).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_write_then_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let options = setup(dir.path());
    let out = dir.path().join("docs").join("data.json");

    let records = dataset::build_dataset(&options).unwrap();
    dataset::write_dataset(&records, &out).expect("書き出し失敗");

    let loaded = dataset::load_records(&out).await.expect("読み込み失敗");
    assert_eq!(loaded, records);
}
