//! レコードの型定義
//!
//! CLIとコアで共有される読み取り専用の型:
//! - Record: アノテーション対象の会話レコード
//! - Item: レコードに紐づく推薦候補
//! - Conversation: 会話本文（メッセージ列またはテキスト）

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 1レコードあたりの最大選択数
pub const MAX_SELECTED: usize = 5;

/// カテゴリフィルタの「全件」指定
pub const ALL_CATEGORIES: &str = "All";

/// 推薦候補
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: String,
    pub title: String,
}

/// 会話メッセージ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// 会話本文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Conversation {
    Messages(Vec<Message>),
    Text(String),
    Other(serde_json::Value),
}

impl Conversation {
    /// 検索用テキスト（各メッセージの本文を改行で連結）
    pub fn search_text(&self) -> Cow<'_, str> {
        match self {
            Conversation::Messages(messages) => Cow::Owned(
                messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Conversation::Text(text) => Cow::Borrowed(text),
            Conversation::Other(value) => Cow::Owned(value.to_string()),
        }
    }
}

/// 会話レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,

    /// 平坦化済みの会話テキスト（あれば検索に優先して使う）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_text: Option<String>,

    #[serde(default)]
    pub items: Vec<Item>,
}

impl Record {
    /// 検索対象のテキスト
    pub fn search_text(&self) -> Cow<'_, str> {
        if let Some(text) = &self.conversation_text {
            return Cow::Borrowed(text);
        }
        match &self.conversation {
            Some(conversation) => conversation.search_text(),
            None => Cow::Borrowed(""),
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.item(item_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize_messages() {
        let json = r#"{
            "id": "billing:1",
            "category": "billing",
            "conversation_index": 1,
            "conversation": [
                {"role": "user", "content": "I want a refund"},
                {"role": "assistant", "content": "Sure"}
            ],
            "items": [{"id": "a", "title": "Refund guide"}]
        }"#;

        let record: Record = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(record.id, "billing:1");
        assert_eq!(record.conversation_index, Some(1));
        assert_eq!(record.items.len(), 1);
        assert!(matches!(record.conversation, Some(Conversation::Messages(ref m)) if m.len() == 2));
        assert_eq!(record.search_text(), "I want a refund\nSure");
    }

    #[test]
    fn test_record_prefers_conversation_text() {
        let record = Record {
            id: "r1".into(),
            conversation: Some(Conversation::Text("ignored".into())),
            conversation_text: Some("user: hello".into()),
            ..Default::default()
        };
        assert_eq!(record.search_text(), "user: hello");
    }

    #[test]
    fn test_record_minimal_fields() {
        let record: Record = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(record.category, "");
        assert!(record.items.is_empty());
        assert_eq!(record.search_text(), "");
    }

    #[test]
    fn test_conversation_other_value() {
        let record: Record =
            serde_json::from_str(r#"{"id": "x", "conversation": {"turns": 3}}"#).unwrap();
        assert!(matches!(record.conversation, Some(Conversation::Other(_))));
        assert!(record.search_text().contains("turns"));
    }

    #[test]
    fn test_has_item() {
        let record = Record {
            id: "r1".into(),
            items: vec![Item { id: "a".into(), title: "A".into() }],
            ..Default::default()
        };
        assert!(record.has_item("a"));
        assert!(!record.has_item("b"));
        assert_eq!(record.item("a").map(|i| i.title.as_str()), Some("A"));
    }
}
