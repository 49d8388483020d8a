//! レコードフィルタ
//!
//! カテゴリ完全一致 + 会話テキストの部分一致（大文字小文字無視）で
//! レコードを絞り込む。順序は元の並びを維持する。

use crate::types::{Record, ALL_CATEGORIES};
use std::collections::BTreeSet;

/// フィルタ条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub category: String,
    pub query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            query: String::new(),
        }
    }
}

impl FilterState {
    pub fn new(category: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
        }
    }

    /// 正規化済みの検索語
    fn needle(&self) -> String {
        self.query.trim().to_lowercase()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_with(record, &self.needle())
    }

    fn matches_with(&self, record: &Record, needle: &str) -> bool {
        if self.category != ALL_CATEGORIES && record.category != self.category {
            return false;
        }
        needle.is_empty() || record.search_text().to_lowercase().contains(needle)
    }
}

/// 条件に合うレコードを元の順序で返す
pub fn apply<'a, I>(records: I, filter: &FilterState) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let needle = filter.needle();
    records
        .into_iter()
        .filter(|r| filter.matches_with(r, &needle))
        .collect()
}

/// 条件に合うレコードのインデックス
pub fn matching_indices(records: &[Record], filter: &FilterState) -> Vec<usize> {
    let needle = filter.needle();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches_with(r, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// カテゴリ選択肢（"All" + 重複除去・昇順）
pub fn categories(records: &[Record]) -> Vec<String> {
    let unique: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(unique.into_iter().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: &str, text: &str) -> Record {
        Record {
            id: id.into(),
            category: category.into(),
            conversation_text: Some(text.into()),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("1", "billing", "I need a REFUND please"),
            record("2", "shipping", "Where is my refund?"),
            record("3", "billing", "Change my plan"),
            record("4", "billing", "refund for last month"),
        ]
    }

    fn ids(view: &[&Record]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_all_matches_everything() {
        let records = sample();
        let view = apply(&records, &FilterState::default());
        assert_eq!(ids(&view), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_category_and_query() {
        let records = sample();
        let filter = FilterState::new("billing", "  Refund ");
        let view = apply(&records, &filter);
        assert_eq!(ids(&view), vec!["1", "4"]);
        assert_eq!(matching_indices(&records, &filter), vec![0, 3]);
    }

    #[test]
    fn test_category_exact_match() {
        let records = sample();
        let view = apply(&records, &FilterState::new("Billing", ""));
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_idempotent() {
        let records = sample();
        let filter = FilterState::new("billing", "refund");
        let once = apply(&records, &filter);
        let twice = apply(once.iter().copied(), &filter);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_query_on_structured_conversation() {
        let json = r#"{"id": "m", "category": "c",
            "conversation": [{"role": "user", "content": "Lost PACKAGE"}]}"#;
        let records = vec![serde_json::from_str::<Record>(json).unwrap()];
        assert_eq!(apply(&records, &FilterState::new("All", "package")).len(), 1);
        assert!(apply(&records, &FilterState::new("All", "user")).is_empty());
    }

    #[test]
    fn test_categories() {
        let records = sample();
        assert_eq!(categories(&records), vec!["All", "billing", "shipping"]);
        assert_eq!(categories(&[]), vec!["All"]);
    }
}
