//! 進捗集計

use crate::store::AnnotationMap;
use crate::types::Record;
use std::collections::BTreeMap;

/// 画面上部の進捗表示
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// 全レコード数
    pub total: usize,
    /// 完了エントリ数
    pub done: usize,
    /// 絞り込み後の件数
    pub filtered: usize,
    /// 現在位置（1始まり、空なら0）
    pub position: usize,
}

/// カテゴリ別の進捗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: String,
    pub total: usize,
    pub done: usize,
}

/// カテゴリ別に集計（カテゴリ名の昇順）
pub fn category_breakdown(records: &[Record], entries: &AnnotationMap) -> Vec<CategoryStats> {
    let mut by_category: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let counts = by_category.entry(record.category.as_str()).or_default();
        counts.0 += 1;
        if entries.get(&record.id).is_some_and(|e| e.is_complete()) {
            counts.1 += 1;
        }
    }

    by_category
        .into_iter()
        .map(|(category, (total, done))| CategoryStats {
            category: category.to_string(),
            total,
            done,
        })
        .collect()
}
