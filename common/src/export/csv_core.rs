//! CSV出力（共通ライブラリ）
//!
//! 1エントリ1行。全フィールドをダブルクォートで囲み、
//! フィールド内の `"` は `""` にエスケープする。

use crate::entry::AnnotationEntry;
use crate::store::AnnotationMap;

pub const CSV_HEADER: &str = "record_id,category,is_null,item_ids";

/// 選択IDの区切り文字
pub const ITEM_DELIMITER: &str = "|";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// 1行分（改行なし）
pub fn csv_row(record_id: &str, entry: &AnnotationEntry) -> String {
    let is_null = if entry.is_null { "1" } else { "0" };
    let item_ids = entry.selected.join(ITEM_DELIMITER);
    [record_id, entry.category.as_str(), is_null, item_ids.as_str()]
        .iter()
        .map(|f| quote(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// ヘッダー付きCSV。行順はマップの走査順
pub fn to_csv(entries: &AnnotationMap) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (record_id, entry) in entries {
        out.push_str(&csv_row(record_id, entry));
        out.push('\n');
    }
    out
}
