//! JSON出力（共通ライブラリ）

use crate::error::Result;
use crate::store::AnnotationMap;

/// アノテーション全体を整形済みJSONにする
pub fn to_json(entries: &AnnotationMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AnnotationEntry;

    #[test]
    fn test_to_json_roundtrips_map() {
        let mut entries = AnnotationMap::new();
        entries.insert(
            "r1".into(),
            AnnotationEntry {
                selected: vec!["a".into(), "b".into()],
                category: "x".into(),
                is_null: false,
                reason: "r".into(),
            },
        );

        let json = to_json(&entries).expect("JSON生成失敗");
        assert!(json.contains('\n'), "整形済みであること");
        assert!(json.contains("\"null\": false"));

        let parsed: AnnotationMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_to_json_empty() {
        assert_eq!(to_json(&AnnotationMap::new()).unwrap(), "{}");
    }
}
