//! アノテーションエントリと状態遷移
//!
//! 1レコード分の選択状態を保持し、操作ごとに不変条件を維持する:
//! - 選択は最大5件、重複なし
//! - NULL指定中は選択0件
//! - 完了判定は「5件選択 or NULL」かつ理由が空でないこと

use crate::error::Rejection;
use crate::types::{Record, MAX_SELECTED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// レコードごとのアノテーション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// 選択したItem IDのランク順
    #[serde(default)]
    pub selected: Vec<String>,

    /// 作成時点のレコードカテゴリ（エクスポート用）
    #[serde(default)]
    pub category: String,

    /// 該当なし
    #[serde(rename = "null", default)]
    pub is_null: bool,

    /// 判断理由
    #[serde(default)]
    pub reason: String,
}

/// エントリの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    Partial(usize),
    Full,
    Nulled,
}

/// 画面に出す進捗ヒント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// あとn件選択が必要
    NeedsMore(usize),
    SelectionComplete,
    MarkedNull,
    ReasonRequired,
}

impl Hint {
    pub fn is_complete(&self) -> bool {
        matches!(self, Hint::SelectionComplete | Hint::MarkedNull)
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::NeedsMore(n) => write!(f, "Pick {} more.", n),
            Hint::SelectionComplete => write!(f, "Selection complete."),
            Hint::MarkedNull => write!(f, "Marked as NULL (no recommendation)."),
            Hint::ReasonRequired => write!(f, "Reason required."),
        }
    }
}

/// ランク移動の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    Up,
    Down,
}

impl AnnotationEntry {
    /// レコードの初期エントリ
    pub fn for_record(record: &Record) -> Self {
        Self {
            category: record.category.clone(),
            ..Default::default()
        }
    }

    pub fn state(&self) -> EntryState {
        if self.is_null {
            return EntryState::Nulled;
        }
        match self.selected.len() {
            0 => EntryState::Empty,
            n if n >= MAX_SELECTED => EntryState::Full,
            n => EntryState::Partial(n),
        }
    }

    pub fn has_reason(&self) -> bool {
        !self.reason.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.hint().is_complete()
    }

    pub fn hint(&self) -> Hint {
        let terminal = self.selected.len() == MAX_SELECTED || self.is_null;
        if terminal && !self.has_reason() {
            Hint::ReasonRequired
        } else if self.selected.len() == MAX_SELECTED {
            Hint::SelectionComplete
        } else if self.is_null {
            Hint::MarkedNull
        } else {
            Hint::NeedsMore(MAX_SELECTED.saturating_sub(self.selected.len()))
        }
    }

    /// ランク（1始まり）
    pub fn rank_of(&self, item_id: &str) -> Option<usize> {
        self.selected.iter().position(|id| id == item_id).map(|i| i + 1)
    }

    /// 不変条件を満たすよう補正する。変更があればtrue
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        let mut seen = std::collections::HashSet::new();
        self.selected.retain(|id| seen.insert(id.clone()));
        self.selected.truncate(MAX_SELECTED);
        if !self.selected.is_empty() {
            self.is_null = false;
        }

        *self != before
    }

    /// 選択のON/OFF
    ///
    /// 6件目の選択は拒否され、エントリは変更されない。
    pub fn toggle_item(&mut self, record: &Record, item_id: &str, on: bool) -> Result<(), Rejection> {
        if !record.has_item(item_id) {
            return Err(Rejection::UnknownItem(item_id.to_string()));
        }

        if on {
            if self.selected.iter().any(|id| id == item_id) {
                return Ok(());
            }
            if self.selected.len() >= MAX_SELECTED {
                return Err(Rejection::SelectionFull(MAX_SELECTED));
            }
            self.is_null = false;
            self.selected.push(item_id.to_string());
        } else {
            self.selected.retain(|id| id != item_id);
        }
        Ok(())
    }

    pub fn move_rank(&mut self, item_id: &str, direction: RankDirection) -> Result<(), Rejection> {
        let idx = self
            .selected
            .iter()
            .position(|id| id == item_id)
            .ok_or_else(|| Rejection::NotSelected(item_id.to_string()))?;

        let target = match direction {
            RankDirection::Up if idx > 0 => idx - 1,
            RankDirection::Down if idx + 1 < self.selected.len() => idx + 1,
            _ => return Err(Rejection::AtBoundary(item_id.to_string())),
        };
        self.selected.swap(idx, target);
        Ok(())
    }

    pub fn move_up(&mut self, item_id: &str) -> Result<(), Rejection> {
        self.move_rank(item_id, RankDirection::Up)
    }

    pub fn move_down(&mut self, item_id: &str) -> Result<(), Rejection> {
        self.move_rank(item_id, RankDirection::Down)
    }

    /// NULL指定。ONにすると選択は破棄される
    pub fn set_null(&mut self, on: bool) {
        self.is_null = on;
        if on {
            self.selected.clear();
        }
    }

    /// 理由はそのまま保存する（trimは完了判定のみ）
    pub fn set_reason(&mut self, text: impl Into<String>) {
        self.reason = text.into();
    }

    /// 初期状態に戻す（カテゴリは維持）
    pub fn clear(&mut self) {
        self.selected.clear();
        self.is_null = false;
        self.reason.clear();
    }
}
