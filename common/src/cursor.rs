//! 絞り込み結果の中の現在位置

/// ナビゲーションカーソル
///
/// 位置は常に `[0, len)` の範囲、空のビューでは `None`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    position: Option<usize>,
    len: usize,
}

impl Cursor {
    pub fn new(view_len: usize) -> Self {
        let mut cursor = Self::default();
        cursor.reset(view_len);
        cursor
    }

    /// フィルタ変更時に先頭へ戻す
    pub fn reset(&mut self, view_len: usize) {
        self.len = view_len;
        self.position = if view_len > 0 { Some(0) } else { None };
    }

    /// 次へ（末尾では何もしない）。移動したらtrue
    pub fn next(&mut self) -> bool {
        match self.position {
            Some(pos) if pos + 1 < self.len => {
                self.position = Some(pos + 1);
                true
            }
            _ => false,
        }
    }

    /// 前へ（先頭では何もしない）。移動したらtrue
    pub fn prev(&mut self) -> bool {
        match self.position {
            Some(pos) if pos > 0 => {
                self.position = Some(pos - 1);
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current<'a, T>(&self, view: &'a [T]) -> Option<&'a T> {
        self.position.and_then(|pos| view.get(pos))
    }
}
