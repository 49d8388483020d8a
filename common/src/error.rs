//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// エントリ操作の拒否理由
///
/// 不変条件を破る操作は適用されず、呼び出し側にはこの値だけが返る。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("selection is full ({0} items)")]
    SelectionFull(usize),

    #[error("item '{0}' does not belong to this record")]
    UnknownItem(String),

    #[error("item '{0}' is not selected")]
    NotSelected(String),

    #[error("item '{0}' cannot move further")]
    AtBoundary(String),

    #[error("no current record")]
    NoCurrentRecord,
}
