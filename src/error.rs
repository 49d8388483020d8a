use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("レコードを読み込めません: {0}")]
    RecordLoad(String),

    #[error("データセット生成エラー: {0}")]
    Dataset(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] top5_annotator_common::Error),
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;
