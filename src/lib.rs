//! Top5 Annotator
//!
//! レコード読み込み・保存ファイル・エクスポート・対話式レビュー

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod review;
pub mod storage;
