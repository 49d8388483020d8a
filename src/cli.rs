use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "top5")]
#[command(about = "会話レコードの推薦Top5アノテーションツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レコードを対話的にアノテーション
    Annotate {
        /// レコードJSONファイル（data.json）
        #[arg(required = true)]
        data: PathBuf,

        /// 保存ファイル（省略時は設定値）
        #[arg(long)]
        store: Option<PathBuf>,

        /// 開始時のカテゴリ
        #[arg(short, long, default_value = "All")]
        category: String,

        /// 開始時の検索語
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// アノテーションをJSON/CSVに出力
    Export {
        /// 保存ファイル（省略時は設定値）
        #[arg(long)]
        store: Option<PathBuf>,

        /// 出力形式 (json/csv/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 進捗を表示
    Stats {
        /// レコードJSONファイル
        #[arg(required = true)]
        data: PathBuf,

        /// 保存ファイル（省略時は設定値）
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// 推薦結果と会話ログからレコードJSONを生成
    Build {
        /// top20_<カテゴリ>.jsonl のフォルダ
        #[arg(long, default_value = "dataset/reco_by_category")]
        reco_dir: PathBuf,

        /// <カテゴリ>.jsonl のフォルダ
        #[arg(long, default_value = "dataset/chat/by_category")]
        chat_dir: PathBuf,

        /// 出力JSONファイル
        #[arg(short, long, default_value = "docs/data.json")]
        out: PathBuf,

        /// 最大レコード数（動作確認用）
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// 保存ファイルを設定
        #[arg(long)]
        set_store: Option<PathBuf>,

        /// 既定の出力先を設定
        #[arg(long)]
        set_export_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 保存ファイル管理
    Store {
        /// 保存ファイル（省略時は設定値）
        #[arg(long)]
        store: Option<PathBuf>,

        /// 保存ファイルを削除
        #[arg(long)]
        clear: bool,

        /// 保存ファイル情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, csv, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
