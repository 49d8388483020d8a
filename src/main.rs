use clap::Parser;
use std::path::PathBuf;
use top5_annotator::{cli, config, dataset, error, export, logging, review, storage};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use storage::FileKv;
use top5_annotator_common::{
    category_breakdown, Action, AnnotationStore, FilterChange, Record, Session, ALL_CATEGORIES,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Annotate { data, store, category, query } => {
            println!("📝 top5 - アノテーション\n");

            // 読み込めない場合は空のセッションで「No records.」を表示する
            let records = match dataset::load_records(&data).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!("レコード読み込み失敗: {e}");
                    Vec::<Record>::new()
                }
            };
            println!("✔ {}件のレコード", records.len());

            let store_path = config.store_path(store.as_deref())?;
            let annotations = AnnotationStore::load(FileKv::open(&store_path), config.namespace_key.clone());
            println!("✔ 保存ファイル: {} ({}件)\n", store_path.display(), annotations.len());

            let mut session =
                Session::new(records, annotations).with_search_delay(config.search_debounce());
            if category != ALL_CATEGORIES {
                session.dispatch(Action::ChangeFilter(FilterChange::Category(category)));
            }
            if !query.is_empty() {
                session.dispatch(Action::ChangeFilter(FilterChange::Query(query)));
            }

            let export_dir = config.export_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            review::run_review(&mut session, &export_dir)?;
        }

        Commands::Export { store, format, output } => {
            println!("📄 top5 - エクスポート\n");

            let store_path = config.store_path(store.as_deref())?;
            let annotations = AnnotationStore::load(FileKv::open(&store_path), config.namespace_key.clone());
            println!("- {}件のアノテーション", annotations.len());

            let output_dir = output
                .or_else(|| config.export_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            for path in export::export_annotations(annotations.entries(), &format, &output_dir)? {
                println!("✔ 出力: {}", path.display());
            }

            println!("\n✅ エクスポート完了");
        }

        Commands::Stats { data, store } => {
            let records = dataset::load_records(&data).await?;
            let store_path = config.store_path(store.as_deref())?;
            let annotations = AnnotationStore::load(FileKv::open(&store_path), config.namespace_key.clone());

            let breakdown = category_breakdown(&records, annotations.entries());
            let done: usize = breakdown.iter().map(|c| c.done).sum();
            println!("進捗: {}/{}件 完了", done, records.len());
            for c in breakdown {
                println!("  {}: {}/{}", c.category, c.done, c.total);
            }
        }

        Commands::Build { reco_dir, chat_dir, out, max_items } => {
            println!("🔧 top5 - データセット生成\n");

            let options = dataset::BuildOptions { reco_dir, chat_dir, max_items };
            let records = dataset::build_dataset(&options)?;
            dataset::write_dataset(&records, &out)?;

            println!("✔ {}件のレコードを出力: {}", records.len(), out.display());
        }

        Commands::Config { set_store, set_export_dir, show } => {
            let mut config = config;

            if let Some(path) = set_store {
                config.set_store_path(path)?;
                println!("✔ 保存ファイルを設定しました");
            }

            if let Some(path) = set_export_dir {
                config.set_export_dir(path)?;
                println!("✔ 出力先を設定しました");
            }

            if show {
                println!("設定:");
                println!("  保存ファイル: {}", config.store_path(None)?.display());
                println!("  保存キー: {}", config.namespace_key);
                println!("  検索デバウンス: {}ms", config.search_debounce_ms);
                println!(
                    "  出力先: {}",
                    config
                        .export_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "（カレント）".to_string())
                );
            }
        }

        Commands::Store { store, clear, info } => {
            let store_path = config.store_path(store.as_deref())?;

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if store_path.exists() {
                    let annotations =
                        AnnotationStore::load(FileKv::open(&store_path), config.namespace_key.clone());
                    println!("保存ファイル情報:");
                    println!("  パス: {}", store_path.display());
                    println!("  件数: {}", annotations.len());
                    println!("  完了: {}", annotations.completed_count());
                    if let Ok(meta) = std::fs::metadata(&store_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("保存ファイルが存在しません: {}", store_path.display());
                }
            }

            if clear {
                match FileKv::clear(&store_path) {
                    Ok(true) => println!("✔ 保存ファイルを削除しました: {}", store_path.display()),
                    Ok(false) => println!("保存ファイルが存在しません"),
                    Err(e) => println!("保存ファイル削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
