//! ログ初期化
//!
//! `TOP5_LOG` でフィルタ、`TOP5_LOG_FORMAT=json` でJSON出力。
//! 出力先は標準エラー（対話画面と混ざらないようにする）。

use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "top5=debug,top5_annotator=debug,top5_annotator_common=debug,info"
    } else {
        "top5=info,top5_annotator=info,warn"
    }
}

pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TOP5_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let format = env::var("TOP5_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
