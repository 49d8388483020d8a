//! 対話式アノテーションモジュール
//!
//! 1行入力のコマンドを `Action` に変換してセッションへ渡し、
//! 操作のたびに現在レコードを再表示する。

use crate::cli::ExportFormat;
use crate::error::{AnnotatorError, Result};
use crate::export;
use dialoguer::Input;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;
use top5_annotator_common::{
    Action, Conversation, FilterChange, KeyValueStore, Navigate, Outcome, RankDirection, Record,
    Rejection, Session, ALL_CATEGORIES,
};

pub const HELP: &str = "操作: [Enter/n]次 [p]前 [番号]選択切替 [t ID|#番号]選択切替 [u ID|#番号]上へ [d ID|#番号]下へ \
[x]NULL切替 [r 理由]理由入力 [c]クリア [cat カテゴリ]絞込 [/ 検索語]検索 [e json|csv|both]出力 [q]終了";

/// 候補の指定（表示番号またはItem ID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Index(usize),
    Id(String),
}

impl ItemRef {
    /// `t`/`u`/`d` の引数。`#番号` は表示番号、それ以外はIDとして扱う
    fn parse(s: &str) -> Self {
        match s.strip_prefix('#').map(str::parse::<usize>) {
            Some(Ok(n)) => ItemRef::Index(n),
            _ => ItemRef::Id(s.to_string()),
        }
    }

    fn index_to_id(record: &Record, n: usize) -> Option<String> {
        n.checked_sub(1)
            .and_then(|i| record.items.get(i))
            .map(|item| item.id.clone())
    }

    /// 現在レコードのItem IDに解決
    ///
    /// IDが完全一致すればそれを優先し、数字だけのIDでなければ表示番号として扱う。
    fn resolve(&self, record: &Record) -> Option<String> {
        match self {
            ItemRef::Index(n) => Self::index_to_id(record, *n),
            ItemRef::Id(id) if record.has_item(id) => Some(id.clone()),
            ItemRef::Id(id) => match id.parse::<usize>() {
                Ok(n) => Self::index_to_id(record, n),
                Err(_) => Some(id.clone()),
            },
        }
    }
}

/// 対話コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Next,
    Prev,
    Toggle(ItemRef),
    MoveUp(ItemRef),
    MoveDown(ItemRef),
    ToggleNull,
    Reason(String),
    Clear,
    Category(String),
    Search(String),
    Export(ExportFormat),
    Help,
    Quit,
}

/// 1行の入力をコマンドに変換
pub fn parse_command(input: &str) -> std::result::Result<ReviewCommand, String> {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match head {
        "" | "n" => ReviewCommand::Next,
        "p" => ReviewCommand::Prev,
        "x" => ReviewCommand::ToggleNull,
        "c" => ReviewCommand::Clear,
        "h" | "?" => ReviewCommand::Help,
        "q" | "Q" => ReviewCommand::Quit,
        // 理由は入力どおり保存する
        "r" => {
            let after = input.trim_start().get(1..).unwrap_or("");
            let text = after
                .strip_prefix(|c: char| c.is_whitespace())
                .unwrap_or(after)
                .trim_end_matches(['\r', '\n']);
            ReviewCommand::Reason(text.to_string())
        }
        "t" | "u" | "d" if rest.is_empty() => {
            return Err(format!("'{}' には候補の番号かIDが必要です", head));
        }
        "t" => ReviewCommand::Toggle(ItemRef::parse(rest)),
        "u" => ReviewCommand::MoveUp(ItemRef::parse(rest)),
        "d" => ReviewCommand::MoveDown(ItemRef::parse(rest)),
        "cat" if rest.is_empty() => ReviewCommand::Category(ALL_CATEGORIES.to_string()),
        "cat" => ReviewCommand::Category(rest.to_string()),
        "/" => ReviewCommand::Search(rest.to_string()),
        "e" => ReviewCommand::Export(if rest.is_empty() {
            ExportFormat::Both
        } else {
            rest.parse()?
        }),
        _ if head.starts_with('/') => ReviewCommand::Search(trimmed[1..].trim().to_string()),
        _ if rest.is_empty() => match head.parse::<usize>() {
            Ok(n) => ReviewCommand::Toggle(ItemRef::Index(n)),
            Err(_) => return Err(format!("不明なコマンド: {}", trimmed)),
        },
        _ => return Err(format!("不明なコマンド: {}", trimmed)),
    };
    Ok(command)
}

/// コマンド実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// 再表示のみ
    Render,
    Message(String),
    Quit,
}

fn rejection_message(rejection: &Rejection) -> String {
    match rejection {
        Rejection::SelectionFull(n) => format!("✗ 選択は最大{}件です", n),
        Rejection::UnknownItem(id) => format!("✗ このレコードに候補 '{}' はありません", id),
        Rejection::NotSelected(id) => format!("✗ 候補 '{}' は選択されていません", id),
        Rejection::AtBoundary(id) => format!("✗ 候補 '{}' はこれ以上移動できません", id),
        Rejection::NoCurrentRecord => "✗ レコードがありません".to_string(),
    }
}

/// コマンドを `Action` に変換
fn to_action<S: KeyValueStore>(
    session: &Session<S>,
    command: &ReviewCommand,
) -> std::result::Result<Option<Action>, String> {
    let current = session.current();
    let resolve = |item: &ItemRef| -> std::result::Result<String, String> {
        let record = current.ok_or_else(|| rejection_message(&Rejection::NoCurrentRecord))?;
        item.resolve(record)
            .ok_or_else(|| format!("✗ 候補番号が範囲外です: {:?}", item))
    };

    let action = match command {
        ReviewCommand::Next => Action::Navigate(Navigate::Next),
        ReviewCommand::Prev => Action::Navigate(Navigate::Prev),
        ReviewCommand::Toggle(item) => {
            let item_id = resolve(item)?;
            let on = session
                .current_entry()
                .map_or(true, |e| e.rank_of(&item_id).is_none());
            Action::ToggleItem { item_id, on }
        }
        ReviewCommand::MoveUp(item) => Action::MoveRank {
            item_id: resolve(item)?,
            direction: RankDirection::Up,
        },
        ReviewCommand::MoveDown(item) => Action::MoveRank {
            item_id: resolve(item)?,
            direction: RankDirection::Down,
        },
        ReviewCommand::ToggleNull => {
            let on = session.current_entry().map_or(true, |e| !e.is_null);
            Action::ToggleNull(on)
        }
        ReviewCommand::Reason(text) => Action::SetReason(text.clone()),
        ReviewCommand::Clear => Action::Clear,
        ReviewCommand::Category(category) => {
            Action::ChangeFilter(FilterChange::Category(category.clone()))
        }
        ReviewCommand::Export(_) | ReviewCommand::Search(_) | ReviewCommand::Help | ReviewCommand::Quit => return Ok(None),
    };
    Ok(Some(action))
}

/// コマンドを実行
pub fn execute<S: KeyValueStore>(
    session: &mut Session<S>,
    command: ReviewCommand,
    export_dir: &Path,
) -> Result<Feedback> {
    match &command {
        ReviewCommand::Quit => return Ok(Feedback::Quit),
        ReviewCommand::Help => return Ok(Feedback::Message(HELP.to_string())),
        ReviewCommand::Search(query) => {
            apply_search(session, query);
            return Ok(Feedback::Render);
        }
        ReviewCommand::Export(format) => {
            let written = export::export_annotations(session.store().entries(), format, export_dir)?;
            let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
            return Ok(Feedback::Message(format!("✔ 出力: {}", paths.join(", "))));
        }
        _ => {}
    }

    let action = match to_action(session, &command) {
        Ok(Some(action)) => action,
        Ok(None) => return Ok(Feedback::Render),
        Err(message) => return Ok(Feedback::Message(message)),
    };

    let result = session.dispatch(action);
    if let Some(warning) = &result.warning {
        return Ok(Feedback::Message(format!("⚠ 保存に失敗しました: {}", warning)));
    }
    match &result.outcome {
        Outcome::Applied => Ok(Feedback::Render),
        Outcome::Unchanged => Ok(Feedback::Message("- 移動できません".to_string())),
        Outcome::Rejected(rejection) => Ok(Feedback::Message(rejection_message(rejection))),
    }
}

/// 検索語を入力として渡し、待機時間が過ぎてから反映する
fn apply_search<S: KeyValueStore>(session: &mut Session<S>, query: &str) {
    session.type_query(query, Instant::now());
    std::thread::sleep(session.search_delay());
    session.tick(Instant::now());
}

fn render_conversation(out: &mut String, record: &Record) {
    match &record.conversation {
        Some(Conversation::Messages(messages)) => {
            for msg in messages {
                let role = msg.role.trim().to_uppercase();
                let role = if role.is_empty() { "UNKNOWN".to_string() } else { role };
                let _ = writeln!(out, "  {}: {}", role, msg.content);
            }
        }
        _ => {
            let _ = writeln!(out, "  {}", record.search_text());
        }
    }
}

/// 現在レコードの表示
pub fn render<S: KeyValueStore>(session: &Session<S>) -> String {
    let mut out = String::new();
    let stats = session.stats();
    let _ = writeln!(
        out,
        "[{}/{}] 全{}件 完了{}件 カテゴリ: {}",
        stats.position,
        stats.filtered,
        stats.total,
        stats.done,
        session.filter().category
    );

    let (Some(record), Some(entry)) = (session.current(), session.current_entry()) else {
        out.push_str("No records.\n");
        return out;
    };

    let _ = writeln!(out, "📋 {} ({})", record.id, record.category);
    render_conversation(&mut out, record);
    out.push_str("---\n");

    let mark = |checked: bool| if checked { "[x]" } else { "[ ]" };
    let _ = writeln!(out, "{} 0. NULL (no suitable recommendation)", mark(entry.is_null));
    for (i, item) in record.items.iter().enumerate() {
        let rank = entry.rank_of(&item.id);
        let title = if item.title.is_empty() { "(no title)" } else { item.title.as_str() };
        let badge = rank.map(|r| format!(" #{}", r)).unwrap_or_default();
        let _ = writeln!(out, "{} {}. {} ({}){}", mark(rank.is_some()), i + 1, title, item.id, badge);
    }

    let _ = writeln!(out, "理由: {}", entry.reason);
    let _ = writeln!(out, "→ {}", entry.hint());
    out
}

/// 対話ループ
pub fn run_review<S: KeyValueStore>(session: &mut Session<S>, export_dir: &Path) -> Result<()> {
    println!("{}\n", HELP);

    loop {
        println!("{}", render(session));

        if session.current().is_none() && session.records().is_empty() {
            break;
        }

        let input: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AnnotatorError::Prompt(e.to_string()))?;

        let command = match parse_command(&input) {
            Ok(command) => command,
            Err(message) => {
                println!("  {}\n", message);
                continue;
            }
        };

        match execute(session, command, export_dir)? {
            Feedback::Render => {}
            Feedback::Message(message) => println!("  {}\n", message),
            Feedback::Quit => break,
        }
    }

    if let Some(warning) = session.finish().warning() {
        println!("⚠ 保存に失敗しました: {}", warning);
    } else {
        println!("✓ 保存しました");
    }
    Ok(())
}
