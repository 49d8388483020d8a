//! アノテーション編集セッション
//!
//! レビュー操作を `Action` として受け取り、単一の `dispatch` で処理する。
//! 処理の流れ:
//! 1. フィルタ条件からビュー（レコードのインデックス列）を再計算
//! 2. カーソルでビュー内の現在レコードを決定
//! 3. 現在レコードのエントリを変更し、即座にストアへ書き戻す

use crate::cursor::Cursor;
use crate::debounce::Debouncer;
use crate::entry::{AnnotationEntry, Hint, RankDirection};
use crate::error::Rejection;
use crate::filter::{self, FilterState};
use crate::stats::Stats;
use crate::store::{AnnotationStore, KeyValueStore, Persisted};
use crate::types::Record;
use std::time::{Duration, Instant};

/// ナビゲーション方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    Prev,
    Next,
}

/// フィルタ条件の変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Category(String),
    Query(String),
}

/// レビュー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Navigate),
    ToggleItem { item_id: String, on: bool },
    MoveRank { item_id: String, direction: RankDirection },
    ToggleNull(bool),
    SetReason(String),
    Clear,
    ChangeFilter(FilterChange),
}

/// 操作結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// 境界でのナビゲーションなど、何も起きなかった
    Unchanged,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub outcome: Outcome,
    /// 保存失敗時の警告
    pub warning: Option<String>,
}

impl ActionResult {
    fn applied(persisted: Persisted) -> Self {
        Self {
            outcome: Outcome::Applied,
            warning: persisted.warning().map(str::to_string),
        }
    }

    fn of(outcome: Outcome) -> Self {
        Self { outcome, warning: None }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == Outcome::Applied
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.outcome {
            Outcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

pub struct Session<S: KeyValueStore> {
    records: Vec<Record>,
    filter: FilterState,
    view: Vec<usize>,
    cursor: Cursor,
    store: AnnotationStore<S>,
    search: Debouncer<String>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(records: Vec<Record>, store: AnnotationStore<S>) -> Self {
        let mut session = Self {
            records,
            filter: FilterState::default(),
            view: Vec::new(),
            cursor: Cursor::default(),
            store,
            search: Debouncer::default(),
        };
        session.refilter();
        session
    }

    /// 検索入力の待機時間を変更
    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search = Debouncer::new(delay);
        self
    }

    pub fn search_delay(&self) -> Duration {
        self.search.delay()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn store(&self) -> &AnnotationStore<S> {
        &self.store
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// 絞り込み後のレコード
    pub fn view(&self) -> Vec<&Record> {
        self.view.iter().map(|&i| &self.records[i]).collect()
    }

    fn current_index(&self) -> Option<usize> {
        self.cursor.current(&self.view).copied()
    }

    pub fn current(&self) -> Option<&Record> {
        self.current_index().map(|i| &self.records[i])
    }

    /// 現在レコードのエントリ（未作成なら初期値）
    pub fn current_entry(&self) -> Option<AnnotationEntry> {
        self.current().map(|r| self.store.get(r))
    }

    pub fn hint(&self) -> Option<Hint> {
        self.current_entry().map(|e| e.hint())
    }

    pub fn categories(&self) -> Vec<String> {
        filter::categories(&self.records)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.records.len(),
            done: self.store.completed_count(),
            filtered: self.view.len(),
            position: self.cursor.position().map_or(0, |p| p + 1),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> ActionResult {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::Navigate(direction) => self.navigate(direction),
            Action::ToggleItem { item_id, on } => {
                self.edit(|entry, record| entry.toggle_item(record, &item_id, on))
            }
            Action::MoveRank { item_id, direction } => {
                self.edit(|entry, _| entry.move_rank(&item_id, direction))
            }
            Action::ToggleNull(on) => self.edit(|entry, _| {
                entry.set_null(on);
                Ok(())
            }),
            Action::SetReason(text) => self.edit(|entry, _| {
                entry.set_reason(text);
                Ok(())
            }),
            Action::Clear => self.edit(|entry, _| {
                entry.clear();
                Ok(())
            }),
            Action::ChangeFilter(change) => {
                // 直接の変更は保留中の検索入力より優先する
                self.search.cancel();
                match change {
                    FilterChange::Category(category) => self.filter.category = category,
                    FilterChange::Query(query) => self.filter.query = query,
                }
                self.refilter();
                ActionResult::of(Outcome::Applied)
            }
        }
    }

    /// 検索入力（キー入力ごと）。確定は `tick` で行う
    pub fn type_query(&mut self, text: impl Into<String>, now: Instant) {
        self.search.schedule(text.into(), now);
    }

    /// 待機時間を過ぎた検索入力を反映する。反映したらtrue
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(query) => {
                self.filter.query = query;
                self.refilter();
                true
            }
            None => false,
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    /// セッション終了時の最終保存
    pub fn finish(&mut self) -> Persisted {
        self.search.cancel();
        self.store.persist()
    }

    pub fn into_store(self) -> AnnotationStore<S> {
        self.store
    }

    fn refilter(&mut self) {
        self.view = filter::matching_indices(&self.records, &self.filter);
        self.cursor.reset(self.view.len());
        tracing::debug!(
            category = %self.filter.category,
            query = %self.filter.query,
            matched = self.view.len(),
            "filter applied"
        );
        self.visit();
    }

    /// 表示したレコードのエントリを用意する（保存は次の変更時）
    fn visit(&mut self) {
        if let Some(i) = self.current_index() {
            self.store.get_or_create(&self.records[i]);
        }
    }

    fn navigate(&mut self, direction: Navigate) -> ActionResult {
        let moved = match direction {
            Navigate::Prev => self.cursor.prev(),
            Navigate::Next => self.cursor.next(),
        };
        if moved {
            self.visit();
            ActionResult::of(Outcome::Applied)
        } else {
            ActionResult::of(Outcome::Unchanged)
        }
    }

    fn edit<F>(&mut self, apply: F) -> ActionResult
    where
        F: FnOnce(&mut AnnotationEntry, &Record) -> Result<(), Rejection>,
    {
        let Some(i) = self.current_index() else {
            return ActionResult::of(Outcome::Rejected(Rejection::NoCurrentRecord));
        };
        let record = &self.records[i];
        let mut entry = self.store.get(record);

        match apply(&mut entry, record) {
            Ok(()) => ActionResult::applied(self.store.put(&record.id, entry)),
            Err(rejection) => {
                tracing::debug!(record_id = %record.id, "action rejected: {rejection}");
                ActionResult::of(Outcome::Rejected(rejection))
            }
        }
    }
}
