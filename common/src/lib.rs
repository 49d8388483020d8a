//! Top5 Annotator Common Library
//!
//! CLIとレビューセッションで共有される型と状態遷移

pub mod cursor;
pub mod debounce;
pub mod editor;
pub mod entry;
pub mod error;
pub mod export;
pub mod filter;
pub mod stats;
pub mod store;
pub mod types;

pub use cursor::Cursor;
pub use debounce::Debouncer;
pub use editor::{Action, ActionResult, FilterChange, Navigate, Outcome, Session};
pub use entry::{AnnotationEntry, EntryState, Hint, RankDirection};
pub use error::{Error, Rejection, Result};
pub use filter::{categories, FilterState};
pub use stats::{category_breakdown, CategoryStats, Stats};
pub use store::{AnnotationMap, AnnotationStore, KeyValueStore, MemoryKv, Persisted, DEFAULT_NAMESPACE_KEY};
pub use types::{Conversation, Item, Message, Record, ALL_CATEGORIES, MAX_SELECTED};
