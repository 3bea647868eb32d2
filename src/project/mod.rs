// src/project/mod.rs

//! Per-project persistence: the JSON record, history trimming and the
//! `.gitignore` entry that keeps the record out of version control.

pub mod gitignore;
pub mod history;
pub mod store;

pub use gitignore::ensure_gitignore_entry;
pub use history::{DEFAULT_HISTORY_LIMIT, trim_history};
pub use store::{CONFIG_FILE_NAME, ProjectStore};
