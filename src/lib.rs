// TodoStore - To-do list state with a durable key-value mirror

pub mod config;
pub mod durable;
pub mod file;
pub mod models;
pub mod snapshot;
pub mod store;
pub mod tasks;
pub mod theme;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use durable::{DurableStore, MemoryStore, TASKS_KEY, THEME_KEY};
pub use file::FileStore;
pub use models::{EditSession, Task, TaskId, Theme};
pub use store::{SqliteStore, now_ms};
pub use tasks::TaskListStore;
pub use theme::ThemePreference;
