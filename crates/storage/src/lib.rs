#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, QuizResultRepository, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
