#![forbid(unsafe_code)]

pub mod audio;
pub mod catalog;
pub mod error;
pub mod export;
pub mod generator;
pub mod quiz_loop;
pub mod session;
pub mod timeout;

pub use solfa_core::Clock;

pub use audio::{AudioPlayer, DEFAULT_GAP_MS, NOTE_DURATION_MS, SilentPlayer};
pub use catalog::{CatalogEntry, CourseCatalog};
pub use error::{CatalogError, SessionError};
pub use export::{ExportRow, render_csv, result_rows};
pub use generator::generate;
pub use quiz_loop::QuizLoopService;
pub use session::{AdvanceOutcome, QuizSession, QuizState, SubmitOutcome, TimerRequest};
pub use timeout::TimeoutScheduler;
