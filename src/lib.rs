pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod interceptors;
pub mod json_utils;
pub mod prompt;
pub mod quiz;
pub mod session;
pub mod streaming;

// Convenient re-exports
pub use error::{AIError, ConfigError, GenerationFailure, SessionError};
pub use generator::{parse_quiz, GenerationResult, QuizGenerator};
pub use quiz::{Quiz, QuizQuestion, OPTION_COUNT, QUESTION_COUNT};
pub use session::{OptionMark, Phase, QuizPresenter, QuizSession, Summary};
