use thiserror::Error;

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock client error: {0}")]
    Mock(String),
    #[error("Stream error: {0}")]
    Stream(String),
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

/// Startup configuration problems. These are fatal: the application refuses to start.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set; add it to the environment or a .env file")]
    MissingKey(&'static str),
    #[error("unknown provider '{0}'. Supported: gemini, claude, deepseek, mock")]
    UnknownProvider(String),
}

/// Why a call to `QuizGenerator::generate` did not produce a quiz.
///
/// The `Display` output is the user-facing failure reason.
#[derive(Error, Debug)]
pub enum GenerationFailure {
    #[error("error generating quiz: {0}")]
    Transport(#[from] AIError),
    /// The capability itself judged the topic unsuitable.
    #[error("{0}")]
    Refused(String),
    #[error("could not parse the generated quiz: {source}")]
    Unparsable {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
    #[error("generation did not produce a valid quiz for this topic")]
    InvalidQuiz,
}

impl GenerationFailure {
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a quiz is already being generated")]
    Busy,
    #[error("no quiz is active")]
    NoActiveQuiz,
    #[error("answers were already submitted")]
    AlreadySubmitted,
    #[error("answers have not been submitted yet")]
    NotSubmitted,
    #[error("question {index} does not exist (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("'{option}' is not an option of question {index}")]
    UnknownOption { index: usize, option: String },
    #[error("enter a game topic first")]
    EmptyTopic,
}
