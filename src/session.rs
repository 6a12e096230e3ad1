//! The quiz-taking state machine behind the UI.
//!
//! ```text
//! Idle --begin_generation--> Loading --finish(Ok)--> Active --submit_answers--> Active(submitted)
//!   ^                           |                                                  |
//!   +------finish(Err)----------+                                                  |
//!   +------------------------------------reset---------------------------------------+
//! ```
//!
//! Nothing here renders anything; a front end reads the state and calls the
//! transitions in response to user input.

use tracing::{debug, info, warn};

use crate::core::LowLevelClient;
use crate::error::SessionError;
use crate::generator::{GenerationResult, QuizGenerator};
use crate::quiz::Quiz;

/// How an option should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Not picked (and, after submission, not the right answer).
    Unselected,
    /// The user's current pick, before submission.
    Selected,
    /// After submission: the right answer.
    Correct,
    /// After submission: the user's pick, and it was wrong.
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub score: u32,
    pub total: usize,
    pub wrong: usize,
}

/// One quiz being taken: the quiz, the user's picks, and the frozen score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    quiz: Quiz,
    selected: Vec<String>,
    submitted: bool,
    score: u32,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Self {
        let selected = vec![String::new(); quiz.len()];
        Self {
            quiz,
            selected,
            submitted: false,
            score: 0,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// One entry per question; `""` means unanswered.
    pub fn selected_answers(&self) -> &[String] {
        &self.selected
    }

    pub fn selected(&self, index: usize) -> Option<&str> {
        self.selected.get(index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.selected.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Zero until submission, then frozen.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Pick `option` for question `index`, replacing any earlier pick.
    pub fn select_answer(&mut self, index: usize, option: &str) -> Result<(), SessionError> {
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        let len = self.quiz.len();
        let question = self
            .quiz
            .questions()
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange { index, len })?;

        if !question.has_option(option) {
            return Err(SessionError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }

        self.selected[index] = option.to_string();
        Ok(())
    }

    /// Score the picks and lock them. Calling again returns the same score.
    pub fn submit(&mut self) -> u32 {
        if self.submitted {
            return self.score;
        }

        let score = self
            .quiz
            .questions()
            .iter()
            .zip(&self.selected)
            .filter(|(question, answer)| question.is_correct(answer))
            .count();

        self.score = score as u32;
        self.submitted = true;
        info!(score = self.score, total = self.quiz.len(), "Answers submitted");
        self.score
    }

    pub fn mark(&self, index: usize, option: &str) -> OptionMark {
        let (Some(question), Some(selected)) =
            (self.quiz.questions().get(index), self.selected.get(index))
        else {
            return OptionMark::Unselected;
        };
        let picked = !selected.is_empty() && selected == option;

        if !self.submitted {
            return if picked {
                OptionMark::Selected
            } else {
                OptionMark::Unselected
            };
        }

        if option == question.correct_option() {
            OptionMark::Correct
        } else if picked {
            OptionMark::Missed
        } else {
            OptionMark::Unselected
        }
    }

    pub fn summary(&self) -> Option<Summary> {
        self.submitted.then(|| Summary {
            score: self.score,
            total: self.quiz.len(),
            wrong: self.quiz.len() - self.score as usize,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Showing the topic form, possibly with the last failure reason.
    Idle { error: Option<String> },
    /// A generation request is in flight; the form is disabled.
    Loading,
    /// A quiz is on screen, submitted or not.
    Active(QuizSession),
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle { error: None }
    }
}

/// Owns the single quiz session of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizPresenter {
    phase: Phase,
    topic_input: String,
}

impl QuizPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn topic_input(&self) -> &str {
        &self.topic_input
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match &self.phase {
            Phase::Active(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        match &mut self.phase {
            Phase::Active(session) => Ok(session),
            _ => Err(SessionError::NoActiveQuiz),
        }
    }

    /// Edit the topic field. The field is locked while a quiz is generating.
    pub fn set_topic_input(&mut self, topic: &str) -> Result<(), SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        self.topic_input = topic.to_string();
        Ok(())
    }

    /// Enter `Loading` and return the topic to generate for.
    ///
    /// Any current session is discarded. Rejected while another generation is
    /// in flight or when the topic field is blank.
    pub fn begin_generation(&mut self) -> Result<String, SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        if self.topic_input.trim().is_empty() {
            return Err(SessionError::EmptyTopic);
        }

        debug!(topic = %self.topic_input, "Entering loading phase");
        self.phase = Phase::Loading;
        Ok(self.topic_input.clone())
    }

    /// Leave `Loading` with the outcome of the generation request.
    pub fn finish_generation(&mut self, result: GenerationResult) {
        if !self.is_loading() {
            warn!("Ignoring generation result outside the loading phase");
            return;
        }

        self.phase = match result {
            Ok(quiz) => Phase::Active(QuizSession::new(quiz)),
            Err(failure) => Phase::Idle {
                error: Some(failure.reason()),
            },
        };
    }

    /// Generate a quiz for the current topic field and show it.
    pub async fn submit_topic<C: LowLevelClient>(
        &mut self,
        generator: &QuizGenerator<C>,
    ) -> Result<(), SessionError> {
        let topic = self.begin_generation()?;
        let result = generator.generate(&topic).await;
        self.finish_generation(result);
        Ok(())
    }

    pub fn select_answer(&mut self, index: usize, option: &str) -> Result<(), SessionError> {
        self.session_mut()?.select_answer(index, option)
    }

    pub fn submit_answers(&mut self) -> Result<u32, SessionError> {
        Ok(self.session_mut()?.submit())
    }

    pub fn summary(&self) -> Result<Summary, SessionError> {
        self.session()
            .ok_or(SessionError::NoActiveQuiz)?
            .summary()
            .ok_or(SessionError::NotSubmitted)
    }

    /// Back to an empty topic form, as if no quiz had ever been generated.
    pub fn reset(&mut self) {
        debug!("Resetting quiz session");
        self.phase = Phase::default();
        self.topic_input.clear();
    }
}
