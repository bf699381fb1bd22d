use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Every question carries exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("option index out of range: {provided} (valid: 0..{OPTION_COUNT})")]
    OptionOutOfRange { provided: u8 },

    #[error("question prompt must not be empty")]
    EmptyPrompt,

    #[error("option {index} text must not be empty")]
    EmptyOption { index: usize },
}

//
// ─── OPTION INDEX ──────────────────────────────────────────────────────────────
//

/// A validated answer-option position in `{0, 1, 2, 3}`.
///
/// Both the user's selection and the correct answer use this type, so an
/// out-of-range option can never enter a ledger or a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OptionIndex(u8);

impl OptionIndex {
    /// Creates an option index, rejecting values outside `0..OPTION_COUNT`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionOutOfRange` for values >= 4.
    pub fn new(value: u8) -> Result<Self, QuestionError> {
        if usize::from(value) < OPTION_COUNT {
            Ok(Self(value))
        } else {
            Err(QuestionError::OptionOutOfRange { provided: value })
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the value as a slice index.
    #[must_use]
    pub fn as_index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<u8> for OptionIndex {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OptionIndex> for u8 {
    fn from(index: OptionIndex) -> Self {
        index.0
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable multiple-choice question.
///
/// `prompt_secondary` carries an optional second-language rendering of the
/// prompt; it never participates in scoring. The question-set provider owns
/// question content, the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    prompt_secondary: Option<String>,
    options: [String; OPTION_COUNT],
    correct: OptionIndex,
}

impl Question {
    /// Creates a question, validating that the prompt and all options are
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` or `QuestionError::EmptyOption`.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        prompt_secondary: Option<String>,
        options: [String; OPTION_COUNT],
        correct: OptionIndex,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        for (index, option) in options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
        }

        Ok(Self {
            id,
            prompt,
            prompt_secondary,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn prompt_secondary(&self) -> Option<&str> {
        self.prompt_secondary.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    /// Returns the text of a single option.
    #[must_use]
    pub fn option(&self, index: OptionIndex) -> &str {
        &self.options[index.as_index()]
    }

    #[must_use]
    pub fn correct(&self) -> OptionIndex {
        self.correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
