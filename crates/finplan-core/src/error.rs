use thiserror::Error;

/// An answer failed its question's rule. Never leaves the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Identifier of the question that rejected the answer
    pub question_id: String,
    /// Position of that question
    pub index: usize,
    /// User-facing message of the first failing rule
    pub message: String,
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid pattern for question '{question_id}': {message}")]
    InvalidPattern {
        question_id: String,
        message: String,
    },

    #[error("No question {index}; the wizard has {total}")]
    NoSuchQuestion { index: usize, total: usize },

    #[error("All questions are answered; the wizard no longer accepts answers")]
    NotAcceptingAnswers,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("A plan is already being generated")]
    GenerationInFlight,

    #[error("Answer every question before generating a plan")]
    WizardIncomplete,

    #[error("A follow-up question is already pending")]
    FollowUpInFlight,

    #[error("There is no plan to ask about yet")]
    NoPlan,

    #[error("The follow-up question is empty")]
    EmptyQuestion,
}

impl SessionError {
    /// The validation failure, if that is what this error is
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            SessionError::Wizard(WizardError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}
