//! Client error types.
//!
//! Defined in `examdesk-core` so the session manager, the transport and the
//! CLI can classify failures (validation, authentication, transient) without
//! string matching.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Broad class of a failure, used to decide how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, reported per field, never sent over the network.
    Validation,
    /// Bad credentials or a rejected session; may force re-authentication.
    Authentication,
    /// Network or server trouble; reported and left to the user to retry.
    Transient,
}

/// Errors that can occur when talking to the exam backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Form input failed local validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The backend rejected the supplied credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend denied an authorized request (HTTP 401/403).
    #[error("authorization denied (HTTP {status})")]
    Denied { status: u16 },

    /// A refresh was needed but no refresh credential is stored.
    #[error("no refresh credential stored, sign in again")]
    MissingRefreshCredential,

    /// The operation needs an access credential and none is held.
    #[error("not signed in")]
    NotSignedIn,

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The credential store could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(String),

    /// The client was configured with an unusable value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns `true` for HTTP 401/403 responses on authorized requests.
    pub fn is_auth_denied(&self) -> bool {
        matches!(self, ClientError::Denied { .. })
    }

    /// Returns `true` if repeating the same call cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::Config(_)
                | ClientError::AuthenticationFailed(_)
                | ClientError::MissingRefreshCredential
                | ClientError::NotFound(_)
        )
    }

    /// Maps the error onto the validation / authentication / transient split.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Validation(_) | ClientError::Config(_) => ErrorCategory::Validation,
            ClientError::AuthenticationFailed(_)
            | ClientError::Denied { .. }
            | ClientError::MissingRefreshCredential
            | ClientError::NotSignedIn => ErrorCategory::Authentication,
            ClientError::NotFound(_)
            | ClientError::ApiError { .. }
            | ClientError::Timeout(_)
            | ClientError::NetworkError(_)
            | ClientError::Decode(_)
            | ClientError::Storage(_) => ErrorCategory::Transient,
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::Validation(errors)
    }
}

/// Errors from applying an answer key to a parsed question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerKeyError {
    /// No question exists at the given position.
    #[error("question {index} does not exist ({len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// The chosen option or statement does not exist.
    #[error("answer index {index} out of range ({len} available)")]
    AnswerOutOfRange { index: usize, len: usize },

    /// The patch targets a different kind of question.
    #[error("cannot apply a {patch} answer to a {question} question")]
    KindMismatch {
        patch: &'static str,
        question: &'static str,
    },

    /// A choice letter outside `A`..`D`.
    #[error("invalid choice label: {0}")]
    InvalidChoice(String),
}

/// Errors from recording answers during an exam attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The exam has no question with this id.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// The answer does not fit the question's kind.
    #[error("question {question_id} is not a {expected} question")]
    WrongKind {
        question_id: String,
        expected: &'static str,
    },

    /// The chosen option does not exist.
    #[error("option {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    /// The true/false question has no statement with this id.
    #[error("unknown statement: {0}")]
    UnknownStatement(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn categories() {
        assert_eq!(
            ClientError::Denied { status: 403 }.category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            ClientError::NetworkError("reset".into()).category(),
            ErrorCategory::Transient
        );
        let v = ValidationErrors::from(vec![FieldError::new("username", "too short")]);
        assert_eq!(ClientError::from(v).category(), ErrorCategory::Validation);
    }

    #[test]
    fn denied_is_not_permanent() {
        let err = ClientError::Denied { status: 401 };
        assert!(err.is_auth_denied());
        assert!(!err.is_permanent());
        assert!(ClientError::AuthenticationFailed("bad password".into()).is_permanent());
    }
}
