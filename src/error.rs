use std::time::Duration;

/// Errors that abort a grading request.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// Missing or invalid configuration (credentials, weights, constants).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The uploaded asset never became ready.
    #[error("timed out after {waited:?} waiting for file {name} to become ACTIVE (last state={last_state})")]
    UploadTimeout {
        name: String,
        waited: Duration,
        last_state: String,
    },

    /// The collaborator rejected the upload or reported a failed state.
    #[error("upload of {name} failed: {message}")]
    UploadFailed { name: String, message: String },

    /// The generation call failed.
    #[error("model generation failed: {message}")]
    ModelInvocation { message: String },

    /// The model returned something that is not the expected JSON object.
    #[error("malformed {kind} assessment: {message}")]
    MalformedAssessment { kind: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl GradeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(kind: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedAssessment {
            kind,
            message: message.into(),
        }
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: message.into(),
        }
    }
}

pub type GradeResult<T> = std::result::Result<T, GradeError>;
