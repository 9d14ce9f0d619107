use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct CaseModelError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl CaseModelError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    /// A mutation that the model refuses, e.g. re-parenting into an incompatible container.
    pub fn illegal_mutation(message: impl Into<String>) -> Self {
        Self::new("ILLEGAL_MUTATION", message)
    }
}
