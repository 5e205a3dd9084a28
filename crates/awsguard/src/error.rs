//! Error types for the awsguard layer
//!
//! Two types live here. [`AwsError`] is the structured wire shape produced by
//! the cloud API client (code, message, optional transport status).
//! [`Error`] is what lifecycle operations return; it carries an `AwsError`
//! when the failure came from the API and plain text otherwise.

use std::fmt;
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A structured error returned by the cloud control-plane API.
///
/// Values are immutable once built. Rewriting the message (as the
/// authorization decoder does) produces a new value through
/// [`AwsError::with_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsError {
    code: String,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
}

impl AwsError {
    /// Create an error from a machine-readable code and a message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status_code: None,
            request_id: None,
        }
    }

    /// Create a request failure that also carries the transport status code.
    pub fn request_failure(
        code: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::new(code, message).with_status_code(status_code)
    }

    /// Attach a transport status code.
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Attach the request ID reported by the API.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Build a copy of this error with a different message.
    ///
    /// Code, status code and request ID are kept.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Machine-readable error code, e.g. `AccessDenied`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Transport status code, if the API surfaced one.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Request ID for support requests, if known.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl fmt::Display for AwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status_code {
            write!(f, " (status code: {status}")?;
            if let Some(request_id) = &self.request_id {
                write!(f, ", request id: {request_id}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for AwsError {}

/// Main error type for lifecycle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reported by the cloud API.
    #[error(transparent)]
    Aws(#[from] AwsError),

    /// Plain error text with no structured shape.
    #[error("{0}")]
    Message(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// Context description
        context: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors not covered by specific variants.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a plain-text error.
    pub fn message(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }

    /// Wrap an error with a short description of what was being attempted.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// The structured API error carried by this error, if any.
    ///
    /// Looks through context wrappers and `anyhow` errors as well as the
    /// `Aws` variant itself.
    pub fn aws_error(&self) -> Option<&AwsError> {
        match self {
            Error::Aws(err) => Some(err),
            Error::WithContext { source, .. } => crate::classify::find_aws_error(source.as_ref()),
            Error::Other(err) => err.chain().find_map(crate::classify::find_aws_error),
            Error::Message(_) | Error::Serialization(_) => None,
        }
    }

    /// The text that message-based processing (such as authorization
    /// decoding) operates on.
    ///
    /// When an API error is carried, directly or under wrappers, this is its
    /// message without the code prefix or any context.
    pub fn text(&self) -> String {
        match self.aws_error() {
            Some(aws) => aws.message().to_string(),
            None => self.to_string(),
        }
    }

    /// Replace the error text, keeping the structured shape when there is one.
    ///
    /// A nested API error is rebuilt with the new message inside the same
    /// kind of wrapper, so code, status code, request ID and context survive.
    pub(crate) fn replace_text(&self, text: String) -> Self {
        match self {
            Error::Aws(err) => Error::Aws(err.with_message(text)),
            Error::WithContext { context, source } => {
                match crate::classify::find_aws_error(source.as_ref()) {
                    Some(aws) => Error::WithContext {
                        context: context.clone(),
                        source: Box::new(Error::Aws(aws.with_message(text))),
                    },
                    None => Error::Message(text),
                }
            }
            Error::Other(err) => match err.chain().find_map(crate::classify::find_aws_error) {
                Some(aws) => {
                    let rebuilt = anyhow::Error::new(aws.with_message(text));
                    if err.is::<AwsError>() || err.is::<Error>() {
                        Error::Other(rebuilt)
                    } else {
                        Error::Other(rebuilt.context(err.to_string()))
                    }
                }
                None => Error::Message(text),
            },
            Error::Message(_) | Error::Serialization(_) => Error::Message(text),
        }
    }
}
