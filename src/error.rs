use std::collections::BTreeMap;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Access denied ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Submission failed: {0}")]
    Submission(Box<Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Validation error carrying per-field messages.
    pub fn invalid_fields(fields: BTreeMap<String, Vec<String>>) -> Self {
        let message = match fields.keys().next() {
            Some(first) if fields.len() == 1 => format!("Please check the {} field", first),
            Some(_) => "Please correct the highlighted fields".to_string(),
            None => "Invalid input".to_string(),
        };
        Error::Validation { message, fields }
    }

    /// Builds the typed error for a non-success HTTP status.
    pub fn from_status(
        status: u16,
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    ) -> Self {
        match status {
            0 => Error::Network(message),
            400 | 422 => Error::Validation { message, fields },
            401 | 403 => Error::Auth { status, message },
            404 => Error::NotFound(message),
            _ => Error::Server { status, message },
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Server { status, .. } => *status >= 500,
            Error::Submission(inner) => inner.is_retryable(),
            _ => false,
        }
    }

    /// Message suitable for a toast or inline form error.
    pub fn user_message(&self) -> String {
        match self {
            Error::Network(_) => {
                "Unable to reach the server. Check your connection and retry.".to_string()
            }
            Error::Validation { message, .. } => message.clone(),
            Error::Auth { status: 401, .. } => "Your session has expired. Please sign in again.".to_string(),
            Error::Auth { .. } => "Access Denied".to_string(),
            Error::NotFound(what) => format!("{} was not found", what),
            Error::Server { .. } | Error::Json(_) => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
            Error::Submission(inner) => inner.user_message(),
            Error::InvalidState(msg) | Error::Config(msg) => msg.clone(),
            Error::Io(err) => err.to_string(),
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Error::Validation { fields, .. } => Some(fields),
            Error::Submission(inner) => inner.field_errors(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::Server {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("Malformed response body: {}", err),
            };
        }
        if let Some(status) = err.status() {
            return Error::from_status(status.as_u16(), err.to_string(), BTreeMap::new());
        }
        Error::Network(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, list) in errs.field_errors() {
            let messages = list
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        Error::invalid_fields(fields)
    }
}
